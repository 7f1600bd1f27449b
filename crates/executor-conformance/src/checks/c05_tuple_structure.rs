//! C5: tuple structure obligation.
//!
//! `create_tuple` MUST preserve element order and per-element name
//! presence exactly, through both the handle type and materialization.

use lamina_exec::{Executor, Materialized, RawValue, TensorLiteral};

/// C5: order and name presence survive tuple construction.
pub async fn check_c05_tuple_structure<E: Executor>(executor: &E) -> Result<(), String> {
    let x = executor
        .create_value(RawValue::int32(1), None)
        .await
        .map_err(|e| format!("C5: create_value failed: {}", e))?;
    let y = executor
        .create_value(RawValue::text("hi"), None)
        .await
        .map_err(|e| format!("C5: create_value failed: {}", e))?;
    let unnamed = executor
        .create_value(RawValue::Literal(TensorLiteral::Float32(2.5)), None)
        .await
        .map_err(|e| format!("C5: create_value failed: {}", e))?;
    let z = executor
        .create_value(RawValue::boolean(false), None)
        .await
        .map_err(|e| format!("C5: create_value failed: {}", e))?;

    let tuple = executor
        .create_tuple(vec![
            (Some("x".to_string()), x),
            (Some("y".to_string()), y),
            (None, unnamed),
            (Some("z".to_string()), z),
        ])
        .await
        .map_err(|e| format!("C5: create_tuple failed: {}", e))?;

    let rendered = tuple.type_signature().to_string();
    if rendered != "<x=int32,y=string,float32,z=bool>" {
        return Err(format!(
            "C5: tuple type is '{}', expected '<x=int32,y=string,float32,z=bool>'",
            rendered
        ));
    }

    let materialized = tuple
        .compute()
        .await
        .map_err(|e| format!("C5: compute failed: {}", e))?;
    let expected = Materialized::Tuple(vec![
        (
            Some("x".to_string()),
            Materialized::Tensor(TensorLiteral::Int32(1)),
        ),
        (
            Some("y".to_string()),
            Materialized::Tensor(TensorLiteral::Text("hi".to_string())),
        ),
        (None, Materialized::Tensor(TensorLiteral::Float32(2.5))),
        (
            Some("z".to_string()),
            Materialized::Tensor(TensorLiteral::Bool(false)),
        ),
    ]);
    if materialized != expected {
        return Err(format!(
            "C5: materialized {:?}, expected {:?}",
            materialized, expected
        ));
    }

    Ok(())
}
