//! C1: value round trip obligation.
//!
//! A literal embedded via `create_value` MUST come back unchanged from
//! `compute`, and the handle MUST carry the inferred scalar type.

use lamina_exec::{Executor, Materialized, RawValue, TensorLiteral};

/// C1: literals round-trip through embed and materialize.
pub async fn check_c01_value_round_trip<E: Executor>(executor: &E) -> Result<(), String> {
    let cases = vec![
        (RawValue::int32(10), "int32", TensorLiteral::Int32(10)),
        (RawValue::int64(-7), "int64", TensorLiteral::Int64(-7)),
        (RawValue::boolean(true), "bool", TensorLiteral::Bool(true)),
        (
            RawValue::text("abc"),
            "string",
            TensorLiteral::Text("abc".to_string()),
        ),
    ];

    for (raw, expected_type, expected_literal) in cases {
        let handle = executor
            .create_value(raw, None)
            .await
            .map_err(|e| format!("C1: create_value failed: {}", e))?;

        if handle.type_signature().to_string() != expected_type {
            return Err(format!(
                "C1: handle type is '{}', expected '{}'",
                handle.type_signature(),
                expected_type
            ));
        }

        let materialized = handle
            .compute()
            .await
            .map_err(|e| format!("C1: compute failed: {}", e))?;
        if materialized != Materialized::Tensor(expected_literal.clone()) {
            return Err(format!(
                "C1: materialized {:?}, expected {:?}",
                materialized, expected_literal
            ));
        }
    }

    Ok(())
}
