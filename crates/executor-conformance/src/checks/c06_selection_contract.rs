//! C6: selection contract obligation.
//!
//! `create_selection` MUST take exactly one selector, reject non-tuple
//! sources, out-of-range indices and unknown names, and resolve a
//! duplicated name to its first position.

use lamina_exec::{ExecError, Executor, Materialized, RawValue, TensorLiteral};

/// C6: selector arity, error cases, and first-match name resolution.
pub async fn check_c06_selection_contract<E: Executor>(executor: &E) -> Result<(), String> {
    let first = executor
        .create_value(RawValue::int32(1), None)
        .await
        .map_err(|e| format!("C6: create_value failed: {}", e))?;
    let second = executor
        .create_value(RawValue::int32(2), None)
        .await
        .map_err(|e| format!("C6: create_value failed: {}", e))?;
    let tuple = executor
        .create_tuple(vec![
            (Some("x".to_string()), first),
            (Some("x".to_string()), second),
        ])
        .await
        .map_err(|e| format!("C6: create_tuple with duplicate names failed: {}", e))?;

    let by_index = executor
        .create_selection(&tuple, Some(1), None)
        .await
        .map_err(|e| format!("C6: selection by index failed: {}", e))?;
    let materialized = by_index
        .compute()
        .await
        .map_err(|e| format!("C6: compute failed: {}", e))?;
    if materialized != Materialized::Tensor(TensorLiteral::Int32(2)) {
        return Err(format!(
            "C6: index selection yielded {:?}, expected Int32(2)",
            materialized
        ));
    }

    // Duplicate name resolves to the first matching position.
    let by_name = executor
        .create_selection(&tuple, None, Some("x"))
        .await
        .map_err(|e| format!("C6: selection by name failed: {}", e))?;
    let materialized = by_name
        .compute()
        .await
        .map_err(|e| format!("C6: compute failed: {}", e))?;
    if materialized != Materialized::Tensor(TensorLiteral::Int32(1)) {
        return Err(format!(
            "C6: duplicate-name selection yielded {:?}, expected the first element Int32(1)",
            materialized
        ));
    }

    let bad_selectors = vec![
        (Some(0), Some("x"), "both selectors"),
        (None, None, "neither selector"),
        (Some(9), None, "out-of-range index"),
        (None, Some("zzz"), "unknown name"),
    ];
    for (index, name, label) in bad_selectors {
        match executor.create_selection(&tuple, index, name).await {
            Err(ExecError::Selection { .. }) => {}
            Err(other) => return Err(format!("C6: {} failed with '{}'", label, other)),
            Ok(_) => return Err(format!("C6: {} was accepted", label)),
        }
    }

    let literal = executor
        .create_value(RawValue::int32(5), None)
        .await
        .map_err(|e| format!("C6: create_value failed: {}", e))?;
    match executor.create_selection(&literal, Some(0), None).await {
        Err(ExecError::Selection { .. }) => Ok(()),
        Err(other) => Err(format!("C6: non-tuple source failed with '{}'", other)),
        Ok(_) => Err("C6: selecting from a non-tuple handle succeeded".to_string()),
    }
}
