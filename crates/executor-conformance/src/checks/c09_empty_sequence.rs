//! C9: empty-sequence obligation.
//!
//! An empty sequence has no inferable element type: it MUST be
//! accepted with an explicit sequence type spec and rejected without
//! one.

use lamina_core::{DType, Type};
use lamina_exec::{ExecError, Executor, Materialized, RawValue};

/// C9: empty sequences require a type spec.
pub async fn check_c09_empty_sequence<E: Executor>(executor: &E) -> Result<(), String> {
    let spec = Type::sequence(Type::tensor(DType::Int64));
    let handle = executor
        .create_value(RawValue::Sequence(vec![]), Some(&spec))
        .await
        .map_err(|e| format!("C9: empty sequence with spec rejected: {}", e))?;

    if handle.type_signature().to_string() != "int64*" {
        return Err(format!(
            "C9: handle carries '{}', expected 'int64*'",
            handle.type_signature()
        ));
    }

    let materialized = handle
        .compute()
        .await
        .map_err(|e| format!("C9: compute failed: {}", e))?;
    if materialized != Materialized::Sequence(vec![]) {
        return Err(format!(
            "C9: materialized {:?}, expected an empty sequence",
            materialized
        ));
    }

    match executor.create_value(RawValue::Sequence(vec![]), None).await {
        Err(ExecError::TypeMismatch { .. }) => Ok(()),
        Err(other) => Err(format!(
            "C9: empty sequence without spec failed with '{}'",
            other
        )),
        Ok(_) => Err("C9: empty sequence without spec was accepted".to_string()),
    }
}
