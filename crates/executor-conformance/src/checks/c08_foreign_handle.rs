//! C8: handle ownership obligation.
//!
//! A handle created by one executor instance MUST be rejected by every
//! other instance, in each composing operation.

use lamina_exec::{ExecError, Executor, RawValue};

/// C8: foreign handles are rejected everywhere they could be passed.
pub async fn check_c08_foreign_handle<E: Executor>(
    executor: &E,
    other: &E,
) -> Result<(), String> {
    let foreign = other
        .create_value(RawValue::int32(1), None)
        .await
        .map_err(|e| format!("C8: create_value on the other instance failed: {}", e))?;

    match executor.create_selection(&foreign, Some(0), None).await {
        Err(ExecError::ForeignHandle) => {}
        Err(other) => return Err(format!("C8: create_selection failed with '{}'", other)),
        Ok(_) => return Err("C8: create_selection accepted a foreign handle".to_string()),
    }

    match executor.create_tuple(vec![(None, foreign.clone())]).await {
        Err(ExecError::ForeignHandle) => {}
        Err(other) => return Err(format!("C8: create_tuple failed with '{}'", other)),
        Ok(_) => return Err("C8: create_tuple accepted a foreign handle".to_string()),
    }

    match executor.create_call(&foreign, None).await {
        Err(ExecError::ForeignHandle) => Ok(()),
        Err(other) => Err(format!("C8: create_call failed with '{}'", other)),
        Ok(_) => Err("C8: create_call accepted a foreign handle".to_string()),
    }
}
