//! C7: closed-executor obligation.
//!
//! After `close()` every operation MUST fail with the closed-executor
//! error, including `compute` on handles created beforehand. `close`
//! itself is idempotent.

use lamina_exec::{ExecError, Executor, RawValue};

/// C7: close is terminal and idempotent.
pub async fn check_c07_closed_executor<E: Executor>(executor: &E) -> Result<(), String> {
    let outstanding = executor
        .create_value(RawValue::int32(1), None)
        .await
        .map_err(|e| format!("C7: create_value before close failed: {}", e))?;

    executor.close();
    executor.close();

    match executor.create_value(RawValue::int32(2), None).await {
        Err(ExecError::ClosedExecutor) => {}
        Err(other) => {
            return Err(format!(
                "C7: create_value after close failed with '{}'",
                other
            ))
        }
        Ok(_) => return Err("C7: create_value succeeded after close".to_string()),
    }

    match executor.create_tuple(vec![]).await {
        Err(ExecError::ClosedExecutor) => {}
        Err(other) => {
            return Err(format!(
                "C7: create_tuple after close failed with '{}'",
                other
            ))
        }
        Ok(_) => return Err("C7: create_tuple succeeded after close".to_string()),
    }

    match outstanding.compute().await {
        Err(ExecError::ClosedExecutor) => Ok(()),
        Err(other) => Err(format!(
            "C7: compute on an outstanding handle failed with '{}'",
            other
        )),
        Ok(_) => Err("C7: compute on an outstanding handle succeeded after close".to_string()),
    }
}
