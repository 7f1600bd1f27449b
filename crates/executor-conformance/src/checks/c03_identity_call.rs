//! C3: identity call obligation.
//!
//! Embedding an identity lambda `(T -> T)` and calling it MUST yield a
//! handle that materializes to the argument.

use crate::fixtures;
use lamina_core::{DType, Type};
use lamina_exec::{Executor, Materialized, RawValue, TensorLiteral};

/// C3: calling an identity lambda returns its argument.
pub async fn check_c03_identity_call<E: Executor>(executor: &E) -> Result<(), String> {
    let int32 = Type::tensor(DType::Int32);
    let function = executor
        .create_value(
            RawValue::Computation(fixtures::identity_lambda_computation(&int32)),
            None,
        )
        .await
        .map_err(|e| format!("C3: embedding the lambda failed: {}", e))?;

    if function.type_signature().to_string() != "(int32 -> int32)" {
        return Err(format!(
            "C3: lambda handle carries '{}', expected '(int32 -> int32)'",
            function.type_signature()
        ));
    }

    let argument = executor
        .create_value(RawValue::int32(42), None)
        .await
        .map_err(|e| format!("C3: embedding the argument failed: {}", e))?;
    let result = executor
        .create_call(&function, Some(&argument))
        .await
        .map_err(|e| format!("C3: create_call failed: {}", e))?;

    let materialized = result
        .compute()
        .await
        .map_err(|e| format!("C3: compute failed: {}", e))?;
    if materialized != Materialized::Tensor(TensorLiteral::Int32(42)) {
        return Err(format!(
            "C3: identity call yielded {:?}, expected Int32(42)",
            materialized
        ));
    }

    Ok(())
}
