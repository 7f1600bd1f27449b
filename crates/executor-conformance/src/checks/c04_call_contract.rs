//! C4: call contract obligation.
//!
//! `create_call` MUST reject non-function handles, enforce argument
//! presence in both directions, and reject arguments the parameter
//! type is not assignable from.

use crate::fixtures;
use lamina_core::{DType, Type};
use lamina_exec::{ExecError, Executor, RawValue};

/// C4: not-callable, arity, and argument-type rejection.
pub async fn check_c04_call_contract<E: Executor>(executor: &E) -> Result<(), String> {
    let int32 = Type::tensor(DType::Int32);
    let literal = executor
        .create_value(RawValue::int32(1), None)
        .await
        .map_err(|e| format!("C4: embedding a literal failed: {}", e))?;

    match executor.create_call(&literal, None).await {
        Err(ExecError::NotCallable { .. }) => {}
        Err(other) => return Err(format!("C4: non-function call failed with '{}'", other)),
        Ok(_) => return Err("C4: calling a literal handle succeeded".to_string()),
    }

    let unary = executor
        .create_value(
            RawValue::Computation(fixtures::identity_lambda_computation(&int32)),
            None,
        )
        .await
        .map_err(|e| format!("C4: embedding the lambda failed: {}", e))?;
    match executor.create_call(&unary, None).await {
        Err(ExecError::Arity { .. }) => {}
        Err(other) => return Err(format!("C4: missing argument failed with '{}'", other)),
        Ok(_) => return Err("C4: calling a unary function without an argument succeeded".to_string()),
    }

    let nullary = executor
        .create_value(
            RawValue::Computation(fixtures::empty_graph_computation()),
            None,
        )
        .await
        .map_err(|e| format!("C4: embedding the graph failed: {}", e))?;
    match executor.create_call(&nullary, Some(&literal)).await {
        Err(ExecError::Arity { .. }) => {}
        Err(other) => return Err(format!("C4: surplus argument failed with '{}'", other)),
        Ok(_) => return Err("C4: calling a nullary function with an argument succeeded".to_string()),
    }

    let wrong = executor
        .create_value(RawValue::boolean(true), None)
        .await
        .map_err(|e| format!("C4: embedding the bool failed: {}", e))?;
    match executor.create_call(&unary, Some(&wrong)).await {
        Err(ExecError::TypeMismatch { .. }) => Ok(()),
        Err(other) => Err(format!("C4: mistyped argument failed with '{}'", other)),
        Ok(_) => Err("C4: a bool argument to (int32 -> int32) was accepted".to_string()),
    }
}
