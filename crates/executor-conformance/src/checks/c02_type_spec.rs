//! C2: type-spec enforcement obligation.
//!
//! `create_value` with a type spec MUST reject values whose inferred
//! type the spec is not assignable from, MUST accept a wider spec, and
//! the resulting handle MUST carry the declared type.

use lamina_core::{DType, TupleElement, Type};
use lamina_exec::{ExecError, Executor, RawValue};

/// C2: spec agreement, widening, and mismatch rejection.
pub async fn check_c02_type_spec<E: Executor>(executor: &E) -> Result<(), String> {
    let int32 = Type::tensor(DType::Int32);

    let exact = executor
        .create_value(RawValue::int32(1), Some(&int32))
        .await
        .map_err(|e| format!("C2: exact spec rejected: {}", e))?;
    if exact.type_signature() != &int32 {
        return Err(format!(
            "C2: exact-spec handle carries '{}', expected 'int32'",
            exact.type_signature()
        ));
    }

    // Unnamed-tuple spec is wider than the named-tuple value.
    let wide = Type::tuple(vec![TupleElement::unnamed(int32.clone())]);
    let widened = executor
        .create_value(
            RawValue::Tuple(vec![(Some("x".to_string()), RawValue::int32(3))]),
            Some(&wide),
        )
        .await
        .map_err(|e| format!("C2: widening spec rejected: {}", e))?;
    if widened.type_signature() != &wide {
        return Err(format!(
            "C2: widened handle carries '{}', expected '{}'",
            widened.type_signature(),
            wide
        ));
    }

    match executor
        .create_value(RawValue::int32(1), Some(&Type::tensor(DType::Bool)))
        .await
    {
        Err(ExecError::TypeMismatch { .. }) => Ok(()),
        Err(other) => Err(format!("C2: mismatched spec failed with '{}'", other)),
        Ok(_) => Err("C2: mismatched spec was accepted".to_string()),
    }
}
