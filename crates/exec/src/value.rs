//! Raw values, materialized results, and the opaque handle type.

use async_trait::async_trait;
use lamina_core::{DType, Type, TupleElement};
use lamina_interchange::{deserialize_type, WireComputation};
use std::any::Any;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::error::ExecError;

// ──────────────────────────────────────────────
// ExecutorId
// ──────────────────────────────────────────────

/// Process-unique identity of one executor instance, used to reject
/// handles passed across executors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExecutorId(u64);

impl ExecutorId {
    pub fn fresh() -> ExecutorId {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        ExecutorId(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

// ──────────────────────────────────────────────
// Literals and raw values
// ──────────────────────────────────────────────

/// A scalar tensor literal.
#[derive(Debug, Clone, PartialEq)]
pub enum TensorLiteral {
    Bool(bool),
    Int32(i32),
    Int64(i64),
    UInt32(u32),
    UInt64(u64),
    Float32(f32),
    Float64(f64),
    Text(String),
}

impl TensorLiteral {
    pub fn dtype(&self) -> DType {
        match self {
            TensorLiteral::Bool(_) => DType::Bool,
            TensorLiteral::Int32(_) => DType::Int32,
            TensorLiteral::Int64(_) => DType::Int64,
            TensorLiteral::UInt32(_) => DType::UInt32,
            TensorLiteral::UInt64(_) => DType::UInt64,
            TensorLiteral::Float32(_) => DType::Float32,
            TensorLiteral::Float64(_) => DType::Float64,
            TensorLiteral::Text(_) => DType::String,
        }
    }
}

/// A raw value handed to `create_value`: a literal, a wire
/// computation, or a structure of raw values.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    Literal(TensorLiteral),
    Computation(WireComputation),
    Tuple(Vec<(Option<String>, RawValue)>),
    Sequence(Vec<RawValue>),
}

impl RawValue {
    pub fn int32(v: i32) -> RawValue {
        RawValue::Literal(TensorLiteral::Int32(v))
    }

    pub fn int64(v: i64) -> RawValue {
        RawValue::Literal(TensorLiteral::Int64(v))
    }

    pub fn boolean(v: bool) -> RawValue {
        RawValue::Literal(TensorLiteral::Bool(v))
    }

    pub fn text(v: &str) -> RawValue {
        RawValue::Literal(TensorLiteral::Text(v.to_string()))
    }

    /// Infer the type of this raw value.
    ///
    /// Literals infer as scalar tensors; computations carry their
    /// declared type signature; tuples infer element-wise. An empty
    /// sequence has no inferable element type and requires an explicit
    /// type spec at `create_value`.
    pub fn infer_type(&self) -> Result<Type, ExecError> {
        match self {
            RawValue::Literal(literal) => Ok(Type::tensor(literal.dtype())),
            RawValue::Computation(computation) => {
                Ok(deserialize_type(&computation.type_signature)?)
            }
            RawValue::Tuple(elements) => {
                let mut inferred = Vec::with_capacity(elements.len());
                for (name, value) in elements {
                    inferred.push(TupleElement {
                        name: name.clone(),
                        value: value.infer_type()?,
                    });
                }
                Ok(Type::Tuple(inferred))
            }
            RawValue::Sequence(elements) => {
                let first = match elements.first() {
                    Some(first) => first.infer_type()?,
                    None => {
                        return Err(ExecError::TypeMismatch {
                            expected: "a type spec for an empty sequence".to_string(),
                            actual: "no elements to infer from".to_string(),
                        })
                    }
                };
                for element in &elements[1..] {
                    let t = element.infer_type()?;
                    if t != first {
                        return Err(ExecError::TypeMismatch {
                            expected: first.to_string(),
                            actual: t.to_string(),
                        });
                    }
                }
                Ok(Type::sequence(first))
            }
        }
    }
}

// ──────────────────────────────────────────────
// Materialized results
// ──────────────────────────────────────────────

/// A fully computed result, produced by `compute()` on a handle.
#[derive(Debug, Clone, PartialEq)]
pub enum Materialized {
    Tensor(TensorLiteral),
    Sequence(Vec<Materialized>),
    Tuple(Vec<(Option<String>, Materialized)>),
}

impl Materialized {
    pub fn as_tensor(&self) -> Option<&TensorLiteral> {
        match self {
            Materialized::Tensor(literal) => Some(literal),
            _ => None,
        }
    }
}

// ──────────────────────────────────────────────
// ExecutorValue and ValueHandle
// ──────────────────────────────────────────────

/// A value embedded in one executor: carries its type and can be
/// materialized asynchronously.
#[async_trait]
pub trait ExecutorValue: Send + Sync + 'static {
    fn type_signature(&self) -> &Type;

    /// Materialize the embedded value, suspending while any backend
    /// computation runs.
    async fn compute(&self) -> Result<Materialized, ExecError>;

    /// Hook for the owning executor to recover its concrete value
    /// type from an opaque handle.
    fn as_any_arc(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}

/// Opaque reference to a value owned by one specific executor
/// instance. Passing a handle to a different executor is rejected
/// with `ForeignHandleError`.
#[derive(Clone)]
pub struct ValueHandle {
    owner: ExecutorId,
    inner: Arc<dyn ExecutorValue>,
}

impl ValueHandle {
    pub fn new(owner: ExecutorId, inner: Arc<dyn ExecutorValue>) -> ValueHandle {
        ValueHandle { owner, inner }
    }

    pub fn owner(&self) -> ExecutorId {
        self.owner
    }

    pub fn type_signature(&self) -> &Type {
        self.inner.type_signature()
    }

    pub async fn compute(&self) -> Result<Materialized, ExecError> {
        self.inner.compute().await
    }

    /// Recover the executor-specific value behind this handle. Used by
    /// executor implementations after verifying ownership.
    pub fn downcast<T: Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        Arc::clone(&self.inner).as_any_arc().downcast::<T>().ok()
    }
}

impl fmt::Debug for ValueHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValueHandle")
            .field("owner", &self.owner)
            .field("type", &self.type_signature().to_string())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn executor_ids_are_unique() {
        let a = ExecutorId::fresh();
        let b = ExecutorId::fresh();
        assert_ne!(a, b);
    }

    #[test]
    fn literal_types_infer_as_scalar_tensors() {
        assert_eq!(
            RawValue::int32(7).infer_type().unwrap().to_string(),
            "int32"
        );
        assert_eq!(
            RawValue::text("abc").infer_type().unwrap().to_string(),
            "string"
        );
    }

    #[test]
    fn tuple_inference_preserves_names_and_order() {
        let raw = RawValue::Tuple(vec![
            (Some("x".to_string()), RawValue::int32(1)),
            (None, RawValue::boolean(true)),
        ]);
        assert_eq!(raw.infer_type().unwrap().to_string(), "<x=int32,bool>");
    }

    #[test]
    fn sequence_inference_requires_uniform_elements() {
        let uniform = RawValue::Sequence(vec![RawValue::int64(1), RawValue::int64(2)]);
        assert_eq!(uniform.infer_type().unwrap().to_string(), "int64*");

        let mixed = RawValue::Sequence(vec![RawValue::int64(1), RawValue::boolean(true)]);
        assert!(matches!(
            mixed.infer_type(),
            Err(ExecError::TypeMismatch { .. })
        ));

        let empty = RawValue::Sequence(vec![]);
        assert!(matches!(
            empty.infer_type(),
            Err(ExecError::TypeMismatch { .. })
        ));
    }
}
