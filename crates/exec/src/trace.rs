//! A tracing decorator that records every executor operation.
//!
//! Each successful operation is assigned the next handle index,
//! starting at 1, and appended to an ordered log. The log alone is
//! enough to reconstruct the call graph: entries refer to earlier
//! handles by index, never by identity. Failed operations allocate no
//! index and leave the log untouched.

use async_trait::async_trait;
use lamina_core::Type;
use std::any::Any;
use std::sync::{Arc, Mutex, PoisonError};

use crate::error::ExecError;
use crate::executor::Executor;
use crate::value::{ExecutorId, ExecutorValue, Materialized, RawValue, ValueHandle};

/// One recorded operation. `index` is the handle index assigned to the
/// operation's output; inputs are referenced by their indices.
#[derive(Debug, Clone, PartialEq)]
pub enum TraceEntry {
    CreateValue {
        value: RawValue,
        type_spec: Option<Type>,
        index: u64,
    },
    CreateCall {
        function: u64,
        argument: Option<u64>,
        index: u64,
    },
    CreateTuple {
        elements: Vec<(Option<String>, u64)>,
        index: u64,
    },
    CreateSelection {
        source: u64,
        selected_index: Option<usize>,
        selected_name: Option<String>,
        index: u64,
    },
    Compute {
        source: u64,
        result: Materialized,
    },
}

struct TraceShared {
    id: ExecutorId,
    state: Mutex<TraceState>,
}

struct TraceState {
    next_index: u64,
    entries: Vec<TraceEntry>,
}

impl TraceShared {
    fn with<T>(&self, f: impl FnOnce(&mut TraceState) -> T) -> T {
        let mut guard = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }

    // Index allocation and entry append happen under one lock so
    // interleaved operations record in index order.
    fn record(&self, make: impl FnOnce(u64) -> TraceEntry) -> u64 {
        self.with(|state| {
            let index = state.next_index;
            state.next_index += 1;
            state.entries.push(make(index));
            index
        })
    }

    fn append(&self, entry: TraceEntry) {
        self.with(|state| state.entries.push(entry));
    }
}

struct TracedValue {
    shared: Arc<TraceShared>,
    index: u64,
    inner: ValueHandle,
}

#[async_trait]
impl ExecutorValue for TracedValue {
    fn type_signature(&self) -> &Type {
        self.inner.type_signature()
    }

    async fn compute(&self) -> Result<Materialized, ExecError> {
        let result = self.inner.compute().await?;
        self.shared.append(TraceEntry::Compute {
            source: self.index,
            result: result.clone(),
        });
        Ok(result)
    }

    fn as_any_arc(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

/// Decorator over any [`Executor`] that forwards every operation to
/// the target and records it in an ordered trace.
///
/// Handles issued by the decorator wrap the target's handles; the
/// decorator unwraps them before forwarding, so the target never sees
/// foreign handles. `close` forwards without recording.
pub struct TracingExecutor {
    shared: Arc<TraceShared>,
    target: Arc<dyn Executor>,
}

impl TracingExecutor {
    pub fn new(target: Arc<dyn Executor>) -> TracingExecutor {
        TracingExecutor {
            shared: Arc::new(TraceShared {
                id: ExecutorId::fresh(),
                state: Mutex::new(TraceState {
                    next_index: 1,
                    entries: Vec::new(),
                }),
            }),
            target,
        }
    }

    /// Snapshot of the trace recorded so far.
    pub fn trace(&self) -> Vec<TraceEntry> {
        self.shared.with(|state| state.entries.clone())
    }

    fn own(&self, handle: &ValueHandle) -> Result<Arc<TracedValue>, ExecError> {
        if handle.owner() != self.shared.id {
            return Err(ExecError::ForeignHandle);
        }
        handle.downcast::<TracedValue>().ok_or(ExecError::ForeignHandle)
    }

    fn wrap(&self, inner: ValueHandle, make: impl FnOnce(u64) -> TraceEntry) -> ValueHandle {
        let index = self.shared.record(make);
        ValueHandle::new(
            self.shared.id,
            Arc::new(TracedValue {
                shared: Arc::clone(&self.shared),
                index,
                inner,
            }),
        )
    }
}

#[async_trait]
impl Executor for TracingExecutor {
    fn id(&self) -> ExecutorId {
        self.shared.id
    }

    async fn create_value(
        &self,
        value: RawValue,
        type_spec: Option<&Type>,
    ) -> Result<ValueHandle, ExecError> {
        let inner = self.target.create_value(value.clone(), type_spec).await?;
        Ok(self.wrap(inner, |index| TraceEntry::CreateValue {
            value,
            type_spec: type_spec.cloned(),
            index,
        }))
    }

    async fn create_call(
        &self,
        function: &ValueHandle,
        argument: Option<&ValueHandle>,
    ) -> Result<ValueHandle, ExecError> {
        let function = self.own(function)?;
        let argument = argument.map(|a| self.own(a)).transpose()?;
        let inner = self
            .target
            .create_call(&function.inner, argument.as_ref().map(|a| &a.inner))
            .await?;
        let function_index = function.index;
        let argument_index = argument.map(|a| a.index);
        Ok(self.wrap(inner, |index| TraceEntry::CreateCall {
            function: function_index,
            argument: argument_index,
            index,
        }))
    }

    async fn create_tuple(
        &self,
        elements: Vec<(Option<String>, ValueHandle)>,
    ) -> Result<ValueHandle, ExecError> {
        let mut unwrapped = Vec::with_capacity(elements.len());
        let mut indices = Vec::with_capacity(elements.len());
        for (name, handle) in elements {
            let value = self.own(&handle)?;
            indices.push((name.clone(), value.index));
            unwrapped.push((name, value.inner.clone()));
        }
        let inner = self.target.create_tuple(unwrapped).await?;
        Ok(self.wrap(inner, |index| TraceEntry::CreateTuple {
            elements: indices,
            index,
        }))
    }

    async fn create_selection(
        &self,
        source: &ValueHandle,
        index: Option<usize>,
        name: Option<&str>,
    ) -> Result<ValueHandle, ExecError> {
        let source = self.own(source)?;
        let inner = self
            .target
            .create_selection(&source.inner, index, name)
            .await?;
        let source_index = source.index;
        let selected_name = name.map(|n| n.to_string());
        Ok(self.wrap(inner, |output| TraceEntry::CreateSelection {
            source: source_index,
            selected_index: index,
            selected_name,
            index: output,
        }))
    }

    fn close(&self) {
        self.target.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::ReferenceExecutor;
    use crate::value::TensorLiteral;
    use lamina_core::DType;
    use lamina_interchange::{serialize_type, WireComputation};

    fn identity_lambda(t: &Type) -> WireComputation {
        WireComputation::lambda(
            "a",
            WireComputation::reference("a", serialize_type(t)),
            serialize_type(&Type::unary_op(t.clone())),
        )
    }

    #[tokio::test]
    async fn trace_reconstructs_the_call_graph() {
        let executor = TracingExecutor::new(Arc::new(ReferenceExecutor::new()));
        let int32 = Type::tensor(DType::Int32);

        let function = executor
            .create_value(RawValue::Computation(identity_lambda(&int32)), None)
            .await
            .unwrap();
        let argument = executor
            .create_value(RawValue::int32(10), Some(&int32))
            .await
            .unwrap();
        let result = executor
            .create_call(&function, Some(&argument))
            .await
            .unwrap();
        let materialized = result.compute().await.unwrap();
        assert_eq!(materialized, Materialized::Tensor(TensorLiteral::Int32(10)));

        assert_eq!(
            executor.trace(),
            vec![
                TraceEntry::CreateValue {
                    value: RawValue::Computation(identity_lambda(&int32)),
                    type_spec: None,
                    index: 1,
                },
                TraceEntry::CreateValue {
                    value: RawValue::int32(10),
                    type_spec: Some(int32.clone()),
                    index: 2,
                },
                TraceEntry::CreateCall {
                    function: 1,
                    argument: Some(2),
                    index: 3,
                },
                TraceEntry::Compute {
                    source: 3,
                    result: Materialized::Tensor(TensorLiteral::Int32(10)),
                },
            ]
        );
    }

    #[tokio::test]
    async fn tuple_and_selection_are_traced_by_index() {
        let executor = TracingExecutor::new(Arc::new(ReferenceExecutor::new()));
        let x = executor
            .create_value(RawValue::int32(1), None)
            .await
            .unwrap();
        let y = executor
            .create_value(RawValue::boolean(true), None)
            .await
            .unwrap();
        let tuple = executor
            .create_tuple(vec![(Some("x".to_string()), x), (None, y)])
            .await
            .unwrap();
        let selected = executor
            .create_selection(&tuple, None, Some("x"))
            .await
            .unwrap();
        assert_eq!(selected.type_signature().to_string(), "int32");

        let trace = executor.trace();
        assert_eq!(
            trace[2],
            TraceEntry::CreateTuple {
                elements: vec![(Some("x".to_string()), 1), (None, 2)],
                index: 3,
            }
        );
        assert_eq!(
            trace[3],
            TraceEntry::CreateSelection {
                source: 3,
                selected_index: None,
                selected_name: Some("x".to_string()),
                index: 4,
            }
        );
    }

    #[tokio::test]
    async fn indices_are_unique_and_strictly_increasing_from_one() {
        let executor = TracingExecutor::new(Arc::new(ReferenceExecutor::new()));
        for i in 0..5 {
            executor
                .create_value(RawValue::int32(i), None)
                .await
                .unwrap();
        }
        let indices: Vec<u64> = executor
            .trace()
            .iter()
            .map(|entry| match entry {
                TraceEntry::CreateValue { index, .. } => *index,
                other => panic!("unexpected entry {:?}", other),
            })
            .collect();
        assert_eq!(indices, vec![1, 2, 3, 4, 5]);
    }

    #[tokio::test]
    async fn interleaved_operations_allocate_a_gapless_index_sequence() {
        let executor = Arc::new(TracingExecutor::new(Arc::new(ReferenceExecutor::new())));
        let mut tasks = Vec::new();
        for i in 0..32 {
            let executor = Arc::clone(&executor);
            tasks.push(tokio::spawn(async move {
                executor.create_value(RawValue::int32(i), None).await.unwrap();
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }

        let mut indices: Vec<u64> = executor
            .trace()
            .iter()
            .map(|entry| match entry {
                TraceEntry::CreateValue { index, .. } => *index,
                other => panic!("unexpected entry {:?}", other),
            })
            .collect();
        indices.sort_unstable();
        assert_eq!(indices, (1..=32).collect::<Vec<u64>>());
    }

    #[tokio::test]
    async fn failed_operations_allocate_no_index() {
        let executor = TracingExecutor::new(Arc::new(ReferenceExecutor::new()));
        let err = executor
            .create_value(RawValue::int32(1), Some(&Type::tensor(DType::Bool)))
            .await
            .unwrap_err();
        assert!(matches!(err, ExecError::TypeMismatch { .. }));
        assert!(executor.trace().is_empty());

        let handle = executor
            .create_value(RawValue::int32(1), None)
            .await
            .unwrap();
        executor
            .create_selection(&handle, Some(0), None)
            .await
            .unwrap_err();
        assert_eq!(executor.trace().len(), 1);

        // The next success picks up where the last success left off.
        let next = executor
            .create_value(RawValue::int32(2), None)
            .await
            .unwrap();
        executor.create_tuple(vec![(None, next)]).await.unwrap();
        assert!(matches!(
            executor.trace().last(),
            Some(TraceEntry::CreateTuple { index: 3, .. })
        ));
    }

    #[tokio::test]
    async fn target_handles_are_foreign_to_the_decorator() {
        let target = Arc::new(ReferenceExecutor::new());
        let executor = TracingExecutor::new(Arc::clone(&target) as Arc<dyn Executor>);
        let raw = target.create_value(RawValue::int32(1), None).await.unwrap();
        assert!(matches!(
            executor
                .create_selection(&raw, Some(0), None)
                .await
                .unwrap_err(),
            ExecError::ForeignHandle
        ));
    }

    #[tokio::test]
    async fn close_forwards_without_recording() {
        let executor = TracingExecutor::new(Arc::new(ReferenceExecutor::new()));
        executor
            .create_value(RawValue::int32(1), None)
            .await
            .unwrap();
        executor.close();
        assert_eq!(executor.trace().len(), 1);
        assert!(matches!(
            executor
                .create_value(RawValue::int32(2), None)
                .await
                .unwrap_err(),
            ExecError::ClosedExecutor
        ));
        assert_eq!(executor.trace().len(), 1);
    }
}
