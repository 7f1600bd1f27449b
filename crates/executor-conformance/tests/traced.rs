//! Conformance suite run against the tracing decorator over the
//! reference executor. The decorator must be indistinguishable from
//! its target under every obligation.

use std::sync::Arc;

use lamina_exec::{
    ContextStack, ExecutionContext, Executor, RawValue, ReferenceExecutor, TracingExecutor,
};
use lamina_executor_conformance::executor_conformance_tests;

executor_conformance_tests!(TracingExecutor::new(Arc::new(ReferenceExecutor::new())));

// The decorator also works as an ambient context backend.
#[tokio::test]
async fn traced_executor_serves_as_the_ambient_backend() {
    let stack = ContextStack::new();
    let executor: Arc<dyn Executor> =
        Arc::new(TracingExecutor::new(Arc::new(ReferenceExecutor::new())));
    let _guard = stack.install(ExecutionContext::new(Arc::clone(&executor)));

    let ambient = stack.current().expect("context installed");
    let handle = ambient
        .executor()
        .create_value(RawValue::int32(3), None)
        .await
        .expect("create_value through the ambient context");
    assert_eq!(handle.type_signature().to_string(), "int32");
}
