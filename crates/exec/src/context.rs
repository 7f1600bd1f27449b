//! Scoped installation of an executor as the ambient backend.
//!
//! A [`ContextStack`] is a plain owned object, one per test or task,
//! so concurrent tasks never observe each other's installations. The
//! [`InstallGuard`] returned by [`ContextStack::install`] pops its
//! context when dropped, on normal exit and on panic unwind alike.

use std::sync::{Arc, Mutex, PoisonError};

use crate::executor::Executor;

/// One installed scope: an executor acting as the ambient backend.
#[derive(Clone)]
pub struct ExecutionContext {
    executor: Arc<dyn Executor>,
}

impl ExecutionContext {
    pub fn new(executor: Arc<dyn Executor>) -> ExecutionContext {
        ExecutionContext { executor }
    }

    pub fn executor(&self) -> &Arc<dyn Executor> {
        &self.executor
    }
}

/// LIFO stack of installed contexts.
///
/// Guards must be dropped in reverse installation order; ordinary
/// lexical scoping guarantees this.
#[derive(Clone, Default)]
pub struct ContextStack {
    inner: Arc<Mutex<Vec<Arc<ExecutionContext>>>>,
}

impl ContextStack {
    pub fn new() -> ContextStack {
        ContextStack::default()
    }

    /// Push a context; the returned guard pops it on drop.
    #[must_use = "dropping the guard immediately uninstalls the context"]
    pub fn install(&self, context: ExecutionContext) -> InstallGuard {
        self.lock().push(Arc::new(context));
        InstallGuard {
            stack: Arc::clone(&self.inner),
        }
    }

    /// The innermost installed context, if any.
    pub fn current(&self) -> Option<Arc<ExecutionContext>> {
        self.lock().last().cloned()
    }

    pub fn depth(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Arc<ExecutionContext>>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Restores the previous context when dropped.
pub struct InstallGuard {
    stack: Arc<Mutex<Vec<Arc<ExecutionContext>>>>,
}

impl Drop for InstallGuard {
    fn drop(&mut self) {
        let mut stack = self.stack.lock().unwrap_or_else(PoisonError::into_inner);
        stack.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::ReferenceExecutor;
    use crate::value::ExecutorId;

    fn context() -> (ExecutionContext, ExecutorId) {
        let executor = Arc::new(ReferenceExecutor::new());
        let id = executor.id();
        (ExecutionContext::new(executor), id)
    }

    #[test]
    fn install_and_restore_are_lifo() {
        let stack = ContextStack::new();
        assert!(stack.current().is_none());

        let (outer, outer_id) = context();
        let _outer_guard = stack.install(outer);
        assert_eq!(stack.current().unwrap().executor().id(), outer_id);

        {
            let (inner, inner_id) = context();
            let _inner_guard = stack.install(inner);
            assert_eq!(stack.current().unwrap().executor().id(), inner_id);
            assert_eq!(stack.depth(), 2);
        }

        assert_eq!(stack.current().unwrap().executor().id(), outer_id);
        assert_eq!(stack.depth(), 1);
    }

    #[test]
    fn guard_pops_on_panic_unwind() {
        let stack = ContextStack::new();
        let (outer, outer_id) = context();
        let _outer_guard = stack.install(outer);

        let inner_stack = stack.clone();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(move || {
            let (inner, _) = context();
            let _guard = inner_stack.install(inner);
            panic!("unwind");
        }));
        assert!(result.is_err());

        assert_eq!(stack.current().unwrap().executor().id(), outer_id);
        assert_eq!(stack.depth(), 1);
    }

    #[tokio::test]
    async fn stacks_are_isolated_across_tasks() {
        let first = ContextStack::new();
        let second = ContextStack::new();
        let (ctx, first_id) = context();
        let _guard = first.install(ctx);

        let handle = tokio::spawn(async move {
            assert!(second.current().is_none());
            let (ctx, id) = context();
            let _guard = second.install(ctx);
            assert_eq!(second.current().unwrap().executor().id(), id);
        });
        handle.await.unwrap();

        assert_eq!(first.current().unwrap().executor().id(), first_id);
    }
}
