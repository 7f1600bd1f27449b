//! The executor contract and the graph-runtime collaborator trait.

use async_trait::async_trait;
use lamina_core::Type;
use lamina_interchange::WireGraph;

use crate::error::ExecError;
use crate::value::{ExecutorId, Materialized, RawValue, ValueHandle};

/// Asynchronous interpreter embedding values and computations into
/// opaque handles and composing them via call/tuple/selection.
///
/// Every operation may suspend while a backend computes. Handles are
/// owned by the executor that created them; operations on a handle
/// from another executor fail with [`ExecError::ForeignHandle`].
/// After [`close`](Executor::close), every operation fails with
/// [`ExecError::ClosedExecutor`].
#[async_trait]
pub trait Executor: Send + Sync + 'static {
    /// The identity handles of this executor carry.
    fn id(&self) -> ExecutorId;

    /// Embed a raw literal, structure, or wire computation.
    ///
    /// When `type_spec` is supplied it must be assignable from the
    /// inferred type of `value`; the resulting handle then carries the
    /// declared (possibly wider) type.
    async fn create_value(
        &self,
        value: RawValue,
        type_spec: Option<&Type>,
    ) -> Result<ValueHandle, ExecError>;

    /// Invoke a function-typed handle with an optional argument
    /// handle.
    async fn create_call(
        &self,
        function: &ValueHandle,
        argument: Option<&ValueHandle>,
    ) -> Result<ValueHandle, ExecError>;

    /// Build a named-tuple-typed handle from element handles,
    /// preserving order and per-element name presence. Names need not
    /// be unique; each present name maps to the first such position on
    /// selection.
    async fn create_tuple(
        &self,
        elements: Vec<(Option<String>, ValueHandle)>,
    ) -> Result<ValueHandle, ExecError>;

    /// Select one element of a tuple-typed handle by position or by
    /// name. Exactly one selector must be given.
    async fn create_selection(
        &self,
        source: &ValueHandle,
        index: Option<usize>,
        name: Option<&str>,
    ) -> Result<ValueHandle, ExecError>;

    /// Release all resources held by the executor. Idempotent.
    /// In-flight operations subsequently fail with
    /// [`ExecError::ClosedExecutor`] rather than corrupting state.
    fn close(&self);
}

/// Narrow interface to the external tensor runtime that executes
/// opaque graph fragments. The fragment bytes are interpreted only
/// behind this boundary.
#[async_trait]
pub trait GraphRuntime: Send + Sync + 'static {
    /// Run a fragment with an optional materialized argument bound to
    /// its parameter binding, yielding the materialized result.
    async fn run(
        &self,
        fragment: &WireGraph,
        argument: Option<Materialized>,
    ) -> Result<Materialized, ExecError>;
}
