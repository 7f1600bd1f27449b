//! lamina-exec: the asynchronous executor contract.
//!
//! An [`Executor`] ingests raw values and wire computations, produces
//! opaque [`ValueHandle`]s to embedded values, and composes them via
//! call/tuple/selection operations. Handles are owned exclusively by
//! the executor that created them; every operation may suspend while a
//! backend computes.
//!
//! Three collaborators round out the layer:
//! - [`ReferenceExecutor`] — an in-memory interpreter over embedded
//!   literals and computation nodes, delegating opaque graph fragments
//!   to an optional [`GraphRuntime`].
//! - [`TracingExecutor`] — a decorator recording an ordered call log
//!   for verification, keyed by monotonically increasing handle
//!   indices.
//! - [`ContextStack`] — scoped installation of an executor as the
//!   ambient backend, with stack discipline on every exit path.

pub mod context;
pub mod error;
pub mod executor;
pub mod reference;
pub mod trace;
pub mod value;

pub use context::{ContextStack, ExecutionContext, InstallGuard};
pub use error::ExecError;
pub use executor::{Executor, GraphRuntime};
pub use reference::ReferenceExecutor;
pub use trace::{TraceEntry, TracingExecutor};
pub use value::{ExecutorId, ExecutorValue, Materialized, RawValue, TensorLiteral, ValueHandle};
