//! Lamina executor conformance test suite (C1-C10).
//!
//! Provides an `executor_conformance_tests!` macro that generates one
//! `#[tokio::test]` function per executor obligation, for any type
//! implementing `lamina_exec::Executor`. Obligations cover value
//! embedding and materialization, type-spec enforcement, the call /
//! tuple / selection contracts, closed-executor semantics, handle
//! ownership, and wire-format round trips.

pub mod checks;
pub mod fixtures;
pub mod suite;

pub use lamina_exec::{ContextStack, ExecutionContext, Executor};
