//! lamina-core: the type model for federated computations.
//!
//! Types are recursive, immutable once constructed, and compared
//! structurally. The model mirrors the wire format one-to-one:
//! tensor leaves (dtype + shape), sequences, named tuples, and
//! functions. Besides structural equality the model supports an
//! assignability relation used by executors to admit values whose
//! inferred type is narrower than a declared one.
//!
//! This crate has no I/O and no serialization — the wire encoding
//! lives in lamina-interchange.

pub mod types;

pub use types::{DType, Dim, Shape, TupleElement, Type};
