//! lamina-interchange: wire-format types and serialization.
//!
//! Provides typed structs for the wire representation of type
//! signatures and computation nodes (oneof-style tagged JSON), the
//! `serialize_type` / `deserialize_type` structural translation
//! against the lamina-core model, the well-formedness pass for opaque
//! graph-fragment bindings, and content digests for serialized
//! computations.
//!
//! This is the persisted/transmitted representation consumed by any
//! remote executor collaborator. The graph fragments themselves are
//! opaque bytes compiled by an external tensor runtime; this crate
//! only validates that their parameter/result bindings are
//! structurally consistent with the declared type.

pub mod serialize;
pub mod types;

pub use serialize::{
    check_graph_bindings, computation_digest, decode_graph_bytes, deserialize_type,
    encode_graph_bytes, serialize_graph_fn, serialize_type, CompiledGraph, GraphCompiler,
    SerializationError,
};
pub use types::*;
