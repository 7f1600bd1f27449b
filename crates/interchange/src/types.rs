//! Typed structs for the wire representation of types and computations.
//!
//! The wire format is oneof-style tagged JSON: each variant appears as
//! a single-key object (`{"tensor": {...}}`, `{"lambda": {...}}`),
//! which serde's externally tagged enum representation gives us
//! directly. Unknown dimension sizes encode as `-1`.

use serde::{Deserialize, Serialize};

// ──────────────────────────────────────────────
// Wire types
// ──────────────────────────────────────────────

/// Wire representation of a type signature.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WireType {
    Tensor(WireTensor),
    Sequence(Box<WireSequence>),
    Tuple(WireTuple),
    Function(Box<WireFunction>),
}

/// Tensor leaf: dtype enum name plus a dimension-size list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WireTensor {
    pub dtype: String,
    #[serde(default)]
    pub shape: WireShape,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct WireShape {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dim: Vec<WireDim>,
}

/// One dimension; `-1` means unknown/undefined extent.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct WireDim {
    pub size: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WireSequence {
    pub element: WireType,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WireTuple {
    #[serde(default)]
    pub element: Vec<WireTupleElement>,
}

/// Ordered tuple element; name presence is preserved exactly.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WireTupleElement {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub value: WireType,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WireFunction {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameter: Option<WireType>,
    pub result: WireType,
}

// ──────────────────────────────────────────────
// Wire computations
// ──────────────────────────────────────────────

/// Wire representation of a computation node. Every node carries its
/// serialized type signature alongside the oneof variant body.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WireComputation {
    #[serde(rename = "type")]
    pub type_signature: WireType,
    #[serde(flatten)]
    pub kind: WireComputationKind,
}

/// The oneof variants of a computation node.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WireComputationKind {
    Reference(WireReference),
    Lambda(Box<WireLambda>),
    Tuple(WireComputationTuple),
    Selection(Box<WireSelection>),
    Graph(WireGraph),
}

/// Reference to a name bound by an enclosing lambda.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WireReference {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WireLambda {
    pub parameter_name: String,
    pub result: WireComputation,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WireComputationTuple {
    #[serde(default)]
    pub element: Vec<WireComputationElement>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WireComputationElement {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub value: WireComputation,
}

/// Selection of one tuple element by position or by name; exactly one
/// selector is set in a well-formed node.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WireSelection {
    pub source: WireComputation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

// ──────────────────────────────────────────────
// Opaque graph fragments
// ──────────────────────────────────────────────

/// An opaque backend computation fragment: graph bytes (base64) plus
/// bindings describing which named tensors or iterator handles carry
/// the declared parameter and result. The bytes are never interpreted
/// here.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WireGraph {
    pub graph_def: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameter: Option<WireBinding>,
    pub result: WireBinding,
}

/// Binds a declared type to a position in the opaque graph: a named
/// tensor, a sequence iterator handle, or a tuple of nested bindings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WireBinding {
    Tensor(TensorBinding),
    Sequence(SequenceBinding),
    Tuple(TupleBinding),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TensorBinding {
    pub tensor_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SequenceBinding {
    pub iterator_handle_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TupleBinding {
    #[serde(default)]
    pub element: Vec<WireBinding>,
}

impl WireComputation {
    /// A reference node `name` with the given type signature.
    pub fn reference(name: &str, type_signature: WireType) -> WireComputation {
        WireComputation {
            type_signature,
            kind: WireComputationKind::Reference(WireReference {
                name: name.to_string(),
            }),
        }
    }

    /// A lambda node binding `parameter_name` over `result`.
    pub fn lambda(
        parameter_name: &str,
        result: WireComputation,
        type_signature: WireType,
    ) -> WireComputation {
        WireComputation {
            type_signature,
            kind: WireComputationKind::Lambda(Box::new(WireLambda {
                parameter_name: parameter_name.to_string(),
                result,
            })),
        }
    }

    /// A graph node wrapping an opaque fragment.
    pub fn graph(fragment: WireGraph, type_signature: WireType) -> WireComputation {
        WireComputation {
            type_signature,
            kind: WireComputationKind::Graph(fragment),
        }
    }

    /// The oneof variant name, for diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match &self.kind {
            WireComputationKind::Reference(_) => "reference",
            WireComputationKind::Lambda(_) => "lambda",
            WireComputationKind::Tuple(_) => "tuple",
            WireComputationKind::Selection(_) => "selection",
            WireComputationKind::Graph(_) => "graph",
        }
    }
}
