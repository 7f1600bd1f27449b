//! Structural translation between the in-memory type model and the
//! wire format, plus the well-formedness pass for graph-fragment
//! bindings.
//!
//! The round-trip law: for any `Type` `t`,
//! `deserialize_type(&serialize_type(&t))` is structurally equal to
//! `t` and mutually assignable with it.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use lamina_core::{DType, Dim, Shape, TupleElement, Type};
use sha2::{Digest, Sha256};
use std::fmt;

use crate::types::*;

// ──────────────────────────────────────────────
// Errors
// ──────────────────────────────────────────────

/// Errors during wire-format translation and validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SerializationError {
    /// The dtype enum name is not part of the model.
    UnknownDType { name: String },
    /// A dimension size other than `-1` was negative.
    InvalidDimension { size: i64 },
    /// The message structure is invalid (bad base64, missing variant,
    /// malformed node).
    Malformed { message: String },
    /// A graph fragment's bindings disagree with its declared type.
    BindingMismatch { message: String },
}

impl fmt::Display for SerializationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SerializationError::UnknownDType { name } => {
                write!(f, "unknown dtype: '{}'", name)
            }
            SerializationError::InvalidDimension { size } => {
                write!(f, "invalid dimension size: {}", size)
            }
            SerializationError::Malformed { message } => {
                write!(f, "malformed message: {}", message)
            }
            SerializationError::BindingMismatch { message } => {
                write!(f, "binding mismatch: {}", message)
            }
        }
    }
}

impl std::error::Error for SerializationError {}

// ──────────────────────────────────────────────
// Type serialization
// ──────────────────────────────────────────────

/// Encode a type signature into its wire representation.
pub fn serialize_type(t: &Type) -> WireType {
    match t {
        Type::Tensor { dtype, shape } => WireType::Tensor(WireTensor {
            dtype: dtype.wire_name().to_string(),
            shape: serialize_shape(shape),
        }),
        Type::Sequence(element) => WireType::Sequence(Box::new(WireSequence {
            element: serialize_type(element),
        })),
        Type::Tuple(elements) => WireType::Tuple(WireTuple {
            element: elements
                .iter()
                .map(|e| WireTupleElement {
                    name: e.name.clone(),
                    value: serialize_type(&e.value),
                })
                .collect(),
        }),
        Type::Function { parameter, result } => WireType::Function(Box::new(WireFunction {
            parameter: parameter.as_deref().map(serialize_type),
            result: serialize_type(result),
        })),
    }
}

fn serialize_shape(shape: &Shape) -> WireShape {
    WireShape {
        dim: shape
            .dims
            .iter()
            .map(|d| WireDim {
                size: match d {
                    Dim::Size(n) => *n as i64,
                    Dim::Unknown => -1,
                },
            })
            .collect(),
    }
}

/// Decode a wire type into the in-memory model. The structural
/// inverse of [`serialize_type`].
pub fn deserialize_type(wire: &WireType) -> Result<Type, SerializationError> {
    match wire {
        WireType::Tensor(tensor) => {
            let dtype = DType::from_wire_name(&tensor.dtype).ok_or_else(|| {
                SerializationError::UnknownDType {
                    name: tensor.dtype.clone(),
                }
            })?;
            let mut dims = Vec::with_capacity(tensor.shape.dim.len());
            for dim in &tensor.shape.dim {
                match dim.size {
                    -1 => dims.push(Dim::Unknown),
                    n if n >= 0 => dims.push(Dim::Size(n as u64)),
                    n => return Err(SerializationError::InvalidDimension { size: n }),
                }
            }
            Ok(Type::Tensor {
                dtype,
                shape: Shape { dims },
            })
        }
        WireType::Sequence(sequence) => {
            Ok(Type::sequence(deserialize_type(&sequence.element)?))
        }
        WireType::Tuple(tuple) => {
            let mut elements = Vec::with_capacity(tuple.element.len());
            for element in &tuple.element {
                elements.push(TupleElement {
                    name: element.name.clone(),
                    value: deserialize_type(&element.value)?,
                });
            }
            Ok(Type::Tuple(elements))
        }
        WireType::Function(function) => {
            let parameter = match &function.parameter {
                Some(p) => Some(deserialize_type(p)?),
                None => None,
            };
            Ok(Type::function(parameter, deserialize_type(&function.result)?))
        }
    }
}

// ──────────────────────────────────────────────
// Graph fragments
// ──────────────────────────────────────────────

/// Encode opaque graph bytes for embedding in a wire message.
pub fn encode_graph_bytes(bytes: &[u8]) -> String {
    BASE64.encode(bytes)
}

/// Decode the opaque graph bytes of a fragment.
pub fn decode_graph_bytes(graph_def: &str) -> Result<Vec<u8>, SerializationError> {
    BASE64
        .decode(graph_def)
        .map_err(|e| SerializationError::Malformed {
            message: format!("graph_def is not valid base64: {}", e),
        })
}

/// Validate that a graph fragment's parameter/result bindings are
/// structurally consistent with the declared function type. The graph
/// bytes themselves are never interpreted.
pub fn check_graph_bindings(
    fragment: &WireGraph,
    declared: &Type,
) -> Result<(), SerializationError> {
    let (parameter, result) = match declared {
        Type::Function { parameter, result } => (parameter, result),
        other => {
            return Err(SerializationError::BindingMismatch {
                message: format!("graph fragment declared with non-function type {}", other),
            })
        }
    };
    match (parameter, &fragment.parameter) {
        (None, None) => {}
        (Some(_), None) => {
            return Err(SerializationError::BindingMismatch {
                message: "declared parameter has no binding".to_string(),
            })
        }
        (None, Some(_)) => {
            return Err(SerializationError::BindingMismatch {
                message: "parameter binding present but no parameter declared".to_string(),
            })
        }
        (Some(parameter), Some(binding)) => check_binding(binding, parameter)?,
    }
    check_binding(&fragment.result, result)
}

fn check_binding(binding: &WireBinding, declared: &Type) -> Result<(), SerializationError> {
    match (binding, declared) {
        (WireBinding::Tensor(_), Type::Tensor { .. }) => Ok(()),
        (WireBinding::Sequence(_), Type::Sequence(_)) => Ok(()),
        (WireBinding::Tuple(tuple), Type::Tuple(elements)) => {
            if tuple.element.len() != elements.len() {
                return Err(SerializationError::BindingMismatch {
                    message: format!(
                        "tuple binding has {} elements, declared type {} has {}",
                        tuple.element.len(),
                        Type::Tuple(elements.clone()),
                        elements.len()
                    ),
                });
            }
            for (binding, element) in tuple.element.iter().zip(elements.iter()) {
                check_binding(binding, &element.value)?;
            }
            Ok(())
        }
        (binding, declared) => Err(SerializationError::BindingMismatch {
            message: format!(
                "binding {} does not match declared type {}",
                binding_kind(binding),
                declared
            ),
        }),
    }
}

fn binding_kind(binding: &WireBinding) -> &'static str {
    match binding {
        WireBinding::Tensor(_) => "tensor",
        WireBinding::Sequence(_) => "sequence",
        WireBinding::Tuple(_) => "tuple",
    }
}

// ──────────────────────────────────────────────
// Graph compilation boundary
// ──────────────────────────────────────────────

/// Output of an external graph compiler: opaque bytes plus the
/// bindings and result type the fragment exposes.
#[derive(Debug, Clone)]
pub struct CompiledGraph {
    pub graph_bytes: Vec<u8>,
    pub parameter: Option<WireBinding>,
    pub result: WireBinding,
    pub result_type: Type,
}

/// Narrow interface to the external tensor runtime's compiler. The
/// runtime itself is out of scope; implementations translate a host
/// function (identified by `source`) into an opaque fragment.
pub trait GraphCompiler {
    fn compile(
        &self,
        source: &str,
        parameter_type: Option<&Type>,
    ) -> Result<CompiledGraph, SerializationError>;
}

/// Compile a host function into a graph computation node.
///
/// The resulting node's type is `(parameter -> result)`, or
/// `( -> result)` when no parameter type is declared. The fragment's
/// bindings are checked against that type before the node is built.
pub fn serialize_graph_fn(
    compiler: &dyn GraphCompiler,
    source: &str,
    parameter_type: Option<&Type>,
) -> Result<WireComputation, SerializationError> {
    let compiled = compiler.compile(source, parameter_type)?;
    let function_type = Type::function(parameter_type.cloned(), compiled.result_type.clone());
    let fragment = WireGraph {
        graph_def: encode_graph_bytes(&compiled.graph_bytes),
        parameter: compiled.parameter,
        result: compiled.result,
    };
    check_graph_bindings(&fragment, &function_type)?;
    Ok(WireComputation::graph(
        fragment,
        serialize_type(&function_type),
    ))
}

// ──────────────────────────────────────────────
// Content digests
// ──────────────────────────────────────────────

/// SHA-256 digest of a computation's compact JSON representation.
/// Remote collaborators use this to detect artifact drift.
pub fn computation_digest(computation: &WireComputation) -> Result<String, SerializationError> {
    let canonical =
        serde_json::to_string(computation).map_err(|e| SerializationError::Malformed {
            message: format!("computation is not serializable: {}", e),
        })?;
    let hash = Sha256::digest(canonical.as_bytes());
    Ok(format!("{:x}", hash))
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(types: &[Type]) {
        for t in types {
            let wire = serialize_type(t);
            let back = deserialize_type(&wire).unwrap();
            assert_eq!(&back, t);
            assert_eq!(serialize_type(&back), wire);
            assert!(t.is_assignable_from(&back));
            assert!(back.is_assignable_from(t));
        }
    }

    #[test]
    fn roundtrip_tensor_types() {
        roundtrip(&[
            Type::tensor(DType::Int32),
            Type::tensor_shaped(DType::Int32, Shape::of(&[10])),
            Type::tensor_shaped(
                DType::Int32,
                Shape {
                    dims: vec![Dim::Unknown],
                },
            ),
        ]);
    }

    #[test]
    fn roundtrip_sequence_types() {
        roundtrip(&[
            Type::sequence(Type::tensor(DType::Int32)),
            Type::sequence(Type::tuple(vec![
                TupleElement::unnamed(Type::tensor(DType::Int32)),
                TupleElement::unnamed(Type::tensor(DType::Bool)),
            ])),
            Type::sequence(Type::tuple(vec![
                TupleElement::unnamed(Type::tensor(DType::Int32)),
                TupleElement::unnamed(Type::sequence(Type::tensor(DType::Bool))),
            ])),
        ]);
    }

    #[test]
    fn roundtrip_named_tuple_types() {
        roundtrip(&[
            Type::tuple(vec![
                TupleElement::unnamed(Type::tensor(DType::Int32)),
                TupleElement::unnamed(Type::tensor(DType::Bool)),
            ]),
            Type::tuple(vec![
                TupleElement::unnamed(Type::tensor(DType::Int32)),
                TupleElement::named("x", Type::tensor(DType::Bool)),
            ]),
            Type::tuple(vec![TupleElement::named("x", Type::tensor(DType::Int32))]),
        ]);
    }

    #[test]
    fn roundtrip_function_types() {
        roundtrip(&[
            Type::function(Some(Type::tensor(DType::Int32)), Type::tensor(DType::Bool)),
            Type::function(None, Type::tensor(DType::Bool)),
            Type::function(None, Type::unit()),
        ]);
    }

    #[test]
    fn tensor_wire_form() {
        let wire = serialize_type(&Type::tensor_shaped(DType::Int32, Shape::of(&[10, 20])));
        assert_eq!(
            serde_json::to_value(&wire).unwrap(),
            serde_json::json!({
                "tensor": { "dtype": "DT_INT32", "shape": { "dim": [ { "size": 10 }, { "size": 20 } ] } }
            })
        );
    }

    #[test]
    fn unknown_dimension_encodes_as_minus_one() {
        let t = Type::tensor_shaped(
            DType::Int32,
            Shape {
                dims: vec![Dim::Unknown],
            },
        );
        let wire = serialize_type(&t);
        assert_eq!(
            serde_json::to_value(&wire).unwrap(),
            serde_json::json!({
                "tensor": { "dtype": "DT_INT32", "shape": { "dim": [ { "size": -1 } ] } }
            })
        );
    }

    #[test]
    fn named_tuple_wire_form_preserves_order_and_name_presence() {
        // [('x', int32), ('y', string), float32, ('z', bool)]
        let t = Type::tuple(vec![
            TupleElement::named("x", Type::tensor(DType::Int32)),
            TupleElement::named("y", Type::tensor(DType::String)),
            TupleElement::unnamed(Type::tensor(DType::Float32)),
            TupleElement::named("z", Type::tensor(DType::Bool)),
        ]);
        let wire = serialize_type(&t);
        let json = serde_json::to_value(&wire).unwrap();
        let elements = json["tuple"]["element"].as_array().unwrap();
        assert_eq!(elements.len(), 4);
        assert_eq!(elements[0]["name"], "x");
        assert_eq!(elements[1]["name"], "y");
        assert!(elements[2].get("name").is_none());
        assert_eq!(elements[3]["name"], "z");
        assert_eq!(elements[1]["value"]["tensor"]["dtype"], "DT_STRING");
        // And back.
        let back = deserialize_type(&wire).unwrap();
        assert_eq!(back, t);
    }

    #[test]
    fn function_wire_form_with_tuple_parameter() {
        let t = Type::function(
            Some(Type::tuple(vec![
                TupleElement::unnamed(Type::tensor(DType::Int32)),
                TupleElement::unnamed(Type::tensor(DType::Int32)),
            ])),
            Type::tensor(DType::Bool),
        );
        let json = serde_json::to_value(serialize_type(&t)).unwrap();
        assert_eq!(
            json["function"]["parameter"]["tuple"]["element"]
                .as_array()
                .unwrap()
                .len(),
            2
        );
        assert_eq!(json["function"]["result"]["tensor"]["dtype"], "DT_BOOL");
    }

    #[test]
    fn unknown_dtype_is_rejected() {
        let wire = WireType::Tensor(WireTensor {
            dtype: "DT_COMPLEX64".to_string(),
            shape: WireShape::default(),
        });
        assert_eq!(
            deserialize_type(&wire),
            Err(SerializationError::UnknownDType {
                name: "DT_COMPLEX64".to_string()
            })
        );
    }

    #[test]
    fn negative_dimension_other_than_minus_one_is_rejected() {
        let wire = WireType::Tensor(WireTensor {
            dtype: "DT_INT32".to_string(),
            shape: WireShape {
                dim: vec![WireDim { size: -7 }],
            },
        });
        assert_eq!(
            deserialize_type(&wire),
            Err(SerializationError::InvalidDimension { size: -7 })
        );
    }

    #[test]
    fn unknown_oneof_variant_is_a_decode_error() {
        let json = serde_json::json!({ "widget": { "dtype": "DT_INT32" } });
        assert!(serde_json::from_value::<WireType>(json).is_err());
    }

    #[test]
    fn graph_bindings_must_match_declared_type() {
        let fragment = WireGraph {
            graph_def: encode_graph_bytes(b""),
            parameter: None,
            result: WireBinding::Tuple(TupleBinding { element: vec![] }),
        };
        // ( -> <>) matches.
        check_graph_bindings(&fragment, &Type::function(None, Type::unit())).unwrap();
        // ( -> int32) does not: tuple binding vs tensor type.
        let err =
            check_graph_bindings(&fragment, &Type::function(None, Type::tensor(DType::Int32)))
                .unwrap_err();
        assert!(matches!(err, SerializationError::BindingMismatch { .. }));
        // A declared parameter requires a binding.
        let err = check_graph_bindings(
            &fragment,
            &Type::function(Some(Type::tensor(DType::Int32)), Type::unit()),
        )
        .unwrap_err();
        assert!(matches!(err, SerializationError::BindingMismatch { .. }));
    }

    #[test]
    fn sequence_parameter_binds_to_iterator_handle() {
        let fragment = WireGraph {
            graph_def: encode_graph_bytes(b"\x01\x02"),
            parameter: Some(WireBinding::Sequence(SequenceBinding {
                iterator_handle_name: "input_iterator:0".to_string(),
            })),
            result: WireBinding::Tensor(TensorBinding {
                tensor_name: "sum:0".to_string(),
            }),
        };
        let declared = Type::function(
            Some(Type::sequence(Type::tensor(DType::Int64))),
            Type::tensor(DType::Int64),
        );
        check_graph_bindings(&fragment, &declared).unwrap();
        // Swapping the bindings fails both ways.
        let swapped = WireGraph {
            graph_def: fragment.graph_def.clone(),
            parameter: Some(fragment.result.clone()),
            result: fragment.parameter.clone().unwrap(),
        };
        assert!(check_graph_bindings(&swapped, &declared).is_err());
    }

    struct StubCompiler;

    impl GraphCompiler for StubCompiler {
        fn compile(
            &self,
            _source: &str,
            parameter_type: Option<&Type>,
        ) -> Result<CompiledGraph, SerializationError> {
            Ok(CompiledGraph {
                graph_bytes: b"stub-graph".to_vec(),
                parameter: parameter_type.map(|_| {
                    WireBinding::Tensor(TensorBinding {
                        tensor_name: "arg:0".to_string(),
                    })
                }),
                result: WireBinding::Tensor(TensorBinding {
                    tensor_name: "out:0".to_string(),
                }),
                result_type: Type::tensor(DType::Int32),
            })
        }
    }

    #[test]
    fn serialize_graph_fn_builds_a_typed_graph_node() {
        let comp = serialize_graph_fn(
            &StubCompiler,
            "add_three",
            Some(&Type::tensor(DType::Int32)),
        )
        .unwrap();
        assert_eq!(comp.kind_name(), "graph");
        let t = deserialize_type(&comp.type_signature).unwrap();
        assert_eq!(t.to_string(), "(int32 -> int32)");
        match &comp.kind {
            WireComputationKind::Graph(fragment) => {
                assert!(fragment.parameter.is_some());
                assert_eq!(decode_graph_bytes(&fragment.graph_def).unwrap(), b"stub-graph");
            }
            other => panic!("expected graph node, got {:?}", other),
        }
    }

    #[test]
    fn serialize_graph_fn_without_parameter() {
        let comp = serialize_graph_fn(&StubCompiler, "const_99", None).unwrap();
        let t = deserialize_type(&comp.type_signature).unwrap();
        assert_eq!(t.to_string(), "( -> int32)");
        match &comp.kind {
            WireComputationKind::Graph(fragment) => assert!(fragment.parameter.is_none()),
            other => panic!("expected graph node, got {:?}", other),
        }
    }

    #[test]
    fn computation_wire_json_round_trips() {
        let int32 = serialize_type(&Type::tensor(DType::Int32));
        let fn_type = serialize_type(&Type::unary_op(Type::tensor(DType::Int32)));
        let identity = WireComputation::lambda(
            "a",
            WireComputation::reference("a", int32),
            fn_type,
        );
        let json = serde_json::to_value(&identity).unwrap();
        assert!(json.get("lambda").is_some());
        assert!(json.get("type").is_some());
        let back: WireComputation = serde_json::from_value(json).unwrap();
        assert_eq!(back, identity);
    }

    #[test]
    fn digest_is_stable_and_content_sensitive() {
        let int32 = serialize_type(&Type::tensor(DType::Int32));
        let a = WireComputation::reference("a", int32.clone());
        let b = WireComputation::reference("b", int32.clone());
        let digest_a = computation_digest(&a).unwrap();
        assert_eq!(digest_a, computation_digest(&a).unwrap());
        assert_ne!(digest_a, computation_digest(&b).unwrap());
        assert_eq!(digest_a.len(), 64);
    }

    #[test]
    fn invalid_base64_is_malformed() {
        assert!(matches!(
            decode_graph_bytes("not@@base64"),
            Err(SerializationError::Malformed { .. })
        ));
    }
}
