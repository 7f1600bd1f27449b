//! Test fixtures for the executor conformance suite.
//!
//! Each fixture returns a wire computation (or type) an executor must
//! be able to embed, independent of how the executor evaluates it.

use lamina_core::{DType, TupleElement, Type};
use lamina_interchange::{
    encode_graph_bytes, serialize_type, TupleBinding, WireBinding, WireComputation, WireGraph,
};

/// An identity lambda of type `(T -> T)` whose body is a bare
/// reference to the parameter.
pub fn identity_lambda_computation(t: &Type) -> WireComputation {
    WireComputation::lambda(
        "a",
        WireComputation::reference("a", serialize_type(t)),
        serialize_type(&Type::unary_op(t.clone())),
    )
}

/// A graph computation of type `( -> <>)`: empty graph bytes, no
/// parameter binding, empty-tuple result binding.
pub fn empty_graph_computation() -> WireComputation {
    let fragment = WireGraph {
        graph_def: encode_graph_bytes(b""),
        parameter: None,
        result: WireBinding::Tuple(TupleBinding { element: vec![] }),
    };
    WireComputation::graph(
        fragment,
        serialize_type(&Type::function(None, Type::unit())),
    )
}

/// The workhorse named-tuple type:
/// `<x=int32,y=string,float32,z=bool>`.
pub fn example_tuple_type() -> Type {
    Type::tuple(vec![
        TupleElement::named("x", Type::tensor(DType::Int32)),
        TupleElement::named("y", Type::tensor(DType::String)),
        TupleElement::unnamed(Type::tensor(DType::Float32)),
        TupleElement::named("z", Type::tensor(DType::Bool)),
    ])
}
