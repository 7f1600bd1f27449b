//! C10: wire round-trip obligation.
//!
//! Wire computations MUST embed with their declared type and survive a
//! JSON round trip unchanged; types MUST round-trip through
//! serialize/deserialize into structural identity.

use crate::fixtures;
use lamina_exec::{Executor, RawValue};
use lamina_interchange::{deserialize_type, serialize_type, WireComputation};

/// C10: graph and lambda fixtures embed and round-trip.
pub async fn check_c10_wire_round_trip<E: Executor>(executor: &E) -> Result<(), String> {
    let graph = fixtures::empty_graph_computation();
    let handle = executor
        .create_value(RawValue::Computation(graph.clone()), None)
        .await
        .map_err(|e| format!("C10: embedding the empty graph failed: {}", e))?;
    if handle.type_signature().to_string() != "( -> <>)" {
        return Err(format!(
            "C10: graph handle carries '{}', expected '( -> <>)'",
            handle.type_signature()
        ));
    }

    let json = serde_json::to_string(&graph)
        .map_err(|e| format!("C10: serializing the graph node failed: {}", e))?;
    let decoded: WireComputation = serde_json::from_str(&json)
        .map_err(|e| format!("C10: decoding the graph node failed: {}", e))?;
    if decoded != graph {
        return Err("C10: graph node changed across a JSON round trip".to_string());
    }

    let tuple_type = fixtures::example_tuple_type();
    let round_tripped = deserialize_type(&serialize_type(&tuple_type))
        .map_err(|e| format!("C10: deserialize_type failed: {}", e))?;
    if round_tripped != tuple_type {
        return Err(format!(
            "C10: type round trip yielded '{}', expected '{}'",
            round_tripped, tuple_type
        ));
    }
    if !tuple_type.is_assignable_from(&round_tripped)
        || !round_tripped.is_assignable_from(&tuple_type)
    {
        return Err("C10: round-tripped type is not mutually assignable".to_string());
    }

    Ok(())
}
