//! Conformance checks C1 through C10, one module per obligation.

pub mod c01_value_round_trip;
pub mod c02_type_spec;
pub mod c03_identity_call;
pub mod c04_call_contract;
pub mod c05_tuple_structure;
pub mod c06_selection_contract;
pub mod c07_closed_executor;
pub mod c08_foreign_handle;
pub mod c09_empty_sequence;
pub mod c10_wire_round_trip;
