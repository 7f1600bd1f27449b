//! The `executor_conformance_tests!` macro.
//!
//! This macro generates 10 `#[tokio::test]` functions — one per
//! executor obligation C1 through C10 — for any expression producing a
//! `lamina_exec::Executor`.
//!
//! # Usage
//!
//! ```rust,ignore
//! use lamina_executor_conformance::executor_conformance_tests;
//!
//! executor_conformance_tests!(MyExecutor::new());
//! ```
//!
//! Each generated test function is named `conformance_cNN_<description>`
//! and can be run with `cargo test conformance_` to execute the full
//! suite.

/// Generate conformance tests for an executor implementation.
///
/// The `$executor_expr` expression is evaluated fresh for each test
/// (twice for the ownership obligation, which needs two independent
/// instances), so tests can run in any order.
#[macro_export]
macro_rules! executor_conformance_tests {
    ($executor_expr:expr) => {
        #[tokio::test]
        async fn conformance_c01_value_round_trip() {
            let executor = $executor_expr;
            $crate::checks::c01_value_round_trip::check_c01_value_round_trip(&executor)
                .await
                .expect("C1: value round trip conformance failed");
        }

        #[tokio::test]
        async fn conformance_c02_type_spec() {
            let executor = $executor_expr;
            $crate::checks::c02_type_spec::check_c02_type_spec(&executor)
                .await
                .expect("C2: type-spec enforcement conformance failed");
        }

        #[tokio::test]
        async fn conformance_c03_identity_call() {
            let executor = $executor_expr;
            $crate::checks::c03_identity_call::check_c03_identity_call(&executor)
                .await
                .expect("C3: identity call conformance failed");
        }

        #[tokio::test]
        async fn conformance_c04_call_contract() {
            let executor = $executor_expr;
            $crate::checks::c04_call_contract::check_c04_call_contract(&executor)
                .await
                .expect("C4: call contract conformance failed");
        }

        #[tokio::test]
        async fn conformance_c05_tuple_structure() {
            let executor = $executor_expr;
            $crate::checks::c05_tuple_structure::check_c05_tuple_structure(&executor)
                .await
                .expect("C5: tuple structure conformance failed");
        }

        #[tokio::test]
        async fn conformance_c06_selection_contract() {
            let executor = $executor_expr;
            $crate::checks::c06_selection_contract::check_c06_selection_contract(&executor)
                .await
                .expect("C6: selection contract conformance failed");
        }

        #[tokio::test]
        async fn conformance_c07_closed_executor() {
            let executor = $executor_expr;
            $crate::checks::c07_closed_executor::check_c07_closed_executor(&executor)
                .await
                .expect("C7: closed executor conformance failed");
        }

        #[tokio::test]
        async fn conformance_c08_foreign_handle() {
            let executor = $executor_expr;
            let other = $executor_expr;
            $crate::checks::c08_foreign_handle::check_c08_foreign_handle(&executor, &other)
                .await
                .expect("C8: handle ownership conformance failed");
        }

        #[tokio::test]
        async fn conformance_c09_empty_sequence() {
            let executor = $executor_expr;
            $crate::checks::c09_empty_sequence::check_c09_empty_sequence(&executor)
                .await
                .expect("C9: empty sequence conformance failed");
        }

        #[tokio::test]
        async fn conformance_c10_wire_round_trip() {
            let executor = $executor_expr;
            $crate::checks::c10_wire_round_trip::check_c10_wire_round_trip(&executor)
                .await
                .expect("C10: wire round trip conformance failed");
        }
    };
}
