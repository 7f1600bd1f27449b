//! Conformance suite run against the in-memory reference executor.

use lamina_exec::ReferenceExecutor;
use lamina_executor_conformance::executor_conformance_tests;

executor_conformance_tests!(ReferenceExecutor::new());
