//! The reference interpreter: an in-memory executor over embedded
//! literals and computation nodes.
//!
//! Lambdas are evaluated structurally with lexically captured scopes.
//! Opaque graph fragments are never interpreted here; calling one
//! delegates to the configured [`GraphRuntime`].

use async_trait::async_trait;
use lamina_core::{Type, TupleElement};
use lamina_interchange::{
    check_graph_bindings, deserialize_type, SerializationError, WireComputation,
    WireComputationKind, WireGraph,
};
use std::any::Any;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::ExecError;
use crate::executor::{Executor, GraphRuntime};
use crate::value::{ExecutorId, ExecutorValue, Materialized, RawValue, TensorLiteral, ValueHandle};

// ──────────────────────────────────────────────
// Executor state
// ──────────────────────────────────────────────

struct RefShared {
    id: ExecutorId,
    closed: AtomicBool,
}

/// In-memory reference executor.
pub struct ReferenceExecutor {
    shared: Arc<RefShared>,
    graph_runtime: Option<Arc<dyn GraphRuntime>>,
}

impl ReferenceExecutor {
    pub fn new() -> ReferenceExecutor {
        ReferenceExecutor {
            shared: Arc::new(RefShared {
                id: ExecutorId::fresh(),
                closed: AtomicBool::new(false),
            }),
            graph_runtime: None,
        }
    }

    /// A reference executor that dispatches graph-fragment calls to
    /// the given runtime.
    pub fn with_graph_runtime(runtime: Arc<dyn GraphRuntime>) -> ReferenceExecutor {
        ReferenceExecutor {
            shared: Arc::new(RefShared {
                id: ExecutorId::fresh(),
                closed: AtomicBool::new(false),
            }),
            graph_runtime: Some(runtime),
        }
    }

    fn check_open(&self) -> Result<(), ExecError> {
        if self.shared.closed.load(Ordering::SeqCst) {
            return Err(ExecError::ClosedExecutor);
        }
        Ok(())
    }

    /// Verify ownership and recover the concrete value.
    fn own(&self, handle: &ValueHandle) -> Result<Arc<RefValue>, ExecError> {
        if handle.owner() != self.shared.id {
            return Err(ExecError::ForeignHandle);
        }
        handle.downcast::<RefValue>().ok_or(ExecError::ForeignHandle)
    }

    fn wrap(&self, value: Arc<RefValue>) -> ValueHandle {
        ValueHandle::new(self.shared.id, value)
    }
}

impl Default for ReferenceExecutor {
    fn default() -> Self {
        ReferenceExecutor::new()
    }
}

// ──────────────────────────────────────────────
// Embedded values
// ──────────────────────────────────────────────

type Scope = Vec<(String, Arc<RefValue>)>;

struct RefValue {
    shared: Arc<RefShared>,
    type_signature: Type,
    payload: RefPayload,
}

#[derive(Clone)]
enum RefPayload {
    Literal(TensorLiteral),
    Sequence(Vec<Arc<RefValue>>),
    Tuple(Vec<(Option<String>, Arc<RefValue>)>),
    Function(RefFunction),
}

#[derive(Clone)]
enum RefFunction {
    Lambda {
        parameter_name: String,
        body: WireComputation,
        env: Scope,
    },
    Graph(WireGraph),
}

impl RefValue {
    fn materialize(&self) -> Result<Materialized, ExecError> {
        match &self.payload {
            RefPayload::Literal(literal) => Ok(Materialized::Tensor(literal.clone())),
            RefPayload::Sequence(elements) => Ok(Materialized::Sequence(
                elements
                    .iter()
                    .map(|e| e.materialize())
                    .collect::<Result<_, _>>()?,
            )),
            RefPayload::Tuple(elements) => {
                let mut materialized = Vec::with_capacity(elements.len());
                for (name, value) in elements {
                    materialized.push((name.clone(), value.materialize()?));
                }
                Ok(Materialized::Tuple(materialized))
            }
            RefPayload::Function(_) => Err(ExecError::TypeMismatch {
                expected: "a materializable value".to_string(),
                actual: self.type_signature.to_string(),
            }),
        }
    }
}

#[async_trait]
impl ExecutorValue for RefValue {
    fn type_signature(&self) -> &Type {
        &self.type_signature
    }

    async fn compute(&self) -> Result<Materialized, ExecError> {
        if self.shared.closed.load(Ordering::SeqCst) {
            return Err(ExecError::ClosedExecutor);
        }
        self.materialize()
    }

    fn as_any_arc(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

// ──────────────────────────────────────────────
// Embedding
// ──────────────────────────────────────────────

fn embed_raw(shared: &Arc<RefShared>, value: RawValue) -> Result<Arc<RefValue>, ExecError> {
    match value {
        RawValue::Literal(literal) => Ok(Arc::new(RefValue {
            shared: Arc::clone(shared),
            type_signature: Type::tensor(literal.dtype()),
            payload: RefPayload::Literal(literal),
        })),
        RawValue::Computation(computation) => embed_computation(shared, &computation, &[]),
        RawValue::Tuple(elements) => {
            let mut embedded = Vec::with_capacity(elements.len());
            let mut types = Vec::with_capacity(elements.len());
            for (name, value) in elements {
                let value = embed_raw(shared, value)?;
                types.push(TupleElement {
                    name: name.clone(),
                    value: value.type_signature.clone(),
                });
                embedded.push((name, value));
            }
            Ok(Arc::new(RefValue {
                shared: Arc::clone(shared),
                type_signature: Type::Tuple(types),
                payload: RefPayload::Tuple(embedded),
            }))
        }
        RawValue::Sequence(elements) => {
            let mut embedded = Vec::with_capacity(elements.len());
            for value in elements {
                embedded.push(embed_raw(shared, value)?);
            }
            let element_type = match embedded.first() {
                Some(first) => first.type_signature.clone(),
                None => {
                    return Err(ExecError::TypeMismatch {
                        expected: "a type spec for an empty sequence".to_string(),
                        actual: "no elements to infer from".to_string(),
                    })
                }
            };
            Ok(Arc::new(RefValue {
                shared: Arc::clone(shared),
                type_signature: Type::sequence(element_type),
                payload: RefPayload::Sequence(embedded),
            }))
        }
    }
}

fn embed_computation(
    shared: &Arc<RefShared>,
    computation: &WireComputation,
    scope: &[(String, Arc<RefValue>)],
) -> Result<Arc<RefValue>, ExecError> {
    let declared = deserialize_type(&computation.type_signature)?;
    match &computation.kind {
        WireComputationKind::Reference(reference) => scope
            .iter()
            .rev()
            .find(|(name, _)| name == &reference.name)
            .map(|(_, value)| Arc::clone(value))
            .ok_or_else(|| {
                ExecError::Serialization(SerializationError::Malformed {
                    message: format!("unbound reference '{}'", reference.name),
                })
            }),
        WireComputationKind::Lambda(lambda) => {
            if !declared.is_function() {
                return Err(ExecError::Serialization(SerializationError::Malformed {
                    message: format!("lambda node declared with non-function type {}", declared),
                }));
            }
            Ok(Arc::new(RefValue {
                shared: Arc::clone(shared),
                type_signature: declared,
                payload: RefPayload::Function(RefFunction::Lambda {
                    parameter_name: lambda.parameter_name.clone(),
                    body: lambda.result.clone(),
                    env: scope.to_vec(),
                }),
            }))
        }
        WireComputationKind::Tuple(tuple) => {
            let mut embedded = Vec::with_capacity(tuple.element.len());
            let mut types = Vec::with_capacity(tuple.element.len());
            for element in &tuple.element {
                let value = embed_computation(shared, &element.value, scope)?;
                types.push(TupleElement {
                    name: element.name.clone(),
                    value: value.type_signature.clone(),
                });
                embedded.push((element.name.clone(), value));
            }
            Ok(Arc::new(RefValue {
                shared: Arc::clone(shared),
                type_signature: Type::Tuple(types),
                payload: RefPayload::Tuple(embedded),
            }))
        }
        WireComputationKind::Selection(selection) => {
            let source = embed_computation(shared, &selection.source, scope)?;
            select_element(
                &source,
                selection.index.map(|i| i as usize),
                selection.name.as_deref(),
            )
        }
        WireComputationKind::Graph(fragment) => {
            check_graph_bindings(fragment, &declared)?;
            Ok(Arc::new(RefValue {
                shared: Arc::clone(shared),
                type_signature: declared,
                payload: RefPayload::Function(RefFunction::Graph(fragment.clone())),
            }))
        }
    }
}

/// Select one tuple element. Duplicate names resolve to the first
/// matching position.
fn select_element(
    source: &Arc<RefValue>,
    index: Option<usize>,
    name: Option<&str>,
) -> Result<Arc<RefValue>, ExecError> {
    let elements = match &source.payload {
        RefPayload::Tuple(elements) => elements,
        _ => {
            return Err(ExecError::Selection {
                message: format!("source of type {} is not a tuple", source.type_signature),
            })
        }
    };
    match (index, name) {
        (Some(_), Some(_)) => Err(ExecError::Selection {
            message: "both index and name given".to_string(),
        }),
        (None, None) => Err(ExecError::Selection {
            message: "neither index nor name given".to_string(),
        }),
        (Some(index), None) => elements
            .get(index)
            .map(|(_, value)| Arc::clone(value))
            .ok_or_else(|| ExecError::Selection {
                message: format!(
                    "index {} out of range for type {}",
                    index, source.type_signature
                ),
            }),
        (None, Some(name)) => elements
            .iter()
            .find(|(element_name, _)| element_name.as_deref() == Some(name))
            .map(|(_, value)| Arc::clone(value))
            .ok_or_else(|| ExecError::Selection {
                message: format!(
                    "no element named '{}' in type {}",
                    name, source.type_signature
                ),
            }),
    }
}

/// Re-wrap an embedded value under a wider declared type, renaming
/// tuple elements to the declared names all the way down. Assignability
/// has already been checked, so structures agree.
fn with_declared_type(
    shared: &Arc<RefShared>,
    value: &Arc<RefValue>,
    declared: &Type,
) -> Arc<RefValue> {
    let payload = match (&value.payload, declared) {
        (RefPayload::Tuple(elements), Type::Tuple(element_types))
            if elements.len() == element_types.len() =>
        {
            RefPayload::Tuple(
                elements
                    .iter()
                    .zip(element_types.iter())
                    .map(|((_, element), declared)| {
                        (
                            declared.name.clone(),
                            with_declared_type(shared, element, &declared.value),
                        )
                    })
                    .collect(),
            )
        }
        (RefPayload::Sequence(elements), Type::Sequence(element_type)) => RefPayload::Sequence(
            elements
                .iter()
                .map(|element| with_declared_type(shared, element, element_type))
                .collect(),
        ),
        (payload, _) => payload.clone(),
    };
    Arc::new(RefValue {
        shared: Arc::clone(shared),
        type_signature: declared.clone(),
        payload,
    })
}

/// Re-embed a runtime result under its declared type, verifying the
/// structure agrees.
fn from_materialized(
    shared: &Arc<RefShared>,
    declared: &Type,
    value: Materialized,
) -> Result<Arc<RefValue>, ExecError> {
    match (value, declared) {
        (Materialized::Tensor(literal), Type::Tensor { dtype, .. }) => {
            if literal.dtype() != *dtype {
                return Err(ExecError::TypeMismatch {
                    expected: declared.to_string(),
                    actual: literal.dtype().to_string(),
                });
            }
            Ok(Arc::new(RefValue {
                shared: Arc::clone(shared),
                type_signature: declared.clone(),
                payload: RefPayload::Literal(literal),
            }))
        }
        (Materialized::Sequence(items), Type::Sequence(element_type)) => {
            let mut elements = Vec::with_capacity(items.len());
            for item in items {
                elements.push(from_materialized(shared, element_type, item)?);
            }
            Ok(Arc::new(RefValue {
                shared: Arc::clone(shared),
                type_signature: declared.clone(),
                payload: RefPayload::Sequence(elements),
            }))
        }
        (Materialized::Tuple(items), Type::Tuple(element_types)) => {
            if items.len() != element_types.len() {
                return Err(ExecError::TypeMismatch {
                    expected: declared.to_string(),
                    actual: format!("tuple of {} elements", items.len()),
                });
            }
            let mut elements = Vec::with_capacity(items.len());
            for ((_, item), element_type) in items.into_iter().zip(element_types.iter()) {
                elements.push((
                    element_type.name.clone(),
                    from_materialized(shared, &element_type.value, item)?,
                ));
            }
            Ok(Arc::new(RefValue {
                shared: Arc::clone(shared),
                type_signature: declared.clone(),
                payload: RefPayload::Tuple(elements),
            }))
        }
        (value, declared) => Err(ExecError::TypeMismatch {
            expected: declared.to_string(),
            actual: materialized_kind(&value).to_string(),
        }),
    }
}

fn materialized_kind(value: &Materialized) -> &'static str {
    match value {
        Materialized::Tensor(_) => "tensor",
        Materialized::Sequence(_) => "sequence",
        Materialized::Tuple(_) => "tuple",
    }
}

// ──────────────────────────────────────────────
// Executor impl
// ──────────────────────────────────────────────

#[async_trait]
impl Executor for ReferenceExecutor {
    fn id(&self) -> ExecutorId {
        self.shared.id
    }

    async fn create_value(
        &self,
        value: RawValue,
        type_spec: Option<&Type>,
    ) -> Result<ValueHandle, ExecError> {
        self.check_open()?;
        // An empty sequence carries no inferable element type; the
        // spec supplies it.
        if let (RawValue::Sequence(elements), Some(spec @ Type::Sequence(_))) = (&value, type_spec)
        {
            if elements.is_empty() {
                return Ok(self.wrap(Arc::new(RefValue {
                    shared: Arc::clone(&self.shared),
                    type_signature: spec.clone(),
                    payload: RefPayload::Sequence(Vec::new()),
                })));
            }
        }
        let inferred = value.infer_type()?;
        if let Some(spec) = type_spec {
            if !spec.is_assignable_from(&inferred) {
                return Err(ExecError::TypeMismatch {
                    expected: spec.to_string(),
                    actual: inferred.to_string(),
                });
            }
        }
        let embedded = embed_raw(&self.shared, value)?;
        let value = match type_spec {
            // The handle carries the declared (possibly wider) type,
            // and its structure is re-wrapped under the declared
            // element names so selection consults the declared type.
            Some(spec) => with_declared_type(&self.shared, &embedded, spec),
            None => embedded,
        };
        Ok(self.wrap(value))
    }

    async fn create_call(
        &self,
        function: &ValueHandle,
        argument: Option<&ValueHandle>,
    ) -> Result<ValueHandle, ExecError> {
        self.check_open()?;
        let fn_value = self.own(function)?;
        let function_body = match &fn_value.payload {
            RefPayload::Function(function_body) => function_body,
            _ => {
                return Err(ExecError::NotCallable {
                    actual: fn_value.type_signature.to_string(),
                })
            }
        };
        let (parameter_type, result_type) = match &fn_value.type_signature {
            Type::Function { parameter, result } => (parameter.as_deref(), result.as_ref()),
            other => {
                return Err(ExecError::NotCallable {
                    actual: other.to_string(),
                })
            }
        };
        let argument_value = match (parameter_type, argument) {
            (None, None) => None,
            (None, Some(_)) => {
                return Err(ExecError::Arity {
                    message: format!(
                        "function of type {} takes no argument",
                        fn_value.type_signature
                    ),
                })
            }
            (Some(_), None) => {
                return Err(ExecError::Arity {
                    message: format!(
                        "function of type {} requires an argument",
                        fn_value.type_signature
                    ),
                })
            }
            (Some(parameter_type), Some(argument)) => {
                let value = self.own(argument)?;
                if !parameter_type.is_assignable_from(&value.type_signature) {
                    return Err(ExecError::TypeMismatch {
                        expected: parameter_type.to_string(),
                        actual: value.type_signature.to_string(),
                    });
                }
                Some(value)
            }
        };
        match function_body {
            RefFunction::Lambda {
                parameter_name,
                body,
                env,
            } => {
                let mut scope = env.clone();
                if let Some(argument_value) = argument_value {
                    scope.push((parameter_name.clone(), argument_value));
                }
                let result = embed_computation(&self.shared, body, &scope)?;
                Ok(self.wrap(result))
            }
            RefFunction::Graph(fragment) => {
                let runtime = self.graph_runtime.as_ref().ok_or_else(|| ExecError::Backend {
                    message: "no graph runtime configured".to_string(),
                })?;
                let argument = argument_value.map(|v| v.materialize()).transpose()?;
                let materialized = runtime.run(fragment, argument).await?;
                let result = from_materialized(&self.shared, result_type, materialized)?;
                Ok(self.wrap(result))
            }
        }
    }

    async fn create_tuple(
        &self,
        elements: Vec<(Option<String>, ValueHandle)>,
    ) -> Result<ValueHandle, ExecError> {
        self.check_open()?;
        let mut embedded = Vec::with_capacity(elements.len());
        let mut types = Vec::with_capacity(elements.len());
        for (name, handle) in elements {
            let value = self.own(&handle)?;
            types.push(TupleElement {
                name: name.clone(),
                value: value.type_signature.clone(),
            });
            embedded.push((name, value));
        }
        Ok(self.wrap(Arc::new(RefValue {
            shared: Arc::clone(&self.shared),
            type_signature: Type::Tuple(types),
            payload: RefPayload::Tuple(embedded),
        })))
    }

    async fn create_selection(
        &self,
        source: &ValueHandle,
        index: Option<usize>,
        name: Option<&str>,
    ) -> Result<ValueHandle, ExecError> {
        self.check_open()?;
        let source = self.own(source)?;
        let selected = select_element(&source, index, name)?;
        Ok(self.wrap(selected))
    }

    fn close(&self) {
        self.shared.closed.store(true, Ordering::SeqCst);
    }
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
