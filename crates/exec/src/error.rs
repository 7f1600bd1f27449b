use lamina_interchange::SerializationError;

/// All errors that can be returned by an executor operation.
///
/// Errors surface synchronously to the caller of the failing
/// operation; none are retried internally. Retry policy, if any,
/// belongs to a calling orchestration layer.
#[derive(Debug, thiserror::Error)]
pub enum ExecError {
    /// A supplied type spec does not match the inferred type of the
    /// value, or an argument does not fit a function's parameter.
    #[error("type mismatch: expected {expected}, got {actual}")]
    TypeMismatch { expected: String, actual: String },

    /// `create_call` on a handle whose type is not a function type.
    #[error("value of type {actual} is not callable")]
    NotCallable { actual: String },

    /// An argument was required but omitted, or forbidden but supplied.
    #[error("arity error: {message}")]
    Arity { message: String },

    /// Ambiguous or missing selector, non-tuple source, or unknown
    /// index/name.
    #[error("selection error: {message}")]
    Selection { message: String },

    /// A handle created by one executor was passed to another.
    #[error("handle is owned by a different executor")]
    ForeignHandle,

    /// Operation invoked after `close()`.
    #[error("executor is closed")]
    ClosedExecutor,

    /// The external graph runtime failed or is not configured.
    #[error("backend error: {message}")]
    Backend { message: String },

    /// Malformed wire message, unknown variant, or inconsistent
    /// bindings.
    #[error("serialization error: {0}")]
    Serialization(#[from] SerializationError),
}
