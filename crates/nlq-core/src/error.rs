//! Core error types.

use thiserror::Error;

/// Errors raised while validating an inbound query request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The question was absent or blank.
    #[error("Missing 'question' in request body")]
    MissingQuestion,

    /// `limit` was not a positive integer.
    #[error("`limit` must be a positive integer")]
    InvalidLimit,

    /// `offset` was not a non-negative integer.
    #[error("`offset` must be a non-negative integer")]
    InvalidOffset,
}

/// Errors raised by a text-generation collaborator.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// The generator could not be reached.
    #[error("text generator unreachable: {0}")]
    Unreachable(String),

    /// The generator answered with an error.
    #[error("text generator error: {0}")]
    Api(String),

    /// The generator answered without any text.
    #[error("text generator returned no text")]
    Empty,
}

/// Errors raised while turning a question into a plan.
#[derive(Debug, Error)]
pub enum PlanningError {
    /// The text generator failed.
    #[error(transparent)]
    Generation(#[from] GenerationError),

    /// No bracketed array could be located in the model output.
    #[error("no JSON array found in model output")]
    NoJsonArray,

    /// The bracketed slice is not valid JSON.
    #[error("invalid JSON from model: {0}")]
    InvalidJson(String),

    /// The JSON is valid but is not a list of call specs.
    #[error("invalid plan: {0}")]
    InvalidPlan(String),

    /// A call names a source or collection the registry does not know.
    #[error("unknown collection {source_name}/{collection}")]
    UnknownCollection {
        /// Source named by the call.
        source_name: String,
        /// Collection named by the call.
        collection: String,
    },
}

/// Errors raised by a data-source collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceError {
    /// Connection-level failure.
    #[error("transport error: {0}")]
    Transport(String),

    /// Request timed out.
    #[error("request timed out")]
    Timeout,

    /// The source answered with a non-success status.
    #[error("HTTP {status}: {message}")]
    Http {
        /// Status code.
        status: u16,
        /// Response body or reason.
        message: String,
    },

    /// The source rejected the credentials.
    #[error("401 Unauthorized: check your source credentials")]
    Unauthorized,

    /// The response payload could not be turned into rows.
    #[error("malformed payload: {0}")]
    MalformedPayload(String),

    /// A source or collection name cannot be used as a path segment.
    #[error("invalid resource path: {0:?}")]
    InvalidPath(String),
}

impl SourceError {
    /// Whether another attempt could succeed.
    ///
    /// Transport failures, timeouts and server-side statuses are transient.
    /// Authorization and payload failures are not.
    pub fn is_transient(&self) -> bool {
        match self {
            SourceError::Transport(_) | SourceError::Timeout => true,
            SourceError::Http { status, .. } => {
                (500..600).contains(status) || *status == 408 || *status == 429
            }
            SourceError::Unauthorized
            | SourceError::MalformedPayload(_)
            | SourceError::InvalidPath(_) => false,
        }
    }
}

/// Errors raised while dispatching a plan.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// A call failed after its retries; the last failure is surfaced as is.
    #[error(transparent)]
    Source(#[from] SourceError),

    /// A call task panicked or was cancelled.
    #[error("dispatch task failed: {0}")]
    Task(String),
}

/// Errors raised while loading a schema registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Reading the registry document failed.
    #[error("registry I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The registry document is not valid.
    #[error("registry parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Two sources share a name.
    #[error("duplicate source in registry: {0}")]
    DuplicateSource(String),
}

/// Errors surfaced by the query engine.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The request was rejected before planning.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Planning failed; nothing was dispatched.
    #[error("LLM planning failed: {0}")]
    Planning(#[from] PlanningError),

    /// At least one call failed; no partial results are returned.
    #[error("OData parallel calls failed: {0}")]
    Dispatch(#[from] DispatchError),
}
