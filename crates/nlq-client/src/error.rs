//! Client error types.

use thiserror::Error;

/// Errors raised while constructing a client.
///
/// Request-time failures are reported through the collaborator error types
/// of `nlq-core` instead.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The underlying HTTP client could not be built.
    #[error("failed to build HTTP client: {0}")]
    Build(#[from] reqwest::Error),

    /// No API key was configured for the text generator.
    #[error("missing API key")]
    MissingApiKey,

    /// A configuration value is unusable.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for client construction.
pub type Result<T> = std::result::Result<T, ClientError>;
