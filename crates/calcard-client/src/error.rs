//! Client error types.

use calcard_core::ConfigError;
use calcard_pipeline::PipelineError;
use calcard_providers::ProviderError;
use thiserror::Error;

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors that end a command.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The configuration file is missing, unreadable or incomplete.
    #[error("configuration error: {0}")]
    Config(String),

    /// The `[card]` table is unusable.
    #[error("invalid card configuration: {0}")]
    Card(#[from] ConfigError),

    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("{0}")]
    Pipeline(#[from] PipelineError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Output could not be produced.
    #[error("render error: {0}")]
    Render(String),
}

impl ClientError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}
