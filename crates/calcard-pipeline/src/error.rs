//! Pipeline error types.

use calcard_core::ConfigError;
use calcard_providers::ProviderError;
use thiserror::Error;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Errors that stop a refresh.
///
/// A single calendar failing to fetch is not one of them: those end up in
/// [`AgendaSnapshot::failed`](crate::AgendaSnapshot::failed).
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The card configuration is unusable.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// A notification could not be delivered.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// The notify service call failed.
    #[error("notification via {service} failed: {source}")]
    Dispatch {
        service: String,
        #[source]
        source: ProviderError,
    },
}

impl NotifyError {
    /// Creates a dispatch error for the given service.
    pub fn dispatch(service: impl Into<String>, source: ProviderError) -> Self {
        Self::Dispatch {
            service: service.into(),
            source,
        }
    }
}
