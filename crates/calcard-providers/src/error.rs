//! Errors raised by calendar backends.
//!
//! A [`ProviderError`] carries the backend name, the calendar entity it was
//! working on (when there is one) and a [`ProviderErrorCode`]. The code says
//! whether a failed calendar should come back by itself on a later refresh
//! ([`ProviderErrorCode::is_transient`]) or needs the configuration fixed.

use std::fmt;
use thiserror::Error;

/// What went wrong with a calendar request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderErrorCode {
    /// 401: the access token was rejected.
    InvalidToken,
    /// 403: the token may not read this entity or call this service.
    AccessDenied,
    /// The instance could not be reached or the response could not be read.
    Unreachable,
    /// 429.
    Throttled,
    /// 5xx, typically the calendar integration failing behind Home Assistant.
    ServerFailure,
    /// The body is not a JSON event list.
    MalformedResponse,
    /// 404: no such calendar entity or notify service.
    UnknownEntity,
    /// 400.
    Rejected,
    /// Empty token, bad base URL.
    Misconfigured,
}

impl ProviderErrorCode {
    /// Classifies a non-success HTTP status.
    pub fn from_status(status: u16) -> Self {
        match status {
            401 => Self::InvalidToken,
            403 => Self::AccessDenied,
            404 => Self::UnknownEntity,
            400 => Self::Rejected,
            429 => Self::Throttled,
            500..=599 => Self::ServerFailure,
            _ => Self::MalformedResponse,
        }
    }

    /// Returns true if the calendar is expected to load again on a later
    /// refresh without any change on the user's side.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Unreachable | Self::Throttled | Self::ServerFailure)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidToken => "invalid_token",
            Self::AccessDenied => "access_denied",
            Self::Unreachable => "unreachable",
            Self::Throttled => "throttled",
            Self::ServerFailure => "server_failure",
            Self::MalformedResponse => "malformed_response",
            Self::UnknownEntity => "unknown_entity",
            Self::Rejected => "rejected",
            Self::Misconfigured => "misconfigured",
        }
    }
}

impl fmt::Display for ProviderErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failed calendar or service request.
#[derive(Debug, Error)]
pub struct ProviderError {
    code: ProviderErrorCode,
    message: String,
    backend: Option<&'static str>,
    entity: Option<String>,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl ProviderError {
    pub fn new(code: ProviderErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            backend: None,
            entity: None,
            source: None,
        }
    }

    /// Builds the error for a non-success response; `body` is what the
    /// server said, kept for the statuses where it explains the failure.
    pub fn from_status(status: u16, body: &str) -> Self {
        let code = ProviderErrorCode::from_status(status);
        let message = match code {
            ProviderErrorCode::InvalidToken => "access token rejected".to_string(),
            ProviderErrorCode::AccessDenied => "access denied".to_string(),
            ProviderErrorCode::UnknownEntity => "entity or service not found".to_string(),
            ProviderErrorCode::Throttled => "too many requests".to_string(),
            _ if body.trim().is_empty() => format!("HTTP {status}"),
            _ => format!("HTTP {status}: {}", body.trim()),
        };
        Self::new(code, message)
    }

    pub fn unreachable(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::Unreachable, message)
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::MalformedResponse, message)
    }

    pub fn misconfigured(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::Misconfigured, message)
    }

    /// Names the backend that raised the error.
    pub fn with_backend(mut self, backend: &'static str) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Names the calendar entity the request was for. An entity already set
    /// is kept.
    pub fn for_entity(mut self, entity: impl Into<String>) -> Self {
        if self.entity.is_none() {
            self.entity = Some(entity.into());
        }
        self
    }

    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.source = Some(Box::new(source));
        self
    }

    pub fn code(&self) -> ProviderErrorCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn backend(&self) -> Option<&'static str> {
        self.backend
    }

    pub fn entity(&self) -> Option<&str> {
        self.entity.as_deref()
    }

    /// See [`ProviderErrorCode::is_transient`].
    pub fn is_transient(&self) -> bool {
        self.code.is_transient()
    }
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(backend) = self.backend {
            write!(f, "[{backend}] ")?;
        }
        if let Some(ref entity) = self.entity {
            write!(f, "{entity}: ")?;
        }
        write!(f, "{}: {}", self.code, self.message)
    }
}

pub type ProviderResult<T> = Result<T, ProviderError>;
