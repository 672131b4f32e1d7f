//! Core error types.

use serde::Serialize;
use thiserror::Error;

/// Failures a publish can end in.
///
/// Every remote call site produces one of these. Lookup misses are not
/// represented here: they surface as `Option::None` from [`crate::remote::RemoteApi`].
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PublishError {
    /// No access token, or GitHub rejected the token (HTTP 401).
    #[error("unauthenticated: sign in with GitHub again")]
    Unauthenticated,

    /// The supplied revision marker is stale.
    #[error("conflict: the file changed since it was last fetched - reload it and retry")]
    Conflict,

    /// GitHub rate limit reached.
    #[error("rate limited: {message}")]
    RateLimited {
        /// Message reported by GitHub.
        message: String,
    },

    /// The request never produced a response.
    #[error("network failure: {message}")]
    NetworkFailure {
        /// Transport error description.
        message: String,
    },

    /// GitHub answered with an unexpected status or payload.
    #[error("GitHub rejected the request ({status}): {message}")]
    RemoteRejected {
        /// HTTP status reported by GitHub.
        status: u16,
        /// Message reported by GitHub, verbatim.
        message: String,
    },

    /// The request was refused locally before any write was attempted.
    #[error("invalid request: {message}")]
    InvalidRequest {
        /// Reason for the refusal.
        message: String,
    },
}

impl PublishError {
    /// Stable identifier of the failure kind, for UI rendering.
    pub fn kind(&self) -> &'static str {
        match self {
            PublishError::Unauthenticated => "unauthenticated",
            PublishError::Conflict => "conflict",
            PublishError::RateLimited { .. } => "rate_limited",
            PublishError::NetworkFailure { .. } => "network_failure",
            PublishError::RemoteRejected { .. } => "remote_rejected",
            PublishError::InvalidRequest { .. } => "invalid_request",
        }
    }

    /// Shorthand for [`PublishError::InvalidRequest`].
    pub fn invalid(message: impl Into<String>) -> Self {
        PublishError::InvalidRequest {
            message: message.into(),
        }
    }

    /// Shorthand for [`PublishError::NetworkFailure`].
    pub fn network(message: impl Into<String>) -> Self {
        PublishError::NetworkFailure {
            message: message.into(),
        }
    }

    /// Shorthand for [`PublishError::RemoteRejected`].
    pub fn rejected(status: u16, message: impl Into<String>) -> Self {
        PublishError::RemoteRejected {
            status,
            message: message.into(),
        }
    }
}

/// Repository resolution failed; carries the underlying cause.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("could not resolve repository: {0}")]
pub struct ResolverFailed(pub PublishError);

impl ResolverFailed {
    /// Returns the underlying cause.
    pub fn into_cause(self) -> PublishError {
        self.0
    }
}

impl From<PublishError> for ResolverFailed {
    fn from(cause: PublishError) -> Self {
        ResolverFailed(cause)
    }
}

/// Validation errors for user-supplied identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Repository owner is not a valid GitHub login.
    #[error("invalid owner '{owner}': {reason}")]
    InvalidOwner {
        /// The rejected owner.
        owner: String,
        /// Reason for validation failure.
        reason: String,
    },

    /// Repository name is not a valid GitHub repository name.
    #[error("invalid repository name '{name}': {reason}")]
    InvalidRepositoryName {
        /// The rejected name.
        name: String,
        /// Reason for validation failure.
        reason: String,
    },

    /// File path is not a clean repository-relative path.
    #[error("invalid file path '{path}': {reason}")]
    InvalidPath {
        /// The rejected path.
        path: String,
        /// Reason for validation failure.
        reason: String,
    },

    /// Repository reference could not be parsed from `owner/name`.
    #[error("invalid repository reference '{0}': expected owner/name")]
    InvalidReference(String),
}

impl From<ValidationError> for PublishError {
    fn from(error: ValidationError) -> Self {
        PublishError::invalid(error.to_string())
    }
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, PublishError>;
