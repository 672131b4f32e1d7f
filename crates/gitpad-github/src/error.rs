//! GitHub error types.

use gitpad_core::PublishError;
use thiserror::Error;

/// Errors that can occur during GitHub operations.
#[derive(Debug, Error)]
pub enum GitHubError {
    /// Token expired or revoked (HTTP 401).
    #[error("unauthorized: token expired or revoked - sign in with GitHub again")]
    Unauthorized,

    /// Rate limit exceeded (HTTP 403 or 429 mentioning the rate limit).
    #[error("rate limit exceeded: {message}")]
    RateLimitExceeded {
        /// Message reported by GitHub.
        message: String,
    },

    /// Repository or file not found (HTTP 404).
    #[error("not found: {resource}")]
    NotFound {
        /// Resource that was not found.
        resource: String,
    },

    /// Revision mismatch, concurrent modification detected (HTTP 409, or 422 about the sha).
    #[error("conflict: {message}")]
    Conflict {
        /// Message reported by GitHub.
        message: String,
    },

    /// Any other non-success status.
    #[error("GitHub API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Message reported by GitHub, verbatim.
        message: String,
    },

    /// Response body did not have the expected shape.
    #[error("unexpected response for {context}: {reason}")]
    UnexpectedResponse {
        /// What was being fetched.
        context: String,
        /// What was wrong with it.
        reason: String,
    },

    /// Network error or timeout.
    #[error("network error: {0}")]
    NetworkError(String),

    /// JSON parsing error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// HTTP client could not be constructed.
    #[error("HTTP error: {0}")]
    HttpError(String),

    /// OAuth code exchange was refused.
    #[error("OAuth error: {error}: {description}")]
    OAuth {
        /// OAuth error code (e.g. `bad_verification_code`).
        error: String,
        /// Human-readable description.
        description: String,
    },
}

/// Result type for GitHub operations.
pub type Result<T> = std::result::Result<T, GitHubError>;

impl GitHubError {
    /// Checks if this error indicates an authentication problem.
    pub fn is_auth_error(&self) -> bool {
        matches!(self, GitHubError::Unauthorized)
    }

    /// Checks if this error is a lookup miss.
    pub fn is_not_found(&self) -> bool {
        matches!(self, GitHubError::NotFound { .. })
    }

    /// Classifies an HTTP status and GitHub's error message.
    ///
    /// # Arguments
    ///
    /// * `status` - HTTP status code of the response
    /// * `message` - The `message` field of GitHub's error body
    /// * `context` - What was being accessed (e.g. "repository octocat/demo")
    pub fn from_status(status: u16, message: &str, context: &str) -> Self {
        let lowered = message.to_lowercase();
        match status {
            401 => GitHubError::Unauthorized,
            403 | 429 if lowered.contains("rate limit") => GitHubError::RateLimitExceeded {
                message: message.to_string(),
            },
            429 => GitHubError::RateLimitExceeded {
                message: message.to_string(),
            },
            404 => GitHubError::NotFound {
                resource: context.to_string(),
            },
            409 => GitHubError::Conflict {
                message: message.to_string(),
            },
            // A file appeared between fetch and write, or the sha is malformed.
            422 if lowered.contains("sha") => GitHubError::Conflict {
                message: message.to_string(),
            },
            _ => GitHubError::Api {
                status,
                message: message.to_string(),
            },
        }
    }

    /// Maps an octocrab error using the status GitHub reported.
    ///
    /// # Arguments
    ///
    /// * `error` - The octocrab error to map
    /// * `context` - What was being accessed, used for not-found messages
    pub fn from_octocrab(error: octocrab::Error, context: &str) -> Self {
        match error {
            octocrab::Error::GitHub { source, .. } => {
                Self::from_status(source.status_code.as_u16(), &source.message, context)
            }
            octocrab::Error::Serde { source, .. } => GitHubError::UnexpectedResponse {
                context: context.to_string(),
                reason: source.to_string(),
            },
            octocrab::Error::Json { source, .. } => GitHubError::UnexpectedResponse {
                context: context.to_string(),
                reason: source.to_string(),
            },
            other => {
                GitHubError::NetworkError(format!("failed to access {}: {}", context, other))
            }
        }
    }
}

impl From<GitHubError> for PublishError {
    fn from(error: GitHubError) -> Self {
        match error {
            GitHubError::Unauthorized => PublishError::Unauthenticated,
            GitHubError::RateLimitExceeded { message } => PublishError::RateLimited { message },
            GitHubError::Conflict { .. } => PublishError::Conflict,
            GitHubError::NotFound { resource } => {
                PublishError::rejected(404, format!("not found: {}", resource))
            }
            GitHubError::Api { status, message } => PublishError::RemoteRejected { status, message },
            GitHubError::NetworkError(message) => PublishError::NetworkFailure { message },
            GitHubError::UnexpectedResponse { .. } | GitHubError::JsonError(_) => {
                PublishError::rejected(502, error.to_string())
            }
            GitHubError::HttpError(message) => PublishError::NetworkFailure { message },
            GitHubError::OAuth { .. } => PublishError::Unauthenticated,
        }
    }
}
