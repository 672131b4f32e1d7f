use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use gitpad_core::{PublishError, ValidationError};
use gitpad_github::GitHubError;

/// Unified API error type.
///
/// Produces `{"error": "<message>", "kind": "<kind>"}` JSON responses.
#[derive(Debug)]
pub struct ApiErr {
    status: StatusCode,
    kind: &'static str,
    message: String,
}

impl ApiErr {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            kind: "invalid_request",
            message: msg.into(),
        }
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            kind: "unauthenticated",
            message: msg.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

/// HTTP status a publish failure is reported with.
pub fn status_for(error: &PublishError) -> StatusCode {
    match error {
        PublishError::Unauthenticated => StatusCode::UNAUTHORIZED,
        PublishError::Conflict => StatusCode::CONFLICT,
        PublishError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
        PublishError::InvalidRequest { .. } => StatusCode::BAD_REQUEST,
        PublishError::NetworkFailure { .. } | PublishError::RemoteRejected { .. } => {
            StatusCode::BAD_GATEWAY
        }
    }
}

impl From<PublishError> for ApiErr {
    fn from(error: PublishError) -> Self {
        Self {
            status: status_for(&error),
            kind: error.kind(),
            message: error.to_string(),
        }
    }
}

impl From<ValidationError> for ApiErr {
    fn from(error: ValidationError) -> Self {
        PublishError::from(error).into()
    }
}

impl From<GitHubError> for ApiErr {
    fn from(error: GitHubError) -> Self {
        tracing::warn!("GitHub call failed: {error}");
        PublishError::from(error).into()
    }
}

impl IntoResponse for ApiErr {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(serde_json::json!({"error": self.message, "kind": self.kind})),
        )
            .into_response()
    }
}
