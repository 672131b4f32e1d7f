use axum::{extract::FromRequestParts, http::request::Parts};
use gitpad_core::AccessToken;

use crate::error::ApiErr;

/// GitHub access token taken from `Authorization: Bearer <token>`.
pub struct BearerToken(pub AccessToken);

impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = ApiErr;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(|token| BearerToken(AccessToken::new(token)))
            .ok_or_else(|| ApiErr::unauthorized("missing or invalid Authorization header"))
    }
}
