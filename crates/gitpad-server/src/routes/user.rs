use axum::{extract::State, Json};
use serde::Serialize;

use crate::error::ApiErr;
use crate::extract::BearerToken;
use crate::state::AppState;

#[derive(Serialize)]
pub struct UsernameResponse {
    username: String,
}

/// GET /get-username: login of the user the token belongs to
pub async fn username(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
) -> Result<Json<UsernameResponse>, ApiErr> {
    let user = state.remote.authenticated_user(&token).await?;
    Ok(Json(UsernameResponse {
        username: user.login,
    }))
}
