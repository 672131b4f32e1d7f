use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use gitpad_core::{RepositoryInfo, RepositoryRef};
use serde::{Deserialize, Serialize};

use crate::error::ApiErr;
use crate::extract::BearerToken;
use crate::state::AppState;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepoExistsQuery {
    username: String,
    repo_name: String,
}

#[derive(Serialize)]
pub struct RepoExistsResponse {
    exists: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRepoRequest {
    repo_name: String,
    private: Option<bool>,
}

/// GET /repo-exists?username=...&repoName=...
pub async fn exists(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
    Query(q): Query<RepoExistsQuery>,
) -> Result<Json<RepoExistsResponse>, ApiErr> {
    let repo = RepositoryRef::new(q.username, q.repo_name)?;
    let found = state.remote.get_repository(&token, &repo).await?;
    Ok(Json(RepoExistsResponse {
        exists: found.is_some(),
    }))
}

/// POST /create-repo: create a repository under the authenticated account
pub async fn create(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
    Json(req): Json<CreateRepoRequest>,
) -> Result<(StatusCode, Json<RepositoryInfo>), ApiErr> {
    let user = state.remote.authenticated_user(&token).await?;
    let repo = RepositoryRef::new(user.login, req.repo_name)?;
    let private = req.private.unwrap_or(state.options.private);

    let info = state
        .remote
        .create_repository(&token, repo.name(), private)
        .await?;
    tracing::info!(repository = %repo, private, "created repository");

    Ok((StatusCode::CREATED, Json(info)))
}
