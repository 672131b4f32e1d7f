use axum::{extract::State, http::StatusCode, Json};
use gitpad_core::{
    FileTarget, PublishOutcome, PublishRequest, PublishWorkflow, RepositoryRef, RevisionMarker,
    Session, WorkflowState,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::{status_for, ApiErr};
use crate::extract::BearerToken;
use crate::state::AppState;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishBody {
    owner: String,
    repo: String,
    path: String,
    content: String,
    commit_message: Option<String>,
    revision_marker: Option<String>,
    branch: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishResponse {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    revision_marker: Option<RevisionMarker>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    kind: Option<&'static str>,
}

impl PublishBody {
    fn into_request(self) -> Result<PublishRequest, ApiErr> {
        let repository = RepositoryRef::new(self.owner, self.repo)?;
        let mut file = FileTarget::new(self.path)?;
        if let Some(marker) = self.revision_marker.filter(|m| !m.trim().is_empty()) {
            file = file.with_revision(RevisionMarker::new(marker.trim()));
        }

        let mut request = PublishRequest::new(repository, file, self.content, self.commit_message);
        if let Some(branch) = self.branch {
            request = request.on_branch(branch);
        }
        Ok(request)
    }
}

/// POST /publish: ensure the repository exists, then commit one file
pub async fn publish(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
    Json(body): Json<PublishBody>,
) -> Result<(StatusCode, Json<PublishResponse>), ApiErr> {
    let request = body.into_request()?;
    let repository = request.repository.clone();

    // The workflow takes the slot itself; this only skips the user lookup for
    // a run that would be refused anyway.
    if state.in_flight.state(&repository) != WorkflowState::Idle {
        tracing::debug!(repository = %repository, "publish already in flight");
        return Ok(respond(&repository, PublishOutcome::Busy));
    }

    let session = Arc::new(Session::with_token(token.clone()));
    match state.remote.authenticated_user(&token).await {
        Ok(user) => session.set_owner_login(user.login),
        Err(e) => return Ok(respond(&repository, PublishOutcome::failed(e))),
    }

    let workflow = PublishWorkflow::with_options(session, state.remote.clone(), state.options)
        .sharing(state.in_flight.clone());
    let outcome = workflow.run(request).await;

    Ok(respond(&repository, outcome))
}

fn respond(repository: &RepositoryRef, outcome: PublishOutcome) -> (StatusCode, Json<PublishResponse>) {
    let (status, body) = match outcome {
        PublishOutcome::Created { revision } => (
            StatusCode::CREATED,
            PublishResponse::success("created", revision),
        ),
        PublishOutcome::Updated { revision } => {
            (StatusCode::OK, PublishResponse::success("updated", revision))
        }
        PublishOutcome::AlreadyUpToDate { revision } => (
            StatusCode::OK,
            PublishResponse::success("already_up_to_date", revision),
        ),
        PublishOutcome::Busy => (
            StatusCode::LOCKED,
            PublishResponse {
                status: "busy",
                revision_marker: None,
                error: Some(format!("a publish to {repository} is already in progress")),
                kind: Some("busy"),
            },
        ),
        PublishOutcome::Failed { error } => (
            status_for(&error),
            PublishResponse {
                status: "failed",
                revision_marker: None,
                error: Some(error.to_string()),
                kind: Some(error.kind()),
            },
        ),
    };
    (status, Json(body))
}

impl PublishResponse {
    fn success(status: &'static str, revision: RevisionMarker) -> Self {
        Self {
            status,
            revision_marker: Some(revision),
            error: None,
            kind: None,
        }
    }
}
