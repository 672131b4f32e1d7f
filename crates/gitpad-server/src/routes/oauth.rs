use axum::{
    extract::{Query, State},
    response::Redirect,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::error::ApiErr;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct CodeQuery {
    code: Option<String>,
}

impl CodeQuery {
    fn code(self) -> Option<String> {
        self.code.filter(|c| !c.trim().is_empty())
    }
}

#[derive(Serialize)]
pub struct ExchangeResponse {
    access_token: String,
}

/// GET /auth/github: redirect to GitHub's authorize page
pub async fn authorize(State(state): State<AppState>) -> Redirect {
    Redirect::temporary(&state.oauth.authorize_url(None))
}

/// GET /callback?code=...: exchange the code and hand the token to the frontend
pub async fn callback(State(state): State<AppState>, Query(q): Query<CodeQuery>) -> Redirect {
    let Some(code) = q.code() else {
        tracing::warn!("OAuth callback without a code");
        return Redirect::temporary(&frontend_redirect(&state.frontend_url, "error", "oauth_failed"));
    };

    match state.oauth.exchange_code(&code).await {
        Ok(token) => {
            let token = token.into_access_token();
            Redirect::temporary(&frontend_redirect(
                &state.frontend_url,
                "token",
                token.expose(),
            ))
        }
        Err(e) => {
            tracing::warn!("OAuth callback failed: {e}");
            Redirect::temporary(&frontend_redirect(&state.frontend_url, "error", "oauth_failed"))
        }
    }
}

/// POST /exchange-code?code=...: exchange the code and return the token as JSON
pub async fn exchange_code(
    State(state): State<AppState>,
    Query(q): Query<CodeQuery>,
) -> Result<Json<ExchangeResponse>, ApiErr> {
    let code = q
        .code()
        .ok_or_else(|| ApiErr::bad_request("missing code parameter"))?;
    let token = state.oauth.exchange_code(&code).await?;
    Ok(Json(ExchangeResponse {
        access_token: token.into_access_token().expose().to_string(),
    }))
}

fn frontend_redirect(frontend_url: &str, key: &str, value: &str) -> String {
    let separator = if frontend_url.contains('?') { '&' } else { '?' };
    format!(
        "{frontend_url}{separator}{key}={}",
        urlencoding::encode(value)
    )
}
