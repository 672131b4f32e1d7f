//! OAuth web application flow for GitHub authentication.
//!
//! The browser is redirected to GitHub's authorize page, GitHub redirects back
//! with a one-time `code`, and the backend exchanges that code for an access
//! token. The exchange needs the client secret, which is why it happens on the
//! server and never in the browser.
//!
//! # Flow
//!
//! 1. Redirect the user to `authorize_url()`
//! 2. Receive `code` on the configured redirect URI
//! 3. Call `exchange_code(code)` to obtain an [`OAuthToken`]
//!
//! # Example
//!
//! ```no_run
//! use gitpad_github::auth::{OAuthApp, OAuthConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let app = OAuthApp::new(OAuthConfig::new(
//!     "client_id",
//!     "client_secret",
//!     "http://localhost:3001/callback",
//! ));
//! println!("Sign in at {}", app.authorize_url(None));
//!
//! let token = app.exchange_code("code-from-callback").await?;
//! println!("Granted scopes: {}", token.scope);
//! # Ok(())
//! # }
//! ```

use crate::error::{GitHubError, Result};
use gitpad_core::AccessToken;
use serde::{Deserialize, Serialize};
use std::fmt;
use zeroize::Zeroizing;

/// Public GitHub web endpoint hosting the OAuth pages.
pub const DEFAULT_WEB_URL: &str = "https://github.com";

/// Scope requested by default: full access to public and private repositories.
pub const DEFAULT_SCOPE: &str = "repo";

/// OAuth application registration.
#[derive(Clone)]
pub struct OAuthConfig {
    /// OAuth application client ID.
    pub client_id: String,
    /// OAuth application client secret.
    pub client_secret: Zeroizing<String>,
    /// Where GitHub sends the user back with the code.
    pub redirect_uri: String,
    /// Space-separated scopes to request.
    pub scope: String,
    /// Root of the GitHub web endpoints.
    pub web_url: String,
}

impl OAuthConfig {
    /// Creates a configuration for github.com requesting [`DEFAULT_SCOPE`].
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        redirect_uri: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: Zeroizing::new(client_secret.into()),
            redirect_uri: redirect_uri.into(),
            scope: DEFAULT_SCOPE.to_string(),
            web_url: DEFAULT_WEB_URL.to_string(),
        }
    }

    /// Points the flow at another GitHub web root (GitHub Enterprise, or a mock server).
    pub fn with_web_url(mut self, web_url: impl Into<String>) -> Self {
        self.web_url = web_url.into().trim_end_matches('/').to_string();
        self
    }
}

impl fmt::Debug for OAuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuthConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("redirect_uri", &self.redirect_uri)
            .field("scope", &self.scope)
            .field("web_url", &self.web_url)
            .finish()
    }
}

/// OAuth web flow handler for GitHub authentication.
#[derive(Debug, Clone)]
pub struct OAuthApp {
    config: OAuthConfig,
    http_client: reqwest::Client,
}

impl OAuthApp {
    /// Creates a handler for the given registration.
    pub fn new(config: OAuthConfig) -> Self {
        Self {
            config,
            http_client: reqwest::Client::new(),
        }
    }

    /// The registration this handler uses.
    pub fn config(&self) -> &OAuthConfig {
        &self.config
    }

    /// URL of GitHub's authorize page for this application.
    ///
    /// # Arguments
    ///
    /// * `state` - Optional opaque value GitHub echoes back to the redirect URI
    pub fn authorize_url(&self, state: Option<&str>) -> String {
        let mut url = format!(
            "{}/login/oauth/authorize?client_id={}&redirect_uri={}&scope={}",
            self.config.web_url,
            urlencoding::encode(&self.config.client_id),
            urlencoding::encode(&self.config.redirect_uri),
            urlencoding::encode(&self.config.scope),
        );
        if let Some(state) = state {
            url.push_str("&state=");
            url.push_str(&urlencoding::encode(state));
        }
        url
    }

    /// Exchanges an authorization code for an access token.
    ///
    /// GitHub reports a bad or expired code with HTTP 200 and an `error` field,
    /// so the body is inspected as well as the status.
    ///
    /// # Errors
    ///
    /// * `OAuth` - If GitHub refused the code
    /// * `Api` - If GitHub answered with a non-success status
    /// * `NetworkError` - If the request fails due to network issues
    pub async fn exchange_code(&self, code: &str) -> Result<OAuthToken> {
        let url = format!("{}/login/oauth/access_token", self.config.web_url);

        let body = serde_json::json!({
            "client_id": self.config.client_id,
            "client_secret": self.config.client_secret.as_str(),
            "code": code,
            "redirect_uri": self.config.redirect_uri,
        });

        let response = self
            .http_client
            .post(&url)
            .header("Accept", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| GitHubError::NetworkError(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(GitHubError::Api {
                status: status.as_u16(),
                message: format!("failed to exchange code: {}", body),
            });
        }

        let exchange: ExchangeResponse = response
            .json()
            .await
            .map_err(|e| GitHubError::UnexpectedResponse {
                context: "OAuth token exchange".to_string(),
                reason: e.to_string(),
            })?;

        match exchange {
            ExchangeResponse::Success(token) => {
                tracing::info!(scope = %token.scope, "exchanged OAuth code for token");
                Ok(token)
            }
            ExchangeResponse::Error {
                error,
                error_description,
            } => {
                tracing::warn!(error = %error, "OAuth code exchange refused");
                Err(GitHubError::OAuth {
                    error,
                    description: error_description.unwrap_or_default(),
                })
            }
        }
    }
}

/// Access token returned after successful authorization.
#[derive(Clone, Serialize, Deserialize)]
pub struct OAuthToken {
    /// The OAuth access token, wiped from memory on drop.
    pub access_token: Zeroizing<String>,

    /// Token type (usually "bearer").
    #[serde(default)]
    pub token_type: String,

    /// Scopes granted to the token.
    #[serde(default)]
    pub scope: String,
}

impl OAuthToken {
    /// Hands the token over to a session.
    pub fn into_access_token(self) -> AccessToken {
        AccessToken::new(self.access_token.as_str())
    }
}

impl fmt::Debug for OAuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuthToken")
            .field("access_token", &"<redacted>")
            .field("token_type", &self.token_type)
            .field("scope", &self.scope)
            .finish()
    }
}

/// Internal response type for the code exchange.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ExchangeResponse {
    Success(OAuthToken),
    Error {
        error: String,
        error_description: Option<String>,
    },
}
