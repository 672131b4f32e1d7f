//! GitHub API client for repository and file operations.

use crate::error::{GitHubError, Result};
use async_trait::async_trait;
use base64::Engine;
use gitpad_core::{
    AccessToken, FileWrite, GitHubUser, PublishError, RemoteApi, RemoteFile, RepositoryInfo,
    RepositoryRef, RevisionMarker,
};
use octocrab::service::middleware::retry::RetryConfig;
use octocrab::Octocrab;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Public GitHub REST API endpoint.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// GitHub REST client used by the publish workflow.
///
/// Each call authenticates with the token it is given, so a single client can
/// serve every session. HTTP-level retries are disabled: a failed call is
/// reported once and the caller decides what to do.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    api_url: String,
}

impl Default for GitHubClient {
    fn default() -> Self {
        Self::new()
    }
}

impl GitHubClient {
    /// Creates a client for api.github.com.
    pub fn new() -> Self {
        Self::with_api_url(DEFAULT_API_URL)
    }

    /// Creates a client for another API root (GitHub Enterprise, or a mock server).
    pub fn with_api_url(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// API root this client talks to.
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    fn octocrab(&self, token: &AccessToken) -> Result<Octocrab> {
        let mut builder = Octocrab::builder()
            .base_uri(self.api_url.as_str())
            .map_err(|e| GitHubError::HttpError(e.to_string()))?
            .personal_token(token.expose().to_string());
        builder.add_retry_config(RetryConfig::None);
        builder
            .build()
            .map_err(|e| GitHubError::HttpError(e.to_string()))
    }

    /// Fetches repository metadata.
    ///
    /// # Errors
    ///
    /// * `NotFound` - If the repository does not exist or is not visible to the token
    /// * `Unauthorized` - If the token is invalid or expired
    /// * `RateLimitExceeded` - If the rate limit has been exceeded
    /// * `NetworkError` - If the request fails due to network issues
    pub async fn repository(&self, token: &AccessToken, repo: &RepositoryRef) -> Result<RepositoryInfo> {
        let route = format!(
            "/repos/{}/{}",
            urlencoding::encode(repo.owner()),
            urlencoding::encode(repo.name())
        );
        let payload: RepositoryPayload = self
            .octocrab(token)?
            .get(route, None::<&()>)
            .await
            .map_err(|e| GitHubError::from_octocrab(e, &format!("repository {}", repo)))?;
        Ok(payload.into())
    }

    /// Creates a repository under the authenticated user's account.
    ///
    /// # Arguments
    ///
    /// * `name` - Name of the repository to create
    /// * `private` - Whether the repository should be private (true) or public (false)
    ///
    /// # Errors
    ///
    /// * `Unauthorized` - If the token is invalid or expired
    /// * `Api` - If GitHub refuses the name (HTTP 422) or the token lacks scope (HTTP 403)
    /// * `RateLimitExceeded` - If the rate limit has been exceeded
    /// * `NetworkError` - If the request fails due to network issues
    pub async fn create_repository(
        &self,
        token: &AccessToken,
        name: &str,
        private: bool,
    ) -> Result<RepositoryInfo> {
        let body = serde_json::json!({
            "name": name,
            "private": private,
        });

        let payload: RepositoryPayload = self
            .octocrab(token)?
            .post("/user/repos", Some(&body))
            .await
            .map_err(|e| GitHubError::from_octocrab(e, &format!("repository {}", name)))?;
        Ok(payload.into())
    }

    /// Fetches a file's current sha and, when GitHub inlines it, its content.
    ///
    /// # Errors
    ///
    /// * `NotFound` - If the file or repository does not exist
    /// * `UnexpectedResponse` - If the path is a directory, symlink or submodule
    /// * `Unauthorized` - If the token is invalid or expired
    /// * `NetworkError` - If the request fails due to network issues
    pub async fn file(
        &self,
        token: &AccessToken,
        repo: &RepositoryRef,
        path: &str,
        branch: Option<&str>,
    ) -> Result<RemoteFile> {
        let context = format!("file {} in {}", path, repo);
        let params = branch.map(|git_ref| RefParam { git_ref });

        let value: Value = self
            .octocrab(token)?
            .get(contents_route(repo, path), params.as_ref())
            .await
            .map_err(|e| GitHubError::from_octocrab(e, &context))?;

        let item: ContentItem = match value {
            Value::Array(_) => {
                return Err(GitHubError::UnexpectedResponse {
                    context,
                    reason: "path is a directory".to_string(),
                })
            }
            other => serde_json::from_value(other)?,
        };
        if item.kind != "file" {
            return Err(GitHubError::UnexpectedResponse {
                context,
                reason: format!("path is a {}, not a file", item.kind),
            });
        }

        let content = match (item.encoding.as_deref(), item.content.as_deref()) {
            (Some("base64"), Some(encoded)) if !encoded.is_empty() => {
                let decoded = base64::engine::general_purpose::STANDARD
                    .decode(encoded.replace('\n', ""))
                    .map_err(|e| GitHubError::UnexpectedResponse {
                        context: context.clone(),
                        reason: format!("invalid base64 content: {}", e),
                    })?;
                Some(decoded)
            }
            _ => None,
        };

        Ok(RemoteFile {
            revision: RevisionMarker::new(item.sha),
            content,
        })
    }

    /// Creates or updates a file in one commit.
    ///
    /// Content is sent base64-encoded. The sha is included only when replacing
    /// an existing file.
    ///
    /// # Returns
    ///
    /// Returns the sha of the written file.
    ///
    /// # Errors
    ///
    /// * `Conflict` - If the file has been modified (sha mismatch)
    /// * `Unauthorized` - If the token is invalid or expired
    /// * `RateLimitExceeded` - If the rate limit has been exceeded
    /// * `NetworkError` - If the request fails due to network issues
    pub async fn write_file(
        &self,
        token: &AccessToken,
        repo: &RepositoryRef,
        write: FileWrite<'_>,
    ) -> Result<RevisionMarker> {
        let context = format!("file {} in {}", write.path, repo);
        let body = PutContents {
            message: write.message,
            content: base64::engine::general_purpose::STANDARD.encode(write.content),
            sha: write.revision.map(RevisionMarker::as_str),
            branch: write.branch,
        };

        let response: PutContentsResponse = self
            .octocrab(token)?
            .put(contents_route(repo, write.path), Some(&body))
            .await
            .map_err(|e| GitHubError::from_octocrab(e, &context))?;

        Ok(RevisionMarker::new(response.content.sha))
    }

    /// Fetches the profile the token belongs to.
    ///
    /// # Errors
    ///
    /// * `Unauthorized` - If the token is invalid or expired
    /// * `NetworkError` - If the request fails due to network issues
    pub async fn user(&self, token: &AccessToken) -> Result<GitHubUser> {
        self.octocrab(token)?
            .get("/user", None::<&()>)
            .await
            .map_err(|e| GitHubError::from_octocrab(e, "authenticated user"))
    }
}

/// `/repos/{owner}/{repo}/contents/{path}` with every path segment escaped.
fn contents_route(repo: &RepositoryRef, path: &str) -> String {
    let escaped: Vec<_> = path.split('/').map(urlencoding::encode).collect();
    format!(
        "/repos/{}/{}/contents/{}",
        urlencoding::encode(repo.owner()),
        urlencoding::encode(repo.name()),
        escaped.join("/")
    )
}

#[async_trait]
impl RemoteApi for GitHubClient {
    async fn get_repository(
        &self,
        token: &AccessToken,
        repo: &RepositoryRef,
    ) -> std::result::Result<Option<RepositoryInfo>, PublishError> {
        tracing::debug!(repository = %repo, "looking up repository");
        match self.repository(token, repo).await {
            Ok(info) => Ok(Some(info)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn create_repository(
        &self,
        token: &AccessToken,
        name: &str,
        private: bool,
    ) -> std::result::Result<RepositoryInfo, PublishError> {
        tracing::debug!(name, private, "creating repository");
        Ok(GitHubClient::create_repository(self, token, name, private).await?)
    }

    async fn get_file(
        &self,
        token: &AccessToken,
        repo: &RepositoryRef,
        path: &str,
        branch: Option<&str>,
    ) -> std::result::Result<Option<RemoteFile>, PublishError> {
        tracing::debug!(repository = %repo, path, "fetching file metadata");
        match self.file(token, repo, path, branch).await {
            Ok(file) => Ok(Some(file)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(GitHubError::UnexpectedResponse { reason, .. }) => {
                Err(PublishError::invalid(format!("{}: {}", path, reason)))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn put_file(
        &self,
        token: &AccessToken,
        repo: &RepositoryRef,
        write: FileWrite<'_>,
    ) -> std::result::Result<RevisionMarker, PublishError> {
        tracing::debug!(repository = %repo, path = write.path, "writing file");
        Ok(self.write_file(token, repo, write).await?)
    }

    async fn authenticated_user(
        &self,
        token: &AccessToken,
    ) -> std::result::Result<GitHubUser, PublishError> {
        Ok(self.user(token).await?)
    }
}

#[derive(Serialize)]
struct RefParam<'a> {
    #[serde(rename = "ref")]
    git_ref: &'a str,
}

#[derive(Serialize)]
struct PutContents<'a> {
    message: &'a str,
    content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    branch: Option<&'a str>,
}

#[derive(Deserialize)]
struct PutContentsResponse {
    content: ContentSha,
}

#[derive(Deserialize)]
struct ContentSha {
    sha: String,
}

#[derive(Deserialize)]
struct ContentItem {
    #[serde(rename = "type")]
    kind: String,
    sha: String,
    content: Option<String>,
    encoding: Option<String>,
}

#[derive(Deserialize)]
struct RepositoryPayload {
    name: String,
    owner: OwnerPayload,
    #[serde(default)]
    private: bool,
    default_branch: Option<String>,
    html_url: Option<String>,
}

#[derive(Deserialize)]
struct OwnerPayload {
    login: String,
}

impl From<RepositoryPayload> for RepositoryInfo {
    fn from(payload: RepositoryPayload) -> Self {
        RepositoryInfo {
            owner: payload.owner.login,
            name: payload.name,
            private: payload.private,
            default_branch: payload.default_branch,
            html_url: payload.html_url,
        }
    }
}
