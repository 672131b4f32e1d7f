//! The seam between the publish workflow and GitHub.
//!
//! Implementations own the HTTP layer: header construction, transport encoding
//! of file content, and mapping of remote responses onto [`PublishError`].

use crate::error::Result;
use crate::session::AccessToken;
use crate::types::{RepositoryRef, RevisionMarker};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Repository metadata returned by lookups and creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryInfo {
    /// Owner login.
    pub owner: String,
    /// Repository name.
    pub name: String,
    /// Whether the repository is private.
    pub private: bool,
    /// Default branch, when reported.
    pub default_branch: Option<String>,
    /// Browser URL, when reported.
    pub html_url: Option<String>,
}

/// Current state of a file on the remote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteFile {
    /// Current revision marker.
    pub revision: RevisionMarker,
    /// Decoded content, when the remote inlines it (small files only).
    pub content: Option<Vec<u8>>,
}

/// A single create-or-update write.
#[derive(Debug, Clone, Copy)]
pub struct FileWrite<'a> {
    /// Slash-separated path relative to the repository root.
    pub path: &'a str,
    /// Raw content; encoding for transport is the implementation's concern.
    pub content: &'a [u8],
    /// Commit message.
    pub message: &'a str,
    /// Marker of the revision being replaced; `None` creates the file.
    pub revision: Option<&'a RevisionMarker>,
    /// Target branch; `None` for the default branch.
    pub branch: Option<&'a str>,
}

/// GitHub user profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitHubUser {
    /// GitHub user ID.
    pub id: u64,
    /// GitHub username.
    pub login: String,
    /// Display name (may be null if not set).
    pub name: Option<String>,
    /// Primary email address (may be null if not public).
    pub email: Option<String>,
}

/// Remote operations consumed by the resolver and publisher.
///
/// Every call either succeeds or returns one of the [`crate::error::PublishError`]
/// kinds. Implementations must not retry.
#[async_trait]
pub trait RemoteApi: Send + Sync {
    /// Looks up a repository. `Ok(None)` means the remote reported "not found".
    async fn get_repository(
        &self,
        token: &AccessToken,
        repo: &RepositoryRef,
    ) -> Result<Option<RepositoryInfo>>;

    /// Creates a repository under the authenticated user's account.
    async fn create_repository(
        &self,
        token: &AccessToken,
        name: &str,
        private: bool,
    ) -> Result<RepositoryInfo>;

    /// Fetches a file's current revision. `Ok(None)` means the file does not exist.
    async fn get_file(
        &self,
        token: &AccessToken,
        repo: &RepositoryRef,
        path: &str,
        branch: Option<&str>,
    ) -> Result<Option<RemoteFile>>;

    /// Writes one file in one commit and returns the new revision marker.
    async fn put_file(
        &self,
        token: &AccessToken,
        repo: &RepositoryRef,
        write: FileWrite<'_>,
    ) -> Result<RevisionMarker>;

    /// Returns the profile the token belongs to.
    async fn authenticated_user(&self, token: &AccessToken) -> Result<GitHubUser>;
}
