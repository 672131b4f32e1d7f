//! Publish data model: repository references, file targets, requests and outcomes.

use crate::error::{PublishError, ValidationError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Commit message used when the caller supplies none.
pub const DEFAULT_COMMIT_MESSAGE: &str = "Update from gitpad";

/// Identifies a target repository as `owner/name`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct RepositoryRef {
    owner: String,
    name: String,
}

impl RepositoryRef {
    /// Maximum length of a GitHub login.
    pub const MAX_OWNER_LENGTH: usize = 39;

    /// Maximum length of a GitHub repository name.
    pub const MAX_NAME_LENGTH: usize = 100;

    /// Creates a validated repository reference.
    pub fn new(
        owner: impl Into<String>,
        name: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let owner = owner.into();
        let name = name.into();
        validate_owner(&owner)?;
        validate_name(&name)?;
        Ok(Self { owner, name })
    }

    /// Repository owner (user or organization login).
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Repository name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Case-folded `(owner, name)`. GitHub resolves both case-insensitively,
    /// so two references with equal keys name the same repository.
    pub fn key(&self) -> (String, String) {
        (self.owner.to_ascii_lowercase(), self.name.to_ascii_lowercase())
    }
}

impl fmt::Display for RepositoryRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

impl FromStr for RepositoryRef {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('/') {
            Some((owner, name)) if !name.contains('/') => Self::new(owner, name),
            _ => Err(ValidationError::InvalidReference(s.to_string())),
        }
    }
}

fn validate_owner(owner: &str) -> Result<(), ValidationError> {
    let reject = |reason: &str| ValidationError::InvalidOwner {
        owner: owner.to_string(),
        reason: reason.to_string(),
    };

    if owner.is_empty() {
        return Err(reject("owner cannot be empty"));
    }
    if owner.len() > RepositoryRef::MAX_OWNER_LENGTH {
        return Err(reject("owner exceeds 39 characters"));
    }
    if !owner.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
        return Err(reject("only alphanumeric characters and hyphens are allowed"));
    }
    if owner.starts_with('-') || owner.ends_with('-') || owner.contains("--") {
        return Err(reject(
            "hyphens cannot lead, trail or appear consecutively",
        ));
    }
    Ok(())
}

fn validate_name(name: &str) -> Result<(), ValidationError> {
    let reject = |reason: &str| ValidationError::InvalidRepositoryName {
        name: name.to_string(),
        reason: reason.to_string(),
    };

    if name.is_empty() {
        return Err(reject("name cannot be empty"));
    }
    if name.len() > RepositoryRef::MAX_NAME_LENGTH {
        return Err(reject("name exceeds 100 characters"));
    }
    if name == "." || name == ".." {
        return Err(reject("name is reserved"));
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
    {
        return Err(reject(
            "only alphanumeric characters, hyphens, underscores and periods are allowed",
        ));
    }
    Ok(())
}

/// Opaque content-version tag for a file (GitHub's blob sha).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RevisionMarker(String);

impl RevisionMarker {
    /// Wraps a marker reported by the remote.
    pub fn new(marker: impl Into<String>) -> Self {
        Self(marker.into())
    }

    /// Returns the marker text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RevisionMarker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A file inside a repository, optionally pinned to the revision the caller last saw.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileTarget {
    path: String,
    revision: Option<RevisionMarker>,
}

impl FileTarget {
    /// Creates a target for `path` with no known revision.
    pub fn new(path: impl Into<String>) -> Result<Self, ValidationError> {
        let path = path.into();
        validate_path(&path)?;
        Ok(Self {
            path,
            revision: None,
        })
    }

    /// Pins the target to the revision the caller last fetched.
    pub fn with_revision(mut self, revision: RevisionMarker) -> Self {
        self.revision = Some(revision);
        self
    }

    /// Slash-separated path relative to the repository root.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Revision marker supplied by the caller, if any.
    pub fn revision(&self) -> Option<&RevisionMarker> {
        self.revision.as_ref()
    }
}

fn validate_path(path: &str) -> Result<(), ValidationError> {
    let reject = |reason: &str| ValidationError::InvalidPath {
        path: path.to_string(),
        reason: reason.to_string(),
    };

    if path.is_empty() {
        return Err(reject("path cannot be empty"));
    }
    if path.starts_with('/') {
        return Err(reject("path must be relative to the repository root"));
    }
    if path.contains('\\') {
        return Err(reject("path must use forward slashes"));
    }
    for segment in path.split('/') {
        match segment {
            "" => return Err(reject("path contains an empty segment")),
            "." | ".." => return Err(reject("path cannot contain '.' or '..' segments")),
            _ => {}
        }
    }
    Ok(())
}

/// Everything needed to publish one file, built fresh per user action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishRequest {
    /// Repository to publish into.
    pub repository: RepositoryRef,
    /// File to create or update.
    pub file: FileTarget,
    /// Raw file content.
    pub content: Vec<u8>,
    /// Commit message; never empty.
    pub commit_message: String,
    /// Branch to commit to; the repository default branch when absent.
    pub branch: Option<String>,
}

impl PublishRequest {
    /// Builds a request, substituting [`DEFAULT_COMMIT_MESSAGE`] for a missing
    /// or blank message.
    pub fn new(
        repository: RepositoryRef,
        file: FileTarget,
        content: impl Into<Vec<u8>>,
        commit_message: Option<String>,
    ) -> Self {
        let commit_message = commit_message
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| DEFAULT_COMMIT_MESSAGE.to_string());

        Self {
            repository,
            file,
            content: content.into(),
            commit_message,
            branch: None,
        }
    }

    /// Targets a specific branch. Blank names select the default branch.
    pub fn on_branch(mut self, branch: impl Into<String>) -> Self {
        let branch = branch.into();
        self.branch = (!branch.trim().is_empty()).then(|| branch.trim().to_string());
        self
    }
}

/// Result of [`crate::resolver::RepositoryResolver::ensure_exists`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Resolution {
    /// Whether the repository was already present.
    pub already_existed: bool,
}

/// Final result of a publish.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PublishOutcome {
    /// The file did not exist and was created.
    Created {
        /// Marker of the new file revision.
        revision: RevisionMarker,
    },
    /// The file existed and was updated.
    Updated {
        /// Marker of the new file revision.
        revision: RevisionMarker,
    },
    /// The remote content already matched; nothing was written.
    AlreadyUpToDate {
        /// Marker of the unchanged revision.
        revision: RevisionMarker,
    },
    /// The publish failed.
    Failed {
        /// Why it failed.
        error: PublishError,
    },
    /// Another publish for the same repository is in flight.
    Busy,
}

impl PublishOutcome {
    /// Wraps a failure.
    pub fn failed(error: PublishError) -> Self {
        PublishOutcome::Failed { error }
    }

    /// Whether the file now holds the requested content.
    pub fn is_success(&self) -> bool {
        matches!(
            self,
            PublishOutcome::Created { .. }
                | PublishOutcome::Updated { .. }
                | PublishOutcome::AlreadyUpToDate { .. }
        )
    }

    /// Revision the file is at after a successful publish.
    pub fn revision(&self) -> Option<&RevisionMarker> {
        match self {
            PublishOutcome::Created { revision }
            | PublishOutcome::Updated { revision }
            | PublishOutcome::AlreadyUpToDate { revision } => Some(revision),
            PublishOutcome::Failed { .. } | PublishOutcome::Busy => None,
        }
    }

    /// The failure, if the publish failed.
    pub fn error(&self) -> Option<&PublishError> {
        match self {
            PublishOutcome::Failed { error } => Some(error),
            _ => None,
        }
    }
}
