//! Creates or updates exactly one file in one commit.

use crate::error::PublishError;
use crate::remote::{FileWrite, RemoteApi};
use crate::session::Session;
use crate::types::{FileTarget, PublishOutcome, RepositoryRef};
use crate::workflow::PublishOptions;
use std::sync::Arc;

/// Writes a file using the revision marker as an optimistic-concurrency guard.
#[derive(Clone)]
pub struct CommitPublisher {
    session: Arc<Session>,
    remote: Arc<dyn RemoteApi>,
    skip_unchanged: bool,
}

impl CommitPublisher {
    /// Creates a publisher that always writes.
    pub fn new(session: Arc<Session>, remote: Arc<dyn RemoteApi>) -> Self {
        Self::with_options(session, remote, &PublishOptions::default())
    }

    /// Creates a publisher honouring `options.skip_unchanged`.
    pub fn with_options(
        session: Arc<Session>,
        remote: Arc<dyn RemoteApi>,
        options: &PublishOptions,
    ) -> Self {
        Self {
            session,
            remote,
            skip_unchanged: options.skip_unchanged,
        }
    }

    /// Publishes `content` to `target` in `repo`.
    ///
    /// The current revision of the path is fetched first. When the target
    /// carries a revision of its own it must match the current one: a mismatch
    /// is a `Conflict`, and a revision for a file that does not exist is an
    /// `InvalidRequest`. Neither case issues a write, and conflicts are never
    /// retried with a refetched marker.
    ///
    /// Returns `Created` when the file did not exist before, `Updated`
    /// otherwise, or `AlreadyUpToDate` when unchanged content is skipped.
    pub async fn publish(
        &self,
        repo: &RepositoryRef,
        target: &FileTarget,
        content: &[u8],
        message: &str,
        branch: Option<&str>,
    ) -> PublishOutcome {
        match self.try_publish(repo, target, content, message, branch).await {
            Ok(outcome) => outcome,
            Err(error) => {
                tracing::warn!(
                    repository = %repo,
                    path = target.path(),
                    kind = error.kind(),
                    "publish failed: {}",
                    error
                );
                PublishOutcome::failed(error)
            }
        }
    }

    async fn try_publish(
        &self,
        repo: &RepositoryRef,
        target: &FileTarget,
        content: &[u8],
        message: &str,
        branch: Option<&str>,
    ) -> Result<PublishOutcome, PublishError> {
        if message.trim().is_empty() {
            return Err(PublishError::invalid("commit message cannot be empty"));
        }

        let token = self.session.get_token()?;
        let current = self
            .remote
            .get_file(&token, repo, target.path(), branch)
            .await?;

        match (target.revision(), &current) {
            (Some(supplied), None) => {
                return Err(PublishError::invalid(format!(
                    "revision {} supplied for {}, which does not exist",
                    supplied,
                    target.path()
                )));
            }
            (Some(supplied), Some(file)) if *supplied != file.revision => {
                tracing::debug!(
                    path = target.path(),
                    supplied = %supplied,
                    current = %file.revision,
                    "stale revision marker"
                );
                return Err(PublishError::Conflict);
            }
            _ => {}
        }

        if self.skip_unchanged {
            if let Some(file) = &current {
                if file.content.as_deref() == Some(content) {
                    tracing::debug!(path = target.path(), "content unchanged, skipping write");
                    return Ok(PublishOutcome::AlreadyUpToDate {
                        revision: file.revision.clone(),
                    });
                }
            }
        }

        let previous = current.map(|file| file.revision);
        let write = FileWrite {
            path: target.path(),
            content,
            message,
            revision: previous.as_ref(),
            branch,
        };
        let revision = self.remote.put_file(&token, repo, write).await?;

        tracing::info!(
            repository = %repo,
            path = target.path(),
            revision = %revision,
            created = previous.is_none(),
            "committed file"
        );

        Ok(match previous {
            None => PublishOutcome::Created { revision },
            Some(_) => PublishOutcome::Updated { revision },
        })
    }
}
