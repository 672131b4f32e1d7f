//! Ensures a target repository exists before anything is committed to it.

use crate::error::{PublishError, ResolverFailed};
use crate::remote::RemoteApi;
use crate::session::Session;
use crate::types::{RepositoryRef, Resolution};
use crate::workflow::PublishOptions;
use std::sync::Arc;

/// Looks a repository up and creates it when the remote reports it missing.
#[derive(Clone)]
pub struct RepositoryResolver {
    session: Arc<Session>,
    remote: Arc<dyn RemoteApi>,
    private: bool,
}

impl RepositoryResolver {
    /// Creates a resolver that creates missing repositories as public.
    pub fn new(session: Arc<Session>, remote: Arc<dyn RemoteApi>) -> Self {
        Self::with_options(session, remote, &PublishOptions::default())
    }

    /// Creates a resolver honouring the visibility in `options`.
    pub fn with_options(
        session: Arc<Session>,
        remote: Arc<dyn RemoteApi>,
        options: &PublishOptions,
    ) -> Self {
        Self {
            session,
            remote,
            private: options.private,
        }
    }

    /// Guarantees `repo` exists.
    ///
    /// An existing repository is never recreated or modified. A missing one is
    /// created under the authenticated user's account. Any failure other than
    /// "not found" is returned as-is; nothing is retried.
    ///
    /// # Errors
    ///
    /// * `Unauthenticated` - no token in the session (no request is made)
    /// * `InvalidRequest` - the repository would have to be created under an
    ///   account other than the authenticated one
    /// * any remote failure from the lookup or the create call
    pub async fn ensure_exists(&self, repo: &RepositoryRef) -> Result<Resolution, ResolverFailed> {
        let token = self.session.get_token()?;

        if self.remote.get_repository(&token, repo).await?.is_some() {
            tracing::debug!(repository = %repo, "repository already exists");
            return Ok(Resolution {
                already_existed: true,
            });
        }

        if let Some(login) = self.session.owner_login() {
            if !login.eq_ignore_ascii_case(repo.owner()) {
                return Err(PublishError::invalid(format!(
                    "repository {} does not exist and cannot be created: signed in as {}",
                    repo, login
                ))
                .into());
            }
        }

        let created = self
            .remote
            .create_repository(&token, repo.name(), self.private)
            .await?;
        tracing::info!(
            repository = %repo,
            private = created.private,
            "created repository"
        );

        Ok(Resolution {
            already_existed: false,
        })
    }
}
