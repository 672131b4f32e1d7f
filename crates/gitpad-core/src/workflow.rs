//! The publish workflow: ensure the repository exists, then commit the file.
//!
//! # States
//!
//! `Idle -> ResolvingRepo -> Publishing -> {Succeeded | Failed}`
//!
//! At most one run per repository is in flight at a time. A second run for a
//! repository that is resolving or publishing is answered with
//! [`PublishOutcome::Busy`]; runs for other repositories proceed concurrently.
//! The in-flight slot is taken before the first network call and released by a
//! guard, so it is freed on success, failure, panic and when the run future is
//! dropped.

use crate::publisher::CommitPublisher;
use crate::remote::RemoteApi;
use crate::resolver::RepositoryResolver;
use crate::session::Session;
use crate::types::{PublishOutcome, PublishRequest, RepositoryRef};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

/// Tunables shared by the resolver and publisher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PublishOptions {
    /// Create missing repositories as private.
    pub private: bool,
    /// Report `AlreadyUpToDate` without writing when remote content already matches.
    pub skip_unchanged: bool,
}

/// Where a repository's publish currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowState {
    /// Nothing in flight.
    Idle,
    /// Looking up or creating the repository.
    ResolvingRepo,
    /// Writing the file.
    Publishing,
    /// Finished with a successful outcome.
    Succeeded,
    /// Finished with a failure.
    Failed,
}

/// Registry of repositories with a publish in flight.
///
/// Entries are keyed by [`RepositoryRef::key`], so references differing only
/// in letter case share one slot. Cloning shares the registry, so one instance
/// can guard every workflow in a process.
#[derive(Debug, Clone, Default)]
pub struct InFlight {
    active: Arc<Mutex<HashMap<(String, String), WorkflowState>>>,
}

impl InFlight {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims `repo`, or returns `None` if a run for it is already in flight.
    pub fn try_acquire(&self, repo: &RepositoryRef) -> Option<InFlightGuard> {
        let key = repo.key();
        let mut active = self.active.lock().unwrap_or_else(PoisonError::into_inner);
        if active.contains_key(&key) {
            return None;
        }
        active.insert(key.clone(), WorkflowState::ResolvingRepo);
        Some(InFlightGuard {
            registry: self.clone(),
            key,
        })
    }

    /// Current state for `repo`; `Idle` when nothing is in flight.
    pub fn state(&self, repo: &RepositoryRef) -> WorkflowState {
        self.active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&repo.key())
            .copied()
            .unwrap_or(WorkflowState::Idle)
    }

    /// Number of repositories with a run in flight.
    pub fn len(&self) -> usize {
        self.active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether no run is in flight.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Holds a repository's in-flight slot; releases it on drop.
#[derive(Debug)]
pub struct InFlightGuard {
    registry: InFlight,
    key: (String, String),
}

impl InFlightGuard {
    /// Records a state transition for the held repository.
    pub fn advance(&self, state: WorkflowState) {
        let mut active = self
            .registry
            .active
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(current) = active.get_mut(&self.key) {
            *current = state;
        }
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.registry
            .active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.key);
    }
}

/// Composes [`RepositoryResolver`] and [`CommitPublisher`] into one operation.
#[derive(Clone)]
pub struct PublishWorkflow {
    resolver: RepositoryResolver,
    publisher: CommitPublisher,
    in_flight: InFlight,
}

impl PublishWorkflow {
    /// Creates a workflow with default options and its own in-flight registry.
    pub fn new(session: Arc<Session>, remote: Arc<dyn RemoteApi>) -> Self {
        Self::with_options(session, remote, PublishOptions::default())
    }

    /// Creates a workflow with explicit options and its own in-flight registry.
    pub fn with_options(
        session: Arc<Session>,
        remote: Arc<dyn RemoteApi>,
        options: PublishOptions,
    ) -> Self {
        Self {
            resolver: RepositoryResolver::with_options(session.clone(), remote.clone(), &options),
            publisher: CommitPublisher::with_options(session, remote, &options),
            in_flight: InFlight::new(),
        }
    }

    /// Shares `in_flight` with other workflows so runs across all of them are
    /// serialized per repository.
    pub fn sharing(mut self, in_flight: InFlight) -> Self {
        self.in_flight = in_flight;
        self
    }

    /// Current state of the run for `repo`, if any.
    pub fn state(&self, repo: &RepositoryRef) -> WorkflowState {
        self.in_flight.state(repo)
    }

    /// Ensures the repository exists, then commits the file.
    ///
    /// Resolution always completes before publishing starts. A resolution
    /// failure ends the run without attempting the write. Nothing is retried;
    /// the caller decides whether to run again.
    pub async fn run(&self, request: PublishRequest) -> PublishOutcome {
        let repo = &request.repository;
        let Some(guard) = self.in_flight.try_acquire(repo) else {
            tracing::debug!(repository = %repo, "publish already in flight");
            return PublishOutcome::Busy;
        };

        tracing::debug!(repository = %repo, path = request.file.path(), "resolving repository");
        let resolution = match self.resolver.ensure_exists(repo).await {
            Ok(resolution) => resolution,
            Err(failed) => {
                guard.advance(WorkflowState::Failed);
                tracing::warn!(repository = %repo, "{}", failed);
                return PublishOutcome::failed(failed.into_cause());
            }
        };

        guard.advance(WorkflowState::Publishing);
        tracing::debug!(
            repository = %repo,
            already_existed = resolution.already_existed,
            "publishing file"
        );
        let outcome = self
            .publisher
            .publish(
                repo,
                &request.file,
                &request.content,
                &request.commit_message,
                request.branch.as_deref(),
            )
            .await;

        guard.advance(if outcome.is_success() {
            WorkflowState::Succeeded
        } else {
            WorkflowState::Failed
        });
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repo(name: &str) -> RepositoryRef {
        RepositoryRef::new("octocat", name).unwrap()
    }

    #[test]
    fn test_acquire_marks_repository_resolving() {
        let in_flight = InFlight::new();
        let guard = in_flight.try_acquire(&repo("demo")).unwrap();
        assert_eq!(in_flight.state(&repo("demo")), WorkflowState::ResolvingRepo);

        guard.advance(WorkflowState::Publishing);
        assert_eq!(in_flight.state(&repo("demo")), WorkflowState::Publishing);
    }

    #[test]
    fn test_second_acquire_for_same_repository_is_refused() {
        let in_flight = InFlight::new();
        let _guard = in_flight.try_acquire(&repo("demo")).unwrap();
        assert!(in_flight.try_acquire(&repo("demo")).is_none());
        assert!(in_flight.try_acquire(&repo("other")).is_some());
    }

    #[test]
    fn test_drop_releases_slot() {
        let in_flight = InFlight::new();
        {
            let _guard = in_flight.try_acquire(&repo("demo")).unwrap();
            assert_eq!(in_flight.len(), 1);
        }
        assert!(in_flight.is_empty());
        assert_eq!(in_flight.state(&repo("demo")), WorkflowState::Idle);
        assert!(in_flight.try_acquire(&repo("demo")).is_some());
    }

    #[test]
    fn test_panic_releases_slot() {
        let in_flight = InFlight::new();
        let shared = in_flight.clone();
        let result = std::panic::catch_unwind(move || {
            let _guard = shared.try_acquire(&repo("demo")).unwrap();
            panic!("publish blew up");
        });
        assert!(result.is_err());
        assert!(in_flight.is_empty());
    }

    #[test]
    fn test_case_variants_share_one_slot() {
        let in_flight = InFlight::new();
        let _guard = in_flight.try_acquire(&repo("demo")).unwrap();
        let shouted = RepositoryRef::new("OctoCat", "DEMO").unwrap();

        assert!(in_flight.try_acquire(&shouted).is_none());
        assert_eq!(in_flight.state(&shouted), WorkflowState::ResolvingRepo);
    }

    #[test]
    fn test_clones_share_registry() {
        let first = InFlight::new();
        let second = first.clone();
        let _guard = first.try_acquire(&repo("demo")).unwrap();
        assert!(second.try_acquire(&repo("demo")).is_none());
    }
}
