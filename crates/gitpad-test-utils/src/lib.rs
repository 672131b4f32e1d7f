//! Shared test utilities for gitpad.
//!
//! [`InMemoryGitHub`] is a [`RemoteApi`] fake that keeps repositories and files
//! in memory and enforces revision markers the way GitHub does. It records
//! every call, can inject failures, and can hold a repository lookup open so
//! tests can observe a workflow mid-flight.

#![allow(missing_docs)]

use async_trait::async_trait;
use gitpad_core::{
    AccessToken, FileWrite, GitHubUser, PublishError, RemoteApi, RemoteFile, RepositoryInfo,
    RepositoryRef, RevisionMarker,
};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

/// Remote operation names, used for call accounting and failure injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    GetRepository,
    CreateRepository,
    GetFile,
    PutFile,
    AuthenticatedUser,
}

/// Stored file: content plus its current marker.
type FileStorage = HashMap<(RepositoryRef, String), (Vec<u8>, RevisionMarker)>;

#[derive(Default)]
struct State {
    repositories: HashSet<RepositoryRef>,
    files: FileStorage,
    calls: Vec<Operation>,
    failures: HashMap<Operation, PublishError>,
    gates: HashMap<RepositoryRef, Gate>,
}

/// Pauses a repository lookup until released.
#[derive(Clone, Default)]
pub struct Gate {
    entered: Arc<Notify>,
    release: Arc<Notify>,
}

impl Gate {
    /// Waits until the held call has started.
    pub async fn entered(&self) {
        self.entered.notified().await;
    }

    /// Lets the held call continue.
    pub fn release(&self) {
        self.release.notify_one();
    }
}

/// In-memory stand-in for the GitHub REST API.
#[derive(Clone)]
pub struct InMemoryGitHub {
    login: String,
    accepted_token: Option<String>,
    state: Arc<Mutex<State>>,
}

impl InMemoryGitHub {
    /// Creates an empty remote whose authenticated user is `login`.
    pub fn new(login: impl Into<String>) -> Self {
        Self {
            login: login.into(),
            accepted_token: None,
            state: Arc::new(Mutex::new(State::default())),
        }
    }

    /// Rejects every token except `token` with `Unauthenticated`.
    pub fn accepting_only(mut self, token: impl Into<String>) -> Self {
        self.accepted_token = Some(token.into());
        self
    }

    /// Adds an existing repository.
    pub fn add_repository(&self, repo: &RepositoryRef) {
        self.state.lock().unwrap().repositories.insert(repo.clone());
    }

    /// Adds a file with a marker derived from its content and returns the marker.
    pub fn add_file(&self, repo: &RepositoryRef, path: &str, content: &[u8]) -> RevisionMarker {
        let marker = marker_for(content);
        self.add_file_at(repo, path, content, marker.clone());
        marker
    }

    /// Adds a file with an explicit marker. The repository is added too.
    pub fn add_file_at(
        &self,
        repo: &RepositoryRef,
        path: &str,
        content: &[u8],
        marker: RevisionMarker,
    ) {
        let mut state = self.state.lock().unwrap();
        state.repositories.insert(repo.clone());
        state
            .files
            .insert((repo.clone(), path.to_string()), (content.to_vec(), marker));
    }

    /// Whether `repo` exists.
    pub fn has_repository(&self, repo: &RepositoryRef) -> bool {
        self.state.lock().unwrap().repositories.contains(repo)
    }

    /// Content and marker of a stored file.
    pub fn file(&self, repo: &RepositoryRef, path: &str) -> Option<(Vec<u8>, RevisionMarker)> {
        self.state
            .lock()
            .unwrap()
            .files
            .get(&(repo.clone(), path.to_string()))
            .cloned()
    }

    /// Makes the next call to `operation` fail with `error`.
    pub fn fail_next(&self, operation: Operation, error: PublishError) {
        self.state.lock().unwrap().failures.insert(operation, error);
    }

    /// Holds the next lookup of `repo` until the returned gate is released.
    pub fn hold_lookup(&self, repo: &RepositoryRef) -> Gate {
        let gate = Gate::default();
        self.state
            .lock()
            .unwrap()
            .gates
            .insert(repo.clone(), gate.clone());
        gate
    }

    /// Every call made so far, in order.
    pub fn calls(&self) -> Vec<Operation> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Number of calls made to `operation`.
    pub fn call_count(&self, operation: Operation) -> usize {
        self.calls().into_iter().filter(|c| *c == operation).count()
    }

    fn begin(&self, token: &AccessToken, operation: Operation) -> Result<(), PublishError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(operation);
        if let Some(accepted) = &self.accepted_token {
            if token.expose() != accepted {
                return Err(PublishError::Unauthenticated);
            }
        }
        match state.failures.remove(&operation) {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

/// Deterministic content-derived marker, standing in for a blob sha.
pub fn marker_for(content: &[u8]) -> RevisionMarker {
    let hash = content
        .iter()
        .fold(0xcbf2_9ce4_8422_2325u64, |acc, &b| {
            (acc ^ b as u64).wrapping_mul(0x0100_0000_01b3)
        });
    RevisionMarker::new(format!("{:016x}", hash))
}

#[async_trait]
impl RemoteApi for InMemoryGitHub {
    async fn get_repository(
        &self,
        token: &AccessToken,
        repo: &RepositoryRef,
    ) -> Result<Option<RepositoryInfo>, PublishError> {
        self.begin(token, Operation::GetRepository)?;

        let gate = self.state.lock().unwrap().gates.remove(repo);
        if let Some(gate) = gate {
            gate.entered.notify_one();
            gate.release.notified().await;
        }

        let exists = self.has_repository(repo);
        Ok(exists.then(|| RepositoryInfo {
            owner: repo.owner().to_string(),
            name: repo.name().to_string(),
            private: false,
            default_branch: Some("main".to_string()),
            html_url: Some(format!("https://github.com/{}", repo)),
        }))
    }

    async fn create_repository(
        &self,
        token: &AccessToken,
        name: &str,
        private: bool,
    ) -> Result<RepositoryInfo, PublishError> {
        self.begin(token, Operation::CreateRepository)?;

        let repo = RepositoryRef::new(self.login.clone(), name)
            .map_err(|e| PublishError::rejected(422, e.to_string()))?;
        let mut state = self.state.lock().unwrap();
        if !state.repositories.insert(repo.clone()) {
            return Err(PublishError::rejected(
                422,
                "Repository creation failed.: name already exists on this account",
            ));
        }

        Ok(RepositoryInfo {
            owner: self.login.clone(),
            name: name.to_string(),
            private,
            default_branch: Some("main".to_string()),
            html_url: Some(format!("https://github.com/{}", repo)),
        })
    }

    async fn get_file(
        &self,
        token: &AccessToken,
        repo: &RepositoryRef,
        path: &str,
        _branch: Option<&str>,
    ) -> Result<Option<RemoteFile>, PublishError> {
        self.begin(token, Operation::GetFile)?;

        Ok(self.file(repo, path).map(|(content, revision)| RemoteFile {
            revision,
            content: Some(content),
        }))
    }

    async fn put_file(
        &self,
        token: &AccessToken,
        repo: &RepositoryRef,
        write: FileWrite<'_>,
    ) -> Result<RevisionMarker, PublishError> {
        self.begin(token, Operation::PutFile)?;

        let mut state = self.state.lock().unwrap();
        if !state.repositories.contains(repo) {
            return Err(PublishError::rejected(404, "Not Found"));
        }

        let key = (repo.clone(), write.path.to_string());
        match (state.files.get(&key), write.revision) {
            (Some((_, current)), Some(supplied)) if current != supplied => {
                return Err(PublishError::Conflict);
            }
            (Some(_), None) => return Err(PublishError::Conflict),
            (None, Some(_)) => {
                return Err(PublishError::rejected(422, "sha does not match any file"));
            }
            _ => {}
        }

        let marker = marker_for(write.content);
        state
            .files
            .insert(key, (write.content.to_vec(), marker.clone()));
        Ok(marker)
    }

    async fn authenticated_user(&self, token: &AccessToken) -> Result<GitHubUser, PublishError> {
        self.begin(token, Operation::AuthenticatedUser)?;

        Ok(GitHubUser {
            id: 1,
            login: self.login.clone(),
            name: None,
            email: None,
        })
    }
}
