//! Core publish logic for gitpad.
//!
//! This crate holds the session state and the repository-publish workflow:
//! make sure a repository exists, then commit one file to it. It performs no
//! HTTP itself; all remote access goes through the [`remote::RemoteApi`] trait,
//! implemented for GitHub by `gitpad-github`.
//!
//! # Modules
//!
//! - `session`: Access token store and session
//! - `types`: Repository references, file targets, requests and outcomes
//! - `remote`: The remote API seam
//! - `resolver`: Repository existence check and creation
//! - `publisher`: Single-file create-or-update
//! - `workflow`: Resolver + publisher orchestration with per-repository exclusion
//! - `error`: Core error types

#![deny(missing_docs)]
#![deny(clippy::all)]

pub mod error;
pub mod publisher;
pub mod remote;
pub mod resolver;
pub mod session;
pub mod types;
pub mod workflow;

pub use error::{PublishError, ResolverFailed, ValidationError};
pub use publisher::CommitPublisher;
pub use remote::{FileWrite, GitHubUser, RemoteApi, RemoteFile, RepositoryInfo};
pub use resolver::RepositoryResolver;
pub use session::{AccessToken, Session, TokenStore};
pub use types::{
    FileTarget, PublishOutcome, PublishRequest, RepositoryRef, Resolution, RevisionMarker,
    DEFAULT_COMMIT_MESSAGE,
};
pub use workflow::{InFlight, InFlightGuard, PublishOptions, PublishWorkflow, WorkflowState};
