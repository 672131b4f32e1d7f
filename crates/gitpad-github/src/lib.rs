//! GitHub adapter for gitpad.
//!
//! This crate implements the `RemoteApi` port from `gitpad-core` on top of the
//! GitHub REST API, and the OAuth web flow the backend uses to turn a
//! one-time authorization code into an access token.
//!
//! # Modules
//!
//! - `auth`: OAuth web application flow
//! - `client`: Repository, contents and user endpoints
//! - `error`: GitHub error types and their mapping onto publish errors

#![deny(missing_docs)]
#![deny(clippy::all)]

pub mod auth;
pub mod client;
pub mod error;

pub use auth::{OAuthApp, OAuthConfig, OAuthToken};
pub use client::{GitHubClient, DEFAULT_API_URL};
pub use error::{GitHubError, Result};
