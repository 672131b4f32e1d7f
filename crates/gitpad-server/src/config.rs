//! Command-line and environment configuration.

use clap::Parser;
use gitpad_core::PublishOptions;
use gitpad_github::auth::{OAuthConfig, DEFAULT_WEB_URL};
use gitpad_github::DEFAULT_API_URL;
use std::net::SocketAddr;

/// gitpad backend: GitHub OAuth proxy and repository publisher
#[derive(Parser, Clone)]
#[command(name = "gitpad-server")]
#[command(about = "OAuth and publish proxy backend for the gitpad editor", long_about = None)]
#[command(version)]
pub struct ServerConfig {
    /// Address to listen on
    #[arg(long, env = "GITPAD_BIND", default_value = "127.0.0.1:3001")]
    pub bind: SocketAddr,

    /// Frontend origin; allowed by CORS and the target of the OAuth callback redirect
    #[arg(long, env = "GITPAD_FRONTEND_URL", default_value = "http://localhost:3000")]
    pub frontend_url: String,

    /// Public URL of this server; the OAuth redirect URI is `<public-url>/callback`
    #[arg(long, env = "GITPAD_PUBLIC_URL", default_value = "http://localhost:3001")]
    pub public_url: String,

    /// GitHub OAuth application client ID
    #[arg(long, env = "GITHUB_CLIENT_ID", hide_env_values = true)]
    pub client_id: String,

    /// GitHub OAuth application client secret
    #[arg(long, env = "GITHUB_CLIENT_SECRET", hide_env_values = true)]
    pub client_secret: String,

    /// GitHub REST API root
    #[arg(long, env = "GITPAD_GITHUB_API_URL", default_value = DEFAULT_API_URL)]
    pub github_api_url: String,

    /// GitHub web root hosting the OAuth pages
    #[arg(long, env = "GITPAD_GITHUB_WEB_URL", default_value = DEFAULT_WEB_URL)]
    pub github_web_url: String,

    /// Create missing repositories as private
    #[arg(long, env = "GITPAD_PRIVATE_REPOS")]
    pub private_repos: bool,

    /// Skip the commit when the remote file already has the same content
    #[arg(long, env = "GITPAD_SKIP_UNCHANGED")]
    pub skip_unchanged: bool,

    /// Enable verbose output (-v debug, -vv trace); RUST_LOG takes precedence
    #[arg(long, short = 'v', action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl ServerConfig {
    /// Where GitHub sends the browser back after authorization.
    pub fn redirect_uri(&self) -> String {
        format!("{}/callback", self.public_url.trim_end_matches('/'))
    }

    /// OAuth registration for the code exchange.
    pub fn oauth(&self) -> OAuthConfig {
        OAuthConfig::new(
            self.client_id.clone(),
            self.client_secret.clone(),
            self.redirect_uri(),
        )
        .with_web_url(self.github_web_url.clone())
    }

    /// Options applied to every publish.
    pub fn publish_options(&self) -> PublishOptions {
        PublishOptions {
            private: self.private_repos,
            skip_unchanged: self.skip_unchanged,
        }
    }

    /// Default log filter for the configured verbosity.
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }
}
