use anyhow::{Context, Result};
use clap::Parser;
use gitpad_github::{GitHubClient, OAuthApp};
use gitpad_server::{app, AppState, ServerConfig};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    let config = ServerConfig::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(config.log_level())),
        )
        .with_target(false)
        .init();

    let remote = GitHubClient::with_api_url(config.github_api_url.clone());
    tracing::info!("GitHub API: {}", remote.api_url());
    tracing::info!("OAuth redirect URI: {}", config.redirect_uri());

    let state = AppState::new(
        Arc::new(remote),
        OAuthApp::new(config.oauth()),
        config.publish_options(),
        config.frontend_url.clone(),
    );

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.bind))?;
    tracing::info!("listening on {}", config.bind);
    axum::serve(listener, app(state)).await?;

    Ok(())
}
