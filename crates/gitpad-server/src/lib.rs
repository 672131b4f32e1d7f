//! gitpad backend service.
//!
//! Proxies the GitHub OAuth web flow for the browser editor (the client secret
//! never leaves the server) and exposes the repository publish workflow over
//! HTTP. Every authenticated route takes the GitHub token as
//! `Authorization: Bearer <token>`.

pub mod config;
pub mod error;
pub mod extract;
pub mod routes;
pub mod state;

use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use config::ServerConfig;
pub use state::AppState;

/// Builds the router with all routes, request tracing and CORS for the frontend origin.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);
    let cors = match HeaderValue::from_str(state.frontend_url.trim_end_matches('/')) {
        Ok(origin) => cors.allow_origin(origin),
        Err(e) => {
            tracing::warn!("frontend URL is not a valid origin, CORS disabled: {e}");
            cors
        }
    };

    Router::new()
        .route("/health", get(routes::health::health))
        // OAuth
        .route("/auth/github", get(routes::oauth::authorize))
        .route("/callback", get(routes::oauth::callback))
        .route("/exchange-code", post(routes::oauth::exchange_code))
        // GitHub proxy
        .route("/get-username", get(routes::user::username))
        .route("/repo-exists", get(routes::repos::exists))
        .route("/create-repo", post(routes::repos::create))
        .route("/publish", post(routes::publish::publish))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
