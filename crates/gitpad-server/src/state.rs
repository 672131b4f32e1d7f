use gitpad_core::{InFlight, PublishOptions, RemoteApi};
use gitpad_github::OAuthApp;
use std::sync::Arc;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub remote: Arc<dyn RemoteApi>,
    pub oauth: Arc<OAuthApp>,
    /// One registry for every request, so publishes are serialized per repository.
    pub in_flight: InFlight,
    pub options: PublishOptions,
    pub frontend_url: String,
}

impl AppState {
    pub fn new(
        remote: Arc<dyn RemoteApi>,
        oauth: OAuthApp,
        options: PublishOptions,
        frontend_url: impl Into<String>,
    ) -> Self {
        Self {
            remote,
            oauth: Arc::new(oauth),
            in_flight: InFlight::new(),
            options,
            frontend_url: frontend_url.into(),
        }
    }
}
