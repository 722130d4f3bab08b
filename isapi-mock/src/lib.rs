//! isapi-mock library - simulated ISAPI device
//!
//! Emulates the two ISAPI endpoints a recording client needs:
//! - `GET /ISAPI/System/deviceInfo`
//! - `POST /ISAPI/ContentMgmt/search`
//!
//! Every request passes through the Digest auth gate first.

use std::sync::Arc;

use axum::Router;
use isapi_common::api::{AuthMode, ChallengeToken, CredentialVerifier, FullDigest, ShapeOnly};
use isapi_common::config::MockConfig;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod cli;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Process-wide challenge nonce
    pub token: Arc<ChallengeToken>,
    /// Credential verification strategy
    pub verifier: Arc<dyn CredentialVerifier>,
    /// Realm advertised in challenges
    pub realm: Arc<str>,
}

impl AppState {
    /// Create state from resolved configuration
    pub fn new(config: &MockConfig) -> Self {
        let verifier: Arc<dyn CredentialVerifier> = match config.auth_mode {
            AuthMode::ShapeOnly => Arc::new(ShapeOnly),
            AuthMode::FullDigest => Arc::new(FullDigest::new(
                config.username.as_str(),
                config.password.as_str(),
                config.realm.as_str(),
            )),
        };
        Self::with_parts(config.realm.as_str(), verifier, ChallengeToken::new())
    }

    /// Create state from explicit parts
    pub fn with_parts(
        realm: &str,
        verifier: Arc<dyn CredentialVerifier>,
        token: ChallengeToken,
    ) -> Self {
        Self {
            token: Arc::new(token),
            verifier,
            realm: Arc::from(realm),
        }
    }
}

/// Build application router
///
/// All paths are routed to one dispatcher, which matches ISAPI endpoints by
/// method and path substring. The auth gate wraps every route.
pub fn build_router(state: AppState) -> Router {
    use axum::middleware;
    use axum::routing::any;

    Router::new()
        .route("/", any(api::dispatch))
        .route("/*path", any(api::dispatch))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            api::auth_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
