//! Digest authentication middleware
//!
//! Wraps [`isapi_common::api::authenticate`] for axum. Rejections rotate the
//! process-wide nonce and answer with a fresh `WWW-Authenticate` challenge.

use axum::{
    extract::{Request, State},
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE, WWW_AUTHENTICATE},
        StatusCode,
    },
    middleware::Next,
    response::{IntoResponse, Response},
};
use isapi_common::api::{authenticate, challenge_header, AuthRejection, DigestContext};
use tracing::{info, warn};

use crate::AppState;

/// Authentication middleware
///
/// Applied to every route, including unknown paths, so an unauthenticated
/// client always sees a 401 before it sees a 404.
pub async fn auth_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AuthChallenge> {
    let current_nonce = state.token.current();
    let outcome = {
        let header = request
            .headers()
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok());
        let uri = request
            .uri()
            .path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or("/");
        let ctx = DigestContext {
            method: request.method().as_str(),
            uri,
            current_nonce: &current_nonce,
        };
        authenticate(header, state.verifier.as_ref(), &ctx)
    };

    match outcome {
        Ok(credentials) => {
            info!(
                username = credentials.username().unwrap_or_default(),
                "Digest authentication accepted"
            );
            Ok(next.run(request).await)
        }
        Err(reason) => {
            // Advertise exactly the nonce this rotation installed
            let nonce = state.token.rotate();
            warn!(%reason, path = %request.uri().path(), "Digest authentication rejected");
            Err(AuthChallenge {
                realm: state.realm.to_string(),
                nonce,
                reason,
            })
        }
    }
}

/// 401 response carrying a Digest challenge
#[derive(Debug)]
pub struct AuthChallenge {
    pub realm: String,
    pub nonce: String,
    pub reason: AuthRejection,
}

impl IntoResponse for AuthChallenge {
    fn into_response(self) -> Response {
        (
            StatusCode::UNAUTHORIZED,
            [
                (WWW_AUTHENTICATE, challenge_header(&self.realm, &self.nonce)),
                (CONTENT_TYPE, "text/html".to_string()),
            ],
            "Unauthorized",
        )
            .into_response()
    }
}
