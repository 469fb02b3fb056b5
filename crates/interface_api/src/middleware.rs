//! API middleware

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};
use chrono::Utc;
use tracing::{info, warn};

use crate::auth::{extract_token, AuthError, Authentication};
use crate::state::AppState;

/// Authentication middleware
///
/// Resolves the presented credential once per request and records the
/// outcome in the request extensions. Anonymous requests pass through
/// untouched; handlers that need a user reject them via `CurrentUser`.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let outcome = extract_token(request.headers()).map(|token| {
        match state.identity.authenticate(token) {
            Ok(actor) => Authentication::Authenticated(actor),
            Err(e) => {
                warn!(error = %e, "Token validation failed");
                Authentication::Rejected(AuthError::InvalidToken.to_string())
            }
        }
    });

    if let Some(outcome) = outcome {
        request.extensions_mut().insert(outcome);
    }

    next.run(request).await
}

/// Audit logging middleware
///
/// Logs every API request with the acting user and outcome
pub async fn audit_middleware(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let user_id = match request.extensions().get::<Authentication>() {
        Some(Authentication::Authenticated(actor)) => actor.id.to_string(),
        Some(Authentication::Rejected(_)) => "rejected".to_string(),
        None => "anonymous".to_string(),
    };

    let start = Utc::now();

    let response = next.run(request).await;

    let duration = Utc::now() - start;
    let status = response.status();

    info!(
        method = %method,
        uri = %uri,
        user = %user_id,
        status = %status.as_u16(),
        duration_ms = duration.num_milliseconds(),
        "API request"
    );

    response
}
