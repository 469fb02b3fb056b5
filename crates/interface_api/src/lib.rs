//! HTTP API Layer
//!
//! This crate provides the REST API for the campus lost-and-found service
//! using Axum.
//!
//! # Architecture
//!
//! - **Handlers**: item, claim, and notification endpoints
//! - **Middleware**: credential resolution and audit logging
//! - **DTOs**: camelCase request/response bodies
//! - **Error Handling**: `{error, message}` bodies with consistent status codes
//!
//! # Example
//!
//! ```rust,ignore
//! use interface_api::{create_router, AppState, Ports};
//!
//! let state = AppState::new(Ports::postgres(pool), config);
//! let app = create_router(state);
//! axum::serve(listener, app).await?;
//! ```

pub mod auth;
pub mod config;
pub mod dto;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod state;

use axum::{
    error_handling::HandleErrorLayer,
    middleware as axum_middleware,
    routing::{get, post, put},
    BoxError, Router,
};
use tower::timeout::{error::Elapsed, TimeoutLayer};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::error::ApiError;
use crate::handlers::{health, items, notifications};
use crate::middleware::{audit_middleware, auth_middleware};

pub use crate::state::{sweep_retention, AppState, Ports};

/// Creates the main API router
///
/// Item reads are public; every other `/api` route requires a credential,
/// enforced per handler by the `CurrentUser` extractor.
pub fn create_router(state: AppState) -> Router {
    let timeout = state.config.request_timeout();

    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check));

    let item_routes = Router::new()
        .route("/", get(items::list_items).post(items::create_item))
        .route("/user", get(items::list_my_items))
        .route(
            "/:id",
            get(items::get_item)
                .put(items::update_item)
                .delete(items::delete_item),
        )
        .route("/:id/claim", post(items::claim_item))
        .route("/:id/process-claim", put(items::process_claim));

    let user_routes = Router::new()
        .route(
            "/notifications",
            get(notifications::list_notifications).put(notifications::mark_all_read),
        )
        .route("/notifications/:id", put(notifications::mark_read));

    let api_routes = Router::new()
        .nest("/items", item_routes)
        .nest("/users", user_routes)
        .layer(axum_middleware::from_fn(audit_middleware))
        .layer(axum_middleware::from_fn_with_state(state.clone(), auth_middleware));

    // Combine all routes
    Router::new()
        .merge(public_routes)
        .nest("/api", api_routes)
        .layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(handle_timeout))
                .layer(TimeoutLayer::new(timeout)),
        )
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

/// Answers requests cut off by the timeout layer with a JSON body
///
/// Claim transitions run to completion on their own task, so a timed-out
/// claim may still have been applied.
async fn handle_timeout(err: BoxError) -> ApiError {
    if err.is::<Elapsed>() {
        tracing::warn!("Request exceeded the configured timeout");
        ApiError::Timeout("Request timed out".to_string())
    } else {
        ApiError::Internal(err.to_string())
    }
}
