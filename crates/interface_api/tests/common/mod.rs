//! Shared harness: the full router over in-memory ports

#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

use domain_items::ports::mock::{
    MockIdempotencyPort, MockItemPort, MockNotificationPort, MockUserDirectory,
};
use domain_items::{Actor, Item};
use interface_api::auth::{IdentityProvider, JwtIdentityProvider, AUTH_TOKEN_HEADER};
use interface_api::config::ApiConfig;
use interface_api::{create_router, AppState, Ports};

pub const SECRET: &str = "integration-test-secret";

pub struct TestApp {
    pub router: Router,
    pub items: Arc<MockItemPort>,
    pub notifications: Arc<MockNotificationPort>,
    pub users: Arc<MockUserDirectory>,
    pub idempotency: Arc<MockIdempotencyPort>,
    identity: JwtIdentityProvider,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_items(Vec::new())
    }

    pub fn with_items(items: Vec<Item>) -> Self {
        Self::with_config(items, ApiConfig::default())
    }

    /// Builds the app over `items`; the JWT secret is always [`SECRET`]
    pub fn with_config(items: Vec<Item>, config: ApiConfig) -> Self {
        let items = Arc::new(MockItemPort::with_items(items));
        let notifications = Arc::new(MockNotificationPort::new());
        let users = Arc::new(MockUserDirectory::new());
        let idempotency = Arc::new(MockIdempotencyPort::new());

        let ports = Ports {
            items: items.clone(),
            notifications: notifications.clone(),
            users: users.clone(),
            idempotency: idempotency.clone(),
        };
        let config = ApiConfig {
            jwt_secret: SECRET.to_string(),
            ..config
        };

        Self {
            router: create_router(AppState::new(ports, config)),
            items,
            notifications,
            users,
            idempotency,
            identity: JwtIdentityProvider::new(SECRET, 3600),
        }
    }

    pub fn token(&self, actor: &Actor) -> String {
        self.identity.issue(actor).unwrap()
    }

    /// Sends a request with an optional acting user and JSON body
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        actor: Option<&Actor>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(actor) = actor {
            builder = builder.header(AUTH_TOKEN_HEADER, self.token(actor));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.send(request).await
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, body)
    }

    pub async fn get(&self, uri: &str, actor: Option<&Actor>) -> (StatusCode, Value) {
        self.request(Method::GET, uri, actor, None).await
    }

    pub async fn post(&self, uri: &str, actor: &Actor, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, Some(actor), Some(body)).await
    }

    pub async fn put(&self, uri: &str, actor: &Actor, body: Value) -> (StatusCode, Value) {
        self.request(Method::PUT, uri, Some(actor), Some(body)).await
    }

    pub async fn claim(&self, item_id: &str, actor: &Actor) -> (StatusCode, Value) {
        self.request(
            Method::POST,
            &format!("/api/items/{item_id}/claim"),
            Some(actor),
            None,
        )
        .await
    }

    pub async fn process(&self, item_id: &str, actor: &Actor, approve: bool) -> (StatusCode, Value) {
        self.put(
            &format!("/api/items/{item_id}/process-claim"),
            actor,
            serde_json::json!({ "approve": approve }),
        )
        .await
    }
}
