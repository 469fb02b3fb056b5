//! Authentication
//!
//! Users log in elsewhere; this service only validates the bearer credential
//! they present. The credential is a JWT carrying the user id and campus role.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts, http::HeaderMap};
use chrono::{TimeDelta, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use core_kernel::UserId;
use domain_items::{Actor, Role};

use crate::error::ApiError;

/// Primary credential header
pub const AUTH_TOKEN_HEADER: &str = "x-auth-token";

/// JWT claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    pub role: Role,
    /// Expiration timestamp
    pub exp: i64,
    /// Issued at timestamp
    pub iat: i64,
}

/// Auth errors
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("No token, authorization denied")]
    MissingToken,
    #[error("Token is not valid")]
    InvalidToken,
    #[error("Token expired")]
    TokenExpired,
    #[error("Token could not be issued")]
    Issue(#[source] jsonwebtoken::errors::Error),
    #[error("Token lifetime of {0}s is out of range")]
    LifetimeOutOfRange(u64),
}

/// Creates a new JWT token
pub fn create_token(
    user_id: UserId,
    role: Role,
    secret: &str,
    expiration_secs: u64,
) -> Result<String, AuthError> {
    let now = Utc::now();
    let exp = i64::try_from(expiration_secs)
        .ok()
        .and_then(TimeDelta::try_seconds)
        .and_then(|lifetime| now.checked_add_signed(lifetime))
        .ok_or(AuthError::LifetimeOutOfRange(expiration_secs))?;

    let claims = Claims {
        sub: user_id.as_uuid().to_string(),
        role,
        exp: exp.timestamp(),
        iat: now.timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(AuthError::Issue)
}

/// Validates a JWT token
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, AuthError> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        _ => AuthError::InvalidToken,
    })?;

    Ok(token_data.claims)
}

/// Issues and validates bearer credentials
pub trait IdentityProvider: Send + Sync {
    fn issue(&self, actor: &Actor) -> Result<String, AuthError>;

    fn authenticate(&self, token: &str) -> Result<Actor, AuthError>;
}

/// HS256 JWT identity provider
#[derive(Clone)]
pub struct JwtIdentityProvider {
    secret: String,
    expiration_secs: u64,
}

impl JwtIdentityProvider {
    pub fn new(secret: impl Into<String>, expiration_secs: u64) -> Self {
        Self {
            secret: secret.into(),
            expiration_secs,
        }
    }
}

impl IdentityProvider for JwtIdentityProvider {
    fn issue(&self, actor: &Actor) -> Result<String, AuthError> {
        create_token(actor.id, actor.role, &self.secret, self.expiration_secs)
    }

    fn authenticate(&self, token: &str) -> Result<Actor, AuthError> {
        let claims = validate_token(token, &self.secret)?;
        let id: UserId = claims.sub.parse().map_err(|_| AuthError::InvalidToken)?;
        Ok(Actor::new(id, claims.role))
    }
}

/// Reads the credential from `x-auth-token`, falling back to `Authorization: Bearer`
pub fn extract_token(headers: &HeaderMap) -> Option<&str> {
    if let Some(token) = headers.get(AUTH_TOKEN_HEADER).and_then(|h| h.to_str().ok()) {
        let token = token.trim();
        if !token.is_empty() {
            return Some(token);
        }
    }

    headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Outcome of credential checking, stored in request extensions by the auth middleware
#[derive(Debug, Clone)]
pub enum Authentication {
    Authenticated(Actor),
    Rejected(String),
}

/// The authenticated actor of a request
///
/// Handlers that take this extractor answer 401 for anonymous or invalid
/// credentials; handlers without it are public.
#[derive(Debug, Clone, Copy)]
pub struct CurrentUser(pub Actor);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match parts.extensions.get::<Authentication>() {
            Some(Authentication::Authenticated(actor)) => Ok(CurrentUser(*actor)),
            Some(Authentication::Rejected(reason)) => Err(ApiError::Unauthorized(reason.clone())),
            None => Err(ApiError::Unauthorized(AuthError::MissingToken.to_string())),
        }
    }
}
