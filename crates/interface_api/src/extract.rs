//! Request extractors

use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, FromRequestParts, Request},
    http::request::Parts,
    Json,
};
use serde::de::DeserializeOwned;
use validator::Validate;

use core_kernel::IdempotencyKey;

use crate::error::ApiError;

pub const IDEMPOTENCY_KEY_HEADER: &str = "idempotency-key";

/// JSON body that has passed its `validator` rules
#[derive(Debug, Clone)]
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection: JsonRejection| ApiError::Validation(rejection.body_text()))?;
        value.validate()?;
        Ok(ValidatedJson(value))
    }
}

/// Optional `Idempotency-Key` header for claim operations
#[derive(Debug, Clone, Copy, Default)]
pub struct IdempotencyKeyHeader(pub Option<IdempotencyKey>);

#[async_trait]
impl<S> FromRequestParts<S> for IdempotencyKeyHeader
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Some(value) = parts.headers.get(IDEMPOTENCY_KEY_HEADER) else {
            return Ok(IdempotencyKeyHeader(None));
        };

        value
            .to_str()
            .ok()
            .and_then(|raw| raw.trim().parse::<IdempotencyKey>().ok())
            .map(|key| IdempotencyKeyHeader(Some(key)))
            .ok_or_else(|| ApiError::Validation("Idempotency-Key must be a UUID".to_string()))
    }
}
