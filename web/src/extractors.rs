//! Custom Axum extractors.
//!
//! - [`CorrelationId`]: the request's correlation ID
//! - [`AdminSession`]: proof that the request carried the admin bearer key

use crate::error::AppError;
use crate::middleware::parse_header;
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use uuid::Uuid;

/// Correlation ID for request tracing.
///
/// Taken from the request extensions when
/// [`correlation_id_layer`](crate::middleware::correlation_id_layer) is
/// installed, otherwise from the `X-Correlation-ID` header, otherwise freshly
/// generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CorrelationId(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for CorrelationId
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if let Some(id) = parts.extensions.get::<Self>() {
            return Ok(*id);
        }
        Ok(Self(parse_header(&parts.headers).unwrap_or_else(Uuid::new_v4)))
    }
}

/// Application state that knows the admin API key.
pub trait AdminKeySource {
    /// The configured key, or `None` when admin endpoints are disabled
    fn admin_key(&self) -> Option<&str>;
}

/// An authenticated administrator.
///
/// Requires `Authorization: Bearer <key>` matching
/// [`AdminKeySource::admin_key`]. Rejects with 401 on a missing or wrong key
/// and 503 when no key is configured.
///
/// ```ignore
/// async fn close_event(_admin: AdminSession, Path(id): Path<EventId>) -> Result<Json<Event>, AppError> {
///     // ...
/// }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct AdminSession;

#[async_trait]
impl<S> FromRequestParts<S> for AdminSession
where
    S: AdminKeySource + Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Some(expected) = state.admin_key() else {
            return Err(AppError::unavailable("Admin API is not configured"));
        };

        let presented = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim);

        match presented {
            Some(key) if constant_time_eq::constant_time_eq(key.as_bytes(), expected.as_bytes()) => {
                Ok(Self)
            },
            Some(_) => {
                tracing::warn!("Rejected admin request with wrong key");
                Err(AppError::unauthorized("Invalid admin key"))
            },
            None => Err(AppError::unauthorized("Missing admin bearer key")),
        }
    }
}
