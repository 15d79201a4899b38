//! Health check endpoints.
//!
//! Used by load balancers and monitoring systems to verify service health.

use axum::{Json, extract::State, http::StatusCode};
use gatepass_core::registration_store::RegistrationStore;
use serde::Serialize;
use std::sync::Arc;

/// Liveness probe.
///
/// Returns 200 OK while the process is serving; checks no dependencies.
///
/// ```text
/// GET /health
/// ```
#[allow(clippy::unused_async)]
pub async fn health_check() -> (StatusCode, &'static str) {
    (StatusCode::OK, "ok")
}

/// Readiness report body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReadinessReport {
    /// Component checked
    pub component: &'static str,
    /// `ready` or `unavailable`
    pub status: &'static str,
    /// Failure detail, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Readiness probe: pings the registration store.
///
/// - 200 OK when the store answers
/// - 503 Service Unavailable otherwise
///
/// ```text
/// GET /ready
/// ```
pub async fn readiness_check(
    State(store): State<Arc<dyn RegistrationStore>>,
) -> (StatusCode, Json<ReadinessReport>) {
    match store.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(ReadinessReport {
                component: "registration_store",
                status: "ready",
                message: None,
            }),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ReadinessReport {
                    component: "registration_store",
                    status: "unavailable",
                    message: Some(e.to_string()),
                }),
            )
        },
    }
}
