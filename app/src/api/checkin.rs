//! Check-in endpoint used by door scanners.
//!
//! - POST /api/checkin - Validate a scanned token
//!
//! Every outcome is answered with a [`CheckinResponse`] body; the status code
//! mirrors the outcome so plain HTTP clients can branch on it too.

use crate::metrics;
use crate::server::state::AppState;
use axum::{Json, extract::State, http::StatusCode};
use gatepass_core::checkin::{CheckinOutcome, CheckinResponse, OutcomeKind};
use gatepass_web::CorrelationId;
use serde::Deserialize;

/// Check-in request body.
#[derive(Debug, Deserialize)]
pub struct CheckinRequest {
    /// Token or full check-in URL as decoded from the QR code
    pub token: String,
}

/// HTTP status for an outcome
#[must_use]
pub const fn outcome_status(kind: OutcomeKind) -> StatusCode {
    match kind {
        OutcomeKind::Success => StatusCode::OK,
        OutcomeKind::AlreadyUsed => StatusCode::CONFLICT,
        OutcomeKind::InvalidToken => StatusCode::NOT_FOUND,
        OutcomeKind::SystemError => StatusCode::SERVICE_UNAVAILABLE,
    }
}

pub(crate) fn respond(outcome: &CheckinOutcome) -> (StatusCode, Json<CheckinResponse>) {
    metrics::record_checkin(outcome.kind());
    (
        outcome_status(outcome.kind()),
        Json(CheckinResponse::from(outcome)),
    )
}

/// Validate a scanned token and check the attendee in at most once.
///
/// Accepts either the bare token or the whole check-in URL.
///
/// ```bash
/// curl -X POST http://localhost:8080/api/checkin \
///   -H "Content-Type: application/json" \
///   -d '{"token": "kq3J..."}'
/// ```
#[tracing::instrument(skip_all, fields(correlation_id = %correlation_id.0))]
pub async fn checkin(
    correlation_id: CorrelationId,
    State(state): State<AppState>,
    Json(request): Json<CheckinRequest>,
) -> (StatusCode, Json<CheckinResponse>) {
    let outcome = match gatepass_core::checkin_url::extract_token(&request.token) {
        Some(token) => state.validator.validate(&token).await,
        None => CheckinOutcome::InvalidToken,
    };
    respond(&outcome)
}
