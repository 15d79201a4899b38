//! Attendance export endpoint.
//!
//! - GET /api/events/:id/registrations/export - CSV attendance list (admin)

use crate::export::{attendance_csv, attendance_filename};
use crate::server::state::AppState;
use axum::{
    extract::{Path, State},
    http::header,
    response::IntoResponse,
};
use gatepass_core::types::EventId;
use gatepass_web::{AdminSession, AppError};

/// Download an event's attendance list as CSV.
///
/// ```bash
/// curl -OJ http://localhost:8080/api/events/$EVENT_ID/registrations/export \
///   -H "Authorization: Bearer $ADMIN_API_KEY"
/// ```
pub async fn export_registrations(
    _admin: AdminSession,
    State(state): State<AppState>,
    Path(event_id): Path<EventId>,
) -> Result<impl IntoResponse, AppError> {
    let event = state
        .store
        .get_event(event_id)
        .await?
        .ok_or_else(|| AppError::not_found("Event", event_id))?;
    let registrations = state.store.list_registrations(event_id).await?;

    let body = attendance_csv(&registrations)
        .map_err(|e| AppError::internal("Could not build the export").with_source(e.into()))?;
    tracing::info!(%event_id, rows = registrations.len(), "Attendance exported");

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", attendance_filename(&event)),
            ),
        ],
        body,
    ))
}
