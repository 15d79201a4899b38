//! Event management endpoints.
//!
//! - GET /api/events - List events, optionally filtered
//! - GET /api/events/:id - Event details
//! - POST /api/events - Create an event (admin)
//! - PUT /api/events/:id - Replace an event's details (admin)
//! - POST /api/events/:id/close - Stop accepting registrations (admin)
//! - DELETE /api/events/:id - Delete an event and its registrations (admin)

use crate::metrics;
use crate::server::state::AppState;
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use gatepass_core::types::{Event, EventDetails, EventId};
use gatepass_web::{AdminSession, AppError};
use serde::Deserialize;

/// Registration status filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    /// Accepting registrations
    Open,
    /// Closed for registration
    Closed,
}

/// Query parameters for listing events.
#[derive(Debug, Default, Deserialize)]
pub struct ListEventsQuery {
    /// Only open or only closed events
    pub status: Option<StatusFilter>,
    /// Case-insensitive substring of the name or location
    pub q: Option<String>,
}

impl ListEventsQuery {
    fn matches(&self, event: &Event) -> bool {
        let status_ok = match self.status {
            Some(StatusFilter::Open) => event.is_open(),
            Some(StatusFilter::Closed) => !event.is_open(),
            None => true,
        };
        let search_ok = match self.q.as_deref().map(str::trim) {
            Some(q) if !q.is_empty() => {
                let q = q.to_lowercase();
                event.details.name.to_lowercase().contains(&q)
                    || event.details.location.to_lowercase().contains(&q)
            },
            _ => true,
        };
        status_ok && search_ok
    }
}

fn check_details(details: &EventDetails) -> Result<(), AppError> {
    if details.name.trim().is_empty() {
        return Err(AppError::validation("Event name is required"));
    }
    if details.location.trim().is_empty() {
        return Err(AppError::validation("Event location is required"));
    }
    Ok(())
}

/// List events, most recent date first.
///
/// Public endpoint.
///
/// ```bash
/// curl 'http://localhost:8080/api/events?status=open&q=open%20house'
/// ```
pub async fn list_events(
    State(state): State<AppState>,
    Query(query): Query<ListEventsQuery>,
) -> Result<Json<Vec<Event>>, AppError> {
    let events = state.store.list_events().await?;
    Ok(Json(
        events.into_iter().filter(|e| query.matches(e)).collect(),
    ))
}

/// Event details.
///
/// Public endpoint; the registration page reads it.
pub async fn get_event(
    State(state): State<AppState>,
    Path(id): Path<EventId>,
) -> Result<Json<Event>, AppError> {
    state
        .store
        .get_event(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found("Event", id))
}

/// Create an event.
///
/// ```bash
/// curl -X POST http://localhost:8080/api/events \
///   -H "Authorization: Bearer $ADMIN_API_KEY" \
///   -H "Content-Type: application/json" \
///   -d '{"name": "Open House", "date": "2025-03-14", "time": "19:00 - 21:00",
///        "location": "Auditorium"}'
/// ```
#[tracing::instrument(skip_all, fields(name = %details.name))]
pub async fn create_event(
    _admin: AdminSession,
    State(state): State<AppState>,
    Json(details): Json<EventDetails>,
) -> Result<(StatusCode, Json<Event>), AppError> {
    check_details(&details)?;
    let event = state
        .store
        .insert_event(Event::new(details, state.clock.now()))
        .await?;

    metrics::record_event_created();
    tracing::info!(event_id = %event.id, "Event created");
    Ok((StatusCode::CREATED, Json(event)))
}

/// Replace an event's editable fields. The closed flag is kept.
pub async fn update_event(
    _admin: AdminSession,
    State(state): State<AppState>,
    Path(id): Path<EventId>,
    Json(details): Json<EventDetails>,
) -> Result<Json<Event>, AppError> {
    check_details(&details)?;
    Ok(Json(state.store.update_event(id, details).await?))
}

/// Close an event for registration. Issued tickets stay valid.
pub async fn close_event(
    _admin: AdminSession,
    State(state): State<AppState>,
    Path(id): Path<EventId>,
) -> Result<Json<Event>, AppError> {
    let event = state.store.close_event(id).await?;
    metrics::record_event_closed();
    tracing::info!(event_id = %id, "Event closed");
    Ok(Json(event))
}

/// Delete an event together with its registrations.
pub async fn delete_event(
    _admin: AdminSession,
    State(state): State<AppState>,
    Path(id): Path<EventId>,
) -> Result<StatusCode, AppError> {
    state.store.delete_event(id).await?;
    tracing::info!(event_id = %id, "Event deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use gatepass_core::environment::Clock;
    use gatepass_testing::{fixtures, test_clock};

    fn event(name: &str, location: &str, closed: bool) -> Event {
        let mut details = fixtures::event_details(name);
        details.location = location.to_string();
        let mut event = Event::new(details, test_clock().now());
        event.closed = closed;
        event
    }

    #[test]
    fn empty_query_matches_everything() {
        let query = ListEventsQuery::default();
        assert!(query.matches(&event("Open House", "Auditorium", false)));
        assert!(query.matches(&event("Career Fair", "Gym", true)));
    }

    #[test]
    fn status_and_search_combine() {
        let query = ListEventsQuery {
            status: Some(StatusFilter::Open),
            q: Some("  AUDIT ".to_string()),
        };
        assert!(query.matches(&event("Open House", "Auditorium", false)));
        assert!(!query.matches(&event("Open House", "Auditorium", true)));
        assert!(!query.matches(&event("Career Fair", "Gym", false)));
    }

    #[test]
    fn blank_name_is_rejected() {
        let mut details = fixtures::event_details("   ");
        assert_eq!(
            check_details(&details).unwrap_err().status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        details.name = "Open House".to_string();
        assert!(check_details(&details).is_ok());
    }
}
