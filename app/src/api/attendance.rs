//! Attendance reporting endpoints.
//!
//! - GET /api/events/:id/summary - Check-ins against registrations (admin)
//! - GET /api/stats - Event and registration totals for the dashboard (admin)

use crate::server::state::AppState;
use axum::{
    Json,
    extract::{Path, State},
};
use gatepass_core::types::{EventId, Registration};
use gatepass_web::{AdminSession, AppError};
use serde::Serialize;

// ============================================================================
// Response Types
// ============================================================================

/// Attendance of one event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct AttendanceSummary {
    /// Registrations taken
    pub registered: usize,
    /// Registrations checked in
    pub checked_in: usize,
    /// `checked_in` as a whole percentage of `registered`; 0 with no registrations
    pub attendance_rate: usize,
}

impl AttendanceSummary {
    /// Summarise an event's registrations
    #[must_use]
    pub fn of(registrations: &[Registration]) -> Self {
        let registered = registrations.len();
        let checked_in = registrations.iter().filter(|r| r.checked_in).count();
        let attendance_rate = if registered == 0 {
            0
        } else {
            (checked_in * 100 + registered / 2) / registered
        };
        Self {
            registered,
            checked_in,
            attendance_rate,
        }
    }
}

/// Totals across all events.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct DashboardStats {
    /// All events
    pub events: usize,
    /// Events open for registration
    pub open_events: usize,
    /// Closed events
    pub closed_events: usize,
    /// Registrations across all events
    pub registrations: usize,
    /// Registrations for closed events
    pub closed_event_registrations: usize,
    /// Check-ins across all events
    pub checked_in: usize,
}

// ============================================================================
// Handlers
// ============================================================================

/// Attendance of one event.
///
/// ```bash
/// curl http://localhost:8080/api/events/$EVENT_ID/summary \
///   -H "Authorization: Bearer $ADMIN_API_KEY"
/// ```
pub async fn event_summary(
    _admin: AdminSession,
    State(state): State<AppState>,
    Path(event_id): Path<EventId>,
) -> Result<Json<AttendanceSummary>, AppError> {
    if state.store.get_event(event_id).await?.is_none() {
        return Err(AppError::not_found("Event", event_id));
    }
    let registrations = state.store.list_registrations(event_id).await?;
    Ok(Json(AttendanceSummary::of(&registrations)))
}

/// Totals for the admin dashboard and archive.
pub async fn dashboard_stats(
    _admin: AdminSession,
    State(state): State<AppState>,
) -> Result<Json<DashboardStats>, AppError> {
    let mut stats = DashboardStats::default();

    for event in state.store.list_events().await? {
        let summary = AttendanceSummary::of(&state.store.list_registrations(event.id).await?);
        stats.events += 1;
        stats.registrations += summary.registered;
        stats.checked_in += summary.checked_in;
        if event.is_open() {
            stats.open_events += 1;
        } else {
            stats.closed_events += 1;
            stats.closed_event_registrations += summary.registered;
        }
    }

    Ok(Json(stats))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use gatepass_core::environment::Clock;
    use gatepass_core::token::{OsTokenGenerator, TokenGenerator};
    use gatepass_testing::{fixtures, test_clock};

    fn registrations(total: usize, checked_in: usize) -> Vec<Registration> {
        let event_id = EventId::new();
        (0..total)
            .map(|i| {
                let mut registration = Registration::new(
                    event_id,
                    fixtures::participant("Attendee", &format!("000.000.000-{i:02}")),
                    OsTokenGenerator.issue_token().unwrap(),
                    test_clock().now(),
                );
                registration.checked_in = i < checked_in;
                registration
            })
            .collect()
    }

    #[test]
    fn no_registrations_is_zero_percent() {
        assert_eq!(
            AttendanceSummary::of(&[]),
            AttendanceSummary {
                registered: 0,
                checked_in: 0,
                attendance_rate: 0,
            }
        );
    }

    #[test]
    fn rate_is_rounded_to_a_whole_percent() {
        let summary = AttendanceSummary::of(&registrations(3, 2));
        assert_eq!(summary.registered, 3);
        assert_eq!(summary.checked_in, 2);
        assert_eq!(summary.attendance_rate, 67);

        assert_eq!(AttendanceSummary::of(&registrations(3, 1)).attendance_rate, 33);
        assert_eq!(AttendanceSummary::of(&registrations(4, 4)).attendance_rate, 100);
    }
}
