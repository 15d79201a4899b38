//! Registration endpoints.
//!
//! - POST /api/events/:id/registrations - Public sign-up
//! - GET /api/events/:id/registrations - Attendee list (admin)
//! - POST /api/registrations/:id/confirm - Manual check-in from the attendee list (admin)

use crate::api::checkin::respond;
use crate::registration::{RegistrationError, RegistrationForm};
use crate::server::state::AppState;
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use gatepass_core::checkin::CheckinResponse;
use gatepass_core::checkin_url::checkin_url;
use gatepass_core::types::{EventId, Registration, RegistrationId};
use gatepass_web::{AdminSession, AppError};
use serde::Serialize;

impl From<RegistrationError> for AppError {
    fn from(err: RegistrationError) -> Self {
        match err {
            RegistrationError::Invalid { .. } => Self::validation(err.to_string()),
            RegistrationError::EventNotFound(id) => Self::not_found("Event", id),
            RegistrationError::EventClosed(_) => {
                Self::conflict("EVENT_CLOSED", "This event is closed for registration")
            },
            RegistrationError::AlreadyRegistered(_) => Self::conflict(
                "DUPLICATE_REGISTRATION",
                "This CPF is already registered for this event",
            ),
            RegistrationError::Token(_) => {
                Self::internal("Could not issue a ticket").with_source(err.into())
            },
            RegistrationError::Store(store) => Self::from(store),
        }
    }
}

/// Response to a successful sign-up.
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    /// The stored registration, including its token
    pub registration: Registration,
    /// URL to encode into the attendee's QR code
    pub checkin_url: String,
}

/// Register for an event.
///
/// Public endpoint. Refused with 409 when the event is closed or the CPF is
/// already registered for it.
///
/// ```bash
/// curl -X POST http://localhost:8080/api/events/$EVENT_ID/registrations \
///   -H "Content-Type: application/json" \
///   -d '{"nomeCompleto": "Maria Silva", "cpf": "529.982.247-25",
///        "phone": "(11) 98888-7777", "email": "maria@example.com",
///        "education": "higher_complete", "interest": "postgraduate"}'
/// ```
pub async fn register(
    State(state): State<AppState>,
    Path(event_id): Path<EventId>,
    Json(form): Json<RegistrationForm>,
) -> Result<(StatusCode, Json<RegisterResponse>), AppError> {
    let registration = state.registrations.register(event_id, form).await?;
    let checkin_url = checkin_url(&state.public_base_url, &registration.token);

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            registration,
            checkin_url,
        }),
    ))
}

/// Attendee list of an event, oldest registration first.
pub async fn list_registrations(
    _admin: AdminSession,
    State(state): State<AppState>,
    Path(event_id): Path<EventId>,
) -> Result<Json<Vec<Registration>>, AppError> {
    if state.store.get_event(event_id).await?.is_none() {
        return Err(AppError::not_found("Event", event_id));
    }
    Ok(Json(state.store.list_registrations(event_id).await?))
}

/// Check an attendee in by registration id.
///
/// Goes through the same conditional update as a scan, so a confirmation
/// racing a scanner still admits the attendee once.
pub async fn confirm_registration(
    _admin: AdminSession,
    State(state): State<AppState>,
    Path(id): Path<RegistrationId>,
) -> Result<(StatusCode, Json<CheckinResponse>), AppError> {
    let registration = state
        .store
        .get_registration(id)
        .await?
        .ok_or_else(|| AppError::not_found("Registration", id))?;

    tracing::info!(registration_id = %id, "Manual check-in");
    let outcome = state.validator.validate(&registration.token).await;
    Ok(respond(&outcome))
}
