//! QR code images.
//!
//! - GET /api/tickets/:token/qr.svg - An attendee's check-in code
//! - GET /api/events/:id/poster.svg - Registration page code for posters

use crate::server::state::AppState;
use axum::{
    extract::{Path, State},
    http::header::{self, HeaderName},
    response::IntoResponse,
};
use gatepass_core::checkin_url::{checkin_url, registration_url};
use gatepass_core::qr;
use gatepass_core::token::Token;
use gatepass_core::types::EventId;
use gatepass_web::AppError;

const SVG: &str = "image/svg+xml";

type SvgResponse = ([(HeaderName, &'static str); 1], String);

fn svg_response(payload: &str) -> Result<SvgResponse, AppError> {
    let image = qr::encode(payload)?;
    Ok(([(header::CONTENT_TYPE, SVG)], image.to_svg()))
}

/// Check-in QR code for a ticket.
///
/// Only tokens that belong to a registration are rendered.
pub async fn ticket_qr(
    State(state): State<AppState>,
    Path(raw): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let not_found = || AppError::not_found("Ticket", "(redacted)");
    let token = Token::parse(&raw).map_err(|_| not_found())?;
    if state.store.find_by_token(token.clone()).await?.is_none() {
        return Err(not_found());
    }

    svg_response(&checkin_url(&state.public_base_url, &token))
}

/// Registration poster QR code for an event.
pub async fn event_poster(
    State(state): State<AppState>,
    Path(id): Path<EventId>,
) -> Result<impl IntoResponse, AppError> {
    if state.store.get_event(id).await?.is_none() {
        return Err(AppError::not_found("Event", id));
    }

    svg_response(&registration_url(&state.public_base_url, id))
}
