//! Router configuration for the Gatepass server.

use super::state::AppState;
use crate::api;
use axum::{
    Router,
    routing::{get, post},
};
use gatepass_web::correlation_id_layer;
use gatepass_web::handlers::{health_check, readiness_check};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Build the complete Axum router.
///
/// Health checks sit at the root; everything else is nested under `/api`.
/// Public routes: event reads, sign-up, check-in and QR images. Management
/// routes require the admin bearer key.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        // Events
        .route("/events", get(api::list_events).post(api::create_event))
        .route(
            "/events/:id",
            get(api::get_event)
                .put(api::update_event)
                .delete(api::delete_event),
        )
        .route("/events/:id/close", post(api::close_event))
        .route("/events/:id/poster.svg", get(api::event_poster))
        .route("/events/:id/summary", get(api::event_summary))
        .route("/stats", get(api::dashboard_stats))
        // Registrations
        .route(
            "/events/:id/registrations",
            get(api::list_registrations).post(api::register),
        )
        .route(
            "/events/:id/registrations/export",
            get(api::export_registrations),
        )
        .route(
            "/registrations/:id/confirm",
            post(api::confirm_registration),
        )
        // Door
        .route("/checkin", post(api::checkin))
        .route("/tickets/:token/qr.svg", get(api::ticket_qr));

    // The sign-up and scanner pages are served from a different origin.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))
        .nest("/api", api_routes)
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(correlation_id_layer())
}
