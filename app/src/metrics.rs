//! Business metrics for Gatepass.
//!
//! # Exported Metrics
//!
//! - `gatepass_checkins_total{outcome}` - check-in attempts by outcome
//! - `gatepass_registrations_total` - registrations created
//! - `gatepass_registrations_rejected_total{reason}` - refused sign-ups
//! - `gatepass_events_created_total` - events created
//! - `gatepass_events_closed_total` - events closed for registration
//!
//! The runtime additionally records `store.*` metrics for the scanner loop.

use gatepass_core::checkin::OutcomeKind;
use metrics::describe_counter;
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};

/// Register all business metric descriptions.
///
/// Call once at startup, after the recorder is installed.
pub fn register_business_metrics() {
    describe_counter!(
        "gatepass_checkins_total",
        "Check-in attempts by outcome (success, already_used, invalid_token, system_error)"
    );
    describe_counter!(
        "gatepass_registrations_total",
        "Registrations created through public sign-up"
    );
    describe_counter!(
        "gatepass_registrations_rejected_total",
        "Sign-ups refused, by reason"
    );
    describe_counter!("gatepass_events_created_total", "Events created");
    describe_counter!(
        "gatepass_events_closed_total",
        "Events closed for new registrations"
    );

    tracing::info!("Business metrics registered");
}

/// Install the Prometheus recorder and return the handle that renders it.
///
/// # Errors
///
/// Returns [`BuildError`] if a global recorder is already installed.
pub fn install_prometheus_recorder() -> Result<PrometheusHandle, BuildError> {
    PrometheusBuilder::new().install_recorder()
}

/// Record a check-in attempt.
pub fn record_checkin(outcome: OutcomeKind) {
    metrics::counter!("gatepass_checkins_total", "outcome" => outcome.as_str()).increment(1);
}

/// Record a created registration.
pub fn record_registration() {
    metrics::counter!("gatepass_registrations_total").increment(1);
}

/// Record a refused sign-up.
pub fn record_registration_rejected(reason: &'static str) {
    metrics::counter!("gatepass_registrations_rejected_total", "reason" => reason).increment(1);
}

/// Record a created event.
pub fn record_event_created() {
    metrics::counter!("gatepass_events_created_total").increment(1);
}

/// Record a closed event.
pub fn record_event_closed() {
    metrics::counter!("gatepass_events_closed_total").increment(1);
}
