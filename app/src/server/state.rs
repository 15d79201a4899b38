//! Application state for the Gatepass HTTP server.
//!
//! Everything handlers need, shared through `Arc`s:
//! - the registration store
//! - the check-in validator and registration service built on it
//! - the public base URL printed into QR codes
//! - the admin key guarding management endpoints

use crate::registration::RegistrationService;
use axum::extract::FromRef;
use gatepass_core::checkin::CheckinValidator;
use gatepass_core::environment::Clock;
use gatepass_core::registration_store::RegistrationStore;
use gatepass_core::token::TokenGenerator;
use gatepass_web::AdminKeySource;
use std::sync::Arc;

/// Application state shared across all HTTP handlers.
///
/// Cloned per request; every field is cheap to clone.
#[derive(Clone)]
pub struct AppState {
    /// Events and registrations
    pub store: Arc<dyn RegistrationStore>,
    /// At-most-once check-in
    pub validator: CheckinValidator,
    /// Public sign-up
    pub registrations: RegistrationService,
    /// Time source for event creation
    pub clock: Arc<dyn Clock>,
    /// Base of the URLs encoded into QR codes
    pub public_base_url: Arc<str>,
    /// Bearer key for admin endpoints; `None` disables them
    pub admin_api_key: Option<Arc<str>>,
}

impl AppState {
    /// Wire the services over one store.
    #[must_use]
    pub fn new(
        store: Arc<dyn RegistrationStore>,
        tokens: Arc<dyn TokenGenerator>,
        clock: Arc<dyn Clock>,
        public_base_url: &str,
        admin_api_key: Option<&str>,
    ) -> Self {
        Self {
            validator: CheckinValidator::new(store.clone(), clock.clone()),
            registrations: RegistrationService::new(store.clone(), tokens, clock.clone()),
            store,
            clock,
            public_base_url: Arc::from(public_base_url),
            admin_api_key: admin_api_key.map(Arc::from),
        }
    }
}

impl FromRef<AppState> for Arc<dyn RegistrationStore> {
    fn from_ref(state: &AppState) -> Self {
        state.store.clone()
    }
}

impl AdminKeySource for AppState {
    fn admin_key(&self) -> Option<&str> {
        self.admin_api_key.as_deref()
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("public_base_url", &self.public_base_url)
            .field("admin_api", &self.admin_api_key.is_some())
            .finish_non_exhaustive()
    }
}
