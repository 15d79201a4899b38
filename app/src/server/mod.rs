//! HTTP server for Gatepass:
//! - Application state wiring the store, validator and sign-up service
//! - Router configuration

pub mod routes;
pub mod state;

pub use routes::build_router;
pub use state::AppState;
