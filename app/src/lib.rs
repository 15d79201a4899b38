//! # Gatepass
//!
//! Event registration with QR check-in at the door.
//!
//! - [`registration`]: public sign-up and ticket issuing
//! - [`server`]: the HTTP API over a [`RegistrationStore`](gatepass_core::registration_store::RegistrationStore)
//! - [`scanner`]: the door scanner loop, a reducer run in a `Store`
//! - [`export`]: CSV attendance lists
//!
//! Check-in itself lives in [`gatepass_core::checkin`]; every surface here
//! reaches it through the same [`CheckinValidator`](gatepass_core::checkin::CheckinValidator).

pub mod api;
pub mod config;
pub mod export;
pub mod metrics;
pub mod registration;
pub mod scanner;
pub mod server;

pub use config::Config;
