//! HTTP request handlers shared by every Gatepass router.

pub mod health;

pub use health::{health_check, readiness_check};
