//! Axum integration shared by the Gatepass HTTP surfaces.
//!
//! The HTTP layer is the imperative shell around the check-in core:
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │          Imperative Shell (Axum)        │  ← HTTP, JSON, auth header
//! │  - Request parsing                      │  ← Correlation IDs, tracing
//! │  - Response serialization               │
//! ├─────────────────────────────────────────┤
//! │          Core (gatepass-core)           │
//! │  - Token issuing, QR encoding           │
//! │  - Check-in validation                  │
//! │  - RegistrationStore trait              │
//! └─────────────────────────────────────────┘
//! ```
//!
//! This crate holds the pieces any router needs: [`AppError`], the
//! correlation ID layer, the [`AdminSession`] guard and health handlers.

#![forbid(unsafe_code)]
#![warn(missing_docs, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;

pub use error::AppError;
pub use extractors::{AdminKeySource, AdminSession, CorrelationId};
pub use middleware::{CORRELATION_ID_HEADER, correlation_id_layer};

/// Result type alias for web handlers.
pub type WebResult<T> = Result<T, AppError>;
