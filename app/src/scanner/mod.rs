//! Door scanner loop.
//!
//! A reducer-driven state machine that owns the camera lifecycle:
//!
//! ```text
//! Idle ─Start→ Starting ─CameraStarted→ Scanning ─FrameDecoded→ Validating
//!                 │                                                  │
//!          CameraFailed                                  ValidationCompleted
//!                 ↓                                                  ↓
//!        CameraUnavailable ─Retry→ Starting ←─ResetElapsed / Reset─ Showing
//!
//! any ─Stop→ Stopped (camera released)
//! ```
//!
//! The reducer is pure; camera, gateway and feedback are reached only through
//! effects built from [`ScannerEnvironment`]. Run it in a
//! `gatepass_runtime::store::Store`.

pub mod actions;
pub mod environment;
pub mod gateway;
pub mod mocks;
pub mod reducer;
pub mod session;
pub mod terminal;
#[cfg(test)]
mod tests;
pub mod types;

pub use actions::ScannerAction;
pub use environment::{Camera, CameraError, CheckinGateway, ScanFeedback, ScannerEnvironment};
pub use gateway::{GatewayError, HttpCheckinGateway, LocalCheckinGateway};
pub use reducer::ScannerReducer;
pub use session::{Command, SessionError, run_session};
pub use types::{FeedbackTone, ScanTally, ScannerPhase, ScannerState};

/// A running scanner loop
pub type ScannerStore =
    gatepass_runtime::store::Store<ScannerState, ScannerAction, ScannerEnvironment, ScannerReducer>;
