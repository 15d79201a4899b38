//! Environment dependencies for the scanner reducer.

use crate::scanner::types::FeedbackTone;
use gatepass_core::checkin::CheckinOutcome;
use gatepass_core::token::Token;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Boxed future returned by scanner dependencies
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Camera acquisition failure
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CameraError {
    /// The operator or platform refused camera access
    #[error("Camera permission denied")]
    PermissionDenied,

    /// No usable camera
    #[error("No camera available: {0}")]
    NotAvailable(String),
}

/// The device that decodes QR codes.
///
/// `stop` must be idempotent: the reducer releases the camera on every exit
/// path and may do so more than once.
pub trait Camera: Send + Sync {
    /// Acquire the camera and begin decoding
    fn start(&self) -> BoxFuture<'_, Result<(), CameraError>>;

    /// Release the camera
    fn stop(&self) -> BoxFuture<'_, ()>;
}

/// Where scanned tokens are validated.
///
/// Implementations never fail: transport problems become
/// [`CheckinOutcome::SystemError`].
pub trait CheckinGateway: Send + Sync {
    /// Validate a token once
    fn validate(&self, token: Token) -> BoxFuture<'_, CheckinOutcome>;
}

/// Audible or visual cue for a shown result
pub trait ScanFeedback: Send + Sync {
    /// Play the cue
    fn play(&self, tone: FeedbackTone);
}

/// Dependencies of [`ScannerReducer`](crate::scanner::ScannerReducer).
#[derive(Clone)]
pub struct ScannerEnvironment {
    /// Camera device
    pub camera: Arc<dyn Camera>,
    /// Validation endpoint
    pub gateway: Arc<dyn CheckinGateway>,
    /// Result cue
    pub feedback: Arc<dyn ScanFeedback>,
    /// How long a result stays on screen
    pub reset_delay: Duration,
}

impl ScannerEnvironment {
    /// Create a scanner environment
    #[must_use]
    pub fn new(
        camera: Arc<dyn Camera>,
        gateway: Arc<dyn CheckinGateway>,
        feedback: Arc<dyn ScanFeedback>,
        reset_delay: Duration,
    ) -> Self {
        Self {
            camera,
            gateway,
            feedback,
            reset_delay,
        }
    }
}

impl std::fmt::Debug for ScannerEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScannerEnvironment")
            .field("reset_delay", &self.reset_delay)
            .finish_non_exhaustive()
    }
}
