//! Actions for the door scanner.

use gatepass_core::checkin::CheckinOutcome;

/// Inputs to the scanner loop.
///
/// Operator and camera inputs are sent by the shell; the `cycle`-carrying
/// variants are produced by the reducer's own effects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScannerAction {
    /// Operator opened the scanner
    Start,

    /// Camera acquisition finished
    CameraStarted {
        /// Cycle that requested the camera
        cycle: u64,
    },

    /// Camera acquisition failed
    CameraFailed {
        /// Cycle that requested the camera
        cycle: u64,
        /// Failure reason shown to the operator
        reason: String,
    },

    /// The camera decoded a QR code
    FrameDecoded {
        /// Raw decoded text
        payload: String,
    },

    /// Validation returned
    ValidationCompleted {
        /// Cycle the validation belongs to
        cycle: u64,
        /// Result
        outcome: CheckinOutcome,
    },

    /// The result display time is over
    ResetElapsed {
        /// Cycle whose result is on screen
        cycle: u64,
    },

    /// Operator asked for the next scan
    Reset,

    /// Operator retried after a camera failure
    Retry,

    /// Operator left the scanner
    Stop,
}
