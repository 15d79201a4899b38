//! State types for the door scanner.

use gatepass_core::checkin::{CheckinOutcome, OutcomeKind};
use gatepass_core::token::Token;
use serde::{Deserialize, Serialize};

/// Sound played when a result is shown
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FeedbackTone {
    /// Entry granted
    Success,
    /// Ticket already used
    AlreadyUsed,
    /// Invalid ticket or failure
    Error,
}

impl From<OutcomeKind> for FeedbackTone {
    fn from(kind: OutcomeKind) -> Self {
        match kind {
            OutcomeKind::Success => Self::Success,
            OutcomeKind::AlreadyUsed => Self::AlreadyUsed,
            OutcomeKind::InvalidToken | OutcomeKind::SystemError => Self::Error,
        }
    }
}

/// Where the scanner loop is
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ScannerPhase {
    /// Not started
    Idle,
    /// Waiting for the camera
    Starting,
    /// Camera live, waiting for a code
    Scanning,
    /// Camera released, validation in flight
    Validating {
        /// Token being validated
        token: Token,
    },
    /// Result on screen until reset
    Showing {
        /// Validation result
        outcome: CheckinOutcome,
    },
    /// The camera could not be acquired; waits for a manual retry
    CameraUnavailable {
        /// Why acquisition failed
        reason: String,
    },
    /// The operator left the scanner
    Stopped,
}

impl ScannerPhase {
    /// Whether the camera may be held in this phase
    #[must_use]
    pub const fn holds_camera(&self) -> bool {
        matches!(self, Self::Starting | Self::Scanning)
    }
}

/// Outcome counts for the current session
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ScanTally {
    /// Admitted attendees
    pub admitted: u32,
    /// Tickets presented again
    pub already_used: u32,
    /// Unknown tickets
    pub invalid: u32,
    /// Failed validations
    pub errors: u32,
}

impl ScanTally {
    pub(crate) const fn record(&mut self, kind: OutcomeKind) {
        match kind {
            OutcomeKind::Success => self.admitted += 1,
            OutcomeKind::AlreadyUsed => self.already_used += 1,
            OutcomeKind::InvalidToken => self.invalid += 1,
            OutcomeKind::SystemError => self.errors += 1,
        }
    }
}

/// Scanner loop state
///
/// `cycle` increases every time the camera is (re)acquired or the loop is
/// stopped. Completions and delays carry the cycle they were started in and
/// are dropped when it no longer matches.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScannerState {
    /// Current phase
    pub phase: ScannerPhase,
    /// Current cycle
    pub cycle: u64,
    /// Outcome counts
    pub tally: ScanTally,
}

impl ScannerState {
    /// A scanner that has not been started
    #[must_use]
    pub const fn new() -> Self {
        Self {
            phase: ScannerPhase::Idle,
            cycle: 0,
            tally: ScanTally {
                admitted: 0,
                already_used: 0,
                invalid: 0,
                errors: 0,
            },
        }
    }

    /// The result currently on screen
    #[must_use]
    pub const fn shown_outcome(&self) -> Option<&CheckinOutcome> {
        match &self.phase {
            ScannerPhase::Showing { outcome } => Some(outcome),
            _ => None,
        }
    }
}

impl Default for ScannerState {
    fn default() -> Self {
        Self::new()
    }
}
