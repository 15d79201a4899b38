//! Terminal adapters for the `gatepass-scanner` binary.
//!
//! A hand-held scanner in keyboard-wedge mode types each decoded code as a
//! line on stdin, so the "camera" here is the line reader: starting it means
//! lines are accepted, stopping it means they are dropped.

use crate::scanner::environment::{BoxFuture, Camera, CameraError, ScanFeedback};
use crate::scanner::types::FeedbackTone;
use gatepass_core::checkin::CheckinOutcome;
use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};

const GREEN: &str = "\x1b[1;32m";
const YELLOW: &str = "\x1b[1;33m";
const RED: &str = "\x1b[1;31m";
const RESET: &str = "\x1b[0m";
const BELL: &str = "\x07";

/// Line-reader camera
#[derive(Debug, Default)]
pub struct TerminalCamera {
    live: AtomicBool,
}

impl TerminalCamera {
    /// Create a released camera
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether decoded lines should be forwarded
    #[must_use]
    pub fn is_live(&self) -> bool {
        self.live.load(Ordering::SeqCst)
    }
}

impl Camera for TerminalCamera {
    fn start(&self) -> BoxFuture<'_, Result<(), CameraError>> {
        Box::pin(async move {
            self.live.store(true, Ordering::SeqCst);
            Ok(())
        })
    }

    fn stop(&self) -> BoxFuture<'_, ()> {
        Box::pin(async move {
            self.live.store(false, Ordering::SeqCst);
        })
    }
}

/// Rings the terminal bell; twice for anything but a success.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalBell;

impl ScanFeedback for TerminalBell {
    fn play(&self, tone: FeedbackTone) {
        let rings = match tone {
            FeedbackTone::Success => 1,
            FeedbackTone::AlreadyUsed | FeedbackTone::Error => 2,
        };
        let mut stdout = std::io::stdout().lock();
        let _ = write!(stdout, "{}", BELL.repeat(rings));
        let _ = stdout.flush();
    }
}

/// One coloured line describing an outcome
#[must_use]
pub fn render_outcome(outcome: &CheckinOutcome) -> String {
    let colour = match FeedbackTone::from(outcome.kind()) {
        FeedbackTone::Success => GREEN,
        FeedbackTone::AlreadyUsed => YELLOW,
        FeedbackTone::Error => RED,
    };
    match outcome.attendee() {
        Some(attendee) => format!(
            "{colour}{}{RESET} {} ({})",
            outcome.message(),
            attendee.full_name,
            attendee.cpf
        ),
        None => format!("{colour}{}{RESET}", outcome.message()),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn camera_is_live_between_start_and_stop() {
        let camera = TerminalCamera::new();
        assert!(!camera.is_live());
        camera.start().await.unwrap();
        assert!(camera.is_live());
        camera.stop().await;
        camera.stop().await;
        assert!(!camera.is_live());
    }

    #[test]
    fn invalid_token_renders_red_message() {
        let line = render_outcome(&CheckinOutcome::InvalidToken);
        assert!(line.starts_with(RED));
        assert!(line.contains("Invalid QR code"));
    }
}
