//! Operator session for the `gatepass-scanner` binary.
//!
//! Each input line is either a command or a decoded payload. The session
//! always ends by stopping the loop, so the camera is released whether the
//! operator quits, input ends, or reading fails.

use crate::scanner::{ScannerAction, ScannerStore};
use gatepass_runtime::RuntimeError;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

/// Why a session ended abnormally
#[derive(Error, Debug)]
pub enum SessionError {
    /// Reading operator input failed
    #[error("Could not read input: {0}")]
    Input(#[from] std::io::Error),

    /// The scanner store rejected an action
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}

/// One line of operator input
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Dismiss the current result
    Reset,
    /// Retry a camera that failed to start
    Retry,
    /// Print the tally
    Status,
    /// End the session
    Quit,
    /// A decoded payload
    Scan(String),
}

impl Command {
    /// Parse a line; blank lines are `None`.
    #[must_use]
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        match line.to_ascii_lowercase().as_str() {
            "" => None,
            "reset" => Some(Self::Reset),
            "retry" => Some(Self::Retry),
            "status" => Some(Self::Status),
            "quit" | "exit" => Some(Self::Quit),
            _ => Some(Self::Scan(line.to_string())),
        }
    }
}

/// Run a session until `quit`, end of input or `interrupt`, then stop the
/// loop and wait up to `shutdown_timeout` for its effects.
///
/// Payloads are only forwarded while `can_scan` holds.
///
/// # Errors
///
/// Returns the error that ended the session early. The loop is stopped
/// either way.
pub async fn run_session<I, F, C>(
    store: &ScannerStore,
    input: I,
    interrupt: F,
    can_scan: C,
    shutdown_timeout: Duration,
) -> Result<(), SessionError>
where
    I: AsyncBufRead + Unpin,
    F: Future<Output = ()>,
    C: Fn() -> bool,
{
    let result = read_commands(store, input, interrupt, can_scan).await;
    if let Err(e) = &result {
        tracing::error!(error = %e, "Scanner session failed");
    }

    if let Err(e) = store.send(ScannerAction::Stop).await {
        tracing::warn!(error = %e, "Could not stop the scanner");
    }
    if let Err(e) = store.shutdown(shutdown_timeout).await {
        tracing::warn!(error = %e, "Scanner did not stop cleanly");
    }
    result
}

async fn read_commands<I, F, C>(
    store: &ScannerStore,
    input: I,
    interrupt: F,
    can_scan: C,
) -> Result<(), SessionError>
where
    I: AsyncBufRead + Unpin,
    F: Future<Output = ()>,
    C: Fn() -> bool,
{
    store.send(ScannerAction::Start).await?;

    tokio::pin!(interrupt);
    let mut lines = input.lines();
    loop {
        let line = tokio::select! {
            line = lines.next_line() => line?,
            () = &mut interrupt => None,
        };
        let Some(line) = line else { return Ok(()) };

        match Command::parse(&line) {
            None => {},
            Some(Command::Quit) => return Ok(()),
            Some(Command::Reset) => {
                store.send(ScannerAction::Reset).await?;
            },
            Some(Command::Retry) => {
                store.send(ScannerAction::Retry).await?;
            },
            Some(Command::Status) => {
                let tally = store.state(|s| s.tally).await;
                println!(
                    "Admitted {} | already used {} | invalid {} | errors {}",
                    tally.admitted, tally.already_used, tally.invalid, tally.errors
                );
            },
            Some(Command::Scan(payload)) => {
                if can_scan() {
                    store.send(ScannerAction::FrameDecoded { payload }).await?;
                } else {
                    println!("Not scanning yet; wait for the current result to clear.");
                }
            },
        }
    }
}
