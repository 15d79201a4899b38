//! Gatepass door scanner.
//!
//! Reads decoded QR payloads line by line from stdin (a hand-held scanner in
//! keyboard mode, or pasted URLs), validates them against a Gatepass server
//! and shows the result until the reset delay elapses.
//!
//! Commands typed instead of a code:
//! - `reset` shows the next scan immediately
//! - `retry` retries a camera that failed to start
//! - `status` prints the session tally
//! - `quit` stops the scanner
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin gatepass-scanner -- --server http://localhost:8080
//! ```

use clap::Parser;
use gatepass::Config;
use gatepass::scanner::terminal::{TerminalBell, TerminalCamera, render_outcome};
use gatepass::scanner::{
    HttpCheckinGateway, ScannerAction, ScannerEnvironment, ScannerReducer, ScannerState,
    ScannerStore, run_session,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::BufReader;
use tokio::sync::broadcast::error::RecvError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Parser)]
#[command(name = "gatepass-scanner")]
#[command(about = "Check attendees in at the door")]
struct Cli {
    /// Gatepass server base URL (default: GATEPASS_SERVER_URL)
    #[arg(long)]
    server: Option<String>,
    /// Milliseconds a result stays on screen (default: SCANNER_RESET_DELAY_MS)
    #[arg(long)]
    reset_delay_ms: Option<u64>,
}

/// Print what the loop does as it does it.
fn spawn_display(store: &ScannerStore) -> tokio::task::JoinHandle<()> {
    let mut actions = store.subscribe_actions();
    tokio::spawn(async move {
        loop {
            match actions.recv().await {
                Ok(ScannerAction::CameraStarted { .. }) => println!("Ready to scan."),
                Ok(ScannerAction::CameraFailed { reason, .. }) => {
                    println!("Camera unavailable: {reason}. Type `retry` to try again.");
                },
                Ok(ScannerAction::ValidationCompleted { outcome, .. }) => {
                    println!("{}", render_outcome(&outcome));
                },
                Ok(_) => {},
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Display fell behind");
                },
                Err(RecvError::Closed) => break,
            }
        }
    })
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenvy::dotenv();

    // Logs go to stderr; stdout is the operator's screen.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn,gatepass=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let mut scanner_config = Config::from_env().scanner;
    if let Some(server) = cli.server {
        scanner_config.server_url = server;
    }
    if let Some(ms) = cli.reset_delay_ms {
        scanner_config.reset_delay_ms = ms;
    }

    let gateway = HttpCheckinGateway::new(reqwest::Client::new(), &scanner_config.server_url);
    tracing::info!(endpoint = gateway.endpoint(), "Scanner configured");

    let camera = Arc::new(TerminalCamera::new());
    let environment = ScannerEnvironment::new(
        camera.clone(),
        Arc::new(gateway),
        Arc::new(TerminalBell),
        scanner_config.reset_delay(),
    );
    let store = ScannerStore::new(ScannerState::new(), ScannerReducer::new(), environment);
    let display = spawn_display(&store);

    let session = run_session(
        &store,
        BufReader::new(tokio::io::stdin()),
        async {
            let _ = tokio::signal::ctrl_c().await;
        },
        || camera.is_live(),
        SHUTDOWN_TIMEOUT,
    )
    .await;
    display.abort();

    let tally = store.state(|s| s.tally).await;
    println!("Session ended: {} admitted.", tally.admitted);
    session.map_err(Into::into)
}
