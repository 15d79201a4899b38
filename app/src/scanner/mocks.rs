//! Recording test doubles for the scanner environment.

use crate::scanner::environment::{BoxFuture, Camera, CameraError, CheckinGateway, ScanFeedback};
use crate::scanner::types::FeedbackTone;
use gatepass_core::checkin::CheckinOutcome;
use gatepass_core::token::Token;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

/// Camera that counts acquisitions and releases.
#[derive(Debug, Default)]
pub struct RecordingCamera {
    starts: AtomicUsize,
    stops: AtomicUsize,
    active: AtomicBool,
    refuse: AtomicBool,
}

impl RecordingCamera {
    /// A working camera
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Make subsequent starts fail with [`CameraError::PermissionDenied`]
    pub fn set_refusing(&self, refuse: bool) {
        self.refuse.store(refuse, Ordering::SeqCst);
    }

    /// Successful and failed start attempts
    #[must_use]
    pub fn starts(&self) -> usize {
        self.starts.load(Ordering::SeqCst)
    }

    /// Release calls
    #[must_use]
    pub fn stops(&self) -> usize {
        self.stops.load(Ordering::SeqCst)
    }

    /// Whether the camera is currently held
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }
}

impl Camera for RecordingCamera {
    fn start(&self) -> BoxFuture<'_, Result<(), CameraError>> {
        Box::pin(async move {
            self.starts.fetch_add(1, Ordering::SeqCst);
            if self.refuse.load(Ordering::SeqCst) {
                return Err(CameraError::PermissionDenied);
            }
            self.active.store(true, Ordering::SeqCst);
            Ok(())
        })
    }

    fn stop(&self) -> BoxFuture<'_, ()> {
        Box::pin(async move {
            self.stops.fetch_add(1, Ordering::SeqCst);
            self.active.store(false, Ordering::SeqCst);
        })
    }
}

/// Gateway that answers every token with the same outcome.
#[derive(Debug)]
pub struct StubGateway {
    outcome: Mutex<CheckinOutcome>,
    seen: Mutex<Vec<Token>>,
}

impl StubGateway {
    /// Answer with `outcome`
    #[must_use]
    pub fn answering(outcome: CheckinOutcome) -> Arc<Self> {
        Arc::new(Self {
            outcome: Mutex::new(outcome),
            seen: Mutex::new(Vec::new()),
        })
    }

    /// Tokens validated so far
    #[must_use]
    pub fn seen(&self) -> Vec<Token> {
        self.seen
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl CheckinGateway for StubGateway {
    fn validate(&self, token: Token) -> BoxFuture<'_, CheckinOutcome> {
        Box::pin(async move {
            self.seen
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(token);
            self.outcome
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone()
        })
    }
}

/// Feedback that remembers every tone.
#[derive(Debug, Default)]
pub struct RecordingFeedback {
    tones: Mutex<Vec<FeedbackTone>>,
}

impl RecordingFeedback {
    /// Empty recorder
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Tones played so far
    #[must_use]
    pub fn tones(&self) -> Vec<FeedbackTone> {
        self.tones
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl ScanFeedback for RecordingFeedback {
    fn play(&self, tone: FeedbackTone) {
        self.tones
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(tone);
    }
}
