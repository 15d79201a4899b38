//! Reducer for the door scanner loop.

use crate::scanner::{
    FeedbackTone, ScannerAction, ScannerEnvironment, ScannerPhase, ScannerState,
};
use gatepass_core::checkin_url::extract_token;
use gatepass_core::token::Token;
use gatepass_core::{async_effect, delay, effect::Effect, reducer::Reducer};
use smallvec::{SmallVec, smallvec};

type Effects = SmallVec<[Effect<ScannerAction>; 4]>;

/// Drives one scanner through acquire → scan → validate → show → reset.
///
/// At most one validation is in flight: decoded frames are only accepted in
/// [`ScannerPhase::Scanning`], and entering `Validating` releases the camera
/// before calling the gateway.
#[derive(Clone, Copy, Debug, Default)]
pub struct ScannerReducer;

impl ScannerReducer {
    /// Create a new scanner reducer.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Begin a new cycle and request the camera.
    fn acquire(state: &mut ScannerState, env: &ScannerEnvironment) -> Effects {
        state.cycle += 1;
        state.phase = ScannerPhase::Starting;
        let cycle = state.cycle;
        let camera = env.camera.clone();

        tracing::debug!(cycle, "Acquiring camera");
        smallvec![async_effect! {
            match camera.start().await {
                Ok(()) => Some(ScannerAction::CameraStarted { cycle }),
                Err(e) => Some(ScannerAction::CameraFailed {
                    cycle,
                    reason: e.to_string(),
                }),
            }
        }]
    }

    fn release(env: &ScannerEnvironment) -> Effect<ScannerAction> {
        let camera = env.camera.clone();
        async_effect! {
            camera.stop().await;
            None
        }
    }

    fn validate(cycle: u64, token: Token, env: &ScannerEnvironment) -> Effect<ScannerAction> {
        let camera = env.camera.clone();
        let gateway = env.gateway.clone();
        async_effect! {
            camera.stop().await;
            let outcome = gateway.validate(token).await;
            Some(ScannerAction::ValidationCompleted { cycle, outcome })
        }
    }
}

impl Reducer for ScannerReducer {
    type State = ScannerState;
    type Action = ScannerAction;
    type Environment = ScannerEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            ScannerAction::Start => match state.phase {
                ScannerPhase::Idle | ScannerPhase::Stopped => Self::acquire(state, env),
                _ => SmallVec::new(),
            },

            ScannerAction::CameraStarted { cycle } => {
                if cycle == state.cycle && state.phase == ScannerPhase::Starting {
                    state.phase = ScannerPhase::Scanning;
                    tracing::info!(cycle, "Scanning");
                    SmallVec::new()
                } else if matches!(state.phase, ScannerPhase::Stopped | ScannerPhase::Idle) {
                    // Finished starting after the operator left.
                    tracing::debug!(cycle, "Releasing camera started after stop");
                    smallvec![Self::release(env)]
                } else {
                    SmallVec::new()
                }
            },

            ScannerAction::CameraFailed { cycle, reason } => {
                if cycle == state.cycle && state.phase == ScannerPhase::Starting {
                    tracing::warn!(cycle, %reason, "Camera unavailable");
                    state.phase = ScannerPhase::CameraUnavailable { reason };
                }
                SmallVec::new()
            },

            ScannerAction::FrameDecoded { payload } => {
                if state.phase != ScannerPhase::Scanning {
                    return SmallVec::new();
                }
                let Some(token) = extract_token(&payload) else {
                    tracing::debug!("Ignoring frame without a token");
                    return SmallVec::new();
                };

                tracing::info!(cycle = state.cycle, token = %token.redacted(), "Validating");
                state.phase = ScannerPhase::Validating {
                    token: token.clone(),
                };
                smallvec![Self::validate(state.cycle, token, env)]
            },

            ScannerAction::ValidationCompleted { cycle, outcome } => {
                if cycle != state.cycle || !matches!(state.phase, ScannerPhase::Validating { .. })
                {
                    return SmallVec::new();
                }

                let kind = outcome.kind();
                state.tally.record(kind);
                state.phase = ScannerPhase::Showing { outcome };

                let tone = FeedbackTone::from(kind);
                let feedback = env.feedback.clone();
                smallvec![
                    async_effect! {
                        feedback.play(tone);
                        None
                    },
                    delay! {
                        duration: env.reset_delay,
                        action: ScannerAction::ResetElapsed { cycle }
                    },
                ]
            },

            ScannerAction::ResetElapsed { cycle } => {
                if cycle == state.cycle && matches!(state.phase, ScannerPhase::Showing { .. }) {
                    Self::acquire(state, env)
                } else {
                    SmallVec::new()
                }
            },

            ScannerAction::Reset => match state.phase {
                ScannerPhase::Showing { .. } => Self::acquire(state, env),
                _ => SmallVec::new(),
            },

            ScannerAction::Retry => match state.phase {
                ScannerPhase::CameraUnavailable { .. } => Self::acquire(state, env),
                _ => SmallVec::new(),
            },

            ScannerAction::Stop => {
                if matches!(state.phase, ScannerPhase::Idle | ScannerPhase::Stopped) {
                    return SmallVec::new();
                }
                state.cycle += 1;
                state.phase = ScannerPhase::Stopped;
                tracing::info!("Scanner stopped");
                smallvec![Self::release(env)]
            },
        }
    }
}
