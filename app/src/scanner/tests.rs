//! Unit tests for `ScannerReducer`.
//!
//! Effects are inspected as values; where it matters what a `Future` effect
//! does, the test awaits it against the recording doubles.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)] // Test code

use super::*;
use crate::scanner::mocks::{RecordingCamera, RecordingFeedback, StubGateway};
use gatepass_core::checkin::{Attendee, CheckinOutcome};
use gatepass_core::effect::Effect;
use gatepass_core::reducer::Reducer;
use gatepass_core::token::Token;
use gatepass_core::types::{EventId, RegistrationId};
use gatepass_testing::{ReducerTest, assertions};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

const RESET_DELAY: Duration = Duration::from_millis(3000);
const TICKET_URL: &str = "https://gate.example.org/#/checkin?token=ABC123";

struct Rig {
    camera: Arc<RecordingCamera>,
    gateway: Arc<StubGateway>,
    feedback: Arc<RecordingFeedback>,
    env: ScannerEnvironment,
}

fn rig(outcome: CheckinOutcome) -> Rig {
    let camera = RecordingCamera::new();
    let gateway = StubGateway::answering(outcome);
    let feedback = RecordingFeedback::new();
    let env = ScannerEnvironment::new(
        camera.clone(),
        gateway.clone(),
        feedback.clone(),
        RESET_DELAY,
    );
    Rig {
        camera,
        gateway,
        feedback,
        env,
    }
}

/// Same ids on every call so outcomes compare equal
fn attendee() -> Attendee {
    Attendee {
        registration_id: RegistrationId::from_uuid(Uuid::from_u128(0x5ca1)),
        event_id: EventId::from_uuid(Uuid::from_u128(0xe7e7)),
        full_name: "Maria Silva".to_string(),
        cpf: "529.982.247-25".to_string(),
        checked_in: true,
        checkin_at: None,
    }
}

fn success() -> CheckinOutcome {
    CheckinOutcome::Success {
        attendee: attendee(),
    }
}

#[test]
fn fixture_outcomes_are_comparable() {
    assert_eq!(success(), success());
}

fn state(phase: ScannerPhase, cycle: u64) -> ScannerState {
    ScannerState {
        phase,
        cycle,
        ..ScannerState::new()
    }
}

async fn run_effect(effect: Effect<ScannerAction>) -> Option<ScannerAction> {
    match effect {
        Effect::Future(fut) => fut.await,
        other => panic!("expected a future effect, got {other:?}"),
    }
}

#[test]
fn start_acquires_camera_in_a_new_cycle() {
    ReducerTest::new(ScannerReducer::new())
        .with_env(rig(success()).env)
        .given_state(ScannerState::new())
        .when_action(ScannerAction::Start)
        .then_state(|s| {
            assert_eq!(s.phase, ScannerPhase::Starting);
            assert_eq!(s.cycle, 1);
        })
        .then_effects(|effects| {
            assertions::assert_effects_count(effects, 1);
            assertions::assert_has_future_effect(effects);
        })
        .run();
}

#[tokio::test]
async fn camera_start_reports_started_or_failed() {
    let rig = rig(success());
    let mut s = ScannerState::new();

    let mut effects = ScannerReducer.reduce(&mut s, ScannerAction::Start, &rig.env);
    let action = run_effect(effects.remove(0)).await;
    assert_eq!(action, Some(ScannerAction::CameraStarted { cycle: 1 }));

    rig.camera.set_refusing(true);
    let mut s = state(ScannerPhase::Stopped, 4);
    let mut effects = ScannerReducer.reduce(&mut s, ScannerAction::Start, &rig.env);
    let Some(ScannerAction::CameraFailed { cycle, reason }) = run_effect(effects.remove(0)).await
    else {
        panic!("expected camera failure");
    };
    assert_eq!(cycle, 5);
    assert!(reason.contains("permission"));
}

#[test]
fn camera_started_begins_scanning() {
    ReducerTest::new(ScannerReducer::new())
        .with_env(rig(success()).env)
        .given_state(state(ScannerPhase::Starting, 1))
        .when_action(ScannerAction::CameraStarted { cycle: 1 })
        .then_state(|s| assert_eq!(s.phase, ScannerPhase::Scanning))
        .then_effects(assertions::assert_no_effects)
        .run();
}

#[test]
fn camera_failure_waits_for_retry() {
    ReducerTest::new(ScannerReducer::new())
        .with_env(rig(success()).env)
        .given_state(state(ScannerPhase::Starting, 1))
        .when_action(ScannerAction::CameraFailed {
            cycle: 1,
            reason: "Camera permission denied".to_string(),
        })
        .then_state(|s| {
            assert_eq!(
                s.phase,
                ScannerPhase::CameraUnavailable {
                    reason: "Camera permission denied".to_string()
                }
            );
        })
        .then_effects(assertions::assert_no_effects)
        .run();

    // A reset is not a retry.
    ReducerTest::new(ScannerReducer::new())
        .with_env(rig(success()).env)
        .given_state(state(
            ScannerPhase::CameraUnavailable {
                reason: "busy".to_string(),
            },
            1,
        ))
        .when_action(ScannerAction::Reset)
        .then_state(|s| assert!(matches!(s.phase, ScannerPhase::CameraUnavailable { .. })))
        .then_effects(assertions::assert_no_effects)
        .run();

    ReducerTest::new(ScannerReducer::new())
        .with_env(rig(success()).env)
        .given_state(state(
            ScannerPhase::CameraUnavailable {
                reason: "busy".to_string(),
            },
            1,
        ))
        .when_action(ScannerAction::Retry)
        .then_state(|s| {
            assert_eq!(s.phase, ScannerPhase::Starting);
            assert_eq!(s.cycle, 2);
        })
        .then_effects(assertions::assert_has_future_effect)
        .run();
}

#[test]
fn decoded_url_moves_to_validating_with_extracted_token() {
    ReducerTest::new(ScannerReducer::new())
        .with_env(rig(success()).env)
        .given_state(state(ScannerPhase::Scanning, 1))
        .when_action(ScannerAction::FrameDecoded {
            payload: TICKET_URL.to_string(),
        })
        .then_state(|s| {
            assert_eq!(
                s.phase,
                ScannerPhase::Validating {
                    token: Token::parse("ABC123").unwrap()
                }
            );
        })
        .then_effects(|effects| {
            assertions::assert_effects_count(effects, 1);
            assertions::assert_has_future_effect(effects);
        })
        .run();
}

#[tokio::test]
async fn validating_releases_camera_then_validates_once() {
    let rig = rig(success());
    let mut s = state(ScannerPhase::Scanning, 3);

    let mut effects = ScannerReducer.reduce(
        &mut s,
        ScannerAction::FrameDecoded {
            payload: TICKET_URL.to_string(),
        },
        &rig.env,
    );
    let action = run_effect(effects.remove(0)).await;

    assert_eq!(rig.camera.stops(), 1);
    assert_eq!(rig.gateway.seen(), vec![Token::parse("ABC123").unwrap()]);
    assert_eq!(
        action,
        Some(ScannerAction::ValidationCompleted {
            cycle: 3,
            outcome: success()
        })
    );
}

#[test]
fn frames_outside_scanning_are_ignored() {
    let busy_phases = [
        ScannerPhase::Idle,
        ScannerPhase::Starting,
        ScannerPhase::Validating {
            token: Token::parse("ABC123").unwrap(),
        },
        ScannerPhase::Showing { outcome: success() },
        ScannerPhase::Stopped,
    ];
    for phase in busy_phases {
        let expected = phase.clone();
        ReducerTest::new(ScannerReducer::new())
            .with_env(rig(success()).env)
            .given_state(state(phase, 2))
            .when_action(ScannerAction::FrameDecoded {
                payload: TICKET_URL.to_string(),
            })
            .then_state(move |s| assert_eq!(s.phase, expected))
            .then_effects(assertions::assert_no_effects)
            .run();
    }
}

#[test]
fn frame_without_token_keeps_scanning() {
    ReducerTest::new(ScannerReducer::new())
        .with_env(rig(success()).env)
        .given_state(state(ScannerPhase::Scanning, 1))
        .when_action(ScannerAction::FrameDecoded {
            payload: "https://gate.example.org/#/checkin?ref=poster".to_string(),
        })
        .then_state(|s| assert_eq!(s.phase, ScannerPhase::Scanning))
        .then_effects(assertions::assert_no_effects)
        .run();
}

#[tokio::test]
async fn completion_shows_result_plays_tone_and_schedules_reset() {
    let rig = rig(success());
    let mut s = state(
        ScannerPhase::Validating {
            token: Token::parse("ABC123").unwrap(),
        },
        2,
    );

    let mut effects = ScannerReducer.reduce(
        &mut s,
        ScannerAction::ValidationCompleted {
            cycle: 2,
            outcome: success(),
        },
        &rig.env,
    );

    assert_eq!(s.shown_outcome(), Some(&success()));
    assert_eq!(s.tally.admitted, 1);
    assertions::assert_has_delay_effect(&effects, RESET_DELAY);

    assert!(run_effect(effects.remove(0)).await.is_none());
    assert_eq!(rig.feedback.tones(), vec![FeedbackTone::Success]);
}

#[test]
fn outcome_kinds_map_to_tones_and_tally() {
    let outcomes = [
        (
            CheckinOutcome::AlreadyUsed {
                attendee: attendee(),
            },
            FeedbackTone::AlreadyUsed,
        ),
        (CheckinOutcome::InvalidToken, FeedbackTone::Error),
        (
            CheckinOutcome::SystemError {
                detail: "timeout".to_string(),
            },
            FeedbackTone::Error,
        ),
    ];
    let mut tally = ScanTally::default();
    for (outcome, tone) in outcomes {
        assert_eq!(FeedbackTone::from(outcome.kind()), tone);
        tally.record(outcome.kind());
    }
    assert_eq!(
        tally,
        ScanTally {
            admitted: 0,
            already_used: 1,
            invalid: 1,
            errors: 1
        }
    );
}

#[test]
fn reset_delay_restarts_camera_only_for_current_cycle() {
    ReducerTest::new(ScannerReducer::new())
        .with_env(rig(success()).env)
        .given_state(state(ScannerPhase::Showing { outcome: success() }, 2))
        .when_action(ScannerAction::ResetElapsed { cycle: 2 })
        .then_state(|s| {
            assert_eq!(s.phase, ScannerPhase::Starting);
            assert_eq!(s.cycle, 3);
        })
        .then_effects(assertions::assert_has_future_effect)
        .run();

    // Manual reset already moved on; the old timer must not cut the new result short.
    ReducerTest::new(ScannerReducer::new())
        .with_env(rig(success()).env)
        .given_state(state(ScannerPhase::Showing { outcome: success() }, 4))
        .when_action(ScannerAction::ResetElapsed { cycle: 2 })
        .then_state(|s| {
            assert!(matches!(s.phase, ScannerPhase::Showing { .. }));
            assert_eq!(s.cycle, 4);
        })
        .then_effects(assertions::assert_no_effects)
        .run();
}

#[test]
fn manual_reset_from_showing_restarts() {
    ReducerTest::new(ScannerReducer::new())
        .with_env(rig(success()).env)
        .given_state(state(ScannerPhase::Showing { outcome: success() }, 2))
        .when_action(ScannerAction::Reset)
        .then_state(|s| {
            assert_eq!(s.phase, ScannerPhase::Starting);
            assert_eq!(s.cycle, 3);
        })
        .then_effects(|effects| {
            assertions::assert_has_future_effect(effects);
            assertions::assert_no_delay_effect(effects);
        })
        .run();
}

#[test]
fn stale_validation_is_dropped() {
    ReducerTest::new(ScannerReducer::new())
        .with_env(rig(success()).env)
        .given_state(state(ScannerPhase::Stopped, 5))
        .when_action(ScannerAction::ValidationCompleted {
            cycle: 4,
            outcome: success(),
        })
        .then_state(|s| {
            assert_eq!(s.phase, ScannerPhase::Stopped);
            assert_eq!(s.tally, ScanTally::default());
        })
        .then_effects(assertions::assert_no_effects)
        .run();
}

#[tokio::test]
async fn stop_releases_camera_from_every_active_phase() {
    let phases = [
        ScannerPhase::Starting,
        ScannerPhase::Scanning,
        ScannerPhase::Validating {
            token: Token::parse("ABC123").unwrap(),
        },
        ScannerPhase::Showing { outcome: success() },
        ScannerPhase::CameraUnavailable {
            reason: "busy".to_string(),
        },
    ];
    for phase in phases {
        let rig = rig(success());
        let mut s = state(phase, 1);

        let mut effects = ScannerReducer.reduce(&mut s, ScannerAction::Stop, &rig.env);
        assert_eq!(s.phase, ScannerPhase::Stopped);
        assert_eq!(s.cycle, 2);
        assert_eq!(effects.len(), 1);

        assert!(run_effect(effects.remove(0)).await.is_none());
        assert_eq!(rig.camera.stops(), 1);
    }
}

#[tokio::test]
async fn camera_finishing_after_stop_is_released() {
    let rig = rig(success());
    let mut s = ScannerState::new();

    ScannerReducer.reduce(&mut s, ScannerAction::Start, &rig.env);
    ScannerReducer.reduce(&mut s, ScannerAction::Stop, &rig.env);
    let mut effects =
        ScannerReducer.reduce(&mut s, ScannerAction::CameraStarted { cycle: 1 }, &rig.env);

    assert_eq!(s.phase, ScannerPhase::Stopped);
    assert_eq!(effects.len(), 1);
    run_effect(effects.remove(0)).await;
    assert_eq!(rig.camera.stops(), 1);
    assert!(!rig.camera.is_active());
}

#[test]
fn late_camera_from_superseded_start_is_ignored_while_restarting() {
    ReducerTest::new(ScannerReducer::new())
        .with_env(rig(success()).env)
        .given_state(state(ScannerPhase::Starting, 3))
        .when_action(ScannerAction::CameraStarted { cycle: 1 })
        .then_state(|s| assert_eq!(s.phase, ScannerPhase::Starting))
        .then_effects(assertions::assert_no_effects)
        .run();
}

#[test]
fn stop_when_idle_does_nothing() {
    ReducerTest::new(ScannerReducer::new())
        .with_env(rig(success()).env)
        .given_state(ScannerState::new())
        .when_action(ScannerAction::Stop)
        .then_state(|s| assert_eq!(s.phase, ScannerPhase::Idle))
        .then_effects(assertions::assert_no_effects)
        .run();
}
