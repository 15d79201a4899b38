//! Integration tests for Store action broadcasting
//!
//! A request/response caller (HTTP handler, terminal UI) sends an action and
//! waits for the action its effects produce.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)] // Test code can use unwrap/expect/panic

use gatepass_core::{SmallVec, effect::Effect, reducer::Reducer, smallvec};
use gatepass_runtime::{RuntimeError, Store};
use std::sync::Arc;
use std::time::Duration;

// ============================================================================
// Test Fixtures
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
enum GateAction {
    /// Ask the gate to admit a badge
    Admit { badge: u64 },
    /// The gate finished its lookup
    Admitted { badge: u64, total: u32 },
    /// Never produced; used for timeouts
    Jammed,
}

#[derive(Debug, Clone, Default)]
struct GateState {
    admitted: u32,
}

#[derive(Clone)]
struct GateEnvironment;

#[derive(Clone)]
struct GateReducer;

impl Reducer for GateReducer {
    type State = GateState;
    type Action = GateAction;
    type Environment = GateEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        _env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            GateAction::Admit { badge } => {
                state.admitted += 1;
                let total = state.admitted;
                smallvec![Effect::Future(Box::pin(async move {
                    // Simulate a lookup
                    tokio::time::sleep(Duration::from_millis(5)).await;
                    Some(GateAction::Admitted { badge, total })
                }))]
            },
            GateAction::Admitted { .. } | GateAction::Jammed => smallvec![Effect::None],
        }
    }
}

fn gate() -> Arc<Store<GateState, GateAction, GateEnvironment, GateReducer>> {
    Arc::new(Store::new(GateState::default(), GateReducer, GateEnvironment))
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test]
async fn test_send_and_wait_for_response() {
    let store = gate();

    let result = store
        .send_and_wait_for(
            GateAction::Admit { badge: 7 },
            |action| matches!(action, GateAction::Admitted { badge: 7, .. }),
            Duration::from_secs(1),
        )
        .await
        .unwrap();

    assert_eq!(result, GateAction::Admitted { badge: 7, total: 1 });
}

#[tokio::test]
async fn test_send_and_wait_for_timeout() {
    let store = gate();

    let result = store
        .send_and_wait_for(
            GateAction::Admit { badge: 1 },
            |action| matches!(action, GateAction::Jammed),
            Duration::from_millis(50),
        )
        .await;

    assert_eq!(result.unwrap_err(), RuntimeError::Timeout);
}

#[tokio::test]
async fn test_concurrent_callers_get_their_own_response() {
    let store = gate();

    let mut handles = vec![];
    for badge in 1..=5 {
        let store = Arc::clone(&store);
        handles.push(tokio::spawn(async move {
            store
                .send_and_wait_for(
                    GateAction::Admit { badge },
                    move |action| {
                        matches!(action, GateAction::Admitted { badge: b, .. } if *b == badge)
                    },
                    Duration::from_secs(2),
                )
                .await
        }));
    }

    for (i, handle) in handles.into_iter().enumerate() {
        let action = handle.await.expect("Task panicked").unwrap();
        let expected_badge = u64::try_from(i + 1).unwrap();
        assert!(matches!(action, GateAction::Admitted { badge, .. } if badge == expected_badge));
    }

    assert_eq!(store.state(|s| s.admitted).await, 5);
}

#[tokio::test]
async fn test_every_subscriber_sees_every_action() {
    let store = gate();
    let mut rx1 = store.subscribe_actions();
    let mut rx2 = store.subscribe_actions();

    let mut handle = store.send(GateAction::Admit { badge: 3 }).await.unwrap();
    handle.wait_with_timeout(Duration::from_secs(1)).await.unwrap();

    for rx in [&mut rx1, &mut rx2] {
        assert_eq!(
            rx.try_recv().unwrap(),
            GateAction::Admitted { badge: 3, total: 1 }
        );
    }
}
