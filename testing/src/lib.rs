//! # Gatepass Testing
//!
//! Testing utilities and helpers for Gatepass.
//!
//! This crate provides:
//! - Mock implementations of Environment traits (clocks)
//! - [`InMemoryRegistrationStore`], also used when no database is configured
//! - The [`ReducerTest`] Given-When-Then harness and effect assertions
//! - Fixtures for events and participants
//!
//! ## Example
//!
//! ```ignore
//! use gatepass_testing::{InMemoryRegistrationStore, test_clock};
//! use gatepass_core::checkin::CheckinValidator;
//!
//! #[tokio::test]
//! async fn checks_in_once() {
//!     let store = Arc::new(InMemoryRegistrationStore::new());
//!     let validator = CheckinValidator::new(store.clone(), Arc::new(test_clock()));
//!     // ...
//! }
//! ```

use chrono::{DateTime, Utc};
use gatepass_core::environment::Clock;

pub mod fixtures;
pub mod memory_store;
pub mod reducer_test;

/// Mock implementations for testing.
pub mod mocks {
    use super::{Clock, DateTime, Utc};
    use chrono::Duration;
    use std::sync::Mutex;

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making tests reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use gatepass_testing::mocks::FixedClock;
    /// use gatepass_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// assert_eq!(clock.now(), clock.now());
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Clock that only moves when told to
    #[derive(Debug)]
    pub struct ManualClock {
        time: Mutex<DateTime<Utc>>,
    }

    impl ManualClock {
        /// Start at the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self {
                time: Mutex::new(time),
            }
        }

        /// Move the clock forward
        pub fn advance(&self, by: Duration) {
            let mut time = self.time.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
            *time += by;
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> DateTime<Utc> {
            *self.time.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
        }
    }

    /// Create a default fixed clock for tests (2025-01-01 00:00:00 UTC)
    ///
    /// # Panics
    ///
    /// This function will panic if the hardcoded timestamp fails to parse,
    /// which should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(
            DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z")
                .expect("hardcoded timestamp should always parse")
                .with_timezone(&Utc),
        )
    }
}

// Re-export commonly used items
pub use memory_store::InMemoryRegistrationStore;
pub use mocks::{FixedClock, ManualClock, test_clock};
pub use reducer_test::{ReducerTest, assertions};
