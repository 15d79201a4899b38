//! Persistence seam for events and registrations.
//!
//! # Implementations
//!
//! - `PostgresRegistrationStore` (in `gatepass-postgres`): production storage
//! - `InMemoryRegistrationStore` (in `gatepass-testing`): tests and the
//!   database-less development mode
//!
//! # Check-in atomicity
//!
//! [`RegistrationStore::mark_checked_in`] is a conditional update: it flips
//! `checked_in` only if it is still `false`, in one atomic step. Under any
//! number of concurrent callers for the same token, exactly one observes
//! `Some(_)`.

use crate::token::Token;
use crate::types::{Event, EventDetails, EventId, Registration, RegistrationId};
use chrono::{DateTime, Utc};
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Boxed future returned by store operations
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + Send + 'a>>;

/// Errors that can occur during store operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// No event with this id.
    #[error("Event not found: {0}")]
    EventNotFound(EventId),

    /// No registration with this id.
    #[error("Registration not found: {0}")]
    RegistrationNotFound(RegistrationId),

    /// The token is already assigned to another registration.
    #[error("Token already in use")]
    DuplicateToken,

    /// This CPF is already registered for the event.
    #[error("CPF {cpf} already registered for event {event_id}")]
    DuplicateParticipant {
        /// Event the participant tried to join
        event_id: EventId,
        /// The duplicated CPF
        cpf: String,
    },

    /// Database connection or query failure.
    #[error("Database error: {0}")]
    DatabaseError(String),
}

/// Storage for events and their registrations.
///
/// # Dyn Compatibility
///
/// This trait uses explicit `Pin<Box<dyn Future>>` returns instead of `async fn`
/// so it can be shared as `Arc<dyn RegistrationStore>` between the HTTP layer,
/// the validator and scanner effects.
pub trait RegistrationStore: Send + Sync {
    /// Persist a new event.
    ///
    /// # Errors
    ///
    /// - `DatabaseError`: the write failed
    fn insert_event(&self, event: Event) -> StoreFuture<'_, Event>;

    /// Replace an event's editable fields.
    ///
    /// The closed flag is left as stored; only [`Self::close_event`] writes it.
    ///
    /// # Errors
    ///
    /// - `EventNotFound`: no such event
    /// - `DatabaseError`: the write failed
    fn update_event(&self, id: EventId, details: EventDetails) -> StoreFuture<'_, Event>;

    /// Load one event.
    ///
    /// # Errors
    ///
    /// - `DatabaseError`: the read failed
    fn get_event(&self, id: EventId) -> StoreFuture<'_, Option<Event>>;

    /// All events, most recent date first.
    ///
    /// # Errors
    ///
    /// - `DatabaseError`: the read failed
    fn list_events(&self) -> StoreFuture<'_, Vec<Event>>;

    /// Mark an event closed. Idempotent.
    ///
    /// # Errors
    ///
    /// - `EventNotFound`: no such event
    /// - `DatabaseError`: the write failed
    fn close_event(&self, id: EventId) -> StoreFuture<'_, Event>;

    /// Delete an event together with its registrations.
    ///
    /// # Errors
    ///
    /// - `EventNotFound`: no such event
    /// - `DatabaseError`: the write failed
    fn delete_event(&self, id: EventId) -> StoreFuture<'_, ()>;

    /// Persist a new registration.
    ///
    /// # Errors
    ///
    /// - `EventNotFound`: the parent event does not exist
    /// - `DuplicateToken`: the token is already assigned
    /// - `DuplicateParticipant`: the CPF is already registered for the event
    /// - `DatabaseError`: the write failed
    fn insert_registration(&self, registration: Registration) -> StoreFuture<'_, Registration>;

    /// Load one registration.
    ///
    /// # Errors
    ///
    /// - `DatabaseError`: the read failed
    fn get_registration(&self, id: RegistrationId) -> StoreFuture<'_, Option<Registration>>;

    /// Registrations of an event, oldest first.
    ///
    /// # Errors
    ///
    /// - `DatabaseError`: the read failed
    fn list_registrations(&self, event_id: EventId) -> StoreFuture<'_, Vec<Registration>>;

    /// Exact-match lookup by token.
    ///
    /// # Errors
    ///
    /// - `DatabaseError`: the read failed
    fn find_by_token(&self, token: Token) -> StoreFuture<'_, Option<Registration>>;

    /// Conditionally mark the registration holding `token` as checked in.
    ///
    /// Sets `checked_in = true` and `checkin_at = at` only if the registration
    /// exists and is not yet checked in. Returns the updated registration when
    /// this call performed the transition, `None` otherwise.
    ///
    /// # Errors
    ///
    /// - `DatabaseError`: the write failed; nothing was changed
    fn mark_checked_in(
        &self,
        token: Token,
        at: DateTime<Utc>,
    ) -> StoreFuture<'_, Option<Registration>>;

    /// Cheap connectivity probe for readiness checks.
    ///
    /// # Errors
    ///
    /// - `DatabaseError`: the store is unreachable
    fn ping(&self) -> StoreFuture<'_, ()>;
}
