//! In-memory registration store.
//!
//! Fast and deterministic for tests, and the fallback backend when no
//! database is configured. All operations run under one lock, so the
//! conditional check-in update is atomic.

use chrono::{DateTime, Utc};
use gatepass_core::registration_store::{RegistrationStore, StoreError, StoreFuture};
use gatepass_core::token::Token;
use gatepass_core::types::{Event, EventDetails, EventId, Registration, RegistrationId};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Default)]
struct Tables {
    events: HashMap<EventId, Event>,
    // Insertion order doubles as registration order.
    registrations: Vec<Registration>,
    preempt_checkin_at: Option<DateTime<Utc>>,
}

impl Tables {
    fn registration_by_token_mut(&mut self, token: &Token) -> Option<&mut Registration> {
        self.registrations.iter_mut().find(|r| &r.token == token)
    }
}

/// `HashMap`-backed [`RegistrationStore`]
///
/// # Example
///
/// ```
/// use gatepass_testing::InMemoryRegistrationStore;
/// use gatepass_core::registration_store::RegistrationStore;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = InMemoryRegistrationStore::new();
/// assert!(store.list_events().await?.is_empty());
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, Default)]
pub struct InMemoryRegistrationStore {
    tables: Arc<Mutex<Tables>>,
    failing: Arc<AtomicBool>,
    checkin_writes: Arc<AtomicUsize>,
}

impl InMemoryRegistrationStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent operation fail with `DatabaseError`
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Let another writer win the next check-in race.
    ///
    /// The next [`mark_checked_in`](RegistrationStore::mark_checked_in) call
    /// first checks the registration in at `at`, as a concurrent scanner
    /// would, and then attempts its own conditional update.
    pub fn preempt_next_checkin(&self, at: DateTime<Utc>) {
        if let Ok(mut tables) = self.tables.lock() {
            tables.preempt_checkin_at = Some(at);
        }
    }

    /// Number of conditional updates that actually flipped a registration
    #[must_use]
    pub fn checkin_writes(&self) -> usize {
        self.checkin_writes.load(Ordering::SeqCst)
    }

    /// Snapshot of every stored registration
    #[must_use]
    pub fn registrations(&self) -> Vec<Registration> {
        self.tables
            .lock()
            .map(|t| t.registrations.clone())
            .unwrap_or_default()
    }

    fn tables(&self) -> Result<MutexGuard<'_, Tables>, StoreError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StoreError::DatabaseError("injected failure".to_string()));
        }
        self.tables
            .lock()
            .map_err(|_| StoreError::DatabaseError("store lock poisoned".to_string()))
    }
}

impl RegistrationStore for InMemoryRegistrationStore {
    fn insert_event(&self, event: Event) -> StoreFuture<'_, Event> {
        Box::pin(async move {
            self.tables()?.events.insert(event.id, event.clone());
            Ok(event)
        })
    }

    fn update_event(&self, id: EventId, details: EventDetails) -> StoreFuture<'_, Event> {
        Box::pin(async move {
            let mut tables = self.tables()?;
            let stored = tables
                .events
                .get_mut(&id)
                .ok_or(StoreError::EventNotFound(id))?;
            stored.details = details;
            Ok(stored.clone())
        })
    }

    fn get_event(&self, id: EventId) -> StoreFuture<'_, Option<Event>> {
        Box::pin(async move { Ok(self.tables()?.events.get(&id).cloned()) })
    }

    fn list_events(&self) -> StoreFuture<'_, Vec<Event>> {
        Box::pin(async move {
            let mut events: Vec<Event> = self.tables()?.events.values().cloned().collect();
            events.sort_by(|a, b| {
                b.details
                    .date
                    .cmp(&a.details.date)
                    .then(b.created_at.cmp(&a.created_at))
            });
            Ok(events)
        })
    }

    fn close_event(&self, id: EventId) -> StoreFuture<'_, Event> {
        Box::pin(async move {
            let mut tables = self.tables()?;
            let event = tables
                .events
                .get_mut(&id)
                .ok_or(StoreError::EventNotFound(id))?;
            event.closed = true;
            Ok(event.clone())
        })
    }

    fn delete_event(&self, id: EventId) -> StoreFuture<'_, ()> {
        Box::pin(async move {
            let mut tables = self.tables()?;
            tables
                .events
                .remove(&id)
                .ok_or(StoreError::EventNotFound(id))?;
            tables.registrations.retain(|r| r.event_id != id);
            Ok(())
        })
    }

    fn insert_registration(&self, registration: Registration) -> StoreFuture<'_, Registration> {
        Box::pin(async move {
            let mut tables = self.tables()?;
            if !tables.events.contains_key(&registration.event_id) {
                return Err(StoreError::EventNotFound(registration.event_id));
            }
            if tables
                .registrations
                .iter()
                .any(|r| r.token == registration.token)
            {
                return Err(StoreError::DuplicateToken);
            }
            if tables.registrations.iter().any(|r| {
                r.event_id == registration.event_id
                    && r.participant.cpf == registration.participant.cpf
            }) {
                return Err(StoreError::DuplicateParticipant {
                    event_id: registration.event_id,
                    cpf: registration.participant.cpf,
                });
            }
            tables.registrations.push(registration.clone());
            Ok(registration)
        })
    }

    fn get_registration(&self, id: RegistrationId) -> StoreFuture<'_, Option<Registration>> {
        Box::pin(async move {
            Ok(self
                .tables()?
                .registrations
                .iter()
                .find(|r| r.id == id)
                .cloned())
        })
    }

    fn list_registrations(&self, event_id: EventId) -> StoreFuture<'_, Vec<Registration>> {
        Box::pin(async move {
            Ok(self
                .tables()?
                .registrations
                .iter()
                .filter(|r| r.event_id == event_id)
                .cloned()
                .collect())
        })
    }

    fn find_by_token(&self, token: Token) -> StoreFuture<'_, Option<Registration>> {
        Box::pin(async move {
            Ok(self
                .tables()?
                .registrations
                .iter()
                .find(|r| r.token == token)
                .cloned())
        })
    }

    fn mark_checked_in(
        &self,
        token: Token,
        at: DateTime<Utc>,
    ) -> StoreFuture<'_, Option<Registration>> {
        Box::pin(async move {
            let mut tables = self.tables()?;

            if let Some(winner_at) = tables.preempt_checkin_at.take() {
                if let Some(registration) = tables.registration_by_token_mut(&token) {
                    if !registration.checked_in {
                        registration.checked_in = true;
                        registration.checkin_at = Some(winner_at);
                        self.checkin_writes.fetch_add(1, Ordering::SeqCst);
                    }
                }
            }

            let Some(registration) = tables.registration_by_token_mut(&token) else {
                return Ok(None);
            };
            if registration.checked_in {
                return Ok(None);
            }

            registration.checked_in = true;
            registration.checkin_at = Some(at);
            self.checkin_writes.fetch_add(1, Ordering::SeqCst);
            tracing::debug!(registration_id = %registration.id, "Registration checked in");
            Ok(Some(registration.clone()))
        })
    }

    fn ping(&self) -> StoreFuture<'_, ()> {
        Box::pin(async move {
            self.tables()?;
            Ok(())
        })
    }
}
