//! `PostgreSQL` registration store for Gatepass.
//!
//! Implements `RegistrationStore` from `gatepass-core` on top of sqlx:
//!
//! - Events and registrations with cascading delete
//! - Token and (event, CPF) uniqueness enforced by constraints
//! - Check-in as a single conditional `UPDATE ... RETURNING`
//! - Embedded migrations
//!
//! # Example
//!
//! ```ignore
//! use gatepass_postgres::PostgresRegistrationStore;
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = PostgresRegistrationStore::connect("postgres://localhost/gatepass", 10).await?;
//!     store.migrate().await?;
//!     Ok(())
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use chrono::{DateTime, NaiveDate, Utc};
use gatepass_core::registration_store::{RegistrationStore, StoreError, StoreFuture};
use gatepass_core::token::Token;
use gatepass_core::types::{
    Education, Event, EventDetails, EventId, EventKind, Interest, Participant, Registration,
    RegistrationId,
};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::time::Duration;
use uuid::Uuid;

const EVENT_COLUMNS: &str = "id, name, event_date, event_time, description, location, \
                             image_url, kind, closed, created_at";

const REGISTRATION_COLUMNS: &str = "id, event_id, full_name, cpf, phone, email, education, \
                                    interest, course, token, checked_in, checkin_at, \
                                    registered_at";

#[derive(sqlx::FromRow)]
struct EventRow {
    id: Uuid,
    name: String,
    event_date: NaiveDate,
    event_time: String,
    description: String,
    location: String,
    image_url: Option<String>,
    kind: String,
    closed: bool,
    created_at: DateTime<Utc>,
}

impl TryFrom<EventRow> for Event {
    type Error = StoreError;

    fn try_from(row: EventRow) -> Result<Self, Self::Error> {
        let kind = EventKind::parse(&row.kind)
            .ok_or_else(|| StoreError::DatabaseError(format!("Invalid event kind: {}", row.kind)))?;
        Ok(Self {
            id: EventId::from_uuid(row.id),
            details: EventDetails {
                name: row.name,
                date: row.event_date,
                time: row.event_time,
                description: row.description,
                location: row.location,
                image_url: row.image_url,
                kind,
            },
            closed: row.closed,
            created_at: row.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct RegistrationRow {
    id: Uuid,
    event_id: Uuid,
    full_name: String,
    cpf: String,
    phone: String,
    email: String,
    education: String,
    interest: Option<String>,
    course: Option<String>,
    token: String,
    checked_in: bool,
    checkin_at: Option<DateTime<Utc>>,
    registered_at: DateTime<Utc>,
}

impl TryFrom<RegistrationRow> for Registration {
    type Error = StoreError;

    fn try_from(row: RegistrationRow) -> Result<Self, Self::Error> {
        let education = Education::parse(&row.education).ok_or_else(|| {
            StoreError::DatabaseError(format!("Invalid education: {}", row.education))
        })?;
        let interest = row
            .interest
            .as_deref()
            .map(|s| {
                Interest::parse(s)
                    .ok_or_else(|| StoreError::DatabaseError(format!("Invalid interest: {s}")))
            })
            .transpose()?;
        let token = Token::parse(&row.token)
            .map_err(|e| StoreError::DatabaseError(format!("Stored token unreadable: {e}")))?;

        Ok(Self {
            id: RegistrationId::from_uuid(row.id),
            event_id: EventId::from_uuid(row.event_id),
            participant: Participant {
                full_name: row.full_name,
                cpf: row.cpf,
                phone: row.phone,
                email: row.email,
                education,
                interest,
                course: row.course,
            },
            token,
            checked_in: row.checked_in,
            checkin_at: row.checkin_at,
            registered_at: row.registered_at,
        })
    }
}

fn db_error(e: &sqlx::Error) -> StoreError {
    StoreError::DatabaseError(e.to_string())
}

/// Map constraint violations on `registrations` to domain errors.
fn insert_registration_error(e: &sqlx::Error, registration: &Registration) -> StoreError {
    if let sqlx::Error::Database(db) = e {
        if db.is_foreign_key_violation() {
            return StoreError::EventNotFound(registration.event_id);
        }
        match db.constraint() {
            Some("registrations_token_key") => return StoreError::DuplicateToken,
            Some("registrations_event_cpf_key") => {
                return StoreError::DuplicateParticipant {
                    event_id: registration.event_id,
                    cpf: registration.participant.cpf.clone(),
                };
            },
            _ => {},
        }
    }
    db_error(e)
}

/// `PostgreSQL`-backed [`RegistrationStore`]
///
/// Cloning is cheap; clones share the connection pool.
#[derive(Clone, Debug)]
pub struct PostgresRegistrationStore {
    pool: PgPool,
}

impl PostgresRegistrationStore {
    /// Connect with a pool of at most `max_connections`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::DatabaseError`] if the database is unreachable.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(5))
            .connect(database_url)
            .await
            .map_err(|e| db_error(&e))?;

        tracing::info!(max_connections, "Connected to PostgreSQL");
        Ok(Self { pool })
    }

    /// Wrap an existing pool.
    #[must_use]
    pub const fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The underlying pool
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Apply the embedded schema migrations.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::DatabaseError`] if a migration fails.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| StoreError::DatabaseError(format!("Migration failed: {e}")))?;
        tracing::info!("Database migrations applied");
        Ok(())
    }
}

impl RegistrationStore for PostgresRegistrationStore {
    fn insert_event(&self, event: Event) -> StoreFuture<'_, Event> {
        Box::pin(async move {
            let row: EventRow = sqlx::query_as(&format!(
                "INSERT INTO events ({EVENT_COLUMNS}) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
                 RETURNING {EVENT_COLUMNS}"
            ))
            .bind(event.id.as_uuid())
            .bind(&event.details.name)
            .bind(event.details.date)
            .bind(&event.details.time)
            .bind(&event.details.description)
            .bind(&event.details.location)
            .bind(&event.details.image_url)
            .bind(event.details.kind.as_str())
            .bind(event.closed)
            .bind(event.created_at)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| db_error(&e))?;

            tracing::debug!(event_id = %event.id, "Event inserted");
            row.try_into()
        })
    }

    fn update_event(&self, id: EventId, details: EventDetails) -> StoreFuture<'_, Event> {
        Box::pin(async move {
            // `closed` is owned by close_event
            let row: Option<EventRow> = sqlx::query_as(&format!(
                "UPDATE events SET name = $2, event_date = $3, event_time = $4, \
                 description = $5, location = $6, image_url = $7, kind = $8 \
                 WHERE id = $1 \
                 RETURNING {EVENT_COLUMNS}"
            ))
            .bind(id.as_uuid())
            .bind(&details.name)
            .bind(details.date)
            .bind(&details.time)
            .bind(&details.description)
            .bind(&details.location)
            .bind(&details.image_url)
            .bind(details.kind.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error(&e))?;

            row.ok_or(StoreError::EventNotFound(id))?.try_into()
        })
    }

    fn get_event(&self, id: EventId) -> StoreFuture<'_, Option<Event>> {
        Box::pin(async move {
            let row: Option<EventRow> =
                sqlx::query_as(&format!("SELECT {EVENT_COLUMNS} FROM events WHERE id = $1"))
                    .bind(id.as_uuid())
                    .fetch_optional(&self.pool)
                    .await
                    .map_err(|e| db_error(&e))?;

            row.map(Event::try_from).transpose()
        })
    }

    fn list_events(&self) -> StoreFuture<'_, Vec<Event>> {
        Box::pin(async move {
            let rows: Vec<EventRow> = sqlx::query_as(&format!(
                "SELECT {EVENT_COLUMNS} FROM events ORDER BY event_date DESC, created_at DESC"
            ))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| db_error(&e))?;

            rows.into_iter().map(Event::try_from).collect()
        })
    }

    fn close_event(&self, id: EventId) -> StoreFuture<'_, Event> {
        Box::pin(async move {
            let row: Option<EventRow> = sqlx::query_as(&format!(
                "UPDATE events SET closed = TRUE WHERE id = $1 RETURNING {EVENT_COLUMNS}"
            ))
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error(&e))?;

            tracing::info!(event_id = %id, "Event closed");
            row.ok_or(StoreError::EventNotFound(id))?.try_into()
        })
    }

    fn delete_event(&self, id: EventId) -> StoreFuture<'_, ()> {
        Box::pin(async move {
            let result = sqlx::query("DELETE FROM events WHERE id = $1")
                .bind(id.as_uuid())
                .execute(&self.pool)
                .await
                .map_err(|e| db_error(&e))?;

            if result.rows_affected() == 0 {
                return Err(StoreError::EventNotFound(id));
            }
            tracing::info!(event_id = %id, "Event deleted");
            Ok(())
        })
    }

    fn insert_registration(&self, registration: Registration) -> StoreFuture<'_, Registration> {
        Box::pin(async move {
            let participant = &registration.participant;
            let row: RegistrationRow = sqlx::query_as(&format!(
                "INSERT INTO registrations ({REGISTRATION_COLUMNS}) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13) \
                 RETURNING {REGISTRATION_COLUMNS}"
            ))
            .bind(registration.id.as_uuid())
            .bind(registration.event_id.as_uuid())
            .bind(&participant.full_name)
            .bind(&participant.cpf)
            .bind(&participant.phone)
            .bind(&participant.email)
            .bind(participant.education.as_str())
            .bind(participant.interest.map(|i| i.as_str()))
            .bind(&participant.course)
            .bind(registration.token.as_str())
            .bind(registration.checked_in)
            .bind(registration.checkin_at)
            .bind(registration.registered_at)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| insert_registration_error(&e, &registration))?;

            row.try_into()
        })
    }

    fn get_registration(&self, id: RegistrationId) -> StoreFuture<'_, Option<Registration>> {
        Box::pin(async move {
            let row: Option<RegistrationRow> = sqlx::query_as(&format!(
                "SELECT {REGISTRATION_COLUMNS} FROM registrations WHERE id = $1"
            ))
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error(&e))?;

            row.map(Registration::try_from).transpose()
        })
    }

    fn list_registrations(&self, event_id: EventId) -> StoreFuture<'_, Vec<Registration>> {
        Box::pin(async move {
            let rows: Vec<RegistrationRow> = sqlx::query_as(&format!(
                "SELECT {REGISTRATION_COLUMNS} FROM registrations \
                 WHERE event_id = $1 ORDER BY registered_at, id"
            ))
            .bind(event_id.as_uuid())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| db_error(&e))?;

            rows.into_iter().map(Registration::try_from).collect()
        })
    }

    fn find_by_token(&self, token: Token) -> StoreFuture<'_, Option<Registration>> {
        Box::pin(async move {
            let row: Option<RegistrationRow> = sqlx::query_as(&format!(
                "SELECT {REGISTRATION_COLUMNS} FROM registrations WHERE token = $1"
            ))
            .bind(token.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error(&e))?;

            row.map(Registration::try_from).transpose()
        })
    }

    fn mark_checked_in(
        &self,
        token: Token,
        at: DateTime<Utc>,
    ) -> StoreFuture<'_, Option<Registration>> {
        Box::pin(async move {
            let row: Option<RegistrationRow> = sqlx::query_as(&format!(
                "UPDATE registrations SET checked_in = TRUE, checkin_at = $2 \
                 WHERE token = $1 AND checked_in = FALSE \
                 RETURNING {REGISTRATION_COLUMNS}"
            ))
            .bind(token.as_str())
            .bind(at)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error(&e))?;

            let result = if row.is_some() { "updated" } else { "unchanged" };
            metrics::counter!("registration_store.checkin_updates", "result" => result)
                .increment(1);

            row.map(Registration::try_from).transpose()
        })
    }

    fn ping(&self) -> StoreFuture<'_, ()> {
        Box::pin(async move {
            sqlx::query("SELECT 1")
                .execute(&self.pool)
                .await
                .map_err(|e| db_error(&e))?;
            Ok(())
        })
    }
}
