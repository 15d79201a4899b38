//! The check-in validator.
//!
//! [`CheckinValidator::validate`] is the single code path that may mark a
//! registration as attended. It never returns an error for expected
//! conditions: unknown tokens, repeated scans and storage failures are all
//! reported as a [`CheckinOutcome`].

use crate::environment::Clock;
use crate::registration_store::RegistrationStore;
use crate::token::Token;
use crate::types::{EventId, Registration, RegistrationId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Identity shown to door staff after a scan
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attendee {
    /// Registration identifier
    pub registration_id: RegistrationId,
    /// Event the registration belongs to
    pub event_id: EventId,
    /// Full name
    #[serde(rename = "nomeCompleto")]
    pub full_name: String,
    /// CPF
    pub cpf: String,
    /// Whether the registration is checked in
    pub checked_in: bool,
    /// When the check-in happened
    pub checkin_at: Option<DateTime<Utc>>,
}

impl From<&Registration> for Attendee {
    fn from(registration: &Registration) -> Self {
        Self {
            registration_id: registration.id,
            event_id: registration.event_id,
            full_name: registration.participant.full_name.clone(),
            cpf: registration.participant.cpf.clone(),
            checked_in: registration.checked_in,
            checkin_at: registration.checkin_at,
        }
    }
}

/// Result of a check-in attempt
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CheckinOutcome {
    /// The registration was pending and is now checked in.
    Success {
        /// The admitted attendee
        attendee: Attendee,
    },
    /// The registration was already checked in; nothing changed.
    AlreadyUsed {
        /// The attendee as stored, with the original check-in time
        attendee: Attendee,
    },
    /// No registration holds this token.
    InvalidToken,
    /// Storage failed; nothing changed.
    SystemError {
        /// Operator-facing description
        detail: String,
    },
}

/// Discriminant of [`CheckinOutcome`], as sent on the wire
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OutcomeKind {
    /// See [`CheckinOutcome::Success`]
    Success,
    /// See [`CheckinOutcome::AlreadyUsed`]
    AlreadyUsed,
    /// See [`CheckinOutcome::InvalidToken`]
    InvalidToken,
    /// See [`CheckinOutcome::SystemError`]
    SystemError,
}

impl OutcomeKind {
    /// Stable label for logs and metrics
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::AlreadyUsed => "already_used",
            Self::InvalidToken => "invalid_token",
            Self::SystemError => "system_error",
        }
    }

    /// Message shown to door staff
    #[must_use]
    pub const fn message(&self) -> &'static str {
        match self {
            Self::Success => "Entry confirmed.",
            Self::AlreadyUsed => "This QR code has already been used for check-in.",
            Self::InvalidToken => "Invalid QR code or registration not found.",
            Self::SystemError => "Could not process check-in. Please try again.",
        }
    }
}

impl CheckinOutcome {
    /// The outcome's discriminant
    #[must_use]
    pub const fn kind(&self) -> OutcomeKind {
        match self {
            Self::Success { .. } => OutcomeKind::Success,
            Self::AlreadyUsed { .. } => OutcomeKind::AlreadyUsed,
            Self::InvalidToken => OutcomeKind::InvalidToken,
            Self::SystemError { .. } => OutcomeKind::SystemError,
        }
    }

    /// Message shown to door staff
    #[must_use]
    pub const fn message(&self) -> &'static str {
        self.kind().message()
    }

    /// The attendee, when the token matched a registration
    #[must_use]
    pub const fn attendee(&self) -> Option<&Attendee> {
        match self {
            Self::Success { attendee } | Self::AlreadyUsed { attendee } => Some(attendee),
            Self::InvalidToken | Self::SystemError { .. } => None,
        }
    }

    /// Whether this attempt admitted the attendee
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

/// Wire form of a [`CheckinOutcome`]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckinResponse {
    /// Outcome discriminant
    pub outcome: OutcomeKind,
    /// Message for door staff
    pub message: String,
    /// Matched registration, for `SUCCESS` and `ALREADY_USED`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registration: Option<Attendee>,
    /// Failure description, for `SYSTEM_ERROR`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl From<&CheckinOutcome> for CheckinResponse {
    fn from(outcome: &CheckinOutcome) -> Self {
        Self {
            outcome: outcome.kind(),
            message: outcome.message().to_string(),
            registration: outcome.attendee().cloned(),
            detail: match outcome {
                CheckinOutcome::SystemError { detail } => Some(detail.clone()),
                _ => None,
            },
        }
    }
}

impl CheckinResponse {
    /// Rebuild the outcome on the client side.
    ///
    /// A response claiming a match without carrying the registration is
    /// reported as a system error.
    #[must_use]
    pub fn into_outcome(self) -> CheckinOutcome {
        match (self.outcome, self.registration) {
            (OutcomeKind::Success, Some(attendee)) => CheckinOutcome::Success { attendee },
            (OutcomeKind::AlreadyUsed, Some(attendee)) => {
                CheckinOutcome::AlreadyUsed { attendee }
            },
            (OutcomeKind::InvalidToken, _) => CheckinOutcome::InvalidToken,
            (OutcomeKind::SystemError, _) => CheckinOutcome::SystemError {
                detail: self.detail.unwrap_or(self.message),
            },
            (kind @ (OutcomeKind::Success | OutcomeKind::AlreadyUsed), None) => {
                CheckinOutcome::SystemError {
                    detail: format!("{} response without registration", kind.as_str()),
                }
            },
        }
    }
}

/// Performs the at-most-once check-in transition
#[derive(Clone)]
pub struct CheckinValidator {
    store: Arc<dyn RegistrationStore>,
    clock: Arc<dyn Clock>,
}

impl CheckinValidator {
    /// Create a validator over the given store and clock
    #[must_use]
    pub fn new(store: Arc<dyn RegistrationStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Validate a token and, if it is pending, check it in.
    ///
    /// 1. Unknown token: `InvalidToken`, no mutation.
    /// 2. Already checked in: `AlreadyUsed` with the stored record.
    /// 3. Pending: conditional update. Winning it gives `Success`; losing a
    ///    race to a concurrent caller gives `AlreadyUsed`.
    /// 4. Any storage failure: `SystemError`.
    #[tracing::instrument(skip(self, token), fields(token = %token.redacted()))]
    pub async fn validate(&self, token: &Token) -> CheckinOutcome {
        let outcome = match self.try_validate(token).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!(error = %e, "Check-in failed on storage error");
                CheckinOutcome::SystemError {
                    detail: "registration store unavailable".to_string(),
                }
            },
        };

        tracing::info!(
            outcome = outcome.kind().as_str(),
            registration_id = outcome.attendee().map(|a| a.registration_id.to_string()),
            "Check-in processed"
        );
        outcome
    }

    /// Validate untrusted input; anything that is not a plausible token is
    /// reported as `InvalidToken` without touching the store.
    pub async fn validate_raw(&self, raw: &str) -> CheckinOutcome {
        match Token::parse(raw.trim()) {
            Ok(token) => self.validate(&token).await,
            Err(_) => CheckinOutcome::InvalidToken,
        }
    }

    async fn try_validate(
        &self,
        token: &Token,
    ) -> Result<CheckinOutcome, crate::registration_store::StoreError> {
        let Some(registration) = self.store.find_by_token(token.clone()).await? else {
            return Ok(CheckinOutcome::InvalidToken);
        };

        if registration.checked_in {
            return Ok(CheckinOutcome::AlreadyUsed {
                attendee: Attendee::from(&registration),
            });
        }

        let now = self.clock.now();
        if let Some(updated) = self.store.mark_checked_in(token.clone(), now).await? {
            return Ok(CheckinOutcome::Success {
                attendee: Attendee::from(&updated),
            });
        }

        // Lost the race: someone else checked this token in between our read
        // and the conditional update.
        tracing::debug!("Conditional check-in update affected no rows");
        match self.store.find_by_token(token.clone()).await? {
            Some(current) => Ok(CheckinOutcome::AlreadyUsed {
                attendee: Attendee::from(&current),
            }),
            None => Ok(CheckinOutcome::InvalidToken),
        }
    }
}

impl std::fmt::Debug for CheckinValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CheckinValidator").finish_non_exhaustive()
    }
}
