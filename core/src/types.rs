//! Domain types for event registration and check-in.

use crate::token::Token;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// ============================================================================
// Identifiers
// ============================================================================

/// Unique identifier for an event
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(Uuid);

impl EventId {
    /// Creates a new random `EventId`
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create an `EventId` from a `Uuid`
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the inner UUID
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a registration
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegistrationId(Uuid);

impl RegistrationId {
    /// Creates a new random `RegistrationId`
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a `RegistrationId` from a `Uuid`
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the inner UUID
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for RegistrationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RegistrationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Events
// ============================================================================

/// Who the event is aimed at
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// Open to the public
    #[default]
    External,
    /// Restricted to the institution's own students and staff
    Internal,
}

impl EventKind {
    /// Database / wire representation
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::External => "external",
            Self::Internal => "internal",
        }
    }

    /// Parse from the database representation
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "external" => Some(Self::External),
            "internal" => Some(Self::Internal),
            _ => None,
        }
    }
}

/// Editable fields of an event
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventDetails {
    /// Display name
    pub name: String,
    /// Calendar date
    pub date: NaiveDate,
    /// Free-form time range, e.g. "19:00 - 21:00"
    pub time: String,
    /// Description shown on the public page
    #[serde(default)]
    pub description: String,
    /// Venue
    pub location: String,
    /// Banner image URL (object storage is external)
    #[serde(default)]
    pub image_url: Option<String>,
    /// Audience
    #[serde(default)]
    pub kind: EventKind,
}

/// An event attendees register for
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Identifier
    pub id: EventId,
    /// Editable fields
    #[serde(flatten)]
    pub details: EventDetails,
    /// Closed events accept no new registrations
    pub closed: bool,
    /// When the event was created
    pub created_at: DateTime<Utc>,
}

impl Event {
    /// Create a new, open event
    #[must_use]
    pub fn new(details: EventDetails, now: DateTime<Utc>) -> Self {
        Self {
            id: EventId::new(),
            details,
            closed: false,
            created_at: now,
        }
    }

    /// Whether new registrations are accepted
    #[must_use]
    pub const fn is_open(&self) -> bool {
        !self.closed
    }
}

// ============================================================================
// Participants and registrations
// ============================================================================

/// Highest schooling level declared at sign-up
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Education {
    /// Primary school
    Primary,
    /// High school, in progress
    HighSchoolOngoing,
    /// High school, completed
    HighSchoolComplete,
    /// Undergraduate, in progress
    HigherOngoing,
    /// Undergraduate, completed
    HigherComplete,
    /// Postgraduate
    Postgraduate,
}

impl Education {
    /// Database / wire representation
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::HighSchoolOngoing => "high_school_ongoing",
            Self::HighSchoolComplete => "high_school_complete",
            Self::HigherOngoing => "higher_ongoing",
            Self::HigherComplete => "higher_complete",
            Self::Postgraduate => "postgraduate",
        }
    }

    /// Parse from the database representation
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        [
            Self::Primary,
            Self::HighSchoolOngoing,
            Self::HighSchoolComplete,
            Self::HigherOngoing,
            Self::HigherComplete,
            Self::Postgraduate,
        ]
        .into_iter()
        .find(|e| e.as_str() == s)
    }

    /// Human-readable label used in exports
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Primary => "Primary school",
            Self::HighSchoolOngoing => "High school (ongoing)",
            Self::HighSchoolComplete => "High school (complete)",
            Self::HigherOngoing => "Undergraduate (ongoing)",
            Self::HigherComplete => "Undergraduate (complete)",
            Self::Postgraduate => "Postgraduate",
        }
    }

    /// Whether the sign-up form asks about study interest for this level
    #[must_use]
    pub const fn asks_interest(&self) -> bool {
        matches!(
            self,
            Self::HighSchoolOngoing | Self::HighSchoolComplete | Self::HigherComplete
        )
    }
}

/// Further study the participant is interested in
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Interest {
    /// First undergraduate degree
    NewDegree,
    /// Second undergraduate degree
    SecondDegree,
    /// Postgraduate programme
    Postgraduate,
    /// Not interested
    None,
}

impl Interest {
    /// Database / wire representation
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::NewDegree => "new_degree",
            Self::SecondDegree => "second_degree",
            Self::Postgraduate => "postgraduate",
            Self::None => "none",
        }
    }

    /// Parse from the database representation
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        [Self::NewDegree, Self::SecondDegree, Self::Postgraduate, Self::None]
            .into_iter()
            .find(|i| i.as_str() == s)
    }

    /// Human-readable label used in exports
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::NewDegree => "New degree",
            Self::SecondDegree => "Second degree",
            Self::Postgraduate => "Postgraduate",
            Self::None => "Not interested",
        }
    }

    /// Whether a course of interest must be named
    #[must_use]
    pub const fn needs_course(&self) -> bool {
        matches!(self, Self::NewDegree | Self::SecondDegree)
    }
}

/// Identity captured on the public sign-up form
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    /// Full name
    #[serde(rename = "nomeCompleto")]
    pub full_name: String,
    /// Brazilian taxpayer number, formatted `000.000.000-00`
    pub cpf: String,
    /// Phone number, formatted `(00) 00000-0000`
    pub phone: String,
    /// Contact e-mail
    pub email: String,
    /// Schooling level
    pub education: Education,
    /// Further study interest, when asked
    #[serde(default)]
    pub interest: Option<Interest>,
    /// Course of interest, when applicable
    #[serde(default)]
    pub course: Option<String>,
}

/// A participant's registration for one event
///
/// `checked_in` and `checkin_at` are only ever changed by
/// [`CheckinValidator`](crate::checkin::CheckinValidator).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    /// Identifier
    pub id: RegistrationId,
    /// Parent event
    pub event_id: EventId,
    /// Sign-up data
    #[serde(flatten)]
    pub participant: Participant,
    /// Check-in credential
    pub token: Token,
    /// Whether the attendee has been admitted
    pub checked_in: bool,
    /// When the attendee was admitted
    pub checkin_at: Option<DateTime<Utc>>,
    /// When the registration was created
    pub registered_at: DateTime<Utc>,
}

impl Registration {
    /// Create a pending registration
    #[must_use]
    pub fn new(
        event_id: EventId,
        participant: Participant,
        token: Token,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: RegistrationId::new(),
            event_id,
            participant,
            token,
            checked_in: false,
            checkin_at: None,
            registered_at: now,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn education_round_trips_through_db_representation() {
        for education in [
            Education::Primary,
            Education::HighSchoolOngoing,
            Education::HighSchoolComplete,
            Education::HigherOngoing,
            Education::HigherComplete,
            Education::Postgraduate,
        ] {
            assert_eq!(Education::parse(education.as_str()), Some(education));
        }
        assert_eq!(Education::parse("phd"), None);
    }

    #[test]
    fn participant_full_name_uses_legacy_wire_name() {
        let participant = Participant {
            full_name: "Maria Silva".to_string(),
            cpf: "123.456.789-09".to_string(),
            phone: "(11) 98888-7777".to_string(),
            email: "maria@example.com".to_string(),
            education: Education::HigherComplete,
            interest: Some(Interest::Postgraduate),
            course: None,
        };

        let json = serde_json::to_value(&participant).unwrap();
        assert_eq!(json["nomeCompleto"], "Maria Silva");
        assert_eq!(json["interest"], "postgraduate");
    }

    #[test]
    fn interest_course_requirement() {
        assert!(Interest::NewDegree.needs_course());
        assert!(Interest::SecondDegree.needs_course());
        assert!(!Interest::Postgraduate.needs_course());
        assert!(!Interest::None.needs_course());
    }
}
