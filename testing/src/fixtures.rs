//! Ready-made domain values for tests.

use chrono::NaiveDate;
use gatepass_core::types::{Education, EventDetails, EventKind, Interest, Participant};

/// A participant with valid sign-up data
#[must_use]
pub fn participant(full_name: &str, cpf: &str) -> Participant {
    Participant {
        full_name: full_name.to_string(),
        cpf: cpf.to_string(),
        phone: "(11) 98888-7777".to_string(),
        email: "participant@example.com".to_string(),
        education: Education::HigherComplete,
        interest: Some(Interest::Postgraduate),
        course: None,
    }
}

/// Maria Silva, the attendee of the end-to-end scenario
#[must_use]
pub fn maria_silva() -> Participant {
    Participant {
        email: "maria.silva@example.com".to_string(),
        ..participant("Maria Silva", "529.982.247-25")
    }
}

/// Details of an open public event
#[must_use]
pub fn event_details(name: &str) -> EventDetails {
    EventDetails {
        name: name.to_string(),
        date: NaiveDate::from_ymd_opt(2025, 3, 14).unwrap_or_default(),
        time: "19:00 - 21:00".to_string(),
        description: "Open lecture".to_string(),
        location: "Main auditorium".to_string(),
        image_url: None,
        kind: EventKind::External,
    }
}
