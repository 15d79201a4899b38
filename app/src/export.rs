//! Attendance list export.
//!
//! Produces a CSV that spreadsheet tools open with the right encoding: UTF-8
//! with a byte order mark, every cell quoted.

use chrono::{DateTime, Utc};
use gatepass_core::types::{Event, Registration};

const BOM: &[u8] = b"\xEF\xBB\xBF";

const HEADERS: [&str; 10] = [
    "Full Name",
    "CPF",
    "Phone",
    "E-mail",
    "Education",
    "Interest",
    "Course",
    "Registered At",
    "Present",
    "Check-in At",
];

const MISSING: &str = "N/A";

fn timestamp(at: DateTime<Utc>) -> String {
    at.format("%d/%m/%Y %H:%M:%S").to_string()
}

/// Render registrations as a CSV attendance list.
///
/// # Errors
///
/// Returns [`csv::Error`] if a record cannot be written.
pub fn attendance_csv(registrations: &[Registration]) -> Result<Vec<u8>, csv::Error> {
    let mut writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Always)
        .from_writer(BOM.to_vec());

    writer.write_record(HEADERS)?;
    for registration in registrations {
        let participant = &registration.participant;
        let registered_at = timestamp(registration.registered_at);
        let checkin_at = registration
            .checkin_at
            .map_or_else(|| MISSING.to_string(), timestamp);
        writer.write_record([
            participant.full_name.as_str(),
            participant.cpf.as_str(),
            participant.phone.as_str(),
            participant.email.as_str(),
            participant.education.label(),
            participant.interest.map_or(MISSING, |i| i.label()),
            participant.course.as_deref().unwrap_or(MISSING),
            registered_at.as_str(),
            if registration.checked_in { "YES" } else { "NO" },
            checkin_at.as_str(),
        ])?;
    }

    writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))
}

/// Download file name for an event's attendance list
#[must_use]
pub fn attendance_filename(event: &Event) -> String {
    let slug: String = event
        .details
        .name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
        .collect();
    format!("attendance_{slug}.csv")
}
