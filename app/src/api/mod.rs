//! HTTP API handlers, organized by domain:
//! - Events: listing and admin management
//! - Registrations: public sign-up, attendee list, manual confirmation
//! - Check-in: token validation for door scanners
//! - Attendance: per-event summary and dashboard totals
//! - Export: CSV attendance lists
//! - QR: ticket and poster images

pub mod attendance;
pub mod checkin;
pub mod events;
pub mod export;
pub mod qr;
pub mod registrations;

pub use attendance::{dashboard_stats, event_summary};
pub use checkin::checkin;
pub use events::{close_event, create_event, delete_event, get_event, list_events, update_event};
pub use export::export_registrations;
pub use qr::{event_poster, ticket_qr};
pub use registrations::{confirm_registration, list_registrations, register};
