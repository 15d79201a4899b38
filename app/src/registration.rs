//! Public sign-up: form validation and ticket issuing.

use crate::metrics;
use gatepass_core::environment::Clock;
use gatepass_core::registration_store::{RegistrationStore, StoreError};
use gatepass_core::token::{TokenError, TokenGenerator};
use gatepass_core::types::{Education, EventId, Interest, Participant, Registration};
use serde::Deserialize;
use std::sync::Arc;
use thiserror::Error;

/// Course recorded for participants interested in postgraduate study
pub const POSTGRADUATE_COURSE: &str = "Postgraduate";

const ISSUE_ATTEMPTS: usize = 3;

/// Why a sign-up was refused
#[derive(Error, Debug)]
pub enum RegistrationError {
    /// A form field failed validation
    #[error("Invalid {field}: {reason}")]
    Invalid {
        /// Wire name of the offending field
        field: &'static str,
        /// What is wrong with it
        reason: &'static str,
    },

    /// The event does not exist
    #[error("Event not found: {0}")]
    EventNotFound(EventId),

    /// The event no longer accepts registrations
    #[error("Event {0} is closed for registration")]
    EventClosed(EventId),

    /// This CPF already holds a ticket for the event
    #[error("CPF already registered for event {0}")]
    AlreadyRegistered(EventId),

    /// No token could be issued
    #[error("Could not issue ticket: {0}")]
    Token(#[from] TokenError),

    /// The store failed
    #[error("Registration store error: {0}")]
    Store(StoreError),
}

impl From<StoreError> for RegistrationError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::EventNotFound(id) => Self::EventNotFound(id),
            StoreError::DuplicateParticipant { event_id, .. } => Self::AlreadyRegistered(event_id),
            other => Self::Store(other),
        }
    }
}

impl RegistrationError {
    /// Short label for metrics
    #[must_use]
    pub const fn reason(&self) -> &'static str {
        match self {
            Self::Invalid { .. } => "invalid",
            Self::EventNotFound(_) => "event_not_found",
            Self::EventClosed(_) => "event_closed",
            Self::AlreadyRegistered(_) => "already_registered",
            Self::Token(_) | Self::Store(_) => "system_error",
        }
    }
}

/// Sign-up form as submitted by the public page
#[derive(Debug, Clone, Deserialize)]
pub struct RegistrationForm {
    /// Full name
    #[serde(rename = "nomeCompleto")]
    pub full_name: String,
    /// CPF, formatted `000.000.000-00`
    pub cpf: String,
    /// Phone, formatted `(00) 00000-0000`
    pub phone: String,
    /// Contact e-mail
    pub email: String,
    /// Schooling level
    pub education: Education,
    /// Study interest, required for some schooling levels
    #[serde(default)]
    pub interest: Option<Interest>,
    /// Course of interest
    #[serde(default)]
    pub course: Option<String>,
}

fn matches_mask(value: &str, mask: &str) -> bool {
    value.len() == mask.len()
        && value.bytes().zip(mask.bytes()).all(|(v, m)| match m {
            b'0' => v.is_ascii_digit(),
            other => v == other,
        })
}

fn valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    domain
        .rsplit_once('.')
        .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
}

impl RegistrationForm {
    /// Validate the form into the participant that will be stored.
    ///
    /// Interest is kept only for schooling levels that are asked about it;
    /// postgraduate interest records [`POSTGRADUATE_COURSE`] as the course.
    ///
    /// # Errors
    ///
    /// Returns [`RegistrationError::Invalid`] naming the first bad field.
    pub fn validate(self) -> Result<Participant, RegistrationError> {
        let full_name = self.full_name.trim().to_string();
        if full_name.chars().count() < 3 {
            return Err(RegistrationError::Invalid {
                field: "nomeCompleto",
                reason: "must have at least 3 characters",
            });
        }
        if !matches_mask(&self.phone, "(00) 00000-0000") {
            return Err(RegistrationError::Invalid {
                field: "phone",
                reason: "expected (00) 00000-0000",
            });
        }
        if !matches_mask(&self.cpf, "000.000.000-00") {
            return Err(RegistrationError::Invalid {
                field: "cpf",
                reason: "expected 000.000.000-00",
            });
        }
        let email = self.email.trim().to_string();
        if !valid_email(&email) {
            return Err(RegistrationError::Invalid {
                field: "email",
                reason: "not a valid address",
            });
        }

        let (interest, course) = if self.education.asks_interest() {
            let interest = self.interest.ok_or(RegistrationError::Invalid {
                field: "interest",
                reason: "required for this schooling level",
            })?;
            let course = match interest {
                Interest::Postgraduate => Some(POSTGRADUATE_COURSE.to_string()),
                i if i.needs_course() => {
                    let course = self
                        .course
                        .map(|c| c.trim().to_string())
                        .filter(|c| !c.is_empty())
                        .ok_or(RegistrationError::Invalid {
                            field: "course",
                            reason: "required for this interest",
                        })?;
                    Some(course)
                },
                _ => None,
            };
            (Some(interest), course)
        } else {
            (None, None)
        };

        Ok(Participant {
            full_name,
            cpf: self.cpf,
            phone: self.phone,
            email,
            education: self.education,
            interest,
            course,
        })
    }
}

/// Registers participants and issues their tickets.
#[derive(Clone)]
pub struct RegistrationService {
    store: Arc<dyn RegistrationStore>,
    tokens: Arc<dyn TokenGenerator>,
    clock: Arc<dyn Clock>,
}

impl RegistrationService {
    /// Create a registration service
    #[must_use]
    pub fn new(
        store: Arc<dyn RegistrationStore>,
        tokens: Arc<dyn TokenGenerator>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            tokens,
            clock,
        }
    }

    /// Register a participant for an open event.
    ///
    /// # Errors
    ///
    /// - [`RegistrationError::Invalid`] for a bad form
    /// - [`RegistrationError::EventNotFound`] / [`RegistrationError::EventClosed`]
    /// - [`RegistrationError::AlreadyRegistered`] if the CPF holds a ticket already
    /// - [`RegistrationError::Token`] if the OS random source fails
    /// - [`RegistrationError::Store`] on storage failure
    #[tracing::instrument(skip(self, form))]
    pub async fn register(
        &self,
        event_id: EventId,
        form: RegistrationForm,
    ) -> Result<Registration, RegistrationError> {
        let result = self.try_register(event_id, form).await;
        match &result {
            Ok(registration) => {
                metrics::record_registration();
                tracing::info!(registration_id = %registration.id, "Participant registered");
            },
            Err(e) => {
                metrics::record_registration_rejected(e.reason());
                tracing::warn!(error = %e, "Registration refused");
            },
        }
        result
    }

    async fn try_register(
        &self,
        event_id: EventId,
        form: RegistrationForm,
    ) -> Result<Registration, RegistrationError> {
        let participant = form.validate()?;

        let event = self
            .store
            .get_event(event_id)
            .await?
            .ok_or(RegistrationError::EventNotFound(event_id))?;
        if !event.is_open() {
            return Err(RegistrationError::EventClosed(event_id));
        }

        let mut attempt = 1;
        loop {
            let token = self.tokens.issue_token()?;
            let registration =
                Registration::new(event_id, participant.clone(), token, self.clock.now());
            match self.store.insert_registration(registration).await {
                Err(StoreError::DuplicateToken) if attempt < ISSUE_ATTEMPTS => {
                    tracing::warn!(attempt, "Token collision, issuing another");
                    attempt += 1;
                },
                other => return Ok(other?),
            }
        }
    }
}

impl std::fmt::Debug for RegistrationService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistrationService").finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use gatepass_core::token::{OsTokenGenerator, Token};
    use gatepass_core::types::Event;
    use gatepass_testing::{InMemoryRegistrationStore, fixtures, test_clock};
    use std::sync::Mutex;

    fn form() -> RegistrationForm {
        RegistrationForm {
            full_name: "  Maria Silva ".to_string(),
            cpf: "529.982.247-25".to_string(),
            phone: "(11) 98888-7777".to_string(),
            email: "maria.silva@example.com".to_string(),
            education: Education::HighSchoolComplete,
            interest: Some(Interest::NewDegree),
            course: Some("Nursing".to_string()),
        }
    }

    fn invalid_field(form: RegistrationForm) -> &'static str {
        match form.validate() {
            Err(RegistrationError::Invalid { field, .. }) => field,
            other => panic!("expected invalid form, got {other:?}"),
        }
    }

    #[test]
    fn valid_form_is_normalised() {
        let participant = form().validate().unwrap();
        assert_eq!(participant.full_name, "Maria Silva");
        assert_eq!(participant.course.as_deref(), Some("Nursing"));
    }

    #[test]
    fn bad_fields_are_named() {
        assert_eq!(
            invalid_field(RegistrationForm {
                full_name: " Al ".to_string(),
                ..form()
            }),
            "nomeCompleto"
        );
        assert_eq!(
            invalid_field(RegistrationForm {
                phone: "11988887777".to_string(),
                ..form()
            }),
            "phone"
        );
        assert_eq!(
            invalid_field(RegistrationForm {
                cpf: "529.982.247".to_string(),
                ..form()
            }),
            "cpf"
        );
        assert_eq!(
            invalid_field(RegistrationForm {
                email: "maria@localhost".to_string(),
                ..form()
            }),
            "email"
        );
        assert_eq!(
            invalid_field(RegistrationForm {
                interest: None,
                ..form()
            }),
            "interest"
        );
        assert_eq!(
            invalid_field(RegistrationForm {
                course: Some("  ".to_string()),
                ..form()
            }),
            "course"
        );
    }

    #[test]
    fn interest_dropped_when_not_asked_and_postgraduate_sets_course() {
        let primary = RegistrationForm {
            education: Education::Primary,
            ..form()
        }
        .validate()
        .unwrap();
        assert_eq!(primary.interest, None);
        assert_eq!(primary.course, None);

        let postgraduate = RegistrationForm {
            education: Education::HigherComplete,
            interest: Some(Interest::Postgraduate),
            course: None,
            ..form()
        }
        .validate()
        .unwrap();
        assert_eq!(postgraduate.course.as_deref(), Some(POSTGRADUATE_COURSE));
    }

    #[test]
    fn email_shapes() {
        assert!(valid_email("a@b.co"));
        assert!(!valid_email("a b@c.de"));
        assert!(!valid_email("@c.de"));
        assert!(!valid_email("a@b@c.de"));
        assert!(!valid_email("a@.de"));
        assert!(!valid_email("a@b."));
    }

    async fn service_with_event(
        closed: bool,
    ) -> (RegistrationService, InMemoryRegistrationStore, EventId) {
        let store = InMemoryRegistrationStore::new();
        let mut event = Event::new(fixtures::event_details("Open day"), test_clock().now());
        event.closed = closed;
        let event = store.insert_event(event).await.unwrap();
        let service = RegistrationService::new(
            Arc::new(store.clone()),
            Arc::new(OsTokenGenerator),
            Arc::new(test_clock()),
        );
        (service, store, event.id)
    }

    #[tokio::test]
    async fn registers_with_a_fresh_pending_ticket() {
        let (service, store, event_id) = service_with_event(false).await;
        let registration = service.register(event_id, form()).await.unwrap();

        assert_eq!(registration.event_id, event_id);
        assert!(!registration.checked_in);
        assert_eq!(registration.token.as_str().len(), 43);
        assert_eq!(store.registrations(), vec![registration]);
    }

    #[tokio::test]
    async fn closed_event_and_duplicate_cpf_are_refused() {
        let (service, _, closed_id) = service_with_event(true).await;
        assert!(matches!(
            service.register(closed_id, form()).await,
            Err(RegistrationError::EventClosed(_))
        ));

        let (service, _, open_id) = service_with_event(false).await;
        service.register(open_id, form()).await.unwrap();
        assert!(matches!(
            service.register(open_id, form()).await,
            Err(RegistrationError::AlreadyRegistered(_))
        ));

        assert!(matches!(
            service.register(EventId::new(), form()).await,
            Err(RegistrationError::EventNotFound(_))
        ));
    }

    /// Hands out the same token until told otherwise.
    struct RepeatingTokens(Mutex<Vec<Token>>);

    impl TokenGenerator for RepeatingTokens {
        fn issue_token(&self) -> Result<Token, TokenError> {
            let mut queue = self.0.lock().unwrap();
            Ok(if queue.len() > 1 {
                queue.remove(0)
            } else {
                queue[0].clone()
            })
        }
    }

    #[tokio::test]
    async fn token_collision_is_retried() {
        let (_, store, event_id) = service_with_event(false).await;
        let taken = Token::parse("taken").unwrap();
        let fresh = Token::parse("fresh").unwrap();
        let tokens = RepeatingTokens(Mutex::new(vec![taken.clone(), taken, fresh.clone()]));
        let service = RegistrationService::new(
            Arc::new(store.clone()),
            Arc::new(tokens),
            Arc::new(test_clock()),
        );

        let first = service.register(event_id, form()).await.unwrap();
        assert_eq!(first.token.as_str(), "taken");

        let second = service
            .register(
                event_id,
                RegistrationForm {
                    cpf: "111.444.777-35".to_string(),
                    ..form()
                },
            )
            .await
            .unwrap();
        assert_eq!(second.token, fresh);
    }

    proptest::proptest! {
        #[test]
        fn any_masked_cpf_and_phone_pass(
            cpf in "[0-9]{3}\\.[0-9]{3}\\.[0-9]{3}-[0-9]{2}",
            phone in "\\([0-9]{2}\\) [0-9]{5}-[0-9]{4}",
        ) {
            let participant = RegistrationForm { cpf: cpf.clone(), phone, ..form() }
                .validate()
                .unwrap();
            proptest::prop_assert_eq!(participant.cpf, cpf);
        }

        #[test]
        fn unmasked_cpf_fails(cpf in "[0-9]{11}") {
            proptest::prop_assert_eq!(invalid_field(RegistrationForm { cpf, ..form() }), "cpf");
        }
    }
}
