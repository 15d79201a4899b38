//! Check-in gateways: in-process and over HTTP.

use crate::scanner::environment::{BoxFuture, CheckinGateway};
use gatepass_core::checkin::{CheckinOutcome, CheckinResponse, CheckinValidator};
use gatepass_core::token::Token;
use serde::Serialize;
use thiserror::Error;

/// Validates against a validator in the same process.
#[derive(Clone, Debug)]
pub struct LocalCheckinGateway {
    validator: CheckinValidator,
}

impl LocalCheckinGateway {
    /// Wrap a validator
    #[must_use]
    pub const fn new(validator: CheckinValidator) -> Self {
        Self { validator }
    }
}

impl CheckinGateway for LocalCheckinGateway {
    fn validate(&self, token: Token) -> BoxFuture<'_, CheckinOutcome> {
        Box::pin(async move { self.validator.validate(&token).await })
    }
}

/// Failure talking to a remote Gatepass server
#[derive(Error, Debug)]
pub enum GatewayError {
    /// The request could not be sent or the body not read
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with a status that carries no check-in result
    #[error("Unexpected status {0}")]
    UnexpectedStatus(u16),
}

#[derive(Serialize)]
struct CheckinRequest<'a> {
    token: &'a str,
}

/// Validates by calling `POST /api/checkin` on a Gatepass server.
#[derive(Clone, Debug)]
pub struct HttpCheckinGateway {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpCheckinGateway {
    /// Gateway for the server at `base_url`
    #[must_use]
    pub fn new(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            endpoint: format!("{}/api/checkin", base_url.trim_end_matches('/')),
        }
    }

    /// Endpoint being called
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn request(&self, token: &Token) -> Result<CheckinResponse, GatewayError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&CheckinRequest {
                token: token.as_str(),
            })
            .send()
            .await?;

        let status = response.status();
        // Every check-in outcome, including failures, comes with a body.
        if !(status.is_success() || status.is_client_error() || status.as_u16() == 503) {
            return Err(GatewayError::UnexpectedStatus(status.as_u16()));
        }
        Ok(response.json::<CheckinResponse>().await?)
    }
}

impl CheckinGateway for HttpCheckinGateway {
    fn validate(&self, token: Token) -> BoxFuture<'_, CheckinOutcome> {
        Box::pin(async move {
            match self.request(&token).await {
                Ok(response) => response.into_outcome(),
                Err(e) => {
                    tracing::error!(error = %e, endpoint = %self.endpoint, "Check-in request failed");
                    CheckinOutcome::SystemError {
                        detail: e.to_string(),
                    }
                },
            }
        })
    }
}
