//! Check-in tokens.
//!
//! A token is the sole credential presented at the door. It is issued once per
//! registration from the operating system's CSPRNG and never changes.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::RngCore;
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Random bytes per token (256 bits)
pub const TOKEN_BYTES: usize = 32;

/// Longest token accepted when parsing untrusted input
pub const MAX_TOKEN_LEN: usize = 128;

/// Errors from issuing or parsing tokens.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// The operating system random source failed; no weaker fallback is used.
    #[error("secure random source unavailable: {0}")]
    EntropyUnavailable(String),

    /// Input is empty, too long, or contains characters outside `[A-Za-z0-9_-]`.
    #[error("malformed token")]
    Malformed,
}

/// An opaque, URL-safe check-in credential
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Token(String);

impl Token {
    /// Parse a token from untrusted input.
    ///
    /// Accepts any non-empty string of URL-safe base64 alphabet characters
    /// (which also covers legacy UUID-formatted tokens).
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::Malformed`] if the input is not a plausible token.
    pub fn parse(raw: &str) -> Result<Self, TokenError> {
        let valid = !raw.is_empty()
            && raw.len() <= MAX_TOKEN_LEN
            && raw
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_');

        if valid {
            Ok(Self(raw.to_string()))
        } else {
            Err(TokenError::Malformed)
        }
    }

    /// The token text
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// A short prefix safe to put in logs
    #[must_use]
    pub fn redacted(&self) -> String {
        let prefix: String = self.0.chars().take(6).collect();
        format!("{prefix}…")
    }
}

impl TryFrom<String> for Token {
    type Error = TokenError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Token> for String {
    fn from(token: Token) -> Self {
        token.0
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// Debug output ends up in logs; keep the credential out of it.
impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Token").field(&self.redacted()).finish()
    }
}

/// Source of fresh check-in tokens
///
/// Implementations must be safe to share across request handlers.
pub trait TokenGenerator: Send + Sync {
    /// Issue a new token.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::EntropyUnavailable`] if no secure randomness is available.
    fn issue_token(&self) -> Result<Token, TokenError>;
}

/// Token generator backed by the operating system CSPRNG
#[derive(Debug, Clone, Copy, Default)]
pub struct OsTokenGenerator;

impl TokenGenerator for OsTokenGenerator {
    fn issue_token(&self) -> Result<Token, TokenError> {
        let mut bytes = [0u8; TOKEN_BYTES];
        OsRng
            .try_fill_bytes(&mut bytes)
            .map_err(|e| TokenError::EntropyUnavailable(e.to_string()))?;
        Ok(Token(URL_SAFE_NO_PAD.encode(bytes)))
    }
}
