//! QR encoding of check-in and registration URLs.
//!
//! Encoding is deterministic for a given input: error-correction level M,
//! automatic version selection. Oversized input is rejected, never truncated.

use qrcode::render::{svg, unicode};
use qrcode::types::QrError;
use qrcode::{EcLevel, QrCode};
use std::fmt;
use thiserror::Error;

/// Smallest rendered side of an SVG symbol, in pixels
pub const SVG_MIN_DIMENSION: u32 = 256;

/// Errors from QR encoding.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QrEncodeError {
    /// Input does not fit in the largest symbol at level M.
    #[error("payload of {len} bytes exceeds QR capacity")]
    CapacityExceeded {
        /// Payload length in bytes
        len: usize,
    },

    /// Any other encoder failure.
    #[error("QR encoding failed: {0}")]
    Encoding(String),
}

/// An encoded QR symbol, ready to render
pub struct QrImage {
    code: QrCode,
}

impl QrImage {
    /// Modules per side
    #[must_use]
    pub fn width(&self) -> usize {
        self.code.width()
    }

    /// Render as a standalone SVG document.
    #[must_use]
    pub fn to_svg(&self) -> String {
        self.code
            .render::<svg::Color<'_>>()
            .min_dimensions(SVG_MIN_DIMENSION, SVG_MIN_DIMENSION)
            .dark_color(svg::Color("#000000"))
            .light_color(svg::Color("#ffffff"))
            .build()
    }

    /// Render with half-block characters for a dark terminal.
    #[must_use]
    pub fn to_unicode(&self) -> String {
        self.code
            .render::<unicode::Dense1x2>()
            .dark_color(unicode::Dense1x2::Light)
            .light_color(unicode::Dense1x2::Dark)
            .build()
    }
}

impl fmt::Debug for QrImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QrImage").field("width", &self.width()).finish()
    }
}

/// Encode `payload` into a QR symbol.
///
/// # Errors
///
/// Returns [`QrEncodeError::CapacityExceeded`] if the payload is too long for
/// any QR version at error-correction level M.
pub fn encode(payload: &str) -> Result<QrImage, QrEncodeError> {
    QrCode::with_error_correction_level(payload.as_bytes(), EcLevel::M)
        .map(|code| QrImage { code })
        .map_err(|e| match e {
            QrError::DataTooLong => QrEncodeError::CapacityExceeded { len: payload.len() },
            other => QrEncodeError::Encoding(other.to_string()),
        })
}
