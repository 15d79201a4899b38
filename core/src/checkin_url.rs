//! Check-in and registration URLs.
//!
//! The attendee's QR code carries `<base>#/checkin?token=<token>`. Scanners
//! must also accept a bare token, since older receipts encoded only that.

use crate::token::Token;
use crate::types::EventId;

/// Client-side route of the check-in page
pub const CHECKIN_ROUTE: &str = "#/checkin";

/// Client-side route prefix of the public registration page
pub const REGISTRATION_ROUTE: &str = "#/evento/";

const TOKEN_PARAM: &str = "token=";

/// Build the URL encoded into an attendee's check-in QR code.
///
/// ```
/// use gatepass_core::checkin_url::checkin_url;
/// use gatepass_core::token::Token;
///
/// let token = Token::parse("ABC123").unwrap();
/// assert_eq!(
///     checkin_url("https://x/", &token),
///     "https://x/#/checkin?token=ABC123"
/// );
/// ```
#[must_use]
pub fn checkin_url(base: &str, token: &Token) -> String {
    format!("{}{CHECKIN_ROUTE}?{TOKEN_PARAM}{token}", trim_base(base))
}

/// Build the URL of an event's public registration page.
#[must_use]
pub fn registration_url(base: &str, event_id: EventId) -> String {
    format!("{}{REGISTRATION_ROUTE}{event_id}", trim_base(base))
}

fn trim_base(base: &str) -> &str {
    base.trim().trim_end_matches('#')
}

/// Extract the check-in token from a decoded QR payload.
///
/// Accepts either a URL carrying a `token=` parameter (anything after the
/// token starting with `&` or `#` is ignored) or a bare token. Returns `None`
/// when the payload carries nothing that could be a token.
#[must_use]
pub fn extract_token(payload: &str) -> Option<Token> {
    let payload = payload.trim();

    match find_token_param(payload) {
        Some(start) => {
            let rest = &payload[start..];
            let end = rest
                .find(|c: char| c == '&' || c == '#' || c.is_whitespace())
                .unwrap_or(rest.len());
            Token::parse(&rest[..end]).ok()
        },
        None => Token::parse(payload).ok(),
    }
}

/// Byte offset just past a `token=` that begins a query parameter
fn find_token_param(payload: &str) -> Option<usize> {
    payload.match_indices(TOKEN_PARAM).find_map(|(idx, _)| {
        let at_param_start = idx == 0
            || matches!(payload.as_bytes().get(idx - 1), Some(b'?' | b'&' | b'#'));
        at_param_start.then_some(idx + TOKEN_PARAM.len())
    })
}
