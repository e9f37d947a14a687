//! Character encoding policy for fetched pages
//!
//! Every body handed to callers is UTF-8. Responses are decoded under a
//! charset chosen from the `Content-Type` header; anything undecodable is
//! replaced rather than reported.

use encoding_rs::Encoding;
use std::borrow::Cow;

/// Decodes bytes as UTF-8, replacing invalid sequences with U+FFFD
///
/// Already-valid UTF-8 is borrowed unchanged, so normalizing twice is the
/// same as normalizing once.
pub fn normalize_text(bytes: &[u8]) -> Cow<'_, str> {
    String::from_utf8_lossy(bytes)
}

/// Reinterprets `bytes` under the charset `label`
///
/// `us-ascii` and `iso-8859-1` are decoded strictly: bytes at or above 0x80
/// become U+FFFD under ASCII, and Latin-1 maps every byte to the code point
/// of the same value. Other labels go through `encoding_rs`. An unknown
/// label falls back to [`normalize_text`].
pub fn decode_with_label<'a>(bytes: &'a [u8], label: &str) -> Cow<'a, str> {
    match label.trim().to_ascii_lowercase().as_str() {
        "us-ascii" | "ascii" | "ansi_x3.4-1968" => {
            if bytes.is_ascii() {
                normalize_text(bytes)
            } else {
                Cow::Owned(
                    bytes
                        .iter()
                        .map(|&b| if b.is_ascii() { char::from(b) } else { '\u{FFFD}' })
                        .collect(),
                )
            }
        }
        "iso-8859-1" | "iso8859-1" | "iso_8859-1" | "latin1" | "l1" => {
            if bytes.is_ascii() {
                normalize_text(bytes)
            } else {
                Cow::Owned(bytes.iter().map(|&b| char::from(b)).collect())
            }
        }
        other => match Encoding::for_label(other.as_bytes()) {
            Some(encoding) => encoding.decode_without_bom_handling(bytes).0,
            None => {
                tracing::debug!("Unknown charset '{}'; decoding as UTF-8", label);
                normalize_text(bytes)
            }
        },
    }
}

/// Picks the charset a response body should be decoded with
///
/// Only successful responses (200 through 207) carrying a content type are
/// considered. In order of preference:
///
/// 1. an explicit `charset` parameter
/// 2. `us-ascii` for exactly `text/xml`
/// 3. `iso-8859-1` for any other `text/*` type
///
/// Returns `None` when no charset applies; such bodies are decoded as UTF-8.
pub fn resolve_charset(status: u16, content_type: Option<&str>) -> Option<String> {
    if !(200..=207).contains(&status) {
        return None;
    }
    let content_type = content_type?;

    let mut parts = content_type.split(';');
    let mime = parts.next().unwrap_or("").trim().to_ascii_lowercase();

    let charset = parts.find_map(|param| {
        let (name, value) = param.split_once('=')?;
        if !name.trim().eq_ignore_ascii_case("charset") {
            return None;
        }
        let value = value.trim().trim_matches('"').trim_matches('\'');
        (!value.is_empty()).then(|| value.to_string())
    });

    if charset.is_some() {
        return charset;
    }

    if mime == "text/xml" {
        Some("us-ascii".to_string())
    } else if mime.split('/').next() == Some("text") {
        Some("iso-8859-1".to_string())
    } else {
        None
    }
}
