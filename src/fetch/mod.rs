//! Page fetching
//!
//! This module contains everything between a URL and a UTF-8 page body:
//! - The throttled HTTP fetcher and its failure classification
//! - The charset policy applied to every response
//! - The page source that puts the on-disk cache in front of the fetcher

mod encoding;
mod fetcher;
mod source;

pub use encoding::{decode_with_label, normalize_text, resolve_charset};
pub use fetcher::{build_http_client, FetchOutcome, Fetcher, ACCEPT_MARKUP};
pub use source::{PageSource, PageTarget, ResolveUrl};
