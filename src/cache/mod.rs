//! On-disk page stash
//!
//! One file per cached URL lives in a single directory. The filename is the
//! [`cache_key`] of the URL and the content is the page body as UTF-8.
//!
//! Keys are lossy: every character outside `[A-Za-z0-9-]` is dropped, so
//! `https://a.com/x?y` and `httpsa.comxy` share a file. This is a known
//! collision risk and is left as is.

mod store;

pub use store::PageCache;

/// Derives the cache filename for a URL
///
/// # Example
///
/// ```
/// use sumi_trawl::cache::cache_key;
///
/// assert_eq!(cache_key("http://example.com/a-b?c=1"), "httpexamplecoma-bc1");
/// ```
pub fn cache_key(url: &str) -> String {
    url.chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-')
        .collect()
}
