//! Multi-page accumulation
//!
//! A logical document may span several physical pages. Starting from a seed
//! URL, the paginator fetches a page, asks the caller's next-page function for
//! the following URL, and keeps going until one of two things happens:
//!
//! - a fetched page is empty (including the very first one)
//! - the next-page function returns the URL it was given
//!
//! The default next-page function, [`same_page`], always does the latter, so
//! single-page sources stop after one fetch. A custom function must converge
//! on its own; without `max-pages` nothing else stops it.

use crate::fetch::PageSource;
use crate::Result;
use std::sync::Arc;

/// Next-page function: `(current_url, next_index) -> next_url`
pub type PageFn = Arc<dyn Fn(&str, u32) -> String + Send + Sync>;

/// The no-op next-page function; every source is a single page
pub fn same_page() -> PageFn {
    Arc::new(|url: &str, _: u32| url.to_string())
}

/// Walks paginated documents through a [`PageSource`]
#[derive(Debug, Clone, Copy)]
pub struct Paginator<'a> {
    source: &'a PageSource,
    use_cache: bool,
    max_pages: Option<u32>,
}

impl<'a> Paginator<'a> {
    pub fn new(source: &'a PageSource, use_cache: bool) -> Self {
        Self {
            source,
            use_cache,
            max_pages: None,
        }
    }

    /// Stops after `max_pages` pages even if the next-page function has not
    /// converged
    pub fn with_max_pages(mut self, max_pages: Option<u32>) -> Self {
        self.max_pages = max_pages;
        self
    }

    pub fn source(&self) -> &'a PageSource {
        self.source
    }

    pub fn uses_cache(&self) -> bool {
        self.use_cache
    }

    /// Concatenates the bodies of every page reachable from `seed`
    ///
    /// `seed` is fetched as page `start_index`; the function is then called
    /// with `start_index + 1`, `start_index + 2`, and so on.
    pub async fn accumulate(
        &self,
        seed: &str,
        start_index: u32,
        next_page: &(dyn Fn(&str, u32) -> String + Send + Sync),
    ) -> Result<String> {
        let mut document = String::new();
        let mut current = seed.to_string();
        let mut index = start_index;
        let mut pages: u32 = 0;

        loop {
            let body = self.source.get(current.as_str(), self.use_cache).await?;
            if body.is_empty() {
                tracing::debug!("Page {} of {} is empty; stopping", index, seed);
                break;
            }
            document.push_str(&body);
            pages += 1;

            let next = next_page(&current, index + 1);
            if next == current {
                break;
            }

            if self.max_pages.is_some_and(|max| pages >= max) {
                tracing::warn!(
                    "Stopping pagination of {} after {} pages; next would be {}",
                    seed,
                    pages,
                    next
                );
                break;
            }

            tracing::debug!("Following {} -> page {}: {}", current, index + 1, next);
            current = next;
            index += 1;
        }

        Ok(document)
    }
}
