//! Scraping: pagination, index resolution and the per-instance loop
//!
//! This module contains the scrape orchestration, including:
//! - Accumulating paginated documents
//! - Resolving index pages into an ordered instance list
//! - Driving the caller's processing function over every instance
//!
//! Index pages are paginated from page 1 and instance pages from page 0.
//! Next-page functions written for this crate rely on those offsets.

mod driver;
mod index;
mod paginator;
mod runner;

pub use driver::{ScrapeDriver, INSTANCE_START_INDEX};
pub use index::{IndexResolver, INDEX_START_INDEX};
pub use paginator::{same_page, PageFn, Paginator};
pub use runner::{Scraper, ScraperBuilder};
