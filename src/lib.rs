//! Sumi-Trawl: a small, polite page scraper
//!
//! This crate fetches "index" pages that list links, resolves them into an
//! ordered list of "instance" pages, fetches each instance (optionally through
//! an on-disk stash), follows simple pagination, and hands the raw HTML to
//! caller-supplied extraction logic.
//!
//! Every request is issued sequentially and preceded by a fixed delay.

pub mod cache;
pub mod config;
pub mod fetch;
pub mod output;
pub mod query;
pub mod scrape;

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for Sumi-Trawl operations
#[derive(Debug, Error)]
pub enum TrawlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),

    #[error("Cache error at {}: {source}", path.display())]
    Cache {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Query error: {0}")]
    Query(#[from] QueryError),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Document query errors
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("Invalid {method} selector '{selector}': {message}")]
    InvalidSelector {
        selector: String,
        method: query::SelectorMethod,
        message: String,
    },

    #[error("XPath evaluation failed for '{selector}': {message}")]
    Evaluation { selector: String, message: String },

    #[error("Unknown selector method: {0}")]
    UnknownMethod(String),
}

/// Result type alias for Sumi-Trawl operations
pub type Result<T> = std::result::Result<T, TrawlError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for document query operations
pub type QueryResult<T> = std::result::Result<T, QueryError>;

// Re-export commonly used types
pub use cache::{cache_key, PageCache};
pub use config::{Config, ScraperConfig, UserAgentConfig};
pub use fetch::{FetchOutcome, Fetcher, PageSource, PageTarget, ResolveUrl};
pub use query::{Query, SelectorMethod};
pub use scrape::{IndexResolver, PageFn, Paginator, Scraper, ScraperBuilder};
