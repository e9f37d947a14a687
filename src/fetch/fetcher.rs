//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the scraper, including:
//! - Building HTTP clients with proper user agent strings
//! - Throttling every request with a fixed delay
//! - Decoding bodies under the charset chosen by the encoding policy
//! - Classifying failures into recoverable outcomes and propagated errors

use crate::config::{ScraperConfig, UserAgentConfig};
use crate::fetch::encoding::{decode_with_label, normalize_text, resolve_charset};
use crate::{Result, TrawlError};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::Client;
use std::time::Duration;
use url::Url;

/// `Accept` header sent with every request
pub const ACCEPT_MARKUP: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";

/// Result of a fetch that did not fail at the transport level
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The page was fetched (or the URL was empty and nothing was fetched)
    Page {
        /// Page body, always UTF-8
        body: String,
        /// Content-Type header value, if any
        content_type: Option<String>,
    },

    /// HTTP 4xx
    NotFound {
        /// The HTTP status code
        status: u16,
    },

    /// HTTP 5xx
    ServerError {
        /// The HTTP status code
        status: u16,
    },

    /// The URL could not be parsed or is not http(s)
    InvalidUrl {
        /// Why the URL was rejected
        reason: String,
    },
}

impl FetchOutcome {
    /// Returns true if this outcome carries a page body
    pub fn is_page(&self) -> bool {
        matches!(self, Self::Page { .. })
    }

    /// Collapses the outcome to a body; every failure becomes `""`
    pub fn into_body(self) -> String {
        match self {
            Self::Page { body, .. } => body,
            _ => String::new(),
        }
    }
}

/// Builds an HTTP client with proper configuration
///
/// No request timeout is set unless `timeout-secs` is configured; a hung
/// server then blocks the scrape.
///
/// # Example
///
/// ```no_run
/// use sumi_trawl::config::{ScraperConfig, UserAgentConfig};
/// use sumi_trawl::fetch::build_http_client;
///
/// let client = build_http_client(&ScraperConfig::default(), &UserAgentConfig::default()).unwrap();
/// ```
pub fn build_http_client(
    config: &ScraperConfig,
    user_agent: &UserAgentConfig,
) -> std::result::Result<Client, reqwest::Error> {
    let mut builder = Client::builder()
        .user_agent(user_agent.header_value())
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true);

    if let Some(timeout) = config.timeout() {
        builder = builder.timeout(timeout);
    }

    builder.build()
}

/// Issues throttled GET requests
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    delay: Duration,
}

impl Fetcher {
    /// Creates a fetcher with a client built from the configuration
    pub fn new(config: &ScraperConfig, user_agent: &UserAgentConfig) -> Result<Self> {
        let client = build_http_client(config, user_agent).map_err(TrawlError::ClientBuild)?;
        Ok(Self::with_client(client, config.delay()))
    }

    /// Creates a fetcher around an existing client
    pub fn with_client(client: Client, delay: Duration) -> Self {
        Self { client, delay }
    }

    /// Delay applied before every network fetch
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Fetches a URL
    ///
    /// # Request Flow
    ///
    /// 1. An empty URL returns an empty page at once: no delay, no request
    /// 2. Sleep for the configured delay
    /// 3. Reject URLs that are not absolute http(s) URLs
    /// 4. Send one GET with an `Accept` header preferring markup
    /// 5. Classify the status and decode the body
    ///
    /// # Failure Classification
    ///
    /// | Condition | Result |
    /// |-----------|--------|
    /// | HTTP 4xx | `Ok(NotFound)` |
    /// | HTTP 5xx | `Ok(ServerError)` |
    /// | Malformed URL | `Ok(InvalidUrl)` |
    /// | Connection refused, timeout, broken body | `Err(TrawlError::Http)` |
    pub async fn fetch(&self, url: &str) -> Result<FetchOutcome> {
        if url.is_empty() {
            return Ok(FetchOutcome::Page {
                body: String::new(),
                content_type: None,
            });
        }

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let parsed = match Url::parse(url) {
            Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => parsed,
            Ok(parsed) => {
                return Ok(FetchOutcome::InvalidUrl {
                    reason: format!("unsupported scheme '{}'", parsed.scheme()),
                })
            }
            Err(e) => {
                return Ok(FetchOutcome::InvalidUrl {
                    reason: e.to_string(),
                })
            }
        };

        tracing::info!("Fetching {}", url);

        let response = match self
            .client
            .get(parsed)
            .header(ACCEPT, ACCEPT_MARKUP)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) if e.is_builder() => {
                return Ok(FetchOutcome::InvalidUrl {
                    reason: e.to_string(),
                })
            }
            Err(source) => {
                return Err(TrawlError::Http {
                    url: url.to_string(),
                    source,
                })
            }
        };

        let status = response.status();
        if status.is_client_error() {
            return Ok(FetchOutcome::NotFound {
                status: status.as_u16(),
            });
        }
        if status.is_server_error() {
            return Ok(FetchOutcome::ServerError {
                status: status.as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let bytes = response.bytes().await.map_err(|source| TrawlError::Http {
            url: url.to_string(),
            source,
        })?;

        let body = match resolve_charset(status.as_u16(), content_type.as_deref()) {
            Some(charset) => decode_with_label(&bytes, &charset).into_owned(),
            None => normalize_text(&bytes).into_owned(),
        };

        Ok(FetchOutcome::Page { body, content_type })
    }
}
