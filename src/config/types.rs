use crate::query::SelectorMethod;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration structure for the `sumi-trawl` binary
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub scraper: ScraperConfig,
    #[serde(rename = "user-agent", default)]
    pub user_agent: UserAgentConfig,
    pub index: Option<IndexConfig>,
    pub instances: Option<InstancesConfig>,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(rename = "field", default)]
    pub fields: Vec<FieldConfig>,
}

/// Scraper behavior configuration
///
/// This is passed by reference to every component at construction time and
/// never mutated afterwards.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ScraperConfig {
    /// Fixed delay before every network fetch (milliseconds)
    #[serde(rename = "delay-ms")]
    pub delay_ms: u64,

    /// Directory holding one file per cached page
    #[serde(rename = "cache-dir")]
    pub cache_dir: PathBuf,

    /// Whether index pages are read from and written to the cache
    #[serde(rename = "cache-index")]
    pub cache_index: bool,

    /// Whether instance pages are read from and written to the cache
    pub stash: bool,

    /// Optional request timeout (seconds); none means wait indefinitely
    #[serde(rename = "timeout-secs")]
    pub timeout_secs: Option<u64>,

    /// Optional upper bound on pages accumulated per paginated document
    #[serde(rename = "max-pages")]
    pub max_pages: Option<u32>,
}

impl ScraperConfig {
    /// Inter-request delay as a `Duration`
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }

    /// Request timeout as a `Duration`, if one is configured
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            delay_ms: 30,
            cache_dir: PathBuf::from("stash"),
            cache_index: false,
            stash: false,
            timeout_secs: None,
            max_pages: None,
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct UserAgentConfig {
    /// Name of the scraper
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the scraper
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the scraper
    #[serde(rename = "contact-url", default)]
    pub contact_url: Option<String>,
}

impl UserAgentConfig {
    /// Formats the `User-Agent` header value
    ///
    /// Format: `Name/Version` or `Name/Version (+ContactURL)`
    pub fn header_value(&self) -> String {
        match &self.contact_url {
            Some(contact) => format!(
                "{}/{} (+{})",
                self.crawler_name, self.crawler_version, contact
            ),
            None => format!("{}/{}", self.crawler_name, self.crawler_version),
        }
    }
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: env!("CARGO_PKG_NAME").to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
            contact_url: None,
        }
    }
}

/// Index pages listing the instances to scrape
#[derive(Debug, Clone, Deserialize)]
pub struct IndexConfig {
    /// Index page URLs (each is paginated, then all are concatenated)
    pub urls: Vec<String>,

    /// Expression locating the link elements
    pub selector: String,

    /// Query language of `selector`
    #[serde(rename = "selector-method", default)]
    pub selector_method: SelectorMethod,

    /// Resolve extracted hrefs against the first index URL
    #[serde(rename = "absolute-links", default)]
    pub absolute_links: bool,
}

/// Explicit list of instance pages
#[derive(Debug, Clone, Deserialize)]
pub struct InstancesConfig {
    pub urls: Vec<String>,
}

/// Output configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutputConfig {
    /// Path of the CSV file to write; rows go to stdout when absent
    #[serde(rename = "csv-path")]
    pub csv_path: Option<PathBuf>,
}

/// One extracted column
#[derive(Debug, Clone, Deserialize)]
pub struct FieldConfig {
    pub name: String,
    pub selector: String,
    #[serde(rename = "selector-method", default)]
    pub selector_method: SelectorMethod,
    /// Attribute to read instead of the element text
    pub attribute: Option<String>,
}
