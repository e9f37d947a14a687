//! Caller-facing scraper
//!
//! A [`Scraper`] is built either from index pages plus a link selector, or
//! from an explicit list of instance URLs. Everything else (pagination
//! functions, cache flags, delay) is optional configuration.

use crate::config::{ScraperConfig, UserAgentConfig};
use crate::fetch::PageSource;
use crate::query::SelectorMethod;
use crate::scrape::driver::ScrapeDriver;
use crate::scrape::index::IndexResolver;
use crate::scrape::paginator::{same_page, PageFn, Paginator};
use crate::{Result, TrawlError};
use std::path::Path;
use std::sync::Arc;

enum Origin {
    Index {
        urls: Vec<String>,
        selector: String,
        method: SelectorMethod,
    },
    Instances(Vec<String>),
}

/// Builder for [`Scraper`]
///
/// # Example
///
/// ```no_run
/// use sumi_trawl::{ScraperBuilder, SelectorMethod};
///
/// # async fn example() -> sumi_trawl::Result<()> {
/// let mut scraper = ScraperBuilder::from_index("https://example.com/list", "//a", SelectorMethod::XPath)
///     .index_pagination(|url: &str, page: u32| {
///         if page <= 3 { format!("https://example.com/list?page={}", page) } else { url.to_string() }
///     })
///     .build()?;
///
/// let lengths = scraper.run(|body, _url, _position| body.len()).await?;
/// # Ok(())
/// # }
/// ```
pub struct ScraperBuilder {
    origin: Origin,
    config: ScraperConfig,
    user_agent: UserAgentConfig,
    instance_pagination: PageFn,
    index_pagination: PageFn,
    absolute_links: bool,
}

impl ScraperBuilder {
    fn with_origin(origin: Origin) -> Self {
        Self {
            origin,
            config: ScraperConfig::default(),
            user_agent: UserAgentConfig::default(),
            instance_pagination: same_page(),
            index_pagination: same_page(),
            absolute_links: false,
        }
    }

    /// Scrapes the links found on a single index page
    pub fn from_index(url: impl Into<String>, selector: &str, method: SelectorMethod) -> Self {
        Self::from_index_urls(vec![url.into()], selector, method)
    }

    /// Scrapes the links found on several index pages, in order
    pub fn from_index_urls(urls: Vec<String>, selector: &str, method: SelectorMethod) -> Self {
        Self::with_origin(Origin::Index {
            urls,
            selector: selector.to_string(),
            method,
        })
    }

    /// Scrapes an explicit list of instance URLs
    pub fn from_instances(urls: Vec<String>) -> Self {
        Self::with_origin(Origin::Instances(urls))
    }

    pub fn config(mut self, config: ScraperConfig) -> Self {
        self.config = config;
        self
    }

    pub fn user_agent(mut self, user_agent: UserAgentConfig) -> Self {
        self.user_agent = user_agent;
        self
    }

    /// Next-page function for instance pages (called with index 1, 2, ...)
    pub fn instance_pagination<F>(mut self, next_page: F) -> Self
    where
        F: Fn(&str, u32) -> String + Send + Sync + 'static,
    {
        self.instance_pagination = Arc::new(next_page);
        self
    }

    /// Next-page function for index pages (called with index 2, 3, ...)
    pub fn index_pagination<F>(mut self, next_page: F) -> Self
    where
        F: Fn(&str, u32) -> String + Send + Sync + 'static,
    {
        self.index_pagination = Arc::new(next_page);
        self
    }

    /// Resolve index links to absolute URLs against the first index URL
    pub fn absolute_links(mut self, absolute_links: bool) -> Self {
        self.absolute_links = absolute_links;
        self
    }

    /// Builds the scraper, compiling the index selector and the HTTP client
    pub fn build(self) -> Result<Scraper> {
        let source = PageSource::from_config(&self.config, &self.user_agent)?;

        let (index, instances) = match self.origin {
            Origin::Index {
                urls,
                selector,
                method,
            } => {
                let resolver = IndexResolver::new(urls, &selector, method)?
                    .with_pagination(self.index_pagination)
                    .with_absolute_links(self.absolute_links);
                (Some(resolver), None)
            }
            Origin::Instances(urls) => (None, Some(urls)),
        };

        Ok(Scraper {
            config: self.config,
            source,
            index,
            instances,
            instance_pagination: self.instance_pagination,
        })
    }
}

/// A configured scrape over an ordered list of instance pages
pub struct Scraper {
    config: ScraperConfig,
    source: PageSource,
    index: Option<IndexResolver>,
    instances: Option<Vec<String>>,
    instance_pagination: PageFn,
}

impl Scraper {
    pub fn config(&self) -> &ScraperConfig {
        &self.config
    }

    /// The cache and fetcher every page goes through
    pub fn source(&self) -> &PageSource {
        &self.source
    }

    pub fn index(&self) -> Option<&IndexResolver> {
        self.index.as_ref()
    }

    fn index_paginator(&self) -> Paginator<'_> {
        Paginator::new(&self.source, self.config.cache_index).with_max_pages(self.config.max_pages)
    }

    fn instance_paginator(&self) -> Paginator<'_> {
        Paginator::new(&self.source, self.config.stash).with_max_pages(self.config.max_pages)
    }

    /// The ordered instance URLs, resolving the index on first call
    pub async fn instance_urls(&mut self) -> Result<&[String]> {
        if self.instances.is_none() {
            let resolved = match &self.index {
                Some(index) => index.resolve_links(&self.index_paginator()).await?,
                None => Vec::new(),
            };
            self.instances = Some(resolved);
        }
        Ok(self.instances.as_deref().unwrap_or_default())
    }

    /// Runs `process(body, url, position)` over every instance, in order
    pub async fn run<F, R>(&mut self, process: F) -> Result<Vec<R>>
    where
        F: FnMut(&str, &str, usize) -> R,
    {
        self.instance_urls().await?;
        let urls = self.instances.as_deref().unwrap_or_default();

        ScrapeDriver::new(self.instance_paginator(), self.instance_pagination.as_ref())
            .run(urls, process)
            .await
    }

    /// Runs a fallible `process` over every instance, stopping at the first
    /// error
    pub async fn try_run<F, R, E>(&mut self, process: F) -> Result<Vec<R>>
    where
        F: FnMut(&str, &str, usize) -> std::result::Result<R, E>,
        E: Into<TrawlError>,
    {
        self.instance_urls().await?;
        let urls = self.instances.as_deref().unwrap_or_default();

        ScrapeDriver::new(self.instance_paginator(), self.instance_pagination.as_ref())
            .try_run(urls, process)
            .await
    }

    /// Same as [`run`](Self::run), then writes each record as a CSV row
    pub async fn run_to_table<F>(&mut self, process: F, destination: &Path) -> Result<Vec<Vec<String>>>
    where
        F: FnMut(&str, &str, usize) -> Vec<String>,
    {
        self.instance_urls().await?;
        let urls = self.instances.as_deref().unwrap_or_default();

        ScrapeDriver::new(self.instance_paginator(), self.instance_pagination.as_ref())
            .run_to_table(urls, process, destination)
            .await
    }
}
