//! Cache-or-network page access

use crate::cache::{cache_key, PageCache};
use crate::config::{ScraperConfig, UserAgentConfig};
use crate::fetch::Fetcher;
use crate::Result;
use std::borrow::Cow;

/// Something that can stand in for a URL by resolving to one
pub trait ResolveUrl: Send + Sync {
    fn resolve_url(&self) -> String;
}

/// A page to load: either a literal URL or an object resolving to one
#[derive(Clone, Copy)]
pub enum PageTarget<'a> {
    Url(&'a str),
    Resolvable(&'a dyn ResolveUrl),
}

impl<'a> PageTarget<'a> {
    /// The URL this target refers to
    pub fn url(&self) -> Cow<'a, str> {
        match self {
            Self::Url(url) => Cow::Borrowed(url),
            Self::Resolvable(resolver) => Cow::Owned(resolver.resolve_url()),
        }
    }
}

impl<'a> From<&'a str> for PageTarget<'a> {
    fn from(url: &'a str) -> Self {
        Self::Url(url)
    }
}

impl<'a> From<&'a String> for PageTarget<'a> {
    fn from(url: &'a String) -> Self {
        Self::Url(url.as_str())
    }
}

impl<'a> From<&'a dyn ResolveUrl> for PageTarget<'a> {
    fn from(resolver: &'a dyn ResolveUrl) -> Self {
        Self::Resolvable(resolver)
    }
}

/// Combines the page cache and the fetcher
#[derive(Debug)]
pub struct PageSource {
    cache: PageCache,
    fetcher: Fetcher,
}

impl PageSource {
    pub fn new(cache: PageCache, fetcher: Fetcher) -> Self {
        Self { cache, fetcher }
    }

    /// Builds the cache and fetcher described by the configuration
    pub fn from_config(config: &ScraperConfig, user_agent: &UserAgentConfig) -> Result<Self> {
        Ok(Self::new(
            PageCache::new(config.cache_dir.clone()),
            Fetcher::new(config, user_agent)?,
        ))
    }

    pub fn cache(&self) -> &PageCache {
        &self.cache
    }

    pub fn fetcher(&self) -> &Fetcher {
        &self.fetcher
    }

    /// Returns the body of a page, from the cache or from the network
    ///
    /// With `use_cache`, a cached body is returned without any request, and a
    /// fetched body is written back under the URL's key. Failed fetches are
    /// written back too (as empty bodies), so they are not retried on later
    /// runs.
    ///
    /// An empty URL yields an empty body and never touches the cache.
    pub async fn get<'a>(&self, target: impl Into<PageTarget<'a>>, use_cache: bool) -> Result<String> {
        let target: PageTarget<'a> = target.into();
        let url = target.url();
        if url.is_empty() {
            return Ok(String::new());
        }

        let key = cache_key(&url);
        let cacheable = use_cache && !key.is_empty();

        if cacheable && self.cache.has(&key) {
            tracing::debug!("Cache hit for {} ({})", url, key);
            return self.cache.read(&key);
        }

        let outcome = self.fetcher.fetch(&url).await?;
        if !outcome.is_page() {
            tracing::warn!("Fetch of {} gave {:?}; using an empty body", url, outcome);
        }
        let body = outcome.into_body();

        if cacheable {
            self.cache.write(&key, &body)?;
            tracing::debug!("Stashed {} as {} ({} bytes)", url, key, body.len());
        }

        Ok(body)
    }
}
