//! Index resolution: from listing pages to an ordered instance list

use crate::fetch::{PageTarget, ResolveUrl};
use crate::query::{Query, SelectorMethod};
use crate::scrape::paginator::{same_page, PageFn, Paginator};
use crate::{QueryResult, Result};
use url::Url;

/// Index pages are paginated starting from page 1
pub const INDEX_START_INDEX: u32 = 1;

/// Attribute holding the link target of a matched element
const LINK_ATTR: &str = "href";

/// Fetches index pages and extracts the links they list
pub struct IndexResolver {
    urls: Vec<String>,
    query: Query,
    next_page: PageFn,
    absolute_links: bool,
}

impl IndexResolver {
    /// Creates a resolver over one or more index URLs
    ///
    /// Fails if `selector` is not a valid `method` expression.
    pub fn new(urls: Vec<String>, selector: &str, method: SelectorMethod) -> QueryResult<Self> {
        Ok(Self {
            urls,
            query: Query::compile(selector, method)?,
            next_page: same_page(),
            absolute_links: false,
        })
    }

    /// Replaces the next-page function used on index pages
    pub fn with_pagination(mut self, next_page: PageFn) -> Self {
        self.next_page = next_page;
        self
    }

    /// Resolves extracted links against the first index URL
    pub fn with_absolute_links(mut self, absolute_links: bool) -> Self {
        self.absolute_links = absolute_links;
        self
    }

    pub fn urls(&self) -> &[String] {
        &self.urls
    }

    pub fn query(&self) -> &Query {
        &self.query
    }

    /// Fetches every index URL (following pagination) and concatenates them
    pub async fn fetch_content(&self, paginator: &Paginator<'_>) -> Result<String> {
        let mut content = String::new();
        for url in &self.urls {
            let pages = paginator
                .accumulate(url, INDEX_START_INDEX, self.next_page.as_ref())
                .await?;
            content.push_str(&pages);
        }
        Ok(content)
    }

    /// Returns the link targets of every matched element, in document order
    pub async fn resolve_links(&self, paginator: &Paginator<'_>) -> Result<Vec<String>> {
        let content = self.fetch_content(paginator).await?;
        let links = self.query.select_attr(&content, LINK_ATTR)?;

        let links = if self.absolute_links {
            let base = self.urls.first().and_then(|u| Url::parse(u).ok());
            match base {
                Some(base) => links
                    .iter()
                    .filter_map(|href| resolve_link(href, &base))
                    .collect(),
                None => links,
            }
        } else {
            links
        };

        tracing::info!(
            "Resolved {} instance links from {} index URL(s)",
            links.len(),
            self.urls.len()
        );
        Ok(links)
    }
}

impl ResolveUrl for IndexResolver {
    /// The first index URL
    fn resolve_url(&self) -> String {
        self.urls.first().cloned().unwrap_or_default()
    }
}

impl<'a> From<&'a IndexResolver> for PageTarget<'a> {
    fn from(resolver: &'a IndexResolver) -> Self {
        Self::Resolvable(resolver)
    }
}

/// Resolves a link href to an absolute URL
///
/// Returns None if the link should be excluded:
/// - javascript:, mailto:, tel:, data: schemes
/// - fragment-only and empty hrefs
/// - Invalid URLs
/// - Non-HTTP(S) URLs after resolution
fn resolve_link(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    if href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
    {
        return None;
    }

    let absolute_url = base_url.join(href).ok()?;
    matches!(absolute_url.scheme(), "http" | "https").then(|| absolute_url.to_string())
}
