//! Document queries over fetched markup
//!
//! A [`Query`] pairs a selector expression with the language it is written
//! in. Matches are always returned in document order, either as the text
//! content of each matched node or as the value of a named attribute.

mod css;
mod xpath;

use crate::{QueryError, QueryResult};
use scraper::Selector;
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

/// Query language of a selector expression
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectorMethod {
    #[default]
    XPath,
    Css,
}

impl fmt::Display for SelectorMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::XPath => f.write_str("xpath"),
            Self::Css => f.write_str("css"),
        }
    }
}

impl FromStr for SelectorMethod {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "xpath" => Ok(Self::XPath),
            "css" => Ok(Self::Css),
            other => Err(QueryError::UnknownMethod(other.to_string())),
        }
    }
}

#[derive(Debug, Clone)]
enum Compiled {
    Css(Selector),
    // sxd-xpath expressions are neither Send nor Sync, so the XPath is
    // validated here and rebuilt on each evaluation.
    XPath,
}

/// A validated selector expression
#[derive(Debug, Clone)]
pub struct Query {
    selector: String,
    method: SelectorMethod,
    compiled: Compiled,
}

impl Query {
    /// Compiles `selector` as `method`, failing if the expression is invalid
    ///
    /// # Example
    ///
    /// ```
    /// use sumi_trawl::query::{Query, SelectorMethod};
    ///
    /// let query = Query::compile("//a", SelectorMethod::XPath).unwrap();
    /// let hrefs = query.select_attr(r#"<a href="/p1">A</a>"#, "href").unwrap();
    /// assert_eq!(hrefs, vec!["/p1".to_string()]);
    /// ```
    pub fn compile(selector: &str, method: SelectorMethod) -> QueryResult<Self> {
        let compiled = match method {
            SelectorMethod::Css => Compiled::Css(css::compile(selector)?),
            SelectorMethod::XPath => {
                xpath::compile(selector)?;
                Compiled::XPath
            }
        };

        Ok(Self {
            selector: selector.to_string(),
            method,
            compiled,
        })
    }

    pub fn selector(&self) -> &str {
        &self.selector
    }

    pub fn method(&self) -> SelectorMethod {
        self.method
    }

    /// Returns the value of `attr` on every matched element
    ///
    /// Elements without the attribute are skipped.
    pub fn select_attr(&self, html: &str, attr: &str) -> QueryResult<Vec<String>> {
        match &self.compiled {
            Compiled::Css(selector) => Ok(css::select_attr(html, selector, attr)),
            Compiled::XPath => xpath::select_attr(html, &self.selector, attr),
        }
    }

    /// Returns the text content of every matched node
    pub fn select_text(&self, html: &str) -> QueryResult<Vec<String>> {
        match &self.compiled {
            Compiled::Css(selector) => Ok(css::select_text(html, selector)),
            Compiled::XPath => xpath::select_text(html, &self.selector),
        }
    }
}

/// Convenience wrapper compiling and running an attribute query in one call
pub fn select_attr(
    html: &str,
    selector: &str,
    method: SelectorMethod,
    attr: &str,
) -> QueryResult<Vec<String>> {
    Query::compile(selector, method)?.select_attr(html, attr)
}

/// Convenience wrapper compiling and running a text query in one call
pub fn select_text(html: &str, selector: &str, method: SelectorMethod) -> QueryResult<Vec<String>> {
    Query::compile(selector, method)?.select_text(html)
}
