//! CSS selector queries backed by `scraper`

use super::SelectorMethod;
use crate::{QueryError, QueryResult};
use scraper::{Html, Selector};

pub(super) fn compile(selector: &str) -> QueryResult<Selector> {
    Selector::parse(selector).map_err(|e| QueryError::InvalidSelector {
        selector: selector.to_string(),
        method: SelectorMethod::Css,
        message: format!("{:?}", e),
    })
}

pub(super) fn select_attr(html: &str, selector: &Selector, attr: &str) -> Vec<String> {
    let document = Html::parse_document(html);

    document
        .select(selector)
        .filter_map(|element| element.value().attr(attr))
        .map(str::to_string)
        .collect()
}

pub(super) fn select_text(html: &str, selector: &Selector) -> Vec<String> {
    let document = Html::parse_document(html);

    document
        .select(selector)
        .map(|element| element.text().collect::<String>())
        .collect()
}
