//! XPath queries over HTML
//!
//! The markup is parsed with `sxd_html` (html5ever underneath, so tag soup is
//! tolerated) and the expression is evaluated with `sxd_xpath`.

use super::SelectorMethod;
use crate::{QueryError, QueryResult};
use sxd_xpath::nodeset::Node;
use sxd_xpath::{Context, Factory, Value, XPath};

pub(super) fn compile(expr: &str) -> QueryResult<XPath> {
    let invalid = |message: String| QueryError::InvalidSelector {
        selector: expr.to_string(),
        method: SelectorMethod::XPath,
        message,
    };

    // An empty expression builds to `None`
    Factory::new()
        .build(expr)
        .map_err(|e| invalid(e.to_string()))?
        .ok_or_else(|| invalid("empty expression".to_string()))
}

/// Evaluates `expr` against `html`, mapping nodes with `on_node` and any
/// non-nodeset result with `on_scalar`
fn evaluate<T>(
    html: &str,
    expr: &str,
    mut on_node: impl FnMut(Node<'_>) -> Option<T>,
    on_scalar: impl FnOnce(String) -> Option<T>,
) -> QueryResult<Vec<T>> {
    let xpath = compile(expr)?;
    let package = sxd_html::parse_html(html);
    let document = package.as_document();
    let context = Context::new();

    let value = xpath
        .evaluate(&context, document.root())
        .map_err(|e| QueryError::Evaluation {
            selector: expr.to_string(),
            message: e.to_string(),
        })?;

    let results = match value {
        Value::Nodeset(nodes) => nodes
            .document_order()
            .into_iter()
            .filter_map(&mut on_node)
            .collect(),
        scalar => on_scalar(scalar.string()).into_iter().collect(),
    };

    Ok(results)
}

pub(super) fn select_attr(html: &str, expr: &str, attr: &str) -> QueryResult<Vec<String>> {
    evaluate(
        html,
        expr,
        |node| match node {
            Node::Element(element) => element.attribute_value(attr).map(str::to_string),
            // `//a/@href` selects the attribute itself
            Node::Attribute(attribute) => Some(attribute.value().to_string()),
            _ => None,
        },
        |_| None,
    )
}

pub(super) fn select_text(html: &str, expr: &str) -> QueryResult<Vec<String>> {
    evaluate(html, expr, |node| Some(node.string_value()), Some)
}
