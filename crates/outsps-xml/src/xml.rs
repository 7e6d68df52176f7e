//! Small helpers shared by the fragment codecs.
//!
//! The stored field values are XML *fragments* (several sibling roots, no
//! declaration), so each decoder wraps its input in a synthetic element before
//! handing it to `roxmltree`.

use roxmltree::Node;

use crate::error::{invalid, Result};

/// Strip a leading `<?xml ...?>` declaration, if any.
pub(crate) fn strip_declaration(input: &str) -> &str {
    let trimmed = input.trim_start();
    if trimmed.starts_with("<?xml") {
        if let Some(end) = trimmed.find("?>") {
            return &trimmed[end + 2..];
        }
    }
    trimmed
}

/// Wrap a fragment in `<{root}>` so it parses as a single document.
pub(crate) fn wrap(root: &str, fragment: &str) -> String {
    format!("<{root}>{}</{root}>", strip_declaration(fragment))
}

/// Child elements of `node`, skipping text and comments.
pub(crate) fn elements<'a, 'input>(
    node: Node<'a, 'input>,
) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children().filter(|n| n.is_element())
}

/// First child element with the given local name.
pub(crate) fn child<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    elements(node).find(|n| n.tag_name().name() == name)
}

/// Descend through a wrapper the caller may already have included, e.g. a
/// `<RecurrenceXML>` around the fragment.
pub(crate) fn unwrap_named<'a, 'input>(
    root: Node<'a, 'input>,
    wrapper: &str,
) -> Node<'a, 'input> {
    let mut kids = elements(root);
    match (kids.next(), kids.next()) {
        (Some(only), None) if only.tag_name().name().eq_ignore_ascii_case(wrapper) => only,
        _ => root,
    }
}

/// Text content of an element, trimmed. Missing text reads as empty.
pub(crate) fn text<'a>(node: Node<'a, '_>) -> &'a str {
    node.text().map(str::trim).unwrap_or("")
}

/// Attribute lookup by local name.
pub(crate) fn attr<'a>(node: Node<'a, '_>, name: &str) -> Option<&'a str> {
    node.attributes()
        .find(|a| a.name() == name)
        .map(|a| a.value().trim())
}

/// The protocol's boolean spellings: `TRUE`/`FALSE` in any case, or `1`/`0`.
pub(crate) fn parse_bool(field: &'static str, value: &str) -> Result<bool> {
    match value.trim() {
        v if v.eq_ignore_ascii_case("true") || v == "1" => Ok(true),
        v if v.eq_ignore_ascii_case("false") || v == "0" => Ok(false),
        other => Err(invalid(field, other)),
    }
}

pub(crate) fn flag(node: Node<'_, '_>, name: &'static str) -> Result<bool> {
    match attr(node, name) {
        Some(v) => parse_bool(name, v),
        None => Ok(false),
    }
}

pub(crate) fn parse_u32(field: &'static str, value: &str) -> Result<u32> {
    value.trim().parse().map_err(|_| invalid(field, value))
}

pub(crate) fn parse_i32(field: &'static str, value: &str) -> Result<i32> {
    value.trim().parse().map_err(|_| invalid(field, value))
}

/// Optional numeric attribute; absent means the protocol default of 1.
pub(crate) fn frequency(node: Node<'_, '_>, name: &'static str) -> Result<u32> {
    match attr(node, name) {
        Some(v) => parse_u32(name, v),
        None => Ok(1),
    }
}

pub(crate) fn required_u32(node: Node<'_, '_>, name: &'static str) -> Result<u32> {
    match attr(node, name) {
        Some(v) => parse_u32(name, v),
        None => Err(invalid(name, "")),
    }
}
