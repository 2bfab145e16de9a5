// Node-text helpers for the C# syntax tree.
//
// Utility functions shared by the lowering pass: raw text slices, modifier
// tokens, type text, and leading documentation comments.

use tree_sitter::Node;

use crate::utils::text::clean_doc;

/// Node kinds that can spell a type reference.
const TYPE_KINDS: &[&str] = &[
    "predefined_type",
    "identifier",
    "qualified_name",
    "generic_name",
    "array_type",
    "nullable_type",
    "tuple_type",
    "pointer_type",
];

/// Get the source text of a tree-sitter node.
pub(crate) fn node_text(node: &Node, src: &str) -> String {
    let start = node.start_byte();
    let end = node.end_byte();
    let bytes = src.as_bytes();
    if start < bytes.len() && end <= bytes.len() {
        String::from_utf8_lossy(&bytes[start..end]).to_string()
    } else {
        String::new()
    }
}

/// Collect the raw modifier tokens of a declaration, in source order.
pub(crate) fn modifier_tokens(node: &Node, src: &str) -> Vec<String> {
    let mut cursor = node.walk();
    node.children(&mut cursor)
        .filter(|c| c.kind() == "modifier")
        .map(|c| node_text(&c, src))
        .collect()
}

pub(crate) fn children_of<'t>(node: &Node<'t>) -> Vec<Node<'t>> {
    let mut cursor = node.walk();
    node.children(&mut cursor).collect()
}

/// First child with the given kind.
pub(crate) fn find_child<'t>(node: &Node<'t>, kind: &str) -> Option<Node<'t>> {
    let mut cursor = node.walk();
    let found = node.children(&mut cursor).find(|c| c.kind() == kind);
    found
}

pub(crate) fn is_type_kind(kind: &str) -> bool {
    TYPE_KINDS.contains(&kind)
}

/// The name identifier of a member that is followed by an anchor node
/// (parameter list, accessor list): the last identifier before the anchor.
pub(crate) fn name_before<'t>(children: &[Node<'t>], anchor: usize) -> Option<Node<'t>> {
    children[..anchor]
        .iter()
        .rev()
        .find(|c| c.kind() == "identifier")
        .copied()
}

/// The type text preceding the name at `name_index`, if any.
pub(crate) fn type_before(children: &[Node], name_index: usize, src: &str) -> Option<String> {
    children[..name_index]
        .iter()
        .find(|c| is_type_kind(c.kind()))
        .map(|c| node_text(c, src).trim().to_string())
}

/// Generic type parameter list text, e.g. `<T, U>`.
pub(crate) fn type_parameters_text(node: &Node, src: &str) -> Option<String> {
    find_child(node, "type_parameter_list").map(|tp| node_text(&tp, src))
}

/// Base list text without the leading colon, e.g. `Base, IDisposable`.
pub(crate) fn base_list_text(node: &Node, src: &str) -> Option<String> {
    let base_list = find_child(node, "base_list")?;
    let mut cursor = base_list.walk();
    let parts: Vec<String> = base_list
        .children(&mut cursor)
        .filter(|c| c.kind() != ":" && c.kind() != ",")
        .map(|c| node_text(&c, src))
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(", "))
    }
}

/// Leading `///` documentation comment text for a declaration, cleaned of
/// comment markers and XML doc tags. Consecutive comment lines are one
/// comment block; the walk stops at the first non-comment sibling.
pub(crate) fn doc_comment(node: &Node, src: &str) -> Option<String> {
    let mut lines = Vec::new();
    let mut current = node.prev_named_sibling();
    while let Some(sibling) = current {
        if sibling.kind().contains("comment") {
            let text = node_text(&sibling, src);
            let trimmed = text.trim_start();
            if trimmed.starts_with("///") || trimmed.starts_with("/**") {
                lines.push(text);
                current = sibling.prev_named_sibling();
                continue;
            }
        }
        break;
    }
    if lines.is_empty() {
        return None;
    }
    lines.reverse();
    let cleaned = clean_doc(&lines.join("\n"));
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned)
    }
}
