//! Name resolution.
//!
//! Resolution is a documented heuristic, not semantic binding: three
//! attempts over the tree, first match wins. Exact fully-qualified match
//! from the root, then a simple-name match at the closest enclosing scope,
//! then a simple-name match anywhere. Comparison is whitespace-insensitive.
//! A miss is never an error; link lookups degrade to a placeholder.

use crate::model::nav::{NavNode, NodeRef};
use crate::utils::text::despace;

/// Placeholder link for references that resolve nowhere.
pub const UNRESOLVED_LINK: &str = "#";

/// Anything the resolver can match against.
pub trait Named {
    fn name(&self) -> &str;
    fn full_name(&self) -> &str;
}

impl Named for NodeRef<'_> {
    fn name(&self) -> &str {
        &self.get().name
    }

    fn full_name(&self) -> &str {
        &self.get().full_name
    }
}

/// Resolve a textual reference from the given node, per the three-step
/// order. Returns the first match, or `None` when every step misses.
pub fn resolve_by_name<N>(from: N, reference: &str) -> Option<N>
where
    N: NavNode + Named,
{
    let target = despace(reference);
    if target.is_empty() {
        return None;
    }
    let root = from.root();
    root.descendants()
        .find(|n| despace(n.full_name()) == target)
        .or_else(|| from.closest_relative(|n| despace(n.name()) == target))
        .or_else(|| root.descendants().find(|n| despace(n.name()) == target))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::nav::NodeRef;
    use crate::model::DocTree;
    use crate::syntax::{DeclKind, Declaration};

    fn class(name: &str, children: Vec<Declaration>) -> Declaration {
        let mut decl = Declaration::new(DeclKind::Class, name);
        decl.modifiers = vec!["public".to_string()];
        decl.children = children;
        decl
    }

    fn namespace(name: &str, children: Vec<Declaration>) -> Declaration {
        let mut decl = Declaration::new(DeclKind::Namespace, name);
        decl.children = children;
        decl
    }

    fn method(name: &str) -> Declaration {
        let mut decl = Declaration::new(DeclKind::Method, name);
        decl.params = Some("()".to_string());
        decl
    }

    /// Namespace `N` holds `Foo` with nested `Bar` and method `M`; an
    /// unrelated `Other.Bar` exists elsewhere.
    fn sample_tree() -> DocTree {
        let unit = vec![
            namespace("N", vec![class("Foo", vec![class("Bar", vec![]), method("M")])]),
            namespace("Other", vec![class("Bar", vec![])]),
        ];
        DocTree::build([unit.as_slice()]).unwrap()
    }

    fn find<'a>(tree: &'a DocTree, full_name: &str) -> NodeRef<'a> {
        tree.root()
            .descendants()
            .find(|n| n.get().full_name == full_name)
            .unwrap()
    }

    #[test]
    fn exact_full_name_wins_over_simple_names() {
        let tree = sample_tree();
        let from = find(&tree, "N.Foo.M");
        let hit = resolve_by_name(from, "Other.Bar").unwrap();
        assert_eq!(hit.get().full_name, "Other.Bar");
    }

    #[test]
    fn nearest_scope_beats_global_fallback() {
        let tree = sample_tree();
        let from = find(&tree, "N.Foo.M");
        let hit = resolve_by_name(from, "Bar").unwrap();
        assert_eq!(hit.get().full_name, "N.Foo.Bar");
    }

    #[test]
    fn exact_match_also_works_on_containers() {
        let tree = sample_tree();
        let from = find(&tree, "N.Foo.M");
        let hit = resolve_by_name(from, "Other").unwrap();
        assert_eq!(hit.get().full_name, "Other");
    }

    #[test]
    fn global_fallback_reaches_beyond_the_scope_bound() {
        let tree = sample_tree();
        // From `Other`, the bounded ancestor search never descends deep
        // enough to see `N.Foo.M`; the whole-tree fallback does.
        let from = find(&tree, "Other");
        let hit = resolve_by_name(from, "M").unwrap();
        assert_eq!(hit.get().full_name, "N.Foo.M");
    }

    #[test]
    fn comparison_ignores_whitespace() {
        let tree = sample_tree();
        let from = find(&tree, "N.Foo.M");
        let hit = resolve_by_name(from, " N . Foo . Bar ").unwrap();
        assert_eq!(hit.get().full_name, "N.Foo.Bar");
    }

    #[test]
    fn unresolved_reference_is_none() {
        let tree = sample_tree();
        let from = find(&tree, "N.Foo.M");
        assert!(resolve_by_name(from, "Nope").is_none());
        assert!(resolve_by_name(from, "").is_none());
    }
}
