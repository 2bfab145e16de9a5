// Partial-merge registry.
//
// A `MergeContext` is scoped to one container's child-build loop. It maps
// identity to the canonical node so later fragments of the same type reuse
// the existing record instead of duplicating it. Merging is monotonic: a
// record is only ever added to, never replaced.

use std::collections::HashMap;

use super::modifiers;
use super::{DocNode, DocTree, Identity, NodeId};

pub(crate) struct MergeContext {
    by_identity: HashMap<Identity, NodeId>,
}

impl MergeContext {
    /// Seed the context from the container's existing children, so fragments
    /// arriving from later compilation units still merge.
    pub(crate) fn for_container(tree: &DocTree, parent: NodeId) -> MergeContext {
        let by_identity = tree
            .node(parent)
            .children
            .iter()
            .map(|&child| (tree.node(child).identity(), child))
            .collect();
        MergeContext { by_identity }
    }

    /// Reuse the existing record for the candidate's identity, folding the
    /// new fragment's modifiers and documentation into it; otherwise insert
    /// the candidate as the canonical record.
    pub(crate) fn add_or_reuse(
        &mut self,
        tree: &mut DocTree,
        parent: NodeId,
        candidate: DocNode,
    ) -> NodeId {
        let identity = candidate.identity();
        if let Some(&id) = self.by_identity.get(&identity) {
            let existing = tree.node_mut(id);
            existing.modifiers.extend(candidate.modifiers.iter().copied());
            modifiers::normalize_visibility(&mut existing.modifiers);
            if existing.doc.is_none() {
                existing.doc = candidate.doc;
            }
            id
        } else {
            let id = tree.insert_child(parent, candidate);
            self.by_identity.insert(identity, id);
            id
        }
    }
}
