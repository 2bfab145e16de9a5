// Render projection.
//
// A fresh, immutable snapshot of the documentation tree, filtered by a
// visibility predicate and annotated with link tokens. Backends consume
// this and nothing else. Like the model tree it is an arena: entities hold
// id handles, not references, so the snapshot serializes cleanly and owns
// no cycles.

use std::collections::BTreeSet;

use serde::ser::{Serialize, SerializeStruct, Serializer};
use tracing::warn;

use crate::model::nav::{NavNode, NodeRef};
use crate::model::{modifiers::Modifier, DocNode, DocTree, EntityKind, NodeId};
use crate::resolve::{resolve_by_name, Named, UNRESOLVED_LINK};

/// Index handle into an `EntityGraph`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntityId(u32);

/// One projected node: name, fully-qualified name, kind tag, link token,
/// and a back-reference to the originating documentation node for access to
/// modifiers, signature and doc text.
#[derive(Debug, Clone)]
pub struct Entity {
    pub name: String,
    pub full_name: String,
    pub kind: EntityKind,
    pub link: String,
    pub source: Option<NodeId>,
    pub parent: Option<EntityId>,
    pub children: Vec<EntityId>,
}

/// The projected snapshot. Created per render request, discarded after.
#[derive(Debug)]
pub struct EntityGraph {
    entities: Vec<Entity>,
}

impl EntityGraph {
    /// Project the documentation tree. The predicate is applied to every
    /// node below the root; a failing node prunes its whole subtree. The
    /// link function derives each node's stable link token.
    pub fn project<P, L>(tree: &DocTree, predicate: P, link_from_name: L) -> EntityGraph
    where
        P: Fn(NodeRef<'_>) -> bool,
        L: Fn(&DocNode) -> String,
    {
        let mut graph = EntityGraph {
            entities: Vec::new(),
        };
        let root = tree.root();
        let root_id = graph.push(root.get(), root.id(), None, &link_from_name);
        graph.project_children(root, root_id, &predicate, &link_from_name);
        graph
    }

    fn push<L>(
        &mut self,
        node: &DocNode,
        source: NodeId,
        parent: Option<EntityId>,
        link_from_name: &L,
    ) -> EntityId
    where
        L: Fn(&DocNode) -> String,
    {
        let id = EntityId(self.entities.len() as u32);
        self.entities.push(Entity {
            name: node.name.clone(),
            full_name: node.full_name.clone(),
            kind: node.kind,
            link: link_from_name(node),
            source: Some(source),
            parent,
            children: Vec::new(),
        });
        if let Some(parent) = parent {
            self.entities[parent.0 as usize].children.push(id);
        }
        id
    }

    fn project_children<P, L>(
        &mut self,
        node: NodeRef<'_>,
        projected: EntityId,
        predicate: &P,
        link_from_name: &L,
    ) where
        P: Fn(NodeRef<'_>) -> bool,
        L: Fn(&DocNode) -> String,
    {
        for child in node.children() {
            if !predicate(child) {
                continue;
            }
            let child_id = self.push(child.get(), child.id(), Some(projected), link_from_name);
            self.project_children(child, child_id, predicate, link_from_name);
        }
    }

    pub fn root(&self) -> EntityRef<'_> {
        EntityRef {
            graph: self,
            id: EntityId(0),
        }
    }

    pub fn entity(&self, id: EntityId) -> &Entity {
        &self.entities[id.0 as usize]
    }

    pub fn at(&self, id: EntityId) -> EntityRef<'_> {
        EntityRef { graph: self, id }
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Serialize the snapshot as nested JSON, for the manifest.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.root())
    }
}

/// The default projection predicate: containers without modifiers
/// (namespaces, enum values) always pass; everything else must carry one of
/// the allowed visibilities.
pub fn visibility_predicate(allowed: BTreeSet<Modifier>) -> impl Fn(NodeRef<'_>) -> bool {
    move |node: NodeRef<'_>| {
        let data = node.get();
        match data.kind {
            EntityKind::Root | EntityKind::Namespace | EntityKind::EnumValue => true,
            _ => data.modifiers.iter().any(|m| match m {
                Modifier::ProtectedInternal => {
                    allowed.contains(&Modifier::ProtectedInternal)
                        || allowed.contains(&Modifier::Protected)
                        || allowed.contains(&Modifier::Internal)
                }
                other => allowed.contains(other),
            }),
        }
    }
}

/// Handle to one entity of a projected snapshot.
#[derive(Clone, Copy)]
pub struct EntityRef<'a> {
    graph: &'a EntityGraph,
    id: EntityId,
}

impl<'a> EntityRef<'a> {
    pub fn id(self) -> EntityId {
        self.id
    }

    pub fn get(self) -> &'a Entity {
        self.graph.entity(self.id)
    }

    /// Resolve a textual reference from this entity, per the three-step
    /// resolution order.
    pub fn get_by_name(self, reference: &str) -> Option<EntityRef<'a>> {
        resolve_by_name(self, reference)
    }

    /// The resolved node's link token, or the placeholder when the
    /// reference matches nothing. Never an error.
    pub fn get_link(self, reference: &str) -> String {
        match self.get_by_name(reference) {
            Some(hit) => hit.get().link.clone(),
            None => {
                warn!(reference, "unresolved reference, emitting placeholder link");
                UNRESOLVED_LINK.to_string()
            }
        }
    }
}

impl<'a> NavNode for EntityRef<'a> {
    fn parent(self) -> Option<Self> {
        self.get().parent.map(|id| EntityRef {
            graph: self.graph,
            id,
        })
    }

    fn children(self) -> Vec<Self> {
        self.get()
            .children
            .iter()
            .map(|&id| EntityRef {
                graph: self.graph,
                id,
            })
            .collect()
    }
}

impl Named for EntityRef<'_> {
    fn name(&self) -> &str {
        &self.get().name
    }

    fn full_name(&self) -> &str {
        &self.get().full_name
    }
}

impl Serialize for EntityRef<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let entity = self.get();
        let mut state = serializer.serialize_struct("Entity", 5)?;
        state.serialize_field("name", &entity.name)?;
        state.serialize_field("fullName", &entity.full_name)?;
        state.serialize_field("kind", &entity.kind)?;
        state.serialize_field("link", &entity.link)?;
        state.serialize_field("children", &self.children())?;
        state.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DocTree;
    use crate::syntax::{DeclKind, Declaration};
    use crate::utils::links::link_from_name;

    fn class(name: &str, visibility: &str, children: Vec<Declaration>) -> Declaration {
        let mut decl = Declaration::new(DeclKind::Class, name);
        if !visibility.is_empty() {
            decl.modifiers = vec![visibility.to_string()];
        }
        decl.children = children;
        decl
    }

    fn namespace(name: &str, children: Vec<Declaration>) -> Declaration {
        let mut decl = Declaration::new(DeclKind::Namespace, name);
        decl.children = children;
        decl
    }

    fn sample_tree() -> DocTree {
        let mut field = Declaration::new(DeclKind::Field, "hidden");
        field.signature = Some("int hidden".to_string());
        let unit = vec![namespace(
            "N",
            vec![
                class("Visible", "public", vec![field]),
                class("Hidden", "internal", vec![class("Inner", "public", vec![])]),
            ],
        )];
        DocTree::build([unit.as_slice()]).unwrap()
    }

    fn public_only() -> BTreeSet<Modifier> {
        BTreeSet::from([Modifier::Public])
    }

    fn project(tree: &DocTree) -> EntityGraph {
        EntityGraph::project(tree, visibility_predicate(public_only()), |node| {
            link_from_name(&node.full_name, node.params.as_deref())
        })
    }

    #[test]
    fn failing_predicate_prunes_the_subtree() {
        let tree = sample_tree();
        let graph = project(&tree);
        let names: Vec<String> = graph
            .root()
            .descendants()
            .map(|e| e.get().full_name.clone())
            .collect();
        // Hidden is internal: it and its public Inner are both gone; the
        // private field is filtered as well.
        assert_eq!(names, vec!["", "N", "N.Visible"]);
    }

    #[test]
    fn entities_carry_links_and_sources() {
        let tree = sample_tree();
        let graph = project(&tree);
        let visible = graph
            .root()
            .descendants()
            .find(|e| e.get().full_name == "N.Visible")
            .unwrap();
        assert_eq!(visible.get().link, "n-visible");
        assert!(visible.get().source.is_some());
        assert_eq!(visible.get().kind, EntityKind::Class);
    }

    #[test]
    fn get_link_degrades_to_placeholder() {
        let tree = sample_tree();
        let graph = project(&tree);
        let root = graph.root();
        assert_eq!(root.get_link("N.Visible"), "n-visible");
        assert_eq!(root.get_link("DoesNotExist"), UNRESOLVED_LINK);
    }

    #[test]
    fn snapshot_serializes_nested() {
        let tree = sample_tree();
        let graph = project(&tree);
        let json = graph.to_json().unwrap();
        assert!(json.contains("\"fullName\": \"N.Visible\""));
        assert!(json.contains("\"kind\": \"class\""));
        assert!(!json.contains("Hidden"));
    }

    #[test]
    fn resolution_works_on_the_projection() {
        let tree = sample_tree();
        let graph = project(&tree);
        let visible = graph
            .root()
            .descendants()
            .find(|e| e.get().full_name == "N.Visible")
            .unwrap();
        let hit = visible.get_by_name("Visible").unwrap();
        assert_eq!(hit.get().full_name, "N.Visible");
    }
}
