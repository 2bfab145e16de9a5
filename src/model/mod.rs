// Symbol model: the documentation tree.
//
// The tree is an arena: `DocTree` owns every node in one vector and all
// parent/child links are `NodeId` indices. One build pass over the input
// declarations constructs it; afterwards it is shared read-only by the
// resolver, the projection, and the backends.

pub(crate) mod builders;
pub(crate) mod merge;
pub mod modifiers;
pub mod nav;

use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::syntax::Declaration;
use crate::utils::text::despace;
use modifiers::Modifier;
use nav::NodeRef;

/// Kind tag shared by the model tree and the render projection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Root,
    Namespace,
    Class,
    Struct,
    Interface,
    Enum,
    EnumValue,
    Field,
    Property,
    Indexer,
    Method,
    Constructor,
    Operator,
}

impl EntityKind {
    /// Kinds that own nested types and/or members.
    pub fn is_container(self) -> bool {
        matches!(
            self,
            EntityKind::Root
                | EntityKind::Namespace
                | EntityKind::Class
                | EntityKind::Struct
                | EntityKind::Interface
                | EntityKind::Enum
        )
    }

    /// Kinds whose declarations may be split across several fragments and
    /// must merge into one record.
    pub fn is_partial_capable(self) -> bool {
        matches!(
            self,
            EntityKind::Namespace | EntityKind::Class | EntityKind::Struct | EntityKind::Interface
        )
    }

    /// Kinds that can overload: identity includes the parameter list.
    pub fn is_overloadable(self) -> bool {
        matches!(
            self,
            EntityKind::Method | EntityKind::Constructor | EntityKind::Operator
        )
    }

    /// Grouping rank for child ordering: nested types come before members,
    /// mirroring the per-kind collections of the data model.
    fn group_rank(self) -> u8 {
        match self {
            EntityKind::Root => 0,
            EntityKind::Namespace => 1,
            EntityKind::Class => 2,
            EntityKind::Struct => 3,
            EntityKind::Interface => 4,
            EntityKind::Enum => 5,
            EntityKind::EnumValue => 6,
            EntityKind::Field => 7,
            EntityKind::Property => 8,
            EntityKind::Indexer => 9,
            // Methods, constructors and operators share one ordered group.
            EntityKind::Method | EntityKind::Constructor | EntityKind::Operator => 10,
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            EntityKind::Root => "root",
            EntityKind::Namespace => "namespace",
            EntityKind::Class => "class",
            EntityKind::Struct => "struct",
            EntityKind::Interface => "interface",
            EntityKind::Enum => "enum",
            EntityKind::EnumValue => "enum value",
            EntityKind::Field => "field",
            EntityKind::Property => "property",
            EntityKind::Indexer => "indexer",
            EntityKind::Method => "method",
            EntityKind::Constructor => "constructor",
            EntityKind::Operator => "operator",
        };
        write!(f, "{}", text)
    }
}

/// Fatal model construction errors. Everything else degrades in place.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("{kind} declaration has an empty identifier")]
    EmptyIdentifier { kind: EntityKind },
}

/// Index handle into the `DocTree` arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct NodeId(pub(crate) u32);

/// Identity used for merging and sibling uniqueness: kind, fully-qualified
/// name, and the despaced parameter list where overloads are possible.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Identity {
    pub kind: EntityKind,
    pub full_name: String,
    pub overload: String,
}

/// A property or indexer accessor. Presence of the record is the flag;
/// there is no tri-state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Accessor {
    pub modifiers: BTreeSet<Modifier>,
}

/// One node of the documentation tree: a container (namespace, type) or a
/// member. Members keep `children` empty.
#[derive(Debug, Clone)]
pub struct DocNode {
    pub kind: EntityKind,
    pub name: String,
    pub full_name: String,
    pub modifiers: BTreeSet<Modifier>,
    /// Type/signature text, verbatim from the source apart from trimming.
    pub signature: Option<String>,
    /// Raw parameter list text for overloadable members.
    pub params: Option<String>,
    pub doc: Option<String>,
    pub getter: Option<Accessor>,
    pub setter: Option<Accessor>,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
}

impl DocNode {
    pub fn has_getter(&self) -> bool {
        self.getter.is_some()
    }

    pub fn has_setter(&self) -> bool {
        self.setter.is_some()
    }

    pub fn identity(&self) -> Identity {
        let overload = if self.kind.is_overloadable() {
            self.params.as_deref().map(despace).unwrap_or_default()
        } else {
            String::new()
        };
        Identity {
            kind: self.kind,
            full_name: self.full_name.clone(),
            overload,
        }
    }

    /// Sort key for deterministic sibling ordering: kind group first, then
    /// fully-qualified name, then the overload discriminator.
    fn sort_key(&self) -> (u8, &str, String) {
        let identity_overload = if self.kind.is_overloadable() {
            self.params.as_deref().map(despace).unwrap_or_default()
        } else {
            String::new()
        };
        (self.kind.group_rank(), self.full_name.as_str(), identity_overload)
    }
}

/// The documentation tree. Built once, immutable afterwards.
#[derive(Debug)]
pub struct DocTree {
    nodes: Vec<DocNode>,
}

impl DocTree {
    /// Build the tree from the top-level declarations of every compilation
    /// unit, in one pass. Deterministic output does not depend on unit or
    /// declaration order.
    pub fn build<'a, I>(units: I) -> Result<DocTree, ModelError>
    where
        I: IntoIterator<Item = &'a [Declaration]>,
    {
        let mut tree = DocTree {
            nodes: vec![DocNode {
                kind: EntityKind::Root,
                name: String::new(),
                full_name: String::new(),
                modifiers: BTreeSet::new(),
                signature: None,
                params: None,
                doc: None,
                getter: None,
                setter: None,
                parent: None,
                children: Vec::new(),
            }],
        };
        let root = NodeId(0);
        for unit in units {
            builders::build_children(&mut tree, root, unit)?;
        }
        Ok(tree)
    }

    pub fn root_id(&self) -> NodeId {
        NodeId(0)
    }

    pub fn root(&self) -> NodeRef<'_> {
        NodeRef::new(self, self.root_id())
    }

    pub fn node(&self, id: NodeId) -> &DocNode {
        &self.nodes[id.0 as usize]
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut DocNode {
        &mut self.nodes[id.0 as usize]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Insert a node under `parent` at its ordered position.
    pub(crate) fn insert_child(&mut self, parent: NodeId, mut node: DocNode) -> NodeId {
        node.parent = Some(parent);
        let position = {
            let siblings = &self.nodes[parent.0 as usize].children;
            let key = node.sort_key();
            siblings
                .partition_point(|&sibling| self.nodes[sibling.0 as usize].sort_key() <= key)
        };
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        self.nodes[parent.0 as usize].children.insert(position, id);
        id
    }

    /// Insert a node under `parent` unless a sibling with the same identity
    /// already exists; the first record wins.
    pub(crate) fn insert_unique(&mut self, parent: NodeId, node: DocNode) -> NodeId {
        let identity = node.identity();
        let existing = self.nodes[parent.0 as usize]
            .children
            .iter()
            .copied()
            .find(|&child| self.nodes[child.0 as usize].identity() == identity);
        match existing {
            Some(id) => id,
            None => self.insert_child(parent, node),
        }
    }
}
