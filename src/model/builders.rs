// Type and member builders.
//
// One builder per declaration kind. Each extracts the simple name, computes
// the fully-qualified name from the parent, normalizes modifiers with the
// container's default visibility, and carries signature and documentation
// text through verbatim. Builders never validate the declaration; malformed
// input degrades to best-effort text.

use tracing::debug;

use super::merge::MergeContext;
use super::modifiers::{parse_modifiers, with_default_visibility, Modifier};
use super::{Accessor, DocNode, DocTree, EntityKind, ModelError, NodeId};
use crate::syntax::{AccessorKind, DeclKind, Declaration};

/// Dispatch every child declaration of a container to its builder. Partial
/// fragments of the same identity land in one record via the merge context,
/// which lives only for this container's loop.
pub(crate) fn build_children(
    tree: &mut DocTree,
    parent: NodeId,
    decls: &[Declaration],
) -> Result<(), ModelError> {
    let mut context = MergeContext::for_container(tree, parent);
    for decl in decls {
        match decl.kind {
            DeclKind::Namespace => {
                let node = namespace_node(tree, parent, decl)?;
                let id = context.add_or_reuse(tree, parent, node);
                build_children(tree, id, &decl.children)?;
            }
            DeclKind::Class => {
                let node = type_node(tree, parent, decl, EntityKind::Class)?;
                let id = context.add_or_reuse(tree, parent, node);
                build_children(tree, id, &decl.children)?;
            }
            DeclKind::Struct => {
                let node = type_node(tree, parent, decl, EntityKind::Struct)?;
                let id = context.add_or_reuse(tree, parent, node);
                build_children(tree, id, &decl.children)?;
            }
            DeclKind::Interface => {
                let node = type_node(tree, parent, decl, EntityKind::Interface)?;
                let id = context.add_or_reuse(tree, parent, node);
                build_children(tree, id, &decl.children)?;
            }
            DeclKind::Enum => {
                // Enums cannot be partial; they skip the registry.
                let node = type_node(tree, parent, decl, EntityKind::Enum)?;
                let id = tree.insert_unique(parent, node);
                build_children(tree, id, &decl.children)?;
            }
            DeclKind::EnumValue => {
                let node = enum_value_node(tree, parent, decl)?;
                tree.insert_unique(parent, node);
            }
            DeclKind::Field => {
                let node = member_node(tree, parent, decl, EntityKind::Field)?;
                tree.insert_unique(parent, node);
            }
            DeclKind::Property => {
                let node = accessor_member_node(tree, parent, decl, EntityKind::Property)?;
                tree.insert_unique(parent, node);
            }
            DeclKind::Indexer => {
                let node = accessor_member_node(tree, parent, decl, EntityKind::Indexer)?;
                tree.insert_unique(parent, node);
            }
            DeclKind::Method => {
                let node = member_node(tree, parent, decl, EntityKind::Method)?;
                tree.insert_unique(parent, node);
            }
            DeclKind::Constructor => {
                let node = member_node(tree, parent, decl, EntityKind::Constructor)?;
                tree.insert_unique(parent, node);
            }
            DeclKind::Operator => {
                let node = member_node(tree, parent, decl, EntityKind::Operator)?;
                tree.insert_unique(parent, node);
            }
            DeclKind::Ignored => {
                debug!(name = %decl.name, "skipping undocumented declaration kind");
            }
        }
    }
    Ok(())
}

/// Default member visibility: interfaces say public, everything else private.
fn default_visibility(parent_kind: EntityKind) -> Modifier {
    if parent_kind == EntityKind::Interface {
        Modifier::Public
    } else {
        Modifier::Private
    }
}

fn require_name(decl: &Declaration, kind: EntityKind) -> Result<String, ModelError> {
    let name = decl.name.trim();
    if name.is_empty() {
        return Err(ModelError::EmptyIdentifier { kind });
    }
    Ok(name.to_string())
}

fn qualify(tree: &DocTree, parent: NodeId, name: &str) -> String {
    let parent_full = &tree.node(parent).full_name;
    if parent_full.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", parent_full, name)
    }
}

fn namespace_node(
    tree: &DocTree,
    parent: NodeId,
    decl: &Declaration,
) -> Result<DocNode, ModelError> {
    let name = require_name(decl, EntityKind::Namespace)?;
    Ok(DocNode {
        kind: EntityKind::Namespace,
        full_name: qualify(tree, parent, &name),
        name,
        // Namespaces carry no modifiers.
        modifiers: Default::default(),
        signature: decl.signature.clone(),
        params: None,
        doc: decl.doc.clone(),
        getter: None,
        setter: None,
        parent: None,
        children: Vec::new(),
    })
}

fn type_node(
    tree: &DocTree,
    parent: NodeId,
    decl: &Declaration,
    kind: EntityKind,
) -> Result<DocNode, ModelError> {
    let name = require_name(decl, kind)?;
    let parent_kind = tree.node(parent).kind;
    let modifiers = with_default_visibility(
        parse_modifiers(decl.modifiers.iter().map(String::as_str)),
        default_visibility(parent_kind),
    );
    Ok(DocNode {
        kind,
        full_name: qualify(tree, parent, &name),
        name,
        modifiers,
        signature: decl.signature.clone(),
        params: None,
        doc: decl.doc.clone(),
        getter: None,
        setter: None,
        parent: None,
        children: Vec::new(),
    })
}

fn member_node(
    tree: &DocTree,
    parent: NodeId,
    decl: &Declaration,
    kind: EntityKind,
) -> Result<DocNode, ModelError> {
    let name = require_name(decl, kind)?;
    let parent_kind = tree.node(parent).kind;
    let modifiers = with_default_visibility(
        parse_modifiers(decl.modifiers.iter().map(String::as_str)),
        default_visibility(parent_kind),
    );
    Ok(DocNode {
        kind,
        full_name: qualify(tree, parent, &name),
        name,
        modifiers,
        signature: decl.signature.clone(),
        params: decl.params.clone(),
        doc: decl.doc.clone(),
        getter: None,
        setter: None,
        parent: None,
        children: Vec::new(),
    })
}

/// Properties and indexers: at most one getter and one setter, built from
/// the raw accessor list. Accessor modifiers get no default visibility; a
/// bare `get;` stays unmodified.
fn accessor_member_node(
    tree: &DocTree,
    parent: NodeId,
    decl: &Declaration,
    kind: EntityKind,
) -> Result<DocNode, ModelError> {
    let mut node = member_node(tree, parent, decl, kind)?;
    node.getter = decl
        .accessors
        .iter()
        .find(|a| a.kind == AccessorKind::Get)
        .map(|a| Accessor {
            modifiers: parse_modifiers(a.modifiers.iter().map(String::as_str)),
        });
    node.setter = decl
        .accessors
        .iter()
        .find(|a| a.kind == AccessorKind::Set)
        .map(|a| Accessor {
            modifiers: parse_modifiers(a.modifiers.iter().map(String::as_str)),
        });
    Ok(node)
}

/// Enum values carry no modifiers, only a name and optional value text.
fn enum_value_node(
    tree: &DocTree,
    parent: NodeId,
    decl: &Declaration,
) -> Result<DocNode, ModelError> {
    let name = require_name(decl, EntityKind::EnumValue)?;
    Ok(DocNode {
        kind: EntityKind::EnumValue,
        full_name: qualify(tree, parent, &name),
        name,
        modifiers: Default::default(),
        signature: decl.signature.clone(),
        params: None,
        doc: decl.doc.clone(),
        getter: None,
        setter: None,
        parent: None,
        children: Vec::new(),
    })
}
