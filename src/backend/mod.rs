// Formatter backends.
//
// Backends consume the render projection and emit one concrete text format.
// Page composition is shared; each format implements the small `Markup`
// writer. Pages are independent once the tree is built, so rendering runs
// in parallel.

pub mod html;
pub mod markdown;

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use rayon::prelude::*;
use tracing::{debug, info};

use crate::entity::{EntityGraph, EntityId, EntityRef};
use crate::model::modifiers::format_modifiers;
use crate::model::nav::NavNode;
use crate::model::{DocNode, DocTree, EntityKind};
use crate::resolve::UNRESOLVED_LINK;

/// Output format selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Format {
    Markdown,
    Html,
}

impl Format {
    fn writer(self) -> Box<dyn Markup> {
        match self {
            Format::Markdown => Box::new(markdown::MarkdownWriter::new()),
            Format::Html => Box::new(html::HtmlWriter::new()),
        }
    }
}

/// Minimal markup writer contract shared by all formats.
pub trait Markup {
    fn extension(&self) -> &'static str;
    fn begin(&mut self, title: &str);
    fn header(&mut self, text: &str, level: u8);
    fn paragraph(&mut self, text: &str);
    /// A labeled inline link, e.g. `Type: <a ...>int</a>`.
    fn link_paragraph(&mut self, label: &str, title: &str, url: &str);
    fn code(&mut self, code: &str);
    fn list(&mut self, items: &[String]);
    fn link_list(&mut self, items: &[(String, String)]);
    fn horizontal_rule(&mut self);
    fn finish(&mut self) -> String;
}

/// Kinds that get a page of their own.
fn has_page(kind: EntityKind) -> bool {
    kind.is_container()
}

/// Render every container page plus the manifest into `out_dir`. Returns
/// the number of pages written.
pub fn render_docs(
    tree: &DocTree,
    graph: &EntityGraph,
    format: Format,
    out_dir: &Path,
) -> Result<usize> {
    fs::create_dir_all(out_dir)
        .with_context(|| format!("creating output directory {}", out_dir.display()))?;

    let pages: Vec<EntityId> = graph
        .root()
        .descendants()
        .filter(|e| has_page(e.get().kind))
        .map(|e| e.id())
        .collect();

    pages.par_iter().try_for_each(|&id| -> Result<()> {
        let entity = graph.at(id);
        let mut writer = format.writer();
        compose_page(tree, entity, writer.as_mut());
        let file = out_dir.join(format!("{}{}", entity.get().link, writer.extension()));
        debug!(page = %file.display(), "writing page");
        fs::write(&file, writer.finish())
            .with_context(|| format!("writing page {}", file.display()))?;
        Ok(())
    })?;

    let manifest = out_dir.join("manifest.json");
    fs::write(&manifest, graph.to_json()?)
        .with_context(|| format!("writing manifest {}", manifest.display()))?;

    info!(pages = pages.len(), "rendered documentation");
    Ok(pages.len())
}

/// Compose one page for a container entity.
fn compose_page(tree: &DocTree, entity: EntityRef<'_>, w: &mut dyn Markup) {
    let ext = w.extension();
    let data = entity.get();
    let title = if data.full_name.is_empty() {
        "Index".to_string()
    } else {
        data.full_name.clone()
    };
    w.begin(&title);
    w.header(&title, 1);

    let node = data.source.map(|id| tree.node(id));
    if let Some(node) = node {
        if let Some(signature) = &node.signature {
            w.code(&declaration_line(node, signature));
        }
        if let Some(doc) = &node.doc {
            w.paragraph(doc);
        }
    }

    // Nested container pages, grouped by kind.
    for (label, kind) in [
        ("Namespaces", EntityKind::Namespace),
        ("Classes", EntityKind::Class),
        ("Structs", EntityKind::Struct),
        ("Interfaces", EntityKind::Interface),
        ("Enums", EntityKind::Enum),
    ] {
        let entries: Vec<(String, String)> = entity
            .children()
            .into_iter()
            .filter(|c| c.get().kind == kind)
            .map(|c| {
                let child = c.get();
                (child.name.clone(), format!("{}{}", child.link, ext))
            })
            .collect();
        if !entries.is_empty() {
            w.header(label, 2);
            w.link_list(&entries);
        }
    }

    // Enum values render as a plain list on the enum page.
    let values: Vec<String> = entity
        .children()
        .into_iter()
        .filter(|c| c.get().kind == EntityKind::EnumValue)
        .filter_map(|c| c.get().source.map(|id| tree.node(id)))
        .map(|n| n.signature.clone().unwrap_or_else(|| n.name.clone()))
        .collect();
    if !values.is_empty() {
        w.header("Values", 2);
        w.list(&values);
    }

    // Member sections.
    for (label, kinds) in [
        ("Fields", &[EntityKind::Field][..]),
        ("Properties", &[EntityKind::Property][..]),
        ("Indexers", &[EntityKind::Indexer][..]),
        (
            "Methods",
            &[
                EntityKind::Method,
                EntityKind::Constructor,
                EntityKind::Operator,
            ][..],
        ),
    ] {
        let members: Vec<EntityRef<'_>> = entity
            .children()
            .into_iter()
            .filter(|c| kinds.contains(&c.get().kind))
            .collect();
        if members.is_empty() {
            continue;
        }
        w.horizontal_rule();
        w.header(label, 2);
        for member in members {
            compose_member(tree, member, w);
        }
    }
}

/// One member section: heading, declaration block, type link, doc text.
fn compose_member(tree: &DocTree, member: EntityRef<'_>, w: &mut dyn Markup) {
    let ext = w.extension();
    let data = member.get();
    let node = match data.source.map(|id| tree.node(id)) {
        Some(node) => node,
        None => return,
    };

    let mut heading = node.name.clone();
    if let Some(params) = &node.params {
        heading.push_str(params);
    }
    w.header(&heading, 3);

    if let Some(signature) = &node.signature {
        w.code(&member_declaration(node, signature));
    }

    // Properties and indexers keep their type text as the signature; link
    // it when the type resolves to a documented node.
    if matches!(node.kind, EntityKind::Property | EntityKind::Indexer) {
        if let Some(type_text) = &node.signature {
            let url = member.get_link(type_text);
            if url != UNRESOLVED_LINK {
                w.link_paragraph("Type", type_text, &format!("{}{}", url, ext));
            }
        }
    }

    if let Some(doc) = &node.doc {
        w.paragraph(doc);
    }
}

/// `modifiers signature` for a container declaration line.
fn declaration_line(node: &DocNode, signature: &str) -> String {
    let modifiers = format_modifiers(&node.modifiers);
    if modifiers.is_empty() {
        signature.to_string()
    } else {
        format!("{} {}", modifiers, signature)
    }
}

/// Full member declaration: modifiers, signature, name where the signature
/// is bare type text, and the accessor summary for properties/indexers.
fn member_declaration(node: &DocNode, signature: &str) -> String {
    let mut line = String::new();
    let modifiers = format_modifiers(&node.modifiers);
    if !modifiers.is_empty() {
        line.push_str(&modifiers);
        line.push(' ');
    }
    line.push_str(signature);
    match node.kind {
        EntityKind::Property => {
            line.push(' ');
            line.push_str(&node.name);
        }
        EntityKind::Indexer => {
            line.push(' ');
            line.push_str("this");
            if let Some(params) = &node.params {
                line.push_str(params);
            }
        }
        _ => {}
    }
    if let Some(summary) = accessor_summary(node) {
        line.push(' ');
        line.push_str(&summary);
    }
    line
}

/// `{ get; private set; }` style accessor presence summary.
fn accessor_summary(node: &DocNode) -> Option<String> {
    if !matches!(node.kind, EntityKind::Property | EntityKind::Indexer) {
        return None;
    }
    let mut parts = Vec::new();
    if let Some(getter) = &node.getter {
        let modifiers = format_modifiers(&getter.modifiers);
        if modifiers.is_empty() {
            parts.push("get;".to_string())
        } else {
            parts.push(format!("{} get;", modifiers))
        }
    }
    if let Some(setter) = &node.setter {
        let modifiers = format_modifiers(&setter.modifiers);
        if modifiers.is_empty() {
            parts.push("set;".to_string())
        } else {
            parts.push(format!("{} set;", modifiers))
        }
    }
    if parts.is_empty() {
        None
    } else {
        Some(format!("{{ {} }}", parts.join(" ")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::visibility_predicate;
    use crate::model::modifiers::Modifier;
    use crate::syntax::lower_source;
    use crate::utils::links::link_from_name;
    use std::collections::BTreeSet;

    const FIXTURE: &str = r#"
namespace Acme {
    /// <summary>A counter.</summary>
    public class Counter {
        public int count = 0;

        /// <summary>Current value.</summary>
        public int Value { get; private set; }

        public int Add(int amount) { return 0; }
    }

    public enum Color { Red, Green = 3 }
}
"#;

    fn build() -> (DocTree, EntityGraph) {
        let decls = lower_source(FIXTURE).unwrap();
        let tree = DocTree::build([decls.as_slice()]).unwrap();
        let graph = EntityGraph::project(
            &tree,
            visibility_predicate(BTreeSet::from([Modifier::Public])),
            |node| link_from_name(&node.full_name, node.params.as_deref()),
        );
        (tree, graph)
    }

    #[test]
    fn renders_markdown_pages_to_disk() {
        let (tree, graph) = build();
        let dir = tempfile::tempdir().unwrap();
        let pages = render_docs(&tree, &graph, Format::Markdown, dir.path()).unwrap();
        // Root, Acme, Counter, Color.
        assert_eq!(pages, 4);

        let counter = std::fs::read_to_string(dir.path().join("acme-counter.md")).unwrap();
        assert!(counter.contains("# Acme.Counter"));
        assert!(counter.contains("A counter."));
        assert!(counter.contains("public int Value { get; private set; }"));
        assert!(counter.contains("Add(int amount)"));

        let manifest = std::fs::read_to_string(dir.path().join("manifest.json")).unwrap();
        assert!(manifest.contains("\"fullName\": \"Acme.Counter\""));
    }

    #[test]
    fn renders_html_pages_to_disk() {
        let (tree, graph) = build();
        let dir = tempfile::tempdir().unwrap();
        render_docs(&tree, &graph, Format::Html, dir.path()).unwrap();

        let index = std::fs::read_to_string(dir.path().join("index.html")).unwrap();
        assert!(index.contains("<!DOCTYPE html>"));
        assert!(index.contains("acme.html"));

        let color = std::fs::read_to_string(dir.path().join("acme-color.html")).unwrap();
        assert!(color.contains("Green = 3"));
    }

    #[test]
    fn accessor_summary_reflects_presence() {
        let (tree, _) = build();
        let value = tree
            .root()
            .descendants()
            .find(|n| n.get().full_name == "Acme.Counter.Value")
            .unwrap();
        assert_eq!(
            accessor_summary(value.get()).as_deref(),
            Some("{ get; private set; }")
        );
    }
}
