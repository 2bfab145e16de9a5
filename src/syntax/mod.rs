// Declaration lowering.
//
// This module is the boundary to the parser: it walks a tree-sitter parse
// tree and lowers each documentable declaration into an owned `Declaration`
// record. Everything downstream of this module works on `Declaration` values
// and never touches tree-sitter types.

mod helpers;

use anyhow::{anyhow, Result};
use tree_sitter::Node;

use crate::language;
use crate::utils::text::single_line;
use helpers::{
    base_list_text, children_of, doc_comment, find_child, modifier_tokens, name_before, node_text,
    type_before, type_parameters_text,
};

/// Declaration kinds the model knows how to build. Anything the lowering
/// does not recognize never reaches the builders; `Ignored` exists so hosts
/// constructing declarations directly still get an explicit skip arm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclKind {
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
    Ignored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessorKind {
    Get,
    Set,
}

/// A raw getter or setter as found in an accessor list.
#[derive(Debug, Clone)]
pub struct RawAccessor {
    pub kind: AccessorKind,
    pub modifiers: Vec<String>,
}

/// One declaration as supplied by the parser: kind tag, identifier text,
/// raw modifier tokens, leading documentation, signature text, and (for
/// container kinds) the direct child declarations in source order.
#[derive(Debug, Clone)]
pub struct Declaration {
    pub kind: DeclKind,
    pub name: String,
    pub modifiers: Vec<String>,
    pub doc: Option<String>,
    pub signature: Option<String>,
    /// Raw parameter list text for overloadable members.
    pub params: Option<String>,
    pub accessors: Vec<RawAccessor>,
    pub children: Vec<Declaration>,
}

impl Declaration {
    pub fn new(kind: DeclKind, name: impl Into<String>) -> Declaration {
        Declaration {
            kind,
            name: name.into(),
            modifiers: Vec::new(),
            doc: None,
            signature: None,
            params: None,
            accessors: Vec::new(),
            children: Vec::new(),
        }
    }
}

/// Parse one compilation unit and lower its top-level declarations.
pub fn lower_source(content: &str) -> Result<Vec<Declaration>> {
    let mut parser = language::parser()?;
    let tree = parser
        .parse(content, None)
        .ok_or_else(|| anyhow!("tree-sitter failed to parse compilation unit"))?;
    Ok(lower_scope(&tree.root_node(), content))
}

/// Lower every declaration found among the direct children of a scope node
/// (compilation unit, namespace, or type body).
fn lower_scope(node: &Node, src: &str) -> Vec<Declaration> {
    let mut cursor = node.walk();
    node.children(&mut cursor)
        .filter_map(|child| lower_node(&child, src))
        .collect()
}

/// Lower the declarations of a container body: block-scoped containers keep
/// them in a `declaration_list`, file-scoped namespaces inline them.
fn lower_body(node: &Node, src: &str) -> Vec<Declaration> {
    match find_child(node, "declaration_list") {
        Some(body) => lower_scope(&body, src),
        None => lower_scope(node, src),
    }
}

fn lower_node(node: &Node, src: &str) -> Option<Declaration> {
    match node.kind() {
        "namespace_declaration" | "file_scoped_namespace_declaration" => {
            lower_namespace(node, src)
        }
        "class_declaration" => lower_type(node, src, DeclKind::Class, "class"),
        "struct_declaration" => lower_type(node, src, DeclKind::Struct, "struct"),
        "interface_declaration" => lower_type(node, src, DeclKind::Interface, "interface"),
        "enum_declaration" => lower_enum(node, src),
        "field_declaration" => lower_field(node, src),
        "property_declaration" => lower_property(node, src),
        "indexer_declaration" => lower_indexer(node, src),
        "method_declaration" => lower_method(node, src),
        "constructor_declaration" => lower_constructor(node, src),
        "operator_declaration" => lower_operator(node, src),
        "conversion_operator_declaration" => lower_conversion_operator(node, src),
        _ => None,
    }
}

fn lower_namespace(node: &Node, src: &str) -> Option<Declaration> {
    let name_node = children_of(node)
        .into_iter()
        .find(|c| c.kind() == "qualified_name" || c.kind() == "identifier")?;
    let name = node_text(&name_node, src);
    let mut decl = Declaration::new(DeclKind::Namespace, &name);
    decl.signature = Some(format!("namespace {}", name));
    decl.doc = doc_comment(node, src);
    decl.children = lower_body(node, src);
    Some(decl)
}

fn lower_type(node: &Node, src: &str, kind: DeclKind, keyword: &str) -> Option<Declaration> {
    let name_node = find_child(node, "identifier")?;
    let name = node_text(&name_node, src);

    let mut signature = format!("{} {}", keyword, name);
    if let Some(type_params) = type_parameters_text(node, src) {
        signature.push_str(&type_params);
    }
    if let Some(bases) = base_list_text(node, src) {
        signature.push_str(" : ");
        signature.push_str(&bases);
    }

    let mut decl = Declaration::new(kind, &name);
    decl.modifiers = modifier_tokens(node, src);
    decl.signature = Some(single_line(&signature));
    decl.doc = doc_comment(node, src);
    decl.children = lower_body(node, src);
    Some(decl)
}

fn lower_enum(node: &Node, src: &str) -> Option<Declaration> {
    let name_node = find_child(node, "identifier")?;
    let name = node_text(&name_node, src);

    let mut signature = format!("enum {}", name);
    if let Some(bases) = base_list_text(node, src) {
        signature.push_str(" : ");
        signature.push_str(&bases);
    }

    let mut decl = Declaration::new(DeclKind::Enum, &name);
    decl.modifiers = modifier_tokens(node, src);
    decl.signature = Some(signature);
    decl.doc = doc_comment(node, src);
    if let Some(body) = find_child(node, "enum_member_declaration_list") {
        let mut cursor = body.walk();
        decl.children = body
            .children(&mut cursor)
            .filter(|c| c.kind() == "enum_member_declaration")
            .filter_map(|c| lower_enum_value(&c, src))
            .collect();
    }
    Some(decl)
}

fn lower_enum_value(node: &Node, src: &str) -> Option<Declaration> {
    let name_node = find_child(node, "identifier")?;
    let name = node_text(&name_node, src);

    let children = children_of(node);
    let mut signature = name.clone();
    if let Some(equals) = children.iter().position(|c| c.kind() == "=") {
        let value: String = children[equals + 1..]
            .iter()
            .map(|c| node_text(c, src))
            .collect::<Vec<_>>()
            .join("");
        let value = value.trim();
        if !value.is_empty() {
            signature.push_str(" = ");
            signature.push_str(value);
        }
    }

    let mut decl = Declaration::new(DeclKind::EnumValue, &name);
    decl.signature = Some(signature);
    decl.doc = doc_comment(node, src);
    Some(decl)
}

fn lower_field(node: &Node, src: &str) -> Option<Declaration> {
    let var_declaration = find_child(node, "variable_declaration")?;
    let declarator = find_child(&var_declaration, "variable_declarator")?;
    let name_node = find_child(&declarator, "identifier")?;
    let name = node_text(&name_node, src);

    let var_children = children_of(&var_declaration);
    let field_type = var_children
        .iter()
        .find(|c| helpers::is_type_kind(c.kind()))
        .map(|c| node_text(c, src).trim().to_string());

    let mut signature = format!("{} {}", field_type.as_deref().unwrap_or("var"), name);
    let decl_children = children_of(&declarator);
    if let Some(equals) = decl_children.iter().position(|c| c.kind() == "=") {
        let init: String = decl_children[equals + 1..]
            .iter()
            .map(|c| node_text(c, src))
            .collect::<Vec<_>>()
            .join("");
        let init = init.trim();
        if !init.is_empty() {
            signature.push_str(" = ");
            signature.push_str(init);
        }
    }

    let mut decl = Declaration::new(DeclKind::Field, &name);
    decl.modifiers = modifier_tokens(node, src);
    decl.signature = Some(single_line(&signature));
    decl.doc = doc_comment(node, src);
    Some(decl)
}

fn lower_property(node: &Node, src: &str) -> Option<Declaration> {
    let children = children_of(node);
    let anchor = children
        .iter()
        .position(|c| c.kind() == "accessor_list" || c.kind() == "arrow_expression_clause")
        .unwrap_or(children.len());
    let name_node = name_before(&children, anchor)?;
    let name = node_text(&name_node, src);
    let name_index = children
        .iter()
        .position(|c| c.id() == name_node.id())
        .unwrap_or(anchor);

    let mut decl = Declaration::new(DeclKind::Property, &name);
    decl.modifiers = modifier_tokens(node, src);
    decl.signature = type_before(&children, name_index, src);
    decl.doc = doc_comment(node, src);
    decl.accessors = lower_accessors(node, src);
    Some(decl)
}

fn lower_indexer(node: &Node, src: &str) -> Option<Declaration> {
    let children = children_of(node);
    let this_index = children.iter().position(|c| c.kind() == "this")?;

    let mut decl = Declaration::new(DeclKind::Indexer, "this[]");
    decl.modifiers = modifier_tokens(node, src);
    decl.signature = type_before(&children, this_index, src);
    decl.params = find_child(node, "bracketed_parameter_list").map(|p| node_text(&p, src));
    decl.doc = doc_comment(node, src);
    decl.accessors = lower_accessors(node, src);
    Some(decl)
}

/// Accessors come from an explicit accessor list; an expression-bodied
/// shorthand means a getter and nothing else.
fn lower_accessors(node: &Node, src: &str) -> Vec<RawAccessor> {
    if let Some(list) = find_child(node, "accessor_list") {
        let mut cursor = list.walk();
        return list
            .children(&mut cursor)
            .filter(|c| c.kind() == "accessor_declaration")
            .filter_map(|accessor| {
                let kind = if find_child(&accessor, "get").is_some() {
                    AccessorKind::Get
                } else if find_child(&accessor, "set").is_some()
                    || find_child(&accessor, "init").is_some()
                {
                    AccessorKind::Set
                } else {
                    return None;
                };
                Some(RawAccessor {
                    kind,
                    modifiers: modifier_tokens(&accessor, src),
                })
            })
            .collect();
    }
    if find_child(node, "arrow_expression_clause").is_some() {
        return vec![RawAccessor {
            kind: AccessorKind::Get,
            modifiers: Vec::new(),
        }];
    }
    Vec::new()
}

fn lower_method(node: &Node, src: &str) -> Option<Declaration> {
    let children = children_of(node);
    let param_index = children.iter().position(|c| c.kind() == "parameter_list")?;
    let name_node = name_before(&children, param_index)?;
    let name = node_text(&name_node, src);
    let name_index = children
        .iter()
        .position(|c| c.id() == name_node.id())
        .unwrap_or(param_index);

    let return_type = type_before(&children, name_index, src).unwrap_or_else(|| "void".to_string());
    let params = node_text(&children[param_index], src);
    let type_params = type_parameters_text(node, src).unwrap_or_default();

    let mut decl = Declaration::new(DeclKind::Method, &name);
    decl.modifiers = modifier_tokens(node, src);
    decl.signature = Some(single_line(&format!(
        "{} {}{}{}",
        return_type, name, type_params, params
    )));
    decl.params = Some(params);
    decl.doc = doc_comment(node, src);
    Some(decl)
}

fn lower_constructor(node: &Node, src: &str) -> Option<Declaration> {
    let name_node = find_child(node, "identifier")?;
    let name = node_text(&name_node, src);
    let params = find_child(node, "parameter_list")
        .map(|p| node_text(&p, src))
        .unwrap_or_else(|| "()".to_string());

    let mut decl = Declaration::new(DeclKind::Constructor, &name);
    decl.modifiers = modifier_tokens(node, src);
    decl.signature = Some(single_line(&format!("{}{}", name, params)));
    decl.params = Some(params);
    decl.doc = doc_comment(node, src);
    Some(decl)
}

fn lower_operator(node: &Node, src: &str) -> Option<Declaration> {
    let children = children_of(node);
    let operator_index = children
        .iter()
        .position(|c| node_text(c, src) == "operator")?;
    let symbol = children
        .get(operator_index + 1)
        .map(|c| node_text(c, src))?;
    let name = format!("operator {}", symbol);

    let return_type = children[..operator_index]
        .iter()
        .find(|c| helpers::is_type_kind(c.kind()))
        .map(|c| node_text(c, src))
        .unwrap_or_else(|| "void".to_string());
    let params = find_child(node, "parameter_list")
        .map(|p| node_text(&p, src))
        .unwrap_or_else(|| "()".to_string());

    let mut decl = Declaration::new(DeclKind::Operator, &name);
    decl.modifiers = modifier_tokens(node, src);
    decl.signature = Some(single_line(&format!(
        "{} operator {}{}",
        return_type, symbol, params
    )));
    decl.params = Some(params);
    decl.doc = doc_comment(node, src);
    Some(decl)
}

fn lower_conversion_operator(node: &Node, src: &str) -> Option<Declaration> {
    let children = children_of(node);
    let conversion = children
        .iter()
        .map(|c| node_text(c, src))
        .find(|text| text == "implicit" || text == "explicit")?;
    let operator_index = children
        .iter()
        .position(|c| node_text(c, src) == "operator")?;
    let target_type = children[operator_index + 1..]
        .iter()
        .find(|c| helpers::is_type_kind(c.kind()))
        .map(|c| node_text(c, src))
        .unwrap_or_else(|| "unknown".to_string());
    let name = format!("{} operator {}", conversion, target_type);
    let params = find_child(node, "parameter_list")
        .map(|p| node_text(&p, src))
        .unwrap_or_else(|| "()".to_string());

    let mut decl = Declaration::new(DeclKind::Operator, &name);
    decl.modifiers = modifier_tokens(node, src);
    decl.signature = Some(single_line(&format!(
        "{} operator {}{}",
        conversion, target_type, params
    )));
    decl.params = Some(params);
    decl.doc = doc_comment(node, src);
    Some(decl)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lower(source: &str) -> Vec<Declaration> {
        lower_source(source).expect("fixture parses")
    }

    #[test]
    fn lowers_namespace_with_class() {
        let decls = lower("namespace N { public class Foo { } }");
        assert_eq!(decls.len(), 1);
        assert_eq!(decls[0].kind, DeclKind::Namespace);
        assert_eq!(decls[0].name, "N");
        assert_eq!(decls[0].children.len(), 1);
        let class = &decls[0].children[0];
        assert_eq!(class.kind, DeclKind::Class);
        assert_eq!(class.name, "Foo");
        assert_eq!(class.modifiers, vec!["public".to_string()]);
        assert_eq!(class.signature.as_deref(), Some("class Foo"));
    }

    #[test]
    fn lowers_file_scoped_namespace() {
        let decls = lower("namespace N;\n\npublic class Foo { }\n");
        assert_eq!(decls.len(), 1);
        assert_eq!(decls[0].kind, DeclKind::Namespace);
        assert_eq!(decls[0].name, "N");
        assert_eq!(decls[0].children.len(), 1);
        assert_eq!(decls[0].children[0].name, "Foo");
    }

    #[test]
    fn lowers_doc_comment() {
        let source = "namespace N {\n/// <summary>\n/// A widget.\n/// </summary>\npublic class Foo { }\n}";
        let decls = lower(source);
        let class = &decls[0].children[0];
        assert_eq!(class.doc.as_deref(), Some("A widget."));
    }

    #[test]
    fn lowers_property_accessors() {
        let source = "class Foo { public int Count { get; private set; } }";
        let decls = lower(source);
        let property = &decls[0].children[0];
        assert_eq!(property.kind, DeclKind::Property);
        assert_eq!(property.name, "Count");
        assert_eq!(property.signature.as_deref(), Some("int"));
        assert_eq!(property.accessors.len(), 2);
        let setter = property
            .accessors
            .iter()
            .find(|a| a.kind == AccessorKind::Set)
            .expect("setter");
        assert_eq!(setter.modifiers, vec!["private".to_string()]);
    }

    #[test]
    fn expression_body_means_getter_only() {
        let source = "class Foo { public int Doubled => 2 * 2; }";
        let decls = lower(source);
        let property = &decls[0].children[0];
        assert_eq!(property.accessors.len(), 1);
        assert_eq!(property.accessors[0].kind, AccessorKind::Get);
    }

    #[test]
    fn lowers_method_with_params() {
        let source = "class Foo { public int Add(int a, int b) { return a + b; } }";
        let decls = lower(source);
        let method = &decls[0].children[0];
        assert_eq!(method.kind, DeclKind::Method);
        assert_eq!(method.name, "Add");
        assert_eq!(method.signature.as_deref(), Some("int Add(int a, int b)"));
        assert_eq!(method.params.as_deref(), Some("(int a, int b)"));
    }

    #[test]
    fn lowers_enum_values() {
        let source = "enum Color { Red, Green = 3 }";
        let decls = lower(source);
        assert_eq!(decls[0].kind, DeclKind::Enum);
        let values: Vec<&str> = decls[0].children.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(values, vec!["Red", "Green"]);
        assert_eq!(decls[0].children[1].signature.as_deref(), Some("Green = 3"));
    }

    #[test]
    fn skips_using_directives() {
        let decls = lower("using System;\nnamespace N { }");
        assert_eq!(decls.len(), 1);
        assert_eq!(decls[0].kind, DeclKind::Namespace);
    }

    #[test]
    fn partial_class_across_files_builds_one_record() {
        let first = lower(include_str!("../../test_samples/Library.cs"));
        let second = lower(include_str!("../../test_samples/Library.Extra.cs"));

        let tree = crate::model::DocTree::build([first.as_slice(), second.as_slice()]).unwrap();

        use crate::model::nav::NavNode;
        let inventories: Vec<_> = tree
            .root()
            .descendants()
            .filter(|n| n.get().full_name == "Acme.Collections.Inventory")
            .collect();
        assert_eq!(inventories.len(), 1);

        let member_names: Vec<&str> = inventories[0]
            .children()
            .iter()
            .map(|c| c.get().name.as_str())
            .collect();
        // Members of both fragments, nested type first, two Put overloads.
        assert_eq!(
            member_names,
            vec!["Item", "capacity", "Count", "this[]", "Put", "Put"]
        );
    }

    #[test]
    fn lowers_field_with_initializer() {
        let source = "class Foo { private int count = 1; }";
        let decls = lower(source);
        let field = &decls[0].children[0];
        assert_eq!(field.kind, DeclKind::Field);
        assert_eq!(field.name, "count");
        assert_eq!(field.signature.as_deref(), Some("int count = 1"));
    }
}
