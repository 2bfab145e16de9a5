//! Tree-sitter language configuration.
//!
//! All tree-sitter setup goes through here so the grammar version is pinned
//! in exactly one place.

use anyhow::{anyhow, Result};

/// The C# grammar.
pub fn csharp() -> tree_sitter::Language {
    tree_sitter_c_sharp::LANGUAGE.into()
}

/// A parser configured for C#.
pub fn parser() -> Result<tree_sitter::Parser> {
    let mut parser = tree_sitter::Parser::new();
    parser
        .set_language(&csharp())
        .map_err(|e| anyhow!("failed to load C# grammar: {}", e))?;
    Ok(parser)
}

/// Whether a path looks like a C# source file.
pub fn is_source_file(path: &std::path::Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext == "cs")
}
