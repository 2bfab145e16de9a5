// sharpdoc CLI: discover C# sources, build the documentation tree, render.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use sharpdoc::backend::{render_docs, Format};
use sharpdoc::entity::{visibility_predicate, EntityGraph};
use sharpdoc::language;
use sharpdoc::model::modifiers::Modifier;
use sharpdoc::model::DocTree;
use sharpdoc::syntax::{lower_source, Declaration};
use sharpdoc::utils::links::link_from_name;

/// Generate API documentation from C# sources
#[derive(Parser, Debug)]
#[command(name = "sharpdoc")]
#[command(version)]
#[command(about = "Generate API documentation from C# sources")]
struct Cli {
    /// Source directory (or a single .cs file)
    input: PathBuf,

    /// Output directory for rendered pages
    #[arg(long, short, default_value = "docs")]
    output: PathBuf,

    /// Output format
    #[arg(long, value_enum, default_value = "markdown")]
    format: Format,

    /// Visibilities to document, comma separated
    /// (public, internal, protected, protected-internal, private)
    #[arg(long, value_delimiter = ',', default_value = "public")]
    visibility: Vec<String>,
}

/// Collect the `.cs` files under a directory, or the file itself.
fn discover_sources(input: &Path) -> Result<Vec<PathBuf>> {
    if input.is_file() {
        return Ok(vec![input.to_path_buf()]);
    }
    let pattern = format!("{}/**/*.cs", input.display());
    let mut files: Vec<PathBuf> = glob::glob(&pattern)
        .with_context(|| format!("bad glob pattern {}", pattern))?
        .filter_map(|entry| entry.ok())
        .filter(|path| language::is_source_file(path))
        .collect();
    files.sort();
    Ok(files)
}

fn parse_visibility_filter(tokens: &[String]) -> Result<BTreeSet<Modifier>> {
    let mut allowed = BTreeSet::new();
    for token in tokens {
        match Modifier::visibility_token(token) {
            Some(visibility) => {
                allowed.insert(visibility);
            }
            None => bail!("unknown visibility {:?}", token),
        }
    }
    Ok(allowed)
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let allowed = parse_visibility_filter(&cli.visibility)?;

    let files = discover_sources(&cli.input)?;
    if files.is_empty() {
        bail!("no .cs files found under {}", cli.input.display());
    }
    info!(files = files.len(), "parsing sources");

    let mut units: Vec<Vec<Declaration>> = Vec::new();
    for path in &files {
        let content =
            fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        match lower_source(&content) {
            Ok(decls) => units.push(decls),
            Err(error) => {
                // A file the parser cannot handle degrades the output, it
                // does not abort the run.
                warn!(file = %path.display(), %error, "skipping unparseable file");
            }
        }
    }

    let tree = DocTree::build(units.iter().map(|unit| unit.as_slice()))?;
    info!(nodes = tree.len(), "documentation tree built");

    let graph = EntityGraph::project(&tree, visibility_predicate(allowed), |node| {
        link_from_name(&node.full_name, node.params.as_deref())
    });

    let pages = render_docs(&tree, &graph, cli.format, &cli.output)?;
    info!(
        pages,
        output = %cli.output.display(),
        "documentation generated"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn visibility_filter_parses_known_names() {
        let allowed =
            parse_visibility_filter(&["public".to_string(), "protected-internal".to_string()])
                .unwrap();
        assert!(allowed.contains(&Modifier::Public));
        assert!(allowed.contains(&Modifier::ProtectedInternal));
    }

    #[test]
    fn visibility_filter_rejects_unknown_names() {
        assert!(parse_visibility_filter(&["loud".to_string()]).is_err());
    }

    #[test]
    fn discover_finds_nested_sources() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a/b");
        fs::create_dir_all(&nested).unwrap();
        fs::write(nested.join("Foo.cs"), "class Foo { }").unwrap();
        fs::write(dir.path().join("README.md"), "not source").unwrap();

        let files = discover_sources(dir.path()).unwrap();
        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("a/b/Foo.cs"));
    }
}
