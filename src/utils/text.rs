// Text normalization helpers.
//
// Name comparison in the resolver is whitespace-insensitive, and
// documentation text arrives as raw `///` trivia with XML doc tags.

use once_cell::sync::Lazy;
use regex::Regex;

static XML_DOC_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"</?[A-Za-z][^>]*>").expect("static regex"));

static BLANK_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").expect("static regex"));

/// Remove all whitespace. Used for whitespace-insensitive name comparison,
/// so `List<int >` and `List<int>` resolve to the same node.
pub fn despace(input: &str) -> String {
    input.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Collapse a multi-line signature onto a single line.
pub fn single_line(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut last_was_space = false;
    for c in input.chars() {
        if c.is_whitespace() {
            if !last_was_space {
                out.push(' ');
            }
            last_was_space = true;
        } else {
            out.push(c);
            last_was_space = false;
        }
    }
    out.trim().to_string()
}

/// Turn raw leading-comment trivia into display text: strips `///` markers
/// and XML documentation tags, keeps paragraph breaks.
pub fn clean_doc(raw: &str) -> String {
    let stripped: Vec<String> = raw
        .lines()
        .map(|line| {
            let line = line.trim_start();
            let line = line
                .strip_prefix("///")
                .or_else(|| line.strip_prefix("/**"))
                .or_else(|| line.strip_prefix("*/"))
                .or_else(|| line.strip_prefix("*"))
                .unwrap_or(line);
            let line = line.strip_suffix("*/").unwrap_or(line);
            line.trim().to_string()
        })
        .collect();
    let joined = stripped.join("\n");
    let untagged = XML_DOC_TAG.replace_all(&joined, "");
    let collapsed = BLANK_RUN.replace_all(untagged.trim(), "\n\n");
    collapsed
        .lines()
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn despace_removes_all_whitespace() {
        assert_eq!(despace("List< int , string >"), "List<int,string>");
        assert_eq!(despace("N.Foo.Bar"), "N.Foo.Bar");
    }

    #[test]
    fn single_line_collapses_runs() {
        assert_eq!(single_line("int\n    Add(int a,\n int b)"), "int Add(int a, int b)");
    }

    #[test]
    fn clean_doc_strips_markers_and_tags() {
        let raw = "/// <summary>\n/// Adds two numbers.\n/// </summary>";
        assert_eq!(clean_doc(raw), "Adds two numbers.");
    }

    #[test]
    fn clean_doc_keeps_plain_text() {
        assert_eq!(clean_doc("/// Just a note."), "Just a note.");
    }
}
