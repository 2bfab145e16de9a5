// Markdown backend.

use super::Markup;

pub struct MarkdownWriter {
    buffer: String,
}

impl MarkdownWriter {
    pub fn new() -> MarkdownWriter {
        MarkdownWriter {
            buffer: String::new(),
        }
    }

    fn line(&mut self, text: &str) {
        self.buffer.push_str(text);
        self.buffer.push('\n');
    }
}

impl Default for MarkdownWriter {
    fn default() -> Self {
        MarkdownWriter::new()
    }
}

impl Markup for MarkdownWriter {
    fn extension(&self) -> &'static str {
        ".md"
    }

    fn begin(&mut self, _title: &str) {}

    fn header(&mut self, text: &str, level: u8) {
        let level = level.clamp(1, 6) as usize;
        self.line(&format!("{} {}", "#".repeat(level), text));
        self.line("");
    }

    fn paragraph(&mut self, text: &str) {
        self.line(text);
        self.line("");
    }

    fn link_paragraph(&mut self, label: &str, title: &str, url: &str) {
        self.line(&format!("{}: [{}]({})", label, title, url));
        self.line("");
    }

    fn code(&mut self, code: &str) {
        self.line("```csharp");
        self.line(code);
        self.line("```");
        self.line("");
    }

    fn list(&mut self, items: &[String]) {
        for item in items {
            self.line(&format!("- {}", item));
        }
        self.line("");
    }

    fn link_list(&mut self, items: &[(String, String)]) {
        for (title, url) in items {
            self.line(&format!("- [{}]({})", title, url));
        }
        self.line("");
    }

    fn horizontal_rule(&mut self) {
        self.line("---");
        self.line("");
    }

    fn finish(&mut self) -> String {
        std::mem::take(&mut self.buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headers_and_lists() {
        let mut w = MarkdownWriter::new();
        w.begin("T");
        w.header("Title", 1);
        w.link_list(&[("Foo".to_string(), "foo.md".to_string())]);
        let out = w.finish();
        assert!(out.starts_with("# Title\n"));
        assert!(out.contains("- [Foo](foo.md)"));
    }

    #[test]
    fn code_blocks_are_fenced() {
        let mut w = MarkdownWriter::new();
        w.code("public class Foo");
        let out = w.finish();
        assert!(out.contains("```csharp\npublic class Foo\n```"));
    }
}
