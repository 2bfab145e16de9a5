// HTML backend.
//
// Emits standalone pages with a highlight.js include for code blocks.

use super::Markup;

const INCLUDES: &str = concat!(
    "<link rel=\"stylesheet\" ",
    "href=\"https://cdnjs.cloudflare.com/ajax/libs/highlight.js/9.12.0/styles/default.min.css\">",
    "<script src=\"https://cdnjs.cloudflare.com/ajax/libs/highlight.js/9.12.0/highlight.min.js\"></script>"
);

const SCRIPT: &str = "\
var code = document.getElementsByTagName('code');\n\
for (i = 0; i < code.length; i++) hljs.highlightBlock(code[i]);";

/// Escape text content for HTML.
fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

pub struct HtmlWriter {
    buffer: String,
}

impl HtmlWriter {
    pub fn new() -> HtmlWriter {
        HtmlWriter {
            buffer: String::new(),
        }
    }

    fn line(&mut self, text: &str) {
        self.buffer.push_str(text);
        self.buffer.push('\n');
    }
}

impl Default for HtmlWriter {
    fn default() -> Self {
        HtmlWriter::new()
    }
}

impl Markup for HtmlWriter {
    fn extension(&self) -> &'static str {
        ".html"
    }

    fn begin(&mut self, title: &str) {
        self.line("<!DOCTYPE html>");
        self.line(&format!("<html><head><title>{}</title>", escape(title)));
        self.line("<meta charset=\"utf-8\">");
        self.line(INCLUDES);
        self.line("</head><body>");
    }

    fn header(&mut self, text: &str, level: u8) {
        let level = level.clamp(1, 6);
        self.line(&format!("<h{}>{}</h{}>", level, escape(text), level));
    }

    fn paragraph(&mut self, text: &str) {
        self.line(&format!("<p>{}</p>", escape(text)));
    }

    fn link_paragraph(&mut self, label: &str, title: &str, url: &str) {
        self.line(&format!(
            "<p>{}: <a href=\"{}\">{}</a></p>",
            escape(label),
            escape(url),
            escape(title)
        ));
    }

    fn code(&mut self, code: &str) {
        self.line(&format!("<pre><code>{}</code></pre>", escape(code)));
    }

    fn list(&mut self, items: &[String]) {
        self.line("<ul>");
        for item in items {
            self.line(&format!("<li>{}</li>", escape(item)));
        }
        self.line("</ul>");
    }

    fn link_list(&mut self, items: &[(String, String)]) {
        self.line("<ul>");
        for (title, url) in items {
            self.line(&format!(
                "<li><a href=\"{}\">{}</a></li>",
                escape(url),
                escape(title)
            ));
        }
        self.line("</ul>");
    }

    fn horizontal_rule(&mut self) {
        self.line("<hr>");
    }

    fn finish(&mut self) -> String {
        self.line(&format!("<script>{}</script>", SCRIPT));
        self.line("</body></html>");
        std::mem::take(&mut self.buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pages_are_standalone_documents() {
        let mut w = HtmlWriter::new();
        w.begin("N.Foo");
        w.header("N.Foo", 1);
        let out = w.finish();
        assert!(out.starts_with("<!DOCTYPE html>"));
        assert!(out.contains("<title>N.Foo</title>"));
        assert!(out.ends_with("</body></html>\n"));
    }

    #[test]
    fn text_is_escaped() {
        let mut w = HtmlWriter::new();
        w.code("List<int> Items");
        let out = w.finish();
        assert!(out.contains("List&lt;int&gt; Items"));
    }
}
