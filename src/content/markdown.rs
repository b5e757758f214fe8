//! Markdown rendering with syntax highlighting

use anyhow::Result;
use lazy_static::lazy_static;
use pulldown_cmark::{html, CodeBlockKind, CowStr, Event, Options, Parser, Tag, TagEnd};
use regex::Regex;
use syntect::highlighting::ThemeSet;
use syntect::html::highlighted_html_for_string;
use syntect::parsing::SyntaxSet;

lazy_static! {
    /// First line of a top-level ESM statement in MDX files
    static ref MDX_ESM: Regex = Regex::new(r"^(import|export)\s").unwrap();
    /// Opening line of a fenced code block
    static ref CODE_FENCE: Regex = Regex::new(r"^ {0,3}(`{3,}|~{3,})").unwrap();
}

/// Markdown renderer with syntax highlighting
pub struct MarkdownRenderer {
    syntax_set: SyntaxSet,
    theme_set: ThemeSet,
    theme_name: String,
    line_numbers: bool,
}

impl MarkdownRenderer {
    /// Create a new markdown renderer
    pub fn new() -> Self {
        Self::with_options("InspiredGitHub", false)
    }

    /// Create with custom settings
    pub fn with_options(theme: &str, line_numbers: bool) -> Self {
        Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme_set: ThemeSet::load_defaults(),
            theme_name: theme.to_string(),
            line_numbers,
        }
    }

    fn options() -> Options {
        // Front-matter is handled separately in FrontMatter::parse()
        Options::ENABLE_TABLES
            | Options::ENABLE_FOOTNOTES
            | Options::ENABLE_STRIKETHROUGH
            | Options::ENABLE_TASKLISTS
            | Options::ENABLE_SMART_PUNCTUATION
            | Options::ENABLE_HEADING_ATTRIBUTES
            | Options::ENABLE_GFM
    }

    /// Render markdown to HTML
    pub fn render(&self, markdown: &str) -> Result<String> {
        let parser = Parser::new_ext(markdown, Self::options());

        let mut events: Vec<Event> = Vec::new();
        let mut in_code_block = false;
        let mut code_block_lang: Option<String> = None;
        let mut code_block_content = String::new();

        for event in parser {
            match event {
                Event::Start(Tag::CodeBlock(kind)) => {
                    in_code_block = true;
                    code_block_lang = match kind {
                        CodeBlockKind::Fenced(lang) if !lang.is_empty() => {
                            // ```scala {3-4} -> scala
                            lang.split_whitespace().next().map(str::to_string)
                        }
                        _ => None,
                    };
                    code_block_content.clear();
                }
                Event::End(TagEnd::CodeBlock) => {
                    let highlighted =
                        self.highlight_code(&code_block_content, code_block_lang.as_deref());
                    events.push(Event::Html(CowStr::from(highlighted)));
                    in_code_block = false;
                    code_block_lang = None;
                }
                Event::Text(text) if in_code_block => {
                    code_block_content.push_str(&text);
                }
                _ => events.push(event),
            }
        }

        let mut html_output = String::new();
        html::push_html(&mut html_output, events.into_iter());

        Ok(html_output)
    }

    /// Highlight a code block
    fn highlight_code(&self, code: &str, lang: Option<&str>) -> String {
        let lang = lang.unwrap_or("text");

        let syntax = self
            .syntax_set
            .find_syntax_by_token(lang)
            .or_else(|| self.syntax_set.find_syntax_by_extension(lang))
            .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text());

        let theme = self
            .theme_set
            .themes
            .get(&self.theme_name)
            .or_else(|| self.theme_set.themes.values().next());

        let highlighted = theme.and_then(|theme| {
            highlighted_html_for_string(code, &self.syntax_set, syntax, theme).ok()
        });

        match highlighted {
            Some(highlighted) if self.line_numbers => self.add_line_numbers(&highlighted, lang),
            Some(highlighted) => format!(
                r#"<div class="gatsby-highlight" data-language="{}">{}</div>"#,
                lang, highlighted
            ),
            None => format!(
                r#"<pre><code class="language-{}">{}</code></pre>"#,
                lang,
                html_escape(code)
            ),
        }
    }

    /// Add line numbers to highlighted code
    fn add_line_numbers(&self, code: &str, lang: &str) -> String {
        let lines: Vec<&str> = code.lines().collect();

        let gutter = (1..=lines.len())
            .map(|n| format!(r#"<span class="line-number">{}</span>"#, n))
            .collect::<Vec<_>>()
            .join("\n");

        format!(
            r#"<figure class="highlight {}"><table><tr><td class="gutter"><pre>{}</pre></td><td class="code"><pre>{}</pre></td></tr></table></figure>"#,
            lang,
            gutter,
            lines.join("\n")
        )
    }

    /// Plain-text excerpt of at most `prune_length` characters.
    ///
    /// Cuts at a word boundary and appends an ellipsis when the text is
    /// longer than the limit.
    pub fn excerpt(markdown: &str, prune_length: usize) -> String {
        let mut text = String::new();
        let mut in_code_block = false;

        for event in Parser::new_ext(markdown, Self::options()) {
            match event {
                Event::Start(Tag::CodeBlock(_)) => in_code_block = true,
                Event::End(TagEnd::CodeBlock) => in_code_block = false,
                Event::Text(t) | Event::Code(t) if !in_code_block => text.push_str(&t),
                Event::SoftBreak | Event::HardBreak => text.push(' '),
                Event::End(TagEnd::Paragraph) | Event::End(TagEnd::Heading(_)) => {
                    text.push(' ')
                }
                _ => {}
            }
        }

        let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
        prune(&text, prune_length)
    }

    /// Strip top-level `import`/`export` statements from an MDX body.
    ///
    /// A statement runs until the next blank line. Fenced code is left
    /// untouched.
    pub fn strip_mdx_esm(body: &str) -> String {
        let mut kept: Vec<&str> = Vec::new();
        let mut fence: Option<&str> = None;
        let mut in_statement = false;

        for line in body.lines() {
            if in_statement {
                if line.trim().is_empty() {
                    in_statement = false;
                    kept.push(line);
                }
                continue;
            }

            if let Some(marker) = fence {
                if line.trim_start().starts_with(marker) {
                    fence = None;
                }
                kept.push(line);
                continue;
            }

            if let Some(caps) = CODE_FENCE.captures(line) {
                fence = caps.get(1).map(|m| m.as_str());
            } else if MDX_ESM.is_match(line) {
                in_statement = true;
                continue;
            }
            kept.push(line);
        }

        let mut stripped = kept.join("\n").trim_start().to_string();
        if body.ends_with('\n') && !stripped.is_empty() {
            stripped.push('\n');
        }
        stripped
    }
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

fn prune(text: &str, length: usize) -> String {
    if text.chars().count() <= length {
        return text.to_string();
    }

    let truncated: String = text.chars().take(length).collect();
    let cut = match truncated.rfind(' ') {
        Some(pos) if pos > 0 => &truncated[..pos],
        _ => truncated.as_str(),
    };
    format!("{}…", cut.trim_end_matches(|c: char| c.is_ascii_punctuation()))
}

/// Simple HTML escaping
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_basic_markdown() {
        let renderer = MarkdownRenderer::new();
        let html = renderer.render("# Hello World\n\nThis is a test.").unwrap();
        assert!(html.contains("<h1>Hello World</h1>"));
        assert!(html.contains("<p>This is a test.</p>"));
    }

    #[test]
    fn test_render_code_block() {
        let renderer = MarkdownRenderer::new();
        let html = renderer
            .render("```scala\nval x = 1\n```\n\nafter")
            .unwrap();
        assert!(html.contains(r#"data-language="scala""#));
        assert!(html.contains("<p>after</p>"));
    }

    #[test]
    fn test_render_code_block_with_line_numbers() {
        let renderer = MarkdownRenderer::with_options("InspiredGitHub", true);
        let html = renderer.render("```rust\nfn main() {}\n```").unwrap();
        assert!(html.contains("line-number"));
    }

    #[test]
    fn test_excerpt_short_text_is_unchanged() {
        let excerpt = MarkdownRenderer::excerpt("# Title\n\nShort *body*.", 250);
        assert_eq!(excerpt, "Title Short body.");
    }

    #[test]
    fn test_excerpt_prunes_on_word_boundary() {
        let markdown = "one two three four five six";
        let excerpt = MarkdownRenderer::excerpt(markdown, 12);
        assert_eq!(excerpt, "one two…");
    }

    #[test]
    fn test_excerpt_skips_code_blocks() {
        let markdown = "Intro\n\n```\nlet secret = 1;\n```\n\nOutro";
        let excerpt = MarkdownRenderer::excerpt(markdown, 250);
        assert_eq!(excerpt, "Intro Outro");
    }

    #[test]
    fn test_strip_mdx_esm() {
        let body = "import Chart from '../chart'\nexport const meta = {}\n\n# Hi";
        assert_eq!(MarkdownRenderer::strip_mdx_esm(body), "# Hi");
    }

    #[test]
    fn test_strip_mdx_esm_keeps_imports_in_code() {
        let body = "Intro\n\n```scala\nimport scala.util.Try\nval x = Try(1)\n```\n";
        let stripped = MarkdownRenderer::strip_mdx_esm(body);
        assert_eq!(stripped, body);

        let html = MarkdownRenderer::new().render(&stripped).unwrap();
        assert!(html.contains("import"));
    }

    #[test]
    fn test_strip_mdx_esm_drops_multiline_export() {
        let body = "export const meta = {\n  author: 'x',\n}\n\nHello\n";
        assert_eq!(MarkdownRenderer::strip_mdx_esm(body), "Hello\n");
    }

    #[test]
    fn test_strip_mdx_esm_ignores_tilde_fences() {
        let body = "~~~js\nexport default x\n~~~\n\nexport const y = 1\n\nText";
        assert_eq!(
            MarkdownRenderer::strip_mdx_esm(body),
            "~~~js\nexport default x\n~~~\n\n\nText"
        );
    }
}
