//! Markdown rendering service
//!
//! Markdown to HTML conversion with syntax highlighting for code blocks,
//! using pulldown-cmark for parsing and syntect for highlighting. Blog post
//! content is stored as Markdown and rendered once on save.
//!
//! # Example
//!
//! ```
//! use blastline::services::markdown::MarkdownRenderer;
//!
//! let renderer = MarkdownRenderer::new();
//! let html = renderer.render("# Surface prep\n\nThis is **important**.");
//! assert!(html.contains("<h1>"));
//! assert!(html.contains("<strong>"));
//! ```

use pulldown_cmark::{html, CodeBlockKind, Event, Options, Parser, Tag, TagEnd};
use std::sync::Arc;
use syntect::highlighting::ThemeSet;
use syntect::html::highlighted_html_for_string;
use syntect::parsing::SyntaxSet;

/// A thread-safe Markdown renderer with syntax highlighting support.
#[derive(Clone)]
pub struct MarkdownRenderer {
    syntax_set: SyntaxSet,
    theme_set: Arc<ThemeSet>,
    theme_name: String,
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkdownRenderer {
    /// Create a renderer with the default highlighting theme
    pub fn new() -> Self {
        Self::with_theme("base16-ocean.dark")
    }

    /// Create a renderer with a specific syntect theme.
    /// Falls back to "base16-ocean.dark" if the theme is unknown.
    pub fn with_theme(theme_name: &str) -> Self {
        let syntax_set = SyntaxSet::load_defaults_newlines();
        let theme_set = Arc::new(ThemeSet::load_defaults());

        let theme_name = if theme_set.themes.contains_key(theme_name) {
            theme_name.to_string()
        } else {
            "base16-ocean.dark".to_string()
        };

        Self {
            syntax_set,
            theme_set,
            theme_name,
        }
    }

    /// Render Markdown to HTML
    pub fn render(&self, markdown: &str) -> String {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_TASKLISTS);
        options.insert(Options::ENABLE_SMART_PUNCTUATION);

        let parser = Parser::new_ext(markdown, options);

        // Intercept code blocks so they can be highlighted
        let mut events = Vec::new();
        let mut code_block_lang: Option<String> = None;
        let mut code_block_content = String::new();

        for event in parser {
            match event {
                Event::Start(Tag::CodeBlock(kind)) => {
                    code_block_lang = Some(match kind {
                        CodeBlockKind::Fenced(lang) => lang.to_string(),
                        CodeBlockKind::Indented => String::new(),
                    });
                    code_block_content.clear();
                }
                Event::End(TagEnd::CodeBlock) => {
                    let lang = code_block_lang.take().unwrap_or_default();
                    let highlighted = self.highlight_code(&code_block_content, &lang);
                    events.push(Event::Html(highlighted.into()));
                }
                Event::Text(text) if code_block_lang.is_some() => {
                    code_block_content.push_str(&text);
                }
                other => events.push(other),
            }
        }

        let mut html_output = String::new();
        html::push_html(&mut html_output, events.into_iter());
        html_output
    }

    /// Highlight a code block, falling back to an escaped <pre> block for
    /// unknown languages
    fn highlight_code(&self, code: &str, lang: &str) -> String {
        let syntax = self
            .syntax_set
            .find_syntax_by_token(lang)
            .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text());

        let theme = &self.theme_set.themes[&self.theme_name];

        match highlighted_html_for_string(code, &self.syntax_set, syntax, theme) {
            Ok(highlighted) => highlighted,
            Err(_) => format!("<pre><code>{}</code></pre>", escape_html(code)),
        }
    }
}

/// Minimal HTML escaping for the fallback path
fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_basic_markdown() {
        let renderer = MarkdownRenderer::new();
        let html = renderer.render("# Heading\n\nSome *emphasis* and **bold**.");
        assert!(html.contains("<h1>"));
        assert!(html.contains("<em>"));
        assert!(html.contains("<strong>"));
    }

    #[test]
    fn renders_tables() {
        let renderer = MarkdownRenderer::new();
        let html = renderer.render("| a | b |\n|---|---|\n| 1 | 2 |");
        assert!(html.contains("<table>"));
    }

    #[test]
    fn highlights_fenced_code() {
        let renderer = MarkdownRenderer::new();
        let html = renderer.render("```rust\nfn main() {}\n```");
        // syntect emits inline-styled pre blocks
        assert!(html.contains("<pre"));
        assert!(html.contains("main"));
    }

    #[test]
    fn unknown_theme_falls_back() {
        let renderer = MarkdownRenderer::with_theme("no-such-theme");
        let html = renderer.render("plain text");
        assert!(html.contains("plain text"));
    }

    #[test]
    fn escape_html_escapes_angle_brackets() {
        assert_eq!(escape_html("<b>&"), "&lt;b&gt;&amp;");
    }
}
