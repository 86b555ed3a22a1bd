//! Markdown to HTML conversion for page bodies.
//!
//! Uses pulldown-cmark with the common extensions enabled: tables,
//! strikethrough, footnotes and smart punctuation. Raw HTML inside markdown
//! is passed through untouched.

use pulldown_cmark::{Options, Parser, html};

fn options() -> Options {
    Options::ENABLE_TABLES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_SMART_PUNCTUATION
}

/// Render markdown text to HTML.
pub fn render_markdown(markdown: &str) -> String {
    let parser = Parser::new_ext(markdown, options());
    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}
