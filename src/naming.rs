//! Filename conventions: output locations and default titles.
//!
//! ## Output Locations
//!
//! A page's output location is derived from its source name by stripping the
//! last extension:
//!
//! - `about.md` → `about/index.html` (pretty URL, public path `about`)
//! - `blog/first-post.markdown` → `blog/first-post/index.html`
//! - `about.html.md` → `about.html` (already HTML, no folding)
//! - `contact.html` → `contact/index.html`
//!
//! The **public path** is what users see in their address bar. With pretty
//! URLs it is the directory holding `index.html`; otherwise it equals the
//! target path.
//!
//! ## Display Titles
//!
//! Pages without a `title` in their front matter get one from the filename:
//! every extension stripped, `-` and `_` become spaces, each word
//! capitalized. `my-post_name.md` → "My Post Name".

use crate::paths;
use std::path::Path;

/// Where a page's rendered output goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    /// File written under the output root, `/`-separated.
    pub target: String,
    /// User-facing URL path.
    pub public: String,
}

/// Compute target and public paths for a source-relative page path.
pub fn output_paths(source_rel: &Path) -> OutputPaths {
    let stripped = paths::to_slash(&source_rel.with_extension(""));

    if Path::new(&stripped)
        .extension()
        .is_some_and(|ext| ext == "html")
    {
        OutputPaths {
            target: stripped.clone(),
            public: stripped,
        }
    } else {
        OutputPaths {
            target: format!("{stripped}/index.html"),
            public: stripped,
        }
    }
}

/// Humanized title from a file name: `my-post_name.tar.md` → "My Post Name".
pub fn display_title(file_name: &str) -> String {
    let stem = file_name.split('.').next().unwrap_or_default();
    // A dotfile has an empty first segment; keep the part after the dot.
    let stem = if stem.is_empty() {
        file_name.trim_start_matches('.').split('.').next().unwrap_or_default()
    } else {
        stem
    };

    stem.replace(['-', '_'], " ")
        .split(' ')
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn markdown_page_gets_pretty_url() {
        let p = output_paths(Path::new("about.md"));
        assert_eq!(p.target, "about/index.html");
        assert_eq!(p.public, "about");
    }

    #[test]
    fn html_markdown_page_keeps_html_name() {
        let p = output_paths(Path::new("about.html.md"));
        assert_eq!(p.target, "about.html");
        assert_eq!(p.public, "about.html");
    }

    #[test]
    fn nested_page_keeps_directories() {
        let p = output_paths(Path::new("blog/2024/first-post.markdown"));
        assert_eq!(p.target, "blog/2024/first-post/index.html");
        assert_eq!(p.public, "blog/2024/first-post");
    }

    #[test]
    fn plain_html_page_is_folded_too() {
        let p = output_paths(Path::new("contact.html"));
        assert_eq!(p.target, "contact/index.html");
        assert_eq!(p.public, "contact");
    }

    #[test]
    fn nested_html_markdown_page() {
        let p = output_paths(Path::new("docs/index.html.md"));
        assert_eq!(p.target, "docs/index.html");
        assert_eq!(p.public, "docs/index.html");
    }

    #[test]
    fn title_from_dashes_and_underscores() {
        assert_eq!(display_title("my-post_name.md"), "My Post Name");
    }

    #[test]
    fn title_strips_every_extension() {
        assert_eq!(display_title("about.html.md"), "About");
    }

    #[test]
    fn title_keeps_inner_capitals() {
        assert_eq!(display_title("intro-to-HTTP.md"), "Intro To HTTP");
    }

    #[test]
    fn title_of_dotfile() {
        assert_eq!(display_title(".hidden-page.md"), "Hidden Page");
    }
}
