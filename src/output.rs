//! CLI output formatting for `build` and `check`.
//!
//! # Information-First Display
//!
//! Each page leads with its positional index, its source path and where it
//! lands in the output. The templates it runs through follow as indented
//! context lines, in execution order, so the cascade reads top to bottom the
//! way content flows through it.
//!
//! # Output Format
//!
//! ## Build
//!
//! ```text
//! Templates
//!     //_partial.template
//!     //blog/_current.template
//!
//! Pages
//! 001 about.md → about/index.html
//!     //_partial.template
//! 002 blog/post.md → blog/post/index.html
//!     //blog/_current.template
//!     //_partial.template
//! 003 feed.md → feed/index.html (override)
//!     //layouts/feed.template
//!
//! Built 3 pages, copied 4 static files → /srv/site
//! ```
//!
//! ## Check
//!
//! Same `Templates` and `Pages` sections, followed by a summary line.
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format functions
//! are pure: no I/O, no side effects.

use crate::build::{BuildReport, CheckReport};
use crate::paths;
use crate::render::PageReport;

// ============================================================================
// Shared helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// `1 page`, `2 pages`.
fn count(n: usize, noun: &str) -> String {
    if n == 1 {
        format!("{n} {noun}")
    } else {
        format!("{n} {noun}s")
    }
}

fn template_section(templates: &[String]) -> Vec<String> {
    let mut lines = vec!["Templates".to_string()];
    if templates.is_empty() {
        lines.push(format!("{}(none)", indent(1)));
    }
    lines.extend(templates.iter().map(|key| format!("{}{key}", indent(1))));
    lines
}

/// Page header plus its templates.
///
/// ```text
/// 002 blog/post.md → blog/post/index.html
///     //blog/_current.template
/// ```
fn page_lines(index: usize, page: &PageReport) -> Vec<String> {
    let marker = if page.plan.overridden { " (override)" } else { "" };
    let mut lines = vec![format!(
        "{} {} → {}{marker}",
        format_index(index),
        paths::to_slash(&page.source),
        page.target
    )];
    lines.extend(page.plan.keys.iter().map(|key| format!("{}{key}", indent(1))));
    lines
}

fn page_section(pages: &[PageReport]) -> Vec<String> {
    let mut lines = vec!["Pages".to_string()];
    for (i, page) in pages.iter().enumerate() {
        lines.extend(page_lines(i + 1, page));
    }
    lines
}

// ============================================================================
// Build output
// ============================================================================

pub fn format_build_output(report: &BuildReport) -> Vec<String> {
    let mut lines = template_section(&report.templates);
    lines.push(String::new());
    lines.extend(page_section(&report.pages));
    lines.push(String::new());
    lines.push(format!(
        "Built {}, copied {} → {}",
        count(report.pages.len(), "page"),
        count(report.static_files.files, "static file"),
        report.target_root.display()
    ));
    lines
}

/// Print build output to stdout.
pub fn print_build_output(report: &BuildReport) {
    for line in format_build_output(report) {
        println!("{}", line);
    }
}

// ============================================================================
// Check output
// ============================================================================

pub fn format_check_output(report: &CheckReport) -> Vec<String> {
    let mut lines = template_section(&report.templates);
    lines.push(String::new());
    lines.extend(page_section(&report.pages));
    lines.push(String::new());
    lines.push(format!(
        "{} and {} in {}",
        count(report.pages.len(), "page"),
        count(report.templates.len(), "template"),
        report.source_root.display()
    ));
    lines
}

/// Print check output to stdout.
pub fn print_check_output(report: &CheckReport) {
    for line in format_check_output(report) {
        println!("{}", line);
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::copy::CopyStats;
    use crate::render::TemplatePlan;
    use std::path::PathBuf;

    fn page(source: &str, target: &str, keys: &[&str], overridden: bool) -> PageReport {
        PageReport {
            source: PathBuf::from(source),
            target: target.to_string(),
            plan: TemplatePlan {
                keys: keys.iter().map(|k| k.to_string()).collect(),
                overridden,
            },
        }
    }

    #[test]
    fn format_index_pads_to_three_digits() {
        assert_eq!(format_index(1), "001");
        assert_eq!(format_index(42), "042");
        assert_eq!(format_index(1000), "1000");
    }

    #[test]
    fn count_pluralizes() {
        assert_eq!(count(0, "page"), "0 pages");
        assert_eq!(count(1, "page"), "1 page");
        assert_eq!(count(2, "static file"), "2 static files");
    }

    #[test]
    fn page_lines_list_templates_in_order() {
        let lines = page_lines(
            2,
            &page(
                "blog/post.md",
                "blog/post/index.html",
                &["//blog/_current.template", "//_partial.template"],
                false,
            ),
        );
        assert_eq!(
            lines,
            vec![
                "002 blog/post.md → blog/post/index.html",
                "    //blog/_current.template",
                "    //_partial.template",
            ]
        );
    }

    #[test]
    fn page_lines_mark_override() {
        let lines = page_lines(
            1,
            &page("feed.md", "feed/index.html", &["//layouts/feed.template"], true),
        );
        assert_eq!(lines[0], "001 feed.md → feed/index.html (override)");
    }

    #[test]
    fn build_output_layout() {
        let report = BuildReport {
            source_root: PathBuf::from("/src"),
            target_root: PathBuf::from("/srv/site"),
            templates: vec!["//_partial.template".into()],
            pages: vec![page("about.md", "about/index.html", &["//_partial.template"], false)],
            static_files: CopyStats { files: 4, bytes: 100 },
        };
        assert_eq!(
            format_build_output(&report),
            vec![
                "Templates",
                "    //_partial.template",
                "",
                "Pages",
                "001 about.md → about/index.html",
                "    //_partial.template",
                "",
                "Built 1 page, copied 4 static files → /srv/site",
            ]
        );
    }

    #[test]
    fn check_output_without_templates() {
        let report = CheckReport {
            source_root: PathBuf::from("/src"),
            templates: vec![],
            pages: vec![
                page("a.md", "a/index.html", &[], false),
                page("b.html", "b/index.html", &[], false),
            ],
        };
        let lines = format_check_output(&report);
        assert_eq!(lines[0], "Templates");
        assert_eq!(lines[1], "    (none)");
        assert_eq!(lines.last().unwrap(), "2 pages and 0 templates in /src");
    }
}
