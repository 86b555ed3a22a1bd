//! # Rigid
//!
//! A static site generator built around directory-cascading templates.
//! Content files become pages; template files dropped into directories wrap
//! every page beneath them, nearest first.
//!
//! # Architecture: Scan, Render, Publish
//!
//! ```text
//! 1. Scan     source/  →  Site        (pages + parsed template registry)
//! 2. Render   Site     →  scratch/    (copy, strip, markup, templates, write)
//! 3. Publish  scratch/ →  target/     (static files first, pages on top)
//! ```
//!
//! The [`site::Site`] built by the scan is read-only afterwards and shared
//! behind an `Arc`: the renderer and every template function see the same
//! registry and page list, and a page is addressed by its index.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`build`] | Orchestration for the `build` and `check` commands |
//! | [`site`] | Source scan: the build context holding pages and templates |
//! | [`page`] | Page entities with their source, target and public paths |
//! | [`frontmatter`] | `---` delimited front-matter splitting |
//! | [`metadata`] | YAML front-matter decoding with title fallback |
//! | [`naming`] | Output path layout (pretty URLs) and display titles |
//! | [`cascade`] | `_current` / `_partial` / `_final` template resolution |
//! | [`registry`] | The parsed template set, keyed by `//`-rooted paths |
//! | [`context`] | Variables and functions available inside templates |
//! | [`render`] | The per-page render pipeline |
//! | [`markup`] | Markdown to HTML |
//! | [`copy`] | Filtered recursive directory copy |
//! | [`paths`] | Lexical path arithmetic |
//! | [`config`] | `rigid.toml` loading and validation |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Cascade Over Inheritance Chains
//!
//! Layout is attached to directories instead of being declared by each page.
//! A blog directory gets its own `_partial.template` and every post in it,
//! at any depth, is wrapped without touching the posts. `_final.template`
//! cuts the chain when a subtree needs a completely different frame, and a
//! page can still opt out with `template:` in its front matter.
//!
//! ## Rooted Template Keys
//!
//! Templates are registered as `//path/from/source/root`. A reference that
//! starts with `//` is already a key; anything else is a path that still has
//! to be resolved. Relative references made from template functions resolve
//! against the page being rendered, which lets one shared layout pull in
//! fragments that live next to each page.
//!
//! ## Scratch Area
//!
//! Pages render into a temporary directory. The output directory is only
//! replaced once every page has rendered, so a template error never leaves a
//! half-written site behind.

pub mod build;
pub mod cascade;
pub mod config;
pub mod context;
pub mod copy;
pub mod frontmatter;
pub mod markup;
pub mod metadata;
pub mod naming;
pub mod output;
pub mod page;
pub mod paths;
pub mod registry;
pub mod render;
pub mod site;

#[cfg(test)]
pub(crate) mod test_helpers;
