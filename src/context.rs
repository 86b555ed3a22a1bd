//! Template data context: what a template sees while it runs.
//!
//! Each page render gets one engine clone with functions bound to that
//! page; the page's templates and their nested `template()` calls all run
//! on it. Variables:
//!
//! | Variable | Meaning |
//! |----------|---------|
//! | `content` | output of the previous step (markup or inner template) |
//! | `page` | the current page: `path`, `target`, `source`, `meta` |
//! | `data` | only inside `template(...)` calls: the value passed by the caller |
//!
//! Functions:
//!
//! ```text
//! {{ template(path="nav.template", data=page.meta) }}  run another template
//! {{ sitemap(pattern="blog/*") }}                      <ul> of matching pages
//! {% for p in tagged_pages(pattern="rust") %}          pages with a matching tag
//! <a href="{{ rel_path(target="css/site.css") }}">     link relative to this page
//! ```
//!
//! Relative `template()` paths resolve against the *page's* source
//! directory, not the calling template's, so a shared layout can pull in
//! page-local fragments. Patterns are shell globs; an invalid pattern fails
//! the render of the current page.

use crate::page::Page;
use crate::paths::{self, PathResolutionError};
use crate::site::Site;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Weak};
use tera::{Tera, Value};
use thiserror::Error;

/// Maximum nesting of `template()` calls before giving up.
pub const MAX_DEPTH: usize = 32;

#[derive(Error, Debug)]
pub enum TemplateError {
    #[error(transparent)]
    PathResolution(#[from] PathResolutionError),
    #[error("Template not found: {0}")]
    NotFound(String),
    #[error("Invalid pattern {pattern:?}: {source}")]
    Pattern {
        pattern: String,
        source: glob::PatternError,
    },
    #[error("Template calls nested deeper than {MAX_DEPTH} levels at {0}")]
    TooDeep(String),
    #[error("Failed to render {key}: {}", error_chain(.error))]
    Render { key: String, error: tera::Error },
}

/// Flatten an error and its sources into one line.
///
/// Tera reports the interesting part (the failing function, the bad
/// pattern) several levels down the source chain.
pub fn error_chain(err: &(dyn std::error::Error + 'static)) -> String {
    let mut parts = vec![err.to_string()];
    let mut source = err.source();
    while let Some(err) = source {
        parts.push(err.to_string());
        source = err.source();
    }
    parts.join(": ")
}

fn compile(pattern: &str) -> Result<glob::Pattern, TemplateError> {
    glob::Pattern::new(pattern).map_err(|source| TemplateError::Pattern {
        pattern: pattern.to_string(),
        source,
    })
}

fn str_arg<'a>(
    args: &'a HashMap<String, Value>,
    function: &str,
    name: &str,
) -> tera::Result<Option<&'a str>> {
    match args.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(other) => Err(tera::Error::msg(format!(
            "{function}(): argument `{name}` must be a string, got {other}"
        ))),
    }
}

fn call_failed(function: &str, err: TemplateError) -> tera::Error {
    tera::Error::chain(format!("{function}() failed"), err)
}

/// Escape a value for a double-quoted HTML attribute.
///
/// Unlike [`tera::escape_html`] this leaves `/` alone, so relative links stay
/// readable.
fn escape_attribute(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// State shared by the functions registered on a page's engine.
///
/// Holds the engine weakly: the engine owns the functions, and the functions
/// own this.
#[derive(Clone)]
struct Binding {
    site: Arc<Site>,
    page: usize,
    engine: Weak<Tera>,
    /// Current `template()` nesting level for this page.
    depth: Arc<AtomicUsize>,
}

impl Binding {
    fn page(&self) -> &Page {
        &self.site.pages[self.page]
    }

    fn execute(&self, key: &str, context: &tera::Context) -> Result<String, TemplateError> {
        if !self.site.registry.contains(key) {
            return Err(TemplateError::NotFound(key.to_string()));
        }
        let render_error = |error| TemplateError::Render {
            key: key.to_string(),
            error,
        };
        let engine = self
            .engine
            .upgrade()
            .ok_or_else(|| render_error(tera::Error::msg("template engine released")))?;
        engine.render(key, context).map_err(render_error)
    }

    fn invoke(&self, reference: &str, data: Value) -> Result<String, TemplateError> {
        let key = self.site.template_key(self.page(), reference)?;

        let level = self.depth.fetch_add(1, Ordering::Relaxed);
        let result = if level >= MAX_DEPTH {
            Err(TemplateError::TooDeep(key))
        } else {
            let mut context = tera::Context::new();
            context.insert("page", &self.page().view());
            context.insert("data", &data);
            self.execute(&key, &context)
        };
        self.depth.fetch_sub(1, Ordering::Relaxed);
        result
    }

    fn register_functions(&self, engine: &mut Tera) {
        let binding = self.clone();
        engine.register_function("template", move |args: &HashMap<String, Value>| {
            let path = str_arg(args, "template", "path")?
                .ok_or_else(|| tera::Error::msg("template(): missing argument `path`"))?;
            let value = args.get("data").cloned().unwrap_or(Value::Null);
            binding
                .invoke(path, value)
                .map(Value::String)
                .map_err(|e| call_failed("template", e))
        });

        let binding = self.clone();
        engine.register_function("sitemap", move |args: &HashMap<String, Value>| {
            let pattern = str_arg(args, "sitemap", "pattern")?.unwrap_or_default();
            binding
                .sitemap(pattern)
                .map(Value::String)
                .map_err(|e| call_failed("sitemap", e))
        });

        let binding = self.clone();
        engine.register_function("tagged_pages", move |args: &HashMap<String, Value>| {
            let pattern = str_arg(args, "tagged_pages", "pattern")?.unwrap_or_default();
            let pages = binding
                .tagged_pages(pattern)
                .map_err(|e| call_failed("tagged_pages", e))?;
            Ok(tera::to_value(
                pages.iter().map(|p| p.view()).collect::<Vec<_>>(),
            )?)
        });

        let binding = self.clone();
        engine.register_function("rel_path", move |args: &HashMap<String, Value>| {
            let target = str_arg(args, "rel_path", "target")?
                .ok_or_else(|| tera::Error::msg("rel_path(): missing argument `target`"))?;
            Ok(Value::String(binding.rel_path(target)))
        });
    }

    fn sitemap(&self, pattern: &str) -> Result<String, TemplateError> {
        let matcher = if pattern.is_empty() {
            None
        } else {
            Some(compile(pattern)?)
        };
        let current = &self.page().public;

        let mut html = String::from("\n<ul class=\"sitemap\">\n");
        for index in self.site.sitemap_order() {
            let page = &self.site.pages[index];
            if matcher
                .as_ref()
                .is_some_and(|m| !m.matches_with(&page.public, paths::SHELL_GLOB))
            {
                continue;
            }
            let class = if &page.public == current {
                " class=\"active\""
            } else {
                ""
            };
            html.push_str(&format!(
                "<li><a{class} href=\"{}\">{}</a></li>\n",
                escape_attribute(&self.rel_path(&page.target)),
                tera::escape_html(&page.meta.title),
            ));
        }
        html.push_str("</ul>\n");
        Ok(html)
    }

    fn tagged_pages(&self, pattern: &str) -> Result<Vec<&Page>, TemplateError> {
        if pattern.is_empty() {
            return Ok(Vec::new());
        }
        let matcher = compile(pattern)?;
        Ok(self
            .site
            .pages
            .iter()
            .filter(|p| {
                p.meta
                    .tags
                    .iter()
                    .any(|tag| matcher.matches_with(tag, paths::SHELL_GLOB))
            })
            .collect())
    }

    fn rel_path(&self, target: &str) -> String {
        let base = self.page().target_dir();
        paths::site_relative(base, target)
            .unwrap_or_else(|| format!("rel_path: cannot make {target:?} relative to {base:?}"))
    }
}

/// The page-bound context templates run in.
///
/// Created once per page render. It holds one engine with the page's
/// functions registered, shared by the page's templates and every nested
/// `template()` call. The [`Site`] is only read.
pub struct TemplateData {
    engine: Arc<Tera>,
    binding: Binding,
}

impl TemplateData {
    pub fn new(site: Arc<Site>, page: usize) -> Self {
        let depth = Arc::new(AtomicUsize::new(0));
        let engine = Arc::new_cyclic(|weak| {
            let mut engine = site.registry.engine().clone();
            Binding {
                site: Arc::clone(&site),
                page,
                engine: weak.clone(),
                depth: Arc::clone(&depth),
            }
            .register_functions(&mut engine);
            engine
        });
        let binding = Binding {
            site,
            page,
            engine: Arc::downgrade(&engine),
            depth,
        };
        Self { engine, binding }
    }

    pub fn page(&self) -> &Page {
        self.binding.page()
    }

    /// Run `key` as a page template over `content`.
    pub fn render(&self, key: &str, content: &str) -> Result<String, TemplateError> {
        let mut context = tera::Context::new();
        context.insert("content", content);
        context.insert("page", &self.page().view());
        self.binding.execute(key, &context)
    }

    /// Run the template at `reference` with caller-provided `data`.
    pub fn invoke(&self, reference: &str, data: Value) -> Result<String, TemplateError> {
        self.binding.invoke(reference, data)
    }

    /// HTML list of pages whose public path matches `pattern` (all if empty).
    pub fn sitemap(&self, pattern: &str) -> Result<String, TemplateError> {
        self.binding.sitemap(pattern)
    }

    /// Pages with at least one tag matching `pattern`, in scan order.
    ///
    /// An empty pattern matches nothing.
    pub fn tagged_pages(&self, pattern: &str) -> Result<Vec<&Page>, TemplateError> {
        self.binding.tagged_pages(pattern)
    }

    /// `target` (a site-rooted output path) relative to this page's directory.
    ///
    /// Returns a diagnostic string instead of failing, since the result is
    /// spliced straight into template output.
    pub fn rel_path(&self, target: &str) -> String {
        self.binding.rel_path(target)
    }

    /// Strong handles to this page's engine.
    #[cfg(test)]
    fn engine_handles(&self) -> usize {
        Arc::strong_count(&self.engine)
    }
}
