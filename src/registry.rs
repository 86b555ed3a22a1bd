//! Template registry.
//!
//! Every template file found by the scan is parsed into one shared
//! [`tera::Tera`] engine under its canonical key: `//` followed by its path
//! relative to the source root (`//blog/_partial.template`). The double
//! slash marks a key as rooted, so it can be told apart from a path that
//! still has to be resolved against a page's directory.
//!
//! All templates are added in one batch once the scan is complete, so a
//! template may `include` or `extends` any other template regardless of
//! where either lives in the tree.
//!
//! Autoescaping is off: templates receive already-rendered HTML as
//! `content` and must be able to emit it verbatim.

use crate::paths;
use std::collections::BTreeSet;
use std::path::Path;
use tera::Tera;

/// Prefix that marks a template path as rooted at the source directory.
pub const ROOT_PREFIX: &str = "//";

#[derive(Clone)]
pub struct TemplateRegistry {
    engine: Tera,
    keys: BTreeSet<String>,
}

impl std::fmt::Debug for TemplateRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TemplateRegistry")
            .field("keys", &self.keys)
            .finish()
    }
}

impl Default for TemplateRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateRegistry {
    pub fn new() -> Self {
        let mut engine = Tera::default();
        engine.autoescape_on(vec![]);
        Self {
            engine,
            keys: BTreeSet::new(),
        }
    }

    /// Canonical key for a template at `source_rel` (relative to the source root).
    pub fn canonical_key(source_rel: &Path) -> String {
        format!("{ROOT_PREFIX}{}", paths::to_slash(source_rel))
    }

    /// Parse and register a batch of `(key, source)` templates.
    ///
    /// Either the whole batch is registered or, on a parse error, none of it.
    pub fn register_all(&mut self, templates: Vec<(String, String)>) -> tera::Result<()> {
        let keys: Vec<String> = templates.iter().map(|(key, _)| key.clone()).collect();
        let mut engine = self.engine.clone();
        engine.add_raw_templates(templates)?;
        self.engine = engine;
        self.keys.extend(keys);
        Ok(())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    /// Registered keys in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.keys.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// The parsed templates, without any page-bound functions registered.
    pub(crate) fn engine(&self) -> &Tera {
        &self.engine
    }
}
