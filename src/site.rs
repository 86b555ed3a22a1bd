//! Build context and source scanning.
//!
//! A [`Site`] is created once per build by [`Site::scan`] and is read-only
//! afterwards. It owns the template registry and the page collection; the
//! renderer and the template functions share it behind an `Arc`.
//!
//! ## Scan Rules
//!
//! The source tree is walked depth-first with entries sorted by file name, so
//! page order is stable across runs and platforms. While walking:
//!
//! - hidden directories (`.git/`, `.cache/`) are skipped entirely
//! - editor backups ending in `~` are skipped
//! - the output directory is skipped when it lives inside the source root
//! - symlinks are followed
//!
//! Each remaining file is checked against the template patterns and the page
//! patterns (independently: a file may be both). Templates are parsed into
//! the registry in a single batch after the walk, so the registry is
//! complete before any page is rendered.

use crate::config::{ConfigError, SiteConfig, SitemapOrder};
use crate::page::{Page, PageError};
use crate::paths::{self, PathResolutionError};
use crate::registry::{ROOT_PREFIX, TemplateRegistry};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::{DirEntry, WalkDir};

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to walk source tree: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Page(#[from] PageError),
    #[error(transparent)]
    PathResolution(#[from] PathResolutionError),
    #[error("Template parse error: {0}")]
    Template(#[from] tera::Error),
}

#[derive(Debug)]
pub struct Site {
    /// Absolute, normalized source root.
    pub source_root: PathBuf,
    /// Absolute, normalized output root.
    pub target_root: PathBuf,
    pub config: SiteConfig,
    pub registry: TemplateRegistry,
    /// Pages in scan order.
    pub pages: Vec<Page>,
}

fn absolute(path: &Path) -> std::io::Result<PathBuf> {
    Ok(paths::normalize(&std::path::absolute(path)?))
}

fn matches_any(patterns: &[glob::Pattern], name: &str) -> bool {
    patterns.iter().any(|p| p.matches(name))
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.file_name().to_string_lossy().starts_with('.')
}

fn is_temporary(entry: &DirEntry) -> bool {
    entry.file_name().to_string_lossy().ends_with('~')
}

impl Site {
    /// Walk `source_root` and collect its templates and pages.
    pub fn scan(
        source_root: &Path,
        target_root: &Path,
        config: SiteConfig,
    ) -> Result<Site, ScanError> {
        let source_root = absolute(source_root)?;
        let target_root = absolute(target_root)?;
        let page_patterns = config.patterns.page_patterns()?;
        let template_patterns = config.patterns.template_patterns()?;

        let mut templates = Vec::new();
        let mut pages = Vec::new();

        let walker = WalkDir::new(&source_root)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| {
                e.depth() == 0
                    || !((e.file_type().is_dir() && is_hidden(e))
                        || is_temporary(e)
                        || e.path() == target_root)
            });

        for entry in walker {
            let entry = entry?;
            if entry.file_type().is_dir() {
                continue;
            }
            let name = entry.file_name().to_string_lossy();

            if matches_any(&template_patterns, &name) {
                let rel = paths::relative_to(&source_root, entry.path())?;
                let key = TemplateRegistry::canonical_key(&rel);
                let body = fs::read_to_string(entry.path())?;
                tracing::debug!(template = %key, "found template");
                templates.push((key, body));
            }

            if matches_any(&page_patterns, &name) {
                let page = Page::from_file(&source_root, entry.path())?;
                tracing::debug!(source = %page.source.display(), target = %page.target, "found page");
                pages.push(page);
            }
        }

        let mut registry = TemplateRegistry::new();
        registry.register_all(templates)?;

        tracing::info!(
            templates = registry.len(),
            pages = pages.len(),
            "scanned {}",
            source_root.display()
        );

        Ok(Site {
            source_root,
            target_root,
            config,
            registry,
            pages,
        })
    }

    /// Absolute path of a page's source file.
    pub fn source_path(&self, page: &Page) -> PathBuf {
        self.source_root.join(&page.source)
    }

    /// Canonical registry key for a template file inside the source root.
    pub fn key_for_file(&self, template: &Path) -> Result<String, PathResolutionError> {
        let rel = paths::relative_to(&self.source_root, template)?;
        Ok(TemplateRegistry::canonical_key(&rel))
    }

    /// Resolve a template reference made on behalf of `page`.
    ///
    /// - `//x/y.template` is already canonical and used as-is
    /// - an absolute path must lie inside the source root
    /// - anything else is relative to the page's source directory
    pub fn template_key(&self, page: &Page, reference: &str) -> Result<String, PathResolutionError> {
        if reference.starts_with(ROOT_PREFIX) {
            return Ok(reference.to_string());
        }
        let reference = Path::new(reference);
        let path = if reference.is_absolute() {
            reference.to_path_buf()
        } else {
            self.source_root.join(page.source_dir()).join(reference)
        };
        self.key_for_file(&path)
    }

    /// Page indices in the order `sitemap()` lists them.
    pub fn sitemap_order(&self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.pages.len()).collect();
        if self.config.sitemap.order == SitemapOrder::PublicPath {
            order.sort_by(|&a, &b| self.pages[a].public.cmp(&self.pages[b].public));
        }
        order
    }
}
