//! Build orchestration: scan, render, then publish.
//!
//! ```text
//! source/ ──scan──► Site ──render each page──► scratch/  (temp dir)
//!                                                 │
//! source/ ──copy static files──► target/ ◄──copy──┘
//! ```
//!
//! The target directory is only touched after every page has rendered, so a
//! failing build leaves the previous output in place. The scratch directory
//! is a [`tempfile::TempDir`] and is removed on every exit path.
//!
//! When the target differs from the source, the old target is deleted and
//! refilled with the source's static files: everything that is not a page,
//! a template, `rigid.toml`, a hidden directory or the target itself.

use crate::config::{self, CONFIG_FILE, ConfigError};
use crate::context::TemplateError;
use crate::copy::{self, CopyError, CopyStats, FileFilter};
use crate::render::{self, PageFailure, PageReport, RenderError};
use crate::site::{ScanError, Site};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BuildError {
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
    #[error("Scan failed: {0}")]
    Scan(#[from] ScanError),
    #[error("Render failed: {0}")]
    Render(#[from] PageFailure),
    #[error("Copy failed: {0}")]
    Copy(#[from] CopyError),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Cannot resolve templates for {}: {error}", page.display())]
    Plan {
        page: PathBuf,
        #[source]
        error: RenderError,
    },
    #[error("Target {} contains the source directory {}", target.display(), source_dir.display())]
    TargetContainsSource { target: PathBuf, source_dir: PathBuf },
}

/// Result of a successful build.
#[derive(Debug)]
pub struct BuildReport {
    pub source_root: PathBuf,
    pub target_root: PathBuf,
    /// Registered template keys, sorted.
    pub templates: Vec<String>,
    /// Rendered pages in scan order.
    pub pages: Vec<PageReport>,
    /// Static files carried over from the source.
    pub static_files: CopyStats,
}

/// Result of a `check`: what a build would do, without doing it.
#[derive(Debug)]
pub struct CheckReport {
    pub source_root: PathBuf,
    pub templates: Vec<String>,
    pub pages: Vec<PageReport>,
}

fn scan(source: &Path, target: &Path) -> Result<Site, BuildError> {
    let config = config::load_config(source)?;
    Ok(Site::scan(source, target, config)?)
}

fn template_keys(site: &Site) -> Vec<String> {
    site.registry.keys().map(str::to_string).collect()
}

/// Filter for copying static files out of the source tree.
fn static_filter(site: &Site) -> Result<FileFilter, ConfigError> {
    let settings = &site.config.copy;
    let mut blacklist = site.config.patterns.page_patterns()?;
    blacklist.extend(site.config.patterns.template_patterns()?);
    blacklist.extend(settings.exclude_patterns()?);

    Ok(FileFilter {
        hidden_dirs: false,
        hidden_files: settings.hidden_files,
        temporary_files: settings.temporary_files,
        follow_symlinks: settings.follow_symlinks,
        blacklist,
        whitelist: settings.include_patterns()?,
        exclude_paths: vec![
            site.target_root.clone(),
            site.source_root.join(CONFIG_FILE),
        ],
    })
}

/// Build the site in `source` into `target`.
pub fn build(source: &Path, target: &Path) -> Result<BuildReport, BuildError> {
    let site = Arc::new(scan(source, target)?);

    if site.target_root != site.source_root && site.source_root.starts_with(&site.target_root) {
        return Err(BuildError::TargetContainsSource {
            target: site.target_root.clone(),
            source_dir: site.source_root.clone(),
        });
    }

    let scratch = tempfile::Builder::new().prefix("rigid-").tempdir()?;
    tracing::debug!(scratch = %scratch.path().display(), "rendering pages");

    let mut pages = Vec::with_capacity(site.pages.len());
    for index in 0..site.pages.len() {
        let report = render::render_page(&site, index, scratch.path())?;
        tracing::info!(page = %report.source.display(), target = %report.target, "built");
        pages.push(report);
    }

    let mut static_files = CopyStats::default();
    if site.target_root != site.source_root {
        if site.target_root.exists() {
            tracing::debug!(target = %site.target_root.display(), "removing old output");
            fs::remove_dir_all(&site.target_root)?;
        }
        let filter = static_filter(&site)?;
        static_files = copy::copy_directory(&site.source_root, &site.target_root, &filter)?;
    }

    copy::copy_directory(scratch.path(), &site.target_root, &FileFilter::everything())?;

    Ok(BuildReport {
        source_root: site.source_root.clone(),
        target_root: site.target_root.clone(),
        templates: template_keys(&site),
        pages,
        static_files,
    })
}

/// Scan `source` and resolve every page's templates without rendering.
///
/// Fails on the first page whose templates cannot be resolved or are not
/// registered.
pub fn check(source: &Path, target: &Path) -> Result<CheckReport, BuildError> {
    let site = scan(source, target)?;

    let mut pages = Vec::with_capacity(site.pages.len());
    for page in &site.pages {
        let plan = render::plan(&site, page)
            .and_then(|plan| match plan.keys.iter().find(|k| !site.registry.contains(k)) {
                Some(missing) => Err(TemplateError::NotFound(missing.clone()).into()),
                None => Ok(plan),
            })
            .map_err(|error| BuildError::Plan {
                page: page.source.clone(),
                error,
            })?;
        pages.push(PageReport {
            source: page.source.clone(),
            target: page.target.clone(),
            plan,
        });
    }

    Ok(CheckReport {
        source_root: site.source_root.clone(),
        templates: template_keys(&site),
        pages,
    })
}
