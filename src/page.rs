//! Page entities.
//!
//! A [`Page`] is created once per source file during the scan and never
//! changes afterwards. It records three paths, because template authors and
//! the renderer think in different spaces:
//!
//! - `source`: where the file lives, relative to the source root
//! - `target`: where rendered output is written, relative to the output root
//! - `public`: the URL path users see (see [`crate::naming`])

use crate::frontmatter;
use crate::metadata::Metadata;
use crate::naming;
use crate::paths::{self, PathResolutionError};
use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PageError {
    #[error("IO error reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error(transparent)]
    PathResolution(#[from] PathResolutionError),
    #[error("Invalid front matter in {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        source: serde_yaml::Error,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    /// Path of the source file relative to the source root.
    pub source: PathBuf,
    /// Output file relative to the output root, `/`-separated.
    pub target: String,
    /// User-facing URL path.
    pub public: String,
    pub meta: Metadata,
}

impl Page {
    /// Build a page from a source file under `source_root`.
    pub fn from_file(source_root: &Path, file: &Path) -> Result<Page, PageError> {
        let source = paths::relative_to(source_root, file)?;
        let output = naming::output_paths(&source);

        let split = frontmatter::extract_file(file, false).map_err(|source| PageError::Io {
            path: file.to_path_buf(),
            source,
        })?;

        let file_name = file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let meta = Metadata::resolve(&split.meta, &file_name).map_err(|source| {
            PageError::Decode {
                path: file.to_path_buf(),
                source,
            }
        })?;

        Ok(Page {
            source,
            target: output.target,
            public: output.public,
            meta,
        })
    }

    /// Source directory of the page, relative to the source root.
    pub fn source_dir(&self) -> &Path {
        self.source.parent().unwrap_or(Path::new(""))
    }

    /// Directory holding the page's output, `/`-separated.
    pub fn target_dir(&self) -> &str {
        paths::site_dir(&self.target)
    }

    pub fn extension(&self) -> Option<&str> {
        self.source.extension().and_then(|e| e.to_str())
    }

    /// Serializable view handed to templates as `page`.
    pub fn view(&self) -> PageView<'_> {
        PageView {
            path: &self.public,
            target: &self.target,
            source: paths::to_slash(&self.source),
            meta: &self.meta,
        }
    }
}

/// A page as seen from inside a template.
#[derive(Debug, Serialize)]
pub struct PageView<'a> {
    /// Public path; what `sitemap()` and `tagged_pages()` compare against.
    pub path: &'a str,
    pub target: &'a str,
    pub source: String,
    pub meta: &'a Metadata,
}
