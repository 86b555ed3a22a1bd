//! Directory template cascade.
//!
//! Templates are attached to directories by name:
//!
//! | File | Applies to | Inherited | Stops the walk |
//! |------|------------|-----------|----------------|
//! | `_current.template` | pages directly in its directory | no | no |
//! | `_partial.template` | pages in its directory and below | yes | no |
//! | `_final.template` | pages in its directory and below | yes | yes |
//!
//! For a page, the cascade is collected by walking from the page's directory
//! up to the source root:
//!
//! ```text
//! root/_partial.template          ← skipped: blog/ has a final template
//! root/blog/_final.template       ← 3. stops the walk
//! root/blog/2024/_partial.template← 2.
//! root/blog/2024/_current.template← 1.
//! root/blog/2024/post.md
//! ```
//!
//! Templates run in the order collected. The nearest template sees the raw
//! page content; each ancestor receives the previous output as its
//! `content`, so outer directories wrap the page in their layout last.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const CURRENT_TEMPLATE: &str = "_current.template";
pub const PARTIAL_TEMPLATE: &str = "_partial.template";
pub const FINAL_TEMPLATE: &str = "_final.template";

#[derive(Error, Debug)]
pub enum CascadeError {
    #[error("{} is outside the source root {}", branch.display(), root.display())]
    Boundary { branch: PathBuf, root: PathBuf },
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Collect the templates that apply to `page`, in execution order.
///
/// `page` may be a file (its directory is used) or a directory. The walk
/// never goes above `root`.
pub fn resolve(root: &Path, page: &Path) -> Result<Vec<PathBuf>, CascadeError> {
    let root = crate::paths::normalize(&std::path::absolute(root)?);
    let page = crate::paths::normalize(&std::path::absolute(page)?);

    let branch = if fs::metadata(&page)?.is_dir() {
        page
    } else {
        page.parent().map(Path::to_path_buf).unwrap_or(page)
    };

    if !branch.starts_with(&root) {
        return Err(CascadeError::Boundary { branch, root });
    }

    let mut templates = Vec::new();

    let current = branch.join(CURRENT_TEMPLATE);
    if current.is_file() {
        templates.push(current);
    }

    let mut dir = branch.as_path();
    loop {
        let final_template = dir.join(FINAL_TEMPLATE);
        if final_template.is_file() {
            templates.push(final_template);
            break;
        }

        let partial_template = dir.join(PARTIAL_TEMPLATE);
        if partial_template.is_file() {
            templates.push(partial_template);
        }

        if dir == root {
            break;
        }
        match dir.parent() {
            Some(parent) => dir = parent,
            None => break,
        }
    }

    Ok(templates)
}
