//! Recursive directory copy with a file filter.
//!
//! Used twice per build: once to carry static files (stylesheets, images,
//! anything that is neither a page nor a template) from the source tree into
//! the output, and once to move rendered pages from the scratch area on top.
//!
//! Globs in the blacklist and whitelist are matched against both the entry's
//! file name and its `/`-separated path relative to the copy root, so
//! `*.psd` and `drafts/*` both work. Matching is shell-style: `*` and `?`
//! stop at `/`, so `drafts/*` covers `drafts/a.txt` but not
//! `drafts/sub/b.txt` (the directory itself can be listed as `drafts`).
//! The whitelist only restricts files;
//! directories are always descended into unless something else rejects them.

use crate::paths::{self, PathResolutionError};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::{DirEntry, WalkDir};

#[derive(Error, Debug)]
pub enum CopyError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Failed to walk directory: {0}")]
    Walk(#[from] walkdir::Error),
    #[error(transparent)]
    PathResolution(#[from] PathResolutionError),
}

/// Which entries [`copy_directory`] copies. The default rejects hidden and
/// temporary entries and symlinks.
#[derive(Debug, Clone, Default)]
pub struct FileFilter {
    pub hidden_dirs: bool,
    pub hidden_files: bool,
    /// Files ending in `~`.
    pub temporary_files: bool,
    /// Copy what symlinks point at. When off, symlinks are skipped.
    pub follow_symlinks: bool,
    pub blacklist: Vec<glob::Pattern>,
    /// When non-empty, a file must match one of these to be copied.
    pub whitelist: Vec<glob::Pattern>,
    /// Absolute paths never copied (and never descended into).
    pub exclude_paths: Vec<PathBuf>,
}

impl FileFilter {
    /// A filter that lets everything through.
    pub fn everything() -> Self {
        Self {
            hidden_dirs: true,
            hidden_files: true,
            temporary_files: true,
            follow_symlinks: true,
            ..Self::default()
        }
    }

    fn allows(&self, entry: &DirEntry, rel: &Path) -> bool {
        if entry.path_is_symlink() && !self.follow_symlinks {
            return false;
        }
        if self.exclude_paths.iter().any(|p| p == entry.path()) {
            return false;
        }

        let name = entry.file_name().to_string_lossy();
        let is_dir = entry.file_type().is_dir();

        if name.starts_with('.') && !(if is_dir { self.hidden_dirs } else { self.hidden_files }) {
            return false;
        }
        if !is_dir && name.ends_with('~') && !self.temporary_files {
            return false;
        }

        let rel = paths::to_slash(rel);
        let matches = |p: &glob::Pattern| {
            p.matches_with(&name, paths::SHELL_GLOB) || p.matches_with(&rel, paths::SHELL_GLOB)
        };
        if self.blacklist.iter().any(matches) {
            return false;
        }
        if !is_dir && !self.whitelist.is_empty() && !self.whitelist.iter().any(matches) {
            return false;
        }
        true
    }
}

/// Totals for one [`copy_directory`] run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CopyStats {
    pub files: usize,
    pub bytes: u64,
}

/// Create `dir` (and its parents) with the permission bits of `like`.
pub(crate) fn create_dir_like(dir: &Path, like: &Path) -> io::Result<()> {
    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::{DirBuilderExt, PermissionsExt};
        builder.mode(fs::metadata(like)?.permissions().mode());
    }
    #[cfg(not(unix))]
    let _ = like;
    builder.create(dir)
}

/// Mirror the allowed contents of `from` into `to`.
///
/// Existing files in `to` are overwritten; nothing is deleted. File
/// permissions are preserved and directories take the mode of their source.
pub fn copy_directory(from: &Path, to: &Path, filter: &FileFilter) -> Result<CopyStats, CopyError> {
    create_dir_like(to, from)?;
    let mut stats = CopyStats::default();

    let walker = WalkDir::new(from)
        .follow_links(filter.follow_symlinks)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| {
            e.depth() == 0 || filter.allows(e, e.path().strip_prefix(from).unwrap_or(e.path()))
        });

    for entry in walker {
        let entry = entry?;
        if entry.depth() == 0 {
            continue;
        }
        let rel = paths::relative_to(from, entry.path())?;
        let dest = to.join(&rel);

        if entry.file_type().is_dir() {
            create_dir_like(&dest, entry.path())?;
        } else if entry.file_type().is_file() {
            stats.bytes += fs::copy(entry.path(), &dest)?;
            stats.files += 1;
            tracing::trace!(file = %rel.display(), "copied");
        }
    }

    tracing::debug!(
        from = %from.display(),
        to = %to.display(),
        files = stats.files,
        "copied directory"
    );
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;
    use tempfile::TempDir;

    fn listing(root: &Path) -> Vec<String> {
        let mut files: Vec<String> = WalkDir::new(root)
            .into_iter()
            .filter_map(Result::ok)
            .filter(|e| e.file_type().is_file())
            .map(|e| paths::to_slash(e.path().strip_prefix(root).unwrap()))
            .collect();
        files.sort();
        files
    }

    fn globs(patterns: &[&str]) -> Vec<glob::Pattern> {
        patterns.iter().map(|p| glob::Pattern::new(p).unwrap()).collect()
    }

    #[test]
    fn copies_nested_tree() {
        let src = site_tree(&[("a.txt", "a"), ("css/site.css", "body{}"), ("img/x/y.png", "png")]);
        let dst = TempDir::new().unwrap();

        let stats = copy_directory(src.path(), dst.path(), &FileFilter::default()).unwrap();
        assert_eq!(listing(dst.path()), vec!["a.txt", "css/site.css", "img/x/y.png"]);
        assert_eq!(stats.files, 3);
        assert_eq!(stats.bytes, 1 + 6 + 3);
        assert_eq!(read(dst.path(), "css/site.css"), "body{}");
    }

    #[test]
    fn hidden_dirs_and_files_are_separate_switches() {
        let src = site_tree(&[(".git/config", "x"), (".htaccess", "x"), ("index.css", "x")]);
        let dst = TempDir::new().unwrap();
        let filter = FileFilter {
            hidden_files: true,
            ..FileFilter::default()
        };

        copy_directory(src.path(), dst.path(), &filter).unwrap();
        assert_eq!(listing(dst.path()), vec![".htaccess", "index.css"]);
    }

    #[test]
    fn temporary_files_skipped_by_default() {
        let src = site_tree(&[("notes.txt~", "x"), ("notes.txt", "x")]);
        let dst = TempDir::new().unwrap();

        copy_directory(src.path(), dst.path(), &FileFilter::default()).unwrap();
        assert_eq!(listing(dst.path()), vec!["notes.txt"]);
    }

    #[test]
    fn blacklist_matches_name_or_relative_path() {
        let src = site_tree(&[
            ("page.md", "x"),
            ("drafts/wip.txt", "x"),
            ("keep/logo.svg", "x"),
        ]);
        let dst = TempDir::new().unwrap();
        let filter = FileFilter {
            blacklist: globs(&["*.md", "drafts"]),
            ..FileFilter::default()
        };

        copy_directory(src.path(), dst.path(), &filter).unwrap();
        assert_eq!(listing(dst.path()), vec!["keep/logo.svg"]);
    }

    #[test]
    fn blacklist_star_stops_at_separator() {
        let src = site_tree(&[
            ("drafts/a.txt", "x"),
            ("drafts/sub/b.txt", "x"),
            ("notes/c.txt", "x"),
        ]);
        let dst = TempDir::new().unwrap();
        let filter = FileFilter {
            blacklist: globs(&["drafts/*.txt"]),
            ..FileFilter::default()
        };

        copy_directory(src.path(), dst.path(), &filter).unwrap();
        assert_eq!(listing(dst.path()), vec!["drafts/sub/b.txt", "notes/c.txt"]);
    }

    #[test]
    fn whitelist_star_stops_at_separator() {
        let src = site_tree(&[("img/a.png", "x"), ("img/thumbs/b.png", "x")]);
        let dst = TempDir::new().unwrap();
        let filter = FileFilter {
            whitelist: globs(&["img/*"]),
            ..FileFilter::default()
        };

        copy_directory(src.path(), dst.path(), &filter).unwrap();
        assert_eq!(listing(dst.path()), vec!["img/a.png"]);
    }

    #[test]
    fn whitelist_restricts_files_only() {
        let src = site_tree(&[("a/logo.svg", "x"), ("a/notes.txt", "x"), ("b.svg", "x")]);
        let dst = TempDir::new().unwrap();
        let filter = FileFilter {
            whitelist: globs(&["*.svg"]),
            ..FileFilter::default()
        };

        copy_directory(src.path(), dst.path(), &filter).unwrap();
        assert_eq!(listing(dst.path()), vec!["a/logo.svg", "b.svg"]);
    }

    #[test]
    fn excluded_paths_are_not_descended() {
        let src = site_tree(&[("_output/old.html", "x"), ("style.css", "x")]);
        let dst = TempDir::new().unwrap();
        let filter = FileFilter {
            exclude_paths: vec![src.path().join("_output")],
            ..FileFilter::default()
        };

        copy_directory(src.path(), dst.path(), &filter).unwrap();
        assert_eq!(listing(dst.path()), vec!["style.css"]);
    }

    #[test]
    fn overwrites_existing_destination_files() {
        let src = site_tree(&[("index.html", "new")]);
        let dst = site_tree(&[("index.html", "old"), ("other.html", "kept")]);

        copy_directory(src.path(), dst.path(), &FileFilter::default()).unwrap();
        assert_eq!(read(dst.path(), "index.html"), "new");
        assert_eq!(read(dst.path(), "other.html"), "kept");
    }

    #[test]
    fn everything_filter_keeps_hidden_and_temporary() {
        let src = site_tree(&[(".well-known/x", "x"), ("a~", "x")]);
        let dst = TempDir::new().unwrap();

        copy_directory(src.path(), dst.path(), &FileFilter::everything()).unwrap();
        assert_eq!(listing(dst.path()), vec![".well-known/x", "a~"]);
    }

    #[test]
    fn missing_source_is_error() {
        let tmp = TempDir::new().unwrap();
        let result = copy_directory(
            &tmp.path().join("missing"),
            &tmp.path().join("out"),
            &FileFilter::default(),
        );
        assert!(result.is_err());
    }

    #[cfg(unix)]
    #[test]
    fn symlinks_follow_the_switch() {
        let src = site_tree(&[("real/file.txt", "x")]);
        std::os::unix::fs::symlink(src.path().join("real"), src.path().join("link")).unwrap();

        let dst = TempDir::new().unwrap();
        copy_directory(src.path(), dst.path(), &FileFilter::default()).unwrap();
        assert_eq!(listing(dst.path()), vec!["real/file.txt"]);

        let dst = TempDir::new().unwrap();
        let filter = FileFilter {
            follow_symlinks: true,
            ..FileFilter::default()
        };
        copy_directory(src.path(), dst.path(), &filter).unwrap();
        assert_eq!(listing(dst.path()), vec!["link/file.txt", "real/file.txt"]);
    }

    #[cfg(unix)]
    #[test]
    fn preserves_file_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let src = site_tree(&[("run.sh", "#!/bin/sh")]);
        fs::set_permissions(src.path().join("run.sh"), fs::Permissions::from_mode(0o750)).unwrap();
        let dst = TempDir::new().unwrap();

        copy_directory(src.path(), dst.path(), &FileFilter::default()).unwrap();
        let mode = fs::metadata(dst.path().join("run.sh")).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o750);
    }
}
