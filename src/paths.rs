//! Lexical path arithmetic shared by the scanner, the page builder and the
//! template functions.
//!
//! Everything here works on path *text*: nothing touches the filesystem, so
//! paths that do not exist yet (scratch targets, template keys) can be
//! resolved the same way as real ones.
//!
//! Two path spaces are in play:
//!
//! - **Source space**: absolute `PathBuf`s under the source root, used for
//!   reading pages and templates.
//! - **Site space**: `/`-separated strings relative to the site root, used
//!   for template keys, target paths and public paths. These never contain
//!   `.` or `..` components.

use std::path::{Component, Path, PathBuf};
use thiserror::Error;

/// Shell-style glob matching: `*` and `?` never match a `/`.
pub const SHELL_GLOB: glob::MatchOptions = glob::MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// A path could not be expressed relative to a root directory.
#[derive(Error, Debug)]
#[error("{} is not inside {}", path.display(), root.display())]
pub struct PathResolutionError {
    pub path: PathBuf,
    pub root: PathBuf,
}

/// Resolve `.` and `..` components without consulting the filesystem.
///
/// A `..` that would climb above the root of an absolute path is dropped;
/// above the start of a relative path it is kept.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Express `path` relative to `root`, failing when it lies outside.
pub fn relative_to(root: &Path, path: &Path) -> Result<PathBuf, PathResolutionError> {
    normalize(path)
        .strip_prefix(normalize(root))
        .map(Path::to_path_buf)
        .map_err(|_| PathResolutionError {
            path: path.to_path_buf(),
            root: root.to_path_buf(),
        })
}

/// Render a relative path with `/` separators regardless of platform.
pub fn to_slash(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            Component::ParentDir => Some("..".to_string()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Directory part of a site-space path (`"a/b/index.html"` → `"a/b"`).
pub fn site_dir(path: &str) -> &str {
    path.rfind('/').map(|idx| &path[..idx]).unwrap_or("")
}

/// Split a site-space path into normalized segments.
///
/// Leading slashes are ignored (site-rooted). Returns `None` when `..`
/// would climb above the site root.
fn site_segments(path: &str) -> Option<Vec<&str>> {
    let mut segments = Vec::new();
    for part in path.split('/') {
        match part {
            "" | "." => {}
            ".." => {
                segments.pop()?;
            }
            other => segments.push(other),
        }
    }
    Some(segments)
}

/// Compute the site-space path of `target` as seen from directory `base`.
///
/// Both arguments are relative to the site root. Returns `None` when either
/// path escapes the root.
///
/// ```text
/// site_relative("about", "css/site.css")   == Some("../css/site.css")
/// site_relative("", "about/index.html")    == Some("about/index.html")
/// site_relative("about", "about/index.html") == Some("index.html")
/// ```
pub fn site_relative(base: &str, target: &str) -> Option<String> {
    let base = site_segments(base)?;
    let target = site_segments(target)?;

    let common = base
        .iter()
        .zip(target.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut parts: Vec<&str> = std::iter::repeat_n("..", base.len() - common).collect();
    parts.extend(&target[common..]);

    if parts.is_empty() {
        Some(".".to_string())
    } else {
        Some(parts.join("/"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_collapses_dot_segments() {
        assert_eq!(
            normalize(Path::new("/site/a/./b/../c")),
            PathBuf::from("/site/a/c")
        );
    }

    #[test]
    fn normalize_clamps_at_filesystem_root() {
        assert_eq!(normalize(Path::new("/../../x")), PathBuf::from("/x"));
    }

    #[test]
    fn normalize_keeps_leading_parent_of_relative_path() {
        assert_eq!(normalize(Path::new("../x/..")), PathBuf::from(".."));
    }

    #[test]
    fn relative_to_strips_root() {
        let rel = relative_to(Path::new("/site"), Path::new("/site/a/../b/page.md")).unwrap();
        assert_eq!(rel, PathBuf::from("b/page.md"));
    }

    #[test]
    fn relative_to_rejects_outside_path() {
        let err = relative_to(Path::new("/site"), Path::new("/site/../elsewhere/x")).unwrap_err();
        assert_eq!(err.root, PathBuf::from("/site"));
    }

    #[test]
    fn relative_to_rejects_sibling_with_shared_prefix() {
        assert!(relative_to(Path::new("/site"), Path::new("/site-old/page.md")).is_err());
    }

    #[test]
    fn to_slash_joins_components() {
        assert_eq!(to_slash(Path::new("a/b/c.md")), "a/b/c.md");
        assert_eq!(to_slash(Path::new("")), "");
    }

    #[test]
    fn site_dir_of_nested_and_root_paths() {
        assert_eq!(site_dir("a/b/index.html"), "a/b");
        assert_eq!(site_dir("index.html"), "");
    }

    #[test]
    fn site_relative_climbs_out_of_page_dir() {
        assert_eq!(
            site_relative("about", "css/site.css").as_deref(),
            Some("../css/site.css")
        );
    }

    #[test]
    fn site_relative_from_root() {
        assert_eq!(
            site_relative("", "about/index.html").as_deref(),
            Some("about/index.html")
        );
    }

    #[test]
    fn site_relative_same_dir() {
        assert_eq!(
            site_relative("blog/post", "blog/post/index.html").as_deref(),
            Some("index.html")
        );
        assert_eq!(site_relative("blog", "blog").as_deref(), Some("."));
    }

    #[test]
    fn site_relative_treats_leading_slashes_as_root() {
        assert_eq!(
            site_relative("a/b", "//c/d.html").as_deref(),
            Some("../../c/d.html")
        );
    }

    #[test]
    fn site_relative_rejects_escape() {
        assert_eq!(site_relative("a", "../../x"), None);
    }
}
