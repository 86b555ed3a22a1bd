//! Shared test utilities for the rigid test suite.
//!
//! Builds throwaway source trees and offers lookups over a scanned [`Site`]
//! that panic with a readable message on a miss.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let (_tmp, site) = shared_site(&[
//!     ("_partial.template", "<main>{{ content }}</main>"),
//!     ("blog/post.md", "---\ntitle: Hello\n---\nBody"),
//! ]);
//!
//! assert_eq!(page_sources(&site), vec!["blog/post.md"]);
//! let page = find_page(&site, "blog/post.md");
//! assert_eq!(page.meta.title, "Hello");
//! ```

use std::fs;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

use crate::config::SiteConfig;
use crate::page::Page;
use crate::paths;
use crate::site::Site;

// =========================================================================
// Fixture setup
// =========================================================================

/// Output directory used by the helpers, inside the temp source root.
pub const OUTPUT_DIR: &str = "_output";

/// Write `(relative path, content)` pairs into a fresh temp directory.
pub fn site_tree(files: &[(&str, &str)]) -> TempDir {
    let tmp = TempDir::new().unwrap();
    write_files(tmp.path(), files);
    tmp
}

/// Write `(relative path, content)` pairs under `root`, creating parents.
pub fn write_files(root: &Path, files: &[(&str, &str)]) {
    for (rel, content) in files {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, content).unwrap();
    }
}

/// Scan a temp tree with the default config.
pub fn scan_default(tmp: &TempDir) -> Site {
    Site::scan(tmp.path(), &tmp.path().join(OUTPUT_DIR), SiteConfig::default()).unwrap()
}

/// Build a tree and scan it into a shared site.
///
/// The `TempDir` must be kept alive for as long as the site is used.
pub fn shared_site(files: &[(&str, &str)]) -> (TempDir, Arc<Site>) {
    let tmp = site_tree(files);
    let site = Arc::new(scan_default(&tmp));
    (tmp, site)
}

// =========================================================================
// Site lookups
// =========================================================================

/// Source paths of all pages in scan order, `/`-separated.
pub fn page_sources(site: &Site) -> Vec<String> {
    site.pages.iter().map(|p| paths::to_slash(&p.source)).collect()
}

/// Index of the page with the given source path. Panics if not found.
pub fn page_index(site: &Site, source: &str) -> usize {
    site.pages
        .iter()
        .position(|p| paths::to_slash(&p.source) == source)
        .unwrap_or_else(|| {
            let sources = page_sources(site);
            panic!("page '{source}' not found. Available: {sources:?}")
        })
}

/// Find a page by source path. Panics if not found.
pub fn find_page<'a>(site: &'a Site, source: &str) -> &'a Page {
    &site.pages[page_index(site, source)]
}

/// Read a file under `root` as a string. Panics with the path on failure.
pub fn read(root: &Path, rel: &str) -> String {
    let path = root.join(rel);
    fs::read_to_string(&path).unwrap_or_else(|e| panic!("reading {}: {e}", path.display()))
}
