//! Site configuration module.
//!
//! Handles loading and validating the optional `rigid.toml` in the source
//! root. Every key has a default, so a site without a config file builds with
//! the stock settings; a config file only needs the keys it changes.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [patterns]
//! pages = ["*.md", "*.markdown", "*.html"]   # files rendered as pages
//! templates = ["*.template"]                 # files registered as templates
//! markdown = ["md", "markdown"]              # page extensions run through markdown
//!
//! [copy]
//! hidden_files = true       # copy dotfiles such as .htaccess
//! temporary_files = false   # copy editor backups ending in ~
//! follow_symlinks = false   # copy symlink targets instead of skipping links
//! exclude = []              # extra glob patterns never copied
//! include = []              # when non-empty, only matching files are copied
//!
//! [sitemap]
//! order = "public-path"     # or "scan" for discovery order
//! ```
//!
//! Patterns are shell globs matched against file names. Unknown keys are
//! rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Name of the config file looked up in the source root.
pub const CONFIG_FILE: &str = "rigid.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Site configuration loaded from `rigid.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Which files are pages, templates and markdown.
    pub patterns: PatternsConfig,
    /// Rules for copying non-page files to the output.
    pub copy: CopyConfig,
    /// Behavior of the `sitemap()` template function.
    pub sitemap: SitemapConfig,
}

/// File classification patterns.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PatternsConfig {
    /// Globs for files rendered as pages.
    pub pages: Vec<String>,
    /// Globs for files registered as templates.
    pub templates: Vec<String>,
    /// Page extensions (without dot) converted from markdown to HTML.
    pub markdown: Vec<String>,
}

impl Default for PatternsConfig {
    fn default() -> Self {
        Self {
            pages: vec!["*.md".into(), "*.markdown".into(), "*.html".into()],
            templates: vec!["*.template".into()],
            markdown: vec!["md".into(), "markdown".into()],
        }
    }
}

impl PatternsConfig {
    /// Compiled page globs.
    pub fn page_patterns(&self) -> Result<Vec<glob::Pattern>, ConfigError> {
        compile_patterns("patterns.pages", &self.pages)
    }

    /// Compiled template globs.
    pub fn template_patterns(&self) -> Result<Vec<glob::Pattern>, ConfigError> {
        compile_patterns("patterns.templates", &self.templates)
    }

    /// True if `extension` names a markdown format.
    pub fn is_markdown(&self, extension: &str) -> bool {
        self.markdown
            .iter()
            .any(|ext| ext.eq_ignore_ascii_case(extension))
    }
}

/// Copy filter settings for non-page source files.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CopyConfig {
    pub hidden_files: bool,
    pub temporary_files: bool,
    pub follow_symlinks: bool,
    /// Extra globs that are never copied.
    pub exclude: Vec<String>,
    /// When non-empty, only files matching one of these are copied.
    pub include: Vec<String>,
}

impl Default for CopyConfig {
    fn default() -> Self {
        Self {
            hidden_files: true,
            temporary_files: false,
            follow_symlinks: false,
            exclude: Vec::new(),
            include: Vec::new(),
        }
    }
}

impl CopyConfig {
    /// Compiled `exclude` globs.
    pub fn exclude_patterns(&self) -> Result<Vec<glob::Pattern>, ConfigError> {
        compile_patterns("copy.exclude", &self.exclude)
    }

    /// Compiled `include` globs.
    pub fn include_patterns(&self) -> Result<Vec<glob::Pattern>, ConfigError> {
        compile_patterns("copy.include", &self.include)
    }
}

/// Ordering of the pages listed by `sitemap()`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SitemapOrder {
    /// Sorted by public path.
    #[default]
    PublicPath,
    /// The order pages were discovered during the scan.
    Scan,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SitemapConfig {
    pub order: SitemapOrder,
}

fn compile_patterns(key: &str, patterns: &[String]) -> Result<Vec<glob::Pattern>, ConfigError> {
    patterns
        .iter()
        .map(|p| {
            glob::Pattern::new(p)
                .map_err(|e| ConfigError::Validation(format!("{key}: invalid pattern {p:?}: {e}")))
        })
        .collect()
}

impl SiteConfig {
    /// Validate that all patterns compile and classification is possible.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.patterns.pages.is_empty() {
            return Err(ConfigError::Validation(
                "patterns.pages must not be empty".into(),
            ));
        }
        if self.patterns.templates.is_empty() {
            return Err(ConfigError::Validation(
                "patterns.templates must not be empty".into(),
            ));
        }
        self.patterns.page_patterns()?;
        self.patterns.template_patterns()?;
        self.copy.exclude_patterns()?;
        self.copy.include_patterns()?;
        Ok(())
    }
}

/// Load `rigid.toml` from the given directory.
///
/// Returns the stock defaults when the file does not exist.
pub fn load_config(root: &Path) -> Result<SiteConfig, ConfigError> {
    let config_path = root.join(CONFIG_FILE);
    if !config_path.exists() {
        return Ok(SiteConfig::default());
    }
    let content = fs::read_to_string(&config_path)?;
    let config: SiteConfig = toml::from_str(&content)?;
    config.validate()?;
    Ok(config)
}

/// Returns a fully-commented stock `rigid.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# rigid configuration
# ===================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Place this file in the source root. It is never copied to the output.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# File classification
# ---------------------------------------------------------------------------
[patterns]
# Glob patterns (matched against file names) for files rendered as pages.
pages = ["*.md", "*.markdown", "*.html"]

# Glob patterns for files registered as templates. Directory templates are
# _current.template, _partial.template and _final.template.
templates = ["*.template"]

# Page extensions converted from markdown to HTML before templating.
markdown = ["md", "markdown"]

# ---------------------------------------------------------------------------
# Copying non-page files
# ---------------------------------------------------------------------------
[copy]
# Copy dotfiles such as .htaccess (hidden directories are never copied).
hidden_files = true

# Copy editor backup files ending in ~.
temporary_files = false

# Copy the targets of symlinks instead of skipping them.
follow_symlinks = false

# Extra glob patterns that are never copied. Each is matched against the
# file name and the path from the source root; `*` does not cross a `/`.
exclude = []

# When non-empty, only files matching one of these globs are copied.
include = []

# ---------------------------------------------------------------------------
# sitemap() template function
# ---------------------------------------------------------------------------
[sitemap]
# "public-path" sorts pages by URL; "scan" keeps discovery order.
order = "public-path"
"##
}
