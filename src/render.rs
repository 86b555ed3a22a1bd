//! Page render pipeline.
//!
//! Each page moves through five stages, all on a copy in the scratch area so
//! the source tree is never modified:
//!
//! ```text
//! Copied → MetadataStripped → MarkupApplied → TemplatesApplied → Written
//! ```
//!
//! The template stage runs either the page's override (`template:` in its
//! front matter) or its directory cascade (see [`crate::cascade`]). Each
//! template receives the previous step's output as `content`.
//!
//! The body stays raw bytes until markdown or a template needs text; a page
//! with neither is written out byte for byte. Text stages reject a body that
//! is not UTF-8.
//!
//! A failure is reported with the page's source path and the stage that was
//! running, and stops the build.

use crate::cascade::{self, CascadeError};
use crate::context::{TemplateData, TemplateError};
use crate::copy::create_dir_like;
use crate::frontmatter;
use crate::markup;
use crate::page::Page;
use crate::paths::PathResolutionError;
use crate::site::Site;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Copied,
    MetadataStripped,
    MarkupApplied,
    TemplatesApplied,
    Written,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::Copied => "copy",
            Stage::MetadataStripped => "front matter",
            Stage::MarkupApplied => "markup",
            Stage::TemplatesApplied => "templates",
            Stage::Written => "write",
        })
    }
}

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error(transparent)]
    Cascade(#[from] CascadeError),
    #[error(transparent)]
    PathResolution(#[from] PathResolutionError),
    #[error(transparent)]
    Template(#[from] TemplateError),
    #[error("Page body is not valid UTF-8: {0}")]
    Decode(#[from] std::string::FromUtf8Error),
}

/// A page that failed to render, with the stage it failed in.
#[derive(Error, Debug)]
#[error("{} ({stage} stage): {error}", page.display())]
pub struct PageFailure {
    pub page: PathBuf,
    pub stage: Stage,
    #[source]
    pub error: RenderError,
}

/// Templates a page will be rendered through, in execution order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplatePlan {
    pub keys: Vec<String>,
    /// True when the page's front matter named its own template.
    pub overridden: bool,
}

/// Where a page lands and which templates it goes through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageReport {
    pub source: PathBuf,
    pub target: String,
    pub plan: TemplatePlan,
}

/// Work out which templates apply to `page` without running them.
pub fn plan(site: &Site, page: &Page) -> Result<TemplatePlan, RenderError> {
    if let Some(reference) = page.meta.template.as_deref().filter(|t| !t.is_empty()) {
        return Ok(TemplatePlan {
            keys: vec![site.template_key(page, reference)?],
            overridden: true,
        });
    }

    let keys = cascade::resolve(&site.source_root, &site.source_path(page))?
        .iter()
        .map(|template| site.key_for_file(template))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(TemplatePlan {
        keys,
        overridden: false,
    })
}

fn at<E: Into<RenderError>>(stage: Stage) -> impl FnOnce(E) -> (Stage, RenderError) {
    move |error| (stage, error.into())
}

/// Render page `index` of `site` into `scratch`.
pub fn render_page(
    site: &Arc<Site>,
    index: usize,
    scratch: &Path,
) -> Result<PageReport, PageFailure> {
    let page = &site.pages[index];
    run(site, index, scratch).map_err(|(stage, error)| PageFailure {
        page: page.source.clone(),
        stage,
        error,
    })
}

fn run(
    site: &Arc<Site>,
    index: usize,
    scratch: &Path,
) -> Result<PageReport, (Stage, RenderError)> {
    let page = &site.pages[index];
    let output = scratch.join(&page.target);

    // Copied
    if let Some(parent) = output.parent() {
        create_dir_like(parent, &site.source_root).map_err(at(Stage::Copied))?;
    }
    fs::copy(site.source_path(page), &output).map_err(at(Stage::Copied))?;
    let permissions = fs::metadata(&output)
        .map_err(at(Stage::Copied))?
        .permissions();

    // MetadataStripped
    let split = frontmatter::extract_file(&output, true).map_err(at(Stage::MetadataStripped))?;
    let mut body = split.body;

    // MarkupApplied
    if page
        .extension()
        .is_some_and(|ext| site.config.patterns.is_markdown(ext))
    {
        let text = String::from_utf8(body).map_err(at(Stage::MarkupApplied))?;
        body = markup::render_markdown(&text).into_bytes();
    }

    // TemplatesApplied
    let plan = plan(site, page).map_err(at(Stage::TemplatesApplied))?;
    if !plan.keys.is_empty() {
        let mut content = String::from_utf8(body).map_err(at(Stage::TemplatesApplied))?;
        let data = TemplateData::new(Arc::clone(site), index);
        for key in &plan.keys {
            content = data
                .render(key, &content)
                .map_err(at(Stage::TemplatesApplied))?;
        }
        body = content.into_bytes();
    }

    // Written
    fs::write(&output, &body).map_err(at(Stage::Written))?;
    fs::set_permissions(&output, permissions).map_err(at(Stage::Written))?;

    tracing::debug!(
        page = %page.source.display(),
        target = %page.target,
        templates = ?plan.keys,
        "rendered"
    );

    Ok(PageReport {
        source: page.source.clone(),
        target: page.target.clone(),
        plan,
    })
}
