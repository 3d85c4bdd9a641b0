use std::collections::HashMap;

use serde::Serialize;
use tera::{Context, Tera};

use crate::theme::Theme;

#[derive(thiserror::Error, Debug)]
pub enum RenderError {
    #[error("template error: {0}")]
    Template(#[from] tera::Error),
}

/// Name under which issue bodies are registered while being expanded.
const CONTENT_TEMPLATE_NAME: &str = "__content_render__";

/// The template renderer, wrapping Tera.
pub struct Renderer {
    tera: Tera,
}

impl Renderer {
    /// Create a renderer from a theme's templates.
    pub fn new(theme: &Theme) -> Result<Self, RenderError> {
        let mut tera = Tera::default();
        tera.add_raw_templates(theme.templates.iter())?;
        Ok(Self { tera })
    }

    /// Render the web page of an issue.
    pub fn render_web(&self, context: &WebPageContext) -> Result<String, RenderError> {
        Ok(self.tera.render("web.html", &Context::from_serialize(context)?)?)
    }

    /// Render the email of an issue (before inlining).
    pub fn render_email(&self, context: &EmailContext) -> Result<String, RenderError> {
        Ok(self
            .tera
            .render("email.html", &Context::from_serialize(context)?)?)
    }

    /// Render the archive index listing all issues.
    pub fn render_archive(&self, context: &ArchiveContext) -> Result<String, RenderError> {
        Ok(self
            .tera
            .render("archive.html", &Context::from_serialize(context)?)?)
    }

    /// Render an issue body (markdown) through Tera before markdown processing.
    ///
    /// The body can use variables (`{{ page.title }}`), control flow, and the
    /// theme's macros as `macros::name(...)`.
    pub fn render_content(
        &mut self,
        content: &str,
        context: &ContentRenderContext,
    ) -> Result<String, RenderError> {
        let tera_context = Context::from_serialize(context)?;

        let content_with_imports = format!(
            "{{% import \"macros.html\" as macros %}}\n{}",
            content
        );

        self.tera
            .add_raw_template(CONTENT_TEMPLATE_NAME, &content_with_imports)?;

        let result = self.tera.render(CONTENT_TEMPLATE_NAME, &tera_context);

        self.tera.templates.remove(CONTENT_TEMPLATE_NAME);

        Ok(result?)
    }
}

/// Which output an issue is being rendered for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    Web,
    Email,
}

/// Newsletter-level information.
#[derive(Debug, Clone, Serialize)]
pub struct NewsletterContext {
    pub name: String,
    pub url: Option<String>,
    pub author: Option<String>,
}

/// Information about the current issue.
#[derive(Debug, Clone, Serialize)]
pub struct PageInfo {
    pub title: String,
    pub subject: String,
    pub preheader: Option<String>,
    pub description: Option<String>,
    pub date: Option<String>,
    pub author: Option<String>,
    pub slug: String,
    /// Public URL of the web variant
    pub url: String,
    /// Custom front matter fields (flattened to top level, e.g., `page.sponsor`)
    #[serde(flatten)]
    pub extra: HashMap<String, serde_yaml::Value>,
}

/// Build and tool information available as `letterpress.*`.
#[derive(Debug, Clone, Serialize)]
pub struct LetterpressContext {
    pub version: String,
}

impl Default for LetterpressContext {
    fn default() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Context available while expanding Tera syntax in an issue body.
#[derive(Debug, Serialize)]
pub struct ContentRenderContext {
    pub newsletter: NewsletterContext,
    pub page: PageInfo,
    pub theme: serde_json::Value,
    pub variant: Variant,
}

/// Context passed to `web.html`.
#[derive(Debug, Serialize)]
pub struct WebPageContext {
    pub newsletter: NewsletterContext,
    pub page: PageInfo,
    pub content: String,
    /// Table of contents for the current issue
    pub toc: Vec<TocEntry>,
    /// Theme settings from config, accessible as `theme.*` in templates
    pub theme: serde_json::Value,
    /// Page stylesheet, including the code highlighting theme
    pub styles: String,
    /// Relative path from this page back to the archive root (e.g. "../")
    pub root: String,
    pub letterpress: LetterpressContext,
}

/// Context passed to `email.html`.
#[derive(Debug, Serialize)]
pub struct EmailContext {
    pub newsletter: NewsletterContext,
    pub page: PageInfo,
    pub content: String,
    pub theme: serde_json::Value,
    /// Stylesheet to be inlined
    pub styles: String,
    /// Absolute URL of the web variant, if the newsletter has a public URL
    pub web_url: Option<String>,
}

/// Context passed to `archive.html`.
#[derive(Debug, Serialize)]
pub struct ArchiveContext {
    pub newsletter: NewsletterContext,
    pub issues: Vec<ArchiveEntry>,
    pub theme: serde_json::Value,
    pub styles: String,
    pub letterpress: LetterpressContext,
}

/// One issue in the archive listing.
#[derive(Debug, Clone, Serialize)]
pub struct ArchiveEntry {
    pub title: String,
    pub date: Option<String>,
    pub description: Option<String>,
    /// Path relative to the archive index (e.g. "issue-3/")
    pub path: String,
}

/// A table of contents entry for the current issue.
#[derive(Debug, Clone, Serialize)]
pub struct TocEntry {
    /// The heading text
    pub text: String,
    /// The heading id (for anchor links)
    pub id: String,
    /// The heading level (1-6)
    pub level: u8,
}
