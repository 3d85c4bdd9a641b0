//! Pipeline context for sharing state across stages.

use std::path::Path;

use crate::build::budget::SizeBudget;
use crate::build::document::Document;
use crate::build::highlight::SyntaxHighlighter;
use crate::build::markdown::LinkBase;
use crate::build::render::{LetterpressContext, NewsletterContext, PageInfo, Renderer};
use crate::config::{EmailConfig, MarkdownConfig};
use crate::theme::Theme;

/// Shared context for pipeline stages.
///
/// Contains all resources and configuration needed by stages during processing.
pub struct PipelineContext<'a> {
    // === Output configuration ===
    /// Directory where output files are written
    pub output_dir: &'a Path,

    // === Newsletter-level data ===
    pub newsletter: &'a NewsletterContext,

    /// Theme settings passed to templates
    pub theme_settings: &'a serde_json::Value,

    pub theme: &'a Theme,

    pub markdown_config: &'a MarkdownConfig,

    pub email_config: &'a EmailConfig,

    /// Byte budget for the email variant
    pub budget: SizeBudget,

    // === Services ===
    /// Syntax highlighter for code blocks on the web variant
    pub highlighter: &'a SyntaxHighlighter,

    /// Template renderer (needs mutable access for render_content)
    pub renderer: &'a mut Renderer,

    /// Web stylesheet with the highlighting theme appended
    pub web_styles: String,

    pub letterpress: LetterpressContext,
}

impl<'a> PipelineContext<'a> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        output_dir: &'a Path,
        newsletter: &'a NewsletterContext,
        theme_settings: &'a serde_json::Value,
        theme: &'a Theme,
        markdown_config: &'a MarkdownConfig,
        email_config: &'a EmailConfig,
        budget: SizeBudget,
        highlighter: &'a SyntaxHighlighter,
        renderer: &'a mut Renderer,
    ) -> Self {
        let mut web_styles = theme.web_css.clone();
        if let Some(css) = highlighter.generate_css() {
            web_styles.push('\n');
            web_styles.push_str(&css);
        }

        Self {
            output_dir,
            newsletter,
            theme_settings,
            theme,
            markdown_config,
            email_config,
            budget,
            highlighter,
            renderer,
            web_styles,
            letterpress: LetterpressContext::default(),
        }
    }

    /// Template-facing information about an issue.
    pub fn page_info(&self, doc: &Document) -> PageInfo {
        let fm = &doc.front_matter;
        PageInfo {
            title: doc.title(),
            subject: doc.subject(),
            preheader: fm.preheader.clone(),
            description: fm.description.clone(),
            date: fm.date.clone(),
            author: fm.author.clone().or_else(|| self.newsletter.author.clone()),
            slug: doc.slug.clone(),
            url: doc.web_url(self.newsletter.url.as_deref()),
            extra: fm.extra.clone(),
        }
    }

    /// Base for absolutizing email links; `None` without a public URL.
    pub fn link_base(&self, doc: &Document) -> Option<LinkBase> {
        self.newsletter
            .url
            .as_deref()
            .map(|site_url| LinkBase::new(site_url, &doc.web_url(Some(site_url))))
    }

    /// Absolute URL of the web variant, if the newsletter has a public URL.
    pub fn web_url(&self, doc: &Document) -> Option<String> {
        self.newsletter
            .url
            .as_deref()
            .map(|site_url| doc.web_url(Some(site_url)))
    }
}
