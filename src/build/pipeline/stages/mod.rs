//! Default pipeline stages.
//!
//! The standard issue processing pipeline consists of:
//!
//! 1. **TeraStage** - Process Tera syntax in markdown, once per variant
//! 2. **PlainTextStage** - Derive the plain-text email (optional)
//! 3. **MarkdownStage** - Convert markdown to web and email HTML fragments
//! 4. **TemplateStage** - Wrap fragments in the web and email templates
//! 5. **InlineStage** - Inline email CSS and compact whitespace
//! 6. **BudgetStage** - Measure the email against the byte budget
//! 7. **WriteStage** - Write outputs to the output directory
//!
//! Finalize stages: **ArchiveStage** (index page) and **ManifestStage** (JSON summary).

mod archive;
mod budget;
mod inline;
mod manifest;
mod markdown;
mod plaintext;
mod template;
mod tera;
mod write;

pub use archive::ArchiveStage;
pub use budget::BudgetStage;
pub use inline::InlineStage;
pub use manifest::ManifestStage;
pub use markdown::MarkdownStage;
pub use plaintext::PlainTextStage;
pub use template::TemplateStage;
pub use tera::TeraStage;
pub use write::WriteStage;

#[cfg(test)]
pub(crate) mod test_support {
    use std::path::{Path, PathBuf};

    use crate::build::budget::SizeBudget;
    use crate::build::document::Document;
    use crate::build::highlight::SyntaxHighlighter;
    use crate::build::pipeline::{PipelineContext, ProcessingDocument};
    use crate::build::render::{NewsletterContext, Renderer};
    use crate::config::{EmailConfig, MarkdownConfig};
    use crate::theme::Theme;

    /// Owned resources a `PipelineContext` borrows from.
    pub struct Fixture {
        pub output_dir: PathBuf,
        pub newsletter: NewsletterContext,
        pub settings: serde_json::Value,
        pub theme: Theme,
        pub markdown: MarkdownConfig,
        pub email: EmailConfig,
        pub budget: SizeBudget,
        pub highlighter: SyntaxHighlighter,
        pub renderer: Renderer,
    }

    impl Fixture {
        pub fn new(output_dir: &Path) -> Self {
            let theme = Theme::builtin();
            let renderer = Renderer::new(&theme).unwrap();
            Self {
                output_dir: output_dir.to_path_buf(),
                newsletter: NewsletterContext {
                    name: "Weekly Notes".to_string(),
                    url: Some("https://notes.example.com".to_string()),
                    author: Some("Ada".to_string()),
                },
                settings: serde_json::json!({}),
                theme,
                markdown: MarkdownConfig::default(),
                email: EmailConfig::default(),
                budget: SizeBudget::default(),
                highlighter: SyntaxHighlighter::default(),
                renderer,
            }
        }

        pub fn context(&mut self) -> PipelineContext<'_> {
            PipelineContext::new(
                &self.output_dir,
                &self.newsletter,
                &self.settings,
                &self.theme,
                &self.markdown,
                &self.email,
                self.budget,
                &self.highlighter,
                &mut self.renderer,
            )
        }
    }

    pub fn doc(path: &str, text: &str) -> ProcessingDocument {
        ProcessingDocument::new(Document::new(PathBuf::from(path), text))
    }
}
