//! Markdown rendering stage.
//!
//! Renders both variants of each issue to HTML fragments.

use crate::build::markdown::{RenderMode, render_markdown};
use crate::build::pipeline::{PipelineContext, PipelineError, ProcessingDocument, Stage};

/// Stage that renders markdown to HTML.
///
/// - The web variant gets heading permalinks and highlighted code.
/// - The email variant gets plain code blocks, task-list glyphs and,
///   when the newsletter has a public URL, absolute links.
///
/// After this stage each rendition's `content` holds HTML and its `toc`
/// the extracted headings.
pub struct MarkdownStage;

impl Stage for MarkdownStage {
    fn name(&self) -> &'static str {
        "markdown"
    }

    fn process(
        &self,
        docs: &mut [ProcessingDocument],
        ctx: &mut PipelineContext,
    ) -> Result<(), PipelineError> {
        for doc in docs {
            let web = render_markdown(
                &doc.web.content,
                &RenderMode::Web {
                    highlighter: ctx.highlighter,
                },
                ctx.markdown_config,
            )
            .map_err(|e| {
                PipelineError::stage(
                    "markdown",
                    format!("failed to render {}: {}", doc.doc.source_path.display(), e),
                )
            })?;

            let links = ctx.link_base(&doc.doc);
            let email = render_markdown(
                &doc.email.content,
                &RenderMode::Email {
                    links: links.as_ref(),
                },
                ctx.markdown_config,
            )
            .map_err(|e| {
                PipelineError::stage(
                    "markdown",
                    format!("failed to render {}: {}", doc.doc.source_path.display(), e),
                )
            })?;

            doc.web.content = web.html;
            doc.web.toc = web.toc;
            doc.email.content = email.html;
            doc.email.toc = email.toc;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::pipeline::stages::test_support::{Fixture, doc};

    #[test]
    fn test_renders_both_variants() {
        let tmp = tempfile::tempdir().unwrap();
        let mut fixture = Fixture::new(tmp.path());
        let mut docs = vec![doc(
            "issue-1.md",
            "## Links\n\n- [ ] todo\n\n[archive](/)\n",
        )];

        MarkdownStage
            .process(&mut docs, &mut fixture.context())
            .unwrap();

        let processed = &docs[0];
        assert!(processed.web.content.contains("header-anchor"));
        assert!(!processed.email.content.contains("header-anchor"));
        assert!(processed.email.content.contains("href=\"https://notes.example.com/\""));
        assert!(processed.email.content.contains('☐'));
        assert_eq!(processed.web.toc.len(), 1);
        assert_eq!(processed.web.toc[0].id, "links");
    }
}
