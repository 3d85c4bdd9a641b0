//! Plain-text rendition stage.

use crate::build::pipeline::{PipelineContext, PipelineError, ProcessingDocument, Stage};
use crate::build::plaintext::render_plain_text;

/// Stage that derives the `text/plain` email part.
///
/// Runs right after the tera stage, on the email variant's expanded
/// markdown, so anything written for email only also appears in the text.
/// Macro HTML is reduced to its text and links.
pub struct PlainTextStage;

impl Stage for PlainTextStage {
    fn name(&self) -> &'static str {
        "plaintext"
    }

    fn process(
        &self,
        docs: &mut [ProcessingDocument],
        ctx: &mut PipelineContext,
    ) -> Result<(), PipelineError> {
        for doc in docs {
            let mut text = String::new();
            let title = doc.title();
            text.push_str(&title);
            text.push('\n');
            text.push_str(&"=".repeat(title.chars().count()));
            text.push_str("\n\n");
            let link_base = ctx.link_base(&doc.doc);
            text.push_str(&render_plain_text(
                &doc.email.content,
                ctx.markdown_config,
                link_base.as_ref(),
            )?);

            if let Some(url) = ctx.web_url(&doc.doc) {
                text.push_str("\n----\nRead online: ");
                text.push_str(&url);
                text.push('\n');
            }

            doc.plain_text = Some(text);
        }

        Ok(())
    }
}
