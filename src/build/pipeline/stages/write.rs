//! File writing stage.
//!
//! Writes each issue's outputs to the filesystem.

use std::path::Path;

use crate::build::paths::{email_output_path, text_output_path, web_output_path};
use crate::build::pipeline::{PipelineContext, PipelineError, ProcessingDocument, Stage};

/// Stage that writes rendered issues to the output directory.
///
/// For each issue: `<slug>/index.html`, `<slug>/email.html` and, when a
/// plain-text rendition exists, `<slug>/email.txt`. Parent directories
/// are created as needed.
pub struct WriteStage;

impl Stage for WriteStage {
    fn name(&self) -> &'static str {
        "write"
    }

    fn process(
        &self,
        docs: &mut [ProcessingDocument],
        ctx: &mut PipelineContext,
    ) -> Result<(), PipelineError> {
        for doc in docs {
            let missing = |variant: &str| {
                PipelineError::stage(
                    "write",
                    format!(
                        "issue '{}' has no {} HTML (was template stage run?)",
                        doc.slug(),
                        variant
                    ),
                )
            };
            let web = doc.web.html.as_ref().ok_or_else(|| missing("web"))?;
            let email = doc.email.html.as_ref().ok_or_else(|| missing("email"))?;

            write_file(&web_output_path(doc.slug(), ctx.output_dir), web)?;
            write_file(&email_output_path(doc.slug(), ctx.output_dir), email)?;

            let text_path = text_output_path(doc.slug(), ctx.output_dir);
            match &doc.plain_text {
                Some(text) => write_file(&text_path, text)?,
                // Stale from a build with plain text enabled
                None if text_path.exists() => std::fs::remove_file(&text_path)?,
                None => {}
            }

            tracing::debug!(slug = doc.slug(), "wrote issue");
        }

        Ok(())
    }
}

pub(crate) fn write_file(path: &Path, contents: &str) -> Result<(), PipelineError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, contents)?;
    Ok(())
}
