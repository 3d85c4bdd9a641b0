//! Archive index stage.

use std::cmp::Ordering;

use crate::build::paths::ARCHIVE_FILE;
use crate::build::pipeline::{FinalizeStage, PipelineContext, PipelineError, ProcessingDocument};
use crate::build::render::{ArchiveContext, ArchiveEntry};

use super::write::write_file;

/// Finalize stage that writes `index.html` listing every published issue,
/// newest first. Drafts are left out even when built.
pub struct ArchiveStage;

impl FinalizeStage for ArchiveStage {
    fn name(&self) -> &'static str {
        "archive"
    }

    fn finalize(
        &self,
        docs: &[ProcessingDocument],
        ctx: &PipelineContext,
    ) -> Result<(), PipelineError> {
        let mut published: Vec<&ProcessingDocument> =
            docs.iter().filter(|doc| !doc.doc.is_draft()).collect();
        published.sort_by(|a, b| newest_first(a, b));

        let issues = published
            .into_iter()
            .map(|doc| ArchiveEntry {
                title: doc.title(),
                date: doc.doc.front_matter.date.clone(),
                description: doc.doc.front_matter.description.clone(),
                path: format!("{}/", doc.slug()),
            })
            .collect::<Vec<_>>();

        let context = ArchiveContext {
            newsletter: ctx.newsletter.clone(),
            issues,
            theme: ctx.theme_settings.clone(),
            styles: ctx.theme.web_css.clone(),
            letterpress: ctx.letterpress.clone(),
        };
        let html = ctx.renderer.render_archive(&context)?;
        write_file(&ctx.output_dir.join(ARCHIVE_FILE), &html)?;

        tracing::debug!(issues = context.issues.len(), "wrote archive");
        Ok(())
    }
}

/// Dated issues newest first, undated ones after them, ties by slug.
fn newest_first(a: &ProcessingDocument, b: &ProcessingDocument) -> Ordering {
    let (a_date, b_date) = (&a.doc.front_matter.date, &b.doc.front_matter.date);
    match (a_date, b_date) {
        (Some(x), Some(y)) => y.cmp(x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
    .then_with(|| a.slug().cmp(b.slug()))
}
