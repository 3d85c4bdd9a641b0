//! Build manifest stage.

use serde::Serialize;

use crate::build::budget::BudgetReport;
use crate::build::paths::{EMAIL_FILE, MANIFEST_FILE, TEXT_FILE, WEB_FILE};
use crate::build::pipeline::{FinalizeStage, PipelineContext, PipelineError, ProcessingDocument};

use super::write::write_file;

#[derive(Debug, Serialize)]
struct Manifest<'a> {
    newsletter: &'a str,
    generator: String,
    issues: Vec<ManifestIssue>,
}

#[derive(Debug, Serialize)]
struct ManifestIssue {
    slug: String,
    title: String,
    subject: String,
    date: Option<String>,
    draft: bool,
    web: String,
    email: String,
    text: Option<String>,
    web_bytes: usize,
    email_bytes: usize,
    budget: Option<BudgetReport>,
}

/// Finalize stage that writes `manifest.json`: one entry per issue with
/// its output paths, subject line and email size, for sending tools to
/// pick up.
pub struct ManifestStage;

impl FinalizeStage for ManifestStage {
    fn name(&self) -> &'static str {
        "manifest"
    }

    fn finalize(
        &self,
        docs: &[ProcessingDocument],
        ctx: &PipelineContext,
    ) -> Result<(), PipelineError> {
        let issues = docs
            .iter()
            .map(|doc| ManifestIssue {
                slug: doc.slug().to_string(),
                title: doc.title(),
                subject: doc.doc.subject(),
                date: doc.doc.front_matter.date.clone(),
                draft: doc.doc.is_draft(),
                web: format!("{}/{}", doc.slug(), WEB_FILE),
                email: format!("{}/{}", doc.slug(), EMAIL_FILE),
                text: doc
                    .plain_text
                    .as_ref()
                    .map(|_| format!("{}/{}", doc.slug(), TEXT_FILE)),
                web_bytes: doc.web.html.as_ref().map_or(0, String::len),
                email_bytes: doc.email.html.as_ref().map_or(0, String::len),
                budget: doc.budget,
            })
            .collect();

        let manifest = Manifest {
            newsletter: &ctx.newsletter.name,
            generator: format!("letterpress {}", ctx.letterpress.version),
            issues,
        };
        let json = serde_json::to_string_pretty(&manifest)?;
        write_file(&ctx.output_dir.join(MANIFEST_FILE), &json)?;

        Ok(())
    }
}
