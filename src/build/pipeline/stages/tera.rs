//! Tera template processing stage.
//!
//! Processes Tera syntax in issue bodies, expanding macros, variables,
//! and control structures before markdown rendering.

use crate::build::pipeline::{PipelineContext, PipelineError, ProcessingDocument, Stage};
use crate::build::render::{ContentRenderContext, Variant};
use crate::util::error_chain;

/// Stage that processes Tera syntax in markdown content.
///
/// The body is expanded once per variant so authors can write
/// `{% if variant == "email" %}...{% endif %}`, and use the theme's
/// macros as `{{ macros::button(url="...", label="...") }}`.
pub struct TeraStage;

impl Stage for TeraStage {
    fn name(&self) -> &'static str {
        "tera"
    }

    fn process(
        &self,
        docs: &mut [ProcessingDocument],
        ctx: &mut PipelineContext,
    ) -> Result<(), PipelineError> {
        for doc in docs {
            let page = ctx.page_info(&doc.doc);
            let source = doc.doc.source_path.display().to_string();

            for variant in [Variant::Web, Variant::Email] {
                let content_context = ContentRenderContext {
                    newsletter: ctx.newsletter.clone(),
                    page: page.clone(),
                    theme: ctx.theme_settings.clone(),
                    variant,
                };

                let rendition = doc.rendition_mut(variant);
                let processed = ctx
                    .renderer
                    .render_content(&rendition.content, &content_context)
                    .map_err(|e| {
                        PipelineError::stage(
                            "tera",
                            format!("{}: {}", source, error_chain(&e)),
                        )
                    })?;
                rendition.content = processed;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::pipeline::stages::test_support::{Fixture, doc};

    #[test]
    fn test_expands_per_variant() {
        let tmp = tempfile::tempdir().unwrap();
        let mut fixture = Fixture::new(tmp.path());
        let mut docs = vec![doc(
            "issue-1.md",
            "---\ntitle: First\n---\n# {{ page.title }}\n{% if variant == \"email\" %}mail{% else %}web{% endif %}",
        )];

        TeraStage.process(&mut docs, &mut fixture.context()).unwrap();

        assert_eq!(docs[0].web.content.trim(), "# First\nweb");
        assert_eq!(docs[0].email.content.trim(), "# First\nmail");
    }

    #[test]
    fn test_macros_available() {
        let tmp = tempfile::tempdir().unwrap();
        let mut fixture = Fixture::new(tmp.path());
        let mut docs = vec![doc(
            "issue-1.md",
            "{{ macros::button(url=\"https://example.com\", label=\"Read\") }}",
        )];

        TeraStage.process(&mut docs, &mut fixture.context()).unwrap();

        assert!(docs[0].email.content.contains("https://example.com"));
        assert!(docs[0].email.content.contains("Read"));
    }

    #[test]
    fn test_error_names_source_file() {
        let tmp = tempfile::tempdir().unwrap();
        let mut fixture = Fixture::new(tmp.path());
        let mut docs = vec![doc("broken.md", "{{ unclosed")];

        let err = TeraStage
            .process(&mut docs, &mut fixture.context())
            .unwrap_err();

        assert!(err.to_string().contains("broken.md"));
    }
}
