//! Email inlining stage.

use crate::build::inline::{compact_html, inline_styles};
use crate::build::pipeline::{PipelineContext, PipelineError, ProcessingDocument, Stage};

/// Stage that moves the email stylesheet into `style` attributes and,
/// when `email.compact` is set, collapses insignificant whitespace.
///
/// The web variant is left as rendered.
pub struct InlineStage;

impl Stage for InlineStage {
    fn name(&self) -> &'static str {
        "inline"
    }

    fn process(
        &self,
        docs: &mut [ProcessingDocument],
        ctx: &mut PipelineContext,
    ) -> Result<(), PipelineError> {
        for doc in docs {
            let html = doc.email.html.as_ref().ok_or_else(|| {
                PipelineError::stage(
                    "inline",
                    format!(
                        "issue '{}' has no email HTML (was template stage run?)",
                        doc.slug()
                    ),
                )
            })?;

            let mut inlined = inline_styles(html)?;
            if ctx.email_config.compact {
                inlined = compact_html(&inlined);
            }

            tracing::trace!(
                slug = doc.slug(),
                before = html.len(),
                after = inlined.len(),
                "inlined email"
            );
            doc.email.html = Some(inlined);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::pipeline::stages::test_support::{Fixture, doc};

    #[test]
    fn test_inlines_and_compacts_email() {
        let tmp = tempfile::tempdir().unwrap();
        let mut fixture = Fixture::new(tmp.path());
        let mut docs = vec![doc("issue-1.md", "")];
        docs[0].email.html = Some(
            "<html><head><style>p { color: red; }</style></head><body>\n    <p>Hi</p>\n</body></html>"
                .to_string(),
        );
        docs[0].web.html = Some("<style>p { color: red; }</style>".to_string());

        InlineStage
            .process(&mut docs, &mut fixture.context())
            .unwrap();

        let email = docs[0].email.html.as_deref().unwrap();
        assert!(!email.contains("<style"));
        assert!(email.contains("color: red"));
        assert!(!email.contains("    "));
        assert_eq!(
            docs[0].web.html.as_deref(),
            Some("<style>p { color: red; }</style>")
        );
    }

    #[test]
    fn test_requires_template_output() {
        let tmp = tempfile::tempdir().unwrap();
        let mut fixture = Fixture::new(tmp.path());
        let mut docs = vec![doc("issue-1.md", "")];

        let err = InlineStage
            .process(&mut docs, &mut fixture.context())
            .unwrap_err();
        assert!(err.to_string().contains("no email HTML"));
    }
}
