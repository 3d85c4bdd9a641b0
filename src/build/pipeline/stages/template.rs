//! Page template rendering stage.
//!
//! Wraps rendered HTML fragments in the theme's web and email templates.

use crate::build::paths::root_prefix;
use crate::build::pipeline::{PipelineContext, PipelineError, ProcessingDocument, Stage};
use crate::build::render::{EmailContext, WebPageContext};

/// Stage that applies the `web.html` and `email.html` templates.
///
/// The web page gets the TOC, its stylesheet (with the highlighting
/// theme) and a relative link back to the archive. The email gets the
/// email stylesheet, which the inline stage later moves into attributes,
/// and the absolute URL of the web variant when one is known.
///
/// After this stage both renditions have `html` set.
pub struct TemplateStage;

impl Stage for TemplateStage {
    fn name(&self) -> &'static str {
        "template"
    }

    fn process(
        &self,
        docs: &mut [ProcessingDocument],
        ctx: &mut PipelineContext,
    ) -> Result<(), PipelineError> {
        for doc in docs {
            let page = ctx.page_info(&doc.doc);

            let web_context = WebPageContext {
                newsletter: ctx.newsletter.clone(),
                page: page.clone(),
                content: doc.web.content.clone(),
                toc: doc.web.toc.clone(),
                theme: ctx.theme_settings.clone(),
                styles: ctx.web_styles.clone(),
                root: root_prefix(doc.slug()),
                letterpress: ctx.letterpress.clone(),
            };
            doc.web.html = Some(ctx.renderer.render_web(&web_context)?);

            let email_context = EmailContext {
                newsletter: ctx.newsletter.clone(),
                page,
                content: doc.email.content.clone(),
                theme: ctx.theme_settings.clone(),
                styles: ctx.theme.email_css.clone(),
                web_url: ctx.web_url(&doc.doc),
            };
            doc.email.html = Some(ctx.renderer.render_email(&email_context)?);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::pipeline::stages::test_support::{Fixture, doc};

    #[test]
    fn test_wraps_both_variants() {
        let tmp = tempfile::tempdir().unwrap();
        let mut fixture = Fixture::new(tmp.path());
        let mut docs = vec![doc(
            "issue-1.md",
            "---\ntitle: First Issue\npreheader: A quick look\n---\n",
        )];
        docs[0].web.content = "<p>web body</p>".to_string();
        docs[0].email.content = "<p>email body</p>".to_string();

        TemplateStage
            .process(&mut docs, &mut fixture.context())
            .unwrap();

        let web = docs[0].web.html.as_deref().unwrap();
        assert!(web.contains("<p>web body</p>"));
        assert!(web.contains("First Issue"));

        let email = docs[0].email.html.as_deref().unwrap();
        assert!(email.contains("<p>email body</p>"));
        assert!(email.contains("A quick look"));
        assert!(email.contains("https://notes.example.com/issue-1/"));
    }
}
