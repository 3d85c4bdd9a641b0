//! Document types for pipeline processing.

use crate::build::budget::BudgetReport;
use crate::build::document::Document;
use crate::build::render::{TocEntry, Variant};

/// One output variant of an issue as it moves through the pipeline.
#[derive(Debug, Clone, Default)]
pub struct Rendition {
    /// Starts as the raw markdown body; markdown after the tera stage,
    /// an HTML fragment after the markdown stage.
    pub content: String,

    /// Table of contents, populated by the markdown stage.
    pub toc: Vec<TocEntry>,

    /// Full HTML document, populated by the template stage
    /// (and rewritten by the inline stage for email).
    pub html: Option<String>,
}

/// An issue being processed through the pipeline.
///
/// 1. Initially: both renditions hold the raw markdown body
/// 2. After tera: per-variant markdown with macros expanded
/// 3. After markdown: HTML fragments and TOC
/// 4. After template: full HTML documents
/// 5. After inline: email HTML with inline styles
/// 6. After budget: `budget` populated
#[derive(Debug)]
pub struct ProcessingDocument {
    /// The original document (metadata and raw content)
    pub doc: Document,

    pub web: Rendition,

    pub email: Rendition,

    /// Plain-text rendition, when enabled
    pub plain_text: Option<String>,

    /// Email size measured against the byte budget
    pub budget: Option<BudgetReport>,
}

impl ProcessingDocument {
    pub fn new(doc: Document) -> Self {
        let rendition = Rendition {
            content: doc.raw_content.clone(),
            ..Rendition::default()
        };
        Self {
            doc,
            web: rendition.clone(),
            email: rendition,
            plain_text: None,
            budget: None,
        }
    }

    pub fn rendition(&self, variant: Variant) -> &Rendition {
        match variant {
            Variant::Web => &self.web,
            Variant::Email => &self.email,
        }
    }

    pub fn rendition_mut(&mut self, variant: Variant) -> &mut Rendition {
        match variant {
            Variant::Web => &mut self.web,
            Variant::Email => &mut self.email,
        }
    }

    pub fn slug(&self) -> &str {
        &self.doc.slug
    }

    pub fn title(&self) -> String {
        self.doc.title()
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn test_new_seeds_both_renditions() {
        let doc = Document::new(PathBuf::from("issue-1.md"), "---\ntitle: One\n---\nBody");
        let mut processing = ProcessingDocument::new(doc);

        assert_eq!(processing.rendition(Variant::Web).content, "Body");
        assert_eq!(processing.rendition(Variant::Email).content, "Body");

        processing.rendition_mut(Variant::Email).content = "changed".to_string();
        assert_eq!(processing.web.content, "Body");
        assert_eq!(processing.slug(), "issue-1");
        assert_eq!(processing.title(), "One");
    }
}
