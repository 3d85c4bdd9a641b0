use std::collections::HashMap;
use std::path::PathBuf;

use crate::config::Config;
use crate::theme::{Theme, ThemeError};

use super::budget::BudgetReport;
use super::document::Document;
use super::highlight::SyntaxHighlighter;
use super::pipeline::{Pipeline, PipelineContext, PipelineError, ProcessingDocument};
use super::render::{NewsletterContext, RenderError, Renderer};
use super::source::{IssueSource, SourceError, discover_issues};

#[derive(thiserror::Error, Debug)]
pub enum BuildError {
    #[error("source error: {0}")]
    Source(#[from] SourceError),

    #[error("theme error: {0}")]
    Theme(#[from] ThemeError),

    #[error("render error: {0}")]
    Render(#[from] RenderError),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error("issues {first} and {second} both use the slug '{slug}'")]
    DuplicateSlug {
        slug: String,
        first: PathBuf,
        second: PathBuf,
    },
}

/// Size and budget information for one processed issue.
#[derive(Debug, Clone)]
pub struct IssueSummary {
    pub slug: String,
    pub title: String,
    pub web_bytes: usize,
    pub email_bytes: usize,
    pub text_bytes: Option<usize>,
    pub budget: BudgetReport,
}

#[derive(Debug)]
pub struct BuildResult {
    pub output_dir: PathBuf,
    pub issues: Vec<IssueSummary>,
    /// Drafts found but not built
    pub skipped_drafts: usize,
}

impl BuildResult {
    /// Issues whose email exceeds the hard limit.
    pub fn over_hard_limit(&self) -> impl Iterator<Item = &IssueSummary> {
        self.issues.iter().filter(|issue| issue.budget.is_over_hard())
    }
}

pub struct Builder {
    config: Config,
    /// Base path for resolving relative paths (typically the config file's directory)
    base_path: PathBuf,
    include_drafts: bool,
    /// Explicit issue files; empty means every issue in the content directory
    files: Vec<PathBuf>,
}

impl Builder {
    pub fn new(config: Config, base_path: PathBuf) -> Self {
        Self {
            config,
            base_path,
            include_drafts: false,
            files: Vec::new(),
        }
    }

    /// Build issues marked `draft: true` too.
    pub fn with_drafts(mut self, include_drafts: bool) -> Self {
        self.include_drafts = include_drafts;
        self
    }

    /// Only process the given files. The archive and manifest are not
    /// rewritten, since they would list just these issues.
    pub fn with_files(mut self, files: Vec<PathBuf>) -> Self {
        self.files = files;
        self
    }

    /// Render, check and write every issue.
    ///
    /// With `budget.enforce`, an email over the hard limit aborts the build
    /// before any file is written.
    pub fn build(&self) -> Result<BuildResult, BuildError> {
        let mut pipeline = Pipeline::for_config(&self.config);
        if !self.files.is_empty() {
            pipeline = pipeline.without_finalize_stages();
        }
        self.run(&pipeline)
    }

    /// Render and measure every issue without writing anything.
    pub fn check(&self) -> Result<BuildResult, BuildError> {
        self.run(&Pipeline::preview(&self.config))
    }

    /// Get the output directory path, resolved against base_path.
    pub fn output_dir(&self) -> PathBuf {
        Config::resolve_path(&self.config.newsletter.output, &self.base_path)
    }

    /// Get the content directory path, resolved against base_path.
    pub fn content_dir(&self) -> PathBuf {
        Config::resolve_path(&self.config.content, &self.base_path)
    }

    /// Get the custom theme directory, if one is configured.
    pub fn theme_dir(&self) -> Option<PathBuf> {
        self.config
            .theme
            .path
            .as_ref()
            .map(|path| Config::resolve_path(path, &self.base_path))
    }

    fn run(&self, pipeline: &Pipeline) -> Result<BuildResult, BuildError> {
        let (documents, skipped_drafts) = self.load_documents()?;
        tracing::info!(
            issues = documents.len(),
            skipped_drafts,
            "loaded issues from {}",
            self.content_dir().display()
        );

        let theme = Theme::load(self.theme_dir().as_deref())?;
        let mut renderer = Renderer::new(&theme)?;
        let highlighter = SyntaxHighlighter::new(&self.config.theme.highlight);

        let output_dir = self.output_dir();
        let newsletter = NewsletterContext {
            name: self.config.newsletter.name.clone(),
            url: self.config.newsletter.url.clone(),
            author: self.config.newsletter.author.clone(),
        };
        let budget = self.config.budget.size_budget();

        let mut ctx = PipelineContext::new(
            &output_dir,
            &newsletter,
            &self.config.theme.settings,
            &theme,
            &self.config.markdown,
            &self.config.email,
            budget,
            &highlighter,
            &mut renderer,
        );

        let mut docs: Vec<ProcessingDocument> =
            documents.into_iter().map(ProcessingDocument::new).collect();
        pipeline.run(&mut docs, &mut ctx)?;

        let issues = docs
            .iter()
            .map(|doc| {
                let email_bytes = doc.email.html.as_ref().map_or(0, String::len);
                IssueSummary {
                    slug: doc.slug().to_string(),
                    title: doc.title(),
                    web_bytes: doc.web.html.as_ref().map_or(0, String::len),
                    email_bytes,
                    text_bytes: doc.plain_text.as_ref().map(String::len),
                    budget: doc
                        .budget
                        .unwrap_or_else(|| budget.check_bytes(email_bytes)),
                }
            })
            .collect();

        Ok(BuildResult {
            output_dir,
            issues,
            skipped_drafts,
        })
    }

    /// The issue files to process.
    fn sources(&self) -> Result<Vec<IssueSource>, SourceError> {
        let content_dir = self.content_dir();
        if self.files.is_empty() {
            discover_issues(&content_dir)
        } else {
            self.files
                .iter()
                .map(|file| IssueSource::from_file(file, &content_dir))
                .collect()
        }
    }

    /// Load documents, dropping drafts unless requested and rejecting
    /// duplicate slugs.
    ///
    /// Explicitly named files are always built, drafts or not.
    fn load_documents(&self) -> Result<(Vec<Document>, usize), BuildError> {
        let mut documents = Vec::new();
        let mut skipped_drafts = 0;
        let mut seen: HashMap<String, PathBuf> = HashMap::new();

        for source in self.sources()? {
            let doc = source.load()?;

            if doc.is_draft() && !self.include_drafts && self.files.is_empty() {
                tracing::debug!(path = %doc.source_path.display(), "skipping draft");
                skipped_drafts += 1;
                continue;
            }

            if let Some(first) = seen.get(&doc.slug) {
                return Err(BuildError::DuplicateSlug {
                    slug: doc.slug.clone(),
                    first: first.clone(),
                    second: doc.source_path.clone(),
                });
            }
            seen.insert(doc.slug.clone(), doc.source_path.clone());

            tracing::debug!(path = %doc.source_path.display(), slug = %doc.slug, "loaded issue");
            documents.push(doc);
        }

        Ok((documents, skipped_drafts))
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::build::budget::BudgetStatus;

    fn write(dir: &Path, relative: &str, text: &str) {
        let path = dir.join(relative);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, text).unwrap();
    }

    fn config(extra: &str) -> Config {
        let yaml = format!(
            "newsletter:\n  name: Weekly Notes\n  url: https://notes.example.com\n{}",
            extra
        );
        serde_yaml::from_str(&yaml).unwrap()
    }

    fn project() -> tempfile::TempDir {
        let tmp = tempfile::tempdir().unwrap();
        write(
            tmp.path(),
            "issues/issue-1.md",
            "---\ntitle: First Issue\ndate: 2024-01-05\npreheader: Hello inbox\n---\n# Welcome\n\nRead [the archive](/).\n\n```rust\nfn main() {}\n```\n",
        );
        write(
            tmp.path(),
            "issues/issue-2.md",
            "---\ntitle: Second Issue\ndate: 2024-01-12\n---\n{% if variant == \"email\" %}Email only{% else %}Web only{% endif %}\n",
        );
        write(
            tmp.path(),
            "issues/wip.md",
            "---\ntitle: Work In Progress\ndraft: true\n---\nNot yet.\n",
        );
        tmp
    }

    #[test]
    fn test_build_writes_outputs() {
        let tmp = project();
        let builder = Builder::new(config(""), tmp.path().to_path_buf());

        let result = builder.build().unwrap();

        assert_eq!(result.issues.len(), 2);
        assert_eq!(result.skipped_drafts, 1);
        assert_eq!(result.issues[0].title, "First Issue");

        let out = tmp.path().join("_site");
        let text_len = std::fs::metadata(out.join("issue-1/email.txt")).unwrap().len();
        assert_eq!(result.issues[0].text_bytes, Some(text_len as usize));
        assert!(out.join("index.html").exists());
        assert!(out.join("manifest.json").exists());
        assert!(out.join("issue-1/index.html").exists());
        assert!(out.join("issue-1/email.txt").exists());
        assert!(!out.join("wip").exists());

        let email = std::fs::read_to_string(out.join("issue-1/email.html")).unwrap();
        assert!(!email.contains("<style"));
        assert!(email.contains("style=\""));
        assert!(email.contains("Hello inbox"));
        assert!(email.contains("href=\"https://notes.example.com/\""));

        let web_2 = std::fs::read_to_string(out.join("issue-2/index.html")).unwrap();
        let email_2 = std::fs::read_to_string(out.join("issue-2/email.html")).unwrap();
        assert!(web_2.contains("Web only"));
        assert!(email_2.contains("Email only"));

        let text = std::fs::read_to_string(out.join("issue-2/email.txt")).unwrap();
        assert!(text.contains("Email only"));
    }

    #[test]
    fn test_build_with_drafts() {
        let tmp = project();
        let builder = Builder::new(config(""), tmp.path().to_path_buf()).with_drafts(true);

        let result = builder.build().unwrap();

        assert_eq!(result.issues.len(), 3);
        assert!(tmp.path().join("_site/wip/email.html").exists());
    }

    #[test]
    fn test_build_over_hard_limit_writes_nothing() {
        let tmp = project();
        let builder = Builder::new(
            config("budget:\n  hard_limit: 500\n  soft_limit: 400\n"),
            tmp.path().to_path_buf(),
        );

        let err = builder.build().unwrap_err();

        assert!(matches!(
            err,
            BuildError::Pipeline(PipelineError::BudgetExceeded { .. })
        ));
        assert!(!tmp.path().join("_site").exists());
    }

    #[test]
    fn test_build_over_hard_limit_not_enforced() {
        let tmp = project();
        let builder = Builder::new(
            config("budget:\n  hard_limit: 500\n  soft_limit: 400\n  enforce: false\n"),
            tmp.path().to_path_buf(),
        );

        let result = builder.build().unwrap();

        assert_eq!(result.over_hard_limit().count(), 2);
        assert!(tmp.path().join("_site/issue-1/email.html").exists());
    }

    #[test]
    fn test_check_writes_nothing() {
        let tmp = project();
        let builder = Builder::new(config(""), tmp.path().to_path_buf());

        let result = builder.check().unwrap();

        assert_eq!(result.issues.len(), 2);
        assert!(result
            .issues
            .iter()
            .all(|issue| issue.budget.status == BudgetStatus::Within));
        assert!(result.issues.iter().all(|issue| issue.email_bytes > 0));
        assert!(!tmp.path().join("_site").exists());
    }

    #[test]
    fn test_duplicate_slug() {
        let tmp = tempfile::tempdir().unwrap();
        write(tmp.path(), "issues/a.md", "---\nslug: same\n---\nA");
        write(tmp.path(), "issues/b.md", "---\nslug: same\n---\nB");
        let builder = Builder::new(config(""), tmp.path().to_path_buf());

        let err = builder.build().unwrap_err();

        match err {
            BuildError::DuplicateSlug { slug, first, second } => {
                assert_eq!(slug, "same");
                assert_eq!(first, PathBuf::from("a.md"));
                assert_eq!(second, PathBuf::from("b.md"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_explicit_files_skip_archive() {
        let tmp = project();
        let builder = Builder::new(config(""), tmp.path().to_path_buf())
            .with_files(vec![tmp.path().join("issues/wip.md")]);

        let result = builder.build().unwrap();

        assert_eq!(result.issues.len(), 1);
        assert_eq!(result.issues[0].slug, "wip");
        assert!(tmp.path().join("_site/wip/index.html").exists());
        assert!(!tmp.path().join("_site/index.html").exists());
    }

    #[test]
    fn test_custom_theme_overrides_template() {
        let tmp = project();
        write(
            tmp.path(),
            "theme/templates/email.html",
            "<html><head><style>{{ styles | safe }}</style></head><body><p>Custom: {{ page.title }}</p></body></html>",
        );
        let builder = Builder::new(
            config("theme:\n  path: theme\n"),
            tmp.path().to_path_buf(),
        );

        builder.build().unwrap();

        let email = std::fs::read_to_string(tmp.path().join("_site/issue-1/email.html")).unwrap();
        assert!(email.contains("Custom: First Issue"));
    }

    #[test]
    fn test_missing_content_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let builder = Builder::new(config(""), tmp.path().to_path_buf());

        assert!(matches!(
            builder.build(),
            Err(BuildError::Source(SourceError::PathNotFound(_)))
        ));
    }
}
