//! Build pipeline for issue processing.
//!
//! The pipeline transforms issues through a series of stages:
//! 1. Tera processing (macro expansion, once per variant)
//! 2. Markdown rendering (web and email fragments, TOC)
//! 3. Template rendering (web page and email wrappers)
//! 4. Inlining (email CSS moved into attributes, whitespace compacted)
//! 5. Budget (email size checked against the byte limits)
//! 6. File writing (output to disk)
//!
//! Custom stages can be inserted before or after any named stage.
//! Build-wide stages run after all issues are processed.

mod context;
mod document;
mod error;
mod stages;

pub use context::PipelineContext;
pub use document::ProcessingDocument;
pub use error::PipelineError;

use stages::{
    ArchiveStage, BudgetStage, InlineStage, ManifestStage, MarkdownStage, PlainTextStage,
    TemplateStage, TeraStage, WriteStage,
};

use crate::config::Config;

/// A stage in the issue processing pipeline.
///
/// Stages transform documents sequentially. Each stage receives all documents
/// and can modify them in place before passing to the next stage.
pub trait Stage: Send + Sync {
    /// Unique name for this stage (used for insertion points).
    fn name(&self) -> &'static str;

    /// Process documents through this stage.
    ///
    /// Documents are passed by mutable reference so stages can transform
    /// their content in place. The `ctx` provides access to shared resources
    /// like the renderer and highlighter.
    fn process(
        &self,
        docs: &mut [ProcessingDocument],
        ctx: &mut PipelineContext,
    ) -> Result<(), PipelineError>;
}

/// A stage that runs once after all documents are processed.
///
/// Use this for build-wide outputs like the archive index and manifest.
pub trait FinalizeStage: Send + Sync {
    /// Unique name for this stage.
    fn name(&self) -> &'static str;

    /// Run finalization after all documents are processed and written.
    fn finalize(
        &self,
        docs: &[ProcessingDocument],
        ctx: &PipelineContext,
    ) -> Result<(), PipelineError>;
}

/// The issue processing pipeline.
///
/// The default pipeline is: tera → markdown → template → inline → budget → write,
/// followed by the archive and manifest finalize stages.
///
/// # Extension Points
///
/// Insert custom stages using `insert_before` or `insert_after`:
///
/// ```ignore
/// pipeline.insert_after("tera", PlainTextStage);
/// ```
pub struct Pipeline {
    /// Document processing stages (run for each document batch)
    stages: Vec<Box<dyn Stage>>,
    /// Build-wide stages (run once after all documents)
    finalize_stages: Vec<Box<dyn FinalizeStage>>,
}

impl Pipeline {
    /// Create an empty pipeline with no stages.
    pub fn new() -> Self {
        Self {
            stages: Vec::new(),
            finalize_stages: Vec::new(),
        }
    }

    /// Create the default pipeline with standard stages.
    pub fn default_pipeline() -> Self {
        let mut pipeline = Self::new();
        pipeline
            .add_stage(TeraStage)
            .add_stage(MarkdownStage)
            .add_stage(TemplateStage)
            .add_stage(InlineStage)
            .add_stage(BudgetStage::new(true))
            .add_stage(WriteStage);
        pipeline
            .add_finalize_stage(ArchiveStage)
            .add_finalize_stage(ManifestStage);
        pipeline
    }

    /// The pipeline a `build` runs for the given configuration.
    ///
    /// Adds the plain-text stage when enabled and honors `budget.enforce`.
    pub fn for_config(config: &Config) -> Self {
        let mut pipeline = Self::default_pipeline();
        if !config.budget.enforce {
            pipeline.replace("budget", BudgetStage::new(false));
        }
        if config.email.plain_text {
            pipeline.insert_after("tera", PlainTextStage);
        }
        pipeline
    }

    /// Render and measure without touching the filesystem.
    ///
    /// Over-budget issues are reported, never fatal.
    pub fn preview(config: &Config) -> Self {
        let mut pipeline = Self::new();
        pipeline
            .add_stage(TeraStage)
            .add_stage(MarkdownStage)
            .add_stage(TemplateStage)
            .add_stage(InlineStage)
            .add_stage(BudgetStage::new(false));
        if config.email.plain_text {
            pipeline.insert_after("tera", PlainTextStage);
        }
        pipeline
    }

    /// Add a stage to the end of the pipeline.
    pub fn add_stage<S: Stage + 'static>(&mut self, stage: S) -> &mut Self {
        self.stages.push(Box::new(stage));
        self
    }

    /// Insert a stage before the named stage.
    ///
    /// # Panics
    ///
    /// Panics if no stage with the given name exists.
    #[allow(dead_code)]
    pub fn insert_before<S: Stage + 'static>(&mut self, name: &str, stage: S) -> &mut Self {
        let pos = self.position(name);
        self.stages.insert(pos, Box::new(stage));
        self
    }

    /// Insert a stage after the named stage.
    ///
    /// # Panics
    ///
    /// Panics if no stage with the given name exists.
    pub fn insert_after<S: Stage + 'static>(&mut self, name: &str, stage: S) -> &mut Self {
        let pos = self.position(name);
        self.stages.insert(pos + 1, Box::new(stage));
        self
    }

    /// Replace the named stage.
    ///
    /// # Panics
    ///
    /// Panics if no stage with the given name exists.
    pub fn replace<S: Stage + 'static>(&mut self, name: &str, stage: S) -> &mut Self {
        let pos = self.position(name);
        self.stages[pos] = Box::new(stage);
        self
    }

    fn position(&self, name: &str) -> usize {
        self.stages
            .iter()
            .position(|s| s.name() == name)
            .unwrap_or_else(|| panic!("stage '{}' not found in pipeline", name))
    }

    /// Add a finalize stage (runs after all documents are processed).
    pub fn add_finalize_stage<S: FinalizeStage + 'static>(&mut self, stage: S) -> &mut Self {
        self.finalize_stages.push(Box::new(stage));
        self
    }

    /// Drop all finalize stages, e.g. when rebuilding a subset of issues.
    pub fn without_finalize_stages(mut self) -> Self {
        self.finalize_stages.clear();
        self
    }

    /// Run the pipeline on a set of documents.
    pub fn run(
        &self,
        docs: &mut [ProcessingDocument],
        ctx: &mut PipelineContext,
    ) -> Result<(), PipelineError> {
        for stage in &self.stages {
            tracing::debug!(stage = stage.name(), documents = docs.len(), "running stage");
            stage.process(docs, ctx)?;
        }

        for stage in &self.finalize_stages {
            tracing::debug!(stage = stage.name(), "running finalize stage");
            stage.finalize(docs, ctx)?;
        }

        Ok(())
    }

    /// Get the names of all stages in order.
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    /// Get the names of all finalize stages in order.
    pub fn finalize_stage_names(&self) -> Vec<&'static str> {
        self.finalize_stages.iter().map(|s| s.name()).collect()
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::default_pipeline()
    }
}
