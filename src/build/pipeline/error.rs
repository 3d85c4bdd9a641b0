//! Pipeline error types.

use crate::build::inline::InlineError;
use crate::build::markdown::MarkdownError;
use crate::build::render::RenderError;

/// Errors that can occur during pipeline processing.
#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    #[error("template rendering error: {0}")]
    Render(#[from] RenderError),

    #[error("markdown rendering error: {0}")]
    Markdown(#[from] MarkdownError),

    #[error("CSS inlining error: {0}")]
    Inline(#[from] InlineError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to serialize manifest: {0}")]
    Json(#[from] serde_json::Error),

    #[error("stage '{stage}' failed: {message}")]
    Stage { stage: String, message: String },

    #[error("email for '{document}' is {bytes} bytes, over the {limit} byte limit")]
    BudgetExceeded {
        document: String,
        bytes: usize,
        limit: usize,
    },
}

impl PipelineError {
    /// Create a stage-specific error.
    pub fn stage(stage: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Stage {
            stage: stage.into(),
            message: message.into(),
        }
    }
}
