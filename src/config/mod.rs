//! Configuration loading and types for letterpress.
//!
//! - Type definitions for config structures (`types`)
//! - Loading configs from files and the environment (`load`)

mod load;
mod types;

use crate::build::markdown_options;

pub use load::DEFAULT_CONFIG_FILE;
pub use types::{
    BudgetConfig, Config, DevConfig, EmailConfig, MarkdownConfig, NewsletterConfig, ThemeConfig,
    WatchConfig,
};

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("failed to load config: {0}")]
    Load(#[from] ::config::ConfigError),

    #[error("config file not found: {0}")]
    NotFound(std::path::PathBuf),

    #[error("failed to get current working directory: {0}")]
    CwdFailure(std::io::Error),

    #[error("invalid config: {0}")]
    Validation(String),
}

impl Config {
    /// Check invariants serde can't express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.newsletter.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "'newsletter.name' must not be empty".to_string(),
            ));
        }
        if self.budget.hard_limit == 0 {
            return Err(ConfigError::Validation(
                "'budget.hard_limit' must be greater than zero".to_string(),
            ));
        }
        if self.budget.soft_limit > self.budget.hard_limit {
            return Err(ConfigError::Validation(format!(
                "'budget.soft_limit' ({}) must not exceed 'budget.hard_limit' ({})",
                self.budget.soft_limit, self.budget.hard_limit
            )));
        }
        if let Some(url) = &self.newsletter.url
            && !(url.starts_with("http://") || url.starts_with("https://"))
        {
            return Err(ConfigError::Validation(format!(
                "'newsletter.url' must be an absolute http(s) URL, got '{}'",
                url
            )));
        }
        markdown_options(&self.markdown)
            .map_err(|e| ConfigError::Validation(format!("'markdown.extensions': {}", e)))?;
        Ok(())
    }
}
