//! Configuration type definitions.
//!
//! This module contains all the data structures used in `letterpress.yaml`.
//! These types are pure data - no I/O or complex logic.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::build::budget::{DEFAULT_HARD_LIMIT, DEFAULT_SOFT_LIMIT, SizeBudget};

// =============================================================================
// Root config
// =============================================================================

/// The full newsletter configuration.
///
/// ```yaml
/// newsletter:
///   name: Weekly Notes
///   url: https://notes.example.com
/// content: ./issues
/// budget:
///   hard_limit: 104448
///   soft_limit: 92160
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub newsletter: NewsletterConfig,
    /// Directory holding the Markdown issues (relative to the config file)
    #[serde(default = "default_content")]
    pub content: PathBuf,
    #[serde(default)]
    pub theme: ThemeConfig,
    #[serde(default)]
    pub markdown: MarkdownConfig,
    #[serde(default)]
    pub email: EmailConfig,
    #[serde(default)]
    pub budget: BudgetConfig,
    /// Development-specific settings (watch mode, etc.)
    #[serde(default)]
    pub dev: DevConfig,
}

fn default_content() -> PathBuf {
    PathBuf::from("issues")
}

impl Config {
    /// Resolve a possibly-relative path against the config file's directory.
    pub fn resolve_path(path: &Path, base_path: &Path) -> PathBuf {
        if path.is_relative() {
            base_path.join(path)
        } else {
            path.to_path_buf()
        }
    }
}

// =============================================================================
// Newsletter configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsletterConfig {
    pub name: String,
    /// Public URL of the web archive, used for "view in browser" links
    /// and for making email links absolute
    pub url: Option<String>,
    /// Default author when an issue doesn't name one
    pub author: Option<String>,
    #[serde(default = "default_output")]
    pub output: PathBuf,
}

fn default_output() -> PathBuf {
    PathBuf::from("_site")
}

// =============================================================================
// Theme configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThemeConfig {
    /// Theme directory overriding the built-in templates and styles
    #[serde(default)]
    pub path: Option<PathBuf>,
    /// Syntax highlighting theme for code blocks on the web variant
    #[serde(default = "default_highlight")]
    pub highlight: String,
    /// Arbitrary settings passed to templates as `theme.*`
    /// (`footer` and `email_footer` are read by the built-in templates)
    #[serde(default = "default_settings")]
    pub settings: serde_json::Value,
}

fn default_settings() -> serde_json::Value {
    serde_json::Value::Object(serde_json::Map::new())
}

fn default_highlight() -> String {
    "github_light".to_string()
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            path: None,
            highlight: default_highlight(),
            settings: default_settings(),
        }
    }
}

// =============================================================================
// Markdown configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkdownConfig {
    /// Extensions to enable for markdown processing
    #[serde(default = "default_markdown_extensions")]
    pub extensions: Vec<String>,
}

fn default_markdown_extensions() -> Vec<String> {
    vec![
        "footnotes".to_string(),
        "gfm".to_string(),
        "heading_attributes".to_string(),
        "strikethrough".to_string(),
        "tables".to_string(),
        "tasklists".to_string(),
    ]
}

impl Default for MarkdownConfig {
    fn default() -> Self {
        Self {
            extensions: default_markdown_extensions(),
        }
    }
}

// =============================================================================
// Email configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailConfig {
    /// Also write a plain-text rendition next to the email HTML
    #[serde(default = "default_true")]
    pub plain_text: bool,
    /// Collapse whitespace and drop comments after inlining
    #[serde(default = "default_true")]
    pub compact: bool,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            plain_text: true,
            compact: true,
        }
    }
}

fn default_true() -> bool {
    true
}

// =============================================================================
// Budget configuration
// =============================================================================

/// Byte budget for the email variant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetConfig {
    /// Hard ceiling in bytes; the platform clips or rejects anything larger
    #[serde(default = "default_hard_limit")]
    pub hard_limit: usize,
    /// Warning threshold in bytes
    #[serde(default = "default_soft_limit")]
    pub soft_limit: usize,
    /// Fail the build when an email exceeds the hard limit
    #[serde(default = "default_true")]
    pub enforce: bool,
}

fn default_hard_limit() -> usize {
    DEFAULT_HARD_LIMIT
}

fn default_soft_limit() -> usize {
    DEFAULT_SOFT_LIMIT
}

impl Default for BudgetConfig {
    fn default() -> Self {
        Self {
            hard_limit: DEFAULT_HARD_LIMIT,
            soft_limit: DEFAULT_SOFT_LIMIT,
            enforce: true,
        }
    }
}

impl BudgetConfig {
    pub fn size_budget(&self) -> SizeBudget {
        SizeBudget::new(self.hard_limit, self.soft_limit)
    }
}

// =============================================================================
// Development configuration
// =============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DevConfig {
    /// File watching configuration
    #[serde(default)]
    pub watch: WatchConfig,
}

/// Configuration for file watching during development.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchConfig {
    /// Use polling-based watcher instead of native file system events.
    /// Useful for network filesystems and Docker volumes.
    #[serde(default)]
    pub poll: bool,
    /// Poll interval in milliseconds (only used if poll=true).
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Changes within this window are batched into one rebuild.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

fn default_poll_interval_ms() -> u64 {
    500
}

fn default_debounce_ms() -> u64 {
    200
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            poll: false,
            poll_interval_ms: default_poll_interval_ms(),
            debounce_ms: default_debounce_ms(),
        }
    }
}
