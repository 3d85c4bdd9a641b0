pub mod budget;
mod builder;
pub mod document;
mod highlight;
mod inline;
mod markdown;
pub mod paths;
pub mod pipeline;
mod plaintext;
pub mod render;
pub mod source;
mod watch;

pub use builder::{BuildResult, Builder, IssueSummary};
pub use markdown::markdown_options;
pub use paths::base_path_from_config;
pub use watch::{ChangeKind, FileWatcher, PathClassifier, WatchEvent, WatchPaths};
