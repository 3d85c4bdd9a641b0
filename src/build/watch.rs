//! File watching for automatic rebuilds.
//!
//! Uses `notify-debouncer-full` to watch the issues directory, the theme
//! directory and the config file for changes.

use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver};
use std::time::Duration;

use notify::event::ModifyKind;
use notify::{
    Config as NotifyConfig, EventKind, PollWatcher, RecommendedWatcher, RecursiveMode, Watcher,
};
use notify_debouncer_full::{
    DebounceEventResult, Debouncer, RecommendedCache, new_debouncer, new_debouncer_opt,
};

use crate::config::WatchConfig;

// =============================================================================
// Errors
// =============================================================================

#[derive(thiserror::Error, Debug)]
pub enum WatchError {
    #[error("notify error: {0}")]
    Notify(#[from] notify::Error),
}

// =============================================================================
// Watch events
// =============================================================================

/// What kind of file changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeKind {
    /// An issue was created, edited or removed.
    Issue { path: PathBuf, deleted: bool },
    /// A theme template or stylesheet changed.
    Theme { path: PathBuf },
    /// The config file changed; it must be reloaded before rebuilding.
    Config,
}

/// Events sent from the file watcher.
#[derive(Debug)]
pub enum WatchEvent {
    /// Files changed, rebuild needed.
    FilesChanged(Vec<ChangeKind>),
    /// Watcher error occurred.
    Error(String),
}

// =============================================================================
// Path classification
// =============================================================================

/// Paths to watch for changes.
#[derive(Debug, Clone)]
pub struct WatchPaths {
    /// Directory holding the issues.
    pub content_dir: PathBuf,
    /// Custom theme directory, if any.
    pub theme_dir: Option<PathBuf>,
    /// Config file path.
    pub config_path: PathBuf,
}

impl WatchPaths {
    /// Create watch paths, canonicalized where they exist so they compare
    /// equal to the absolute paths notify reports.
    pub fn new(content_dir: PathBuf, theme_dir: Option<PathBuf>, config_path: PathBuf) -> Self {
        Self {
            content_dir: canonical(content_dir),
            theme_dir: theme_dir.map(canonical),
            config_path: canonical(config_path),
        }
    }
}

/// Canonical form of `path`; for a missing file, its canonical parent joined
/// with the file name.
fn canonical(path: PathBuf) -> PathBuf {
    if let Ok(resolved) = path.canonicalize() {
        return resolved;
    }
    let resolved = match (path.parent(), path.file_name()) {
        (Some(parent), Some(name)) => parent.canonicalize().ok().map(|p| p.join(name)),
        _ => None,
    };
    resolved.unwrap_or(path)
}

/// Classifies file paths into change types.
#[derive(Debug, Clone)]
pub struct PathClassifier {
    paths: WatchPaths,
}

impl PathClassifier {
    pub fn new(paths: WatchPaths) -> Self {
        Self { paths }
    }

    /// Classify a changed path into a ChangeKind.
    ///
    /// Hidden files (and files in hidden directories) below the watched
    /// roots are ignored, as are files that can't affect the output.
    pub fn classify(&self, path: &Path, deleted: bool) -> Option<ChangeKind> {
        if path == self.paths.config_path {
            return Some(ChangeKind::Config);
        }

        if let Some(theme_dir) = &self.paths.theme_dir
            && let Ok(relative) = path.strip_prefix(theme_dir)
        {
            if is_hidden(relative) {
                return None;
            }
            return match path.extension().and_then(|e| e.to_str()) {
                Some("html" | "css") => Some(ChangeKind::Theme {
                    path: path.to_path_buf(),
                }),
                _ => None,
            };
        }

        if let Ok(relative) = path.strip_prefix(&self.paths.content_dir) {
            if is_hidden(relative) {
                return None;
            }
            let ext = path
                .extension()
                .and_then(|e| e.to_str())
                .map(|e| e.to_lowercase());
            return match ext.as_deref() {
                Some("md" | "markdown") => Some(ChangeKind::Issue {
                    path: path.to_path_buf(),
                    deleted,
                }),
                _ => None,
            };
        }

        None // Unknown path, ignore
    }
}

fn is_hidden(relative: &Path) -> bool {
    relative
        .components()
        .any(|c| c.as_os_str().to_string_lossy().starts_with('.'))
}

// =============================================================================
// File watcher
// =============================================================================

/// A file watcher that can use either native or polling backend.
pub enum FileWatcher {
    /// Native file system watcher (recommended for local development).
    Native {
        _debouncer: Debouncer<RecommendedWatcher, RecommendedCache>,
        rx: Receiver<WatchEvent>,
    },
    /// Polling-based watcher (for network filesystems, Docker, etc.).
    Polling {
        _debouncer: Debouncer<PollWatcher, RecommendedCache>,
        rx: Receiver<WatchEvent>,
    },
}

impl FileWatcher {
    /// Create a new file watcher.
    pub fn new(
        config: &WatchConfig,
        paths: &WatchPaths,
        classifier: PathClassifier,
    ) -> Result<Self, WatchError> {
        let debounce_timeout = Duration::from_millis(config.debounce_ms);

        let (tx, rx) = mpsc::channel();

        // Convert notify events to our WatchEvent type
        let callback = move |result: DebounceEventResult| match result {
            Ok(events) => {
                let changes: Vec<ChangeKind> = events
                    .iter()
                    .filter(|event| is_relevant_event(&event.kind))
                    .filter_map(|event| {
                        let deleted = matches!(event.kind, EventKind::Remove(_));
                        event
                            .paths
                            .first()
                            .and_then(|p| classifier.classify(p, deleted))
                    })
                    .collect();

                if !changes.is_empty() {
                    let _ = tx.send(WatchEvent::FilesChanged(changes));
                }
            }
            Err(errors) => {
                for e in errors {
                    let _ = tx.send(WatchEvent::Error(e.to_string()));
                }
            }
        };

        if config.poll {
            let poll_interval = Duration::from_millis(config.poll_interval_ms);
            let notify_config = NotifyConfig::default().with_poll_interval(poll_interval);

            let mut debouncer = new_debouncer_opt::<_, PollWatcher, RecommendedCache>(
                debounce_timeout,
                None,
                callback,
                RecommendedCache::default(),
                notify_config,
            )?;

            add_watch_paths_to_debouncer(&mut debouncer, paths)?;

            Ok(FileWatcher::Polling {
                _debouncer: debouncer,
                rx,
            })
        } else {
            let mut debouncer = new_debouncer(debounce_timeout, None, callback)?;

            add_watch_paths_to_debouncer(&mut debouncer, paths)?;

            Ok(FileWatcher::Native {
                _debouncer: debouncer,
                rx,
            })
        }
    }

    /// Receive the next watch event (blocking).
    pub fn recv(&self) -> Option<WatchEvent> {
        match self {
            FileWatcher::Native { rx, .. } => rx.recv().ok(),
            FileWatcher::Polling { rx, .. } => rx.recv().ok(),
        }
    }
}

/// Add watch paths to a debouncer.
fn add_watch_paths_to_debouncer<W: Watcher, C: notify_debouncer_full::FileIdCache>(
    debouncer: &mut Debouncer<W, C>,
    paths: &WatchPaths,
) -> Result<(), WatchError> {
    if paths.content_dir.exists() {
        debouncer.watch(&paths.content_dir, RecursiveMode::Recursive)?;
    }

    if let Some(theme_dir) = &paths.theme_dir
        && theme_dir.exists()
    {
        debouncer.watch(theme_dir, RecursiveMode::Recursive)?;
    }

    // Watch the config file's directory; editors often replace the file
    if let Some(parent) = paths.config_path.parent()
        && parent.exists()
    {
        debouncer.watch(parent, RecursiveMode::NonRecursive)?;
    }

    Ok(())
}

/// Check if an event kind is relevant for rebuilds.
fn is_relevant_event(kind: &EventKind) -> bool {
    matches!(
        kind,
        EventKind::Create(_)
            | EventKind::Remove(_)
            | EventKind::Modify(ModifyKind::Data(_))
            | EventKind::Modify(ModifyKind::Name(_))
            | EventKind::Modify(ModifyKind::Any)
    )
}
