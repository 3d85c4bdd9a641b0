use std::path::{Path, PathBuf};

use crate::{
    WatchArgs,
    build::{
        BuildResult, Builder, ChangeKind, FileWatcher, PathClassifier, WatchEvent, WatchPaths,
        base_path_from_config,
    },
    config::Config,
};

pub async fn run(args: &WatchArgs) -> Result<(), anyhow::Error> {
    let config_path = Config::path_from_arg(args.config_file.as_deref())?;
    let config = Config::load_from_arg(Some(config_path.as_path()))?;
    let base_path = base_path_from_config(&config_path);

    // Build once up front; a failing build still leaves us watching
    println!("Building issues...");
    report(do_build(&config, &base_path, args.drafts));

    let builder = Builder::new(config.clone(), base_path.clone());
    let watch_paths = WatchPaths::new(
        builder.content_dir(),
        builder.theme_dir(),
        config_path.clone(),
    );
    let classifier = PathClassifier::new(watch_paths.clone());

    let mut watch_config = config.dev.watch.clone();
    watch_config.poll |= args.poll;
    let watcher = FileWatcher::new(&watch_config, &watch_paths, classifier)?;
    println!(
        "Watching {} for changes (Ctrl+C to stop)...",
        watch_paths.content_dir.display()
    );

    let drafts = args.drafts;
    tokio::task::spawn_blocking(move || {
        let mut config = config;
        while let Some(event) = watcher.recv() {
            match event {
                WatchEvent::FilesChanged(changes) => {
                    for change in &changes {
                        tracing::debug!(?change, "file changed");
                    }

                    if changes.contains(&ChangeKind::Config) {
                        match Config::load_from_arg(Some(config_path.as_path())) {
                            Ok(reloaded) => {
                                if watched_dirs_changed(&config, &reloaded, &base_path) {
                                    tracing::warn!(
                                        "content or theme directory changed; restart watch to follow the new location"
                                    );
                                }
                                config = reloaded;
                            }
                            Err(e) => {
                                eprintln!("Config error: {}", e);
                                continue;
                            }
                        }
                    }

                    println!("\nDetected {} change(s), rebuilding...", changes.len());
                    report(do_build(&config, &base_path, drafts));
                }
                WatchEvent::Error(e) => {
                    eprintln!("Watch error: {}", e);
                }
            }
        }
    })
    .await?;

    Ok(())
}

/// Helper function to run the build
fn do_build(
    config: &Config,
    base_path: &Path,
    drafts: bool,
) -> Result<BuildResult, anyhow::Error> {
    let builder = Builder::new(config.clone(), base_path.to_path_buf()).with_drafts(drafts);
    Ok(builder.build()?)
}

fn report(result: Result<BuildResult, anyhow::Error>) {
    match result {
        Ok(result) => {
            for issue in &result.issues {
                println!("  {}: email {}", issue.slug, issue.budget.summary());
            }
            println!("Built {} issue(s)", result.issues.len());
        }
        Err(e) => eprintln!("Build error: {:#}", e),
    }
}

fn watched_dirs_changed(old: &Config, new: &Config, base_path: &Path) -> bool {
    let dirs = |config: &Config| -> (PathBuf, Option<PathBuf>) {
        let builder = Builder::new(config.clone(), base_path.to_path_buf());
        (builder.content_dir(), builder.theme_dir())
    };
    dirs(old) != dirs(new)
}
