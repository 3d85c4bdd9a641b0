use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod build;
mod commands;
mod config;
mod theme;
mod util;

#[derive(Parser)]
#[command(version, about = "Render Markdown newsletter issues for the web and for email")]
struct Args {
    /// Show debug output
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only show warnings and errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    command: LetterpressCommand,
}

#[derive(Parser)]
struct InitArgs {
    /// The path to initialize the project in
    path: PathBuf,

    /// Whether to create the directory if it doesn't exist
    #[arg(short, long, default_value = "false")]
    create: bool,
}

#[derive(Parser)]
struct BuildArgs {
    /// The path to the configuration file (default: letterpress.yaml)
    #[arg(short, long)]
    config_file: Option<PathBuf>,

    /// Also build issues marked `draft: true`
    #[arg(short, long, default_value = "false")]
    drafts: bool,

    /// Only build these issues (the archive and manifest are left alone)
    files: Vec<PathBuf>,
}

#[derive(Parser)]
struct CheckArgs {
    /// The path to the configuration file (default: letterpress.yaml)
    #[arg(short, long)]
    config_file: Option<PathBuf>,

    /// Also check issues marked `draft: true`
    #[arg(short, long, default_value = "false")]
    drafts: bool,

    /// Only check these issues
    files: Vec<PathBuf>,
}

#[derive(Parser)]
struct WatchArgs {
    /// The path to the configuration file (default: letterpress.yaml)
    #[arg(short, long)]
    config_file: Option<PathBuf>,

    /// Also build issues marked `draft: true`
    #[arg(short, long, default_value = "false")]
    drafts: bool,

    /// Poll for changes instead of using native file events
    #[arg(short, long, default_value = "false")]
    poll: bool,
}

#[derive(Parser)]
struct CleanArgs {
    /// The path to the configuration file (default: letterpress.yaml)
    #[arg(short, long)]
    config_file: Option<PathBuf>,

    /// Print what would be deleted without deleting it
    #[arg(short, long, default_value = "false")]
    dry_run: bool,
}

#[derive(Parser)]
struct ThemeArgs {
    /// Directory to write the default theme into
    path: PathBuf,
}

#[derive(Subcommand)]
enum LetterpressCommand {
    /// Initialize a new newsletter project
    Init(InitArgs),

    /// Build every issue into web pages and emails
    Build(BuildArgs),

    /// Report email sizes against the byte budget without writing anything
    Check(CheckArgs),

    /// Rebuild whenever an issue, the theme or the config changes
    Watch(WatchArgs),

    /// Delete the output directory
    Clean(CleanArgs),

    /// Copy the built-in theme into a directory for customisation
    Theme(ThemeArgs),
}

/// Set up tracing. `RUST_LOG` wins over `--verbose`/`--quiet`.
fn init_logging(verbose: bool, quiet: bool) {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if quiet {
        EnvFilter::new("warn")
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let args = Args::parse();
    init_logging(args.verbose, args.quiet);

    match args.command {
        LetterpressCommand::Init(args) => {
            commands::init::run(&args).await?;
        }
        LetterpressCommand::Build(args) => {
            commands::build::run(&args).await?;
        }
        LetterpressCommand::Check(args) => {
            commands::check::run(&args).await?;
        }
        LetterpressCommand::Watch(args) => {
            commands::watch::run(&args).await?;
        }
        LetterpressCommand::Clean(args) => {
            commands::clean::run(&args).await?;
        }
        LetterpressCommand::Theme(args) => {
            commands::theme::run(&args).await?;
        }
    }

    Ok(())
}
