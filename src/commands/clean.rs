use crate::{
    CleanArgs,
    build::{Builder, base_path_from_config},
    config::Config,
};

pub async fn run(args: &CleanArgs) -> Result<(), anyhow::Error> {
    let config_path = Config::path_from_arg(args.config_file.as_deref())?;
    let config = Config::load_from_arg(Some(config_path.as_path()))?;

    // Get the base path for resolving relative paths
    let base_path = base_path_from_config(&config_path);

    let builder = Builder::new(config, base_path.clone());
    let output_dir = builder.output_dir();

    if !output_dir.exists() {
        println!("Nothing to clean at {}", output_dir.display());
        return Ok(());
    }

    let output_dir = output_dir.canonicalize()?;
    let project_dir = base_path.canonicalize()?;
    let content_dir = builder
        .content_dir()
        .canonicalize()
        .unwrap_or(builder.content_dir());
    if project_dir.starts_with(&output_dir) || content_dir.starts_with(&output_dir) {
        anyhow::bail!(
            "refusing to delete {}: it contains the project or its issues",
            output_dir.display()
        );
    }

    if args.dry_run {
        println!("Would delete {}", output_dir.display());
    } else {
        tokio::fs::remove_dir_all(&output_dir).await?;
        println!("Deleted {}", output_dir.display());
    }

    Ok(())
}
