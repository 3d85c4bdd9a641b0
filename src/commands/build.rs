use crate::{
    BuildArgs,
    build::{Builder, base_path_from_config},
    config::Config,
    util::format_bytes,
};

pub async fn run(args: &BuildArgs) -> Result<(), anyhow::Error> {
    let config_path = Config::path_from_arg(args.config_file.as_deref())?;
    let config = Config::load_from_arg(Some(config_path.as_path()))?;

    // Get the base path for resolving relative paths
    let base_path = base_path_from_config(&config_path);

    let builder = Builder::new(config, base_path)
        .with_drafts(args.drafts)
        .with_files(args.files.clone());
    let result = builder.build()?;

    for issue in &result.issues {
        let text = issue
            .text_bytes
            .map(|bytes| format!(", text {}", format_bytes(bytes)))
            .unwrap_or_default();
        println!(
            "  {} ({}): web {}, email {}{}",
            issue.slug,
            issue.title,
            format_bytes(issue.web_bytes),
            issue.budget.summary(),
            text
        );
    }

    let display_output = result
        .output_dir
        .canonicalize()
        .unwrap_or(result.output_dir.clone());
    println!(
        "Built {} issue(s) to {}",
        result.issues.len(),
        display_output.display()
    );
    if result.skipped_drafts > 0 {
        println!(
            "Skipped {} draft(s); pass --drafts to include them",
            result.skipped_drafts
        );
    }

    Ok(())
}
