use crate::{
    CheckArgs,
    build::{Builder, IssueSummary, base_path_from_config},
    config::Config,
    util::format_bytes,
};

pub async fn run(args: &CheckArgs) -> Result<(), anyhow::Error> {
    let config_path = Config::path_from_arg(args.config_file.as_deref())?;
    let config = Config::load_from_arg(Some(config_path.as_path()))?;
    let base_path = base_path_from_config(&config_path);
    let hard_limit = config.budget.hard_limit;

    let builder = Builder::new(config, base_path)
        .with_drafts(args.drafts)
        .with_files(args.files.clone());
    let result = builder.check()?;

    if result.issues.is_empty() {
        println!("No issues to check");
        return Ok(());
    }

    print!("{}", size_table(&result.issues));

    let over = result.over_hard_limit().count();
    if over > 0 {
        anyhow::bail!(
            "{} issue(s) exceed the {} email limit",
            over,
            format_bytes(hard_limit)
        );
    }

    println!("All {} issue(s) fit the email budget", result.issues.len());
    Ok(())
}

/// One row per issue: slug, email size, share of the hard limit, status.
fn size_table(issues: &[IssueSummary]) -> String {
    let width = issues
        .iter()
        .map(|issue| issue.slug.chars().count())
        .max()
        .unwrap_or(0)
        .max("ISSUE".len());

    let mut table = format!(
        "{:<width$}  {:>10}  {:>10}  {:>5}  STATUS\n",
        "ISSUE", "EMAIL", "HEADROOM", "USED"
    );
    for issue in issues {
        let headroom = issue.budget.headroom();
        let headroom = if headroom < 0 {
            format!("-{}", format_bytes(headroom.unsigned_abs() as usize))
        } else {
            format_bytes(headroom as usize)
        };
        table.push_str(&format!(
            "{:<width$}  {:>10}  {:>10}  {:>4.0}%  {}\n",
            issue.slug,
            format_bytes(issue.email_bytes),
            headroom,
            issue.budget.percent_used(),
            issue.budget.status.label()
        ));
    }
    table
}
