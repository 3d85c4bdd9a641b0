use crate::{ThemeArgs, theme::Theme};

pub async fn run(args: &ThemeArgs) -> Result<(), anyhow::Error> {
    let files = Theme::eject(&args.path)?;

    for file in &files {
        println!("Created {}", file.display());
    }
    println!(
        "Set `theme.path: {}` in letterpress.yaml to use it",
        args.path.display()
    );

    Ok(())
}
