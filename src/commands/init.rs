use std::path::Path;

use crate::{
    InitArgs,
    config::{
        BudgetConfig, Config, DEFAULT_CONFIG_FILE, DevConfig, EmailConfig, MarkdownConfig,
        NewsletterConfig, ThemeConfig,
    },
};

const SAMPLE_ISSUE: &str = r#"---
title: Welcome to the first issue
subject: "Issue #1: Welcome"
preheader: What to expect from this newsletter
date: 2025-01-01
---

Thanks for subscribing to **{{ newsletter.name }}**.

## What's inside

- Links worth your time
- A longer read each week
- [ ] Something still to write

{{ macros::callout(content="Everything in this block is styled inline in the email.") }}

{% if variant == "web" %}
You are reading the web edition.
{% endif %}

{{ macros::button(url=page.url, label="Read it on the web") }}
"#;

pub async fn run(args: &InitArgs) -> Result<(), anyhow::Error> {
    let path = if args.path.is_relative() {
        std::env::current_dir()?.join(&args.path)
    } else {
        args.path.clone()
    };

    if !path.exists() {
        if args.create {
            tokio::fs::create_dir_all(&path).await?;
            println!("Created directory {path}", path = path.display());
        } else {
            return Err(anyhow::anyhow!(
                "Directory does not exist: {path}",
                path = path.display()
            ));
        }
    }

    let config_file = path.join(DEFAULT_CONFIG_FILE);
    if config_file.exists() {
        return Err(anyhow::anyhow!(
            "Config file already exists: {config_file}",
            config_file = config_file.display()
        ));
    }

    let default_config = default_config(&path);

    println!("Initializing project in {}", path.display());

    let config_text = serde_yaml::to_string(&default_config)?;
    tokio::fs::write(&config_file, config_text).await?;
    println!(
        "Created config file {config_file}",
        config_file = config_file.display()
    );

    let issues_dir = path.join(&default_config.content);
    let sample = issues_dir.join("issue-1.md");
    if !sample.exists() {
        tokio::fs::create_dir_all(&issues_dir).await?;
        tokio::fs::write(&sample, SAMPLE_ISSUE).await?;
        println!("Created sample issue {}", sample.display());
    }

    Ok(())
}

/// Starter config, named after the project directory.
fn default_config(path: &Path) -> Config {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .map(crate::util::title_case)
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| "My Newsletter".to_string());

    Config {
        newsletter: NewsletterConfig {
            name,
            url: Some("https://newsletter.example.com".into()),
            author: None,
            output: "_site".into(),
        },
        content: "issues".into(),
        theme: ThemeConfig::default(),
        markdown: MarkdownConfig::default(),
        email: EmailConfig::default(),
        budget: BudgetConfig::default(),
        dev: DevConfig::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::Builder;

    #[tokio::test]
    async fn test_init_creates_buildable_project() {
        let tmp = tempfile::tempdir().unwrap();
        let project = tmp.path().join("weekly-notes");
        let args = InitArgs {
            path: project.clone(),
            create: true,
        };

        run(&args).await.unwrap();

        let config = Config::load_from_arg(Some(&project.join(DEFAULT_CONFIG_FILE))).unwrap();
        assert_eq!(config.newsletter.name, "Weekly Notes");

        let result = Builder::new(config, project.clone()).build().unwrap();
        assert_eq!(result.issues.len(), 1);

        let email =
            std::fs::read_to_string(project.join("_site/issue-1/email.html")).unwrap();
        assert!(email.contains("Weekly Notes</strong>"));
        assert!(!email.contains("You are reading the web edition"));
        assert!(email.contains("href=\"https://newsletter.example.com/issue-1/\""));

        let text = std::fs::read_to_string(project.join("_site/issue-1/email.txt")).unwrap();
        assert!(text.contains("Everything in this block is styled inline in the email."));
        assert!(text.contains("Read it on the web (https://newsletter.example.com/issue-1/)"));
    }

    #[tokio::test]
    async fn test_init_refuses_existing_config() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join(DEFAULT_CONFIG_FILE), "newsletter:\n  name: X\n").unwrap();
        let args = InitArgs {
            path: tmp.path().to_path_buf(),
            create: false,
        };

        assert!(run(&args).await.is_err());
    }

    #[tokio::test]
    async fn test_init_missing_dir_without_create() {
        let tmp = tempfile::tempdir().unwrap();
        let args = InitArgs {
            path: tmp.path().join("missing"),
            create: false,
        };

        assert!(run(&args).await.is_err());
    }
}
