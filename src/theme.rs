//! Newsletter themes.
//!
//! The default theme is compiled into the binary. A theme directory laid out as
//!
//! ```text
//! theme/
//!   templates/  web.html, email.html, archive.html, macros.html
//!   styles/     web.css, email.css
//! ```
//!
//! overrides the built-in files one by one; anything missing falls back to the
//! default.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

const BUILTIN_TEMPLATES: [(&str, &str); 4] = [
    (
        "web.html",
        include_str!("../themes/default/templates/web.html"),
    ),
    (
        "email.html",
        include_str!("../themes/default/templates/email.html"),
    ),
    (
        "archive.html",
        include_str!("../themes/default/templates/archive.html"),
    ),
    (
        "macros.html",
        include_str!("../themes/default/templates/macros.html"),
    ),
];

const BUILTIN_WEB_CSS: &str = include_str!("../themes/default/styles/web.css");
const BUILTIN_EMAIL_CSS: &str = include_str!("../themes/default/styles/email.css");

#[derive(thiserror::Error, Debug)]
pub enum ThemeError {
    #[error("theme directory not found: {0}")]
    NotFound(PathBuf),

    #[error("failed to read theme file {0}: {1}")]
    Io(PathBuf, std::io::Error),

    #[error("refusing to overwrite existing theme file {0}")]
    Exists(PathBuf),
}

/// Templates and stylesheets used to render an issue.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Template name -> template source
    pub templates: BTreeMap<String, String>,
    pub web_css: String,
    pub email_css: String,
    /// The directory this theme was loaded from (`None` for the built-in theme)
    pub path: Option<PathBuf>,
}

impl Theme {
    /// The theme compiled into the binary.
    pub fn builtin() -> Self {
        Self {
            templates: BUILTIN_TEMPLATES
                .iter()
                .map(|(name, source)| (name.to_string(), source.to_string()))
                .collect(),
            web_css: BUILTIN_WEB_CSS.to_string(),
            email_css: BUILTIN_EMAIL_CSS.to_string(),
            path: None,
        }
    }

    /// Load a theme, layering files from `path` over the built-in theme.
    pub fn load(path: Option<&Path>) -> Result<Self, ThemeError> {
        let mut theme = Self::builtin();
        let Some(path) = path else {
            return Ok(theme);
        };

        if !path.is_dir() {
            return Err(ThemeError::NotFound(path.to_path_buf()));
        }

        let templates_dir = path.join("templates");
        if templates_dir.is_dir() {
            let entries = std::fs::read_dir(&templates_dir)
                .map_err(|e| ThemeError::Io(templates_dir.clone(), e))?;
            for entry in entries {
                let entry = entry.map_err(|e| ThemeError::Io(templates_dir.clone(), e))?;
                let file_path = entry.path();
                if file_path.extension().is_none_or(|ext| ext != "html") {
                    continue;
                }
                let Some(name) = file_path.file_name().and_then(|n| n.to_str()) else {
                    continue;
                };
                let source = read(&file_path)?;
                tracing::debug!("theme template override: {}", name);
                theme.templates.insert(name.to_string(), source);
            }
        }

        let styles_dir = path.join("styles");
        let web_css = styles_dir.join("web.css");
        if web_css.is_file() {
            theme.web_css = read(&web_css)?;
        }
        let email_css = styles_dir.join("email.css");
        if email_css.is_file() {
            theme.email_css = read(&email_css)?;
        }

        theme.path = Some(path.to_path_buf());
        Ok(theme)
    }

    /// Write the built-in theme to `dest` so it can be customised.
    ///
    /// Existing files are never overwritten. Returns the files written.
    pub fn eject(dest: &Path) -> Result<Vec<PathBuf>, ThemeError> {
        let mut files: Vec<(PathBuf, &str)> = BUILTIN_TEMPLATES
            .iter()
            .map(|(name, source)| (dest.join("templates").join(name), *source))
            .collect();
        files.push((dest.join("styles").join("web.css"), BUILTIN_WEB_CSS));
        files.push((dest.join("styles").join("email.css"), BUILTIN_EMAIL_CSS));

        if let Some((existing, _)) = files.iter().find(|(path, _)| path.exists()) {
            return Err(ThemeError::Exists(existing.clone()));
        }

        for (path, contents) in &files {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).map_err(|e| ThemeError::Io(parent.to_path_buf(), e))?;
            }
            std::fs::write(path, contents).map_err(|e| ThemeError::Io(path.clone(), e))?;
        }

        Ok(files.into_iter().map(|(path, _)| path).collect())
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::builtin()
    }
}

fn read(path: &Path) -> Result<String, ThemeError> {
    std::fs::read_to_string(path).map_err(|e| ThemeError::Io(path.to_path_buf(), e))
}
