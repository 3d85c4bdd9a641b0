//! Output path conventions.
//!
//! Every issue gets its own directory under the output directory:
//!
//! ```text
//! _site/
//!   index.html            archive
//!   manifest.json
//!   issue-12/
//!     index.html          web variant
//!     email.html          email variant
//!     email.txt           plain-text rendition
//! ```

use std::path::{Path, PathBuf};

pub const WEB_FILE: &str = "index.html";
pub const EMAIL_FILE: &str = "email.html";
pub const TEXT_FILE: &str = "email.txt";
pub const ARCHIVE_FILE: &str = "index.html";
pub const MANIFEST_FILE: &str = "manifest.json";

/// Directory holding all outputs of one issue.
pub fn issue_dir(slug: &str, output_dir: &Path) -> PathBuf {
    slug.split('/')
        .filter(|segment| !segment.is_empty())
        .fold(output_dir.to_path_buf(), |dir, segment| dir.join(segment))
}

pub fn web_output_path(slug: &str, output_dir: &Path) -> PathBuf {
    issue_dir(slug, output_dir).join(WEB_FILE)
}

pub fn email_output_path(slug: &str, output_dir: &Path) -> PathBuf {
    issue_dir(slug, output_dir).join(EMAIL_FILE)
}

pub fn text_output_path(slug: &str, output_dir: &Path) -> PathBuf {
    issue_dir(slug, output_dir).join(TEXT_FILE)
}

/// Relative link from an issue page back to the output root.
///
/// "issue-1" -> "../", "2024/issue-1" -> "../../"
pub fn root_prefix(slug: &str) -> String {
    let depth = slug.split('/').filter(|s| !s.is_empty()).count();
    "../".repeat(depth.max(1))
}

/// Get the base path from a config file path (its parent directory).
pub fn base_path_from_config(config_path: &Path) -> PathBuf {
    config_path
        .parent()
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_paths() {
        let output = Path::new("/site");
        assert_eq!(
            web_output_path("issue-1", output),
            PathBuf::from("/site/issue-1/index.html")
        );
        assert_eq!(
            email_output_path("2024/issue-1", output),
            PathBuf::from("/site/2024/issue-1/email.html")
        );
        assert_eq!(
            text_output_path("issue-1", output),
            PathBuf::from("/site/issue-1/email.txt")
        );
    }

    #[test]
    fn test_root_prefix() {
        assert_eq!(root_prefix("issue-1"), "../");
        assert_eq!(root_prefix("2024/issue-1"), "../../");
    }

    #[test]
    fn test_base_path_from_config() {
        assert_eq!(
            base_path_from_config(Path::new("/project/letterpress.yaml")),
            PathBuf::from("/project")
        );
        assert_eq!(
            base_path_from_config(Path::new("letterpress.yaml")),
            PathBuf::from("")
        );
    }
}
