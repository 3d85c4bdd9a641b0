use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::util::title_case;

// =============================================================================
// Front matter
// =============================================================================

/// Front matter metadata parsed from an issue.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FrontMatter {
    /// Issue title (overrides the filename-derived title)
    pub title: Option<String>,
    /// Email subject line (defaults to the title)
    pub subject: Option<String>,
    /// Inbox preview text shown after the subject line
    pub preheader: Option<String>,
    /// Short description for the archive page and meta tags
    pub description: Option<String>,
    /// Publication date, ISO-8601 (e.g. "2024-05-01")
    pub date: Option<String>,
    pub author: Option<String>,
    /// Custom slug override
    pub slug: Option<String>,
    /// Drafts are skipped unless explicitly requested
    #[serde(default)]
    pub draft: bool,
    /// Additional arbitrary metadata (available in templates at top level, e.g., `page.issue`)
    #[serde(flatten)]
    pub extra: HashMap<String, serde_yaml::Value>,
}

/// Result of parsing front matter from markdown content.
#[derive(Debug)]
pub struct ParsedContent {
    /// The parsed front matter (empty if none found)
    pub front_matter: FrontMatter,
    /// The markdown content without the front matter block
    pub content: String,
}

/// Parse front matter from markdown content.
///
/// Front matter is a YAML block delimited by `---` lines at the start of the file:
///
/// ```markdown
/// ---
/// title: Issue 12
/// preheader: Three links and a long read
/// ---
///
/// # Content starts here
/// ```
///
/// Returns the parsed front matter and the remaining content.
pub fn parse_front_matter(content: &str) -> ParsedContent {
    let content = content.trim_start();

    let Some(after_opening) = content.strip_prefix("---") else {
        return ParsedContent {
            front_matter: FrontMatter::default(),
            content: content.to_string(),
        };
    };

    // The opening delimiter must be alone on its line
    let Some(after_opening) = after_opening
        .strip_prefix("\r\n")
        .or_else(|| after_opening.strip_prefix('\n'))
    else {
        return ParsedContent {
            front_matter: FrontMatter::default(),
            content: content.to_string(),
        };
    };

    // An empty block closes immediately on the next line
    let (yaml_content, rest) = if let Some(rest) = after_opening.strip_prefix("---") {
        ("", rest)
    } else {
        let Some(closing_pos) = after_opening.find("\n---") else {
            // No closing delimiter found, treat entire content as markdown
            return ParsedContent {
                front_matter: FrontMatter::default(),
                content: content.to_string(),
            };
        };
        (
            after_opening[..closing_pos].trim_end(),
            &after_opening[closing_pos + "\n---".len()..],
        )
    };

    // Drop the remainder of the closing delimiter line
    let markdown_content = match rest.find('\n') {
        Some(pos) => rest[pos + 1..].trim_start_matches(['\r', '\n']).to_string(),
        None => String::new(),
    };

    let front_matter = if yaml_content.trim().is_empty() {
        FrontMatter::default()
    } else {
        match serde_yaml::from_str(yaml_content) {
            Ok(fm) => fm,
            Err(e) => {
                tracing::warn!("failed to parse front matter: {}", e);
                FrontMatter::default()
            }
        }
    };

    ParsedContent {
        front_matter,
        content: markdown_content,
    }
}

// =============================================================================
// Documents
// =============================================================================

/// One newsletter issue, read from disk and split into front matter and body.
#[derive(Debug, Clone)]
pub struct Document {
    /// Path relative to the content directory (e.g., "2024/spring-roundup.md")
    pub source_path: PathBuf,
    /// Output slug (e.g., "2024/spring-roundup")
    pub slug: String,
    /// The URL path this issue's web page is served at (e.g., "/2024/spring-roundup")
    pub url_path: String,
    pub front_matter: FrontMatter,
    /// The markdown body without the front matter block
    pub raw_content: String,
}

impl Document {
    /// Build a document from its source-relative path and full file text.
    pub fn new(source_path: PathBuf, text: &str) -> Self {
        let parsed = parse_front_matter(text);
        let slug = parsed
            .front_matter
            .slug
            .as_deref()
            .and_then(clean_slug)
            .unwrap_or_else(|| slug_from_path(&source_path));
        let url_path = format!("/{}", slug);

        Self {
            source_path,
            slug,
            url_path,
            front_matter: parsed.front_matter,
            raw_content: parsed.content,
        }
    }

    /// Get the issue title, falling back to the filename if not in front matter.
    pub fn title(&self) -> String {
        self.front_matter.title.clone().unwrap_or_else(|| {
            self.source_path
                .file_stem()
                .and_then(|s| s.to_str())
                .map(title_case)
                .unwrap_or_else(|| "Untitled".to_string())
        })
    }

    /// Email subject line, falling back to the title.
    pub fn subject(&self) -> String {
        self.front_matter
            .subject
            .clone()
            .unwrap_or_else(|| self.title())
    }

    pub fn is_draft(&self) -> bool {
        self.front_matter.draft
    }

    /// Public URL of the web variant, absolute when a site URL is known.
    pub fn web_url(&self, site_url: Option<&str>) -> String {
        match site_url {
            Some(base) => format!("{}{}/", base.trim_end_matches('/'), self.url_path),
            None => format!("{}/", self.url_path),
        }
    }
}

/// Derive a slug from a content-relative path: extension dropped,
/// separators normalized, `index` files named after their directory.
fn slug_from_path(path: &Path) -> String {
    let path_str = path.with_extension("").to_string_lossy().replace('\\', "/");
    let path_str = path_str
        .strip_suffix("/index")
        .unwrap_or(&path_str)
        .to_string();

    clean_slug(&path_str).unwrap_or_else(|| "index".to_string())
}

/// Normalize a user-provided slug, dropping empty, `.` and `..` segments.
///
/// Slugs end up unescaped in `href` attributes, so anything other than
/// alphanumerics and `-_.~` becomes a single `-`.
fn clean_slug(slug: &str) -> Option<String> {
    let cleaned = slug
        .split('/')
        .map(clean_segment)
        .filter(|segment| !segment.is_empty() && segment != "." && segment != "..")
        .collect::<Vec<_>>()
        .join("/");

    if cleaned.is_empty() { None } else { Some(cleaned) }
}

fn clean_segment(segment: &str) -> String {
    let mut cleaned = String::with_capacity(segment.len());
    for c in segment.trim().chars() {
        if c.is_alphanumeric() || matches!(c, '-' | '_' | '.' | '~') {
            cleaned.push(c);
        } else if !cleaned.ends_with('-') {
            cleaned.push('-');
        }
    }
    cleaned.trim_matches('-').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_front_matter_basic() {
        let content = r#"---
title: Issue 12
preheader: Three links and a long read
---

# Hello World
"#;
        let parsed = parse_front_matter(content);
        assert_eq!(parsed.front_matter.title, Some("Issue 12".to_string()));
        assert_eq!(
            parsed.front_matter.preheader,
            Some("Three links and a long read".to_string())
        );
        assert_eq!(parsed.content.trim(), "# Hello World");
    }

    #[test]
    fn test_parse_front_matter_with_custom_fields() {
        let content = r#"---
title: Custom Issue
sponsor: ACME
issue: 12
---

Content here
"#;
        let parsed = parse_front_matter(content);
        assert_eq!(parsed.front_matter.title, Some("Custom Issue".to_string()));
        assert!(parsed.front_matter.extra.contains_key("sponsor"));
        assert!(parsed.front_matter.extra.contains_key("issue"));
    }

    #[test]
    fn test_parse_front_matter_no_front_matter() {
        let content = "# Just Markdown\n\nNo front matter here.";
        let parsed = parse_front_matter(content);
        assert_eq!(parsed.front_matter.title, None);
        assert!(parsed.content.starts_with("# Just Markdown"));
    }

    #[test]
    fn test_parse_front_matter_empty_front_matter() {
        let content = "---\n---\n\n# Content";
        let parsed = parse_front_matter(content);
        assert_eq!(parsed.front_matter.title, None);
        assert!(parsed.content.starts_with("# Content"));
    }

    #[test]
    fn test_parse_front_matter_unclosed() {
        let content = "---\ntitle: Oops\n\n# Content";
        let parsed = parse_front_matter(content);
        assert_eq!(parsed.front_matter.title, None);
        assert!(parsed.content.starts_with("---"));
    }

    #[test]
    fn test_parse_front_matter_rule_is_not_front_matter() {
        // A thematic break with trailing text isn't an opening delimiter
        let content = "--- not front matter\n\ntext";
        let parsed = parse_front_matter(content);
        assert_eq!(parsed.content, content);
    }

    #[test]
    fn test_parse_front_matter_malformed_yaml() {
        let content = "---\ntitle: [unclosed\n---\nBody";
        let parsed = parse_front_matter(content);
        assert_eq!(parsed.front_matter.title, None);
        assert_eq!(parsed.content, "Body");
    }

    #[test]
    fn test_parse_front_matter_crlf() {
        let content = "---\r\ntitle: Windows\r\n---\r\nBody";
        let parsed = parse_front_matter(content);
        assert_eq!(parsed.front_matter.title, Some("Windows".to_string()));
        assert_eq!(parsed.content, "Body");
    }

    #[test]
    fn test_document_title_fallback() {
        let doc = Document::new(PathBuf::from("2024/spring-roundup.md"), "Body");
        assert_eq!(doc.title(), "Spring Roundup");
        assert_eq!(doc.subject(), "Spring Roundup");
        assert_eq!(doc.slug, "2024/spring-roundup");
        assert_eq!(doc.url_path, "/2024/spring-roundup");
    }

    #[test]
    fn test_document_subject_and_slug_from_front_matter() {
        let doc = Document::new(
            PathBuf::from("draft.md"),
            "---\ntitle: Issue 3\nsubject: \"Issue 3: the big one\"\nslug: /issues/3/\n---\nBody",
        );
        assert_eq!(doc.title(), "Issue 3");
        assert_eq!(doc.subject(), "Issue 3: the big one");
        assert_eq!(doc.slug, "issues/3");
    }

    #[test]
    fn test_document_slug_rejects_traversal() {
        let doc = Document::new(PathBuf::from("a.md"), "---\nslug: ../../etc\n---\n");
        assert_eq!(doc.slug, "etc");

        let doc = Document::new(PathBuf::from("a.md"), "---\nslug: ../..\n---\n");
        assert_eq!(doc.slug, "a");
    }

    #[test]
    fn test_document_slug_strips_markup_characters() {
        let doc = Document::new(
            PathBuf::from("a.md"),
            "---\nslug: 'x\" onmouseover=\"alert(1)<b>'\n---\n",
        );
        assert_eq!(doc.slug, "x-onmouseover-alert-1-b");
        assert_eq!(doc.url_path, "/x-onmouseover-alert-1-b");

        let doc = Document::new(PathBuf::from("2024/Spring Roundup!.md"), "Body");
        assert_eq!(doc.slug, "2024/Spring-Roundup");
    }

    #[test]
    fn test_document_index_slug() {
        let doc = Document::new(PathBuf::from("launch/index.md"), "Body");
        assert_eq!(doc.slug, "launch");
    }

    #[test]
    fn test_web_url() {
        let doc = Document::new(PathBuf::from("issue-1.md"), "Body");
        assert_eq!(
            doc.web_url(Some("https://notes.example.com/")),
            "https://notes.example.com/issue-1/"
        );
        assert_eq!(doc.web_url(None), "/issue-1/");
    }

    #[test]
    fn test_draft_flag() {
        let doc = Document::new(PathBuf::from("wip.md"), "---\ndraft: true\n---\nBody");
        assert!(doc.is_draft());
    }
}
