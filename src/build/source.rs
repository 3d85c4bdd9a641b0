use std::path::{Path, PathBuf};

use super::document::Document;

// =============================================================================
// Errors
// =============================================================================

#[derive(thiserror::Error, Debug)]
pub enum SourceError {
    #[error("content directory does not exist: {0}")]
    PathNotFound(PathBuf),

    #[error("content path is not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("failed to read directory {path}: {source}")]
    ReadDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to read directory entry in {path}: {source}")]
    ReadEntry {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to read {path}: {source}")]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("not a markdown file: {0}")]
    NotMarkdown(PathBuf),
}

// =============================================================================
// Issue sources
// =============================================================================

/// A markdown file that will become an issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueSource {
    /// Where to read the file from
    pub full_path: PathBuf,
    /// Path relative to the content directory; the slug is derived from it
    pub relative_path: PathBuf,
}

impl IssueSource {
    /// An issue named explicitly, e.g. on the command line.
    ///
    /// Files inside the content directory keep their relative path (and so
    /// the slug a full build gives them); files elsewhere are named after
    /// their file name alone.
    pub fn from_file(path: &Path, content_dir: &Path) -> Result<Self, SourceError> {
        if !path.is_file() {
            return Err(SourceError::PathNotFound(path.to_path_buf()));
        }
        if !is_markdown(path) {
            return Err(SourceError::NotMarkdown(path.to_path_buf()));
        }

        let relative_path = relative_to(path, content_dir)
            .or_else(|| path.file_name().map(PathBuf::from))
            .ok_or_else(|| SourceError::NotMarkdown(path.to_path_buf()))?;

        Ok(Self {
            full_path: path.to_path_buf(),
            relative_path,
        })
    }

    /// Read and parse the file.
    pub fn load(&self) -> Result<Document, SourceError> {
        let text =
            std::fs::read_to_string(&self.full_path).map_err(|e| SourceError::ReadFile {
                path: self.full_path.clone(),
                source: e,
            })?;
        Ok(Document::new(self.relative_path.clone(), &text))
    }
}

/// `path` relative to `dir`, comparing canonical forms so `./issues/a.md`
/// and `/abs/issues/a.md` agree.
fn relative_to(path: &Path, dir: &Path) -> Option<PathBuf> {
    let path = path.canonicalize().ok()?;
    let dir = dir.canonicalize().ok()?;
    path.strip_prefix(&dir).ok().map(Path::to_path_buf)
}

/// True for `.md` and `.markdown` files (case-insensitive).
pub fn is_markdown(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .is_some_and(|e| e == "md" || e == "markdown")
}

/// Find every issue under the content directory, sorted by relative path.
///
/// Hidden files and directories are skipped.
pub fn discover_issues(content_dir: &Path) -> Result<Vec<IssueSource>, SourceError> {
    if !content_dir.exists() {
        return Err(SourceError::PathNotFound(content_dir.to_path_buf()));
    }
    if !content_dir.is_dir() {
        return Err(SourceError::NotADirectory(content_dir.to_path_buf()));
    }

    let mut issues = Vec::new();
    walk_directory(content_dir, &PathBuf::new(), &mut issues)?;
    issues.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));
    Ok(issues)
}

/// Recursively walk a directory and collect markdown files.
fn walk_directory(
    dir: &Path,
    relative_path: &Path,
    issues: &mut Vec<IssueSource>,
) -> Result<(), SourceError> {
    let entries = std::fs::read_dir(dir).map_err(|e| SourceError::ReadDir {
        path: dir.to_path_buf(),
        source: e,
    })?;

    for entry in entries {
        let entry = entry.map_err(|e| SourceError::ReadEntry {
            path: dir.to_path_buf(),
            source: e,
        })?;

        let path = entry.path();
        let file_name = entry.file_name();

        // Skip hidden files and directories
        if file_name.to_string_lossy().starts_with('.') {
            continue;
        }

        let item_relative_path = relative_path.join(&file_name);

        if path.is_dir() {
            walk_directory(&path, &item_relative_path, issues)?;
        } else if path.is_file() && is_markdown(&path) {
            issues.push(IssueSource {
                full_path: path,
                relative_path: item_relative_path,
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &Path, relative: &str, text: &str) -> PathBuf {
        let path = dir.join(relative);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, text).unwrap();
        path
    }

    #[test]
    fn test_discover_issues() {
        let tmp = tempfile::tempdir().unwrap();
        write(tmp.path(), "issue-2.md", "two");
        write(tmp.path(), "issue-1.markdown", "one");
        write(tmp.path(), "2024/spring.MD", "spring");
        write(tmp.path(), "notes.txt", "ignored");
        write(tmp.path(), ".drafts/secret.md", "hidden");
        write(tmp.path(), ".hidden.md", "hidden");

        let issues = discover_issues(tmp.path()).unwrap();
        let relative: Vec<_> = issues.iter().map(|i| i.relative_path.clone()).collect();

        assert_eq!(
            relative,
            vec![
                PathBuf::from("2024/spring.MD"),
                PathBuf::from("issue-1.markdown"),
                PathBuf::from("issue-2.md"),
            ]
        );
    }

    #[test]
    fn test_discover_missing_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let err = discover_issues(&tmp.path().join("nope")).unwrap_err();
        assert!(matches!(err, SourceError::PathNotFound(_)));
    }

    #[test]
    fn test_discover_not_a_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let file = write(tmp.path(), "file.md", "");
        let err = discover_issues(&file).unwrap_err();
        assert!(matches!(err, SourceError::NotADirectory(_)));
    }

    #[test]
    fn test_from_file_inside_content_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let path = write(tmp.path(), "2024/spring.md", "---\ntitle: Spring\n---\nBody");

        let source = IssueSource::from_file(&path, tmp.path()).unwrap();
        assert_eq!(source.relative_path, PathBuf::from("2024/spring.md"));

        let doc = source.load().unwrap();
        assert_eq!(doc.slug, "2024/spring");
        assert_eq!(doc.title(), "Spring");
    }

    #[test]
    fn test_from_file_outside_content_dir() {
        let content = tempfile::tempdir().unwrap();
        let elsewhere = tempfile::tempdir().unwrap();
        let path = write(elsewhere.path(), "special/one-off.md", "Body");

        let source = IssueSource::from_file(&path, content.path()).unwrap();
        assert_eq!(source.relative_path, PathBuf::from("one-off.md"));
    }

    #[test]
    fn test_from_file_rejects_non_markdown() {
        let tmp = tempfile::tempdir().unwrap();
        let path = write(tmp.path(), "notes.txt", "");
        assert!(matches!(
            IssueSource::from_file(&path, tmp.path()),
            Err(SourceError::NotMarkdown(_))
        ));
        assert!(matches!(
            IssueSource::from_file(&tmp.path().join("missing.md"), tmp.path()),
            Err(SourceError::PathNotFound(_))
        ));
    }
}
