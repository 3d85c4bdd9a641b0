use autumnus::{HtmlLinkedBuilder, formatter::Formatter, languages::Language, themes};

use crate::util::html_escape;

/// A syntax highlighter for the web variant, using autumnus (tree-sitter based).
///
/// Output uses CSS classes; the matching stylesheet comes from [`generate_css`]
/// and is embedded in the web page. The email variant never calls this since
/// class-based highlighting doesn't survive inlining into mail clients.
///
/// [`generate_css`]: SyntaxHighlighter::generate_css
pub struct SyntaxHighlighter {
    theme_name: String,
}

impl SyntaxHighlighter {
    pub fn new(theme_name: &str) -> Self {
        Self {
            theme_name: theme_name.to_string(),
        }
    }

    /// Highlight code and return HTML with CSS classes.
    /// Returns the original code wrapped in a plain `<code>` if the language is not supported.
    pub fn highlight(&self, code: &str, language: &str) -> String {
        let lang = Language::guess(language, code);

        if matches!(lang, Language::PlainText)
            && !language.is_empty()
            && language != "plaintext"
            && language != "text"
        {
            return plain_code_block(code, language);
        }

        let formatter = HtmlLinkedBuilder::new().source(code).lang(lang).build();

        match formatter {
            Ok(f) => {
                let mut output: Vec<u8> = Vec::new();
                if f.format(&mut output).is_ok() {
                    String::from_utf8(output).unwrap_or_else(|_| plain_code_block(code, language))
                } else {
                    plain_code_block(code, language)
                }
            }
            Err(_) => plain_code_block(code, language),
        }
    }

    /// Generate the stylesheet for the configured theme.
    ///
    /// Returns `None` for unknown theme names; pages then render unstyled code.
    pub fn generate_css(&self) -> Option<String> {
        let theme = themes::get(&self.theme_name).ok()?;
        Some(theme.css(false))
    }
}

impl Default for SyntaxHighlighter {
    fn default() -> Self {
        Self::new("github_light")
    }
}

/// A code block without highlighting, safe for any renderer.
pub fn plain_code_block(code: &str, language: &str) -> String {
    let escaped = html_escape(code);
    if language.is_empty() {
        format!("<pre><code>{}</code></pre>", escaped)
    } else {
        format!(
            "<pre><code class=\"language-{}\">{}</code></pre>",
            html_escape(language),
            escaped
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_highlight_rust() {
        let highlighter = SyntaxHighlighter::default();
        let result = highlighter.highlight("fn main() {}", "rust");
        assert!(result.contains("<pre"));
        assert!(result.contains("</pre>"));
    }

    #[test]
    fn test_highlight_unknown_language() {
        let highlighter = SyntaxHighlighter::default();
        let result = highlighter.highlight("some code", "unknown_lang_xyz");
        assert!(result.contains("<pre><code"));
        assert!(result.contains("some code"));
    }

    #[test]
    fn test_plain_code_block_escapes() {
        assert_eq!(
            plain_code_block("a < b && c", ""),
            "<pre><code>a &lt; b &amp;&amp; c</code></pre>"
        );
        assert_eq!(
            plain_code_block("x", "sh"),
            "<pre><code class=\"language-sh\">x</code></pre>"
        );
    }

    #[test]
    fn test_generate_css() {
        let highlighter = SyntaxHighlighter::new("dracula");
        let css = highlighter.generate_css();
        assert!(css.is_some_and(|css| !css.is_empty()));
    }

    #[test]
    fn test_generate_css_unknown_theme() {
        let highlighter = SyntaxHighlighter::new("no-such-theme");
        assert!(highlighter.generate_css().is_none());
    }
}
