//! Email post-processing: CSS inlining and whitespace compaction.
//!
//! Many mail clients drop `<style>` blocks, so every rule is moved into
//! `style` attributes. Compaction then trims bytes the budget would
//! otherwise spend on indentation.

use css_inline::CSSInliner;

#[derive(thiserror::Error, Debug)]
pub enum InlineError {
    #[error("failed to inline CSS: {0}")]
    Css(#[from] css_inline::InlineError),
}

/// Move all `<style>` rules into inline `style` attributes and drop the
/// `<style>` blocks.
pub fn inline_styles(html: &str) -> Result<String, InlineError> {
    let inliner = CSSInliner::options()
        .keep_style_tags(false)
        .keep_link_tags(false)
        .build();
    Ok(inliner.inline(html)?)
}

/// Elements whose contents are whitespace-sensitive.
const PRESERVED_TAGS: [&str; 2] = ["pre", "textarea"];

/// Collapse whitespace runs outside `<pre>`/`<textarea>` and strip comments.
///
/// A run containing a newline becomes a single newline, any other run a
/// single space, so rendered text is unchanged. Outlook conditional
/// comments (`<!--[if mso]>` and friends) are kept.
pub fn compact_html(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut i = 0;

    while i < html.len() {
        let rest = &html[i..];

        if rest.starts_with("<!--") {
            let end = rest.find("-->").map_or(rest.len(), |p| p + 3);
            let comment = &rest[..end];
            if comment.starts_with("<!--[if") || comment.starts_with("<!--<![endif") {
                out.push_str(comment);
            }
            i += end;
            continue;
        }

        if let Some(tag) = preserved_tag(rest) {
            let end = preserved_end(rest, tag);
            out.push_str(&rest[..end]);
            i += end;
            continue;
        }

        let Some(c) = rest.chars().next() else {
            break;
        };

        if c.is_ascii_whitespace() {
            let run_len = rest
                .find(|ch: char| !ch.is_ascii_whitespace())
                .unwrap_or(rest.len());
            out.push(if rest[..run_len].contains('\n') {
                '\n'
            } else {
                ' '
            });
            i += run_len;
            continue;
        }

        out.push(c);
        i += c.len_utf8();
    }

    out
}

/// If `rest` opens a whitespace-sensitive element, return its tag name.
fn preserved_tag(rest: &str) -> Option<&'static str> {
    let bytes = rest.as_bytes();
    PRESERVED_TAGS.into_iter().find(|tag| {
        let n = tag.len() + 1;
        bytes.len() > n
            && bytes[0] == b'<'
            && bytes[1..n].eq_ignore_ascii_case(tag.as_bytes())
            && (bytes[n] == b'>' || bytes[n].is_ascii_whitespace())
    })
}

/// Byte offset just past the closing tag of the element opened at the start of `rest`.
fn preserved_end(rest: &str, tag: &str) -> usize {
    let close = format!("</{}", tag);
    let lower = rest.to_ascii_lowercase();
    match lower.find(&close) {
        Some(pos) => rest[pos..].find('>').map_or(rest.len(), |q| pos + q + 1),
        None => rest.len(),
    }
}
