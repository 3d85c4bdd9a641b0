//! Plain-text rendition of an issue.
//!
//! Sent as the `text/plain` alternative part by most newsletter platforms,
//! and read as-is by text-only clients.

use pulldown_cmark::{Event, HeadingLevel, Parser, Tag, TagEnd};

use super::markdown::{LinkBase, MarkdownError, markdown_options};
use crate::config::MarkdownConfig;
use crate::util::html_unescape;

#[derive(Default)]
struct TextWriter<'a> {
    /// Resolves relative link targets, like the email HTML does
    link_base: Option<&'a LinkBase>,
    out: String,
    /// One entry per open list: `Some(next number)` for ordered lists
    lists: Vec<Option<u64>>,
    /// Destination and start offset for each open link or image
    links: Vec<(String, usize)>,
    quotes: Vec<usize>,
    heading_start: Option<usize>,
    code: Option<String>,
    first_cell: bool,
    /// Tag cut off at the end of the previous HTML event
    html_pending: String,
    /// Inside `<style>` or `<script>`, whose text is not content
    html_skip: Option<String>,
}

impl TextWriter<'_> {
    fn ensure_newline(&mut self) {
        if !self.out.is_empty() && !self.out.ends_with('\n') {
            self.out.push('\n');
        }
    }

    fn blank_line(&mut self) {
        self.ensure_newline();
        if !self.out.is_empty() && !self.out.ends_with("\n\n") {
            self.out.push('\n');
        }
    }

    fn start(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Heading { .. } => {
                self.blank_line();
                self.heading_start = Some(self.out.len());
            }
            Tag::BlockQuote(_) => {
                self.blank_line();
                self.quotes.push(self.out.len());
            }
            Tag::CodeBlock(_) => {
                self.blank_line();
                self.code = Some(String::new());
            }
            Tag::List(start) => {
                if self.lists.is_empty() {
                    self.blank_line();
                }
                self.lists.push(start);
            }
            Tag::Item => {
                self.ensure_newline();
                let depth = self.lists.len().saturating_sub(1);
                self.out.push_str(&"  ".repeat(depth));
                match self.lists.last_mut() {
                    Some(Some(n)) => {
                        self.out.push_str(&format!("{}. ", n));
                        *n += 1;
                    }
                    _ => self.out.push_str("- "),
                }
            }
            Tag::Link { dest_url, .. } | Tag::Image { dest_url, .. } => self.open_link(&dest_url),
            Tag::FootnoteDefinition(label) => {
                self.blank_line();
                self.out.push_str(&format!("[{}]: ", label));
            }
            Tag::TableRow | Tag::TableHead => {
                self.ensure_newline();
                self.first_cell = true;
            }
            Tag::TableCell => {
                if !self.first_cell {
                    self.out.push_str(" | ");
                }
                self.first_cell = false;
            }
            _ => {}
        }
    }

    fn end(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph => {
                if self.lists.is_empty() {
                    self.blank_line();
                } else {
                    self.ensure_newline();
                }
            }
            TagEnd::Heading(level) => {
                if let Some(start) = self.heading_start.take() {
                    let width = self.out[start..].chars().count();
                    let underline = match level {
                        HeadingLevel::H1 => Some('='),
                        HeadingLevel::H2 => Some('-'),
                        _ => None,
                    };
                    if let Some(c) = underline {
                        self.out.push('\n');
                        self.out.push_str(&c.to_string().repeat(width));
                    }
                }
                self.blank_line();
            }
            TagEnd::BlockQuote(_) => {
                if let Some(start) = self.quotes.pop() {
                    let quoted = self.out.split_off(start);
                    let quoted = quoted
                        .trim_end()
                        .lines()
                        .map(|line| {
                            if line.is_empty() {
                                ">".to_string()
                            } else {
                                format!("> {}", line)
                            }
                        })
                        .collect::<Vec<_>>()
                        .join("\n");
                    self.out.push_str(&quoted);
                }
                self.blank_line();
            }
            TagEnd::CodeBlock => {
                if let Some(code) = self.code.take() {
                    for line in code.lines() {
                        if !line.is_empty() {
                            self.out.push_str("    ");
                            self.out.push_str(line);
                        }
                        self.out.push('\n');
                    }
                }
                self.blank_line();
            }
            TagEnd::List(_) => {
                self.lists.pop();
                if self.lists.is_empty() {
                    self.blank_line();
                }
            }
            TagEnd::Item => self.ensure_newline(),
            TagEnd::Link | TagEnd::Image => {
                if let Some((url, start)) = self.links.pop() {
                    let start = start.min(self.out.len());
                    let kept = self.out[start..].trim_end_matches(' ').len();
                    self.out.truncate(start + kept);
                    let text = &self.out[start..];
                    if text != url && !url.starts_with('#') && !url.is_empty() {
                        if text.is_empty() {
                            self.out.push_str(&url);
                        } else {
                            self.out.push_str(&format!(" ({})", url));
                        }
                    }
                }
            }
            TagEnd::FootnoteDefinition => self.blank_line(),
            TagEnd::TableHead | TagEnd::TableRow => self.out.push('\n'),
            TagEnd::Table => self.blank_line(),
            _ => {}
        }
    }

    fn event(&mut self, event: Event<'_>) {
        if self.code.is_some() {
            match event {
                Event::Text(text) => {
                    if let Some(code) = self.code.as_mut() {
                        code.push_str(&text);
                    }
                }
                Event::End(TagEnd::CodeBlock) => self.end(TagEnd::CodeBlock),
                _ => {}
            }
            return;
        }

        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(tag) => self.end(tag),
            Event::Text(text) | Event::Code(text) => self.out.push_str(&text),
            Event::SoftBreak | Event::HardBreak => self.out.push('\n'),
            Event::Rule => {
                self.blank_line();
                self.out.push_str("----");
                self.blank_line();
            }
            Event::TaskListMarker(checked) => {
                self.out.push_str(if checked { "[x] " } else { "[ ] " })
            }
            Event::FootnoteReference(label) => self.out.push_str(&format!("[{}]", label)),
            Event::Html(html) | Event::InlineHtml(html) => self.html(&html),
            _ => {}
        }
    }

    fn open_link(&mut self, dest_url: &str) {
        let url = match self.link_base {
            Some(base) => base.absolutize(dest_url),
            None => dest_url.to_string(),
        };
        self.links.push((url, self.out.len()));
    }

    fn trim_trailing_spaces(&mut self) {
        let len = self.out.trim_end_matches(' ').len();
        self.out.truncate(len);
    }

    /// Raw HTML, mostly from macros: keep the text, drop the markup.
    fn html(&mut self, chunk: &str) {
        let mut input = std::mem::take(&mut self.html_pending);
        input.push_str(chunk);

        let mut rest = input.as_str();
        while !rest.is_empty() {
            let (end, skip) = if rest.starts_with("<!--") {
                (rest.find("-->"), 3)
            } else if rest.starts_with('<') {
                (rest.find('>'), 1)
            } else {
                let end = rest.find('<').unwrap_or(rest.len());
                if self.html_skip.is_none() {
                    self.html_text(&rest[..end]);
                }
                rest = &rest[end..];
                continue;
            };

            match end {
                Some(end) => {
                    if !rest.starts_with("<!--") {
                        self.html_tag(&rest[1..end]);
                    }
                    rest = &rest[end + skip..];
                }
                None => {
                    self.html_pending = rest.to_string();
                    return;
                }
            }
        }
    }

    fn html_tag(&mut self, tag: &str) {
        let closing = tag.starts_with('/');
        let body = tag.trim_start_matches('/');
        let name = body
            .chars()
            .take_while(char::is_ascii_alphanumeric)
            .collect::<String>()
            .to_ascii_lowercase();

        if self.html_skip.is_some() {
            if closing && self.html_skip.as_deref() == Some(name.as_str()) {
                self.html_skip = None;
            }
            return;
        }

        match name.as_str() {
            "style" | "script" if !closing => self.html_skip = Some(name.clone()),
            "a" if closing => self.end(TagEnd::Link),
            "a" => self.open_link(&attribute(body, "href").unwrap_or_default()),
            "img" => {
                self.open_link(&attribute(body, "src").unwrap_or_default());
                self.out
                    .push_str(attribute(body, "alt").unwrap_or_default().trim());
                self.end(TagEnd::Image);
            }
            "p" | "div" | "table" | "blockquote" | "ul" | "ol" | "center" | "h1" | "h2"
            | "h3" | "h4" | "h5" | "h6" => {
                self.trim_trailing_spaces();
                self.blank_line();
            }
            "br" | "tr" | "li" => {
                self.trim_trailing_spaces();
                self.ensure_newline();
            }
            "td" | "th" if !closing => {
                if !self.out.is_empty() && !self.out.ends_with(['\n', ' ']) {
                    self.out.push(' ');
                }
            }
            _ => {}
        }
    }

    /// Text between tags, with entities decoded and whitespace collapsed.
    fn html_text(&mut self, text: &str) {
        for c in html_unescape(text).chars() {
            if c.is_whitespace() {
                if !self.out.is_empty() && !self.out.ends_with(['\n', ' ']) {
                    self.out.push(' ');
                }
            } else {
                self.out.push(c);
            }
        }
    }

    fn finish(mut self) -> String {
        self.trim_trailing_spaces();
        let mut text = self.out.trim_start_matches('\n').trim_end().to_string();
        while text.contains("\n\n\n") {
            text = text.replace("\n\n\n", "\n\n");
        }
        text.push('\n');
        text
    }
}

/// Value of an attribute in the inside of a start tag, e.g. `a href="x"`.
fn attribute(tag: &str, name: &str) -> Option<String> {
    let lower = tag.to_ascii_lowercase();
    let mut from = 0;
    while let Some(pos) = lower[from..].find(name) {
        let at = from + pos;
        from = at + name.len();
        if !lower[..at].ends_with(|c: char| c.is_ascii_whitespace()) {
            continue;
        }
        let Some(value) = tag[from..].trim_start().strip_prefix('=') else {
            continue;
        };
        let value = value.trim_start();
        let value = match value.chars().next() {
            Some(quote @ ('"' | '\'')) => value[1..].split(quote).next().unwrap_or_default(),
            _ => value
                .split(|c: char| c.is_ascii_whitespace() || c == '/')
                .next()
                .unwrap_or_default(),
        };
        return Some(html_unescape(value));
    }
    None
}

/// Render markdown as readable plain text.
///
/// With a `link_base`, relative link targets are made absolute the same
/// way the email variant's are.
pub fn render_plain_text(
    markdown: &str,
    markdown_config: &MarkdownConfig,
    link_base: Option<&LinkBase>,
) -> Result<String, MarkdownError> {
    let options = markdown_options(markdown_config)?;
    let mut writer = TextWriter {
        link_base,
        ..TextWriter::default()
    };
    for event in Parser::new_ext(markdown, options) {
        writer.event(event);
    }
    Ok(writer.finish())
}
