//! Markdown rendering for both variants.
//!
//! The web variant gets heading permalinks and class-based syntax
//! highlighting. The email variant stays conservative: plain code blocks,
//! no form controls, absolute URLs.

use std::collections::HashSet;

use pulldown_cmark::{
    CodeBlockKind, CowStr, Event, HeadingLevel, Options, Parser, Tag, TagEnd, html,
};

use super::highlight::{SyntaxHighlighter, plain_code_block};
use super::render::TocEntry;
use crate::config::MarkdownConfig;
use crate::util::html_escape;

#[derive(thiserror::Error, Debug)]
pub enum MarkdownError {
    #[error("invalid markdown extension: {0}")]
    InvalidExtension(String),
}

/// Result of rendering markdown, containing both HTML and table of contents.
pub struct MarkdownOutput {
    pub html: String,
    pub toc: Vec<TocEntry>,
}

/// How markdown should be rendered.
pub enum RenderMode<'a> {
    /// Full-featured page: permalinks, highlighted code.
    Web { highlighter: &'a SyntaxHighlighter },
    /// Email-client-safe fragment.
    Email { links: Option<&'a LinkBase> },
}

/// Base URLs used to make relative links absolute in email.
#[derive(Debug, Clone)]
pub struct LinkBase {
    site_url: String,
    page_url: String,
}

impl LinkBase {
    /// `site_url` resolves root-relative links, `page_url` resolves the rest.
    pub fn new(site_url: &str, page_url: &str) -> Self {
        let mut page_url = page_url.to_string();
        if !page_url.ends_with('/') {
            page_url.push('/');
        }
        Self {
            site_url: site_url.trim_end_matches('/').to_string(),
            page_url,
        }
    }

    /// Make a link target absolute. Fragments and URLs with a scheme are untouched.
    pub fn absolutize(&self, url: &str) -> String {
        if url.is_empty() || url.starts_with('#') || url.starts_with("//") || has_scheme(url) {
            url.to_string()
        } else if url.starts_with('/') {
            format!("{}{}", self.site_url, url)
        } else {
            format!("{}{}", self.page_url, url.trim_start_matches("./"))
        }
    }
}

/// True for `https://...`, `mailto:...` and the like.
fn has_scheme(url: &str) -> bool {
    match url.find(':') {
        Some(pos) if pos > 0 => url[..pos]
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.')),
        _ => false,
    }
}

/// Map configured extension names to parser options.
pub fn markdown_options(markdown_config: &MarkdownConfig) -> Result<Options, MarkdownError> {
    let mut options = Options::empty();
    for extension in &markdown_config.extensions {
        match extension.as_str() {
            "definition_lists" => options.insert(Options::ENABLE_DEFINITION_LIST),
            "footnotes" => options.insert(Options::ENABLE_FOOTNOTES),
            "gfm" => options.insert(Options::ENABLE_GFM),
            "heading_attributes" => options.insert(Options::ENABLE_HEADING_ATTRIBUTES),
            "strikethrough" => options.insert(Options::ENABLE_STRIKETHROUGH),
            "tables" => options.insert(Options::ENABLE_TABLES),
            "tasklists" => options.insert(Options::ENABLE_TASKLISTS),
            other => return Err(MarkdownError::InvalidExtension(other.to_string())),
        }
    }
    Ok(options)
}

struct HeadingState<'a> {
    level: HeadingLevel,
    id: Option<String>,
    classes: Vec<String>,
    attrs: Vec<(String, Option<String>)>,
    inner: Vec<Event<'a>>,
    text: String,
}

struct CodeState {
    language: String,
    content: String,
}

/// Render markdown to HTML using pulldown-cmark.
pub fn render_markdown(
    markdown: &str,
    mode: &RenderMode<'_>,
    markdown_config: &MarkdownConfig,
) -> Result<MarkdownOutput, MarkdownError> {
    let options = markdown_options(markdown_config)?;
    let parser = Parser::new_ext(markdown, options);

    let mut events: Vec<Event> = Vec::new();
    let mut heading: Option<HeadingState> = None;
    let mut code: Option<CodeState> = None;
    let mut used_heading_ids: HashSet<String> = HashSet::new();
    let mut toc: Vec<TocEntry> = Vec::new();

    for event in parser {
        if code.is_some() {
            match event {
                Event::Text(text) => {
                    if let Some(state) = code.as_mut() {
                        state.content.push_str(&text);
                    }
                }
                Event::End(TagEnd::CodeBlock) => {
                    let Some(state) = code.take() else {
                        continue;
                    };
                    let html = match mode {
                        RenderMode::Web { highlighter } => {
                            highlighter.highlight(&state.content, &state.language)
                        }
                        RenderMode::Email { .. } => {
                            plain_code_block(&state.content, &state.language)
                        }
                    };
                    events.push(Event::Html(html.into()));
                }
                _ => {}
            }
            continue;
        }

        match event {
            Event::Start(Tag::CodeBlock(kind)) => {
                let language = match kind {
                    CodeBlockKind::Fenced(info) => info
                        .split([',', ' '])
                        .next()
                        .unwrap_or_default()
                        .to_string(),
                    CodeBlockKind::Indented => String::new(),
                };
                code = Some(CodeState {
                    language,
                    content: String::new(),
                });
            }
            Event::Start(Tag::Heading {
                level,
                id,
                classes,
                attrs,
            }) => {
                heading = Some(HeadingState {
                    level,
                    id: id.map(|id| id.to_string()),
                    classes: classes.iter().map(|c| c.to_string()).collect(),
                    attrs: attrs
                        .iter()
                        .map(|(k, v)| (k.to_string(), v.as_ref().map(|v| v.to_string())))
                        .collect(),
                    inner: Vec::new(),
                    text: String::new(),
                });
            }
            Event::End(TagEnd::Heading(_)) if heading.is_some() => {
                let Some(state) = heading.take() else {
                    continue;
                };

                let id = match &state.id {
                    Some(existing) => existing.clone(),
                    None => unique_id(&state.text, &used_heading_ids),
                };
                used_heading_ids.insert(id.clone());

                toc.push(TocEntry {
                    text: state.text.clone(),
                    id: id.clone(),
                    level: state.level as u8,
                });

                events.push(Event::Html(heading_html(state, &id, mode).into()));
            }
            event => {
                let event = match mode {
                    RenderMode::Email { links } => email_event(event, *links),
                    RenderMode::Web { .. } => event,
                };
                match heading.as_mut() {
                    Some(state) => {
                        if let Event::Text(text) | Event::Code(text) = &event {
                            state.text.push_str(text);
                        }
                        state.inner.push(event);
                    }
                    None => events.push(event),
                }
            }
        }
    }

    let mut html_output = String::new();
    html::push_html(&mut html_output, events.into_iter());

    Ok(MarkdownOutput {
        html: html_output,
        toc,
    })
}

/// Rewrite one event for mail clients.
fn email_event<'a>(event: Event<'a>, links: Option<&LinkBase>) -> Event<'a> {
    match event {
        // Mail clients strip form controls; a glyph survives everywhere
        Event::TaskListMarker(checked) => {
            Event::Text(CowStr::from(if checked { "\u{2611} " } else { "\u{2610} " }))
        }
        Event::Start(Tag::Link {
            link_type,
            dest_url,
            title,
            id,
        }) => Event::Start(Tag::Link {
            link_type,
            dest_url: rebase(dest_url, links),
            title,
            id,
        }),
        Event::Start(Tag::Image {
            link_type,
            dest_url,
            title,
            id,
        }) => Event::Start(Tag::Image {
            link_type,
            dest_url: rebase(dest_url, links),
            title,
            id,
        }),
        event => event,
    }
}

fn rebase<'a>(url: CowStr<'a>, links: Option<&LinkBase>) -> CowStr<'a> {
    match links {
        Some(base) => CowStr::from(base.absolutize(&url)),
        None => url,
    }
}

fn heading_html(state: HeadingState<'_>, id: &str, mode: &RenderMode<'_>) -> String {
    let level = state.level as usize;

    let class_attr = if state.classes.is_empty() {
        String::new()
    } else {
        format!(" class=\"{}\"", html_escape(&state.classes.join(" ")))
    };

    let extra_attrs = state
        .attrs
        .iter()
        .map(|(k, v)| match v {
            Some(val) => format!(" {}=\"{}\"", html_escape(k), html_escape(val)),
            None => format!(" {}", html_escape(k)),
        })
        .collect::<String>();

    let mut inner = String::new();
    html::push_html(&mut inner, state.inner.into_iter());

    match mode {
        RenderMode::Web { .. } => format!(
            "<h{level} id=\"{id}\"{class_attr}{extra_attrs}>{inner} \
             <a class=\"header-anchor\" href=\"#{id}\" aria-label=\"Link to this heading\">#</a></h{level}>\n",
            id = html_escape(id),
        ),
        RenderMode::Email { .. } => {
            format!("<h{level}{class_attr}{extra_attrs}>{inner}</h{level}>\n")
        }
    }
}

/// Generate an id from heading text that isn't already taken.
fn unique_id(text: &str, used: &HashSet<String>) -> String {
    let mut base_id = slugify(text);
    if base_id.is_empty() {
        base_id = "section".to_string();
    }

    let mut id = base_id.clone();
    let mut suffix = 1;
    while used.contains(&id) {
        id = format!("{}-{}", base_id, suffix);
        suffix += 1;
    }
    id
}

/// Convert a string to a slug suitable for use as an HTML id.
fn slugify(s: &str) -> String {
    s.trim()
        .to_lowercase()
        .replace(' ', "-")
        .replace(|c: char| !c.is_alphanumeric() && c != '-', "")
}
