//! Markdown-to-HTML rendering for the aggregated documentation.
//!
//! Renders CommonMark (plus tables, footnotes, strikethrough and task lists)
//! with raw HTML passed through untouched, so rewritten `<img>` and `<a>` tags
//! survive. Fenced code blocks are syntax highlighted when their language is
//! known, and every heading gets a stable slug id for in-document navigation.

mod highlight;
mod slug;

use pulldown_cmark::{CodeBlockKind, CowStr, Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use tracing::{debug, instrument};

pub use highlight::{DEFAULT_THEME, Highlighter, plain_block};
pub use slug::{SlugRegistry, slugify};

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// A heading found while rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heading {
    /// Heading level (1–6).
    pub level: u8,
    /// Plain text of the heading.
    pub text: String,
    /// Anchor id written on the element.
    pub id: String,
}

/// Result of rendering a markdown document.
#[derive(Debug, Clone)]
pub struct Rendered {
    /// The HTML body.
    pub html: String,
    /// Headings in document order.
    pub headings: Vec<Heading>,
}

// ---------------------------------------------------------------------------
// Renderer
// ---------------------------------------------------------------------------

/// Markdown renderer with syntax highlighting.
#[derive(Debug)]
pub struct Renderer {
    highlighter: Highlighter,
    options: Options,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer {
    /// Create a renderer with the default highlighting theme.
    pub fn new() -> Self {
        Self::with_theme(DEFAULT_THEME)
    }

    /// Create a renderer with a custom highlighting theme.
    pub fn with_theme(theme: &str) -> Self {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_FOOTNOTES);
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_TASKLISTS);

        Self {
            highlighter: Highlighter::new(theme),
            options,
        }
    }

    /// Render markdown to HTML.
    #[instrument(skip_all, fields(input_len = markdown.len()))]
    pub fn render(&self, markdown: &str) -> Rendered {
        let parser = Parser::new_ext(markdown, self.options);

        let mut events: Vec<Event<'_>> = Vec::new();
        let mut headings: Vec<Heading> = Vec::new();
        let mut slugs = SlugRegistry::default();

        // Index of the pending heading start event and its accumulated text
        let mut open_heading: Option<(usize, HeadingLevel, String)> = None;
        // Language and accumulated text of the code block being read
        let mut open_code: Option<(Option<String>, String)> = None;

        for event in parser {
            match event {
                Event::Start(Tag::CodeBlock(kind)) => {
                    let lang = match kind {
                        CodeBlockKind::Fenced(info) => fence_language(&info),
                        CodeBlockKind::Indented => None,
                    };
                    open_code = Some((lang, String::new()));
                }

                Event::End(TagEnd::CodeBlock) => {
                    if let Some((lang, code)) = open_code.take() {
                        events.push(Event::Html(CowStr::from(self.code_block(&code, lang.as_deref()))));
                    }
                }

                Event::Text(text) if open_code.is_some() => {
                    if let Some((_, code)) = open_code.as_mut() {
                        code.push_str(&text);
                    }
                }

                Event::Start(Tag::Heading { level, .. }) => {
                    open_heading = Some((events.len(), level, String::new()));
                    events.push(event);
                }

                Event::End(TagEnd::Heading(_)) => {
                    if let Some((start, level, text)) = open_heading.take() {
                        let slug = slugs.claim(&text);
                        if let Event::Start(Tag::Heading { id, .. }) = &mut events[start] {
                            let id = id.get_or_insert_with(|| CowStr::from(slug.clone()));
                            headings.push(Heading {
                                level: level as u8,
                                text: text.trim().to_string(),
                                id: id.to_string(),
                            });
                        }
                    }
                    events.push(event);
                }

                Event::Text(ref text) | Event::Code(ref text) if open_heading.is_some() => {
                    if let Some((_, _, heading_text)) = open_heading.as_mut() {
                        heading_text.push_str(text);
                    }
                    events.push(event);
                }

                other => events.push(other),
            }
        }

        let mut html = String::with_capacity(markdown.len() * 3 / 2);
        pulldown_cmark::html::push_html(&mut html, events.into_iter());

        debug!(
            html_len = html.len(),
            headings = headings.len(),
            "markdown rendered"
        );

        Rendered { html, headings }
    }

    /// Render one code block, highlighted when possible.
    fn code_block(&self, code: &str, lang: Option<&str>) -> String {
        lang.and_then(|l| self.highlighter.highlight(code, l))
            .unwrap_or_else(|| plain_block(code, lang))
    }
}

/// First word of a fence info string (` ```html title="x" ` → `html`).
fn fence_language(info: &str) -> Option<String> {
    info.split_whitespace()
        .next()
        .map(|l| l.trim_matches(|c| c == '{' || c == '}' || c == '.'))
        .filter(|l| !l.is_empty())
        .map(str::to_string)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
