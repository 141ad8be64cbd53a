//! Markdown rendering with syntax highlighting
//!
//! Rendering is driven by a [`Renderers`] table that maps each custom
//! element kind (headings, links, code blocks, images, blockquotes, tables)
//! to a render function. Everything else goes through pulldown-cmark's HTML
//! writer unchanged.

use pulldown_cmark::{html, CodeBlockKind, CowStr, Event, Options, Parser, Tag};
use std::collections::HashMap;
use std::sync::Arc;
use syntect::highlighting::ThemeSet;
use syntect::html::highlighted_html_for_string;
use syntect::parsing::SyntaxSet;

use crate::config::HighlightConfig;
use crate::helpers::{escape_html, image_tag, link_to, slugify_heading};

/// Element kinds that can be rendered by a custom function
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    Heading,
    Link,
    CodeBlock,
    Image,
    Blockquote,
    Table,
}

impl ElementKind {
    pub const ALL: [ElementKind; 6] = [
        ElementKind::Heading,
        ElementKind::Link,
        ElementKind::CodeBlock,
        ElementKind::Image,
        ElementKind::Blockquote,
        ElementKind::Table,
    ];
}

/// A parsed element handed to a render function
///
/// `inner` fields hold already rendered HTML of the element's children.
#[derive(Debug, Clone, Copy)]
pub enum Element<'a> {
    Heading { level: u8, id: &'a str, inner: &'a str },
    Link { href: &'a str, title: &'a str, inner: &'a str },
    CodeBlock { lang: Option<&'a str>, code: &'a str },
    Image { src: &'a str, alt: &'a str, title: &'a str },
    Blockquote { inner: &'a str },
    /// `inner` is the complete `<table>` element
    Table { inner: &'a str },
}

impl Element<'_> {
    pub fn kind(&self) -> ElementKind {
        match self {
            Element::Heading { .. } => ElementKind::Heading,
            Element::Link { .. } => ElementKind::Link,
            Element::CodeBlock { .. } => ElementKind::CodeBlock,
            Element::Image { .. } => ElementKind::Image,
            Element::Blockquote { .. } => ElementKind::Blockquote,
            Element::Table { .. } => ElementKind::Table,
        }
    }
}

/// A render function for one element kind
pub type RenderFn = Arc<dyn Fn(&Element<'_>) -> String + Send + Sync>;

/// Table of render functions keyed by element kind
#[derive(Clone)]
pub struct Renderers {
    table: HashMap<ElementKind, RenderFn>,
}

impl Renderers {
    /// Default renderers, highlighting code with `highlighter`
    pub fn new(highlighter: Arc<Highlighter>) -> Self {
        let mut table: HashMap<ElementKind, RenderFn> = HashMap::new();
        for kind in ElementKind::ALL {
            table.insert(kind, Arc::new(render_default));
        }
        table.insert(
            ElementKind::CodeBlock,
            Arc::new(move |element: &Element<'_>| match element {
                Element::CodeBlock { lang, code } => highlighter.highlight(code, *lang),
                other => render_default(other),
            }),
        );
        Self { table }
    }

    /// Replace the render function for one element kind
    pub fn with<F>(mut self, kind: ElementKind, render: F) -> Self
    where
        F: Fn(&Element<'_>) -> String + Send + Sync + 'static,
    {
        self.table.insert(kind, Arc::new(render));
        self
    }

    pub fn render(&self, element: &Element<'_>) -> String {
        match self.table.get(&element.kind()) {
            Some(render) => render(element),
            None => render_default(element),
        }
    }
}

impl Default for Renderers {
    fn default() -> Self {
        Self::new(Arc::new(Highlighter::default()))
    }
}

/// Built-in rendering for every element kind
fn render_default(element: &Element<'_>) -> String {
    match *element {
        Element::Heading { level, id, inner } => {
            let id = escape_html(id);
            format!(
                r##"<h{level} id="{id}"><a href="#{id}" class="anchor"></a>{inner}</h{level}>"##,
                level = level,
                id = id,
                inner = inner
            ) + "\n"
        }
        Element::Link { href, inner, .. } => link_to(href, inner),
        Element::CodeBlock { lang, code } => {
            let lang = lang.unwrap_or("text");
            format!(
                r#"<pre><code class="language-{}">{}</code></pre>"#,
                escape_html(lang),
                escape_html(code)
            ) + "\n"
        }
        Element::Image { src, alt, title } => {
            format!(
                r#"<figure class="image">{}</figure>"#,
                image_tag(src, alt, Some(title))
            )
        }
        Element::Blockquote { inner } => format!("<blockquote>\n{}</blockquote>\n", inner),
        Element::Table { inner } => format!(r#"<div class="table-wrapper">{}</div>"#, inner) + "\n",
    }
}

/// Syntax highlighter for fenced code blocks
pub struct Highlighter {
    syntax_set: SyntaxSet,
    theme_set: ThemeSet,
    theme_name: String,
    line_numbers: bool,
}

impl Highlighter {
    pub fn new(config: &HighlightConfig) -> Self {
        Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme_set: ThemeSet::load_defaults(),
            theme_name: config.theme.clone(),
            line_numbers: config.line_number,
        }
    }

    /// Highlight a code block
    pub fn highlight(&self, code: &str, lang: Option<&str>) -> String {
        let lang = lang.unwrap_or("text");

        let syntax = self
            .syntax_set
            .find_syntax_by_token(lang)
            .or_else(|| self.syntax_set.find_syntax_by_extension(lang))
            .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text());

        let theme = self
            .theme_set
            .themes
            .get(&self.theme_name)
            .or_else(|| self.theme_set.themes.values().next());

        let highlighted = theme.and_then(|theme| {
            highlighted_html_for_string(code, &self.syntax_set, syntax, theme).ok()
        });

        match highlighted {
            Some(html) if self.line_numbers => {
                self.add_line_numbers(&html, lang, code.lines().count())
            }
            Some(html) => format!(
                r#"<div class="highlight language-{}">{}</div>"#,
                escape_html(lang),
                html
            ),
            None => render_default(&Element::CodeBlock {
                lang: Some(lang),
                code,
            }),
        }
    }

    /// Add a line number gutter to highlighted code
    fn add_line_numbers(&self, code: &str, lang: &str, line_count: usize) -> String {
        let gutter = (1..=line_count)
            .map(|n| format!(r#"<span class="line-number">{}</span>"#, n))
            .collect::<Vec<_>>()
            .join("\n");

        format!(
            r#"<figure class="highlight {}"><table><tr><td class="gutter"><pre>{}</pre></td><td class="code">{}</td></tr></table></figure>"#,
            escape_html(lang),
            gutter,
            code
        )
    }
}

impl Default for Highlighter {
    fn default() -> Self {
        Self::new(&HighlightConfig::default())
    }
}

/// An element being collected while its children are parsed
struct Frame<'a> {
    open: Open,
    events: Vec<Event<'a>>,
    /// Plain text of all descendants
    text: String,
    /// Nesting depth of non-intercepted tags inside this element
    depth: usize,
}

enum Open {
    Heading { level: u8, id: Option<String> },
    Link { href: String, title: String },
    CodeBlock { lang: Option<String> },
    Image { src: String, title: String },
    Blockquote,
    Table,
}

impl Open {
    fn from_tag(tag: &Tag<'_>) -> Option<Self> {
        let open = match tag {
            Tag::Heading { level, id, .. } => Open::Heading {
                level: *level as u8,
                id: id.as_ref().map(|id| id.to_string()),
            },
            Tag::Link {
                dest_url, title, ..
            } => Open::Link {
                href: dest_url.to_string(),
                title: title.to_string(),
            },
            Tag::CodeBlock(kind) => Open::CodeBlock {
                lang: match kind {
                    CodeBlockKind::Fenced(info) => info
                        .split_whitespace()
                        .next()
                        .map(|lang| lang.to_string()),
                    CodeBlockKind::Indented => None,
                },
            },
            Tag::Image {
                dest_url, title, ..
            } => Open::Image {
                src: dest_url.to_string(),
                title: title.to_string(),
            },
            Tag::BlockQuote(_) => Open::Blockquote,
            Tag::Table(_) => Open::Table,
            _ => return None,
        };
        Some(open)
    }
}

/// Markdown renderer
pub struct MarkdownRenderer {
    renderers: Renderers,
}

impl MarkdownRenderer {
    /// Create a renderer with the default element renderers
    pub fn new(config: &HighlightConfig) -> Self {
        Self::with_renderers(Renderers::new(Arc::new(Highlighter::new(config))))
    }

    /// Create a renderer with a custom render table
    pub fn with_renderers(renderers: Renderers) -> Self {
        Self { renderers }
    }

    /// Render a post body to HTML
    pub fn render(&self, markdown: &str) -> String {
        let options = Options::ENABLE_TABLES
            | Options::ENABLE_FOOTNOTES
            | Options::ENABLE_STRIKETHROUGH
            | Options::ENABLE_TASKLISTS
            | Options::ENABLE_SMART_PUNCTUATION
            | Options::ENABLE_HEADING_ATTRIBUTES;
        let parser = Parser::new_ext(markdown, options);

        let mut output: Vec<Event> = Vec::new();
        let mut stack: Vec<Frame> = Vec::new();

        for event in parser {
            match event {
                Event::Start(tag) => {
                    if let Some(open) = Open::from_tag(&tag) {
                        let mut events = Vec::new();
                        if matches!(open, Open::Table) {
                            events.push(Event::Start(tag));
                        }
                        stack.push(Frame {
                            open,
                            events,
                            text: String::new(),
                            depth: 0,
                        });
                    } else {
                        if let Some(frame) = stack.last_mut() {
                            frame.depth += 1;
                        }
                        sink(&mut stack, &mut output).push(Event::Start(tag));
                    }
                }
                Event::End(end) => match stack.last().map(|frame| frame.depth) {
                    Some(0) => {
                        let Some(mut frame) = stack.pop() else {
                            continue;
                        };
                        if matches!(frame.open, Open::Table) {
                            frame.events.push(Event::End(end));
                        }
                        let html = self.finish(frame);
                        sink(&mut stack, &mut output).push(Event::Html(CowStr::from(html)));
                    }
                    Some(_) => {
                        if let Some(frame) = stack.last_mut() {
                            frame.depth -= 1;
                            frame.events.push(Event::End(end));
                        }
                    }
                    None => output.push(Event::End(end)),
                },
                Event::Text(text) | Event::Code(text)
                    if matches!(
                        stack.last(),
                        Some(Frame {
                            open: Open::CodeBlock { .. },
                            ..
                        })
                    ) =>
                {
                    for frame in stack.iter_mut() {
                        frame.text.push_str(&text);
                    }
                }
                Event::Text(text) => {
                    for frame in stack.iter_mut() {
                        frame.text.push_str(&text);
                    }
                    sink(&mut stack, &mut output).push(Event::Text(text));
                }
                Event::Code(code) => {
                    for frame in stack.iter_mut() {
                        frame.text.push_str(&code);
                    }
                    sink(&mut stack, &mut output).push(Event::Code(code));
                }
                other => sink(&mut stack, &mut output).push(other),
            }
        }

        let mut html_output = String::new();
        html::push_html(&mut html_output, output.into_iter());
        html_output
    }

    /// Render a collected element through the render table
    fn finish(&self, frame: Frame<'_>) -> String {
        let mut inner = String::new();
        html::push_html(&mut inner, frame.events.into_iter());

        match &frame.open {
            Open::Heading { level, id } => {
                let id = id.clone().unwrap_or_else(|| slugify_heading(&frame.text));
                self.renderers.render(&Element::Heading {
                    level: *level,
                    id: &id,
                    inner: &inner,
                })
            }
            Open::Link { href, title } => self.renderers.render(&Element::Link {
                href,
                title,
                inner: &inner,
            }),
            Open::CodeBlock { lang } => self.renderers.render(&Element::CodeBlock {
                lang: lang.as_deref(),
                code: &frame.text,
            }),
            Open::Image { src, title } => self.renderers.render(&Element::Image {
                src,
                alt: &frame.text,
                title,
            }),
            Open::Blockquote => self.renderers.render(&Element::Blockquote { inner: &inner }),
            Open::Table => self.renderers.render(&Element::Table { inner: &inner }),
        }
    }
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::with_renderers(Renderers::default())
    }
}

/// Where the next event goes: the innermost open element, or the output
fn sink<'s, 'a>(
    stack: &'s mut [Frame<'a>],
    output: &'s mut Vec<Event<'a>>,
) -> &'s mut Vec<Event<'a>> {
    match stack.last_mut() {
        Some(frame) => &mut frame.events,
        None => output,
    }
}
