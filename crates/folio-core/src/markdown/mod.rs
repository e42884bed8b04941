//! README markdown → structured data and safe HTML.
//!
//! Markdown is rendered with GitHub-flavored extensions (tables,
//! strikethrough, task lists) and single newlines as `<br>`, then passed
//! through the allow-list sanitizer. Rendering never fails; garbage in
//! yields empty or partial fields.

mod extract;
mod sanitize;

pub use extract::{extract_first_image, extract_links, extract_sections, extract_summary};
pub(crate) use extract::find_bare_urls;
pub use sanitize::sanitize_html;

use crate::models::{ParsedReadme, ReadmePreview};
use extract::bare_url_spans;
use pulldown_cmark::{html, CowStr, Event, LinkType, Options, Parser, Tag, TagEnd, TextMergeStream};

/// Render markdown to unsanitized HTML.
fn markdown_to_html(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);

    let events = TextMergeStream::new(Parser::new_ext(markdown, options)).map(|event| match event {
        Event::SoftBreak => Event::HardBreak,
        other => other,
    });

    let mut out = String::with_capacity(markdown.len() + markdown.len() / 2);
    html::push_html(&mut out, autolink_bare_urls(events).into_iter());
    out
}

/// Turn bare `http(s)://` URLs in prose into links, as GitHub does.
///
/// Text inside code blocks, links and image alt text is left alone; inline
/// code arrives as [`Event::Code`] and is never touched.
fn autolink_bare_urls<'a>(events: impl Iterator<Item = Event<'a>>) -> Vec<Event<'a>> {
    let mut out = Vec::new();
    let mut opaque_depth = 0usize;

    for event in events {
        match &event {
            Event::Start(Tag::CodeBlock(_) | Tag::Link { .. } | Tag::Image { .. }) => {
                opaque_depth += 1
            }
            Event::End(TagEnd::CodeBlock | TagEnd::Link | TagEnd::Image) => {
                opaque_depth = opaque_depth.saturating_sub(1)
            }
            _ => {}
        }

        match event {
            Event::Text(text) if opaque_depth == 0 => push_linked_text(&mut out, text),
            other => out.push(other),
        }
    }

    out
}

fn push_linked_text<'a>(out: &mut Vec<Event<'a>>, text: CowStr<'a>) {
    let spans = bare_url_spans(&text);
    if spans.is_empty() {
        out.push(Event::Text(text));
        return;
    }

    let mut last = 0;
    for span in spans {
        if span.start > last {
            out.push(Event::Text(CowStr::from(text[last..span.start].to_string())));
        }
        let url = text[span.clone()].to_string();
        out.push(Event::Start(Tag::Link {
            link_type: LinkType::Autolink,
            dest_url: CowStr::from(url.clone()),
            title: CowStr::Borrowed(""),
            id: CowStr::Borrowed(""),
        }));
        out.push(Event::Text(CowStr::from(url)));
        out.push(Event::End(TagEnd::Link));
        last = span.end;
    }
    if last < text.len() {
        out.push(Event::Text(CowStr::from(text[last..].to_string())));
    }
}

/// Parse a README into every field the project detail view needs.
pub fn parse_readme(markdown: &str) -> ParsedReadme {
    ParsedReadme {
        raw: markdown.to_string(),
        html: render_section_html(markdown),
        first_image: extract_first_image(markdown),
        summary: extract_summary(markdown),
        sections: extract_sections(markdown),
        links: extract_links(markdown),
    }
}

/// Image and summary only; skips HTML rendering.
pub fn parse_readme_preview(markdown: &str) -> ReadmePreview {
    ReadmePreview {
        first_image: extract_first_image(markdown),
        summary: extract_summary(markdown),
    }
}

/// Render a markdown fragment (e.g. one section's content) to safe HTML.
pub fn render_section_html(markdown: &str) -> String {
    sanitize_html(&markdown_to_html(markdown))
}
