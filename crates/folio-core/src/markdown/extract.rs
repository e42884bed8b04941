//! Field extraction from raw README markdown.
//!
//! These work on the markdown text directly, line by line, and never fail:
//! malformed input just yields empty results.

use crate::models::ReadmeSection;
use regex::Regex;
use std::ops::Range;
use std::sync::LazyLock;

/// Summaries at or below this many characters are not useful on a card.
const MIN_SUMMARY_CHARS: usize = 20;
const MAX_SUMMARY_CHARS: usize = 300;
const TRUNCATED_SUMMARY_CHARS: usize = 297;

static MD_IMAGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"!\[([^\]]*)\]\(([^)]+)\)").expect("image regex must compile"));

static HTML_IMAGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<img[^>]+src=["']([^"']+)["']"#).expect("img tag regex must compile")
});

/// `[![alt](image)](link)`, the shape of shields.io badges.
static LINKED_BADGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[!\[([^\]]*)\]\([^)]+\)\]\([^)]+\)").expect("badge regex must compile")
});

static HORIZONTAL_RULE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[-*_]{3,}$").expect("rule regex must compile"));

static MD_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\]]+)\]\(([^)]+)\)").expect("link regex must compile"));

static EMPHASIS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[*_]{1,2}([^*_]+)[*_]{1,2}").expect("emphasis regex must compile")
});

static INLINE_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"`([^`]+)`").expect("inline code regex must compile"));

static HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(#{1,6})\s+(.+)$").expect("heading regex must compile"));

static BARE_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"https?://[^\s<>"{}|\\^`\[\]]+"#).expect("url regex must compile")
});

/// URL of the first image in the README.
///
/// Markdown image syntax anywhere in the document wins over an HTML
/// `<img>` tag, even one that appears earlier.
pub fn extract_first_image(markdown: &str) -> Option<String> {
    if let Some(caps) = MD_IMAGE.captures(markdown) {
        return link_destination(&caps[2]);
    }

    HTML_IMAGE
        .captures(markdown)
        .map(|caps| caps[1].trim().to_string())
        .filter(|src| !src.is_empty())
}

/// First prose line of the README, cleaned of inline markdown.
///
/// Returns an empty string when no line is long enough to be useful.
pub fn extract_summary(markdown: &str) -> String {
    let without_badges = LINKED_BADGE.replace_all(markdown, "");

    for line in without_badges.lines() {
        let trimmed = line.trim();

        if trimmed.is_empty()
            || trimmed.starts_with('#')
            || trimmed.starts_with("![")
            || trimmed.starts_with('<')
            || trimmed.contains("shields.io")
            || trimmed.contains("badge")
            || HORIZONTAL_RULE.is_match(trimmed)
        {
            continue;
        }

        let cleaned = MD_LINK.replace_all(trimmed, "$1");
        let cleaned = EMPHASIS.replace_all(&cleaned, "$1");
        let cleaned = INLINE_CODE.replace_all(&cleaned, "$1");
        let cleaned = cleaned.trim();

        let length = cleaned.chars().count();
        if length > MIN_SUMMARY_CHARS {
            if length > MAX_SUMMARY_CHARS {
                let truncated: String = cleaned.chars().take(TRUNCATED_SUMMARY_CHARS).collect();
                return format!("{}...", truncated);
            }
            return cleaned.to_string();
        }
    }

    String::new()
}

/// Split the README into heading-delimited sections.
///
/// Text before the first heading is ignored; sections whose body is blank
/// are dropped.
pub fn extract_sections(markdown: &str) -> Vec<ReadmeSection> {
    let mut sections = Vec::new();
    let mut current: Option<ReadmeSection> = None;
    let mut content_lines: Vec<&str> = Vec::new();

    for line in markdown.lines() {
        if let Some(caps) = HEADING.captures(line) {
            if let Some(section) = current.take() {
                push_section(&mut sections, section, &content_lines);
            }
            current = Some(ReadmeSection {
                level: caps[1].len() as u8,
                heading: caps[2].trim().to_string(),
                content: String::new(),
            });
            content_lines.clear();
        } else if current.is_some() {
            content_lines.push(line);
        }
    }

    if let Some(section) = current.take() {
        push_section(&mut sections, section, &content_lines);
    }

    sections
}

fn push_section(sections: &mut Vec<ReadmeSection>, mut section: ReadmeSection, lines: &[&str]) {
    section.content = lines.join("\n").trim().to_string();
    if !section.content.is_empty() {
        sections.push(section);
    }
}

/// Every http(s) URL in the README, first appearance order, no duplicates.
///
/// Markdown link targets come first, then bare URLs from a separate scan.
pub fn extract_links(markdown: &str) -> Vec<String> {
    let mut links: Vec<String> = Vec::new();

    for caps in MD_LINK.captures_iter(markdown) {
        if let Some(url) = link_destination(&caps[2]) {
            if url.starts_with("http") && !links.contains(&url) {
                links.push(url);
            }
        }
    }

    for url in find_bare_urls(markdown) {
        if !links.iter().any(|l| l == url) {
            links.push(url.to_string());
        }
    }

    links
}

/// Bare `http(s)://` URLs in `text`, with trailing sentence punctuation and
/// unbalanced closing parentheses removed.
pub(crate) fn find_bare_urls(text: &str) -> Vec<&str> {
    bare_url_spans(text)
        .into_iter()
        .map(|span| &text[span])
        .collect()
}

/// Byte ranges of the URLs [`find_bare_urls`] returns.
pub(crate) fn bare_url_spans(text: &str) -> Vec<Range<usize>> {
    BARE_URL
        .find_iter(text)
        .filter_map(|m| {
            let url = trim_url_tail(m.as_str());
            (url.len() > "http://".len()).then(|| m.start()..m.start() + url.len())
        })
        .collect()
}

fn trim_url_tail(mut url: &str) -> &str {
    loop {
        let trimmed = url.trim_end_matches(['.', ',', ';', ':', '!', '?', '\'', '*']);
        let trimmed = if trimmed.ends_with(')')
            && trimmed.matches(')').count() > trimmed.matches('(').count()
        {
            &trimmed[..trimmed.len() - 1]
        } else {
            trimmed
        };
        if trimmed.len() == url.len() {
            return url;
        }
        url = trimmed;
    }
}

/// Target of a `(...)` link destination, without an optional title.
fn link_destination(raw: &str) -> Option<String> {
    let target = raw.split_whitespace().next()?;
    let target = target
        .strip_prefix('<')
        .and_then(|t| t.strip_suffix('>'))
        .unwrap_or(target);
    if target.is_empty() {
        None
    } else {
        Some(target.to_string())
    }
}
