//! Allow-list HTML sanitization for README content.
//!
//! Every README-derived HTML string passes through [`sanitize_html`] before
//! it leaves the crate. Tags and attributes not listed here are removed,
//! `<script>`/`<style>` together with their contents.

use regex::{Captures, Regex};
use std::borrow::Cow;
use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

const ALLOWED_TAGS: &[&str] = &[
    "h1", "h2", "h3", "h4", "h5", "h6",
    "p", "br", "hr",
    "ul", "ol", "li",
    "strong", "em", "b", "i", "u", "s", "del",
    "a", "code", "pre", "blockquote",
    "img",
    "table", "thead", "tbody", "tr", "th", "td",
    "div", "span",
];

const ALLOWED_ATTRIBUTES: &[(&str, &[&str])] = &[
    ("a", &["href", "title", "target", "rel"]),
    ("img", &["src", "alt", "title", "loading", "width", "height"]),
    ("code", &["class"]),
    ("pre", &["class"]),
    ("div", &["class"]),
    ("span", &["class"]),
    ("th", &["align", "style"]),
    ("td", &["align", "style"]),
];

const ALLOWED_SCHEMES: &[&str] = &["http", "https", "mailto"];

/// Removed along with everything inside them.
const CONTENT_STRIPPED_TAGS: &[&str] = &["script", "style"];

const EXTERNAL_LINK_TARGET: &str = "_blank";
const EXTERNAL_LINK_REL: &str = "noopener noreferrer";

/// Opening `<a>` tags as serialized by the sanitizer: lowercase names,
/// double-quoted values with `"` escaped.
static ANCHOR_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<a((?:\s[a-z-]+="[^"]*")*)>"#).expect("anchor regex must compile")
});

static TAG_ATTRIBUTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\s([a-z-]+)="([^"]*)""#).expect("attribute regex must compile")
});

static TABLE_ALIGN_STYLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^text-align:\s*(left|center|right);?$").expect("align regex must compile")
});

/// Sanitize untrusted HTML.
///
/// The result contains no `<script>`, no `on*` handler attributes and no
/// `href`/`src` outside `http`, `https` and `mailto` (`mailto` only on
/// links). External links always carry `target="_blank"` and
/// `rel="noopener noreferrer"`.
pub fn sanitize_html(raw_html: &str) -> String {
    let cleaned = SANITIZER.clean(raw_html).to_string();
    harden_external_links(&cleaned)
}

static SANITIZER: LazyLock<ammonia::Builder<'static>> = LazyLock::new(|| {
    let tag_attributes: HashMap<&'static str, HashSet<&'static str>> = ALLOWED_ATTRIBUTES
        .iter()
        .map(|(tag, attrs)| (*tag, attrs.iter().copied().collect()))
        .collect();

    let mut builder = ammonia::Builder::default();
    builder
        .tags(ALLOWED_TAGS.iter().copied().collect())
        .clean_content_tags(CONTENT_STRIPPED_TAGS.iter().copied().collect())
        .generic_attributes(HashSet::new())
        .tag_attributes(tag_attributes)
        .url_schemes(ALLOWED_SCHEMES.iter().copied().collect())
        .link_rel(None)
        .strip_comments(true)
        .attribute_filter(filter_attribute);
    builder
});

fn filter_attribute<'u>(element: &str, attribute: &str, value: &'u str) -> Option<Cow<'u, str>> {
    match (element, attribute) {
        (_, "href" | "src") if is_script_url(value) => None,
        ("img", "src") if !is_http_url(value) && has_scheme(value) => None,
        ("th" | "td", "style") => TABLE_ALIGN_STYLE
            .captures(value.trim())
            .map(|caps| Cow::Owned(format!("text-align: {}", &caps[1]))),
        _ => Some(Cow::Borrowed(value)),
    }
}

/// Catches script-like schemes hidden behind whitespace or control chars.
fn is_script_url(value: &str) -> bool {
    let normalized: String = value
        .chars()
        .filter(|c| !c.is_whitespace() && !c.is_control())
        .collect::<String>()
        .to_ascii_lowercase();
    ["javascript:", "vbscript:", "data:"]
        .iter()
        .any(|scheme| normalized.starts_with(scheme))
}

fn is_http_url(value: &str) -> bool {
    let lower = value.trim_start().to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// `http(s)` or scheme-relative (`//host`, which browsers also accept as
/// `\\host` or `/\host`).
fn is_external_url(value: &str) -> bool {
    let normalized = value.trim_start().replace('\\', "/");
    is_http_url(&normalized) || normalized.starts_with("//")
}

fn has_scheme(value: &str) -> bool {
    match value.split_once(':') {
        Some((scheme, _)) => {
            !scheme.is_empty()
                && !scheme.contains(['/', '?', '#'])
                && scheme
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        }
        None => false,
    }
}

/// Force `target`/`rel` on every external anchor in sanitized output.
fn harden_external_links(html: &str) -> String {
    ANCHOR_TAG
        .replace_all(html, |caps: &Captures| {
            let attributes: Vec<(&str, &str)> = TAG_ATTRIBUTE
                .captures_iter(&caps[1])
                .map(|a| {
                    let (_, [name, value]) = a.extract();
                    (name, value)
                })
                .collect();

            let external = attributes
                .iter()
                .any(|(name, value)| *name == "href" && is_external_url(value));
            if !external {
                return caps[0].to_string();
            }

            let mut tag = String::from("<a");
            for (name, value) in attributes {
                if name == "target" || name == "rel" {
                    continue;
                }
                tag.push_str(&format!(" {}=\"{}\"", name, value));
            }
            tag.push_str(&format!(
                " target=\"{}\" rel=\"{}\">",
                EXTERNAL_LINK_TARGET, EXTERNAL_LINK_REL
            ));
            tag
        })
        .into_owned()
}
