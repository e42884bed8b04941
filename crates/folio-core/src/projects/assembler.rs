//! Repository → [`Project`] conversion.

use crate::markdown::find_bare_urls;
use crate::models::{LanguageBreakdown, ParsedReadme, Project, ReadmePreview, RepositorySummary};

/// Hosts that never count as a project's "live" link.
const GITHUB_HOSTS: &[&str] = &["github.com", "githubusercontent.com"];

/// Turn a repository name into a title.
///
/// Hyphens and underscores become spaces and every word starts uppercase:
/// `"Network-Performance_Monitor"` → `"Network Performance Monitor"`.
pub fn format_display_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut prev_is_word = false;

    for c in name.chars() {
        let c = if c == '-' || c == '_' { ' ' } else { c };
        let is_word = c.is_ascii_alphanumeric();
        if is_word && !prev_is_word {
            out.push(c.to_ascii_uppercase());
        } else {
            out.push(c);
        }
        prev_is_word = is_word;
    }

    out
}

/// First non-GitHub `http(s)` URL mentioned in a description.
pub fn extract_url_from_description(description: Option<&str>) -> Option<String> {
    let description = description?;
    find_bare_urls(description)
        .into_iter()
        .find(|url| !GITHUB_HOSTS.iter().any(|host| url.contains(host)))
        .map(str::to_string)
}

/// Build the UI record for `repo`.
///
/// `readme` and `languages` are whatever the caller fetched; the lightweight
/// listing passes `None` and an empty map.
pub fn assemble_project(
    repo: &RepositorySummary,
    is_pinned: bool,
    readme: Option<ParsedReadme>,
    languages: LanguageBreakdown,
) -> Project {
    let readme_preview = readme.as_ref().map(ReadmePreview::from);

    Project {
        id: repo.id,
        name: repo.name.clone(),
        display_name: format_display_name(&repo.name),
        description: repo.description.clone(),
        url: repo.html_url.clone(),
        homepage: repo.homepage.clone().filter(|h| !h.trim().is_empty()),
        external_url: extract_url_from_description(repo.description.as_deref()),

        language: repo.language.clone(),
        languages,
        topics: repo.topics.clone(),
        stars: repo.stargazers_count,
        forks: repo.forks_count,

        created_at: repo.created_at.clone(),
        updated_at: repo.pushed_at.clone(),

        is_pinned,
        is_archived: repo.archived,
        is_fork: repo.fork,

        readme,
        readme_preview,
    }
}
