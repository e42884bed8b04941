//! UI-facing project and README shapes.
//!
//! These serialize in camelCase to match what the frontend components read.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Bytes of code per language, as reported by GitHub.
pub type LanguageBreakdown = BTreeMap<String, u64>;

/// One heading and the text beneath it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadmeSection {
    pub level: u8,
    pub heading: String,
    pub content: String,
}

/// Full structured form of a README.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedReadme {
    pub raw: String,
    /// Sanitized HTML, safe to inject into the page.
    pub html: String,
    pub first_image: Option<String>,
    pub summary: String,
    pub sections: Vec<ReadmeSection>,
    pub links: Vec<String>,
}

/// Cheap subset of [`ParsedReadme`] used by project cards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadmePreview {
    pub first_image: Option<String>,
    pub summary: String,
}

impl From<&ParsedReadme> for ReadmePreview {
    fn from(readme: &ParsedReadme) -> Self {
        Self {
            first_image: readme.first_image.clone(),
            summary: readme.summary.clone(),
        }
    }
}

/// A repository as displayed on the site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: u64,
    pub name: String,
    pub display_name: String,
    pub description: Option<String>,
    pub url: String,
    pub homepage: Option<String>,
    /// First non-GitHub link found in the description.
    pub external_url: Option<String>,

    pub language: Option<String>,
    pub languages: LanguageBreakdown,
    pub topics: Vec<String>,
    pub stars: u64,
    pub forks: u64,

    pub created_at: String,
    /// Last push time; GitHub's `updated_at` also moves on stars.
    pub updated_at: String,

    pub is_pinned: bool,
    pub is_archived: bool,
    pub is_fork: bool,

    pub readme: Option<ParsedReadme>,
    pub readme_preview: Option<ReadmePreview>,
}

/// Initial load: pinned projects in full, plus how many others exist.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectsResponse {
    pub pinned: Vec<Project>,
    pub total_non_pinned: usize,
    pub rate_limited: bool,
}

/// One page of non-pinned projects.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectsPage {
    pub projects: Vec<Project>,
    pub current_page: usize,
    pub total_pages: usize,
    pub total_projects: usize,
    pub has_next: bool,
    pub has_prev: bool,
    pub rate_limited: bool,
}

/// One infinite-scroll batch of non-pinned projects.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectsBatch {
    pub projects: Vec<Project>,
    pub offset: usize,
    pub next_offset: usize,
    pub total: usize,
    pub has_more: bool,
    pub rate_limited: bool,
}
