//! GitHub API payload types.

use serde::{Deserialize, Serialize};

/// Repository record as returned by `GET /users/{user}/repos`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepositorySummary {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub html_url: String,
    #[serde(default)]
    pub homepage: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub topics: Vec<String>,
    #[serde(default)]
    pub stargazers_count: u64,
    #[serde(default)]
    pub forks_count: u64,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
    #[serde(default)]
    pub pushed_at: String,
    #[serde(default)]
    pub archived: bool,
    #[serde(default)]
    pub fork: bool,
    #[serde(default)]
    pub default_branch: Option<String>,
}

/// Body of `GET /repos/{user}/{repo}/readme`.
#[derive(Debug, Clone, Deserialize)]
pub struct ReadmeResponse {
    pub content: String,
    #[serde(default)]
    pub encoding: String,
}

/// Body of the pinned-items GraphQL query.
#[derive(Debug, Clone, Deserialize)]
pub struct PinnedItemsResponse {
    #[serde(default)]
    pub data: Option<PinnedItemsData>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PinnedItemsData {
    pub user: Option<PinnedItemsUser>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PinnedItemsUser {
    pub pinned_items: PinnedItemsConnection,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PinnedItemsConnection {
    #[serde(default)]
    pub nodes: Vec<PinnedNode>,
}

/// A pinned item; non-repository nodes come back as `{}`.
#[derive(Debug, Clone, Deserialize)]
pub struct PinnedNode {
    #[serde(default)]
    pub name: Option<String>,
}

impl PinnedItemsResponse {
    /// Names of the pinned repositories, in pinned order.
    pub fn repository_names(self) -> Vec<String> {
        self.data
            .and_then(|d| d.user)
            .map(|u| {
                u.pinned_items
                    .nodes
                    .into_iter()
                    .filter_map(|n| n.name)
                    .collect()
            })
            .unwrap_or_default()
    }
}
