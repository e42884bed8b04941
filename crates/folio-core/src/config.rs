//! Centralized configuration for the portfolio core.
//!
//! Constants for GitHub access, README caching and pagination, plus the
//! environment-driven [`GitHubSettings`].

use std::time::Duration;

/// Network-related configuration.
pub struct NetworkConfig;

impl NetworkConfig {
    pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
    pub const GITHUB_API_BASE: &'static str = "https://api.github.com";
    pub const GITHUB_GRAPHQL_URL: &'static str = "https://api.github.com/graphql";
    pub const GITHUB_ACCEPT: &'static str = "application/vnd.github.v3+json";
    pub const USER_AGENT: &'static str = "portfolio-website";
    pub const GITHUB_REPOS_PER_PAGE: u32 = 100;
    pub const GITHUB_PINNED_LIMIT: u32 = 6;
}

/// README cache configuration.
pub struct CacheConfig;

impl CacheConfig {
    pub const README_TTL: Duration = Duration::from_secs(60 * 60);
    pub const README_MAX_ENTRIES: u64 = 500;
}

/// Paging shared by the page-based and offset-based project listings.
pub struct PaginationConfig;

impl PaginationConfig {
    pub const PROJECTS_PAGE_SIZE: usize = 10;
}

/// Repository owner used when `GITHUB_USERNAME` is not set.
pub const DEFAULT_GITHUB_USERNAME: &str = "Rogit-28";

/// Runtime settings for talking to GitHub.
#[derive(Debug, Clone)]
pub struct GitHubSettings {
    /// Account whose repositories are listed.
    pub username: String,
    /// Bearer token; required for pinned items.
    pub token: Option<String>,
    pub api_base: String,
    pub graphql_url: String,
    pub timeout: Duration,
}

impl GitHubSettings {
    /// Settings for `username` against the public GitHub endpoints, no token.
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            token: None,
            api_base: NetworkConfig::GITHUB_API_BASE.to_string(),
            graphql_url: NetworkConfig::GITHUB_GRAPHQL_URL.to_string(),
            timeout: NetworkConfig::REQUEST_TIMEOUT,
        }
    }

    /// Load from `GITHUB_USERNAME` and `GITHUB_TOKEN`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let username = lookup("GITHUB_USERNAME")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_GITHUB_USERNAME.to_string());
        let token = lookup("GITHUB_TOKEN")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());

        Self::new(username).with_token(token)
    }

    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }

    /// Point both REST and GraphQL at another host (GitHub Enterprise, tests).
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        let api_base = api_base.into().trim_end_matches('/').to_string();
        self.graphql_url = format!("{}/graphql", api_base);
        self.api_base = api_base;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }
}

impl Default for GitHubSettings {
    fn default() -> Self {
        Self::new(DEFAULT_GITHUB_USERNAME)
    }
}
