//! GitHub API client for repository listings and README content.
//!
//! Provides:
//! - REST listing of the owner's public repositories
//! - GraphQL lookup of pinned repositories (token required)
//! - README and language breakdown per repository
//! - Proactive short-circuiting while the rate limit is exhausted
//!
//! Every call degrades to a [`Fetch`] instead of returning an error.

use crate::config::{GitHubSettings, NetworkConfig};
use crate::models::{LanguageBreakdown, PinnedItemsResponse, ReadmeResponse, RepositorySummary};
use crate::network::client::HttpClient;
use crate::network::fetch::Fetch;
use crate::network::rate_limit::RateLimitTracker;
use crate::{FolioError, Result};
use async_trait::async_trait;
use base64::Engine;
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use url::Url;

/// Marker in a repository name that hides it from the site.
const BUILDING_MARKER: &str = "(Building)";

const PINNED_QUERY: &str = r#"
query($username: String!, $first: Int!) {
  user(login: $username) {
    pinnedItems(first: $first, types: REPOSITORY) {
      nodes {
        ... on Repository {
          name
        }
      }
    }
  }
}
"#;

/// Read-only view of the configured GitHub account.
///
/// Implemented by [`GitHubClient`]; the project service only talks to this
/// trait so it can run against an in-memory source.
#[async_trait]
pub trait GitHubSource: Send + Sync {
    /// Names of pinned repositories. Needs a token.
    async fn pinned_repository_names(&self) -> Fetch<Vec<String>>;

    /// Public repositories, most recently pushed first, hidden ones removed.
    async fn repositories(&self) -> Fetch<Vec<RepositorySummary>>;

    /// Decoded README text; `Fetched(None)` when the repository has none.
    async fn readme_raw(&self, repo_name: &str) -> Fetch<Option<String>>;

    /// Bytes per language.
    async fn languages(&self, repo_name: &str) -> Fetch<LanguageBreakdown>;

    /// Whether the quota is currently exhausted.
    fn is_rate_limited(&self) -> bool;
}

/// GitHub API client.
pub struct GitHubClient {
    http: HttpClient,
    settings: GitHubSettings,
}

impl GitHubClient {
    /// Create a new GitHub client with its own rate-limit tracker.
    pub fn new(settings: GitHubSettings) -> Result<Self> {
        Self::with_rate_limit(settings, Arc::new(RateLimitTracker::new()))
    }

    /// Create a client that reports into an existing tracker.
    pub fn with_rate_limit(
        settings: GitHubSettings,
        rate_limit: Arc<RateLimitTracker>,
    ) -> Result<Self> {
        if !settings.has_token() {
            warn!("GITHUB_TOKEN not set; pinned repositories will be empty");
        }
        let http = HttpClient::new(&settings, rate_limit)?;
        Ok(Self { http, settings })
    }

    pub fn settings(&self) -> &GitHubSettings {
        &self.settings
    }

    pub fn rate_limit(&self) -> &RateLimitTracker {
        self.http.rate_limit()
    }

    // Internal methods

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = Url::parse(&self.settings.api_base).map_err(|e| FolioError::Config {
            message: format!("Invalid GitHub API base {}: {}", self.settings.api_base, e),
        })?;
        url.path_segments_mut()
            .map_err(|_| FolioError::Config {
                message: format!("GitHub API base cannot be a base: {}", self.settings.api_base),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn repos_url(&self) -> Result<Url> {
        let mut url = self.endpoint(&["users", &self.settings.username, "repos"])?;
        url.query_pairs_mut()
            .append_pair("per_page", &NetworkConfig::GITHUB_REPOS_PER_PAGE.to_string())
            .append_pair("sort", "pushed")
            .append_pair("direction", "desc")
            .append_pair("type", "public");
        Ok(url)
    }

    async fn fetch_pinned(&self) -> Result<Vec<String>> {
        if !self.http.has_token() {
            return Err(FolioError::MissingToken {
                operation: "pinned repositories".to_string(),
            });
        }

        let body = json!({
            "query": PINNED_QUERY,
            "variables": {
                "username": self.settings.username,
                "first": NetworkConfig::GITHUB_PINNED_LIMIT,
            },
        });
        let response = self.http.post_json(&self.settings.graphql_url, &body).await?;
        let data: PinnedItemsResponse = response.json().await.map_err(|e| FolioError::Json {
            message: format!("Failed to parse pinned repositories: {}", e),
            source: None,
        })?;

        Ok(data.repository_names())
    }

    async fn fetch_repositories(&self) -> Result<Vec<RepositorySummary>> {
        let url = self.repos_url()?;
        let response = self.http.get(url.as_str()).await?;
        let repos: Vec<RepositorySummary> = response.json().await.map_err(|e| FolioError::Json {
            message: format!("Failed to parse repositories: {}", e),
            source: None,
        })?;

        let listed = filter_listed_repositories(repos, &self.settings.username);
        info!(
            "Fetched {} repositories from GitHub for {}",
            listed.len(),
            self.settings.username
        );
        Ok(listed)
    }

    async fn fetch_readme(&self, repo_name: &str) -> Result<Option<String>> {
        let url = self.endpoint(&["repos", &self.settings.username, repo_name, "readme"])?;
        let response = match self.http.get(url.as_str()).await {
            Ok(response) => response,
            Err(e) if e.status_code() == Some(404) => {
                debug!("No README for {}", repo_name);
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        let readme: ReadmeResponse = response.json().await.map_err(|e| FolioError::Json {
            message: format!("Failed to parse README response: {}", e),
            source: None,
        })?;
        decode_readme(readme).map(Some)
    }

    async fn fetch_languages(&self, repo_name: &str) -> Result<LanguageBreakdown> {
        let url = self.endpoint(&["repos", &self.settings.username, repo_name, "languages"])?;
        let response = self.http.get(url.as_str()).await?;
        response.json().await.map_err(|e| FolioError::Json {
            message: format!("Failed to parse languages: {}", e),
            source: None,
        })
    }

    fn guarded<T>(&self, what: &str) -> Option<Fetch<T>> {
        if self.http.rate_limit().is_rate_limited() {
            debug!("Skipping {} fetch: rate limited", what);
            return Some(Fetch::RateLimited);
        }
        None
    }
}

#[async_trait]
impl GitHubSource for GitHubClient {
    async fn pinned_repository_names(&self) -> Fetch<Vec<String>> {
        if !self.http.has_token() {
            return Fetch::Unauthenticated;
        }
        if let Some(skipped) = self.guarded("pinned repositories") {
            return skipped;
        }

        let fetched = Fetch::from(self.fetch_pinned().await);
        if let Fetch::Failed(e) = &fetched {
            error!("Failed to fetch pinned repos: {}", e);
        }
        fetched
    }

    async fn repositories(&self) -> Fetch<Vec<RepositorySummary>> {
        if let Some(skipped) = self.guarded("repositories") {
            return skipped;
        }

        let fetched = Fetch::from(self.fetch_repositories().await);
        if let Fetch::Failed(e) = &fetched {
            error!("Failed to fetch repos: {}", e);
        }
        fetched
    }

    async fn readme_raw(&self, repo_name: &str) -> Fetch<Option<String>> {
        if let Some(skipped) = self.guarded("README") {
            return skipped;
        }

        let fetched = Fetch::from(self.fetch_readme(repo_name).await);
        if let Fetch::Failed(e) = &fetched {
            warn!("Failed to fetch README for {}: {}", repo_name, e);
        }
        fetched
    }

    async fn languages(&self, repo_name: &str) -> Fetch<LanguageBreakdown> {
        if let Some(skipped) = self.guarded("languages") {
            return skipped;
        }

        let fetched = Fetch::from(self.fetch_languages(repo_name).await);
        if let Fetch::Failed(e) = &fetched {
            warn!("Failed to fetch languages for {}: {}", repo_name, e);
        }
        fetched
    }

    fn is_rate_limited(&self) -> bool {
        self.http.rate_limit().is_rate_limited()
    }
}

/// Drop work-in-progress repositories and the profile README repository.
pub fn filter_listed_repositories(
    repos: Vec<RepositorySummary>,
    username: &str,
) -> Vec<RepositorySummary> {
    repos
        .into_iter()
        .filter(|repo| !repo.name.contains(BUILDING_MARKER) && repo.name != username)
        .collect()
}

/// Turn a README payload into text.
fn decode_readme(readme: ReadmeResponse) -> Result<String> {
    if readme.encoding != "base64" {
        return Ok(readme.content);
    }

    // GitHub wraps the base64 body at 60 columns
    let cleaned: String = readme
        .content
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(cleaned.as_bytes())
        .map_err(|e| FolioError::Decode {
            what: "README".to_string(),
            message: e.to_string(),
        })?;

    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::rate_limit::unix_now;
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    fn repo(name: &str) -> RepositorySummary {
        serde_json::from_value(json!({
            "id": name.len(),
            "name": name,
            "html_url": format!("https://github.com/octocat/{}", name),
        }))
        .unwrap()
    }

    /// Serve one canned HTTP response on a local port.
    async fn serve_once(status: &str, headers: &[(&str, &str)], body: &str) -> String {
        serve_recorded(status, headers, body).await.0
    }

    /// Like [`serve_once`], also yielding the raw request it received.
    async fn serve_recorded(
        status: &str,
        headers: &[(&str, &str)],
        body: &str,
    ) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let mut response = format!(
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n",
            status,
            body.len()
        );
        for (name, value) in headers {
            response.push_str(&format!("{}: {}\r\n", name, value));
        }
        response.push_str("\r\n");
        response.push_str(body);

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = Vec::new();
            let mut chunk = [0u8; 1024];
            let head_end = loop {
                if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                    break pos + 4;
                }
                let n = socket.read(&mut chunk).await.unwrap();
                if n == 0 {
                    break buf.len();
                }
                buf.extend_from_slice(&chunk[..n]);
            };
            let content_length = String::from_utf8_lossy(&buf[..head_end])
                .lines()
                .find_map(|line| {
                    let (name, value) = line.split_once(':')?;
                    name.eq_ignore_ascii_case("content-length")
                        .then(|| value.trim().parse::<usize>().ok())
                        .flatten()
                })
                .unwrap_or(0);
            while buf.len() < head_end + content_length {
                let n = socket.read(&mut chunk).await.unwrap();
                if n == 0 {
                    break;
                }
                buf.extend_from_slice(&chunk[..n]);
            }
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
            String::from_utf8_lossy(&buf).into_owned()
        });

        (format!("http://{}", addr), handle)
    }

    fn client_for(base: &str) -> GitHubClient {
        let settings = GitHubSettings::new("octocat")
            .with_api_base(base)
            .with_timeout(Duration::from_secs(5));
        GitHubClient::new(settings).unwrap()
    }

    #[test]
    fn test_filter_listed_repositories() {
        let repos = vec![
            repo("kv-store"),
            repo("octocat"),
            repo("compiler (Building)"),
            repo("dotfiles"),
        ];
        let names: Vec<String> = filter_listed_repositories(repos, "octocat")
            .into_iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(names, vec!["kv-store", "dotfiles"]);
    }

    #[test]
    fn test_decode_base64_readme() {
        let readme = ReadmeResponse {
            content: "IyBIZWxs\nbwo=\n".to_string(),
            encoding: "base64".to_string(),
        };
        assert_eq!(decode_readme(readme).unwrap(), "# Hello\n");
    }

    #[test]
    fn test_decode_plain_readme() {
        let readme = ReadmeResponse {
            content: "# Plain".to_string(),
            encoding: "utf-8".to_string(),
        };
        assert_eq!(decode_readme(readme).unwrap(), "# Plain");
    }

    #[test]
    fn test_decode_invalid_base64() {
        let readme = ReadmeResponse {
            content: "!!!".to_string(),
            encoding: "base64".to_string(),
        };
        assert!(matches!(decode_readme(readme), Err(FolioError::Decode { .. })));
    }

    #[test]
    fn test_endpoint_escapes_segments() {
        let client = client_for("https://api.github.com");
        let url = client
            .endpoint(&["repos", "octocat", "odd name?", "readme"])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.github.com/repos/octocat/odd%20name%3F/readme"
        );
    }

    #[test]
    fn test_repos_url() {
        let client = client_for("https://api.github.com");
        assert_eq!(
            client.repos_url().unwrap().as_str(),
            "https://api.github.com/users/octocat/repos?per_page=100&sort=pushed&direction=desc&type=public"
        );
    }

    #[tokio::test]
    async fn test_pinned_without_token_is_unauthenticated() {
        let client = client_for("http://127.0.0.1:1");
        let pinned = client.pinned_repository_names().await;
        assert!(matches!(pinned, Fetch::Unauthenticated));
        assert!(pinned.into_value().is_empty());
    }

    #[tokio::test]
    async fn test_pinned_repositories_query() {
        let (base, request) = serve_recorded(
            "200 OK",
            &[],
            r#"{"data":{"user":{"pinnedItems":{"nodes":[{"name":"kv-store"},{},{"name":"compiler"}]}}}}"#,
        )
        .await;
        let client = GitHubClient::new(
            GitHubSettings::new("octocat")
                .with_api_base(&base)
                .with_token(Some("test-token".to_string()))
                .with_timeout(Duration::from_secs(5)),
        )
        .unwrap();

        let pinned = client.pinned_repository_names().await;
        assert_eq!(pinned.into_value(), vec!["kv-store", "compiler"]);

        let request = request.await.unwrap();
        assert!(request.starts_with("POST /graphql "));
        assert!(request
            .to_ascii_lowercase()
            .contains("authorization: bearer test-token"));
        let body = &request[request.find("\r\n\r\n").unwrap() + 4..];
        let sent: serde_json::Value = serde_json::from_str(body).unwrap();
        assert_eq!(sent["variables"]["username"], "octocat");
        assert_eq!(sent["variables"]["first"], 6);
        assert!(sent["query"].as_str().unwrap().contains("pinnedItems"));
    }

    #[tokio::test]
    async fn test_rate_limited_short_circuits() {
        let client = client_for("http://127.0.0.1:1");
        client
            .rate_limit()
            .record(Some(0), Some(60), Some(unix_now() + 3600));

        assert!(client.repositories().await.is_rate_limited());
        assert!(client.readme_raw("kv-store").await.is_rate_limited());
        assert!(client.languages("kv-store").await.is_rate_limited());
        assert!(client.is_rate_limited());
    }

    #[tokio::test]
    async fn test_unreachable_host_degrades_to_empty() {
        let client = client_for("http://127.0.0.1:1");
        let repos = client.repositories().await;
        assert!(matches!(repos, Fetch::Failed(_)));
        assert!(repos.into_value().is_empty());
    }

    #[tokio::test]
    async fn test_repositories_update_rate_limit() {
        let body = serde_json::to_string(&vec![repo("kv-store"), repo("octocat")]).unwrap();
        let base = serve_once(
            "200 OK",
            &[("X-RateLimit-Remaining", "41"), ("X-RateLimit-Reset", "4102444800")],
            &body,
        )
        .await;
        let client = client_for(&base);

        let repos = client.repositories().await.into_value();
        assert_eq!(repos.len(), 1);
        assert_eq!(repos[0].name, "kv-store");
        assert_eq!(client.rate_limit().snapshot().remaining, Some(41));
    }

    #[tokio::test]
    async fn test_error_response_still_updates_rate_limit() {
        let base = serve_once(
            "403 Forbidden",
            &[("X-RateLimit-Remaining", "0"), ("X-RateLimit-Reset", "4102444800")],
            r#"{"message":"API rate limit exceeded"}"#,
        )
        .await;
        let client = client_for(&base);

        assert!(client.repositories().await.is_rate_limited());
        assert!(client.is_rate_limited());
    }

    #[tokio::test]
    async fn test_missing_readme_is_absent_not_failed() {
        let base = serve_once("404 Not Found", &[], r#"{"message":"Not Found"}"#).await;
        let client = client_for(&base);

        let readme = client.readme_raw("kv-store").await;
        assert!(matches!(readme, Fetch::Fetched(None)));
    }

    #[tokio::test]
    async fn test_readme_is_decoded() {
        let base = serve_once(
            "200 OK",
            &[],
            r#"{"content":"IyBIZWxs\nbwo=\n","encoding":"base64"}"#,
        )
        .await;
        let client = client_for(&base);

        let readme = client.readme_raw("kv-store").await.into_value();
        assert_eq!(readme.as_deref(), Some("# Hello\n"));
    }

    #[tokio::test]
    async fn test_languages_server_error_is_failed() {
        let base = serve_once("502 Bad Gateway", &[], "{}").await;
        let client = client_for(&base);

        let languages = client.languages("kv-store").await;
        match languages {
            Fetch::Failed(e) => assert_eq!(e.status_code(), Some(502)),
            other => panic!("expected failure, got {:?}", other),
        }
    }
}
