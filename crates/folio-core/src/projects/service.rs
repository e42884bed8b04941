//! Project listing and README retrieval on top of a [`GitHubSource`].

use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::cache::{CacheLookup, ExpiringCache};
use crate::config::{CacheConfig, GitHubSettings, PaginationConfig};
use crate::error::Result;
use crate::markdown::{parse_readme, parse_readme_preview};
use crate::models::{
    LanguageBreakdown, ParsedReadme, Project, ProjectsBatch, ProjectsPage, ProjectsResponse,
    ReadmePreview, RepositorySummary,
};
use crate::network::{Fetch, GitHubClient, GitHubSource};

use super::assembler::assemble_project;
use super::paginate::{split_pinned, PageRequest, Paginator};

/// Pinned and remaining repositories for one listing request.
struct Listing {
    pinned: Vec<RepositorySummary>,
    others: Vec<RepositorySummary>,
}

/// Assembles [`Project`] records and serves the three listing shapes.
///
/// README parses are cached per repository name for [`CacheConfig::README_TTL`].
/// Repository lists are not cached; every listing call asks GitHub again.
pub struct ProjectService {
    source: Arc<dyn GitHubSource>,
    full_cache: ExpiringCache<ParsedReadme>,
    preview_cache: ExpiringCache<ReadmePreview>,
    paginator: Paginator,
}

impl ProjectService {
    pub fn new(source: Arc<dyn GitHubSource>) -> Self {
        Self::with_readme_ttl(source, CacheConfig::README_TTL)
    }

    pub fn with_readme_ttl(source: Arc<dyn GitHubSource>, ttl: Duration) -> Self {
        Self {
            source,
            full_cache: ExpiringCache::new("readme", ttl),
            preview_cache: ExpiringCache::new("readme-preview", ttl),
            paginator: Paginator::new(PaginationConfig::PROJECTS_PAGE_SIZE),
        }
    }

    /// Service backed by the real GitHub API.
    pub fn from_settings(settings: GitHubSettings) -> Result<Self> {
        Ok(Self::new(Arc::new(GitHubClient::new(settings)?)))
    }

    pub fn source(&self) -> &dyn GitHubSource {
        self.source.as_ref()
    }

    pub fn is_rate_limited(&self) -> bool {
        self.source.is_rate_limited()
    }

    /// Raw README text, or `None` when absent.
    ///
    /// The second element says whether the answer is authoritative (safe to
    /// cache); throttled or failed lookups are not. A `Failed` lookup is
    /// therefore retried against GitHub on the next call for that repo.
    async fn readme_markdown(&self, repo_name: &str) -> (Option<String>, bool) {
        match self.source.readme_raw(repo_name).await {
            Fetch::Fetched(content) => (content.filter(|c| !c.is_empty()), true),
            Fetch::RateLimited | Fetch::Unauthenticated => (None, false),
            Fetch::Failed(err) => {
                debug!("README for {} unavailable: {}", repo_name, err);
                (None, false)
            }
        }
    }

    /// Image and summary for a project card.
    pub async fn fetch_repo_readme_preview(&self, repo_name: &str) -> Option<ReadmePreview> {
        if let CacheLookup::Hit(preview) = self.preview_cache.get(repo_name) {
            return preview;
        }
        if let CacheLookup::Hit(full) = self.full_cache.get(repo_name) {
            let preview = full.as_ref().map(ReadmePreview::from);
            self.preview_cache.set(repo_name, preview.clone());
            return preview;
        }

        let (markdown, authoritative) = self.readme_markdown(repo_name).await;
        let preview = markdown.as_deref().map(parse_readme_preview);
        if authoritative {
            self.preview_cache.set(repo_name, preview.clone());
        }
        preview
    }

    /// Fully parsed README for the detail view.
    pub async fn fetch_repo_readme_full(&self, repo_name: &str) -> Option<ParsedReadme> {
        if let CacheLookup::Hit(full) = self.full_cache.get(repo_name) {
            return full;
        }

        let (markdown, authoritative) = self.readme_markdown(repo_name).await;
        let parsed = markdown.as_deref().map(parse_readme);
        if authoritative {
            self.full_cache.set(repo_name, parsed.clone());
            self.preview_cache
                .set(repo_name, parsed.as_ref().map(ReadmePreview::from));
        }
        parsed
    }

    /// Convert one repository into a [`Project`].
    ///
    /// With `fetch_full_data` the README and language breakdown are loaded
    /// concurrently; otherwise both are left empty.
    pub async fn repo_to_project(
        &self,
        repo: &RepositorySummary,
        is_pinned: bool,
        fetch_full_data: bool,
    ) -> Project {
        if !fetch_full_data {
            return assemble_project(repo, is_pinned, None, LanguageBreakdown::new());
        }

        let (readme, languages) = tokio::join!(
            self.fetch_repo_readme_full(&repo.name),
            self.source.languages(&repo.name),
        );
        assemble_project(repo, is_pinned, readme, languages.into_value())
    }

    async fn listing(&self) -> Listing {
        let (pinned_names, repos) = tokio::join!(
            self.source.pinned_repository_names(),
            self.source.repositories(),
        );
        let pinned_names = pinned_names.into_value();
        let (pinned, others) = split_pinned(repos.into_value(), &pinned_names);

        debug!(
            "Listing has {} pinned and {} other repositories",
            pinned.len(),
            others.len()
        );
        Listing { pinned, others }
    }

    /// Pinned projects with full data, plus the count of the rest.
    pub async fn get_initial_projects(&self) -> ProjectsResponse {
        let Listing { pinned, others } = self.listing().await;

        let pinned = join_all(pinned.iter().map(|repo| self.repo_to_project(repo, true, true))).await;
        let rate_limited = self.is_rate_limited();
        if rate_limited {
            warn!("GitHub rate limit reached while loading initial projects");
        }

        info!(
            "Loaded {} pinned projects ({} more available)",
            pinned.len(),
            others.len()
        );
        ProjectsResponse {
            pinned,
            total_non_pinned: others.len(),
            rate_limited,
        }
    }

    /// One page of non-pinned projects without README or language data.
    ///
    /// `page` is 1-based; 0 is read as 1 and pages past the end are clamped
    /// to the last page.
    pub async fn get_projects_page(&self, page: usize) -> ProjectsPage {
        if self.is_rate_limited() {
            return ProjectsPage {
                projects: Vec::new(),
                current_page: 1,
                total_pages: 1,
                total_projects: 0,
                has_next: false,
                has_prev: false,
                rate_limited: true,
            };
        }

        let Listing { others, .. } = self.listing().await;
        let window = self.paginator.window(others.len(), PageRequest::Page(page));
        let projects = self.lightweight_projects(window.slice(&others)).await;

        ProjectsPage {
            projects,
            current_page: window.current_page,
            total_pages: window.total_pages,
            total_projects: window.total,
            has_next: window.has_next(),
            has_prev: window.has_prev(),
            rate_limited: self.is_rate_limited(),
        }
    }

    /// Infinite-scroll batch of non-pinned projects starting at `offset`.
    pub async fn get_projects_batch(&self, offset: usize) -> ProjectsBatch {
        if self.is_rate_limited() {
            return ProjectsBatch {
                projects: Vec::new(),
                offset,
                next_offset: offset,
                total: 0,
                has_more: false,
                rate_limited: true,
            };
        }

        let Listing { others, .. } = self.listing().await;
        let window = self.paginator.window(others.len(), PageRequest::Offset(offset));
        let projects = self.lightweight_projects(window.slice(&others)).await;

        ProjectsBatch {
            projects,
            offset,
            next_offset: window.next_offset(),
            total: window.total,
            has_more: window.has_more(),
            rate_limited: self.is_rate_limited(),
        }
    }

    async fn lightweight_projects(&self, repos: &[RepositorySummary]) -> Vec<Project> {
        join_all(repos.iter().map(|repo| self.repo_to_project(repo, false, false))).await
    }

    /// Drop every cached README parse.
    pub fn clear_readme_cache(&self) {
        self.full_cache.clear();
        self.preview_cache.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FolioError;
    use async_trait::async_trait;
    use std::collections::{HashMap, HashSet};
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    #[derive(Default)]
    struct MockSource {
        repos: Vec<RepositorySummary>,
        pinned: Vec<String>,
        readmes: HashMap<String, String>,
        failing_readmes: HashSet<String>,
        readme_calls: AtomicUsize,
        language_calls: AtomicUsize,
        list_calls: AtomicUsize,
        rate_limited: AtomicBool,
    }

    impl MockSource {
        fn with_repos(count: usize, pinned: &[&str]) -> Self {
            Self {
                repos: (0..count).map(|i| repo(&format!("repo-{:02}", i))).collect(),
                pinned: pinned.iter().map(|s| s.to_string()).collect(),
                ..Default::default()
            }
        }
    }

    #[async_trait]
    impl GitHubSource for MockSource {
        async fn pinned_repository_names(&self) -> Fetch<Vec<String>> {
            Fetch::Fetched(self.pinned.clone())
        }

        async fn repositories(&self) -> Fetch<Vec<RepositorySummary>> {
            self.list_calls.fetch_add(1, Ordering::SeqCst);
            if self.rate_limited.load(Ordering::SeqCst) {
                return Fetch::RateLimited;
            }
            Fetch::Fetched(self.repos.clone())
        }

        async fn readme_raw(&self, repo_name: &str) -> Fetch<Option<String>> {
            self.readme_calls.fetch_add(1, Ordering::SeqCst);
            if self.failing_readmes.contains(repo_name) {
                return Fetch::Failed(FolioError::GitHubApi {
                    message: "boom".into(),
                    status_code: Some(502),
                });
            }
            Fetch::Fetched(self.readmes.get(repo_name).cloned())
        }

        async fn languages(&self, _repo_name: &str) -> Fetch<LanguageBreakdown> {
            self.language_calls.fetch_add(1, Ordering::SeqCst);
            let mut languages = LanguageBreakdown::new();
            languages.insert("Rust".to_string(), 1024);
            Fetch::Fetched(languages)
        }

        fn is_rate_limited(&self) -> bool {
            self.rate_limited.load(Ordering::SeqCst)
        }
    }

    fn repo(name: &str) -> RepositorySummary {
        RepositorySummary {
            id: 1,
            name: name.to_string(),
            full_name: format!("u/{}", name),
            description: None,
            html_url: format!("https://github.com/u/{}", name),
            homepage: None,
            language: Some("Rust".to_string()),
            topics: vec![],
            stargazers_count: 0,
            forks_count: 0,
            created_at: "2024-01-01T00:00:00Z".to_string(),
            updated_at: "2024-02-01T00:00:00Z".to_string(),
            pushed_at: "2024-03-01T00:00:00Z".to_string(),
            archived: false,
            fork: false,
            default_branch: None,
        }
    }

    fn service(source: MockSource) -> (Arc<MockSource>, ProjectService) {
        let source = Arc::new(source);
        (source.clone(), ProjectService::new(source))
    }

    const README: &str = "# Kv\n![logo](https://example.com/logo.png)\nA fast key-value store written for learning.\n";

    #[tokio::test]
    async fn test_preview_fetched_once_within_ttl() {
        let mut source = MockSource::with_repos(1, &[]);
        source.readmes.insert("repo-00".into(), README.into());
        let (source, service) = service(source);

        let first = service.fetch_repo_readme_preview("repo-00").await;
        let second = service.fetch_repo_readme_preview("repo-00").await;

        assert_eq!(first, second);
        assert_eq!(
            first.map(|p| p.first_image),
            Some(Some("https://example.com/logo.png".to_string()))
        );
        assert_eq!(source.readme_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_absent_readme_is_cached() {
        let (source, service) = service(MockSource::with_repos(1, &[]));

        assert!(service.fetch_repo_readme_full("repo-00").await.is_none());
        assert!(service.fetch_repo_readme_full("repo-00").await.is_none());
        assert!(service.fetch_repo_readme_preview("repo-00").await.is_none());
        assert_eq!(source.readme_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failed_readme_is_not_cached() {
        let mut source = MockSource::with_repos(1, &[]);
        source.failing_readmes.insert("repo-00".into());
        let (source, service) = service(source);

        assert!(service.fetch_repo_readme_full("repo-00").await.is_none());
        assert!(service.fetch_repo_readme_full("repo-00").await.is_none());
        assert_eq!(source.readme_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_readme_cache_expires() {
        let mut source = MockSource::with_repos(1, &[]);
        source.readmes.insert("repo-00".into(), README.into());
        let source = Arc::new(source);
        let service = ProjectService::with_readme_ttl(source.clone(), Duration::from_millis(50));

        service.fetch_repo_readme_full("repo-00").await;
        tokio::time::sleep(Duration::from_millis(120)).await;
        service.fetch_repo_readme_full("repo-00").await;

        assert_eq!(source.readme_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_full_parse_fills_preview_cache() {
        let mut source = MockSource::with_repos(1, &[]);
        source.readmes.insert("repo-00".into(), README.into());
        let (source, service) = service(source);

        let full = service.fetch_repo_readme_full("repo-00").await.unwrap();
        let preview = service.fetch_repo_readme_preview("repo-00").await.unwrap();

        assert_eq!(preview, ReadmePreview::from(&full));
        assert_eq!(source.readme_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_initial_projects() {
        let mut source = MockSource::with_repos(5, &["repo-01", "repo-03", "not-a-repo"]);
        source.readmes.insert("repo-01".into(), README.into());
        let (source, service) = service(source);

        let response = service.get_initial_projects().await;

        let names: Vec<&str> = response.pinned.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["repo-01", "repo-03"]);
        assert_eq!(response.total_non_pinned, 3);
        assert!(!response.rate_limited);

        let first = &response.pinned[0];
        assert!(first.is_pinned);
        assert!(first.readme.is_some());
        assert_eq!(
            first.readme_preview.as_ref().map(|p| p.summary.as_str()),
            Some("A fast key-value store written for learning.")
        );
        assert_eq!(first.languages.get("Rust"), Some(&1024));
        assert!(response.pinned[1].readme.is_none());
        assert_eq!(source.language_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_pages_exclude_pinned_and_cover_the_rest() {
        let (source, service) = service(MockSource::with_repos(25, &["repo-00", "repo-07", "repo-24"]));

        let first = service.get_projects_page(1).await;
        assert_eq!(first.total_projects, 22);
        assert_eq!(first.total_pages, 3);
        assert!(first.has_next);
        assert!(!first.has_prev);

        let mut seen = HashSet::new();
        for page in 1..=first.total_pages {
            for project in service.get_projects_page(page).await.projects {
                assert!(!project.is_pinned);
                assert!(project.readme.is_none());
                assert!(project.languages.is_empty());
                assert!(seen.insert(project.name));
            }
        }
        assert_eq!(seen.len(), 22);
        assert!(!seen.contains("repo-00"));
        assert!(!seen.contains("repo-07"));
        assert!(!seen.contains("repo-24"));
        assert_eq!(source.readme_calls.load(Ordering::SeqCst), 0);
        assert_eq!(source.language_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_page_out_of_range_is_clamped() {
        let (_, service) = service(MockSource::with_repos(25, &[]));

        let last = service.get_projects_page(3).await;
        let beyond = service.get_projects_page(99).await;
        let zero = service.get_projects_page(0).await;

        assert_eq!(beyond.current_page, 3);
        assert_eq!(
            beyond.projects.iter().map(|p| &p.name).collect::<Vec<_>>(),
            last.projects.iter().map(|p| &p.name).collect::<Vec<_>>()
        );
        assert_eq!(zero.current_page, 1);
        assert_eq!(zero.projects.len(), 10);
    }

    #[tokio::test]
    async fn test_empty_account_has_one_empty_page() {
        let (_, service) = service(MockSource::with_repos(0, &[]));

        let page = service.get_projects_page(1).await;
        assert!(page.projects.is_empty());
        assert_eq!(page.current_page, 1);
        assert_eq!(page.total_pages, 1);
        assert!(!page.has_next);
        assert!(!page.has_prev);
    }

    #[tokio::test]
    async fn test_rate_limited_page_skips_listing() {
        let (source, service) = service(MockSource::with_repos(25, &[]));
        source.rate_limited.store(true, Ordering::SeqCst);

        let page = service.get_projects_page(2).await;
        assert!(page.rate_limited);
        assert!(page.projects.is_empty());
        assert_eq!(page.total_pages, 1);
        assert_eq!(source.list_calls.load(Ordering::SeqCst), 0);

        let batch = service.get_projects_batch(10).await;
        assert!(batch.rate_limited);
        assert!(!batch.has_more);
        assert_eq!(batch.next_offset, 10);
    }

    #[tokio::test]
    async fn test_initial_projects_report_rate_limit() {
        let (source, service) = service(MockSource::with_repos(3, &["repo-00"]));
        source.rate_limited.store(true, Ordering::SeqCst);

        let response = service.get_initial_projects().await;
        assert!(response.rate_limited);
        assert!(response.pinned.is_empty());
        assert_eq!(response.total_non_pinned, 0);
    }

    #[tokio::test]
    async fn test_batches() {
        let (_, service) = service(MockSource::with_repos(25, &["repo-00"]));

        let first = service.get_projects_batch(0).await;
        assert_eq!(first.projects.len(), 10);
        assert_eq!(first.next_offset, 10);
        assert_eq!(first.total, 24);
        assert!(first.has_more);
        assert_eq!(first.projects[0].name, "repo-01");

        let last = service.get_projects_batch(20).await;
        assert_eq!(last.projects.len(), 4);
        assert_eq!(last.next_offset, 24);
        assert!(!last.has_more);

        let past = service.get_projects_batch(500).await;
        assert!(past.projects.is_empty());
        assert_eq!(past.offset, 500);
        assert!(!past.has_more);
    }
}
