//! Folio Core - GitHub project data and README rendering for the portfolio site.
//!
//! This crate fetches a user's public repositories, separates pinned ones,
//! and turns each into a UI-ready [`Project`]. README markdown is parsed into
//! summary, first image, sections and links, and rendered to sanitized HTML.
//! It can be used programmatically without any HTTP layer.
//!
//! # Example
//!
//! ```rust,ignore
//! use folio_core::{GitHubSettings, ProjectService};
//!
//! #[tokio::main]
//! async fn main() -> folio_core::Result<()> {
//!     let service = ProjectService::from_settings(GitHubSettings::from_env())?;
//!
//!     let initial = service.get_initial_projects().await;
//!     println!("{} pinned, {} more", initial.pinned.len(), initial.total_non_pinned);
//!
//!     let page = service.get_projects_page(1).await;
//!     println!("Page 1 of {}", page.total_pages);
//!
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod config;
pub mod error;
pub mod markdown;
pub mod models;
pub mod network;
pub mod projects;

// Re-export commonly used types
pub use cache::{CacheLookup, ExpiringCache};
pub use config::{CacheConfig, GitHubSettings, NetworkConfig, PaginationConfig};
pub use error::{FolioError, Result};
pub use markdown::{parse_readme, parse_readme_preview, render_section_html, sanitize_html};
pub use models::{
    LanguageBreakdown, ParsedReadme, Project, ProjectsBatch, ProjectsPage, ProjectsResponse,
    ReadmePreview, ReadmeSection, RepositorySummary,
};
pub use network::{Fetch, GitHubClient, GitHubSource, RateLimitState, RateLimitTracker};
pub use projects::{format_display_name, ProjectService};
