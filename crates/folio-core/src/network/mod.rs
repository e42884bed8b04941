//! Network layer for GitHub access.
//!
//! This module provides:
//! - HTTP client with bearer auth and rate-limit header tracking
//! - Rate-limit tracker consulted before every request
//! - GitHub REST/GraphQL client behind the [`GitHubSource`] trait
//! - [`Fetch`] outcomes that distinguish "empty" from "degraded"

mod client;
mod fetch;
mod github;
mod rate_limit;

pub use client::{extract_domain, HttpClient};
pub use fetch::Fetch;
pub use github::{filter_listed_repositories, GitHubClient, GitHubSource};
pub use rate_limit::{RateLimitState, RateLimitTracker};
