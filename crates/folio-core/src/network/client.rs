//! HTTP client with rate limiting awareness.
//!
//! Provides a wrapper around reqwest with:
//! - Rate limit tracking from every response, including error responses
//! - Bearer auth when a token is configured
//! - A per-request timeout
//! - Status normalization into [`FolioError`]

use crate::config::{GitHubSettings, NetworkConfig};
use crate::network::rate_limit::RateLimitTracker;
use crate::{FolioError, Result};
use reqwest::{header, Client, RequestBuilder, Response, StatusCode};
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

/// HTTP client with rate limiting awareness.
pub struct HttpClient {
    client: Client,
    rate_limit: Arc<RateLimitTracker>,
    token: Option<String>,
    timeout: Duration,
}

impl HttpClient {
    /// Create a client for the given settings, reporting into `rate_limit`.
    pub fn new(settings: &GitHubSettings, rate_limit: Arc<RateLimitTracker>) -> Result<Self> {
        let mut default_headers = header::HeaderMap::new();
        default_headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static(NetworkConfig::GITHUB_ACCEPT),
        );

        let client = Client::builder()
            .timeout(settings.timeout)
            .user_agent(NetworkConfig::USER_AGENT)
            .default_headers(default_headers)
            .build()
            .map_err(|e| FolioError::Network {
                message: format!("Failed to create HTTP client: {}", e),
                source: Some(e),
            })?;

        Ok(Self {
            client,
            rate_limit,
            token: settings.token.clone(),
            timeout: settings.timeout,
        })
    }

    pub fn rate_limit(&self) -> &RateLimitTracker {
        &self.rate_limit
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    /// Make a GET request.
    pub async fn get(&self, url: &str) -> Result<Response> {
        let request = self.authorize(self.client.get(url));
        self.send(request, "GET", url).await
    }

    /// Make a POST request with JSON body.
    pub async fn post_json<T: serde::Serialize>(&self, url: &str, body: &T) -> Result<Response> {
        let request = self.authorize(self.client.post(url).json(body));
        self.send(request, "POST", url).await
    }

    // Internal methods

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder, method: &str, url: &str) -> Result<Response> {
        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                FolioError::Timeout(self.timeout)
            } else {
                FolioError::Network {
                    message: format!("{} {} failed: {}", method, url, e),
                    source: Some(e),
                }
            }
        })?;

        self.rate_limit.update_from_headers(response.headers());
        self.check_response_status(response, url)
    }

    fn check_response_status(&self, response: Response, url: &str) -> Result<Response> {
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        let exhausted = self.rate_limit.snapshot().remaining == Some(0);
        if status == StatusCode::TOO_MANY_REQUESTS
            || (status == StatusCode::FORBIDDEN && exhausted)
        {
            warn!("GitHub quota exhausted while requesting {}", url);
            return Err(FolioError::RateLimited {
                service: extract_domain(url),
                reset_at: self.rate_limit.snapshot().reset,
            });
        }

        Err(FolioError::GitHubApi {
            message: format!("GitHub API returned {}", status),
            status_code: Some(status.as_u16()),
        })
    }
}

/// Extract domain from a URL.
pub fn extract_domain(url: &str) -> String {
    url::Url::parse(url)
        .map(|u| u.host_str().unwrap_or("unknown").to_string())
        .unwrap_or_else(|_| "unknown".to_string())
}
