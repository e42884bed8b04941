//! GitHub rate-limit tracking.
//!
//! A single [`RateLimitTracker`] is owned by the client and consulted before
//! every request. State is last-write-wins from response headers.

use reqwest::header::HeaderMap;
use std::sync::Mutex;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::{debug, info};

const REMAINING_HEADER: &str = "X-RateLimit-Remaining";
const LIMIT_HEADER: &str = "X-RateLimit-Limit";
const RESET_HEADER: &str = "X-RateLimit-Reset";

/// Rate limit state extracted from response headers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RateLimitState {
    /// Remaining requests allowed.
    pub remaining: Option<u64>,
    /// Total request limit.
    pub limit: Option<u64>,
    /// Unix timestamp when the rate limit resets.
    pub reset: Option<u64>,
}

impl RateLimitState {
    pub fn is_unset(&self) -> bool {
        self.remaining.is_none() && self.reset.is_none()
    }

    /// Get time until rate limit resets.
    pub fn time_until_reset(&self) -> Option<Duration> {
        let now = unix_now();
        self.reset
            .filter(|reset| *reset > now)
            .map(|reset| Duration::from_secs(reset - now))
    }
}

/// Process-wide view of the GitHub quota.
#[derive(Debug, Default)]
pub struct RateLimitTracker {
    state: Mutex<RateLimitState>,
}

impl RateLimitTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state.
    pub fn snapshot(&self) -> RateLimitState {
        *self.state.lock().expect("rate limit lock poisoned")
    }

    /// Overwrite whichever fields are present.
    pub fn record(&self, remaining: Option<u64>, limit: Option<u64>, reset: Option<u64>) {
        let mut state = self.state.lock().expect("rate limit lock poisoned");
        if remaining.is_some() {
            state.remaining = remaining;
        }
        if limit.is_some() {
            state.limit = limit;
        }
        if reset.is_some() {
            state.reset = reset;
        }
        if let (Some(remaining), Some(limit)) = (state.remaining, state.limit) {
            debug!("GitHub rate limit: {}/{}", remaining, limit);
        }
    }

    /// Update from `X-RateLimit-*` response headers.
    pub fn update_from_headers(&self, headers: &HeaderMap) {
        self.record(
            header_u64(headers, REMAINING_HEADER),
            header_u64(headers, LIMIT_HEADER),
            header_u64(headers, RESET_HEADER),
        );
    }

    /// Whether requests should be short-circuited right now.
    ///
    /// Clears the stored state once the reset time has passed, so this is
    /// not a pure read.
    pub fn is_rate_limited(&self) -> bool {
        self.is_rate_limited_at(unix_now())
    }

    pub fn is_rate_limited_at(&self, now: u64) -> bool {
        let mut state = self.state.lock().expect("rate limit lock poisoned");
        match state.remaining {
            None => false,
            Some(remaining) if remaining > 0 => false,
            Some(_) => match state.reset {
                Some(reset) if now > reset => {
                    info!("GitHub rate limit window reset, resuming requests");
                    *state = RateLimitState::default();
                    false
                }
                _ => true,
            },
        }
    }

    /// Forget everything observed so far.
    pub fn clear(&self) {
        *self.state.lock().expect("rate limit lock poisoned") = RateLimitState::default();
    }
}

fn header_u64(headers: &HeaderMap, name: &str) -> Option<u64> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
}

pub(crate) fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
