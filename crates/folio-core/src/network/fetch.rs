//! Outcome of a best-effort GitHub fetch.

use crate::error::FolioError;

/// Result of a client call that never fails outright.
///
/// Everything except [`Fetch::Fetched`] degrades to an empty value via
/// [`Fetch::into_value`], but callers and tests can still see why.
#[derive(Debug)]
pub enum Fetch<T> {
    /// GitHub answered and the payload parsed.
    Fetched(T),
    /// Skipped because the quota is exhausted.
    RateLimited,
    /// Skipped because the call needs a token and none is configured.
    Unauthenticated,
    /// The request or its decoding failed.
    Failed(FolioError),
}

impl<T> Fetch<T> {
    pub fn is_fetched(&self) -> bool {
        matches!(self, Fetch::Fetched(_))
    }

    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Fetch::RateLimited)
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Fetch::Fetched(value) => Some(value),
            _ => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Fetch<U> {
        match self {
            Fetch::Fetched(value) => Fetch::Fetched(f(value)),
            Fetch::RateLimited => Fetch::RateLimited,
            Fetch::Unauthenticated => Fetch::Unauthenticated,
            Fetch::Failed(err) => Fetch::Failed(err),
        }
    }
}

impl<T: Default> Fetch<T> {
    /// The fetched value, or the empty value for every degraded outcome.
    pub fn into_value(self) -> T {
        match self {
            Fetch::Fetched(value) => value,
            _ => T::default(),
        }
    }
}

impl<T> From<crate::Result<T>> for Fetch<T> {
    fn from(result: crate::Result<T>) -> Self {
        match result {
            Ok(value) => Fetch::Fetched(value),
            Err(FolioError::RateLimited { .. }) => Fetch::RateLimited,
            Err(FolioError::MissingToken { .. }) => Fetch::Unauthenticated,
            Err(err) => Fetch::Failed(err),
        }
    }
}
