//! Data models for the portfolio core.
//!
//! `github` holds the upstream API payloads; `project` holds the shapes the
//! frontend consumes.

mod github;
mod project;

pub use github::*;
pub use project::*;
