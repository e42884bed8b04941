//! In-memory caches for parsed README content.
//!
//! One generic [`ExpiringCache`] type, instantiated once for full parses and
//! once for previews. Nothing is persisted; entries live for the process.

mod expiring;

pub use expiring::{CacheLookup, ExpiringCache};
