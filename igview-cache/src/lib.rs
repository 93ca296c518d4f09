//! TTL cache for igview upstream results.
//!
//! Generic in-memory cache with a per-instance TTL, lazy expiry on read and a
//! capacity cap enforced by least-recently-used eviction.

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, clippy::all)]

mod cache;

pub use cache::{CacheConfig, CacheStats, TtlCache};
