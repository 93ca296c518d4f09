//! # igview Upstream
//!
//! The single authenticated gateway to IMAI. Every operation follows the same
//! pipeline: cache lookup, then (on a miss) a paced dispatch through the shared
//! [`RequestQueue`](igview_queue::RequestQueue), HTTP classification, envelope
//! validation, and a cache write on explicit success.
//!
//! ## Example
//!
//! ```rust,no_run
//! use igview_upstream::{ImaiClient, ImaiConfig};
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let client = ImaiClient::new(ImaiConfig::from_env()?)?;
//! let feed = client.get_user_feed("instagram", None).await?;
//! println!("{} items", feed.items.len());
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, clippy::all)]

mod classify;
mod client;
mod config;

pub use client::{HashtagFeedKind, ImaiClient};
pub use config::{EnvelopePolicy, ImaiConfig};
