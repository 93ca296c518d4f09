//! # igview Core
//!
//! Core types, errors, and constants shared by every igview crate.
//!
//! - **Operation**: catalogue of upstream IMAI operations (path, TTL class, cache key)
//! - **Errors**: the upstream error taxonomy plus the application error type
//! - **Constants**: wire constants, defaults, and allowlists
//! - **Types**: leniently decoded upstream payloads, one per operation
//!
//! ## Example
//!
//! ```rust
//! use igview_core::Operation;
//!
//! let key = Operation::UserFeed.cache_key("alice", None);
//! assert_eq!(key, "user_feed:alice:first");
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, clippy::all)]

pub mod constants;
pub mod de;
pub mod error;
pub mod operation;
pub mod types;

pub use error::{IgviewError, Result, UpstreamBody, UpstreamContext, UpstreamError, UpstreamErrorKind};
pub use operation::{Operation, TtlClass};
pub use types::*;
