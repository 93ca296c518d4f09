//! # igview Queue
//!
//! A single pacing gate for every upstream call. Requests are dispatched in
//! enqueue order, one at a time, and never closer together than the configured
//! minimum interval. Completion order is not guaranteed: a dispatched request
//! runs on its own task while the next one waits for its turn.
//!
//! ## Example
//!
//! ```rust
//! use std::time::Duration;
//! use igview_queue::RequestQueue;
//!
//! # tokio_test::block_on(async {
//! let queue = RequestQueue::new(Duration::from_millis(10));
//! let answer = queue.enqueue(|| async { 42 }).await.unwrap();
//! assert_eq!(answer, 42);
//! # });
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, clippy::all)]

mod error;
mod queue;

pub use error::QueueError;
pub use queue::RequestQueue;
