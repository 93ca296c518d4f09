//! Queue errors.

use thiserror::Error;

/// Failure of a queued request that did not come from the request itself.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QueueError {
    /// The request task ended without producing a result (it panicked or the
    /// runtime shut down before it completed).
    #[error("queued request was dropped before completing")]
    Dropped,
}
