//! Upstream payload types.
//!
//! One type per upstream operation. Only the envelope `status` field is
//! load-bearing for the client; the remaining fields are decoded leniently and
//! item-level data stays as raw JSON for the route layer's normalizer.

mod feed;
mod media;
mod stories;
mod user;

pub use feed::FeedResponse;
pub use media::{CommentsResponse, MediaInfoResponse};
pub use stories::{HighlightItemsResponse, HighlightsResponse, StoriesResponse};
pub use user::{SearchData, SearchResponse, UserInfoResponse};

use crate::constants::STATUS_OK;

/// Access to the upstream success envelope.
pub trait Envelope {
    /// The envelope `status` field, if present.
    fn status(&self) -> Option<&str>;

    /// Returns true if the envelope explicitly reports success.
    fn is_ok(&self) -> bool {
        self.status() == Some(STATUS_OK)
    }
}

macro_rules! impl_envelope {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl Envelope for $ty {
                fn status(&self) -> Option<&str> {
                    self.status.as_deref()
                }
            }
        )+
    };
}

impl_envelope!(
    SearchResponse,
    UserInfoResponse,
    HighlightsResponse,
    FeedResponse,
    MediaInfoResponse,
    CommentsResponse,
    StoriesResponse,
    HighlightItemsResponse,
);
