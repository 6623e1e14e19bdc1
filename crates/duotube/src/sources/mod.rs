//! Backend adapters.
//!
//! Each adapter builds requests for its backend, parses the backend's native
//! shape and hands it to [`crate::normalize`] so callers only ever see
//! canonical records.

pub mod mirror;
pub mod primary;

use async_trait::async_trait;

use crate::error::{Result, SourceError};
use crate::model::{
    CanonicalVideo, ChannelInfo, SearchRequest, SourceKind, TrendingRequest, VideoDetails,
};

pub use mirror::{MirrorAdapter, MirrorPool};
pub use primary::{PrimaryAdapter, is_valid_api_key};

#[async_trait]
pub trait VideoSource: Send + Sync {
    fn kind(&self) -> SourceKind;

    async fn search(&self, request: &SearchRequest) -> Result<Vec<CanonicalVideo>>;

    async fn trending(&self, request: &TrendingRequest) -> Result<Vec<CanonicalVideo>>;

    async fn details(&self, video_id: &str) -> Result<VideoDetails>;

    /// Channel summary. Only the mirror backend offers one.
    async fn channel(&self, _channel_id: &str) -> Result<ChannelInfo> {
        Err(SourceError::Unsupported {
            origin: self.kind(),
            operation: "channel lookup",
        })
    }
}
