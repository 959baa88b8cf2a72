use async_trait::async_trait;
use serde_json::Value;

use crate::error::UpstreamError;

/// A downloader API able to resolve a video link into a JSON document.
#[async_trait]
pub trait DownloadProvider: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Resolve `video_url` with exactly one outbound call, returning the provider's
    /// JSON untouched.
    async fn fetch(&self, video_url: &str) -> Result<Value, UpstreamError>;
}
