use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde_json::Value;
use tracing::debug;

use super::traits::DownloadProvider;
use crate::config::{RelayConfig, PROVIDER_API_PATH};
use crate::error::UpstreamError;

/// Longest slice of a failed provider body carried into the error details.
const ERROR_BODY_PREVIEW_BYTES: usize = 512;

/// Client for the TikWM downloader API.
///
/// Holds no per-request state; one instance is shared by every inbound request.
pub struct TikwmProvider {
    client: Client,
    base_url: String,
}

impl TikwmProvider {
    pub fn new(base_url: &str, timeout: Duration, user_agent: &str) -> Result<Self> {
        let base_url = base_url.trim_end_matches('/');
        Url::parse(base_url).map_err(|e| anyhow!("invalid provider base url: {}", e))?;

        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.to_string(),
        })
    }

    pub fn from_config(config: &RelayConfig) -> Result<Self> {
        Self::new(
            &config.provider_base,
            config.upstream_timeout(),
            &config.user_agent,
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `<base>/api/?url=<percent-encoded link>&hd=1`
    pub fn request_url(&self, video_url: &str) -> String {
        format!(
            "{}{}?url={}&hd=1",
            self.base_url,
            PROVIDER_API_PATH,
            urlencoding::encode(video_url)
        )
    }
}

#[async_trait]
impl DownloadProvider for TikwmProvider {
    fn name(&self) -> &str {
        "tikwm"
    }

    async fn fetch(&self, video_url: &str) -> Result<Value, UpstreamError> {
        let url = self.request_url(video_url);
        debug!("tikwm fetch url={}", url);

        let resp = self.client.get(&url).send().await?;
        let status = resp.status();
        let body = resp.bytes().await?;

        if !status.is_success() {
            let preview = &body[..body.len().min(ERROR_BODY_PREVIEW_BYTES)];
            let preview = String::from_utf8_lossy(preview).into_owned();
            debug!(
                "tikwm fetch failed status={} body={:?}",
                status.as_u16(),
                preview
            );
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                body: preview,
            });
        }

        debug!("tikwm fetch ok status={} bytes={}", status.as_u16(), body.len());
        Ok(serde_json::from_slice(&body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider(base: &str) -> TikwmProvider {
        TikwmProvider::new(base, Duration::from_secs(5), "test-agent").unwrap()
    }

    #[test]
    fn test_request_url_encodes_link() {
        let p = provider("https://www.tikwm.com");
        assert_eq!(
            p.request_url("https://vt.tiktok.com/ZS53PHfPk/"),
            "https://www.tikwm.com/api/?url=https%3A%2F%2Fvt.tiktok.com%2FZS53PHfPk%2F&hd=1"
        );
    }

    #[test]
    fn test_request_url_escapes_query_delimiters() {
        let p = provider("https://www.tikwm.com");
        let url = p.request_url("https://www.tiktok.com/@a b/video/1?lang=en&x=1#t");
        assert_eq!(
            url,
            "https://www.tikwm.com/api/?url=https%3A%2F%2Fwww.tiktok.com%2F%40a%20b%2Fvideo%2F1%3Flang%3Den%26x%3D1%23t&hd=1"
        );
        assert!(url.ends_with("&hd=1"));
    }

    #[test]
    fn test_trailing_slash_on_base_is_ignored() {
        let p = provider("http://127.0.0.1:8080/");
        assert_eq!(p.base_url(), "http://127.0.0.1:8080");
        assert_eq!(p.request_url("x"), "http://127.0.0.1:8080/api/?url=x&hd=1");
    }

    #[test]
    fn test_invalid_base_is_rejected() {
        let result = TikwmProvider::new("not a url", Duration::from_secs(5), "test-agent");
        assert!(result.is_err());
    }
}
