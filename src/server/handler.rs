// Axum request handler: translates relay HTTP requests into provider calls.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::{
    body::Bytes,
    extract::State,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::Value;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::error::RelayError;
use crate::models::{DownloadRequest, ServiceStatus};
use crate::provider::traits::DownloadProvider;

pub type ProviderRef = Arc<dyn DownloadProvider>;

/// Route served by the relay.
pub const RELAY_PATH: &str = "/relay";

/// Path the browser console posts to; same handlers as [`RELAY_PATH`].
pub const CONSOLE_PATH: &str = "/api/tiktok";

pub struct RelayServer {
    addr: SocketAddr,
    shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl RelayServer {
    /// Start the relay on a random loopback port, returning a handle.
    pub async fn start(provider: ProviderRef) -> Result<Self> {
        Self::bind("127.0.0.1:0", provider).await
    }

    /// Start the relay on `addr`.
    pub async fn bind(addr: &str, provider: ProviderRef) -> Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        let addr = listener.local_addr()?;

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
        let app = router(provider);

        let task = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await
            {
                error!("relay server error: {}", e);
            }
        });

        info!("relay listening on http://{}", addr);

        Ok(Self {
            addr,
            shutdown_tx: Some(shutdown_tx),
            task: Some(task),
        })
    }

    /// Get the port the server is listening on.
    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    /// Build a URL for a path on this server.
    pub fn url_for(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Stop accepting connections and wait for in-flight requests to finish.
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
        info!("relay on {} stopped", self.addr);
    }
}

pub fn router(provider: ProviderRef) -> Router {
    Router::new()
        .route(RELAY_PATH, get(status_handler).post(relay_handler))
        .route(CONSOLE_PATH, get(status_handler).post(relay_handler))
        .with_state(provider)
}

/// Resolve one validated request against the provider.
pub async fn relay(
    provider: &dyn DownloadProvider,
    request: &DownloadRequest,
) -> Result<Value, RelayError> {
    match provider.fetch(&request.url).await {
        Ok(document) => Ok(document),
        Err(e) => {
            error!(
                "relay via {} failed url={} kind={} err={}",
                provider.name(),
                request.url,
                e.kind(),
                e
            );
            Err(e.into())
        }
    }
}

/// GET, static liveness payload.
async fn status_handler() -> Json<ServiceStatus> {
    Json(ServiceStatus::ready())
}

/// POST, relay `{ "url": ... }` to the provider and hand its JSON back verbatim.
async fn relay_handler(State(provider): State<ProviderRef>, body: Bytes) -> Response {
    let request = match DownloadRequest::from_body(&body) {
        Ok(r) => r,
        Err(e) => {
            debug!("rejecting relay request: {}", e);
            return e.into_response();
        }
    };

    debug!("relay request url={}", request.url);

    match relay(provider.as_ref(), &request).await {
        Ok(document) => Json(document).into_response(),
        Err(e) => e.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use serde_json::json;

    use crate::error::UpstreamError;

    struct FixedProvider {
        calls: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl DownloadProvider for FixedProvider {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn fetch(&self, video_url: &str) -> Result<Value, UpstreamError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(UpstreamError::Status {
                    status: 502,
                    body: String::new(),
                });
            }
            Ok(json!({ "code": 0, "echo": video_url }))
        }
    }

    #[tokio::test]
    async fn test_relay_passes_document_through() {
        let provider = FixedProvider {
            calls: AtomicUsize::new(0),
            fail: false,
        };
        let request = DownloadRequest {
            url: "https://vt.tiktok.com/ZS53PHfPk/".to_string(),
        };

        let doc = relay(&provider, &request).await.unwrap();
        assert_eq!(doc, json!({ "code": 0, "echo": "https://vt.tiktok.com/ZS53PHfPk/" }));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_relay_wraps_provider_failure() {
        let provider = FixedProvider {
            calls: AtomicUsize::new(0),
            fail: true,
        };
        let request = DownloadRequest {
            url: "x".to_string(),
        };

        let err = relay(&provider, &request).await.unwrap_err();
        assert!(matches!(
            err,
            RelayError::Upstream(UpstreamError::Status { status: 502, .. })
        ));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }
}
