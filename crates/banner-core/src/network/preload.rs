//! Best-effort validation that a remote image URL actually serves an image.

use super::client::HttpClient;
use crate::config::NetworkConfig;
use crate::{BannerError, Result};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Warms up or validates an image before it is shown.
#[async_trait]
pub trait ImagePreloader: Send + Sync {
    async fn preload(&self, url: &str) -> Result<()>;
}

/// Preloader that accepts everything without touching the network.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopPreloader;

#[async_trait]
impl ImagePreloader for NoopPreloader {
    async fn preload(&self, _url: &str) -> Result<()> {
        Ok(())
    }
}

/// Fetches the image and checks for a successful `image/*` response.
pub struct HttpPreloader {
    http: Arc<HttpClient>,
    timeout: Duration,
}

impl HttpPreloader {
    pub fn new(http: Arc<HttpClient>) -> Self {
        Self {
            http,
            timeout: NetworkConfig::PRELOAD_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl ImagePreloader for HttpPreloader {
    async fn preload(&self, url: &str) -> Result<()> {
        let response = tokio::time::timeout(self.timeout, self.http.get(url))
            .await
            .map_err(|_| BannerError::Timeout(self.timeout))??;

        let status = response.status();
        if !status.is_success() {
            return Err(BannerError::Network {
                message: format!("image preload returned HTTP {}", status),
                cause: None,
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        if !content_type.starts_with("image/") {
            return Err(BannerError::Network {
                message: format!("unexpected content type '{}'", content_type),
                cause: None,
            });
        }

        debug!("Preloaded {}", url);
        Ok(())
    }
}
