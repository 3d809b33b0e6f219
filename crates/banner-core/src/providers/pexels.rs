//! Pexels search API.

use super::{ImageProvider, ProviderImage, SearchParams};
use crate::config::NetworkConfig;
use crate::network::HttpClient;
use crate::Result;
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use tracing::debug;

pub struct PexelsProvider {
    http: Arc<HttpClient>,
    api_key: String,
    base_url: String,
}

impl PexelsProvider {
    pub fn new(http: Arc<HttpClient>, api_key: impl Into<String>) -> Self {
        Self {
            http,
            api_key: api_key.into(),
            base_url: NetworkConfig::PEXELS_API_BASE.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl ImageProvider for PexelsProvider {
    fn name(&self) -> &str {
        "pexels"
    }

    async fn search(&self, keyword: &str, params: &SearchParams) -> Result<Vec<ProviderImage>> {
        let url = format!(
            "{}/v1/search?query={}&per_page={}&size={}&orientation={}",
            self.base_url.trim_end_matches('/'),
            urlencoding::encode(keyword),
            params.count,
            params.size.as_str(),
            params.orientation.as_str()
        );

        let body: PexelsResponse = self
            .http
            .get_json(self.name(), &url, &[("Authorization", self.api_key.clone())])
            .await?;

        debug!("Pexels returned {} photos for '{}'", body.photos.len(), keyword);
        Ok(body
            .photos
            .into_iter()
            .map(|p| ProviderImage::new(p.src.original))
            .collect())
    }
}

#[derive(Debug, Deserialize)]
struct PexelsResponse {
    #[serde(default)]
    photos: Vec<PexelsPhoto>,
}

#[derive(Debug, Deserialize)]
struct PexelsPhoto {
    src: PexelsSource,
}

#[derive(Debug, Deserialize)]
struct PexelsSource {
    original: String,
}
