//! Unsplash search API.

use super::{ImageProvider, ProviderImage, SearchParams};
use crate::config::NetworkConfig;
use crate::network::HttpClient;
use crate::settings::ImageOrientation;
use crate::Result;
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use tracing::debug;

pub struct UnsplashProvider {
    http: Arc<HttpClient>,
    access_key: String,
    base_url: String,
}

impl UnsplashProvider {
    pub fn new(http: Arc<HttpClient>, access_key: impl Into<String>) -> Self {
        Self {
            http,
            access_key: access_key.into(),
            base_url: NetworkConfig::UNSPLASH_API_BASE.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl ImageProvider for UnsplashProvider {
    fn name(&self) -> &str {
        "unsplash"
    }

    async fn search(&self, keyword: &str, params: &SearchParams) -> Result<Vec<ProviderImage>> {
        let orientation = match params.orientation {
            ImageOrientation::Landscape => "landscape",
            ImageOrientation::Portrait => "portrait",
            ImageOrientation::Square => "squarish",
        };
        let url = format!(
            "{}/search/photos?query={}&per_page={}&orientation={}",
            self.base_url.trim_end_matches('/'),
            urlencoding::encode(keyword),
            params.count,
            orientation
        );

        let auth = format!("Client-ID {}", self.access_key);
        let body: UnsplashResponse = self
            .http
            .get_json(self.name(), &url, &[("Authorization", auth)])
            .await?;

        debug!("Unsplash returned {} results for '{}'", body.results.len(), keyword);
        Ok(body
            .results
            .into_iter()
            .map(|r| ProviderImage::new(r.urls.full))
            .collect())
    }
}

#[derive(Debug, Deserialize)]
struct UnsplashResponse {
    #[serde(default)]
    results: Vec<UnsplashPhoto>,
}

#[derive(Debug, Deserialize)]
struct UnsplashPhoto {
    urls: UnsplashUrls,
}

#[derive(Debug, Deserialize)]
struct UnsplashUrls {
    full: String,
}
