//! Pixabay search API.

use super::{ImageProvider, ProviderImage, SearchParams};
use crate::config::NetworkConfig;
use crate::network::HttpClient;
use crate::settings::ImageOrientation;
use crate::Result;
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use tracing::debug;

pub struct PixabayProvider {
    http: Arc<HttpClient>,
    api_key: String,
    base_url: String,
}

impl PixabayProvider {
    pub fn new(http: Arc<HttpClient>, api_key: impl Into<String>) -> Self {
        Self {
            http,
            api_key: api_key.into(),
            base_url: NetworkConfig::PIXABAY_API_BASE.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn orientation(orientation: ImageOrientation) -> &'static str {
        match orientation {
            ImageOrientation::Landscape => "horizontal",
            ImageOrientation::Portrait => "vertical",
            ImageOrientation::Square => "all",
        }
    }
}

#[async_trait]
impl ImageProvider for PixabayProvider {
    fn name(&self) -> &str {
        "pixabay"
    }

    async fn search(&self, keyword: &str, params: &SearchParams) -> Result<Vec<ProviderImage>> {
        // The key travels in the query string; HttpClient strips URLs from errors.
        let url = format!(
            "{}/api/?key={}&q={}&image_type=photo&per_page={}&orientation={}&safesearch=true",
            self.base_url.trim_end_matches('/'),
            urlencoding::encode(&self.api_key),
            urlencoding::encode(keyword),
            params.count.max(NetworkConfig::PIXABAY_MIN_PER_PAGE),
            Self::orientation(params.orientation)
        );

        let body: PixabayResponse = self.http.get_json(self.name(), &url, &[]).await?;

        debug!("Pixabay returned {} hits for '{}'", body.hits.len(), keyword);
        Ok(body
            .hits
            .into_iter()
            .take(params.count as usize)
            .map(|hit| ProviderImage::new(hit.large_image_url))
            .collect())
    }
}

#[derive(Debug, Deserialize)]
struct PixabayResponse {
    #[serde(default)]
    hits: Vec<PixabayHit>,
}

#[derive(Debug, Deserialize)]
struct PixabayHit {
    #[serde(rename = "largeImageURL")]
    large_image_url: String,
}
