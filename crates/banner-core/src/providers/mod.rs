//! Remote stock-photo providers.
//!
//! Every provider answers the same question, "give me some image URLs for
//! this keyword", and hides its own auth scheme and response shape behind
//! [`ImageProvider`].

mod pexels;
mod pixabay;
mod unsplash;

pub use pexels::PexelsProvider;
pub use pixabay::PixabayProvider;
pub use unsplash::UnsplashProvider;

use crate::config::ProviderId;
use crate::network::HttpClient;
use crate::settings::{ImageOrientation, ImageSize, Settings};
use crate::{BannerError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Parameters for one keyword search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchParams {
    pub size: ImageSize,
    pub orientation: ImageOrientation,
    /// Maximum number of results to request.
    pub count: u32,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            size: ImageSize::Medium,
            orientation: ImageOrientation::Landscape,
            count: 10,
        }
    }
}

/// A single search hit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderImage {
    pub url: String,
}

impl ProviderImage {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

/// A keyword image search backend.
#[async_trait]
pub trait ImageProvider: Send + Sync {
    /// Short provider name used in logs and errors.
    fn name(&self) -> &str;

    /// Search for images matching `keyword`. An empty list means no hits.
    async fn search(&self, keyword: &str, params: &SearchParams) -> Result<Vec<ProviderImage>>;
}

/// Stand-in used when the selected provider has no API key.
#[derive(Debug, Clone)]
pub struct UnconfiguredProvider {
    provider: ProviderId,
}

impl UnconfiguredProvider {
    pub fn new(provider: ProviderId) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl ImageProvider for UnconfiguredProvider {
    fn name(&self) -> &str {
        self.provider.as_str()
    }

    async fn search(&self, _keyword: &str, _params: &SearchParams) -> Result<Vec<ProviderImage>> {
        Err(BannerError::Provider {
            provider: self.provider.as_str().to_string(),
            message: "API key is not configured".to_string(),
            status: None,
        })
    }
}

/// Build the provider selected in `settings`.
pub fn build_provider(settings: &Settings, http: Arc<HttpClient>) -> Arc<dyn ImageProvider> {
    let provider = settings.api_provider;
    let api_key = settings.api_key(provider).trim().to_string();
    if api_key.is_empty() {
        return Arc::new(UnconfiguredProvider::new(provider));
    }
    match provider {
        ProviderId::Pexels => Arc::new(PexelsProvider::new(http, api_key)),
        ProviderId::Pixabay => Arc::new(PixabayProvider::new(http, api_key)),
        ProviderId::Unsplash => Arc::new(UnsplashProvider::new(http, api_key)),
    }
}
