//! Builder for configuring a [`BannerEngine`].

use super::BannerEngine;
use crate::clock::{Clock, TokioClock};
use crate::config::EngineConfig;
use crate::error::Result;
use crate::network::{HttpClient, HttpPreloader, ImagePreloader};
use crate::providers::{build_provider, ImageProvider};
use crate::resolver::{ImageResolver, RateLimiter};
use crate::settings::Settings;
use crate::state::BannerStateStore;
use crate::vault::{MetadataProvider, Vault};
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;
use tracing::warn;

/// Builds the provider for a given settings snapshot.
pub type ProviderFactory = Arc<dyn Fn(&Settings) -> Arc<dyn ImageProvider> + Send + Sync>;

/// Builder for configuring a [`BannerEngine`].
///
/// # Example
///
/// ```rust,ignore
/// use banner_core::{BannerEngine, FsVault};
/// use std::sync::Arc;
///
/// let vault = Arc::new(FsVault::new("./vault"));
/// let engine = BannerEngine::builder(vault.clone(), vault)
///     .settings(settings)
///     .build()?;
/// ```
pub struct BannerEngineBuilder {
    vault: Arc<dyn Vault>,
    metadata: Arc<dyn MetadataProvider>,
    settings: Settings,
    provider: Option<Arc<dyn ImageProvider>>,
    provider_factory: Option<ProviderFactory>,
    preloader: Option<Arc<dyn ImagePreloader>>,
    clock: Arc<dyn Clock>,
    rate_limit_interval: Duration,
}

impl BannerEngineBuilder {
    pub fn new(vault: Arc<dyn Vault>, metadata: Arc<dyn MetadataProvider>) -> Self {
        Self {
            vault,
            metadata,
            settings: Settings::default(),
            provider: None,
            provider_factory: None,
            preloader: None,
            clock: Arc::new(TokioClock),
            rate_limit_interval: EngineConfig::RATE_LIMIT_MIN_INTERVAL,
        }
    }

    /// Initial settings.
    ///
    /// Default: [`Settings::default`]
    pub fn settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    /// Use a fixed provider regardless of the provider named in settings.
    ///
    /// A provider factory, if also set, replaces it on the next settings
    /// change.
    pub fn provider(mut self, provider: Arc<dyn ImageProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Rebuild the provider from settings on every settings change.
    ///
    /// Default: the HTTP provider selected by `apiProvider`
    pub fn provider_factory<F>(mut self, factory: F) -> Self
    where
        F: Fn(&Settings) -> Arc<dyn ImageProvider> + Send + Sync + 'static,
    {
        self.provider_factory = Some(Arc::new(factory));
        self
    }

    /// Default: [`HttpPreloader`]
    pub fn preloader(mut self, preloader: Arc<dyn ImagePreloader>) -> Self {
        self.preloader = Some(preloader);
        self
    }

    /// Time source for the rate limiter.
    ///
    /// Default: [`TokioClock`]
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Minimum spacing between remote searches.
    ///
    /// Default: one second
    pub fn rate_limit_interval(mut self, interval: Duration) -> Self {
        self.rate_limit_interval = interval;
        self
    }

    /// Build the engine.
    pub fn build(self) -> Result<BannerEngine> {
        if let Err(e) = self.settings.validate() {
            warn!("Starting with invalid settings: {}", e);
        }

        let needs_http = self.preloader.is_none()
            || (self.provider.is_none() && self.provider_factory.is_none());
        let http = if needs_http {
            Some(Arc::new(HttpClient::new()?))
        } else {
            None
        };

        let provider_factory = match (self.provider_factory, &self.provider, &http) {
            (Some(factory), _, _) => Some(factory),
            (None, None, Some(http)) => {
                let http = http.clone();
                let factory: ProviderFactory =
                    Arc::new(move |settings: &Settings| build_provider(settings, http.clone()));
                Some(factory)
            }
            _ => None,
        };

        let provider = match (self.provider, &provider_factory) {
            (Some(provider), _) => provider,
            (None, Some(factory)) => factory(&self.settings),
            (None, None) => build_provider(&self.settings, Arc::new(HttpClient::new()?)),
        };

        let preloader: Arc<dyn ImagePreloader> = match (self.preloader, http) {
            (Some(preloader), _) => preloader,
            (None, Some(http)) => Arc::new(HttpPreloader::new(http)),
            (None, None) => Arc::new(HttpPreloader::new(Arc::new(HttpClient::new()?))),
        };

        let resolver = ImageResolver::new(
            self.vault,
            preloader,
            RateLimiter::new(self.clock, self.rate_limit_interval),
        );

        Ok(BannerEngine {
            settings: RwLock::new(Arc::new(self.settings)),
            provider: RwLock::new(provider),
            provider_factory,
            metadata: self.metadata,
            resolver,
            state: BannerStateStore::new(),
            last_active: Mutex::new(None),
        })
    }
}
