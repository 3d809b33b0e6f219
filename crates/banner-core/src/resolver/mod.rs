//! Turning a classified banner reference into a displayable image handle.
//!
//! Resolution never fails loudly: every error is logged here and reported to
//! the caller as "no image".

mod cache;
mod rate_limit;

pub use cache::{CacheGeneration, KeywordCache};
pub use rate_limit::RateLimiter;

use crate::classifier::{clean_reference, ReferenceKind};
use crate::network::ImagePreloader;
use crate::providers::{ImageProvider, ProviderImage, SearchParams};
use crate::vault::Vault;
use crate::{BannerError, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Something the view layer can use as an image source: a remote URL or a
/// `data:` URL holding vault file content.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageHandle(String);

impl ImageHandle {
    pub fn new(handle: impl Into<String>) -> Self {
        Self(handle.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for ImageHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Per-call inputs that depend on the current settings.
#[derive(Clone)]
pub struct ResolveContext {
    pub provider: Arc<dyn ImageProvider>,
    pub params: SearchParams,
    /// Keywords tried when a search comes back empty.
    pub fallback_keywords: Vec<String>,
}

impl fmt::Debug for ResolveContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolveContext")
            .field("provider", &self.provider.name())
            .field("params", &self.params)
            .field("fallback_keywords", &self.fallback_keywords.len())
            .finish()
    }
}

/// Resolves references against the vault and the remote provider.
pub struct ImageResolver {
    vault: Arc<dyn Vault>,
    preloader: Arc<dyn ImagePreloader>,
    cache: KeywordCache,
    rate_limiter: RateLimiter,
}

impl ImageResolver {
    pub fn new(
        vault: Arc<dyn Vault>,
        preloader: Arc<dyn ImagePreloader>,
        rate_limiter: RateLimiter,
    ) -> Self {
        Self {
            vault,
            preloader,
            cache: KeywordCache::new(),
            rate_limiter,
        }
    }

    pub fn vault(&self) -> &Arc<dyn Vault> {
        &self.vault
    }

    pub fn cache(&self) -> &KeywordCache {
        &self.cache
    }

    /// Resolve `reference` according to `kind`, or `None` if it cannot be
    /// shown.
    pub async fn resolve(
        &self,
        kind: ReferenceKind,
        reference: &str,
        ctx: &ResolveContext,
    ) -> Option<ImageHandle> {
        match self.try_resolve(kind, reference, ctx).await {
            Ok(handle) => Some(handle),
            Err(e) => {
                warn!("{}", e);
                None
            }
        }
    }

    async fn try_resolve(
        &self,
        kind: ReferenceKind,
        reference: &str,
        ctx: &ResolveContext,
    ) -> Result<ImageHandle> {
        let reference = clean_reference(reference);
        match kind {
            ReferenceKind::DirectUrl => Ok(ImageHandle::new(reference)),
            ReferenceKind::VaultPath => self.vault_image(reference).await,
            ReferenceKind::InternalLink => self.linked_image(reference).await,
            ReferenceKind::Keyword => self.keyword_image(reference, ctx).await,
            ReferenceKind::Invalid => Err(BannerError::ClassificationInvalid {
                reason: format!("'{}' does not name an image", reference),
            }),
        }
    }

    /// Read a vault image and wrap it as a `data:` URL.
    async fn vault_image(&self, path: &str) -> Result<ImageHandle> {
        let bytes = self
            .vault
            .read_binary(path)
            .await
            .map_err(|e| BannerError::resolution(path, e.to_string()))?;
        let mime = mime_guess::from_path(path).first_or_octet_stream();
        debug!("Loaded vault image {} ({} bytes)", path, bytes.len());
        Ok(ImageHandle::new(format!(
            "data:{};base64,{}",
            mime.essence_str(),
            STANDARD.encode(bytes)
        )))
    }

    async fn linked_image(&self, reference: &str) -> Result<ImageHandle> {
        let target = link_target(reference);
        if target.is_empty() {
            return Err(BannerError::resolution(reference, "empty link"));
        }

        let path = self
            .vault
            .resolve_link(target)
            .await
            .ok_or_else(|| BannerError::resolution(reference, "link does not resolve"))?;

        match self.vault.entry(&path) {
            Some(entry) if entry.is_image_file() => self.vault_image(&path).await,
            _ => Err(BannerError::resolution(
                reference,
                format!("'{}' is not an image file", path),
            )),
        }
    }

    async fn keyword_image(&self, keyword: &str, ctx: &ResolveContext) -> Result<ImageHandle> {
        let cache = self.cache.generation();
        if let Some(url) = cache.get(keyword) {
            debug!("Keyword cache hit for '{}'", keyword);
            return Ok(ImageHandle::new(url));
        }

        self.rate_limiter.acquire().await;
        // Another resolution may have filled the cache while this one waited.
        if let Some(url) = cache.get(keyword) {
            debug!("Keyword '{}' cached while waiting for the rate limiter", keyword);
            return Ok(ImageHandle::new(url));
        }

        let mut images = self.search(keyword, ctx).await;
        if images.is_empty() {
            let Some(fallback) = pick(&ctx.fallback_keywords).cloned() else {
                return Err(BannerError::resolution(
                    keyword,
                    "no results and no fallback keywords configured",
                ));
            };
            info!(
                "No image found for '{}', trying fallback keyword '{}'",
                keyword, fallback
            );
            self.rate_limiter.acquire().await;
            images = self.search(&fallback, ctx).await;
        }

        let url = pick(&images)
            .map(|image| image.url.clone())
            .ok_or_else(|| {
                BannerError::resolution(keyword, "no results, including the fallback keyword")
            })?;

        cache.insert(keyword, &url);

        if let Err(e) = self.preloader.preload(&url).await {
            warn!("Failed to preload image {}: {}", url, e);
        }

        Ok(ImageHandle::new(url))
    }

    /// One search; provider errors count as no results. Callers take a
    /// rate-limiter slot first.
    async fn search(&self, keyword: &str, ctx: &ResolveContext) -> Vec<ProviderImage> {
        match ctx.provider.search(keyword, &ctx.params).await {
            Ok(images) => images,
            Err(e) => {
                warn!(
                    "Image search on {} for '{}' failed: {}",
                    ctx.provider.name(),
                    keyword,
                    e
                );
                Vec::new()
            }
        }
    }
}

impl fmt::Debug for ImageResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageResolver")
            .field("rate_limiter", &self.rate_limiter)
            .finish_non_exhaustive()
    }
}

/// Uniform random element.
fn pick<T>(items: &[T]) -> Option<&T> {
    if items.is_empty() {
        return None;
    }
    let index = rand::rng().random_range(0..items.len());
    items.get(index)
}

/// The link target inside `[[...]]`, without any `|alias`.
fn link_target(reference: &str) -> &str {
    let inner = match reference.find("[[") {
        Some(start) => {
            let rest = &reference[start + 2..];
            match rest.find("]]") {
                Some(end) => &rest[..end],
                None => rest,
            }
        }
        None => reference,
    };
    inner.split('|').next().unwrap_or(inner).trim()
}
