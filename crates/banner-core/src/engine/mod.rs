//! The banner engine: one entry point per host lifecycle event.
//!
//! Per document the engine moves between `NoBanner`, `Resolving` and
//! `Resolved`. Navigation and view-mode switches reuse the cached handle;
//! only a content change with a different reference triggers a new
//! resolution. Embedded documents are separate paths with separate state.

mod builder;
mod event;

pub use builder::{BannerEngineBuilder, ProviderFactory};
pub use event::{BannerDisplay, LifecycleEvent, LifecycleEventKind, RenderInstruction, ViewMode};

use crate::classifier::{classify_reference, BannerReference};
use crate::effective::{resolve_effective_config, EffectiveConfig};
use crate::providers::ImageProvider;
use crate::resolver::{ImageHandle, ImageResolver, ResolveContext};
use crate::settings::Settings;
use crate::state::{BannerPhase, BannerStateStore, DocumentBannerState};
use crate::vault::{MetadataProvider, Vault};
use std::sync::{Arc, Mutex, RwLock};
use tracing::{debug, info, warn};

/// Orchestrates classification, resolution and caching for every document.
pub struct BannerEngine {
    settings: RwLock<Arc<Settings>>,
    provider: RwLock<Arc<dyn ImageProvider>>,
    provider_factory: Option<ProviderFactory>,
    metadata: Arc<dyn MetadataProvider>,
    resolver: ImageResolver,
    state: BannerStateStore,
    last_active: Mutex<Option<String>>,
}

impl BannerEngine {
    pub fn builder(
        vault: Arc<dyn Vault>,
        metadata: Arc<dyn MetadataProvider>,
    ) -> BannerEngineBuilder {
        BannerEngineBuilder::new(vault, metadata)
    }

    /// Current settings snapshot.
    pub fn settings(&self) -> Arc<Settings> {
        self.settings.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn provider(&self) -> Arc<dyn ImageProvider> {
        self.provider.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn resolver(&self) -> &ImageResolver {
        &self.resolver
    }

    pub fn state(&self) -> &BannerStateStore {
        &self.state
    }

    pub fn phase(&self, path: &str) -> BannerPhase {
        self.state.phase(path)
    }

    /// Path of the document most recently made active.
    pub fn last_active(&self) -> Option<String> {
        self.last_active.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Process one lifecycle event and decide what the view should show.
    ///
    /// Never fails: resolution problems are logged and become
    /// [`RenderInstruction::Remove`].
    pub async fn on_lifecycle_event(&self, event: LifecycleEvent) -> RenderInstruction {
        let LifecycleEvent {
            path,
            frontmatter,
            kind,
            view_mode,
        } = event;
        debug!("Lifecycle event {:?} for {} ({:?})", kind, path, view_mode);
        self.note_active(&path, kind);

        let settings = self.settings();
        let config = resolve_effective_config(&path, frontmatter.as_ref(), &settings);

        let Some(reference) = config.banner_reference.clone() else {
            if self.state.get(&path).is_some() {
                debug!("Banner removed from {}", path);
            }
            self.state.clear(&path);
            return RenderInstruction::Remove;
        };

        if !self
            .state
            .should_re_resolve(&path, &reference, kind.is_content_change())
        {
            if let Some(handle) = self.state.get(&path).and_then(|s| s.resolved_image_handle) {
                self.state.set_position(&path, config.y_position);
                return RenderInstruction::Show(BannerDisplay::new(handle, &config));
            }
        }

        self.resolve_and_commit(&path, reference, &config, &settings).await
    }

    async fn resolve_and_commit(
        &self,
        path: &str,
        reference: BannerReference,
        config: &EffectiveConfig,
        settings: &Settings,
    ) -> RenderInstruction {
        let ticket = self.state.begin_resolution(path);

        let vault = self.resolver.vault().clone();
        let kind = classify_reference(&reference, |p| vault.entry(p));
        let ctx = ResolveContext {
            provider: self.provider(),
            params: settings.search_params(),
            fallback_keywords: settings.fallback_keywords(),
        };

        let handle = match reference.as_text() {
            Some(text) => self.resolver.resolve(kind, text, &ctx).await,
            None => {
                warn!("Banner value for {} is not a usable reference: {}", path, reference);
                None
            }
        };

        match handle {
            Some(handle) => {
                let state = DocumentBannerState {
                    resolved_image_handle: Some(handle.clone()),
                    last_reference: Some(reference),
                    last_effective_position: Some(config.y_position),
                };
                if ticket.commit(state) {
                    info!("Resolved banner for {}", path);
                    RenderInstruction::Show(BannerDisplay::new(handle, config))
                } else {
                    info!("Dropping superseded banner resolution for {}", path);
                    self.current_instruction(path, config, Some(handle))
                }
            }
            None => {
                if ticket.fail() {
                    RenderInstruction::Remove
                } else {
                    info!("Dropping superseded banner failure for {}", path);
                    self.current_instruction(path, config, None)
                }
            }
        }
    }

    /// Instruction for a superseded request: whatever the store now holds,
    /// or this request's own outcome while the newer one is still running.
    fn current_instruction(
        &self,
        path: &str,
        config: &EffectiveConfig,
        own: Option<ImageHandle>,
    ) -> RenderInstruction {
        let stored = self.state.get(path).and_then(|s| s.resolved_image_handle);
        let handle = match self.state.phase(path) {
            BannerPhase::Resolved => stored,
            BannerPhase::Resolving => stored.or(own),
            BannerPhase::NoBanner => None,
        };
        match handle {
            Some(handle) => RenderInstruction::Show(BannerDisplay::new(handle, config)),
            None => RenderInstruction::Remove,
        }
    }

    fn note_active(&self, path: &str, kind: LifecycleEventKind) {
        let mut last_active = self.last_active.lock().unwrap_or_else(|e| e.into_inner());
        if kind == LifecycleEventKind::ActiveViewChanged || last_active.is_none() {
            *last_active = Some(path.to_string());
        }
    }

    /// Apply new settings.
    ///
    /// Clears the keyword cache and every document's state, then refreshes
    /// the last active document from the metadata provider. Returns that
    /// document's new instruction, if there is one.
    pub async fn settings_changed(&self, settings: Settings) -> Option<RenderInstruction> {
        if let Some(factory) = &self.provider_factory {
            let provider = factory(&settings);
            *self.provider.write().unwrap_or_else(|e| e.into_inner()) = provider;
        }
        *self.settings.write().unwrap_or_else(|e| e.into_inner()) = Arc::new(settings);

        self.resolver.cache().clear();
        self.state.clear_all();
        info!("Settings changed, banner caches cleared");

        let path = self.last_active()?;
        let frontmatter = self.metadata.frontmatter(&path).await;
        let mut event = LifecycleEvent::new(path, LifecycleEventKind::SaveRefresh);
        event.frontmatter = frontmatter;
        Some(self.on_lifecycle_event(event).await)
    }

    /// Drop everything remembered about `path`.
    pub fn forget(&self, path: &str) {
        self.state.clear(path);
        let mut last_active = self.last_active.lock().unwrap_or_else(|e| e.into_inner());
        if last_active.as_deref() == Some(path) {
            *last_active = None;
        }
    }
}

impl std::fmt::Debug for BannerEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BannerEngine")
            .field("provider", &self.provider().name())
            .field("documents", &self.state.len())
            .finish_non_exhaustive()
    }
}
