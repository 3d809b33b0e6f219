//! Banner Core - Banner resolution and caching engine for note banners.
//!
//! Given a document's frontmatter, folder-scoped defaults and global
//! settings, decides which banner image a document shows, where to get it
//! (remote URL, vault file, internal link or keyword search) and when a
//! cached result can be reused. It has no UI; hosts feed it lifecycle
//! events and draw whatever [`RenderInstruction`] comes back.
//!
//! For the JSON-RPC bridge, see the `banner-rpc` crate.
//!
//! # Example
//!
//! ```rust,ignore
//! use banner_core::{BannerEngine, FsVault, LifecycleEvent, LifecycleEventKind};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> banner_core::Result<()> {
//!     let vault = Arc::new(FsVault::new("/path/to/vault"));
//!     let engine = BannerEngine::builder(vault.clone(), vault.clone()).build()?;
//!
//!     let frontmatter = vault.frontmatter("Blog/post.md").await;
//!     let mut event = LifecycleEvent::new("Blog/post.md", LifecycleEventKind::ActiveViewChanged);
//!     event.frontmatter = frontmatter;
//!
//!     let instruction = engine.on_lifecycle_event(event).await;
//!     println!("{:?}", instruction);
//!     Ok(())
//! }
//! ```

pub mod classifier;
pub mod clock;
pub mod config;
pub mod debounce;
pub mod effective;
pub mod engine;
pub mod error;
pub mod network;
pub mod providers;
pub mod resolver;
pub mod settings;
pub mod state;
pub mod vault;

// Re-export commonly used types
pub use classifier::{classify, classify_reference, BannerReference, ReferenceKind};
pub use clock::{Clock, TokioClock};
pub use config::{EngineConfig, NetworkConfig, ProviderId};
pub use debounce::Debouncer;
pub use effective::{resolve_effective_config, EffectiveConfig};
pub use engine::{
    BannerDisplay, BannerEngine, BannerEngineBuilder, LifecycleEvent, LifecycleEventKind,
    ProviderFactory, RenderInstruction, ViewMode,
};
pub use error::{BannerError, Result};
pub use network::{HttpClient, HttpPreloader, ImagePreloader, NoopPreloader};
pub use providers::{
    build_provider, ImageProvider, PexelsProvider, PixabayProvider, ProviderImage, SearchParams,
    UnsplashProvider,
};
pub use resolver::{ImageHandle, ImageResolver, KeywordCache, RateLimiter, ResolveContext};
pub use settings::{FolderRule, ImageDisplay, ImageOrientation, ImageSize, Settings, SettingsStore};
pub use state::{BannerPhase, BannerStateStore, DocumentBannerState};
pub use vault::{Frontmatter, FsVault, MemoryVault, MetadataProvider, Vault, VaultEntry};
