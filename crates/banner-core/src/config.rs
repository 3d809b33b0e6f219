//! Centralized tunables for the banner engine.
//!
//! User-editable settings live in [`crate::settings`]; this module only holds
//! compile-time constants and the provider identifier.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Engine-level configuration.
pub struct EngineConfig;

impl EngineConfig {
    /// Minimum spacing between outbound keyword searches.
    pub const RATE_LIMIT_MIN_INTERVAL: Duration = Duration::from_millis(1000);
    /// Quiet window for coalescing metadata-change events.
    pub const METADATA_DEBOUNCE: Duration = Duration::from_millis(500);
    /// File extensions accepted as vault images (lowercase).
    pub const IMAGE_EXTENSIONS: &'static [&'static str] =
        &["jpg", "jpeg", "png", "gif", "bmp", "svg"];
    pub const MIN_IMAGES_PER_SEARCH: u32 = 1;
    pub const MAX_IMAGES_PER_SEARCH: u32 = 50;
    pub const SETTINGS_DIR_NAME: &'static str = ".banner";
    pub const SETTINGS_FILE_NAME: &'static str = "settings.json";
}

impl EngineConfig {
    /// Whether `extension` (without the dot) names a supported image type.
    pub fn is_image_extension(extension: &str) -> bool {
        let lower = extension.to_ascii_lowercase();
        Self::IMAGE_EXTENSIONS.contains(&lower.as_str())
    }
}

/// Network-related configuration.
pub struct NetworkConfig;

impl NetworkConfig {
    pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);
    pub const PRELOAD_TIMEOUT: Duration = Duration::from_secs(5);
    pub const THROTTLE_DELAY: Duration = Duration::from_millis(500);
    pub const USER_AGENT: &'static str = "note-banner/0.3";
    pub const PEXELS_API_BASE: &'static str = "https://api.pexels.com";
    pub const PIXABAY_API_BASE: &'static str = "https://pixabay.com";
    pub const UNSPLASH_API_BASE: &'static str = "https://api.unsplash.com";
    /// Pixabay rejects `per_page` values below this.
    pub const PIXABAY_MIN_PER_PAGE: u32 = 3;
}

/// Remote stock-photo providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    #[default]
    Pexels,
    Pixabay,
    Unsplash,
}

impl ProviderId {
    pub const ALL: [ProviderId; 3] = [ProviderId::Pexels, ProviderId::Pixabay, ProviderId::Unsplash];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::Pexels => "pexels",
            ProviderId::Pixabay => "pixabay",
            ProviderId::Unsplash => "unsplash",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "pexels" => Some(ProviderId::Pexels),
            "pixabay" => Some(ProviderId::Pixabay),
            "unsplash" => Some(ProviderId::Unsplash),
            _ => None,
        }
    }
}

impl std::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
