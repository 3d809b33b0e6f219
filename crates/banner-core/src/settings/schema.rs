//! Persisted settings schema.
//!
//! Stored by the host as an opaque JSON blob with camelCase keys. Every field
//! has a default, so a blob written by an older plugin revision loads with
//! the missing keys filled in.

use crate::config::{EngineConfig, ProviderId};
use crate::error::{BannerError, Result};
use crate::providers::SearchParams;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;

const DEFAULT_KEYWORDS: &str = "nature, abstract, landscape, technology, art, cityscape, wildlife, ocean, mountains, forest, space, architecture, food, travel, science, music, sports, fashion, business, education, health, culture, history, weather, transportation, industry, people, animals, plants, patterns";

/// Requested image size for remote searches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageSize {
    Small,
    #[default]
    Medium,
    Large,
}

impl ImageSize {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageSize::Small => "small",
            ImageSize::Medium => "medium",
            ImageSize::Large => "large",
        }
    }
}

/// Requested image orientation for remote searches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageOrientation {
    #[default]
    Landscape,
    Portrait,
    Square,
}

impl ImageOrientation {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageOrientation::Landscape => "landscape",
            ImageOrientation::Portrait => "portrait",
            ImageOrientation::Square => "square",
        }
    }
}

/// How the banner image fills its box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageDisplay {
    Auto,
    #[default]
    Cover,
    Contain,
}

impl ImageDisplay {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageDisplay::Auto => "auto",
            ImageDisplay::Cover => "cover",
            ImageDisplay::Contain => "contain",
        }
    }

    /// Case-insensitive parse, as typed by users in frontmatter.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "auto" => Some(ImageDisplay::Auto),
            "cover" => Some(ImageDisplay::Cover),
            "contain" => Some(ImageDisplay::Contain),
            _ => None,
        }
    }
}

/// A banner setting that can be overridden from frontmatter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicalField {
    Banner,
    YPosition,
    ContentStart,
    ImageDisplay,
    ImageRepeat,
    BannerHeight,
    Fade,
}

impl LogicalField {
    pub const ALL: [LogicalField; 7] = [
        LogicalField::Banner,
        LogicalField::YPosition,
        LogicalField::ContentStart,
        LogicalField::ImageDisplay,
        LogicalField::ImageRepeat,
        LogicalField::BannerHeight,
        LogicalField::Fade,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LogicalField::Banner => "banner",
            LogicalField::YPosition => "y-position",
            LogicalField::ContentStart => "content-start",
            LogicalField::ImageDisplay => "image-display",
            LogicalField::ImageRepeat => "image-repeat",
            LogicalField::BannerHeight => "banner-height",
            LogicalField::Fade => "fade",
        }
    }
}

/// Override scoped to a vault folder subtree.
///
/// Unset fields fall through to the global settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FolderRule {
    pub folder: String,
    /// Banner reference for every document under `folder`.
    pub image: Option<String>,
    pub y_position: Option<f64>,
    pub content_start_position: Option<f64>,
    pub image_display: Option<ImageDisplay>,
    pub image_repeat: Option<bool>,
    pub banner_height: Option<f64>,
    pub fade: Option<f64>,
    /// Match only documents whose parent folder is exactly `folder`.
    pub direct_children_only: bool,
}

impl FolderRule {
    pub fn new(folder: impl Into<String>) -> Self {
        Self {
            folder: folder.into(),
            ..Default::default()
        }
    }

    /// Folder path without surrounding slashes; the vault root is `""`.
    pub fn normalized_folder(&self) -> &str {
        self.folder.trim().trim_matches('/')
    }

    /// Whether this rule applies to a document living in `document_folder`.
    pub fn matches(&self, document_folder: &str) -> bool {
        let folder = self.normalized_folder();
        if self.direct_children_only {
            return document_folder == folder;
        }
        folder.is_empty()
            || document_folder == folder
            || document_folder
                .strip_prefix(folder)
                .is_some_and(|rest| rest.starts_with('/'))
    }
}

/// Full plugin settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub api_provider: ProviderId,
    #[serde(alias = "apiKey")]
    pub pexels_api_key: String,
    pub pixabay_api_key: String,
    pub unsplash_api_key: String,
    pub image_size: ImageSize,
    pub image_orientation: ImageOrientation,
    pub number_of_images: u32,
    /// Comma-separated fallback keywords.
    pub default_keywords: String,

    pub y_position: f64,
    pub content_start_position: f64,
    pub image_display: ImageDisplay,
    pub image_repeat: bool,
    pub banner_height: f64,
    pub fade: f64,

    #[serde(deserialize_with = "string_or_list")]
    pub custom_banner_field: Vec<String>,
    #[serde(deserialize_with = "string_or_list")]
    pub custom_y_position_field: Vec<String>,
    #[serde(deserialize_with = "string_or_list")]
    pub custom_content_start_field: Vec<String>,
    #[serde(deserialize_with = "string_or_list")]
    pub custom_image_display_field: Vec<String>,
    #[serde(deserialize_with = "string_or_list")]
    pub custom_image_repeat_field: Vec<String>,
    #[serde(deserialize_with = "string_or_list")]
    pub custom_banner_height_field: Vec<String>,
    #[serde(deserialize_with = "string_or_list")]
    pub custom_fade_field: Vec<String>,

    pub folder_images: Vec<FolderRule>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_provider: ProviderId::Pexels,
            pexels_api_key: String::new(),
            pixabay_api_key: String::new(),
            unsplash_api_key: String::new(),
            image_size: ImageSize::Medium,
            image_orientation: ImageOrientation::Landscape,
            number_of_images: 10,
            default_keywords: DEFAULT_KEYWORDS.to_string(),
            y_position: 50.0,
            content_start_position: 150.0,
            image_display: ImageDisplay::Cover,
            image_repeat: false,
            banner_height: 350.0,
            fade: -75.0,
            custom_banner_field: vec!["banner".to_string()],
            custom_y_position_field: vec!["banner-y".to_string()],
            custom_content_start_field: vec!["content-start".to_string()],
            custom_image_display_field: vec!["banner-display".to_string()],
            custom_image_repeat_field: vec!["banner-repeat".to_string()],
            custom_banner_height_field: vec!["banner-height".to_string()],
            custom_fade_field: vec!["banner-fade".to_string()],
            folder_images: Vec::new(),
        }
    }
}

impl Settings {
    /// Frontmatter keys accepted for `field`, in lookup order.
    pub fn aliases(&self, field: LogicalField) -> &[String] {
        match field {
            LogicalField::Banner => &self.custom_banner_field,
            LogicalField::YPosition => &self.custom_y_position_field,
            LogicalField::ContentStart => &self.custom_content_start_field,
            LogicalField::ImageDisplay => &self.custom_image_display_field,
            LogicalField::ImageRepeat => &self.custom_image_repeat_field,
            LogicalField::BannerHeight => &self.custom_banner_height_field,
            LogicalField::Fade => &self.custom_fade_field,
        }
    }

    /// The fallback keyword list, trimmed, without empty entries.
    pub fn fallback_keywords(&self) -> Vec<String> {
        self.default_keywords
            .split(',')
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(String::from)
            .collect()
    }

    /// API key for the given provider.
    pub fn api_key(&self, provider: ProviderId) -> &str {
        match provider {
            ProviderId::Pexels => &self.pexels_api_key,
            ProviderId::Pixabay => &self.pixabay_api_key,
            ProviderId::Unsplash => &self.unsplash_api_key,
        }
    }

    /// Search parameters sent to the remote provider.
    pub fn search_params(&self) -> SearchParams {
        SearchParams {
            size: self.image_size,
            orientation: self.image_orientation,
            count: self.number_of_images,
        }
    }

    /// Check the settings for problems that must be fixed before saving.
    ///
    /// Returns the first problem found.
    pub fn validate(&self) -> Result<()> {
        if !(EngineConfig::MIN_IMAGES_PER_SEARCH..=EngineConfig::MAX_IMAGES_PER_SEARCH)
            .contains(&self.number_of_images)
        {
            return Err(BannerError::Validation {
                field: "numberOfImages".into(),
                message: format!(
                    "must be between {} and {}",
                    EngineConfig::MIN_IMAGES_PER_SEARCH,
                    EngineConfig::MAX_IMAGES_PER_SEARCH
                ),
            });
        }
        check_y_position("yPosition", self.y_position)?;
        if self.content_start_position < 0.0 {
            return Err(BannerError::Validation {
                field: "contentStartPosition".into(),
                message: "must not be negative".into(),
            });
        }

        self.validate_aliases()?;

        for (index, rule) in self.folder_images.iter().enumerate() {
            if rule.folder.trim().is_empty() {
                return Err(BannerError::Validation {
                    field: format!("folderImages[{}].folder", index),
                    message: "folder path is required".into(),
                });
            }
            if let Some(y) = rule.y_position {
                check_y_position(&format!("folderImages[{}].yPosition", index), y)?;
            }
        }

        Ok(())
    }

    /// Field names must be non-empty and unique across all logical fields.
    fn validate_aliases(&self) -> Result<()> {
        let mut owners: HashMap<&str, LogicalField> = HashMap::new();
        for field in LogicalField::ALL {
            let aliases = self.aliases(field);
            if aliases.is_empty() {
                return Err(BannerError::Validation {
                    field: field.as_str().into(),
                    message: "at least one field name is required".into(),
                });
            }
            for alias in aliases {
                let alias = alias.trim();
                if alias.is_empty() {
                    return Err(BannerError::Validation {
                        field: field.as_str().into(),
                        message: "field names cannot be empty".into(),
                    });
                }
                if let Some(owner) = owners.insert(alias, field) {
                    return Err(BannerError::ConfigConflict {
                        field: owner.as_str().into(),
                        alias: alias.into(),
                    });
                }
            }
        }
        Ok(())
    }
}

fn check_y_position(field: &str, value: f64) -> Result<()> {
    if (0.0..=100.0).contains(&value) {
        Ok(())
    } else {
        Err(BannerError::Validation {
            field: field.into(),
            message: "must be between 0 and 100".into(),
        })
    }
}

/// Older revisions stored a single field name; newer ones store a list.
fn string_or_list<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(name) => name
            .split(',')
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(String::from)
            .collect(),
        OneOrMany::Many(names) => names,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults_are_valid() {
        Settings::default().validate().unwrap();
    }

    #[test]
    fn test_partial_blob_fills_defaults() {
        let settings: Settings = serde_json::from_value(json!({
            "apiKey": "legacy-key",
            "yPosition": 20,
            "customBannerField": "pexels-banner"
        }))
        .unwrap();

        assert_eq!(settings.pexels_api_key, "legacy-key");
        assert_eq!(settings.y_position, 20.0);
        assert_eq!(settings.custom_banner_field, vec!["pexels-banner".to_string()]);
        assert_eq!(settings.number_of_images, 10);
        assert_eq!(settings.image_display, ImageDisplay::Cover);
        assert_eq!(settings.custom_fade_field, vec!["banner-fade".to_string()]);
    }

    #[test]
    fn test_fallback_keywords_trimmed() {
        let settings = Settings {
            default_keywords: " ocean , ,forest,".into(),
            ..Default::default()
        };
        assert_eq!(settings.fallback_keywords(), vec!["ocean", "forest"]);
        assert_eq!(Settings::default().fallback_keywords().len(), 30);
    }

    #[test]
    fn test_duplicate_alias_is_conflict() {
        let settings = Settings {
            custom_y_position_field: vec!["banner-y".into(), "banner".into()],
            ..Default::default()
        };
        match settings.validate() {
            Err(BannerError::ConfigConflict { field, alias }) => {
                assert_eq!(field, "banner");
                assert_eq!(alias, "banner");
            }
            other => panic!("expected conflict, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_alias_rejected() {
        let settings = Settings {
            custom_fade_field: vec!["  ".into()],
            ..Default::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(BannerError::Validation { .. })
        ));
    }

    #[test]
    fn test_number_of_images_bounds() {
        let mut settings = Settings {
            number_of_images: 0,
            ..Default::default()
        };
        assert!(settings.validate().is_err());
        settings.number_of_images = 51;
        assert!(settings.validate().is_err());
        settings.number_of_images = 50;
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_folder_rule_requires_folder() {
        let settings = Settings {
            folder_images: vec![FolderRule::default()],
            ..Default::default()
        };
        match settings.validate() {
            Err(BannerError::Validation { field, .. }) => assert_eq!(field, "folderImages[0].folder"),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_folder_rule_matching() {
        let rule = FolderRule::new("Blog/");
        assert!(rule.matches("Blog"));
        assert!(rule.matches("Blog/2024"));
        assert!(!rule.matches("Blogroll"));
        assert!(!rule.matches(""));

        let direct = FolderRule {
            direct_children_only: true,
            ..FolderRule::new("Blog")
        };
        assert!(direct.matches("Blog"));
        assert!(!direct.matches("Blog/2024"));

        let root = FolderRule::new("/");
        assert!(root.matches(""));
        assert!(root.matches("Anything/Deep"));
    }

    #[test]
    fn test_display_parse_case_insensitive() {
        assert_eq!(ImageDisplay::from_str("Contain"), Some(ImageDisplay::Contain));
        assert_eq!(ImageDisplay::from_str("stretch"), None);
    }
}
