//! Per-document effective configuration.
//!
//! Layers, lowest precedence first: global settings, the first folder rule
//! that matches the document's folder, then frontmatter fields read under
//! their configured aliases.

use crate::classifier::BannerReference;
use crate::settings::{FolderRule, ImageDisplay, LogicalField, Settings};
use crate::vault::{parent_folder, Frontmatter};
use serde_json::Value;
use tracing::debug;

/// Fully merged settings for one document.
#[derive(Debug, Clone, PartialEq)]
pub struct EffectiveConfig {
    /// `None` means the document has no banner.
    pub banner_reference: Option<BannerReference>,
    /// Vertical focus, 0 to 100.
    pub y_position: f64,
    /// Offset of the document content below the banner, never negative.
    pub content_start_position: f64,
    pub image_display: ImageDisplay,
    pub image_repeat: bool,
    pub banner_height: f64,
    pub fade: f64,
}

impl EffectiveConfig {
    fn from_settings(settings: &Settings) -> Self {
        Self {
            banner_reference: None,
            y_position: settings.y_position,
            content_start_position: settings.content_start_position,
            image_display: settings.image_display,
            image_repeat: settings.image_repeat,
            banner_height: settings.banner_height,
            fade: settings.fade,
        }
    }

    fn apply_folder_rule(&mut self, rule: &FolderRule) {
        if let Some(image) = rule.image.as_deref() {
            if let Some(reference) = BannerReference::from_value(&Value::String(image.to_string())) {
                self.banner_reference = Some(reference);
            }
        }
        if let Some(y) = rule.y_position {
            self.y_position = y;
        }
        if let Some(start) = rule.content_start_position {
            self.content_start_position = start;
        }
        if let Some(display) = rule.image_display {
            self.image_display = display;
        }
        if let Some(repeat) = rule.image_repeat {
            self.image_repeat = repeat;
        }
        if let Some(height) = rule.banner_height {
            self.banner_height = height;
        }
        if let Some(fade) = rule.fade {
            self.fade = fade;
        }
    }

    fn apply_frontmatter(&mut self, frontmatter: &Frontmatter, settings: &Settings) {
        if let Some(value) = lookup(frontmatter, settings, LogicalField::Banner) {
            if let Some(reference) = BannerReference::from_value(value) {
                self.banner_reference = Some(reference);
            }
        }
        if let Some(y) = number_field(frontmatter, settings, LogicalField::YPosition) {
            self.y_position = y;
        }
        if let Some(start) = number_field(frontmatter, settings, LogicalField::ContentStart) {
            self.content_start_position = start;
        }
        if let Some(value) = lookup(frontmatter, settings, LogicalField::ImageDisplay) {
            match value.as_str().and_then(ImageDisplay::from_str) {
                Some(display) => self.image_display = display,
                None => debug!("Ignoring unknown image display value {}", value),
            }
        }
        if let Some(value) = lookup(frontmatter, settings, LogicalField::ImageRepeat) {
            match coerce_bool(value) {
                Some(repeat) => self.image_repeat = repeat,
                None => debug!("Ignoring non-boolean repeat value {}", value),
            }
        }
        if let Some(height) = number_field(frontmatter, settings, LogicalField::BannerHeight) {
            self.banner_height = height;
        }
        if let Some(fade) = number_field(frontmatter, settings, LogicalField::Fade) {
            self.fade = fade;
        }
    }

    fn clamp(&mut self) {
        self.y_position = self.y_position.clamp(0.0, 100.0);
        self.content_start_position = self.content_start_position.max(0.0);
    }
}

/// Merge global, folder and frontmatter configuration for `document_path`.
pub fn resolve_effective_config(
    document_path: &str,
    frontmatter: Option<&Frontmatter>,
    settings: &Settings,
) -> EffectiveConfig {
    let mut config = EffectiveConfig::from_settings(settings);

    if let Some(rule) = matching_folder_rule(document_path, &settings.folder_images) {
        debug!("Folder rule '{}' applies to {}", rule.folder, document_path);
        config.apply_folder_rule(rule);
    }
    if let Some(frontmatter) = frontmatter {
        config.apply_frontmatter(frontmatter, settings);
    }

    config.clamp();
    config
}

/// First rule in configured order that matches the document's folder.
pub fn matching_folder_rule<'a>(document_path: &str, rules: &'a [FolderRule]) -> Option<&'a FolderRule> {
    let folder = parent_folder(document_path);
    rules.iter().find(|rule| rule.matches(folder))
}

/// Value under the first configured alias present in the frontmatter.
fn lookup<'a>(frontmatter: &'a Frontmatter, settings: &Settings, field: LogicalField) -> Option<&'a Value> {
    settings
        .aliases(field)
        .iter()
        .filter_map(|alias| frontmatter.get(alias.trim()))
        .find(|value| !value.is_null())
}

fn number_field(frontmatter: &Frontmatter, settings: &Settings, field: LogicalField) -> Option<f64> {
    let value = lookup(frontmatter, settings, field)?;
    let number = coerce_number(value);
    if number.is_none() {
        debug!("Ignoring non-numeric {} value {}", field.as_str(), value);
    }
    number
}

fn coerce_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().trim_end_matches('%').trim().parse::<f64>().ok(),
        _ => None,
    }?;
    number.is_finite().then_some(number)
}

fn coerce_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        },
        _ => None,
    }
}
