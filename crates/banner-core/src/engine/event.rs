//! Lifecycle events in, render instructions out.

use crate::effective::EffectiveConfig;
use crate::resolver::ImageHandle;
use crate::settings::ImageDisplay;
use crate::vault::Frontmatter;
use serde::{Deserialize, Serialize};

/// Host events that can change what banner a document shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LifecycleEventKind {
    ActiveViewChanged,
    MetadataChanged,
    LayoutChanged,
    ModeChanged,
    /// Explicit refresh after a save or a settings change.
    SaveRefresh,
}

impl LifecycleEventKind {
    /// Only edits to stored metadata count as content changes.
    pub fn is_content_change(&self) -> bool {
        matches!(
            self,
            LifecycleEventKind::MetadataChanged | LifecycleEventKind::SaveRefresh
        )
    }
}

/// Editor presentation of the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ViewMode {
    Source,
    Preview,
}

/// One host event for one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LifecycleEvent {
    pub path: String,
    #[serde(default)]
    pub frontmatter: Option<Frontmatter>,
    pub kind: LifecycleEventKind,
    #[serde(default)]
    pub view_mode: Option<ViewMode>,
}

impl LifecycleEvent {
    pub fn new(path: impl Into<String>, kind: LifecycleEventKind) -> Self {
        Self {
            path: path.into(),
            frontmatter: None,
            kind,
            view_mode: None,
        }
    }

    pub fn with_frontmatter(mut self, frontmatter: Frontmatter) -> Self {
        self.frontmatter = Some(frontmatter);
        self
    }

    pub fn with_view_mode(mut self, view_mode: ViewMode) -> Self {
        self.view_mode = Some(view_mode);
        self
    }

    pub fn is_content_change(&self) -> bool {
        self.kind.is_content_change()
    }
}

/// Everything the view layer needs to draw a banner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BannerDisplay {
    pub image_handle: ImageHandle,
    pub y_position: f64,
    pub content_start_position: f64,
    pub image_display: ImageDisplay,
    pub image_repeat: bool,
    pub banner_height: f64,
    pub fade: f64,
}

impl BannerDisplay {
    pub fn new(image_handle: ImageHandle, config: &EffectiveConfig) -> Self {
        Self {
            image_handle,
            y_position: config.y_position,
            content_start_position: config.content_start_position,
            image_display: config.image_display,
            image_repeat: config.image_repeat,
            banner_height: config.banner_height,
            fade: config.fade,
        }
    }
}

/// Instruction for the view-insertion layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum RenderInstruction {
    Show(BannerDisplay),
    Remove,
}

impl RenderInstruction {
    pub fn is_show(&self) -> bool {
        matches!(self, RenderInstruction::Show(_))
    }

    pub fn image_handle(&self) -> Option<&ImageHandle> {
        match self {
            RenderInstruction::Show(display) => Some(&display.image_handle),
            RenderInstruction::Remove => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_content_change_kinds() {
        assert!(LifecycleEventKind::MetadataChanged.is_content_change());
        assert!(LifecycleEventKind::SaveRefresh.is_content_change());
        assert!(!LifecycleEventKind::ActiveViewChanged.is_content_change());
        assert!(!LifecycleEventKind::LayoutChanged.is_content_change());
        assert!(!LifecycleEventKind::ModeChanged.is_content_change());
    }

    #[test]
    fn test_render_instruction_wire_shape() {
        let show = RenderInstruction::Show(BannerDisplay {
            image_handle: ImageHandle::new("https://img/a.jpg"),
            y_position: 20.0,
            content_start_position: 150.0,
            image_display: ImageDisplay::Cover,
            image_repeat: false,
            banner_height: 350.0,
            fade: -75.0,
        });
        assert_eq!(
            serde_json::to_value(&show).unwrap(),
            json!({
                "action": "show",
                "imageHandle": "https://img/a.jpg",
                "yPosition": 20.0,
                "contentStartPosition": 150.0,
                "imageDisplay": "cover",
                "imageRepeat": false,
                "bannerHeight": 350.0,
                "fade": -75.0
            })
        );
        assert_eq!(
            serde_json::to_value(RenderInstruction::Remove).unwrap(),
            json!({"action": "remove"})
        );
    }

    #[test]
    fn test_event_from_json() {
        let event: LifecycleEvent = serde_json::from_value(json!({
            "path": "Blog/post.md",
            "kind": "metadataChanged",
            "viewMode": "preview",
            "frontmatter": {"banner": "nature"}
        }))
        .unwrap();
        assert!(event.is_content_change());
        assert_eq!(event.view_mode, Some(ViewMode::Preview));
        assert_eq!(event.frontmatter.unwrap()["banner"], json!("nature"));
    }
}
