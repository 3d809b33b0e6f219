//! Vault backed by a local directory.

use super::{extension_of, Frontmatter, MetadataProvider, Vault, VaultEntry};
use crate::config::EngineConfig;
use crate::{BannerError, Result};
use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// A vault rooted at a directory on disk.
///
/// Paths handed to and returned from this type are vault-relative and use
/// `/` separators regardless of platform.
#[derive(Debug, Clone)]
pub struct FsVault {
    root: PathBuf,
}

impl FsVault {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a vault path to disk, refusing anything that escapes the root.
    fn absolute(&self, path: &str) -> Option<PathBuf> {
        let relative = Path::new(path.trim_start_matches('/'));
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if escapes {
            return None;
        }
        Some(self.root.join(relative))
    }

    fn relative(&self, absolute: &Path) -> Option<String> {
        let relative = absolute.strip_prefix(&self.root).ok()?;
        let parts: Vec<String> = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        Some(parts.join("/"))
    }

    /// First file (in sorted walk order) whose name or stem equals `name`.
    fn find_by_name(&self, name: &str) -> Option<String> {
        let walker = WalkDir::new(&self.root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !e.file_name().to_string_lossy().starts_with('.'));

        for entry in walker.filter_map(|e| e.ok()) {
            if !entry.file_type().is_file() {
                continue;
            }
            let file_name = entry.file_name().to_string_lossy();
            let stem = entry
                .path()
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            if file_name == name || stem == name {
                return self.relative(entry.path());
            }
        }
        None
    }
}

#[async_trait]
impl Vault for FsVault {
    fn entry(&self, path: &str) -> Option<VaultEntry> {
        let absolute = self.absolute(path)?;
        let metadata = std::fs::metadata(&absolute).ok()?;
        let path = path.trim_matches('/').to_string();
        if metadata.is_dir() {
            Some(VaultEntry::Folder { path })
        } else {
            let extension = extension_of(&path);
            Some(VaultEntry::File { path, extension })
        }
    }

    async fn read_binary(&self, path: &str) -> Result<Vec<u8>> {
        let absolute = self
            .absolute(path)
            .ok_or_else(|| BannerError::FileNotFound(path.to_string()))?;
        tokio::fs::read(&absolute).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                BannerError::FileNotFound(path.to_string())
            } else {
                BannerError::io_with_path(e, absolute)
            }
        })
    }

    async fn resolve_link(&self, link_text: &str) -> Option<String> {
        let target = link_text.split('#').next().unwrap_or(link_text).trim();
        let target = target.trim_start_matches('/');
        if target.is_empty() {
            return None;
        }

        if self.file_exists(target) {
            return Some(target.to_string());
        }
        for ext in EngineConfig::IMAGE_EXTENSIONS {
            let candidate = format!("{}.{}", target, ext);
            if self.file_exists(&candidate) {
                return Some(candidate);
            }
        }

        let name = target.rsplit('/').next().unwrap_or(target).to_string();
        let vault = self.clone();
        match tokio::task::spawn_blocking(move || vault.find_by_name(&name)).await {
            Ok(found) => {
                if found.is_none() {
                    debug!("Link '{}' did not resolve to any vault file", link_text);
                }
                found
            }
            Err(e) => {
                warn!("Link resolution task failed for '{}': {}", link_text, e);
                None
            }
        }
    }
}

#[async_trait]
impl MetadataProvider for FsVault {
    async fn frontmatter(&self, path: &str) -> Option<Frontmatter> {
        let absolute = self.absolute(path)?;
        let contents = match tokio::fs::read_to_string(&absolute).await {
            Ok(contents) => contents,
            Err(e) => {
                debug!("Cannot read {} for frontmatter: {}", absolute.display(), e);
                return None;
            }
        };
        match parse_frontmatter(&contents) {
            Ok(frontmatter) => frontmatter,
            Err(e) => {
                warn!("Invalid frontmatter in {}: {}", path, e);
                None
            }
        }
    }
}

/// Parse the leading `---` YAML block of a markdown document.
///
/// Returns `Ok(None)` when the document has no frontmatter block.
pub fn parse_frontmatter(contents: &str) -> Result<Option<Frontmatter>> {
    let contents = contents.trim_start_matches('\u{feff}');
    let mut lines = contents.lines();
    if lines.next().map(str::trim_end) != Some("---") {
        return Ok(None);
    }

    let mut yaml = String::new();
    let mut closed = false;
    for line in lines {
        if line.trim_end() == "---" {
            closed = true;
            break;
        }
        yaml.push_str(line);
        yaml.push('\n');
    }
    if !closed {
        return Ok(None);
    }
    if yaml.trim().is_empty() {
        return Ok(Some(Frontmatter::new()));
    }

    let value: serde_json::Value = serde_yaml::from_str(&yaml)?;
    match value {
        serde_json::Value::Object(map) => Ok(Some(map)),
        serde_json::Value::Null => Ok(Some(Frontmatter::new())),
        _ => Err(BannerError::Validation {
            field: "frontmatter".into(),
            message: "frontmatter must be a mapping".into(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn create_vault() -> (TempDir, FsVault) {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        std::fs::create_dir_all(root.join("Blog")).unwrap();
        std::fs::create_dir_all(root.join("assets/img")).unwrap();
        std::fs::create_dir_all(root.join(".trash")).unwrap();
        std::fs::write(root.join("assets/img/sunset.png"), b"png-bytes").unwrap();
        std::fs::write(root.join(".trash/sunset.png"), b"old").unwrap();
        std::fs::write(
            root.join("Blog/post.md"),
            "---\nbanner: \"[[sunset.png]]\"\nbanner-y: 30\n---\n# Post\n",
        )
        .unwrap();
        let vault = FsVault::new(root);
        (temp_dir, vault)
    }

    #[test]
    fn test_entry_kinds() {
        let (_dir, vault) = create_vault();
        assert_eq!(
            vault.entry("assets/img/sunset.png"),
            Some(VaultEntry::File {
                path: "assets/img/sunset.png".into(),
                extension: "png".into()
            })
        );
        assert_eq!(
            vault.entry("Blog"),
            Some(VaultEntry::Folder {
                path: "Blog".into()
            })
        );
        assert_eq!(vault.entry("missing.png"), None);
        assert_eq!(vault.entry("../outside.png"), None);
    }

    #[tokio::test]
    async fn test_read_binary() {
        let (_dir, vault) = create_vault();
        let bytes = vault.read_binary("assets/img/sunset.png").await.unwrap();
        assert_eq!(bytes, b"png-bytes");

        let err = vault.read_binary("assets/img/none.png").await.unwrap_err();
        assert!(matches!(err, BannerError::FileNotFound(_)));
    }

    #[tokio::test]
    async fn test_resolve_link_by_name_skips_hidden() {
        let (_dir, vault) = create_vault();
        assert_eq!(
            vault.resolve_link("sunset.png").await,
            Some("assets/img/sunset.png".to_string())
        );
        assert_eq!(
            vault.resolve_link("sunset").await,
            Some("assets/img/sunset.png".to_string())
        );
        assert_eq!(
            vault.resolve_link("assets/img/sunset").await,
            Some("assets/img/sunset.png".to_string())
        );
        assert_eq!(vault.resolve_link("nowhere").await, None);
    }

    #[tokio::test]
    async fn test_frontmatter_from_disk() {
        let (_dir, vault) = create_vault();
        let fm = vault.frontmatter("Blog/post.md").await.unwrap();
        assert_eq!(fm.get("banner"), Some(&json!("[[sunset.png]]")));
        assert_eq!(fm.get("banner-y"), Some(&json!(30)));
        assert!(vault.frontmatter("Blog/missing.md").await.is_none());
    }

    #[test]
    fn test_parse_frontmatter_variants() {
        assert!(parse_frontmatter("# No frontmatter").unwrap().is_none());
        assert!(parse_frontmatter("---\nbanner: x\n").unwrap().is_none());
        assert_eq!(parse_frontmatter("---\n---\nbody").unwrap(), Some(Frontmatter::new()));

        let fm = parse_frontmatter("---\r\nbanner: [[image.png]]\r\n---\r\n")
            .unwrap()
            .unwrap();
        assert_eq!(fm.get("banner"), Some(&json!([["image.png"]])));

        assert!(parse_frontmatter("---\n- a\n- b\n---\n").is_err());
    }
}
