//! Host collaborators: vault file access and document metadata.
//!
//! The engine never touches the filesystem directly. Hosts provide these
//! traits; [`FsVault`] covers vaults that live in a local directory and
//! [`MemoryVault`] is an in-process implementation for embedding and tests.

mod fs;
mod memory;

pub use fs::{parse_frontmatter, FsVault};
pub use memory::MemoryVault;

use crate::config::EngineConfig;
use crate::Result;
use async_trait::async_trait;

/// Parsed frontmatter of one document.
pub type Frontmatter = serde_json::Map<String, serde_json::Value>;

/// What a vault path points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VaultEntry {
    File {
        path: String,
        /// Lowercase extension without the dot, empty if none.
        extension: String,
    },
    Folder {
        path: String,
    },
}

impl VaultEntry {
    /// Build a file entry, deriving the extension from `path`.
    pub fn file(path: impl Into<String>) -> Self {
        let path = path.into();
        let extension = extension_of(&path);
        VaultEntry::File { path, extension }
    }

    pub fn path(&self) -> &str {
        match self {
            VaultEntry::File { path, .. } | VaultEntry::Folder { path } => path,
        }
    }

    /// Whether this is a file with a supported image extension.
    pub fn is_image_file(&self) -> bool {
        match self {
            VaultEntry::File { extension, .. } => EngineConfig::is_image_extension(extension),
            VaultEntry::Folder { .. } => false,
        }
    }
}

/// Vault file access.
#[async_trait]
pub trait Vault: Send + Sync {
    /// Look up a vault-relative path.
    fn entry(&self, path: &str) -> Option<VaultEntry>;

    /// Whether `path` names an existing file.
    fn file_exists(&self, path: &str) -> bool {
        matches!(self.entry(path), Some(VaultEntry::File { .. }))
    }

    /// Read the raw bytes of a file.
    async fn read_binary(&self, path: &str) -> Result<Vec<u8>>;

    /// Resolve internal-link text (no brackets, no alias) to a file path.
    async fn resolve_link(&self, link_text: &str) -> Option<String>;
}

/// Document metadata access.
#[async_trait]
pub trait MetadataProvider: Send + Sync {
    /// Frontmatter of the document at `path`, if it has any.
    async fn frontmatter(&self, path: &str) -> Option<Frontmatter>;
}

/// Lowercase extension of a `/`-separated path.
pub(crate) fn extension_of(path: &str) -> String {
    let name = path.rsplit('/').next().unwrap_or(path);
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => ext.to_ascii_lowercase(),
        _ => String::new(),
    }
}

/// Parent folder of a `/`-separated path; the vault root is `""`.
pub fn parent_folder(path: &str) -> &str {
    let path = path.trim_matches('/');
    match path.rfind('/') {
        Some(idx) => &path[..idx],
        None => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_of() {
        assert_eq!(extension_of("images/Photo.JPG"), "jpg");
        assert_eq!(extension_of("notes/readme"), "");
        assert_eq!(extension_of(".hidden"), "");
        assert_eq!(extension_of("a.b/c"), "");
    }

    #[test]
    fn test_parent_folder() {
        assert_eq!(parent_folder("Blog/post.md"), "Blog");
        assert_eq!(parent_folder("A/B/note.md"), "A/B");
        assert_eq!(parent_folder("note.md"), "");
        assert_eq!(parent_folder("/Blog/post.md"), "Blog");
    }

    #[test]
    fn test_entry_is_image_file() {
        assert!(VaultEntry::file("img/banner.PNG").is_image_file());
        assert!(!VaultEntry::file("notes/banner.md").is_image_file());
        assert!(!VaultEntry::Folder {
            path: "img.png".into()
        }
        .is_image_file());
    }
}
