//! In-process vault.

use super::{Frontmatter, MetadataProvider, Vault, VaultEntry};
use crate::{BannerError, Result};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;

/// A vault held entirely in memory.
///
/// Useful for hosts that already keep file contents in memory and for tests.
/// Counts binary reads so callers can assert on I/O.
#[derive(Debug, Default)]
pub struct MemoryVault {
    files: RwLock<BTreeMap<String, Vec<u8>>>,
    frontmatter: RwLock<HashMap<String, Frontmatter>>,
    reads: AtomicUsize,
}

impl MemoryVault {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a file.
    pub fn insert_file(&self, path: impl Into<String>, bytes: impl Into<Vec<u8>>) {
        let path = path.into().trim_matches('/').to_string();
        self.files
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(path, bytes.into());
    }

    /// Set the frontmatter reported for a document.
    pub fn set_frontmatter(&self, path: impl Into<String>, frontmatter: Frontmatter) {
        self.frontmatter
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(path.into(), frontmatter);
    }

    pub fn remove_frontmatter(&self, path: &str) {
        self.frontmatter
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .remove(path);
    }

    /// Number of `read_binary` calls so far.
    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Vault for MemoryVault {
    fn entry(&self, path: &str) -> Option<VaultEntry> {
        let path = path.trim_matches('/');
        let files = self.files.read().unwrap_or_else(|e| e.into_inner());
        if files.contains_key(path) {
            return Some(VaultEntry::file(path));
        }
        let prefix = format!("{}/", path);
        if !path.is_empty() && files.keys().any(|k| k.starts_with(&prefix)) {
            return Some(VaultEntry::Folder {
                path: path.to_string(),
            });
        }
        None
    }

    async fn read_binary(&self, path: &str) -> Result<Vec<u8>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.files
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(path.trim_matches('/'))
            .cloned()
            .ok_or_else(|| BannerError::FileNotFound(path.to_string()))
    }

    async fn resolve_link(&self, link_text: &str) -> Option<String> {
        let target = link_text.split('#').next().unwrap_or(link_text).trim();
        let target = target.trim_matches('/');
        let files = self.files.read().unwrap_or_else(|e| e.into_inner());
        if files.contains_key(target) {
            return Some(target.to_string());
        }
        files
            .keys()
            .find(|path| {
                let name = path.rsplit('/').next().unwrap_or(path);
                let stem = name.rsplit_once('.').map(|(s, _)| s).unwrap_or(name);
                name == target || stem == target
            })
            .cloned()
    }
}

#[async_trait]
impl MetadataProvider for MemoryVault {
    async fn frontmatter(&self, path: &str) -> Option<Frontmatter> {
        self.frontmatter
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(path)
            .cloned()
    }
}
