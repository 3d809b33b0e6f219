//! Per-document banner memo.
//!
//! Not persisted. Entries live for the session and are dropped when a
//! document loses its banner, when it is forgotten, or when settings change.

use crate::classifier::BannerReference;
use crate::resolver::ImageHandle;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use tracing::debug;

/// What the engine remembers about one document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentBannerState {
    pub resolved_image_handle: Option<ImageHandle>,
    pub last_reference: Option<BannerReference>,
    pub last_effective_position: Option<f64>,
}

/// Where a document is in its banner lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum BannerPhase {
    NoBanner,
    Resolving,
    Resolved,
}

/// Proof that a resolution was started; needed to settle its result.
///
/// Dropping a ticket without settling it (the resolving task was cancelled)
/// takes the path out of `Resolving` if no newer request replaced it.
#[derive(Debug)]
#[must_use = "an unsettled ticket abandons its resolution when dropped"]
pub struct ResolutionTicket<'a> {
    store: &'a BannerStateStore,
    path: String,
    generation: u64,
    settled: bool,
}

impl ResolutionTicket<'_> {
    /// Whether no newer request for the path started since this one.
    pub fn is_current(&self) -> bool {
        self.store.lock().is_current(&self.path, self.generation)
    }

    /// Store a successful result if this is still the latest request.
    pub fn commit(mut self, state: DocumentBannerState) -> bool {
        self.settled = true;
        let mut inner = self.store.lock();
        if !inner.is_current(&self.path, self.generation) {
            return false;
        }
        inner.pending.remove(&self.path);
        inner.documents.insert(self.path.clone(), state);
        true
    }

    /// Record a failure if this is still the latest request.
    ///
    /// A failure leaves no cached handle behind.
    pub fn fail(mut self) -> bool {
        self.settled = true;
        let mut inner = self.store.lock();
        if !inner.is_current(&self.path, self.generation) {
            return false;
        }
        inner.pending.remove(&self.path);
        inner.documents.remove(&self.path);
        true
    }
}

impl Drop for ResolutionTicket<'_> {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        let mut inner = self.store.lock();
        if inner.is_current(&self.path, self.generation) {
            debug!("Resolution for {} abandoned", self.path);
            inner.pending.remove(&self.path);
        }
    }
}

#[derive(Debug, Default)]
struct StoreInner {
    documents: HashMap<String, DocumentBannerState>,
    /// Latest generation started per path.
    generations: HashMap<String, u64>,
    pending: HashSet<String>,
    next_generation: u64,
}

impl StoreInner {
    fn is_current(&self, path: &str, generation: u64) -> bool {
        self.generations.get(path) == Some(&generation)
    }
}

/// Document path to [`DocumentBannerState`], with a per-path generation
/// guard so a slow resolution cannot overwrite a newer one.
#[derive(Debug, Default)]
pub struct BannerStateStore {
    inner: Mutex<StoreInner>,
}

impl BannerStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, StoreInner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Whether `path` needs a fresh resolution for `new_reference`.
    ///
    /// True when nothing is cached, or when a content change brings a
    /// reference different from the cached one. Navigation and view-mode
    /// switches reuse whatever is cached.
    pub fn should_re_resolve(
        &self,
        path: &str,
        new_reference: &BannerReference,
        is_content_change: bool,
    ) -> bool {
        let inner = self.lock();
        match inner.documents.get(path) {
            Some(DocumentBannerState {
                resolved_image_handle: Some(_),
                last_reference,
                ..
            }) => is_content_change && last_reference.as_ref() != Some(new_reference),
            _ => true,
        }
    }

    pub fn get(&self, path: &str) -> Option<DocumentBannerState> {
        self.lock().documents.get(path).cloned()
    }

    pub fn set(&self, path: &str, state: DocumentBannerState) {
        self.lock().documents.insert(path.to_string(), state);
    }

    /// Record the position last shown for an already-resolved document.
    pub fn set_position(&self, path: &str, y_position: f64) {
        if let Some(state) = self.lock().documents.get_mut(path) {
            state.last_effective_position = Some(y_position);
        }
    }

    /// Drop the entry for `path` and invalidate any resolution in flight.
    pub fn clear(&self, path: &str) {
        let mut inner = self.lock();
        inner.documents.remove(path);
        inner.generations.remove(path);
        inner.pending.remove(path);
    }

    /// Drop every entry and invalidate every resolution in flight.
    pub fn clear_all(&self) {
        let mut inner = self.lock();
        inner.documents.clear();
        inner.generations.clear();
        inner.pending.clear();
    }

    /// Start a resolution for `path`, superseding any earlier one.
    pub fn begin_resolution(&self, path: &str) -> ResolutionTicket<'_> {
        let mut inner = self.lock();
        inner.next_generation += 1;
        let generation = inner.next_generation;
        inner.generations.insert(path.to_string(), generation);
        inner.pending.insert(path.to_string());
        ResolutionTicket {
            store: self,
            path: path.to_string(),
            generation,
            settled: false,
        }
    }

    pub fn phase(&self, path: &str) -> BannerPhase {
        let inner = self.lock();
        if inner.pending.contains(path) {
            return BannerPhase::Resolving;
        }
        match inner.documents.get(path) {
            Some(state) if state.resolved_image_handle.is_some() => BannerPhase::Resolved,
            _ => BannerPhase::NoBanner,
        }
    }

    pub fn len(&self) -> usize {
        self.lock().documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
