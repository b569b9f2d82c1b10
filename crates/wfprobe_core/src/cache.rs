//! Per-run memo of fetched run documents.
//!
//! Entries are keyed by `(DocumentKind, RunId)` and stored as `Arc`
//! snapshots. A refresh swaps in a new `Arc`, so a snapshot handed out
//! earlier always stays a complete document.

use crate::error::Result;
use crate::model::{RunActionsDocument, RunDetails, RunId};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Which endpoint a cached document came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentKind {
    /// Run status snapshot.
    RunDetails,
    /// Run record with expanded actions.
    RunActions,
}

/// A cached document of either kind.
#[derive(Debug, Clone)]
pub enum CachedDocument {
    /// Run status snapshot.
    RunDetails(Arc<RunDetails>),
    /// Run record with expanded actions.
    RunActions(Arc<RunActionsDocument>),
}

/// Documents that can live in a [`RunCache`].
pub trait RunDocument: Sized {
    /// Cache slot for this document type.
    const KIND: DocumentKind;

    /// Wraps a snapshot for storage.
    fn into_cached(doc: Arc<Self>) -> CachedDocument;

    /// Extracts a snapshot of this type.
    fn from_cached(cached: &CachedDocument) -> Option<Arc<Self>>;
}

impl RunDocument for RunDetails {
    const KIND: DocumentKind = DocumentKind::RunDetails;

    fn into_cached(doc: Arc<Self>) -> CachedDocument {
        CachedDocument::RunDetails(doc)
    }

    fn from_cached(cached: &CachedDocument) -> Option<Arc<Self>> {
        match cached {
            CachedDocument::RunDetails(doc) => Some(Arc::clone(doc)),
            CachedDocument::RunActions(_) => None,
        }
    }
}

impl RunDocument for RunActionsDocument {
    const KIND: DocumentKind = DocumentKind::RunActions;

    fn into_cached(doc: Arc<Self>) -> CachedDocument {
        CachedDocument::RunActions(doc)
    }

    fn from_cached(cached: &CachedDocument) -> Option<Arc<Self>> {
        match cached {
            CachedDocument::RunActions(doc) => Some(Arc::clone(doc)),
            CachedDocument::RunDetails(_) => None,
        }
    }
}

/// Memoized run documents.
///
/// Not meant to be shared between threads; callers needing that must wrap it
/// in their own lock.
#[derive(Debug, Default)]
pub struct RunCache {
    entries: HashMap<(DocumentKind, RunId), CachedDocument>,
}

impl RunCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached document, fetching it on a miss or when `refresh`
    /// is set.
    ///
    /// A failed fetch is returned as-is and leaves any previous entry intact.
    pub fn get<D, F>(&mut self, run_id: &RunId, refresh: bool, fetch: F) -> Result<Arc<D>>
    where
        D: RunDocument,
        F: FnOnce() -> Result<D>,
    {
        let key = (D::KIND, run_id.clone());
        if !refresh {
            if let Some(doc) = self.entries.get(&key).and_then(D::from_cached) {
                debug!(kind = ?D::KIND, run_id = %run_id, "run cache hit");
                return Ok(doc);
            }
        }

        debug!(kind = ?D::KIND, run_id = %run_id, refresh, "fetching run document");
        let doc = Arc::new(fetch()?);
        self.entries.insert(key, D::into_cached(Arc::clone(&doc)));
        Ok(doc)
    }

    /// Returns a cached document without fetching.
    pub fn peek<D: RunDocument>(&self, run_id: &RunId) -> Option<Arc<D>> {
        self.entries
            .get(&(D::KIND, run_id.clone()))
            .and_then(D::from_cached)
    }

    /// Returns true if a document of `kind` is cached for `run_id`.
    pub fn contains(&self, kind: DocumentKind, run_id: &RunId) -> bool {
        self.entries.contains_key(&(kind, run_id.clone()))
    }

    /// Drops one entry. Returns true if it existed.
    pub fn invalidate(&mut self, kind: DocumentKind, run_id: &RunId) -> bool {
        self.entries.remove(&(kind, run_id.clone())).is_some()
    }

    /// Drops every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of cached documents.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
