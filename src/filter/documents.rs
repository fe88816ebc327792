//! Documents opened under one backend

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

use lsp_types::Uri;

use crate::filter::error::DocumentTrackingError;

/// Set of documents a backend currently has open
///
/// Entries are added on an accepted `didOpen` and removed on an accepted
/// `didClose`.
#[derive(Debug, Default)]
pub struct TrackedDocuments {
    uris: Mutex<HashSet<Uri>>,
    consistency_faults: AtomicU64,
}

impl TrackedDocuments {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start tracking `uri`; returns false if it was already tracked
    pub fn insert(&self, uri: Uri) -> bool {
        self.uris
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(uri)
    }

    /// Stop tracking `uri`
    ///
    /// Removing a document that was never tracked is a pairing violation; it
    /// is counted and reported, and the set is left unchanged.
    pub fn remove(&self, uri: &Uri) -> Result<(), DocumentTrackingError> {
        let removed = self
            .uris
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(uri);

        if removed {
            Ok(())
        } else {
            self.consistency_faults.fetch_add(1, Ordering::Relaxed);
            Err(DocumentTrackingError::UntrackedClose {
                uri: uri.as_str().to_string(),
            })
        }
    }

    pub fn contains(&self, uri: &Uri) -> bool {
        self.uris
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(uri)
    }

    pub fn len(&self) -> usize {
        self.uris.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of the tracked URIs, in no particular order
    pub fn uris(&self) -> Vec<Uri> {
        self.uris
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .cloned()
            .collect()
    }

    /// Number of closes seen for documents that were not tracked
    pub fn consistency_faults(&self) -> u64 {
        self.consistency_faults.load(Ordering::Relaxed)
    }
}
