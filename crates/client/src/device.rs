//! Local Device Store.
//!
//! A single named slot holding the JSON-encoded guest wishlist, backed by
//! a file path. Reads degrade to an empty list when the slot is absent or
//! unparseable; writes are a full overwrite of the list, never a partial
//! patch. The slot is shared across processes without locking
//! (last-writer-wins); callers re-read on externally observed changes.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::warn;

use saltmarsh_core::WishlistItem;

use crate::error::SyncError;

/// Logical name of the wishlist slot, kept for parity with the browser
/// storage key the store UI uses.
pub const WISHLIST_STORAGE_KEY: &str = "wishlist_items_v1";

/// File-backed device storage for the guest wishlist.
#[derive(Debug, Clone)]
pub struct DeviceStore {
    path: PathBuf,
}

impl DeviceStore {
    /// Create a store over the given slot path.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The slot path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the wishlist snapshot.
    ///
    /// A missing slot or a corrupt snapshot degrades to an empty list;
    /// corruption is logged and never surfaced to the caller.
    #[must_use]
    pub fn read(&self) -> Vec<WishlistItem> {
        match self.read_strict() {
            Ok(items) => items,
            Err(SyncError::LocalStoreCorrupt(reason)) => {
                warn!(slot = WISHLIST_STORAGE_KEY, %reason, "discarding corrupt wishlist snapshot");
                Vec::new()
            }
            Err(_) => Vec::new(),
        }
    }

    /// Overwrite the slot with the given list.
    ///
    /// Duplicate product IDs are dropped (first occurrence wins) so the
    /// wishlist uniqueness invariant holds even against snapshots written
    /// by other writers.
    ///
    /// # Errors
    ///
    /// Returns an error when encoding or the filesystem write fails.
    pub fn write(&self, items: &[WishlistItem]) -> Result<(), SyncError> {
        let mut seen = HashSet::new();
        let deduped: Vec<&WishlistItem> = items
            .iter()
            .filter(|item| seen.insert(item.product_id.clone()))
            .collect();

        let encoded = serde_json::to_vec(&deduped)?;
        std::fs::write(&self.path, encoded)?;
        Ok(())
    }

    /// Read without the corruption fallback.
    fn read_strict(&self) -> Result<Vec<WishlistItem>, SyncError> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };

        serde_json::from_str(&raw).map_err(|e| SyncError::LocalStoreCorrupt(e.to_string()))
    }
}
