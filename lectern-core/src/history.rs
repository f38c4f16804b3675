//! Bounded, deduplicated reading history kept in the local store
//!
//! The list lives under [`keys::READ_HISTORY`] as one JSON array, newest first.
//! This module is the only writer of that key.

use crate::error::{ClientError, StoreError};
use crate::storage::{keys, LocalStore, StoreResult};
use crate::types::{Book, BookId, HistoryEntry};
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Maximum number of entries kept
pub const HISTORY_LIMIT: usize = 20;

/// Recently viewed books, most recent first
#[derive(Clone)]
pub struct HistoryCache {
    store: Arc<dyn LocalStore>,
}

impl HistoryCache {
    pub fn new(store: Arc<dyn LocalStore>) -> Self {
        Self { store }
    }

    /// Record that `book` was just viewed
    pub fn record_view(&self, book: &Book) -> HistoryEntry {
        self.record_view_at(book, Utc::now())
    }

    /// Record a view at an explicit time
    ///
    /// Any existing entry for the same book is moved to the front; the oldest
    /// entry is evicted past [`HISTORY_LIMIT`]. A failed store write is logged
    /// and dropped since the view itself already succeeded.
    pub fn record_view_at(&self, book: &Book, viewed_at: DateTime<Utc>) -> HistoryEntry {
        let entry = HistoryEntry::from_book(book, viewed_at);

        let mut entries = self.list();
        entries.retain(|e| e.id != entry.id);
        entries.insert(0, entry.clone());
        entries.truncate(HISTORY_LIMIT);

        if let Err(e) = self.save(&entries) {
            tracing::warn!("Failed to persist reading history: {}", e);
        }
        entry
    }

    /// Entries, most recent first; missing or corrupt data reads as empty
    pub fn list(&self) -> Vec<HistoryEntry> {
        match self.load() {
            Ok(entries) => entries,
            Err(e) => {
                tracing::debug!("Treating reading history as empty: {}", e);
                Vec::new()
            }
        }
    }

    /// Remove the entry for `id`, if present
    pub fn remove(&self, id: BookId) -> StoreResult<()> {
        let mut entries = self.list();
        let before = entries.len();
        entries.retain(|e| e.id != id);
        if entries.len() == before {
            return Ok(());
        }
        self.save(&entries)
    }

    /// Forget the whole history
    pub fn clear(&self) -> StoreResult<()> {
        self.store.remove(keys::READ_HISTORY)
    }

    fn load(&self) -> Result<Vec<HistoryEntry>, ClientError> {
        let Some(raw) = self.store.get(keys::READ_HISTORY)? else {
            return Ok(Vec::new());
        };
        serde_json::from_str(&raw).map_err(|e| ClientError::MalformedLocalData(e.to_string()))
    }

    fn save(&self, entries: &[HistoryEntry]) -> StoreResult<()> {
        let raw = serde_json::to_string(entries).map_err(StoreError::from)?;
        self.store.set(keys::READ_HISTORY, raw)
    }
}
