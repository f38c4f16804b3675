//! Reading history invariants
//!
//! Property tests drive arbitrary view sequences through the cache and compare
//! against a simple recency model.

use lectern_core::history::HISTORY_LIMIT;
use lectern_core::storage::{keys, FileStore, LocalStore, MemoryStore};
use lectern_core::{Book, BookId, HistoryCache};
use proptest::prelude::*;
use std::collections::HashSet;
use std::sync::Arc;
use tempfile::TempDir;

fn book(id: BookId) -> Book {
    Book::new(id, format!("Book {}", id)).with_author("Someone")
}

fn ids(cache: &HistoryCache) -> Vec<BookId> {
    cache.list().iter().map(|e| e.id).collect()
}

/// Distinct ids ordered by their last view, newest first, capped at the limit
fn recency_model(views: &[BookId]) -> Vec<BookId> {
    let mut seen = HashSet::new();
    views
        .iter()
        .rev()
        .filter(|id| seen.insert(**id))
        .take(HISTORY_LIMIT)
        .copied()
        .collect()
}

proptest! {
    #[test]
    fn prop_history_is_bounded_unique_and_recent_first(
        views in proptest::collection::vec(0i64..40, 0..120)
    ) {
        let cache = HistoryCache::new(Arc::new(MemoryStore::new()));
        for id in &views {
            cache.record_view(&book(*id));
        }

        let listed = ids(&cache);
        let unique: HashSet<_> = listed.iter().collect();
        prop_assert_eq!(unique.len(), listed.len());
        prop_assert!(listed.len() <= HISTORY_LIMIT);
        prop_assert_eq!(listed, recency_model(&views));
    }

    #[test]
    fn prop_revisit_keeps_count(
        views in proptest::collection::vec(0i64..15, 1..40),
        pick in any::<proptest::sample::Index>()
    ) {
        let cache = HistoryCache::new(Arc::new(MemoryStore::new()));
        for id in &views {
            cache.record_view(&book(*id));
        }

        let before = ids(&cache);
        let revisit = before[pick.index(before.len())];
        cache.record_view(&book(revisit));

        let after = ids(&cache);
        prop_assert_eq!(after.len(), before.len());
        prop_assert_eq!(after[0], revisit);
    }
}

#[test]
fn test_end_to_end_scenario() {
    let cache = HistoryCache::new(Arc::new(MemoryStore::new()));
    cache.record_view(&book(1));
    cache.record_view(&book(2));
    cache.record_view(&book(1));

    let entries = cache.list();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].id, 1);
    assert_eq!(entries[1].id, 2);
}

#[test]
fn test_twenty_first_book_drops_tail_only() {
    let cache = HistoryCache::new(Arc::new(MemoryStore::new()));
    for id in 1..=20 {
        cache.record_view(&book(id));
    }
    let before = ids(&cache);
    assert_eq!(before.last(), Some(&1));

    cache.record_view(&book(21));
    let after = ids(&cache);

    assert_eq!(after.len(), HISTORY_LIMIT);
    assert_eq!(after[0], 21);
    assert_eq!(&after[1..], &before[..19]);
}

#[test]
fn test_history_persists_in_file_store() {
    let dir = TempDir::new().unwrap();
    {
        let store = Arc::new(FileStore::open(dir.path()).unwrap());
        let cache = HistoryCache::new(store);
        cache.record_view(&book(8));
        cache.record_view(&book(9));
    }

    let store = Arc::new(FileStore::open(dir.path()).unwrap());
    let raw = store.get(keys::READ_HISTORY).unwrap().unwrap();
    let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(json[0]["id"], 9);
    assert_eq!(json[0]["author"], "Someone");
    assert!(json[0]["viewedAt"].is_string());

    let cache = HistoryCache::new(store);
    assert_eq!(ids(&cache), vec![9, 8]);
}
