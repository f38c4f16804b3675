//! Reading history entry, a projection of a Book at view time

use super::book::{non_empty, Book, BookId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Author shown when the book has none
pub const UNKNOWN_AUTHOR: &str = "Unknown";

/// Cover shown when the book has no thumbnail
pub const PLACEHOLDER_THUMBNAIL: &str = "https://placehold.co/100";

/// Category shown when the book has none
pub const DEFAULT_CATEGORY: &str = "General";

/// A recently viewed book as stored in the local history cache
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub id: BookId,
    pub title: String,
    pub author: String,
    pub thumbnail: String,
    pub category: String,

    /// Informational only; list order is insertion order
    pub viewed_at: DateTime<Utc>,
}

impl HistoryEntry {
    /// Project a book into a history entry, filling placeholders for missing fields
    pub fn from_book(book: &Book, viewed_at: DateTime<Utc>) -> Self {
        Self {
            id: book.id,
            title: book.title.clone(),
            author: non_empty(&book.author).unwrap_or(UNKNOWN_AUTHOR).to_string(),
            thumbnail: non_empty(&book.thumbnail)
                .unwrap_or(PLACEHOLDER_THUMBNAIL)
                .to_string(),
            category: book
                .primary_category()
                .unwrap_or(DEFAULT_CATEGORY)
                .to_string(),
            viewed_at,
        }
    }

    /// Short date label, e.g. "Oct 16, 2026"
    pub fn viewed_on_label(&self) -> String {
        self.viewed_at.format("%b %-d, %Y").to_string()
    }
}
