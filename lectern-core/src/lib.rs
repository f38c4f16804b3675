//! Lectern Core Library
//!
//! This crate provides the client-side interaction state for the Lectern reading platform.
//! Every behavior overlays asynchronous calls to a remote book API on synchronous,
//! persisted local state: the reading history cache, optimistic favorite toggles,
//! debounced search suggestions and the PDF preview loader.

pub mod catalog;
pub mod config;
pub mod error;
pub mod favorites;
pub mod gateway;
pub mod history;
pub mod preview;
pub mod route;
pub mod search;
pub mod session;
pub mod storage;
pub mod types;

pub use config::ClientConfig;
pub use error::{ClientError, GatewayError, Result, StoreError};
pub use favorites::{FavoriteController, FavoriteState};
pub use gateway::{BookGateway, HttpGateway, MemoryGateway};
pub use history::HistoryCache;
pub use preview::{PreviewSession, ViewerState};
pub use route::Route;
pub use search::{SearchSession, SuggestionPipeline, SuggestionView};
pub use session::Session;
pub use storage::{FileStore, LocalStore, MemoryStore};
pub use types::{Book, BookId, CategoryRef, HistoryEntry};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_book_creation() {
        let book = Book::new(7, "Test Book");
        assert_eq!(book.id, 7);
        assert_eq!(book.title, "Test Book");
        assert!(book.categories.is_empty());
    }
}
