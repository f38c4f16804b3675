//! Core data types shared by the client components

mod book;
mod history;

pub use book::{Book, BookId, CategoryRef};
pub(crate) use book::non_empty;
pub use history::{HistoryEntry, DEFAULT_CATEGORY, PLACEHOLDER_THUMBNAIL, UNKNOWN_AUTHOR};
