//! Remote gateway abstraction
//!
//! The remote book API is an external collaborator; this module only fixes the
//! interface the client needs from it.

mod http;
mod memory;

pub use http::HttpGateway;
pub use memory::{GatewayCall, GatewayOp, MemoryGateway};

use crate::error::GatewayError;
use crate::session::AuthToken;
use crate::types::{Book, BookId};
use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};

/// Result type for gateway calls
pub type GatewayResult<T> = std::result::Result<T, GatewayError>;

/// Filters for listing books
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BookFilters {
    /// Page number (1-indexed)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,

    /// Page size
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub author_id: Option<i64>,
}

impl BookFilters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn search(mut self, query: impl Into<String>) -> Self {
        self.search = Some(query.into());
        self
    }

    pub fn author(mut self, author_id: i64) -> Self {
        self.author_id = Some(author_id);
        self
    }
}

/// A bookmark relation as listed by the API
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct BookmarkRecord {
    #[serde(deserialize_with = "loose_id")]
    pub book_id: BookId,
}

/// Result of a file upload
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UploadedFile {
    pub url: String,
}

/// Abstract remote gateway
#[async_trait]
pub trait BookGateway: Send + Sync {
    /// List books matching the filters, in server order
    async fn list_books(&self, filters: &BookFilters) -> GatewayResult<Vec<Book>>;

    /// Fetch one book; `NotFound` if absent
    async fn get_book(&self, id: BookId) -> GatewayResult<Book>;

    /// List the signed-in user's bookmarks
    async fn list_bookmarks(&self, token: &AuthToken) -> GatewayResult<Vec<BookmarkRecord>>;

    /// Bookmark a book; idempotent from the caller's point of view
    async fn add_bookmark(&self, token: &AuthToken, book_id: BookId) -> GatewayResult<()>;

    /// Remove a bookmark; idempotent from the caller's point of view
    async fn remove_bookmark(&self, token: &AuthToken, book_id: BookId) -> GatewayResult<()>;

    /// Upload a file and return its public URL
    async fn upload_file(
        &self,
        token: &AuthToken,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> GatewayResult<UploadedFile>;
}

/// Ids sometimes arrive as strings
fn loose_id<'de, D>(deserializer: D) -> Result<BookId, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Number(BookId),
        Text(String),
    }

    match RawId::deserialize(deserializer)? {
        RawId::Number(id) => Ok(id),
        RawId::Text(text) => text.trim().parse().map_err(serde::de::Error::custom),
    }
}
