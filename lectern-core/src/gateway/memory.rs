//! In-memory gateway (for testing and offline demos)

use super::{BookFilters, BookGateway, BookmarkRecord, GatewayResult, UploadedFile};
use crate::error::GatewayError;
use crate::session::AuthToken;
use crate::types::{Book, BookId};
use async_trait::async_trait;
use std::collections::{BTreeSet, HashMap};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

/// Default page size when no limit is given
const DEFAULT_LIMIT: u32 = 20;

/// Gateway operations, for failure injection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GatewayOp {
    ListBooks,
    GetBook,
    ListBookmarks,
    AddBookmark,
    RemoveBookmark,
    UploadFile,
}

/// A recorded gateway call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayCall {
    ListBooks(BookFilters),
    GetBook(BookId),
    ListBookmarks,
    AddBookmark(BookId),
    RemoveBookmark(BookId),
    UploadFile(String),
}

#[derive(Default)]
struct Inner {
    books: Vec<Book>,
    bookmarks: BTreeSet<BookId>,
    accepted_token: Option<String>,
    failures: HashMap<GatewayOp, GatewayError>,
    latency: Duration,
    query_latency: HashMap<String, Duration>,
    calls: Vec<GatewayCall>,
}

/// Gateway backed by in-process state, with scriptable failures and latency
#[derive(Default)]
pub struct MemoryGateway {
    inner: Mutex<Inner>,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a gateway serving the given books
    pub fn with_books(books: impl IntoIterator<Item = Book>) -> Self {
        let gateway = Self::new();
        gateway.lock().books.extend(books);
        gateway
    }

    pub fn add_book(&self, book: Book) {
        self.lock().books.push(book);
    }

    /// Only accept this token on authenticated calls (any token is accepted by default)
    pub fn require_token(&self, token: impl Into<String>) {
        self.lock().accepted_token = Some(token.into());
    }

    /// Make every call of `op` fail with `error`
    pub fn fail(&self, op: GatewayOp, error: GatewayError) {
        self.lock().failures.insert(op, error);
    }

    /// Stop failing calls of `op`
    pub fn recover(&self, op: GatewayOp) {
        self.lock().failures.remove(&op);
    }

    /// Delay applied to every call
    pub fn set_latency(&self, latency: Duration) {
        self.lock().latency = latency;
    }

    /// Delay applied to list calls searching for exactly `query`
    pub fn set_query_latency(&self, query: impl Into<String>, latency: Duration) {
        self.lock().query_latency.insert(query.into(), latency);
    }

    pub fn seed_bookmark(&self, book_id: BookId) {
        self.lock().bookmarks.insert(book_id);
    }

    pub fn is_bookmarked(&self, book_id: BookId) -> bool {
        self.lock().bookmarks.contains(&book_id)
    }

    /// All calls received so far, in order
    pub fn calls(&self) -> Vec<GatewayCall> {
        self.lock().calls.clone()
    }

    /// Search queries received so far, in order
    pub fn searches(&self) -> Vec<String> {
        self.lock()
            .calls
            .iter()
            .filter_map(|call| match call {
                GatewayCall::ListBooks(filters) => filters.search.clone(),
                _ => None,
            })
            .collect()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Record the call, then wait out latency and apply failure injection
    async fn enter(&self, op: GatewayOp, call: GatewayCall) -> GatewayResult<()> {
        let (delay, failure) = {
            let mut inner = self.lock();
            let delay = match &call {
                GatewayCall::ListBooks(BookFilters {
                    search: Some(query),
                    ..
                }) => inner
                    .query_latency
                    .get(query)
                    .copied()
                    .unwrap_or(inner.latency),
                _ => inner.latency,
            };
            inner.calls.push(call);
            (delay, inner.failures.get(&op).cloned())
        };

        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        match failure {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn authorize(&self, token: &AuthToken) -> GatewayResult<()> {
        match &self.lock().accepted_token {
            Some(accepted) if accepted != token.as_str() => Err(GatewayError::Unauthorized),
            _ => Ok(()),
        }
    }
}

fn matches_search(book: &Book, query: &str) -> bool {
    let query = query.to_lowercase();
    book.title.to_lowercase().contains(&query)
        || book
            .author
            .as_deref()
            .map(|a| a.to_lowercase().contains(&query))
            .unwrap_or(false)
}

#[async_trait]
impl BookGateway for MemoryGateway {
    async fn list_books(&self, filters: &BookFilters) -> GatewayResult<Vec<Book>> {
        self.enter(GatewayOp::ListBooks, GatewayCall::ListBooks(filters.clone()))
            .await?;

        let inner = self.lock();
        let limit = filters.limit.unwrap_or(DEFAULT_LIMIT) as usize;
        // Page 0 is treated as page 1
        let page = filters.page.unwrap_or(1).max(1) as usize;

        Ok(inner
            .books
            .iter()
            .filter(|book| match &filters.search {
                Some(query) => matches_search(book, query),
                None => true,
            })
            .filter(|book| match filters.author_id {
                Some(author_id) => book.author_id == Some(author_id),
                None => true,
            })
            .skip((page - 1) * limit)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn get_book(&self, id: BookId) -> GatewayResult<Book> {
        self.enter(GatewayOp::GetBook, GatewayCall::GetBook(id))
            .await?;

        self.lock()
            .books
            .iter()
            .find(|book| book.id == id)
            .cloned()
            .ok_or_else(|| GatewayError::NotFound(format!("book {}", id)))
    }

    async fn list_bookmarks(&self, token: &AuthToken) -> GatewayResult<Vec<BookmarkRecord>> {
        self.enter(GatewayOp::ListBookmarks, GatewayCall::ListBookmarks)
            .await?;
        self.authorize(token)?;

        Ok(self
            .lock()
            .bookmarks
            .iter()
            .map(|&book_id| BookmarkRecord { book_id })
            .collect())
    }

    async fn add_bookmark(&self, token: &AuthToken, book_id: BookId) -> GatewayResult<()> {
        self.enter(GatewayOp::AddBookmark, GatewayCall::AddBookmark(book_id))
            .await?;
        self.authorize(token)?;
        self.lock().bookmarks.insert(book_id);
        Ok(())
    }

    async fn remove_bookmark(&self, token: &AuthToken, book_id: BookId) -> GatewayResult<()> {
        self.enter(GatewayOp::RemoveBookmark, GatewayCall::RemoveBookmark(book_id))
            .await?;
        self.authorize(token)?;
        self.lock().bookmarks.remove(&book_id);
        Ok(())
    }

    async fn upload_file(
        &self,
        token: &AuthToken,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> GatewayResult<UploadedFile> {
        self.enter(
            GatewayOp::UploadFile,
            GatewayCall::UploadFile(file_name.to_string()),
        )
        .await?;
        self.authorize(token)?;

        Ok(UploadedFile {
            url: format!("memory://uploads/{}?bytes={}", file_name, bytes.len()),
        })
    }
}
