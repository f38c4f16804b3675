//! Catalog and detail view models
//!
//! Read paths only: every failure degrades to an empty section or a not-found
//! view and is logged, never propagated to the page shell.

use crate::gateway::{BookFilters, BookGateway};
use crate::history::HistoryCache;
use crate::preview::{PreviewSession, ViewerStrategy};
use crate::types::{non_empty, Book, BookId, DEFAULT_CATEGORY};
use serde::Serialize;

/// New releases shown on the home page
pub const NEW_RELEASES_LIMIT: u32 = 10;

/// Popular books shown on the home page
pub const POPULAR_LIMIT: u32 = 8;

/// Upper bound when listing an author's own books
pub const AUTHOR_SHELF_LIMIT: u32 = 100;

pub const UNTITLED: &str = "Untitled";
pub const UNKNOWN_AUTHOR_LABEL: &str = "Unknown Author";
pub const NO_DESCRIPTION: &str = "No description available for this title.";
pub const COVER_PLACEHOLDER: &str = "https://placehold.co/300x450/112d4e/FFF?text=No+Cover";

/// Sections of the home page
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HomeFeed {
    pub new_releases: Vec<Book>,
    pub popular: Vec<Book>,
}

/// Load the home page sections; each degrades to empty on its own
pub async fn load_home(gateway: &dyn BookGateway) -> HomeFeed {
    let new_releases = list_or_empty(
        gateway,
        BookFilters::new().page(1).limit(NEW_RELEASES_LIMIT),
        "new releases",
    )
    .await;
    // Popular is simply the next page of the catalog
    let popular = list_or_empty(
        gateway,
        BookFilters::new().page(2).limit(POPULAR_LIMIT),
        "popular books",
    )
    .await;

    HomeFeed {
        new_releases,
        popular,
    }
}

/// Books uploaded by `author_id`
///
/// The filter is also applied locally since servers may ignore it.
pub async fn load_author_shelf(gateway: &dyn BookGateway, author_id: i64) -> Vec<Book> {
    list_or_empty(
        gateway,
        BookFilters::new().author(author_id).limit(AUTHOR_SHELF_LIMIT),
        "author shelf",
    )
    .await
    .into_iter()
    .filter(|book| book.author_id == Some(author_id))
    .collect()
}

async fn list_or_empty(gateway: &dyn BookGateway, filters: BookFilters, what: &str) -> Vec<Book> {
    match gateway.list_books(&filters).await {
        Ok(books) => books,
        Err(e) => {
            tracing::error!("Failed to load {}: {}", what, e);
            Vec::new()
        }
    }
}

/// Display-ready detail page
#[derive(Debug, Clone)]
pub struct BookDetail {
    pub book: Book,
    pub title: String,
    pub author: String,
    pub description: String,
    pub cover_url: String,
    /// Category badges; `["General"]` when the book has none
    pub genres: Vec<String>,
    pub preview: PreviewSession,
}

impl BookDetail {
    fn from_book(book: Book, strategy: ViewerStrategy) -> Self {
        let genres: Vec<String> = match book.category_names() {
            names if names.is_empty() => vec![DEFAULT_CATEGORY.to_string()],
            names => names.into_iter().map(str::to_string).collect(),
        };

        Self {
            title: match book.title.trim() {
                "" => UNTITLED.to_string(),
                title => title.to_string(),
            },
            author: non_empty(&book.author)
                .unwrap_or(UNKNOWN_AUTHOR_LABEL)
                .to_string(),
            description: non_empty(&book.description)
                .unwrap_or(NO_DESCRIPTION)
                .to_string(),
            cover_url: non_empty(&book.thumbnail)
                .unwrap_or(COVER_PLACEHOLDER)
                .to_string(),
            genres,
            preview: PreviewSession::open(book.file_url.as_deref(), strategy),
            book,
        }
    }

    /// Whether a download link should be offered
    pub fn downloadable(&self) -> bool {
        self.preview.source_url().is_some()
    }
}

/// Outcome of opening a detail page
#[derive(Debug, Clone)]
pub enum DetailView {
    Found(Box<BookDetail>),
    NotFound { id: BookId },
}

/// Open the detail page for `id`
///
/// On success the view is recorded in the reading history.
pub async fn load_detail(
    gateway: &dyn BookGateway,
    history: &HistoryCache,
    id: BookId,
    strategy: ViewerStrategy,
) -> DetailView {
    match gateway.get_book(id).await {
        Ok(book) => {
            let detail = BookDetail::from_book(book, strategy);
            history.record_view(&detail.book);
            DetailView::Found(Box::new(detail))
        }
        Err(e) => {
            tracing::error!("Failed to load book {}: {}", id, e);
            DetailView::NotFound { id }
        }
    }
}
