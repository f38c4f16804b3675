//! The Book type as returned by the remote API

use serde::{Deserialize, Deserializer, Serialize};

/// Remote identifier of a book
pub type BookId = i64;

/// A book record owned by the remote API
/// Read-only to the client; fetched per view and never persisted as-is
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Book {
    pub id: BookId,

    #[serde(default)]
    pub title: String,

    pub author: Option<String>,

    /// Uploader's user id
    pub author_id: Option<i64>,

    pub description: Option<String>,

    /// Cover image URL
    pub thumbnail: Option<String>,

    #[serde(default, deserialize_with = "null_as_empty")]
    pub categories: Vec<CategoryRef>,

    /// Location of the book's document (usually a PDF)
    pub file_url: Option<String>,
}

/// A category reference; the API returns either objects or bare names
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum CategoryRef {
    Named {
        #[serde(default)]
        id: Option<i64>,
        name: String,
    },
    Plain(String),
    Id(i64),
}

impl CategoryRef {
    /// Display name, if the reference carries one
    pub fn name(&self) -> Option<&str> {
        match self {
            CategoryRef::Named { name, .. } | CategoryRef::Plain(name) => {
                Some(name.as_str()).filter(|n| !n.is_empty())
            }
            CategoryRef::Id(_) => None,
        }
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<CategoryRef>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<CategoryRef>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Treat empty strings like missing values
pub(crate) fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.trim().is_empty())
}

impl Book {
    /// Create a book with only the required fields
    pub fn new(id: BookId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            author: None,
            author_id: None,
            description: None,
            thumbnail: None,
            categories: Vec::new(),
            file_url: None,
        }
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    pub fn with_thumbnail(mut self, thumbnail: impl Into<String>) -> Self {
        self.thumbnail = Some(thumbnail.into());
        self
    }

    pub fn with_category(mut self, name: impl Into<String>) -> Self {
        self.categories.push(CategoryRef::Named {
            id: None,
            name: name.into(),
        });
        self
    }

    pub fn with_file_url(mut self, url: impl Into<String>) -> Self {
        self.file_url = Some(url.into());
        self
    }

    /// Name of the first category, if any
    pub fn primary_category(&self) -> Option<&str> {
        self.categories.first().and_then(CategoryRef::name)
    }

    /// All category names, in API order
    pub fn category_names(&self) -> Vec<&str> {
        self.categories.iter().filter_map(CategoryRef::name).collect()
    }
}
