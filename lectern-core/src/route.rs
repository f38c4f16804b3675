//! Navigation targets produced by the client components

use crate::types::BookId;
use std::fmt;

/// A page the shell should navigate to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    BookDetail(BookId),
    /// Full search results carrying the literal query
    SearchResults(String),
    SignIn,
    History,
}

impl Route {
    /// Relative page path, as linked from the site root
    pub fn path(&self) -> String {
        match self {
            Route::Home => "index.html".to_string(),
            Route::BookDetail(id) => format!("pages/detail.html?id={}", id),
            Route::SearchResults(query) => format!(
                "pages/categories.html?search={}",
                urlencoding::encode(query)
            ),
            Route::SignIn => "pages/signin.html".to_string(),
            Route::History => "pages/history.html".to_string(),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths() {
        assert_eq!(Route::BookDetail(4).path(), "pages/detail.html?id=4");
        assert_eq!(
            Route::SearchResults("war & peace".to_string()).path(),
            "pages/categories.html?search=war%20%26%20peace"
        );
        assert_eq!(Route::SignIn.to_string(), "pages/signin.html");
    }
}
