//! HTTP implementation of the remote gateway

use super::{BookFilters, BookGateway, BookmarkRecord, GatewayResult, UploadedFile};
use crate::error::GatewayError;
use crate::session::AuthToken;
use crate::types::{Book, BookId};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;

/// Book list payloads come wrapped in `books` or `data`, or bare
#[derive(Deserialize)]
#[serde(untagged)]
enum BookListPayload {
    Bare(Vec<Book>),
    Wrapped {
        #[serde(default, alias = "data")]
        books: Vec<Book>,
    },
}

#[derive(Deserialize)]
#[serde(untagged)]
enum BookPayload {
    Bare(Book),
    Wrapped {
        #[serde(alias = "data")]
        book: Book,
    },
}

#[derive(Deserialize)]
#[serde(untagged)]
enum UploadPayload {
    Url(String),
    Object {
        url: Option<String>,
        file_url: Option<String>,
    },
}

/// Gateway talking JSON to the book API
pub struct HttpGateway {
    client: Client,
    base_url: String,
}

impl HttpGateway {
    /// Create a gateway for `base_url` with a request timeout
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> GatewayResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GatewayError::Remote(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self::with_client(client, base_url))
    }

    /// Create a gateway with a preconfigured client
    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Send a request and turn non-success statuses into gateway errors
    async fn send(&self, request: RequestBuilder) -> GatewayResult<Response> {
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let detail = response.text().await.unwrap_or_default();
        tracing::debug!("Gateway call failed with {}: {}", status, detail);
        Err(GatewayError::from_status(status, detail))
    }

    async fn json<T: DeserializeOwned>(&self, request: RequestBuilder) -> GatewayResult<T> {
        let response = self.send(request).await?;
        response
            .json()
            .await
            .map_err(|e| GatewayError::Remote(format!("invalid response body: {}", e)))
    }
}

#[async_trait]
impl BookGateway for HttpGateway {
    async fn list_books(&self, filters: &BookFilters) -> GatewayResult<Vec<Book>> {
        let request = self.client.get(self.url("books")).query(filters);
        let payload: BookListPayload = self.json(request).await?;
        Ok(match payload {
            BookListPayload::Bare(books) | BookListPayload::Wrapped { books } => books,
        })
    }

    async fn get_book(&self, id: BookId) -> GatewayResult<Book> {
        let request = self.client.get(self.url(&format!("books/{}", id)));
        let payload: BookPayload = self.json(request).await.map_err(|e| match e {
            GatewayError::NotFound(_) => GatewayError::NotFound(format!("book {}", id)),
            other => other,
        })?;
        Ok(match payload {
            BookPayload::Bare(book) | BookPayload::Wrapped { book } => book,
        })
    }

    async fn list_bookmarks(&self, token: &AuthToken) -> GatewayResult<Vec<BookmarkRecord>> {
        let request = self
            .client
            .get(self.url("bookmarks"))
            .bearer_auth(token.as_str());
        self.json(request).await
    }

    async fn add_bookmark(&self, token: &AuthToken, book_id: BookId) -> GatewayResult<()> {
        let request = self
            .client
            .post(self.url("bookmarks"))
            .bearer_auth(token.as_str())
            .json(&serde_json::json!({ "book_id": book_id }));
        self.send(request).await?;
        Ok(())
    }

    async fn remove_bookmark(&self, token: &AuthToken, book_id: BookId) -> GatewayResult<()> {
        let request = self
            .client
            .delete(self.url(&format!("bookmarks/{}", book_id)))
            .bearer_auth(token.as_str());
        self.send(request).await?;
        Ok(())
    }

    async fn upload_file(
        &self,
        token: &AuthToken,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> GatewayResult<UploadedFile> {
        let part = reqwest::multipart::Part::bytes(bytes).file_name(file_name.to_string());
        let form = reqwest::multipart::Form::new().part("file", part);
        let request = self
            .client
            .post(self.url("upload"))
            .bearer_auth(token.as_str())
            .multipart(form);

        let url = match self.json::<UploadPayload>(request).await? {
            UploadPayload::Url(url) => Some(url),
            UploadPayload::Object { url, file_url } => url.or(file_url),
        };
        url.map(|url| UploadedFile { url })
            .ok_or_else(|| GatewayError::Remote("upload response has no url".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joining() {
        let gateway = HttpGateway::with_client(Client::new(), "https://api.example.com/v1/");
        assert_eq!(gateway.base_url(), "https://api.example.com/v1");
        assert_eq!(gateway.url("/books/3"), "https://api.example.com/v1/books/3");
    }

    #[test]
    fn test_list_payload_shapes() {
        let wrapped: BookListPayload =
            serde_json::from_str(r#"{"data": [{"id": 1, "title": "A"}]}"#).unwrap();
        let bare: BookListPayload = serde_json::from_str(r#"[{"id": 2}]"#).unwrap();
        let empty: BookListPayload = serde_json::from_str(r#"{"total": 0}"#).unwrap();

        assert!(matches!(wrapped, BookListPayload::Wrapped { books } if books[0].id == 1));
        assert!(matches!(bare, BookListPayload::Bare(books) if books[0].id == 2));
        assert!(matches!(empty, BookListPayload::Wrapped { books } if books.is_empty()));
    }

    #[test]
    fn test_upload_payload_shapes() {
        let plain: UploadPayload = serde_json::from_str(r#""https://cdn/x.pdf""#).unwrap();
        let object: UploadPayload =
            serde_json::from_str(r#"{"file_url": "https://cdn/y.pdf"}"#).unwrap();
        assert!(matches!(plain, UploadPayload::Url(u) if u.ends_with("x.pdf")));
        assert!(
            matches!(object, UploadPayload::Object { url: None, file_url: Some(u) } if u.ends_with("y.pdf"))
        );
    }
}
