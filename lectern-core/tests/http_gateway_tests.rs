//! HttpGateway against a local fixture API

use axum::{
    extract::{Path, Query},
    http::{HeaderMap, StatusCode},
    routing::{delete, get, post},
    Json, Router,
};
use lectern_core::error::GatewayError;
use lectern_core::gateway::{BookFilters, BookGateway, HttpGateway};
use lectern_core::session::AuthToken;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::time::Duration;

fn authorized(headers: &HeaderMap) -> Result<(), StatusCode> {
    match headers.get("authorization").and_then(|v| v.to_str().ok()) {
        Some("Bearer good") => Ok(()),
        _ => Err(StatusCode::UNAUTHORIZED),
    }
}

async fn list_books(Query(query): Query<HashMap<String, String>>) -> Json<Value> {
    // Echo the filters back through the title so the test can inspect them
    let echo = format!(
        "search={} limit={}",
        query.get("search").cloned().unwrap_or_default(),
        query.get("limit").cloned().unwrap_or_default()
    );
    Json(json!({
        "data": [
            {"id": 1, "title": echo, "categories": [{"id": 1, "name": "Sci-Fi"}]}
        ]
    }))
}

async fn get_book(Path(id): Path<i64>) -> Result<Json<Value>, StatusCode> {
    if id == 1 {
        Ok(Json(json!({
            "id": 1,
            "title": "Dune",
            "author": "Frank Herbert",
            "file_url": "http://cdn.test/dune.pdf",
            "categories": ["Sci-Fi"]
        })))
    } else {
        Err(StatusCode::NOT_FOUND)
    }
}

async fn list_bookmarks(headers: HeaderMap) -> Result<Json<Value>, StatusCode> {
    authorized(&headers)?;
    Ok(Json(json!([{"book_id": "1"}, {"book_id": 2}])))
}

async fn add_bookmark(
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Result<StatusCode, StatusCode> {
    authorized(&headers)?;
    if body["book_id"] == 3 {
        return Err(StatusCode::INTERNAL_SERVER_ERROR);
    }
    Ok(StatusCode::CREATED)
}

async fn remove_bookmark(
    headers: HeaderMap,
    Path(_id): Path<i64>,
) -> Result<StatusCode, StatusCode> {
    authorized(&headers)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn upload(headers: HeaderMap) -> Result<Json<Value>, StatusCode> {
    authorized(&headers)?;
    Ok(Json(json!({"file_url": "https://cdn.test/uploaded.pdf"})))
}

/// Start the fixture API and return its base URL
async fn spawn_fixture() -> String {
    let app = Router::new()
        .route("/api/books", get(list_books))
        .route("/api/books/:id", get(get_book))
        .route("/api/bookmarks", get(list_bookmarks).post(add_bookmark))
        .route("/api/bookmarks/:id", delete(remove_bookmark))
        .route("/api/upload", post(upload));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind fixture");
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}/api/", addr)
}

async fn gateway() -> HttpGateway {
    let base = spawn_fixture().await;
    HttpGateway::new(base, Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn test_list_books_sends_filters() {
    let gateway = gateway().await;

    let books = gateway
        .list_books(&BookFilters::new().search("war & peace").limit(5))
        .await
        .unwrap();

    assert_eq!(books.len(), 1);
    assert_eq!(books[0].title, "search=war & peace limit=5");
    assert_eq!(books[0].primary_category(), Some("Sci-Fi"));
}

#[tokio::test]
async fn test_get_book_and_not_found() {
    let gateway = gateway().await;

    let book = gateway.get_book(1).await.unwrap();
    assert_eq!(book.author.as_deref(), Some("Frank Herbert"));
    assert_eq!(book.primary_category(), Some("Sci-Fi"));

    let err = gateway.get_book(2).await.unwrap_err();
    assert_eq!(err, GatewayError::NotFound("book 2".to_string()));
}

#[tokio::test]
async fn test_bookmarks_require_token() {
    let gateway = gateway().await;

    let err = gateway
        .list_bookmarks(&AuthToken::new("bad"))
        .await
        .unwrap_err();
    assert_eq!(err, GatewayError::Unauthorized);

    let bookmarks = gateway.list_bookmarks(&AuthToken::new("good")).await.unwrap();
    let ids: Vec<_> = bookmarks.iter().map(|b| b.book_id).collect();
    assert_eq!(ids, vec![1, 2]);
}

#[tokio::test]
async fn test_bookmark_writes() {
    let gateway = gateway().await;
    let token = AuthToken::new("good");

    gateway.add_bookmark(&token, 1).await.unwrap();
    gateway.remove_bookmark(&token, 1).await.unwrap();

    let err = gateway.add_bookmark(&token, 3).await.unwrap_err();
    assert!(matches!(err, GatewayError::Remote(_)));
}

#[tokio::test]
async fn test_upload_reads_file_url() {
    let gateway = gateway().await;

    let uploaded = gateway
        .upload_file(&AuthToken::new("good"), "dune.pdf", b"%PDF-1.4".to_vec())
        .await
        .unwrap();
    assert_eq!(uploaded.url, "https://cdn.test/uploaded.pdf");
}

#[tokio::test]
async fn test_unreachable_server_is_remote_error() {
    // Bind then drop to get a port nobody listens on
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let gateway = HttpGateway::new(format!("http://{}", addr), Duration::from_secs(2)).unwrap();
    let err = gateway.get_book(1).await.unwrap_err();
    assert!(matches!(err, GatewayError::Remote(_)));
}
