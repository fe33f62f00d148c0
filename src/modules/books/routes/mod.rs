//! HTTP handlers for `/books`.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    Json,
};
use lectern_http::AppError;
use lectern_telemetry::observe;
use serde::{Deserialize, Serialize};

use crate::catalog::{Book, BookId, BookPatch, NewBook, RankedBook, DEFAULT_TOP_LIMIT};
use crate::modules::{json_body, path_param, query_params, MessageResponse};

use super::BooksState;

#[derive(Debug, Default, Deserialize)]
pub struct GenreQuery {
    pub genre: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TopQuery {
    pub limit: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct BooksResponse {
    pub books: Vec<Book>,
}

#[derive(Debug, Serialize)]
pub struct BookResponse {
    pub book: Book,
}

#[derive(Debug, Serialize)]
pub struct BookCreatedResponse {
    pub message: &'static str,
    pub book_id: BookId,
}

#[derive(Debug, Serialize)]
pub struct TopBooksResponse {
    pub top_books: Vec<RankedBook>,
}

/// GET /books?genre=
pub async fn list_books(
    State(state): State<BooksState>,
    query: Result<Query<GenreQuery>, QueryRejection>,
) -> Result<Json<BooksResponse>, AppError> {
    let Query(query) = query_params(query)?;
    // An empty genre means no filter.
    let genre = query.genre.filter(|genre| !genre.is_empty());

    let books = observe("books.list", state.catalog.list_books(genre.as_deref())).await?;
    Ok(Json(BooksResponse { books }))
}

/// GET /books/{id}
pub async fn get_book(
    State(state): State<BooksState>,
    id: Result<Path<BookId>, PathRejection>,
) -> Result<Json<BookResponse>, AppError> {
    let Path(id) = path_param(id)?;
    let book = observe("books.get", state.catalog.get_book(id)).await?;
    Ok(Json(BookResponse { book }))
}

/// POST /books
pub async fn add_book(
    State(state): State<BooksState>,
    payload: Result<Json<NewBook>, JsonRejection>,
) -> Result<Json<BookCreatedResponse>, AppError> {
    let Json(new_book) = json_body(payload)?;

    let book = observe("books.create", state.catalog.create_book(new_book)).await?;
    Ok(Json(BookCreatedResponse {
        message: "Book added successfully",
        book_id: book.id,
    }))
}

/// PUT /books/{id}
pub async fn update_book(
    State(state): State<BooksState>,
    id: Result<Path<BookId>, PathRejection>,
    payload: Result<Json<BookPatch>, JsonRejection>,
) -> Result<Json<MessageResponse>, AppError> {
    let Path(id) = path_param(id)?;
    let Json(patch) = json_body(payload)?;

    observe("books.update", state.catalog.update_book(id, patch)).await?;
    Ok(Json(MessageResponse::new("Book updated successfully")))
}

/// DELETE /books/{id}
pub async fn delete_book(
    State(state): State<BooksState>,
    id: Result<Path<BookId>, PathRejection>,
) -> Result<Json<MessageResponse>, AppError> {
    let Path(id) = path_param(id)?;
    observe("books.delete", state.catalog.delete_book(id)).await?;
    Ok(Json(MessageResponse::new("Book deleted successfully")))
}

/// GET /books/top?limit=
pub async fn top_books(
    State(state): State<BooksState>,
    query: Result<Query<TopQuery>, QueryRejection>,
) -> Result<Json<TopBooksResponse>, AppError> {
    let Query(query) = query_params(query)?;
    let limit = query.limit.unwrap_or(DEFAULT_TOP_LIMIT);

    let top_books = observe("books.top", state.ranking.top_books(limit)).await?;
    Ok(Json(TopBooksResponse { top_books }))
}
