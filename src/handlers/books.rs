//! Book CRUD handlers: create, list, read, update, delete.

use crate::error::AppError;
use crate::model::BookId;
use crate::response::{self, Pagination};
use crate::service::BookValidator;
use crate::state::AppState;
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::Value;
use std::collections::HashMap;

fn parse_id(id_str: &str) -> Result<BookId, AppError> {
    id_str.parse().map_err(|_| AppError::InvalidId)
}

fn json_body(body: Result<Json<Value>, JsonRejection>) -> Result<Value, AppError> {
    body.map(|Json(v)| v).map_err(|rejection| {
        tracing::debug!(%rejection, "unreadable request body");
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            AppError::PayloadTooLarge
        } else {
            AppError::validation("Request body must be valid JSON")
        }
    })
}

pub async fn create(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let body = json_body(body)?;
    let new_book = BookValidator::validate_create(&body)?;
    let book = state.books.create(new_book).await?;
    tracing::info!(id = book.id, "book created");
    Ok(response::created(book, "Book created successfully"))
}

pub async fn list(
    State(state): State<AppState>,
    params: Result<Query<HashMap<String, String>>, QueryRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Query(params) = params.map_err(|rejection| {
        tracing::debug!(%rejection, "unreadable query string");
        AppError::validation("Query string is malformed")
    })?;
    let filters = BookValidator::validate_filters(&params)?;
    let page = state.books.find_many(&filters).await?;
    let pagination = Pagination::new(page.total, filters.limit, filters.page_num);
    Ok(response::ok_page(page.books, pagination, "Books retrieved successfully"))
}

pub async fn read(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id_str)?;
    let book = state.books.find_by_id(id).await?.ok_or(AppError::NotFound)?;
    Ok(response::ok(book, "Book retrieved successfully"))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id_str)?;
    let body = json_body(body)?;
    let changes = BookValidator::validate_update(&body)?;
    let book = state.books.update(id, changes).await?.ok_or(AppError::NotFound)?;
    tracing::info!(id, "book updated");
    Ok(response::ok(book, "Book updated successfully"))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id_str)?;
    if !state.books.delete(id).await? {
        return Err(AppError::NotFound);
    }
    tracing::info!(id, "book deleted");
    Ok(response::ok_empty("Book deleted successfully"))
}
