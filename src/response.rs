//! Standard response envelope helpers.

use axum::{http::StatusCode, Json};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;

/// Uniform wrapper for every response body.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
}

impl<T> Envelope<T> {
    pub fn success(data: Option<T>, message: impl Into<String>) -> Self {
        Envelope {
            success: true,
            data,
            message: Some(message.into()),
            error: None,
            timestamp: timestamp(),
            pagination: None,
        }
    }

    pub fn failure(error: impl Into<String>, message: impl Into<String>) -> Self {
        Envelope {
            success: false,
            data: None,
            message: Some(message.into()),
            error: Some(error.into()),
            timestamp: timestamp(),
            pagination: None,
        }
    }

    pub fn with_pagination(mut self, pagination: Pagination) -> Self {
        self.pagination = Some(pagination);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub total: u64,
    pub limit: u32,
    pub page_num: u32,
    #[serde(rename = "hasNext")]
    pub has_next: bool,
    #[serde(rename = "hasPrev")]
    pub has_prev: bool,
}

impl Pagination {
    pub fn new(total: u64, limit: u32, page_num: u32) -> Self {
        let total_pages = if limit == 0 { 0 } else { total.div_ceil(u64::from(limit)) };
        Pagination {
            total,
            limit,
            page_num,
            has_next: u64::from(page_num) < total_pages,
            has_prev: page_num > 1,
        }
    }
}

/// ISO-8601 UTC with millisecond precision.
pub fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn ok<T: Serialize>(data: T, message: &str) -> (StatusCode, Json<Envelope<T>>) {
    (StatusCode::OK, Json(Envelope::success(Some(data), message)))
}

pub fn created<T: Serialize>(data: T, message: &str) -> (StatusCode, Json<Envelope<T>>) {
    (StatusCode::CREATED, Json(Envelope::success(Some(data), message)))
}

pub fn ok_empty(message: &str) -> (StatusCode, Json<Envelope<()>>) {
    (StatusCode::OK, Json(Envelope::success(None, message)))
}

pub fn ok_page<T: Serialize>(
    data: Vec<T>,
    pagination: Pagination,
    message: &str,
) -> (StatusCode, Json<Envelope<Vec<T>>>) {
    (
        StatusCode::OK,
        Json(Envelope::success(Some(data), message).with_pagination(pagination)),
    )
}
