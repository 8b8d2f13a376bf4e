//! Request validation for book payloads and list filters.
//!
//! Every check runs; violations are returned together, in field declaration order,
//! followed by any unknown keys.

use crate::error::AppError;
use crate::model::{BookChanges, BookFilters, BookStatus, NewBook, DEFAULT_LIMIT, DEFAULT_PAGE, MAX_LIMIT};
use serde_json::{Map, Value};
use std::collections::HashMap;

struct TextRule {
    key: &'static str,
    label: &'static str,
    max: usize,
}

const TITLE: TextRule = TextRule { key: "title", label: "Title", max: 255 };
const AUTHOR: TextRule = TextRule { key: "author", label: "Author", max: 255 };
const DESCRIPTION: TextRule = TextRule { key: "description", label: "Description", max: 1000 };
const GENRE: TextRule = TextRule { key: "genre", label: "Genre", max: 100 };
const GENRE_FILTER: TextRule = TextRule { key: "genre", label: "Genre filter", max: 100 };
const SEARCH: TextRule = TextRule { key: "search", label: "Search term", max: 255 };

const BOOK_KEYS: &[&str] = &["title", "author", "description", "genre", "status"];
const FILTER_KEYS: &[&str] = &["genre", "status", "search", "limit", "page_num"];

#[derive(Clone, Copy, PartialEq)]
enum Presence {
    Required,
    Optional,
}

/// Collects violations across all fields of one payload.
#[derive(Default)]
struct Violations(Vec<String>);

impl Violations {
    fn push(&mut self, msg: impl Into<String>) {
        self.0.push(msg.into());
    }

    fn finish<T>(self, value: T) -> Result<T, AppError> {
        if self.0.is_empty() {
            Ok(value)
        } else {
            Err(AppError::Validation(self.0))
        }
    }
}

pub struct BookValidator;

impl BookValidator {
    /// Validate a create body. Status defaults to `available`.
    pub fn validate_create(body: &Value) -> Result<NewBook, AppError> {
        let map = as_object(body)?;
        let mut v = Violations::default();
        let title = text_field(map, &TITLE, Presence::Required, &mut v);
        let author = text_field(map, &AUTHOR, Presence::Required, &mut v);
        let description = text_field(map, &DESCRIPTION, Presence::Required, &mut v);
        let genre = text_field(map, &GENRE, Presence::Required, &mut v);
        let status = status_field(map.get("status"), "Status", &mut v);
        unknown_keys(map.keys().map(String::as_str), BOOK_KEYS, &mut v);

        match (title, author, description, genre) {
            (Some(title), Some(author), Some(description), Some(genre)) => v.finish(NewBook {
                title,
                author,
                description,
                genre,
                status: status.unwrap_or_default(),
            }),
            _ => Err(AppError::Validation(v.0)),
        }
    }

    /// Validate a partial update body. At least one field must be supplied.
    pub fn validate_update(body: &Value) -> Result<BookChanges, AppError> {
        let map = as_object(body)?;
        let mut v = Violations::default();
        let changes = BookChanges {
            title: text_field(map, &TITLE, Presence::Optional, &mut v),
            author: text_field(map, &AUTHOR, Presence::Optional, &mut v),
            description: text_field(map, &DESCRIPTION, Presence::Optional, &mut v),
            genre: text_field(map, &GENRE, Presence::Optional, &mut v),
            status: status_field(map.get("status"), "Status", &mut v),
        };
        unknown_keys(map.keys().map(String::as_str), BOOK_KEYS, &mut v);
        if v.0.is_empty() && changes.is_empty() {
            return Err(AppError::validation("At least one field must be provided for update"));
        }
        v.finish(changes)
    }

    /// Validate list query parameters, applying limit and page defaults.
    pub fn validate_filters(query: &HashMap<String, String>) -> Result<BookFilters, AppError> {
        let mut v = Violations::default();
        let genre = query
            .get(GENRE_FILTER.key)
            .and_then(|s| check_text(s, &GENRE_FILTER, Presence::Optional, &mut v));
        let status = status_field(
            query.get("status").map(|s| Value::String(s.clone())).as_ref(),
            "Status filter",
            &mut v,
        );
        let search = query
            .get(SEARCH.key)
            .and_then(|s| check_text(s, &SEARCH, Presence::Optional, &mut v));
        let limit = query
            .get("limit")
            .and_then(|s| integer_param(s, "Limit", Some(MAX_LIMIT), &mut v))
            .unwrap_or(DEFAULT_LIMIT);
        let page_num = query
            .get("page_num")
            .and_then(|s| integer_param(s, "Page number", None, &mut v))
            .unwrap_or(DEFAULT_PAGE);

        let mut keys: Vec<&str> = query.keys().map(String::as_str).collect();
        keys.sort_unstable();
        unknown_keys(keys.into_iter(), FILTER_KEYS, &mut v);

        v.finish(BookFilters {
            genre,
            status,
            search,
            limit,
            page_num,
        })
    }
}

fn as_object(body: &Value) -> Result<&Map<String, Value>, AppError> {
    body.as_object()
        .ok_or_else(|| AppError::validation("Request body must be a JSON object"))
}

fn text_field(
    map: &Map<String, Value>,
    rule: &TextRule,
    presence: Presence,
    v: &mut Violations,
) -> Option<String> {
    match map.get(rule.key) {
        None => {
            if presence == Presence::Required {
                v.push(format!("{} is required", rule.label));
            }
            None
        }
        Some(Value::String(s)) => check_text(s, rule, presence, v),
        Some(_) => {
            v.push(format!("{} must be a string", rule.label));
            None
        }
    }
}

/// Trim, then enforce non-empty and the character limit.
fn check_text(raw: &str, rule: &TextRule, presence: Presence, v: &mut Violations) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        match presence {
            Presence::Required => v.push(format!("{} is required", rule.label)),
            Presence::Optional => v.push(format!("{} cannot be empty", rule.label)),
        }
        return None;
    }
    if trimmed.chars().count() > rule.max {
        v.push(format!("{} must be less than {} characters", rule.label, rule.max));
        return None;
    }
    Some(trimmed.to_string())
}

fn status_field(value: Option<&Value>, label: &str, v: &mut Violations) -> Option<BookStatus> {
    let value = value?;
    match value.as_str().map(str::parse::<BookStatus>) {
        Some(Ok(status)) => Some(status),
        _ => {
            v.push(format!("{} must be one of: available, borrowed, reserved", label));
            None
        }
    }
}

/// Parse a positive integer query parameter with optional upper bound.
fn integer_param(raw: &str, label: &str, max: Option<u32>, v: &mut Violations) -> Option<u32> {
    let n = match raw.trim().parse::<f64>() {
        Ok(n) if n.is_finite() && !raw.trim().is_empty() => n,
        _ => {
            v.push(format!("{} must be a number", label));
            return None;
        }
    };
    if n.fract() != 0.0 {
        v.push(format!("{} must be an integer", label));
        return None;
    }
    if n < 1.0 {
        v.push(format!("{} must be at least 1", label));
        return None;
    }
    if let Some(max) = max {
        if n > f64::from(max) {
            v.push(format!("{} cannot exceed {}", label, max));
            return None;
        }
    }
    if n > f64::from(u32::MAX) {
        v.push(format!("{} is too large", label));
        return None;
    }
    Some(n as u32)
}

fn unknown_keys<'a>(keys: impl Iterator<Item = &'a str>, allowed: &[&str], v: &mut Violations) {
    for key in keys {
        if !allowed.contains(&key) {
            v.push(format!("\"{}\" is not allowed", key));
        }
    }
}
