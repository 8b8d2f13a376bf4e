//! Builds parameterized INSERT, SELECT, UPDATE, DELETE for the books table.

use super::params::BindValue;
use crate::model::{BookChanges, BookFilters, BookId, NewBook};

pub const BOOKS_TABLE: &str = "books";

const COLUMNS: &str = "id, title, author, description, genre, status, created_at, updated_at";

pub struct QueryBuf {
    pub sql: String,
    pub params: Vec<BindValue>,
}

impl QueryBuf {
    fn new() -> Self {
        QueryBuf {
            sql: String::new(),
            params: Vec::new(),
        }
    }

    fn push_param(&mut self, v: impl Into<BindValue>) -> u32 {
        let n = self.params.len() as u32 + 1;
        self.params.push(v.into());
        n
    }
}

/// Escape LIKE metacharacters so the term matches literally. Backslash is the default LIKE escape.
pub fn like_pattern(term: &str) -> String {
    let mut out = String::with_capacity(term.len() + 2);
    out.push('%');
    for ch in term.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(ch);
    }
    out.push('%');
    out
}

/// WHERE clause for list and count; pushes params into `q`.
fn filter_clause(q: &mut QueryBuf, filters: &BookFilters) -> String {
    let mut parts = Vec::new();
    if let Some(genre) = &filters.genre {
        let n = q.push_param(genre.as_str());
        parts.push(format!("genre = ${}", n));
    }
    if let Some(status) = filters.status {
        let n = q.push_param(status.as_str());
        parts.push(format!("status = ${}", n));
    }
    if let Some(search) = &filters.search {
        let n = q.push_param(like_pattern(search));
        parts.push(format!(
            "(title LIKE ${n} OR author LIKE ${n} OR description LIKE ${n})"
        ));
    }
    if parts.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", parts.join(" AND "))
    }
}

pub fn select_by_id(id: BookId) -> QueryBuf {
    let mut q = QueryBuf::new();
    let n = q.push_param(id);
    q.sql = format!("SELECT {} FROM {} WHERE id = ${}", COLUMNS, BOOKS_TABLE, n);
    q
}

pub fn exists(id: BookId) -> QueryBuf {
    let mut q = QueryBuf::new();
    let n = q.push_param(id);
    q.sql = format!("SELECT EXISTS(SELECT 1 FROM {} WHERE id = ${})", BOOKS_TABLE, n);
    q
}

/// Count of rows matching the filters; paging is not applied.
pub fn count(filters: &BookFilters) -> QueryBuf {
    let mut q = QueryBuf::new();
    let where_clause = filter_clause(&mut q, filters);
    q.sql = format!("SELECT COUNT(*) FROM {}{}", BOOKS_TABLE, where_clause);
    q
}

/// One page of matching rows, newest first.
pub fn select_page(filters: &BookFilters) -> QueryBuf {
    let mut q = QueryBuf::new();
    let where_clause = filter_clause(&mut q, filters);
    q.sql = format!(
        "SELECT {} FROM {}{} ORDER BY created_at DESC, id DESC LIMIT {} OFFSET {}",
        COLUMNS,
        BOOKS_TABLE,
        where_clause,
        filters.limit,
        filters.offset()
    );
    q
}

pub fn insert(book: &NewBook) -> QueryBuf {
    let mut q = QueryBuf::new();
    let placeholders: Vec<String> = [
        book.title.as_str(),
        book.author.as_str(),
        book.description.as_str(),
        book.genre.as_str(),
        book.status.as_str(),
    ]
    .into_iter()
    .map(|v| format!("${}", q.push_param(v)))
    .collect();
    q.sql = format!(
        "INSERT INTO {} (title, author, description, genre, status) VALUES ({}) RETURNING {}",
        BOOKS_TABLE,
        placeholders.join(", "),
        COLUMNS
    );
    q
}

/// UPDATE by id: SET only supplied fields, always refresh updated_at.
pub fn update(id: BookId, changes: &BookChanges) -> QueryBuf {
    let mut q = QueryBuf::new();
    let mut sets = Vec::new();
    let text_fields = [
        ("title", changes.title.as_deref()),
        ("author", changes.author.as_deref()),
        ("description", changes.description.as_deref()),
        ("genre", changes.genre.as_deref()),
        ("status", changes.status.map(|s| s.as_str())),
    ];
    for (col, value) in text_fields {
        if let Some(v) = value {
            let n = q.push_param(v);
            sets.push(format!("{} = ${}", col, n));
        }
    }
    sets.push("updated_at = GREATEST(NOW(), updated_at)".to_string());
    let id_param = q.push_param(id);
    q.sql = format!(
        "UPDATE {} SET {} WHERE id = ${} RETURNING {}",
        BOOKS_TABLE,
        sets.join(", "),
        id_param,
        COLUMNS
    );
    q
}

pub fn delete(id: BookId) -> QueryBuf {
    let mut q = QueryBuf::new();
    let n = q.push_param(id);
    q.sql = format!("DELETE FROM {} WHERE id = ${}", BOOKS_TABLE, n);
    q
}
