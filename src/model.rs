//! Book domain types shared by validation, storage and handlers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub type BookId = i64;

/// Circulation state of a book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookStatus {
    #[default]
    Available,
    Borrowed,
    Reserved,
}

impl BookStatus {
    pub const ALL: [BookStatus; 3] = [BookStatus::Available, BookStatus::Borrowed, BookStatus::Reserved];

    pub fn as_str(self) -> &'static str {
        match self {
            BookStatus::Available => "available",
            BookStatus::Borrowed => "borrowed",
            BookStatus::Reserved => "reserved",
        }
    }
}

impl fmt::Display for BookStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownStatus(pub String);

impl fmt::Display for UnknownStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown book status '{}'", self.0)
    }
}

impl std::error::Error for UnknownStatus {}

impl FromStr for BookStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BookStatus::ALL
            .into_iter()
            .find(|st| st.as_str() == s)
            .ok_or_else(|| UnknownStatus(s.to_string()))
    }
}

/// A stored book record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: BookId,
    pub title: String,
    pub author: String,
    pub description: String,
    pub genre: String,
    pub status: BookStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated create payload. Status already defaulted.
#[derive(Debug, Clone, PartialEq)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub description: String,
    pub genre: String,
    pub status: BookStatus,
}

/// Validated partial update. `None` leaves the stored value unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BookChanges {
    pub title: Option<String>,
    pub author: Option<String>,
    pub description: Option<String>,
    pub genre: Option<String>,
    pub status: Option<BookStatus>,
}

impl BookChanges {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.author.is_none()
            && self.description.is_none()
            && self.genre.is_none()
            && self.status.is_none()
    }

    /// Applies supplied fields onto `book`. Does not touch timestamps.
    pub fn apply_to(&self, book: &mut Book) {
        if let Some(v) = &self.title {
            book.title = v.clone();
        }
        if let Some(v) = &self.author {
            book.author = v.clone();
        }
        if let Some(v) = &self.description {
            book.description = v.clone();
        }
        if let Some(v) = &self.genre {
            book.genre = v.clone();
        }
        if let Some(v) = self.status {
            book.status = v;
        }
    }
}

pub const DEFAULT_LIMIT: u32 = 10;
pub const MAX_LIMIT: u32 = 100;
pub const DEFAULT_PAGE: u32 = 1;

/// List criteria after validation; limit and page are always set.
#[derive(Debug, Clone, PartialEq)]
pub struct BookFilters {
    pub genre: Option<String>,
    pub status: Option<BookStatus>,
    pub search: Option<String>,
    pub limit: u32,
    pub page_num: u32,
}

impl Default for BookFilters {
    fn default() -> Self {
        BookFilters {
            genre: None,
            status: None,
            search: None,
            limit: DEFAULT_LIMIT,
            page_num: DEFAULT_PAGE,
        }
    }
}

impl BookFilters {
    pub fn offset(&self) -> u64 {
        u64::from(self.page_num.saturating_sub(1)) * u64::from(self.limit)
    }

    /// True when `book` satisfies genre, status and search criteria (paging ignored).
    pub fn matches(&self, book: &Book) -> bool {
        if let Some(g) = &self.genre {
            if &book.genre != g {
                return false;
            }
        }
        if let Some(s) = self.status {
            if book.status != s {
                return false;
            }
        }
        if let Some(term) = &self.search {
            return book.title.contains(term.as_str())
                || book.author.contains(term.as_str())
                || book.description.contains(term.as_str());
        }
        true
    }
}

/// One page of a filtered listing plus the filtered total.
#[derive(Debug, Clone, PartialEq)]
pub struct BookPage {
    pub books: Vec<Book>,
    pub total: u64,
}
