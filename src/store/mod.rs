//! Book persistence: the `BookStore` seam and its PostgreSQL and in-memory backends.

mod memory;
mod postgres;

pub use memory::MemoryBookStore;
pub use postgres::{ensure_books_table, ensure_database_exists, PgBookStore};

use crate::error::AppError;
use crate::model::{Book, BookChanges, BookFilters, BookId, BookPage, NewBook};
use async_trait::async_trait;

/// Storage operations for books. Absence is `Ok(None)` / `Ok(false)`, never an error.
#[async_trait]
pub trait BookStore: Send + Sync {
    /// Insert and return the stored record with id and timestamps.
    async fn create(&self, book: NewBook) -> Result<Book, AppError>;

    async fn find_by_id(&self, id: BookId) -> Result<Option<Book>, AppError>;

    /// One page of matching books, newest first, plus the total number of matches.
    async fn find_many(&self, filters: &BookFilters) -> Result<BookPage, AppError>;

    /// Apply supplied fields and refresh `updated_at`. `None` when the id does not exist.
    async fn update(&self, id: BookId, changes: BookChanges) -> Result<Option<Book>, AppError>;

    /// Whether a row was removed.
    async fn delete(&self, id: BookId) -> Result<bool, AppError>;

    async fn exists(&self, id: BookId) -> Result<bool, AppError>;

    /// Cheap liveness check of the backing storage.
    async fn ping(&self) -> Result<(), AppError>;

    /// Release connections. Called once at shutdown.
    async fn close(&self) {}

    fn backend(&self) -> &'static str;
}
