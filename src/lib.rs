//! Book service: REST CRUD for book records over PostgreSQL.

pub mod error;
pub mod handlers;
pub mod model;
pub mod response;
pub mod routes;
pub mod service;
pub mod settings;
pub mod sql;
pub mod state;
pub mod store;

pub use error::{AppError, ConfigError};
pub use model::{Book, BookChanges, BookFilters, BookPage, BookStatus, NewBook};
pub use response::{Envelope, Pagination};
pub use routes::{app, book_routes, common_routes};
pub use service::BookValidator;
pub use settings::{Settings, StorageBackend};
pub use state::AppState;
pub use store::{ensure_books_table, ensure_database_exists, BookStore, MemoryBookStore, PgBookStore};
