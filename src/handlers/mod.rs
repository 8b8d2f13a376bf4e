//! HTTP handlers for book CRUD.

pub mod books;
pub use books::*;
