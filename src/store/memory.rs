//! In-process store. Same semantics as the PostgreSQL store, no durability.

use super::BookStore;
use crate::error::AppError;
use crate::model::{Book, BookChanges, BookFilters, BookId, BookPage, NewBook};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

#[derive(Default)]
pub struct MemoryBookStore {
    inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
    last_id: BookId,
    books: BTreeMap<BookId, Book>,
}

impl MemoryBookStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BookStore for MemoryBookStore {
    async fn create(&self, book: NewBook) -> Result<Book, AppError> {
        let mut inner = self.inner.write().await;
        inner.last_id += 1;
        let now = Utc::now();
        let stored = Book {
            id: inner.last_id,
            title: book.title,
            author: book.author,
            description: book.description,
            genre: book.genre,
            status: book.status,
            created_at: now,
            updated_at: now,
        };
        inner.books.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn find_by_id(&self, id: BookId) -> Result<Option<Book>, AppError> {
        Ok(self.inner.read().await.books.get(&id).cloned())
    }

    async fn find_many(&self, filters: &BookFilters) -> Result<BookPage, AppError> {
        let inner = self.inner.read().await;
        let mut matched: Vec<&Book> = inner.books.values().filter(|b| filters.matches(b)).collect();
        matched.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        let total = matched.len() as u64;
        let books = matched
            .into_iter()
            .skip(usize::try_from(filters.offset()).unwrap_or(usize::MAX))
            .take(filters.limit as usize)
            .cloned()
            .collect();
        Ok(BookPage { books, total })
    }

    async fn update(&self, id: BookId, changes: BookChanges) -> Result<Option<Book>, AppError> {
        let mut inner = self.inner.write().await;
        let Some(book) = inner.books.get_mut(&id) else {
            return Ok(None);
        };
        changes.apply_to(book);
        book.updated_at = Utc::now().max(book.updated_at);
        Ok(Some(book.clone()))
    }

    async fn delete(&self, id: BookId) -> Result<bool, AppError> {
        Ok(self.inner.write().await.books.remove(&id).is_some())
    }

    async fn exists(&self, id: BookId) -> Result<bool, AppError> {
        Ok(self.inner.read().await.books.contains_key(&id))
    }

    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
