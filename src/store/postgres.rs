//! PostgreSQL-backed store and startup DDL.

use super::BookStore;
use crate::error::{AppError, ConfigError};
use crate::model::{Book, BookChanges, BookFilters, BookId, BookPage, BookStatus, NewBook};
use crate::sql::{self, QueryBuf, BOOKS_TABLE};
use async_trait::async_trait;
use sqlx::postgres::{PgArguments, PgRow};
use sqlx::{ConnectOptions, PgPool, Postgres, Row};
use std::str::FromStr;

#[derive(Clone)]
pub struct PgBookStore {
    pool: PgPool,
}

impl PgBookStore {
    pub fn new(pool: PgPool) -> Self {
        PgBookStore { pool }
    }

    async fn fetch_optional(&self, q: &QueryBuf) -> Result<Option<Book>, AppError> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let row = bind_all(q).fetch_optional(&self.pool).await?;
        Ok(row.as_ref().map(book_from_row).transpose()?)
    }

    async fn fetch_all(&self, q: &QueryBuf) -> Result<Vec<Book>, AppError> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let rows = bind_all(q).fetch_all(&self.pool).await?;
        Ok(rows.iter().map(book_from_row).collect::<Result<_, _>>()?)
    }

    async fn scalar<T>(&self, q: &QueryBuf) -> Result<T, AppError>
    where
        T: Send + Unpin,
        (T,): for<'r> sqlx::FromRow<'r, PgRow>,
    {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let mut query = sqlx::query_scalar::<_, T>(&q.sql);
        for p in &q.params {
            query = query.bind(p.clone());
        }
        Ok(query.fetch_one(&self.pool).await?)
    }
}

fn bind_all(q: &QueryBuf) -> sqlx::query::Query<'_, Postgres, PgArguments> {
    let mut query = sqlx::query(&q.sql);
    for p in &q.params {
        query = query.bind(p.clone());
    }
    query
}

/// Explicit row -> Book mapping.
fn book_from_row(row: &PgRow) -> Result<Book, sqlx::Error> {
    let status: String = row.try_get("status")?;
    let status = BookStatus::from_str(&status).map_err(|e| sqlx::Error::ColumnDecode {
        index: "status".into(),
        source: Box::new(e),
    })?;
    Ok(Book {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        author: row.try_get("author")?,
        description: row.try_get("description")?,
        genre: row.try_get("genre")?,
        status,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[async_trait]
impl BookStore for PgBookStore {
    async fn create(&self, book: NewBook) -> Result<Book, AppError> {
        let q = sql::insert(&book);
        self.fetch_optional(&q)
            .await?
            .ok_or(AppError::Db(sqlx::Error::RowNotFound))
    }

    async fn find_by_id(&self, id: BookId) -> Result<Option<Book>, AppError> {
        self.fetch_optional(&sql::select_by_id(id)).await
    }

    async fn find_many(&self, filters: &BookFilters) -> Result<BookPage, AppError> {
        let total: i64 = self.scalar(&sql::count(filters)).await?;
        let books = self.fetch_all(&sql::select_page(filters)).await?;
        Ok(BookPage {
            books,
            total: u64::try_from(total).unwrap_or(0),
        })
    }

    async fn update(&self, id: BookId, changes: BookChanges) -> Result<Option<Book>, AppError> {
        self.fetch_optional(&sql::update(id, &changes)).await
    }

    async fn delete(&self, id: BookId) -> Result<bool, AppError> {
        let q = sql::delete(id);
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let result = bind_all(&q).execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }

    async fn exists(&self, id: BookId) -> Result<bool, AppError> {
        self.scalar(&sql::exists(id)).await
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn close(&self) {
        self.pool.close().await;
        tracing::info!("database pool closed");
    }

    fn backend(&self) -> &'static str {
        "postgres"
    }
}

/// Create the books table and its ordering index if absent.
pub async fn ensure_books_table(pool: &PgPool) -> Result<(), AppError> {
    let ddl = format!(
        r#"
        CREATE TABLE IF NOT EXISTS {} (
            id BIGSERIAL PRIMARY KEY,
            title VARCHAR(255) NOT NULL,
            author VARCHAR(255) NOT NULL,
            description TEXT NOT NULL,
            genre VARCHAR(100) NOT NULL,
            status VARCHAR(20) NOT NULL DEFAULT 'available'
                CHECK (status IN ('available', 'borrowed', 'reserved')),
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
        BOOKS_TABLE
    );
    sqlx::query(&ddl).execute(pool).await?;
    let index = format!(
        "CREATE INDEX IF NOT EXISTS {0}_created_at_idx ON {0} (created_at DESC)",
        BOOKS_TABLE
    );
    sqlx::query(&index).execute(pool).await?;
    tracing::info!(table = BOOKS_TABLE, "books table ready");
    Ok(())
}

/// Connect to the `postgres` maintenance database and create the target database if missing.
pub async fn ensure_database_exists(database_url: &str) -> Result<(), AppError> {
    let (admin_url, db_name) = parse_db_name_from_url(database_url)?;
    if db_name.is_empty() || db_name == "postgres" {
        return Ok(());
    }
    let opts = sqlx::postgres::PgConnectOptions::from_str(&admin_url)
        .map_err(|e| ConfigError::InvalidDatabaseUrl(e.to_string()))?;
    let mut conn: sqlx::PgConnection = opts.connect().await?;
    let exists: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM pg_database WHERE datname = $1)")
        .bind(&db_name)
        .fetch_one(&mut conn)
        .await?;
    if !exists.0 {
        sqlx::query(&format!("CREATE DATABASE {}", quote_ident(&db_name)))
            .execute(&mut conn)
            .await?;
        tracing::info!(database = %db_name, "database created");
    }
    Ok(())
}

/// Split a connection URL into (maintenance URL, database name). Query string is kept.
fn parse_db_name_from_url(url: &str) -> Result<(String, String), ConfigError> {
    let (base_and_path, query) = match url.split_once('?') {
        Some((b, q)) => (b, Some(q)),
        None => (url, None),
    };
    let scheme_end = base_and_path.find("://").map(|i| i + 3).unwrap_or(0);
    let path_start = base_and_path[scheme_end..]
        .find('/')
        .map(|i| scheme_end + i + 1)
        .ok_or_else(|| ConfigError::InvalidDatabaseUrl("no database path".into()))?;
    let db_name = base_and_path[path_start..].trim().to_string();
    let mut admin_url = format!("{}postgres", &base_and_path[..path_start]);
    if let Some(q) = query {
        admin_url.push('?');
        admin_url.push_str(q);
    }
    Ok((admin_url, db_name))
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
