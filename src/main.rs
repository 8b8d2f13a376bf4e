//! Book service binary: loads settings, prepares storage, serves the API until shutdown.

use book_service::{
    app, ensure_books_table, ensure_database_exists, AppState, BookStore, MemoryBookStore, PgBookStore,
    Settings, StorageBackend,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("book_service=info,tower_http=info")),
        )
        .init();

    let settings = Settings::from_env()?;
    let store = open_store(&settings).await?;
    let state = AppState::new(store.clone());
    let router = app(state, settings.body_limit_bytes);

    let listener = TcpListener::bind(settings.listen_addr()).await?;
    tracing::info!(backend = store.backend(), "listening on {}", listener.local_addr()?);
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    store.close().await;
    tracing::info!("shutdown complete");
    Ok(())
}

async fn open_store(settings: &Settings) -> Result<Arc<dyn BookStore>, Box<dyn std::error::Error>> {
    match settings.storage {
        StorageBackend::Postgres => {
            ensure_database_exists(&settings.database_url).await?;
            let pool = sqlx::postgres::PgPoolOptions::new()
                .max_connections(settings.max_connections)
                .connect(&settings.database_url)
                .await?;
            ensure_books_table(&pool).await?;
            Ok(Arc::new(PgBookStore::new(pool)))
        }
        StorageBackend::Memory => {
            tracing::warn!("in-memory storage selected; books are lost on exit");
            Ok(Arc::new(MemoryBookStore::new()))
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("shutdown signal received");
}
