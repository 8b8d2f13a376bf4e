//! Book CRUD routes, mounted under `/api/books`.

use super::route_not_found;
use crate::handlers::books::{create, delete as delete_handler, list, read, update};
use crate::state::AppState;
use axum::{routing::get, Router};

pub fn book_routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(list).post(create).fallback(route_not_found))
        .route(
            "/:id",
            get(read).put(update).delete(delete_handler).fallback(route_not_found),
        )
        .with_state(state)
}
