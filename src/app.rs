use crate::handlers;
use crate::state::AppState;
use axum::{routing::get, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/api/days/:date", get(handlers::get_day))
        .route("/api/views", get(handlers::get_views).post(handlers::record_view))
        .route("/api/views/stream", get(handlers::views_stream))
        .with_state(state)
}
