use crate::state::AppState;
use axum::Router;
use axum::routing::{get, post};
use std::sync::Arc;

pub mod handlers;
pub mod responses;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(handlers::get_health))
        .route("/api/beds", post(handlers::post_beds))
        .route("/api/beds/{name}", get(handlers::get_beds))
        .route("/api/hospitals/map", get(handlers::get_map))
        .route("/api/hospitals/list", get(handlers::get_list))
        .route("/api/hospitals/preview/{id}", get(handlers::get_preview))
        .route("/api/hospitals/details/{id}", get(handlers::get_details))
        .with_state(state)
}
