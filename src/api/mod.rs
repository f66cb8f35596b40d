use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::query_engine::QueryEngine;

pub mod handlers;
pub mod models;

#[derive(Clone)]
pub struct AppState {
    pub query_engine: Arc<QueryEngine>,
    pub top_k: usize,
}

pub fn create_router(query_engine: Arc<QueryEngine>, top_k: usize) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(handlers::status_handler))
        .route("/api/search", post(handlers::search_handler))
        .with_state(AppState {
            query_engine,
            top_k,
        })
        .layer(cors)
}
