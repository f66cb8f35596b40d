use axum::{Json, extract::State};
use std::time::Instant;

use super::AppState;
use super::models::{SearchRequest, SearchResponse, StatusResponse};

pub async fn status_handler() -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "Backend working!".to_string(),
    })
}

pub async fn search_handler(
    State(state): State<AppState>,
    Json(request): Json<SearchRequest>,
) -> Json<SearchResponse> {
    let start = Instant::now();

    let results = state
        .query_engine
        .index_and_search(&request.url, &request.query, state.top_k)
        .await;

    log::info!(
        "search {:?} on {} -> {} results in {}ms",
        request.query,
        request.url,
        results.len(),
        start.elapsed().as_millis()
    );

    Json(SearchResponse { results })
}
