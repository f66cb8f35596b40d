use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::routing::get;
use axum::{Router, response::Html};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

use sitesearch::api::create_router;
use sitesearch::api::models::{SearchResponse, StatusResponse};
use sitesearch::embedding::HashingEmbedder;
use sitesearch::fetcher::PageFetcher;
use sitesearch::query_engine::{NO_TEXT, QueryEngine};

mod common;

mod test_helpers {
    use super::*;

    pub fn create_engine(max_tokens: usize) -> Arc<QueryEngine> {
        Arc::new(QueryEngine::new(
            PageFetcher::new(Duration::from_secs(2)).unwrap(),
            Box::new(HashingEmbedder::new(4096).unwrap()),
            max_tokens,
        ))
    }

    /// Site with an article page, a page with only markup and a 404.
    pub async fn spawn_site() -> String {
        let app = Router::new()
            .route("/article", get(|| async { Html(common::ARTICLE_HTML) }))
            .route(
                "/blank",
                get(|| async { Html("<html><body><script>var a;</script></body></html>") }),
            );
        common::spawn_app(app).await
    }

    pub async fn body_json<T: serde::de::DeserializeOwned>(res: axum::response::Response) -> T {
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    pub fn post_search(body: String) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/search")
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap()
    }
}

use test_helpers::*;

#[tokio::test]
async fn test_index_and_search_ranks_matching_paragraph_first() {
    let site = spawn_site().await;
    // small chunks; " temperature" is one gpt2 token so it is never split
    let engine = create_engine(12);

    let hits = engine
        .index_and_search(&format!("{site}/article"), "temperature", 10)
        .await;

    assert!(hits.len() > 1);
    assert!(!hits[0].is_sentinel());
    assert!(
        hits[0].text.contains("temperature"),
        "best hit was {:?}",
        hits[0].text
    );
    assert!(hits.iter().all(|h| !h.text.contains("tracking pixel")));
    let scores: Vec<f64> = hits.iter().map(|h| h.score.unwrap()).collect();
    assert!(scores.windows(2).all(|w| w[0] <= w[1]));
}

#[tokio::test]
async fn test_top_k_is_respected() {
    let site = spawn_site().await;
    let engine = create_engine(3);
    let hits = engine
        .index_and_search(&format!("{site}/article"), "water", 2)
        .await;
    assert_eq!(hits.len(), 2);
}

#[tokio::test]
async fn test_missing_page_yields_sentinel() {
    let site = spawn_site().await;
    let engine = create_engine(500);
    let hits = engine
        .index_and_search(&format!("{site}/does-not-exist"), "anything", 10)
        .await;
    assert_eq!(hits.len(), 1);
    assert!(hits[0].is_sentinel());
    assert_eq!(hits[0].text, NO_TEXT);
    assert_eq!(hits[0].score, Some(0.0));
}

#[tokio::test]
async fn test_markup_only_page_yields_sentinel() {
    let site = spawn_site().await;
    let engine = create_engine(500);
    let hits = engine
        .index_and_search(&format!("{site}/blank"), "anything", 10)
        .await;
    assert_eq!(hits[0].text, NO_TEXT);
}

#[tokio::test]
async fn test_unreachable_host_yields_sentinel() {
    let base = common::dead_base_url().await;
    let engine = create_engine(500);
    let hits = engine.index_and_search(&base, "anything", 10).await;
    assert_eq!(hits[0].text, NO_TEXT);
}

#[tokio::test]
async fn test_concurrent_searches_use_separate_collections() {
    let site = spawn_site().await;
    let engine = create_engine(12);
    let url = format!("{site}/article");

    let searches = ["bread", "espresso", "cucumbers", "garlic"]
        .into_iter()
        .map(|q| {
            let engine = engine.clone();
            let url = url.clone();
            async move { engine.index_and_search(&url, q, 3).await }
        });
    let all = futures::future::join_all(searches).await;

    assert_eq!(all.len(), 4);
    assert!(all.iter().all(|hits| !hits.is_empty() && !hits[0].is_sentinel()));
    assert_eq!(engine.store().collection_count().await, 0);
}

#[tokio::test]
async fn test_status_route() {
    let app = create_router(create_engine(500), 10);
    let res = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let status: StatusResponse = body_json(res).await;
    assert_eq!(status.status, "Backend working!");
}

#[tokio::test]
async fn test_search_route_returns_results() {
    let site = spawn_site().await;
    let app = create_router(create_engine(12), 10);
    let body = serde_json::json!({ "url": format!("{site}/article"), "query": "weeks" });

    let res = app.oneshot(post_search(body.to_string())).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let response: SearchResponse = body_json(res).await;
    assert!(response.results[0].text.contains("weeks"));
    assert!(response.results[0].id.as_deref().unwrap().starts_with("chunk-"));
}

#[tokio::test]
async fn test_search_route_passes_empty_fields_through() {
    let app = create_router(create_engine(500), 10);
    let res = app
        .clone()
        .oneshot(post_search(r#"{"url":"","query":"q"}"#.to_string()))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let response: SearchResponse = body_json(res).await;
    assert_eq!(response.results.len(), 1);
    assert!(response.results[0].is_sentinel());
    assert_eq!(response.results[0].text, NO_TEXT);

    let site = spawn_site().await;
    let body = serde_json::json!({ "url": format!("{site}/article"), "query": "   " });
    let res = app.oneshot(post_search(body.to_string())).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let response: SearchResponse = body_json(res).await;
    assert!(!response.results.is_empty());
    assert!(!response.results[0].is_sentinel());
}

#[tokio::test]
async fn test_search_route_rejects_malformed_body() {
    let app = create_router(create_engine(500), 10);
    let res = app
        .oneshot(post_search(r#"{"url": 5}"#.to_string()))
        .await
        .unwrap();
    assert!(res.status().is_client_error());
}

#[tokio::test]
async fn test_cors_headers_present() {
    let app = create_router(create_engine(500), 10);
    let res = app
        .oneshot(
            Request::builder()
                .uri("/")
                .header("origin", "http://localhost:5173")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(
        res.headers()
            .get("access-control-allow-origin")
            .and_then(|v| v.to_str().ok()),
        Some("*")
    );
}
