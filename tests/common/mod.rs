#![allow(dead_code)]

use axum::Router;
use std::time::Duration;

/// Serves `app` on an ephemeral localhost port and returns its base URL.
pub async fn spawn_app(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve test app");
    });
    // give the server a moment to start accepting
    tokio::time::sleep(Duration::from_millis(20)).await;
    format!("http://{addr}")
}

/// A base URL nothing is listening on.
pub async fn dead_base_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);
    format!("http://{addr}")
}

pub const ARTICLE_HTML: &str = r#"<!DOCTYPE html>
<html>
<head>
    <title>Kitchen Notes</title>
    <style>body { font-family: serif; }</style>
</head>
<body>
    <h1>Kitchen Notes</h1>
    <p>Sourdough bread needs flour, water, salt and a lively starter.</p>
    <p>Espresso extraction depends on grind size, dose and water temperature.</p>
    <p>Pickled cucumbers keep for weeks in brine with dill and garlic.</p>
    <script>console.log("tracking pixel");</script>
</body>
</html>"#;
