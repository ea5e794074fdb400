//! Local web UI and JSON API

mod dto;
mod error;
mod handlers;
mod state;

pub use error::ApiError;
pub use state::AppState;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// Upper bound for a multipart upload of papers
const MAX_UPLOAD_BYTES: usize = 100 * 1024 * 1024;

/// Build the application router
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
        .max_age(Duration::from_secs(3600));

    Router::new()
        .route("/", get(handlers::index))
        .route("/health", get(handlers::health))
        .route("/api/status", get(handlers::status))
        .route("/api/papers", post(handlers::upload_papers))
        .route("/api/examples", post(handlers::load_examples))
        .route("/api/knowledge", axum::routing::delete(handlers::clear_knowledge))
        .route("/api/search", post(handlers::search))
        .route("/api/analyze", post(handlers::analyze))
        .route("/api/analyze/batch", post(handlers::analyze_batch))
        .route("/api/extract", post(handlers::extract))
        .route("/api/history", get(handlers::history))
        .fallback(handlers::not_found)
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Serve until Ctrl-C.
pub async fn serve(state: Arc<AppState>, addr: &str) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(address = %listener.local_addr()?, "web UI listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use http_body_util::BodyExt;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use crate::core::config::AssistantConfig;
    use crate::search::KnowledgeBase;

    fn app() -> Router {
        let kb = KnowledgeBase::open_in_memory(0.1).unwrap();
        router(AppState::new(kb, AssistantConfig::default()).unwrap())
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let response = app().oneshot(get("/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_index_page() {
        let response = app().oneshot(get("/")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        assert!(String::from_utf8_lossy(&bytes).contains("<html"));
    }

    #[tokio::test]
    async fn test_empty_query_is_bad_request() {
        let response = app()
            .oneshot(post_json("/api/search", json!({"query": "  "})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"], "bad_request");
    }

    #[tokio::test]
    async fn test_search_before_ingest_unavailable() {
        let response = app()
            .oneshot(post_json("/api/search", json!({"query": "LiPF6"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_examples_then_search() {
        let app = app();

        let response = app
            .clone()
            .oneshot(post_json("/api/examples", json!({})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["status"]["document_count"], 3);

        let response = app
            .oneshot(post_json(
                "/api/search",
                json!({"query": "VC additive SEI formation", "top_k": 50}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        let hits = body["hits"].as_array().unwrap();
        assert!(!hits.is_empty() && hits.len() <= 3);
        assert_eq!(hits[0]["file_name"], "example-vc-sei.pdf");
    }

    #[tokio::test]
    async fn test_analyze_records_history() {
        let app = app();

        let response = app
            .clone()
            .oneshot(post_json(
                "/api/analyze",
                json!({"formulation": "1.2 M LiPF6 in EC/EMC (3:7) with 2% VC", "use_llm": true}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert!(body["research_insights"].is_null());
        assert!(body["llm_error"].as_str().unwrap().contains("not configured"));
        assert!(!body["formulation_analysis"]["predictions"].as_array().unwrap().is_empty());

        let response = app.oneshot(get("/api/history?limit=5")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["count"], 1);
        assert_eq!(body["analyses"][0]["formulation"], "1.2 M LiPF6 in EC/EMC (3:7) with 2% VC");
    }

    #[tokio::test]
    async fn test_empty_formulation_is_bad_request() {
        let response = app()
            .oneshot(post_json("/api/analyze", json!({"formulation": ""})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_extract() {
        let response = app()
            .oneshot(post_json(
                "/api/extract",
                json!({"text": "1 M LiPF6 in EC/DMC (1:1, v/v) with 2 wt% VC; 10.5 mS cm-1"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["formulations"].as_array().unwrap().len(), 3);
        assert_eq!(body["metrics"]["ionic_conductivity"], 10.5);
    }

    const BOUNDARY: &str = "electrolyte-test-boundary";

    fn multipart(files: &[(&str, &[u8])]) -> Request<Body> {
        let mut body = Vec::new();
        for (name, bytes) in files {
            body.extend_from_slice(
                format!(
                    "--{}\r\nContent-Disposition: form-data; name=\"files\"; filename=\"{}\"\r\n\
                     Content-Type: application/octet-stream\r\n\r\n",
                    BOUNDARY, name
                )
                .as_bytes(),
            );
            body.extend_from_slice(bytes);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());

        Request::builder()
            .method("POST")
            .uri("/api/papers")
            .header("content-type", format!("multipart/form-data; boundary={}", BOUNDARY))
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_status_reports_knowledge_base() {
        let app = app();

        let response = app.clone().oneshot(get("/api/status")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "not_ready");
        assert_eq!(body["document_count"], 0);
        assert!(body["ai_backend"].is_null());

        app.clone()
            .oneshot(post_json("/api/examples", json!({})))
            .await
            .unwrap();
        let body = body_json(app.oneshot(get("/api/status")).await.unwrap()).await;
        assert_eq!(body["status"], "ready");
        assert_eq!(body["paper_count"], 3);
        assert_eq!(body["papers"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_upload_reports_each_file() {
        let app = app();
        app.clone()
            .oneshot(post_json("/api/examples", json!({})))
            .await
            .unwrap();

        let alpha: &[u8] = b"Weakly Solvating Electrolytes for Lithium Metal\nAbstract\n1 M LiFSI in DME with CE = 99.4%.";
        let beta: &[u8] = b"Concentrated Sulfone Electrolytes\nAbstract\n3 M LiTFSI in sulfolane reached 4.8 V.";

        let response = app
            .clone()
            .oneshot(multipart(&[
                ("paper.txt", alpha),
                ("figure.png", &b"\x89PNG"[..]),
                ("paper.txt", beta),
            ]))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;

        let processed = body["processed"].as_array().unwrap();
        assert_eq!(processed.len(), 2);
        assert_eq!(processed[0]["stored_as"], "paper.txt");
        assert_eq!(processed[1]["file_name"], "paper.txt");
        assert_eq!(processed[1]["stored_as"], "paper (2).txt");

        let failed = body["failed"].as_array().unwrap();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0]["file_name"], "figure.png");
        assert!(failed[0]["error"].as_str().unwrap().contains("png"));

        assert_eq!(body["documents_added"], 2);
        assert_eq!(body["status"]["paper_count"], 5);
        assert_eq!(body["status"]["document_count"], 5);

        let response = app
            .oneshot(post_json("/api/search", json!({"query": "sulfolane", "top_k": 5})))
            .await
            .unwrap();
        let body = body_json(response).await;
        let hits = body["hits"].as_array().unwrap();
        assert!(hits.iter().any(|h| h["file_name"] == "paper (2).txt"));
        assert!(hits.iter().all(|h| h["file_name"] != "paper.txt"));
    }

    #[tokio::test]
    async fn test_upload_without_files_is_bad_request() {
        let response = app().oneshot(multipart(&[])).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_analyze_batch() {
        let app = app();

        let response = app
            .clone()
            .oneshot(post_json(
                "/api/analyze/batch",
                json!({"formulations": ["1 M LiPF6 in EC/DMC", "", "3 M LiTFSI in DME"]}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["count"], 3);
        let results = body["results"].as_array().unwrap();
        assert!(results[0]["analysis"].is_object());
        assert!(results[1]["error"].is_string());
        assert!(results[1]["analysis"].is_null());
        assert!(results[2]["analysis"].is_object());

        let response = app
            .oneshot(post_json("/api/analyze/batch", json!({"formulations": [" "]})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_clear_and_unknown_route() {
        let app = app();

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri("/api/knowledge")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["status"]["status"], "not_ready");

        let response = app.oneshot(get("/api/nope")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
