//! End-to-end tests: HTTP status source against an in-process backend
//!
//! Each test binds an axum router to 127.0.0.1:0 that mimics the backend's
//! `/api` status routes, then drives the poller through real HTTP.

use axum::extract::Query;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use newsdesk_common::config::{ApiConfig, HttpConfig};
use newsdesk_common::{ApiRequest, DisplayTargets, Endpoint, FetchError};
use newsdeskctl::{HttpStatusSource, IndicatorState, PageModel, PollerOptions, StatusPoller, StatusSource};
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

async fn spawn_backend(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

fn healthy_backend() -> Router {
    Router::new()
        .route(
            "/api/stats",
            get(|| async {
                Json(json!({
                    "total_articles": 42,
                    "pending_articles": 4,
                    "processing_articles": 1,
                    "processed_articles": 20,
                    "published_articles": 15,
                    "failed_articles": 2,
                    "today_published": 6
                }))
            }),
        )
        .route(
            "/api/ai-status",
            get(|| async {
                // Raw body so member order is exactly what the backend sent
                (
                    [("content-type", "application/json")],
                    r#"{"movies": {"available_keys": 2}, "series": {"available_keys": 2}, "games": {"available_keys": 1}}"#,
                )
            }),
        )
        .route(
            "/api/scheduler-status",
            get(|| async {
                Json(json!({
                    "running": true,
                    "jobs": [
                        {"id": "content_automation_cycle", "name": "Content Automation Cycle", "next_run": "2024-05-01T10:15:00-03:00"},
                        {"id": "database_cleanup", "name": "Database Cleanup", "next_run": "2024-05-02T00:00:00-03:00"}
                    ]
                }))
            }),
        )
        .route(
            "/api/wordpress-test",
            get(|| async { Json(json!({"connected": true})) }),
        )
        .route(
            "/api/recent-articles",
            get(|Query(params): Query<HashMap<String, String>>| async move {
                let limit: usize = params.get("limit").and_then(|l| l.parse().ok()).unwrap_or(10);
                let articles: Vec<_> = (1..=20)
                    .map(|id| {
                        json!({
                            "id": id,
                            "title": format!("Article number {} with a headline long enough to be cut", id),
                            "status": if id % 2 == 0 { "failed" } else { "published" },
                            "feed_type": "collider_filmes_tv",
                            "created_at": "2024-05-01T12:00:00.000123",
                            "error_message": if id % 2 == 0 { Some("AI processing failed") } else { None }
                        })
                    })
                    .take(limit)
                    .collect();
                Json(json!(articles))
            }),
        )
}

fn poller_for(
    base_url: String,
    timeout_ms: u64,
) -> (Arc<PageModel>, StatusPoller<HttpStatusSource, PageModel>) {
    let api = ApiConfig {
        base_url,
        prefix: "/api".to_string(),
    };
    let http = HttpConfig { timeout_ms };
    let source = Arc::new(HttpStatusSource::new(&api, &http).unwrap());
    let targets = DisplayTargets::default();
    let page = Arc::new(PageModel::for_targets(&targets));
    let poller = StatusPoller::new(source, page.clone(), targets, PollerOptions::default());
    (page, poller)
}

#[tokio::test]
async fn test_full_refresh_against_backend() {
    let base_url = spawn_backend(healthy_backend()).await;
    let (page, poller) = poller_for(base_url, 5_000);

    let frequent = poller.load_frequent_data().await;
    let infrequent = poller.load_infrequent_data().await;
    assert!(frequent.failures().is_empty(), "{:?}", frequent.failures());
    assert!(infrequent.failures().is_empty());

    assert_eq!(page.text("stat-total"), Some("42".to_string()));
    assert_eq!(page.text("stat-today-published"), Some("6".to_string()));

    let providers = page.rows("ai-status-container").unwrap();
    let labels: Vec<&str> = providers.iter().map(|r| r.cells[0].text.as_str()).collect();
    assert_eq!(labels, vec!["Movies Keys:", "Series Keys:", "Games Keys:"]);

    assert_eq!(page.indicator("scheduler-status"), Some(IndicatorState::Online));
    assert!(page
        .text("scheduler-next-run")
        .unwrap()
        .starts_with("Next run: 2024-05-0"));
    assert_eq!(page.indicator("wordpress-status"), Some(IndicatorState::Online));

    let articles = page.rows("recent-articles-tbody").unwrap();
    assert_eq!(articles.len(), 10);
    assert!(articles[0].cells[1].text.ends_with("..."));
    assert_eq!(articles[0].cells[5].text, "-");
    assert_eq!(articles[1].cells[5].text, "AI processing failed");
}

#[tokio::test]
async fn test_error_payload_with_error_status() {
    let app = Router::new()
        .route(
            "/api/stats",
            get(|| async {
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({"error": "no such table: articles"})),
                )
            }),
        )
        .route(
            "/api/wordpress-test",
            get(|| async {
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({"error": "WordPress credentials not configured"})),
                )
            }),
        );
    let base_url = spawn_backend(app).await;
    let (page, poller) = poller_for(base_url, 5_000);

    let err = poller.fetch_stats().await.unwrap_err();
    assert_eq!(err, FetchError::Backend("no such table: articles".to_string()));
    assert_eq!(page.text("stat-total"), None);

    assert!(poller.fetch_wordpress_status().await.is_err());
    assert_eq!(page.indicator("wordpress-status"), Some(IndicatorState::Offline));
}

#[tokio::test]
async fn test_non_json_error_page_is_transport_failure() {
    let app = Router::new().route(
        "/api/ai-status",
        get(|| async { (StatusCode::BAD_GATEWAY, "<html>Bad Gateway</html>").into_response() }),
    );
    let base_url = spawn_backend(app).await;
    let (_page, poller) = poller_for(base_url, 5_000);

    let err = poller.fetch_ai_status().await.unwrap_err();
    assert!(err.is_transport());
    assert!(matches!(err, FetchError::Transport(ref m) if m.contains("502")));
}

#[tokio::test]
async fn test_unknown_route_is_transport_failure() {
    let base_url = spawn_backend(Router::new()).await;
    let (_page, poller) = poller_for(base_url, 5_000);

    let err = poller.fetch_scheduler_status().await.unwrap_err();
    assert!(err.is_transport());
}

#[tokio::test]
async fn test_slow_backend_times_out() {
    let app = Router::new().route(
        "/api/wordpress-test",
        get(|| async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Json(json!({"connected": true}))
        }),
    );
    let base_url = spawn_backend(app).await;
    let (page, poller) = poller_for(base_url, 200);

    let err = poller.fetch_wordpress_status().await.unwrap_err();
    assert_eq!(err, FetchError::Timeout(200));
    assert_eq!(page.indicator("wordpress-status"), Some(IndicatorState::Offline));
}

#[tokio::test]
async fn test_connection_refused() {
    // Bind then drop to get a port nobody listens on
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let api = ApiConfig {
        base_url: format!("http://{}", addr),
        prefix: "/api".to_string(),
    };
    let source = HttpStatusSource::new(&api, &HttpConfig::default()).unwrap();
    let result = source.fetch(&ApiRequest::new(Endpoint::Stats)).await;
    assert!(matches!(result, Err(FetchError::Transport(_))));
}
