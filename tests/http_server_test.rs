//! Router tests: requests go straight to the axum service, no socket.

#![cfg(feature = "http-server")]

use std::fs;
use std::time::Duration;

use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use dirview::TreeMirror;
use dirview::server::{AppState, router};
use futures::StreamExt;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;

fn fixture() -> (TempDir, TreeMirror) {
    let temp_dir = TempDir::new().unwrap();
    fs::create_dir(temp_dir.path().join("a")).unwrap();
    fs::write(temp_dir.path().join("a/c d.txt"), "spaced").unwrap();
    fs::write(temp_dir.path().join("b.txt"), "bee").unwrap();
    let mirror = TreeMirror::open(temp_dir.path()).unwrap();
    (temp_dir, mirror)
}

fn app(mirror: &TreeMirror) -> axum::Router {
    router(AppState::new(
        mirror.clone(),
        Duration::from_secs(15),
        CancellationToken::new(),
    ))
}

async fn get(app: axum::Router, uri: &str) -> (StatusCode, String) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8_lossy(&body).into_owned())
}

#[tokio::test]
async fn test_index_page_renders_tree() {
    let (_dir, mirror) = fixture();
    let (status, body) = get(app(&mirror), "/").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("<!DOCTYPE html>"));
    assert!(body.contains(r#"<a href="/download/a/c%20d.txt">c d.txt</a>"#));
    assert!(body.find("📁 a").unwrap() < body.find(">b.txt</a>").unwrap());
}

#[tokio::test]
async fn test_tree_json() {
    let (_dir, mirror) = fixture();
    let (status, body) = get(app(&mirror), "/api/tree").await;

    assert_eq!(status, StatusCode::OK);
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["relative_path"], "");
    assert_eq!(json["children"][0]["name"], "a");
    assert_eq!(json["children"][0]["children"][0]["relative_path"], "a/c d.txt");
    assert_eq!(json["children"][1]["is_dir"], false);
}

#[tokio::test]
async fn test_download_serves_file_bytes() {
    let (_dir, mirror) = fixture();

    let (status, body) = get(app(&mirror), "/download/b.txt").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "bee");

    let (status, body) = get(app(&mirror), "/download/a/c%20d.txt").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "spaced");
}

#[tokio::test]
async fn test_download_rejects_traversal_and_missing() {
    let (_dir, mirror) = fixture();

    let (status, _) = get(app(&mirror), "/download/../b.txt").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = get(app(&mirror), "/download/a/../../etc/passwd").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = get(app(&mirror), "/download/missing.txt").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_health() {
    let (_dir, mirror) = fixture();
    let (status, body) = get(app(&mirror), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "OK");
}

#[tokio::test]
async fn test_updates_stream_pushes_rendered_tree() {
    let (dir, mirror) = fixture();

    let response = app(&mirror)
        .oneshot(Request::builder().uri("/updates").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()["content-type"],
        "text/event-stream"
    );
    assert_eq!(mirror.subscribers().len(), 1);

    fs::write(dir.path().join("fresh.txt"), "f").unwrap();
    mirror.rebuild().unwrap();

    let mut stream = response.into_body().into_data_stream();
    let frame = tokio::time::timeout(Duration::from_secs(5), stream.next())
        .await
        .expect("no update frame")
        .unwrap()
        .unwrap();
    let frame = String::from_utf8_lossy(&frame);
    assert!(frame.contains("event: update"));
    assert!(frame.contains(">fresh.txt</a>"));

    // Client disconnect drops the stream and the subscription with it
    drop(stream);
    assert!(mirror.subscribers().is_empty());
}

#[tokio::test]
async fn test_updates_stream_ends_on_shutdown() {
    let (_dir, mirror) = fixture();
    let shutdown = CancellationToken::new();
    let app = router(AppState::new(
        mirror.clone(),
        Duration::from_secs(15),
        shutdown.clone(),
    ));

    let response = app
        .oneshot(Request::builder().uri("/updates").body(Body::empty()).unwrap())
        .await
        .unwrap();
    shutdown.cancel();

    let mut stream = response.into_body().into_data_stream();
    let next = tokio::time::timeout(Duration::from_secs(5), stream.next())
        .await
        .expect("stream did not end");
    assert!(next.is_none());
}
