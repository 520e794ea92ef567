//! Integration tests for the HTTP health endpoint and static assets.

use reqwest::StatusCode;

use super::test_helpers::{spawn_server, spawn_server_with, test_config};

#[tokio::test]
async fn health_returns_ok() {
    let server = spawn_server().await;

    let resp = reqwest::get(server.url("/health")).await.expect("get");

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.text().await.expect("body"), "ok");
    server.shutdown().await;
}

#[tokio::test]
async fn unknown_path_is_404_without_static_dir() {
    let server = spawn_server().await;

    let resp = reqwest::get(server.url("/index.html")).await.expect("get");

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    server.shutdown().await;
}

#[tokio::test]
async fn static_dir_serves_ui_assets() {
    let temp = tempfile::tempdir().expect("tempdir");
    std::fs::write(temp.path().join("index.html"), "<h1>todos</h1>").expect("write");

    let mut config = test_config();
    config.static_dir = Some(temp.path().to_path_buf());
    let server = spawn_server_with(config).await;

    let page = reqwest::get(server.url("/index.html")).await.expect("get");
    assert_eq!(page.status(), StatusCode::OK);
    assert_eq!(page.text().await.expect("body"), "<h1>todos</h1>");

    let api = reqwest::get(server.url("/api/todos")).await.expect("get");
    assert_eq!(api.status(), StatusCode::OK);

    server.shutdown().await;
}
