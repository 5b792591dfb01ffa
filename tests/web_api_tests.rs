//! Integration tests for the persistence service API.
//!
//! These tests run against the axum router with a temporary site checkout.

#![cfg(feature = "server")]

mod fixtures;

use std::fs;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use image::ImageFormat;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

use fixtures::{multipart, sample_document, solid_image, temp_site, Part, BOUNDARY};
use raou_studio::config::ServerConfig;
use raou_studio::web::{create_router, AppState};

/// Creates a router over a fresh temporary site.
fn create_test_app() -> (TempDir, ServerConfig, Router) {
    let (temp_dir, config) = temp_site();
    let app = create_router(AppState::new(config.clone()));
    (temp_dir, config, app)
}

async fn body_bytes(response: axum::response::Response) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

async fn get(app: &Router, uri: &str) -> axum::response::Response {
    app.clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn get_json(app: &Router, uri: &str) -> (StatusCode, Value) {
    let response = get(app, uri).await;
    let status = response.status();
    let json: Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
    (status, json)
}

async fn post_body(app: &Router, uri: &str, content_type: &str, body: Vec<u8>) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::CONTENT_TYPE, content_type)
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = body_bytes(response).await;
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

async fn post_multipart(app: &Router, parts: &[Part<'_>]) -> (StatusCode, Value) {
    post_body(
        app,
        "/api/upload-image",
        &format!("multipart/form-data; boundary={BOUNDARY}"),
        multipart(parts),
    )
    .await
}

// ============================================================================
// Health
// ============================================================================

#[tokio::test]
async fn test_health_check() {
    let (_temp, _config, app) = create_test_app();

    let (status, json) = get_json(&app, "/api/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
    assert_eq!(json["message"], "Upload server is running");
    assert!(json["version"].is_string());
}

// ============================================================================
// Save Content
// ============================================================================

#[tokio::test]
async fn test_save_content_writes_pretty_json() {
    let (_temp, config, app) = create_test_app();

    let mut document = sample_document();
    document["site"]["name"] = json!("Raou");
    let (status, json) = post_body(
        &app,
        "/api/save-content",
        "application/json",
        serde_json::to_vec(&document).unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
    assert_eq!(json["message"], "Content saved successfully");

    let written = fs::read_to_string(config.content_path()).unwrap();
    assert!(written.contains("\n  \"site\": {"), "expected 2-space indentation");
    let saved: Value = serde_json::from_str(&written).unwrap();
    assert_eq!(saved["site"]["name"], "Raou");
}

#[tokio::test]
async fn test_save_content_preserves_key_order() {
    let (_temp, config, app) = create_test_app();

    let body = br#"{"zeta": 1, "alpha": {"b": 2, "a": 3}}"#.to_vec();
    let (status, _) = post_body(&app, "/api/save-content", "application/json", body).await;
    assert_eq!(status, StatusCode::OK);

    let written = fs::read_to_string(config.content_path()).unwrap();
    let zeta = written.find("zeta").unwrap();
    let alpha = written.find("alpha").unwrap();
    assert!(zeta < alpha);
}

#[tokio::test]
async fn test_save_content_empty_body() {
    let (_temp, config, app) = create_test_app();
    let before = fs::read_to_string(config.content_path()).unwrap();

    let (status, json) = post_body(&app, "/api/save-content", "application/json", Vec::new()).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "No content provided");
    assert_eq!(fs::read_to_string(config.content_path()).unwrap(), before);
}

#[tokio::test]
async fn test_save_content_null_body() {
    let (_temp, _config, app) = create_test_app();

    let (status, json) =
        post_body(&app, "/api/save-content", "application/json", b"null".to_vec()).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "No content provided");
}

#[tokio::test]
async fn test_save_content_invalid_json() {
    let (_temp, config, app) = create_test_app();
    let before = fs::read_to_string(config.content_path()).unwrap();

    let (status, json) =
        post_body(&app, "/api/save-content", "application/json", b"{not json".to_vec()).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Invalid JSON");
    assert!(json["details"].is_string());
    assert_eq!(fs::read_to_string(config.content_path()).unwrap(), before);
}

#[tokio::test]
async fn test_save_content_rejects_non_object() {
    let (_temp, _config, app) = create_test_app();

    let (status, json) =
        post_body(&app, "/api/save-content", "application/json", b"[1, 2]".to_vec()).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Content must be a JSON object");
}

#[tokio::test]
async fn test_save_content_creates_missing_directory() {
    let temp_dir = TempDir::new().unwrap();
    let config = ServerConfig::for_site(temp_dir.path());
    let app = create_router(AppState::new(config.clone()));

    let (status, _) = post_body(&app, "/api/save-content", "application/json", b"{}".to_vec()).await;

    assert_eq!(status, StatusCode::OK);
    assert!(config.content_path().exists());
}

// ============================================================================
// Upload Image
// ============================================================================

#[tokio::test]
async fn test_upload_image_writes_asset() {
    let (_temp, config, app) = create_test_app();
    let data = solid_image(8, 8, ImageFormat::Png);

    let (status, json) = post_multipart(
        &app,
        &[
            Part::File {
                name: "image",
                filename: "logo.png",
                content_type: "image/png",
                data: &data,
            },
            Part::Text {
                name: "filename",
                value: "logo.png",
            },
        ],
    )
    .await;

    assert_eq!(status, StatusCode::OK, "{json}");
    assert_eq!(json["success"], true);
    assert_eq!(json["message"], "Image uploaded successfully");
    assert_eq!(json["filename"], "logo.png");
    assert_eq!(json["path"], "/src/assets/logo.png");
    assert_eq!(fs::read(config.assets_path().join("logo.png")).unwrap(), data);
}

#[tokio::test]
async fn test_upload_image_overwrites_existing() {
    let (_temp, config, app) = create_test_app();
    fs::create_dir_all(config.assets_path()).unwrap();
    fs::write(config.assets_path().join("hero-background.jpg"), b"old").unwrap();
    let data = solid_image(4, 4, ImageFormat::Jpeg);

    let (status, _) = post_multipart(
        &app,
        &[
            Part::Text {
                name: "filename",
                value: "hero-background.jpg",
            },
            Part::File {
                name: "image",
                filename: "photo.jpg",
                content_type: "image/jpeg",
                data: &data,
            },
        ],
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        fs::read(config.assets_path().join("hero-background.jpg")).unwrap(),
        data
    );
}

#[tokio::test]
async fn test_upload_image_path_traversal_stays_in_assets() {
    let (temp, config, app) = create_test_app();
    let data = solid_image(2, 2, ImageFormat::Png);

    let (status, json) = post_multipart(
        &app,
        &[
            Part::File {
                name: "image",
                filename: "x.png",
                content_type: "image/png",
                data: &data,
            },
            Part::Text {
                name: "filename",
                value: "../../etc/passwd",
            },
        ],
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["filename"], "passwd");
    assert!(config.assets_path().join("passwd").exists());
    assert!(!temp.path().join("etc").exists());
}

#[tokio::test]
async fn test_upload_image_rejects_dot_dot() {
    let (_temp, _config, app) = create_test_app();
    let data = solid_image(2, 2, ImageFormat::Png);

    let (status, json) = post_multipart(
        &app,
        &[
            Part::File {
                name: "image",
                filename: "x.png",
                content_type: "image/png",
                data: &data,
            },
            Part::Text {
                name: "filename",
                value: "..",
            },
        ],
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Invalid filename");
}

#[tokio::test]
async fn test_upload_image_rejects_non_image() {
    let (_temp, config, app) = create_test_app();

    let (status, json) = post_multipart(
        &app,
        &[
            Part::File {
                name: "image",
                filename: "notes.txt",
                content_type: "text/plain",
                data: b"hello",
            },
            Part::Text {
                name: "filename",
                value: "notes.txt",
            },
        ],
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Only image files are allowed!");
    assert!(!config.assets_path().join("notes.txt").exists());
}

#[tokio::test]
async fn test_upload_image_rejects_mismatched_mime() {
    let (_temp, _config, app) = create_test_app();

    let (status, json) = post_multipart(
        &app,
        &[Part::File {
            name: "image",
            filename: "photo.png",
            content_type: "application/octet-stream",
            data: b"\x89PNG",
        }],
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Only image files are allowed!");
}

#[tokio::test]
async fn test_upload_image_missing_file() {
    let (_temp, _config, app) = create_test_app();

    let (status, json) = post_multipart(
        &app,
        &[Part::Text {
            name: "filename",
            value: "logo.png",
        }],
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "No file uploaded");
}

#[tokio::test]
async fn test_upload_image_missing_filename() {
    let (_temp, _config, app) = create_test_app();
    let data = solid_image(2, 2, ImageFormat::Png);

    let (status, json) = post_multipart(
        &app,
        &[Part::File {
            name: "image",
            filename: "logo.png",
            content_type: "image/png",
            data: &data,
        }],
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Filename is required");
}

#[tokio::test]
async fn test_upload_image_too_large() {
    let (temp, mut config, _) = create_test_app();
    config.max_upload_bytes = 16;
    let app = create_router(AppState::new(config.clone()));
    let data = vec![0_u8; 32];

    let (status, json) = post_multipart(
        &app,
        &[
            Part::File {
                name: "image",
                filename: "big.png",
                content_type: "image/png",
                data: &data,
            },
            Part::Text {
                name: "filename",
                value: "big.png",
            },
        ],
    )
    .await;

    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(json["error"], "File too large");
    assert!(!config.assets_path().join("big.png").exists());
    drop(temp);
}

// ============================================================================
// Content Document
// ============================================================================

#[tokio::test]
async fn test_content_json_served_with_etag() {
    let (_temp, _config, app) = create_test_app();

    let response = get(&app, "/content.json").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CACHE_CONTROL).unwrap(),
        "no-cache"
    );
    let etag = response
        .headers()
        .get(header::ETAG)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(etag.starts_with('"') && etag.ends_with('"'));

    let json: Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(json["site"]["name"], "Raou Travel");

    let revalidated = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/content.json")
                .header(header::IF_NONE_MATCH, &etag)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(revalidated.status(), StatusCode::NOT_MODIFIED);
}

#[tokio::test]
async fn test_content_json_ignores_query_and_sees_saves() {
    let (_temp, _config, app) = create_test_app();

    let mut document = sample_document();
    document["site"]["name"] = json!("Raou");
    let (status, _) = post_body(
        &app,
        "/api/save-content",
        "application/json",
        serde_json::to_vec(&document).unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, json) = get_json(&app, "/content.json?t=1700000000000").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["site"]["name"], "Raou");
}

#[tokio::test]
async fn test_content_json_missing() {
    let temp_dir = TempDir::new().unwrap();
    let app = create_router(AppState::new(ServerConfig::for_site(temp_dir.path())));

    let (status, json) = get_json(&app, "/content.json").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "Content not found");
}

// ============================================================================
// Static Site
// ============================================================================

#[tokio::test]
async fn test_fallback_without_built_site() {
    let (_temp, _config, app) = create_test_app();

    let response = get(&app, "/destinations/africa").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let text = String::from_utf8(body_bytes(response).await).unwrap();
    assert_eq!(text, "App not built. Run \"npm run build\" first.");
}

#[tokio::test]
async fn test_spa_fallback_serves_index() {
    let (_temp, config, app) = create_test_app();
    let dist = config.dist_path();
    fs::create_dir_all(dist.join("assets")).unwrap();
    fs::write(dist.join("index.html"), "<html>raou</html>").unwrap();
    fs::write(dist.join("assets/app.js"), "console.log(1)").unwrap();

    let response = get(&app, "/destinations/africa").await;
    assert_eq!(response.status(), StatusCode::OK);
    let text = String::from_utf8(body_bytes(response).await).unwrap();
    assert_eq!(text, "<html>raou</html>");

    let response = get(&app, "/assets/app.js").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response
        .headers()
        .get(header::CACHE_CONTROL)
        .unwrap()
        .to_str()
        .unwrap()
        .contains("immutable"));

    let response = get(&app, "/missing.js").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_uploaded_asset_is_served() {
    let (_temp, _config, app) = create_test_app();
    let data = solid_image(3, 3, ImageFormat::Png);

    let (status, json) = post_multipart(
        &app,
        &[
            Part::File {
                name: "image",
                filename: "logo.png",
                content_type: "image/png",
                data: &data,
            },
            Part::Text {
                name: "filename",
                value: "logo.png",
            },
        ],
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let path = json["path"].as_str().unwrap();
    let response = get(&app, path).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "image/png"
    );
    assert_eq!(body_bytes(response).await, data);
}
