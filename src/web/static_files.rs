//! Static file serving for the built site.
//!
//! Serves the pre-built site directory from disk with SPA fallback, plus
//! uploaded images under the assets URL prefix so upload responses point
//! at something reachable.

use std::path::{Component, Path, PathBuf};

use axum::{
    body::Body,
    extract::{Request, State},
    http::{header, Method, StatusCode},
    response::{IntoResponse, Response},
};

use super::AppState;

const NOT_BUILT: &str = "App not built. Run \"npm run build\" first.";

/// Serves static files with SPA fallback.
///
/// This handler:
/// 1. Serves uploaded assets from the assets directory
/// 2. Tries the exact path, then the path with `.html` appended, in the built site
/// 3. Returns 404 for missing paths that look like files
/// 4. Otherwise serves `index.html`, or a plain-text hint if the site is not built
pub async fn serve_static(State(state): State<AppState>, request: Request) -> Response {
    if !matches!(*request.method(), Method::GET | Method::HEAD) {
        return (StatusCode::NOT_FOUND, "Not found").into_response();
    }

    let config = state.config();
    let path = request.uri().path().to_string();

    let assets_prefix = format!("{}/", config.assets_url_prefix());
    if let Some(name) = path.strip_prefix(&assets_prefix) {
        return match resolve_under(&config.assets_path(), name) {
            Some(file) => serve_file(&file, "no-cache").await,
            None => (StatusCode::NOT_FOUND, "File not found").into_response(),
        };
    }

    let dist = config.dist_path();
    let rel = path.trim_start_matches('/');

    if !rel.is_empty() {
        let Some(exact) = resolve_under(&dist, rel) else {
            return (StatusCode::NOT_FOUND, "File not found").into_response();
        };
        if exact.is_file() {
            return serve_file(&exact, cache_control_for_path(rel)).await;
        }

        let html_rel = format!("{rel}.html");
        if let Some(html) = resolve_under(&dist, &html_rel).filter(|p| p.is_file()) {
            return serve_file(&html, cache_control_for_path(&html_rel)).await;
        }

        let looks_like_file = Path::new(rel)
            .extension()
            .is_some_and(|ext| !ext.is_empty());
        if looks_like_file {
            return (StatusCode::NOT_FOUND, "File not found").into_response();
        }
    }

    // SPA fallback
    let index = dist.join("index.html");
    if index.is_file() {
        serve_file(&index, cache_control_for_path("index.html")).await
    } else {
        (StatusCode::NOT_FOUND, NOT_BUILT).into_response()
    }
}

/// Joins a URL path below `root`, refusing anything but plain components.
fn resolve_under(root: &Path, rel: &str) -> Option<PathBuf> {
    let rel = Path::new(rel);
    let mut resolved = root.to_path_buf();
    for component in rel.components() {
        match component {
            Component::Normal(part) => resolved.push(part),
            Component::CurDir => {}
            _ => return None,
        }
    }
    Some(resolved)
}

/// Reads a file and wraps it in a response with a guessed content type.
async fn serve_file(path: &Path, cache_control: &'static str) -> Response {
    match tokio::fs::read(path).await {
        Ok(content) => file_response(path, content, cache_control),
        Err(_) => (StatusCode::NOT_FOUND, "File not found").into_response(),
    }
}

/// Creates an HTTP response for a file with appropriate content type.
fn file_response(path: &Path, content: Vec<u8>, cache_control: &'static str) -> Response {
    let mime = mime_guess::from_path(path).first_or_octet_stream();

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, mime.as_ref())
        .header(header::CACHE_CONTROL, cache_control)
        .body(Body::from(content))
        .unwrap_or_else(|_| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to create response",
            )
                .into_response()
        })
}

/// Returns appropriate Cache-Control header based on file path.
///
/// - Hashed build output under `assets/`: long cache (1 year)
/// - HTML files: no cache (always revalidate)
/// - Other files: short cache (1 hour)
fn cache_control_for_path(path: &str) -> &'static str {
    if path.starts_with("assets/") {
        "public, max-age=31536000, immutable"
    } else if Path::new(path)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("html"))
    {
        "no-cache, must-revalidate"
    } else {
        "public, max-age=3600"
    }
}

/// Returns true if `dist` contains a built site entry page.
#[must_use]
pub fn has_built_site(dist: &Path) -> bool {
    dist.join("index.html").is_file()
}
