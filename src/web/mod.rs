//! Persistence service for the Raou site.
//!
//! The only process that writes the site's files. It accepts replacement
//! images and whole-document content saves from the editor, and serves the
//! built site with the canonical content document.
//!
//! # Endpoints
//!
//! - `POST /api/upload-image` - Multipart `image` + `filename`; writes into the assets directory
//! - `POST /api/save-content` - Overwrites the content document
//! - `GET /api/health` - Health check
//! - `GET /content.json` - Canonical content document (no-cache, ETag)
//! - `GET *` - Built site with SPA fallback

pub mod static_files;

use std::io;
use std::path::Path;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{multipart::MultipartError, DefaultBodyLimit, Multipart, State},
    http::{header, HeaderMap, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use sha2::{Digest, Sha256};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::api::{ApiError, HealthResponse, SaveResponse, UploadResponse};
use crate::config::ServerConfig;
use crate::constants::{CONTENT_URL_PATH, UPLOAD_IMAGE_TYPES};

/// Allowance for multipart framing and the `filename` field on top of the
/// file size cap.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

// ============================================================================
// Application State
// ============================================================================

/// Shared state for the persistence service.
#[derive(Clone)]
pub struct AppState {
    config: Arc<ServerConfig>,
}

impl AppState {
    /// Creates a new application state.
    pub fn new(config: ServerConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    /// Server settings.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }
}

type ApiRejection = (StatusCode, Json<ApiError>);

fn reject(status: StatusCode, error: ApiError) -> ApiRejection {
    (status, Json(error))
}

// ============================================================================
// Upload Validation (Security)
// ============================================================================

/// Reduces a client-supplied name to its final path component.
///
/// Both `/` and `\` count as separators. Returns `None` when nothing usable
/// is left (empty, `.`, `..`, or a NUL byte).
pub fn sanitize_filename(name: &str) -> Option<&str> {
    let trimmed = name.trim_end_matches(['/', '\\']);
    let base = trimmed.rsplit(['/', '\\']).next().unwrap_or(trimmed);

    if base.is_empty() || base == "." || base == ".." || base.contains('\0') {
        return None;
    }
    Some(base)
}

/// Whether `token` names one of the accepted image types.
///
/// Substring match, so `image/svg+xml` and `jpeg` both pass.
fn names_image_type(token: &str) -> bool {
    let token = token.to_ascii_lowercase();
    UPLOAD_IMAGE_TYPES.iter().any(|t| token.contains(t))
}

/// Upload filter: the part's file-name extension and its MIME type must
/// both name an accepted image type.
pub fn is_allowed_image(original_name: &str, content_type: &str) -> bool {
    let extension = Path::new(original_name)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default();
    names_image_type(extension) && names_image_type(content_type)
}

/// Writes `data` next to `path` and renames it into place.
async fn write_atomic(path: &Path, data: &[u8]) -> io::Result<()> {
    let file_name = path
        .file_name()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "path has no file name"))?;
    let temp_path = path.with_file_name(format!(".{}.tmp", file_name.to_string_lossy()));

    tokio::fs::write(&temp_path, data).await?;
    if let Err(e) = tokio::fs::rename(&temp_path, path).await {
        let _ = tokio::fs::remove_file(&temp_path).await;
        return Err(e);
    }
    Ok(())
}

// ============================================================================
// Route Handlers
// ============================================================================

/// GET /api/health - Health check endpoint.
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        message: "Upload server is running".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

fn multipart_rejection(e: &MultipartError) -> ApiRejection {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return reject(StatusCode::PAYLOAD_TOO_LARGE, ApiError::new("File too large"));
    }
    reject(
        StatusCode::BAD_REQUEST,
        ApiError::with_details("Invalid upload", e.body_text()),
    )
}

/// POST /api/upload-image - Replace an image asset.
async fn upload_image(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiRejection> {
    let mut file: Option<Bytes> = None;
    let mut filename: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_rejection(&e))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("image") => {
                let original_name = field.file_name().unwrap_or_default().to_string();
                let content_type = field.content_type().unwrap_or_default().to_string();
                if !is_allowed_image(&original_name, &content_type) {
                    warn!(
                        "Rejected upload '{}' ({})",
                        original_name, content_type
                    );
                    return Err(reject(
                        StatusCode::BAD_REQUEST,
                        ApiError::new("Only image files are allowed!"),
                    ));
                }
                file = Some(field.bytes().await.map_err(|e| multipart_rejection(&e))?);
            }
            Some("filename") => {
                filename = Some(field.text().await.map_err(|e| multipart_rejection(&e))?);
            }
            _ => {}
        }
    }

    let data = file.ok_or_else(|| {
        reject(StatusCode::BAD_REQUEST, ApiError::new("No file uploaded"))
    })?;
    if data.len() > state.config.max_upload_bytes {
        return Err(reject(
            StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::new("File too large"),
        ));
    }

    let requested = filename
        .filter(|f| !f.is_empty())
        .ok_or_else(|| reject(StatusCode::BAD_REQUEST, ApiError::new("Filename is required")))?;
    let safe_name = sanitize_filename(&requested).ok_or_else(|| {
        reject(
            StatusCode::BAD_REQUEST,
            ApiError::with_details("Invalid filename", requested.clone()),
        )
    })?;

    let assets_dir = state.config.assets_path();
    let target = assets_dir.join(safe_name);
    let written = async {
        tokio::fs::create_dir_all(&assets_dir).await?;
        write_atomic(&target, &data).await
    }
    .await;

    if let Err(e) = written {
        error!("Upload of {} failed: {}", safe_name, e);
        return Err(reject(
            StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::with_details("Failed to upload image", e.to_string()),
        ));
    }

    info!("Image uploaded: {} ({} bytes)", safe_name, data.len());
    Ok(Json(UploadResponse {
        success: true,
        message: "Image uploaded successfully".to_string(),
        filename: safe_name.to_string(),
        path: format!("{}/{}", state.config.assets_url_prefix(), safe_name),
    }))
}

/// POST /api/save-content - Overwrite the content document.
async fn save_content(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<SaveResponse>, ApiRejection> {
    let no_content = || reject(StatusCode::BAD_REQUEST, ApiError::new("No content provided"));

    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(no_content());
    }
    let content: serde_json::Value = serde_json::from_slice(&body).map_err(|e| {
        reject(
            StatusCode::BAD_REQUEST,
            ApiError::with_details("Invalid JSON", e.to_string()),
        )
    })?;
    if content.is_null() {
        return Err(no_content());
    }
    if !content.is_object() {
        return Err(reject(
            StatusCode::BAD_REQUEST,
            ApiError::new("Content must be a JSON object"),
        ));
    }

    let path = state.config.content_path();
    let written = async {
        let text = serde_json::to_string_pretty(&content).map_err(io::Error::other)?;
        if let Some(dir) = path.parent() {
            tokio::fs::create_dir_all(dir).await?;
        }
        write_atomic(&path, text.as_bytes()).await
    }
    .await;

    if let Err(e) = written {
        error!("Saving {} failed: {}", path.display(), e);
        return Err(reject(
            StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::with_details("Failed to save content", e.to_string()),
        ));
    }

    info!("Content saved to {}", path.display());
    Ok(Json(SaveResponse {
        success: true,
        message: "Content saved successfully".to_string(),
    }))
}

/// Strong ETag of a byte string.
fn etag_for(data: &[u8]) -> String {
    format!("\"{:x}\"", Sha256::digest(data))
}

/// GET /content.json - The canonical content document.
///
/// Query strings (reload cache-busters) are ignored.
async fn content_json(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, ApiRejection> {
    let path = state.config.content_path();
    let data = tokio::fs::read(&path).await.map_err(|e| {
        if e.kind() == io::ErrorKind::NotFound {
            reject(StatusCode::NOT_FOUND, ApiError::new("Content not found"))
        } else {
            reject(
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::with_details("Failed to read content", e.to_string()),
            )
        }
    })?;

    let etag = etag_for(&data);
    let not_modified = headers
        .get(header::IF_NONE_MATCH)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.split(',').any(|tag| tag.trim() == etag));

    let response_headers = [
        (header::CONTENT_TYPE, "application/json".to_string()),
        (header::CACHE_CONTROL, "no-cache".to_string()),
        (header::ETAG, etag),
    ];
    if not_modified {
        return Ok((StatusCode::NOT_MODIFIED, response_headers).into_response());
    }
    Ok((StatusCode::OK, response_headers, data).into_response())
}

// ============================================================================
// Router Setup
// ============================================================================

fn cors_layer(config: &ServerConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(true)
}

/// Creates the service router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes + MULTIPART_OVERHEAD;

    Router::new()
        .route("/api/health", get(health_check))
        .route("/api/upload-image", post(upload_image))
        .route("/api/save-content", post(save_content))
        .route(CONTENT_URL_PATH, get(content_json))
        .fallback(static_files::serve_static)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors_layer(&state.config))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Runs the persistence service until the process is stopped.
///
/// # Errors
///
/// Returns an error if the address is invalid or cannot be bound.
pub async fn run_server(config: ServerConfig) -> anyhow::Result<()> {
    let addr = config.socket_addr()?;

    if static_files::has_built_site(&config.dist_path()) {
        info!("Serving static files from: {}", config.dist_path().display());
    } else {
        warn!(
            "No built site at {}; unmatched routes will return 404",
            config.dist_path().display()
        );
    }
    info!("Serving uploads to: {}", config.assets_path().display());
    info!("Content document: {}", config.content_path().display());

    let app = create_router(AppState::new(config));

    info!("Raou persistence service running on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
