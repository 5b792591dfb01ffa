//! HTTP client for the persistence service.
//!
//! Sync client built on a `ureq` agent with a global timeout. Every call is
//! one-shot; a stalled request ends in [`ClientError::Timeout`] instead of
//! hanging.

use std::time::Duration;

use chrono::Utc;
use serde::de::DeserializeOwned;
use tracing::{debug, info};
use ureq::Agent;

use crate::api::{ApiError, HealthResponse, SaveResponse, UploadResponse};
use crate::config::EditorConfig;
use crate::constants::CONTENT_URL_PATH;
use crate::store::ContentSource;

/// Longest error body echoed back when the server did not send `{error}`.
const MAX_ERROR_BODY: usize = 200;

/// Error from talking to the site or the persistence service.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The request did not complete within the configured timeout.
    #[error("request timed out")]
    Timeout,

    /// Network failure (connection refused, DNS, protocol error).
    #[error("network error: {0}")]
    Network(ureq::Error),

    /// The server answered with a non-2xx status.
    #[error("HTTP {status}: {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Best-effort message taken from the response body.
        message: String,
    },

    /// The response (or a local file) was not the expected JSON.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Local I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<ureq::Error> for ClientError {
    fn from(e: ureq::Error) -> Self {
        match e {
            ureq::Error::Timeout(_) => Self::Timeout,
            ureq::Error::Io(io) if io.kind() == std::io::ErrorKind::TimedOut => Self::Timeout,
            other => Self::Network(other),
        }
    }
}

/// Effectful operations the editor needs from the persistence service.
pub trait Backend {
    /// Overwrites the content document on the server.
    fn save_content(&self, document: &serde_json::Value) -> Result<SaveResponse, ClientError>;

    /// Replaces an image asset on the server.
    fn upload_image(
        &self,
        filename: &str,
        data: &[u8],
        content_type: &str,
    ) -> Result<UploadResponse, ClientError>;
}

impl<T: Backend + ?Sized> Backend for std::sync::Arc<T> {
    fn save_content(&self, document: &serde_json::Value) -> Result<SaveResponse, ClientError> {
        (**self).save_content(document)
    }

    fn upload_image(
        &self,
        filename: &str,
        data: &[u8],
        content_type: &str,
    ) -> Result<UploadResponse, ClientError> {
        (**self).upload_image(filename, data, content_type)
    }
}

/// Client for the site (content document) and the persistence service.
#[derive(Clone)]
pub struct HttpClient {
    agent: Agent,
    server_url: String,
    site_url: String,
}

impl HttpClient {
    /// Creates a client.
    ///
    /// # Arguments
    /// * `server_url` - Base URL of the persistence service
    /// * `site_url` - Base URL the content document is served from
    /// * `timeout` - Upper bound for every request
    pub fn new(server_url: &str, site_url: &str, timeout: Duration) -> Self {
        let agent = Agent::config_builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(false)
            .build()
            .into();

        Self {
            agent,
            server_url: server_url.trim_end_matches('/').to_owned(),
            site_url: site_url.trim_end_matches('/').to_owned(),
        }
    }

    /// Creates a client from the editor configuration.
    pub fn from_config(config: &EditorConfig) -> Self {
        Self::new(
            &config.server_url,
            &config.site_url,
            Duration::from_secs(config.timeout_secs),
        )
    }

    /// URL of the content document; `fresh` adds a cache-busting parameter.
    pub fn content_url(&self, fresh: bool) -> String {
        if fresh {
            format!(
                "{}{}?t={}",
                self.site_url,
                CONTENT_URL_PATH,
                Utc::now().timestamp_millis()
            )
        } else {
            format!("{}{}", self.site_url, CONTENT_URL_PATH)
        }
    }

    fn api_url(&self, endpoint: &str) -> String {
        format!("{}/api/{}", self.server_url, endpoint)
    }

    /// GET /api/health.
    pub fn health(&self) -> Result<HealthResponse, ClientError> {
        let response = self.agent.get(&self.api_url("health")).call()?;
        read_json(response)
    }

    /// Fetches the content document as an untyped tree.
    pub fn fetch_content(&self, fresh: bool) -> Result<serde_json::Value, ClientError> {
        let url = self.content_url(fresh);
        debug!("Fetching content from {}", url);
        let response = self
            .agent
            .get(&url)
            .header("Accept", "application/json")
            .call()?;
        read_json(response)
    }
}

impl ContentSource for HttpClient {
    fn fetch(&self, fresh: bool) -> Result<serde_json::Value, ClientError> {
        self.fetch_content(fresh)
    }
}

impl Backend for HttpClient {
    fn save_content(&self, document: &serde_json::Value) -> Result<SaveResponse, ClientError> {
        let body = serde_json::to_vec(document)?;
        let response = self
            .agent
            .post(&self.api_url("save-content"))
            .header("Content-Type", "application/json")
            .header("Accept", "application/json")
            .send(&body[..])?;
        let saved: SaveResponse = read_json(response)?;
        info!("Content saved to server");
        Ok(saved)
    }

    fn upload_image(
        &self,
        filename: &str,
        data: &[u8],
        content_type: &str,
    ) -> Result<UploadResponse, ClientError> {
        let boundary = format!("----RaouFormBoundary{}", uuid::Uuid::new_v4().simple());
        let body = multipart_body(&boundary, filename, data, content_type);

        info!("Uploading image '{}' ({} bytes)", filename, data.len());
        let response = self
            .agent
            .post(&self.api_url("upload-image"))
            .header(
                "Content-Type",
                &format!("multipart/form-data; boundary={boundary}"),
            )
            .header("Accept", "application/json")
            .send(&body[..])?;
        read_json(response)
    }
}

/// Builds the `image` + `filename` multipart form the upload endpoint expects.
fn multipart_body(boundary: &str, filename: &str, data: &[u8], content_type: &str) -> Vec<u8> {
    let mut body = Vec::with_capacity(data.len() + 512);

    body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
    body.extend_from_slice(
        format!("Content-Disposition: form-data; name=\"image\"; filename=\"{filename}\"\r\n")
            .as_bytes(),
    );
    body.extend_from_slice(format!("Content-Type: {content_type}\r\n\r\n").as_bytes());
    body.extend_from_slice(data);
    body.extend_from_slice(b"\r\n");

    body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
    body.extend_from_slice(b"Content-Disposition: form-data; name=\"filename\"\r\n\r\n");
    body.extend_from_slice(filename.as_bytes());
    body.extend_from_slice(b"\r\n");

    body.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());
    body
}

/// Reads a JSON body, turning non-2xx answers into [`ClientError::Status`].
fn read_json<T: DeserializeOwned>(
    response: ureq::http::Response<ureq::Body>,
) -> Result<T, ClientError> {
    let status = response.status().as_u16();
    let mut body = response.into_body();

    if !(200..300).contains(&status) {
        let text = body
            .read_to_string()
            .unwrap_or_else(|_| "(unable to read error body)".to_string());
        return Err(ClientError::Status {
            status,
            message: error_message(&text),
        });
    }

    let text = body.read_to_string()?;
    Ok(serde_json::from_str(&text)?)
}

/// Extracts a readable message from an error body.
fn error_message(body: &str) -> String {
    if let Ok(api_error) = serde_json::from_str::<ApiError>(body) {
        return api_error.message();
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "(empty response)".to_string();
    }
    trimmed.chars().take(MAX_ERROR_BODY).collect()
}
