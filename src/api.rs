//! Wire types of the persistence service.
//!
//! Shared by the axum handlers that produce them and the HTTP client that
//! consumes them.

use serde::{Deserialize, Serialize};

/// API error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    /// Error message.
    pub error: String,
    /// Optional additional details.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    /// Creates an error without details.
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
        }
    }

    /// Creates an error with details.
    pub fn with_details(error: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: Some(details.into()),
        }
    }

    /// One-line message combining error and details.
    pub fn message(&self) -> String {
        match &self.details {
            Some(details) => format!("{}: {}", self.error, details),
            None => self.error.clone(),
        }
    }
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always "ok" while the server is up.
    pub status: String,
    /// Human-readable status line.
    pub message: String,
    /// Server version.
    #[serde(default)]
    pub version: String,
}

/// POST /api/upload-image success response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadResponse {
    /// Always true.
    pub success: bool,
    /// Human-readable status line.
    pub message: String,
    /// Sanitized file name that was written.
    pub filename: String,
    /// Site-relative path of the written asset.
    pub path: String,
}

/// POST /api/save-content success response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveResponse {
    /// Always true.
    pub success: bool,
    /// Human-readable status line.
    pub message: String,
}
