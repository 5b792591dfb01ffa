//! Application-wide constants.
//!
//! Fixed names shared between the server, the content store and the editor.

/// The display name of the application.
pub const APP_NAME: &str = "Raou Studio";

/// The binary name of the authoring CLI.
pub const APP_BINARY_NAME: &str = "raou";

/// Directory name used under the platform config directory.
pub const CONFIG_DIR_NAME: &str = "RaouStudio";

/// Environment variable that overrides the config directory.
pub const CONFIG_DIR_ENV: &str = "RAOU_CONFIG_DIR";

/// Key of the durable "editor authenticated" flag.
pub const AUTH_FLAG_KEY: &str = "editor_authenticated";

/// Reserved document key the editor merges feature requests under on save.
pub const FEATURE_REQUESTS_KEY: &str = "featureRequests";

/// Relative URL of the content document on the site.
pub const CONTENT_URL_PATH: &str = "/content.json";

/// Suggested file name for a content export.
pub const CONTENT_EXPORT_FILENAME: &str = "content.json";

/// Transport-level cap on a single uploaded image.
pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

/// Image types the upload endpoint accepts, by extension and MIME token.
pub const UPLOAD_IMAGE_TYPES: &[&str] = &["jpeg", "jpg", "png", "webp", "svg"];

/// Default lossy re-encode quality (0.0 - 1.0).
pub const DEFAULT_JPEG_QUALITY: f32 = 0.9;

/// File in the config directory holding the CLI's open editing session.
pub const DRAFT_FILE: &str = "draft.json";
