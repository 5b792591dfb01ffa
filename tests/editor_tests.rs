//! End-to-end tests for the content editor.
//!
//! The editor talks to a real persistence service bound to a random local
//! port, through the same HTTP client the CLI uses.

#![cfg(feature = "server")]

mod fixtures;

use std::fs;
use std::net::SocketAddr;
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use image::ImageFormat;
use serde_json::{json, Value};
use tempfile::TempDir;

use fixtures::{noise_image, solid_image, temp_site};
use raou_studio::api::{SaveResponse, UploadResponse};
use raou_studio::client::{Backend, ClientError, HttpClient};
use raou_studio::config::ServerConfig;
use raou_studio::content::RequestKind;
use raou_studio::editor::{
    AuthFlag, AuthGate, EditCommand, Editor, EditorError, EditorState, FieldPath, NewRequest,
};
use raou_studio::store::ContentStore;
use raou_studio::web::{create_router, AppState};

const PASSWORD: &str = "test-password";

/// Serves `config` on an ephemeral port from a background runtime.
fn spawn_server(config: ServerConfig) -> SocketAddr {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()
            .unwrap();
        runtime.block_on(async move {
            let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
            tx.send(listener.local_addr().unwrap()).unwrap();
            axum::serve(listener, create_router(AppState::new(config)))
                .await
                .unwrap();
        });
    });
    rx.recv_timeout(Duration::from_secs(10))
        .expect("server did not start")
}

struct Harness {
    _site: TempDir,
    config: ServerConfig,
    client: HttpClient,
}

impl Harness {
    fn start() -> Self {
        let (site, config) = temp_site();
        let addr = spawn_server(config.clone());
        let url = format!("http://{addr}");
        let client = HttpClient::new(&url, &url, Duration::from_secs(5));
        Self {
            _site: site,
            config,
            client,
        }
    }

    fn editor(&self) -> Editor<HttpClient, HttpClient> {
        let store = Arc::new(ContentStore::new(self.client.clone()));
        Editor::new(
            store,
            self.client.clone(),
            AuthGate::new(PASSWORD, AuthFlag::in_memory()),
        )
    }

    fn saved_document(&self) -> Value {
        serde_json::from_str(&fs::read_to_string(self.config.content_path()).unwrap()).unwrap()
    }
}

/// Backend that records calls and never touches the network.
#[derive(Default)]
struct CountingBackend {
    uploads: Mutex<Vec<String>>,
}

impl Backend for CountingBackend {
    fn save_content(&self, _document: &Value) -> Result<SaveResponse, ClientError> {
        Ok(SaveResponse {
            success: true,
            message: "Content saved successfully".to_string(),
        })
    }

    fn upload_image(
        &self,
        filename: &str,
        _data: &[u8],
        _content_type: &str,
    ) -> Result<UploadResponse, ClientError> {
        self.uploads.lock().unwrap().push(filename.to_string());
        Ok(UploadResponse {
            success: true,
            message: "Image uploaded successfully".to_string(),
            filename: filename.to_string(),
            path: format!("/src/assets/{filename}"),
        })
    }
}

// ============================================================================
// Session
// ============================================================================

#[test]
fn test_login_loads_content_into_draft() {
    let harness = Harness::start();
    let mut editor = harness.editor();
    assert_eq!(editor.state(), EditorState::Unauthenticated);

    let err = editor.login("wrong").unwrap_err();
    assert!(matches!(err, EditorError::AccessDenied));
    assert_eq!(err.notice().title, "Access Denied");

    editor.login(PASSWORD).unwrap();
    assert_eq!(editor.state(), EditorState::Loading);

    let draft = editor.open().unwrap();
    assert_eq!(draft.value()["site"]["name"], "Raou Travel");
    assert_eq!(editor.state(), EditorState::Ready);
}

#[test]
fn test_editing_requires_login() {
    let harness = Harness::start();
    let mut editor = harness.editor();

    let err = editor
        .apply(EditCommand::SiteName("Raou".to_string()))
        .unwrap_err();
    assert!(matches!(err, EditorError::NotAuthenticated));
    assert!(matches!(editor.save(), Err(EditorError::NotAuthenticated)));
}

// ============================================================================
// Save
// ============================================================================

#[test]
fn test_save_persists_and_refreshes_store() {
    let harness = Harness::start();
    let mut editor = harness.editor();
    editor.login(PASSWORD).unwrap();
    editor.open().unwrap();

    let before = editor.store().get().unwrap();
    editor
        .apply(EditCommand::SiteName("Raou".to_string()))
        .unwrap();

    // Draft edits never reach the shared store until saved
    assert_eq!(editor.store().get().unwrap().site.name, "Raou Travel");
    assert_eq!(before.site.name, "Raou Travel");

    let notice = editor.save().unwrap();
    assert_eq!(notice.title, "Content Saved");

    assert_eq!(harness.saved_document()["site"]["name"], "Raou");
    assert_eq!(editor.store().get().unwrap().site.name, "Raou");
}

#[test]
fn test_save_includes_feature_requests() {
    let harness = Harness::start();
    let mut editor = harness.editor();
    editor.login(PASSWORD).unwrap();
    editor.open().unwrap();

    editor
        .add_request(NewRequest {
            kind: Some(RequestKind::ContentEdit),
            title: "Update hero".to_string(),
            description: "New copy for the hero".to_string(),
            priority: Default::default(),
        })
        .unwrap();
    editor.save().unwrap();

    let saved = harness.saved_document();
    let requests = saved["featureRequests"].as_array().unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0]["type"], "content-edit");
    assert_eq!(requests[0]["title"], "Update hero");
}

#[test]
fn test_save_failure_keeps_draft() {
    let harness = Harness::start();
    let mut editor = harness.editor();
    editor.login(PASSWORD).unwrap();
    editor.open().unwrap();
    editor
        .apply(EditCommand::SiteName("Raou".to_string()))
        .unwrap();

    // Make the content file unwritable by turning its path into a directory
    let content_path = harness.config.content_path();
    fs::remove_file(&content_path).unwrap();
    fs::create_dir_all(&content_path).unwrap();

    let err = editor.save().unwrap_err();
    assert!(matches!(err, EditorError::SaveFailed(_)));
    assert_eq!(err.notice().title, "Save Failed");
    assert_eq!(editor.draft().unwrap().value()["site"]["name"], "Raou");
}

#[test]
fn test_open_save_round_trip_keeps_unknown_fields() {
    let harness = Harness::start();
    let mut document = harness.saved_document();
    document["tripFinder"] = json!({ "enabled": true });
    document["site"]["logoAlt"] = json!("Raou logo");
    fs::write(
        harness.config.content_path(),
        serde_json::to_string_pretty(&document).unwrap(),
    )
    .unwrap();

    let mut editor = harness.editor();
    editor.login(PASSWORD).unwrap();
    editor.open().unwrap();
    editor.save().unwrap();

    let saved = harness.saved_document();
    assert_eq!(saved["tripFinder"]["enabled"], true);
    assert_eq!(saved["site"]["logoAlt"], "Raou logo");
    assert_eq!(saved["site"]["name"], "Raou Travel");
}

#[test]
fn test_path_update_reaches_nested_field() {
    let harness = Harness::start();
    let mut editor = harness.editor();
    editor.login(PASSWORD).unwrap();
    editor.open().unwrap();

    let path: FieldPath = "about.philosophy.values[0].title".parse().unwrap();
    editor.update_field(&path, json!("Curiosity")).unwrap();
    editor.save().unwrap();

    let saved = harness.saved_document();
    assert_eq!(saved["about"]["philosophy"]["values"][0]["title"], "Curiosity");
    assert_eq!(saved["about"]["philosophy"]["values"][0]["description"], "Always");
}

#[test]
fn test_invalid_draft_is_not_sent() {
    let harness = Harness::start();
    let mut editor = harness.editor();
    editor.login(PASSWORD).unwrap();
    editor.open().unwrap();

    let before = fs::read_to_string(harness.config.content_path()).unwrap();
    editor
        .update_field(&"site.name".parse::<FieldPath>().unwrap(), json!(42))
        .unwrap();

    let err = editor.save().unwrap_err();
    assert!(matches!(err, EditorError::Validation(_)));
    assert_eq!(fs::read_to_string(harness.config.content_path()).unwrap(), before);
}

// ============================================================================
// Export / Import
// ============================================================================

#[test]
fn test_export_import_round_trip() {
    let harness = Harness::start();
    let mut editor = harness.editor();
    editor.login(PASSWORD).unwrap();
    editor.open().unwrap();
    editor
        .apply(EditCommand::HeroTitle("Go further".to_string()))
        .unwrap();

    let exported = editor.export().unwrap();
    assert_eq!(exported.filename, "content.json");

    let mut other = harness.editor();
    other.login(PASSWORD).unwrap();
    other.open().unwrap();
    other.import(&exported.contents).unwrap();
    assert_eq!(
        other.draft().unwrap().value()["home"]["hero"]["title"],
        "Go further"
    );

    let err = other.import("{ nope").unwrap_err();
    assert!(matches!(err, EditorError::Parse(_)));
    assert_eq!(err.notice().title, "Import Failed");
    assert_eq!(
        other.draft().unwrap().value()["home"]["hero"]["title"],
        "Go further"
    );
}

// ============================================================================
// Images
// ============================================================================

#[test]
fn test_upload_image_replaces_asset() {
    let harness = Harness::start();
    let mut editor = harness.editor();
    editor.login(PASSWORD).unwrap();

    let source = solid_image(400, 400, ImageFormat::Png);
    let (notice, response) = editor
        .upload_image("logo.png", "brand-mark.png", &source)
        .unwrap();

    assert_eq!(notice.title, "Image Uploaded");
    assert_eq!(response.filename, "logo.png");
    assert_eq!(response.path, "/src/assets/logo.png");

    let written = fs::read(harness.config.assets_path().join("logo.png")).unwrap();
    let decoded = image::load_from_memory(&written).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (200, 200));
}

#[test]
fn test_upload_wrong_format_makes_no_network_call() {
    let backend = Arc::new(CountingBackend::default());
    let (_site, config) = temp_site();
    let source = raou_studio::store::FileSource::new(config.content_path());
    let mut editor = Editor::new(
        Arc::new(ContentStore::new(source)),
        Arc::clone(&backend),
        AuthGate::new(PASSWORD, AuthFlag::in_memory()),
    );
    editor.login(PASSWORD).unwrap();

    let jpeg = solid_image(400, 400, ImageFormat::Jpeg);
    let err = editor
        .upload_image("logo.png", "holiday.jpeg", &jpeg)
        .unwrap_err();

    assert_eq!(err.notice().title, "Invalid Format");
    assert!(backend.uploads.lock().unwrap().is_empty());
}

#[test]
fn test_upload_oversized_image_makes_no_network_call() {
    let backend = Arc::new(CountingBackend::default());
    let (_site, config) = temp_site();
    let source = raou_studio::store::FileSource::new(config.content_path());
    let mut editor = Editor::new(
        Arc::new(ContentStore::new(source)),
        Arc::clone(&backend),
        AuthGate::new(PASSWORD, AuthFlag::in_memory()),
    );
    editor.login(PASSWORD).unwrap();

    // Per-pixel noise stays far above the logo's size cap after resizing
    let noisy = noise_image(200, 200);
    let err = editor
        .upload_image("logo.png", "brand-mark.png", &noisy)
        .unwrap_err();

    assert_eq!(err.notice().title, "Image Too Large");
    assert!(backend.uploads.lock().unwrap().is_empty());
}

#[test]
fn test_upload_unknown_asset_rejected() {
    let backend = Arc::new(CountingBackend::default());
    let (_site, config) = temp_site();
    let source = raou_studio::store::FileSource::new(config.content_path());
    let mut editor = Editor::new(
        Arc::new(ContentStore::new(source)),
        Arc::clone(&backend),
        AuthGate::new(PASSWORD, AuthFlag::in_memory()),
    );
    editor.login(PASSWORD).unwrap();

    let png = solid_image(10, 10, ImageFormat::Png);
    assert!(editor.upload_image("favicon.ico", "icon.png", &png).is_err());
    assert!(backend.uploads.lock().unwrap().is_empty());
}
