//! Content editor engine.
//!
//! The editor owns a detached draft of the content document, the pending
//! feature requests and the authentication gate. It is the only writer of
//! the persisted document: edits stay local until [`Editor::save`] sends
//! the whole draft to the persistence service and refreshes the shared
//! [`ContentStore`].
//!
//! State machine:
//!
//! ```text
//! Unauthenticated --login--> Loading --content available--> Ready
//!        ^                      |                             |
//!        +--------logout--------+-------------logout----------+
//! ```
//!
//! Every effectful operation borrows the editor mutably and runs to
//! completion (network calls are bounded by the client timeout), so a
//! session cannot end while one of its requests is still in flight.

pub mod auth;
pub mod commands;
pub mod draft;
pub mod requests;

pub use auth::{AuthFlag, AuthGate, LoginOutcome};
pub use commands::{
    DestinationField, EditCommand, ExperienceField, ExperienceGroup, HomeSectionKey,
    SocialNetwork,
};
pub use draft::{Draft, FieldPath, PathError, PathSegment};
pub use requests::{NewRequest, RequestList};

use std::fmt;
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::api::UploadResponse;
use crate::client::{Backend, ClientError};
use crate::constants::{CONTENT_EXPORT_FILENAME, DEFAULT_JPEG_QUALITY, FEATURE_REQUESTS_KEY};
use crate::content::{ContentDocument, FeatureRequest};
use crate::images::{self, ImageError};
use crate::store::{ContentSource, ContentStore, Snapshot};

// ============================================================================
// Notices and errors
// ============================================================================

/// Severity of a [`Notice`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    /// The action succeeded
    Info,
    /// The action failed
    Error,
}

/// Short user-facing report of an action's outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    /// Short heading
    pub title: String,
    /// One-sentence explanation
    pub description: String,
    /// Severity
    pub level: NoticeLevel,
}

impl Notice {
    /// Success notice.
    pub fn info(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            level: NoticeLevel::Info,
        }
    }

    /// Failure notice.
    pub fn error(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            level: NoticeLevel::Error,
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.title, self.description)
    }
}

/// Editor operation failures.
#[derive(Debug, thiserror::Error)]
pub enum EditorError {
    #[error("not logged in")]
    NotAuthenticated,

    #[error("content is not loaded yet")]
    NotReady,

    #[error("incorrect password")]
    AccessDenied,

    #[error(transparent)]
    InvalidPath(#[from] PathError),

    #[error("please fill in all fields")]
    MissingInformation,

    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Image(#[from] ImageError),

    #[error("invalid JSON file: {0}")]
    Parse(String),

    #[error("failed to load content: {0}")]
    LoadFailed(#[source] ClientError),

    #[error("failed to save content: {0}")]
    SaveFailed(#[source] ClientError),

    #[error("failed to upload image: {0}")]
    UploadFailed(#[source] ClientError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl EditorError {
    /// The failure notice shown for this error.
    pub fn notice(&self) -> Notice {
        match self {
            Self::NotAuthenticated => Notice::error("Not Logged In", "Log in to edit the website content."),
            Self::NotReady => Notice::error("Content Loading", "Content is not loaded yet."),
            Self::AccessDenied => {
                Notice::error("Access Denied", "Incorrect password. Please try again.")
            }
            Self::InvalidPath(e) => Notice::error("Invalid Field", e.to_string()),
            Self::MissingInformation => {
                Notice::error("Missing Information", "Please fill in all fields.")
            }
            Self::Validation(msg) => Notice::error("Invalid Content", msg.clone()),
            Self::Image(ImageError::Format { allowed }) => Notice::error(
                "Invalid Format",
                format!("Please upload one of: {}", allowed.join(", ")),
            ),
            Self::Image(ImageError::TooLarge { size_kb, max_kb }) => Notice::error(
                "Image Too Large",
                format!("Image is {size_kb:.0}KB, max is {max_kb}KB. Try a lower quality image."),
            ),
            Self::Image(e) => Notice::error("Upload Failed", e.to_string()),
            Self::Parse(msg) => Notice::error(
                "Import Failed",
                format!("Invalid JSON file. Please check the file format. ({msg})"),
            ),
            Self::LoadFailed(e) => Notice::error("Load Failed", e.to_string()),
            Self::SaveFailed(e) => Notice::error(
                "Save Failed",
                format!("Could not save changes to the server ({e}). Please try again or use Export."),
            ),
            Self::UploadFailed(e) => Notice::error("Upload Failed", e.to_string()),
            Self::Io(e) => Notice::error("Storage Error", e.to_string()),
        }
    }
}

// ============================================================================
// Editor
// ============================================================================

/// Where the editor is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorState {
    /// Waiting for the password.
    Unauthenticated,
    /// Authenticated, content not yet available.
    Loading,
    /// Authenticated with a draft.
    Ready,
}

/// A file produced for download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exported {
    /// Suggested file name.
    pub filename: String,
    /// File contents.
    pub contents: String,
    /// Notice to show once the file is written.
    pub notice: Notice,
}

/// Draft and requests of an open session, for resuming it later.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    /// Draft tree as last edited
    pub draft: Value,
    /// Requests not yet saved
    #[serde(default)]
    pub feature_requests: Vec<FeatureRequest>,
}

/// The editing session.
pub struct Editor<S, B> {
    store: Arc<ContentStore<S>>,
    backend: B,
    auth: AuthGate,
    quality: f32,
    state: EditorState,
    draft: Option<Draft>,
    requests: RequestList,
}

impl<S: ContentSource, B: Backend> Editor<S, B> {
    /// Creates an editor over the shared store.
    ///
    /// If the gate's durable flag is already set the editor starts
    /// authenticated, and is ready at once when the store is populated.
    pub fn new(store: Arc<ContentStore<S>>, backend: B, auth: AuthGate) -> Self {
        let state = if auth.is_authenticated() {
            EditorState::Loading
        } else {
            EditorState::Unauthenticated
        };
        let mut editor = Self {
            store,
            backend,
            auth,
            quality: DEFAULT_JPEG_QUALITY,
            state,
            draft: None,
            requests: RequestList::default(),
        };
        editor.content_available();
        editor
    }

    /// Sets the lossy re-encode quality used for uploads.
    #[must_use]
    pub fn with_quality(mut self, quality: f32) -> Self {
        self.quality = quality;
        self
    }

    /// Current lifecycle state.
    pub fn state(&self) -> EditorState {
        self.state
    }

    /// Whether a login has been accepted and not yet undone.
    pub fn is_authenticated(&self) -> bool {
        self.state != EditorState::Unauthenticated
    }

    /// Current draft, once ready.
    pub fn draft(&self) -> Option<&Draft> {
        self.draft.as_ref()
    }

    /// Pending feature requests.
    pub fn requests(&self) -> &RequestList {
        &self.requests
    }

    /// The shared content store.
    pub fn store(&self) -> &Arc<ContentStore<S>> {
        &self.store
    }

    // ------------------------------------------------------------------------
    // Session
    // ------------------------------------------------------------------------

    /// Checks `password` against the gate.
    pub fn login(&mut self, password: &str) -> Result<Notice, EditorError> {
        match self.auth.login(password)? {
            LoginOutcome::Denied => {
                warn!("Editor login rejected");
                Err(EditorError::AccessDenied)
            }
            LoginOutcome::Granted => {
                info!("Editor login accepted");
                if self.state == EditorState::Unauthenticated {
                    self.state = EditorState::Loading;
                }
                self.content_available();
                Ok(Notice::info(
                    "Access Granted",
                    "You can now edit the website content.",
                ))
            }
        }
    }

    /// Clears the durable flag and discards the draft and requests.
    pub fn logout(&mut self) -> Result<Notice, EditorError> {
        self.auth.logout()?;
        self.state = EditorState::Unauthenticated;
        self.draft = None;
        self.requests = RequestList::default();
        info!("Editor logged out");
        Ok(Notice::info(
            "Logged Out",
            "You have been logged out of the editor.",
        ))
    }

    /// Loads content through the store if needed and returns the draft.
    pub fn open(&mut self) -> Result<&Draft, EditorError> {
        match self.state {
            EditorState::Unauthenticated => return Err(EditorError::NotAuthenticated),
            EditorState::Loading => {
                let snapshot = self.store.load().map_err(EditorError::LoadFailed)?;
                self.seed(&snapshot);
            }
            EditorState::Ready => {}
        }
        self.draft.as_ref().ok_or(EditorError::NotReady)
    }

    /// Seeds the draft from the store when authenticated and content is
    /// cached. Does nothing otherwise.
    pub fn content_available(&mut self) {
        if self.state != EditorState::Loading {
            return;
        }
        if let Some(snapshot) = self.store.get() {
            self.seed(&snapshot);
        }
    }

    fn seed(&mut self, snapshot: &Snapshot) {
        self.requests =
            RequestList::from_items(snapshot.feature_requests.clone().unwrap_or_default());
        self.draft = Some(Draft::new(snapshot.raw().clone()));
        self.state = EditorState::Ready;
    }

    /// Draft and requests of the open session.
    pub fn snapshot(&self) -> Option<SessionSnapshot> {
        self.draft.as_ref().map(|draft| SessionSnapshot {
            draft: draft.value().clone(),
            feature_requests: self.requests.items().to_vec(),
        })
    }

    /// Restores a session saved with [`Editor::snapshot`].
    pub fn resume(&mut self, snapshot: SessionSnapshot) -> Result<(), EditorError> {
        if self.state == EditorState::Unauthenticated {
            return Err(EditorError::NotAuthenticated);
        }
        self.draft = Some(Draft::new(snapshot.draft));
        self.requests = RequestList::from_items(snapshot.feature_requests);
        self.state = EditorState::Ready;
        Ok(())
    }

    fn ready_draft(&self) -> Result<&Draft, EditorError> {
        match self.state {
            EditorState::Unauthenticated => Err(EditorError::NotAuthenticated),
            EditorState::Loading => Err(EditorError::NotReady),
            EditorState::Ready => self.draft.as_ref().ok_or(EditorError::NotReady),
        }
    }

    fn ready_draft_mut(&mut self) -> Result<&mut Draft, EditorError> {
        match self.state {
            EditorState::Unauthenticated => Err(EditorError::NotAuthenticated),
            EditorState::Loading => Err(EditorError::NotReady),
            EditorState::Ready => self.draft.as_mut().ok_or(EditorError::NotReady),
        }
    }

    // ------------------------------------------------------------------------
    // Editing
    // ------------------------------------------------------------------------

    /// Sets the value at `path` in the draft.
    pub fn update_field(&mut self, path: &FieldPath, value: Value) -> Result<(), EditorError> {
        self.ready_draft_mut()?.update_field(path, value)?;
        Ok(())
    }

    /// Applies a typed edit. All of its updates land, or none do.
    pub fn apply(&mut self, command: EditCommand) -> Result<(), EditorError> {
        let draft = self.ready_draft_mut()?;
        let mut next = draft.clone();
        for (path, value) in command.resolve(draft)? {
            next.update_field(&path, value)?;
        }
        *draft = next;
        Ok(())
    }

    /// The document `save` would send: the draft plus the current requests,
    /// checked against the content schema.
    pub fn content_to_save(&self) -> Result<Value, EditorError> {
        let mut value = self.ready_draft()?.value().clone();
        let requests = serde_json::to_value(self.requests.items())
            .map_err(|e| EditorError::Validation(e.to_string()))?;

        let Value::Object(map) = &mut value else {
            return Err(EditorError::Validation(
                "content document must be a JSON object".to_string(),
            ));
        };
        map.insert(FEATURE_REQUESTS_KEY.to_string(), requests);

        ContentDocument::from_value(value.clone())
            .map_err(|e| EditorError::Validation(format!("draft is not a valid content document: {e}")))?;
        Ok(value)
    }

    /// Persists the draft and refreshes the shared store.
    ///
    /// On failure nothing local changes and the server keeps its previous
    /// file.
    pub fn save(&mut self) -> Result<Notice, EditorError> {
        let document = self.content_to_save()?;

        let response = self
            .backend
            .save_content(&document)
            .map_err(EditorError::SaveFailed)?;
        info!("Content saved: {}", response.message);

        if self.store.reload().is_none() {
            return Ok(Notice::info(
                "Content Saved",
                "Your changes have been saved, but the site content could not be refreshed yet.",
            ));
        }
        Ok(Notice::info(
            "Content Saved",
            "Your changes have been saved to the website.",
        ))
    }

    /// Serializes the draft for download. Does not contact the server.
    pub fn export(&self) -> Result<Exported, EditorError> {
        let contents = serde_json::to_string_pretty(self.ready_draft()?.value())
            .map_err(|e| EditorError::Validation(e.to_string()))?;
        Ok(Exported {
            filename: CONTENT_EXPORT_FILENAME.to_string(),
            contents,
            notice: Notice::info(
                "Content Exported",
                "Your content.json file has been written. Replace the file in the public folder to apply changes.",
            ),
        })
    }

    /// Replaces the draft with an exported document.
    ///
    /// The text must parse as JSON and have the content document's shape;
    /// otherwise the draft is left as it was.
    pub fn import(&mut self, text: &str) -> Result<Notice, EditorError> {
        let draft = self.ready_draft_mut()?;

        let value: Value =
            serde_json::from_str(text).map_err(|e| EditorError::Parse(e.to_string()))?;
        ContentDocument::from_value(value.clone())
            .map_err(|e| EditorError::Parse(format!("not a content document: {e}")))?;

        *draft = Draft::new(value);
        Ok(Notice::info(
            "Content Imported",
            "Content has been loaded. Don't forget to save or export to keep the changes.",
        ))
    }

    // ------------------------------------------------------------------------
    // Feature requests
    // ------------------------------------------------------------------------

    /// Adds a request to the pending list.
    pub fn add_request(&mut self, input: NewRequest) -> Result<Notice, EditorError> {
        self.ready_draft()?;
        self.requests
            .add(input, Utc::now())
            .ok_or(EditorError::MissingInformation)?;
        Ok(Notice::info(
            "Request Added",
            "Your request has been added to the list.",
        ))
    }

    /// Removes the request with `id`.
    pub fn remove_request(&mut self, id: &str) -> Result<Notice, EditorError> {
        self.ready_draft()?;
        if !self.requests.remove(id) {
            return Err(EditorError::Validation(format!("no request with id {id}")));
        }
        Ok(Notice::info("Request Removed", "The request has been deleted."))
    }

    /// Serializes the pending requests for download.
    pub fn export_requests(&self) -> Result<Exported, EditorError> {
        self.ready_draft()?;
        let contents = self
            .requests
            .to_json()
            .map_err(|e| EditorError::Validation(e.to_string()))?;
        Ok(Exported {
            filename: RequestList::export_filename(Utc::now().date_naive()),
            contents,
            notice: Notice::info("Requests Exported", "Feature requests have been written."),
        })
    }

    // ------------------------------------------------------------------------
    // Images
    // ------------------------------------------------------------------------

    /// Validates, resizes and uploads a replacement for `asset`.
    ///
    /// Format and size checks run before any network call.
    pub fn upload_image(
        &mut self,
        asset: &str,
        source_name: &str,
        data: &[u8],
    ) -> Result<(Notice, UploadResponse), EditorError> {
        if !self.is_authenticated() {
            return Err(EditorError::NotAuthenticated);
        }

        let prepared = images::prepare_upload(asset, source_name, data, self.quality)?;
        let response = self
            .backend
            .upload_image(
                &prepared.asset,
                &prepared.output.data,
                prepared.output.format.mime(),
            )
            .map_err(EditorError::UploadFailed)?;
        info!("Uploaded {} to {}", prepared.asset, response.path);

        let notice = Notice::info(
            "Image Uploaded",
            format!("{} has been replaced.", prepared.requirement.name),
        );
        Ok((notice, response))
    }
}
