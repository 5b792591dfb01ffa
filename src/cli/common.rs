//! Shared CLI plumbing: error type, exit codes and the editor session.

use std::fmt;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;

use crate::client::HttpClient;
use crate::config::Config;
use crate::constants::DRAFT_FILE;
use crate::editor::{AuthFlag, AuthGate, Draft, Editor, EditorError, Notice, SessionSnapshot};
use crate::store::ContentStore;

/// Process exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// Command completed
    Success = 0,
    /// Bad input, missing login, rejected image
    Validation = 1,
    /// Local file system failure
    Io = 2,
    /// The persistence service failed or could not be reached
    Remote = 3,
}

/// CLI command failure.
#[derive(Debug)]
pub struct CliError {
    message: String,
    code: ExitCode,
}

/// Result alias for CLI commands.
pub type CliResult<T> = Result<T, CliError>;

impl CliError {
    /// Invalid input or state.
    pub fn validation(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: ExitCode::Validation,
        }
    }

    /// File system failure.
    pub fn io(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: ExitCode::Io,
        }
    }

    /// Network or server failure.
    pub fn remote(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: ExitCode::Remote,
        }
    }

    /// Exit code for this error.
    pub fn exit_code(&self) -> i32 {
        self.code as i32
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

impl From<EditorError> for CliError {
    fn from(e: EditorError) -> Self {
        let message = e.notice().to_string();
        match e {
            EditorError::LoadFailed(_)
            | EditorError::SaveFailed(_)
            | EditorError::UploadFailed(_) => Self::remote(message),
            EditorError::Io(_) => Self::io(message),
            _ => Self::validation(message),
        }
    }
}

/// Prints a value as pretty JSON on stdout.
pub fn output_json<T: Serialize + ?Sized>(value: &T) -> CliResult<()> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| CliError::io(format!("Failed to serialize output: {e}")))?;
    println!("{json}");
    Ok(())
}

/// Prints a notice on stdout.
pub fn print_notice(notice: &Notice) {
    println!("{}", notice.title);
    println!("  {}", notice.description);
}

/// Loads the configuration, reporting failures as validation errors.
pub fn load_config() -> CliResult<Config> {
    Config::load().map_err(|e| CliError::validation(format!("Failed to load configuration: {e:#}")))
}

/// Editor wired to the configured persistence service.
pub type CliEditor = Editor<HttpClient, HttpClient>;

/// An editor whose draft survives between CLI invocations.
pub struct Session {
    /// Loaded configuration
    pub config: Config,
    /// Client for the configured server
    pub client: HttpClient,
    /// Editor holding the resumed draft
    pub editor: CliEditor,
    draft_path: PathBuf,
}

impl Session {
    /// Builds the editor and resumes a stored draft if logged in.
    pub fn open() -> CliResult<Self> {
        let config = load_config()?;
        let dir = Config::config_dir()
            .map_err(|e| CliError::io(format!("Failed to locate config directory: {e}")))?;

        let client = HttpClient::from_config(&config.editor);
        let store = Arc::new(ContentStore::new(client.clone()));
        let auth = AuthGate::new(config.editor.password.clone(), AuthFlag::persistent(&dir));
        let mut editor =
            Editor::new(store, client.clone(), auth).with_quality(config.editor.jpeg_quality);

        let draft_path = dir.join(DRAFT_FILE);
        if editor.is_authenticated() && draft_path.exists() {
            let text = fs::read_to_string(&draft_path).map_err(|e| {
                CliError::io(format!("Failed to read {}: {e}", draft_path.display()))
            })?;
            let snapshot: SessionSnapshot = serde_json::from_str(&text).map_err(|e| {
                CliError::validation(format!(
                    "Stored draft {} is corrupt ({e}); run `logout` to discard it",
                    draft_path.display()
                ))
            })?;
            editor.resume(snapshot)?;
        }

        Ok(Self {
            config,
            client,
            editor,
            draft_path,
        })
    }

    /// Ensures the draft exists, fetching content from the site if needed.
    pub fn ready(&mut self) -> CliResult<&Draft> {
        Ok(self.editor.open()?)
    }

    /// Whether an unsaved draft is stored.
    pub fn has_stored_draft(&self) -> bool {
        self.draft_path.exists()
    }

    /// Stores the current draft and requests.
    pub fn persist(&self) -> CliResult<()> {
        let Some(snapshot) = self.editor.snapshot() else {
            return Ok(());
        };
        let text = serde_json::to_string_pretty(&snapshot)
            .map_err(|e| CliError::io(format!("Failed to serialize draft: {e}")))?;

        if let Some(dir) = self.draft_path.parent() {
            fs::create_dir_all(dir)
                .map_err(|e| CliError::io(format!("Failed to create {}: {e}", dir.display())))?;
        }
        let temp_path = self.draft_path.with_extension("json.tmp");
        fs::write(&temp_path, text)
            .map_err(|e| CliError::io(format!("Failed to write {}: {e}", temp_path.display())))?;
        fs::rename(&temp_path, &self.draft_path).map_err(|e| {
            CliError::io(format!("Failed to write {}: {e}", self.draft_path.display()))
        })
    }

    /// Deletes the stored draft.
    pub fn discard_draft(&self) -> CliResult<()> {
        match fs::remove_file(&self.draft_path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(CliError::io(format!(
                "Failed to remove {}: {e}",
                self.draft_path.display()
            ))),
        }
    }
}
