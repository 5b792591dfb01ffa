//! CLI command handlers for Raou Studio.
//!
//! Headless access to the content editor: each invocation resumes the
//! stored draft, applies one action and stores the draft again.

pub mod common;
pub mod config;
pub mod content;
pub mod requests;
pub mod session;
pub mod upload;

// Re-export types used by main.rs and tests
pub use common::{CliError, CliResult, ExitCode};
pub use config::ConfigArgs;
pub use content::{EditArgs, ExportArgs, ImportArgs, SaveArgs, SetArgs, ShowArgs};
pub use requests::RequestsArgs;
pub use session::{LoginArgs, LogoutArgs, StatusArgs};
pub use upload::{RequirementsArgs, UploadArgs};
