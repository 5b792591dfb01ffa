//! Shared-password gate with a durable "authenticated" flag.
//!
//! The flag outlives the process so a restarted editor goes straight back
//! to the authenticated state. Only logout clears it.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::constants::AUTH_FLAG_KEY;

/// Durable boolean flag, file-backed or in memory.
#[derive(Debug, Clone, Default)]
pub struct AuthFlag {
    path: Option<PathBuf>,
    value: bool,
}

impl AuthFlag {
    /// A flag that lives only as long as this value.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// A flag stored as a file named after the flag key inside `dir`.
    ///
    /// The flag is set when the file exists and contains `true`.
    pub fn persistent(dir: &Path) -> Self {
        let path = dir.join(AUTH_FLAG_KEY);
        let value = fs::read_to_string(&path)
            .map(|s| s.trim() == "true")
            .unwrap_or(false);
        Self {
            path: Some(path),
            value,
        }
    }

    /// Current value.
    pub fn is_set(&self) -> bool {
        self.value
    }

    /// Sets the flag and persists it.
    pub fn set(&mut self) -> io::Result<()> {
        if let Some(path) = &self.path {
            if let Some(dir) = path.parent() {
                fs::create_dir_all(dir)?;
            }
            fs::write(path, "true")?;
        }
        self.value = true;
        Ok(())
    }

    /// Clears the flag and removes its file.
    pub fn clear(&mut self) -> io::Result<()> {
        if let Some(path) = &self.path {
            match fs::remove_file(path) {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => return Err(e),
            }
        }
        self.value = false;
        Ok(())
    }
}

/// Compares input against the configured password and tracks the flag.
#[derive(Debug, Clone)]
pub struct AuthGate {
    password: String,
    flag: AuthFlag,
}

/// Outcome of a login attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginOutcome {
    /// Password matched; the durable flag is now set
    Granted,
    /// Password did not match
    Denied,
}

impl AuthGate {
    /// Creates a gate for `password`.
    pub fn new(password: impl Into<String>, flag: AuthFlag) -> Self {
        Self {
            password: password.into(),
            flag,
        }
    }

    /// Whether the durable flag is set.
    pub fn is_authenticated(&self) -> bool {
        self.flag.is_set()
    }

    /// Checks `attempt`; sets the flag on a match.
    pub fn login(&mut self, attempt: &str) -> io::Result<LoginOutcome> {
        if attempt != self.password {
            return Ok(LoginOutcome::Denied);
        }
        self.flag.set()?;
        Ok(LoginOutcome::Granted)
    }

    /// Clears the flag.
    pub fn logout(&mut self) -> io::Result<()> {
        self.flag.clear()
    }
}
