//! Light/dark theme preference persistence
//!
//! The preference file holds a single token, `dark` or `light`. Anything
//! else, including a missing file, reads as [`ThemeMode::Light`].

use crate::error::{AppError, ErrorContext, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Terminal palette preference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    #[default]
    Light,
    Dark,
}

impl ThemeMode {
    /// Parse a stored token; surrounding whitespace is ignored
    pub fn from_token(token: &str) -> Option<Self> {
        match token.trim() {
            "dark" => Some(Self::Dark),
            "light" => Some(Self::Light),
            _ => None,
        }
    }

    pub fn as_token(&self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    pub fn toggled(&self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }
}

impl fmt::Display for ThemeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_token())
    }
}

/// Reads and writes the theme preference file
#[derive(Debug, Clone)]
pub struct ThemeStore {
    path: PathBuf,
}

impl ThemeStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the stored preference.
    ///
    /// A missing file or unrecognised content gives `Light`. Only real I/O
    /// faults, such as a permission error, are returned as errors.
    pub fn load(&self) -> Result<ThemeMode> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) => Ok(ThemeMode::from_token(&content).unwrap_or_default()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(ThemeMode::Light),
            Err(e) if e.kind() == io::ErrorKind::InvalidData => Ok(ThemeMode::Light),
            Err(e) => Err(AppError::persistence(format!(
                "Failed to read {}: {}",
                self.path.display(),
                e
            ))),
        }
    }

    /// Persist `mode`, replacing the file atomically
    pub fn save(&self, mode: ThemeMode) -> Result<()> {
        let tmp_path = self.temp_path();

        let written = (|| -> io::Result<()> {
            let mut file = std::fs::File::create(&tmp_path)?;
            file.write_all(mode.as_token().as_bytes())?;
            file.sync_all()?;
            std::fs::rename(&tmp_path, &self.path)
        })();

        if let Err(e) = written {
            let _ = std::fs::remove_file(&tmp_path);
            return Err(AppError::persistence(format!(
                "Failed to write {}: {}",
                self.path.display(),
                e
            )));
        }

        Ok(())
    }

    /// Flip the stored preference and return the new value
    pub fn toggle(&self) -> Result<ThemeMode> {
        let next = self.load().context("Toggling theme")?.toggled();
        self.save(next)?;
        Ok(next)
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "theme".into());
        name.push(format!(".{}.tmp", std::process::id()));
        self.path.with_file_name(name)
    }
}

impl Default for ThemeStore {
    fn default() -> Self {
        Self::new(crate::defaults::DEFAULT_THEME_FILE)
    }
}
