//! Session state handed to the presentation layer.
//!
//! Lifecycle: `init` loads preferences from disk (when a path is configured),
//! `set_dark_mode` mutates them and persists the new value straight away.
//! Authentication is a placeholder flag; there are no credentials.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::errors::{AppError, ResultExt};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    pub dark_mode: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Session {
    pub authenticated: bool,
    pub preferences: Preferences,
    #[serde(skip)]
    preferences_path: Option<PathBuf>,
}

impl Session {
    /// Starts a session, reading stored preferences if there are any.
    ///
    /// A missing file means defaults; an unreadable or malformed file is an
    /// error.
    pub async fn init(preferences_path: Option<PathBuf>) -> Result<Self, AppError> {
        let preferences = match preferences_path.as_deref() {
            Some(path) => load_preferences(path)
                .await
                .with_context(|| format!("loading preferences from {}", path.display()))?,
            None => Preferences::default(),
        };

        tracing::debug!("Session initialized with {:?}", preferences);

        Ok(Self {
            authenticated: true,
            preferences,
            preferences_path,
        })
    }

    /// Updates the theme and persists it if it changed.
    pub async fn set_dark_mode(&mut self, dark_mode: bool) -> Result<(), AppError> {
        if self.preferences.dark_mode == dark_mode {
            return Ok(());
        }
        self.preferences.dark_mode = dark_mode;
        tracing::info!("Dark mode {}", if dark_mode { "enabled" } else { "disabled" });

        if let Some(path) = self.preferences_path.as_deref() {
            save_preferences(path, &self.preferences)
                .await
                .with_context(|| format!("saving preferences to {}", path.display()))?;
        }
        Ok(())
    }

    pub fn login(&mut self) {
        self.authenticated = true;
        tracing::info!("Session logged in");
    }

    pub fn logout(&mut self) {
        self.authenticated = false;
        tracing::info!("Session logged out");
    }
}

async fn load_preferences(path: &Path) -> Result<Preferences, AppError> {
    match tokio::fs::read_to_string(path).await {
        Ok(content) => Ok(serde_json::from_str(&content)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Preferences::default()),
        Err(e) => Err(e.into()),
    }
}

async fn save_preferences(path: &Path, preferences: &Preferences) -> Result<(), AppError> {
    let content = serde_json::to_string_pretty(preferences)?;
    tokio::fs::write(path, content).await?;
    Ok(())
}
