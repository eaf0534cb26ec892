//! Session state for persistence
//!
//! Holds what the editor restores across restarts: the markup text and the
//! theme mode. Missing or unreadable values fall back to defaults.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::store::{KeyValueStore, KEY_MARKDOWN_TEXT, KEY_THEME_MODE};
use crate::error::StoreResult;

/// Document shown when nothing has been saved yet
pub const WELCOME_DOCUMENT: &str = "# Welcome to Markdown Studio\n\nAn interactive place to learn Markdown. Here you can:\n\n1. Learn Markdown syntax\n2. Preview your edits live\n3. Work through practice exercises\n\n## Getting started\n\nType Markdown in the editor on the left; the rendered result appears on the right as you type.";

/// Light or dark presentation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    #[default]
    Light,
    Dark,
}

impl ThemeMode {
    /// Switch between light and dark
    pub fn toggle(self) -> Self {
        match self {
            ThemeMode::Light => ThemeMode::Dark,
            ThemeMode::Dark => ThemeMode::Light,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ThemeMode::Light => "light",
            ThemeMode::Dark => "dark",
        }
    }

    pub fn is_dark(self) -> bool {
        self == ThemeMode::Dark
    }
}

impl fmt::Display for ThemeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ThemeMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(ThemeMode::Light),
            "dark" => Ok(ThemeMode::Dark),
            other => Err(format!("unknown theme mode '{}'", other)),
        }
    }
}

/// Session state that can be restored and saved
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    /// Markup text in the editor
    pub text: String,

    /// Presentation mode
    pub theme: ThemeMode,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            text: WELCOME_DOCUMENT.to_string(),
            theme: ThemeMode::default(),
        }
    }
}

impl SessionState {
    /// Create a new session state
    pub fn new() -> Self {
        Self::default()
    }

    /// Restore from a store. Never fails; unreadable values use defaults.
    pub fn load(store: &dyn KeyValueStore) -> Self {
        let mut session = Self::default();

        match store.get(KEY_MARKDOWN_TEXT) {
            // An empty saved text is treated as nothing saved
            Ok(Some(text)) if !text.is_empty() => session.text = text,
            Ok(_) => {}
            Err(e) => log::warn!("Could not load saved text: {}", e),
        }

        match store.get(KEY_THEME_MODE) {
            Ok(Some(mode)) => match mode.parse() {
                Ok(theme) => session.theme = theme,
                Err(e) => log::warn!("Ignoring saved theme: {}", e),
            },
            Ok(None) => {}
            Err(e) => log::warn!("Could not load saved theme: {}", e),
        }

        session
    }

    /// Save both values to a store
    pub fn save(&self, store: &dyn KeyValueStore) -> StoreResult<()> {
        store.set(KEY_MARKDOWN_TEXT, &self.text)?;
        store.set(KEY_THEME_MODE, self.theme.as_str())?;
        Ok(())
    }

    /// Toggle the theme and persist it
    pub fn toggle_theme(&mut self, store: &dyn KeyValueStore) -> StoreResult<ThemeMode> {
        self.theme = self.theme.toggle();
        store.set(KEY_THEME_MODE, self.theme.as_str())?;
        Ok(self.theme)
    }
}
