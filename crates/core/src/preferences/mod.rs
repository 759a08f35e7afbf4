//! Persisted process-wide preferences.
//!
//! Preferences are loaded once at startup and written back through the
//! [`PreferenceStore`] whenever they change.

mod sqlite;

pub use sqlite::SqlitePreferenceStore;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum PreferenceError {
    #[error("Invalid preference: {0}")]
    Validation(String),

    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),
}

impl From<rusqlite::Error> for PreferenceError {
    fn from(e: rusqlite::Error) -> Self {
        PreferenceError::StoreUnavailable(e.to_string())
    }
}

/// Persisted key/value pairs.
pub trait PreferenceStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, PreferenceError>;
    fn set(&self, key: &str, value: &str) -> Result<(), PreferenceError>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = PreferenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(PreferenceError::Validation(format!(
                "unknown theme '{other}', expected 'light' or 'dark'"
            ))),
        }
    }
}

const THEME_KEY: &str = "theme";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    pub theme: Theme,
}

impl Preferences {
    /// Read preferences from the store. Missing keys take their defaults and
    /// unreadable stored values are logged and replaced by the default.
    pub fn load(store: &dyn PreferenceStore) -> Result<Self, PreferenceError> {
        let theme = match store.get(THEME_KEY)? {
            Some(raw) => raw.parse().unwrap_or_else(|e| {
                warn!(value = %raw, error = %e, "Ignoring stored theme");
                Theme::default()
            }),
            None => Theme::default(),
        };
        debug!(%theme, "Preferences loaded");
        Ok(Self { theme })
    }

    pub fn save(&self, store: &dyn PreferenceStore) -> Result<(), PreferenceError> {
        store.set(THEME_KEY, self.theme.as_str())
    }

    /// Switch the theme and persist it. The in-memory value only changes
    /// once the write succeeded.
    pub fn toggle_theme(&mut self, store: &dyn PreferenceStore) -> Result<Theme, PreferenceError> {
        self.set_theme(self.theme.toggled(), store)
    }

    pub fn set_theme(
        &mut self,
        theme: Theme,
        store: &dyn PreferenceStore,
    ) -> Result<Theme, PreferenceError> {
        store.set(THEME_KEY, theme.as_str())?;
        self.theme = theme;
        Ok(theme)
    }
}
