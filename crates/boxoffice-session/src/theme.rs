//! Display theme preference.
//!
//! Persisted next to the credential but independent of the session.

use std::fmt;
use std::str::FromStr;

use crate::error::StorageResult;
use crate::storage::{Storage, THEME_KEY};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThemeMode {
    #[default]
    Light,
    Dark,
}

impl ThemeMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ThemeMode::Light => "light",
            ThemeMode::Dark => "dark",
        }
    }

    /// The other mode.
    pub fn toggled(self) -> Self {
        match self {
            ThemeMode::Light => ThemeMode::Dark,
            ThemeMode::Dark => ThemeMode::Light,
        }
    }

    /// Stored preference, `Light` when unset or unrecognized.
    pub async fn load(storage: &dyn Storage) -> StorageResult<Self> {
        let stored = storage.get(THEME_KEY).await?;
        Ok(stored
            .as_deref()
            .and_then(|s| s.parse().ok())
            .unwrap_or_default())
    }

    /// Persist this preference.
    pub async fn save(self, storage: &dyn Storage) -> StorageResult<()> {
        storage.set(THEME_KEY, self.as_str()).await
    }

    /// Flip the stored preference and return the new one.
    pub async fn toggle(storage: &dyn Storage) -> StorageResult<Self> {
        let next = Self::load(storage).await?.toggled();
        next.save(storage).await?;
        Ok(next)
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
        match s.trim() {
            "light" => Ok(ThemeMode::Light),
            "dark" => Ok(ThemeMode::Dark),
            other => Err(format!("unknown theme mode '{}'", other)),
        }
    }
}
