use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use dark_light::Mode;
use serde::{Deserialize, Serialize};

static PREFERENCES_FILE: &str = "preferences.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
}

impl Theme {
    pub fn detect() -> Self {
        match dark_light::detect() {
            Mode::Light => Theme::Light,
            Mode::Dark | Mode::Default => Theme::Dark,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }
}

/// Persisted UI preferences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    pub theme: Theme,
}

impl Preferences {
    /// Read the saved preferences, falling back to the system theme when the
    /// file is missing or unreadable.
    pub fn load(data_dir: &Path) -> Self {
        Self::load_with_default(data_dir, Theme::detect)
    }

    fn load_with_default(data_dir: &Path, default_theme: impl FnOnce() -> Theme) -> Self {
        let path = preferences_path(data_dir);
        match fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str(&raw) {
                Ok(prefs) => return prefs,
                Err(err) => {
                    tracing::warn!(path = %path.display(), error = %err, "ignoring unreadable preferences")
                }
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "failed to read preferences")
            }
        }
        Self {
            theme: default_theme(),
        }
    }

    pub fn save(&self, data_dir: &Path) -> Result<()> {
        fs::create_dir_all(data_dir).with_context(|| {
            format!("Failed to create data directory at {}", data_dir.display())
        })?;
        let path = preferences_path(data_dir);
        let raw = serde_json::to_string_pretty(self)?;
        fs::write(&path, raw)
            .with_context(|| format!("Failed to write preferences to {}", path.display()))
    }
}

fn preferences_path(data_dir: &Path) -> PathBuf {
    data_dir.join(PREFERENCES_FILE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_uses_default_theme() {
        let dir = TempDir::new().unwrap();
        let prefs = Preferences::load_with_default(dir.path(), || Theme::Light);
        assert_eq!(prefs.theme, Theme::Light);
    }

    #[test]
    fn saved_theme_wins_over_default() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("nested");
        Preferences { theme: Theme::Dark }.save(&nested).unwrap();

        let prefs = Preferences::load_with_default(&nested, || Theme::Light);
        assert_eq!(prefs.theme, Theme::Dark);
    }

    #[test]
    fn corrupt_file_falls_back() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(PREFERENCES_FILE), "{not json").unwrap();
        let prefs = Preferences::load_with_default(dir.path(), || Theme::Light);
        assert_eq!(prefs.theme, Theme::Light);
        assert_eq!(Theme::Light.toggled(), Theme::Dark);
    }
}
