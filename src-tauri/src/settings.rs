//! Persisted settings store
//!
//! A small JSON document under the app config dir. Keys are camelCase and
//! every field has a default so older or partial files still load.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use typeshare::typeshare;

use crate::error::{Error, Result};

pub const SETTINGS_FILE: &str = "settings.json";

/// Which screens get a wallpaper window
#[typeshare]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DisplayMode {
    #[default]
    MainOnly,
    AllScreens,
}

/// How the video is scaled into the screen frame
#[typeshare]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FitMode {
    /// Aspect fill, crops the overflow.
    #[default]
    Fill,
    /// Aspect fit, letterboxes.
    Fit,
}

impl FitMode {
    /// CSS `object-fit` value the wallpaper page applies to its video element.
    pub fn object_fit(self) -> &'static str {
        match self {
            FitMode::Fill => "cover",
            FitMode::Fit => "contain",
        }
    }
}

#[typeshare]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub video_path: Option<PathBuf>,
    pub click_through: bool,
    pub display_mode: DisplayMode,
    pub fit_mode: FitMode,
    pub lightweight_mode: bool,
    pub launch_at_login: bool,
    pub auto_update_enabled: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            video_path: None,
            click_through: true,
            display_mode: DisplayMode::default(),
            fit_mode: FitMode::default(),
            lightweight_mode: false,
            launch_at_login: false,
            auto_update_enabled: false,
        }
    }
}

#[derive(Debug)]
pub struct SettingsStore {
    path: PathBuf,
    current: Settings,
}

impl SettingsStore {
    /// Load the store from `path`. A missing or unreadable file yields defaults.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let current = match fs::read(&path) {
            Ok(bytes) => match serde_json::from_slice::<Settings>(&bytes) {
                Ok(settings) => {
                    debug!("Loaded settings from {}", path.display());
                    settings
                }
                Err(e) => {
                    warn!("Ignoring malformed settings file {}: {}", path.display(), e);
                    Settings::default()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("No settings file at {}, using defaults", path.display());
                Settings::default()
            }
            Err(e) => {
                warn!("Could not read settings file {}: {}", path.display(), e);
                Settings::default()
            }
        };

        Self { path, current }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self) -> &Settings {
        &self.current
    }

    /// Apply `f` and persist if anything changed. Returns whether it changed.
    ///
    /// On a failed write the in-memory value is left unchanged.
    pub fn update<F>(&mut self, f: F) -> Result<bool>
    where
        F: FnOnce(&mut Settings),
    {
        let mut next = self.current.clone();
        f(&mut next);
        if next == self.current {
            return Ok(false);
        }

        write_atomic(&self.path, &next)?;
        self.current = next;
        Ok(true)
    }
}

fn write_atomic(path: &Path, settings: &Settings) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }

    let bytes = serde_json::to_vec_pretty(settings)?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, bytes).map_err(|e| Error::io(&tmp, e))?;
    fs::rename(&tmp, path).map_err(|e| Error::io(path, e))?;
    debug!("Saved settings to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let s = Settings::default();
        assert!(s.click_through);
        assert_eq!(s.display_mode, DisplayMode::MainOnly);
        assert_eq!(s.fit_mode, FitMode::Fill);
        assert!(s.video_path.is_none());
        assert!(!s.lightweight_mode);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::open(dir.path().join(SETTINGS_FILE));
        assert_eq!(store.get(), &Settings::default());
    }

    #[test]
    fn test_malformed_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SETTINGS_FILE);
        fs::write(&path, b"{ not json").unwrap();
        let store = SettingsStore::open(&path);
        assert_eq!(store.get(), &Settings::default());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SETTINGS_FILE);
        fs::write(&path, br#"{"clickThrough": false, "fitMode": "fit"}"#).unwrap();
        let store = SettingsStore::open(&path);
        assert!(!store.get().click_through);
        assert_eq!(store.get().fit_mode, FitMode::Fit);
        assert_eq!(store.get().display_mode, DisplayMode::MainOnly);
    }

    #[test]
    fn test_update_persists_and_reloads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(SETTINGS_FILE);
        let mut store = SettingsStore::open(&path);

        let changed = store
            .update(|s| {
                s.display_mode = DisplayMode::AllScreens;
                s.video_path = Some(PathBuf::from("/tmp/wallpaper.mp4"));
            })
            .unwrap();
        assert!(changed);

        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"displayMode\": \"allScreens\""));
        assert!(raw.contains("\"videoPath\""));

        let reloaded = SettingsStore::open(&path);
        assert_eq!(reloaded.get(), store.get());
    }

    #[test]
    fn test_update_without_change_does_not_write() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SETTINGS_FILE);
        let mut store = SettingsStore::open(&path);
        let changed = store.update(|s| s.click_through = true).unwrap();
        assert!(!changed);
        assert!(!path.exists());
    }

    #[test]
    fn test_failed_write_leaves_value_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        fs::write(&blocker, b"file").unwrap();
        let mut store = SettingsStore::open(blocker.join(SETTINGS_FILE));

        assert!(store.update(|s| s.lightweight_mode = true).is_err());
        assert_eq!(store.get(), &Settings::default());
    }

    #[test]
    fn test_object_fit() {
        assert_eq!(FitMode::Fill.object_fit(), "cover");
        assert_eq!(FitMode::Fit.object_fit(), "contain");
    }
}
