//! Wallpaper controller
//!
//! Owns the settings store and video cache, keeps one wallpaper window per
//! target screen, and broadcasts the shared playback state to every one of
//! them. Tauri-managed; all mutation goes through the inner mutex.
//!
//! Window API calls dispatch to the main thread, so they are never made while
//! `inner` is held: a main-thread caller blocked on `inner` would deadlock.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use tauri::{AppHandle, Emitter, EventTarget, Manager};
use tracing::{debug, info, warn};
use typeshare::typeshare;

use crate::error::{Error, Result};
use crate::screens::{self, Fingerprint, Screen};
use crate::settings::{DisplayMode, FitMode, Settings, SettingsStore, SETTINGS_FILE};
use crate::video_cache::{self, VideoCache};
use crate::window_layer;

pub const PLAYBACK_EVENT: &str = "playback-state";

/// What every wallpaper window renders.
#[typeshare]
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackState {
    /// Absolute path of the cached video, if one is set.
    pub video_path: Option<String>,
    /// CSS `object-fit` for the video element.
    pub fit: String,
    pub lightweight: bool,
    /// Bumped whenever the video file changes, so pages reload even when the
    /// cached path stays the same.
    pub revision: u32,
}

impl PlaybackState {
    pub fn from_settings(settings: &Settings, revision: u32) -> Self {
        Self {
            video_path: settings
                .video_path
                .as_ref()
                .map(|p| p.to_string_lossy().into_owned()),
            fit: settings.fit_mode.object_fit().to_string(),
            lightweight: settings.lightweight_mode,
            revision,
        }
    }
}

struct Inner {
    store: SettingsStore,
    cache: VideoCache,
    fingerprint: Option<Fingerprint>,
    revision: u32,
}

impl Inner {
    fn playback(&self) -> PlaybackState {
        PlaybackState::from_settings(self.store.get(), self.revision)
    }
}

pub struct WallpaperController {
    inner: Mutex<Inner>,
    /// Serializes window rebuilds between commands and the display watcher.
    rebuild: Mutex<()>,
    /// Held across cache file I/O and the matching `videoPath` update so an
    /// import and a clear never interleave. Taken before `inner`.
    cache_io: Mutex<()>,
}

impl WallpaperController {
    pub fn new(store: SettingsStore, cache: VideoCache) -> Self {
        Self {
            inner: Mutex::new(Inner {
                store,
                cache,
                fingerprint: None,
                revision: 0,
            }),
            rebuild: Mutex::new(()),
            cache_io: Mutex::new(()),
        }
    }

    /// Controller backed by the app's config and data directories.
    pub fn from_app(app: &AppHandle) -> Result<Self> {
        let config_dir = app
            .path()
            .app_config_dir()
            .map_err(|e| Error::NoDataDir(e.to_string()))?;
        let data_dir = app
            .path()
            .app_data_dir()
            .map_err(|e| Error::NoDataDir(e.to_string()))?;

        let store = SettingsStore::open(config_dir.join(SETTINGS_FILE));
        let cache = VideoCache::new(&data_dir);
        info!(
            "Settings: {}, video cache: {}",
            store.path().display(),
            cache.dir().display()
        );
        Ok(Self::new(store, cache))
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn settings(&self) -> Settings {
        self.lock().store.get().clone()
    }

    pub fn playback_state(&self) -> PlaybackState {
        self.lock().playback()
    }

    pub fn cache_dir(&self) -> PathBuf {
        self.lock().cache.dir().to_path_buf()
    }

    /// Startup: drop a stale video path, then build the wallpaper windows.
    pub fn restore(&self, app: &AppHandle) -> Result<()> {
        self.forget_missing_video()?;
        self.rebuild_windows(app)
    }

    fn forget_missing_video(&self) -> Result<()> {
        let mut inner = self.lock();
        let missing = inner
            .store
            .get()
            .video_path
            .as_ref()
            .filter(|p| !p.is_file())
            .cloned();
        if let Some(path) = missing {
            warn!("Stored video {} no longer exists, clearing it", path.display());
            inner.store.update(|s| s.video_path = None)?;
        }
        Ok(())
    }

    /// Import the video at `input` into the cache and play it everywhere.
    pub fn set_video(&self, app: &AppHandle, input: &str) -> Result<PathBuf> {
        let (cached, state) = self.apply_video(input)?;
        if let Some(state) = state {
            broadcast(app, &state);
        }
        Ok(cached)
    }

    /// Cache `input` and store it as the video. The state is `None` when
    /// `input` already is the current video.
    fn apply_video(&self, input: &str) -> Result<(PathBuf, Option<PlaybackState>)> {
        let _io = self.cache_io.lock().unwrap_or_else(PoisonError::into_inner);
        let source = VideoCache::resolve_source(input)?;

        let (cache, settings) = {
            let inner = self.lock();
            (inner.cache.clone(), inner.store.get().clone())
        };
        if is_current_video(&settings, &source) {
            debug!("Video {} is already playing", source.display());
            return Ok((source, None));
        }

        let cached = cache.import(&source)?;

        let state = {
            let mut inner = self.lock();
            inner.store.update(|s| s.video_path = Some(cached.clone()))?;
            inner.revision = inner.revision.wrapping_add(1);
            inner.playback()
        };
        info!("Wallpaper video set to {}", cached.display());
        Ok((cached, Some(state)))
    }

    pub fn set_click_through(&self, app: &AppHandle, enabled: bool) -> Result<bool> {
        let changed = self.lock().store.update(|s| s.click_through = enabled)?;
        if changed {
            info!("Click-through {}", if enabled { "on" } else { "off" });
            for window in wallpaper_windows(app) {
                window_layer::set_click_through(&window, enabled);
            }
        }
        Ok(changed)
    }

    pub fn set_display_mode(&self, app: &AppHandle, mode: DisplayMode) -> Result<bool> {
        let changed = self.store_display_mode(mode)?;
        if changed {
            self.rebuild_windows(app)?;
        }
        Ok(changed)
    }

    fn store_display_mode(&self, mode: DisplayMode) -> Result<bool> {
        let changed = self.lock().store.update(|s| s.display_mode = mode)?;
        if changed {
            info!("Display mode set to {:?}", mode);
        }
        Ok(changed)
    }

    pub fn set_fit_mode(&self, app: &AppHandle, mode: FitMode) -> Result<bool> {
        self.update_playback(app, |s| s.fit_mode = mode)
    }

    pub fn set_lightweight_mode(&self, app: &AppHandle, enabled: bool) -> Result<bool> {
        self.update_playback(app, |s| s.lightweight_mode = enabled)
    }

    pub fn set_launch_at_login(&self, enabled: bool) -> Result<bool> {
        self.lock().store.update(|s| s.launch_at_login = enabled)
    }

    pub fn set_auto_update(&self, enabled: bool) -> Result<bool> {
        self.lock().store.update(|s| s.auto_update_enabled = enabled)
    }

    fn update_playback<F>(&self, app: &AppHandle, f: F) -> Result<bool>
    where
        F: FnOnce(&mut Settings),
    {
        let (changed, state) = {
            let mut inner = self.lock();
            let changed = inner.store.update(f)?;
            (changed, inner.playback())
        };
        if changed {
            broadcast(app, &state);
        }
        Ok(changed)
    }

    /// Stop playback and empty the video cache. Returns the number of files removed.
    pub fn clear_cache(&self, app: &AppHandle) -> Result<usize> {
        let (removed, state) = self.reset_video()?;
        broadcast(app, &state);
        Ok(removed)
    }

    fn reset_video(&self) -> Result<(usize, PlaybackState)> {
        let _io = self.cache_io.lock().unwrap_or_else(PoisonError::into_inner);
        let (cache, state) = {
            let mut inner = self.lock();
            inner.store.update(|s| s.video_path = None)?;
            inner.revision = inner.revision.wrapping_add(1);
            (inner.cache.clone(), inner.playback())
        };
        let removed = cache.clear()?;
        Ok((removed, state))
    }

    /// Create, move or close wallpaper windows to match the current screens.
    pub fn rebuild_windows(&self, app: &AppHandle) -> Result<()> {
        let _rebuild = self.rebuild.lock().unwrap_or_else(PoisonError::into_inner);

        let screens = current_screens(app)?;
        let settings = self.settings();
        let targets = screens::target_screens(settings.display_mode, &screens);
        let existing: Vec<String> = wallpaper_windows(app)
            .iter()
            .map(|w| w.label().to_string())
            .collect();

        let plan = screens::plan(&existing, &targets);
        if plan.is_empty() {
            debug!("No screens to cover");
        }
        debug!(
            "Window plan: {} create, {} update, {} close",
            plan.create.len(),
            plan.update.len(),
            plan.close.len()
        );

        for label in &plan.close {
            if let Some(window) = app.get_webview_window(label) {
                info!("Closing wallpaper window {}", label);
                if let Err(e) = window.destroy() {
                    warn!("Failed to close {}: {}", label, e);
                }
            }
        }
        for screen in &plan.update {
            if let Some(window) = app.get_webview_window(&screen.label()) {
                window_layer::place_on_screen(&window, screen);
                window_layer::set_click_through(&window, settings.click_through);
            }
        }
        let mut complete = true;
        for screen in &plan.create {
            if let Err(e) =
                window_layer::create_wallpaper_window(app, screen, settings.click_through)
            {
                warn!("Failed to create wallpaper window for screen {}: {}", screen.index, e);
                complete = false;
            }
        }

        self.record_rebuild(screens::fingerprint(&screens), complete);
        info!(
            "Wallpaper windows ready on {} of {} screen(s)",
            targets.len(),
            screens.len()
        );
        Ok(())
    }

    /// Rebuild if the display configuration differs from the last rebuild.
    pub fn screens_changed(&self, app: &AppHandle) -> Result<bool> {
        let screens = current_screens(app)?;
        if !self.needs_rebuild(&screens::fingerprint(&screens)) {
            return Ok(false);
        }

        info!("Display configuration changed ({} screen(s))", screens.len());
        self.rebuild_windows(app)?;
        Ok(true)
    }

    /// Remember the configuration that was built. An incomplete rebuild is
    /// forgotten so the watcher retries it.
    fn record_rebuild(&self, fingerprint: Fingerprint, complete: bool) {
        self.lock().fingerprint = complete.then_some(fingerprint);
    }

    fn needs_rebuild(&self, fingerprint: &Fingerprint) -> bool {
        self.lock().fingerprint.as_ref() != Some(fingerprint)
    }
}

fn current_screens(app: &AppHandle) -> Result<Vec<Screen>> {
    let monitors = app.available_monitors()?;
    let primary = app.primary_monitor()?;
    Ok(screens::screens_from_monitors(&monitors, primary.as_ref()))
}

fn wallpaper_windows(app: &AppHandle) -> Vec<tauri::WebviewWindow> {
    app.webview_windows()
        .into_iter()
        .filter(|(label, _)| screens::is_wallpaper_label(label))
        .map(|(_, window)| window)
        .collect()
}

fn broadcast(app: &AppHandle, state: &PlaybackState) {
    for window in wallpaper_windows(app) {
        let label = window.label().to_string();
        let target = EventTarget::webview_window(label.as_str());
        if let Err(e) = app.emit_to(target, PLAYBACK_EVENT, state) {
            warn!("Failed to send playback state to {}: {}", label, e);
        }
    }
}

/// Whether `path` is the video currently stored in `settings`.
pub fn is_current_video(settings: &Settings, path: &Path) -> bool {
    settings
        .video_path
        .as_deref()
        .is_some_and(|current| video_cache::same_file(current, path))
}
