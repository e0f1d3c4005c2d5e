//! Tauri command handlers
//!
//! These commands are invoked from the pages via `window.__TAURI__.core.invoke()`.
//! They are async so they run off the main thread; window creation from the
//! main thread while it waits on a command would deadlock.

use tauri::{AppHandle, State};
use tracing::{debug, error, info};

use crate::commands_core;
use crate::settings::{DisplayMode, FitMode, Settings};
use crate::video_cache;
use crate::wallpaper::{PlaybackState, WallpaperController};

pub use commands_core::{AppInfo, VideoSelection};

fn report(command: &str, e: crate::error::Error) -> String {
    error!("[command:{}] {}", command, e);
    e.to_string()
}

// ============================================================================
// State
// ============================================================================

#[tauri::command]
pub async fn get_settings(controller: State<'_, WallpaperController>) -> Result<Settings, String> {
    Ok(controller.settings())
}

#[tauri::command]
pub async fn get_playback_state(
    controller: State<'_, WallpaperController>,
) -> Result<PlaybackState, String> {
    let state = controller.playback_state();
    debug!("[command:get_playback_state] Returning: {:?}", state);
    Ok(state)
}

#[tauri::command]
pub fn get_app_info() -> AppInfo {
    commands_core::get_app_info()
}

// ============================================================================
// Video Selection
// ============================================================================

/// Show the native file picker and apply the chosen movie. `None` when cancelled.
#[tauri::command]
pub async fn choose_video(
    app: AppHandle,
    controller: State<'_, WallpaperController>,
) -> Result<Option<VideoSelection>, String> {
    info!("[command:choose_video] Opening file picker");

    let picked = rfd::AsyncFileDialog::new()
        .set_title("Choose a video")
        .add_filter("Movies", video_cache::MOVIE_EXTENSIONS)
        .pick_file()
        .await;

    let Some(file) = picked else {
        debug!("[command:choose_video] Cancelled");
        return Ok(None);
    };

    let input = file.path().to_string_lossy().into_owned();
    let cached = controller
        .set_video(&app, &input)
        .map_err(|e| report("choose_video", e))?;
    Ok(Some(VideoSelection {
        cached_path: cached.to_string_lossy().into_owned(),
    }))
}

#[tauri::command]
pub async fn apply_video_path(
    app: AppHandle,
    controller: State<'_, WallpaperController>,
    path: String,
) -> Result<VideoSelection, String> {
    info!("[command:apply_video_path] Applying {:?}", path);
    let cached = controller
        .set_video(&app, &path)
        .map_err(|e| report("apply_video_path", e))?;
    Ok(VideoSelection {
        cached_path: cached.to_string_lossy().into_owned(),
    })
}

// ============================================================================
// Display & Playback
// ============================================================================

#[tauri::command]
pub async fn set_click_through(
    app: AppHandle,
    controller: State<'_, WallpaperController>,
    enabled: bool,
) -> Result<(), String> {
    debug!("[command:set_click_through] {}", enabled);
    controller
        .set_click_through(&app, enabled)
        .map(|_| ())
        .map_err(|e| report("set_click_through", e))
}

#[tauri::command]
pub async fn set_display_mode(
    app: AppHandle,
    controller: State<'_, WallpaperController>,
    mode: DisplayMode,
) -> Result<(), String> {
    debug!("[command:set_display_mode] {:?}", mode);
    controller
        .set_display_mode(&app, mode)
        .map(|_| ())
        .map_err(|e| report("set_display_mode", e))
}

#[tauri::command]
pub async fn set_fit_mode(
    app: AppHandle,
    controller: State<'_, WallpaperController>,
    mode: FitMode,
) -> Result<(), String> {
    debug!("[command:set_fit_mode] {:?}", mode);
    controller
        .set_fit_mode(&app, mode)
        .map(|_| ())
        .map_err(|e| report("set_fit_mode", e))
}

#[tauri::command]
pub async fn set_lightweight_mode(
    app: AppHandle,
    controller: State<'_, WallpaperController>,
    enabled: bool,
) -> Result<(), String> {
    debug!("[command:set_lightweight_mode] {}", enabled);
    controller
        .set_lightweight_mode(&app, enabled)
        .map(|_| ())
        .map_err(|e| report("set_lightweight_mode", e))
}

// ============================================================================
// Stored Preferences
// ============================================================================

#[tauri::command]
pub async fn set_launch_at_login(
    controller: State<'_, WallpaperController>,
    enabled: bool,
) -> Result<(), String> {
    controller
        .set_launch_at_login(enabled)
        .map(|_| ())
        .map_err(|e| report("set_launch_at_login", e))
}

#[tauri::command]
pub async fn set_auto_update(
    controller: State<'_, WallpaperController>,
    enabled: bool,
) -> Result<(), String> {
    controller
        .set_auto_update(enabled)
        .map(|_| ())
        .map_err(|e| report("set_auto_update", e))
}

// ============================================================================
// Cache
// ============================================================================

#[tauri::command]
pub async fn open_cache_folder(
    app: AppHandle,
    controller: State<'_, WallpaperController>,
) -> Result<(), String> {
    use tauri_plugin_opener::OpenerExt;

    let dir = controller.cache_dir();
    std::fs::create_dir_all(&dir)
        .map_err(|e| report("open_cache_folder", crate::error::Error::io(&dir, e)))?;

    info!("[command:open_cache_folder] Opening {}", dir.display());
    app.opener()
        .open_path(dir.to_string_lossy(), None::<&str>)
        .map_err(|e| {
            error!("[command:open_cache_folder] Failed to open folder: {}", e);
            format!("Failed to open folder: {}", e)
        })
}

#[tauri::command]
pub async fn clear_cache(
    app: AppHandle,
    controller: State<'_, WallpaperController>,
) -> Result<usize, String> {
    info!("[command:clear_cache] Clearing video cache");
    controller
        .clear_cache(&app)
        .map_err(|e| report("clear_cache", e))
}

// ============================================================================
// Application
// ============================================================================

#[tauri::command]
pub fn quit_app(app: AppHandle) {
    info!("[command:quit_app] Quit requested");
    app.exit(0);
}
