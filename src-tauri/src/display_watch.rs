//! Display watchdog
//!
//! Polls the monitor list and rebuilds the wallpaper windows when a screen is
//! plugged, unplugged, moved or rescaled.

use std::time::Duration;

use tauri::{AppHandle, Manager};
use tracing::{debug, warn};

use crate::wallpaper::WallpaperController;

const POLL_INTERVAL: Duration = Duration::from_secs(2);

pub fn start(app: AppHandle) {
    std::thread::Builder::new()
        .name("display-watch".into())
        .spawn(move || loop {
            std::thread::sleep(POLL_INTERVAL);

            let controller = app.state::<WallpaperController>();
            match controller.screens_changed(&app) {
                Ok(true) => debug!("Wallpaper windows rebuilt after display change"),
                Ok(false) => {}
                Err(e) => warn!("Display check failed: {}", e),
            }
        })
        .map(|_| ())
        .unwrap_or_else(|e| warn!("Failed to start display watcher: {}", e));
}
