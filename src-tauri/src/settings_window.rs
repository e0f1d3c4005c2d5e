//! Settings window — created on demand, re-focused if already open.

use tauri::{AppHandle, Manager, WebviewUrl, WebviewWindowBuilder};
use tracing::{info, warn};

pub const SETTINGS_LABEL: &str = "settings";
const SETTINGS_PAGE: &str = "settings.html";

pub fn open(app: &AppHandle) {
    if let Some(window) = app.get_webview_window(SETTINGS_LABEL) {
        let _ = window.unminimize();
        let _ = window.show();
        let _ = window.set_focus();
        return;
    }

    info!("Opening settings window");
    let url = WebviewUrl::App(SETTINGS_PAGE.into());
    let built = WebviewWindowBuilder::new(app, SETTINGS_LABEL, url)
        .title("Live Wallpaper Settings")
        .inner_size(560.0, 460.0)
        .min_inner_size(480.0, 400.0)
        .center()
        .focused(true)
        .build();

    match built {
        Ok(window) => {
            let _ = window.set_focus();
        }
        Err(e) => warn!("Failed to open settings window: {}", e),
    }
}
