//! Platform-independent command logic
//!
//! These functions contain the actual business logic, free of `tauri::` command
//! plumbing. Tauri command wrappers in `commands.rs` call into these.

use serde::{Deserialize, Serialize};
use typeshare::typeshare;

/// Application information shown in the settings window
#[typeshare]
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppInfo {
    pub os: String,
    pub os_version: String,
    pub arch: String,
    pub app_version: String,
    pub tauri_version: String,
    pub version_label: String,
}

/// Result of a successful video import
#[typeshare]
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoSelection {
    pub cached_path: String,
}

// ============================================================================
// Application Information
// ============================================================================

pub fn get_app_info() -> AppInfo {
    let app_version = env!("CARGO_PKG_VERSION").to_string();
    AppInfo {
        os: std::env::consts::OS.to_string(),
        os_version: os_info::get().version().to_string(),
        arch: std::env::consts::ARCH.to_string(),
        version_label: version_label(&app_version),
        app_version,
        tauri_version: tauri::VERSION.to_string(),
    }
}

pub fn version_label(version: &str) -> String {
    format!("v{version}")
}
