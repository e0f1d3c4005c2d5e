//! Window Layer System — desktop-level wallpaper windows
//!
//! macOS: kCGDesktopWindowLevel (behind desktop icons), visible on every Space,
//!        immune to Mission Control / Show Desktop, excluded from Cmd+Tab.
//! Other platforms: always-on-bottom, visible on all workspaces.

use tauri::webview::Color;
use tauri::{
    Manager, PhysicalPosition, PhysicalSize, WebviewUrl, WebviewWindow, WebviewWindowBuilder,
};
use tracing::{debug, info, warn};

use crate::screens::Screen;

pub const WALLPAPER_PAGE: &str = "wallpaper.html";

/// `CGWindowLevelForKey(kCGDesktopWindowLevelKey)`: kCGMinimumWindowLevel + 20,
/// where kCGMinimumWindowLevel is kCGBaseWindowLevel (INT32_MIN) + 5.
#[cfg(target_os = "macos")]
const DESKTOP_WINDOW_LEVEL: i64 = -2147483623_i64;

/// canJoinAllSpaces (1) | stationary (16) | ignoresCycle (64)
#[cfg(target_os = "macos")]
const DESKTOP_COLLECTION_BEHAVIOR: u64 = 1 | 16 | 64;

/// Create a borderless wallpaper window covering `screen`.
pub fn create_wallpaper_window<M: Manager<tauri::Wry>>(
    manager: &M,
    screen: &Screen,
    click_through: bool,
) -> tauri::Result<WebviewWindow> {
    let label = screen.label();
    info!(
        "Creating wallpaper window {} ({}x{} at {}, {})",
        label, screen.width, screen.height, screen.x, screen.y
    );

    let url = WebviewUrl::App(WALLPAPER_PAGE.into());
    let window = WebviewWindowBuilder::new(manager, &label, url)
        .title("Live Wallpaper")
        .decorations(false)
        .resizable(false)
        .shadow(false)
        .skip_taskbar(true)
        .focused(false)
        .visible(false)
        .build()?;

    if let Err(e) = window.set_background_color(Some(Color(0, 0, 0, 255))) {
        warn!("Failed to set background on {}: {}", label, e);
    }

    place_on_screen(&window, screen);
    setup_desktop_window(&window);
    set_click_through(&window, click_through);
    window.show()?;
    Ok(window)
}

/// Move and resize `window` so its frame equals the screen frame.
pub fn place_on_screen(window: &WebviewWindow, screen: &Screen) {
    debug!(
        "Placing {} at ({}, {}) {}x{}",
        window.label(),
        screen.x,
        screen.y,
        screen.width,
        screen.height
    );

    if let Err(e) = window.set_position(tauri::Position::Physical(PhysicalPosition::new(
        screen.x, screen.y,
    ))) {
        warn!("Failed to position {}: {}", window.label(), e);
    }
    if let Err(e) = window.set_size(tauri::Size::Physical(PhysicalSize::new(
        screen.width,
        screen.height,
    ))) {
        warn!("Failed to resize {}: {}", window.label(), e);
    }
}

pub fn set_click_through(window: &WebviewWindow, enabled: bool) {
    if let Err(e) = window.set_ignore_cursor_events(enabled) {
        warn!("Failed to set click-through on {}: {}", window.label(), e);
    }
}

// ============================================================================
// Setup Dispatch
// ============================================================================

pub fn setup_desktop_window(window: &WebviewWindow) {
    #[cfg(target_os = "macos")]
    if let Err(e) = setup_macos_desktop(window) {
        warn!("Failed to setup macOS desktop layer: {}", e);
    }

    #[cfg(not(target_os = "macos"))]
    {
        if let Err(e) = window.set_always_on_bottom(true) {
            warn!("Failed to keep {} on bottom: {}", window.label(), e);
        }
        if let Err(e) = window.set_visible_on_all_workspaces(true) {
            debug!("Workspace pinning unsupported for {}: {}", window.label(), e);
        }
    }
}

// ============================================================================
// macOS Setup
// ============================================================================

#[cfg(target_os = "macos")]
fn setup_macos_desktop(window: &WebviewWindow) -> Result<(), String> {
    use objc::{msg_send, sel, sel_impl};

    let ns_window = window
        .ns_window()
        .map_err(|e| format!("Failed to get NSWindow: {}", e))?;

    unsafe {
        let obj = ns_window as *mut objc::runtime::Object;
        let _: () = msg_send![obj, setLevel: DESKTOP_WINDOW_LEVEL];
        let _: () = msg_send![obj, setCollectionBehavior: DESKTOP_COLLECTION_BEHAVIOR];
    }

    debug!("macOS: {} placed at desktop window level", window.label());
    Ok(())
}

/// Run without a Dock icon or app menu, like a menu-bar utility.
#[cfg(target_os = "macos")]
pub fn set_accessory_policy(app: &mut tauri::App) {
    app.set_activation_policy(tauri::ActivationPolicy::Accessory);
    info!("macOS: running as accessory app");
}

#[cfg(test)]
mod tests {
    #[cfg(target_os = "macos")]
    #[test]
    fn test_desktop_level_constants() {
        assert_eq!(super::DESKTOP_WINDOW_LEVEL, i32::MIN as i64 + 25);
        assert_eq!(super::DESKTOP_COLLECTION_BEHAVIOR, 81);
    }
}
