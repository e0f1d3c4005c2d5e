//! Live Wallpaper
//!
//! Tauri backend that plays a looping video behind the desktop icons, one
//! borderless window per screen, with a small settings window.

mod cli;
mod commands;
mod commands_core;
mod display_watch;
mod error;
mod screens;
mod settings;
mod settings_window;
mod video_cache;
mod wallpaper;
mod window_layer;

use tauri::{Manager, RunEvent};
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

use crate::cli::Cli;
use crate::wallpaper::WallpaperController;

pub use error::{Error, Result};

/// Initialize logging based on debug/release mode
fn init_logging() {
    let level = if cfg!(debug_assertions) {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(cfg!(debug_assertions))
        .with_line_number(cfg!(debug_assertions))
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {e}");
    }
}

/// Main entry point
pub fn main() {
    init_logging();
    info!("Starting Live Wallpaper v{}", env!("CARGO_PKG_VERSION"));

    let launch = Cli::parse_lenient(std::env::args_os());

    let app = tauri::Builder::default()
        .plugin(tauri_plugin_single_instance::init(|app, args, _cwd| {
            info!("Second instance launched with args: {:?}", args);
            let forwarded = Cli::parse_lenient(args);
            if forwarded.has_actions() {
                cli::apply(app, &forwarded);
            } else {
                settings_window::open(app);
            }
        }))
        .plugin(tauri_plugin_opener::init())
        .setup(move |app| {
            info!("Application setup starting...");

            #[cfg(target_os = "macos")]
            window_layer::set_accessory_policy(app);

            let handle = app.handle().clone();
            let controller = WallpaperController::from_app(&handle)?;
            app.manage(controller);

            let controller = app.state::<WallpaperController>();
            if let Err(e) = controller.restore(&handle) {
                error!("Failed to restore wallpaper: {}", e);
            }

            cli::apply(&handle, &launch);
            if controller.settings().video_path.is_none() && !launch.settings {
                info!("No wallpaper video configured yet");
                settings_window::open(&handle);
            }

            display_watch::start(handle);

            info!("Application setup complete");
            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            commands::get_settings,
            commands::get_playback_state,
            commands::get_app_info,
            commands::choose_video,
            commands::apply_video_path,
            commands::set_click_through,
            commands::set_display_mode,
            commands::set_fit_mode,
            commands::set_lightweight_mode,
            commands::set_launch_at_login,
            commands::set_auto_update,
            commands::open_cache_folder,
            commands::clear_cache,
            commands::quit_app,
        ])
        .build(tauri::generate_context!())
        .expect("Error while building Live Wallpaper");

    app.run(|_app, event| {
        // Closing the settings window must not quit a menu-bar style app.
        if let RunEvent::ExitRequested { code: None, api, .. } = event {
            api.prevent_exit();
        }
    });
}
