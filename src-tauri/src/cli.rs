//! Command line handling
//!
//! Parsed at launch and again for every forwarded second-instance launch.

use clap::Parser;
use tauri::{AppHandle, Manager};
use tracing::{info, warn};

use crate::settings_window;
use crate::wallpaper::WallpaperController;

#[derive(Debug, Default, PartialEq, Parser)]
#[command(name = "livewallpaper", version, about = "Looping video desktop background")]
pub struct Cli {
    /// Video file to use as the wallpaper
    #[arg(long, value_name = "PATH")]
    pub video: Option<String>,

    /// Open the settings window
    #[arg(long)]
    pub settings: bool,

    /// Let mouse clicks pass through the wallpaper
    #[arg(long, value_name = "BOOL")]
    pub click_through: Option<bool>,
}

impl Cli {
    /// Parse `args` (program name first). Bad input is logged, never fatal.
    pub fn parse_lenient<I, T>(args: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        match Cli::try_parse_from(args) {
            Ok(cli) => cli,
            Err(e) => {
                warn!("Ignoring command line: {}", e.to_string().trim());
                Cli::default()
            }
        }
    }

    pub fn has_actions(&self) -> bool {
        self.video.is_some() || self.settings || self.click_through.is_some()
    }
}

/// Apply the parsed command line to the running app.
pub fn apply(app: &AppHandle, cli: &Cli) {
    let controller = app.state::<WallpaperController>();

    if let Some(enabled) = cli.click_through {
        if let Err(e) = controller.set_click_through(app, enabled) {
            warn!("--click-through failed: {}", e);
        }
    }

    if let Some(video) = &cli.video {
        match controller.set_video(app, video) {
            Ok(path) => info!("--video applied: {}", path.display()),
            Err(e) => warn!("--video failed: {}", e),
        }
    }

    if cli.settings {
        settings_window::open(app);
    }
}
