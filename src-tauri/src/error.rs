//! Error types shared by the settings store, video cache and wallpaper controller.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("no video path given")]
    EmptyPath,

    #[error("video file not found: {}", .0.display())]
    VideoNotFound(PathBuf),

    #[error("could not resolve application directory: {0}")]
    NoDataDir(String),

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("settings error: {0}")]
    Settings(#[from] serde_json::Error),

    #[error(transparent)]
    Tauri(#[from] tauri::Error),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
