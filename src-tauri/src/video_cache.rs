//! Video cache
//!
//! The chosen video is copied into `<app data dir>/Videos/wallpaper.<ext>` so
//! the wallpaper keeps playing after the original file moves or its volume is
//! unmounted. The cache only ever holds one video.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::{Error, Result};

pub const VIDEOS_DIR: &str = "Videos";
const CACHED_STEM: &str = "wallpaper";
const DEFAULT_EXTENSION: &str = "mp4";

/// Extensions offered by the file picker.
pub const MOVIE_EXTENSIONS: &[&str] = &["mp4", "mov", "m4v"];

#[derive(Debug, Clone)]
pub struct VideoCache {
    dir: PathBuf,
}

impl VideoCache {
    /// Cache rooted at `<data_dir>/Videos`.
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self {
            dir: data_dir.as_ref().join(VIDEOS_DIR),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Turn user input into an existing file path.
    pub fn resolve_source(input: &str) -> Result<PathBuf> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(Error::EmptyPath);
        }

        let path = PathBuf::from(trimmed);
        if !path.is_file() {
            return Err(Error::VideoNotFound(path));
        }
        Ok(path)
    }

    /// Where `source` would land in the cache.
    pub fn target_for(&self, source: &Path) -> PathBuf {
        let ext = source
            .extension()
            .and_then(|e| e.to_str())
            .filter(|e| !e.is_empty())
            .unwrap_or(DEFAULT_EXTENSION);
        self.dir.join(format!("{CACHED_STEM}.{ext}"))
    }

    /// Copy `source` into the cache and return the cached path.
    pub fn import(&self, source: &Path) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir).map_err(|e| Error::io(&self.dir, e))?;

        let target = self.target_for(source);
        if same_file(source, &target) {
            debug!("Video already cached at {}", target.display());
            self.remove_stale(&target);
            return Ok(target);
        }

        if target.exists() {
            fs::remove_file(&target).map_err(|e| Error::io(&target, e))?;
        }
        let bytes = fs::copy(source, &target).map_err(|e| Error::io(source, e))?;
        info!(
            "Cached video {} -> {} ({} bytes)",
            source.display(),
            target.display(),
            bytes
        );

        self.remove_stale(&target);
        Ok(target)
    }

    /// Delete every file in the cache directory. Returns how many were removed.
    pub fn clear(&self) -> Result<usize> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(Error::io(&self.dir, e)),
        };

        let mut removed = 0;
        for entry in entries {
            let path = entry.map_err(|e| Error::io(&self.dir, e))?.path();
            if path.is_file() {
                fs::remove_file(&path).map_err(|e| Error::io(&path, e))?;
                removed += 1;
            }
        }
        info!("Cleared video cache ({} files)", removed);
        Ok(removed)
    }

    /// Remove a previously cached video that used a different extension.
    fn remove_stale(&self, keep: &Path) {
        let Ok(entries) = fs::read_dir(&self.dir) else {
            return;
        };
        for path in entries.flatten().map(|e| e.path()) {
            let is_cached = path.file_stem().and_then(|s| s.to_str()) == Some(CACHED_STEM);
            if is_cached && path != keep {
                if let Err(e) = fs::remove_file(&path) {
                    warn!("Failed to remove stale cached video {}: {}", path.display(), e);
                }
            }
        }
    }
}

pub(crate) fn same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_file(dir: &Path, name: &str, contents: &[u8]) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_resolve_source_rejects_empty() {
        assert!(matches!(
            VideoCache::resolve_source("   \n"),
            Err(Error::EmptyPath)
        ));
    }

    #[test]
    fn test_resolve_source_rejects_missing_and_directories() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.mp4");
        assert!(matches!(
            VideoCache::resolve_source(missing.to_str().unwrap()),
            Err(Error::VideoNotFound(_))
        ));
        assert!(matches!(
            VideoCache::resolve_source(dir.path().to_str().unwrap()),
            Err(Error::VideoNotFound(_))
        ));
    }

    #[test]
    fn test_resolve_source_trims_whitespace() {
        let dir = tempfile::tempdir().unwrap();
        let src = write_file(dir.path(), "clip.mov", b"movie");
        let input = format!("  {}\n", src.display());
        assert_eq!(VideoCache::resolve_source(&input).unwrap(), src);
    }

    #[test]
    fn test_import_copies_with_source_extension() {
        let src_dir = tempfile::tempdir().unwrap();
        let data_dir = tempfile::tempdir().unwrap();
        let src = write_file(src_dir.path(), "clip.mov", b"movie");

        let cache = VideoCache::new(data_dir.path());
        let cached = cache.import(&src).unwrap();

        assert_eq!(cached, data_dir.path().join("Videos").join("wallpaper.mov"));
        assert_eq!(fs::read(&cached).unwrap(), b"movie");
        assert!(src.exists());
    }

    #[test]
    fn test_import_defaults_to_mp4() {
        let src_dir = tempfile::tempdir().unwrap();
        let data_dir = tempfile::tempdir().unwrap();
        let src = write_file(src_dir.path(), "clip", b"movie");

        let cached = VideoCache::new(data_dir.path()).import(&src).unwrap();
        assert_eq!(cached.file_name().unwrap(), "wallpaper.mp4");
    }

    #[test]
    fn test_import_replaces_previous_video() {
        let src_dir = tempfile::tempdir().unwrap();
        let data_dir = tempfile::tempdir().unwrap();
        let cache = VideoCache::new(data_dir.path());

        let first = write_file(src_dir.path(), "a.mov", b"first");
        let second = write_file(src_dir.path(), "b.mp4", b"second");
        let third = write_file(src_dir.path(), "c.mp4", b"third");

        cache.import(&first).unwrap();
        cache.import(&second).unwrap();
        let cached = cache.import(&third).unwrap();

        assert_eq!(fs::read(&cached).unwrap(), b"third");
        let names: Vec<_> = fs::read_dir(cache.dir())
            .unwrap()
            .flatten()
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["wallpaper.mp4".to_string()]);
    }

    #[test]
    fn test_import_of_cached_file_is_noop() {
        let data_dir = tempfile::tempdir().unwrap();
        let cache = VideoCache::new(data_dir.path());
        fs::create_dir_all(cache.dir()).unwrap();
        let cached = write_file(cache.dir(), "wallpaper.mp4", b"already");

        assert_eq!(cache.import(&cached).unwrap(), cached);
        assert_eq!(fs::read(&cached).unwrap(), b"already");
    }

    #[test]
    fn test_import_of_cached_file_drops_other_extensions() {
        let data_dir = tempfile::tempdir().unwrap();
        let cache = VideoCache::new(data_dir.path());
        fs::create_dir_all(cache.dir()).unwrap();
        write_file(cache.dir(), "wallpaper.mp4", b"old");
        let cached = write_file(cache.dir(), "wallpaper.mov", b"current");

        assert_eq!(cache.import(&cached).unwrap(), cached);
        let names: Vec<_> = fs::read_dir(cache.dir())
            .unwrap()
            .flatten()
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["wallpaper.mov".to_string()]);
    }

    #[test]
    fn test_clear() {
        let data_dir = tempfile::tempdir().unwrap();
        let cache = VideoCache::new(data_dir.path());
        assert_eq!(cache.clear().unwrap(), 0);

        fs::create_dir_all(cache.dir()).unwrap();
        write_file(cache.dir(), "wallpaper.mp4", b"x");
        write_file(cache.dir(), "leftover.tmp", b"y");
        assert_eq!(cache.clear().unwrap(), 2);
        assert_eq!(fs::read_dir(cache.dir()).unwrap().count(), 0);
    }
}
