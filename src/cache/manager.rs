//! String-keyed store persisted to disk
//!
//! Each key maps to one file inside the cache directory, holding the value as
//! plain text.

use directories::ProjectDirs;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Manages reading and writing cache entries on disk
///
/// Entries live in `~/.cache/rateconv/` on Linux (or the platform equivalent).
#[derive(Debug, Clone)]
pub struct CacheManager {
    /// Directory where cache files are stored
    cache_dir: PathBuf,
}

impl CacheManager {
    /// Creates a new CacheManager using the XDG-compliant cache directory
    ///
    /// Returns `None` if the directory cannot be determined (e.g. no home directory).
    pub fn new() -> Option<Self> {
        let project_dirs = ProjectDirs::from("", "", "rateconv")?;
        let cache_dir = project_dirs.cache_dir().to_path_buf();
        Some(Self { cache_dir })
    }

    /// Creates a new CacheManager with a custom cache directory
    pub fn with_dir(cache_dir: PathBuf) -> Self {
        Self { cache_dir }
    }

    pub fn dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Returns the path to the file backing the given key
    fn cache_path(&self, key: &str) -> PathBuf {
        self.cache_dir.join(key)
    }

    /// Ensures the cache directory exists
    pub fn ensure_dir(&self) -> io::Result<()> {
        fs::create_dir_all(&self.cache_dir)
    }

    /// Reads the value stored under `key`
    ///
    /// Returns `None` if the entry doesn't exist or can't be read.
    pub fn get(&self, key: &str) -> Option<String> {
        fs::read_to_string(self.cache_path(key)).ok()
    }

    /// Stores `value` under `key`, replacing any previous value
    ///
    /// The value is written to a temporary file and renamed into place, so a
    /// reader sees either the old value or the new one.
    pub fn set(&self, key: &str, value: &str) -> io::Result<()> {
        self.ensure_dir()?;
        let tmp_path = self.cache_dir.join(format!(".{}.tmp", key));
        fs::write(&tmp_path, value)?;
        if let Err(e) = fs::rename(&tmp_path, self.cache_path(key)) {
            let _ = fs::remove_file(&tmp_path);
            return Err(e);
        }
        Ok(())
    }
}
