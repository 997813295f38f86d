mod config;
pub mod database;
mod memory;
mod record;

pub use config::{Config, StorageConfig, TrackerConfig};
pub use database::Database;
pub use memory::MemoryStore;
pub use record::ProgressRecord;

use std::path::PathBuf;

use crate::error::StorageError;

/// Prefix for per-video progress keys.
pub const DEFAULT_KEY_PREFIX: &str = "video-progress-";

/// Key-value persistence used by the tracker.
///
/// Values are opaque strings; the tracker stores a JSON [`ProgressRecord`].
pub trait ProgressStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

impl<S: ProgressStore + ?Sized> ProgressStore for &mut S {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key)
    }
}

/// Storage key for a video's progress record, e.g. `video-progress-intro`.
pub fn storage_key(prefix: &str, video_id: &str) -> String {
    format!("{prefix}{video_id}")
}

/// Returns `~/.config/watchspan[-dev]/` based on WATCHSPAN_ENV.
///
/// Set WATCHSPAN_ENV=dev to use development data directory.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> std::io::Result<PathBuf> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("WATCHSPAN_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("watchspan-dev")
    } else {
        base_dir.join("watchspan")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
