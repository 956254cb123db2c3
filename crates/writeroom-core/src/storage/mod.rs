mod config;
pub mod database;
pub mod state;

pub use config::{CalendarConfig, Config};
pub use database::Database;
pub use state::{MemoryStore, PersistedState, StateStore, STATE_KEY};

use std::path::PathBuf;

use crate::error::StorageError;

/// Returns `~/.config/writeroom[-dev]/` based on WRITEROOM_ENV.
///
/// Set WRITEROOM_ENV=dev to use development data directory.
///
/// # Errors
/// Returns an error if creating the config directory fails.
pub fn data_dir() -> Result<PathBuf, StorageError> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("WRITEROOM_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("writeroom-dev")
    } else {
        base_dir.join("writeroom")
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| StorageError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}
