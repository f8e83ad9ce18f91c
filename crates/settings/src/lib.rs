//! Tool configuration, storage-directory resolution and export-version bookkeeping.

pub mod config;
mod error;
pub mod storage;

use std::fs;
use std::path::Path;

pub use config::{default_config_path, ConfigStore, ToolConfig, CONFIG_ENV, CONFIG_FILE_NAME};
pub use error::SettingsError;
pub use storage::{ExportVersion, SourceAlias, Storage, StorageLocator, STORAGE_ENV};

/// Writes through a `.tmp` sibling and renames it into place.
pub(crate) fn write_atomic(path: &Path, data: &[u8]) -> Result<(), SettingsError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| SettingsError::CreateDir {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    let tmp_path = path.with_extension("tmp");
    fs::write(&tmp_path, data).map_err(|source| SettingsError::Write {
        path: tmp_path.clone(),
        source,
    })?;
    fs::rename(&tmp_path, path).map_err(|source| SettingsError::Write {
        path: path.to_path_buf(),
        source,
    })
}
