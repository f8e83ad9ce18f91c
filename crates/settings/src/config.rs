use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::SettingsError;
use crate::write_atomic;

const CONFIG_VERSION: u32 = 1;

/// Environment variable that overrides the config file location.
pub const CONFIG_ENV: &str = "GLOSSCHECK_CONFIG";
pub const CONFIG_FILE_NAME: &str = ".glosscheck_config.json";

/// 設定檔路徑：環境變數優先，否則為目前目錄下的隱藏檔。 / Config path from `GLOSSCHECK_CONFIG`, else `./.glosscheck_config.json`.
pub fn default_config_path() -> PathBuf {
    match env::var_os(CONFIG_ENV).filter(|value| !value.is_empty()) {
        Some(path) => PathBuf::from(path),
        None => current_dir().join(CONFIG_FILE_NAME),
    }
}

pub(crate) fn current_dir() -> PathBuf {
    env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolConfig {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_dir: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub export_dir: Option<PathBuf>,
}

fn default_version() -> u32 {
    CONFIG_VERSION
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            storage_dir: None,
            export_dir: None,
        }
    }
}

fn blank_to_none(path: &mut Option<PathBuf>) {
    if path
        .as_ref()
        .map_or(false, |value| value.as_os_str().to_string_lossy().trim().is_empty())
    {
        *path = None;
    }
}

impl ToolConfig {
    pub fn sanitize(&mut self) {
        if self.version == 0 {
            self.version = CONFIG_VERSION;
        }
        blank_to_none(&mut self.storage_dir);
        blank_to_none(&mut self.export_dir);
    }
}

/// 工具設定檔的讀寫。 / Loads and persists the tool configuration file.
#[derive(Debug)]
pub struct ConfigStore {
    path: PathBuf,
    data: ToolConfig,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>, config: ToolConfig) -> Self {
        Self {
            path: path.into(),
            data: config,
        }
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref().to_path_buf();
        if !path.exists() {
            let mut data = ToolConfig::default();
            data.sanitize();
            return Ok(Self { path, data });
        }

        let contents = fs::read_to_string(&path).map_err(|source| SettingsError::Read {
            path: path.clone(),
            source,
        })?;
        let mut data: ToolConfig =
            serde_json::from_str(&contents).map_err(|source| SettingsError::Parse {
                path: path.clone(),
                source,
            })?;
        data.sanitize();
        Ok(Self { path, data })
    }

    /// 讀取失敗時記錄警告並使用預設值。 / Like [`ConfigStore::load`], but an unreadable file yields defaults.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        Self::load(path).unwrap_or_else(|err| {
            log::warn!("{err}; using default configuration");
            Self::new(path, ToolConfig::default())
        })
    }

    pub fn config(&self) -> &ToolConfig {
        &self.data
    }

    pub fn update<F>(&mut self, mut op: F) -> Result<(), SettingsError>
    where
        F: FnMut(&mut ToolConfig),
    {
        op(&mut self.data);
        self.data.sanitize();
        self.save()
    }

    pub fn save(&self) -> Result<(), SettingsError> {
        let payload = serde_json::to_string_pretty(&self.data).map_err(|source| {
            SettingsError::Serialize {
                path: self.path.clone(),
                source,
            }
        })?;
        write_atomic(&self.path, payload.as_bytes())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_paths_are_dropped() {
        let mut config = ToolConfig {
            version: 0,
            storage_dir: Some(PathBuf::from("  ")),
            export_dir: Some(PathBuf::from("/tmp/exports")),
        };
        config.sanitize();
        assert_eq!(config.version, CONFIG_VERSION);
        assert_eq!(config.storage_dir, None);
        assert_eq!(config.export_dir, Some(PathBuf::from("/tmp/exports")));
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let config: ToolConfig =
            serde_json::from_str(r#"{"storage_dir": "/data", "theme": "dark"}"#).expect("parse");
        assert_eq!(config.storage_dir, Some(PathBuf::from("/data")));
        assert_eq!(config.version, CONFIG_VERSION);
    }
}
