use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::{current_dir, default_config_path, ConfigStore};
use crate::error::SettingsError;
use crate::write_atomic;

/// Environment variable that pins the storage directory.
pub const STORAGE_ENV: &str = "GLOSSCHECK_STORAGE_DIR";
pub const STORAGE_DIR_NAME: &str = "glosscheck_storage";
pub const EXPORT_DIR_NAME: &str = "exports";
pub const VERSION_STATE_FILE: &str = "export_version.json";

/// 儲存來源檔時使用的別名。 / Names under which input files are kept in storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceAlias {
    Dictionary,
    Ko,
    Ru,
    En,
}

impl SourceAlias {
    pub const ALL: [SourceAlias; 4] = [
        SourceAlias::Dictionary,
        SourceAlias::Ko,
        SourceAlias::Ru,
        SourceAlias::En,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SourceAlias::Dictionary => "dictionary_latest",
            SourceAlias::Ko => "ko_latest",
            SourceAlias::Ru => "ru_latest",
            SourceAlias::En => "en_latest",
        }
    }
}

impl fmt::Display for SourceAlias {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 匯出版本，以 0.1 為單位。 / Export version counted in tenths (`1.0`, `1.1`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ExportVersion(u32);

impl ExportVersion {
    /// The implicit version before the first reservation.
    pub const INITIAL: ExportVersion = ExportVersion(9);
    /// The first reserved version, `1.0`.
    pub const FIRST: ExportVersion = ExportVersion(10);

    /// The following version, or `None` once the counter is exhausted.
    pub fn next(self) -> Option<Self> {
        self.0.checked_add(1).map(ExportVersion)
    }
}

impl fmt::Display for ExportVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.0 / 10, self.0 % 10)
    }
}

impl FromStr for ExportVersion {
    type Err = SettingsError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let invalid = || SettingsError::InvalidVersion {
            value: value.to_string(),
        };
        let trimmed = value.trim();
        let (major, minor) = trimmed.split_once('.').unwrap_or((trimmed, "0"));
        let major: u32 = major.parse().map_err(|_| invalid())?;
        let minor: u32 = match minor.len() {
            1 => minor.parse().map_err(|_| invalid())?,
            _ => return Err(invalid()),
        };
        major
            .checked_mul(10)
            .and_then(|tenths| tenths.checked_add(minor))
            .map(ExportVersion)
            .ok_or_else(invalid)
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct VersionState {
    current: String,
}

fn absolutize(path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        current_dir().join(path)
    }
}

fn ensure_dir(path: &Path) -> Result<(), SettingsError> {
    fs::create_dir_all(path).map_err(|source| SettingsError::CreateDir {
        path: path.to_path_buf(),
        source,
    })
}

/// 決定儲存資料夾的位置。 / Decides where saved sources and exports live.
///
/// Resolution order: an explicit preferred path, the `GLOSSCHECK_STORAGE_DIR`
/// variable, the config file, `<home>/Desktop/glosscheck_storage` when a Desktop
/// folder exists, then `<home>/glosscheck_storage`.
#[derive(Debug, Clone)]
pub struct StorageLocator {
    config_path: PathBuf,
    home: PathBuf,
    env_storage: Option<PathBuf>,
}

impl StorageLocator {
    pub fn new(config_path: impl Into<PathBuf>, home: impl Into<PathBuf>) -> Self {
        Self {
            config_path: config_path.into(),
            home: home.into(),
            env_storage: None,
        }
    }

    /// Reads the config path, home directory and storage override from the environment.
    pub fn from_env() -> Self {
        let home = env::var_os("HOME")
            .or_else(|| env::var_os("USERPROFILE"))
            .filter(|value| !value.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(current_dir);
        let env_storage = env::var_os(STORAGE_ENV)
            .filter(|value| !value.is_empty())
            .map(PathBuf::from);
        Self::new(default_config_path(), home).with_env_storage(env_storage)
    }

    pub fn with_env_storage(mut self, path: Option<PathBuf>) -> Self {
        self.env_storage = path;
        self
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn resolve(&self, preferred: Option<&Path>) -> Result<Storage, SettingsError> {
        let config = ConfigStore::load_or_default(&self.config_path);
        let export_dir = config.config().export_dir.clone();

        let root = if let Some(path) = preferred {
            absolutize(path)
        } else if let Some(path) = &self.env_storage {
            absolutize(path)
        } else if let Some(path) = &config.config().storage_dir {
            absolutize(path)
        } else {
            let desktop = self.home.join("Desktop");
            if desktop.is_dir() {
                desktop.join(STORAGE_DIR_NAME)
            } else {
                self.home.join(STORAGE_DIR_NAME)
            }
        };
        ensure_dir(&root)?;
        log::debug!("storage directory: {}", root.display());
        Ok(Storage { root, export_dir })
    }

    /// 保存儲存資料夾設定。 / Persists `path` as the configured storage directory.
    pub fn set_storage_dir(&self, path: &Path) -> Result<Storage, SettingsError> {
        let target = absolutize(path);
        ensure_dir(&target)?;
        let mut config = ConfigStore::load_or_default(&self.config_path);
        config.update(|data| data.storage_dir = Some(target.clone()))?;
        log::info!("storage directory set to {}", target.display());
        Ok(Storage {
            root: target,
            export_dir: config.config().export_dir.clone(),
        })
    }
}

/// 已決定的儲存資料夾。 / A resolved storage directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Storage {
    root: PathBuf,
    export_dir: Option<PathBuf>,
}

impl Storage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            export_dir: None,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Export folder from the config, else `<storage>/exports`; created on demand.
    pub fn export_dir(&self) -> Result<PathBuf, SettingsError> {
        let dir = match &self.export_dir {
            Some(path) => absolutize(path),
            None => self.root.join(EXPORT_DIR_NAME),
        };
        ensure_dir(&dir)?;
        Ok(dir)
    }

    /// 複製來源檔到儲存資料夾。 / Copies an input file into storage.
    ///
    /// Writes `<alias><ext>` as the latest copy and `<alias>_<timestamp><ext>` as a
    /// history entry, returning the latest copy.
    pub fn store_source(
        &self,
        alias: SourceAlias,
        file: &Path,
        timestamp: &str,
    ) -> Result<PathBuf, SettingsError> {
        let bytes = fs::read(file).map_err(|source| SettingsError::Read {
            path: file.to_path_buf(),
            source,
        })?;
        let ext = file
            .extension()
            .map(|ext| format!(".{}", ext.to_string_lossy()))
            .unwrap_or_default();
        ensure_dir(&self.root)?;

        let latest = self.root.join(format!("{alias}{ext}"));
        write_atomic(&latest, &bytes)?;
        let history = self.root.join(format!("{alias}_{timestamp}{ext}"));
        write_atomic(&history, &bytes)?;
        log::info!("stored {} as {}", file.display(), latest.display());
        Ok(latest)
    }

    /// 取得別名的最新儲存檔（依檔名排序取最後一個）。 / Latest saved `<alias>.*` file, by file name.
    pub fn saved_source(&self, alias: SourceAlias) -> Option<PathBuf> {
        let prefix = format!("{alias}.");
        let entries = fs::read_dir(&self.root).ok()?;
        let mut matches: Vec<PathBuf> = entries
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.is_file())
            .filter(|path| {
                path.file_name()
                    .and_then(|name| name.to_str())
                    .map_or(false, |name| name.starts_with(&prefix) && !name.ends_with(".tmp"))
            })
            .collect();
        matches.sort();
        matches.pop()
    }

    pub fn version_state_path(&self) -> PathBuf {
        self.root.join(VERSION_STATE_FILE)
    }

    fn current_version(&self) -> ExportVersion {
        let path = self.version_state_path();
        if !path.exists() {
            return ExportVersion::INITIAL;
        }
        let parsed = fs::read_to_string(&path)
            .map_err(|source| SettingsError::Read {
                path: path.clone(),
                source,
            })
            .and_then(|contents| {
                serde_json::from_str::<VersionState>(&contents).map_err(|source| {
                    SettingsError::Parse {
                        path: path.clone(),
                        source,
                    }
                })
            })
            .and_then(|state| state.current.parse::<ExportVersion>());
        parsed.unwrap_or_else(|err| {
            log::warn!("{err}; restarting export versions at 1.0");
            ExportVersion::INITIAL
        })
    }

    /// 預留下一個匯出版本並寫回狀態檔。 / Reserves the next export version and persists it.
    pub fn reserve_next_version(&self) -> Result<ExportVersion, SettingsError> {
        let current = self.current_version();
        let next = current.next().unwrap_or_else(|| {
            log::warn!(
                "export version {current} cannot advance; restarting at {}",
                ExportVersion::FIRST
            );
            ExportVersion::FIRST
        });
        let path = self.version_state_path();
        let payload = serde_json::to_string_pretty(&VersionState {
            current: next.to_string(),
        })
        .map_err(|source| SettingsError::Serialize {
            path: path.clone(),
            source,
        })?;
        write_atomic(&path, payload.as_bytes())?;
        Ok(next)
    }
}
