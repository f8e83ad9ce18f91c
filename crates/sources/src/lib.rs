//! Reading dictionary tables and language files from disk, and writing exports.

mod error;
pub mod export;
mod language;
mod reader;

use std::path::PathBuf;

use glosscheck_core::{LanguageMap, LanguageMaps, Table};

pub use error::SourceError;
pub use export::{
    export_versioned, read_compare_records, write_compare_csv, write_compare_xlsx,
    write_diff_csv, VersionedExport,
};
pub use language::{parse_language_map, read_language_map};
pub use reader::read_table;

/// 四個輸入來源的路徑。 / Paths of the four inputs; any may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourcePaths {
    pub dictionary: Option<PathBuf>,
    pub ko: Option<PathBuf>,
    pub ru: Option<PathBuf>,
    pub en: Option<PathBuf>,
}

/// Inputs read from disk. A `None` language map was not loaded.
#[derive(Debug, Clone, Default)]
pub struct LoadedSources {
    pub dictionary: Option<Table>,
    pub ko: Option<LanguageMap>,
    pub ru: Option<LanguageMap>,
    pub en: Option<LanguageMap>,
}

impl LoadedSources {
    pub fn maps(&self) -> LanguageMaps<'_> {
        LanguageMaps {
            ko: self.ko.as_ref(),
            ru: self.ru.as_ref(),
            en: self.en.as_ref(),
        }
    }
}

/// 載入所有存在的來源檔。 / Loads every input that exists on disk.
pub fn load_sources(paths: &SourcePaths) -> Result<LoadedSources, SourceError> {
    let dictionary = match paths.dictionary.as_deref().filter(|path| path.exists()) {
        Some(path) => Some(read_table(path)?),
        None => None,
    };
    Ok(LoadedSources {
        dictionary,
        ko: read_language_map(paths.ko.as_deref())?,
        ru: read_language_map(paths.ru.as_deref())?,
        en: read_language_map(paths.en.as_deref())?,
    })
}
