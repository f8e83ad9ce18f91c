use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use csv::{ReaderBuilder, Writer};
use glosscheck_core::{CompareRecord, DiffRecord};
use serde::Serialize;

use crate::error::SourceError;
use crate::reader::{decode_text, read_bytes};

fn ensure_parent_dir(path: &Path) -> Result<(), SourceError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).map_err(|source| SourceError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }
    }
    Ok(())
}

pub(crate) fn create_file(path: &Path) -> Result<File, SourceError> {
    ensure_parent_dir(path)?;
    File::create(path).map_err(|source| SourceError::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// Writes serialisable rows as UTF-8 CSV with a BOM so spreadsheet tools pick the encoding.
fn write_rows<T: Serialize>(path: &Path, rows: &[T], headers: &[&str]) -> Result<(), SourceError> {
    let csv_error = |source| SourceError::Csv {
        path: path.to_path_buf(),
        source,
    };
    let mut file = create_file(path)?;
    file.write_all(b"\xEF\xBB\xBF")
        .map_err(|source| SourceError::Write {
            path: path.to_path_buf(),
            source,
        })?;

    let mut writer = Writer::from_writer(file);
    if rows.is_empty() {
        writer.write_record(headers).map_err(csv_error)?;
    }
    for row in rows {
        writer.serialize(row).map_err(csv_error)?;
    }
    writer.flush().map_err(|source| SourceError::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// 匯出比對結果 CSV。 / Exports compare records with the sixteen output headers.
pub fn write_compare_csv(path: impl AsRef<Path>, records: &[CompareRecord]) -> Result<(), SourceError> {
    let headers: Vec<&str> = glosscheck_core::CompareColumn::ALL
        .iter()
        .map(|column| column.header())
        .collect();
    write_rows(path.as_ref(), records, &headers)
}

/// 匯出差異報告 CSV。 / Exports a change log (`Key, Change, Column, Old, New`).
pub fn write_diff_csv(path: impl AsRef<Path>, changes: &[DiffRecord]) -> Result<(), SourceError> {
    write_rows(path.as_ref(), changes, &["Key", "Change", "Column", "Old", "New"])
}

/// 讀回先前匯出的比對 CSV。 / Reads compare records back from an exported CSV.
pub fn read_compare_records(path: impl AsRef<Path>) -> Result<Vec<CompareRecord>, SourceError> {
    let path = path.as_ref();
    let text = decode_text(path, &read_bytes(path)?)?;
    let mut reader = ReaderBuilder::new().from_reader(text.as_bytes());
    reader
        .deserialize()
        .map(|record| {
            record.map_err(|source| SourceError::Csv {
                path: path.to_path_buf(),
                source,
            })
        })
        .collect()
}
