mod csv_export;
mod xlsx_export;

use std::path::{Path, PathBuf};

use glosscheck_core::CompareRecord;

use crate::error::SourceError;

pub use csv_export::{read_compare_records, write_compare_csv, write_diff_csv};
pub(crate) use xlsx_export::HELPER_PREFIX;
pub use xlsx_export::{write_compare_xlsx, COMPARE_SHEET};

/// Paths produced by one versioned export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionedExport {
    pub csv: PathBuf,
    pub xlsx: PathBuf,
}

/// 以版本號與時間戳命名並同時輸出 CSV 與 XLSX。 / Writes `<base>_v<version>_<timestamp>.csv` and `.xlsx` side by side.
pub fn export_versioned(
    records: &[CompareRecord],
    dir: impl AsRef<Path>,
    base_name: &str,
    version: &str,
    timestamp: &str,
) -> Result<VersionedExport, SourceError> {
    let stem = format!("{base_name}_v{version}_{timestamp}");
    let dir = dir.as_ref();
    let export = VersionedExport {
        csv: dir.join(format!("{stem}.csv")),
        xlsx: dir.join(format!("{stem}.xlsx")),
    };
    write_compare_csv(&export.csv, records)?;
    write_compare_xlsx(&export.xlsx, records)?;
    log::info!("exported {} rows to {}", records.len(), export.csv.display());
    Ok(export)
}
