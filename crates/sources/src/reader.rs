use std::borrow::Cow;
use std::fs;
use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use csv::ReaderBuilder;
use encoding_rs::EUC_KR;
use glosscheck_core::Table;

use crate::error::SourceError;
use crate::export::HELPER_PREFIX;

const WORKBOOK_EXTENSIONS: [&str; 4] = ["xlsx", "xlsm", "xls", "ods"];
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// 以 UTF-8（可含 BOM）解碼，失敗時改用 CP949。 / Decodes UTF-8 (BOM optional), falling back to CP949.
pub(crate) fn decode_text(path: &Path, bytes: &[u8]) -> Result<String, SourceError> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    if let Ok(text) = std::str::from_utf8(bytes) {
        return Ok(text.to_owned());
    }

    let (cow, had_errors) = EUC_KR.decode_without_bom_handling(bytes);
    if had_errors {
        return Err(SourceError::Decode {
            path: path.to_path_buf(),
        });
    }
    log::debug!("{} decoded as CP949", path.display());
    Ok(match cow {
        Cow::Borrowed(slice) => slice.to_owned(),
        Cow::Owned(string) => string,
    })
}

pub(crate) fn read_bytes(path: &Path) -> Result<Vec<u8>, SourceError> {
    fs::read(path).map_err(|source| SourceError::Read {
        path: path.to_path_buf(),
        source,
    })
}

fn has_extension(path: &Path, wanted: &str) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map_or(false, |ext| ext.eq_ignore_ascii_case(wanted))
}

/// 讀取字典表格：`.csv` 以逗號分隔，其餘以 Tab 分隔。 / Reads a dictionary table from disk.
///
/// `.csv` files are comma separated, workbooks (`.xlsx`, `.xlsm`, `.xls`, `.ods`) are
/// read from their first sheet, and every other extension is read as TSV. The first
/// record is the header row and short rows are padded with blanks. An empty file
/// yields an empty table.
pub fn read_table(path: impl AsRef<Path>) -> Result<Table, SourceError> {
    let path = path.as_ref();
    if WORKBOOK_EXTENSIONS
        .iter()
        .any(|extension| has_extension(path, extension))
    {
        return read_workbook(path);
    }
    let delimiter = if has_extension(path, "csv") { b',' } else { b'\t' };
    let text = decode_text(path, &read_bytes(path)?)?;
    parse_table(path, &text, delimiter)
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// 讀取活頁簿的第一個工作表；略過匯出時加入的隱藏輔助欄。 / Reads the first sheet of a workbook.
///
/// Every cell becomes text and blanks become `""`. Hidden `__NORM_*` helper columns
/// written by the compare export are dropped so a workbook export diffs cleanly
/// against its CSV twin.
fn read_workbook(path: &Path) -> Result<Table, SourceError> {
    let workbook_error = |source| SourceError::Workbook {
        path: path.to_path_buf(),
        source,
    };
    let mut workbook = open_workbook_auto(path).map_err(workbook_error)?;
    let range = match workbook.worksheet_range_at(0) {
        Some(range) => range.map_err(workbook_error)?,
        None => return Ok(Table::default()),
    };

    let mut rows = range.rows();
    let Some(header_row) = rows.next() else {
        return Ok(Table::default());
    };
    let kept: Vec<usize> = header_row
        .iter()
        .enumerate()
        .filter(|(_, cell)| !cell_text(cell).starts_with(HELPER_PREFIX))
        .map(|(index, _)| index)
        .collect();
    let pick = |row: &[Data]| -> Vec<String> {
        kept.iter()
            .map(|index| row.get(*index).map(cell_text).unwrap_or_default())
            .collect()
    };

    let mut table = Table::new(pick(header_row));
    for row in rows {
        table.push_row(pick(row));
    }
    log::debug!("read {} rows from workbook {}", table.len(), path.display());
    Ok(table)
}

pub(crate) fn parse_table(path: &Path, text: &str, delimiter: u8) -> Result<Table, SourceError> {
    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut records = reader.records();
    let headers: Vec<String> = match records.next() {
        Some(record) => {
            let record = record.map_err(|source| SourceError::Csv {
                path: path.to_path_buf(),
                source,
            })?;
            record.iter().map(str::to_string).collect()
        }
        None => return Ok(Table::default()),
    };

    let mut table = Table::new(headers);
    let width = table.headers().len();
    for record in records {
        let record = record.map_err(|source| SourceError::Csv {
            path: path.to_path_buf(),
            source,
        })?;
        let mut row: Vec<String> = record.iter().map(str::to_string).collect();
        if row.len() < width {
            row.resize(width, String::new());
        }
        table.push_row(row);
    }
    log::debug!("read {} rows from {}", table.len(), path.display());
    Ok(table)
}
