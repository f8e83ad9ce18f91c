use std::path::Path;

use glosscheck_core::{normalize_text, CompareColumn, CompareRecord};
use rust_xlsxwriter::{
    Color, ConditionalFormatCell, ConditionalFormatCellRule, Format, Formula, Workbook,
    Worksheet, XlsxError,
};

use crate::error::SourceError;

pub const COMPARE_SHEET: &str = "Compare";
/// Header prefix of the hidden helper columns.
pub(crate) const HELPER_PREFIX: &str = "__NORM_";

/// Hidden helper columns: (source column, helper header).
const HELPER_COLUMNS: [(CompareColumn, &str); 6] = [
    (CompareColumn::DictionaryKorean, "__NORM_DICTIONARY_KOREAN"),
    (CompareColumn::KoJson, "__NORM_KO_JSON"),
    (CompareColumn::DictionaryEnglish, "__NORM_DICTIONARY_ENGLISH"),
    (CompareColumn::EnJson, "__NORM_EN_JSON"),
    (CompareColumn::DictionaryRussian, "__NORM_DICTIONARY_RUSSIAN"),
    (CompareColumn::RuJson, "__NORM_RU_JSON"),
];

const MISMATCH_FILL: u32 = 0xFFF59D;
const NO_FILE_FILL: u32 = 0xECEFF1;

fn column_index(column: CompareColumn) -> u16 {
    CompareColumn::ALL
        .iter()
        .position(|candidate| *candidate == column)
        .unwrap_or(0) as u16
}

/// Spreadsheet column letters for a zero-based index (`0` → `A`, `26` → `AA`).
fn column_letter(index: u16) -> String {
    let mut index = u32::from(index) + 1;
    let mut letters = Vec::new();
    while index > 0 {
        let rem = ((index - 1) % 26) as u8;
        letters.push(char::from(b'A' + rem));
        index = (index - 1) / 26;
    }
    letters.iter().rev().collect()
}

fn cell_ref(column: u16, row: u32) -> String {
    format!("{}{}", column_letter(column), row + 1)
}

/// Spreadsheet rendition of the text normaliser: line endings, NBSP, TRIM, one quote pair.
fn normalize_formula(source: &str) -> String {
    let base = format!(
        "TRIM(SUBSTITUTE(SUBSTITUTE(SUBSTITUTE({source},CHAR(13)&CHAR(10),CHAR(10)),CHAR(13),CHAR(10)),CHAR(160),\" \"))"
    );
    format!(
        "=IF(AND(LEN({base})>=2,LEFT({base},1)=RIGHT({base},1),OR(CODE(LEFT({base},1))=34,CODE(LEFT({base},1))=39)),TRIM(MID({base},2,LEN({base})-2)),{base})"
    )
}

fn language_formula(dictionary: &str, json: &str) -> String {
    format!(
        "=IF({json}=\"\",\"no-file\",IF({dictionary}=\"\",\"N\",IF(ISNUMBER(FIND(\",\"&{json}&\",\",\",\"&SUBSTITUTE({dictionary},\", \",\",\")&\",\")),\"Y\",\"N\")))"
    )
}

fn overall_formula(ko: &str, en: &str, ru: &str) -> String {
    format!(
        "=IF(OR({ko}=\"no-file\",{en}=\"no-file\",{ru}=\"no-file\"),\"no-file\",IF(AND({ko}=\"Y\",{en}=\"Y\",{ru}=\"Y\"),\"Y\",\"N\"))"
    )
}

fn write_headers(sheet: &mut Worksheet) -> Result<(), XlsxError> {
    let bold = Format::new().set_bold();
    for (col, column) in CompareColumn::ALL.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, column.header(), &bold)?;
    }
    let helper_start = CompareColumn::ALL.len() as u16;
    for (offset, (_, helper)) in HELPER_COLUMNS.iter().enumerate() {
        sheet.write_string_with_format(0, helper_start + offset as u16, *helper, &bold)?;
    }
    Ok(())
}

fn write_record(sheet: &mut Worksheet, row: u32, record: &CompareRecord) -> Result<(), XlsxError> {
    for (col, column) in CompareColumn::ALL.iter().enumerate() {
        let col = col as u16;
        match column {
            CompareColumn::Seq => {
                sheet.write_number(row, col, record.seq as f64)?;
            }
            CompareColumn::KoMatch
            | CompareColumn::EnMatch
            | CompareColumn::RuMatch
            | CompareColumn::OverallMatch => {}
            other => {
                sheet.write_string(row, col, record.cell(*other))?;
            }
        }
    }

    let helper_start = CompareColumn::ALL.len() as u16;
    let mut helper_refs = Vec::with_capacity(HELPER_COLUMNS.len());
    for (offset, (source, _)) in HELPER_COLUMNS.iter().enumerate() {
        let col = helper_start + offset as u16;
        let formula = Formula::new(normalize_formula(&cell_ref(column_index(*source), row)))
            .set_result(normalize_text(&record.cell(*source)));
        sheet.write_formula(row, col, formula)?;
        helper_refs.push(cell_ref(col, row));
    }

    let matches = [
        (CompareColumn::KoMatch, &helper_refs[0], &helper_refs[1], record.ko_match),
        (CompareColumn::EnMatch, &helper_refs[2], &helper_refs[3], record.en_match),
        (CompareColumn::RuMatch, &helper_refs[4], &helper_refs[5], record.ru_match),
    ];
    for (column, dictionary, json, state) in matches {
        let formula = Formula::new(language_formula(dictionary, json)).set_result(state.as_str());
        sheet.write_formula(row, column_index(column), formula)?;
    }

    let overall = Formula::new(overall_formula(
        &cell_ref(column_index(CompareColumn::KoMatch), row),
        &cell_ref(column_index(CompareColumn::EnMatch), row),
        &cell_ref(column_index(CompareColumn::RuMatch), row),
    ))
    .set_result(record.overall_match.as_str());
    sheet.write_formula(row, column_index(CompareColumn::OverallMatch), overall)?;
    Ok(())
}

fn apply_highlights(sheet: &mut Worksheet, last_row: u32) -> Result<(), XlsxError> {
    let mismatch = ConditionalFormatCell::new()
        .set_rule(ConditionalFormatCellRule::EqualTo("\"N\""))
        .set_format(Format::new().set_background_color(Color::RGB(MISMATCH_FILL)));
    let no_file = ConditionalFormatCell::new()
        .set_rule(ConditionalFormatCellRule::EqualTo("\"no-file\""))
        .set_format(Format::new().set_background_color(Color::RGB(NO_FILE_FILL)));

    for column in [
        CompareColumn::KoMatch,
        CompareColumn::EnMatch,
        CompareColumn::RuMatch,
        CompareColumn::OverallMatch,
    ] {
        let col = column_index(column);
        sheet.add_conditional_format(1, col, last_row, col, &mismatch)?;
        sheet.add_conditional_format(1, col, last_row, col, &no_file)?;
    }
    Ok(())
}

fn build_workbook(records: &[CompareRecord]) -> Result<Workbook, XlsxError> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name(COMPARE_SHEET)?;
    write_headers(sheet)?;
    for (index, record) in records.iter().enumerate() {
        write_record(sheet, index as u32 + 1, record)?;
    }
    if !records.is_empty() {
        apply_highlights(sheet, records.len() as u32)?;
    }
    let helper_start = CompareColumn::ALL.len() as u16;
    for offset in 0..HELPER_COLUMNS.len() as u16 {
        sheet.set_column_hidden(helper_start + offset)?;
    }
    Ok(workbook)
}

/// 匯出含公式與條件格式的 XLSX。 / Writes the `Compare` workbook with live match formulas.
///
/// Match cells hold formulas over hidden normalised helper columns, cached with the
/// values computed by the engine, so the sheet re-evaluates after manual edits.
pub fn write_compare_xlsx(path: impl AsRef<Path>, records: &[CompareRecord]) -> Result<(), SourceError> {
    let path = path.as_ref();
    let xlsx_error = |source| SourceError::Xlsx {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|source| SourceError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }
    }
    let mut workbook = build_workbook(records).map_err(xlsx_error)?;
    workbook.save(path).map_err(xlsx_error)
}
