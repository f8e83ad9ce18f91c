use std::fs;

use glosscheck_core::{
    diff_tables, reconcile_sources, ColumnMapping, ColumnOverrides, CompareColumn, MatchState,
};
use glosscheck_sources::{
    export_versioned, load_sources, read_compare_records, read_table, SourceError, SourcePaths,
};
use rust_xlsxwriter::Workbook;
use tempfile::tempdir;

#[test]
fn tsv_dictionary_and_json_maps_reconcile() {
    let temp = tempdir().expect("tempdir");
    let dictionary = temp.path().join("dictionary.txt");
    fs::write(
        &dictionary,
        "Main Module\tEnglish\tKorean\tRussian\nVehicle\tCar\t자동차\tмашина\n",
    )
    .expect("write dictionary");
    let ko = temp.path().join("ko.json");
    fs::write(&ko, r#"{"Car": "자동차"}"#).expect("write ko");
    let ru = temp.path().join("ru.json");
    fs::write(&ru, r#"{"Car": "트럭"}"#).expect("write ru");

    let paths = SourcePaths {
        dictionary: Some(dictionary),
        ko: Some(ko),
        ru: Some(ru),
        en: Some(temp.path().join("en.json")),
    };
    let loaded = load_sources(&paths).expect("load");
    assert!(loaded.en.is_none());
    let table = loaded.dictionary.as_ref().expect("dictionary");
    let mapping = ColumnMapping::resolve(table.headers(), &ColumnOverrides::default())
        .expect("columns");

    let (records, report) = reconcile_sources(table, &mapping, &loaded.maps(), false);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].ko_match, MatchState::Yes);
    assert_eq!(records[0].en_match, MatchState::NoFile);
    assert_eq!(records[0].ru_match, MatchState::No);
    assert!(report.ko.loaded && !report.en.loaded);

    let export = export_versioned(&records, temp.path().join("exports"), "compare", "1.0", "20261019_090000")
        .expect("export");
    assert!(export.csv.ends_with("compare_v1.0_20261019_090000.csv"));
    assert!(export.xlsx.exists());
    assert_eq!(read_compare_records(&export.csv).expect("read back"), records);
}

#[test]
fn exported_csv_reads_back_as_table() {
    let temp = tempdir().expect("tempdir");
    let path = temp.path().join("dictionary.csv");
    fs::write(&path, "\u{feff}Module,English,Korean,Russian\nM,\"Car, big\",차,\n").expect("write");
    let table = read_table(&path).expect("read");
    assert_eq!(table.headers()[0], "Module");
    let row = table.rows().next().expect("row");
    assert_eq!(row.get("English"), "Car, big");
    assert_eq!(row.get("Russian"), "");
}

#[test]
fn workbook_export_reads_back_and_matches_its_csv() {
    let temp = tempdir().expect("tempdir");
    let dictionary = temp.path().join("dictionary.txt");
    fs::write(
        &dictionary,
        "Main Module\tEnglish\tKorean\tRussian\nVehicle\tCar\t자동차, 차\tмашина\n",
    )
    .expect("write dictionary");
    let ko = temp.path().join("ko.json");
    fs::write(&ko, r#"{"Car": "차"}"#).expect("write ko");

    let loaded = load_sources(&SourcePaths {
        dictionary: Some(dictionary),
        ko: Some(ko),
        ..SourcePaths::default()
    })
    .expect("load");
    let table = loaded.dictionary.as_ref().expect("dictionary");
    let mapping = ColumnMapping::resolve(table.headers(), &ColumnOverrides::default())
        .expect("columns");
    let (records, _) = reconcile_sources(table, &mapping, &loaded.maps(), false);
    let export = export_versioned(&records, temp.path(), "compare", "1.0", "20261019_090000")
        .expect("export");

    let workbook = read_table(&export.xlsx).expect("read workbook");
    let headers: Vec<&str> = CompareColumn::ALL.iter().map(|column| column.header()).collect();
    assert_eq!(workbook.headers(), headers.as_slice());
    let row = workbook.rows().next().expect("row");
    assert_eq!(row.get("Seq"), "1");
    assert_eq!(row.get("Dictionary Korean"), "자동차, 차");
    assert_eq!(row.get("KO_Match"), "Y");
    assert_eq!(row.get("en.json"), "");
    assert_eq!(row.get("Overall_Match"), "no-file");

    let csv = read_table(&export.csv).expect("read csv");
    assert!(diff_tables(&csv, &workbook).is_empty());
}

#[test]
fn workbook_dictionary_is_read_from_the_first_sheet() {
    let temp = tempdir().expect("tempdir");
    let path = temp.path().join("dictionary.xlsx");
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    for (col, header) in ["Module", "English", "Korean", "Russian"].iter().enumerate() {
        sheet.write_string(0, col as u16, *header).expect("header");
    }
    sheet.write_string(1, 0, "Vehicle").expect("cell");
    sheet.write_string(1, 1, "Car").expect("cell");
    sheet.write_number(1, 2, 7.0).expect("cell");
    workbook.save(&path).expect("save");

    let table = read_table(&path).expect("read");
    assert_eq!(table.headers(), ["Module", "English", "Korean", "Russian"]);
    let row = table.rows().next().expect("row");
    assert_eq!(row.get("English"), "Car");
    assert_eq!(row.get("Korean"), "7");
    assert_eq!(row.get("Russian"), "");
}

#[test]
fn broken_workbooks_report_the_path() {
    let temp = tempdir().expect("tempdir");
    let path = temp.path().join("dictionary.xlsx");
    fs::write(&path, b"PK").expect("write");
    assert!(matches!(
        read_table(&path),
        Err(SourceError::Workbook { .. })
    ));
}
