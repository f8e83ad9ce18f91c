mod common;

use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use common::{cli, path_arg, write_inputs};
use predicates::prelude::*;
use tempfile::tempdir;

fn export_compare(root: &Path) -> Result<PathBuf, Box<dyn Error>> {
    let inputs = write_inputs(root)?;
    let output = root.join("compare.csv");
    cli(root)?
        .args([
            "compare",
            "--dictionary",
            path_arg(&inputs.dictionary),
            "--ko",
            path_arg(&inputs.ko),
            "--ru",
            path_arg(&inputs.ru),
            "--csv",
            path_arg(&output),
        ])
        .assert()
        .success();
    Ok(output)
}

#[test]
fn edit_snaps_matching_language_and_diff_reports_it() -> Result<(), Box<dyn Error>> {
    let root = tempdir()?;
    let baseline = export_compare(root.path())?;
    let edited = root.path().join("edited.csv");

    cli(root.path())?
        .args([
            "edit",
            "--table",
            path_arg(&baseline),
            "--key",
            "Car",
            "--column",
            "Dictionary Korean",
            "--value",
            "승용차",
            "--output",
            path_arg(&edited),
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Edited 'Car': KO=Y EN=no-file RU=N overall=no-file",
        ));

    let text = fs::read_to_string(&edited)?;
    assert!(text.contains(",승용차,"));
    assert!(text.contains(",edited,"));

    cli(root.path())?
        .args([
            "diff",
            "--baseline",
            path_arg(&baseline),
            "--current",
            path_arg(&edited),
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Car\tchanged\tko.json\t차\t승용차"))
        .stdout(predicate::str::contains("Car\tchanged\tDictionary Korean\t자동차, 차\t승용차"))
        .stdout(predicate::str::contains("Edited At"))
        .stdout(predicate::str::contains("Edit Status").not());
    Ok(())
}

#[test]
fn diff_writes_change_log_csv() -> Result<(), Box<dyn Error>> {
    let root = tempdir()?;
    let baseline = export_compare(root.path())?;
    let current = root.path().join("current.csv");
    let text = fs::read_to_string(&baseline)?;
    fs::write(&current, text.replace("авто", "машина"))?;
    let log = root.path().join("changes.csv");

    cli(root.path())?
        .args([
            "diff",
            "--baseline",
            path_arg(&baseline),
            "--current",
            path_arg(&current),
            "--csv",
            path_arg(&log),
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote 1 changes"));

    let written = fs::read_to_string(&log)?;
    assert!(written.contains("Key,Change,Column,Old,New"));
    assert!(written.contains("Car,changed,ru.json,авто,машина"));
    Ok(())
}

#[test]
fn identical_tables_have_no_changes() -> Result<(), Box<dyn Error>> {
    let root = tempdir()?;
    let baseline = export_compare(root.path())?;

    cli(root.path())?
        .args([
            "diff",
            "--baseline",
            path_arg(&baseline),
            "--current",
            path_arg(&baseline),
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("No changes."));
    Ok(())
}

#[test]
fn derived_columns_cannot_be_edited() -> Result<(), Box<dyn Error>> {
    let root = tempdir()?;
    let baseline = export_compare(root.path())?;
    let before = fs::read_to_string(&baseline)?;

    cli(root.path())?
        .args([
            "edit",
            "--table",
            path_arg(&baseline),
            "--key",
            "Car",
            "--column",
            "KO_Match",
            "--value",
            "Y",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "Error: column 'KO_Match' is derived and cannot be edited",
        ));

    cli(root.path())?
        .args([
            "edit",
            "--table",
            path_arg(&baseline),
            "--key",
            "Bus",
            "--column",
            "ko.json",
            "--value",
            "버스",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no row with key 'Bus'"));

    assert_eq!(fs::read_to_string(&baseline)?, before);
    Ok(())
}

#[test]
fn workbook_export_diffs_against_csv_export() -> Result<(), Box<dyn Error>> {
    let root = tempdir()?;
    let inputs = write_inputs(root.path())?;
    let csv = root.path().join("compare.csv");
    let xlsx = root.path().join("compare.xlsx");
    cli(root.path())?
        .args([
            "compare",
            "--dictionary",
            path_arg(&inputs.dictionary),
            "--ko",
            path_arg(&inputs.ko),
            "--ru",
            path_arg(&inputs.ru),
            "--csv",
            path_arg(&csv),
            "--xlsx",
            path_arg(&xlsx),
        ])
        .assert()
        .success();

    cli(root.path())?
        .args(["diff", "--baseline", path_arg(&xlsx), "--current", path_arg(&csv)])
        .assert()
        .success()
        .stdout(predicate::str::contains("No changes."));
    Ok(())
}
