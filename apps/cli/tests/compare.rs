mod common;

use std::error::Error;
use std::fs;

use common::{cli, path_arg, write_inputs};
use predicates::prelude::*;
use tempfile::tempdir;

#[test]
fn columns_reports_guessed_headers() -> Result<(), Box<dyn Error>> {
    let root = tempdir()?;
    let inputs = write_inputs(root.path())?;

    cli(root.path())?
        .args(["columns", path_arg(&inputs.dictionary)])
        .assert()
        .success()
        .stdout(predicate::str::contains("module: Main Module"))
        .stdout(predicate::str::contains("english: Enlish"))
        .stdout(predicate::str::contains("russian: Russian"));
    Ok(())
}

#[test]
fn compare_prints_status_and_writes_csv() -> Result<(), Box<dyn Error>> {
    let root = tempdir()?;
    let inputs = write_inputs(root.path())?;
    let output = root.path().join("out").join("compare.csv");

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
            path_arg(&output),
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "compare finished: 1 rows | ko.json=loaded, ru.json=loaded, en.json=missing",
        ))
        .stdout(predicate::str::contains(
            "KO mismatches: 0 | EN mismatches: 0 | RU mismatches: 1 | overall mismatches: 0",
        ));

    let text = fs::read_to_string(&output)?;
    let mut lines = text.trim_start_matches('\u{feff}').lines();
    let header = lines.next().expect("header");
    assert!(header.starts_with("Seq,Compare Key,Source,Main Module"));
    let row = lines.next().expect("row");
    assert!(row.contains("Car,both,Vehicle"));
    assert!(row.contains(",Y,no-file,N,no-file,"));
    Ok(())
}

#[test]
fn filters_limit_printed_rows() -> Result<(), Box<dyn Error>> {
    let root = tempdir()?;
    let inputs = write_inputs(root.path())?;

    cli(root.path())?
        .args([
            "compare",
            "--dictionary",
            path_arg(&inputs.dictionary),
            "--ko",
            path_arg(&inputs.ko),
            "--ru",
            path_arg(&inputs.ru),
            "--ru-match",
            "N",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 of 1 rows match the filter"))
        .stdout(predicate::str::contains("Car (Vehicle) KO=Y EN=no-file RU=N"));

    cli(root.path())?
        .args([
            "compare",
            "--dictionary",
            path_arg(&inputs.dictionary),
            "--ko",
            path_arg(&inputs.ko),
            "--ko-match",
            "N",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("0 of 1 rows match the filter"));
    Ok(())
}

#[test]
fn unknown_match_state_is_rejected() -> Result<(), Box<dyn Error>> {
    let root = tempdir()?;
    let inputs = write_inputs(root.path())?;

    cli(root.path())?
        .args([
            "compare",
            "--dictionary",
            path_arg(&inputs.dictionary),
            "--overall",
            "maybe",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown match state"));
    Ok(())
}

#[test]
fn missing_dictionary_fails() -> Result<(), Box<dyn Error>> {
    let root = tempdir()?;

    cli(root.path())?
        .args(["compare", "--dictionary", "absent.tsv"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error: dictionary 'absent.tsv' does not exist"));

    cli(root.path())?
        .args(["compare"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no dictionary given"));
    Ok(())
}

#[test]
fn unmappable_dictionary_fails() -> Result<(), Box<dyn Error>> {
    let root = tempdir()?;
    let dictionary = root.path().join("dictionary.csv");
    fs::write(&dictionary, "Alpha,Beta\nx,y\n")?;

    cli(root.path())?
        .args(["compare", "--dictionary", path_arg(&dictionary)])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to map columns"));
    Ok(())
}
