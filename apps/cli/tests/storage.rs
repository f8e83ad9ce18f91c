mod common;

use std::error::Error;
use std::fs;
use std::path::Path;

use common::{cli, path_arg, write_inputs};
use predicates::prelude::*;
use tempfile::tempdir;

fn exported_files(dir: &Path, extension: &str) -> Result<Vec<String>, Box<dyn Error>> {
    let mut names: Vec<String> = fs::read_dir(dir)?
        .filter_map(Result::ok)
        .filter_map(|entry| entry.file_name().to_str().map(str::to_string))
        .filter(|name| name.ends_with(extension))
        .collect();
    names.sort();
    Ok(names)
}

#[test]
fn saved_sources_feed_later_runs_and_versions_advance() -> Result<(), Box<dyn Error>> {
    let root = tempdir()?;
    let inputs = write_inputs(root.path())?;
    let storage = root.path().join("storage");

    cli(root.path())?
        .args([
            "--storage-dir",
            path_arg(&storage),
            "compare",
            "--dictionary",
            path_arg(&inputs.dictionary),
            "--ko",
            path_arg(&inputs.ko),
            "--ru",
            path_arg(&inputs.ru),
            "--save-sources",
            "--export",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Exported v1.0"));

    assert!(storage.join("dictionary_latest.tsv").exists());
    assert!(storage.join("ko_latest.json").exists());
    assert!(storage.join("ru_latest.json").exists());
    assert!(!storage.join("en_latest.json").exists());

    cli(root.path())?
        .args(["compare", "--use-saved", "--export"])
        .env("GLOSSCHECK_STORAGE_DIR", &storage)
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "ko.json=loaded, ru.json=loaded, en.json=missing",
        ))
        .stdout(predicate::str::contains("Exported v1.1"));

    let csvs = exported_files(&storage.join("exports"), ".csv")?;
    assert_eq!(csvs.len(), 2);
    assert!(csvs[0].starts_with("glossary_compare_v1.0_"));
    assert!(csvs[1].starts_with("glossary_compare_v1.1_"));
    assert_eq!(exported_files(&storage.join("exports"), ".xlsx")?.len(), 2);
    Ok(())
}

#[test]
fn storage_set_is_remembered() -> Result<(), Box<dyn Error>> {
    let root = tempdir()?;
    let chosen = root.path().join("chosen");

    cli(root.path())?
        .args(["storage", "set", path_arg(&chosen)])
        .assert()
        .success()
        .stdout(predicate::str::contains("Storage set to"));
    assert!(chosen.is_dir());
    assert!(root.path().join("config.json").exists());

    cli(root.path())?
        .args(["storage", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains(format!(
            "Storage: {}",
            chosen.display()
        )))
        .stdout(predicate::str::contains(format!(
            "Exports: {}",
            chosen.join("exports").display()
        )));
    Ok(())
}

#[test]
fn storage_defaults_to_home() -> Result<(), Box<dyn Error>> {
    let root = tempdir()?;

    cli(root.path())?
        .args(["storage", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            root.path().join("glosscheck_storage").display().to_string(),
        ));
    Ok(())
}
