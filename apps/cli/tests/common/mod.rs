#![allow(dead_code)]

use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;

pub const DICTIONARY_TSV: &str =
    "Main Module\tEnlish\tKorean\tRussian\nVehicle\tCar\t자동차, 차\tмашина\n";

/// Command with config, home and storage isolated under `root`.
pub fn cli(root: &Path) -> Result<Command, Box<dyn Error>> {
    let mut cmd = Command::cargo_bin("glosscheck-cli")?;
    cmd.current_dir(root)
        .env("GLOSSCHECK_CONFIG", root.join("config.json"))
        .env("HOME", root)
        .env_remove("USERPROFILE")
        .env_remove("GLOSSCHECK_STORAGE_DIR")
        .env("RUST_LOG", "warn");
    Ok(cmd)
}

/// Writes the dictionary plus ko/ru language files; en.json is left out.
pub fn write_inputs(root: &Path) -> Result<Inputs, Box<dyn Error>> {
    let inputs = Inputs {
        dictionary: root.join("dictionary.tsv"),
        ko: root.join("ko.json"),
        ru: root.join("ru.json"),
    };
    fs::write(&inputs.dictionary, DICTIONARY_TSV)?;
    fs::write(&inputs.ko, r#"{"Car": "차"}"#)?;
    fs::write(&inputs.ru, r#"{"Car": "авто"}"#)?;
    Ok(inputs)
}

pub struct Inputs {
    pub dictionary: PathBuf,
    pub ko: PathBuf,
    pub ru: PathBuf,
}

pub fn path_arg(path: &Path) -> &str {
    path.to_str().expect("utf-8 path")
}
