//! Baseline-versus-current change log.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::compare::CompareColumn;
use crate::table::Table;
use crate::text::normalize_text;

/// Columns never reported as changes.
pub const DIFF_IGNORED_COLUMNS: [CompareColumn; 2] = [CompareColumn::Seq, CompareColumn::EditStatus];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChangeKind {
    #[serde(rename = "added")]
    Added,
    #[serde(rename = "removed")]
    Removed,
    #[serde(rename = "changed")]
    Changed,
}

impl ChangeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ChangeKind::Added => "added",
            ChangeKind::Removed => "removed",
            ChangeKind::Changed => "changed",
        }
    }
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 一筆變更紀錄。 / One entry of the change log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffRecord {
    #[serde(rename = "Key")]
    pub key: String,
    #[serde(rename = "Change")]
    pub change: ChangeKind,
    #[serde(rename = "Column")]
    pub column: String,
    #[serde(rename = "Old")]
    pub old: String,
    #[serde(rename = "New")]
    pub new: String,
}

impl DiffRecord {
    fn added(key: &str) -> Self {
        Self {
            key: key.to_string(),
            change: ChangeKind::Added,
            column: "-".to_string(),
            old: String::new(),
            new: "row added".to_string(),
        }
    }

    fn removed(key: &str) -> Self {
        Self {
            key: key.to_string(),
            change: ChangeKind::Removed,
            column: "-".to_string(),
            old: "row present".to_string(),
            new: String::new(),
        }
    }
}

fn key_column(table: &Table) -> Option<&'static str> {
    [CompareColumn::CompareKey, CompareColumn::DictionaryEnglish]
        .into_iter()
        .map(CompareColumn::header)
        .find(|header| table.has_column(header))
}

/// Normalised key → normalised row; later rows win on duplicate keys.
fn keyed_rows(table: &Table, key_header: &str) -> BTreeMap<String, BTreeMap<String, String>> {
    let mut keyed = BTreeMap::new();
    for row in table.rows() {
        let key = normalize_text(row.get(key_header));
        if key.is_empty() {
            continue;
        }
        let cells = row
            .to_map()
            .into_iter()
            .map(|(header, cell)| (header.to_string(), normalize_text(cell)))
            .collect();
        keyed.insert(key, cells);
    }
    keyed
}

/// 比較基準表與目前表格。 / Compares a baseline table against the current one.
///
/// Rows are keyed by `Compare Key`, or by `Dictionary English` when a table lacks it.
/// Output is sorted by key; within a key, changed columns follow header-name order.
/// Returns an empty log when either side has neither key column.
pub fn diff_tables(baseline: &Table, current: &Table) -> Vec<DiffRecord> {
    let (Some(baseline_key), Some(current_key)) = (key_column(baseline), key_column(current))
    else {
        log::warn!("diff skipped: both tables need a Compare Key or Dictionary English column");
        return Vec::new();
    };

    let before = keyed_rows(baseline, baseline_key);
    let after = keyed_rows(current, current_key);
    let keys: BTreeSet<&String> = before.keys().chain(after.keys()).collect();
    let ignored: Vec<&str> = DIFF_IGNORED_COLUMNS
        .iter()
        .map(|column| column.header())
        .collect();

    let mut changes = Vec::new();
    for key in keys {
        let (old_row, new_row) = match (before.get(key), after.get(key)) {
            (None, Some(_)) => {
                changes.push(DiffRecord::added(key));
                continue;
            }
            (Some(_), None) => {
                changes.push(DiffRecord::removed(key));
                continue;
            }
            (Some(old_row), Some(new_row)) => (old_row, new_row),
            (None, None) => continue,
        };

        let columns: BTreeSet<&String> = old_row.keys().chain(new_row.keys()).collect();
        for column in columns {
            if ignored.contains(&column.as_str()) {
                continue;
            }
            let old = old_row.get(column).map(String::as_str).unwrap_or("");
            let new = new_row.get(column).map(String::as_str).unwrap_or("");
            if old != new {
                changes.push(DiffRecord {
                    key: key.clone(),
                    change: ChangeKind::Changed,
                    column: column.clone(),
                    old: old.to_string(),
                    new: new.to_string(),
                });
            }
        }
    }
    changes
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADERS: [&str; 4] = ["Seq", "Compare Key", "Dictionary Korean", "Edit Status"];

    #[test]
    fn reports_added_removed_and_changed_rows() {
        let baseline = Table::from_literals(
            &HEADERS,
            &[&["1", "Car", "차", ""], &["2", "Bus", "버스", ""]],
        );
        let current = Table::from_literals(
            &HEADERS,
            &[
                &["5", "Car", "자동차", "edited"],
                &["3", "Project", "프로젝트", ""],
            ],
        );
        let log = diff_tables(&baseline, &current);
        assert_eq!(log.len(), 3);

        assert_eq!(log[0], DiffRecord::removed("Bus"));
        assert_eq!(
            log[1],
            DiffRecord {
                key: "Car".to_string(),
                change: ChangeKind::Changed,
                column: "Dictionary Korean".to_string(),
                old: "차".to_string(),
                new: "자동차".to_string(),
            }
        );
        assert_eq!(log[2], DiffRecord::added("Project"));
    }

    #[test]
    fn falls_back_to_dictionary_english_key() {
        let baseline = Table::from_literals(&["Dictionary English", "Note"], &[&["Car", "a"]]);
        let current = Table::from_literals(&["Dictionary English", "Note"], &[&["Car ", "b"]]);
        let log = diff_tables(&baseline, &current);
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].key, "Car");
        assert_eq!(log[0].column, "Note");
    }

    #[test]
    fn whitespace_only_differences_are_not_changes() {
        let baseline = Table::from_literals(&HEADERS, &[&["1", "Car", "차 ", ""]]);
        let current = Table::from_literals(&HEADERS, &[&["1", "Car", "\u{201c}차\u{201d}", ""]]);
        assert!(diff_tables(&baseline, &current).is_empty());
    }

    #[test]
    fn missing_key_columns_yield_empty_log() {
        let baseline = Table::from_literals(&["Other"], &[&["x"]]);
        let current = Table::from_literals(&HEADERS, &[&["1", "Car", "차", ""]]);
        assert!(diff_tables(&baseline, &current).is_empty());
    }
}
