use thiserror::Error;

use crate::compare::{CompareColumn, CompareRecord, Language};
use crate::matching::{MatchEvaluator, MatchState};
use crate::text::{first_candidate, normalize_text};

/// Status written into the edit-status column of changed rows.
pub const EDITED_STATUS: &str = "edited";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EditError {
    #[error("column '{column}' is derived and cannot be edited")]
    ReadOnlyColumn { column: CompareColumn },
}

/// 套用單一欄位修改並重新計算比對結果。 / Applies one cell edit and recomputes the row.
///
/// All text columns are normalised, the row is marked edited with `edited_at`, and every
/// language that matched before the edit has its JSON value aligned with the first
/// dictionary candidate (English uses the whole dictionary value). The four match
/// columns are then recomputed from scratch.
pub fn apply_edit(
    record: &mut CompareRecord,
    column: CompareColumn,
    value: &str,
    edited_at: &str,
) -> Result<(), EditError> {
    let previous: Vec<(Language, MatchState)> = Language::ALL
        .into_iter()
        .map(|language| (language, record.match_state(language)))
        .collect();

    let slot = record
        .text_mut(column)
        .ok_or(EditError::ReadOnlyColumn { column })?;
    *slot = value.to_string();

    for column in CompareColumn::ALL {
        if let Some(text) = record.text_mut(column) {
            *text = normalize_text(text);
        }
    }
    record.edit_status = EDITED_STATUS.to_string();
    record.edited_at = edited_at.to_string();

    for (language, state) in previous {
        if state != MatchState::Yes {
            continue;
        }
        let target = match language {
            Language::English => normalize_text(record.dictionary_value(language)),
            _ => first_candidate(record.dictionary_value(language)),
        };
        if record.json_value(language) != target {
            log::debug!(
                "aligning {} of '{}' with the dictionary",
                language.file_label(),
                record.key
            );
            *record.json_value_mut(language) = target;
        }
    }

    record.recompute_matches(&mut MatchEvaluator::with_capacity(8));
    Ok(())
}
