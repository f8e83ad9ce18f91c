//! Per-language match evaluation and the overall aggregate.

use std::fmt;
use std::num::NonZeroUsize;
use std::str::FromStr;

use lru::LruCache;
use serde::{Deserialize, Serialize};

use crate::text::{normalize_text, split_candidates};

/// Upper bound on memoised candidate lists held by [`MatchEvaluator`].
pub const CANDIDATE_CACHE_CAPACITY: usize = 50_000;

/// 比對結果：Y、N 或缺少檔案。 / Match verdict for one language or the whole row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MatchState {
    #[serde(rename = "Y")]
    Yes,
    #[serde(rename = "N")]
    No,
    #[default]
    #[serde(rename = "no-file")]
    NoFile,
}

impl MatchState {
    pub fn as_str(self) -> &'static str {
        match self {
            MatchState::Yes => "Y",
            MatchState::No => "N",
            MatchState::NoFile => "no-file",
        }
    }
}

impl fmt::Display for MatchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseMatchStateError(String);

impl fmt::Display for ParseMatchStateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown match state '{}' (expected Y, N or no-file)", self.0)
    }
}

impl std::error::Error for ParseMatchStateError {}

impl FromStr for MatchState {
    type Err = ParseMatchStateError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "Y" | "y" => Ok(MatchState::Yes),
            "N" | "n" => Ok(MatchState::No),
            "no-file" | "파일없음" => Ok(MatchState::NoFile),
            other => Err(ParseMatchStateError(other.to_string())),
        }
    }
}

fn evaluate_with(
    dictionary_value: &str,
    json_value: &str,
    matches_candidate: impl FnOnce(&str) -> bool,
) -> MatchState {
    let right = normalize_text(json_value);
    if right.is_empty() {
        return MatchState::NoFile;
    }
    if normalize_text(dictionary_value).is_empty() {
        return MatchState::No;
    }
    if matches_candidate(&right) {
        MatchState::Yes
    } else {
        MatchState::No
    }
}

/// 單一語系比對。 / Compares the dictionary side of one language against its JSON value.
///
/// The dictionary side may hold several comma-joined candidates; the JSON value must
/// equal one of them exactly after normalisation.
pub fn evaluate_match(dictionary_value: &str, json_value: &str) -> MatchState {
    evaluate_with(dictionary_value, json_value, |right| {
        split_candidates(dictionary_value)
            .iter()
            .any(|candidate| candidate == right)
    })
}

/// Missing files dominate, then every language has to match.
pub fn overall_match(ko: MatchState, en: MatchState, ru: MatchState) -> MatchState {
    let states = [ko, en, ru];
    if states.contains(&MatchState::NoFile) {
        MatchState::NoFile
    } else if states.iter().all(|state| *state == MatchState::Yes) {
        MatchState::Yes
    } else {
        MatchState::No
    }
}

/// Evaluator that memoises the candidate split of dictionary values.
pub struct MatchEvaluator {
    candidates: LruCache<String, Vec<String>>,
}

impl MatchEvaluator {
    pub fn new() -> Self {
        Self::with_capacity(CANDIDATE_CACHE_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            candidates: LruCache::new(capacity),
        }
    }

    pub fn evaluate(&mut self, dictionary_value: &str, json_value: &str) -> MatchState {
        let cache = &mut self.candidates;
        evaluate_with(dictionary_value, json_value, |right| {
            cache
                .get_or_insert(dictionary_value.to_string(), || {
                    split_candidates(dictionary_value)
                })
                .iter()
                .any(|candidate| candidate == right)
        })
    }

    pub fn cached_len(&self) -> usize {
        self.candidates.len()
    }
}

impl Default for MatchEvaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MatchEvaluator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MatchEvaluator")
            .field("cached", &self.candidates.len())
            .field("capacity", &self.candidates.cap())
            .finish()
    }
}
