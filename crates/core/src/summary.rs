//! Mismatch counters, quick filters and sequence ordering over compare records.

use std::fmt;

use crate::compare::{CompareColumn, CompareRecord};
use crate::matching::MatchState;

/// 各語系不一致 (N) 筆數。 / Number of `N` verdicts per match column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MismatchCounts {
    pub ko: usize,
    pub en: usize,
    pub ru: usize,
    pub overall: usize,
}

impl MismatchCounts {
    pub fn from_records<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a CompareRecord>,
    {
        let mut counts = Self::default();
        for record in records {
            counts.ko += usize::from(record.ko_match == MatchState::No);
            counts.en += usize::from(record.en_match == MatchState::No);
            counts.ru += usize::from(record.ru_match == MatchState::No);
            counts.overall += usize::from(record.overall_match == MatchState::No);
        }
        counts
    }
}

impl fmt::Display for MismatchCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "KO mismatches: {} | EN mismatches: {} | RU mismatches: {} | overall mismatches: {}",
            self.ko, self.en, self.ru, self.overall
        )
    }
}

/// Quick filter over match states plus a free-text query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordFilter {
    pub ko: Option<MatchState>,
    pub en: Option<MatchState>,
    pub ru: Option<MatchState>,
    pub overall: Option<MatchState>,
    pub query: Option<String>,
}

impl RecordFilter {
    pub fn is_empty(&self) -> bool {
        self.ko.is_none()
            && self.en.is_none()
            && self.ru.is_none()
            && self.overall.is_none()
            && self.query.as_deref().map_or(true, |query| query.trim().is_empty())
    }

    /// 所有設定的條件都需成立。 / True when the record satisfies every set condition.
    pub fn matches(&self, record: &CompareRecord) -> bool {
        let states = [
            (self.ko, record.ko_match),
            (self.en, record.en_match),
            (self.ru, record.ru_match),
            (self.overall, record.overall_match),
        ];
        if states
            .iter()
            .any(|(wanted, actual)| wanted.map_or(false, |wanted| wanted != *actual))
        {
            return false;
        }

        match self.query.as_deref().map(str::trim) {
            Some(query) if !query.is_empty() => {
                let query = query.to_lowercase();
                CompareColumn::ALL
                    .iter()
                    .any(|column| record.cell(*column).to_lowercase().contains(&query))
            }
            _ => true,
        }
    }

    pub fn apply<'a>(&self, records: &'a [CompareRecord]) -> Vec<&'a CompareRecord> {
        records.iter().filter(|record| self.matches(record)).collect()
    }
}

/// Stable re-sort by sequence number.
pub fn sort_by_sequence(records: &mut [CompareRecord], ascending: bool) {
    if ascending {
        records.sort_by_key(|record| record.seq);
    } else {
        records.sort_by(|left, right| right.seq.cmp(&left.seq));
    }
}
