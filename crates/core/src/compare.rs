//! Compare-table builder: joins the grouped dictionary with the three language maps.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::columns::ColumnMapping;
use crate::dictionary::Dictionary;
use crate::lookup::{IndexedLanguage, LanguageMap};
use crate::matching::{overall_match, MatchEvaluator, MatchState};
use crate::table::Table;
use crate::text::normalize_text;

/// 翻譯語系。 / One of the three translated languages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    Korean,
    English,
    Russian,
}

impl Language {
    /// Evaluation order of the match columns.
    pub const ALL: [Language; 3] = [Language::Korean, Language::English, Language::Russian];

    pub fn code(self) -> &'static str {
        match self {
            Language::Korean => "ko",
            Language::English => "en",
            Language::Russian => "ru",
        }
    }

    /// File label used in statuses and export headers, e.g. `ko.json`.
    pub fn file_label(self) -> &'static str {
        match self {
            Language::Korean => "ko.json",
            Language::English => "en.json",
            Language::Russian => "ru.json",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// 資料來源標記。 / Whether a key came from the dictionary or only from JSON files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Origin {
    #[default]
    #[serde(rename = "both")]
    Both,
    #[serde(rename = "json-only")]
    JsonOnly,
}

impl Origin {
    pub fn as_str(self) -> &'static str {
        match self {
            Origin::Both => "both",
            Origin::JsonOnly => "json-only",
        }
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The sixteen output columns, in export order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareColumn {
    Seq,
    CompareKey,
    Origin,
    Module,
    DictionaryEnglish,
    DictionaryKorean,
    DictionaryRussian,
    EnJson,
    KoJson,
    RuJson,
    KoMatch,
    EnMatch,
    RuMatch,
    OverallMatch,
    EditStatus,
    EditedAt,
}

impl CompareColumn {
    pub const ALL: [CompareColumn; 16] = [
        CompareColumn::Seq,
        CompareColumn::CompareKey,
        CompareColumn::Origin,
        CompareColumn::Module,
        CompareColumn::DictionaryEnglish,
        CompareColumn::DictionaryKorean,
        CompareColumn::DictionaryRussian,
        CompareColumn::EnJson,
        CompareColumn::KoJson,
        CompareColumn::RuJson,
        CompareColumn::KoMatch,
        CompareColumn::EnMatch,
        CompareColumn::RuMatch,
        CompareColumn::OverallMatch,
        CompareColumn::EditStatus,
        CompareColumn::EditedAt,
    ];

    pub fn header(self) -> &'static str {
        match self {
            CompareColumn::Seq => "Seq",
            CompareColumn::CompareKey => "Compare Key",
            CompareColumn::Origin => "Source",
            CompareColumn::Module => "Main Module",
            CompareColumn::DictionaryEnglish => "Dictionary English",
            CompareColumn::DictionaryKorean => "Dictionary Korean",
            CompareColumn::DictionaryRussian => "Dictionary Russian",
            CompareColumn::EnJson => "en.json",
            CompareColumn::KoJson => "ko.json",
            CompareColumn::RuJson => "ru.json",
            CompareColumn::KoMatch => "KO_Match",
            CompareColumn::EnMatch => "EN_Match",
            CompareColumn::RuMatch => "RU_Match",
            CompareColumn::OverallMatch => "Overall_Match",
            CompareColumn::EditStatus => "Edit Status",
            CompareColumn::EditedAt => "Edited At",
        }
    }

    pub fn from_header(header: &str) -> Option<Self> {
        let header = header.trim();
        Self::ALL
            .into_iter()
            .find(|column| column.header().eq_ignore_ascii_case(header))
    }

    /// Text columns a user may change; everything else is derived or bookkeeping.
    pub fn is_editable(self) -> bool {
        matches!(
            self,
            CompareColumn::CompareKey
                | CompareColumn::Module
                | CompareColumn::DictionaryEnglish
                | CompareColumn::DictionaryKorean
                | CompareColumn::DictionaryRussian
                | CompareColumn::EnJson
                | CompareColumn::KoJson
                | CompareColumn::RuJson
        )
    }
}

impl fmt::Display for CompareColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.header())
    }
}

/// 比對結果的一列。 / One row of the comparison output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompareRecord {
    #[serde(rename = "Seq")]
    pub seq: u64,
    #[serde(rename = "Compare Key")]
    pub key: String,
    #[serde(rename = "Source")]
    pub origin: Origin,
    #[serde(rename = "Main Module")]
    pub module: String,
    #[serde(rename = "Dictionary English")]
    pub dictionary_english: String,
    #[serde(rename = "Dictionary Korean")]
    pub dictionary_korean: String,
    #[serde(rename = "Dictionary Russian")]
    pub dictionary_russian: String,
    #[serde(rename = "en.json")]
    pub en_json: String,
    #[serde(rename = "ko.json")]
    pub ko_json: String,
    #[serde(rename = "ru.json")]
    pub ru_json: String,
    #[serde(rename = "KO_Match")]
    pub ko_match: MatchState,
    #[serde(rename = "EN_Match")]
    pub en_match: MatchState,
    #[serde(rename = "RU_Match")]
    pub ru_match: MatchState,
    #[serde(rename = "Overall_Match")]
    pub overall_match: MatchState,
    #[serde(rename = "Edit Status", default)]
    pub edit_status: String,
    #[serde(rename = "Edited At", default)]
    pub edited_at: String,
}

impl CompareRecord {
    pub fn dictionary_value(&self, language: Language) -> &str {
        match language {
            Language::Korean => &self.dictionary_korean,
            Language::English => &self.dictionary_english,
            Language::Russian => &self.dictionary_russian,
        }
    }

    pub fn json_value(&self, language: Language) -> &str {
        match language {
            Language::Korean => &self.ko_json,
            Language::English => &self.en_json,
            Language::Russian => &self.ru_json,
        }
    }

    pub fn json_value_mut(&mut self, language: Language) -> &mut String {
        match language {
            Language::Korean => &mut self.ko_json,
            Language::English => &mut self.en_json,
            Language::Russian => &mut self.ru_json,
        }
    }

    pub fn match_state(&self, language: Language) -> MatchState {
        match language {
            Language::Korean => self.ko_match,
            Language::English => self.en_match,
            Language::Russian => self.ru_match,
        }
    }

    /// Cell text under `column`, as it appears in exports.
    pub fn cell(&self, column: CompareColumn) -> String {
        match column {
            CompareColumn::Seq => self.seq.to_string(),
            CompareColumn::CompareKey => self.key.clone(),
            CompareColumn::Origin => self.origin.to_string(),
            CompareColumn::Module => self.module.clone(),
            CompareColumn::DictionaryEnglish => self.dictionary_english.clone(),
            CompareColumn::DictionaryKorean => self.dictionary_korean.clone(),
            CompareColumn::DictionaryRussian => self.dictionary_russian.clone(),
            CompareColumn::EnJson => self.en_json.clone(),
            CompareColumn::KoJson => self.ko_json.clone(),
            CompareColumn::RuJson => self.ru_json.clone(),
            CompareColumn::KoMatch => self.ko_match.to_string(),
            CompareColumn::EnMatch => self.en_match.to_string(),
            CompareColumn::RuMatch => self.ru_match.to_string(),
            CompareColumn::OverallMatch => self.overall_match.to_string(),
            CompareColumn::EditStatus => self.edit_status.clone(),
            CompareColumn::EditedAt => self.edited_at.clone(),
        }
    }

    pub(crate) fn text_mut(&mut self, column: CompareColumn) -> Option<&mut String> {
        match column {
            CompareColumn::CompareKey => Some(&mut self.key),
            CompareColumn::Module => Some(&mut self.module),
            CompareColumn::DictionaryEnglish => Some(&mut self.dictionary_english),
            CompareColumn::DictionaryKorean => Some(&mut self.dictionary_korean),
            CompareColumn::DictionaryRussian => Some(&mut self.dictionary_russian),
            CompareColumn::EnJson => Some(&mut self.en_json),
            CompareColumn::KoJson => Some(&mut self.ko_json),
            CompareColumn::RuJson => Some(&mut self.ru_json),
            _ => None,
        }
    }

    /// 重新計算四個比對欄位（整列重算）。 / Recomputes all four match columns from the six source fields.
    pub fn recompute_matches(&mut self, evaluator: &mut MatchEvaluator) {
        self.ko_match = evaluator.evaluate(&self.dictionary_korean, &self.ko_json);
        self.en_match = evaluator.evaluate(&self.dictionary_english, &self.en_json);
        self.ru_match = evaluator.evaluate(&self.dictionary_russian, &self.ru_json);
        self.overall_match = overall_match(self.ko_match, self.en_match, self.ru_match);
    }
}

/// 三個語系 JSON；`None` 代表未載入。 / The three language maps; `None` means the file was not loaded.
#[derive(Debug, Clone, Copy, Default)]
pub struct LanguageMaps<'a> {
    pub ko: Option<&'a LanguageMap>,
    pub ru: Option<&'a LanguageMap>,
    pub en: Option<&'a LanguageMap>,
}

impl<'a> LanguageMaps<'a> {
    pub fn get(&self, language: Language) -> Option<&'a LanguageMap> {
        match language {
            Language::Korean => self.ko,
            Language::English => self.en,
            Language::Russian => self.ru,
        }
    }

    fn indexed(&self, language: Language) -> IndexedLanguage<'a> {
        self.get(language).map(IndexedLanguage::new).unwrap_or_default()
    }
}

fn collect_key_order(
    dictionary: &Dictionary,
    maps: &LanguageMaps<'_>,
    include_en_keys: bool,
) -> Vec<String> {
    let mut ordered: Vec<String> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    let mut append = |key: &str| {
        let key = normalize_text(key);
        if !key.is_empty() && seen.insert(key.clone()) {
            ordered.push(key);
        }
    };

    dictionary.phrases().for_each(&mut append);
    for map in [maps.ko, maps.ru].into_iter().flatten() {
        map.keys().for_each(&mut append);
    }
    if include_en_keys {
        if let Some(map) = maps.en {
            map.keys().for_each(&mut append);
        }
    }
    ordered
}

/// Blank-module rows last, then module text, then sequence number.
pub fn sort_by_module(records: &mut [CompareRecord]) {
    records.sort_by(|left, right| {
        (left.module.is_empty(), &left.module, left.seq).cmp(&(
            right.module.is_empty(),
            &right.module,
            right.seq,
        ))
    });
}

/// 建立比對表。 / Builds the comparison records and the first-seen key order.
///
/// Keys come from the dictionary's English phrases, then new keys of the Korean and
/// Russian maps, then (with `include_en_keys`) the English map. Each key gets its
/// 1-based sequence number from that order before the rows are sorted by module.
/// An empty dictionary yields no records.
pub fn build_compare_table(
    dictionary: &Table,
    columns: &ColumnMapping,
    maps: &LanguageMaps<'_>,
    include_en_keys: bool,
) -> (Vec<CompareRecord>, Vec<String>) {
    let dictionary = Dictionary::group(dictionary, columns);
    build_from_groups(&dictionary, maps, include_en_keys)
}

fn build_from_groups(
    dictionary: &Dictionary,
    maps: &LanguageMaps<'_>,
    include_en_keys: bool,
) -> (Vec<CompareRecord>, Vec<String>) {
    if dictionary.is_empty() {
        log::debug!("dictionary has no usable rows; nothing to compare");
        return (Vec::new(), Vec::new());
    }

    let ordered_keys = collect_key_order(dictionary, maps, include_en_keys);
    let ko = maps.indexed(Language::Korean);
    let en = maps.indexed(Language::English);
    let ru = maps.indexed(Language::Russian);
    let mut evaluator = MatchEvaluator::new();

    let mut records: Vec<CompareRecord> = ordered_keys
        .iter()
        .enumerate()
        .map(|(position, key)| {
            let group = dictionary.get(key);
            let mut record = CompareRecord {
                seq: position as u64 + 1,
                key: key.clone(),
                origin: if group.is_some() {
                    Origin::Both
                } else {
                    Origin::JsonOnly
                },
                module: group.map(|g| g.module.clone()).unwrap_or_default(),
                dictionary_english: group.map(|g| g.english.clone()).unwrap_or_default(),
                dictionary_korean: group.map(|g| g.korean.clone()).unwrap_or_default(),
                dictionary_russian: group.map(|g| g.russian.clone()).unwrap_or_default(),
                en_json: en.lookup(key),
                ko_json: ko.lookup(key),
                ru_json: ru.lookup(key),
                ..CompareRecord::default()
            };
            record.recompute_matches(&mut evaluator);
            record
        })
        .collect();

    sort_by_module(&mut records);
    log::debug!(
        "built {} compare rows from {} dictionary phrases",
        records.len(),
        dictionary.len()
    );
    (records, ordered_keys)
}

/// Per-language outcome of a reconciled run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LanguageReport {
    pub loaded: bool,
    pub has_data: bool,
    pub keys: usize,
    pub mapped_rows: usize,
}

/// 比對摘要。 / Summary of one reconciled comparison run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompareReport {
    pub rows: usize,
    pub dictionary_phrases: usize,
    pub ko: LanguageReport,
    pub ru: LanguageReport,
    pub en: LanguageReport,
}

impl CompareReport {
    pub fn language(&self, language: Language) -> &LanguageReport {
        match language {
            Language::Korean => &self.ko,
            Language::English => &self.en,
            Language::Russian => &self.ru,
        }
    }

    fn language_mut(&mut self, language: Language) -> &mut LanguageReport {
        match language {
            Language::Korean => &mut self.ko,
            Language::English => &mut self.en,
            Language::Russian => &mut self.ru,
        }
    }
}

impl fmt::Display for CompareReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.dictionary_phrases == 0 {
            return f.write_str("compare skipped: the dictionary has no usable rows");
        }
        write!(f, "compare finished: {} rows", self.rows)?;
        let mut separator = " | ";
        for language in [Language::Korean, Language::Russian, Language::English] {
            let report = self.language(language);
            let state = match (report.loaded, report.has_data) {
                (false, _) => "missing",
                (true, true) => "loaded",
                (true, false) => "loaded (no data)",
            };
            write!(f, "{separator}{}={state}", language.file_label())?;
            separator = ", ";
        }
        Ok(())
    }
}

/// 比對並依檔案載入情形清空欄位。 / Builds the table, then blanks JSON columns without usable data.
///
/// A language whose file was not loaded, or whose column is blank on every row, has
/// its JSON column cleared; all match columns are then recomputed.
pub fn reconcile_sources(
    dictionary: &Table,
    columns: &ColumnMapping,
    maps: &LanguageMaps<'_>,
    include_en_keys: bool,
) -> (Vec<CompareRecord>, CompareReport) {
    let dictionary = Dictionary::group(dictionary, columns);
    let (mut records, _) = build_from_groups(&dictionary, maps, include_en_keys);
    let mut report = CompareReport {
        rows: records.len(),
        dictionary_phrases: dictionary.len(),
        ..CompareReport::default()
    };

    for language in Language::ALL {
        let map = maps.get(language);
        let loaded = map.is_some();
        if !loaded {
            for record in &mut records {
                record.json_value_mut(language).clear();
            }
        }
        let has_data = records
            .iter()
            .any(|record| !record.json_value(language).is_empty());
        if !has_data {
            for record in &mut records {
                record.json_value_mut(language).clear();
            }
            if loaded {
                log::warn!("{} is loaded but maps to no rows", language.file_label());
            }
        }

        *report.language_mut(language) = LanguageReport {
            loaded,
            has_data,
            keys: map.map(LanguageMap::len).unwrap_or(0),
            mapped_rows: records
                .iter()
                .filter(|record| !record.json_value(language).is_empty())
                .count(),
        };
    }

    let mut evaluator = MatchEvaluator::new();
    for record in &mut records {
        record.recompute_matches(&mut evaluator);
    }
    (records, report)
}

/// 將紀錄轉為通用表格（供差異比對）。 / Renders records as a [`Table`] under the export headers.
pub fn records_to_table(records: &[CompareRecord]) -> Table {
    let headers = CompareColumn::ALL
        .iter()
        .map(|column| column.header().to_string())
        .collect();
    let rows = records
        .iter()
        .map(|record| {
            CompareColumn::ALL
                .iter()
                .map(|column| record.cell(*column))
                .collect()
        })
        .collect();
    Table::with_rows(headers, rows)
}
