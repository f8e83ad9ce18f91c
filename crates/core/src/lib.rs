pub mod columns;
pub mod compare;
pub mod diff;
pub mod dictionary;
pub mod edit;
pub mod lookup;
pub mod matching;
mod similarity;
pub mod summary;
pub mod table;
pub mod text;

pub use columns::{
    guess_column, ColumnMapping, ColumnOverrides, ColumnResolutionError, ColumnRole,
    GuessedColumns, FUZZY_HEADER_THRESHOLD,
};
pub use compare::{
    build_compare_table, reconcile_sources, records_to_table, sort_by_module, CompareColumn,
    CompareRecord, CompareReport, Language, LanguageMaps, LanguageReport, Origin,
};
pub use diff::{diff_tables, ChangeKind, DiffRecord};
pub use dictionary::{unique_join, Dictionary, DictionaryGroup};
pub use edit::{apply_edit, EditError, EDITED_STATUS};
pub use lookup::{IndexedLanguage, LanguageMap, LookupIndex};
pub use matching::{evaluate_match, overall_match, MatchEvaluator, MatchState, ParseMatchStateError};
pub use similarity::similarity_ratio;
pub use summary::{sort_by_sequence, MismatchCounts, RecordFilter};
pub use table::{Table, TableRow};
pub use text::{canonical_key, normalize_header_name, normalize_text};
