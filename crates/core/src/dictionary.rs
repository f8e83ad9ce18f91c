use indexmap::IndexMap;

use crate::columns::ColumnMapping;
use crate::table::Table;
use crate::text::normalize_text;

/// Joins values after normalising them, dropping blanks and repeats (first seen order).
pub fn unique_join<I, S>(values: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen: Vec<String> = Vec::new();
    for value in values {
        let value = normalize_text(value.as_ref());
        if !value.is_empty() && !seen.contains(&value) {
            seen.push(value);
        }
    }
    seen.join(", ")
}

/// 依英文分組後的字典資料。 / Dictionary rows collapsed under one English phrase.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DictionaryGroup {
    pub english: String,
    pub module: String,
    pub korean: String,
    pub russian: String,
}

/// Groups keyed by normalised English, in first-seen order.
#[derive(Debug, Clone, Default)]
pub struct Dictionary {
    groups: IndexMap<String, DictionaryGroup>,
}

#[derive(Default)]
struct GroupBuilder {
    modules: Vec<String>,
    korean: Vec<String>,
    russian: Vec<String>,
}

impl Dictionary {
    /// 將字典列以正規化英文分組；英文為空的列會被略過。 / Groups rows by normalised English.
    pub fn group(table: &Table, columns: &ColumnMapping) -> Self {
        let mut builders: IndexMap<String, GroupBuilder> = IndexMap::new();
        let mut dropped = 0usize;
        for row in table.rows() {
            let english = normalize_text(row.get(&columns.english));
            if english.is_empty() {
                dropped += 1;
                continue;
            }
            let builder = builders.entry(english).or_default();
            builder.modules.push(normalize_text(row.get(&columns.module)));
            builder.korean.push(normalize_text(row.get(&columns.korean)));
            builder.russian.push(normalize_text(row.get(&columns.russian)));
        }
        if dropped > 0 {
            log::debug!("dropped {dropped} dictionary rows without English text");
        }

        let groups = builders
            .into_iter()
            .map(|(english, builder)| {
                let group = DictionaryGroup {
                    english: english.clone(),
                    module: unique_join(&builder.modules),
                    korean: unique_join(&builder.korean),
                    russian: unique_join(&builder.russian),
                };
                (english, group)
            })
            .collect();
        Self { groups }
    }

    pub fn get(&self, english: &str) -> Option<&DictionaryGroup> {
        self.groups.get(english)
    }

    pub fn contains(&self, english: &str) -> bool {
        self.groups.contains_key(english)
    }

    pub fn phrases(&self) -> impl Iterator<Item = &str> {
        self.groups.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}
