//! Language maps and the multi-variant key index used to join JSON values to rows.

use std::collections::HashMap;

use indexmap::IndexMap;

use crate::text::{canonical_key, normalize_text};

/// 單一語系 JSON 的鍵值對（載入時即正規化）。 / Key → value pairs of one language file.
///
/// Keys and values are normalised on insert. Iteration follows insertion order; a
/// repeated key keeps its first position and takes the newer value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LanguageMap {
    entries: IndexMap<String, String>,
}

impl LanguageMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: &str, value: &str) {
        self.entries.insert(normalize_text(key), normalize_text(value));
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: AsRef<str>, V: AsRef<str>> FromIterator<(K, V)> for LanguageMap {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut map = LanguageMap::new();
        for (key, value) in iter {
            map.insert(key.as_ref(), value.as_ref());
        }
        map
    }
}

/// Every lookup variant of a key, in lookup order: raw, normalised, trimmed, lowered,
/// canonical. Empty variants are skipped.
fn key_variants(key: &str) -> Vec<String> {
    let raw = key.to_string();
    let normalized = normalize_text(key);
    let variants = [
        raw.clone(),
        normalized.clone(),
        raw.trim().to_string(),
        normalized.trim().to_string(),
        raw.to_lowercase(),
        normalized.to_lowercase(),
        canonical_key(&raw),
        canonical_key(&normalized),
    ];
    variants
        .into_iter()
        .filter(|variant| !variant.is_empty())
        .collect()
}

/// 多變體查詢索引（原始、正規化、修剪、小寫、正規鍵）。 / Read-only multi-variant view over a [`LanguageMap`].
///
/// Built once per language map. On collisions the entry inserted first keeps the
/// variant.
#[derive(Debug, Clone, Default)]
pub struct LookupIndex {
    variants: HashMap<String, String>,
}

impl LookupIndex {
    pub fn build(map: &LanguageMap) -> Self {
        let mut variants = HashMap::new();
        for (key, value) in map.iter() {
            let value = normalize_text(value);
            for variant in key_variants(key) {
                variants.entry(variant).or_insert_with(|| value.clone());
            }
        }
        Self { variants }
    }

    pub fn len(&self) -> usize {
        self.variants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }

    /// 依序嘗試每個變體：先查原始表，再查索引。 / Resolves `key` against the map, then the index, variant by variant.
    ///
    /// Returns the empty string when nothing matches.
    pub fn lookup(&self, map: &LanguageMap, key: &str) -> String {
        for variant in key_variants(key) {
            if let Some(value) = map.get(&variant) {
                return normalize_text(value);
            }
            if let Some(value) = self.variants.get(&variant) {
                return value.clone();
            }
        }
        String::new()
    }
}

/// 語系表與其索引的組合。 / A language map paired with its lookup index.
#[derive(Debug, Clone, Default)]
pub struct IndexedLanguage<'a> {
    map: Option<&'a LanguageMap>,
    index: LookupIndex,
}

impl<'a> IndexedLanguage<'a> {
    pub fn new(map: &'a LanguageMap) -> Self {
        Self {
            map: Some(map),
            index: LookupIndex::build(map),
        }
    }

    pub fn lookup(&self, key: &str) -> String {
        match self.map {
            Some(map) => self.index.lookup(map, key),
            None => String::new(),
        }
    }
}
