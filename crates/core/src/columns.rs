use std::collections::HashMap;
use std::fmt;

use thiserror::Error;

use crate::similarity::similarity_ratio;
use crate::text::normalize_header_name;

/// Minimum similarity ratio accepted by the fuzzy pass.
pub const FUZZY_HEADER_THRESHOLD: f64 = 0.78;

pub const MODULE_ALIASES: &[&str] = &[
    "Main Module",
    "MainModule",
    "main module",
    "Module",
    "모듈",
    "Main",
];
pub const ENGLISH_ALIASES: &[&str] = &["English", "Enlish", "Englsh", "EN", "en", "영어", "영문"];
pub const KOREAN_ALIASES: &[&str] = &["Korean", "KO", "ko", "한국어", "국문", "KOR"];
pub const RUSSIAN_ALIASES: &[&str] = &["Russian", "RU", "ru", "러시아어", "러문", "RUS"];

/// 字典表中需要對應的邏輯欄位。 / Logical dictionary columns the engine needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnRole {
    Module,
    English,
    Korean,
    Russian,
}

impl ColumnRole {
    pub const ALL: [ColumnRole; 4] = [
        ColumnRole::Module,
        ColumnRole::English,
        ColumnRole::Korean,
        ColumnRole::Russian,
    ];

    pub fn aliases(self) -> &'static [&'static str] {
        match self {
            ColumnRole::Module => MODULE_ALIASES,
            ColumnRole::English => ENGLISH_ALIASES,
            ColumnRole::Korean => KOREAN_ALIASES,
            ColumnRole::Russian => RUSSIAN_ALIASES,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ColumnRole::Module => "module",
            ColumnRole::English => "english",
            ColumnRole::Korean => "korean",
            ColumnRole::Russian => "russian",
        }
    }
}

impl fmt::Display for ColumnRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ColumnResolutionError {
    #[error("could not find a {role} column among the dictionary headers")]
    Unresolved { role: ColumnRole },
    #[error("column '{header}' selected for {role} is not in the dictionary")]
    MissingHeader { role: ColumnRole, header: String },
}

/// 依序嘗試：完全相符、忽略大小寫、標頭正規化、模糊比對。 / Resolves one logical column from the headers.
///
/// Passes run in order and the first hit wins: verbatim alias, case-insensitive trimmed
/// match, normalised header-name match, then the best fuzzy pair scoring at least
/// [`FUZZY_HEADER_THRESHOLD`]. When several headers collapse to the same lowered or
/// normalised form, the later header owns that form.
pub fn guess_column<'h, S: AsRef<str>>(headers: &'h [S], candidates: &[&str]) -> Option<&'h str> {
    let headers: Vec<&'h str> = headers.iter().map(|header| header.as_ref()).collect();

    for candidate in candidates {
        if let Some(header) = headers.iter().find(|header| **header == *candidate) {
            return Some(*header);
        }
    }

    let lowered: HashMap<String, &'h str> = headers
        .iter()
        .map(|header| (header.trim().to_lowercase(), *header))
        .collect();
    for candidate in candidates {
        if let Some(header) = lowered.get(&candidate.trim().to_lowercase()) {
            return Some(*header);
        }
    }

    let normalized: HashMap<String, &'h str> = headers
        .iter()
        .map(|header| (normalize_header_name(header), *header))
        .filter(|(name, _)| !name.is_empty())
        .collect();
    for candidate in candidates {
        if let Some(header) = normalized.get(&normalize_header_name(candidate)) {
            return Some(*header);
        }
    }

    let mut best: Option<(f64, &'h str)> = None;
    for candidate in candidates {
        let candidate = normalize_header_name(candidate);
        if candidate.is_empty() {
            continue;
        }
        for &header in &headers {
            let name = normalize_header_name(header);
            if name.is_empty() {
                continue;
            }
            let score = similarity_ratio(&candidate, &name);
            if best.map_or(true, |(top, _)| score > top) {
                best = Some((score, header));
            }
        }
    }
    best.filter(|(score, _)| *score >= FUZZY_HEADER_THRESHOLD)
        .map(|(_, header)| header)
}

/// Explicit per-role header choices that bypass guessing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnOverrides {
    pub module: Option<String>,
    pub english: Option<String>,
    pub korean: Option<String>,
    pub russian: Option<String>,
}

impl ColumnOverrides {
    fn get(&self, role: ColumnRole) -> Option<&str> {
        let value = match role {
            ColumnRole::Module => self.module.as_deref(),
            ColumnRole::English => self.english.as_deref(),
            ColumnRole::Korean => self.korean.as_deref(),
            ColumnRole::Russian => self.russian.as_deref(),
        };
        value.filter(|header| !header.is_empty())
    }
}

/// 猜測結果；每個角色可能為空。 / Guessed header per role; any role may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GuessedColumns {
    pub module: Option<String>,
    pub english: Option<String>,
    pub korean: Option<String>,
    pub russian: Option<String>,
}

impl GuessedColumns {
    pub fn get(&self, role: ColumnRole) -> Option<&str> {
        match role {
            ColumnRole::Module => self.module.as_deref(),
            ColumnRole::English => self.english.as_deref(),
            ColumnRole::Korean => self.korean.as_deref(),
            ColumnRole::Russian => self.russian.as_deref(),
        }
    }
}

/// Fully resolved headers for the four roles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMapping {
    pub module: String,
    pub english: String,
    pub korean: String,
    pub russian: String,
}

impl ColumnMapping {
    pub fn new(
        module: impl Into<String>,
        english: impl Into<String>,
        korean: impl Into<String>,
        russian: impl Into<String>,
    ) -> Self {
        Self {
            module: module.into(),
            english: english.into(),
            korean: korean.into(),
            russian: russian.into(),
        }
    }

    /// Runs the column guesser independently for each role.
    pub fn guess<S: AsRef<str>>(headers: &[S]) -> GuessedColumns {
        let guess = |role: ColumnRole| guess_column(headers, role.aliases()).map(str::to_string);
        GuessedColumns {
            module: guess(ColumnRole::Module),
            english: guess(ColumnRole::English),
            korean: guess(ColumnRole::Korean),
            russian: guess(ColumnRole::Russian),
        }
    }

    /// 先套用使用者指定欄位，再以猜測補齊。 / Applies overrides first, then guesses the rest.
    pub fn resolve<S: AsRef<str>>(
        headers: &[S],
        overrides: &ColumnOverrides,
    ) -> Result<Self, ColumnResolutionError> {
        let guessed = Self::guess(headers);
        let pick = |role: ColumnRole| -> Result<String, ColumnResolutionError> {
            match overrides.get(role) {
                Some(header) if headers.iter().any(|candidate| candidate.as_ref() == header) => {
                    Ok(header.to_string())
                }
                Some(header) => Err(ColumnResolutionError::MissingHeader {
                    role,
                    header: header.to_string(),
                }),
                None => guessed
                    .get(role)
                    .map(str::to_string)
                    .ok_or(ColumnResolutionError::Unresolved { role }),
            }
        };
        Ok(Self {
            module: pick(ColumnRole::Module)?,
            english: pick(ColumnRole::English)?,
            korean: pick(ColumnRole::Korean)?,
            russian: pick(ColumnRole::Russian)?,
        })
    }

    pub fn header(&self, role: ColumnRole) -> &str {
        match role {
            ColumnRole::Module => &self.module,
            ColumnRole::English => &self.english,
            ColumnRole::Korean => &self.korean,
            ColumnRole::Russian => &self.russian,
        }
    }
}
