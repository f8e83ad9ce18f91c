//! Text canonicalisation shared by every comparison in the engine.
//!
//! 所有比較都以正規化後的文字進行，從不直接比較原始輸入。 / Every comparison runs on
//! normalised text, never on raw input.

use unicode_normalization::UnicodeNormalization;

/// 將任意輸入轉為穩定可比較的字串。 / Canonicalises a value into a stable comparable string.
///
/// Steps run in a fixed order: strip BOM and zero-width spaces, unify line endings to
/// `\n`, turn non-breaking spaces into spaces, straighten curly quotes, trim, collapse
/// runs of spaces/tabs, then strip one enclosing pair of matching quotes and trim again.
pub fn normalize_text(value: &str) -> String {
    let mut text: String = value
        .chars()
        .filter(|ch| *ch != '\u{feff}' && *ch != '\u{200b}')
        .collect();
    text = text.replace("\r\n", "\n").replace('\r', "\n");
    text = text
        .chars()
        .map(|ch| match ch {
            '\u{00a0}' => ' ',
            '\u{201c}' | '\u{201d}' => '"',
            '\u{2018}' | '\u{2019}' => '\'',
            other => other,
        })
        .collect();

    let collapsed = collapse_horizontal_whitespace(text.trim());
    strip_enclosing_quotes(&collapsed)
}

/// Normalises an optional cell; a missing value is the empty string.
pub fn normalize_opt(value: Option<&str>) -> String {
    value.map(normalize_text).unwrap_or_default()
}

/// 產生寬鬆比對用的鍵（不顯示給使用者）。 / Derives the loose lookup key used for fuzzy key matching.
pub fn canonical_key(value: &str) -> String {
    let mut current: String = normalize_text(value).nfkc().collect();
    // NFKC can surface ASCII quotes and spaces; normalise until nothing changes.
    loop {
        let next = normalize_text(&current);
        if next == current {
            break;
        }
        current = next;
    }
    let single_line = current.replace('\n', " ");
    collapse_all_whitespace(&single_line).to_lowercase()
}

/// 標頭名稱正規化：小寫並移除英數與韓文以外的字元。 / Header-name normalisation for column guessing.
///
/// Keeps ASCII letters, digits and precomposed Hangul syllables; everything else
/// (spaces, punctuation, other scripts) is dropped.
pub fn normalize_header_name(name: &str) -> String {
    name.trim()
        .to_lowercase()
        .chars()
        .filter(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit() || is_hangul_syllable(*ch))
        .collect()
}

/// Splits a comma-joined cell into its normalised, non-empty candidates.
pub fn split_candidates(joined: &str) -> Vec<String> {
    joined
        .split(',')
        .map(normalize_text)
        .filter(|candidate| !candidate.is_empty())
        .collect()
}

/// Returns the first candidate of a comma-joined cell, or the empty string.
pub fn first_candidate(joined: &str) -> String {
    split_candidates(joined).into_iter().next().unwrap_or_default()
}

fn is_hangul_syllable(ch: char) -> bool {
    ('\u{ac00}'..='\u{d7a3}').contains(&ch)
}

fn collapse_horizontal_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_run = false;
    for ch in text.chars() {
        if ch == ' ' || ch == '\t' {
            if !in_run {
                out.push(' ');
                in_run = true;
            }
        } else {
            out.push(ch);
            in_run = false;
        }
    }
    out
}

fn collapse_all_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn strip_enclosing_quotes(text: &str) -> String {
    let mut chars = text.chars();
    let (Some(first), Some(last)) = (chars.next(), chars.next_back()) else {
        return text.to_string();
    };
    if first == last && (first == '"' || first == '\'') {
        let inner = &text[first.len_utf8()..text.len() - last.len_utf8()];
        return inner.trim().to_string();
    }
    text.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_invisible_characters_and_unifies_line_breaks() {
        assert_eq!(normalize_text("\u{feff}Car\u{200b}"), "Car");
        assert_eq!(normalize_text("a\r\nb\rc"), "a\nb\nc");
        assert_eq!(normalize_text("a\u{00a0}b"), "a b");
    }

    #[test]
    fn collapses_horizontal_whitespace_but_keeps_newlines() {
        assert_eq!(normalize_text("  Main \t  Module  "), "Main Module");
        assert_eq!(normalize_text("line one\n  line two"), "line one\n line two");
    }

    #[test]
    fn straightens_curly_quotes() {
        assert_eq!(normalize_text("it\u{2019}s \u{201c}ok\u{201d}"), "it's \"ok\"");
    }

    #[test]
    fn strips_exactly_one_layer_of_enclosing_quotes() {
        assert_eq!(normalize_text("\"abc\""), "abc");
        assert_eq!(normalize_text("\"\"abc\"\""), "\"abc\"");
        assert_eq!(normalize_text("' padded '"), "padded");
        assert_eq!(normalize_text("\"abc'"), "\"abc'");
        assert_eq!(normalize_text("\""), "\"");
    }

    #[test]
    fn curly_quote_pair_is_stripped_after_straightening() {
        assert_eq!(normalize_text("\u{201c}Train\u{201d}"), "Train");
    }

    #[test]
    fn normalization_is_idempotent() {
        let samples = [
            "",
            "  Car  ",
            "\u{feff}Train\r\nCar",
            "a \t b",
            "\u{201c}quoted\u{201d}",
            "시트, Train",
            "машина",
            "Tab\tinside",
        ];
        for sample in samples {
            let once = normalize_text(sample);
            assert_eq!(normalize_text(&once), once, "input {sample:?}");
        }
    }

    #[test]
    fn missing_value_is_empty() {
        assert_eq!(normalize_opt(None), "");
        assert_eq!(normalize_opt(Some(" x ")), "x");
    }

    #[test]
    fn canonical_key_folds_width_case_and_whitespace() {
        assert_eq!(canonical_key("Ｃａｒ"), "car");
        assert_eq!(canonical_key("Main\n  Module "), "main module");
        assert_eq!(canonical_key("Car "), canonical_key("car"));
        assert_eq!(canonical_key("\u{ff02}Car\u{ff02}"), "car");
    }

    #[test]
    fn canonical_key_is_idempotent() {
        for sample in [
            "Ｃａｒ  Park",
            "Main\nModule",
            "  Ünïcode ",
            "ﬁle",
            "\u{ff02}a\u{ff02}",
            "'\"'a'\"'",
            "\u{ff07}Car\u{3000}\u{ff07}",
        ] {
            let once = canonical_key(sample);
            assert_eq!(canonical_key(&once), once, "input {sample:?}");
        }
    }

    #[test]
    fn header_names_keep_ascii_alnum_and_hangul() {
        assert_eq!(normalize_header_name(" Main Module-w "), "mainmodulew");
        assert_eq!(normalize_header_name("한국어 (KO)"), "한국어ko");
        assert_eq!(normalize_header_name("Русский"), "");
    }

    #[test]
    fn candidates_are_split_normalised_and_filtered() {
        assert_eq!(split_candidates("시트, Train,, "), vec!["시트", "Train"]);
        assert_eq!(first_candidate(" , 차, 자동차"), "차");
        assert_eq!(first_candidate(""), "");
    }
}
