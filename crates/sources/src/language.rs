use std::borrow::Cow;
use std::path::Path;

use glosscheck_core::LanguageMap;
use serde_json::Value;

use crate::error::SourceError;
use crate::reader::{decode_text, read_bytes};

fn value_text(value: &Value) -> Cow<'_, str> {
    match value {
        Value::String(text) => Cow::Borrowed(text.as_str()),
        Value::Null => Cow::Borrowed(""),
        other => Cow::Owned(other.to_string()),
    }
}

/// 解析語系 JSON 內容。 / Parses the text of one language file.
///
/// Non-object payloads produce an empty map. Strings are kept as-is, `null` becomes
/// blank and any other value is stored as its JSON text.
pub fn parse_language_map(path: &Path, text: &str) -> Result<LanguageMap, SourceError> {
    let payload: Value = serde_json::from_str(text).map_err(|source| SourceError::ParseJson {
        path: path.to_path_buf(),
        source,
    })?;
    let Value::Object(entries) = payload else {
        log::warn!(
            "{} does not hold a JSON object; treating it as empty",
            path.display()
        );
        return Ok(LanguageMap::new());
    };
    Ok(entries
        .iter()
        .map(|(key, value)| (key.as_str(), value_text(value)))
        .collect())
}

/// 讀取語系檔；路徑缺少或檔案不存在時回傳 `None`。 / Loads a language file, `None` when it is not available.
pub fn read_language_map(path: Option<&Path>) -> Result<Option<LanguageMap>, SourceError> {
    let Some(path) = path.filter(|path| path.exists()) else {
        return Ok(None);
    };
    let text = decode_text(path, &read_bytes(path)?)?;
    let map = parse_language_map(path, &text)?;
    log::debug!("loaded {} keys from {}", map.len(), path.display());
    Ok(Some(map))
}
