use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::error::AppError;

/// Characters deleted outright before tokenizing. `?` and `'` are kept on purpose so a
/// question still reads as a question when it is sent on to the chat flow.
static PUNCTUATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[.,/#!$%^&*;:{}=\-_`~()]").expect("valid regex"));

/// Closed list of English function words and pronouns. Question words (where, what,
/// when, who, how) are not on it: the backend rules key on them.
const STOPWORDS: &[&str] = &[
    "a", "an", "the", "is", "are", "was", "were", "am", "be", "been", "being", "do", "does",
    "did", "to", "of", "in", "on", "at", "for", "with", "by", "from", "about", "into", "and",
    "or", "but", "if", "so", "as", "than", "that", "this", "these", "those", "it", "its", "i",
    "me", "my", "mine", "myself", "we", "us", "our", "ours", "you", "your", "yours", "he",
    "him", "his", "she", "her", "hers", "they", "them", "their", "theirs", "can", "could",
    "will", "would", "shall", "should", "may", "might", "must", "please",
];

pub fn is_stopword(token: &str) -> bool {
    STOPWORDS.contains(&token)
}

/// Lowercase, delete punctuation, split on single spaces, drop empty tokens and
/// stopwords, rejoin with one space.
///
/// Idempotent: a second pass finds no punctuation, no stopwords and no empty tokens.
/// Input made only of stopwords and punctuation yields `""`.
pub fn normalize(text: &str) -> String {
    let lowered = text.to_lowercase();
    let stripped = PUNCTUATION.replace_all(&lowered, "");
    stripped
        .split(' ')
        .filter(|token| !token.is_empty() && !is_stopword(token))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Text of a raw JSON field that will be normalized. Absent and `null` read as empty;
/// anything other than a string is a data contract violation and fails fast instead of
/// being coerced.
pub fn field_text(value: Option<&Value>) -> Result<&str, AppError> {
    match value {
        None | Some(Value::Null) => Ok(""),
        Some(Value::String(s)) => Ok(s),
        Some(other) => Err(AppError::InvalidInput {
            found: json_kind(other),
        }),
    }
}

pub fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
