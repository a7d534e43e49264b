use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Review questions as configured: either one newline-delimited block of text
/// or an explicit list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum QuestionSource {
    Text(String),
    List(Vec<String>),
}

impl Default for QuestionSource {
    fn default() -> Self {
        QuestionSource::List(Vec::new())
    }
}

impl QuestionSource {
    /// True when normalizing would produce no questions at all
    pub fn is_blank(&self) -> bool {
        match self {
            QuestionSource::Text(text) => text.trim().is_empty(),
            QuestionSource::List(items) => items.iter().all(|q| q.trim().is_empty()),
        }
    }
}

impl From<&str> for QuestionSource {
    fn from(text: &str) -> Self {
        QuestionSource::Text(text.to_string())
    }
}

impl From<String> for QuestionSource {
    fn from(text: String) -> Self {
        QuestionSource::Text(text)
    }
}

impl From<Vec<String>> for QuestionSource {
    fn from(items: Vec<String>) -> Self {
        QuestionSource::List(items)
    }
}

impl From<Vec<&str>> for QuestionSource {
    fn from(items: Vec<&str>) -> Self {
        QuestionSource::List(items.into_iter().map(str::to_string).collect())
    }
}

/// Turn configured questions into an ordered list of non-empty, trimmed lines.
///
/// Duplicates are kept.
pub fn normalize_questions(source: &QuestionSource) -> Vec<String> {
    let trimmed = |q: &str| {
        let q = q.trim();
        (!q.is_empty()).then(|| q.to_string())
    };

    match source {
        // `lines` splits on both `\n` and `\r\n`
        QuestionSource::Text(text) => text.lines().filter_map(trimmed).collect(),
        QuestionSource::List(items) => items.iter().filter_map(|q| trimmed(q)).collect(),
    }
}
