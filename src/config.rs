//! Run configuration, as persisted by the options store.
//!
//! Field names are camelCase so the same JSON document can be shared with the
//! settings page. Template fields that are blank after trimming fall back to the
//! built-in defaults when the configuration is resolved, once per run.

use crate::error::{BrowserError, Result};
use crate::review::{DEFAULT_REVIEW_HEADING, QuestionSource, Separators};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_SUMMARY_TEMPLATE: &str = "# Codex Buddy Review Summary\n\nCollected {{totalVersions}} PR versions with {{totalFiles}} total file changes";

pub const DEFAULT_REVIEW_QUESTIONS: [&str; 3] = [
    "Which of these PRs solves the task at hand the best and why?",
    "What additional inputs or BLOCKERS do you foresee?",
    "Are there any potential issues or improvements to consider?",
];

/// Label of the single record captured in current-version-only mode
pub const CURRENT_VERSION_LABEL: &str = "Current Version";

/// User options for one collection run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct RunConfiguration {
    /// Capture only the version currently on screen
    pub current_version_only: bool,

    /// Append the numbered review-questions block
    pub include_review_questions: bool,

    /// Single-newline separators and unlabeled summaries
    pub compact_mode: bool,

    /// Read the Testing section of each version
    pub include_testing: bool,

    /// Document header; supports `{{totalVersions}}` and `{{totalFiles}}`
    pub summary_template: String,

    /// Heading of the review block
    pub review_heading: String,

    /// Review questions, newline-delimited text or a list
    pub review_questions: QuestionSource,
}

impl Default for RunConfiguration {
    fn default() -> Self {
        Self {
            current_version_only: false,
            include_review_questions: true,
            compact_mode: false,
            include_testing: true,
            summary_template: DEFAULT_SUMMARY_TEMPLATE.to_string(),
            review_heading: DEFAULT_REVIEW_HEADING.to_string(),
            review_questions: QuestionSource::Text(DEFAULT_REVIEW_QUESTIONS.join("\n")),
        }
    }
}

impl RunConfiguration {
    /// Load a configuration file. Missing keys take their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| BrowserError::ConfigInvalid(format!("Failed to read {}: {}", path.display(), e)))?;

        Self::from_json(&raw)
            .map_err(|e| BrowserError::ConfigInvalid(format!("{}: {}", path.display(), e)))
    }

    /// Parse a configuration from JSON text
    pub fn from_json(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).map_err(|e| BrowserError::ConfigInvalid(e.to_string()))
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| BrowserError::ConfigInvalid(e.to_string()))
    }

    /// Apply the blank-field fallbacks
    pub fn resolve(&self) -> ResolvedConfiguration {
        let defaults = Self::default();

        let summary_template = match self.summary_template.trim() {
            "" => defaults.summary_template,
            trimmed => trimmed.to_string(),
        };

        let review_heading = match self.review_heading.trim() {
            "" => defaults.review_heading,
            trimmed => trimmed.to_string(),
        };

        let review_questions = if self.review_questions.is_blank() {
            defaults.review_questions
        } else {
            self.review_questions.clone()
        };

        ResolvedConfiguration {
            current_version_only: self.current_version_only,
            include_review_questions: self.include_review_questions,
            compact_mode: self.compact_mode,
            include_testing: self.include_testing,
            summary_template,
            review_heading,
            review_questions,
        }
    }
}

/// A configuration whose template fields are guaranteed non-blank
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfiguration {
    pub current_version_only: bool,
    pub include_review_questions: bool,
    pub compact_mode: bool,
    pub include_testing: bool,
    pub summary_template: String,
    pub review_heading: String,
    pub review_questions: QuestionSource,
}

impl ResolvedConfiguration {
    pub fn separators(&self) -> Separators {
        Separators::for_mode(self.compact_mode)
    }
}

impl Default for ResolvedConfiguration {
    fn default() -> Self {
        RunConfiguration::default().resolve()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = RunConfiguration::default();

        assert!(!config.current_version_only);
        assert!(config.include_review_questions);
        assert!(!config.compact_mode);
        assert!(config.include_testing);
        assert!(config.summary_template.contains("{{totalVersions}}"));
        assert_eq!(config.review_heading, "Review Questions");
    }

    #[test]
    fn test_missing_keys_take_defaults() {
        let config = RunConfiguration::from_json(r#"{"compactMode": true}"#).unwrap();

        assert!(config.compact_mode);
        assert!(config.include_review_questions);
        assert_eq!(config.summary_template, DEFAULT_SUMMARY_TEMPLATE);
    }

    #[test]
    fn test_camel_case_keys_and_question_list() {
        let config = RunConfiguration::from_json(
            r#"{"currentVersionOnly": true, "includeReviewQuestions": false, "reviewQuestions": ["A", "B"]}"#,
        )
        .unwrap();

        assert!(config.current_version_only);
        assert!(!config.include_review_questions);
        assert_eq!(config.review_questions, QuestionSource::from(vec!["A", "B"]));
    }

    #[test]
    fn test_unknown_keys_are_ignored() {
        let config = RunConfiguration::from_json(r#"{"summariesOnlyTemplate": "x", "codexPreferredModel": "y"}"#).unwrap();
        assert_eq!(config, RunConfiguration::default());
    }

    #[test]
    fn test_invalid_json_is_config_error() {
        let err = RunConfiguration::from_json("{not json").unwrap_err();
        assert!(matches!(err, BrowserError::ConfigInvalid(_)));
    }

    #[test]
    fn test_blank_fields_resolve_to_defaults() {
        let config = RunConfiguration {
            summary_template: "   \n ".to_string(),
            review_heading: "".to_string(),
            review_questions: QuestionSource::from("\n\n"),
            ..Default::default()
        };

        let resolved = config.resolve();
        assert_eq!(resolved.summary_template, DEFAULT_SUMMARY_TEMPLATE);
        assert_eq!(resolved.review_heading, DEFAULT_REVIEW_HEADING);
        assert_eq!(resolved.review_questions, RunConfiguration::default().review_questions);
    }

    #[test]
    fn test_custom_fields_are_trimmed() {
        let config = RunConfiguration {
            summary_template: "  # Mine {{totalFiles}}\n".to_string(),
            review_heading: " Checks ".to_string(),
            ..Default::default()
        };

        let resolved = config.resolve();
        assert_eq!(resolved.summary_template, "# Mine {{totalFiles}}");
        assert_eq!(resolved.review_heading, "Checks");
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"compactMode": true, "reviewHeading": "Verdict"}}"#).unwrap();

        let config = RunConfiguration::load(file.path()).unwrap();
        assert!(config.compact_mode);
        assert_eq!(config.review_heading, "Verdict");
    }

    #[test]
    fn test_load_missing_file() {
        let err = RunConfiguration::load("/nonexistent/codex-buddy.json").unwrap_err();
        assert!(err.to_string().contains("Invalid configuration"));
    }

    #[test]
    fn test_json_round_trip_keeps_camel_case() {
        let json = RunConfiguration::default().to_json().unwrap();
        assert!(json.contains("\"currentVersionOnly\""));
        assert!(json.contains("\"reviewQuestions\""));
    }

    #[test]
    fn test_separators_follow_compact_mode() {
        let resolved = RunConfiguration {
            compact_mode: true,
            ..Default::default()
        }
        .resolve();

        assert_eq!(resolved.separators(), Separators::new("---", "\n"));
    }
}
