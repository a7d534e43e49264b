use crate::review::questions::{QuestionSource, normalize_questions};
use crate::review::template::{TemplateContext, render};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const DEFAULT_REVIEW_HEADING: &str = "Review Questions";

/// Shown in place of the list when no questions are configured
pub const FALLBACK_QUESTION: &str = "Add your review questions in Options → Summary Template.";

/// Run totals exposed to templates as `{{totalVersions}}` and `{{totalFiles}}`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewMetrics {
    pub total_versions: usize,
    pub total_files: usize,
}

impl ReviewMetrics {
    pub fn new(total_versions: usize, total_files: usize) -> Self {
        Self {
            total_versions,
            total_files,
        }
    }

    pub fn to_context(&self) -> TemplateContext {
        let mut context = TemplateContext::new();
        context.insert("totalVersions".to_string(), Value::from(self.total_versions));
        context.insert("totalFiles".to_string(), Value::from(self.total_files));
        context
    }
}

/// Joiners between document blocks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Separators {
    /// Horizontal rule between sections
    pub line_separator: String,
    /// Gap after headings and blocks
    pub separator: String,
}

impl Separators {
    pub fn new(line_separator: impl Into<String>, separator: impl Into<String>) -> Self {
        Self {
            line_separator: line_separator.into(),
            separator: separator.into(),
        }
    }

    pub fn for_mode(compact: bool) -> Self {
        if compact {
            Self::new("---", "\n")
        } else {
            Self::new("\n---\n", "\n\n")
        }
    }
}

impl Default for Separators {
    fn default() -> Self {
        Self::for_mode(false)
    }
}

/// Heading line for the review block: trimmed, defaulted, and made a markdown heading
pub fn review_heading_line(heading: &str) -> String {
    let heading = match heading.trim() {
        "" => DEFAULT_REVIEW_HEADING,
        trimmed => trimmed,
    };

    if heading.starts_with('#') {
        heading.to_string()
    } else {
        format!("## {}", heading)
    }
}

/// Build the numbered review-questions block appended to a summary.
///
/// Layout: `line_separator`, newline, heading, `separator`, numbered questions
/// joined by newlines, trailing newline. Questions are rendered as templates
/// against `metrics`.
pub fn build_review_section(
    heading: &str,
    questions: &QuestionSource,
    metrics: ReviewMetrics,
    separators: &Separators,
) -> String {
    let heading_line = review_heading_line(heading);
    let context = metrics.to_context();

    let mut questions = normalize_questions(questions);
    if questions.is_empty() {
        questions.push(FALLBACK_QUESTION.to_string());
    }

    let lines: Vec<String> = questions
        .iter()
        .enumerate()
        .map(|(index, question)| format!("{}. {}", index + 1, render(question, &context)))
        .collect();

    format!(
        "{}\n{}{}{}\n",
        separators.line_separator,
        heading_line,
        separators.separator,
        lines.join("\n")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbered_lines(section: &str) -> usize {
        section
            .lines()
            .filter(|line| {
                let digits: String = line.chars().take_while(|c| c.is_ascii_digit()).collect();
                !digits.is_empty() && line[digits.len()..].starts_with(". ")
            })
            .count()
    }

    #[test]
    fn test_builds_numbered_section_with_metrics() {
        let section = build_review_section(
            "Custom Heading",
            &vec!["Q1 for {{totalVersions}} versions", "Q2"].into(),
            ReviewMetrics::new(2, 5),
            &Separators::new("\n---\n", "\n\n"),
        );

        assert!(section.contains("## Custom Heading"));
        assert!(section.contains("1. Q1 for 2 versions"));
        assert!(section.contains("2. Q2"));
        assert_eq!(
            section,
            "\n---\n\n## Custom Heading\n\n1. Q1 for 2 versions\n2. Q2\n"
        );
    }

    #[test]
    fn test_falls_back_when_no_questions() {
        let section = build_review_section("", &"".into(), ReviewMetrics::default(), &Separators::default());

        assert!(section.contains("## Review Questions"));
        assert!(section.contains("1. Add your review questions"));
        assert_eq!(numbered_lines(&section), 1);
    }

    #[test]
    fn test_existing_markdown_heading_is_kept() {
        let section = build_review_section(
            "  ### Reviewer prompts ",
            &"Q".into(),
            ReviewMetrics::default(),
            &Separators::default(),
        );

        assert!(section.contains("\n### Reviewer prompts\n"));
        assert!(!section.contains("## ###"));
    }

    #[test]
    fn test_compact_separators() {
        let section = build_review_section("Q", &"One\nTwo".into(), ReviewMetrics::default(), &Separators::for_mode(true));
        assert_eq!(section, "---\n## Q\n1. One\n2. Two\n");
    }

    #[test]
    fn test_heading_once_and_line_count() {
        let cases: Vec<QuestionSource> = vec![
            "".into(),
            "a".into(),
            "a\nb\n\nc".into(),
            vec!["x", "x", "x", "x"].into(),
        ];

        for questions in cases {
            let expected = normalize_questions(&questions).len().max(1);
            let section = build_review_section("Heads up", &questions, ReviewMetrics::new(1, 1), &Separators::default());

            assert_eq!(section.matches("## Heads up").count(), 1);
            assert_eq!(numbered_lines(&section), expected);
        }
    }

    #[test]
    fn test_metrics_context_keys() {
        let context = ReviewMetrics::new(3, 42).to_context();
        assert_eq!(context.get("totalVersions"), Some(&Value::from(3)));
        assert_eq!(context.get("totalFiles"), Some(&Value::from(42)));
    }
}
