//! Markdown document assembly
//!
//! Turns the records of a run into the review document. Assembly is pure: the
//! same records and configuration always give byte-identical output.

use crate::config::ResolvedConfiguration;
use crate::driver::VersionRecord;
use crate::review::{ReviewMetrics, build_review_section, render};

/// Build the review document for a run
pub fn assemble(records: &[VersionRecord], config: &ResolvedConfiguration) -> String {
    let separators = config.separators();
    let sep = separators.separator.as_str();
    let line_sep = separators.line_separator.as_str();

    let total_files = records.iter().map(|record| record.files.len()).sum();
    let metrics = ReviewMetrics::new(records.len(), total_files);

    let mut output = render(&config.summary_template, &metrics.to_context())
        .trim_end()
        .to_string();
    output.push_str(sep);

    // The task is shared by all versions; the first non-empty one stands for all
    if let Some(task) = records.iter().map(|record| record.task.as_str()).find(|task| !task.is_empty()) {
        output.push_str(&format!("## Task{sep}{task}{sep}"));
        output.push_str(line_sep);
        output.push('\n');
    }

    for (index, record) in records.iter().enumerate() {
        output.push_str(&format!("## {}{sep}", record.label));

        if !record.summary.is_empty() {
            if config.compact_mode {
                output.push_str(&format!("{}{sep}", record.summary));
            } else {
                output.push_str(&format!("**Summary:**{sep}{}{sep}", record.summary));
            }
        }

        if !record.testing.is_empty() {
            output.push_str(&format!("**Testing:**{sep}{}{sep}", record.testing));
        }

        if record.files.is_empty() {
            output.push_str(&format!("*No file changes detected*{sep}"));
        } else {
            output.push_str(&format!("### Changed Files ({}){sep}", record.files.len()));

            for file in &record.files {
                output.push_str(&format!("#### {}\n```diff\n{}\n```{sep}", file.name, file.patch));
            }
        }

        if index + 1 < records.len() {
            output.push_str(line_sep);
            output.push('\n');
        }
    }

    if config.include_review_questions {
        output.push_str(&build_review_section(
            &config.review_heading,
            &config.review_questions,
            metrics,
            &separators,
        ));
    }

    output
}

/// Rough token count of a document: whichever of the word-based and
/// character-based estimates is larger
pub fn estimate_tokens(text: &str) -> usize {
    let normalized = text.trim();
    if normalized.is_empty() {
        return 0;
    }

    let words = normalized.split_whitespace().count();
    let collapsed_chars = normalized.split_whitespace().map(|word| word.chars().count()).sum::<usize>() + words - 1;

    let via_words = words as f64 / 0.75;
    let via_chars = collapsed_chars as f64 / 4.0;

    via_words.max(via_chars).round() as usize
}
