//! Content extraction from a page snapshot
//!
//! Every extractor works on a [`DomTree`] and degrades to empty output: a page
//! that is missing a section yields an empty string, never an error.
//!
//! - `task`: the original task prompt
//! - `sections`: Summary and Testing text of the current version
//! - `diffs`: per-file diff blocks, via an ordered cascade of strategies
//! - `filename`: file-name recognition shared by the diff strategies

pub mod diffs;
pub mod filename;
pub mod sections;
pub mod task;

pub use diffs::{DiffSet, DiffStrategy, default_strategies, extract_diffs};
pub use sections::{SectionText, extract_sections};
pub use task::extract_task;

use crate::dom::DomTree;
use serde::{Deserialize, Serialize};

/// One changed file of a version
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileDiff {
    pub name: String,
    /// Diff text as shown on the page, never truncated
    pub patch: String,
}

/// Everything read from one version of the page
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentSnapshot {
    pub task: String,
    pub summary: String,
    pub testing: String,
    pub files: Vec<FileDiff>,
}

impl ContentSnapshot {
    /// Nothing at all was found
    pub fn is_empty(&self) -> bool {
        self.task.is_empty() && self.summary.is_empty() && self.testing.is_empty() && self.files.is_empty()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ExtractOptions {
    /// Read the Testing section
    pub include_testing: bool,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self { include_testing: true }
    }
}

/// Reads a [`ContentSnapshot`] out of page snapshots
pub struct ContentExtractor {
    options: ExtractOptions,
    strategies: Vec<Box<dyn DiffStrategy>>,
}

impl ContentExtractor {
    pub fn new(options: ExtractOptions) -> Self {
        Self {
            options,
            strategies: default_strategies(),
        }
    }

    /// Replace the diff strategy cascade
    pub fn with_strategies(mut self, strategies: Vec<Box<dyn DiffStrategy>>) -> Self {
        self.strategies = strategies;
        self
    }

    pub fn extract(&self, tree: &DomTree) -> ContentSnapshot {
        let task = extract_task(tree);
        let SectionText { summary, testing } = extract_sections(tree, self.options.include_testing);
        let files = extract_diffs(tree, &self.strategies);

        ContentSnapshot {
            task,
            summary,
            testing,
            files,
        }
    }

    /// Parse and extract in one step
    pub fn extract_html(&self, html: &str) -> ContentSnapshot {
        self.extract(&DomTree::parse(html))
    }
}

impl Default for ContentExtractor {
    fn default() -> Self {
        Self::new(ExtractOptions::default())
    }
}
