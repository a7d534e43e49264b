use crate::dom::{DomTree, NodeExt};
use crate::extract::FileDiff;
use crate::extract::filename::{file_anywhere, file_in_head, file_in_label, is_file_label};
use indexmap::IndexMap;
use indexmap::map::Entry;
use kuchikiki::{Node, NodeRef};
use std::collections::HashSet;
use std::rc::Rc;

/// Diff blocks keyed by file name. The first block offered for a name is kept.
#[derive(Debug, Default)]
pub struct DiffSet {
    blocks: IndexMap<String, FileDiff>,
}

impl DiffSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a block unless one with the same name was already collected.
    /// Returns whether the block was kept.
    pub fn offer(&mut self, name: String, patch: String) -> bool {
        match self.blocks.entry(name) {
            Entry::Occupied(entry) => {
                log::debug!("Dropping duplicate diff block for {}", entry.key());
                false
            }
            Entry::Vacant(entry) => {
                let name = entry.key().clone();
                entry.insert(FileDiff { name, patch });
                true
            }
        }
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn into_files(self) -> Vec<FileDiff> {
        self.blocks.into_values().collect()
    }
}

/// One way of locating diff blocks on a page
pub trait DiffStrategy {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Add every block this strategy can find to `found`
    fn collect(&self, tree: &DomTree, found: &mut DiffSet);
}

/// The built-in strategies, most precise first
pub fn default_strategies() -> Vec<Box<dyn DiffStrategy>> {
    vec![
        Box::new(StructuredDiffs),
        Box::new(GroupedDiffs),
        Box::new(HighlightedDiffs),
        Box::new(BroadScan),
    ]
}

/// Run strategies in order and return the blocks of the first that finds any
pub fn extract_diffs(tree: &DomTree, strategies: &[Box<dyn DiffStrategy>]) -> Vec<FileDiff> {
    for strategy in strategies {
        let mut found = DiffSet::new();
        strategy.collect(tree, &mut found);

        if !found.is_empty() {
            log::debug!("{} strategy found {} diff block(s)", strategy.name(), found.len());
            return found.into_files();
        }

        log::debug!("{} strategy found nothing", strategy.name());
    }

    Vec::new()
}

/// Containers tagged with `data-diff-header`, rendered as unified-diff tables
pub struct StructuredDiffs;

impl DiffStrategy for StructuredDiffs {
    fn name(&self) -> &'static str {
        "structured"
    }

    fn collect(&self, tree: &DomTree, found: &mut DiffSet) {
        for container in tree.select("[data-diff-header]") {
            let name = container.attribute("data-diff-header").unwrap_or_default();

            let patch = match container.select_one("table.unified-diff-table") {
                Some(table) => table_patch(&table),
                None => container.trimmed_text(),
            };

            if !name.is_empty() && !patch.is_empty() {
                found.offer(name, patch);
            }
        }
    }
}

/// Rows of a diff table as `operator + content`, concatenated as-is
fn table_patch(table: &NodeRef) -> String {
    let mut patch = String::new();

    for row in table.select_all("tr.diff-line") {
        let Some(cell) = row.select_one(".diff-line-content") else {
            continue;
        };

        let operator = cell
            .select_one(".diff-line-content-operator")
            .map(|op| op.text())
            .unwrap_or_default();
        let content = cell
            .select_one(".diff-line-syntax-raw")
            .map(|raw| raw.text())
            .unwrap_or_default();

        patch.push_str(&operator);
        patch.push_str(&content);
    }

    patch
}

/// Buttons of the changed-files tree, in display order
const FILE_TREE_BUTTONS: &str = "div.bg-token-bg-primary.flex.flex-col.rounded-2xl.border.border-token-border-heavy.outline-2 ul li span button";

/// A parent with this many diff-classed children is taken as one diff block
const MIN_DIFF_CHILDREN: usize = 5;

const MIN_GROUPED_CHARS: usize = 100;

/// How far back to look for a file-name label before a block
const LABEL_LOOKBACK: usize = 5;

const HEAD_LINES: usize = 5;

/// Blocks found by grouping elements whose class mentions "diff"
pub struct GroupedDiffs;

impl DiffStrategy for GroupedDiffs {
    fn name(&self) -> &'static str {
        "grouped"
    }

    fn collect(&self, tree: &DomTree, found: &mut DiffSet) {
        let file_names = file_button_names(tree);
        let mut counter = 0;

        for (index, container) in diff_containers(tree).iter().enumerate() {
            let text = container.trimmed_text();
            if text.chars().count() < MIN_GROUPED_CHARS {
                continue;
            }
            counter += 1;

            // Button order and container order are queried independently;
            // the positional match is a best guess
            let name = file_names
                .get(index)
                .cloned()
                .or_else(|| preceding_file_label(container))
                .or_else(|| file_in_head(&text, HEAD_LINES))
                .unwrap_or_else(|| format!("Code Block {}", counter));

            found.offer(name, text);
        }
    }
}

/// File names from the changed-files tree, or any button labelled like a file
fn file_button_names(tree: &DomTree) -> Vec<String> {
    let names: Vec<String> = tree
        .select(FILE_TREE_BUTTONS)
        .iter()
        .map(|button| button.trimmed_text())
        .filter(|text| !text.is_empty())
        .collect();

    if !names.is_empty() {
        return names;
    }

    tree.select("button")
        .iter()
        .map(|button| button.trimmed_text())
        .filter(|text| is_file_label(text))
        .collect()
}

/// Parents holding more than `MIN_DIFF_CHILDREN` diff-classed children,
/// found by climbing from every diff-classed element. Document order, no repeats.
fn diff_containers(tree: &DomTree) -> Vec<NodeRef> {
    let mut containers: Vec<NodeRef> = Vec::new();

    for element in tree.select(r#"[class*="diff"]"#) {
        let mut current = element;

        while let Some(parent) = current.parent_element() {
            let diff_children = parent
                .element_children()
                .iter()
                .filter(|child| child.class_contains("diff"))
                .count();

            if diff_children > MIN_DIFF_CHILDREN {
                if !containers.contains(&parent) {
                    containers.push(parent);
                }
                break;
            }

            current = parent;
        }
    }

    containers
}

/// A short file-name label among the few elements right before `container`
fn preceding_file_label(container: &NodeRef) -> Option<String> {
    let mut previous = container.previous_element_sibling();

    for _ in 0..LABEL_LOOKBACK {
        let element = previous?;

        let text = element.trimmed_text();
        if text.chars().count() < MIN_GROUPED_CHARS {
            if let Some(name) = file_in_label(&text) {
                return Some(name);
            }
        }

        previous = element.previous_element_sibling();
    }

    None
}

const MIN_HIGHLIGHTED_CHARS: usize = 200;

const CODE_MARKERS: [&str; 3] = ["import", "function", "old line"];

/// Blocks around syntax-highlighted (`hljs`) code
pub struct HighlightedDiffs;

impl DiffStrategy for HighlightedDiffs {
    fn name(&self) -> &'static str {
        "highlighted"
    }

    fn collect(&self, tree: &DomTree, found: &mut DiffSet) {
        let mut containers: Vec<NodeRef> = Vec::new();
        let mut measured: HashSet<*const Node> = HashSet::new();

        for element in tree.select(r#"[class*="hljs"]"#) {
            let mut parent = element.parent_element();

            while let Some(candidate) = parent {
                // Everything above an ancestor seen before was settled by that walk
                if !measured.insert(Rc::as_ptr(&candidate.0)) {
                    break;
                }

                let text = candidate.text();
                let substantial = text.chars().count() > MIN_HIGHLIGHTED_CHARS
                    && CODE_MARKERS.iter().any(|marker| text.contains(marker));

                if substantial {
                    containers.push(candidate);
                    break;
                }

                parent = candidate.parent_element();
            }
        }

        for (index, container) in containers.iter().enumerate() {
            let text = container.trimmed_text();
            let name = file_anywhere(&text).unwrap_or_else(|| format!("Code Block {}", index + 1));
            found.offer(name, text);
        }
    }
}

const BROAD_MAX_CHILDREN: usize = 10;
const BROAD_MIN_CHARS: usize = 500;
const BROAD_MAX_CHARS: usize = 5000;

const BROAD_MARKERS: [&str; 3] = ["old line number", "import ", "function "];

/// Last resort: any small element whose text looks like a chunk of code
pub struct BroadScan;

impl DiffStrategy for BroadScan {
    fn name(&self) -> &'static str {
        "broad"
    }

    fn collect(&self, tree: &DomTree, found: &mut DiffSet) {
        let elements = tree.root.descendants().filter(|node| node.as_element().is_some());

        for element in elements {
            if element.element_children().len() > BROAD_MAX_CHILDREN {
                continue;
            }

            let text = element.trimmed_text();
            let length = text.chars().count();
            let looks_like_code = length > BROAD_MIN_CHARS
                && length < BROAD_MAX_CHARS
                && BROAD_MARKERS.iter().any(|marker| text.contains(marker));

            if looks_like_code {
                let name = file_anywhere(&text).unwrap_or_else(|| format!("Code Block {}", found.len() + 1));
                found.offer(name, text);
            }
        }
    }
}
