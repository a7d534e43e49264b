use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Information needed to locate an element in the live page
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ElementSelector {
    /// CSS selector for the element
    pub css_selector: String,

    /// Element's tag name
    pub tag_name: String,

    /// Element's ID attribute (if any)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Element's visible label
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl ElementSelector {
    /// Create a new ElementSelector with CSS selector
    pub fn new(css_selector: impl Into<String>, tag_name: impl Into<String>) -> Self {
        Self {
            css_selector: css_selector.into(),
            tag_name: tag_name.into(),
            id: None,
            text: None,
        }
    }

    /// Builder method: set ID
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Builder method: set label text
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }
}

/// Map of control indices to their selectors.
///
/// Uses IndexMap so that iteration follows registration (discovery) order.
#[derive(Debug, Clone, Default)]
pub struct SelectorMap {
    map: IndexMap<usize, ElementSelector>,
    next_index: usize,
}

impl SelectorMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new element and return its assigned index
    pub fn register(&mut self, selector: ElementSelector) -> usize {
        let index = self.next_index;
        self.map.insert(index, selector);
        self.next_index += 1;
        index
    }

    /// Get selector by index
    pub fn get(&self, index: usize) -> Option<&ElementSelector> {
        self.map.get(&index)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Get all selectors
    pub fn selectors(&self) -> impl Iterator<Item = &ElementSelector> {
        self.map.values()
    }

    /// Find index by exact label text
    pub fn find_by_text(&self, text: &str) -> Option<usize> {
        self.map
            .iter()
            .find(|(_, sel)| sel.text.as_deref() == Some(text))
            .map(|(idx, _)| *idx)
    }

    /// Export to JSON for debugging
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.map)
    }
}
