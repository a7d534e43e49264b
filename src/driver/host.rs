use crate::dom::{DomTree, ElementSelector};
use crate::error::Result;
use std::time::Duration;

/// The page the driver works on.
///
/// `BrowserSession` implements this over the live task tab; tests implement it
/// with canned HTML states.
pub trait PageHost {
    /// URL of the page
    fn location(&self) -> Result<String>;

    /// Current serialized HTML of the page
    fn content(&self) -> Result<String>;

    /// Click the element the selector points at
    fn activate(&mut self, selector: &ElementSelector) -> Result<()>;

    /// Let the page run for a while
    fn pause(&mut self, duration: Duration);

    /// Parse the current content into a snapshot
    fn snapshot(&self) -> Result<DomTree> {
        self.content().map(|html| DomTree::parse(&html))
    }
}

/// Delays used while driving versions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettleTimings {
    /// After a click, once the page has reacted (or the ceiling passed)
    pub after_activate: Duration,

    /// Right before reading the page
    pub before_extract: Duration,

    /// Longest wait for the page to react to a click
    pub change_ceiling: Duration,

    pub poll_interval: Duration,
}

impl Default for SettleTimings {
    fn default() -> Self {
        Self {
            after_activate: Duration::from_millis(1500),
            before_extract: Duration::from_millis(800),
            change_ceiling: Duration::from_millis(2000),
            poll_interval: Duration::from_millis(100),
        }
    }
}

impl SettleTimings {
    /// No settle delays at all, for pages that are already static
    pub fn immediate() -> Self {
        Self {
            after_activate: Duration::ZERO,
            before_extract: Duration::ZERO,
            change_ceiling: Duration::ZERO,
            poll_interval: Duration::from_millis(1),
        }
    }
}
