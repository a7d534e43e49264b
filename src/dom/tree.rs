use crate::dom::element::NodeExt;
use crate::error::{BrowserError, Result};
use headless_chrome::Tab;
use kuchikiki::NodeRef;
use kuchikiki::traits::TendrilSink;
use std::sync::Arc;

/// A parsed snapshot of a web page.
///
/// The live page keeps changing while versions are driven, so every read works
/// on a snapshot taken at one point in time and never on the page itself.
#[derive(Debug, Clone)]
pub struct DomTree {
    /// Document node of the parsed page
    pub root: NodeRef,
}

impl DomTree {
    /// Parse an HTML document. Missing `<html>`/`<head>`/`<body>` are synthesized.
    pub fn parse(html: &str) -> Self {
        Self {
            root: kuchikiki::parse_html().one(html),
        }
    }

    /// Build a snapshot from the current content of a browser tab
    pub fn from_tab(tab: &Arc<Tab>) -> Result<Self> {
        let html = tab
            .get_content()
            .map_err(|e| BrowserError::HostCommunication(format!("Failed to read page content: {}", e)))?;

        Ok(Self::parse(&html))
    }

    /// All elements matching a CSS selector, in document order
    pub fn select(&self, css: &str) -> Vec<NodeRef> {
        self.root.select_all(css)
    }

    /// First element matching a CSS selector
    pub fn select_first(&self, css: &str) -> Option<NodeRef> {
        self.root.select_one(css)
    }

    /// The `<body>` element, if the document has one
    pub fn body(&self) -> Option<NodeRef> {
        self.select_first("body")
    }

    /// Count total elements in the tree
    pub fn count_elements(&self) -> usize {
        self.root
            .descendants()
            .filter(|node| node.as_element().is_some())
            .count()
    }
}
