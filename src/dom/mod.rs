//! DOM snapshot module
//!
//! This module provides the read side of the page:
//! - DomTree: a parsed, point-in-time snapshot of the page
//! - NodeExt: element helpers with browser `textContent`/sibling semantics
//! - SelectorMap: indexed selectors for controls that must be found again in the live page

pub mod element;
pub mod selector_map;
pub mod tree;

pub use element::NodeExt;
pub use selector_map::{ElementSelector, SelectorMap};
pub use tree::DomTree;
