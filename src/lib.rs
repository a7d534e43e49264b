//! # codex-buddy
//!
//! Collects every version of a Codex task from the browser, via Chrome DevTools
//! Protocol (CDP), into one markdown review document.
//!
//! ## Features
//!
//! - **Version driving**: finds the version tabs of a task page and activates each in turn
//! - **Content extraction**: task prompt, Summary and Testing notes, and per-file diffs,
//!   each read through layered fallbacks so page redesigns degrade instead of failing
//! - **Document assembly**: a templated, deterministic markdown document with an
//!   optional numbered review-questions block
//! - **MCP Server**: `collect_review` and `reopen_review` tools for AI clients
//!
//! ## Command line
//!
//! ```bash
//! # Attach to a Chrome started with --remote-debugging-port and a signed-in profile
//! codex-buddy collect --ws-endpoint ws://127.0.0.1:9222/devtools/browser/<id>
//!
//! # Print the last document again
//! codex-buddy reopen
//! ```
//!
//! ## Library Usage
//!
//! ```rust,no_run
//! use codex_buddy::{BrowserSession, Collector, ConnectionOptions, LogProgress, RunConfiguration};
//!
//! # fn main() -> codex_buddy::Result<()> {
//! let mut session = BrowserSession::connect(ConnectionOptions::new("ws://127.0.0.1:9222/devtools/browser/abc"))?;
//! session.focus_tab_matching("chatgpt.com/codex/tasks/")?;
//!
//! let outcome = Collector::default().collect(&mut session, &RunConfiguration::default(), &mut LogProgress)?;
//! println!("{}", outcome.document);
//! # Ok(())
//! # }
//! ```
//!
//! Extraction and assembly work on plain HTML and need no browser:
//!
//! ```rust
//! use codex_buddy::{ContentExtractor, ResolvedConfiguration, VersionRecord, assemble};
//!
//! let html = r#"<div data-diff-header="src/lib.rs">+pub fn answer() -> u32 { 42 }</div>"#;
//! let snapshot = ContentExtractor::default().extract_html(html);
//!
//! let document = assemble(&[VersionRecord::new("Version 1", snapshot)], &ResolvedConfiguration::default());
//! assert!(document.contains("#### src/lib.rs"));
//! ```
//!
//! ## Module Overview
//!
//! - [`driver`]: version discovery and driving over the [`PageHost`] seam
//! - [`extract`]: task, section and diff extraction from page snapshots
//! - [`assemble`](mod@assemble): markdown document assembly and token estimate
//! - [`review`]: templates, question normalization and the review block
//! - [`collector`]: run orchestration with surface check, progress and caching
//! - [`browser`]: Chrome session management and the live [`PageHost`]
//! - [`dom`]: parsed page snapshots and element helpers
//! - [`config`], [`cache`], [`progress`], [`error`]
//! - [`mcp`]: **Model Context Protocol server** (requires `mcp-handler` feature)

pub mod assemble;
pub mod browser;
pub mod cache;
pub mod collector;
pub mod config;
pub mod dom;
pub mod driver;
pub mod error;
pub mod extract;
pub mod progress;
pub mod review;

#[cfg(feature = "mcp-handler")]
pub mod mcp;

pub use assemble::{assemble, estimate_tokens};
pub use browser::{BrowserSession, ConnectionOptions, LaunchOptions};
pub use cache::SummaryCache;
pub use collector::{CollectionOutcome, Collector, CollectorOptions};
pub use config::{ResolvedConfiguration, RunConfiguration};
pub use dom::{DomTree, ElementSelector, SelectorMap};
pub use driver::{CaptureIssue, CollectionReport, IssueKind, PageHost, SettleTimings, VersionDriver, VersionRecord};
pub use error::{BrowserError, Result};
pub use extract::{ContentExtractor, ContentSnapshot, ExtractOptions, FileDiff};
pub use progress::{LogProgress, ProgressSink};
pub use review::{QuestionSource, render};

#[cfg(feature = "mcp-handler")]
pub use mcp::ReviewServer;
#[cfg(feature = "mcp-handler")]
pub use rmcp::ServiceExt;
