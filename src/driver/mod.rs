//! Version driver
//!
//! Finds the version controls of a task page, activates each in turn and reads
//! one [`VersionRecord`] per version. Activation waits for the page to react to
//! the click (bounded), then for fixed settle delays, before taking a snapshot.

pub mod host;
pub mod wait;

pub use host::{PageHost, SettleTimings};
pub use wait::{WaitLimits, WaitOutcome, content_changed, wait_for_signal};

use crate::config::{CURRENT_VERSION_LABEL, ResolvedConfiguration};
use crate::dom::{DomTree, ElementSelector, NodeExt, SelectorMap};
use crate::error::{BrowserError, Result};
use crate::extract::{ContentExtractor, ContentSnapshot, ExtractOptions, FileDiff};
use crate::progress::{LogProgress, ProgressSink, capturing};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, LazyLock};

/// Elements that may be version controls
const CONTROL_CANDIDATES: &str = r#"button, [role="tab"]"#;

static SHORT_VERSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^V\d+$").expect("short version pattern is valid"));

static PR_LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^PR\s*\d+$").expect("PR label pattern is valid"));

/// Whether a trimmed control label names a version
pub fn is_version_label(label: &str) -> bool {
    label.contains("Version") || SHORT_VERSION.is_match(label) || PR_LABEL.is_match(label)
}

/// Version controls of a snapshot, in document order, one per distinct label
pub fn discover_controls(tree: &DomTree) -> SelectorMap {
    let mut controls = SelectorMap::new();

    for element in tree.select(CONTROL_CANDIDATES) {
        let label = element.trimmed_text();
        if !is_version_label(&label) || controls.find_by_text(&label).is_some() {
            continue;
        }

        let tag = element.tag_name().unwrap_or_default();
        let mut selector = ElementSelector::new(element.css_path(), tag).with_text(label);
        if let Some(id) = element.attribute("id") {
            selector = selector.with_id(id);
        }

        log::debug!("Version control {}", element.to_simple_string());
        controls.register(selector);
    }

    controls
}

/// Whether the control labelled `label` is already marked as the selected tab
fn shows_selected(tree: &DomTree, label: &str) -> bool {
    tree.select(CONTROL_CANDIDATES)
        .iter()
        .filter(|element| element.trimmed_text() == label)
        .any(|element| {
            element.attribute("aria-selected").as_deref() == Some("true")
                || element.attribute("data-state").as_deref() == Some("active")
        })
}

/// The control labelled `label` in a snapshot
fn locate(tree: &DomTree, label: &str) -> Option<ElementSelector> {
    let controls = discover_controls(tree);
    controls
        .find_by_text(label)
        .and_then(|index| controls.get(index))
        .cloned()
}

/// Content of one version
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionRecord {
    pub label: String,
    pub task: String,
    pub summary: String,
    pub testing: String,
    pub files: Vec<FileDiff>,
}

impl VersionRecord {
    pub fn new(label: impl Into<String>, snapshot: ContentSnapshot) -> Self {
        let ContentSnapshot {
            task,
            summary,
            testing,
            files,
        } = snapshot;

        Self {
            label: label.into(),
            task,
            summary,
            testing,
            files,
        }
    }

    /// A version whose content could not be read
    pub fn empty(label: impl Into<String>) -> Self {
        Self::new(label, ContentSnapshot::default())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    /// Nothing could be read from the version
    ExtractionEmpty,
    /// The control could not be found or clicked
    ControlUnavailable,
}

/// A non-fatal problem met while capturing one version
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureIssue {
    pub label: String,
    pub kind: IssueKind,
}

/// Records of a run, in discovery order, plus the problems met along the way
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionReport {
    pub records: Vec<VersionRecord>,
    pub issues: Vec<CaptureIssue>,
}

impl CollectionReport {
    pub fn total_files(&self) -> usize {
        self.records.iter().map(|record| record.files.len()).sum()
    }

    /// Issues of one kind
    pub fn issues_of(&self, kind: IssueKind) -> impl Iterator<Item = &CaptureIssue> {
        self.issues.iter().filter(move |issue| issue.kind == kind)
    }

    fn note(&mut self, label: &str, kind: IssueKind) {
        self.issues.push(CaptureIssue {
            label: label.to_string(),
            kind,
        });
    }

    fn capture(&mut self, label: &str, snapshot: ContentSnapshot) {
        if snapshot.is_empty() {
            log::warn!("Nothing could be extracted from {}", label);
            self.note(label, IssueKind::ExtractionEmpty);
        } else {
            log::info!(
                "Captured {}: {} file(s), {} summary chars",
                label,
                snapshot.files.len(),
                snapshot.summary.chars().count()
            );
        }

        self.records.push(VersionRecord::new(label, snapshot));
    }
}

/// Drives a page through its versions.
///
/// The driver is the only writer to the page while it runs. It can be stopped
/// between two versions through the abort flag.
#[derive(Debug, Clone, Default)]
pub struct VersionDriver {
    timings: SettleTimings,
    abort: Arc<AtomicBool>,
}

impl VersionDriver {
    pub fn new(timings: SettleTimings) -> Self {
        Self {
            timings,
            abort: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Share an existing abort flag
    pub fn with_abort(mut self, abort: Arc<AtomicBool>) -> Self {
        self.abort = abort;
        self
    }

    /// Flag that stops the run before the next version when set
    pub fn abort_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.abort)
    }

    /// Collect every version, logging progress
    pub fn collect<H>(&self, host: &mut H, config: &ResolvedConfiguration) -> Result<CollectionReport>
    where
        H: PageHost + ?Sized,
    {
        self.collect_with_progress(host, config, &mut LogProgress)
    }

    pub fn collect_with_progress<H>(
        &self,
        host: &mut H,
        config: &ResolvedConfiguration,
        progress: &mut dyn ProgressSink,
    ) -> Result<CollectionReport>
    where
        H: PageHost + ?Sized,
    {
        let extractor = ContentExtractor::new(ExtractOptions {
            include_testing: config.include_testing,
        });
        let mut report = CollectionReport::default();

        if config.current_version_only {
            progress.stage(&capturing(CURRENT_VERSION_LABEL, 1, 1));
            host.pause(self.timings.before_extract);

            let snapshot = extractor.extract(&host.snapshot()?);
            report.capture(CURRENT_VERSION_LABEL, snapshot);
            progress.stage("Captured");

            return Ok(report);
        }

        progress.stage("Scanning for versions");
        let controls = discover_controls(&host.snapshot()?);
        let total = controls.len();
        progress.stage(&format!("Found {} version(s)", total));
        log::debug!("Version controls: {}", controls.to_json().unwrap_or_default());

        if controls.is_empty() {
            log::warn!("No version controls found on the page");
            return Ok(report);
        }

        progress.stage(&format!("Preparing {} version(s)", total));

        for (position, control) in controls.selectors().enumerate() {
            if self.abort.load(Ordering::SeqCst) {
                log::info!("Collection aborted after {} version(s)", report.records.len());
                return Err(BrowserError::Cancelled {
                    captured: report.records.len(),
                });
            }

            let label = control.text.clone().unwrap_or_default();
            progress.stage(&capturing(&label, position + 1, total));

            match self.drive(host, control, &label) {
                Ok(()) => {}
                Err(e) if !e.is_fatal() => {
                    log::warn!("Skipping {}: {}", label, e);
                    report.note(&label, IssueKind::ControlUnavailable);
                    report.records.push(VersionRecord::empty(label));
                    continue;
                }
                Err(e) => return Err(e),
            }

            let snapshot = extractor.extract(&host.snapshot()?);
            report.capture(&label, snapshot);
            progress.stage("Captured");
        }

        Ok(report)
    }

    /// Activate one control and let the page settle.
    ///
    /// A page that does not visibly change is only logged; extraction proceeds
    /// against whatever is on screen after the ceiling.
    fn drive<H>(&self, host: &mut H, control: &ElementSelector, label: &str) -> Result<()>
    where
        H: PageHost + ?Sized,
    {
        let baseline = host.content()?;
        let tree = DomTree::parse(&baseline);

        // The page may have re-rendered since discovery
        let target = locate(&tree, label).unwrap_or_else(|| control.clone());
        let already_shown = shows_selected(&tree, label);
        log::debug!("Activating {} via {}", label, target.css_selector);

        host.activate(&target)?;

        if already_shown {
            log::debug!("{} is already the selected version", label);
        } else {
            let outcome = wait_for_signal(host, WaitLimits::from(self.timings), content_changed(baseline))?;
            if outcome == WaitOutcome::TimedOut {
                log::warn!("{} did not change the page within {:?}", label, self.timings.change_ceiling);
            }
        }

        host.pause(self.timings.after_activate);
        host.pause(self.timings.before_extract);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::RecordedProgress;
    use std::collections::HashMap;
    use std::time::Duration;

    fn page(body: &str) -> String {
        format!(
            r#"<html><body>
                <nav><button id="v1">Version 1</button><button id="v2">Version 2</button></nav>
                <div class="px-4 text-sm leading-5 markdown prose w-full break-words"><p>Summary</p><p>{}</p></div>
            </body></html>"#,
            body
        )
    }

    /// Page with one HTML state per control selector
    struct FakePage {
        current: String,
        states: HashMap<String, String>,
        activated: Vec<String>,
        paused: Duration,
    }

    impl FakePage {
        fn new(initial: String) -> Self {
            Self {
                current: initial,
                states: HashMap::new(),
                activated: Vec::new(),
                paused: Duration::ZERO,
            }
        }

        fn state(mut self, selector: &str, html: String) -> Self {
            self.states.insert(selector.to_string(), html);
            self
        }
    }

    impl PageHost for FakePage {
        fn location(&self) -> Result<String> {
            Ok("https://chatgpt.com/codex/tasks/task_1".to_string())
        }

        fn content(&self) -> Result<String> {
            Ok(self.current.clone())
        }

        fn activate(&mut self, selector: &ElementSelector) -> Result<()> {
            let html = self
                .states
                .get(&selector.css_selector)
                .ok_or_else(|| BrowserError::ElementNotFound(selector.css_selector.clone()))?;
            self.current = html.clone();
            self.activated.push(selector.css_selector.clone());
            Ok(())
        }

        fn pause(&mut self, duration: Duration) {
            self.paused += duration;
        }
    }

    fn config() -> ResolvedConfiguration {
        ResolvedConfiguration::default()
    }

    #[test]
    fn test_version_labels() {
        assert!(is_version_label("Version 3"));
        assert!(is_version_label("Show Version"));
        assert!(is_version_label("V12"));
        assert!(is_version_label("PR 2"));
        assert!(is_version_label("PR7"));

        assert!(!is_version_label("v2"));
        assert!(!is_version_label("V2 draft"));
        assert!(!is_version_label("PRs 2"));
        assert!(!is_version_label("Create PR"));
    }

    #[test]
    fn test_discovery_dedups_and_filters() {
        let tree = DomTree::parse(
            r#"<body>
                <button id="a">Version 1</button>
                <div role="tab">  V2  </div>
                <button>Version 1</button>
                <button>Archive</button>
                <a role="tab">PR 3</a>
            </body>"#,
        );

        let controls = discover_controls(&tree);
        let labels: Vec<_> = controls.selectors().filter_map(|s| s.text.clone()).collect();
        assert_eq!(labels, vec!["Version 1", "V2", "PR 3"]);

        let first = controls.get(0).unwrap();
        assert_eq!(first.css_selector, "#a");
        assert_eq!(first.id.as_deref(), Some("a"));

        let second = controls.get(1).unwrap();
        assert_eq!(second.tag_name, "div");
        assert_eq!(second.css_selector, "html > body:nth-child(2) > div:nth-child(2)");
    }

    #[test]
    fn test_drives_each_version_in_order() {
        let mut host = FakePage::new(page("initial"))
            .state("#v1", page("first version"))
            .state("#v2", page("second version"));

        let mut progress = RecordedProgress::default();
        let report = VersionDriver::new(SettleTimings::default())
            .collect_with_progress(&mut host, &config(), &mut progress)
            .unwrap();

        let labels: Vec<_> = report.records.iter().map(|r| r.label.as_str()).collect();
        assert_eq!(labels, vec!["Version 1", "Version 2"]);
        assert_eq!(report.records[0].summary, "first version");
        assert_eq!(report.records[1].summary, "second version");
        assert_eq!(host.activated, vec!["#v1", "#v2"]);
        assert!(report.issues.is_empty());

        assert_eq!(progress.stages[0], "Scanning for versions");
        assert_eq!(progress.stages[1], "Found 2 version(s)");
        assert!(progress.stages.contains(&"Capturing Version 2 (2 of 2)".to_string()));
    }

    #[test]
    fn test_unchanged_page_waits_out_the_ceiling() {
        let mut host = FakePage::new(page("same"))
            .state("#v1", page("same"))
            .state("#v2", page("other"));

        let report = VersionDriver::new(SettleTimings::default())
            .collect(&mut host, &config())
            .unwrap();

        assert_eq!(report.records.len(), 2);
        assert_eq!(report.records[0].summary, "same");
        assert!(report.issues.is_empty());
        // 2000 ceiling for the first version, then 1500 + 800 settle for each
        assert_eq!(host.paused, Duration::from_millis(2000 + 2 * (1500 + 800)));
    }

    #[test]
    fn test_selected_version_skips_the_change_wait() {
        let selected = |body: &str| {
            format!(
                r#"<html><body>
                    <nav><button id="v1" role="tab" aria-selected="true">Version 1</button><button id="v2" role="tab" data-state="inactive">Version 2</button></nav>
                    <div class="px-4 text-sm leading-5 markdown prose w-full break-words"><p>Summary</p><p>{}</p></div>
                </body></html>"#,
                body
            )
        };
        let mut host = FakePage::new(selected("first"))
            .state("#v1", selected("first"))
            .state("#v2", page("second"));

        let report = VersionDriver::new(SettleTimings::default())
            .collect(&mut host, &config())
            .unwrap();

        assert_eq!(host.activated, vec!["#v1", "#v2"]);
        assert_eq!(report.records[0].summary, "first");
        assert_eq!(report.records[1].summary, "second");
        assert!(report.issues.is_empty());
        assert_eq!(host.paused, Duration::from_millis(2 * (1500 + 800)));
    }

    #[test]
    fn test_missing_control_yields_empty_record() {
        let mut host = FakePage::new(page("initial")).state("#v2", page("second"));

        let report = VersionDriver::new(SettleTimings::immediate())
            .collect(&mut host, &config())
            .unwrap();

        assert_eq!(report.records[0], VersionRecord::empty("Version 1"));
        assert_eq!(report.records[1].summary, "second");
        assert_eq!(report.issues_of(IssueKind::ControlUnavailable).count(), 1);
    }

    #[test]
    fn test_current_version_only_never_activates() {
        let mut host = FakePage::new(page("on screen"));

        let config = ResolvedConfiguration {
            current_version_only: true,
            ..config()
        };
        let report = VersionDriver::new(SettleTimings::default())
            .collect(&mut host, &config)
            .unwrap();

        assert_eq!(report.records.len(), 1);
        assert_eq!(report.records[0].label, "Current Version");
        assert_eq!(report.records[0].summary, "on screen");
        assert!(host.activated.is_empty());
        assert_eq!(host.paused, Duration::from_millis(800));
    }

    #[test]
    fn test_no_controls_is_an_empty_report() {
        let mut host = FakePage::new("<body><p>No tabs</p></body>".to_string());

        let report = VersionDriver::default().collect(&mut host, &config()).unwrap();
        assert_eq!(report, CollectionReport::default());
    }

    #[test]
    fn test_abort_flag_stops_the_run() {
        let mut host = FakePage::new(page("initial")).state("#v1", page("first"));

        let driver = VersionDriver::new(SettleTimings::immediate());
        driver.abort_handle().store(true, Ordering::SeqCst);

        let err = driver.collect(&mut host, &config()).unwrap_err();
        assert!(matches!(err, BrowserError::Cancelled { captured: 0 }));
        assert!(host.activated.is_empty());
    }

    #[test]
    fn test_empty_version_is_reported() {
        let mut host = FakePage::new(page("initial"))
            .state("#v1", r#"<body><button id="v1">Version 1</button></body>"#.to_string())
            .state("#v2", page("second"));

        let report = VersionDriver::new(SettleTimings::immediate())
            .collect(&mut host, &config())
            .unwrap();

        assert_eq!(report.records.len(), 2);
        assert_eq!(report.issues_of(IssueKind::ExtractionEmpty).count(), 1);
        assert_eq!(report.total_files(), 0);
    }
}
