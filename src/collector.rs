//! Run-level orchestration: surface check, version collection, assembly and caching

use crate::assemble::{assemble, estimate_tokens};
use crate::cache::SummaryCache;
use crate::config::RunConfiguration;
use crate::driver::{CollectionReport, PageHost, SettleTimings, VersionDriver};
use crate::error::{BrowserError, Result};
use crate::progress::ProgressSink;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

/// URL fragment identifying a Codex task page
pub const TASK_URL_FRAGMENT: &str = "chatgpt.com/codex/tasks/";

/// Options for a collector
#[derive(Debug, Clone)]
pub struct CollectorOptions {
    /// Pages whose URL lacks this fragment are refused
    pub target_url_fragment: String,

    pub timings: SettleTimings,

    /// Set to stop the run before the next version
    pub abort: Arc<AtomicBool>,
}

impl Default for CollectorOptions {
    fn default() -> Self {
        Self {
            target_url_fragment: TASK_URL_FRAGMENT.to_string(),
            timings: SettleTimings::default(),
            abort: Arc::new(AtomicBool::new(false)),
        }
    }
}

impl CollectorOptions {
    pub fn target_url_fragment(mut self, fragment: impl Into<String>) -> Self {
        self.target_url_fragment = fragment.into();
        self
    }

    pub fn timings(mut self, timings: SettleTimings) -> Self {
        self.timings = timings;
        self
    }

    pub fn abort(mut self, abort: Arc<AtomicBool>) -> Self {
        self.abort = abort;
        self
    }
}

/// Result of a fresh collection
#[derive(Debug, Clone)]
pub struct CollectionOutcome {
    pub document: String,
    pub report: CollectionReport,
    /// Rough token count of `document`
    pub tokens: usize,
}

/// Collects a review document from a task page
#[derive(Debug, Clone, Default)]
pub struct Collector {
    options: CollectorOptions,
    cache: Option<SummaryCache>,
}

impl Collector {
    pub fn new(options: CollectorOptions) -> Self {
        Self { options, cache: None }
    }

    /// Store every assembled document in `cache`
    pub fn with_cache(mut self, cache: SummaryCache) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn options(&self) -> &CollectorOptions {
        &self.options
    }

    pub fn cache(&self) -> Option<&SummaryCache> {
        self.cache.as_ref()
    }

    /// Refuse pages that are not task pages
    pub fn check_surface<H>(&self, host: &H) -> Result<()>
    where
        H: PageHost + ?Sized,
    {
        let location = host.location()?;

        if location.contains(&self.options.target_url_fragment) {
            Ok(())
        } else {
            Err(BrowserError::NoTargetSurface(format!(
                "{} does not contain {}",
                location, self.options.target_url_fragment
            )))
        }
    }

    /// Collect every version, assemble the document and cache it
    pub fn collect<H>(
        &self,
        host: &mut H,
        config: &RunConfiguration,
        progress: &mut dyn ProgressSink,
    ) -> Result<CollectionOutcome>
    where
        H: PageHost + ?Sized,
    {
        self.check_surface(&*host)?;

        let config = config.resolve();
        let driver = VersionDriver::new(self.options.timings).with_abort(Arc::clone(&self.options.abort));
        let report = driver.collect_with_progress(host, &config, progress)?;

        progress.stage("Formatting consolidated summary");
        let document = assemble(&report.records, &config);
        progress.stage("Finalizing summary and review questions");

        if let Some(cache) = &self.cache {
            // The document is still returned when it cannot be cached
            if let Err(e) = cache.store(&document) {
                log::warn!("{}", e);
            }
        }

        let tokens = estimate_tokens(&document);
        log::info!(
            "Collected {} version(s), {} file(s), ~{} tokens",
            report.records.len(),
            report.total_files(),
            tokens
        );

        Ok(CollectionOutcome {
            document,
            report,
            tokens,
        })
    }

    /// The cached document, or a fresh collection when nothing is cached
    pub fn reopen<H>(
        &self,
        host: &mut H,
        config: &RunConfiguration,
        progress: &mut dyn ProgressSink,
    ) -> Result<String>
    where
        H: PageHost + ?Sized,
    {
        if let Some(document) = self.cached()? {
            log::info!("Reopening cached summary");
            return Ok(document);
        }

        log::info!("No cached summary; collecting");
        self.collect(host, config, progress).map(|outcome| outcome.document)
    }

    /// The cached document, if a cache is configured and holds one
    pub fn cached(&self) -> Result<Option<String>> {
        match &self.cache {
            Some(cache) => cache.load(),
            None => Ok(None),
        }
    }
}
