//! codex-buddy command line
//!
//! Collects every version of the Codex task open in Chrome into one markdown
//! review document, printed to stdout or written to a file.

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use codex_buddy::browser::{BrowserSession, ConnectionOptions, LaunchOptions};
use codex_buddy::cache::SummaryCache;
use codex_buddy::collector::{Collector, CollectorOptions};
use codex_buddy::config::RunConfiguration;
use codex_buddy::progress::{ProgressSink, SilentProgress};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "codex-buddy")]
#[command(version)]
#[command(about = "Collect Codex task versions into a markdown review document", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Collect every version of the open task
    Collect {
        #[command(flatten)]
        browser: BrowserArgs,

        #[command(flatten)]
        run: RunArgs,

        /// Print the cached document when collection fails
        #[arg(long)]
        fallback_to_cache: bool,
    },

    /// Print the last collected document, collecting if nothing is cached
    Reopen {
        #[command(flatten)]
        browser: BrowserArgs,

        #[command(flatten)]
        run: RunArgs,
    },

    /// Print the default run configuration as JSON
    Defaults,
}

#[derive(Args)]
struct BrowserArgs {
    /// WebSocket endpoint of an already running browser
    #[arg(long, value_name = "URL")]
    ws_endpoint: Option<String>,

    /// Navigate to this task URL first
    #[arg(long, value_name = "URL")]
    url: Option<String>,

    /// Launch browser in headed mode (default: headless)
    #[arg(long, short = 'H')]
    headed: bool,

    /// Persistent browser profile directory
    #[arg(long, value_name = "DIR")]
    user_data_dir: Option<PathBuf>,

    /// Path to custom browser executable
    #[arg(long, value_name = "PATH")]
    executable_path: Option<PathBuf>,
}

#[derive(Args)]
struct RunArgs {
    /// Run configuration file (JSON)
    #[arg(long, short = 'c', value_name = "FILE")]
    config: Option<PathBuf>,

    /// Write the document here instead of stdout
    #[arg(long, short = 'o', value_name = "FILE")]
    output: Option<PathBuf>,

    /// Where the last document is cached
    #[arg(long, value_name = "FILE")]
    cache: Option<PathBuf>,

    /// Capture only the version currently on screen
    #[arg(long)]
    current_version_only: bool,

    /// Leave out the review questions
    #[arg(long)]
    no_review_questions: bool,

    /// Single-newline separators and unlabeled summaries
    #[arg(long)]
    compact: bool,

    /// Do not print progress stages
    #[arg(long, short = 'q')]
    quiet: bool,
}

impl RunArgs {
    /// The configuration file (or defaults) with command line overrides applied
    fn configuration(&self) -> anyhow::Result<RunConfiguration> {
        let mut config = match &self.config {
            Some(path) => RunConfiguration::load(path)?,
            None => RunConfiguration::default(),
        };

        if self.current_version_only {
            config.current_version_only = true;
        }
        if self.no_review_questions {
            config.include_review_questions = false;
        }
        if self.compact {
            config.compact_mode = true;
        }

        Ok(config)
    }

    fn progress(&self) -> Box<dyn ProgressSink> {
        if self.quiet {
            Box::new(SilentProgress)
        } else {
            Box::new(StderrProgress)
        }
    }

    fn cache(&self) -> SummaryCache {
        self.cache.clone().map(SummaryCache::new).unwrap_or_default()
    }

    fn emit(&self, document: &str) -> anyhow::Result<()> {
        match &self.output {
            Some(path) => {
                std::fs::write(path, document).with_context(|| format!("Failed to write {}", path.display()))?;
                eprintln!("Wrote {}", path.display());
            }
            None => print!("{}", document),
        }
        Ok(())
    }
}

/// Progress stages on stderr, keeping stdout for the document
struct StderrProgress;

impl ProgressSink for StderrProgress {
    fn stage(&mut self, message: &str) {
        eprintln!("[codex-buddy] {}", message);
    }
}

fn open_session(args: &BrowserArgs, fragment: &str) -> anyhow::Result<BrowserSession> {
    let mut session = match &args.ws_endpoint {
        Some(endpoint) => BrowserSession::connect(ConnectionOptions::new(endpoint.clone()))?,
        None => {
            let mut options = LaunchOptions::new().headless(!args.headed);
            if let Some(path) = &args.executable_path {
                options = options.chrome_path(path.clone());
            }
            if let Some(dir) = &args.user_data_dir {
                options = options.user_data_dir(dir.clone());
            }
            BrowserSession::launch(options)?
        }
    };

    if let Some(url) = &args.url {
        session.navigate(url)?;
    }

    if !session.focus_tab_matching(fragment)? {
        log::debug!("No task tab open; using the active tab");
    }

    Ok(session)
}

fn collect(browser: &BrowserArgs, run: &RunArgs, fallback_to_cache: bool) -> anyhow::Result<()> {
    let config = run.configuration()?;
    let cache = run.cache();
    let collector = Collector::new(CollectorOptions::default()).with_cache(cache.clone());
    let mut progress = run.progress();

    let result = open_session(browser, &collector.options().target_url_fragment).and_then(|mut session| {
        collector
            .collect(&mut session, &config, progress.as_mut())
            .map_err(anyhow::Error::from)
    });

    match result {
        Ok(outcome) => {
            eprintln!(
                "Collected {} version(s), {} file(s), ~{} tokens",
                outcome.report.records.len(),
                outcome.report.total_files(),
                outcome.tokens
            );
            for issue in &outcome.report.issues {
                eprintln!("warning: {}: {:?}", issue.label, issue.kind);
            }
            run.emit(&outcome.document)
        }
        Err(e) if fallback_to_cache => match cache.load()? {
            Some(document) => {
                eprintln!("error: {:#}", e);
                eprintln!("Falling back to the cached document");
                run.emit(&document)
            }
            None => Err(e),
        },
        Err(e) => Err(e),
    }
}

fn reopen(browser: &BrowserArgs, run: &RunArgs) -> anyhow::Result<()> {
    let cache = run.cache();
    if let Some(document) = cache.load()? {
        return run.emit(&document);
    }

    eprintln!("Nothing cached at {}; collecting", cache.path().display());
    collect(browser, run, false)
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let result = match &cli.command {
        Command::Collect {
            browser,
            run,
            fallback_to_cache,
        } => collect(browser, run, *fallback_to_cache),
        Command::Reopen { browser, run } => reopen(browser, run),
        Command::Defaults => RunConfiguration::default()
            .to_json()
            .map(|json| println!("{}", json))
            .map_err(anyhow::Error::from),
    };

    if let Err(e) = result {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}
