use crate::browser::{BrowserSession, ConnectionOptions, LaunchOptions};
use crate::cache::SummaryCache;
use crate::collector::Collector;
use crate::config::RunConfiguration;
use crate::error;
use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::tool::ToolRouter,
    model::{Implementation, ServerCapabilities, ServerInfo},
    tool_handler,
};
use std::sync::{Arc, Mutex, MutexGuard};

/// MCP server exposing review collection over one browser session
#[derive(Clone)]
pub struct ReviewServer {
    session: Arc<Mutex<BrowserSession>>,
    collector: Arc<Collector>,
    config: Arc<RunConfiguration>,
    tool_router: ToolRouter<Self>,
}

impl ReviewServer {
    pub fn new(session: BrowserSession, collector: Collector, config: RunConfiguration) -> Self {
        Self {
            session: Arc::new(Mutex::new(session)),
            collector: Arc::new(collector),
            config: Arc::new(config),
            tool_router: Self::tool_router(),
        }
    }

    /// Launch a browser and serve with default collector settings
    pub fn with_options(options: LaunchOptions) -> error::Result<Self> {
        let session = BrowserSession::launch(options)?;
        Ok(Self::new(session, default_collector(), RunConfiguration::default()))
    }

    /// Attach to a running browser and serve with default collector settings
    pub fn connect(options: ConnectionOptions) -> error::Result<Self> {
        let session = BrowserSession::connect(options)?;
        Ok(Self::new(session, default_collector(), RunConfiguration::default()))
    }

    pub(crate) fn session(&self) -> std::result::Result<MutexGuard<'_, BrowserSession>, McpError> {
        self.session
            .lock()
            .map_err(|e| McpError::internal_error(format!("Browser session unavailable: {}", e), None))
    }

    pub(crate) fn collector(&self) -> &Collector {
        &self.collector
    }

    /// Configuration the tool parameters are layered over
    pub(crate) fn base_config(&self) -> &RunConfiguration {
        &self.config
    }
}

/// Collector caching into the default cache location
fn default_collector() -> Collector {
    Collector::default().with_cache(SummaryCache::default())
}

#[tool_handler]
impl ServerHandler for ReviewServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "codex-buddy".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                ..Default::default()
            },
            instructions: Some(
                "Collects every version of the Codex task open in the browser (task, summary, \
                 testing notes and file diffs) into one markdown review document. \
                 Use collect_review for a fresh capture and reopen_review for the last one."
                    .to_string(),
            ),
            ..Default::default()
        }
    }
}
