//! codex-buddy MCP Server
//!
//! Serves review collection to MCP clients. The browser is launched (or attached
//! to) once at startup and shared by every connection.

use clap::{Parser, ValueEnum};
use codex_buddy::browser::{BrowserSession, ConnectionOptions, LaunchOptions};
use codex_buddy::cache::SummaryCache;
use codex_buddy::collector::Collector;
use codex_buddy::config::RunConfiguration;
use codex_buddy::mcp::ReviewServer;
use rmcp::{ServiceExt, transport::stdio};
use rmcp::transport::streamable_http_server::{StreamableHttpService, session::local::LocalSessionManager};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Transport {
    /// Standard input/output transport (default)
    Stdio,
    /// HTTP streamable transport
    Http,
}

#[derive(Parser)]
#[command(name = "codex-buddy-mcp")]
#[command(version)]
#[command(about = "Codex review collection MCP server", long_about = None)]
struct Cli {
    /// Launch browser in headed mode (default: headless)
    #[arg(long, short = 'H')]
    headed: bool,

    /// Path to custom browser executable
    #[arg(long, value_name = "PATH")]
    executable_path: Option<PathBuf>,

    /// WebSocket endpoint of an already running browser
    #[arg(long, value_name = "URL")]
    ws_endpoint: Option<String>,

    /// Persistent browser profile directory
    #[arg(long, value_name = "DIR")]
    user_data_dir: Option<PathBuf>,

    /// Run configuration file (JSON)
    #[arg(long, short = 'c', value_name = "FILE")]
    config: Option<PathBuf>,

    /// Where the last document is cached
    #[arg(long, value_name = "FILE")]
    cache: Option<PathBuf>,

    /// Transport type to use
    #[arg(long, short = 't', value_enum, default_value = "stdio")]
    transport: Transport,

    /// Port for HTTP transport (default: 3000)
    #[arg(long, short = 'p', default_value = "3000")]
    port: u16,

    /// HTTP streamable endpoint path (default: /mcp)
    #[arg(long, default_value = "/mcp")]
    http_path: String,
}

fn open_session(cli: &Cli) -> codex_buddy::Result<BrowserSession> {
    if let Some(endpoint) = &cli.ws_endpoint {
        eprintln!("WebSocket endpoint: {}", endpoint);
        return BrowserSession::connect(ConnectionOptions::new(endpoint.clone()));
    }

    let mut options = LaunchOptions::new().headless(!cli.headed);
    if let Some(path) = &cli.executable_path {
        eprintln!("Browser executable: {}", path.display());
        options = options.chrome_path(path.clone());
    }
    if let Some(dir) = &cli.user_data_dir {
        eprintln!("User data directory: {}", dir.display());
        options = options.user_data_dir(dir.clone());
    }

    eprintln!("Browser mode: {}", if options.headless { "headless" } else { "headed" });
    BrowserSession::launch(options)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    eprintln!("codex-buddy MCP Server v{}", env!("CARGO_PKG_VERSION"));

    let config = match &cli.config {
        Some(path) => RunConfiguration::load(path)?,
        None => RunConfiguration::default(),
    };
    let cache = cli.cache.clone().map(SummaryCache::new).unwrap_or_default();
    let session = open_session(&cli).map_err(|e| format!("Failed to create browser session: {}", e))?;

    let server = ReviewServer::new(session, Collector::default().with_cache(cache), config);

    match cli.transport {
        Transport::Stdio => {
            eprintln!("Transport: stdio");
            eprintln!("Ready to accept MCP connections via stdio");
            let running = server.serve(stdio()).await?;
            let quit_reason = running.waiting().await?;
            eprintln!("Server quit with reason: {:?}", quit_reason);
            // Give a small delay for destructors to complete
            tokio::time::sleep(tokio::time::Duration::from_millis(200)).await;
        }
        Transport::Http => {
            eprintln!("Transport: HTTP streamable");

            let bind_addr = format!("127.0.0.1:{}", cli.port);

            // Every connection shares the one browser session
            let service_factory = move || Ok(server.clone());

            let http_service = StreamableHttpService::new(
                service_factory,
                LocalSessionManager::default().into(),
                Default::default(),
            );

            let router = axum::Router::new().nest_service(&cli.http_path, http_service);

            eprintln!("Ready to accept MCP connections at http://{}{}", bind_addr, cli.http_path);

            let listener = tokio::net::TcpListener::bind(bind_addr).await?;
            axum::serve(listener, router).await?;
        }
    }

    Ok(())
}
