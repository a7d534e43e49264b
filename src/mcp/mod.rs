//! MCP (Model Context Protocol) server for review collection
//!
//! Exposes the collector as two tools: `collect_review` runs a fresh collection
//! on the open Codex task tab, `reopen_review` returns the last document.

pub mod handler;
pub use handler::ReviewServer;

use crate::config::RunConfiguration;
use crate::error::BrowserError;
use crate::progress::LogProgress;
use rmcp::{
    ErrorData as McpError,
    handler::server::wrapper::Parameters,
    model::{CallToolResult, Content},
    tool, tool_router,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Collect tool parameters. Unset fields keep the server's configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct CollectParams {
    /// Capture only the version currently on screen
    #[serde(default)]
    pub current_version_only: Option<bool>,
    /// Single-newline separators and unlabeled summaries
    #[serde(default)]
    pub compact_mode: Option<bool>,
    /// Append the numbered review questions
    #[serde(default)]
    pub include_review_questions: Option<bool>,
    /// Read each version's Testing section
    #[serde(default)]
    pub include_testing: Option<bool>,
}

impl CollectParams {
    /// Layer these parameters over a base configuration
    pub fn apply(&self, base: &RunConfiguration) -> RunConfiguration {
        let mut config = base.clone();

        if let Some(value) = self.current_version_only {
            config.current_version_only = value;
        }
        if let Some(value) = self.compact_mode {
            config.compact_mode = value;
        }
        if let Some(value) = self.include_review_questions {
            config.include_review_questions = value;
        }
        if let Some(value) = self.include_testing {
            config.include_testing = value;
        }

        config
    }
}

fn to_mcp_error(error: BrowserError) -> McpError {
    match error {
        BrowserError::NoTargetSurface(_) | BrowserError::ConfigInvalid(_) => {
            McpError::invalid_request(error.to_string(), None)
        }
        _ => McpError::internal_error(error.to_string(), None),
    }
}

#[tool_router]
impl ReviewServer {
    /// Collect every version of the open task
    #[tool(description = "Collect every version of the open Codex task into a markdown review document")]
    fn collect_review(&self, params: Parameters<CollectParams>) -> Result<CallToolResult, McpError> {
        let config = params.0.apply(self.base_config());
        let collector = self.collector();

        let mut session = self.session()?;
        session
            .focus_tab_matching(&collector.options().target_url_fragment)
            .map_err(to_mcp_error)?;

        let outcome = collector
            .collect(&mut *session, &config, &mut LogProgress)
            .map_err(to_mcp_error)?;

        let stats = serde_json::json!({
            "versions": outcome.report.records.len(),
            "files": outcome.report.total_files(),
            "estimatedTokens": outcome.tokens,
            "issues": outcome.report.issues,
        });

        Ok(CallToolResult::success(vec![
            Content::text(outcome.document),
            Content::text(stats.to_string()),
        ]))
    }

    /// Return the last collected document
    #[tool(description = "Return the last collected review document, collecting a fresh one if none is cached")]
    fn reopen_review(&self) -> Result<CallToolResult, McpError> {
        let collector = self.collector();

        if let Some(document) = collector.cached().map_err(to_mcp_error)? {
            return Ok(CallToolResult::success(vec![Content::text(document)]));
        }

        let mut session = self.session()?;
        session
            .focus_tab_matching(&collector.options().target_url_fragment)
            .map_err(to_mcp_error)?;

        let outcome = collector
            .collect(&mut *session, self.base_config(), &mut LogProgress)
            .map_err(to_mcp_error)?;

        Ok(CallToolResult::success(vec![Content::text(outcome.document)]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collect_params_override_only_set_fields() {
        let base = RunConfiguration {
            compact_mode: true,
            ..Default::default()
        };
        let params: CollectParams = serde_json::from_str(r#"{"current_version_only": true}"#).unwrap();

        let config = params.apply(&base);
        assert!(config.current_version_only);
        assert!(config.compact_mode);
        assert!(config.include_review_questions);
    }

    #[test]
    fn test_empty_params_keep_base() {
        let base = RunConfiguration::default();
        assert_eq!(CollectParams::default().apply(&base), base);
    }

    #[test]
    fn test_error_mapping() {
        let surface = to_mcp_error(BrowserError::NoTargetSurface("https://example.com".to_string()));
        assert!(surface.message.contains("Not on a Codex task page"));

        let lost = to_mcp_error(BrowserError::HostCommunication("tab closed".to_string()));
        assert!(lost.message.contains("Lost contact"));
    }
}
