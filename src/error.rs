use thiserror::Error;

/// Errors raised while driving the browser or collecting a review
#[derive(Debug, Error)]
pub enum BrowserError {
    /// Failed to launch the browser process
    #[error("Failed to launch browser: {0}")]
    LaunchFailed(String),

    /// Failed to connect to a running browser
    #[error("Failed to connect to browser: {0}")]
    ConnectionFailed(String),

    /// A tab could not be listed, created, or activated
    #[error("Tab operation failed: {0}")]
    TabOperationFailed(String),

    /// The active page is not a supported task page
    #[error("Not on a Codex task page: {0}")]
    NoTargetSurface(String),

    /// The round-trip to the page failed (tab closed, devtools connection lost, ...)
    #[error("Lost contact with the page: {0}")]
    HostCommunication(String),

    /// A version control could not be located in the live page
    #[error("Element not found: {0}")]
    ElementNotFound(String),

    /// A version control was found but could not be activated
    #[error("Failed to activate control: {0}")]
    ActivationFailed(String),

    /// The run was aborted between two version captures
    #[error("Collection cancelled after {captured} version(s)")]
    Cancelled { captured: usize },

    /// The configuration file could not be read or parsed
    #[error("Invalid configuration: {0}")]
    ConfigInvalid(String),

    /// The summary cache could not be read or written
    #[error("Summary cache error: {0}")]
    Cache(String),
}

impl BrowserError {
    /// Whether this error ends the whole run.
    ///
    /// Control-level failures only cost the version they happened on; everything
    /// else means there is no page (or no browser) left to talk to.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, BrowserError::ElementNotFound(_) | BrowserError::ActivationFailed(_))
    }
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, BrowserError>;
