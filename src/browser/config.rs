use std::path::PathBuf;
use std::time::Duration;

/// Options for launching a new browser
#[derive(Debug, Clone)]
pub struct LaunchOptions {
    /// Run without a visible window
    pub headless: bool,

    pub window_width: u32,

    pub window_height: u32,

    /// Browser executable; auto-detected when `None`
    pub chrome_path: Option<PathBuf>,

    /// Profile directory. A signed-in profile is needed to see Codex tasks.
    pub user_data_dir: Option<PathBuf>,

    pub sandbox: bool,
}

impl Default for LaunchOptions {
    fn default() -> Self {
        Self {
            headless: true,
            window_width: 1280,
            window_height: 900,
            chrome_path: None,
            user_data_dir: None,
            sandbox: true,
        }
    }
}

impl LaunchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: set headless mode
    pub fn headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Builder method: set window size
    pub fn window_size(mut self, width: u32, height: u32) -> Self {
        self.window_width = width;
        self.window_height = height;
        self
    }

    /// Builder method: set the browser executable
    pub fn chrome_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.chrome_path = Some(path.into());
        self
    }

    /// Builder method: set the profile directory
    pub fn user_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.user_data_dir = Some(dir.into());
        self
    }

    /// Builder method: enable or disable the sandbox
    pub fn sandbox(mut self, sandbox: bool) -> Self {
        self.sandbox = sandbox;
        self
    }
}

/// Options for attaching to an already running browser
#[derive(Debug, Clone)]
pub struct ConnectionOptions {
    /// DevTools WebSocket URL, e.g. `ws://127.0.0.1:9222/devtools/browser/<id>`
    pub ws_url: String,

    /// Idle time after which the connection is dropped
    pub timeout: Duration,
}

impl ConnectionOptions {
    pub fn new(ws_url: impl Into<String>) -> Self {
        Self {
            ws_url: ws_url.into(),
            timeout: Duration::from_secs(60 * 60),
        }
    }

    /// Builder method: set idle timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_launch_options_builder() {
        let options = LaunchOptions::new()
            .headless(false)
            .window_size(800, 600)
            .user_data_dir("/tmp/profile")
            .sandbox(false);

        assert!(!options.headless);
        assert_eq!((options.window_width, options.window_height), (800, 600));
        assert_eq!(options.user_data_dir, Some(PathBuf::from("/tmp/profile")));
        assert!(options.chrome_path.is_none());
        assert!(!options.sandbox);
    }

    #[test]
    fn test_connection_options() {
        let options = ConnectionOptions::new("ws://127.0.0.1:9222/devtools/browser/abc").timeout(Duration::from_secs(5));

        assert_eq!(options.ws_url, "ws://127.0.0.1:9222/devtools/browser/abc");
        assert_eq!(options.timeout, Duration::from_secs(5));
    }
}
