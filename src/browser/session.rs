use crate::browser::config::{ConnectionOptions, LaunchOptions};
use crate::dom::{DomTree, ElementSelector};
use crate::driver::PageHost;
use crate::error::{BrowserError, Result};
use headless_chrome::{Browser, Tab};
use std::{ffi::OsStr, sync::Arc, time::Duration};

/// Browser session that manages a Chrome/Chromium instance.
///
/// The session drives one page at a time: the tab picked with
/// [`focus_tab_matching`](Self::focus_tab_matching), or the active tab until then.
pub struct BrowserSession {
    /// The underlying headless_chrome Browser instance
    browser: Browser,

    /// Tab the page operations go to
    focused: Option<Arc<Tab>>,
}

impl BrowserSession {
    /// Launch a new browser instance with the given options
    pub fn launch(options: LaunchOptions) -> Result<Self> {
        let mut launch_opts = headless_chrome::LaunchOptions::default();

        // Sites may refuse to render for automation-flagged browsers
        launch_opts.ignore_default_args.push(OsStr::new("--enable-automation"));
        launch_opts.args.push(OsStr::new("--disable-blink-features=AutomationControlled"));

        // A full collection can take minutes; the default 30s idle timeout is too short
        launch_opts.idle_browser_timeout = Duration::from_secs(60 * 60);

        launch_opts.headless = options.headless;
        launch_opts.window_size = Some((options.window_width, options.window_height));
        launch_opts.path = options.chrome_path;
        launch_opts.user_data_dir = options.user_data_dir;
        launch_opts.sandbox = options.sandbox;

        let browser = Browser::new(launch_opts).map_err(|e| BrowserError::LaunchFailed(e.to_string()))?;

        let tab = browser
            .new_tab()
            .map_err(|e| BrowserError::LaunchFailed(format!("Failed to create tab: {}", e)))?;

        Ok(Self {
            browser,
            focused: Some(tab),
        })
    }

    /// Connect to an existing browser instance via WebSocket
    pub fn connect(options: ConnectionOptions) -> Result<Self> {
        let browser = Browser::connect_with_timeout(options.ws_url, options.timeout)
            .map_err(|e| BrowserError::ConnectionFailed(e.to_string()))?;

        Ok(Self { browser, focused: None })
    }

    /// Get all tabs
    pub fn get_tabs(&self) -> Result<Vec<Arc<Tab>>> {
        let tabs = self
            .browser
            .get_tabs()
            .lock()
            .map_err(|e| BrowserError::TabOperationFailed(format!("Failed to get tabs: {}", e)))?
            .clone();

        Ok(tabs)
    }

    /// Get the currently active tab by checking the document visibility and focus state
    pub fn get_active_tab(&self) -> Result<Arc<Tab>> {
        let tabs = self.get_tabs()?;

        // First pass: visible and focused
        for tab in &tabs {
            match tab.evaluate("document.visibilityState === 'visible' && document.hasFocus()", false) {
                Ok(remote_object) => {
                    if remote_object.value.and_then(|v| v.as_bool()).unwrap_or(false) {
                        return Ok(tab.clone());
                    }
                }
                Err(e) => {
                    log::debug!("Failed to check tab status: {}", e);
                    continue;
                }
            }
        }

        // Second pass: visible only
        for tab in &tabs {
            if let Ok(remote_object) = tab.evaluate("document.visibilityState === 'visible'", false) {
                if remote_object.value.and_then(|v| v.as_bool()).unwrap_or(false) {
                    return Ok(tab.clone());
                }
            }
        }

        tabs.into_iter()
            .next()
            .ok_or_else(|| BrowserError::TabOperationFailed("No open tab found".to_string()))
    }

    /// The tab page operations go to
    pub fn tab(&self) -> Result<Arc<Tab>> {
        match &self.focused {
            Some(tab) => Ok(tab.clone()),
            None => self.get_active_tab(),
        }
    }

    /// Focus the first tab whose URL contains `fragment`.
    ///
    /// Returns `false` and leaves the focus unchanged when no tab matches.
    pub fn focus_tab_matching(&mut self, fragment: &str) -> Result<bool> {
        let found = self
            .get_tabs()?
            .into_iter()
            .find(|tab| tab.get_url().contains(fragment));

        match found {
            Some(tab) => {
                log::debug!("Using tab {}", tab.get_url());
                tab.activate()
                    .map_err(|e| BrowserError::TabOperationFailed(format!("Failed to activate tab: {}", e)))?;
                self.focused = Some(tab);
                Ok(true)
            }
            None => {
                log::debug!("No open tab matches {}", fragment);
                Ok(false)
            }
        }
    }

    /// Navigate the focused tab and wait for the page to load
    pub fn navigate(&self, url: &str) -> Result<()> {
        let tab = self.tab()?;

        tab.navigate_to(url)
            .map_err(|e| BrowserError::TabOperationFailed(format!("Failed to navigate to {}: {}", url, e)))?;
        tab.wait_until_navigated()
            .map_err(|e| BrowserError::TabOperationFailed(format!("Navigation timeout: {}", e)))?;

        Ok(())
    }

    /// Snapshot of the focused tab
    pub fn extract_dom(&self) -> Result<DomTree> {
        DomTree::from_tab(&self.tab()?)
    }
}

impl PageHost for BrowserSession {
    fn location(&self) -> Result<String> {
        Ok(self.tab()?.get_url())
    }

    fn content(&self) -> Result<String> {
        self.tab()?
            .get_content()
            .map_err(|e| BrowserError::HostCommunication(format!("Failed to read page content: {}", e)))
    }

    fn activate(&mut self, selector: &ElementSelector) -> Result<()> {
        let tab = self.tab()?;

        let element = tab.find_element(&selector.css_selector).map_err(|e| {
            BrowserError::ElementNotFound(format!("Element '{}' not found: {}", selector.css_selector, e))
        })?;

        element
            .click()
            .map_err(|e| BrowserError::ActivationFailed(format!("Failed to click '{}': {}", selector.css_selector, e)))?;

        Ok(())
    }

    fn pause(&mut self, duration: Duration) {
        std::thread::sleep(duration);
    }

    fn snapshot(&self) -> Result<DomTree> {
        self.extract_dom()
    }
}
