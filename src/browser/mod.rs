//! Browser management
//!
//! Launching or attaching to Chrome/Chromium, and driving the Codex task tab
//! through the [`PageHost`](crate::driver::PageHost) seam.

pub mod config;
pub mod session;

pub use config::{ConnectionOptions, LaunchOptions};
pub use session::BrowserSession;
