//! Progress reporting for a collection run
//!
//! A run reports coarse stages: scanning, found N, preparing N, capturing
//! `label (i of n)`, captured, formatting, finalizing. Sinks own whatever state
//! they need to present them.

/// Receives progress stages, in order, as a run advances
pub trait ProgressSink {
    fn stage(&mut self, message: &str);
}

/// Writes every stage to the log at info level
#[derive(Debug, Default, Clone, Copy)]
pub struct LogProgress;

impl ProgressSink for LogProgress {
    fn stage(&mut self, message: &str) {
        log::info!("{}", message);
    }
}

/// Discards every stage
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentProgress;

impl ProgressSink for SilentProgress {
    fn stage(&mut self, _message: &str) {}
}

/// Keeps every stage in memory
#[derive(Debug, Default, Clone)]
pub struct RecordedProgress {
    pub stages: Vec<String>,
}

impl ProgressSink for RecordedProgress {
    fn stage(&mut self, message: &str) {
        self.stages.push(message.to_string());
    }
}

/// Stage message for the capture of one version
pub fn capturing(label: &str, position: usize, total: usize) -> String {
    format!("Capturing {} ({} of {})", label, position, total)
}
