use crate::error::{BrowserError, Result};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Single-slot store for the last assembled document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryCache {
    path: PathBuf,
}

impl SummaryCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `codex-buddy/last-summary.md` under the system temp directory
    pub fn default_path() -> PathBuf {
        std::env::temp_dir().join("codex-buddy").join("last-summary.md")
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replace the cached document
    pub fn store(&self, document: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| BrowserError::Cache(format!("Failed to create {}: {}", parent.display(), e)))?;
        }

        std::fs::write(&self.path, document)
            .map_err(|e| BrowserError::Cache(format!("Failed to write {}: {}", self.path.display(), e)))?;

        log::debug!("Cached {} bytes at {}", document.len(), self.path.display());
        Ok(())
    }

    /// The cached document; `None` when nothing (or only an empty file) is cached
    pub fn load(&self) -> Result<Option<String>> {
        match std::fs::read_to_string(&self.path) {
            Ok(document) if document.is_empty() => Ok(None),
            Ok(document) => Ok(Some(document)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(BrowserError::Cache(format!("Failed to read {}: {}", self.path.display(), e))),
        }
    }
}

impl Default for SummaryCache {
    fn default() -> Self {
        Self::new(Self::default_path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let cache = SummaryCache::new(dir.path().join("nested").join("last.md"));

        cache.store("# Review\n").unwrap();
        assert_eq!(cache.load().unwrap(), Some("# Review\n".to_string()));

        cache.store("# Newer\n").unwrap();
        assert_eq!(cache.load().unwrap(), Some("# Newer\n".to_string()));
    }

    #[test]
    fn test_missing_and_empty_are_none() {
        let dir = tempfile::tempdir().unwrap();
        let cache = SummaryCache::new(dir.path().join("last.md"));
        assert_eq!(cache.load().unwrap(), None);

        cache.store("").unwrap();
        assert_eq!(cache.load().unwrap(), None);
    }

    #[test]
    fn test_unreadable_path_is_cache_error() {
        let dir = tempfile::tempdir().unwrap();
        // A directory cannot be read as a file
        let cache = SummaryCache::new(dir.path());

        assert!(matches!(cache.load(), Err(BrowserError::Cache(_))));
    }

    #[test]
    fn test_default_path() {
        assert!(SummaryCache::default().path().ends_with("codex-buddy/last-summary.md"));
    }
}
