//! Durable record of links that have already been dispatched.
//!
//! The record is a plain text file with one link per line. It is only ever appended to,
//! so duplicates can appear in the file after an interrupted run; they collapse when
//! the record is loaded back into a set.

use crate::error::{Result, StoreError};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::debug;

/// Append-only processed-items record
#[derive(Clone, Debug)]
pub struct ProcessedStore {
    path: PathBuf,
}

impl ProcessedStore {
    /// Create a store backed by `path`; the file is created on first append
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every recorded link
    ///
    /// A record that does not exist yet is an empty set. Blank lines are ignored.
    ///
    /// # Errors
    /// Returns [`StoreError::ReadFailed`] for any other I/O failure
    pub async fn load(&self) -> Result<HashSet<String>> {
        let file = match tokio::fs::File::open(&self.path).await {
            Ok(f) => f,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no processed record yet");
                return Ok(HashSet::new());
            }
            Err(e) => return Err(self.read_failed(e)),
        };

        let mut processed = HashSet::new();
        let mut lines = BufReader::new(file).lines();
        while let Some(line) = lines.next_line().await.map_err(|e| self.read_failed(e))? {
            let link = line.trim_end_matches('\r');
            if !link.is_empty() {
                processed.insert(link.to_string());
            }
        }

        debug!(
            path = %self.path.display(),
            count = processed.len(),
            "loaded processed record"
        );
        Ok(processed)
    }

    /// Durably append one link
    ///
    /// The line is flushed and synced before returning, so a crash right after a
    /// dispatch cannot lose the mark.
    pub async fn append(&self, link: &str) -> Result<()> {
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| self.append_failed(link, e))?;

        let line = format!("{}\n", link);
        file.write_all(line.as_bytes())
            .await
            .map_err(|e| self.append_failed(link, e))?;
        file.flush().await.map_err(|e| self.append_failed(link, e))?;
        file.sync_data()
            .await
            .map_err(|e| self.append_failed(link, e))?;

        Ok(())
    }

    fn read_failed(&self, source: std::io::Error) -> crate::Error {
        StoreError::ReadFailed {
            path: self.path.clone(),
            source,
        }
        .into()
    }

    fn append_failed(&self, link: &str, source: std::io::Error) -> crate::Error {
        StoreError::AppendFailed {
            path: self.path.clone(),
            link: link.to_string(),
            source,
        }
        .into()
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_load_missing_record_is_empty() {
        let dir = tempdir().unwrap();
        let store = ProcessedStore::new(dir.path().join("processed_items.txt"));

        let processed = store.load().await.unwrap();
        assert!(processed.is_empty());
        assert!(!store.path().exists(), "load must not create the record");
    }

    #[tokio::test]
    async fn test_append_then_load() {
        let dir = tempdir().unwrap();
        let store = ProcessedStore::new(dir.path().join("processed_items.txt"));

        store.append("https://example.com/w/1").await.unwrap();
        store.append("https://example.com/w/2").await.unwrap();

        let processed = store.load().await.unwrap();
        assert_eq!(processed.len(), 2);
        assert!(processed.contains("https://example.com/w/1"));
        assert!(processed.contains("https://example.com/w/2"));

        let raw = std::fs::read_to_string(store.path()).unwrap();
        assert_eq!(raw, "https://example.com/w/1\nhttps://example.com/w/2\n");
    }

    #[tokio::test]
    async fn test_duplicate_lines_collapse_on_load() {
        let dir = tempdir().unwrap();
        let store = ProcessedStore::new(dir.path().join("processed_items.txt"));

        store.append("https://example.com/w/1").await.unwrap();
        store.append("https://example.com/w/1").await.unwrap();

        let raw = std::fs::read_to_string(store.path()).unwrap();
        assert_eq!(raw.lines().count(), 2, "duplicates are kept in the file");
        assert_eq!(store.load().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_load_ignores_blank_and_crlf_lines() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("processed_items.txt");
        std::fs::write(&path, "https://a.example/1\r\n\n\nhttps://a.example/2\n").unwrap();

        let processed = ProcessedStore::new(&path).load().await.unwrap();
        assert_eq!(processed.len(), 2);
        assert!(processed.contains("https://a.example/1"));
        assert!(processed.contains("https://a.example/2"));
    }

    #[tokio::test]
    async fn test_load_directory_is_read_error() {
        let dir = tempdir().unwrap();
        // A directory opens on unix but cannot be read line by line
        let store = ProcessedStore::new(dir.path());

        let err = store.load().await.unwrap_err();
        assert!(
            matches!(err, Error::Store(StoreError::ReadFailed { .. })),
            "got {err:?}"
        );
    }

    #[tokio::test]
    async fn test_append_into_missing_directory_fails() {
        let dir = tempdir().unwrap();
        let store = ProcessedStore::new(dir.path().join("missing").join("record.txt"));

        let err = store.append("https://example.com/w/1").await.unwrap_err();
        match err {
            Error::Store(StoreError::AppendFailed { link, .. }) => {
                assert_eq!(link, "https://example.com/w/1")
            }
            other => panic!("expected append failure, got {other:?}"),
        }
    }
}
