use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument};

use crate::report::ParsedReport;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Stored report is not valid JSON: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Holds the single current report as one named JSON blob.
#[async_trait]
pub trait ReportStore: Send + Sync {
    /// Replace the stored report.
    async fn save(&self, report: &ParsedReport) -> Result<(), StoreError>;

    /// The stored report, or `None` when nothing has been saved.
    async fn load(&self) -> Result<Option<ParsedReport>, StoreError>;

    /// Remove the stored report. Returns whether there was one.
    async fn delete(&self) -> Result<bool, StoreError>;
}

/// JSON blob on the local filesystem at `<dir>/<key>`.
pub struct FileReportStore {
    path: PathBuf,
}

impl FileReportStore {
    pub async fn new(dir: impl Into<PathBuf>, key: &str) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).await?;
        let path = dir.join(key);
        info!("Report store at {}", path.display());
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl ReportStore for FileReportStore {
    #[instrument(skip(self, report), fields(path = %self.path.display()))]
    async fn save(&self, report: &ParsedReport) -> Result<(), StoreError> {
        let json = serde_json::to_vec(report)?;
        let temp = self.temp_path();

        // Readers never see a partial blob.
        fs::write(&temp, &json).await?;
        fs::rename(&temp, &self.path).await?;

        debug!("Saved report ({} bytes)", json.len());
        Ok(())
    }

    #[instrument(skip(self), fields(path = %self.path.display()))]
    async fn load(&self) -> Result<Option<ParsedReport>, StoreError> {
        let bytes = match fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No stored report");
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        Ok(Some(serde_json::from_slice(&bytes)?))
    }

    #[instrument(skip(self), fields(path = %self.path.display()))]
    async fn delete(&self) -> Result<bool, StoreError> {
        match fs::remove_file(&self.path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-process store; keeps the serialized blob so loads round-trip through JSON
/// like the file store does.
#[derive(Default)]
pub struct MemoryReportStore {
    blob: RwLock<Option<Vec<u8>>>,
}

impl MemoryReportStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ReportStore for MemoryReportStore {
    async fn save(&self, report: &ParsedReport) -> Result<(), StoreError> {
        let json = serde_json::to_vec(report)?;
        *self.blob.write().await = Some(json);
        Ok(())
    }

    async fn load(&self) -> Result<Option<ParsedReport>, StoreError> {
        match self.blob.read().await.as_deref() {
            Some(bytes) => Ok(Some(serde_json::from_slice(bytes)?)),
            None => Ok(None),
        }
    }

    async fn delete(&self) -> Result<bool, StoreError> {
        Ok(self.blob.write().await.take().is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::sample_report;

    #[tokio::test]
    async fn test_memory_store_round_trip() {
        let store = MemoryReportStore::new();
        assert!(store.load().await.unwrap().is_none());
        assert!(!store.delete().await.unwrap());

        let report = sample_report();
        store.save(&report).await.unwrap();
        assert_eq!(store.load().await.unwrap(), Some(report));

        assert!(store.delete().await.unwrap());
        assert!(store.load().await.unwrap().is_none());
    }
}
