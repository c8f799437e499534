use crate::traits::{CredentialStore, StorageError, StorageResult};
use async_trait::async_trait;
use reelpost_core::models::CredentialRecord;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tokio::fs;

/// Credential record persisted as a pretty-printed JSON file.
#[derive(Clone, Debug)]
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn staging_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl CredentialStore for FileCredentialStore {
    async fn load(&self) -> StorageResult<Option<CredentialRecord>> {
        let contents = match fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Failed to read credential file");
                return Ok(None);
            }
        };

        match serde_json::from_str(&contents) {
            Ok(record) => Ok(Some(record)),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Ignoring unparseable credential file");
                Ok(None)
            }
        }
    }

    async fn save(&self, record: &CredentialRecord) -> StorageResult<()> {
        let json = serde_json::to_string_pretty(record)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }

        // Readers never observe a partially written record.
        let staging = self.staging_path();
        fs::write(&staging, json).await?;
        fs::rename(&staging, &self.path).await?;

        tracing::debug!(path = %self.path.display(), "Credential record saved");
        Ok(())
    }

    async fn delete(&self) -> StorageResult<()> {
        match fs::remove_file(&self.path).await {
            Ok(()) => {
                tracing::info!(path = %self.path.display(), "Credential record deleted");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::IoError(e)),
        }
    }
}

/// Process-local credential store, for tests and ephemeral deployments.
#[derive(Debug, Default)]
pub struct InMemoryCredentialStore {
    record: Mutex<Option<CredentialRecord>>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_record(record: CredentialRecord) -> Self {
        Self {
            record: Mutex::new(Some(record)),
        }
    }

    fn slot(&self) -> std::sync::MutexGuard<'_, Option<CredentialRecord>> {
        match self.record.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn load(&self) -> StorageResult<Option<CredentialRecord>> {
        Ok(self.slot().clone())
    }

    async fn save(&self, record: &CredentialRecord) -> StorageResult<()> {
        *self.slot() = Some(record.clone());
        Ok(())
    }

    async fn delete(&self) -> StorageResult<()> {
        *self.slot() = None;
        Ok(())
    }
}
