use crate::traits::{StorageError, StorageResult};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tempfile::NamedTempFile;
use tokio::fs;

/// A flat working directory on the local filesystem (uploads, extracted frames).
#[derive(Clone, Debug)]
pub struct LocalDirectory {
    base_path: PathBuf,
}

impl LocalDirectory {
    /// Open the directory, creating it when missing
    pub async fn new(base_path: impl Into<PathBuf>) -> StorageResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(LocalDirectory { base_path })
    }

    pub fn path(&self) -> &Path {
        &self.base_path
    }

    /// Map a plain file name to its path inside the directory.
    pub fn resolve(&self, name: &str) -> StorageResult<PathBuf> {
        if name.is_empty()
            || name.contains("..")
            || name.contains('/')
            || name.contains('\\')
            || name.contains('\0')
        {
            return Err(StorageError::InvalidKey(name.to_string()));
        }
        Ok(self.base_path.join(name))
    }

    /// Resolve a path that is claimed to live in this directory.
    ///
    /// Accepts either a bare file name or a path whose parent is this directory, and
    /// only succeeds for existing files.
    pub async fn resolve_member(&self, candidate: &str) -> StorageResult<PathBuf> {
        let candidate_path = Path::new(candidate);
        let name = candidate_path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| StorageError::InvalidKey(candidate.to_string()))?;
        let path = self.resolve(name)?;

        let has_parent = candidate_path
            .parent()
            .map(|p| !p.as_os_str().is_empty())
            .unwrap_or(false);
        if has_parent {
            let claimed = fs::canonicalize(candidate_path)
                .await
                .map_err(|_| StorageError::NotFound(candidate.to_string()))?;
            let actual = fs::canonicalize(&path)
                .await
                .map_err(|_| StorageError::NotFound(candidate.to_string()))?;
            if claimed != actual {
                return Err(StorageError::InvalidKey(
                    "Path resolves outside the directory".to_string(),
                ));
            }
        }

        match fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => Ok(path),
            _ => Err(StorageError::NotFound(name.to_string())),
        }
    }

    pub async fn read(&self, name: &str) -> StorageResult<Vec<u8>> {
        let path = self.resolve(name)?;
        match fs::read(&path).await {
            Ok(data) => Ok(data),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(name.to_string()))
            }
            Err(e) => Err(StorageError::IoError(e)),
        }
    }

    /// Create a uniquely named file that is removed when the handle is dropped.
    pub fn temp_file(&self, prefix: &str, suffix: &str) -> StorageResult<NamedTempFile> {
        tempfile::Builder::new()
            .prefix(prefix)
            .suffix(suffix)
            .tempfile_in(&self.base_path)
            .map_err(StorageError::IoError)
    }

    /// Delete every file with the given extension; returns how many were removed.
    pub async fn purge_extension(&self, extension: &str) -> StorageResult<usize> {
        let start = Instant::now();
        let mut removed = 0;

        let mut entries = match fs::read_dir(&self.base_path).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(StorageError::IoError(e)),
        };

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let matches = path
                .extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| ext.eq_ignore_ascii_case(extension))
                .unwrap_or(false);
            if !matches || !entry.file_type().await?.is_file() {
                continue;
            }
            match fs::remove_file(&path).await {
                Ok(()) => removed += 1,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(StorageError::IoError(e)),
            }
        }

        tracing::debug!(
            directory = %self.base_path.display(),
            extension = extension,
            removed = removed,
            duration_ms = start.elapsed().as_millis() as u64,
            "Purged files"
        );

        Ok(removed)
    }

    /// Remove a file, ignoring files that are already gone.
    pub async fn remove(&self, path: &Path) -> StorageResult<()> {
        match fs::remove_file(path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::IoError(e)),
        }
    }
}
