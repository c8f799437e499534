//! Common utilities for multipart upload handlers

use axum::extract::multipart::Field;
use reelpost_core::AppError;
use reelpost_storage::LocalDirectory;
use std::path::Path;
use tempfile::NamedTempFile;
use tokio::io::AsyncWriteExt;

use crate::error::HttpAppError;

/// Reduce a client filename to a safe basename.
///
/// Directory components are dropped, so `clips/../a.mp4` becomes `a.mp4`. Dots inside a
/// name are kept (`my..video.mp4` is fine); only a basename that is empty, `.` or `..`
/// is rejected.
pub fn sanitize_filename(filename: &str) -> Result<String, AppError> {
    const MAX_FILENAME_LENGTH: usize = 255;

    let basename = filename
        .rsplit(|c| c == '/' || c == '\\')
        .next()
        .unwrap_or_default()
        .trim();

    if matches!(basename, "" | "." | "..") {
        return Err(AppError::InvalidInput(format!(
            "Invalid filename: {:?}",
            filename
        )));
    }

    let sanitized: String = basename
        .chars()
        .take(MAX_FILENAME_LENGTH)
        .map(|c| {
            if c.is_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if sanitized.trim_matches(|c| c == '_' || c == '.').is_empty() {
        return Ok("file".to_string());
    }

    Ok(sanitized)
}

/// `.ext` of a client filename (lowercased, ASCII alphanumeric only), or "".
pub fn temp_suffix(filename: &str) -> String {
    Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty() && ext.len() <= 10)
        .filter(|ext| ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|ext| format!(".{}", ext.to_ascii_lowercase()))
        .unwrap_or_default()
}

/// A file part that was streamed to disk. The file is removed when this is dropped.
#[derive(Debug)]
pub struct SavedUpload {
    pub file: NamedTempFile,
    pub original_filename: String,
    pub size: u64,
}

impl SavedUpload {
    pub fn path(&self) -> &Path {
        self.file.path()
    }
}

/// Client filename of a file field, `None` when the browser sent an empty file input.
pub fn field_filename(field: &Field<'_>) -> Option<String> {
    field
        .file_name()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
}

/// Stream a multipart file field into a scoped temp file in `dir`.
pub async fn save_field(
    field: Field<'_>,
    dir: &LocalDirectory,
    prefix: &str,
    original_filename: String,
) -> Result<SavedUpload, HttpAppError> {
    let sanitized = sanitize_filename(&original_filename)?;
    let temp = dir.temp_file(prefix, &temp_suffix(&sanitized))?;

    let std_file = temp.reopen().map_err(AppError::from)?;
    let mut writer = tokio::io::BufWriter::new(tokio::fs::File::from_std(std_file));
    let mut size: u64 = 0;

    let mut field = field;
    while let Some(chunk) = field.chunk().await? {
        size += chunk.len() as u64;
        writer.write_all(&chunk).await.map_err(AppError::from)?;
    }
    writer.flush().await.map_err(AppError::from)?;

    tracing::debug!(
        filename = %sanitized,
        size_bytes = size,
        path = %temp.path().display(),
        "Multipart file saved"
    );

    Ok(SavedUpload {
        file: temp,
        original_filename: sanitized,
        size,
    })
}

/// Text value of a form field; blank values count as absent.
pub async fn text_field(field: Field<'_>) -> Result<Option<String>, HttpAppError> {
    let value = field.text().await?;
    Ok(Some(value).filter(|v| !v.trim().is_empty()))
}
