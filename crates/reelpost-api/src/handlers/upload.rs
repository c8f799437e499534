//! Video upload handlers and progress polling.

use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use crate::utils::upload::{field_filename, save_field, text_field, SavedUpload};
use axum::{
    extract::{Multipart, Path, State},
    Json,
};
use reelpost_core::constants::{FRAMES_URL_PREFIX, UNKNOWN_PROGRESS};
use reelpost_core::models::{
    CredentialRecord, UploadMetadata, UploadProgressResponse, UploadResponse,
    UploadTokenResponse, DEFAULT_LICENSE,
};
use reelpost_core::AppError;
use reelpost_infra::ProgressTracker;
use reelpost_services::ProgressCallback;
use std::sync::Arc;

/// Removes the progress entry when the request ends, whatever the outcome.
struct ProgressGuard {
    tracker: Arc<ProgressTracker>,
    token: String,
}

impl Drop for ProgressGuard {
    fn drop(&mut self) {
        self.tracker.finish(&self.token);
    }
}

#[derive(Debug, Default)]
struct UploadForm {
    video: Option<SavedUpload>,
    thumbnail: Option<SavedUpload>,
    selected_frame_path: Option<String>,
    upload_id: Option<String>,
    metadata: UploadMetadata,
}

async fn read_upload_form(
    state: &AppState,
    mut multipart: Multipart,
) -> Result<UploadForm, HttpAppError> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "video" => {
                if let Some(filename) = field_filename(&field) {
                    form.video =
                        Some(save_field(field, &state.dirs.uploads, "video_", filename).await?);
                }
            }
            "thumbnail" => {
                if let Some(filename) = field_filename(&field) {
                    form.thumbnail =
                        Some(save_field(field, &state.dirs.uploads, "thumb_", filename).await?);
                }
            }
            "selected_frame_path" => form.selected_frame_path = text_field(field).await?,
            "upload_id" => form.upload_id = text_field(field).await?,
            "title" => form.metadata.title = text_field(field).await?,
            "description" => form.metadata.description = text_field(field).await?,
            "tags" => form.metadata.tags = text_field(field).await?,
            "category_id" => form.metadata.category_id = text_field(field).await?,
            "privacy_status" => form.metadata.privacy_status = text_field(field).await?,
            "publish_at" => form.metadata.publish_at = text_field(field).await?,
            "default_language" => form.metadata.default_language = text_field(field).await?,
            "license" => form.metadata.license = text_field(field).await?,
            "made_for_kids" => {
                form.metadata.made_for_kids = text_field(field).await?.as_deref() == Some("true");
            }
            other => {
                tracing::debug!(field = %other, "Ignoring unknown form field");
            }
        }
    }

    if form.metadata.license.is_none() {
        form.metadata.license = Some(DEFAULT_LICENSE.to_string());
    }

    Ok(form)
}

/// Apply the uploaded thumbnail, or else the selected extracted frame.
///
/// Failures are reported back to the client instead of failing the upload.
async fn apply_thumbnail(
    state: &AppState,
    credential: &CredentialRecord,
    video_id: &str,
    thumbnail: Option<&SavedUpload>,
    selected_frame: Option<&str>,
) -> Option<String> {
    if let Some(thumbnail) = thumbnail {
        return state
            .uploader
            .set_thumbnail(credential, video_id, thumbnail.path())
            .await
            .err()
            .map(|e| e.to_string());
    }

    let selected = selected_frame?;
    let candidate = selected.strip_prefix(FRAMES_URL_PREFIX).unwrap_or(selected);
    let frame_path = match state.dirs.frames.resolve_member(candidate).await {
        Ok(path) => path,
        Err(e) => {
            tracing::warn!(selected_frame = %selected, error = %e, "Selected frame rejected");
            return Some(format!("Selected frame is not available: {}", e));
        }
    };

    let result = state
        .uploader
        .set_thumbnail(credential, video_id, &frame_path)
        .await;

    if let Err(e) = state.dirs.frames.remove(&frame_path).await {
        tracing::warn!(path = %frame_path.display(), error = %e, "Failed to remove used frame");
    }

    result.err().map(|e| e.to_string())
}

#[utoipa::path(
    post,
    path = "/upload/token",
    tag = "uploads",
    responses((status = 200, description = "Fresh upload id to poll progress with", body = UploadTokenResponse))
)]
pub async fn create_upload_token(State(state): State<Arc<AppState>>) -> Json<UploadTokenResponse> {
    Json(UploadTokenResponse {
        upload_id: state.progress.issue(),
    })
}

#[utoipa::path(
    post,
    path = "/upload",
    tag = "uploads",
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Video uploaded", body = UploadResponse),
        (status = 400, description = "Missing video file", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse),
        (status = 500, description = "Platform upload failed", body = ErrorResponse)
    )
)]
pub async fn upload_video(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<UploadResponse>, HttpAppError> {
    let credential = state.auth.get_credentials().await.ok_or_else(|| {
        AppError::Unauthorized("Not authenticated. Sign in before uploading.".to_string())
    })?;

    let form = read_upload_form(&state, multipart).await?;

    let token = match form.upload_id {
        Some(id) if state.progress.is_live(&id) => id,
        _ => state.progress.issue(),
    };
    let _guard = ProgressGuard {
        tracker: state.progress.clone(),
        token: token.clone(),
    };

    let video = form
        .video
        .ok_or_else(|| AppError::InvalidInput("No video file provided".to_string()))?;

    tracing::info!(
        upload_id = %token,
        filename = %video.original_filename,
        size_bytes = video.size,
        "Upload started"
    );

    let tracker = state.progress.clone();
    let progress_token = token.clone();
    let on_progress = move |percent: u8| tracker.update(&progress_token, percent);
    let callback: &ProgressCallback = &on_progress;

    let result = state
        .uploader
        .upload_video(&credential, video.path(), &form.metadata, Some(callback))
        .await?;

    let thumbnail_error = apply_thumbnail(
        &state,
        &credential,
        &result.video_id,
        form.thumbnail.as_ref(),
        form.selected_frame_path.as_deref(),
    )
    .await;

    tracing::info!(
        upload_id = %token,
        video_id = %result.video_id,
        thumbnail_error = ?thumbnail_error,
        "Upload finished"
    );

    Ok(Json(UploadResponse {
        success: true,
        upload_id: token,
        video_id: result.video_id,
        video_url: result.video_url,
        thumbnail_error,
    }))
}

#[utoipa::path(
    get,
    path = "/upload/progress/{upload_id}",
    tag = "uploads",
    params(("upload_id" = String, Path, description = "Upload id from /upload/token")),
    responses((status = 200, description = "Percentage, or -1 when unknown", body = UploadProgressResponse))
)]
pub async fn get_upload_progress(
    State(state): State<Arc<AppState>>,
    Path(upload_id): Path<String>,
) -> Json<UploadProgressResponse> {
    let progress = state
        .progress
        .get(&upload_id)
        .map(i32::from)
        .unwrap_or(UNKNOWN_PROGRESS);
    Json(UploadProgressResponse { progress })
}
