//! Thumbnail candidate extraction and serving.

use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use crate::utils::upload::{field_filename, sanitize_filename, save_field, SavedUpload};
use axum::{
    extract::{Multipart, Path, State},
    http::header,
    response::IntoResponse,
    Json,
};
use reelpost_core::models::ExtractFramesResponse;
use reelpost_core::AppError;
use std::sync::Arc;

#[utoipa::path(
    post,
    path = "/extract-frames",
    tag = "frames",
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Frames sampled from the video", body = ExtractFramesResponse),
        (status = 400, description = "Missing or undecodable video", body = ErrorResponse),
        (status = 500, description = "Frame encoding or storage failed", body = ErrorResponse)
    )
)]
pub async fn extract_frames(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<ExtractFramesResponse>, HttpAppError> {
    let mut video: Option<SavedUpload> = None;

    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("video") || video.is_some() {
            continue;
        }
        if let Some(filename) = field_filename(&field) {
            video = Some(save_field(field, &state.dirs.uploads, "temp_", filename).await?);
        }
    }

    let video =
        video.ok_or_else(|| AppError::InvalidInput("No video file provided".to_string()))?;

    let frames = state
        .sampler
        .extract(video.path(), &state.dirs.frames)
        .await?;

    Ok(Json(ExtractFramesResponse {
        success: true,
        frames,
    }))
}

#[utoipa::path(
    get,
    path = "/frames/{filename}",
    tag = "frames",
    params(("filename" = String, Path, description = "Frame file name from /extract-frames")),
    responses(
        (status = 200, description = "JPEG frame (image/jpeg)"),
        (status = 400, description = "Invalid file name", body = ErrorResponse),
        (status = 404, description = "Frame not found", body = ErrorResponse)
    )
)]
pub async fn get_frame(
    State(state): State<Arc<AppState>>,
    Path(filename): Path<String>,
) -> Result<impl IntoResponse, HttpAppError> {
    let name = sanitize_filename(&filename)?;
    if name != filename {
        return Err(AppError::InvalidInput(format!("Invalid frame name: {}", filename)).into());
    }

    let data = state.dirs.frames.read(&name).await?;
    Ok(([(header::CONTENT_TYPE, "image/jpeg")], data))
}
