//! OpenAPI documentation.

use utoipa::OpenApi;

use crate::error;
use crate::handlers;
use reelpost_core::models;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Reelpost API",
        version = "0.1.0",
        description = "Upload videos to YouTube through the resumable upload protocol, with OAuth sign-in, progress polling and thumbnail candidates sampled from the video."
    ),
    paths(
        // Auth
        handlers::auth::start_auth,
        handlers::auth::auth_callback,
        handlers::auth::auth_status,
        handlers::auth::logout,
        // Uploads
        handlers::upload::create_upload_token,
        handlers::upload::upload_video,
        handlers::upload::get_upload_progress,
        // Frames
        handlers::frames::extract_frames,
        handlers::frames::get_frame,
    ),
    components(
        schemas(
            handlers::auth::AuthStatusResponse,
            models::UploadResponse,
            models::UploadTokenResponse,
            models::UploadProgressResponse,
            models::FrameDescriptor,
            models::ExtractFramesResponse,
            models::VideoCategory,
            error::ErrorResponse,
        )
    ),
    tags(
        (name = "auth", description = "OAuth sign-in against the Google account"),
        (name = "uploads", description = "Video upload and progress polling"),
        (name = "frames", description = "Thumbnail candidates sampled from a video")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_every_route() {
        let spec = ApiDoc::openapi();
        for path in [
            "/auth",
            "/auth/callback",
            "/auth/status",
            "/auth/logout",
            "/upload",
            "/upload/token",
            "/upload/progress/{upload_id}",
            "/extract-frames",
            "/frames/{filename}",
        ] {
            assert!(spec.paths.paths.contains_key(path), "missing {}", path);
        }
    }
}
