//! Upload and progress integration tests.
//!
//! Run with: `cargo test -p reelpost-api --test upload_test`

mod helpers;

use axum_test::multipart::{MultipartForm, Part};
use helpers::fakes::{FakePlatform, FAKE_VIDEO_ID};
use helpers::{setup_test_app, setup_test_app_with, TestOptions};

fn video_part() -> Part {
    Part::bytes(bytes::Bytes::from(vec![7u8; 4096]))
        .file_name("holiday clip.mp4")
        .mime_type("video/mp4")
}

fn image_part(filename: &str) -> Part {
    Part::bytes(bytes::Bytes::from(vec![0xFFu8; 512]))
        .file_name(filename)
        .mime_type("image/jpeg")
}

async fn progress_of(server: &axum_test::TestServer, upload_id: &str) -> i64 {
    let body: serde_json::Value = server
        .get(&format!("/upload/progress/{}", upload_id))
        .await
        .json();
    body["progress"].as_i64().unwrap()
}

#[tokio::test]
async fn test_upload_requires_authentication() {
    let app = setup_test_app_with(TestOptions {
        signed_in: false,
        ..TestOptions::default()
    })
    .await;

    let form = MultipartForm::new().add_part("video", video_part());
    let response = app.client().post("/upload").multipart(form).await;

    assert_eq!(response.status_code(), 401);
    let body: serde_json::Value = response.json();
    assert!(body["error"].is_string());
    assert!(app.platform.uploaded_resources().is_empty());
}

#[tokio::test]
async fn test_upload_without_video_is_rejected() {
    let app = setup_test_app().await;
    let client = app.client();

    let token: serde_json::Value = client.post("/upload/token").await.json();
    let upload_id = token["upload_id"].as_str().unwrap().to_string();

    let form = MultipartForm::new()
        .add_text("title", "No file")
        .add_text("upload_id", upload_id.clone());
    let response = client.post("/upload").multipart(form).await;

    assert_eq!(response.status_code(), 400);
    assert_eq!(progress_of(client, &upload_id).await, -1);
}

#[tokio::test]
async fn test_upload_with_empty_filename_is_rejected() {
    let app = setup_test_app().await;

    let part = Part::bytes(bytes::Bytes::new()).file_name("");
    let form = MultipartForm::new().add_part("video", part);
    let response = app.client().post("/upload").multipart(form).await;

    assert_eq!(response.status_code(), 400);
}

#[tokio::test]
async fn test_upload_accepts_filename_with_double_dots() {
    let app = setup_test_app().await;

    let part = Part::bytes(bytes::Bytes::from(vec![7u8; 1024]))
        .file_name("my..video.mp4")
        .mime_type("video/mp4");
    let form = MultipartForm::new().add_part("video", part);
    let response = app.client().post("/upload").multipart(form).await;

    assert_eq!(response.status_code(), 200);
    assert_eq!(app.platform.uploaded_resources().len(), 1);
}

#[tokio::test]
async fn test_upload_with_dot_segment_filename_is_rejected() {
    let app = setup_test_app().await;

    let part = Part::bytes(bytes::Bytes::from(vec![7u8; 1024])).file_name("clips/..");
    let form = MultipartForm::new().add_part("video", part);
    let response = app.client().post("/upload").multipart(form).await;

    assert_eq!(response.status_code(), 400);
    assert!(app.platform.uploaded_resources().is_empty());
}

#[tokio::test]
async fn test_upload_returns_watch_url_and_applies_defaults() {
    let app = setup_test_app().await;

    let form = MultipartForm::new()
        .add_part("video", video_part())
        .add_text("tags", "travel, ,sea")
        .add_text("made_for_kids", "true");
    let response = app.client().post("/upload").multipart(form).await;

    assert_eq!(response.status_code(), 200);
    let body: serde_json::Value = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["video_id"], FAKE_VIDEO_ID);
    assert_eq!(
        body["video_url"],
        format!("https://www.youtube.com/watch?v={}", FAKE_VIDEO_ID)
    );
    assert!(body["thumbnail_error"].is_null());

    let resources = app.platform.uploaded_resources();
    assert_eq!(resources.len(), 1);
    let resource = &resources[0];
    assert_eq!(resource.snippet.title, "Untitled");
    assert_eq!(resource.snippet.category_id, "22");
    assert_eq!(
        resource.snippet.tags,
        Some(vec!["travel".to_string(), "sea".to_string()])
    );
    assert_eq!(resource.status.privacy_status, "private");
    assert!(resource.status.self_declared_made_for_kids);
    assert_eq!(resource.status.license.as_deref(), Some("youtube"));
}

#[tokio::test]
async fn test_scheduled_upload_is_forced_private() {
    let app = setup_test_app().await;

    let form = MultipartForm::new()
        .add_part("video", video_part())
        .add_text("title", "Launch")
        .add_text("privacy_status", "public")
        .add_text("publish_at", "2030-01-01T09:00:00Z");
    let response = app.client().post("/upload").multipart(form).await;

    assert_eq!(response.status_code(), 200);
    let resource = &app.platform.uploaded_resources()[0];
    assert_eq!(resource.snippet.title, "Launch");
    assert_eq!(resource.status.privacy_status, "private");
    assert_eq!(
        resource.status.publish_at.as_deref(),
        Some("2030-01-01T09:00:00Z")
    );
}

#[tokio::test]
async fn test_issued_token_is_reused_and_cleared() {
    let app = setup_test_app().await;
    let client = app.client();

    let token: serde_json::Value = client.post("/upload/token").await.json();
    let upload_id = token["upload_id"].as_str().unwrap().to_string();
    assert_eq!(progress_of(client, &upload_id).await, 0);

    let form = MultipartForm::new()
        .add_part("video", video_part())
        .add_text("upload_id", upload_id.clone());
    let response = client.post("/upload").multipart(form).await;

    assert_eq!(response.status_code(), 200);
    let body: serde_json::Value = response.json();
    assert_eq!(body["upload_id"], upload_id.as_str());
    assert_eq!(progress_of(client, &upload_id).await, -1);
    assert!(app.state.progress.is_empty());
}

#[tokio::test]
async fn test_unknown_token_is_replaced() {
    let app = setup_test_app().await;

    let form = MultipartForm::new()
        .add_part("video", video_part())
        .add_text("upload_id", "not-issued-by-server");
    let response = app.client().post("/upload").multipart(form).await;

    assert_eq!(response.status_code(), 200);
    let body: serde_json::Value = response.json();
    assert_ne!(body["upload_id"], "not-issued-by-server");
}

#[tokio::test]
async fn test_platform_failure_returns_500_and_clears_progress() {
    let app = setup_test_app_with(TestOptions {
        platform: FakePlatform::failing_upload(),
        ..TestOptions::default()
    })
    .await;
    let client = app.client();

    let token: serde_json::Value = client.post("/upload/token").await.json();
    let upload_id = token["upload_id"].as_str().unwrap().to_string();

    let form = MultipartForm::new()
        .add_part("video", video_part())
        .add_text("upload_id", upload_id.clone());
    let response = client.post("/upload").multipart(form).await;

    assert_eq!(response.status_code(), 500);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "PLATFORM_ERROR");
    assert!(body["error"]
        .as_str()
        .unwrap()
        .contains("exceeded the number of videos"));
    assert_eq!(progress_of(client, &upload_id).await, -1);
}

#[tokio::test]
async fn test_thumbnail_file_is_sent_with_mime_type() {
    let app = setup_test_app().await;

    let form = MultipartForm::new()
        .add_part("video", video_part())
        .add_part("thumbnail", image_part("cover.JPG"));
    let response = app.client().post("/upload").multipart(form).await;

    assert_eq!(response.status_code(), 200);
    let calls = app.platform.thumbnail_calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].video_id, FAKE_VIDEO_ID);
    assert_eq!(calls[0].mime_type, "image/jpeg");
    assert_eq!(calls[0].len, 512);
}

#[tokio::test]
async fn test_thumbnail_failure_is_reported_not_fatal() {
    let app = setup_test_app_with(TestOptions {
        platform: FakePlatform::failing_thumbnail(),
        ..TestOptions::default()
    })
    .await;

    let form = MultipartForm::new()
        .add_part("video", video_part())
        .add_part("thumbnail", image_part("cover.png"));
    let response = app.client().post("/upload").multipart(form).await;

    assert_eq!(response.status_code(), 200);
    let body: serde_json::Value = response.json();
    assert_eq!(body["video_id"], FAKE_VIDEO_ID);
    assert!(body["thumbnail_error"]
        .as_str()
        .unwrap()
        .contains("custom video thumbnails"));
}

#[tokio::test]
async fn test_selected_frame_is_used_and_removed() {
    let app = setup_test_app().await;
    let frame = app.state.dirs.frames.path().join("abcd1234_frame_2.jpg");
    tokio::fs::write(&frame, vec![0xFFu8; 256]).await.unwrap();

    let form = MultipartForm::new()
        .add_part("video", video_part())
        .add_text("selected_frame_path", "/frames/abcd1234_frame_2.jpg");
    let response = app.client().post("/upload").multipart(form).await;

    assert_eq!(response.status_code(), 200);
    let body: serde_json::Value = response.json();
    assert!(body["thumbnail_error"].is_null());

    let calls = app.platform.thumbnail_calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].mime_type, "image/jpeg");
    assert!(!frame.exists());
}

#[tokio::test]
async fn test_uploaded_thumbnail_wins_over_selected_frame() {
    let app = setup_test_app().await;
    let frame = app.state.dirs.frames.path().join("abcd1234_frame_0.jpg");
    tokio::fs::write(&frame, vec![0xFFu8; 256]).await.unwrap();

    let form = MultipartForm::new()
        .add_part("video", video_part())
        .add_part("thumbnail", image_part("cover.png"))
        .add_text("selected_frame_path", "/frames/abcd1234_frame_0.jpg");
    let response = app.client().post("/upload").multipart(form).await;

    assert_eq!(response.status_code(), 200);
    let calls = app.platform.thumbnail_calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].mime_type, "image/png");
    assert!(frame.exists());
}

#[tokio::test]
async fn test_selected_frame_outside_frames_dir_is_rejected() {
    let app = setup_test_app().await;
    let outside = app.state.dirs.uploads.path().join("secret.jpg");
    tokio::fs::write(&outside, b"not a frame").await.unwrap();

    let form = MultipartForm::new()
        .add_part("video", video_part())
        .add_text("selected_frame_path", outside.display().to_string());
    let response = app.client().post("/upload").multipart(form).await;

    assert_eq!(response.status_code(), 200);
    let body: serde_json::Value = response.json();
    assert!(body["thumbnail_error"].is_string());
    assert!(app.platform.thumbnail_calls().is_empty());
    assert!(outside.exists());
}

#[tokio::test]
async fn test_temp_files_are_removed_after_upload() {
    let app = setup_test_app().await;

    let form = MultipartForm::new()
        .add_part("video", video_part())
        .add_part("thumbnail", image_part("cover.jpg"));
    let response = app.client().post("/upload").multipart(form).await;
    assert_eq!(response.status_code(), 200);

    let mut entries = tokio::fs::read_dir(app.state.dirs.uploads.path()).await.unwrap();
    while let Some(entry) = entries.next_entry().await.unwrap() {
        assert!(
            entry.file_type().await.unwrap().is_dir(),
            "leftover file {:?}",
            entry.path()
        );
    }
}

#[tokio::test]
async fn test_progress_of_unknown_token() {
    let app = setup_test_app().await;
    assert_eq!(progress_of(app.client(), "no-such-upload").await, -1);
}
