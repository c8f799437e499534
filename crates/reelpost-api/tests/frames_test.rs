//! Frame extraction and serving integration tests.
//!
//! Run with: `cargo test -p reelpost-api --test frames_test`

mod helpers;

use axum_test::multipart::{MultipartForm, Part};
use helpers::fakes::FakeDecoder;
use helpers::{setup_test_app, setup_test_app_with, TestOptions};

fn video_form(content: &[u8]) -> MultipartForm {
    let part = Part::bytes(bytes::Bytes::from(content.to_vec()))
        .file_name("clip.mov")
        .mime_type("video/quicktime");
    MultipartForm::new().add_part("video", part)
}

#[tokio::test]
async fn test_extract_frames_samples_middle_of_video() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .post("/extract-frames")
        .multipart(video_form(b"fake video bytes"))
        .await;

    assert_eq!(response.status_code(), 200);
    let body: serde_json::Value = response.json();
    assert_eq!(body["success"], true);

    let frames = body["frames"].as_array().unwrap();
    assert_eq!(frames.len(), 5);
    let timestamps: Vec<f64> = frames
        .iter()
        .map(|f| f["timestamp"].as_f64().unwrap())
        .collect();
    assert_eq!(timestamps, vec![1.0, 3.0, 5.0, 7.0, 9.0]);

    for (i, frame) in frames.iter().enumerate() {
        assert_eq!(frame["index"], i);
        let url = frame["url"].as_str().unwrap();
        assert!(url.starts_with("/frames/"));
        assert!(url.ends_with(&format!("_frame_{}.jpg", i)));
        assert!(std::path::Path::new(frame["path"].as_str().unwrap()).exists());
    }
}

#[tokio::test]
async fn test_extract_frames_accepts_filename_with_double_dots() {
    let app = setup_test_app().await;

    let part = Part::bytes(bytes::Bytes::from_static(b"fake video bytes"))
        .file_name("take..2.mov")
        .mime_type("video/quicktime");
    let form = MultipartForm::new().add_part("video", part);
    let response = app.client().post("/extract-frames").multipart(form).await;

    assert_eq!(response.status_code(), 200);
    let body: serde_json::Value = response.json();
    assert_eq!(body["frames"].as_array().unwrap().len(), 5);
}

#[tokio::test]
async fn test_extracted_frame_is_served_as_jpeg() {
    let app = setup_test_app().await;
    let client = app.client();

    let body: serde_json::Value = client
        .post("/extract-frames")
        .multipart(video_form(b"fake video bytes"))
        .await
        .json();
    let url = body["frames"][0]["url"].as_str().unwrap().to_string();

    let response = client.get(&url).await;
    assert_eq!(response.status_code(), 200);
    assert_eq!(
        response.header("content-type").to_str().unwrap(),
        "image/jpeg"
    );
    let bytes = response.as_bytes();
    assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
}

#[tokio::test]
async fn test_new_batch_replaces_previous_frames() {
    let app = setup_test_app().await;
    let client = app.client();

    let first: serde_json::Value = client
        .post("/extract-frames")
        .multipart(video_form(b"first"))
        .await
        .json();
    let second: serde_json::Value = client
        .post("/extract-frames")
        .multipart(video_form(b"second"))
        .await
        .json();

    let old_url = first["frames"][0]["url"].as_str().unwrap();
    let new_url = second["frames"][0]["url"].as_str().unwrap();
    assert_ne!(old_url, new_url);
    assert_eq!(client.get(old_url).await.status_code(), 404);
    assert_eq!(client.get(new_url).await.status_code(), 200);
}

#[tokio::test]
async fn test_extract_frames_without_video_is_rejected() {
    let app = setup_test_app().await;

    let form = MultipartForm::new().add_text("title", "nothing here");
    let response = app.client().post("/extract-frames").multipart(form).await;

    assert_eq!(response.status_code(), 400);
}

#[tokio::test]
async fn test_video_without_frames_is_rejected() {
    let app = setup_test_app_with(TestOptions {
        decoder: FakeDecoder::with_frames(0, Some(25.0)),
        ..TestOptions::default()
    })
    .await;

    let response = app
        .client()
        .post("/extract-frames")
        .multipart(video_form(b"empty stream"))
        .await;

    assert_eq!(response.status_code(), 400);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "FRAME_EXTRACTION_FAILED");
}

#[tokio::test]
async fn test_unreadable_video_is_rejected() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .post("/extract-frames")
        .multipart(video_form(b"garbage"))
        .await;

    assert_eq!(response.status_code(), 400);
}

#[tokio::test]
async fn test_temp_video_is_removed_after_extraction() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .post("/extract-frames")
        .multipart(video_form(b"fake video bytes"))
        .await;
    assert_eq!(response.status_code(), 200);

    let mut entries = tokio::fs::read_dir(app.state.dirs.uploads.path()).await.unwrap();
    while let Some(entry) = entries.next_entry().await.unwrap() {
        let name = entry.file_name().to_string_lossy().to_string();
        assert!(!name.starts_with("temp_"), "leftover temp video {}", name);
    }
}

#[tokio::test]
async fn test_unknown_frame_is_not_found() {
    let app = setup_test_app().await;
    let response = app.client().get("/frames/missing_frame_0.jpg").await;
    assert_eq!(response.status_code(), 404);
}

#[tokio::test]
async fn test_frame_path_traversal_is_rejected() {
    let app = setup_test_app().await;
    let response = app.client().get("/frames/..%2Ftoken.json").await;
    assert_eq!(response.status_code(), 400);
}
