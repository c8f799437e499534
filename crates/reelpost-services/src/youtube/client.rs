//! YouTube Data API v3 client for resumable uploads and thumbnails.

use async_trait::async_trait;
use bytes::Bytes;
use reelpost_core::models::VideoResource;
use reqwest::header::{CONTENT_RANGE, CONTENT_TYPE, LOCATION, RANGE};
use reqwest::StatusCode;
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::time::Duration;

use super::{ChunkStatus, PlatformError, VideoPlatform};

const UPLOAD_CONTENT_TYPE: &str = "video/*";

pub struct YouTubeClient {
    http_client: reqwest::Client,
    api_base: String,
}

impl Debug for YouTubeClient {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("YouTubeClient")
            .field("api_base", &self.api_base)
            .finish()
    }
}

impl YouTubeClient {
    /// `api_base` is the Google APIs origin, e.g. `https://www.googleapis.com`.
    pub fn new(api_base: impl Into<String>) -> Result<Self, PlatformError> {
        // A 308 is the protocol's "resume incomplete" answer, not a redirect.
        let http_client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .connect_timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            http_client,
            api_base: api_base.into().trim_end_matches('/').to_string(),
        })
    }

    fn videos_url(&self) -> String {
        format!(
            "{}/upload/youtube/v3/videos?uploadType=resumable&part=snippet,status",
            self.api_base
        )
    }

    fn thumbnails_url(&self, video_id: &str) -> String {
        format!(
            "{}/upload/youtube/v3/thumbnails/set?videoId={}",
            self.api_base,
            urlencoding::encode(video_id)
        )
    }
}

/// `Range: bytes=0-N` from a 308 response, as the next offset (N + 1).
pub(crate) fn parse_range_header(value: &str) -> Result<Option<u64>, PlatformError> {
    let last = value
        .trim()
        .strip_prefix("bytes=")
        .and_then(|range| range.split_once('-'))
        .and_then(|(_, last)| last.trim().parse::<u64>().ok());
    match last {
        None => Ok(None),
        Some(last) => last.checked_add(1).map(Some).ok_or_else(|| {
            PlatformError::Protocol(format!("Range header out of bounds: {}", value))
        }),
    }
}

/// Pull `error.message` out of a Google error body, falling back to the raw text.
pub(crate) fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|json| {
            json.get("error")
                .and_then(|e| e.get("message"))
                .and_then(|m| m.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| {
            if body.trim().is_empty() {
                "empty response body".to_string()
            } else {
                body.trim().to_string()
            }
        })
}

async fn api_error(response: reqwest::Response) -> PlatformError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    PlatformError::Api {
        status,
        message: error_message(&body),
    }
}

#[async_trait]
impl VideoPlatform for YouTubeClient {
    #[tracing::instrument(skip(self, access_token, resource))]
    async fn begin_upload(
        &self,
        access_token: &str,
        resource: &VideoResource,
        total_bytes: u64,
    ) -> Result<String, PlatformError> {
        let response = self
            .http_client
            .post(self.videos_url())
            .bearer_auth(access_token)
            .header("X-Upload-Content-Length", total_bytes.to_string())
            .header("X-Upload-Content-Type", UPLOAD_CONTENT_TYPE)
            .json(resource)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(api_error(response).await);
        }

        response
            .headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .ok_or_else(|| {
                PlatformError::Protocol("upload session response has no Location header".to_string())
            })
    }

    #[tracing::instrument(skip(self, access_token, session_url, chunk), fields(len = chunk.len()))]
    async fn upload_chunk(
        &self,
        access_token: &str,
        session_url: &str,
        offset: u64,
        total_bytes: u64,
        chunk: Bytes,
    ) -> Result<ChunkStatus, PlatformError> {
        if chunk.is_empty() {
            return Err(PlatformError::Protocol("refusing to send an empty chunk".to_string()));
        }
        let last = offset + chunk.len() as u64 - 1;

        let response = self
            .http_client
            .put(session_url)
            .bearer_auth(access_token)
            .header(CONTENT_RANGE, format!("bytes {}-{}/{}", offset, last, total_bytes))
            .body(chunk)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::PERMANENT_REDIRECT {
            let range = response.headers().get(RANGE).and_then(|v| v.to_str().ok());
            let bytes_received = match range {
                Some(range) => parse_range_header(range)?.unwrap_or(0),
                None => 0,
            };
            return Ok(ChunkStatus::Incomplete { bytes_received });
        }

        if status == StatusCode::OK || status == StatusCode::CREATED {
            let body = response.json::<serde_json::Value>().await?;
            return Ok(ChunkStatus::Complete(body));
        }

        Err(api_error(response).await)
    }

    #[tracing::instrument(skip(self, access_token, image), fields(len = image.len()))]
    async fn set_thumbnail(
        &self,
        access_token: &str,
        video_id: &str,
        mime_type: &str,
        image: Bytes,
    ) -> Result<serde_json::Value, PlatformError> {
        let response = self
            .http_client
            .post(self.thumbnails_url(video_id))
            .bearer_auth(access_token)
            .header(CONTENT_TYPE, mime_type)
            .body(image)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(api_error(response).await);
        }

        Ok(response.json::<serde_json::Value>().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_range_header() {
        assert_eq!(parse_range_header("bytes=0-10485759").unwrap(), Some(10485760));
        assert_eq!(parse_range_header("bytes=0-0").unwrap(), Some(1));
        assert_eq!(parse_range_header("items=0-5").unwrap(), None);
        assert_eq!(parse_range_header("bytes=garbage").unwrap(), None);
    }

    #[test]
    fn test_parse_range_header_rejects_overflowing_offset() {
        let err = parse_range_header("bytes=0-18446744073709551615").unwrap_err();
        assert!(matches!(err, PlatformError::Protocol(_)));
    }

    #[test]
    fn test_error_message_from_google_body() {
        let body = r#"{"error":{"code":403,"message":"The user has exceeded the number of videos they may upload.","errors":[{"reason":"uploadLimitExceeded"}]}}"#;
        assert_eq!(
            error_message(body),
            "The user has exceeded the number of videos they may upload."
        );
        assert_eq!(error_message("Bad Gateway"), "Bad Gateway");
        assert_eq!(error_message("  "), "empty response body");
    }

    #[test]
    fn test_urls() {
        let client = YouTubeClient::new("https://www.googleapis.com/").unwrap();
        assert_eq!(
            client.videos_url(),
            "https://www.googleapis.com/upload/youtube/v3/videos?uploadType=resumable&part=snippet,status"
        );
        assert_eq!(
            client.thumbnails_url("abc_123"),
            "https://www.googleapis.com/upload/youtube/v3/thumbnails/set?videoId=abc_123"
        );
    }
}
