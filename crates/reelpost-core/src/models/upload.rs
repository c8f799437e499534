use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use utoipa::ToSchema;

use super::category::DEFAULT_CATEGORY_ID;
use crate::constants::WATCH_URL_BASE;

pub const DEFAULT_TITLE: &str = "Untitled";
pub const DEFAULT_PRIVACY_STATUS: &str = "private";
pub const DEFAULT_LICENSE: &str = "youtube";

/// Metadata supplied with an upload. Blank strings count as absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UploadMetadata {
    pub title: Option<String>,
    pub description: Option<String>,
    /// Comma-separated
    pub tags: Option<String>,
    pub category_id: Option<String>,
    /// public, private or unlisted
    pub privacy_status: Option<String>,
    /// RFC 3339 publish time, passed through verbatim
    pub publish_at: Option<String>,
    pub made_for_kids: bool,
    pub default_language: Option<String>,
    pub license: Option<String>,
}

/// Video resource sent when opening an upload session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VideoResource {
    pub snippet: VideoSnippet,
    pub status: VideoStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoSnippet {
    pub title: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    pub category_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_language: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoStatus {
    pub privacy_status: String,
    pub self_declared_made_for_kids: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publish_at: Option<String>,
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Split a comma-separated tag string, trimming and dropping empty segments.
pub fn split_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}

impl UploadMetadata {
    /// Privacy actually requested; a scheduled publish always uploads as private.
    pub fn effective_privacy_status(&self) -> String {
        if present(&self.publish_at).is_some() {
            return DEFAULT_PRIVACY_STATUS.to_string();
        }
        present(&self.privacy_status)
            .unwrap_or(DEFAULT_PRIVACY_STATUS)
            .to_string()
    }

    pub fn to_video_resource(&self) -> VideoResource {
        let tags = self
            .tags
            .as_deref()
            .map(split_tags)
            .filter(|tags| !tags.is_empty());

        VideoResource {
            snippet: VideoSnippet {
                title: present(&self.title).unwrap_or(DEFAULT_TITLE).to_string(),
                description: self.description.clone().unwrap_or_default(),
                tags,
                category_id: present(&self.category_id)
                    .unwrap_or(DEFAULT_CATEGORY_ID)
                    .to_string(),
                default_language: present(&self.default_language).map(str::to_string),
            },
            status: VideoStatus {
                privacy_status: self.effective_privacy_status(),
                self_declared_made_for_kids: self.made_for_kids,
                license: present(&self.license).map(str::to_string),
                publish_at: self.publish_at.clone().filter(|p| !p.trim().is_empty()),
            },
        }
    }
}

/// Outcome of a completed upload.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadResult {
    pub video_id: String,
    pub video_url: String,
    /// Final resource returned by the platform
    pub response: JsonValue,
}

pub fn watch_url(video_id: &str) -> String {
    format!("{}{}", WATCH_URL_BASE, video_id)
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UploadResponse {
    pub success: bool,
    pub upload_id: String,
    pub video_id: String,
    pub video_url: String,
    pub thumbnail_error: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UploadTokenResponse {
    pub upload_id: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UploadProgressResponse {
    /// Percentage 0-100, or -1 when the upload id is unknown
    pub progress: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_metadata_missing() {
        let resource = UploadMetadata::default().to_video_resource();
        assert_eq!(resource.snippet.title, "Untitled");
        assert_eq!(resource.snippet.category_id, "22");
        assert_eq!(resource.status.privacy_status, "private");
        assert_eq!(resource.snippet.description, "");
        assert!(resource.snippet.tags.is_none());
        assert!(resource.snippet.default_language.is_none());
        assert!(resource.status.license.is_none());
        assert!(resource.status.publish_at.is_none());
    }

    #[test]
    fn test_blank_title_uses_default() {
        let metadata = UploadMetadata {
            title: Some("   ".to_string()),
            ..Default::default()
        };
        assert_eq!(metadata.to_video_resource().snippet.title, "Untitled");
    }

    #[test]
    fn test_publish_at_forces_private() {
        let metadata = UploadMetadata {
            privacy_status: Some("public".to_string()),
            publish_at: Some("2026-11-01T10:00:00Z".to_string()),
            ..Default::default()
        };
        let resource = metadata.to_video_resource();
        assert_eq!(resource.status.privacy_status, "private");
        assert_eq!(
            resource.status.publish_at.as_deref(),
            Some("2026-11-01T10:00:00Z")
        );
    }

    #[test]
    fn test_requested_privacy_kept_without_schedule() {
        let metadata = UploadMetadata {
            privacy_status: Some("unlisted".to_string()),
            ..Default::default()
        };
        assert_eq!(metadata.effective_privacy_status(), "unlisted");
    }

    #[test]
    fn test_split_tags_trims_and_drops_empty() {
        assert_eq!(split_tags("a, ,b"), vec!["a", "b"]);
        assert_eq!(split_tags(" rust , video,"), vec!["rust", "video"]);
        assert!(split_tags(" , ").is_empty());
    }

    #[test]
    fn test_serialized_resource_uses_platform_field_names() {
        let metadata = UploadMetadata {
            title: Some("Trip".to_string()),
            tags: Some("travel,alps".to_string()),
            made_for_kids: true,
            default_language: Some("he".to_string()),
            license: Some("creativeCommon".to_string()),
            ..Default::default()
        };
        let json = serde_json::to_value(metadata.to_video_resource()).unwrap();
        assert_eq!(json["snippet"]["categoryId"], "22");
        assert_eq!(json["snippet"]["tags"], serde_json::json!(["travel", "alps"]));
        assert_eq!(json["snippet"]["defaultLanguage"], "he");
        assert_eq!(json["status"]["selfDeclaredMadeForKids"], true);
        assert_eq!(json["status"]["license"], "creativeCommon");
        assert!(json["status"].get("publishAt").is_none());
    }

    #[test]
    fn test_watch_url() {
        assert_eq!(watch_url("abc123"), "https://www.youtube.com/watch?v=abc123");
    }
}
