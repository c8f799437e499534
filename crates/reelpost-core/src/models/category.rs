use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// The video categories offered in the upload form. Not fetched from the platform.
pub const VIDEO_CATEGORIES: [(&str, &str); 15] = [
    ("1", "Film & Animation"),
    ("2", "Autos & Vehicles"),
    ("10", "Music"),
    ("15", "Pets & Animals"),
    ("17", "Sports"),
    ("19", "Travel & Events"),
    ("20", "Gaming"),
    ("22", "People & Blogs"),
    ("23", "Comedy"),
    ("24", "Entertainment"),
    ("25", "News & Politics"),
    ("26", "Howto & Style"),
    ("27", "Education"),
    ("28", "Science & Technology"),
    ("29", "Nonprofits & Activism"),
];

/// Category id used when the form does not specify one.
pub const DEFAULT_CATEGORY_ID: &str = "22";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct VideoCategory {
    pub id: String,
    pub name: String,
}

pub fn video_categories() -> Vec<VideoCategory> {
    VIDEO_CATEGORIES
        .iter()
        .map(|(id, name)| VideoCategory {
            id: (*id).to_string(),
            name: (*name).to_string(),
        })
        .collect()
}
