//! Classification of an object's declared content type.
//!
//! Computed once when the converter probes an object; everything downstream
//! dispatches on the variant instead of re-inspecting the MIME string.

use serde::{Deserialize, Serialize};

/// What the media pipeline can do with an object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
    Unsupported,
}

impl MediaKind {
    /// Classify a declared content type such as `image/png` or `video/mp4; codecs=avc1`.
    ///
    /// Parameters are ignored and the comparison is case-insensitive. A missing content
    /// type is `Unsupported`.
    pub fn from_content_type(content_type: Option<&str>) -> Self {
        let Some(content_type) = content_type else {
            return MediaKind::Unsupported;
        };

        let essence = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();

        match essence.split_once('/') {
            Some(("image", subtype)) if !subtype.is_empty() => MediaKind::Image,
            Some(("video", subtype)) if !subtype.is_empty() => MediaKind::Video,
            _ => MediaKind::Unsupported,
        }
    }

    pub fn is_convertible(self) -> bool {
        !matches!(self, MediaKind::Unsupported)
    }
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MediaKind::Image => write!(f, "image"),
            MediaKind::Video => write!(f, "video"),
            MediaKind::Unsupported => write!(f, "unsupported"),
        }
    }
}
