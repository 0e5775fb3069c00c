//! Dispatch from media kind to the matching thumbnail pipeline.

use bytes::Bytes;
use filedrop_core::config::ConversionConfig;
use filedrop_core::MediaKind;
use std::path::PathBuf;

use crate::error::ProcessingError;
use crate::image::ImageThumbnailer;
use crate::video::FrameExtractor;

/// Content type of every rendered thumbnail
pub const THUMBNAIL_CONTENT_TYPE: &str = "image/jpeg";

#[derive(Debug, Clone)]
pub struct ThumbnailSettings {
    pub size: u32,
    pub jpeg_quality: u8,
    pub ffmpeg_path: String,
    pub scratch_dir: PathBuf,
    pub frame_offset_secs: f64,
}

impl From<&ConversionConfig> for ThumbnailSettings {
    fn from(config: &ConversionConfig) -> Self {
        Self {
            size: config.thumbnail_size,
            jpeg_quality: config.jpeg_quality,
            ffmpeg_path: config.ffmpeg_path.clone(),
            scratch_dir: config.scratch_dir.clone(),
            frame_offset_secs: config.frame_offset_secs,
        }
    }
}

impl Default for ThumbnailSettings {
    fn default() -> Self {
        Self {
            size: 300,
            jpeg_quality: 80,
            ffmpeg_path: "ffmpeg".to_string(),
            scratch_dir: std::env::temp_dir(),
            frame_offset_secs: 1.0,
        }
    }
}

/// Renders a JPEG thumbnail for any convertible media kind.
#[derive(Debug, Clone)]
pub struct ThumbnailRenderer {
    images: ImageThumbnailer,
    videos: FrameExtractor,
}

impl ThumbnailRenderer {
    pub fn new(settings: ThumbnailSettings) -> Result<Self, ProcessingError> {
        if settings.size == 0 {
            return Err(ProcessingError::InvalidConfig(
                "Thumbnail size must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            images: ImageThumbnailer::new(settings.size, settings.jpeg_quality),
            videos: FrameExtractor::new(
                settings.ffmpeg_path,
                settings.scratch_dir,
                settings.size,
                settings.frame_offset_secs,
            )?,
        })
    }

    pub async fn render(&self, kind: MediaKind, data: Bytes) -> Result<Bytes, ProcessingError> {
        match kind {
            MediaKind::Image => {
                let images = self.images;
                // Decoding and resampling are CPU bound
                tokio::task::spawn_blocking(move || images.render(&data))
                    .await
                    .map_err(|e| ProcessingError::Aborted(e.to_string()))?
            }
            MediaKind::Video => self.videos.extract(&data).await,
            MediaKind::Unsupported => Err(ProcessingError::Unsupported(kind.to_string())),
        }
    }
}
