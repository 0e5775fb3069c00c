//! Filedrop Media Processing Library
//!
//! Renders the single derived artifact of the service: a square JPEG thumbnail.
//! Images are decoded and cover-cropped in process; videos go through an external
//! `ffmpeg` using scratch files.

pub mod error;
pub mod image;
pub mod renderer;
pub mod video;

// Re-export commonly used types
pub use error::ProcessingError;
pub use self::image::ImageThumbnailer;
pub use renderer::{ThumbnailRenderer, ThumbnailSettings, THUMBNAIL_CONTENT_TYPE};
pub use video::FrameExtractor;
