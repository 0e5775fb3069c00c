//! Image thumbnails

use bytes::Bytes;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageReader};
use std::io::Cursor;

use crate::error::ProcessingError;

/// Cover-fit square thumbnail encoder.
///
/// The source is scaled so that it fully covers a `size`×`size` square and the
/// overflow is cropped around the center. Alpha is dropped before JPEG encoding.
#[derive(Debug, Clone, Copy)]
pub struct ImageThumbnailer {
    size: u32,
    quality: u8,
}

impl ImageThumbnailer {
    pub fn new(size: u32, quality: u8) -> Self {
        Self {
            size,
            quality: quality.clamp(1, 100),
        }
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    /// Decode `data` (format sniffed from its magic bytes) and render the thumbnail.
    pub fn render(&self, data: &[u8]) -> Result<Bytes, ProcessingError> {
        let img = ImageReader::new(Cursor::new(data))
            .with_guessed_format()
            .map_err(ProcessingError::Scratch)?
            .decode()
            .map_err(ProcessingError::Decode)?;

        self.encode(&img)
    }

    fn encode(&self, img: &DynamicImage) -> Result<Bytes, ProcessingError> {
        let cover = img.resize_to_fill(self.size, self.size, FilterType::Lanczos3);
        let rgb = DynamicImage::ImageRgb8(cover.to_rgb8());

        let pixels = (self.size as usize).saturating_mul(self.size as usize);
        let mut buffer = Vec::with_capacity(pixels.min(1 << 20));
        let encoder = JpegEncoder::new_with_quality(&mut buffer, self.quality);
        rgb.write_with_encoder(encoder)
            .map_err(ProcessingError::Encode)?;

        Ok(Bytes::from(buffer))
    }
}

impl Default for ImageThumbnailer {
    fn default() -> Self {
        Self::new(300, 80)
    }
}
