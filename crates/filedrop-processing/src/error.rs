use filedrop_core::AppError;

#[derive(Debug, thiserror::Error)]
pub enum ProcessingError {
    #[error("Failed to decode image: {0}")]
    Decode(#[source] image::ImageError),

    #[error("Failed to encode thumbnail: {0}")]
    Encode(#[source] image::ImageError),

    #[error("Failed to run ffmpeg: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("FFmpeg frame extraction failed ({status}): {stderr}")]
    Ffmpeg { status: String, stderr: String },

    #[error("Scratch file error: {0}")]
    Scratch(#[from] std::io::Error),

    #[error("Invalid processing configuration: {0}")]
    InvalidConfig(String),

    #[error("Content type {0} cannot be rendered")]
    Unsupported(String),

    #[error("Processing task aborted: {0}")]
    Aborted(String),
}

impl From<ProcessingError> for AppError {
    fn from(err: ProcessingError) -> Self {
        match err {
            ProcessingError::InvalidConfig(msg) => AppError::Internal(msg),
            other => AppError::ConversionFailure(other.to_string()),
        }
    }
}
