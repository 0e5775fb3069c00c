//! Video thumbnails through an external `ffmpeg`

use bytes::Bytes;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tempfile::NamedTempFile;
use tokio::process::Command;

use crate::error::ProcessingError;

/// Grabs one frame from a video and scales it to a square JPEG.
///
/// Input and output live in scratch files under `scratch_dir`. Both are
/// `NamedTempFile`s, so they are removed on every exit path, including when the
/// calling future is dropped by a timeout. The child process is killed in that case.
#[derive(Debug, Clone)]
pub struct FrameExtractor {
    ffmpeg_path: String,
    scratch_dir: PathBuf,
    size: u32,
    offset_secs: f64,
}

impl FrameExtractor {
    pub fn new(
        ffmpeg_path: impl Into<String>,
        scratch_dir: impl Into<PathBuf>,
        size: u32,
        offset_secs: f64,
    ) -> Result<Self, ProcessingError> {
        let ffmpeg_path = ffmpeg_path.into();
        let dangerous_chars = [';', '|', '&', '$', '`', '(', ')', '<', '>', '\n', '\r'];
        if ffmpeg_path.is_empty() || ffmpeg_path.chars().any(|c| dangerous_chars.contains(&c)) {
            return Err(ProcessingError::InvalidConfig(
                "Invalid ffmpeg_path: contains dangerous characters".to_string(),
            ));
        }
        if !offset_secs.is_finite() || offset_secs < 0.0 {
            return Err(ProcessingError::InvalidConfig(format!(
                "Invalid frame offset: {}",
                offset_secs
            )));
        }

        Ok(Self {
            ffmpeg_path,
            scratch_dir: scratch_dir.into(),
            size,
            offset_secs,
        })
    }

    pub fn scratch_dir(&self) -> &Path {
        &self.scratch_dir
    }

    /// Extract the frame at the configured offset from `data`.
    pub async fn extract(&self, data: &[u8]) -> Result<Bytes, ProcessingError> {
        let input = self.scratch_file("filedrop-video-", "")?;
        tokio::fs::write(input.path(), data).await?;

        let output = self.scratch_file("filedrop-frame-", ".jpg")?;

        self.run_ffmpeg(input.path(), output.path()).await?;

        let frame = tokio::fs::read(output.path()).await?;
        if frame.is_empty() {
            return Err(ProcessingError::Ffmpeg {
                status: "exit status: 0".to_string(),
                stderr: "ffmpeg produced an empty frame".to_string(),
            });
        }

        tracing::debug!(
            input_bytes = data.len(),
            frame_bytes = frame.len(),
            "Extracted video frame"
        );

        Ok(Bytes::from(frame))
    }

    fn scratch_file(&self, prefix: &str, suffix: &str) -> Result<NamedTempFile, ProcessingError> {
        let file = tempfile::Builder::new()
            .prefix(prefix)
            .suffix(suffix)
            .tempfile_in(&self.scratch_dir)?;
        Ok(file)
    }

    async fn run_ffmpeg(&self, input_path: &Path, output_path: &Path) -> Result<(), ProcessingError> {
        let args = vec![
            "-hide_banner".to_string(),
            "-loglevel".to_string(),
            "error".to_string(),
            "-ss".to_string(),
            self.offset_secs.to_string(),
            "-i".to_string(),
            input_path.to_string_lossy().to_string(),
            "-frames:v".to_string(),
            "1".to_string(),
            "-vf".to_string(),
            format!("scale={}:{}", self.size, self.size),
            "-f".to_string(),
            "image2".to_string(),
            "-y".to_string(),
            output_path.to_string_lossy().to_string(),
        ];

        let output = Command::new(&self.ffmpeg_path)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(ProcessingError::Spawn)?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(ProcessingError::Ffmpeg {
                status: output.status.to_string(),
                stderr,
            });
        }

        Ok(())
    }
}
