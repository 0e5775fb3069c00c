//! Domain models and API payloads

pub mod api;
pub mod file;

pub use api::{
    DeleteFileResponse, DownloadUrlResponse, ListFilesResponse, ThumbnailUrlResponse,
    UploadUrlQuery, UploadUrlResponse,
};
pub use file::{CompletedUpload, FileRecord, FileStatus, DEFAULT_CONTENT_TYPE};
