//! OpenAPI documentation.

use utoipa::OpenApi;

use crate::error::ErrorResponse;
use crate::handlers;
use filedrop_core::models::{
    DeleteFileResponse, DownloadUrlResponse, FileRecord, FileStatus, ListFilesResponse,
    ThumbnailUrlResponse, UploadUrlResponse,
};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Filedrop API",
        version = "0.1.0",
        description = "Direct-to-storage file uploads with signed URLs and automatic image/video thumbnails."
    ),
    paths(
        handlers::upload_url::issue_upload_url,
        handlers::files::list_files,
        handlers::files::get_download_url,
        handlers::files::get_thumbnail_url,
        handlers::files::delete_file,
    ),
    components(schemas(
        UploadUrlResponse,
        ListFilesResponse,
        FileRecord,
        FileStatus,
        DownloadUrlResponse,
        ThumbnailUrlResponse,
        DeleteFileResponse,
        ErrorResponse,
    )),
    tags(
        (name = "files", description = "Upload lifecycle and signed URLs")
    )
)]
pub struct ApiDoc;
