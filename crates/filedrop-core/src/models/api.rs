use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::file::FileRecord;

/// Query string of `GET /upload-url`
///
/// Both fields are optional at the extractor level so a missing parameter is
/// reported with our own validation message instead of a framework rejection.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct UploadUrlQuery {
    /// Display name of the file, at most 255 characters, without path separators
    pub file_name: Option<String>,
    /// MIME type the client will upload with
    pub content_type: Option<String>,
}

/// Response containing the new file identifier and its signed upload URL
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadUrlResponse {
    pub file_id: String,
    /// Signed PUT URL, valid for one hour by default
    pub upload_url: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ListFilesResponse {
    pub items: Vec<FileRecord>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DownloadUrlResponse {
    pub download_url: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ThumbnailUrlResponse {
    pub thumbnail_url: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DeleteFileResponse {
    pub message: String,
}
