use crate::error::{ErrorResponse, HttpAppError, ValidatedPath};
use crate::state::AppState;
use axum::{
    extract::State,
    response::IntoResponse,
    Json,
};
use filedrop_core::models::{
    DeleteFileResponse, DownloadUrlResponse, ListFilesResponse, ThumbnailUrlResponse,
};
use std::sync::Arc;

/// List up to `LIST_LIMIT` file records
#[utoipa::path(
    get,
    path = "/files",
    tag = "files",
    responses(
        (status = 200, description = "File records", body = ListFilesResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(operation = "list_files"))]
pub async fn list_files(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    let response = state.files.list_files().await?;
    Ok(Json(response))
}

#[utoipa::path(
    get,
    path = "/files/{fileId}",
    tag = "files",
    params(
        ("fileId" = String, Path, description = "File identifier returned by /upload-url")
    ),
    responses(
        (status = 200, description = "Signed download URL", body = DownloadUrlResponse),
        (status = 404, description = "Object not uploaded", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(operation = "issue_download_url"))]
pub async fn get_download_url(
    ValidatedPath(file_id): ValidatedPath<String>,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    let response = state.files.issue_download_url(&file_id).await?;
    Ok(Json(response))
}

#[utoipa::path(
    get,
    path = "/files/{fileId}/thumbnail",
    tag = "files",
    params(
        ("fileId" = String, Path, description = "File identifier returned by /upload-url")
    ),
    responses(
        (status = 200, description = "Signed thumbnail URL", body = ThumbnailUrlResponse),
        (status = 404, description = "Thumbnail not generated", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(operation = "issue_thumbnail_url"))]
pub async fn get_thumbnail_url(
    ValidatedPath(file_id): ValidatedPath<String>,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    let response = state.files.issue_thumbnail_url(&file_id).await?;
    Ok(Json(response))
}

#[utoipa::path(
    delete,
    path = "/files/{fileId}",
    tag = "files",
    params(
        ("fileId" = String, Path, description = "File identifier")
    ),
    responses(
        (status = 200, description = "File deleted (also when it never existed)", body = DeleteFileResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(operation = "delete_file"))]
pub async fn delete_file(
    ValidatedPath(file_id): ValidatedPath<String>,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    let response = state.files.delete_file(&file_id).await?;
    Ok(Json(response))
}
