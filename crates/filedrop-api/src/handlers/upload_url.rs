use crate::error::{ErrorResponse, HttpAppError, ValidatedQuery};
use crate::state::AppState;
use axum::{
    extract::State,
    response::IntoResponse,
    Json,
};
use filedrop_core::models::{UploadUrlQuery, UploadUrlResponse};
use std::sync::Arc;

/// Issue a signed PUT URL for a new file
///
/// The client must upload with the same `Content-Type` it declared here.
#[utoipa::path(
    get,
    path = "/upload-url",
    tag = "files",
    params(UploadUrlQuery),
    responses(
        (status = 200, description = "Upload URL issued", body = UploadUrlResponse),
        (status = 400, description = "Invalid fileName or contentType", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, query), fields(operation = "issue_upload_url"))]
pub async fn issue_upload_url(
    State(state): State<Arc<AppState>>,
    ValidatedQuery(query): ValidatedQuery<UploadUrlQuery>,
) -> Result<impl IntoResponse, HttpAppError> {
    let response = state
        .files
        .issue_upload_url(query.file_name.as_deref(), query.content_type.as_deref())
        .await?;

    Ok(Json(response))
}
