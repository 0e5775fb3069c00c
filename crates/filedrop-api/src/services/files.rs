//! Upload lifecycle operations behind the HTTP surface.

use chrono::Utc;
use filedrop_core::models::{
    DeleteFileResponse, DownloadUrlResponse, ListFilesResponse, ThumbnailUrlResponse,
    UploadUrlResponse,
};
use filedrop_core::validation::{validate_content_type, validate_file_id, validate_file_name};
use filedrop_core::{AppError, Config, FileRecord};
use filedrop_db::MetadataStore;
use filedrop_storage::{Storage, StorageError, ThumbnailKeys};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

/// Characters left as-is by JavaScript's `encodeURIComponent`
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

#[derive(Debug, Clone)]
pub struct FileServiceConfig {
    pub url_expiry: Duration,
    pub list_limit: u32,
    pub delete_thumbnails: bool,
    pub thumbnail_keys: ThumbnailKeys,
}

impl From<&Config> for FileServiceConfig {
    fn from(config: &Config) -> Self {
        Self {
            url_expiry: config.storage.url_expiry,
            list_limit: config.metadata.list_limit,
            delete_thumbnails: config.metadata.delete_thumbnails,
            thumbnail_keys: ThumbnailKeys::new(config.thumbnail_prefix()),
        }
    }
}

impl Default for FileServiceConfig {
    fn default() -> Self {
        Self {
            url_expiry: Duration::from_secs(3600),
            list_limit: 50,
            delete_thumbnails: false,
            thumbnail_keys: ThumbnailKeys::default(),
        }
    }
}

/// `attachment; filename="<encodeURIComponent(file_name)>"`
pub fn content_disposition(file_name: &str) -> String {
    format!(
        "attachment; filename=\"{}\"",
        utf8_percent_encode(file_name, URI_COMPONENT)
    )
}

#[derive(Clone)]
pub struct FileService {
    storage: Arc<dyn Storage>,
    metadata: Arc<dyn MetadataStore>,
    config: FileServiceConfig,
}

impl FileService {
    pub fn new(
        storage: Arc<dyn Storage>,
        metadata: Arc<dyn MetadataStore>,
        config: FileServiceConfig,
    ) -> Self {
        Self {
            storage,
            metadata,
            config,
        }
    }

    /// Validate the request, sign a PUT URL for a fresh id and record it as pending.
    ///
    /// Nothing is written to the object store; the client uploads with the URL.
    #[tracing::instrument(skip(self), fields(file_id = tracing::field::Empty))]
    pub async fn issue_upload_url(
        &self,
        file_name: Option<&str>,
        content_type: Option<&str>,
    ) -> Result<UploadUrlResponse, AppError> {
        let file_name = validate_file_name(file_name).map_err(AppError::InvalidInput)?;
        let content_type = validate_content_type(content_type).map_err(AppError::InvalidInput)?;

        let file_id = Uuid::new_v4().to_string();
        tracing::Span::current().record("file_id", file_id.as_str());

        let upload_url = self
            .storage
            .presigned_put_url(
                &file_id,
                content_type,
                &content_disposition(file_name),
                self.config.url_expiry,
            )
            .await?;

        let record = FileRecord::pending(&file_id, file_name, content_type, Utc::now());
        self.metadata.insert_pending(&record).await?;

        tracing::info!(file_id = %file_id, content_type = %content_type, "Upload URL issued");

        Ok(UploadUrlResponse {
            file_id,
            upload_url,
        })
    }

    #[tracing::instrument(skip(self))]
    pub async fn list_files(&self) -> Result<ListFilesResponse, AppError> {
        let items = self.metadata.scan(self.config.list_limit).await?;
        Ok(ListFilesResponse { items })
    }

    /// Signed GET URL for an uploaded original. 404 until the object exists,
    /// whatever the metadata record says.
    #[tracing::instrument(skip(self))]
    pub async fn issue_download_url(&self, file_id: &str) -> Result<DownloadUrlResponse, AppError> {
        validate_file_id(file_id).map_err(AppError::InvalidInput)?;

        let download_url = self.signed_get_if_exists(file_id, "File not found").await?;
        Ok(DownloadUrlResponse { download_url })
    }

    #[tracing::instrument(skip(self))]
    pub async fn issue_thumbnail_url(
        &self,
        file_id: &str,
    ) -> Result<ThumbnailUrlResponse, AppError> {
        validate_file_id(file_id).map_err(AppError::InvalidInput)?;

        let key = self.config.thumbnail_keys.thumbnail_key(file_id);
        let thumbnail_url = self.signed_get_if_exists(&key, "Thumbnail not found").await?;
        Ok(ThumbnailUrlResponse { thumbnail_url })
    }

    /// Remove the original object and its record. Succeeds when neither exists.
    #[tracing::instrument(skip(self))]
    pub async fn delete_file(&self, file_id: &str) -> Result<DeleteFileResponse, AppError> {
        validate_file_id(file_id).map_err(AppError::InvalidInput)?;

        self.storage.delete(file_id).await?;
        self.metadata.delete(file_id).await?;

        if self.config.delete_thumbnails {
            let key = self.config.thumbnail_keys.thumbnail_key(file_id);
            self.storage.delete(&key).await?;
        }

        tracing::info!(file_id = %file_id, "File deleted");

        Ok(DeleteFileResponse {
            message: "File deleted successfully".to_string(),
        })
    }

    async fn signed_get_if_exists(&self, key: &str, missing: &str) -> Result<String, AppError> {
        match self.storage.head(key).await {
            Ok(_) => {}
            Err(StorageError::NotFound(_)) => return Err(AppError::NotFound(missing.to_string())),
            Err(e) => return Err(e.into()),
        }

        Ok(self
            .storage
            .presigned_get_url(key, self.config.url_expiry)
            .await?)
    }
}
