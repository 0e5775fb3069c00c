use async_trait::async_trait;
use chrono::{DateTime, Utc};
use filedrop_core::models::CompletedUpload;
use filedrop_core::validation::is_sql_identifier;
use filedrop_core::{AppError, FileRecord, FileStatus};
use sqlx::PgPool;

use crate::store::MetadataStore;

const RECORD_COLUMNS: &str =
    "file_id, file_name, content_type, status, created_at, uploaded_at, file_size";

#[derive(Debug, sqlx::FromRow)]
struct FileRow {
    file_id: String,
    file_name: String,
    content_type: String,
    status: String,
    created_at: DateTime<Utc>,
    uploaded_at: Option<DateTime<Utc>>,
    file_size: Option<i64>,
}

impl TryFrom<FileRow> for FileRecord {
    type Error = AppError;

    fn try_from(row: FileRow) -> Result<Self, Self::Error> {
        let status = row.status.parse::<FileStatus>().map_err(|e| {
            AppError::Internal(format!("Corrupt status for file {}: {}", row.file_id, e))
        })?;

        Ok(FileRecord {
            file_id: row.file_id,
            file_name: row.file_name,
            content_type: row.content_type,
            status,
            created_at: row.created_at,
            uploaded_at: row.uploaded_at,
            file_size: row.file_size,
        })
    }
}

/// PostgreSQL-backed metadata table
///
/// The table name is configurable, so statements are built at construction time
/// from an identifier that has already passed `is_sql_identifier`.
#[derive(Clone)]
pub struct PostgresMetadataStore {
    pool: PgPool,
    table: String,
}

impl PostgresMetadataStore {
    pub fn new(pool: PgPool, table: impl Into<String>) -> Result<Self, AppError> {
        let table = table.into();
        if !is_sql_identifier(&table) {
            return Err(AppError::InvalidInput(format!(
                "Invalid metadata table name: {:?}",
                table
            )));
        }
        Ok(Self { pool, table })
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Create the table if it does not exist yet.
    pub async fn ensure_schema(&self) -> Result<(), AppError> {
        let sql = format!(
            r#"
            CREATE TABLE IF NOT EXISTS {table} (
                file_id TEXT PRIMARY KEY,
                file_name TEXT NOT NULL,
                content_type TEXT NOT NULL,
                status TEXT NOT NULL CHECK (status IN ('pending', 'completed')),
                created_at TIMESTAMPTZ NOT NULL,
                uploaded_at TIMESTAMPTZ,
                file_size BIGINT
            )
            "#,
            table = self.table
        );

        sqlx::query(&sql).execute(&self.pool).await?;
        tracing::info!(table = %self.table, "Metadata table ready");
        Ok(())
    }
}

#[async_trait]
impl MetadataStore for PostgresMetadataStore {
    #[tracing::instrument(skip(self, record), fields(
        db.system = "postgresql",
        db.table = %self.table,
        db.operation = "insert",
        file_id = %record.file_id
    ))]
    async fn insert_pending(&self, record: &FileRecord) -> Result<(), AppError> {
        let sql = format!(
            r#"
            INSERT INTO {} (file_id, file_name, content_type, status, created_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (file_id) DO NOTHING
            "#,
            self.table
        );

        let result = sqlx::query(&sql)
            .bind(&record.file_id)
            .bind(&record.file_name)
            .bind(&record.content_type)
            .bind(FileStatus::Pending.as_str())
            .bind(record.created_at)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::PreconditionFailed(format!(
                "File {} already exists",
                record.file_id
            )));
        }

        Ok(())
    }

    #[tracing::instrument(skip(self, update), fields(
        db.system = "postgresql",
        db.table = %self.table,
        db.operation = "update"
    ))]
    async fn mark_completed(
        &self,
        file_id: &str,
        update: &CompletedUpload,
    ) -> Result<FileRecord, AppError> {
        let sql = format!(
            r#"
            UPDATE {}
            SET status = $2, file_size = $3, content_type = $4,
                uploaded_at = COALESCE(uploaded_at, $5)
            WHERE file_id = $1
            RETURNING {}
            "#,
            self.table, RECORD_COLUMNS
        );

        let row = sqlx::query_as::<_, FileRow>(&sql)
            .bind(file_id)
            .bind(FileStatus::Completed.as_str())
            .bind(update.file_size)
            .bind(&update.content_type)
            .bind(update.uploaded_at)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => row.try_into(),
            None => Err(AppError::PreconditionFailed(format!(
                "No metadata record for file {}",
                file_id
            ))),
        }
    }

    async fn get(&self, file_id: &str) -> Result<Option<FileRecord>, AppError> {
        let sql = format!(
            "SELECT {} FROM {} WHERE file_id = $1",
            RECORD_COLUMNS, self.table
        );

        sqlx::query_as::<_, FileRow>(&sql)
            .bind(file_id)
            .fetch_optional(&self.pool)
            .await?
            .map(FileRecord::try_from)
            .transpose()
    }

    #[tracing::instrument(skip(self), fields(
        db.system = "postgresql",
        db.table = %self.table,
        db.operation = "select"
    ))]
    async fn scan(&self, limit: u32) -> Result<Vec<FileRecord>, AppError> {
        let sql = format!(
            "SELECT {} FROM {} ORDER BY created_at DESC LIMIT $1",
            RECORD_COLUMNS, self.table
        );

        let rows = sqlx::query_as::<_, FileRow>(&sql)
            .bind(i64::from(limit))
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(FileRecord::try_from).collect()
    }

    #[tracing::instrument(skip(self), fields(
        db.system = "postgresql",
        db.table = %self.table,
        db.operation = "delete"
    ))]
    async fn delete(&self, file_id: &str) -> Result<(), AppError> {
        let sql = format!("DELETE FROM {} WHERE file_id = $1", self.table);

        let result = sqlx::query(&sql)
            .bind(file_id)
            .execute(&self.pool)
            .await?;

        tracing::debug!(rows = result.rows_affected(), "Metadata record delete issued");
        Ok(())
    }
}
