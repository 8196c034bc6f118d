//! MySQL staging store backend

use crate::backend::StagingStore;
use crate::error::Result;
use crate::types::{DownloadStatus, NewRawRecord, NewStagedRecord, RawRecord, StagedRecord};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::mysql::{MySqlPool, MySqlPoolOptions, MySqlRow};
use sqlx::types::Json;
use sqlx::Row;
use tracing::{debug, info};

// ============================================================================
// Connection Constants
// ============================================================================

/// Default maximum connections in the pool. The pipeline is sequential, so a
/// handful is plenty.
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

const CREATE_RAW_TABLE_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS raw_records (
    id BIGINT NOT NULL AUTO_INCREMENT PRIMARY KEY,
    record_id VARCHAR(64) NOT NULL,
    project VARCHAR(255) NOT NULL,
    fields JSON NOT NULL,
    attachments JSON NOT NULL,
    submitted_at DATETIME NOT NULL,
    pulled_at DATETIME NOT NULL,
    KEY idx_record_pull (record_id, id)
) CHARACTER SET utf8mb4
"#;

const CREATE_STAGED_TABLE_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS staged_records (
    id BIGINT NOT NULL AUTO_INCREMENT PRIMARY KEY,
    record_id VARCHAR(64) NOT NULL,
    project VARCHAR(255) NOT NULL,
    fields JSON NOT NULL,
    attachments JSON NOT NULL,
    submitted_at DATETIME NOT NULL,
    status VARCHAR(16) NOT NULL DEFAULT 'pending',
    updated_at DATETIME NOT NULL,
    UNIQUE KEY uk_record_id (record_id)
) CHARACTER SET utf8mb4
"#;

/// MySQL-backed staging store
pub struct MySqlStore {
    pool: MySqlPool,
}

impl MySqlStore {
    /// Connect to the database at `url`
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = MySqlPoolOptions::new()
            .max_connections(DEFAULT_MAX_CONNECTIONS)
            .connect(url)
            .await?;

        info!("connected to staging database");
        Ok(Self { pool })
    }
}

fn to_utc(naive: NaiveDateTime) -> DateTime<Utc> {
    DateTime::from_naive_utc_and_offset(naive, Utc)
}

fn map_raw(row: &MySqlRow) -> Result<RawRecord> {
    let attachments: Json<Vec<crate::types::Attachment>> = row.try_get("attachments")?;
    Ok(RawRecord {
        id: row.try_get("id")?,
        record_id: row.try_get("record_id")?,
        project: row.try_get("project")?,
        fields: row.try_get("fields")?,
        attachments: attachments.0,
        submitted_at: to_utc(row.try_get("submitted_at")?),
        pulled_at: to_utc(row.try_get("pulled_at")?),
    })
}

fn map_staged(row: &MySqlRow) -> Result<StagedRecord> {
    let attachments: Json<Vec<crate::types::Attachment>> = row.try_get("attachments")?;
    let status: String = row.try_get("status")?;
    Ok(StagedRecord {
        id: row.try_get("id")?,
        record_id: row.try_get("record_id")?,
        project: row.try_get("project")?,
        fields: row.try_get("fields")?,
        attachments: attachments.0,
        submitted_at: to_utc(row.try_get("submitted_at")?),
        status: status.parse()?,
        updated_at: to_utc(row.try_get("updated_at")?),
    })
}

#[async_trait]
impl StagingStore for MySqlStore {
    async fn ensure_schema(&self) -> Result<()> {
        sqlx::query(CREATE_RAW_TABLE_SQL).execute(&self.pool).await?;
        sqlx::query(CREATE_STAGED_TABLE_SQL).execute(&self.pool).await?;
        debug!("staging schema checked");
        Ok(())
    }

    async fn append_raw(&self, records: &[NewRawRecord]) -> Result<u64> {
        if records.is_empty() {
            return Ok(0);
        }

        let pulled_at = Utc::now().naive_utc();
        let mut tx = self.pool.begin().await?;

        for record in records {
            sqlx::query(
                r#"
                INSERT INTO raw_records
                    (record_id, project, fields, attachments, submitted_at, pulled_at)
                VALUES (?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&record.record_id)
            .bind(&record.project)
            .bind(&record.fields)
            .bind(Json(&record.attachments))
            .bind(record.submitted_at.naive_utc())
            .bind(pulled_at)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(records.len() as u64)
    }

    async fn latest_raw(&self) -> Result<Vec<RawRecord>> {
        let rows = sqlx::query(
            r#"
            SELECT r.id, r.record_id, r.project, r.fields, r.attachments,
                   r.submitted_at, r.pulled_at
            FROM raw_records r
            JOIN (
                SELECT record_id, MAX(id) AS max_id
                FROM raw_records
                GROUP BY record_id
            ) latest ON r.id = latest.max_id
            ORDER BY r.id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_raw).collect()
    }

    async fn raw_count(&self) -> Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM raw_records")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.try_get("n")?)
    }

    async fn staged_count(&self) -> Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM staged_records")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.try_get("n")?)
    }

    async fn get_staged(&self, record_id: &str) -> Result<Option<StagedRecord>> {
        let row = sqlx::query(
            r#"
            SELECT id, record_id, project, fields, attachments,
                   submitted_at, status, updated_at
            FROM staged_records
            WHERE record_id = ?
            "#,
        )
        .bind(record_id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(map_staged).transpose()
    }

    async fn insert_staged(&self, record: &NewStagedRecord) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO staged_records
                (record_id, project, fields, attachments, submitted_at, status, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&record.record_id)
        .bind(&record.project)
        .bind(&record.fields)
        .bind(Json(&record.attachments))
        .bind(record.submitted_at.naive_utc())
        .bind(DownloadStatus::Pending.as_str())
        .bind(Utc::now().naive_utc())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn update_staged(&self, record: &NewStagedRecord, reset_status: bool) -> Result<()> {
        let sql = if reset_status {
            r#"
            UPDATE staged_records
            SET project = ?, fields = ?, attachments = ?, submitted_at = ?,
                status = 'pending', updated_at = ?
            WHERE record_id = ?
            "#
        } else {
            r#"
            UPDATE staged_records
            SET project = ?, fields = ?, attachments = ?, submitted_at = ?,
                updated_at = ?
            WHERE record_id = ?
            "#
        };

        sqlx::query(sql)
            .bind(&record.project)
            .bind(&record.fields)
            .bind(Json(&record.attachments))
            .bind(record.submitted_at.naive_utc())
            .bind(Utc::now().naive_utc())
            .bind(&record.record_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn undownloaded_staged(&self) -> Result<Vec<StagedRecord>> {
        let rows = sqlx::query(
            r#"
            SELECT id, record_id, project, fields, attachments,
                   submitted_at, status, updated_at
            FROM staged_records
            WHERE status IN ('pending', 'failed')
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_staged).collect()
    }

    async fn set_status(&self, record_id: &str, status: DownloadStatus) -> Result<()> {
        sqlx::query(
            "UPDATE staged_records SET status = ?, updated_at = ? WHERE record_id = ?",
        )
        .bind(status.as_str())
        .bind(Utc::now().naive_utc())
        .bind(record_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn prune_superseded_raw(&self) -> Result<u64> {
        let result = sqlx::query(
            r#"
            DELETE r FROM raw_records r
            JOIN (
                SELECT record_id, MAX(id) AS max_id
                FROM raw_records
                GROUP BY record_id
            ) latest ON r.record_id = latest.record_id AND r.id < latest.max_id
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
