//! Message, image and alert persistence.
//!
//! The pipeline talks to storage through the [`MessageStore`] trait so the
//! analysis engine can be exercised with in-memory fakes; [`PgMessageStore`]
//! is the PostgreSQL implementation used by the binary.

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::{debug, info};

use crate::config::DatabaseConfig;
use crate::error::StorageError;
use crate::types::alert::{AlertRecord, StoredAlert};
use crate::types::message::{NewImageRecord, NewMessageRecord};

/// Persistence operations the pipeline depends on
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Persist an incoming message, returning its storage id.
    /// Re-delivery of an already stored message returns the existing id.
    async fn save_message(&self, message: &NewMessageRecord) -> Result<i64, StorageError>;

    /// Persist an OCR-processed image attachment
    async fn save_image(&self, image: &NewImageRecord) -> Result<i64, StorageError>;

    /// Persist one alert record, returning the storage-assigned alert id
    async fn create_alert(&self, alert: &AlertRecord) -> Result<i64, StorageError>;

    /// Alerts created within the last `hours`, newest first, with message
    /// context joined in
    async fn recent_alerts(&self, hours: i32) -> Result<Vec<StoredAlert>, StorageError>;
}

/// PostgreSQL-backed store
pub struct PgMessageStore {
    pool: PgPool,
}

impl PgMessageStore {
    /// Connect to the configured database and ensure the schema exists
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, StorageError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect(&config.url)
            .await?;

        let store = Self { pool };
        store.ensure_schema().await?;
        info!("Database pool initialized");
        Ok(store)
    }

    async fn ensure_schema(&self) -> Result<(), StorageError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS messages (
                id BIGSERIAL PRIMARY KEY,
                origin_message_id BIGINT NOT NULL,
                source_id BIGINT NOT NULL,
                user_id BIGINT,
                username VARCHAR(255),
                message_text TEXT,
                message_kind VARCHAR(50) NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                processed_at TIMESTAMPTZ,
                UNIQUE (origin_message_id, source_id)
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS images (
                id BIGSERIAL PRIMARY KEY,
                message_id BIGINT NOT NULL REFERENCES messages(id) ON DELETE CASCADE,
                file_id VARCHAR(255) NOT NULL,
                ocr_text TEXT,
                ocr_confidence DOUBLE PRECISION,
                processed_at TIMESTAMPTZ,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS alerts (
                id BIGSERIAL PRIMARY KEY,
                alert_ref UUID NOT NULL,
                message_id BIGINT NOT NULL REFERENCES messages(id) ON DELETE CASCADE,
                alert_type VARCHAR(100) NOT NULL,
                keywords_found TEXT[] NOT NULL DEFAULT '{}',
                confidence_score DOUBLE PRECISION NOT NULL,
                status VARCHAR(50) NOT NULL DEFAULT 'pending',
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                notified_at TIMESTAMPTZ
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        for statement in [
            "CREATE INDEX IF NOT EXISTS idx_messages_source_id ON messages(source_id)",
            "CREATE INDEX IF NOT EXISTS idx_messages_created_at ON messages(created_at)",
            "CREATE INDEX IF NOT EXISTS idx_alerts_status ON alerts(status)",
            "CREATE INDEX IF NOT EXISTS idx_alerts_created_at ON alerts(created_at)",
        ] {
            sqlx::query(statement).execute(&self.pool).await?;
        }

        info!("Database schema verified");
        Ok(())
    }
}

#[async_trait]
impl MessageStore for PgMessageStore {
    async fn save_message(&self, message: &NewMessageRecord) -> Result<i64, StorageError> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO messages (origin_message_id, source_id, user_id, username,
                                  message_text, message_kind)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (origin_message_id, source_id)
            DO UPDATE SET processed_at = NOW()
            RETURNING id
            "#,
        )
        .bind(message.origin_message_id)
        .bind(message.source_id)
        .bind(message.user_id)
        .bind(&message.username)
        .bind(&message.text)
        .bind(message.kind.as_str())
        .fetch_one(&self.pool)
        .await?;

        debug!(message_id = id, source_id = message.source_id, "Message saved");
        Ok(id)
    }

    async fn save_image(&self, image: &NewImageRecord) -> Result<i64, StorageError> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO images (message_id, file_id, ocr_text, ocr_confidence, processed_at)
            VALUES ($1, $2, $3, $4, NOW())
            RETURNING id
            "#,
        )
        .bind(image.message_id)
        .bind(&image.file_id)
        .bind(&image.ocr_text)
        .bind(image.ocr_confidence)
        .fetch_one(&self.pool)
        .await?;

        debug!(image_id = id, "Image saved");
        Ok(id)
    }

    async fn create_alert(&self, alert: &AlertRecord) -> Result<i64, StorageError> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO alerts (alert_ref, message_id, alert_type, keywords_found,
                                confidence_score, status)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            "#,
        )
        .bind(alert.alert_ref)
        .bind(alert.message_id)
        .bind(alert.alert_type.as_str())
        .bind(&alert.keywords_found)
        .bind(alert.confidence_score)
        .bind(alert.status.as_str())
        .fetch_one(&self.pool)
        .await?;

        debug!(alert_id = id, alert_type = %alert.alert_type, "Alert created");
        Ok(id)
    }

    async fn recent_alerts(&self, hours: i32) -> Result<Vec<StoredAlert>, StorageError> {
        let alerts = sqlx::query_as::<_, StoredAlert>(
            r#"
            SELECT a.id, a.alert_ref, a.message_id, a.alert_type, a.keywords_found,
                   a.confidence_score, a.status, a.created_at,
                   m.source_id, m.username, m.message_text
            FROM alerts a
            JOIN messages m ON a.message_id = m.id
            WHERE a.created_at > NOW() - make_interval(hours => $1)
            ORDER BY a.created_at DESC
            LIMIT 100
            "#,
        )
        .bind(hours)
        .fetch_all(&self.pool)
        .await?;

        Ok(alerts)
    }
}

#[cfg(test)]
mod tests {
    // Integration tests would require a running PostgreSQL instance; the
    // analysis paths are covered with the in-memory store in crate::testing.
}
