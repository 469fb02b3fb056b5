//! Notification repository implementation

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::DatabaseError;

const NOTIFICATION_COLUMNS: &str = "notification_id, user_id, notification_type, title, message, \
     is_read, related_item, created_at";

/// Repository for per-user notifications
#[derive(Debug, Clone)]
pub struct NotificationRepository {
    pool: PgPool,
}

impl NotificationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, row: &NotificationRow) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO notifications (
                notification_id, user_id, notification_type, title, message,
                is_read, related_item, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(row.notification_id)
        .bind(row.user_id)
        .bind(row.notification_type)
        .bind(&row.title)
        .bind(&row.message)
        .bind(row.is_read)
        .bind(row.related_item)
        .bind(row.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Notifications for a user, newest first
    pub async fn find_for_user(&self, user_id: Uuid) -> Result<Vec<NotificationRow>, DatabaseError> {
        let sql = format!(
            "SELECT {NOTIFICATION_COLUMNS} FROM notifications \
             WHERE user_id = $1 ORDER BY created_at DESC, notification_id DESC"
        );
        let rows = sqlx::query_as::<_, NotificationRow>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Marks a notification read if it belongs to `user_id`
    pub async fn mark_read(
        &self,
        notification_id: Uuid,
        user_id: Uuid,
    ) -> Result<NotificationRow, DatabaseError> {
        let sql = format!(
            "UPDATE notifications SET is_read = TRUE \
             WHERE notification_id = $1 AND user_id = $2 \
             RETURNING {NOTIFICATION_COLUMNS}"
        );
        sqlx::query_as::<_, NotificationRow>(&sql)
            .bind(notification_id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::not_found("Notification", notification_id))
    }

    pub async fn mark_all_read(&self, user_id: Uuid) -> Result<u64, DatabaseError> {
        let result = sqlx::query(
            "UPDATE notifications SET is_read = TRUE WHERE user_id = $1 AND NOT is_read",
        )
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    pub async fn delete_read_before(&self, cutoff: DateTime<Utc>) -> Result<u64, DatabaseError> {
        let result = sqlx::query("DELETE FROM notifications WHERE is_read AND created_at < $1")
            .bind(cutoff)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "notification_type", rename_all = "lowercase")]
pub enum NotificationType {
    Success,
    Info,
    Warning,
}

/// Database row for a notification
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct NotificationRow {
    pub notification_id: Uuid,
    pub user_id: Uuid,
    pub notification_type: NotificationType,
    pub title: String,
    pub message: String,
    pub is_read: bool,
    pub related_item: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}
