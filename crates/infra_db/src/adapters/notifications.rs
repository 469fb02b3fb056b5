//! PostgreSQL Notification Adapter

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::{debug, instrument};

use core_kernel::{
    DomainPort, HealthCheckResult, HealthCheckable, ItemId, NotificationId, PortError, UserId,
};
use domain_items::{Notification, NotificationPort, NotificationType};

use super::{db_to_port_error, probe};
use crate::repositories::notifications::{
    NotificationRepository, NotificationRow, NotificationType as DbNotificationType,
};

/// PostgreSQL-backed implementation of the NotificationPort trait
#[derive(Debug, Clone)]
pub struct PostgresNotificationAdapter {
    repository: NotificationRepository,
    pool: PgPool,
}

impl PostgresNotificationAdapter {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: NotificationRepository::new(pool.clone()),
            pool,
        }
    }
}

impl DomainPort for PostgresNotificationAdapter {}

#[async_trait]
impl HealthCheckable for PostgresNotificationAdapter {
    async fn health_check(&self) -> HealthCheckResult {
        probe(&self.pool, "postgres-notification-adapter").await
    }
}

#[async_trait]
impl NotificationPort for PostgresNotificationAdapter {
    #[instrument(skip(self, notification), fields(notification_id = %notification.id, user_id = %notification.user_id))]
    async fn create_notification(&self, notification: &Notification) -> Result<(), PortError> {
        self.repository
            .insert(&NotificationRow::from(notification))
            .await
            .map_err(db_to_port_error)
    }

    #[instrument(skip(self), fields(user_id = %user))]
    async fn find_for_user(&self, user: UserId) -> Result<Vec<Notification>, PortError> {
        let rows = self
            .repository
            .find_for_user(user.into())
            .await
            .map_err(db_to_port_error)?;
        debug!(count = rows.len(), "Notifications loaded");
        Ok(rows.into_iter().map(Into::into).collect())
    }

    #[instrument(skip(self), fields(notification_id = %id, user_id = %user))]
    async fn mark_read(&self, id: NotificationId, user: UserId) -> Result<Notification, PortError> {
        let row = self
            .repository
            .mark_read(id.into(), user.into())
            .await
            .map_err(db_to_port_error)?;
        Ok(row.into())
    }

    #[instrument(skip(self), fields(user_id = %user))]
    async fn mark_all_read(&self, user: UserId) -> Result<u64, PortError> {
        self.repository
            .mark_all_read(user.into())
            .await
            .map_err(db_to_port_error)
    }

    #[instrument(skip(self))]
    async fn purge_read_before(&self, cutoff: DateTime<Utc>) -> Result<u64, PortError> {
        self.repository
            .delete_read_before(cutoff)
            .await
            .map_err(db_to_port_error)
    }
}

impl From<&Notification> for NotificationRow {
    fn from(notification: &Notification) -> Self {
        NotificationRow {
            notification_id: notification.id.into(),
            user_id: notification.user_id.into(),
            notification_type: match notification.notification_type {
                NotificationType::Success => DbNotificationType::Success,
                NotificationType::Info => DbNotificationType::Info,
                NotificationType::Warning => DbNotificationType::Warning,
            },
            title: notification.title.clone(),
            message: notification.message.clone(),
            is_read: notification.read,
            related_item: notification.related_item.map(Into::into),
            created_at: notification.created_at,
        }
    }
}

impl From<NotificationRow> for Notification {
    fn from(row: NotificationRow) -> Self {
        Notification {
            id: NotificationId::from(row.notification_id),
            user_id: UserId::from(row.user_id),
            notification_type: match row.notification_type {
                DbNotificationType::Success => NotificationType::Success,
                DbNotificationType::Info => NotificationType::Info,
                DbNotificationType::Warning => NotificationType::Warning,
            },
            title: row.title,
            message: row.message,
            read: row.is_read,
            related_item: row.related_item.map(ItemId::from),
            created_at: row.created_at,
        }
    }
}
