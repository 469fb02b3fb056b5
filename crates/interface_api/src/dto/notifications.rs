//! Notification DTOs

use chrono::{DateTime, Utc};
use serde::Serialize;

use core_kernel::{ItemId, NotificationId, UserId};
use domain_items::{Notification, NotificationType};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationResponse {
    pub id: NotificationId,
    pub user: UserId,
    #[serde(rename = "type")]
    pub notification_type: NotificationType,
    pub title: String,
    pub message: String,
    pub read: bool,
    pub related_item: Option<ItemId>,
    pub created_at: DateTime<Utc>,
}

impl From<Notification> for NotificationResponse {
    fn from(notification: Notification) -> Self {
        Self {
            id: notification.id,
            user: notification.user_id,
            notification_type: notification.notification_type,
            title: notification.title,
            message: notification.message,
            read: notification.read,
            related_item: notification.related_item,
            created_at: notification.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MarkAllReadResponse {
    pub message: String,
    pub updated: u64,
}
