//! Claim notifications and the per-user inbox

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use core_kernel::{CoreError, ItemId, NotificationId, PortError, UserId};
use crate::actor::Actor;
use crate::error::ItemError;
use crate::item::Item;
use crate::ports::NotificationPort;

/// Notification severity shown to the recipient
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationType {
    Success,
    Info,
    Warning,
}

impl NotificationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationType::Success => "success",
            NotificationType::Info => "info",
            NotificationType::Warning => "warning",
        }
    }
}

impl fmt::Display for NotificationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NotificationType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "success" => Ok(NotificationType::Success),
            "info" => Ok(NotificationType::Info),
            "warning" => Ok(NotificationType::Warning),
            other => Err(CoreError::validation(format!("Unknown notification type: {other}"))),
        }
    }
}

/// A message addressed to one user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: NotificationId,
    pub user_id: UserId,
    pub notification_type: NotificationType,
    pub title: String,
    pub message: String,
    /// Flips to true once and never reverts
    pub read: bool,
    pub related_item: Option<ItemId>,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn new(
        user_id: UserId,
        notification_type: NotificationType,
        title: impl Into<String>,
        message: impl Into<String>,
        related_item: Option<ItemId>,
    ) -> Self {
        Self {
            id: NotificationId::new_v7(),
            user_id,
            notification_type,
            title: title.into(),
            message: message.into(),
            read: false,
            related_item,
            created_at: Utc::now(),
        }
    }

    /// Sent to the reporter when someone claims their item
    pub fn claim_request(item: &Item) -> Self {
        Self::new(
            item.reported_by,
            NotificationType::Info,
            "Item Claim Request",
            format!(
                "Someone has requested to claim your {} item: {}.",
                item.item_type.opposite(),
                item.description
            ),
            Some(item.id),
        )
    }

    /// Sent to the claimant when the reporter decides
    pub fn claim_resolved(item: &Item, claimant: UserId, approved: bool) -> Self {
        if approved {
            Self::new(
                claimant,
                NotificationType::Success,
                "Claim Approved",
                format!(
                    "Your claim for \"{}\" has been approved. Please visit the lost and found office to collect your item.",
                    item.description
                ),
                Some(item.id),
            )
        } else {
            Self::new(
                claimant,
                NotificationType::Warning,
                "Claim Rejected",
                format!("Your claim for \"{}\" has been rejected.", item.description),
                Some(item.id),
            )
        }
    }

    pub fn mark_read(&mut self) {
        self.read = true;
    }
}

/// Records notifications as a side effect of claim transitions
#[derive(Clone)]
pub struct NotificationDispatcher {
    notifications: Arc<dyn NotificationPort>,
}

impl NotificationDispatcher {
    pub fn new(notifications: Arc<dyn NotificationPort>) -> Self {
        Self { notifications }
    }

    pub async fn claim_submitted(&self, item: &Item) -> Result<Notification, PortError> {
        self.dispatch(Notification::claim_request(item)).await
    }

    pub async fn claim_resolved(
        &self,
        item: &Item,
        claimant: UserId,
        approved: bool,
    ) -> Result<Notification, PortError> {
        self.dispatch(Notification::claim_resolved(item, claimant, approved)).await
    }

    async fn dispatch(&self, notification: Notification) -> Result<Notification, PortError> {
        self.notifications.create_notification(&notification).await?;
        tracing::debug!(
            notification_id = %notification.id,
            user_id = %notification.user_id,
            kind = %notification.notification_type,
            "Notification recorded"
        );
        Ok(notification)
    }
}

/// Read side of a user's notifications
#[derive(Clone)]
pub struct NotificationInbox {
    notifications: Arc<dyn NotificationPort>,
}

impl NotificationInbox {
    pub fn new(notifications: Arc<dyn NotificationPort>) -> Self {
        Self { notifications }
    }

    /// The actor's notifications, newest first
    pub async fn list_for(&self, actor: &Actor) -> Result<Vec<Notification>, ItemError> {
        Ok(self.notifications.find_for_user(actor.id).await?)
    }

    /// Marks one of the actor's notifications as read
    ///
    /// Notifications addressed to someone else are reported as not found.
    pub async fn mark_read(&self, actor: &Actor, id: NotificationId) -> Result<Notification, ItemError> {
        self.notifications
            .mark_read(id, actor.id)
            .await
            .map_err(|err| {
                if err.is_not_found() {
                    ItemError::NotificationNotFound(id)
                } else {
                    ItemError::Store(err)
                }
            })
    }

    /// Returns how many notifications changed
    pub async fn mark_all_read(&self, actor: &Actor) -> Result<u64, ItemError> {
        let updated = self.notifications.mark_all_read(actor.id).await?;
        tracing::debug!(user_id = %actor.id, updated, "Marked notifications read");
        Ok(updated)
    }
}
