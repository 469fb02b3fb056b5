//! Application state and port wiring

use chrono::{DateTime, TimeDelta, Utc};
use std::sync::Arc;
use tracing::{info, warn};

use domain_items::{
    ClaimWorkflow, IdempotencyPort, ItemCatalog, ItemPort, NotificationInbox, NotificationPort,
    UserDirectoryPort,
};
use infra_db::{
    DatabasePool, PostgresIdempotencyAdapter, PostgresItemAdapter, PostgresNotificationAdapter,
    PostgresUserDirectory,
};

use crate::auth::{IdentityProvider, JwtIdentityProvider};
use crate::config::ApiConfig;

/// The storage ports the services run on
#[derive(Clone)]
pub struct Ports {
    pub items: Arc<dyn ItemPort>,
    pub notifications: Arc<dyn NotificationPort>,
    pub users: Arc<dyn UserDirectoryPort>,
    pub idempotency: Arc<dyn IdempotencyPort>,
}

impl Ports {
    /// PostgreSQL adapters sharing one pool
    pub fn postgres(pool: DatabasePool) -> Self {
        Self {
            items: Arc::new(PostgresItemAdapter::new(pool.clone())),
            notifications: Arc::new(PostgresNotificationAdapter::new(pool.clone())),
            users: Arc::new(PostgresUserDirectory::new(pool.clone())),
            idempotency: Arc::new(PostgresIdempotencyAdapter::new(pool)),
        }
    }
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub catalog: ItemCatalog,
    pub workflow: ClaimWorkflow,
    pub inbox: NotificationInbox,
    pub identity: Arc<dyn IdentityProvider>,
    pub ports: Ports,
    pub config: ApiConfig,
}

impl AppState {
    /// Builds the services over `ports`, with a JWT identity provider from `config`
    pub fn new(ports: Ports, config: ApiConfig) -> Self {
        let identity = Arc::new(JwtIdentityProvider::new(
            config.jwt_secret.clone(),
            config.jwt_expiration_secs,
        ));
        Self::with_identity(ports, config, identity)
    }

    pub fn with_identity(
        ports: Ports,
        config: ApiConfig,
        identity: Arc<dyn IdentityProvider>,
    ) -> Self {
        Self {
            catalog: ItemCatalog::new(ports.items.clone(), ports.users.clone()),
            workflow: ClaimWorkflow::new(
                ports.items.clone(),
                ports.notifications.clone(),
                ports.idempotency.clone(),
            ),
            inbox: NotificationInbox::new(ports.notifications.clone()),
            identity,
            ports,
            config,
        }
    }
}

/// Removes read notifications past retention and expired idempotency records
///
/// Failures are logged and skipped; the server still starts.
pub async fn sweep_retention(ports: &Ports, config: &ApiConfig) {
    let now = Utc::now();

    let retention = TimeDelta::try_days(i64::from(config.notification_retention_days));
    match retention_cutoff(now, retention) {
        Some(cutoff) => match ports.notifications.purge_read_before(cutoff).await {
            Ok(removed) => info!(removed, cutoff = %cutoff, "Purged read notifications"),
            Err(e) => warn!(error = %e, "Notification retention sweep failed"),
        },
        None => warn!(
            days = config.notification_retention_days,
            "Notification retention out of range, skipping sweep"
        ),
    }

    let ttl = TimeDelta::try_hours(i64::from(config.idempotency_ttl_hours));
    match retention_cutoff(now, ttl) {
        Some(cutoff) => match ports.idempotency.purge_before(cutoff).await {
            Ok(removed) => info!(removed, cutoff = %cutoff, "Purged idempotency records"),
            Err(e) => warn!(error = %e, "Idempotency retention sweep failed"),
        },
        None => warn!(
            hours = config.idempotency_ttl_hours,
            "Idempotency TTL out of range, skipping sweep"
        ),
    }
}

/// `now - window`, or `None` for an empty or unrepresentable window
fn retention_cutoff(now: DateTime<Utc>, window: Option<TimeDelta>) -> Option<DateTime<Utc>> {
    window
        .filter(|window| *window > TimeDelta::zero())
        .and_then(|window| now.checked_sub_signed(window))
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::{IdempotencyKey, ItemId, UserId};
    use domain_items::ports::mock::{
        MockIdempotencyPort, MockItemPort, MockNotificationPort, MockUserDirectory,
    };
    use domain_items::{ClaimOperation, IdempotencyRecord, Notification, NotificationType};

    #[tokio::test]
    async fn test_sweep_removes_only_stale_records() {
        let notifications = Arc::new(MockNotificationPort::new());
        let idempotency = Arc::new(MockIdempotencyPort::new());
        let ports = Ports {
            items: Arc::new(MockItemPort::new()),
            notifications: notifications.clone(),
            users: Arc::new(MockUserDirectory::new()),
            idempotency: idempotency.clone(),
        };
        let user = UserId::new();

        let mut stale = Notification::new(user, NotificationType::Info, "Old", "old", None);
        stale.mark_read();
        stale.created_at = Utc::now() - TimeDelta::days(400);
        let unread_old = Notification {
            id: core_kernel::NotificationId::new(),
            read: false,
            ..stale.clone()
        };
        notifications.create_notification(&stale).await.unwrap();
        notifications.create_notification(&unread_old).await.unwrap();

        let mut expired =
            IdempotencyRecord::new(IdempotencyKey::new(), user, ClaimOperation::SubmitClaim, ItemId::new());
        expired.created_at = Utc::now() - TimeDelta::hours(48);
        let fresh =
            IdempotencyRecord::new(IdempotencyKey::new(), user, ClaimOperation::SubmitClaim, ItemId::new());
        idempotency.store(&expired).await.unwrap();
        idempotency.store(&fresh).await.unwrap();

        sweep_retention(&ports, &ApiConfig::default()).await;

        let remaining = notifications.all().await;
        assert_eq!(remaining.len(), 1);
        assert!(!remaining[0].read);
        assert!(idempotency.lookup(expired.key, user).await.unwrap().is_none());
        assert!(idempotency.lookup(fresh.key, user).await.unwrap().is_some());
    }

    #[test]
    fn test_cutoff_rejects_empty_and_unrepresentable_windows() {
        let now = Utc::now();
        assert_eq!(
            retention_cutoff(now, TimeDelta::try_hours(24)),
            Some(now - TimeDelta::hours(24))
        );
        assert_eq!(retention_cutoff(now, Some(TimeDelta::zero())), None);
        assert_eq!(retention_cutoff(now, Some(TimeDelta::days(-1))), None);
        assert_eq!(
            retention_cutoff(now, TimeDelta::try_days(i64::from(u32::MAX))),
            None
        );
        assert_eq!(retention_cutoff(now, None), None);
    }

    #[tokio::test]
    async fn test_out_of_range_retention_skips_sweep() {
        let notifications = Arc::new(MockNotificationPort::new());
        let idempotency = Arc::new(MockIdempotencyPort::new());
        let ports = Ports {
            items: Arc::new(MockItemPort::new()),
            notifications: notifications.clone(),
            users: Arc::new(MockUserDirectory::new()),
            idempotency: idempotency.clone(),
        };
        let user = UserId::new();

        let mut just_read = Notification::new(user, NotificationType::Info, "New", "new", None);
        just_read.mark_read();
        notifications.create_notification(&just_read).await.unwrap();
        let record =
            IdempotencyRecord::new(IdempotencyKey::new(), user, ClaimOperation::SubmitClaim, ItemId::new());
        idempotency.store(&record).await.unwrap();

        let config = ApiConfig {
            notification_retention_days: u32::MAX,
            idempotency_ttl_hours: u32::MAX,
            ..ApiConfig::default()
        };
        sweep_retention(&ports, &config).await;

        assert_eq!(notifications.all().await.len(), 1);
        assert!(idempotency.lookup(record.key, user).await.unwrap().is_some());
    }
}
