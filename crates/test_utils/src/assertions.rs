//! Custom Test Assertions
//!
//! Assertion helpers for items and notifications that give more meaningful
//! failure messages than plain `assert!`.

use core_kernel::UserId;
use domain_items::{Item, ItemStatus, Notification, NotificationType};

/// Asserts `claimed_by` is set exactly when the status is pending or claimed
pub fn assert_claimant_consistent(item: &Item) {
    assert!(
        item.has_consistent_claimant(),
        "Item {} is {} but claimed_by is {:?}",
        item.id,
        item.status,
        item.claimed_by
    );
}

/// Asserts an item's status and claimant together
pub fn assert_item_state(item: &Item, status: ItemStatus, claimant: Option<UserId>) {
    assert_eq!(item.status, status, "Unexpected status for item {}", item.id);
    assert_eq!(
        item.claimed_by, claimant,
        "Unexpected claimant for item {}",
        item.id
    );
    assert_claimant_consistent(item);
}

/// Asserts items are ordered by descending creation time
pub fn assert_newest_first(items: &[Item]) {
    for pair in items.windows(2) {
        assert!(
            pair[0].created_at >= pair[1].created_at,
            "Item {} ({}) listed before newer item {} ({})",
            pair[0].id,
            pair[0].created_at,
            pair[1].id,
            pair[1].created_at
        );
    }
}

/// Asserts exactly one notification of `kind` was sent to `user`, and returns it
pub fn assert_single_notification<'a>(
    notifications: &'a [Notification],
    user: UserId,
    kind: NotificationType,
) -> &'a Notification {
    let matching: Vec<&Notification> = notifications
        .iter()
        .filter(|n| n.user_id == user && n.notification_type == kind)
        .collect();
    assert_eq!(
        matching.len(),
        1,
        "Expected one {kind} notification for {user}, found {}",
        matching.len()
    );
    matching[0]
}
