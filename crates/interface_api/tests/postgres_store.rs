//! PostgreSQL adapter tests
//!
//! Need Docker; run with `cargo test -p interface_api --test postgres_store -- --ignored`.

use std::sync::Arc;

use core_kernel::{IdempotencyKey, ItemId, UserId};
use domain_items::{
    ClaimOperation, ClaimTransition, ClaimWorkflow, IdempotencyPort, IdempotencyRecord, ItemCatalog,
    ItemChanges, ItemFilter, ItemPort, ItemStatus, NotificationPort, NotificationType, Role,
};
use infra_db::{
    PostgresIdempotencyAdapter, PostgresItemAdapter, PostgresNotificationAdapter,
    PostgresUserDirectory,
};
use interface_api::Ports;
use test_utils::{
    assert_item_state, assert_newest_first, create_isolated_test_database, ActorFixtures,
    ItemBuilder, ItemFixtures, UserFixtures,
};

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_item_round_trip_and_search() {
    let db = create_isolated_test_database().await.unwrap();
    let items = PostgresItemAdapter::new(db.pool().clone());

    let reporter = UserId::new();
    let older = ItemBuilder::new()
        .reported_by(reporter)
        .from_report(ItemFixtures::textbook())
        .created_minutes_ago(20)
        .build();
    let newer = ItemBuilder::new()
        .reported_by(reporter)
        .from_report(ItemFixtures::student_card())
        .created_minutes_ago(2)
        .build();
    items.insert_item(&older).await.unwrap();
    items.insert_item(&newer).await.unwrap();

    assert_eq!(items.get_item(older.id).await.unwrap().description, older.description);

    let all = items.find_items(&ItemFilter::default()).await.unwrap();
    assert_eq!(all.len(), 2);
    assert_newest_first(&all);

    let ids = items
        .find_items(&ItemFilter::default().with_search("IDs"))
        .await
        .unwrap();
    assert_eq!(ids.len(), 1);
    assert_eq!(ids[0].id, newer.id);

    let literal = items
        .find_items(&ItemFilter::default().with_search("100%"))
        .await
        .unwrap();
    assert!(literal.is_empty());

    assert!(items.get_item(ItemId::new()).await.unwrap_err().is_not_found());
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_transition_is_compare_and_swap() {
    let db = create_isolated_test_database().await.unwrap();
    let items = PostgresItemAdapter::new(db.pool().clone());
    let item = ItemBuilder::new().build();
    items.insert_item(&item).await.unwrap();

    let claimant = UserId::new();
    let outcome = items
        .transition(item.id, &ClaimTransition::Submit { claimant })
        .await
        .unwrap()
        .unwrap();
    assert_item_state(&outcome.item, ItemStatus::Pending, Some(claimant));
    assert_eq!(outcome.previous_claimant, None);

    let second = items
        .transition(item.id, &ClaimTransition::Submit { claimant: UserId::new() })
        .await
        .unwrap();
    assert!(second.is_none());

    let rejected = items
        .transition(item.id, &ClaimTransition::Reject)
        .await
        .unwrap()
        .unwrap();
    assert_item_state(&rejected.item, ItemStatus::Available, None);
    assert_eq!(rejected.previous_claimant, Some(claimant));
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_concurrent_claims_have_one_winner() {
    let db = create_isolated_test_database().await.unwrap();
    let ports = Ports::postgres(db.pool().clone());
    let workflow = ClaimWorkflow::new(
        ports.items.clone(),
        ports.notifications.clone(),
        ports.idempotency.clone(),
    );
    let item = ItemBuilder::new().build();
    ports.items.insert_item(&item).await.unwrap();

    let item_id = item.id;
    let contenders: Vec<_> = (0..8).map(|_| ActorFixtures::student()).collect();
    let handles: Vec<_> = contenders
        .iter()
        .map(|actor| {
            let workflow = workflow.clone();
            let actor = *actor;
            tokio::spawn(async move { workflow.submit_claim(item_id, &actor, None).await })
        })
        .collect();

    let mut winners = 0;
    let mut conflicts = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => winners += 1,
            Err(e) if e.is_conflict() => conflicts += 1,
            Err(e) => panic!("unexpected error: {e}"),
        }
    }
    assert_eq!(winners, 1);
    assert_eq!(conflicts, 7);

    let notifications = ports.notifications.find_for_user(item.reported_by).await.unwrap();
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].notification_type, NotificationType::Info);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_update_keeps_status_and_blank_fields() {
    let db = create_isolated_test_database().await.unwrap();
    let items: Arc<dyn ItemPort> = Arc::new(PostgresItemAdapter::new(db.pool().clone()));
    let users = PostgresUserDirectory::new(db.pool().clone());

    let reporter = ActorFixtures::student();
    users
        .upsert(&UserFixtures::summary_for(&reporter, "Efua", "Asante"), Role::Student)
        .await
        .unwrap();
    let catalog = ItemCatalog::new(items.clone(), Arc::new(users));

    let item = catalog.report(&reporter, ItemFixtures::found_wallet()).await.unwrap();
    let details = catalog
        .update(
            &reporter,
            item.id,
            ItemChanges {
                location: Some("Security post".to_string()),
                notes: Some("   ".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(details.item.location, "Security post");
    assert_eq!(details.item.notes, item.notes);
    assert_eq!(details.item.status, ItemStatus::Available);
    assert_eq!(details.reporter.unwrap().first_name, "Efua");
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_notifications_and_retention() {
    let db = create_isolated_test_database().await.unwrap();
    let items = PostgresItemAdapter::new(db.pool().clone());
    let notifications = PostgresNotificationAdapter::new(db.pool().clone());

    let item = ItemBuilder::new().build();
    items.insert_item(&item).await.unwrap();
    let request = domain_items::Notification::claim_request(&item);
    notifications.create_notification(&request).await.unwrap();

    let stranger = UserId::new();
    assert!(notifications
        .mark_read(request.id, stranger)
        .await
        .unwrap_err()
        .is_not_found());

    let read = notifications.mark_read(request.id, item.reported_by).await.unwrap();
    assert!(read.read);
    assert_eq!(notifications.mark_all_read(item.reported_by).await.unwrap(), 0);

    items.delete_item(item.id).await.unwrap();
    let remaining = notifications.find_for_user(item.reported_by).await.unwrap();
    assert_eq!(remaining[0].related_item, None);

    let purged = notifications
        .purge_read_before(chrono::Utc::now() + chrono::Duration::minutes(1))
        .await
        .unwrap();
    assert_eq!(purged, 1);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_idempotency_records() {
    let db = create_isolated_test_database().await.unwrap();
    let store = PostgresIdempotencyAdapter::new(db.pool().clone());
    let user = UserId::new();
    let record = IdempotencyRecord::new(
        IdempotencyKey::new(),
        user,
        ClaimOperation::ApproveClaim,
        ItemId::new(),
    );

    store.store(&record).await.unwrap();
    store.store(&record).await.unwrap();

    let found = store.lookup(record.key, user).await.unwrap().unwrap();
    assert_eq!(found.operation, ClaimOperation::ApproveClaim);
    assert!(store.lookup(record.key, UserId::new()).await.unwrap().is_none());

    let purged = store
        .purge_before(chrono::Utc::now() + chrono::Duration::minutes(1))
        .await
        .unwrap();
    assert_eq!(purged, 1);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_admin_role_round_trips_through_directory() {
    let db = create_isolated_test_database().await.unwrap();
    let users = PostgresUserDirectory::new(db.pool().clone());
    let admin = ActorFixtures::admin();
    let summary = UserFixtures::summary_for(&admin, "Yaw", "Boateng");

    users.upsert(&summary, admin.role).await.unwrap();
    users.upsert(&summary, Role::Admin).await.unwrap();

    let found = domain_items::UserDirectoryPort::find_summaries(&users, &[admin.id, UserId::new()])
        .await
        .unwrap();
    assert_eq!(found, vec![summary]);
}
