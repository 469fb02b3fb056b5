//! HTTP API tests
//!
//! Drive the full router (middleware included) over in-memory ports.

mod common;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use serde_json::{json, Value};
use std::time::Duration;

use core_kernel::ItemId;
use domain_items::{ItemPort, ItemStatus, NotificationType};
use test_utils::{ActorFixtures, ItemBuilder, UserFixtures};

use common::TestApp;
use interface_api::config::ApiConfig;

fn report_body() -> Value {
    json!({
        "category": "Electronics",
        "description": "Grey Dell laptop in a black sleeve",
        "date": "2024-03-14",
        "location": "Computer science lab 2",
        "type": "found",
        "contactInfo": "porters@campus.example.edu"
    })
}

async fn report_item(app: &TestApp, actor: &domain_items::Actor) -> String {
    let (status, body) = app.post("/api/items", actor, report_body()).await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_str().unwrap().to_string()
}

mod health {
    use super::*;

    #[tokio::test]
    async fn test_health_and_readiness() {
        let app = TestApp::new();

        let (status, body) = app.get("/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");

        let (status, body) = app.get("/health/ready", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ready");
        assert_eq!(body["checks"].as_array().unwrap().len(), 4);
    }
}

mod authentication {
    use super::*;

    #[tokio::test]
    async fn test_missing_token_is_unauthorized() {
        let app = TestApp::new();
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/items")
            .header("content-type", "application/json")
            .body(Body::from(report_body().to_string()))
            .unwrap();

        let (status, body) = app.send(request).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "unauthorized");
        assert_eq!(body["message"], "No token, authorization denied");
    }

    #[tokio::test]
    async fn test_invalid_token_is_unauthorized() {
        let app = TestApp::new();
        let request = Request::builder()
            .uri("/api/items/user")
            .header("x-auth-token", "not-a-jwt")
            .body(Body::empty())
            .unwrap();

        let (status, body) = app.send(request).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "Token is not valid");
    }

    #[tokio::test]
    async fn test_bearer_header_is_accepted() {
        let app = TestApp::new();
        let actor = ActorFixtures::student();
        let request = Request::builder()
            .uri("/api/items/user")
            .header("authorization", format!("Bearer {}", app.token(&actor)))
            .body(Body::empty())
            .unwrap();

        let (status, body) = app.send(request).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_public_reads_need_no_token() {
        let app = TestApp::new();
        let (status, _) = app.get("/api/items", None).await;
        assert_eq!(status, StatusCode::OK);
    }
}

mod items {
    use super::*;

    #[tokio::test]
    async fn test_create_item() {
        let app = TestApp::new();
        let reporter = ActorFixtures::student();

        let (status, body) = app.post("/api/items", &reporter, report_body()).await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["status"], "available");
        assert_eq!(body["type"], "found");
        assert_eq!(body["category"], "Electronics");
        assert_eq!(body["date"], "2024-03-14");
        assert_eq!(body["reportedBy"]["id"], reporter.id.as_uuid().to_string());
        assert!(body["claimedBy"].is_null());
        assert_eq!(body["contactInfo"], "porters@campus.example.edu");
        assert_eq!(app.items.len().await, 1);
    }

    #[tokio::test]
    async fn test_create_item_validation() {
        let app = TestApp::new();
        let reporter = ActorFixtures::student();

        let mut blank = report_body();
        blank["location"] = json!("");
        let (status, body) = app.post("/api/items", &reporter, blank).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "validation_error");
        assert_eq!(body["message"], "Location is required");

        let mut bad_type = report_body();
        bad_type["type"] = json!("misplaced");
        let (status, body) = app.post("/api/items", &reporter, bad_type).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "validation_error");

        assert_eq!(app.items.len().await, 0);
    }

    #[tokio::test]
    async fn test_list_filters_newest_first() {
        let reporter = ActorFixtures::student();
        let claimant = ActorFixtures::student();
        let oldest = ItemBuilder::new()
            .reported_by(reporter.id)
            .description("Blue umbrella")
            .created_minutes_ago(30)
            .build();
        let newest = ItemBuilder::new()
            .reported_by(reporter.id)
            .description("Red umbrella")
            .created_minutes_ago(1)
            .build();
        let pending = ItemBuilder::new()
            .reported_by(reporter.id)
            .description("Green umbrella")
            .pending(claimant.id)
            .created_minutes_ago(10)
            .build();
        let app = TestApp::with_items(vec![oldest.clone(), newest.clone(), pending]);

        let (status, body) = app.get("/api/items?status=available", None).await;
        assert_eq!(status, StatusCode::OK);
        let ids: Vec<&str> = body
            .as_array()
            .unwrap()
            .iter()
            .map(|item| item["id"].as_str().unwrap())
            .collect();
        assert_eq!(
            ids,
            vec![
                newest.id.as_uuid().to_string(),
                oldest.id.as_uuid().to_string()
            ]
        );

        let (_, body) = app.get("/api/items?search=green&type=", None).await;
        let items = body.as_array().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["status"], "pending");

        let (status, body) = app.get("/api/items?status=lost-forever", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "validation_error");
    }

    #[tokio::test]
    async fn test_list_mine_returns_only_own_reports() {
        let me = ActorFixtures::student();
        let other = ActorFixtures::staff();
        let app = TestApp::with_items(vec![
            ItemBuilder::new().reported_by(me.id).build(),
            ItemBuilder::new().reported_by(other.id).build(),
        ]);

        let (status, body) = app.get("/api/items/user", Some(&me)).await;
        assert_eq!(status, StatusCode::OK);
        let items = body.as_array().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["reportedBy"]["id"], me.id.as_uuid().to_string());
    }

    #[tokio::test]
    async fn test_get_item_resolves_reporter_names() {
        let reporter = ActorFixtures::student();
        let item = ItemBuilder::new().reported_by(reporter.id).build();
        let app = TestApp::with_items(vec![item.clone()]);
        app.users
            .add_user(UserFixtures::summary_for(&reporter, "Kofi", "Mensah"))
            .await;

        let (status, body) = app.get(&format!("/api/items/{}", item.id), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["reportedBy"]["firstName"], "Kofi");
        assert_eq!(body["reportedBy"]["lastName"], "Mensah");
    }

    #[tokio::test]
    async fn test_get_unknown_item_is_not_found() {
        let app = TestApp::new();

        let (status, body) = app.get(&format!("/api/items/{}", ItemId::new()), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "Item not found");

        let (status, _) = app.get("/api/items/not-an-id", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_update_requires_owner_or_admin() {
        let reporter = ActorFixtures::student();
        let item = ItemBuilder::new().reported_by(reporter.id).build();
        let app = TestApp::with_items(vec![item.clone()]);
        let uri = format!("/api/items/{}", item.id);

        let (status, body) = app
            .put(&uri, &ActorFixtures::student(), json!({ "notes": "mine now" }))
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["message"], "Not authorized to update this item");

        let (status, body) = app
            .put(&uri, &reporter, json!({ "description": "Silver laptop" }))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["description"], "Silver laptop");

        let (status, body) = app
            .put(&uri, &ActorFixtures::admin(), json!({ "location": "Security office" }))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["location"], "Security office");
        assert_eq!(body["description"], "Silver laptop");
    }

    #[tokio::test]
    async fn test_update_cannot_change_status_or_claimant() {
        let reporter = ActorFixtures::student();
        let item = ItemBuilder::new().reported_by(reporter.id).build();
        let app = TestApp::with_items(vec![item.clone()]);
        let uri = format!("/api/items/{}", item.id);

        let (status, body) = app.put(&uri, &reporter, json!({ "status": "claimed" })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "validation_error");

        let (status, body) = app
            .put(
                &uri,
                &reporter,
                json!({ "status": "available", "claimedBy": ActorFixtures::student().id }),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "available");
        assert!(body["claimedBy"].is_null());
    }

    #[tokio::test]
    async fn test_delete_item() {
        let reporter = ActorFixtures::student();
        let item = ItemBuilder::new().reported_by(reporter.id).build();
        let app = TestApp::with_items(vec![item.clone()]);
        let uri = format!("/api/items/{}", item.id);

        let stranger = ActorFixtures::staff();
        let (status, _) = app.request(Method::DELETE, &uri, Some(&stranger), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, body) = app
            .request(Method::DELETE, &uri, Some(&ActorFixtures::admin()), None)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Item deleted successfully");

        let (status, _) = app.get(&uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}

mod claims {
    use super::*;

    #[tokio::test]
    async fn test_claim_then_approve() {
        let app = TestApp::new();
        let reporter = ActorFixtures::student();
        let claimant = ActorFixtures::student();
        let id = report_item(&app, &reporter).await;

        let (status, body) = app.claim(&id, &claimant).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "pending");
        assert_eq!(body["claimedBy"]["id"], claimant.id.as_uuid().to_string());

        let (_, inbox) = app.get("/api/users/notifications", Some(&reporter)).await;
        let inbox = inbox.as_array().unwrap();
        assert_eq!(inbox.len(), 1);
        assert_eq!(inbox[0]["type"], "info");
        assert_eq!(inbox[0]["relatedItem"], id.as_str());

        let (status, body) = app.process(&id, &reporter, true).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "claimed");
        assert_eq!(body["claimedBy"]["id"], claimant.id.as_uuid().to_string());

        let (_, inbox) = app.get("/api/users/notifications", Some(&claimant)).await;
        let inbox = inbox.as_array().unwrap();
        assert_eq!(inbox.len(), 1);
        assert_eq!(inbox[0]["type"], "success");
        assert_eq!(inbox[0]["read"], false);
    }

    #[tokio::test]
    async fn test_reject_then_reclaim() {
        let app = TestApp::new();
        let reporter = ActorFixtures::student();
        let first = ActorFixtures::student();
        let second = ActorFixtures::staff();
        let id = report_item(&app, &reporter).await;

        app.claim(&id, &first).await;
        let (status, body) = app.process(&id, &reporter, false).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "available");
        assert!(body["claimedBy"].is_null());

        let (_, inbox) = app.get("/api/users/notifications", Some(&first)).await;
        assert_eq!(inbox[0]["type"], "warning");

        let (status, body) = app.claim(&id, &second).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["claimedBy"]["id"], second.id.as_uuid().to_string());
    }

    #[tokio::test]
    async fn test_second_claim_conflicts() {
        let app = TestApp::new();
        let reporter = ActorFixtures::student();
        let first = ActorFixtures::student();
        let id = report_item(&app, &reporter).await;

        app.claim(&id, &first).await;
        let (status, body) = app.claim(&id, &ActorFixtures::student()).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "conflict");
        assert_eq!(body["message"], "Item not available for claim");

        let item = app.items.get_item(id.parse().unwrap()).await.unwrap();
        assert_eq!(item.claimed_by, Some(first.id));
    }

    #[tokio::test]
    async fn test_resolve_requires_pending() {
        let app = TestApp::new();
        let reporter = ActorFixtures::student();
        let id = report_item(&app, &reporter).await;

        let (status, body) = app.process(&id, &reporter, true).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "This item is not pending approval");
    }

    #[tokio::test]
    async fn test_only_owner_or_admin_resolves() {
        let app = TestApp::new();
        let reporter = ActorFixtures::student();
        let claimant = ActorFixtures::student();
        let id = report_item(&app, &reporter).await;
        app.claim(&id, &claimant).await;

        let (status, body) = app.process(&id, &claimant, true).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["message"], "Not authorized to process this claim");

        let (status, body) = app.process(&id, &ActorFixtures::admin(), true).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "claimed");
    }

    #[tokio::test]
    async fn test_process_claim_requires_boolean() {
        let app = TestApp::new();
        let reporter = ActorFixtures::student();
        let id = report_item(&app, &reporter).await;

        let (status, body) = app
            .put(
                &format!("/api/items/{id}/process-claim"),
                &reporter,
                json!({ "approve": "yes" }),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "validation_error");
    }

    #[tokio::test]
    async fn test_claim_unknown_item_is_not_found() {
        let app = TestApp::new();
        let (status, _) = app
            .claim(&ItemId::new().to_string(), &ActorFixtures::student())
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_idempotent_claim_retry() {
        let app = TestApp::new();
        let reporter = ActorFixtures::student();
        let claimant = ActorFixtures::student();
        let id = report_item(&app, &reporter).await;
        let key = uuid::Uuid::new_v4().to_string();

        for _ in 0..2 {
            let request = Request::builder()
                .method(Method::POST)
                .uri(format!("/api/items/{id}/claim"))
                .header("x-auth-token", app.token(&claimant))
                .header("idempotency-key", &key)
                .body(Body::empty())
                .unwrap();
            let (status, body) = app.send(request).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body["status"], "pending");
        }

        assert_eq!(app.notifications.all().await.len(), 1);
    }

    #[tokio::test]
    async fn test_malformed_idempotency_key() {
        let app = TestApp::new();
        let reporter = ActorFixtures::student();
        let id = report_item(&app, &reporter).await;

        let request = Request::builder()
            .method(Method::POST)
            .uri(format!("/api/items/{id}/claim"))
            .header("x-auth-token", app.token(&ActorFixtures::student()))
            .header("idempotency-key", "retry-please")
            .body(Body::empty())
            .unwrap();
        let (status, body) = app.send(request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Idempotency-Key must be a UUID");
    }

    #[tokio::test]
    async fn test_notification_failure_keeps_claim() {
        let app = TestApp::new();
        let reporter = ActorFixtures::student();
        let claimant = ActorFixtures::student();
        let id = report_item(&app, &reporter).await;

        app.notifications.set_failing(true);
        let (status, body) = app.claim(&id, &claimant).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "internal_error");
        assert_eq!(body["message"], "Server error");

        let item = app.items.get_item(id.parse().unwrap()).await.unwrap();
        assert_eq!(item.status, ItemStatus::Pending);
        assert_eq!(item.claimed_by, Some(claimant.id));
    }

    #[tokio::test]
    async fn test_timed_out_claim_completes_and_replays() {
        let app = TestApp::with_config(
            Vec::new(),
            ApiConfig {
                request_timeout_secs: 1,
                ..ApiConfig::default()
            },
        );
        let reporter = ActorFixtures::student();
        let claimant = ActorFixtures::student();
        let id = report_item(&app, &reporter).await;
        let key = uuid::Uuid::new_v4().to_string();
        let claim = || {
            Request::builder()
                .method(Method::POST)
                .uri(format!("/api/items/{id}/claim"))
                .header("x-auth-token", app.token(&claimant))
                .header("idempotency-key", &key)
                .body(Body::empty())
                .unwrap()
        };

        app.notifications.set_write_delay(Duration::from_millis(1500));
        let (status, body) = app.send(claim()).await;
        assert_eq!(status, StatusCode::REQUEST_TIMEOUT);
        assert_eq!(body["error"], "timeout");
        assert_eq!(body["message"], "Request timed out");

        tokio::time::sleep(Duration::from_millis(1000)).await;
        app.notifications.set_write_delay(Duration::ZERO);

        let notifications = app.notifications.all().await;
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].user_id, reporter.id);

        let (status, body) = app.send(claim()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "pending");
        assert_eq!(app.notifications.all().await.len(), 1);
    }
}

mod notifications {
    use super::*;

    #[tokio::test]
    async fn test_mark_read_is_scoped_to_owner() {
        let app = TestApp::new();
        let reporter = ActorFixtures::student();
        let claimant = ActorFixtures::student();
        let id = report_item(&app, &reporter).await;
        app.claim(&id, &claimant).await;

        let (_, inbox) = app.get("/api/users/notifications", Some(&reporter)).await;
        let notification_id = inbox[0]["id"].as_str().unwrap().to_string();
        let uri = format!("/api/users/notifications/{notification_id}");

        let (status, body) = app.put(&uri, &claimant, json!({})).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "Notification not found");

        let (status, body) = app.put(&uri, &reporter, json!({})).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["read"], true);
        assert_eq!(body["type"], NotificationType::Info.as_str());
    }

    #[tokio::test]
    async fn test_mark_all_read() {
        let app = TestApp::new();
        let reporter = ActorFixtures::student();
        for _ in 0..2 {
            let id = report_item(&app, &reporter).await;
            app.claim(&id, &ActorFixtures::student()).await;
        }

        let (status, body) = app
            .put("/api/users/notifications", &reporter, json!({}))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "All notifications marked as read");
        assert_eq!(body["updated"], 2);

        let (_, inbox) = app.get("/api/users/notifications", Some(&reporter)).await;
        assert!(inbox
            .as_array()
            .unwrap()
            .iter()
            .all(|n| n["read"] == true));
    }

    #[tokio::test]
    async fn test_inbox_requires_auth() {
        let app = TestApp::new();
        let (status, _) = app.get("/api/users/notifications", None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}
