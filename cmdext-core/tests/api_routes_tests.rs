// File: cmdext-core/tests/api_routes_tests.rs
//
// Drives the router in-process with `oneshot`, checking status codes, JSON
// bodies and the live command/job sets after every write.

mod test_utils;

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;
use cmdext_common::models::Role;
use cmdext_common::traits::CustomCommandRepository;
use cmdext_core::repositories::SqliteCustomCommandRepository;
use cmdext_core::web::router;
use test_utils::{setup_harness, sorted, Harness};

async fn call(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(v) => {
            builder = builder.header("content-type", "application/json");
            Body::from(v.to_string())
        }
        None => Body::empty(),
    };
    let resp = app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
    (status, value)
}

async fn app() -> (Harness, Router) {
    let h = setup_harness().await.unwrap();
    let app = router(h.api.clone());
    (h, app)
}

#[tokio::test]
async fn test_create_list_delete_command() {
    let (h, app) = app().await;

    let (status, body) = call(
        &app, Method::POST, "/api/commands",
        Some(json!({"commandName": "hello", "response": "Hi there!"})),
    ).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"success": true}));

    let (status, list) = call(&app, Method::GET, "/api/commands", None).await;
    assert_eq!(status, StatusCode::OK);
    let entries = list.as_array().unwrap();
    assert_eq!(entries.len(), 1);
    let entry = &entries[0];
    assert_eq!(entry["commandName"], "hello");
    assert_eq!(entry["response"], "Hi there!");
    assert_eq!(entry["requiredRole"], "Everyone");
    assert_eq!(entry["userCooldown"], 5);
    assert_eq!(entry["globalCooldown"], 0);
    assert_eq!(entry["isEnabled"], true);
    assert_eq!(h.runtime.registered_commands(), vec!["hello".to_string()]);

    let id = entry["id"].as_i64().unwrap();
    let (status, body) = call(&app, Method::DELETE, &format!("/api/commands/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"success": true}));

    let (_, list) = call(&app, Method::GET, "/api/commands", None).await;
    assert_eq!(list, json!([]));
    assert!(h.runtime.registered_commands().is_empty());
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let (_h, app) = app().await;

    let (status, body) = call(&app, Method::GET, "/unknownpath", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"error": "Not found"}));

    // Known path, wrong method.
    let (status, body) = call(&app, Method::PUT, "/api/commands", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"error": "Not found"}));
}

#[tokio::test]
async fn test_index_serves_html() {
    let (_h, app) = app().await;
    let resp = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let ct = resp.headers().get("content-type").unwrap().to_str().unwrap().to_string();
    assert!(ct.starts_with("text/html"), "{ct}");
}

#[tokio::test]
async fn test_live_set_matches_enabled_rows_after_each_write() {
    let (h, app) = app().await;
    let repo = SqliteCustomCommandRepository::new(h.db.pool().clone());

    let writes = [
        json!({"commandName": "a", "response": "1"}),
        json!({"commandName": "b", "response": "2", "isEnabled": false}),
        json!({"commandName": "c", "response": "3", "isEnabled": "true"}),
    ];
    for w in writes {
        let (status, _) = call(&app, Method::POST, "/api/commands", Some(w)).await;
        assert_eq!(status, StatusCode::OK);

        let enabled: Vec<String> = repo.list_enabled_commands().await.unwrap()
            .into_iter().map(|c| c.command_name).collect();
        assert_eq!(sorted(h.runtime.registered_commands()), sorted(enabled));
    }

    let first = repo.list_all_commands().await.unwrap()[0].id;
    call(&app, Method::DELETE, &format!("/api/commands/{first}"), None).await;
    assert_eq!(h.runtime.registered_commands(), vec!["c".to_string()]);
}

#[tokio::test]
async fn test_duplicate_name_is_conflict_and_changes_nothing() {
    let (h, app) = app().await;
    let body = json!({"commandName": "hello", "response": "first"});
    call(&app, Method::POST, "/api/commands", Some(body)).await;

    let (status, err) = call(
        &app, Method::POST, "/api/commands",
        Some(json!({"commandName": "hello", "response": "second", "isEnabled": false})),
    ).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(err["error"].is_string());

    let (_, list) = call(&app, Method::GET, "/api/commands", None).await;
    assert_eq!(list.as_array().unwrap().len(), 1);
    assert_eq!(list[0]["response"], "first");
    assert_eq!(h.runtime.registered_commands(), vec!["hello".to_string()]);
}

#[tokio::test]
async fn test_delete_missing_and_bad_ids() {
    let (h, app) = app().await;
    call(&app, Method::POST, "/api/commands", Some(json!({"commandName": "hello", "response": "hi"}))).await;

    let (status, body) = call(&app, Method::DELETE, "/api/commands/424242", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"success": true}));
    assert_eq!(h.runtime.registered_commands(), vec!["hello".to_string()]);

    let (status, body) = call(&app, Method::DELETE, "/api/commands/not-a-number", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("not-a-number"));

    let (status, _) = call(&app, Method::DELETE, "/api/tasks/xyz", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_validation_errors_leave_store_untouched() {
    let (_h, app) = app().await;

    for bad in [
        json!({"response": "no name"}),
        json!({"commandName": "", "response": "blank name"}),
        json!({"commandName": "x", "response": "r", "userCooldown": -3}),
        json!({"commandName": 7, "response": "r"}),
    ] {
        let (status, body) = call(&app, Method::POST, "/api/commands", Some(bad.clone())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{bad}");
        assert!(body["error"].is_string());
    }

    let resp = app.clone()
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/api/tasks")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let (_, list) = call(&app, Method::GET, "/api/commands", None).await;
    assert_eq!(list, json!([]));
}

#[tokio::test]
async fn test_quotes_round_trip_through_json() {
    let (_h, app) = app().await;
    let text = r#"He said "hi" \ and left"#;
    call(&app, Method::POST, "/api/commands", Some(json!({"commandName": "quote", "response": text}))).await;

    let (_, list) = call(&app, Method::GET, "/api/commands", None).await;
    assert_eq!(list[0]["response"], text);
}

#[tokio::test]
async fn test_role_normalization_through_api() {
    let (h, app) = app().await;
    for (name, role) in [("r1", "broadcaster"), ("r2", "Broadcaster"), ("r3", "BROADCASTER"), ("r4", "king")] {
        let (status, _) = call(
            &app, Method::POST, "/api/commands",
            Some(json!({"commandName": name, "response": "ok", "requiredRole": role, "userCooldown": 0})),
        ).await;
        assert_eq!(status, StatusCode::OK);
    }

    let (_, list) = call(&app, Method::GET, "/api/commands", None).await;
    let roles: Vec<&str> = list.as_array().unwrap().iter().map(|c| c["requiredRole"].as_str().unwrap()).collect();
    assert_eq!(roles, vec!["Broadcaster", "Broadcaster", "Broadcaster", "Everyone"]);

    // The normalized role is what the runtime enforces.
    let said = h.runtime.handle_chat_message("#c", "mod", Role::Moderator, "!r1").await.unwrap();
    assert_eq!(said, None);
    let said = h.runtime.handle_chat_message("#c", "owner", Role::Broadcaster, "!R1").await.unwrap();
    assert_eq!(said.as_deref(), Some("ok"));
    assert_eq!(h.sink.sent.lock().len(), 1);
}

#[tokio::test]
async fn test_task_endpoints() {
    let (h, app) = app().await;

    let (status, body) = call(
        &app, Method::POST, "/api/tasks",
        Some(json!({"taskName": "discord", "message": "Join \"us\"!", "intervalMinutes": 15})),
    ).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"success": true}));

    let (status, body) = call(
        &app, Method::POST, "/api/tasks",
        Some(json!({"taskName": "nope", "message": "m", "intervalMinutes": 0})),
    ).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (_, list) = call(&app, Method::GET, "/api/tasks", None).await;
    let tasks = list.as_array().unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0]["taskName"], "discord");
    assert_eq!(tasks[0]["message"], "Join \"us\"!");
    assert_eq!(tasks[0]["intervalMinutes"], 15);
    assert_eq!(tasks[0]["isEnabled"], true);
    assert_eq!(h.runtime.scheduled_jobs(), vec!["discord".to_string()]);

    let id = tasks[0]["id"].as_i64().unwrap();
    let (status, _) = call(&app, Method::DELETE, &format!("/api/tasks/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(h.runtime.scheduled_jobs().is_empty());
}

#[tokio::test]
async fn test_concurrent_task_creates_both_go_live() {
    let (h, app) = app().await;

    let first = call(
        &app, Method::POST, "/api/tasks",
        Some(json!({"taskName": "one", "message": "first", "intervalMinutes": 10})),
    );
    let second = call(
        &app, Method::POST, "/api/tasks",
        Some(json!({"taskName": "two", "message": "second", "intervalMinutes": "20"})),
    );
    let ((s1, _), (s2, _)) = tokio::join!(first, second);
    assert_eq!(s1, StatusCode::OK);
    assert_eq!(s2, StatusCode::OK);

    let (_, list) = call(&app, Method::GET, "/api/tasks", None).await;
    assert_eq!(list.as_array().unwrap().len(), 2);
    assert_eq!(sorted(h.runtime.scheduled_jobs()), vec!["one".to_string(), "two".to_string()]);
}

#[tokio::test]
async fn test_names_differing_only_in_case_conflict() {
    let (h, app) = app().await;

    let (status, _) = call(&app, Method::POST, "/api/commands", Some(json!({"commandName": "Hello", "response": "1"}))).await;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = call(&app, Method::POST, "/api/commands", Some(json!({"commandName": "hello", "response": "2"}))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].is_string());

    let (_, list) = call(&app, Method::GET, "/api/commands", None).await;
    assert_eq!(list.as_array().unwrap().len(), 1);
    assert_eq!(h.runtime.registered_commands(), vec!["Hello".to_string()]);

    call(&app, Method::POST, "/api/tasks", Some(json!({"taskName": "Discord", "message": "m", "intervalMinutes": 5}))).await;
    let (status, _) = call(&app, Method::POST, "/api/tasks", Some(json!({"taskName": "DISCORD", "message": "m", "intervalMinutes": 5}))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(h.runtime.scheduled_jobs(), vec!["Discord".to_string()]);
}

#[tokio::test]
async fn test_concurrent_command_writes_keep_live_set_consistent() {
    let (h, app) = app().await;
    let repo = SqliteCustomCommandRepository::new(h.db.pool().clone());

    for name in ["old1", "old2"] {
        call(&app, Method::POST, "/api/commands", Some(json!({"commandName": name, "response": "r"}))).await;
    }
    let ids: Vec<i64> = repo.list_all_commands().await.unwrap().into_iter().map(|c| c.id).collect();
    let delete_first = format!("/api/commands/{}", ids[0]);
    let delete_second = format!("/api/commands/{}", ids[1]);

    let (c1, c2, c3, d1, d2) = tokio::join!(
        call(&app, Method::POST, "/api/commands", Some(json!({"commandName": "new1", "response": "r"}))),
        call(&app, Method::POST, "/api/commands", Some(json!({"commandName": "new2", "response": "r"}))),
        call(&app, Method::POST, "/api/commands", Some(json!({"commandName": "new3", "response": "r", "isEnabled": false}))),
        call(&app, Method::DELETE, &delete_first, None),
        call(&app, Method::DELETE, &delete_second, None),
    );
    for (status, _) in [c1, c2, c3, d1, d2] {
        assert_eq!(status, StatusCode::OK);
    }

    let enabled: Vec<String> = repo.list_enabled_commands().await.unwrap()
        .into_iter().map(|c| c.command_name).collect();
    assert_eq!(sorted(enabled.clone()), vec!["new1".to_string(), "new2".to_string()]);
    assert_eq!(sorted(h.runtime.registered_commands()), sorted(enabled));
}

#[tokio::test]
async fn test_delete_with_empty_id_is_bad_request() {
    let (_h, app) = app().await;
    for uri in ["/api/commands/", "/api/tasks/"] {
        let (status, body) = call(&app, Method::DELETE, uri, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert!(body["error"].is_string());
    }
}
