use axum::http::StatusCode;
use insta::assert_yaml_snapshot;
use serde_json::json;
use std::collections::HashSet;

mod common;

use common::{HttpResponseSnapshot, setup};

#[tokio::test]
async fn can_create_user_from_json() {
    let ctx = setup();

    let response = ctx
        .post_json("/api/users", json!({ "username": "fcc_test" }))
        .await;

    assert_eq!(response.status, StatusCode::OK);
    let body = response.json();
    assert_eq!(body["username"], "fcc_test");
    let id = body["_id"].as_str().unwrap();
    assert!(!id.is_empty());
    assert_eq!(body.as_object().unwrap().len(), 2);
}

#[tokio::test]
async fn can_create_user_from_form() {
    let ctx = setup();

    let response = ctx.post_form("/api/users", "username=form+runner").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json()["username"], "form runner");
}

#[tokio::test]
async fn cannot_create_user_without_username() {
    let ctx = setup();

    let response = ctx.post_json("/api/users", json!({})).await;

    let snapshot = HttpResponseSnapshot::new(&response, "missing_username");
    assert_yaml_snapshot!(snapshot, @r"
    test_context: missing_username
    status: 400
    headers:
      content-type: application/json
    body:
      error: Username is required
    ");
}

#[tokio::test]
async fn cannot_create_user_with_empty_username() {
    let ctx = setup();

    let response = ctx.post_form("/api/users", "username=").await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.json(), json!({ "error": "Username is required" }));
    assert!(ctx.store.list_users().await.is_empty());
}

#[tokio::test]
async fn can_issue_fresh_id_for_every_user() {
    let ctx = setup();
    let mut ids = HashSet::new();

    for i in 0..25 {
        let id = ctx.create_user(&format!("user{}", i)).await;
        assert!(ids.insert(id), "id issued twice");
    }
}

#[tokio::test]
async fn can_list_no_users_for_fresh_store() {
    let ctx = setup();

    let response = ctx.get("/api/users").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json(), json!([]));
}

#[tokio::test]
async fn can_list_users_in_creation_order() {
    let ctx = setup();
    let mut expected = Vec::new();
    for name in ["charlie", "alice", "bob"] {
        let id = ctx.create_user(name).await;
        expected.push(json!({ "_id": id, "username": name }));
    }

    let first = ctx.get("/api/users").await;
    let second = ctx.get("/api/users").await;

    assert_eq!(first.status, StatusCode::OK);
    assert_eq!(first.json(), serde_json::Value::Array(expected));
    assert_eq!(first.body, second.body);
}

#[tokio::test]
async fn cannot_create_user_from_undecodable_body() {
    let ctx = setup();

    let responses = [
        ctx.post_raw("/api/users", None, "").await,
        ctx.post_raw("/api/users", Some("text/plain"), "username=plain").await,
        ctx.post_json("/api/users", json!({ "username": 42 })).await,
    ];

    for response in responses {
        assert_eq!(response.status, StatusCode::BAD_REQUEST, "{}", response.body);
        assert_eq!(response.json(), json!({ "error": "Username is required" }));
    }
    assert!(ctx.store.list_users().await.is_empty());
}
