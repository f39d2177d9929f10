//! Machine usage sessions over HTTP against the in-memory store.

mod common;

use axum::http::StatusCode;
use common::{get, post, seeded_app};
use serde_json::json;
use workshop_tracker::model::MachineId;

#[tokio::test]
async fn start_conflict_end_not_found_scenario() {
    let (_store, router) = seeded_app();

    let (status, body) = post(&router, "/api/usage/start", json!({"machineId": 1, "userId": 2})).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);

    let (status, _) = post(&router, "/api/usage/start", json!({"machineId": 1, "userId": 3})).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = post(&router, "/api/usage/end", json!({"machineId": 1})).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = post(&router, "/api/usage/end", json!({"machineId": 1})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn conflicting_start_writes_nothing() {
    let (store, router) = seeded_app();

    post(&router, "/api/usage/start", json!({"machineId": 2, "userId": 1})).await;
    post(&router, "/api/usage/start", json!({"machineId": 2, "userId": 3})).await;

    let history = store.usage_history(MachineId(2)).unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].user_id.0, 1);
}

#[tokio::test]
async fn ending_frees_the_machine() {
    let (store, router) = seeded_app();

    for user in [1, 2, 3] {
        let (status, _) =
            post(&router, "/api/usage/start", json!({"machineId": 3, "userId": user})).await;
        assert_eq!(status, StatusCode::CREATED, "user {user}");
        let (status, _) = post(&router, "/api/usage/end", json!({"machineId": 3})).await;
        assert_eq!(status, StatusCode::OK);
    }

    let history = store.usage_history(MachineId(3)).unwrap();
    assert_eq!(history.len(), 3);
    assert!(history.iter().all(|s| !s.is_active()));
    assert!(history.iter().all(|s| s.ended_at.unwrap() >= s.started_at));
}

#[tokio::test]
async fn end_without_active_session_mutates_nothing() {
    let (store, router) = seeded_app();

    let (status, _) = post(&router, "/api/usage/end", json!({"machineId": 1})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(store.usage_history(MachineId(1)).unwrap().is_empty());
}

#[tokio::test]
async fn sessions_on_different_machines_are_independent() {
    let (_store, router) = seeded_app();

    let (status, _) = post(&router, "/api/usage/start", json!({"machineId": 1, "userId": 1})).await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, _) = post(&router, "/api/usage/start", json!({"machineId": 2, "userId": 1})).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = get(&router, "/api/usage/active").await;
    assert_eq!(status, StatusCode::OK);
    let active = body["data"].as_array().unwrap();
    assert_eq!(active.len(), 2);
    assert_eq!(active[0]["machineId"], 1);
    assert!(active[0]["endedAt"].is_null());
}

#[tokio::test]
async fn missing_fields_are_bad_request() {
    let (_store, router) = seeded_app();

    let (status, _) = post(&router, "/api/usage/start", json!({"machineId": 1})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = post(&router, "/api/usage/start", json!({"userId": 1})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = post(&router, "/api/usage/end", json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_user_is_bad_request() {
    let (store, router) = seeded_app();

    let (status, _) = post(&router, "/api/usage/start", json!({"machineId": 1, "userId": 42})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(store.usage_history(MachineId(1)).unwrap().is_empty());
}
