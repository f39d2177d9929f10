//! Incident reporting over HTTP against the in-memory store.

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::{get, post, seeded_app, send};
use serde_json::json;
use workshop_tracker::model::{IncidentId, IncidentStatus};

#[tokio::test]
async fn report_returns_created_id() {
    let (_store, router) = seeded_app();

    let (status, body) = post(
        &router,
        "/api/incidents",
        json!({"machineId": 1, "description": "Motor overheating during cut"}),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["id"], 1);
}

#[tokio::test]
async fn heuristic_scenario_on_cnc_01() {
    let (_store, router) = seeded_app();

    let (status, _) = post(
        &router,
        "/api/incidents",
        json!({"machineId": 1, "description": "Motor overheating during cut"}),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    // Three-token signature differs from the stored four-token one.
    let (status, _) = post(
        &router,
        "/api/incidents",
        json!({"machineId": 1, "description": "Motor overheating during"}),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = post(
        &router,
        "/api/incidents",
        json!({"machineId": 1, "description": "Motor overheating during cut badly"}),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["success"], false);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn matching_signature_ignores_case_and_spacing() {
    let (_store, router) = seeded_app();

    post(
        &router,
        "/api/incidents",
        json!({"machineId": 2, "description": "Hydraulic pressure dropping fast"}),
    )
    .await;

    let (status, _) = post(
        &router,
        "/api/incidents",
        json!({"machineId": 2, "description": "  HYDRAULIC   pressure\tdropping FAST since morning "}),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn only_matching_signatures_conflict() {
    let (_store, router) = seeded_app();

    for description in [
        "Belt slipping on the left roller",
        "Belt slipping on the right roller",
        "Sensor reports wrong temperature",
    ] {
        let (status, _) = post(
            &router,
            "/api/incidents",
            json!({"machineId": 3, "description": description}),
        )
        .await;
        // The first two share "belt slipping on the" and collide.
        if description.contains("right") {
            assert_eq!(status, StatusCode::CONFLICT);
        } else {
            assert_eq!(status, StatusCode::CREATED, "{description}");
        }
    }
}

#[tokio::test]
async fn same_description_on_other_machine_is_accepted() {
    let (_store, router) = seeded_app();

    let body = json!({"machineId": 1, "description": "Coolant leak under the table"});
    let (status, _) = post(&router, "/api/incidents", body).await;
    assert_eq!(status, StatusCode::CREATED);

    let body = json!({"machineId": 2, "description": "Coolant leak under the table"});
    let (status, _) = post(&router, "/api/incidents", body).await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn closed_incidents_are_not_compared() {
    let (store, router) = seeded_app();

    let body = json!({"machineId": 1, "description": "Spindle noise at high rpm"});
    let (status, created) = post(&router, "/api/incidents", body.clone()).await;
    assert_eq!(status, StatusCode::CREATED);
    let id = IncidentId(created["data"]["id"].as_i64().unwrap());

    store.set_incident_status(id, IncidentStatus::InProgress).unwrap();
    let (status, _) = post(&router, "/api/incidents", body.clone()).await;
    assert_eq!(status, StatusCode::CONFLICT, "in-progress incidents still count");

    store.set_incident_status(id, IncidentStatus::Closed).unwrap();
    let (status, _) = post(&router, "/api/incidents", body).await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn missing_fields_are_bad_request() {
    let (_store, router) = seeded_app();

    for body in [
        json!({"description": "no machine"}),
        json!({"machineId": 1}),
        json!({"machineId": 1, "description": "   "}),
        json!({"machineId": null, "description": "null machine"}),
    ] {
        let (status, resp) = post(&router, "/api/incidents", body.clone()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
        assert_eq!(resp["success"], false);
    }
}

#[tokio::test]
async fn malformed_json_is_bad_request() {
    let (_store, router) = seeded_app();

    let req = Request::builder()
        .method("POST")
        .uri("/api/incidents")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = send(&router, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "body: malformed request body");
}

#[tokio::test]
async fn wrongly_typed_body_does_not_echo_decoder_detail() {
    let (_store, router) = seeded_app();

    let (status, body) = post(&router, "/api/incidents", json!(["CNC-01", "Spindle noise"])).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "body: malformed request body");

    let (status, body) = post(
        &router,
        "/api/incidents",
        json!({"machineId": "one", "description": "Spindle noise"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let message = body["error"].as_str().unwrap();
    assert!(!message.contains("ReportIncidentRequest"), "{message}");
    assert!(!message.contains("invalid type"), "{message}");
}

#[tokio::test]
async fn unknown_machine_is_rejected_without_write() {
    let (_store, router) = seeded_app();

    let (status, _) = post(
        &router,
        "/api/incidents",
        json!({"machineId": 99, "description": "Ghost machine making noise"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, open) = get(&router, "/api/incidents/open").await;
    assert_eq!(open["data"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn open_listing_is_newest_first_and_joined() {
    let (_store, router) = seeded_app();

    post(
        &router,
        "/api/incidents",
        json!({"machineId": 1, "description": "First report"}),
    )
    .await;
    post(
        &router,
        "/api/incidents",
        json!({"machineId": 3, "description": "  Second report  "}),
    )
    .await;

    let (status, body) = get(&router, "/api/incidents/open").await;
    assert_eq!(status, StatusCode::OK);
    let rows = body["data"].as_array().unwrap();
    assert_eq!(rows.len(), 2);

    assert_eq!(rows[0]["description"], "Second report");
    assert_eq!(rows[0]["machineName"], "EMB-03");
    assert_eq!(rows[0]["machineType"], "Packaging Line");
    assert_eq!(rows[0]["status"], "Open");
    // Reports are attributed to the router's acting user.
    assert_eq!(rows[0]["reportedBy"], "Ane Garcia");
    assert_eq!(rows[1]["description"], "First report");
}
