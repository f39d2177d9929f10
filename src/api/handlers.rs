//! REST API handlers.
//!
//! Each handler validates its input, calls the store, and returns the JSON
//! envelope. Storage failures are logged and answered with a generic message.

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use opentelemetry::KeyValue;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::*;
use crate::rules::validate;
use crate::store::WorkshopStore;
use crate::telemetry::metrics;

use super::ApiState;

/// Response wrapper for consistent API format.
#[derive(Serialize)]
struct ApiResponse<T: Serialize> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    fn ok(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            data: Some(data),
            error: None,
        })
    }
}

fn error_response(msg: &str, status: StatusCode) -> Response {
    (
        status,
        Json(ApiResponse::<()> {
            success: false,
            data: None,
            error: Some(msg.to_string()),
        }),
    )
        .into_response()
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::Validation { field, reason } => {
                error_response(&format!("{field}: {reason}"), StatusCode::BAD_REQUEST)
            }
            Error::Conflict(msg) => error_response(&msg, StatusCode::CONFLICT),
            Error::NotFound(msg) => error_response(&msg, StatusCode::NOT_FOUND),
            other => {
                tracing::error!(error = %other, "request failed");
                error_response("internal server error", StatusCode::INTERNAL_SERVER_ERROR)
            }
        }
    }
}

const MALFORMED_BODY: &str = "malformed request body";

fn json_body<T>(payload: std::result::Result<Json<T>, JsonRejection>) -> Result<T> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| {
            tracing::debug!(
                status = %rejection.status(),
                detail = %rejection.body_text(),
                "request body rejected"
            );
            Error::validation("body", MALFORMED_BODY)
        })
}

fn respond<T: Serialize>(result: Result<T>, status: StatusCode) -> Response {
    match result {
        Ok(data) => (status, ApiResponse::ok(data)).into_response(),
        Err(e) => e.into_response(),
    }
}

fn result_label<T>(result: &Result<T>) -> &'static str {
    match result {
        Ok(_) => "ok",
        Err(e) => e.kind(),
    }
}

// ── Request / response bodies ──────────────────────────────────

/// POST /api/incidents body. Fields are optional so that a missing field is
/// reported as a validation error rather than a decoding failure.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportIncidentRequest {
    pub machine_id: Option<MachineId>,
    pub description: Option<String>,
}

/// POST /api/usage/start body.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartUsageRequest {
    pub machine_id: Option<MachineId>,
    pub user_id: Option<UserId>,
}

/// POST /api/usage/end body.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndUsageRequest {
    pub machine_id: Option<MachineId>,
}

#[derive(Debug, Serialize)]
struct Created<T: Serialize> {
    id: T,
}

// ── Health ─────────────────────────────────────────────────────

/// GET /health
pub async fn health<S: WorkshopStore>(State(state): State<ApiState<S>>) -> Response {
    respond(state.store.health_check().await.map(|()| "ok"), StatusCode::OK)
}

// ── Reference data ─────────────────────────────────────────────

/// GET /api/machines
pub async fn list_machines<S: WorkshopStore>(State(state): State<ApiState<S>>) -> Response {
    respond(state.store.list_machines().await, StatusCode::OK)
}

/// GET /api/users
pub async fn list_users<S: WorkshopStore>(State(state): State<ApiState<S>>) -> Response {
    respond(state.store.list_users().await, StatusCode::OK)
}

// ── Incidents ──────────────────────────────────────────────────

/// GET /api/incidents/open
pub async fn list_open_incidents<S: WorkshopStore>(State(state): State<ApiState<S>>) -> Response {
    respond(state.store.list_open_incidents().await, StatusCode::OK)
}

/// POST /api/incidents
pub async fn report_incident<S: WorkshopStore>(
    State(state): State<ApiState<S>>,
    payload: std::result::Result<Json<ReportIncidentRequest>, JsonRejection>,
) -> Response {
    let result = file_incident(&state, payload).await;

    let label = match &result {
        Err(Error::Conflict(_)) => "duplicate",
        other => result_label(other),
    };
    metrics::incidents_reported().add(1, &[KeyValue::new("result", label)]);

    respond(result.map(|id| Created { id }), StatusCode::CREATED)
}

async fn file_incident<S: WorkshopStore>(
    state: &ApiState<S>,
    payload: std::result::Result<Json<ReportIncidentRequest>, JsonRejection>,
) -> Result<IncidentId> {
    let body = json_body(payload)?;
    let new = validate::incident_report(body.machine_id, body.description.as_deref(), state.principal)?;
    state.store.report_incident(&new).await
}

// ── Usage ──────────────────────────────────────────────────────

/// POST /api/usage/start
pub async fn start_usage<S: WorkshopStore>(
    State(state): State<ApiState<S>>,
    payload: std::result::Result<Json<StartUsageRequest>, JsonRejection>,
) -> Response {
    let result = open_session(&state, payload).await;

    metrics::usage_transitions().add(
        1,
        &[
            KeyValue::new("operation", "start"),
            KeyValue::new("result", result_label(&result)),
        ],
    );
    respond(result.map(|_| "usage started"), StatusCode::CREATED)
}

async fn open_session<S: WorkshopStore>(
    state: &ApiState<S>,
    payload: std::result::Result<Json<StartUsageRequest>, JsonRejection>,
) -> Result<UsageId> {
    let body = json_body(payload)?;
    let (machine_id, user_id) = validate::usage_start(body.machine_id, body.user_id)?;
    state.store.start_usage(machine_id, user_id).await
}

/// POST /api/usage/end
pub async fn end_usage<S: WorkshopStore>(
    State(state): State<ApiState<S>>,
    payload: std::result::Result<Json<EndUsageRequest>, JsonRejection>,
) -> Response {
    let result = close_session(&state, payload).await;

    metrics::usage_transitions().add(
        1,
        &[
            KeyValue::new("operation", "end"),
            KeyValue::new("result", result_label(&result)),
        ],
    );
    respond(result.map(|_| "usage ended"), StatusCode::OK)
}

async fn close_session<S: WorkshopStore>(
    state: &ApiState<S>,
    payload: std::result::Result<Json<EndUsageRequest>, JsonRejection>,
) -> Result<UsageId> {
    let body = json_body(payload)?;
    let machine_id = validate::usage_end(body.machine_id)?;
    state.store.end_usage(machine_id).await
}

/// GET /api/usage/active
pub async fn list_active_usage<S: WorkshopStore>(State(state): State<ApiState<S>>) -> Response {
    respond(state.store.list_active_usage().await, StatusCode::OK)
}
