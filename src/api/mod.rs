//! REST API for the workshop.
//!
//! # API Routes
//!
//! | Method | Path | Description |
//! |---|---|---|
//! | GET | `/health` | Store liveness |
//! | GET | `/api/machines` | Machines ordered by name |
//! | GET | `/api/users` | Users ordered by name |
//! | GET | `/api/incidents/open` | Open and In Progress incidents, newest first |
//! | POST | `/api/incidents` | Report an incident |
//! | POST | `/api/usage/start` | Start using a machine |
//! | POST | `/api/usage/end` | Stop using a machine |
//! | GET | `/api/usage/active` | Active usage sessions |

pub mod handlers;

use std::sync::Arc;
use std::time::Instant;

use axum::Router;
use axum::extract::{MatchedPath, Request};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{get, post};
use opentelemetry::KeyValue;
use tower_http::cors::CorsLayer;

use crate::model::UserId;
use crate::store::WorkshopStore;
use crate::telemetry::metrics;

/// Shared state for API handlers.
pub struct ApiState<S> {
    pub store: Arc<S>,
    /// User recorded as reporter of incidents created through this router.
    pub principal: UserId,
}

impl<S> Clone for ApiState<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            principal: self.principal,
        }
    }
}

/// Build the complete router (REST API + health).
pub fn build_router<S: WorkshopStore>(store: Arc<S>, principal: UserId) -> Router {
    let state = ApiState { store, principal };

    let api_routes = Router::new()
        .route("/machines", get(handlers::list_machines::<S>))
        .route("/users", get(handlers::list_users::<S>))
        .route("/incidents", post(handlers::report_incident::<S>))
        .route("/incidents/open", get(handlers::list_open_incidents::<S>))
        .route("/usage/start", post(handlers::start_usage::<S>))
        .route("/usage/end", post(handlers::end_usage::<S>))
        .route("/usage/active", get(handlers::list_active_usage::<S>));

    Router::new()
        .nest("/api", api_routes)
        .route("/health", get(handlers::health::<S>))
        .with_state(state)
        .layer(middleware::from_fn(record_duration))
        .layer(CorsLayer::permissive())
}

async fn record_duration(req: Request, next: Next) -> Response {
    let route = req
        .extensions()
        .get::<MatchedPath>()
        .map(|path| path.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());

    let started = Instant::now();
    let response = next.run(req).await;

    metrics::request_duration_ms().record(
        started.elapsed().as_secs_f64() * 1000.0,
        &[
            KeyValue::new("route", route),
            KeyValue::new("status", i64::from(response.status().as_u16())),
        ],
    );
    response
}
