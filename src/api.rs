//! REST API handlers for shift scheduling.

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info_span, warn};
use uuid::Uuid;

use crate::demo_data::{self, DemoData};
use crate::dto::{HealthResponse, InfoResponse, ScheduleRequest, ScheduleResponse};
use crate::result::ScheduleResult;
use crate::service::{self, ScheduleService};
use crate::solver::SolverConfig;

/// Application state shared across handlers.
pub struct AppState {
    service: ScheduleService,
}

impl AppState {
    pub fn new(config: SolverConfig) -> Self {
        Self {
            service: ScheduleService::new(config),
        }
    }

    pub fn service(&self) -> &ScheduleService {
        &self.service
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(SolverConfig::default_config())
    }
}

/// Creates the API router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health & Info
        .route("/health", get(health))
        .route("/info", get(info))
        // Demo data
        .route("/demo-data", get(list_demo_data))
        .route("/demo-data/{id}", get(get_demo_data))
        // Schedules
        .route("/schedule/generate", post(generate_schedule))
        .with_state(state)
}

/// GET /health - Health check endpoint.
async fn health() -> (StatusCode, Json<HealthResponse>) {
    if service::health() {
        (StatusCode::OK, Json(HealthResponse { status: "UP".into() }))
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(HealthResponse { status: "DOWN".into() }),
        )
    }
}

/// GET /info - Application info endpoint.
async fn info(State(state): State<Arc<AppState>>) -> Json<InfoResponse> {
    Json(InfoResponse {
        name: "Shift Scheduling",
        version: env!("CARGO_PKG_VERSION"),
        solver_engine: state.service.solver_name(),
    })
}

/// GET /demo-data - List available demo data sets.
async fn list_demo_data() -> Json<Vec<&'static str>> {
    Json(demo_data::list_demo_data())
}

/// GET /demo-data/{id} - Get a specific demo data set.
async fn get_demo_data(Path(id): Path<String>) -> Result<Json<ScheduleRequest>, StatusCode> {
    let demo = id.parse::<DemoData>().map_err(|_| StatusCode::NOT_FOUND)?;
    match demo_data::generate(demo) {
        Ok(config) => Ok(Json(ScheduleRequest::from(&config))),
        Err(e) => {
            warn!(demo = demo.as_str(), error = %e, "Demo data set is invalid");
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// POST /schedule/generate - Solve a schedule synchronously.
///
/// An empty body solves the default instance.
async fn generate_schedule(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> (StatusCode, Json<ScheduleResponse>) {
    let request_id = Uuid::new_v4();
    let span = info_span!("generate", request_id = %request_id);

    let request = if body.iter().all(u8::is_ascii_whitespace) {
        None
    } else {
        match serde_json::from_slice::<ScheduleRequest>(&body) {
            Ok(request) => Some(request),
            Err(e) => {
                span.in_scope(|| warn!(error = %e, "Malformed schedule request"));
                let result = ScheduleResult::error(
                    format!("malformed request body: {}", e),
                    Duration::ZERO,
                );
                return (
                    StatusCode::BAD_REQUEST,
                    Json(ScheduleResponse::from_result(&result, None)),
                );
            }
        }
    };

    let solved = tokio::task::spawn_blocking(move || {
        let _guard = span.enter();
        solve_request(&state, request)
    })
    .await;

    match solved {
        Ok(response) => (StatusCode::OK, Json(response)),
        Err(e) => {
            warn!(%request_id, error = %e, "Solver task did not complete");
            let result = ScheduleResult::error("solver task did not complete", Duration::ZERO);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ScheduleResponse::from_result(&result, None)),
            )
        }
    }
}

fn solve_request(state: &AppState, request: Option<ScheduleRequest>) -> ScheduleResponse {
    let validated = match request {
        Some(request) => request.to_config(),
        None => service::default_config().cloned().map_err(|e| e.clone()),
    };

    match validated {
        Ok(config) => {
            let result = state.service.generate(&config);
            ScheduleResponse::from_result(&result, Some(&config))
        }
        Err(e) => ScheduleResponse::from_result(&service::rejected(e), None),
    }
}
