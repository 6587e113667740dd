//! HTTP route handlers.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::domain::SystemId;
use crate::engine::{AvailabilitySummary, EngineSnapshot, QueryError, SelectionError};
use crate::registry::RegistryError;

use super::dto::*;
use super::state::AppState;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/systems", get(list_systems))
        .route("/systems/:id", get(system_snapshot))
        .route("/systems/:id/status", get(area_status))
        .route("/systems/:id/challenge", get(challenge))
        .route("/systems/:id/refresh", post(refresh))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

async fn list_systems(State(state): State<AppState>) -> Json<SystemsResponse> {
    Json(SystemsResponse {
        systems: state.registry.ids(),
    })
}

/// Cache and timer diagnostics for one deployment.
async fn system_snapshot(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<EngineSnapshot>, AppError> {
    let snapshot = state.registry.snapshot(&SystemId::new(id)).await?;
    Ok(Json(snapshot))
}

/// Total bikes and docks over an area.
async fn area_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<AreaQuery>,
) -> Result<Json<AvailabilitySummary>, AppError> {
    let area = query.to_area()?;
    let summary = state
        .registry
        .request_status(&SystemId::new(id), area)
        .await?;
    Ok(Json(summary))
}

/// Pick a (from, to) station pair.
async fn challenge(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<ChallengeQuery>,
) -> Result<Json<ChallengeResponse>, AppError> {
    let request = query.to_request()?;
    let challenge = state
        .registry
        .request_challenge(&SystemId::new(id), request)
        .await?;
    Ok(Json(challenge.into()))
}

/// Refetch the manifest and both station documents now.
async fn refresh(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    state.registry.refresh(&SystemId::new(id))?;
    Ok(StatusCode::ACCEPTED)
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    NotFound { message: String },
    Unavailable { message: String },
}

impl From<AreaQueryError> for AppError {
    fn from(e: AreaQueryError) -> Self {
        AppError::BadRequest {
            message: e.to_string(),
        }
    }
}

impl From<RegistryError> for AppError {
    fn from(e: RegistryError) -> Self {
        let message = e.to_string();
        match e {
            RegistryError::UnknownSystem(_)
            | RegistryError::Query(QueryError::Selection(SelectionError::EmptyEligibleSet)) => {
                AppError::NotFound { message }
            }
            RegistryError::DuplicateSystem(_) => AppError::BadRequest { message },
            RegistryError::Query(QueryError::EngineStopped) => AppError::Unavailable { message },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest { message } => (StatusCode::BAD_REQUEST, message),
            AppError::NotFound { message } => (StatusCode::NOT_FOUND, message),
            AppError::Unavailable { message } => (StatusCode::SERVICE_UNAVAILABLE, message),
        };

        warn!(%status, %message, "request failed");

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}
