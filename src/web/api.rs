//! Defines the Axum API routes and handlers.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};

use crate::motion::{MotionError, TriggerId};
use crate::service::MotionService;
use crate::web::models::{
    ESTOP_CLEARED, ESTOP_ENGAGED, ErrorResponse, HOMING_COMPLETE, INITIALIZED, MOVE_SENT, TriggerResponse,
    TriggerUpdateRequest,
};

pub type AppState = MotionService;

/// Creates the Axum router with all the API endpoints.
pub fn create_router(service: AppState) -> Router {
    Router::new()
        .route("/motion/initialize", post(initialize))
        .route("/motion/home", post(home_all))
        .route("/motion/move", post(move_to))
        .route("/motion/stop", post(emergency_stop))
        .route("/motion/stop/clear", post(clear_emergency_stop))
        .route("/motion/status", get(get_status))
        .route("/motion/events", get(get_events))
        .route("/motion/triggers/{id}", get(get_trigger).put(set_trigger))
        .with_state(service)
}

/// Map a motion failure to a status code and JSON body.
pub fn error_response(error: &MotionError) -> Response {
    let status = match error {
        MotionError::NotInitialized | MotionError::HomeNotInitialized | MotionError::EmergencyStop => {
            StatusCode::CONFLICT
        }
        MotionError::AxisCountMismatch { .. } | MotionError::OutOfBounds => StatusCode::UNPROCESSABLE_ENTITY,
        MotionError::Drive { .. } | MotionError::Native(_) => StatusCode::INTERNAL_SERVER_ERROR,
        MotionError::Unsupported { .. } => StatusCode::NOT_IMPLEMENTED,
        MotionError::WorkerUnavailable => StatusCode::SERVICE_UNAVAILABLE,
    };
    let body = ErrorResponse {
        error: error.to_string(),
        code: error.code(),
    };
    (status, Json(body)).into_response()
}

fn acknowledge(result: Result<(), MotionError>, message: &'static str) -> Response {
    match result {
        Ok(()) => (StatusCode::OK, message).into_response(),
        Err(e) => error_response(&e),
    }
}

/// Initialize the drive network and all axes.
async fn initialize(State(service): State<AppState>) -> Response {
    tracing::info!("POST /motion/initialize");
    acknowledge(service.initialize().await, INITIALIZED)
}

/// Home every axis.
async fn home_all(State(service): State<AppState>) -> Response {
    tracing::info!("POST /motion/home");
    acknowledge(service.home_all().await, HOMING_COMPLETE)
}

/// Forward the requested axis positions to the backend.
async fn move_to(State(service): State<AppState>, Json(positions): Json<Vec<f64>>) -> Response {
    tracing::info!("POST /motion/move {:?}", positions);
    acknowledge(service.move_to(positions).await, MOVE_SENT)
}

async fn emergency_stop(State(service): State<AppState>) -> Response {
    tracing::warn!("POST /motion/stop");
    acknowledge(service.emergency_stop().await, ESTOP_ENGAGED)
}

async fn clear_emergency_stop(State(service): State<AppState>) -> Response {
    tracing::info!("POST /motion/stop/clear");
    acknowledge(service.clear_emergency_stop().await, ESTOP_CLEARED)
}

async fn get_status(State(service): State<AppState>) -> Response {
    match service.status().await {
        Ok(status) => (StatusCode::OK, Json(status)).into_response(),
        Err(e) => error_response(&e),
    }
}

async fn get_events(State(service): State<AppState>) -> Response {
    match service.events().await {
        Ok(events) => (StatusCode::OK, Json(events)).into_response(),
        Err(e) => error_response(&e),
    }
}

async fn get_trigger(State(service): State<AppState>, Path(id): Path<TriggerId>) -> Response {
    match service.trigger_state(id).await {
        Ok(active) => (StatusCode::OK, Json(TriggerResponse { id, active })).into_response(),
        Err(e) => error_response(&e),
    }
}

async fn set_trigger(
    State(service): State<AppState>,
    Path(id): Path<TriggerId>,
    Json(payload): Json<TriggerUpdateRequest>,
) -> Response {
    tracing::info!("PUT /motion/triggers/{} active={}", id, payload.active);
    match service.set_trigger(id, payload.active).await {
        Ok(()) => (
            StatusCode::OK,
            Json(TriggerResponse {
                id,
                active: payload.active,
            }),
        )
            .into_response(),
        Err(e) => error_response(&e),
    }
}
