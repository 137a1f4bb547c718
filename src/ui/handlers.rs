//! REST handlers for the control API

use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;
use std::sync::Arc;

use crate::audio::device::list_input_devices;
use crate::error::Error;
use crate::protocol::{DevicesResponse, SessionStatus};
use crate::ui::server::AppState;

/// GET /api/status
pub async fn get_status(State(state): State<Arc<AppState>>) -> Json<SessionStatus> {
    Json(state.controller.status())
}

/// GET /api/devices
pub async fn get_devices(State(_state): State<Arc<AppState>>) -> Json<DevicesResponse> {
    Json(DevicesResponse::new(list_input_devices()))
}

/// Body of POST /api/start
#[derive(Debug, Deserialize, Default)]
pub struct StartRequest {
    /// Device to capture from; platform default when unset
    pub device_id: Option<String>,
}

/// POST /api/start
pub async fn start_capture(
    State(state): State<Arc<AppState>>,
    body: Option<Json<StartRequest>>,
) -> Result<Json<SessionStatus>, (StatusCode, String)> {
    let request = body.map(|Json(r)| r).unwrap_or_default();

    state
        .controller
        .start(request.device_id.as_deref())
        .map_err(|e| {
            let status = match e {
                Error::SessionActive => StatusCode::CONFLICT,
                Error::Device(_) => StatusCode::NOT_FOUND,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            };
            (status, e.to_string())
        })?;

    Ok(Json(state.controller.status()))
}

/// POST /api/stop
pub async fn stop_capture(State(state): State<Arc<AppState>>) -> Json<SessionStatus> {
    state.controller.stop();
    Json(state.controller.status())
}
