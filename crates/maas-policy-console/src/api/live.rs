use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use super::{body, ApiResult};
use crate::app_state::AppState;

#[derive(Debug, Serialize)]
pub struct LiveStatus {
    pub enabled: bool,
    pub interval_ms: u64,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LiveToggle {
    pub enabled: bool,
}

fn status(state: &AppState) -> LiveStatus {
    let live = state.live();
    LiveStatus {
        enabled: live.is_live(),
        interval_ms: live.interval().as_millis() as u64,
    }
}

pub async fn get(State(state): State<AppState>) -> Json<LiveStatus> {
    Json(status(&state))
}

pub async fn put(
    State(state): State<AppState>,
    payload: Result<Json<LiveToggle>, JsonRejection>,
) -> ApiResult<Json<LiveStatus>> {
    let toggle = body(payload)?;
    let changed = state.live().set_live(toggle.enabled)?;
    tracing::info!(enabled = toggle.enabled, changed, "live mode toggled");
    Ok(Json(status(&state)))
}
