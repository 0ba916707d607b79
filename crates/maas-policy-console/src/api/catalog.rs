use axum::extract::State;
use axum::Json;

use maas_policy_core::{Model, Team};

use crate::app_state::AppState;

pub async fn teams(State(state): State<AppState>) -> Json<Vec<Team>> {
    Json(state.catalog().teams.clone())
}

pub async fn models(State(state): State<AppState>) -> Json<Vec<Model>> {
    Json(state.catalog().models.clone())
}
