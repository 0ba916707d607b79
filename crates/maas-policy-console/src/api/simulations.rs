//! What-if simulation runs and their history.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use maas_policy_core::{CandidateRequest, SimulationResult, Stats};

use super::{body, ApiResult};
use crate::app_state::AppState;

#[derive(Debug, Serialize)]
pub struct SimulationsView {
    /// Newest first.
    pub results: Vec<SimulationResult>,
    pub stats: Stats,
}

pub async fn run(
    State(state): State<AppState>,
    payload: Result<Json<CandidateRequest>, JsonRejection>,
) -> ApiResult<Json<SimulationsView>> {
    let input = body(payload)?;
    let (batch, stats) = {
        // store before simulator, everywhere
        let store = state.store()?;
        let mut sim = state.simulator()?;
        let batch = sim.run(store.list(), &input)?;
        (batch, sim.stats())
    };

    if let Some(first) = batch.first() {
        state.metrics().evaluations.add(
            &[
                ("decision", first.decision.as_str()),
                ("reason", first.reason.as_str()),
                ("source", "simulate"),
            ],
            batch.len() as u64,
        );
        tracing::info!(
            team = %input.team,
            model = %input.model,
            count = batch.len(),
            decision = first.decision.as_str(),
            "simulation batch recorded"
        );
    }

    Ok(Json(SimulationsView { results: batch, stats }))
}

pub async fn list(State(state): State<AppState>) -> ApiResult<Json<SimulationsView>> {
    let sim = state.simulator()?;
    Ok(Json(SimulationsView {
        results: sim.results().cloned().collect(),
        stats: sim.stats(),
    }))
}

pub async fn clear(State(state): State<AppState>) -> ApiResult<StatusCode> {
    state.simulator()?.clear();
    tracing::info!("simulation history cleared");
    Ok(StatusCode::NO_CONTENT)
}
