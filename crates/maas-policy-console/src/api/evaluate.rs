//! Single-request evaluation against the current policy list.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::Serialize;

use maas_policy_core::error::PolicyError;
use maas_policy_core::{explain, CandidateRequest, Verdict};

use super::{body, ApiResult};
use crate::app_state::AppState;

#[derive(Debug, Serialize)]
pub struct EvaluateResponse {
    pub decision: Verdict,
    pub reason: &'static str,
    /// Policy that rejected the request.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub policy_id: Option<String>,
}

pub async fn evaluate(
    State(state): State<AppState>,
    payload: Result<Json<CandidateRequest>, JsonRejection>,
) -> ApiResult<Json<EvaluateResponse>> {
    let req = body(payload)?;
    if req.team.trim().is_empty() || req.model.trim().is_empty() {
        return Err(PolicyError::BadRequest("Please select both a team and a model".into()).into());
    }

    let resp = {
        let store = state.store()?;
        let explained = explain(store.list(), &req);
        EvaluateResponse {
            decision: explained.decision.verdict(),
            reason: explained.decision.reason(),
            policy_id: explained.policy.map(|p| p.id.clone()),
        }
    };

    state.metrics().evaluations.inc(&[
        ("decision", resp.decision.as_str()),
        ("reason", resp.reason),
        ("source", "evaluate"),
    ]);
    Ok(Json(resp))
}
