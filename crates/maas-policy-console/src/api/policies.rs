//! Policy CRUD and search.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use maas_policy_core::error::PolicyError;
use maas_policy_core::{Model, Policy, PolicyDraft, PolicySpec, Team};

use super::{body, ApiResult};
use crate::app_state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    pub search: Option<String>,
}

/// Stored policy plus its display summary.
#[derive(Debug, Serialize)]
pub struct PolicyView {
    #[serde(flatten)]
    pub policy: Policy,
    pub limits_summary: String,
}

impl From<Policy> for PolicyView {
    fn from(policy: Policy) -> Self {
        Self {
            limits_summary: policy.limits_summary(),
            policy,
        }
    }
}

/// Catalog entries not yet used by a policy.
#[derive(Debug, Serialize)]
pub struct Palette {
    pub teams: Vec<Team>,
    pub models: Vec<Model>,
}

/// Run a submitted payload through the builder draft: duplicate entries and
/// unsaveable content are refused before the store sees it.
fn admit(payload: Result<Json<PolicySpec>, JsonRejection>) -> ApiResult<PolicySpec> {
    let draft = PolicyDraft::from_spec(body(payload)?)?;
    Ok(draft.finish()?)
}

fn record_mutation(state: &AppState, op: &str, remaining: usize) {
    let m = state.metrics();
    m.policy_mutations.inc(&[("op", op)]);
    m.policies.set(&[], remaining as i64);
}

pub async fn list(
    State(state): State<AppState>,
    Query(q): Query<SearchQuery>,
) -> ApiResult<Json<Vec<PolicyView>>> {
    let store = state.store()?;
    let found: Vec<PolicyView> = match q.search.as_deref() {
        Some(term) => store.search(term).into_iter().cloned().map(PolicyView::from).collect(),
        None => store.list().iter().cloned().map(PolicyView::from).collect(),
    };
    Ok(Json(found))
}

pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<PolicyView>> {
    let store = state.store()?;
    let policy = store
        .get(&id)
        .cloned()
        .ok_or_else(|| PolicyError::NotFound(format!("policy {id}")))?;
    Ok(Json(policy.into()))
}

pub async fn available(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Palette>> {
    let draft = {
        let store = state.store()?;
        let policy = store
            .get(&id)
            .ok_or_else(|| PolicyError::NotFound(format!("policy {id}")))?;
        PolicyDraft::from_policy(policy)
    };
    let catalog = state.catalog();
    Ok(Json(Palette {
        teams: draft.available_teams(catalog).into_iter().cloned().collect(),
        models: draft.available_models(catalog).into_iter().cloned().collect(),
    }))
}

pub async fn create(
    State(state): State<AppState>,
    payload: Result<Json<PolicySpec>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<PolicyView>)> {
    let spec = admit(payload)?;
    let (policy, remaining) = {
        let mut store = state.store()?;
        let p = store.create(spec)?;
        (p, store.len())
    };
    record_mutation(&state, "create", remaining);
    tracing::info!(policy_id = %policy.id, name = %policy.name, "policy created");
    Ok((StatusCode::CREATED, Json(policy.into())))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<PolicySpec>, JsonRejection>,
) -> ApiResult<Json<PolicyView>> {
    let spec = admit(payload)?;
    let (policy, remaining) = {
        let mut store = state.store()?;
        let p = store.update(&id, spec)?;
        (p, store.len())
    };
    record_mutation(&state, "update", remaining);
    tracing::info!(policy_id = %policy.id, "policy updated");
    Ok(Json(policy.into()))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let (removed, remaining) = {
        let mut store = state.store()?;
        let p = store.delete(&id)?;
        (p, store.len())
    };
    record_mutation(&state, "delete", remaining);
    tracing::info!(policy_id = %removed.id, name = %removed.name, "policy deleted");
    Ok(StatusCode::NO_CONTENT)
}
