//! Live request feed: filtered listing and reset.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use maas_policy_core::error::{PolicyError, Result};
use maas_policy_core::live::{LiveFilter, LiveRequest};
use maas_policy_core::{Catalog, Stats, Verdict};

use super::ApiResult;
use crate::app_state::AppState;
use crate::live::FeedSnapshot;

/// Query string filters. Empty or `all` means no filter.
#[derive(Debug, Default, Deserialize)]
pub struct FeedQuery {
    pub team: Option<String>,
    pub model: Option<String>,
    pub decision: Option<String>,
    pub search: Option<String>,
}

fn selected(v: Option<String>) -> Option<String> {
    v.filter(|s| !s.is_empty() && !s.eq_ignore_ascii_case("all"))
}

impl FeedQuery {
    pub fn into_filter(self) -> Result<LiveFilter> {
        let decision = match selected(self.decision).as_deref() {
            None => None,
            Some("accept") => Some(Verdict::Accept),
            Some("reject") => Some(Verdict::Reject),
            Some(other) => {
                return Err(PolicyError::BadRequest(format!(
                    "decision must be accept, reject or all, got {other:?}"
                )))
            }
        };
        Ok(LiveFilter {
            team: selected(self.team),
            model: selected(self.model),
            decision,
            search: self.search.filter(|s| !s.is_empty()),
        })
    }
}

/// Feed entry with catalog display labels.
#[derive(Debug, Serialize)]
pub struct FeedRow {
    #[serde(flatten)]
    pub request: LiveRequest,
    pub team_name: String,
    pub model_name: String,
    pub team_color: String,
}

impl FeedRow {
    fn labelled(request: LiveRequest, catalog: &Catalog) -> Self {
        Self {
            team_name: catalog.team_name(&request.team).to_string(),
            model_name: catalog.model_name(&request.model).to_string(),
            team_color: catalog.team_color(&request.team).to_string(),
            request,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct FeedView {
    pub requests: Vec<FeedRow>,
    pub showing: usize,
    pub total: usize,
    pub stats: Stats,
}

impl FeedView {
    fn labelled(snap: FeedSnapshot, catalog: &Catalog) -> Self {
        Self {
            requests: snap
                .requests
                .into_iter()
                .map(|r| FeedRow::labelled(r, catalog))
                .collect(),
            showing: snap.showing,
            total: snap.total,
            stats: snap.stats,
        }
    }
}

pub async fn list(
    State(state): State<AppState>,
    Query(q): Query<FeedQuery>,
) -> ApiResult<Json<FeedView>> {
    let filter = q.into_filter()?;
    let snap = state.live().snapshot(&filter)?;
    Ok(Json(FeedView::labelled(snap, state.catalog())))
}

pub async fn clear(State(state): State<AppState>) -> ApiResult<StatusCode> {
    state.live().clear()?;
    tracing::info!("live request history cleared");
    Ok(StatusCode::NO_CONTENT)
}
