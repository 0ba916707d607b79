//! What-if simulation runs against the current policy list.

use std::collections::VecDeque;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::{PolicyError, Result};
use crate::eval::{explain, CandidateRequest, Verdict};
use crate::model::Policy;
use crate::stats::Stats;
use crate::time::Clock;

/// Upper bound of the request-count slider.
pub const DEFAULT_MAX_COUNT: u32 = 100;

/// Results retained before the oldest are dropped.
pub const DEFAULT_HISTORY_CAP: usize = 1000;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationResult {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub request: CandidateRequest,
    pub decision: Verdict,
    pub reason: String,
    /// Policy that rejected the request, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub policy_id: Option<String>,
}

/// Bounded newest-first history of simulation results.
pub struct Simulator {
    results: VecDeque<SimulationResult>,
    max_count: u32,
    history_cap: usize,
    runs: u64,
    clock: Arc<dyn Clock>,
}

impl Simulator {
    pub fn new(max_count: u32, history_cap: usize, clock: Arc<dyn Clock>) -> Self {
        let history_cap = history_cap.max(1);
        Self {
            results: VecDeque::with_capacity(history_cap.min(DEFAULT_HISTORY_CAP)),
            max_count: max_count.max(1),
            history_cap,
            runs: 0,
            clock,
        }
    }

    /// Evaluate `input.count` copies of the request (count clamped to
    /// `1..=max_count`) and prepend them to the history, dropping the oldest
    /// past the cap. Both team and model must be selected; otherwise nothing
    /// is recorded.
    pub fn run(&mut self, policies: &[Policy], input: &CandidateRequest) -> Result<Vec<SimulationResult>> {
        if input.team.trim().is_empty() || input.model.trim().is_empty() {
            return Err(PolicyError::BadRequest(
                "Please select both a team and a model".into(),
            ));
        }

        let count = input.count.clamp(1, self.max_count);
        let now = self.clock.now();
        let run = self.runs;
        self.runs += 1;
        let request = CandidateRequest {
            count: 1,
            ..input.clone()
        };

        // Every copy is identical, so one evaluation serves the whole batch.
        let explained = explain(policies, &request);
        let policy_id = explained.policy.map(|p| p.id.clone());

        let batch: Vec<SimulationResult> = (0..count)
            .map(|i| SimulationResult {
                id: format!("sim-{}-{run}-{i}", now.timestamp_millis()),
                timestamp: now,
                request: request.clone(),
                decision: explained.decision.verdict(),
                reason: explained.decision.reason().to_string(),
                policy_id: policy_id.clone(),
            })
            .collect();

        tracing::debug!(
            team = %request.team,
            model = %request.model,
            count,
            decision = explained.decision.verdict().as_str(),
            "simulation run"
        );

        for r in batch.iter().rev() {
            self.results.push_front(r.clone());
        }
        self.results.truncate(self.history_cap);
        Ok(batch)
    }

    /// Newest first.
    pub fn results(&self) -> impl Iterator<Item = &SimulationResult> {
        self.results.iter()
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn history_cap(&self) -> usize {
        self.history_cap
    }

    pub fn stats(&self) -> Stats {
        Stats::from_verdicts(self.results.iter().map(|r| r.decision))
    }

    pub fn clear(&mut self) {
        self.results.clear();
    }
}
