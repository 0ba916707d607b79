use std::sync::Arc;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::catalog::Catalog;
use crate::error::{PolicyError, Result};
use crate::eval::Verdict;
use crate::live::feed::LiveRequest;
use crate::time::Clock;

const MIN_TOKENS: u32 = 50;
const MAX_TOKENS: u32 = 1049;
const ID_SUFFIX_LEN: usize = 9;

/// Random request source over the catalog's teams and models.
pub struct RequestGenerator<R = StdRng> {
    team_ids: Vec<String>,
    model_ids: Vec<String>,
    rng: R,
    clock: Arc<dyn Clock>,
}

impl RequestGenerator<StdRng> {
    /// Deterministic for a given seed and clock.
    pub fn seeded(catalog: &Catalog, seed: u64, clock: Arc<dyn Clock>) -> Result<Self> {
        Self::new(catalog, StdRng::seed_from_u64(seed), clock)
    }

    pub fn from_entropy(catalog: &Catalog, clock: Arc<dyn Clock>) -> Result<Self> {
        Self::new(catalog, StdRng::from_entropy(), clock)
    }
}

impl<R: Rng> RequestGenerator<R> {
    pub fn new(catalog: &Catalog, rng: R, clock: Arc<dyn Clock>) -> Result<Self> {
        if catalog.teams.is_empty() || catalog.models.is_empty() {
            return Err(PolicyError::BadRequest(
                "request generator needs at least one team and one model".into(),
            ));
        }
        Ok(Self {
            team_ids: catalog.teams.iter().map(|t| t.id.clone()).collect(),
            model_ids: catalog.models.iter().map(|m| m.id.clone()).collect(),
            rng,
            clock,
        })
    }

    pub fn next_request(&mut self) -> LiveRequest {
        let team = self.team_ids.choose(&mut self.rng).cloned().unwrap_or_default();
        let model = self.model_ids.choose(&mut self.rng).cloned().unwrap_or_default();
        let decision = if self.rng.gen_bool(0.5) {
            Verdict::Accept
        } else {
            Verdict::Reject
        };
        let timestamp = self.clock.now();
        let suffix: String = (0..ID_SUFFIX_LEN)
            .map(|_| std::char::from_digit(self.rng.gen_range(0..36), 36).unwrap_or('0'))
            .collect();

        LiveRequest {
            id: format!("req-{}-{suffix}", timestamp.timestamp_millis()),
            query_text: format!("Sample query for {model}"),
            tokens: self.rng.gen_range(MIN_TOKENS..=MAX_TOKENS),
            team,
            model,
            timestamp,
            decision,
        }
    }
}
