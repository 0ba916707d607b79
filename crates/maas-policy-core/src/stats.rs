//! Accept/reject tallies shown alongside request lists.

use serde::Serialize;

use crate::eval::Verdict;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Stats {
    pub total: usize,
    pub accepted: usize,
    pub rejected: usize,
    /// Percentage of accepted requests, one decimal place; 0 when empty.
    pub acceptance_rate: f64,
}

impl Stats {
    pub fn from_verdicts(verdicts: impl IntoIterator<Item = Verdict>) -> Self {
        let (mut accepted, mut rejected) = (0usize, 0usize);
        for v in verdicts {
            match v {
                Verdict::Accept => accepted += 1,
                Verdict::Reject => rejected += 1,
            }
        }
        let total = accepted + rejected;
        let acceptance_rate = if total == 0 {
            0.0
        } else {
            (accepted as f64 * 1000.0 / total as f64).round() / 10.0
        };
        Self {
            total,
            accepted,
            rejected,
            acceptance_rate,
        }
    }
}
