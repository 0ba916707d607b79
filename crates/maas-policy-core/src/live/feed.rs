use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::eval::Verdict;
use crate::stats::Stats;

/// One synthetic request in the live feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiveRequest {
    pub id: String,
    pub team: String,
    pub model: String,
    pub timestamp: DateTime<Utc>,
    pub decision: Verdict,
    pub query_text: String,
    pub tokens: u32,
}

/// Feed filter. `None` fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LiveFilter {
    pub team: Option<String>,
    pub model: Option<String>,
    pub decision: Option<Verdict>,
    /// Case-insensitive substring of query text or id.
    pub search: Option<String>,
}

impl LiveFilter {
    pub fn matches(&self, req: &LiveRequest) -> bool {
        if self.team.as_deref().is_some_and(|t| t != req.team) {
            return false;
        }
        if self.model.as_deref().is_some_and(|m| m != req.model) {
            return false;
        }
        if self.decision.is_some_and(|d| d != req.decision) {
            return false;
        }
        match self.search.as_deref().map(str::to_lowercase) {
            Some(needle) if !needle.is_empty() => {
                req.query_text.to_lowercase().contains(&needle) || req.id.to_lowercase().contains(&needle)
            }
            _ => true,
        }
    }
}

/// Bounded history; the oldest entry is dropped once `cap` is exceeded.
#[derive(Debug, Clone)]
pub struct LiveFeed {
    history: VecDeque<LiveRequest>,
    cap: usize,
}

impl LiveFeed {
    pub fn new(cap: usize) -> Self {
        let cap = cap.max(1);
        Self {
            history: VecDeque::with_capacity(cap),
            cap,
        }
    }

    pub fn cap(&self) -> usize {
        self.cap
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    /// Append; returns how many old entries were dropped.
    pub fn push(&mut self, req: LiveRequest) -> usize {
        self.history.push_back(req);
        let mut dropped = 0;
        while self.history.len() > self.cap {
            self.history.pop_front();
            dropped += 1;
        }
        dropped
    }

    /// Newest first.
    pub fn iter(&self) -> impl Iterator<Item = &LiveRequest> {
        self.history.iter().rev()
    }

    /// Newest first, filtered.
    pub fn filtered<'a>(&'a self, filter: &'a LiveFilter) -> impl Iterator<Item = &'a LiveRequest> {
        self.iter().filter(move |r| filter.matches(r))
    }

    /// Stats over the whole history, regardless of any filter.
    pub fn stats(&self) -> Stats {
        Stats::from_verdicts(self.history.iter().map(|r| r.decision))
    }

    pub fn clear(&mut self) {
        self.history.clear();
    }
}
