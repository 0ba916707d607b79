//! Live mode: periodic synthetic request generation into the feed.
//!
//! One spawned task ticks every `interval` while live mode is on. Turning live
//! mode off aborts the task; turning it on spawns a fresh one, so the first new
//! request arrives one full interval after the toggle.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde::Serialize;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use maas_policy_core::error::Result;
use maas_policy_core::live::{LiveFeed, LiveFilter, LiveRequest, RequestGenerator};
use maas_policy_core::Stats;

use crate::app_state::lock;
use crate::obs::ConsoleMetrics;

/// Filtered view of the feed plus whole-history stats.
#[derive(Debug, Clone, Serialize)]
pub struct FeedSnapshot {
    pub requests: Vec<LiveRequest>,
    pub showing: usize,
    pub total: usize,
    pub stats: Stats,
}

struct LiveShared {
    feed: Mutex<LiveFeed>,
    generator: Mutex<RequestGenerator>,
    metrics: Arc<ConsoleMetrics>,
}

impl LiveShared {
    fn tick(&self) -> Result<LiveRequest> {
        let req = lock(&self.generator, "live generator")?.next_request();
        let dropped = lock(&self.feed, "live feed")?.push(req.clone());
        self.metrics
            .live_generated
            .inc(&[("decision", req.decision.as_str())]);
        tracing::trace!(id = %req.id, team = %req.team, model = %req.model, dropped, "live request appended");
        Ok(req)
    }
}

pub struct LiveRunner {
    shared: Arc<LiveShared>,
    interval: Duration,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl LiveRunner {
    pub fn new(
        feed: LiveFeed,
        generator: RequestGenerator,
        interval: Duration,
        metrics: Arc<ConsoleMetrics>,
    ) -> Self {
        metrics.live_enabled.set(&[], 0);
        Self {
            shared: Arc::new(LiveShared {
                feed: Mutex::new(feed),
                generator: Mutex::new(generator),
                metrics,
            }),
            interval,
            task: Mutex::new(None),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Spawn the generator task. Must be called inside a tokio runtime.
    /// Returns false if live mode was already on.
    pub fn start(&self) -> Result<bool> {
        let mut task = lock(&self.task, "live task")?;
        if task.as_ref().is_some_and(|h| !h.is_finished()) {
            return Ok(false);
        }

        let shared = Arc::clone(&self.shared);
        let period = self.interval;
        *task = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if let Err(e) = shared.tick() {
                    tracing::warn!(error = %e, "live request generation failed");
                }
            }
        }));

        self.shared.metrics.live_enabled.set(&[], 1);
        tracing::info!(interval_ms = period.as_millis() as u64, "live mode started");
        Ok(true)
    }

    /// Stop the generator task. Returns false if live mode was already off.
    pub fn stop(&self) -> Result<bool> {
        let handle = lock(&self.task, "live task")?.take();
        self.shared.metrics.live_enabled.set(&[], 0);
        match handle {
            Some(h) => {
                h.abort();
                tracing::info!("live mode stopped");
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn set_live(&self, enabled: bool) -> Result<bool> {
        if enabled {
            self.start()
        } else {
            self.stop()
        }
    }

    pub fn is_live(&self) -> bool {
        match self.task.lock() {
            Ok(g) => g.as_ref().is_some_and(|h| !h.is_finished()),
            Err(_) => false,
        }
    }

    /// Generate and append one request immediately.
    pub fn tick(&self) -> Result<LiveRequest> {
        self.shared.tick()
    }

    pub fn snapshot(&self, filter: &LiveFilter) -> Result<FeedSnapshot> {
        let feed = lock(&self.shared.feed, "live feed")?;
        let requests: Vec<LiveRequest> = feed.filtered(filter).cloned().collect();
        Ok(FeedSnapshot {
            showing: requests.len(),
            total: feed.len(),
            stats: feed.stats(),
            requests,
        })
    }

    pub fn clear(&self) -> Result<()> {
        lock(&self.shared.feed, "live feed")?.clear();
        Ok(())
    }
}

impl Drop for LiveRunner {
    fn drop(&mut self) {
        if let Ok(mut g) = self.task.lock() {
            if let Some(h) = g.take() {
                h.abort();
            }
        }
    }
}
