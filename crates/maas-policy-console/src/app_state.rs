//! Shared application state for the MaaS policy console.
//!
//! Owns the policy store, simulator history, live runner, catalog and metrics.
//! Each mutable piece sits behind its own mutex; critical sections never span
//! an await.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use maas_policy_core::error::{PolicyError, Result};
use maas_policy_core::live::{LiveFeed, RequestGenerator};
use maas_policy_core::{Catalog, Clock, PolicyStore, Simulator, SystemClock};

use crate::catalog;
use crate::config::ConsoleConfig;
use crate::live::LiveRunner;
use crate::obs::ConsoleMetrics;

/// Lock a std mutex, surfacing poisoning as an internal error instead of a panic.
pub(crate) fn lock<'a, T>(m: &'a Mutex<T>, what: &str) -> Result<MutexGuard<'a, T>> {
    m.lock()
        .map_err(|_| PolicyError::Internal(format!("{what} lock poisoned")))
}

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
    live: Arc<LiveRunner>,
    metrics: Arc<ConsoleMetrics>,
}

struct AppStateInner {
    cfg: ConsoleConfig,
    catalog: Catalog,
    store: Mutex<PolicyStore>,
    simulator: Mutex<Simulator>,
}

impl AppState {
    /// Build application state on the wall clock.
    pub fn new(cfg: ConsoleConfig) -> Result<Self> {
        Self::with_clock(cfg, Arc::new(SystemClock))
    }

    /// Build application state with an injected clock. Live mode is not
    /// started here; see [`AppState::start_live_if_enabled`].
    pub fn with_clock(cfg: ConsoleConfig, clock: Arc<dyn Clock>) -> Result<Self> {
        // 1) Fixtures
        let (catalog, seed_policies) = catalog::load_fixtures()?.into_parts();
        let metrics = Arc::new(ConsoleMetrics::default());

        // 2) Store + simulator
        let store = PolicyStore::new(seed_policies, Arc::clone(&clock));
        metrics.policies.set(&[], store.len() as i64);
        let simulator = Simulator::new(
            cfg.simulator.max_count,
            cfg.simulator.history_cap,
            Arc::clone(&clock),
        );

        // 3) Live feed
        let generator = match cfg.live.seed {
            Some(seed) => RequestGenerator::seeded(&catalog, seed, Arc::clone(&clock)),
            None => RequestGenerator::from_entropy(&catalog, Arc::clone(&clock)),
        }
        .map_err(|e| PolicyError::Internal(format!("live generator setup failed: {e}")))?;
        let live = LiveRunner::new(
            LiveFeed::new(cfg.live.history_cap),
            generator,
            Duration::from_millis(cfg.live.interval_ms),
            Arc::clone(&metrics),
        );

        tracing::info!(
            policies = store.len(),
            teams = catalog.teams.len(),
            models = catalog.models.len(),
            "console state initialized"
        );

        Ok(Self {
            inner: Arc::new(AppStateInner {
                cfg,
                catalog,
                store: Mutex::new(store),
                simulator: Mutex::new(simulator),
            }),
            live: Arc::new(live),
            metrics,
        })
    }

    /// Start live mode when the config asks for it. Must run inside a tokio runtime.
    pub fn start_live_if_enabled(&self) -> Result<()> {
        if self.inner.cfg.live.enabled {
            self.live.start()?;
        }
        Ok(())
    }

    pub fn cfg(&self) -> &ConsoleConfig {
        &self.inner.cfg
    }

    pub fn catalog(&self) -> &Catalog {
        &self.inner.catalog
    }

    pub fn store(&self) -> Result<MutexGuard<'_, PolicyStore>> {
        lock(&self.inner.store, "policy store")
    }

    pub fn simulator(&self) -> Result<MutexGuard<'_, Simulator>> {
        lock(&self.inner.simulator, "simulator")
    }

    pub fn live(&self) -> Arc<LiveRunner> {
        Arc::clone(&self.live)
    }

    pub fn metrics(&self) -> &ConsoleMetrics {
        &self.metrics
    }
}
