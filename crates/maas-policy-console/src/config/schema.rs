use std::net::SocketAddr;

use serde::Deserialize;
use maas_policy_core::error::{PolicyError, Result};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConsoleConfig {
    pub version: u32,

    #[serde(default)]
    pub console: ConsoleSection,

    #[serde(default)]
    pub live: LiveSection,

    #[serde(default)]
    pub simulator: SimulatorSection,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            version: 1,
            console: ConsoleSection::default(),
            live: LiveSection::default(),
            simulator: SimulatorSection::default(),
        }
    }
}

impl ConsoleConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(PolicyError::UnsupportedVersion);
        }

        self.console.validate()?;
        self.live.validate()?;
        self.simulator.validate()?;

        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConsoleSection {
    #[serde(default = "default_listen")]
    pub listen: String,
}

impl Default for ConsoleSection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
        }
    }
}

impl ConsoleSection {
    pub fn validate(&self) -> Result<()> {
        self.listen_addr().map(|_| ())
    }

    pub fn listen_addr(&self) -> Result<SocketAddr> {
        self.listen.parse().map_err(|_| {
            PolicyError::BadRequest(format!(
                "console.listen must be a valid socket address: {}",
                self.listen
            ))
        })
    }
}

fn default_listen() -> String {
    "0.0.0.0:8080".into()
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LiveSection {
    /// Live mode on at startup.
    #[serde(default = "default_live_enabled")]
    pub enabled: bool,

    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,

    #[serde(default = "default_history_cap")]
    pub history_cap: usize,

    /// Fixed generator seed; entropy when absent.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for LiveSection {
    fn default() -> Self {
        Self {
            enabled: default_live_enabled(),
            interval_ms: default_interval_ms(),
            history_cap: default_history_cap(),
            seed: None,
        }
    }
}

impl LiveSection {
    pub fn validate(&self) -> Result<()> {
        if !(100..=60000).contains(&self.interval_ms) {
            return Err(PolicyError::BadRequest(
                "live.interval_ms must be between 100 and 60000".into(),
            ));
        }
        if !(1..=10000).contains(&self.history_cap) {
            return Err(PolicyError::BadRequest(
                "live.history_cap must be between 1 and 10000".into(),
            ));
        }
        Ok(())
    }
}

fn default_live_enabled() -> bool {
    true
}
fn default_interval_ms() -> u64 {
    2000
}
fn default_history_cap() -> usize {
    100
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SimulatorSection {
    #[serde(default = "default_max_count")]
    pub max_count: u32,

    /// Results kept before the oldest are dropped.
    #[serde(default = "default_sim_history_cap")]
    pub history_cap: usize,
}

impl Default for SimulatorSection {
    fn default() -> Self {
        Self {
            max_count: default_max_count(),
            history_cap: default_sim_history_cap(),
        }
    }
}

impl SimulatorSection {
    pub fn validate(&self) -> Result<()> {
        if !(1..=1000).contains(&self.max_count) {
            return Err(PolicyError::BadRequest(
                "simulator.max_count must be between 1 and 1000".into(),
            ));
        }
        if !(1..=100000).contains(&self.history_cap) {
            return Err(PolicyError::BadRequest(
                "simulator.history_cap must be between 1 and 100000".into(),
            ));
        }
        Ok(())
    }
}

fn default_max_count() -> u32 {
    maas_policy_core::simulator::DEFAULT_MAX_COUNT
}

fn default_sim_history_cap() -> usize {
    maas_policy_core::simulator::DEFAULT_HISTORY_CAP
}
