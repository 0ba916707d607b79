//! Built-in fixtures: teams, models, and the initial policy set.
//!
//! Embedded at compile time and parsed strictly on startup, so a restart
//! always reverts to exactly this content.

use serde::Deserialize;

use maas_policy_core::error::{PolicyError, Result};
use maas_policy_core::{Catalog, Model, Policy, Team};

const FIXTURES_YAML: &str = include_str!("fixtures.yaml");

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Fixtures {
    pub teams: Vec<Team>,
    pub models: Vec<Model>,
    #[serde(default)]
    pub policies: Vec<Policy>,
}

impl Fixtures {
    pub fn into_parts(self) -> (Catalog, Vec<Policy>) {
        let catalog = Catalog {
            teams: self.teams,
            models: self.models,
        };
        (catalog, self.policies)
    }
}

pub fn load_fixtures() -> Result<Fixtures> {
    serde_yaml::from_str(FIXTURES_YAML)
        .map_err(|e| PolicyError::Internal(format!("invalid built-in fixtures: {e}")))
}
