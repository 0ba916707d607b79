//! Ordered in-memory policy store.
//!
//! Single owner, no interior locking: callers that share a store across tasks
//! wrap it themselves. Order is insertion order and is what the evaluator walks.

use std::sync::Arc;

use crate::error::{PolicyError, Result};
use crate::model::{new_item_id, Policy, PolicySpec};
use crate::time::Clock;

pub struct PolicyStore {
    policies: Vec<Policy>,
    clock: Arc<dyn Clock>,
}

impl PolicyStore {
    /// Seed with an initial policy list (kept as given, in order).
    pub fn new(seed: Vec<Policy>, clock: Arc<dyn Clock>) -> Self {
        Self { policies: seed, clock }
    }

    pub fn list(&self) -> &[Policy] {
        &self.policies
    }

    pub fn len(&self) -> usize {
        self.policies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Policy> {
        self.policies.iter().find(|p| p.id == id)
    }

    /// Append a new policy with a fresh id. Identical content is not merged.
    pub fn create(&mut self, mut spec: PolicySpec) -> Result<Policy> {
        spec.validate()?;
        assign_item_ids(&mut spec);

        let id = format!("policy-{}", uuid::Uuid::new_v4().simple());
        let policy = Policy::from_spec(id, spec, self.clock.now());
        tracing::debug!(policy_id = %policy.id, name = %policy.name, "policy created");
        self.policies.push(policy.clone());
        Ok(policy)
    }

    /// Replace a policy's content in place; `created` is kept, `modified` refreshed.
    pub fn update(&mut self, id: &str, mut spec: PolicySpec) -> Result<Policy> {
        spec.validate()?;
        assign_item_ids(&mut spec);

        let now = self.clock.now();
        let policy = self
            .policies
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| PolicyError::NotFound(format!("policy {id}")))?;
        policy.apply(spec, now);
        tracing::debug!(policy_id = %id, "policy updated");
        Ok(policy.clone())
    }

    pub fn delete(&mut self, id: &str) -> Result<Policy> {
        let idx = self
            .policies
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| PolicyError::NotFound(format!("policy {id}")))?;
        tracing::debug!(policy_id = %id, "policy deleted");
        Ok(self.policies.remove(idx))
    }

    /// Case-insensitive substring match on name or description.
    /// An empty term matches everything.
    pub fn search(&self, term: &str) -> Vec<&Policy> {
        let needle = term.to_lowercase();
        self.policies
            .iter()
            .filter(|p| {
                needle.is_empty()
                    || p.name.to_lowercase().contains(&needle)
                    || p.description.to_lowercase().contains(&needle)
            })
            .collect()
    }
}

fn assign_item_ids(spec: &mut PolicySpec) {
    for item in spec.items.iter_mut().filter(|i| i.id.trim().is_empty()) {
        item.id = new_item_id();
    }
}
