//! Policy builder: an editable draft of a policy's content.
//!
//! Items are assigned by set membership: a team or model is either in the
//! draft once or not at all. Each section (teams, models) carries an approve
//! flag that new items inherit and that a toggle rewrites across the section.
//!
//! The console admits every create/update payload through
//! [`PolicyDraft::from_spec`] and serves the builder palette from
//! [`PolicyDraft::available_teams`]/[`PolicyDraft::available_models`]. The
//! editing operations (`add`, `remove`, `move_item`, `toggle_section`) are
//! library API for interactive front ends.

use crate::catalog::Catalog;
use crate::error::{PolicyError, Result};
use crate::model::{ItemKind, Model, Policy, PolicyItem, PolicySpec, RequestLimits, Team, TimeRange};

#[derive(Debug, Clone)]
pub struct PolicyDraft {
    pub name: String,
    pub description: String,
    pub request_limits: RequestLimits,
    pub time_range: TimeRange,
    items: Vec<PolicyItem>,
    team_approve: bool,
    model_approve: bool,
}

impl Default for PolicyDraft {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            request_limits: RequestLimits::default(),
            time_range: TimeRange::default(),
            items: Vec::new(),
            team_approve: true,
            model_approve: true,
        }
    }
}

impl PolicyDraft {
    pub fn new() -> Self {
        Self::default()
    }

    /// Draft for editing an existing policy. Section flags follow the first
    /// item of each kind.
    pub fn from_policy(policy: &Policy) -> Self {
        let first_flag = |kind| policy.items_of(kind).next().map(|i| i.is_approve).unwrap_or(true);
        Self {
            name: policy.name.clone(),
            description: policy.description.clone(),
            request_limits: policy.request_limits,
            time_range: policy.time_range,
            items: policy.items.clone(),
            team_approve: first_flag(ItemKind::Team),
            model_approve: first_flag(ItemKind::Model),
        }
    }

    /// Draft from submitted content. Refuses a payload naming the same team
    /// or model twice; section flags follow the first item of each kind.
    pub fn from_spec(spec: PolicySpec) -> Result<Self> {
        let mut draft = Self {
            name: spec.name,
            description: spec.description,
            request_limits: spec.request_limits,
            time_range: spec.time_range,
            ..Self::default()
        };
        for item in spec.items {
            if draft.contains(item.kind, &item.value) {
                return Err(PolicyError::BadRequest(format!(
                    "duplicate {} item: {}",
                    item.kind.as_str(),
                    item.value
                )));
            }
            if !draft.items.iter().any(|i| i.kind == item.kind) {
                match item.kind {
                    ItemKind::Team => draft.team_approve = item.is_approve,
                    ItemKind::Model => draft.model_approve = item.is_approve,
                }
            }
            draft.items.push(item);
        }
        Ok(draft)
    }

    pub fn items(&self) -> &[PolicyItem] {
        &self.items
    }

    pub fn section_approve(&self, kind: ItemKind) -> bool {
        match kind {
            ItemKind::Team => self.team_approve,
            ItemKind::Model => self.model_approve,
        }
    }

    pub fn contains(&self, kind: ItemKind, value: &str) -> bool {
        self.items.iter().any(|i| i.kind == kind && i.value == value)
    }

    /// Catalog teams not yet in the draft.
    pub fn available_teams<'a>(&self, catalog: &'a Catalog) -> Vec<&'a Team> {
        catalog
            .teams
            .iter()
            .filter(|t| !self.contains(ItemKind::Team, &t.id))
            .collect()
    }

    /// Catalog models not yet in the draft.
    pub fn available_models<'a>(&self, catalog: &'a Catalog) -> Vec<&'a Model> {
        catalog
            .models
            .iter()
            .filter(|m| !self.contains(ItemKind::Model, &m.id))
            .collect()
    }

    /// Add an item with the section's current flag. Returns false if an item
    /// of this kind and value is already present.
    pub fn add(&mut self, kind: ItemKind, value: impl Into<String>) -> bool {
        let value = value.into();
        if self.contains(kind, &value) {
            return false;
        }
        let approve = self.section_approve(kind);
        self.items.push(PolicyItem::new(kind, value, approve));
        true
    }

    pub fn remove(&mut self, item_id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|i| i.id != item_id);
        self.items.len() != before
    }

    /// Move the item at `from` to position `to`, shifting the rest.
    pub fn move_item(&mut self, from: usize, to: usize) -> bool {
        if from >= self.items.len() || to >= self.items.len() {
            return false;
        }
        if from != to {
            let item = self.items.remove(from);
            self.items.insert(to, item);
        }
        true
    }

    /// Flip the section flag and rewrite every item of that kind. Returns the
    /// new flag.
    pub fn toggle_section(&mut self, kind: ItemKind) -> bool {
        let flag = match kind {
            ItemKind::Team => {
                self.team_approve = !self.team_approve;
                self.team_approve
            }
            ItemKind::Model => {
                self.model_approve = !self.model_approve;
                self.model_approve
            }
        };
        for item in self.items.iter_mut().filter(|i| i.kind == kind) {
            item.is_approve = flag;
        }
        flag
    }

    pub fn can_save(&self) -> bool {
        !self.name.trim().is_empty() && !self.items.is_empty()
    }

    /// Validated content ready for the store.
    pub fn finish(&self) -> Result<PolicySpec> {
        if !self.can_save() {
            return Err(PolicyError::BadRequest(
                "policy needs a name and at least one item".into(),
            ));
        }
        let spec = PolicySpec {
            name: self.name.trim().to_string(),
            description: self.description.clone(),
            items: self.items.clone(),
            request_limits: self.request_limits,
            time_range: self.time_range,
        };
        spec.validate()?;
        Ok(spec)
    }
}
