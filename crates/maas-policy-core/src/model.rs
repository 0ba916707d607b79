//! Policy records and the reference types they point at.

use std::num::NonZeroU64;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{PolicyError, Result};
use crate::time::TimeOfDay;

/// Team a request is issued on behalf of.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Team {
    pub id: String,
    pub name: String,
    /// Display color (hex).
    pub color: String,
}

/// Served model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Model {
    pub id: String,
    pub name: String,
    pub provider: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// What a policy item refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Team,
    Model,
}

impl ItemKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ItemKind::Team => "team",
            ItemKind::Model => "model",
        }
    }
}

/// One rule entry inside a policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PolicyItem {
    /// Item id. Left blank by clients; the store assigns one.
    #[serde(default)]
    pub id: String,
    /// Field name is `type` in JSON/YAML.
    #[serde(rename = "type")]
    pub kind: ItemKind,
    /// Team id or model id, depending on `kind`.
    pub value: String,
    /// true = allow-list entry, false = deny-list entry.
    pub is_approve: bool,
}

impl PolicyItem {
    pub fn new(kind: ItemKind, value: impl Into<String>, is_approve: bool) -> Self {
        Self {
            id: new_item_id(),
            kind,
            value: value.into(),
            is_approve,
        }
    }
}

pub(crate) fn new_item_id() -> String {
    format!("item-{}", uuid::Uuid::new_v4().simple())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimePeriod {
    #[default]
    Hour,
    Day,
    Week,
    Month,
}

impl TimePeriod {
    pub fn as_str(self) -> &'static str {
        match self {
            TimePeriod::Hour => "hour",
            TimePeriod::Day => "day",
            TimePeriod::Week => "week",
            TimePeriod::Month => "month",
        }
    }
}

/// Token quota annotation. Displayed, never enforced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RequestLimits {
    /// None means unlimited.
    #[serde(default)]
    pub token_limit: Option<NonZeroU64>,
    #[serde(default)]
    pub time_period: TimePeriod,
}

impl RequestLimits {
    /// "200,000 tokens/hour" or "Unlimited".
    pub fn summary(&self) -> String {
        match self.token_limit {
            Some(limit) => format!(
                "{} tokens/{}",
                group_thousands(limit.get()),
                self.time_period.as_str()
            ),
            None => "Unlimited".to_string(),
        }
    }
}

fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Access window. `unlimited` bypasses the start/end check entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TimeRange {
    pub start_time: TimeOfDay,
    pub end_time: TimeOfDay,
    #[serde(default)]
    pub unlimited: bool,
}

impl Default for TimeRange {
    fn default() -> Self {
        Self {
            start_time: TimeOfDay::start_of_business(),
            end_time: TimeOfDay::end_of_business(),
            unlimited: false,
        }
    }
}

impl TimeRange {
    /// Inclusive on both ends. A start after the end admits nothing.
    pub fn contains(&self, t: TimeOfDay) -> bool {
        self.unlimited || (t >= self.start_time && t <= self.end_time)
    }

    /// "09:00-17:00" or "24/7".
    pub fn summary(&self) -> String {
        if self.unlimited {
            "24/7".to_string()
        } else {
            format!("{}-{}", self.start_time, self.end_time)
        }
    }
}

/// User-editable content of a policy; payload of create and update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PolicySpec {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub items: Vec<PolicyItem>,
    #[serde(default)]
    pub request_limits: RequestLimits,
    #[serde(default)]
    pub time_range: TimeRange,
}

impl PolicySpec {
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(PolicyError::BadRequest("policy name must not be blank".into()));
        }
        if self.items.is_empty() {
            return Err(PolicyError::BadRequest(
                "policy must contain at least one team or model item".into(),
            ));
        }
        if let Some(item) = self.items.iter().find(|i| i.value.trim().is_empty()) {
            return Err(PolicyError::BadRequest(format!(
                "{} item value must not be blank",
                item.kind.as_str()
            )));
        }
        Ok(())
    }
}

/// Stored policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Policy {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub items: Vec<PolicyItem>,
    #[serde(default)]
    pub request_limits: RequestLimits,
    #[serde(default)]
    pub time_range: TimeRange,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

impl Policy {
    pub(crate) fn from_spec(id: String, spec: PolicySpec, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: spec.name,
            description: spec.description,
            items: spec.items,
            request_limits: spec.request_limits,
            time_range: spec.time_range,
            created: now,
            modified: now,
        }
    }

    /// Replace the editable content, keeping id and `created`.
    pub(crate) fn apply(&mut self, spec: PolicySpec, now: DateTime<Utc>) {
        self.name = spec.name;
        self.description = spec.description;
        self.items = spec.items;
        self.request_limits = spec.request_limits;
        self.time_range = spec.time_range;
        self.modified = now;
    }

    pub fn spec(&self) -> PolicySpec {
        PolicySpec {
            name: self.name.clone(),
            description: self.description.clone(),
            items: self.items.clone(),
            request_limits: self.request_limits,
            time_range: self.time_range,
        }
    }

    pub fn items_of(&self, kind: ItemKind) -> impl Iterator<Item = &PolicyItem> {
        self.items.iter().filter(move |i| i.kind == kind)
    }

    /// e.g. "200,000 tokens/hour, 09:00-17:00".
    pub fn limits_summary(&self) -> String {
        format!("{}, {}", self.request_limits.summary(), self.time_range.summary())
    }
}
