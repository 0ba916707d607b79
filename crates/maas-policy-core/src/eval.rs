//! Request evaluation against the ordered policy list.
//!
//! Rules, applied policy by policy in stored order:
//! - the first team item matching the request's team rejects if it is a deny entry;
//! - then the first matching model item, same rule;
//! - then the time window, unless the policy's window is unlimited.
//!
//! The first rejecting policy wins. Approve entries never grant access on their
//! own, and a team or model no item mentions is allowed by that policy.
//! Token limits are not consulted.

use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};

use crate::model::{ItemKind, Policy, PolicyItem};
use crate::time::TimeOfDay;

/// Reason attached to every accept decision.
pub const ACCEPT_REASON: &str = "Request meets all policy requirements";

/// Hypothetical request checked against the policy set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CandidateRequest {
    pub team: String,
    pub model: String,
    pub time_of_day: TimeOfDay,
    #[serde(default)]
    pub query_text: String,
    #[serde(default = "default_count")]
    pub count: u32,
}

fn default_count() -> u32 {
    1
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Accept,
    Reject,
}

impl Verdict {
    pub fn as_str(self) -> &'static str {
        match self {
            Verdict::Accept => "accept",
            Verdict::Reject => "reject",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RejectReason {
    TeamNotApproved,
    ModelNotApproved,
    OutsideTimeRange,
}

impl RejectReason {
    pub fn as_str(self) -> &'static str {
        match self {
            RejectReason::TeamNotApproved => "Team not approved by policy",
            RejectReason::ModelNotApproved => "Model not approved by policy",
            RejectReason::OutsideTimeRange => "Request outside allowed time range",
        }
    }
}

/// Evaluator output. Serializes as `{"decision": "...", "reason": "..."}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Decision {
    Accept,
    Reject(RejectReason),
}

impl Decision {
    pub fn verdict(self) -> Verdict {
        match self {
            Decision::Accept => Verdict::Accept,
            Decision::Reject(_) => Verdict::Reject,
        }
    }

    pub fn reason(self) -> &'static str {
        match self {
            Decision::Accept => ACCEPT_REASON,
            Decision::Reject(r) => r.as_str(),
        }
    }

    pub fn is_accept(self) -> bool {
        matches!(self, Decision::Accept)
    }
}

impl Serialize for Decision {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("Decision", 2)?;
        s.serialize_field("decision", &self.verdict())?;
        s.serialize_field("reason", self.reason())?;
        s.end()
    }
}

/// Decision plus the policy that produced a rejection (None on accept).
#[derive(Debug, Clone, Copy)]
pub struct Explanation<'a> {
    pub decision: Decision,
    pub policy: Option<&'a Policy>,
}

/// Evaluate one request against the ordered policy list.
pub fn evaluate(policies: &[Policy], req: &CandidateRequest) -> Decision {
    explain(policies, req).decision
}

/// Like [`evaluate`], but also reports which policy rejected.
pub fn explain<'a>(policies: &'a [Policy], req: &CandidateRequest) -> Explanation<'a> {
    for policy in policies {
        if let Some(reason) = check_policy(policy, req) {
            tracing::debug!(
                policy_id = %policy.id,
                team = %req.team,
                model = %req.model,
                reason = reason.as_str(),
                "request rejected"
            );
            return Explanation {
                decision: Decision::Reject(reason),
                policy: Some(policy),
            };
        }
    }
    Explanation {
        decision: Decision::Accept,
        policy: None,
    }
}

fn check_policy(policy: &Policy, req: &CandidateRequest) -> Option<RejectReason> {
    if first_match(policy, ItemKind::Team, &req.team).is_some_and(|i| !i.is_approve) {
        return Some(RejectReason::TeamNotApproved);
    }
    if first_match(policy, ItemKind::Model, &req.model).is_some_and(|i| !i.is_approve) {
        return Some(RejectReason::ModelNotApproved);
    }
    if !policy.time_range.contains(req.time_of_day) {
        return Some(RejectReason::OutsideTimeRange);
    }
    None
}

// first match wins per category
fn first_match<'a>(policy: &'a Policy, kind: ItemKind, value: &str) -> Option<&'a PolicyItem> {
    policy.items_of(kind).find(|i| i.value == value)
}
