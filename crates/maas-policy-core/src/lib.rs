//! MaaS policy core: domain model, evaluation, and in-memory state.
//!
//! This crate holds everything the console decides or remembers: policies and
//! the store that owns them, the evaluator, the policy builder draft, the
//! simulator, and the live request generator/feed. It carries no transport or
//! runtime dependencies so the decision logic can be reused outside the
//! console service.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! All fallible paths surface as `PolicyError`/`Result`.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod builder;
pub mod catalog;
pub mod error;
pub mod eval;
pub mod live;
pub mod model;
pub mod simulator;
pub mod stats;
pub mod store;
pub mod time;

/// Shared result type.
pub use error::{PolicyError, Result};

pub use builder::PolicyDraft;
pub use catalog::Catalog;
pub use eval::{evaluate, explain, CandidateRequest, Decision, Explanation, RejectReason, Verdict};
pub use model::{ItemKind, Model, Policy, PolicyItem, PolicySpec, RequestLimits, Team, TimePeriod, TimeRange};
pub use simulator::{SimulationResult, Simulator};
pub use stats::Stats;
pub use store::PolicyStore;
pub use time::{Clock, FixedClock, SystemClock, TimeOfDay};
