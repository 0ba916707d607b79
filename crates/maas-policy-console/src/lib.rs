//! MaaS policy console library entry.
//!
//! Wires config, fixtures, the shared policy store, the simulator and the live
//! request runner behind an axum HTTP API. Consumed by the binary (`main.rs`)
//! and by integration tests.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod api;
pub mod app_state;
pub mod catalog;
pub mod config;
pub mod live;
pub mod obs;
pub mod ops;
pub mod router;
