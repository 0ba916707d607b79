//! Synthetic "live" request traffic.
//!
//! The generator produces random requests from a seedable source; the feed
//! keeps a bounded newest-first history of them. Neither consults the policy
//! set: live decisions are random by construction.

pub mod feed;
pub mod generator;

pub use feed::{LiveFeed, LiveFilter, LiveRequest};
pub use generator::RequestGenerator;
