//! Top-level facade crate for the MaaS policy console.
//!
//! Re-exports the decision core and the console service so users can depend on a
//! single crate.

pub mod core {
    pub use maas_policy_core::*;
}

pub mod console {
    pub use maas_policy_console::*;
}
