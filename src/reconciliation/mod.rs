//! Reconciliation of bank statements against internal transactions
//!
//! Matching runs in two greedy phases over copies of the inputs: exact
//! (amount, date and reference within tolerance) and then fuzzy (weighted
//! amount/description/date score above a threshold). Finalization applies
//! manual pairings and approvals afterwards.

pub mod engine;
pub mod finalize;
pub mod scoring;
pub mod settings;

pub use engine::*;
pub use finalize::*;
pub use settings::*;
