//! Normalization of external records into transactions
//!
//! Bank rows and internal payment records arrive in their own shapes; these
//! helpers turn them into [`Transaction`](crate::types::Transaction) lists with
//! a consistent sign convention before they reach the engine.

pub mod payments;
pub mod statement;

pub use payments::*;
pub use statement::*;
