//! # Reconciliation Core
//!
//! Bank statement reconciliation for restaurant back-office accounting:
//! matching bank statement lines against internal payment records.
//!
//! ## Features
//!
//! - **Exact matching**: amount within tolerance, date within window, references equal
//! - **Fuzzy matching**: weighted amount/description/date score above a threshold
//! - **Finalization**: manual pairings and bulk approval of matches
//! - **Sources**: normalization of statement rows and payment records into transactions
//! - **Archival**: storage-agnostic persistence of finalized results
//!
//! ## Quick Start
//!
//! ```rust
//! use reconciliation_core::{reconcile, ReconciliationSettings, Transaction, MatchType};
//! use bigdecimal::BigDecimal;
//! use chrono::NaiveDate;
//!
//! let bank = vec![Transaction::new(
//!     "b1".to_string(),
//!     NaiveDate::from_ymd_opt(2025, 4, 10).unwrap(),
//!     BigDecimal::from(100),
//!     "Transfer INV42".to_string(),
//!     Some("INV42".to_string()),
//! )];
//! let system = vec![Transaction::new(
//!     "s1".to_string(),
//!     NaiveDate::from_ymd_opt(2025, 4, 11).unwrap(),
//!     BigDecimal::from(100),
//!     "Invoice 42".to_string(),
//!     Some("inv42".to_string()),
//! )];
//!
//! let result = reconcile(&bank, &system, &ReconciliationSettings::default()).unwrap();
//! assert_eq!(result.matches[0].match_type, MatchType::Exact);
//! ```

pub mod reconciliation;
pub mod sources;
pub mod traits;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use reconciliation::*;
pub use sources::*;
pub use traits::*;
pub use types::*;
