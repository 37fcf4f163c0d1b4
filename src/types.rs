//! Core types and data structures for the reconciliation system

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single money movement, either a bank statement line or an internal
/// payment record. Both sides of a reconciliation share this shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Identifier, unique within its source list
    pub id: String,
    /// Calendar date of the movement
    pub date: NaiveDate,
    /// Signed amount: positive for money in (credit), negative for money out (debit)
    pub amount: BigDecimal,
    /// Free-text label, may be empty
    #[serde(default)]
    pub description: String,
    /// Optional payment reference (invoice number, check number, etc.)
    #[serde(default)]
    pub reference: Option<String>,
    /// Set on the engine's output copy once the transaction has been matched
    #[serde(default)]
    pub reconciled: bool,
}

impl Transaction {
    /// Create a new, unreconciled transaction
    pub fn new(
        id: String,
        date: NaiveDate,
        amount: BigDecimal,
        description: String,
        reference: Option<String>,
    ) -> Self {
        Self {
            id,
            date,
            amount,
            description,
            reference,
            reconciled: false,
        }
    }

    /// The reference, if present and not blank
    pub fn reference(&self) -> Option<&str> {
        self.reference
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
    }

    /// Absolute number of calendar days between two transactions
    pub fn day_distance(&self, other: &Transaction) -> i64 {
        (self.date - other.date).num_days().abs()
    }
}

/// How a pair of transactions was matched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchType {
    /// Amount, date and reference agree within tolerance
    Exact,
    /// Weighted similarity score exceeded the matching threshold
    Fuzzy,
    /// Asserted by a user during finalization
    Manual,
}

impl std::fmt::Display for MatchType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Exact => write!(f, "exact"),
            Self::Fuzzy => write!(f, "fuzzy"),
            Self::Manual => write!(f, "manual"),
        }
    }
}

/// A bank transaction paired with a system transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchCandidate {
    /// Bank statement side of the pair
    pub bank_transaction: Transaction,
    /// Internal system side of the pair
    pub system_transaction: Transaction,
    /// How the pair was found
    pub match_type: MatchType,
    /// Confidence in [0, 1]; exact and manual matches always carry 1.0
    pub confidence: f64,
    /// Whether the match has been approved downstream
    pub approved: bool,
}

impl MatchCandidate {
    /// Create an unapproved match
    pub fn new(
        bank_transaction: Transaction,
        system_transaction: Transaction,
        match_type: MatchType,
        confidence: f64,
    ) -> Self {
        Self {
            bank_transaction,
            system_transaction,
            match_type,
            confidence,
            approved: false,
        }
    }

    /// Create an exact match (confidence 1.0)
    pub fn exact(bank_transaction: Transaction, system_transaction: Transaction) -> Self {
        Self::new(bank_transaction, system_transaction, MatchType::Exact, 1.0)
    }

    /// Create a fuzzy match with the given confidence
    pub fn fuzzy(
        bank_transaction: Transaction,
        system_transaction: Transaction,
        confidence: f64,
    ) -> Self {
        Self::new(bank_transaction, system_transaction, MatchType::Fuzzy, confidence)
    }

    /// Create a manual match, which is approved on creation
    pub fn manual(bank_transaction: Transaction, system_transaction: Transaction) -> Self {
        Self {
            approved: true,
            ..Self::new(bank_transaction, system_transaction, MatchType::Manual, 1.0)
        }
    }

    /// Amount difference between the bank and system side
    pub fn amount_difference(&self) -> BigDecimal {
        &self.bank_transaction.amount - &self.system_transaction.amount
    }
}

/// Output of a reconciliation run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReconciliationResult {
    /// Matched pairs, in discovery order
    pub matches: Vec<MatchCandidate>,
    /// Bank transactions left without a counterpart
    pub unmatched_bank: Vec<Transaction>,
    /// System transactions left without a counterpart
    pub unmatched_system: Vec<Transaction>,
}

impl ReconciliationResult {
    /// Create an empty result
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of bank transactions accounted for by this result
    pub fn bank_count(&self) -> usize {
        self.matches.len() + self.unmatched_bank.len()
    }

    /// Number of system transactions accounted for by this result
    pub fn system_count(&self) -> usize {
        self.matches.len() + self.unmatched_system.len()
    }

    /// Whether every transaction on both sides found a counterpart
    pub fn is_fully_reconciled(&self) -> bool {
        self.unmatched_bank.is_empty() && self.unmatched_system.is_empty()
    }

    /// Matches of one kind
    pub fn matches_of(&self, match_type: MatchType) -> impl Iterator<Item = &MatchCandidate> {
        self.matches
            .iter()
            .filter(move |m| m.match_type == match_type)
    }

    /// Mark every match as approved
    pub fn approve_all(&mut self) {
        for candidate in &mut self.matches {
            candidate.approved = true;
        }
    }

    /// Compute counts and unmatched totals for reporting
    pub fn summary(&self) -> ReconciliationSummary {
        let bank_count = self.bank_count();
        let match_rate = if bank_count == 0 {
            0.0
        } else {
            self.matches.len() as f64 / bank_count as f64
        };

        ReconciliationSummary {
            bank_count,
            system_count: self.system_count(),
            exact_matches: self.matches_of(MatchType::Exact).count(),
            fuzzy_matches: self.matches_of(MatchType::Fuzzy).count(),
            manual_matches: self.matches_of(MatchType::Manual).count(),
            approved_matches: self.matches.iter().filter(|m| m.approved).count(),
            unmatched_bank: self.unmatched_bank.len(),
            unmatched_system: self.unmatched_system.len(),
            match_rate,
            unmatched_bank_total: self.unmatched_bank.iter().map(|t| &t.amount).sum(),
            unmatched_system_total: self.unmatched_system.iter().map(|t| &t.amount).sum(),
        }
    }
}

/// Counts and totals describing a reconciliation result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconciliationSummary {
    /// Bank transactions accounted for, matched or not
    pub bank_count: usize,
    /// System transactions accounted for, matched or not
    pub system_count: usize,
    /// Matches found by the exact phase
    pub exact_matches: usize,
    /// Matches found by the fuzzy phase
    pub fuzzy_matches: usize,
    /// Matches added during finalization
    pub manual_matches: usize,
    /// Matches marked approved, of any kind
    pub approved_matches: usize,
    /// Bank transactions left without a counterpart
    pub unmatched_bank: usize,
    /// System transactions left without a counterpart
    pub unmatched_system: usize,
    /// Share of bank transactions that were matched, in [0, 1]
    pub match_rate: f64,
    /// Sum of unmatched bank amounts
    pub unmatched_bank_total: BigDecimal,
    /// Sum of unmatched system amounts
    pub unmatched_system_total: BigDecimal,
}

/// A user-asserted pairing applied during finalization
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ManualMatch {
    /// Id of an unmatched bank transaction
    pub bank_id: String,
    /// Id of an unmatched system transaction
    pub system_id: String,
}

impl ManualMatch {
    /// Create a new manual pairing
    pub fn new(bank_id: impl Into<String>, system_id: impl Into<String>) -> Self {
        Self {
            bank_id: bank_id.into(),
            system_id: system_id.into(),
        }
    }
}

/// Errors that can occur in the reconciliation system
#[derive(Debug, thiserror::Error)]
pub enum ReconciliationError {
    #[error("Configuration error: {0}")]
    Configuration(String),
    #[error("Input validation error: {0}")]
    InputValidation(String),
    #[error("Unknown transaction: {0}")]
    UnknownTransaction(String),
    #[error("Storage error: {0}")]
    Storage(String),
}

/// Result type for reconciliation operations
pub type EngineResult<T> = Result<T, ReconciliationError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn txn(id: &str, amount: &str, reference: Option<&str>) -> Transaction {
        Transaction::new(
            id.to_string(),
            NaiveDate::from_ymd_opt(2025, 4, 10).unwrap(),
            BigDecimal::from_str(amount).unwrap(),
            String::new(),
            reference.map(str::to_string),
        )
    }

    #[test]
    fn test_blank_reference_is_absent() {
        assert_eq!(txn("t1", "10", Some("   ")).reference(), None);
        assert_eq!(txn("t1", "10", Some(" INV1 ")).reference(), Some("INV1"));
        assert_eq!(txn("t1", "10", None).reference(), None);
    }

    #[test]
    fn test_summary_counts_and_totals() {
        let mut result = ReconciliationResult::new();
        result
            .matches
            .push(MatchCandidate::exact(txn("b1", "10", None), txn("s1", "10", None)));
        result
            .matches
            .push(MatchCandidate::manual(txn("b2", "5", None), txn("s2", "5", None)));
        result.unmatched_bank.push(txn("b3", "-12.50", None));
        result.unmatched_bank.push(txn("b4", "2.25", None));
        result.unmatched_system.push(txn("s3", "7", None));

        let summary = result.summary();
        assert_eq!(summary.bank_count, 4);
        assert_eq!(summary.system_count, 3);
        assert_eq!(summary.exact_matches, 1);
        assert_eq!(summary.manual_matches, 1);
        assert_eq!(summary.fuzzy_matches, 0);
        assert_eq!(summary.approved_matches, 1);
        assert_eq!(summary.match_rate, 0.5);
        assert_eq!(
            summary.unmatched_bank_total,
            BigDecimal::from_str("-10.25").unwrap()
        );
        assert_eq!(summary.unmatched_system_total, BigDecimal::from(7));
    }

    #[test]
    fn test_amount_difference() {
        let candidate = MatchCandidate::fuzzy(txn("b5", "100.40", None), txn("s5", "100", None), 0.9);
        assert_eq!(
            candidate.amount_difference(),
            BigDecimal::from_str("0.40").unwrap()
        );
    }

    #[test]
    fn test_match_type_serializes_lowercase() {
        let json = serde_json::to_string(&MatchType::Fuzzy).unwrap();
        assert_eq!(json, "\"fuzzy\"");
    }

    #[test]
    fn test_approve_all() {
        let mut result = ReconciliationResult::new();
        result
            .matches
            .push(MatchCandidate::fuzzy(txn("b1", "10", None), txn("s1", "10", None), 0.9));
        assert!(!result.matches[0].approved);
        result.approve_all();
        assert!(result.matches[0].approved);
    }
}
