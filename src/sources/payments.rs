//! System-side transactions built from internal payment records

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::types::*;
use crate::utils::validation::validate_unique_ids;

/// How a payment was settled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Card,
    Transfer,
    Check,
    Cash,
    Other,
}

impl PaymentMethod {
    /// Only electronic methods ever appear on a bank statement
    pub fn is_electronic(&self) -> bool {
        matches!(
            self,
            PaymentMethod::Card | PaymentMethod::Transfer | PaymentMethod::Check
        )
    }
}

/// Whether money came in or went out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentDirection {
    /// Receipts, e.g. card takings
    Incoming,
    /// Outgoing transfers and checks to suppliers
    Outgoing,
}

/// An internal payment record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentRecord {
    pub id: String,
    pub date: NaiveDate,
    /// Amount as recorded; only its magnitude is used
    pub amount: BigDecimal,
    pub method: PaymentMethod,
    pub direction: PaymentDirection,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub reference: Option<String>,
}

impl PaymentRecord {
    /// Create a new payment record
    pub fn new(
        id: String,
        date: NaiveDate,
        amount: BigDecimal,
        method: PaymentMethod,
        direction: PaymentDirection,
        description: String,
    ) -> Self {
        Self {
            id,
            date,
            amount,
            method,
            direction,
            description,
            reference: None,
        }
    }

    /// Amount signed by direction: receipts positive, payments out negative
    pub fn signed_amount(&self) -> BigDecimal {
        match self.direction {
            PaymentDirection::Incoming => self.amount.abs(),
            PaymentDirection::Outgoing => -self.amount.abs(),
        }
    }

    /// The system transaction for this payment, if it can appear on a statement
    pub fn to_transaction(&self) -> Option<Transaction> {
        if !self.method.is_electronic() {
            return None;
        }

        Some(Transaction::new(
            self.id.clone(),
            self.date,
            self.signed_amount(),
            self.description.clone(),
            self.reference.clone(),
        ))
    }
}

/// Build the system side of a reconciliation from payment records
///
/// Cash and other non-electronic payments are skipped. Record order is kept.
pub fn system_transactions(records: &[PaymentRecord]) -> EngineResult<Vec<Transaction>> {
    let transactions: Vec<Transaction> = records
        .iter()
        .filter_map(PaymentRecord::to_transaction)
        .collect();

    validate_unique_ids("system", &transactions)?;
    tracing::debug!(
        kept = transactions.len(),
        skipped = records.len() - transactions.len(),
        "System transactions collected"
    );
    Ok(transactions)
}
