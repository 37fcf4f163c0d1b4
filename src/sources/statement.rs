//! Normalization of parsed bank statement rows

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::types::*;
use crate::utils::validation::validate_unique_ids;

/// A bank statement row as produced by a file parser
///
/// Banks export either a single signed amount or separate debit and credit
/// columns, so both shapes are accepted. Any field may be missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatementLine {
    pub id: String,
    pub date: Option<NaiveDate>,
    /// Signed amount, credit positive
    pub amount: Option<BigDecimal>,
    /// Money out, sign ignored
    pub debit: Option<BigDecimal>,
    /// Money in, sign ignored
    pub credit: Option<BigDecimal>,
    #[serde(default)]
    pub description: String,
    pub reference: Option<String>,
}

impl StatementLine {
    /// Start a new line with the given ID
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    pub fn amount(mut self, amount: BigDecimal) -> Self {
        self.amount = Some(amount);
        self
    }

    pub fn debit(mut self, debit: BigDecimal) -> Self {
        self.debit = Some(debit);
        self
    }

    pub fn credit(mut self, credit: BigDecimal) -> Self {
        self.credit = Some(credit);
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }

    /// Signed amount from either the amount column or the debit/credit pair
    pub fn signed_amount(&self) -> Option<BigDecimal> {
        if let Some(amount) = &self.amount {
            return Some(amount.clone());
        }

        match (&self.credit, &self.debit) {
            (None, None) => None,
            (credit, debit) => {
                let zero = BigDecimal::from(0);
                let credit = credit.as_ref().map(BigDecimal::abs).unwrap_or(zero.clone());
                let debit = debit.as_ref().map(BigDecimal::abs).unwrap_or(zero);
                Some(credit - debit)
            }
        }
    }

    /// Convert into a transaction, rejecting rows without a date or amount
    pub fn into_transaction(self) -> EngineResult<Transaction> {
        let date = self.date.ok_or_else(|| {
            ReconciliationError::InputValidation(format!(
                "Statement line '{}' has no date",
                self.id
            ))
        })?;
        let amount = self.signed_amount().ok_or_else(|| {
            ReconciliationError::InputValidation(format!(
                "Statement line '{}' has no amount",
                self.id
            ))
        })?;

        Ok(Transaction::new(
            self.id,
            date,
            amount,
            self.description.trim().to_string(),
            self.reference
                .map(|r| r.trim().to_string())
                .filter(|r| !r.is_empty()),
        ))
    }
}

/// Convert a whole statement, failing on the first malformed line
pub fn import_statement(lines: Vec<StatementLine>) -> EngineResult<Vec<Transaction>> {
    let transactions = lines
        .into_iter()
        .map(StatementLine::into_transaction)
        .collect::<EngineResult<Vec<_>>>()?;

    validate_unique_ids("bank", &transactions)?;
    tracing::debug!(lines = transactions.len(), "Statement imported");
    Ok(transactions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn decimal(value: &str) -> BigDecimal {
        BigDecimal::from_str(value).unwrap()
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 4, 10).unwrap()
    }

    #[test]
    fn test_signed_amount_column() {
        let txn = StatementLine::new("l1")
            .date(date())
            .amount(decimal("-12.40"))
            .description("  Boulangerie  ")
            .reference(" ")
            .into_transaction()
            .unwrap();

        assert_eq!(txn.amount, decimal("-12.40"));
        assert_eq!(txn.description, "Boulangerie");
        assert_eq!(txn.reference, None);
        assert!(!txn.reconciled);
    }

    #[test]
    fn test_debit_credit_columns() {
        let debit = StatementLine::new("l1").debit(decimal("30.00"));
        assert_eq!(debit.signed_amount(), Some(decimal("-30.00")));

        let credit = StatementLine::new("l2").credit(decimal("45.10"));
        assert_eq!(credit.signed_amount(), Some(decimal("45.10")));

        let negative_debit = StatementLine::new("l3").debit(decimal("-5"));
        assert_eq!(negative_debit.signed_amount(), Some(decimal("-5")));
    }

    #[test]
    fn test_missing_date_or_amount_rejected() {
        let no_date = StatementLine::new("l1").amount(decimal("1"));
        assert!(matches!(
            no_date.into_transaction(),
            Err(ReconciliationError::InputValidation(_))
        ));

        let no_amount = StatementLine::new("l2").date(date());
        assert!(matches!(
            no_amount.into_transaction(),
            Err(ReconciliationError::InputValidation(_))
        ));
    }

    #[test]
    fn test_import_rejects_whole_batch() {
        let lines = vec![
            StatementLine::new("l1").date(date()).amount(decimal("1")),
            StatementLine::new("l2").amount(decimal("2")),
        ];
        assert!(import_statement(lines).is_err());

        let duplicated = vec![
            StatementLine::new("l1").date(date()).amount(decimal("1")),
            StatementLine::new("l1").date(date()).amount(decimal("2")),
        ];
        assert!(import_statement(duplicated).is_err());
    }

    #[test]
    fn test_deserialize_line_from_json() {
        let line: StatementLine = serde_json::from_str(
            r#"{"id": "l9", "date": "2025-04-10", "credit": "99.90", "reference": "VIR-1"}"#,
        )
        .unwrap();
        let txn = line.into_transaction().unwrap();
        assert_eq!(txn.amount, decimal("99.90"));
        assert_eq!(txn.reference.as_deref(), Some("VIR-1"));
    }
}
