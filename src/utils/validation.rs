//! Validation utilities

use bigdecimal::BigDecimal;
use std::collections::HashSet;

use crate::traits::*;
use crate::types::*;

/// Validate that a transaction ID is usable as a key
pub fn validate_transaction_id(id: &str) -> EngineResult<()> {
    if id.trim().is_empty() {
        return Err(ReconciliationError::InputValidation(
            "Transaction ID cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validate that a transaction ID fits in 100 characters
pub fn validate_id_length(id: &str) -> EngineResult<()> {
    if id.chars().count() > 100 {
        return Err(ReconciliationError::InputValidation(format!(
            "Transaction ID '{}' exceeds 100 characters",
            id
        )));
    }

    Ok(())
}

/// Validate that no two transactions on one side share an ID
pub fn validate_unique_ids(side: &str, transactions: &[Transaction]) -> EngineResult<()> {
    let mut seen = HashSet::with_capacity(transactions.len());
    for transaction in transactions {
        if !seen.insert(transaction.id.as_str()) {
            return Err(ReconciliationError::InputValidation(format!(
                "Duplicate {} transaction ID '{}'",
                side, transaction.id
            )));
        }
    }

    Ok(())
}

/// Validate that an amount is not zero
pub fn validate_non_zero_amount(id: &str, amount: &BigDecimal) -> EngineResult<()> {
    if *amount == BigDecimal::from(0) {
        Err(ReconciliationError::InputValidation(format!(
            "Transaction '{}' has a zero amount",
            id
        )))
    } else {
        Ok(())
    }
}

/// Validate that a description is within length limits
pub fn validate_description(id: &str, description: &str) -> EngineResult<()> {
    if description.len() > 500 {
        return Err(ReconciliationError::InputValidation(format!(
            "Description of transaction '{}' exceeds 500 characters",
            id
        )));
    }

    Ok(())
}

/// Stricter validator that adds length and zero-amount checks
pub struct EnhancedTransactionValidator;

impl TransactionValidator for EnhancedTransactionValidator {
    fn validate_transaction(&self, transaction: &Transaction) -> EngineResult<()> {
        validate_transaction_id(&transaction.id)?;
        validate_id_length(&transaction.id)?;
        validate_non_zero_amount(&transaction.id, &transaction.amount)?;
        validate_description(&transaction.id, &transaction.description)?;
        Ok(())
    }

    fn validate_list(&self, side: &str, transactions: &[Transaction]) -> EngineResult<()> {
        for transaction in transactions {
            self.validate_transaction(transaction)?;
        }
        validate_unique_ids(side, transactions)
    }
}
