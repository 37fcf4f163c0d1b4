//! Traits for storage abstraction and extensibility

use async_trait::async_trait;
use uuid::Uuid;

use crate::types::*;
use crate::utils::validation::{validate_transaction_id, validate_unique_ids};

/// Storage abstraction for finalized reconciliation results
///
/// Results are persisted as opaque JSON documents keyed by statement id and
/// archive timestamp, so any document or relational store can back this.
#[async_trait]
pub trait ArchiveStore: Send + Sync {
    /// Persist a result for a statement and return the archive record
    async fn save_reconciliation(
        &mut self,
        statement_id: &str,
        result: &ReconciliationResult,
    ) -> EngineResult<ArchivedReconciliation>;

    /// Get an archive record by ID
    async fn get_archive(&self, archive_id: &Uuid) -> EngineResult<Option<ArchivedReconciliation>>;

    /// List archive records for a statement, newest first
    async fn list_for_statement(
        &self,
        statement_id: &str,
    ) -> EngineResult<Vec<ArchivedReconciliation>>;

    /// Delete an archive record
    async fn delete_archive(&mut self, archive_id: &Uuid) -> EngineResult<()>;
}

/// A persisted reconciliation result
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ArchivedReconciliation {
    /// Unique identifier of the archive record
    pub id: Uuid,
    /// Statement the result belongs to
    pub statement_id: String,
    /// When the result was archived
    pub archived_at: chrono::DateTime<chrono::Utc>,
    /// The result, serialized as JSON
    pub payload: serde_json::Value,
}

impl ArchivedReconciliation {
    /// Serialize a result into a new archive record
    pub fn new(statement_id: &str, result: &ReconciliationResult) -> EngineResult<Self> {
        let payload = serde_json::to_value(result)
            .map_err(|e| ReconciliationError::Storage(e.to_string()))?;

        Ok(Self {
            id: Uuid::new_v4(),
            statement_id: statement_id.to_string(),
            archived_at: chrono::Utc::now(),
            payload,
        })
    }

    /// Decode the stored payload back into a result
    pub fn result(&self) -> EngineResult<ReconciliationResult> {
        serde_json::from_value(self.payload.clone())
            .map_err(|e| ReconciliationError::Storage(e.to_string()))
    }
}

/// Trait for implementing custom input validation rules
pub trait TransactionValidator: Send + Sync {
    /// Validate a single transaction before it enters a working list
    fn validate_transaction(&self, transaction: &Transaction) -> EngineResult<()>;

    /// Validate one side's list as a whole (e.g. id uniqueness)
    fn validate_list(&self, side: &str, transactions: &[Transaction]) -> EngineResult<()>;
}

/// Default validator: ids must be non-blank and unique within a side
pub struct DefaultTransactionValidator;

impl TransactionValidator for DefaultTransactionValidator {
    fn validate_transaction(&self, transaction: &Transaction) -> EngineResult<()> {
        validate_transaction_id(&transaction.id)
    }

    fn validate_list(&self, side: &str, transactions: &[Transaction]) -> EngineResult<()> {
        for transaction in transactions {
            self.validate_transaction(transaction)?;
        }
        validate_unique_ids(side, transactions)
    }
}

/// Notification hook invoked after a successful reconciliation run
pub trait ReconciliationObserver: Send + Sync {
    /// Called once per run with the summary of the produced result
    fn on_complete(&self, summary: &ReconciliationSummary);
}
