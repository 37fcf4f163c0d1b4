//! In-memory archive store implementation for testing

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use uuid::Uuid;

use crate::traits::*;
use crate::types::*;

fn poisoned<T>(_: T) -> ReconciliationError {
    ReconciliationError::Storage("archive lock poisoned".to_string())
}

/// In-memory archive store for testing and development
#[derive(Debug, Clone)]
pub struct MemoryArchiveStore {
    archives: Arc<RwLock<HashMap<Uuid, ArchivedReconciliation>>>,
}

impl MemoryArchiveStore {
    /// Create a new memory archive store
    pub fn new() -> Self {
        Self {
            archives: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Number of stored archive records
    pub fn len(&self) -> usize {
        self.archives.read().map(|a| a.len()).unwrap_or(0)
    }

    /// Whether the store holds no archive records
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Clear all data (useful for testing)
    pub fn clear(&self) -> EngineResult<()> {
        self.archives.write().map_err(poisoned)?.clear();
        Ok(())
    }
}

impl Default for MemoryArchiveStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ArchiveStore for MemoryArchiveStore {
    async fn save_reconciliation(
        &mut self,
        statement_id: &str,
        result: &ReconciliationResult,
    ) -> EngineResult<ArchivedReconciliation> {
        if statement_id.trim().is_empty() {
            return Err(ReconciliationError::Storage(
                "Statement ID cannot be empty".to_string(),
            ));
        }

        let archive = ArchivedReconciliation::new(statement_id, result)?;
        self.archives
            .write()
            .map_err(poisoned)?
            .insert(archive.id, archive.clone());

        tracing::info!(
            archive_id = %archive.id,
            statement_id = %statement_id,
            matches = result.matches.len(),
            "Reconciliation archived"
        );
        Ok(archive)
    }

    async fn get_archive(&self, archive_id: &Uuid) -> EngineResult<Option<ArchivedReconciliation>> {
        Ok(self.archives.read().map_err(poisoned)?.get(archive_id).cloned())
    }

    async fn list_for_statement(
        &self,
        statement_id: &str,
    ) -> EngineResult<Vec<ArchivedReconciliation>> {
        let archives = self.archives.read().map_err(poisoned)?;
        let mut filtered: Vec<ArchivedReconciliation> = archives
            .values()
            .filter(|a| a.statement_id == statement_id)
            .cloned()
            .collect();
        filtered.sort_by(|a, b| {
            b.archived_at
                .cmp(&a.archived_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(filtered)
    }

    async fn delete_archive(&mut self, archive_id: &Uuid) -> EngineResult<()> {
        if self
            .archives
            .write()
            .map_err(poisoned)?
            .remove(archive_id)
            .is_some()
        {
            tracing::debug!(archive_id = %archive_id, "Archive deleted");
            Ok(())
        } else {
            Err(ReconciliationError::Storage(format!(
                "Archive not found: {}",
                archive_id
            )))
        }
    }
}
