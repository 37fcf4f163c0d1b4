//! Applying manual pairings and approvals to a reconciliation result

use tracing::{info, instrument};

use crate::types::*;

/// Move user-asserted pairs out of the unmatched lists and optionally approve everything
///
/// Every manual pair must name a transaction currently in `unmatched_bank` and
/// one in `unmatched_system`, and no transaction may be named twice. If any
/// pair fails these checks nothing is applied. Manual matches are appended
/// after the existing matches in the order given.
#[instrument(skip_all, fields(manual = manual_matches.len(), auto_approve = auto_approve))]
pub fn finalize(
    result: ReconciliationResult,
    manual_matches: &[ManualMatch],
    auto_approve: bool,
) -> EngineResult<ReconciliationResult> {
    let ReconciliationResult {
        mut matches,
        unmatched_bank,
        unmatched_system,
    } = result;

    let mut bank_slots: Vec<Option<Transaction>> = unmatched_bank.into_iter().map(Some).collect();
    let mut system_slots: Vec<Option<Transaction>> =
        unmatched_system.into_iter().map(Some).collect();

    let mut pairs: Vec<(usize, usize)> = Vec::with_capacity(manual_matches.len());
    for manual in manual_matches {
        let bank_index = locate(&bank_slots, &manual.bank_id, "bank")?;
        let system_index = locate(&system_slots, &manual.system_id, "system")?;
        if pairs
            .iter()
            .any(|&(b, s)| b == bank_index || s == system_index)
        {
            return Err(ReconciliationError::InputValidation(format!(
                "Manual match {} <-> {} reuses a transaction already paired",
                manual.bank_id, manual.system_id
            )));
        }
        pairs.push((bank_index, system_index));
    }

    if auto_approve {
        for candidate in &mut matches {
            candidate.approved = true;
        }
    }

    for (bank_index, system_index) in pairs {
        if let (Some(mut bank), Some(mut system)) =
            (bank_slots[bank_index].take(), system_slots[system_index].take())
        {
            bank.reconciled = true;
            system.reconciled = true;
            matches.push(MatchCandidate::manual(bank, system));
        }
    }

    let finalized = ReconciliationResult {
        matches,
        unmatched_bank: bank_slots.into_iter().flatten().collect(),
        unmatched_system: system_slots.into_iter().flatten().collect(),
    };

    info!(
        matches = finalized.matches.len(),
        unmatched_bank = finalized.unmatched_bank.len(),
        unmatched_system = finalized.unmatched_system.len(),
        "Reconciliation finalized"
    );
    Ok(finalized)
}

fn locate(slots: &[Option<Transaction>], id: &str, side: &str) -> EngineResult<usize> {
    slots
        .iter()
        .position(|slot| slot.as_ref().is_some_and(|t| t.id == id))
        .ok_or_else(|| {
            ReconciliationError::UnknownTransaction(format!(
                "{} transaction '{}' is not among the unmatched transactions",
                side, id
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use bigdecimal::BigDecimal;
    use chrono::NaiveDate;

    fn txn(id: &str, amount: i64) -> Transaction {
        Transaction::new(
            id.to_string(),
            NaiveDate::from_ymd_opt(2025, 4, 10).unwrap(),
            BigDecimal::from(amount),
            String::new(),
            None,
        )
    }

    fn sample() -> ReconciliationResult {
        ReconciliationResult {
            matches: vec![MatchCandidate::fuzzy(txn("b1", 10), txn("s1", 10), 0.9)],
            unmatched_bank: vec![txn("b2", 20), txn("b3", 30)],
            unmatched_system: vec![txn("s2", 21), txn("s3", 30)],
        }
    }

    #[test]
    fn test_manual_pairs_are_moved_and_approved() {
        let result = finalize(sample(), &[ManualMatch::new("b3", "s2")], false).unwrap();

        assert_eq!(result.matches.len(), 2);
        let manual = &result.matches[1];
        assert_eq!(manual.match_type, MatchType::Manual);
        assert_eq!(manual.confidence, 1.0);
        assert!(manual.approved);
        assert!(manual.bank_transaction.reconciled);
        assert_eq!(manual.bank_transaction.id, "b3");
        assert_eq!(manual.system_transaction.id, "s2");

        assert!(!result.matches[0].approved);
        assert_eq!(result.unmatched_bank, vec![txn("b2", 20)]);
        assert_eq!(result.unmatched_system, vec![txn("s3", 30)]);
    }

    #[test]
    fn test_auto_approve_flips_existing_matches() {
        let result = finalize(sample(), &[], true).unwrap();
        assert!(result.matches.iter().all(|m| m.approved));
        assert_eq!(result.unmatched_bank.len(), 2);
    }

    #[test]
    fn test_unknown_id_fails() {
        let err = finalize(sample(), &[ManualMatch::new("b1", "s2")], false).unwrap_err();
        assert!(matches!(err, ReconciliationError::UnknownTransaction(_)));

        let err = finalize(sample(), &[ManualMatch::new("b2", "nope")], true).unwrap_err();
        assert!(matches!(err, ReconciliationError::UnknownTransaction(_)));
    }

    #[test]
    fn test_transaction_cannot_be_paired_twice() {
        let err = finalize(
            sample(),
            &[ManualMatch::new("b2", "s2"), ManualMatch::new("b2", "s3")],
            false,
        )
        .unwrap_err();
        assert!(matches!(err, ReconciliationError::InputValidation(_)));
    }
}
