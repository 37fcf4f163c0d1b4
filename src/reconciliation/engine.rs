//! Two-phase matching of bank transactions against system transactions

use bigdecimal::ToPrimitive;
use tracing::{debug, info, instrument, warn};

use crate::reconciliation::scoring::{is_exact_match, score_pair, PairScore};
use crate::reconciliation::settings::ReconciliationSettings;
use crate::traits::*;
use crate::types::*;

/// Copies of both input lists plus a claimed flag per entry.
///
/// Claimed entries are skipped rather than removed, so indices stay stable and
/// unclaimed entries keep their input order.
struct WorkingSet {
    bank: Vec<Transaction>,
    system: Vec<Transaction>,
    bank_claimed: Vec<bool>,
    system_claimed: Vec<bool>,
}

impl WorkingSet {
    fn new(bank: &[Transaction], system: &[Transaction]) -> Self {
        Self {
            bank: bank.to_vec(),
            system: system.to_vec(),
            bank_claimed: vec![false; bank.len()],
            system_claimed: vec![false; system.len()],
        }
    }

    fn open_bank(&self) -> Vec<usize> {
        (0..self.bank.len())
            .filter(|&i| !self.bank_claimed[i])
            .collect()
    }

    fn open_system(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.system.len()).filter(move |&i| !self.system_claimed[i])
    }

    /// Mark a pair as matched and return reconciled copies of both sides
    fn claim(&mut self, bank_index: usize, system_index: usize) -> (Transaction, Transaction) {
        self.bank_claimed[bank_index] = true;
        self.system_claimed[system_index] = true;

        let mut bank = self.bank[bank_index].clone();
        let mut system = self.system[system_index].clone();
        bank.reconciled = true;
        system.reconciled = true;
        (bank, system)
    }

    fn finish(self, matches: Vec<MatchCandidate>) -> ReconciliationResult {
        let unmatched_bank = self
            .bank
            .into_iter()
            .zip(self.bank_claimed)
            .filter(|(_, claimed)| !claimed)
            .map(|(t, _)| t)
            .collect();
        let unmatched_system = self
            .system
            .into_iter()
            .zip(self.system_claimed)
            .filter(|(_, claimed)| !claimed)
            .map(|(t, _)| t)
            .collect();

        ReconciliationResult {
            matches,
            unmatched_bank,
            unmatched_system,
        }
    }
}

/// Reconciliation engine matching bank statement lines to system transactions
pub struct ReconciliationEngine {
    settings: ReconciliationSettings,
    validator: Box<dyn TransactionValidator>,
    observer: Option<Box<dyn ReconciliationObserver>>,
}

impl Default for ReconciliationEngine {
    fn default() -> Self {
        Self {
            settings: ReconciliationSettings::default(),
            validator: Box::new(DefaultTransactionValidator),
            observer: None,
        }
    }
}

impl ReconciliationEngine {
    /// Create a new engine, rejecting invalid settings
    pub fn new(settings: ReconciliationSettings) -> EngineResult<Self> {
        Self::with_validator(settings, Box::new(DefaultTransactionValidator))
    }

    /// Create a new engine with a custom input validator
    pub fn with_validator(
        settings: ReconciliationSettings,
        validator: Box<dyn TransactionValidator>,
    ) -> EngineResult<Self> {
        if let Err(e) = settings.validate() {
            warn!(error = %e, "Rejected reconciliation settings");
            return Err(e);
        }

        Ok(Self {
            settings,
            validator,
            observer: None,
        })
    }

    /// Attach a hook notified after every successful run
    pub fn with_observer(mut self, observer: Box<dyn ReconciliationObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Settings this engine was built with
    pub fn settings(&self) -> &ReconciliationSettings {
        &self.settings
    }

    /// Partition both lists into matched pairs and unmatched remainders
    ///
    /// Inputs are validated up front and never mutated. Exact matching runs
    /// first, then fuzzy matching over what is left; both are greedy and
    /// process transactions in input order.
    #[instrument(skip_all, fields(bank = bank.len(), system = system.len()))]
    pub fn reconcile(
        &self,
        bank: &[Transaction],
        system: &[Transaction],
    ) -> EngineResult<ReconciliationResult> {
        for (side, transactions) in [("bank", bank), ("system", system)] {
            if let Err(e) = self.validator.validate_list(side, transactions) {
                warn!(side, error = %e, "Rejected reconciliation input");
                return Err(e);
            }
        }

        let mut working = WorkingSet::new(bank, system);
        let mut matches = Vec::new();

        if self.settings.auto_match_exact_amount {
            self.match_exact(&mut working, &mut matches);
            debug!(matched = matches.len(), "Exact matching complete");
        }

        if self.settings.enable_fuzzy_matching {
            let before = matches.len();
            self.match_fuzzy(&mut working, &mut matches);
            debug!(matched = matches.len() - before, "Fuzzy matching complete");
        }

        let result = working.finish(matches);
        let summary = result.summary();
        info!(
            exact = summary.exact_matches,
            fuzzy = summary.fuzzy_matches,
            unmatched_bank = summary.unmatched_bank,
            unmatched_system = summary.unmatched_system,
            "Reconciliation complete"
        );

        if let Some(observer) = &self.observer {
            observer.on_complete(&summary);
        }

        Ok(result)
    }

    /// Phase one: first system transaction agreeing on amount, date and reference
    fn match_exact(&self, working: &mut WorkingSet, matches: &mut Vec<MatchCandidate>) {
        for bank_index in working.open_bank() {
            let found = working.open_system().find(|&system_index| {
                is_exact_match(
                    &working.bank[bank_index],
                    &working.system[system_index],
                    &self.settings,
                )
            });

            if let Some(system_index) = found {
                let (bank, system) = working.claim(bank_index, system_index);
                matches.push(MatchCandidate::exact(bank, system));
            }
        }
    }

    /// Phase two: best weighted score strictly above the threshold, earliest wins ties
    fn match_fuzzy(&self, working: &mut WorkingSet, matches: &mut Vec<MatchCandidate>) {
        for bank_index in working.open_bank() {
            let mut best: Option<(usize, PairScore)> = None;

            for system_index in working.open_system() {
                let Some(score) = score_pair(
                    &working.bank[bank_index],
                    &working.system[system_index],
                    &self.settings,
                ) else {
                    continue;
                };

                if score.total <= self.settings.matching_threshold {
                    continue;
                }
                if best
                    .as_ref()
                    .is_none_or(|(_, current)| score.total > current.total)
                {
                    best = Some((system_index, score));
                }
            }

            if let Some((system_index, score)) = best {
                let (bank, system) = working.claim(bank_index, system_index);
                debug!(
                    bank_id = %bank.id,
                    system_id = %system.id,
                    score = %score.total,
                    "Fuzzy match accepted"
                );
                let confidence = score.total.to_f64().unwrap_or(0.0).clamp(0.0, 1.0);
                matches.push(MatchCandidate::fuzzy(bank, system, confidence));
            }
        }
    }
}

/// Reconcile two lists with the given settings
pub fn reconcile(
    bank: &[Transaction],
    system: &[Transaction],
    settings: &ReconciliationSettings,
) -> EngineResult<ReconciliationResult> {
    ReconciliationEngine::new(settings.clone())?.reconcile(bank, system)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bigdecimal::BigDecimal;
    use chrono::NaiveDate;
    use std::str::FromStr;
    use std::sync::{Arc, Mutex};

    fn txn(id: &str, day: u32, amount: &str, description: &str, reference: Option<&str>) -> Transaction {
        Transaction::new(
            id.to_string(),
            NaiveDate::from_ymd_opt(2025, 4, day).unwrap(),
            BigDecimal::from_str(amount).unwrap(),
            description.to_string(),
            reference.map(str::to_string),
        )
    }

    #[test]
    fn test_exact_phase_takes_first_candidate() {
        let engine = ReconciliationEngine::default();
        let bank = vec![txn("b1", 10, "50.00", "Card", None)];
        let system = vec![
            txn("s1", 20, "50.00", "Card", None),
            txn("s2", 11, "50.00", "Card", None),
            txn("s3", 10, "50.00", "Card", None),
        ];

        let result = engine.reconcile(&bank, &system).unwrap();
        assert_eq!(result.matches.len(), 1);
        assert_eq!(result.matches[0].system_transaction.id, "s2");
        assert_eq!(result.matches[0].match_type, MatchType::Exact);
        assert_eq!(result.unmatched_system.len(), 2);
        assert_eq!(result.unmatched_system[0].id, "s1");
        assert_eq!(result.unmatched_system[1].id, "s3");
    }

    #[test]
    fn test_exact_phase_requires_matching_references() {
        let settings = ReconciliationSettings {
            enable_fuzzy_matching: false,
            ..Default::default()
        };
        let engine = ReconciliationEngine::new(settings).unwrap();
        let bank = vec![txn("b1", 10, "50.00", "Card", Some("REF1"))];
        let system = vec![
            txn("s1", 10, "50.00", "Card", None),
            txn("s2", 10, "50.00", "Card", Some("ref1")),
        ];

        let result = engine.reconcile(&bank, &system).unwrap();
        assert_eq!(result.matches[0].system_transaction.id, "s2");
    }

    #[test]
    fn test_matched_copies_are_reconciled() {
        let engine = ReconciliationEngine::default();
        let bank = vec![txn("b1", 10, "50.00", "Card", None)];
        let system = vec![txn("s1", 10, "50.00", "Card", None)];

        let result = engine.reconcile(&bank, &system).unwrap();
        assert!(result.matches[0].bank_transaction.reconciled);
        assert!(result.matches[0].system_transaction.reconciled);
        assert!(!result.matches[0].approved);
        assert!(!bank[0].reconciled);
        assert!(!system[0].reconciled);
    }

    #[test]
    fn test_fuzzy_phase_picks_best_score() {
        let settings = ReconciliationSettings {
            auto_match_exact_amount: false,
            ..Default::default()
        };
        let engine = ReconciliationEngine::new(settings).unwrap();
        let bank = vec![txn("b1", 10, "80.00", "Metro wholesale supplies", None)];
        let system = vec![
            txn("s1", 12, "80.00", "Metro wholesale supplies", None),
            txn("s2", 10, "80.00", "Metro wholesale supplies", None),
        ];

        let result = engine.reconcile(&bank, &system).unwrap();
        assert_eq!(result.matches.len(), 1);
        assert_eq!(result.matches[0].system_transaction.id, "s2");
        assert_eq!(result.matches[0].match_type, MatchType::Fuzzy);
        assert_eq!(result.matches[0].confidence, 1.0);
    }

    #[test]
    fn test_fuzzy_tie_goes_to_earliest_system_transaction() {
        let settings = ReconciliationSettings {
            auto_match_exact_amount: false,
            ..Default::default()
        };
        let engine = ReconciliationEngine::new(settings).unwrap();
        let bank = vec![txn("b1", 10, "80.00", "Fresh fish", None)];
        let system = vec![
            txn("s1", 11, "80.00", "Fresh fish", None),
            txn("s2", 9, "80.00", "Fresh fish", None),
        ];

        let result = engine.reconcile(&bank, &system).unwrap();
        assert_eq!(result.matches[0].system_transaction.id, "s1");
    }

    #[test]
    fn test_fuzzy_is_greedy_without_backtracking() {
        let settings = ReconciliationSettings {
            auto_match_exact_amount: false,
            ..Default::default()
        };
        let engine = ReconciliationEngine::new(settings).unwrap();
        // b1 claims s1 even though b2 would have matched it perfectly.
        let bank = vec![
            txn("b1", 10, "80.00", "Fresh fish market", None),
            txn("b2", 10, "80.00", "Fresh fish", None),
        ];
        let system = vec![txn("s1", 10, "80.00", "Fresh fish", None)];

        let result = engine.reconcile(&bank, &system).unwrap();
        assert_eq!(result.matches.len(), 1);
        assert_eq!(result.matches[0].bank_transaction.id, "b1");
        assert_eq!(result.unmatched_bank[0].id, "b2");
    }

    #[test]
    fn test_invalid_settings_rejected_before_matching() {
        let settings = ReconciliationSettings {
            date_tolerance: -1,
            ..Default::default()
        };
        assert!(matches!(
            ReconciliationEngine::new(settings),
            Err(ReconciliationError::Configuration(_))
        ));
    }

    #[test]
    fn test_duplicate_input_ids_rejected() {
        let engine = ReconciliationEngine::default();
        let bank = vec![
            txn("b1", 10, "1", "", None),
            txn("b1", 11, "2", "", None),
        ];
        assert!(matches!(
            engine.reconcile(&bank, &[]),
            Err(ReconciliationError::InputValidation(_))
        ));
    }

    struct Recorder(Arc<Mutex<Vec<ReconciliationSummary>>>);

    impl ReconciliationObserver for Recorder {
        fn on_complete(&self, summary: &ReconciliationSummary) {
            self.0.lock().unwrap().push(summary.clone());
        }
    }

    #[test]
    fn test_observer_notified_once_per_run() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let engine = ReconciliationEngine::default().with_observer(Box::new(Recorder(seen.clone())));
        let bank = vec![txn("b1", 10, "50.00", "Card", None)];
        let system = vec![txn("s1", 10, "50.00", "Card", None)];

        engine.reconcile(&bank, &system).unwrap();
        engine.reconcile(&bank, &[]).unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].exact_matches, 1);
        assert_eq!(seen[1].unmatched_bank, 1);
    }
}
