//! Amount, description and date similarity used by both matching phases
//!
//! All arithmetic is exact decimal so tolerance and threshold boundaries
//! compare predictably.

use bigdecimal::BigDecimal;
use std::collections::BTreeSet;

use crate::reconciliation::settings::ReconciliationSettings;
use crate::types::*;

fn tenths(n: i64) -> BigDecimal {
    BigDecimal::from(n) / BigDecimal::from(10)
}

/// Largest difference allowed between two amounts, relative to `reference`
pub fn allowed_delta(reference: &BigDecimal, tolerance: &BigDecimal) -> BigDecimal {
    reference.abs() * tolerance
}

/// Whether `other` is within `tolerance` (a fraction of `reference`) of `reference`
pub fn amounts_match(reference: &BigDecimal, other: &BigDecimal, tolerance: &BigDecimal) -> bool {
    (reference - other).abs() <= allowed_delta(reference, tolerance)
}

/// References agree when both are absent, or both present and equal ignoring case
pub fn references_match(bank: &Transaction, system: &Transaction) -> bool {
    match (bank.reference(), system.reference()) {
        (None, None) => true,
        (Some(a), Some(b)) => a.to_lowercase() == b.to_lowercase(),
        _ => false,
    }
}

/// Amount similarity: 1.0 within tolerance, 0.8 within twice, 0.5 within five times
pub fn amount_score(bank: &BigDecimal, system: &BigDecimal, tolerance: &BigDecimal) -> BigDecimal {
    let difference = (bank - system).abs();
    let allowed = allowed_delta(bank, tolerance);

    if difference <= allowed {
        BigDecimal::from(1)
    } else if difference <= &allowed * BigDecimal::from(2) {
        tenths(8)
    } else if difference <= &allowed * BigDecimal::from(5) {
        tenths(5)
    } else {
        BigDecimal::from(0)
    }
}

/// Lowercase, drop punctuation and collapse whitespace
pub fn normalize_description(description: &str) -> String {
    description
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Description similarity in [0, 1]
///
/// Equal normalized text scores 1.0 and containment 0.8. Otherwise the score
/// is the number of shared tokens over the size of the token union.
pub fn description_score(a: &str, b: &str) -> BigDecimal {
    let a = normalize_description(a);
    let b = normalize_description(b);

    if a.is_empty() || b.is_empty() {
        return BigDecimal::from(0);
    }
    if a == b {
        return BigDecimal::from(1);
    }
    if a.contains(b.as_str()) || b.contains(a.as_str()) {
        return tenths(8);
    }

    let tokens_a: BTreeSet<&str> = a.split(' ').collect();
    let tokens_b: BTreeSet<&str> = b.split(' ').collect();
    let shared = tokens_a.intersection(&tokens_b).count();
    let union = tokens_a.union(&tokens_b).count();

    BigDecimal::from(shared as i64) / BigDecimal::from(union as i64)
}

/// Date similarity, or `None` when the distance exceeds the tolerance
///
/// Degrades linearly from 1.0 on the same day to 0.5 at the tolerance.
pub fn date_score(day_distance: i64, date_tolerance: i64) -> Option<BigDecimal> {
    if day_distance > date_tolerance {
        return None;
    }
    if date_tolerance == 0 {
        return Some(BigDecimal::from(1));
    }

    let penalty =
        BigDecimal::from(day_distance) / (BigDecimal::from(date_tolerance) * BigDecimal::from(2));
    Some(BigDecimal::from(1) - penalty)
}

/// Component and weighted scores for one bank/system pair
#[derive(Debug, Clone, PartialEq)]
pub struct PairScore {
    pub amount: BigDecimal,
    pub description: BigDecimal,
    pub date: BigDecimal,
    /// `0.5 * amount + 0.3 * description + 0.2 * date`
    pub total: BigDecimal,
}

/// Score a pair for fuzzy matching; `None` if the dates are too far apart
pub fn score_pair(
    bank: &Transaction,
    system: &Transaction,
    settings: &ReconciliationSettings,
) -> Option<PairScore> {
    let date = date_score(bank.day_distance(system), settings.date_tolerance)?;
    let amount = amount_score(&bank.amount, &system.amount, &settings.amount_tolerance);
    let description = description_score(&bank.description, &system.description);

    let total = tenths(5) * &amount + tenths(3) * &description + tenths(2) * &date;

    Some(PairScore {
        amount,
        description,
        date,
        total,
    })
}

/// Whether a pair qualifies for phase-one exact matching
pub fn is_exact_match(
    bank: &Transaction,
    system: &Transaction,
    settings: &ReconciliationSettings,
) -> bool {
    amounts_match(&bank.amount, &system.amount, &settings.amount_tolerance)
        && bank.day_distance(system) <= settings.date_tolerance
        && references_match(bank, system)
}
