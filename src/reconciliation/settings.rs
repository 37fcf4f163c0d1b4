//! Matching tolerances and phase switches

use bigdecimal::BigDecimal;
use serde::{Deserialize, Deserializer, Serialize};
use std::str::FromStr;

use crate::types::*;

/// Settings controlling a reconciliation run
///
/// Field names serialize in camelCase (`amountTolerance`, `dateTolerance`,
/// `enableFuzzyMatching`, `autoMatchExactAmount`, `matchingThreshold`) and
/// every field falls back to its default when absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReconciliationSettings {
    /// Fraction of the bank amount two amounts may differ by and still be equal
    #[serde(deserialize_with = "decimal_setting")]
    pub amount_tolerance: BigDecimal,
    /// Maximum distance in days between the two sides of any match
    pub date_tolerance: i64,
    /// Run the weighted-score phase after exact matching
    pub enable_fuzzy_matching: bool,
    /// Run the exact amount/date/reference phase
    pub auto_match_exact_amount: bool,
    /// Fuzzy scores must be strictly greater than this to be accepted
    #[serde(deserialize_with = "decimal_setting")]
    pub matching_threshold: BigDecimal,
}

impl Default for ReconciliationSettings {
    fn default() -> Self {
        Self {
            amount_tolerance: BigDecimal::from(1) / BigDecimal::from(100),
            date_tolerance: 3,
            enable_fuzzy_matching: true,
            auto_match_exact_amount: true,
            matching_threshold: BigDecimal::from(85) / BigDecimal::from(100),
        }
    }
}

impl ReconciliationSettings {
    /// Parse settings from TOML and validate them
    pub fn from_toml_str(source: &str) -> EngineResult<Self> {
        let settings: Self = toml::from_str(source)
            .map_err(|e| ReconciliationError::Configuration(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Check that every value is within its accepted range
    pub fn validate(&self) -> EngineResult<()> {
        let zero = BigDecimal::from(0);
        let one = BigDecimal::from(1);

        if self.amount_tolerance < zero {
            return Err(ReconciliationError::Configuration(format!(
                "amountTolerance must not be negative, got {}",
                self.amount_tolerance
            )));
        }

        if self.date_tolerance < 0 {
            return Err(ReconciliationError::Configuration(format!(
                "dateTolerance must not be negative, got {}",
                self.date_tolerance
            )));
        }

        if self.matching_threshold < zero || self.matching_threshold > one {
            return Err(ReconciliationError::Configuration(format!(
                "matchingThreshold must be within [0, 1], got {}",
                self.matching_threshold
            )));
        }

        Ok(())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum DecimalSetting {
    Integer(i64),
    Float(f64),
    Text(String),
}

// Floats go through their shortest decimal text so 0.85 stays exactly 0.85.
fn decimal_setting<'de, D>(deserializer: D) -> Result<BigDecimal, D::Error>
where
    D: Deserializer<'de>,
{
    let text = match DecimalSetting::deserialize(deserializer)? {
        DecimalSetting::Integer(value) => value.to_string(),
        DecimalSetting::Float(value) => value.to_string(),
        DecimalSetting::Text(value) => value,
    };
    BigDecimal::from_str(text.trim()).map_err(serde::de::Error::custom)
}
