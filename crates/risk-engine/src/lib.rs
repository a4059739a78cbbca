//! Risk Engine - Clinical Risk Scoring Library
//!
//! Pure Rust implementation of the clinical calculators behind the
//! health-tracking app: lab-ratio calculators, a Gail-like breast cancer
//! risk model, a fertility-window estimator, and a multi-condition risk
//! aggregator.
//!
//! # Features
//!
//! - Typed calculator registry with runnable-set computation
//! - Ratio calculators (FT3/FT4, HOMA-IR, FAI, TG/HDL) with banded
//!   interpretations
//! - Multiplicative breast cancer risk model with age-bucket baselines
//! - Fertility window and conception probability estimation
//! - Condition score aggregation into one overall assessment
//!
//! All computation is synchronous and free of shared state; every entry
//! point that stamps a timestamp takes the clock value as a parameter, so
//! the crate runs identically on native and wasm targets.
//!
//! # Example
//!
//! ```rust
//! use risk_engine::{CalculatorRegistry, LabPanel, LabValue};
//! use chrono::Utc;
//!
//! let panel: LabPanel = [
//!     LabValue::new("Glucose", 100.0, "mg/dL"),
//!     LabValue::new("Insulin", 20.0, "uIU/mL"),
//! ]
//! .into_iter()
//! .collect();
//!
//! let registry = CalculatorRegistry::standard();
//! let results = registry.run_all(&panel, Utc::now());
//! assert_eq!(results[0].calculator_id, "homa_ir");
//! assert_eq!(results[0].value, "88.89");
//! ```

pub mod aggregator;
pub mod fertility;
pub mod gail;
pub mod ratios;
pub mod registry;

// Re-export commonly used types for convenience
pub use aggregator::{
    aggregate, aggregate_and_store, AssessmentOutcome, AssessmentStore, Condition,
    ConditionScore, InMemoryStore, OverallRiskLevel, RiskAssessment,
};
pub use fertility::{estimate_fertility, FertilityInput, FertilityResult, FertilityStatus, FertilityWindow};
pub use gail::{breast_cancer_risk, BreastCancerInput, BreastCancerRisk, Race};
pub use registry::{CalculatorDescriptor, CalculatorRegistry};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// One named analyte reading, immutable once read
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LabValue {
    /// Analyte name as supplied by the lab-results store (e.g. "FT3")
    pub name: String,
    /// Measured value
    pub value: f64,
    /// Unit the value was reported in
    pub unit: String,
}

impl LabValue {
    pub fn new(name: &str, value: f64, unit: &str) -> Self {
        LabValue {
            name: name.to_string(),
            value,
            unit: unit.to_string(),
        }
    }
}

/// A set of named analyte readings supplied by the caller.
///
/// The engine only reads the panel; it never writes to it.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct LabPanel {
    values: BTreeMap<String, LabValue>,
}

impl LabPanel {
    pub fn new() -> Self {
        LabPanel::default()
    }

    /// Add a reading, replacing any previous reading for the same analyte
    pub fn insert(&mut self, value: LabValue) {
        self.values.insert(value.name.clone(), value);
    }

    /// Look up a reading by analyte name
    pub fn get(&self, name: &str) -> Option<&LabValue> {
        self.values.get(name)
    }

    /// Whether a reading for the analyte is present
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl FromIterator<LabValue> for LabPanel {
    fn from_iter<I: IntoIterator<Item = LabValue>>(iter: I) -> Self {
        let mut panel = LabPanel::new();
        for value in iter {
            panel.insert(value);
        }
        panel
    }
}

/// Banded interpretation of a calculator value
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Interpretation {
    Normal,
    Borderline,
    Abnormal,
}

impl Interpretation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Interpretation::Normal => "normal",
            Interpretation::Borderline => "borderline",
            Interpretation::Abnormal => "abnormal",
        }
    }
}

/// Three-band risk classification used by condition scores and the
/// breast cancer model
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskCategory {
    Low,
    Moderate,
    High,
}

impl RiskCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskCategory::Low => "low",
            RiskCategory::Moderate => "moderate",
            RiskCategory::High => "high",
        }
    }
}

/// Result of one calculator invocation.
///
/// Created fresh per invocation and never mutated afterwards.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CalculatorResult {
    /// Unique per invocation: "{calculator_id}-{micros}"
    pub result_id: String,
    /// Registry id of the calculator that produced this result
    pub calculator_id: String,
    /// Display name
    pub name: String,
    /// Value formatted to the calculator's fixed precision
    pub value: String,
    /// Banded interpretation
    pub interpretation: Interpretation,
    /// Human-readable message tied to the banding
    pub message: String,
    /// When the result was computed
    pub computed_at: DateTime<Utc>,
}

impl CalculatorResult {
    pub(crate) fn new(
        calculator_id: &str,
        name: &str,
        value: String,
        interpretation: Interpretation,
        message: String,
        computed_at: DateTime<Utc>,
    ) -> Self {
        CalculatorResult {
            result_id: format!("{}-{}", calculator_id, computed_at.timestamp_micros()),
            calculator_id: calculator_id.to_string(),
            name: name.to_string(),
            value,
            interpretation,
            message,
            computed_at,
        }
    }
}

/// Errors from the calculator registry
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("unknown calculator: {0}")]
    UnknownCalculator(String),
    #[error("calculator {calculator} is missing required inputs: {missing:?}")]
    MissingInput {
        calculator: String,
        missing: Vec<String>,
    },
}

/// Error reported by a persistence gateway
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("failed to save assessment: {0}")]
pub struct StoreError(pub String);

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_panel_replaces_duplicate_analyte() {
        let mut panel = LabPanel::new();
        panel.insert(LabValue::new("FT3", 3.0, "pg/mL"));
        panel.insert(LabValue::new("FT3", 3.5, "pg/mL"));
        assert_eq!(panel.len(), 1);
        assert_eq!(panel.get("FT3").map(|v| v.value), Some(3.5));
    }

    #[test]
    fn test_result_id_embeds_calculator_and_clock() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let result = CalculatorResult::new(
            "homa_ir",
            "HOMA-IR",
            "1.00".to_string(),
            Interpretation::Normal,
            "ok".to_string(),
            now,
        );
        assert_eq!(
            result.result_id,
            format!("homa_ir-{}", now.timestamp_micros())
        );
    }

    #[test]
    fn test_missing_input_error_message() {
        let err = EngineError::MissingInput {
            calculator: "homa_ir".to_string(),
            missing: vec!["Insulin".to_string()],
        };
        assert!(err.to_string().contains("homa_ir"));
        assert!(err.to_string().contains("Insulin"));
    }
}
