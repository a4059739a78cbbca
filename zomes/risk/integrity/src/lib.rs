//! Risk Scoring Integrity Zome
//!
//! Defines entry types for the risk-scoring engine's durable records:
//! - Overall risk assessments (one entry per assessment run, never updated)
//! - Individual calculator results saved for patient history
//!
//! Validation re-derives the overall level band from the stored percentage
//! so a record can never carry a level inconsistent with its own number.

use hdi::prelude::*;
use risk_engine::OverallRiskLevel;

// ============================================================================
// Entry Types
// ============================================================================

/// A persisted overall risk assessment.
///
/// Created exactly once per assessment run; re-assessment creates a new
/// entry rather than updating an existing one.
#[hdk_entry_helper]
#[derive(Clone, PartialEq)]
pub struct RiskAssessment {
    /// Patient this assessment belongs to
    pub patient_hash: ActionHash,
    /// Kind of assessment run (e.g. "comprehensive", "metabolic")
    pub assessment_type: String,
    /// JSON snapshot of the inputs the assessment was computed from
    pub input_data: String,
    /// JSON of the engine's full assessment output
    pub results_data: String,
    /// Overall risk percentage, 0 to 100
    pub risk_percentage: f64,
    /// "low" | "medium" | "high" | "very-high"
    pub risk_level: String,
    /// Merged recommendations, condition-declaration order
    pub recommendations: Vec<String>,
    /// When the assessment was computed
    pub created_at: Timestamp,
}

/// A persisted single-calculator result
#[hdk_entry_helper]
#[derive(Clone, PartialEq)]
pub struct CalculatorResult {
    /// Engine-generated id, unique per invocation
    pub result_id: String,
    /// Patient this result belongs to
    pub patient_hash: ActionHash,
    /// Registry id of the calculator (e.g. "homa_ir")
    pub calculator_id: String,
    /// Display name
    pub name: String,
    /// Fixed-precision value string
    pub value: String,
    /// "normal" | "borderline" | "abnormal"
    pub interpretation: String,
    /// Message tied to the banding
    pub message: String,
    /// When the result was computed
    pub computed_at: Timestamp,
}

// ============================================================================
// Entry and Link Type Enums
// ============================================================================

#[hdk_entry_types]
#[unit_enum(UnitEntryTypes)]
pub enum EntryTypes {
    RiskAssessment(RiskAssessment),
    CalculatorResult(CalculatorResult),
}

#[hdk_link_types]
pub enum LinkTypes {
    /// Patient to their assessment history
    PatientToAssessments,
    /// Patient to their saved calculator results
    PatientToCalculatorResults,
}

// ============================================================================
// Validation Functions
// ============================================================================

#[hdk_extern]
pub fn validate(op: Op) -> ExternResult<ValidateCallbackResult> {
    match op.flattened::<EntryTypes, LinkTypes>()? {
        FlatOp::StoreEntry(store_entry) => match store_entry {
            OpEntry::CreateEntry { app_entry, .. } => validate_create_entry(app_entry),
            OpEntry::UpdateEntry { app_entry, .. } => validate_create_entry(app_entry),
            _ => Ok(ValidateCallbackResult::Valid),
        },
        FlatOp::RegisterCreateLink { link_type, .. } => validate_link(link_type),
        _ => Ok(ValidateCallbackResult::Valid),
    }
}

fn validate_create_entry(entry: EntryTypes) -> ExternResult<ValidateCallbackResult> {
    match entry {
        EntryTypes::RiskAssessment(assessment) => validate_risk_assessment(&assessment),
        EntryTypes::CalculatorResult(result) => validate_calculator_result(&result),
    }
}

fn validate_risk_assessment(assessment: &RiskAssessment) -> ExternResult<ValidateCallbackResult> {
    if assessment.assessment_type.is_empty() {
        return Ok(ValidateCallbackResult::Invalid(
            "Assessment type cannot be empty".to_string(),
        ));
    }

    if !assessment.risk_percentage.is_finite()
        || assessment.risk_percentage < 0.0
        || assessment.risk_percentage > 100.0
    {
        return Ok(ValidateCallbackResult::Invalid(
            "Risk percentage must be between 0 and 100".to_string(),
        ));
    }

    let expected_level = OverallRiskLevel::for_percentage(assessment.risk_percentage);
    if assessment.risk_level != expected_level.as_str() {
        return Ok(ValidateCallbackResult::Invalid(format!(
            "Risk level '{}' does not match percentage {} (expected '{}')",
            assessment.risk_level,
            assessment.risk_percentage,
            expected_level.as_str(),
        )));
    }

    if serde_json::from_str::<serde_json::Value>(&assessment.input_data).is_err() {
        return Ok(ValidateCallbackResult::Invalid(
            "Assessment input data must be valid JSON".to_string(),
        ));
    }

    if serde_json::from_str::<serde_json::Value>(&assessment.results_data).is_err() {
        return Ok(ValidateCallbackResult::Invalid(
            "Assessment results data must be valid JSON".to_string(),
        ));
    }

    Ok(ValidateCallbackResult::Valid)
}

fn validate_calculator_result(result: &CalculatorResult) -> ExternResult<ValidateCallbackResult> {
    if result.result_id.is_empty() {
        return Ok(ValidateCallbackResult::Invalid(
            "Result ID cannot be empty".to_string(),
        ));
    }

    if result.calculator_id.is_empty() {
        return Ok(ValidateCallbackResult::Invalid(
            "Calculator ID cannot be empty".to_string(),
        ));
    }

    if result.value.is_empty() {
        return Ok(ValidateCallbackResult::Invalid(
            "Calculator value is required".to_string(),
        ));
    }

    let valid_interpretations = ["normal", "borderline", "abnormal"];
    if !valid_interpretations.contains(&result.interpretation.as_str()) {
        return Ok(ValidateCallbackResult::Invalid(format!(
            "Invalid interpretation: {}. Must be one of: {:?}",
            result.interpretation, valid_interpretations,
        )));
    }

    if result.message.is_empty() {
        return Ok(ValidateCallbackResult::Invalid(
            "Calculator message is required".to_string(),
        ));
    }

    Ok(ValidateCallbackResult::Valid)
}

fn validate_link(link_type: LinkTypes) -> ExternResult<ValidateCallbackResult> {
    match link_type {
        LinkTypes::PatientToAssessments => Ok(ValidateCallbackResult::Valid),
        LinkTypes::PatientToCalculatorResults => Ok(ValidateCallbackResult::Valid),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patient() -> ActionHash {
        ActionHash::from_raw_36(vec![0u8; 36])
    }

    fn assessment() -> RiskAssessment {
        RiskAssessment {
            patient_hash: patient(),
            assessment_type: "comprehensive".to_string(),
            input_data: "{}".to_string(),
            results_data: "{\"overall_percentage\":50.0}".to_string(),
            risk_percentage: 50.0,
            risk_level: "high".to_string(),
            recommendations: vec![],
            created_at: Timestamp::from_micros(0),
        }
    }

    #[test]
    fn test_valid_assessment_passes() {
        let result = validate_risk_assessment(&assessment()).unwrap();
        assert!(matches!(result, ValidateCallbackResult::Valid));
    }

    #[test]
    fn test_level_must_match_percentage_band() {
        let mut entry = assessment();
        entry.risk_level = "low".to_string();
        let result = validate_risk_assessment(&entry).unwrap();
        assert!(matches!(result, ValidateCallbackResult::Invalid(_)));
    }

    #[test]
    fn test_percentage_must_be_finite_and_in_range() {
        for bad in [f64::NAN, f64::INFINITY, -1.0, 100.5] {
            let mut entry = assessment();
            entry.risk_percentage = bad;
            let result = validate_risk_assessment(&entry).unwrap();
            assert!(matches!(result, ValidateCallbackResult::Invalid(_)));
        }
    }

    #[test]
    fn test_results_data_must_be_json() {
        let mut entry = assessment();
        entry.results_data = "not json".to_string();
        let result = validate_risk_assessment(&entry).unwrap();
        assert!(matches!(result, ValidateCallbackResult::Invalid(_)));
    }

    #[test]
    fn test_calculator_result_interpretation_whitelist() {
        let mut entry = CalculatorResult {
            result_id: "homa_ir-1".to_string(),
            patient_hash: patient(),
            calculator_id: "homa_ir".to_string(),
            name: "HOMA-IR".to_string(),
            value: "1.00".to_string(),
            interpretation: "normal".to_string(),
            message: "ok".to_string(),
            computed_at: Timestamp::from_micros(0),
        };
        assert!(matches!(
            validate_calculator_result(&entry).unwrap(),
            ValidateCallbackResult::Valid
        ));
        entry.interpretation = "elevated".to_string();
        assert!(matches!(
            validate_calculator_result(&entry).unwrap(),
            ValidateCallbackResult::Invalid(_)
        ));
    }
}
