//! Risk Scoring Coordinator Zome
//!
//! Extern API over the pure risk engine:
//! - Run lab-value calculators against a supplied panel
//! - Persist calculator results for patient history
//! - Compute overall risk assessments and write each one to the DHT exactly
//!   once, surfacing a failed write without discarding the computed result
//!
//! All computation happens in the `risk-engine` crate; this zome only
//! converts timestamps, persists entries, and walks links.

use chrono::{DateTime, Utc};
use hdk::prelude::*;
use risk_engine::{aggregate, CalculatorRegistry, ConditionScore, LabPanel, LabValue};
use risk_integrity::*;

/// Engine clock value derived from conductor time
fn engine_now() -> ExternResult<DateTime<Utc>> {
    let now = sys_time()?;
    DateTime::from_timestamp_micros(now.as_micros() as i64).ok_or(wasm_error!(
        WasmErrorInner::Guest("System time out of range".to_string())
    ))
}

// ============================================================================
// Calculator Functions
// ============================================================================

/// Ids of every calculator runnable with the supplied readings
#[hdk_extern]
pub fn available_calculators(labs: Vec<LabValue>) -> ExternResult<Vec<String>> {
    let panel: LabPanel = labs.into_iter().collect();
    Ok(CalculatorRegistry::standard()
        .available_calculators(&panel)
        .iter()
        .map(|id| id.to_string())
        .collect())
}

/// Input for running a single calculator
#[derive(Serialize, Deserialize, Debug)]
pub struct RunCalculatorInput {
    pub calculator_id: String,
    pub labs: Vec<LabValue>,
}

/// Run one calculator; fails when required analytes are missing
#[hdk_extern]
pub fn run_calculator(input: RunCalculatorInput) -> ExternResult<risk_engine::CalculatorResult> {
    let panel: LabPanel = input.labs.into_iter().collect();
    let now = engine_now()?;
    CalculatorRegistry::standard()
        .run(&input.calculator_id, &panel, now)
        .map_err(|e| wasm_error!(WasmErrorInner::Guest(e.to_string())))
}

/// Run every calculator whose required analytes are present
#[hdk_extern]
pub fn run_all_calculators(labs: Vec<LabValue>) -> ExternResult<Vec<risk_engine::CalculatorResult>> {
    let panel: LabPanel = labs.into_iter().collect();
    let now = engine_now()?;
    Ok(CalculatorRegistry::standard().run_all(&panel, now))
}

/// Input for persisting a computed calculator result
#[derive(Serialize, Deserialize, Debug)]
pub struct SaveCalculatorResultInput {
    pub patient_hash: ActionHash,
    pub result: risk_engine::CalculatorResult,
}

/// Persist one calculator result and link it to the patient
#[hdk_extern]
pub fn save_calculator_result(input: SaveCalculatorResultInput) -> ExternResult<Record> {
    let entry = CalculatorResult {
        result_id: input.result.result_id.clone(),
        patient_hash: input.patient_hash.clone(),
        calculator_id: input.result.calculator_id.clone(),
        name: input.result.name.clone(),
        value: input.result.value.clone(),
        interpretation: input.result.interpretation.as_str().to_string(),
        message: input.result.message.clone(),
        computed_at: Timestamp::from_micros(input.result.computed_at.timestamp_micros()),
    };

    let hash = create_entry(&EntryTypes::CalculatorResult(entry))?;
    create_link(
        input.patient_hash,
        hash.clone(),
        LinkTypes::PatientToCalculatorResults,
        (),
    )?;

    get(hash, GetOptions::default())?.ok_or(wasm_error!(WasmErrorInner::Guest(
        "Could not find saved calculator result".to_string()
    )))
}

/// Saved calculator results for a patient
#[hdk_extern]
pub fn get_patient_calculator_results(patient_hash: ActionHash) -> ExternResult<Vec<Record>> {
    let links = get_links(
        LinkQuery::try_new(patient_hash, LinkTypes::PatientToCalculatorResults)?,
        GetStrategy::default(),
    )?;

    let mut results = Vec::new();
    for link in links {
        if let Some(hash) = link.target.into_action_hash() {
            if let Some(record) = get(hash, GetOptions::default())? {
                results.push(record);
            }
        }
    }

    Ok(results)
}

// ============================================================================
// Risk Assessment Functions
// ============================================================================

/// Input for an overall risk assessment run
#[derive(Serialize, Deserialize, Debug)]
pub struct AssessRiskInput {
    pub patient_hash: ActionHash,
    /// Kind of assessment run (e.g. "comprehensive")
    pub assessment_type: String,
    /// Per-condition scores computed upstream
    pub condition_scores: Vec<ConditionScore>,
    /// JSON snapshot of the inputs the scores came from
    pub input_data: String,
}

/// Result of an assessment run. The computed assessment is always present;
/// `save_error` is set when the single DHT write failed.
#[derive(Serialize, Deserialize, Debug)]
pub struct AssessRiskResponse {
    pub assessment: risk_engine::RiskAssessment,
    pub assessment_hash: Option<ActionHash>,
    pub save_error: Option<String>,
}

/// Compute an overall assessment and attempt to persist it exactly once
#[hdk_extern]
pub fn assess_risk(input: AssessRiskInput) -> ExternResult<AssessRiskResponse> {
    let now = engine_now()?;
    let patient_id = input.patient_hash.to_string();
    let assessment = aggregate(&patient_id, input.condition_scores, now);

    let results_data = serde_json::to_string(&assessment)
        .map_err(|e| wasm_error!(WasmErrorInner::Guest(e.to_string())))?;
    let entry = RiskAssessment {
        patient_hash: input.patient_hash.clone(),
        assessment_type: input.assessment_type,
        input_data: input.input_data,
        results_data,
        risk_percentage: assessment.overall_percentage,
        risk_level: assessment.overall_level.as_str().to_string(),
        recommendations: assessment.recommendations.clone(),
        created_at: Timestamp::from_micros(assessment.created_at.timestamp_micros()),
    };

    // Scoring and persistence are separate failure domains: a failed write
    // is reported alongside the still-valid assessment.
    let (assessment_hash, save_error) = match persist_assessment(entry, input.patient_hash) {
        Ok(hash) => (Some(hash), None),
        Err(e) => (None, Some(e.to_string())),
    };

    Ok(AssessRiskResponse {
        assessment,
        assessment_hash,
        save_error,
    })
}

fn persist_assessment(entry: RiskAssessment, patient_hash: ActionHash) -> ExternResult<ActionHash> {
    let hash = create_entry(&EntryTypes::RiskAssessment(entry))?;
    create_link(
        patient_hash,
        hash.clone(),
        LinkTypes::PatientToAssessments,
        (),
    )?;
    Ok(hash)
}

/// Get a persisted assessment by hash
#[hdk_extern]
pub fn get_assessment(hash: ActionHash) -> ExternResult<Option<Record>> {
    get(hash, GetOptions::default())
}

/// Assessment history for a patient
#[hdk_extern]
pub fn get_patient_assessments(patient_hash: ActionHash) -> ExternResult<Vec<Record>> {
    let links = get_links(
        LinkQuery::try_new(patient_hash, LinkTypes::PatientToAssessments)?,
        GetStrategy::default(),
    )?;

    let mut assessments = Vec::new();
    for link in links {
        if let Some(hash) = link.target.into_action_hash() {
            if let Some(record) = get(hash, GetOptions::default())? {
                assessments.push(record);
            }
        }
    }

    Ok(assessments)
}
