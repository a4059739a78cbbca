//! Risk aggregator
//!
//! Rolls independently computed per-condition scores into one overall risk
//! percentage, level, and merged recommendation list, and hands the finished
//! assessment to a persistence gateway. Scoring and persistence are separate
//! failure domains: a failed save never invalidates the computed assessment.

use crate::{RiskCategory, StoreError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Mutex;

/// Conditions the aggregator understands, in declaration order.
///
/// Recommendation merging follows this order regardless of the order scores
/// were supplied in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Condition {
    Cardiovascular,
    Cancer,
    Diabetes,
    Osteoporosis,
    MentalHealth,
}

impl Condition {
    pub const ALL: [Condition; 5] = [
        Condition::Cardiovascular,
        Condition::Cancer,
        Condition::Diabetes,
        Condition::Osteoporosis,
        Condition::MentalHealth,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Condition::Cardiovascular => "cardiovascular",
            Condition::Cancer => "cancer",
            Condition::Diabetes => "diabetes",
            Condition::Osteoporosis => "osteoporosis",
            Condition::MentalHealth => "mental_health",
        }
    }

    fn order_index(&self) -> usize {
        Condition::ALL.iter().position(|c| c == self).unwrap_or(0)
    }
}

/// Score for one condition, computed upstream on a 0 to 5 scale
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConditionScore {
    pub condition: Condition,
    /// 0 (no risk) to 5 (maximum)
    pub score: f64,
    pub level: RiskCategory,
    /// Contributing factors identified upstream
    pub factors: Vec<String>,
    pub recommendations: Vec<String>,
}

/// Overall risk level bands
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum OverallRiskLevel {
    Low,
    Medium,
    High,
    VeryHigh,
}

impl OverallRiskLevel {
    /// Band for an overall percentage. Bands are evaluated in ascending
    /// threshold order, so a non-finite percentage lands in the top band.
    pub fn for_percentage(percentage: f64) -> Self {
        if percentage < 20.0 {
            OverallRiskLevel::Low
        } else if percentage < 40.0 {
            OverallRiskLevel::Medium
        } else if percentage < 70.0 {
            OverallRiskLevel::High
        } else {
            OverallRiskLevel::VeryHigh
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OverallRiskLevel::Low => "low",
            OverallRiskLevel::Medium => "medium",
            OverallRiskLevel::High => "high",
            OverallRiskLevel::VeryHigh => "very-high",
        }
    }
}

/// One overall assessment. Persisted at most once per run and never mutated;
/// re-assessment creates a new record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub patient_id: String,
    pub overall_percentage: f64,
    pub overall_level: OverallRiskLevel,
    pub condition_scores: Vec<ConditionScore>,
    /// Every condition's recommendations, condition-declaration order,
    /// duplicates allowed
    pub recommendations: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// Combine per-condition scores into one overall assessment.
///
/// `overall_percentage` is the mean of the scores present times 20; an empty
/// input yields 0.0 / Low.
pub fn aggregate(
    patient_id: &str,
    scores: Vec<ConditionScore>,
    created_at: DateTime<Utc>,
) -> RiskAssessment {
    let mut condition_scores = scores;
    condition_scores.sort_by_key(|s| s.condition.order_index());

    let overall_percentage = if condition_scores.is_empty() {
        0.0
    } else {
        let sum: f64 = condition_scores.iter().map(|s| s.score).sum();
        (sum / condition_scores.len() as f64) * 20.0
    };
    let overall_level = OverallRiskLevel::for_percentage(overall_percentage);

    let recommendations = condition_scores
        .iter()
        .flat_map(|s| s.recommendations.iter().cloned())
        .collect();

    RiskAssessment {
        patient_id: patient_id.to_string(),
        overall_percentage,
        overall_level,
        condition_scores,
        recommendations,
        created_at,
    }
}

/// Durable store for computed assessments (spec'd external collaborator).
///
/// The engine calls `save_assessment` at most once per assessment run and
/// never retries internally; failures are reported to the caller.
pub trait AssessmentStore {
    fn save_assessment(
        &self,
        assessment: &RiskAssessment,
        assessment_type: &str,
        input_data: &serde_json::Value,
    ) -> Result<String, StoreError>;
}

/// Outcome of an assessment run: the computed assessment plus the result of
/// the single save attempt. The assessment stays valid and displayable even
/// when the save failed.
#[derive(Debug)]
pub struct AssessmentOutcome {
    pub assessment: RiskAssessment,
    pub saved: Result<String, StoreError>,
}

/// Aggregate and attempt the single gateway write
pub fn aggregate_and_store(
    store: &impl AssessmentStore,
    patient_id: &str,
    scores: Vec<ConditionScore>,
    assessment_type: &str,
    input_data: &serde_json::Value,
    created_at: DateTime<Utc>,
) -> AssessmentOutcome {
    let assessment = aggregate(patient_id, scores, created_at);
    let saved = store.save_assessment(&assessment, assessment_type, input_data);
    AssessmentOutcome { assessment, saved }
}

/// A record as the in-memory store keeps it, field for field what the
/// gateway `save` call carries
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StoredAssessment {
    pub assessment_id: String,
    pub patient_id: String,
    pub assessment_type: String,
    pub input_data: serde_json::Value,
    pub results_data: serde_json::Value,
    pub risk_percentage: f64,
    pub risk_level: String,
    pub recommendations: Vec<String>,
}

/// Reference in-memory gateway for embedders and tests
#[derive(Default)]
pub struct InMemoryStore {
    records: Mutex<Vec<StoredAssessment>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        InMemoryStore::default()
    }

    pub fn records(&self) -> Vec<StoredAssessment> {
        self.records.lock().map(|r| r.clone()).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.records.lock().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl AssessmentStore for InMemoryStore {
    fn save_assessment(
        &self,
        assessment: &RiskAssessment,
        assessment_type: &str,
        input_data: &serde_json::Value,
    ) -> Result<String, StoreError> {
        let results_data = serde_json::to_value(assessment)
            .map_err(|e| StoreError(e.to_string()))?;
        let mut records = self
            .records
            .lock()
            .map_err(|_| StoreError("assessment store lock poisoned".to_string()))?;
        let assessment_id = format!("assessment-{}", records.len() + 1);
        records.push(StoredAssessment {
            assessment_id: assessment_id.clone(),
            patient_id: assessment.patient_id.clone(),
            assessment_type: assessment_type.to_string(),
            input_data: input_data.clone(),
            results_data,
            risk_percentage: assessment.overall_percentage,
            risk_level: assessment.overall_level.as_str().to_string(),
            recommendations: assessment.recommendations.clone(),
        });
        Ok(assessment_id)
    }
}
