//! Gail-like breast cancer risk model
//!
//! Multiplicative risk-factor model: an age-bucket baseline is scaled by
//! independent factor multipliers, rounded to one decimal, and capped.
//! The same-age-group figure keeps the same 50% ceiling as the five-year
//! figure, matching the source behavior this model reproduces.

use crate::RiskCategory;
use serde::{Deserialize, Serialize};

/// Race groups recognized by the model
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Race {
    White,
    Black,
    Hispanic,
    Asian,
    Other,
}

/// Demographic and clinical inputs to the model
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BreastCancerInput {
    pub age: u32,
    pub age_at_first_period: u32,
    /// None means nulliparous
    pub age_at_first_birth: Option<u32>,
    pub first_degree_relatives: u32,
    pub biopsies: u32,
    pub atypical_hyperplasia: bool,
    pub race: Race,
}

/// Computed risk estimates, percentages
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BreastCancerRisk {
    /// Five-year risk, capped at 50.0
    pub five_year: f64,
    /// Lifetime risk, capped at 100.0
    pub lifetime: f64,
    /// Average risk for the same age group, capped at 50.0
    pub same_age_group: f64,
    pub level: RiskCategory,
    pub recommendations: Vec<String>,
}

struct Baseline {
    five_year: f64,
    lifetime: f64,
    same_age_group: f64,
}

/// Baselines keyed at ages 35..70 in steps of 5; the greatest bucket at or
/// below the patient's age applies, and ages below 35 use the 35 bucket.
const BASELINES: [(u32, Baseline); 8] = [
    (35, Baseline { five_year: 3.9, lifetime: 89.6, same_age_group: 3.9 }),
    (40, Baseline { five_year: 5.7, lifetime: 87.9, same_age_group: 5.7 }),
    (45, Baseline { five_year: 8.1, lifetime: 85.8, same_age_group: 8.1 }),
    (50, Baseline { five_year: 10.9, lifetime: 83.1, same_age_group: 10.9 }),
    (55, Baseline { five_year: 13.4, lifetime: 79.8, same_age_group: 13.4 }),
    (60, Baseline { five_year: 16.2, lifetime: 75.6, same_age_group: 16.2 }),
    (65, Baseline { five_year: 18.7, lifetime: 70.3, same_age_group: 18.7 }),
    (70, Baseline { five_year: 21.0, lifetime: 64.1, same_age_group: 21.0 }),
];

fn baseline_for_age(age: u32) -> &'static Baseline {
    let mut selected = &BASELINES[0].1;
    for (bucket, baseline) in BASELINES.iter() {
        if *bucket <= age {
            selected = baseline;
        }
    }
    selected
}

/// Combined risk-factor multiplier, factors applied in a fixed order
fn risk_multiplier(input: &BreastCancerInput) -> f64 {
    let mut multiplier = 1.0;

    // Age at menarche
    if input.age_at_first_period < 12 {
        multiplier *= 1.21;
    } else if input.age_at_first_period >= 14 {
        multiplier *= 0.93;
    }

    // Age at first live birth; nulliparity carries the same factor as a
    // first birth at 30 or later
    match input.age_at_first_birth {
        None => multiplier *= 1.24,
        Some(age) if age < 20 => multiplier *= 0.76,
        Some(age) if age >= 30 => multiplier *= 1.24,
        Some(_) => {}
    }

    // First-degree relatives with breast cancer
    if input.first_degree_relatives == 1 {
        multiplier *= 1.78;
    } else if input.first_degree_relatives >= 2 {
        multiplier *= 2.76;
    }

    // Breast biopsies
    if input.biopsies == 1 {
        multiplier *= 1.27;
    } else if input.biopsies >= 2 {
        multiplier *= 1.62;
    }

    if input.atypical_hyperplasia {
        multiplier *= 1.82;
    }

    multiplier *= match input.race {
        Race::White => 1.0,
        Race::Black => 0.85,
        Race::Hispanic => 0.73,
        Race::Asian => 0.65,
        Race::Other => 0.80,
    };

    multiplier
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Compute breast cancer risk estimates from demographic and clinical inputs
pub fn breast_cancer_risk(input: &BreastCancerInput) -> BreastCancerRisk {
    let baseline = baseline_for_age(input.age);
    let multiplier = risk_multiplier(input);

    let five_year = round1(baseline.five_year * multiplier).min(50.0);
    let lifetime = round1(baseline.lifetime * multiplier).min(100.0);
    let same_age_group = round1(baseline.same_age_group * multiplier).min(50.0);

    let level = if five_year < 1.7 {
        RiskCategory::Low
    } else if five_year < 5.0 {
        RiskCategory::Moderate
    } else {
        RiskCategory::High
    };

    let mut recommendations = vec![
        "Continue routine breast cancer screening appropriate for your age.".to_string(),
        "Perform monthly breast self-examination.".to_string(),
        "Maintain a healthy weight, limit alcohol, and stay physically active.".to_string(),
    ];
    if five_year >= 1.7 {
        recommendations.push(
            "Discuss chemoprevention options (tamoxifen or raloxifene) with your physician."
                .to_string(),
        );
    }
    if five_year >= 3.0 {
        recommendations
            .push("Consider referral for genetic counseling and BRCA testing.".to_string());
    }

    BreastCancerRisk {
        five_year,
        lifetime,
        same_age_group,
        level,
        recommendations,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn neutral_input() -> BreastCancerInput {
        BreastCancerInput {
            age: 45,
            age_at_first_period: 13,
            age_at_first_birth: Some(25),
            first_degree_relatives: 0,
            biopsies: 0,
            atypical_hyperplasia: false,
            race: Race::White,
        }
    }

    #[test]
    fn test_neutral_inputs_reproduce_baseline() {
        let risk = breast_cancer_risk(&neutral_input());
        assert_eq!(risk.five_year, 8.1);
        assert_eq!(risk.lifetime, 85.8);
        assert_eq!(risk.same_age_group, 8.1);
        assert_eq!(risk.level, RiskCategory::High);
    }

    #[test]
    fn test_age_below_first_bucket_uses_35_row() {
        let mut input = neutral_input();
        input.age = 28;
        let risk = breast_cancer_risk(&input);
        assert_eq!(risk.five_year, 3.9);
    }

    #[test]
    fn test_bucket_selection_takes_greatest_at_or_below() {
        let mut input = neutral_input();
        input.age = 49;
        assert_eq!(breast_cancer_risk(&input).five_year, 8.1);
        input.age = 50;
        assert_eq!(breast_cancer_risk(&input).five_year, 10.9);
    }

    #[test]
    fn test_multiplier_factor_table() {
        let mut input = neutral_input();
        input.age_at_first_period = 11;
        input.age_at_first_birth = None;
        input.first_degree_relatives = 1;
        input.biopsies = 1;
        input.atypical_hyperplasia = true;
        input.race = Race::Asian;
        let expected = 1.21 * 1.24 * 1.78 * 1.27 * 1.82 * 0.65;
        assert!((risk_multiplier(&input) - expected).abs() < 1e-12);
    }

    #[test]
    fn test_late_menarche_and_early_birth_are_protective() {
        let mut input = neutral_input();
        input.age_at_first_period = 15;
        input.age_at_first_birth = Some(18);
        assert!((risk_multiplier(&input) - 0.93 * 0.76).abs() < 1e-12);
    }

    #[test]
    fn test_relatives_monotonicity() {
        let mut input = neutral_input();
        let mut previous = 0.0;
        for relatives in [0, 1, 2, 3] {
            input.first_degree_relatives = relatives;
            let five_year = breast_cancer_risk(&input).five_year;
            assert!(five_year >= previous);
            previous = five_year;
        }
    }

    #[test]
    fn test_caps_hold_for_extreme_inputs() {
        let input = BreastCancerInput {
            age: 70,
            age_at_first_period: 10,
            age_at_first_birth: None,
            first_degree_relatives: 4,
            biopsies: 3,
            atypical_hyperplasia: true,
            race: Race::White,
        };
        let risk = breast_cancer_risk(&input);
        assert_eq!(risk.five_year, 50.0);
        assert_eq!(risk.same_age_group, 50.0);
        assert_eq!(risk.lifetime, 100.0);
    }

    #[test]
    fn test_recommendation_thresholds() {
        let input = BreastCancerInput {
            age: 35,
            age_at_first_period: 13,
            age_at_first_birth: Some(25),
            first_degree_relatives: 0,
            biopsies: 0,
            atypical_hyperplasia: false,
            race: Race::Asian,
        };
        // 3.9 * 0.65 = 2.5 -> chemoprevention but no genetic counseling
        let risk = breast_cancer_risk(&input);
        assert_eq!(risk.five_year, 2.5);
        assert_eq!(risk.recommendations.len(), 4);
        assert!(risk.recommendations[3].contains("chemoprevention"));

        let risk = breast_cancer_risk(&neutral_input());
        assert_eq!(risk.recommendations.len(), 5);
        assert!(risk.recommendations[4].contains("genetic counseling"));
    }
}
