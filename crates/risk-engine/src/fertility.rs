//! Fertility window estimator
//!
//! Cycle-date arithmetic plus AMH-based ovarian reserve banding and a
//! multiplicative conception probability estimate.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// Inputs to the estimator. FSH, LH, and antral follicle count are optional
/// context; ovulation timing needs only the cycle dates.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FertilityInput {
    pub last_period_date: NaiveDate,
    /// Cycle length in days
    pub cycle_length: u32,
    /// Anti-Mullerian Hormone, ng/mL
    pub amh: f64,
    pub age: u32,
    /// Follicle-stimulating hormone, IU/L
    pub fsh: Option<f64>,
    /// Luteinizing hormone, IU/L
    pub lh: Option<f64>,
    pub antral_follicle_count: Option<u32>,
}

/// Ovarian reserve status derived from AMH banding
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FertilityStatus {
    High,
    Moderate,
    Low,
    VeryLow,
}

impl FertilityStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FertilityStatus::High => "high",
            FertilityStatus::Moderate => "moderate",
            FertilityStatus::Low => "low",
            FertilityStatus::VeryLow => "very_low",
        }
    }
}

/// The multi-day interval around ovulation with elevated conception
/// probability
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FertilityWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FertilityResult {
    pub ovulation_date: NaiveDate,
    pub fertility_window: FertilityWindow,
    /// Estimated per-cycle conception probability, percent, capped at 30
    pub conception_probability: f64,
    pub amh_interpretation: String,
    pub fertility_status: FertilityStatus,
    /// Factors that shaped the estimate, in the order they were applied
    pub factors: Vec<String>,
}

fn amh_banding(amh: f64) -> (&'static str, FertilityStatus) {
    if amh > 3.0 {
        ("high (possible PCOS)", FertilityStatus::High)
    } else if amh > 1.5 {
        ("normal", FertilityStatus::High)
    } else if amh > 0.7 {
        ("moderately reduced", FertilityStatus::Moderate)
    } else if amh > 0.3 {
        ("low", FertilityStatus::Low)
    } else {
        ("very low", FertilityStatus::VeryLow)
    }
}

/// Estimate ovulation timing, the fertility window, and per-cycle
/// conception probability
pub fn estimate_fertility(input: &FertilityInput) -> FertilityResult {
    let ovulation_date =
        input.last_period_date + Duration::days(input.cycle_length as i64 - 14);
    let fertility_window = FertilityWindow {
        start: ovulation_date - Duration::days(5),
        end: ovulation_date + Duration::days(1),
    };

    let (amh_interpretation, fertility_status) = amh_banding(input.amh);

    let mut probability: f64 = 25.0;
    let mut factors = Vec::new();

    // Age factors compose; over 40 applies both reductions
    if input.age > 35 {
        probability *= 0.8;
        factors.push("Age over 35 lowers per-cycle conception probability.".to_string());
    }
    if input.age > 40 {
        probability *= 0.6;
        factors.push("Age over 40 substantially lowers per-cycle conception probability.".to_string());
    }
    if input.amh < 1.0 {
        probability *= 0.7;
        factors.push("AMH below 1.0 ng/mL indicates reduced ovarian reserve.".to_string());
    }
    if let Some(afc) = input.antral_follicle_count {
        if afc < 7 {
            probability *= 0.8;
            factors.push("Antral follicle count below 7 indicates reduced ovarian reserve.".to_string());
        }
    }
    let conception_probability = probability.min(30.0);

    // Contextual flags; these never change the numeric estimate
    if let Some(fsh) = input.fsh {
        if fsh > 10.0 {
            factors.push("FSH above 10 IU/L suggests diminished ovarian reserve.".to_string());
        }
        if let Some(lh) = input.lh {
            if lh / fsh > 2.0 {
                factors.push("LH to FSH ratio above 2 can indicate PCOS.".to_string());
            }
        }
    }

    FertilityResult {
        ovulation_date,
        fertility_window,
        conception_probability,
        amh_interpretation: amh_interpretation.to_string(),
        fertility_status,
        factors,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn base_input() -> FertilityInput {
        FertilityInput {
            last_period_date: date(2024, 1, 1),
            cycle_length: 28,
            amh: 2.0,
            age: 30,
            fsh: None,
            lh: None,
            antral_follicle_count: None,
        }
    }

    #[test]
    fn test_standard_cycle_dates() {
        let result = estimate_fertility(&base_input());
        assert_eq!(result.ovulation_date, date(2024, 1, 15));
        assert_eq!(result.fertility_window.start, date(2024, 1, 10));
        assert_eq!(result.fertility_window.end, date(2024, 1, 16));
    }

    #[test]
    fn test_short_cycle_shifts_ovulation_earlier() {
        let mut input = base_input();
        input.cycle_length = 24;
        let result = estimate_fertility(&input);
        assert_eq!(result.ovulation_date, date(2024, 1, 11));
    }

    #[test]
    fn test_amh_banding() {
        let mut input = base_input();
        for (amh, interpretation, status) in [
            (3.5, "high (possible PCOS)", FertilityStatus::High),
            (2.0, "normal", FertilityStatus::High),
            (1.0, "moderately reduced", FertilityStatus::Moderate),
            (0.5, "low", FertilityStatus::Low),
            (0.2, "very low", FertilityStatus::VeryLow),
        ] {
            input.amh = amh;
            let result = estimate_fertility(&input);
            assert_eq!(result.amh_interpretation, interpretation);
            assert_eq!(result.fertility_status, status);
        }
    }

    #[test]
    fn test_conception_probability_baseline() {
        let result = estimate_fertility(&base_input());
        assert_eq!(result.conception_probability, 25.0);
        assert!(result.factors.is_empty());
    }

    #[test]
    fn test_age_factors_compose() {
        let mut input = base_input();
        input.age = 38;
        assert!((estimate_fertility(&input).conception_probability - 20.0).abs() < 1e-9);

        // Over 40 applies both the over-35 and over-40 reductions
        input.age = 42;
        assert!((estimate_fertility(&input).conception_probability - 12.0).abs() < 1e-9);
    }

    #[test]
    fn test_reserve_factors_stack() {
        let mut input = base_input();
        input.age = 42;
        input.amh = 0.5;
        input.antral_follicle_count = Some(5);
        let result = estimate_fertility(&input);
        // 25 * 0.8 * 0.6 * 0.7 * 0.8
        assert!((result.conception_probability - 6.72).abs() < 1e-9);
        assert_eq!(result.factors.len(), 4);
    }

    #[test]
    fn test_contextual_hormone_flags() {
        let mut input = base_input();
        input.fsh = Some(12.0);
        let result = estimate_fertility(&input);
        assert_eq!(result.conception_probability, 25.0);
        assert!(result.factors.iter().any(|f| f.contains("FSH above 10")));

        input.fsh = Some(4.0);
        input.lh = Some(9.0);
        let result = estimate_fertility(&input);
        assert!(result.factors.iter().any(|f| f.contains("LH to FSH")));
    }
}
