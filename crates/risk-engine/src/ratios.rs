//! Lab-ratio calculators
//!
//! Four pure two-analyte calculators. Each returns `None` when either
//! required analyte is absent from the caller's panel; zero denominators are
//! not guarded, so a non-finite ratio falls through the range checks and
//! classifies as abnormal.

use crate::{CalculatorResult, Interpretation, LabValue};
use chrono::{DateTime, Utc};

/// FT3/FT4 conversion ratio, formatted to 3 decimals.
///
/// Normal band is the inclusive range 0.2 to 0.4; the low boundary is
/// exclusive (a ratio of exactly 0.2 is normal).
pub fn ft3_ft4_ratio(
    ft3: Option<&LabValue>,
    ft4: Option<&LabValue>,
    now: DateTime<Utc>,
) -> Option<CalculatorResult> {
    let ft3 = ft3?;
    let ft4 = ft4?;
    let ratio = ft3.value / ft4.value;

    let interpretation = if (0.2..=0.4).contains(&ratio) {
        Interpretation::Normal
    } else {
        Interpretation::Abnormal
    };
    let message = match interpretation {
        Interpretation::Normal => {
            "FT3 to FT4 ratio is within the expected range of 0.2 to 0.4.".to_string()
        }
        _ if ratio < 0.2 => {
            "Low FT3 to FT4 ratio suggests reduced peripheral conversion of T4 to T3.".to_string()
        }
        _ => {
            "Elevated FT3 to FT4 ratio suggests preferential T3 production or increased conversion."
                .to_string()
        }
    };

    Some(CalculatorResult::new(
        "ft3_ft4_ratio",
        "FT3/FT4 Ratio",
        format!("{:.3}", ratio),
        interpretation,
        message,
        now,
    ))
}

/// HOMA-IR insulin resistance index: (glucose x insulin) / 22.5, 2 decimals.
pub fn homa_ir(
    glucose: Option<&LabValue>,
    insulin: Option<&LabValue>,
    now: DateTime<Utc>,
) -> Option<CalculatorResult> {
    let glucose = glucose?;
    let insulin = insulin?;
    let index = (glucose.value * insulin.value) / 22.5;

    let (interpretation, message) = if index < 2.7 {
        (
            Interpretation::Normal,
            "HOMA-IR below 2.7 indicates normal insulin sensitivity.",
        )
    } else if index <= 4.0 {
        (
            Interpretation::Borderline,
            "HOMA-IR between 2.7 and 4.0 suggests early insulin resistance.",
        )
    } else {
        (
            Interpretation::Abnormal,
            "HOMA-IR above 4.0 indicates significant insulin resistance.",
        )
    };

    Some(CalculatorResult::new(
        "homa_ir",
        "HOMA-IR",
        format!("{:.2}", index),
        interpretation,
        message.to_string(),
        now,
    ))
}

/// Free Androgen Index: (testosterone / SHBG) x 100, 2 decimals.
pub fn free_androgen_index(
    testosterone: Option<&LabValue>,
    shbg: Option<&LabValue>,
    now: DateTime<Utc>,
) -> Option<CalculatorResult> {
    let testosterone = testosterone?;
    let shbg = shbg?;
    let index = (testosterone.value / shbg.value) * 100.0;

    let (interpretation, message) = if index < 5.0 {
        (
            Interpretation::Normal,
            "Free androgen index below 5.0 is within the normal female range.",
        )
    } else if index <= 8.0 {
        (
            Interpretation::Borderline,
            "Free androgen index between 5.0 and 8.0 is mildly elevated.",
        )
    } else {
        (
            Interpretation::Abnormal,
            "Free androgen index above 8.0 indicates androgen excess, consistent with PCOS.",
        )
    };

    Some(CalculatorResult::new(
        "fai",
        "Free Androgen Index",
        format!("{:.2}", index),
        interpretation,
        message.to_string(),
        now,
    ))
}

/// Triglyceride to HDL cholesterol ratio, 2 decimals.
pub fn tg_hdl_ratio(
    triglycerides: Option<&LabValue>,
    hdl: Option<&LabValue>,
    now: DateTime<Utc>,
) -> Option<CalculatorResult> {
    let triglycerides = triglycerides?;
    let hdl = hdl?;
    let ratio = triglycerides.value / hdl.value;

    let (interpretation, message) = if ratio < 2.0 {
        (
            Interpretation::Normal,
            "TG/HDL ratio below 2.0 suggests low cardiometabolic risk.",
        )
    } else if ratio <= 3.0 {
        (
            Interpretation::Borderline,
            "TG/HDL ratio between 2.0 and 3.0 suggests emerging metabolic risk.",
        )
    } else {
        (
            Interpretation::Abnormal,
            "TG/HDL ratio above 3.0 is associated with insulin resistance and an atherogenic lipid profile.",
        )
    };

    Some(CalculatorResult::new(
        "tg_hdl_ratio",
        "TG/HDL Ratio",
        format!("{:.2}", ratio),
        interpretation,
        message.to_string(),
        now,
    ))
}
