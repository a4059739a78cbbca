//! Calculator registry
//!
//! An explicit table of typed descriptors replaces string-keyed dynamic
//! dispatch: each descriptor names its required analytes and a pure compute
//! function, so the runnable set for a given panel is a plain subset check.

use crate::{ratios, CalculatorResult, EngineError, LabPanel};
use chrono::{DateTime, Utc};

/// Pure compute function over a lab panel. Returns `None` only when a
/// required analyte is absent.
pub type ComputeFn = fn(&LabPanel, DateTime<Utc>) -> Option<CalculatorResult>;

/// One registered calculator. Registered once at startup, never mutated.
#[derive(Clone, Copy)]
pub struct CalculatorDescriptor {
    pub id: &'static str,
    pub name: &'static str,
    pub required_inputs: &'static [&'static str],
    compute: ComputeFn,
}

/// Registry of lab-value calculators, iterated in registration order
pub struct CalculatorRegistry {
    descriptors: Vec<CalculatorDescriptor>,
}

fn compute_ft3_ft4(panel: &LabPanel, now: DateTime<Utc>) -> Option<CalculatorResult> {
    ratios::ft3_ft4_ratio(panel.get("FT3"), panel.get("FT4"), now)
}

fn compute_homa_ir(panel: &LabPanel, now: DateTime<Utc>) -> Option<CalculatorResult> {
    ratios::homa_ir(panel.get("Glucose"), panel.get("Insulin"), now)
}

fn compute_fai(panel: &LabPanel, now: DateTime<Utc>) -> Option<CalculatorResult> {
    ratios::free_androgen_index(panel.get("Testosterone"), panel.get("SHBG"), now)
}

fn compute_tg_hdl(panel: &LabPanel, now: DateTime<Utc>) -> Option<CalculatorResult> {
    ratios::tg_hdl_ratio(panel.get("Triglycerides"), panel.get("HDL"), now)
}

impl CalculatorRegistry {
    /// The standard calculator set, in registration order
    pub fn standard() -> Self {
        CalculatorRegistry {
            descriptors: vec![
                CalculatorDescriptor {
                    id: "ft3_ft4_ratio",
                    name: "FT3/FT4 Ratio",
                    required_inputs: &["FT3", "FT4"],
                    compute: compute_ft3_ft4,
                },
                CalculatorDescriptor {
                    id: "homa_ir",
                    name: "HOMA-IR",
                    required_inputs: &["Glucose", "Insulin"],
                    compute: compute_homa_ir,
                },
                CalculatorDescriptor {
                    id: "fai",
                    name: "Free Androgen Index",
                    required_inputs: &["Testosterone", "SHBG"],
                    compute: compute_fai,
                },
                CalculatorDescriptor {
                    id: "tg_hdl_ratio",
                    name: "TG/HDL Ratio",
                    required_inputs: &["Triglycerides", "HDL"],
                    compute: compute_tg_hdl,
                },
            ],
        }
    }

    /// All registered descriptors, registration order
    pub fn descriptors(&self) -> &[CalculatorDescriptor] {
        &self.descriptors
    }

    /// Ids of every calculator whose full required-input set is present in
    /// the panel, in registration order
    pub fn available_calculators(&self, panel: &LabPanel) -> Vec<&'static str> {
        self.descriptors
            .iter()
            .filter(|d| d.required_inputs.iter().all(|input| panel.contains(input)))
            .map(|d| d.id)
            .collect()
    }

    /// Run a single calculator by id.
    ///
    /// Fails with `MissingInput` when any required analyte is absent from
    /// the panel.
    pub fn run(
        &self,
        id: &str,
        panel: &LabPanel,
        now: DateTime<Utc>,
    ) -> Result<CalculatorResult, EngineError> {
        let descriptor = self
            .descriptors
            .iter()
            .find(|d| d.id == id)
            .ok_or_else(|| EngineError::UnknownCalculator(id.to_string()))?;

        let missing: Vec<String> = descriptor
            .required_inputs
            .iter()
            .filter(|input| !panel.contains(input))
            .map(|input| input.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(EngineError::MissingInput {
                calculator: descriptor.id.to_string(),
                missing,
            });
        }

        (descriptor.compute)(panel, now).ok_or_else(|| EngineError::MissingInput {
            calculator: descriptor.id.to_string(),
            missing: descriptor
                .required_inputs
                .iter()
                .map(|input| input.to_string())
                .collect(),
        })
    }

    /// Run every runnable calculator for the panel. Side-effect-free; the
    /// pre-filter guarantees no calculator can fail on missing inputs.
    pub fn run_all(&self, panel: &LabPanel, now: DateTime<Utc>) -> Vec<CalculatorResult> {
        self.descriptors
            .iter()
            .filter(|d| d.required_inputs.iter().all(|input| panel.contains(input)))
            .filter_map(|d| (d.compute)(panel, now))
            .collect()
    }
}

impl Default for CalculatorRegistry {
    fn default() -> Self {
        CalculatorRegistry::standard()
    }
}
