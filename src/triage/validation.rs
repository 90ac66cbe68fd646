//! Boundary checks applied before any reading reaches a classifier.
//!
//! Non-finite values are always rejected. Out-of-range values are either
//! rejected or classified with a [`RangeFlag`] attached, depending on the
//! [`RangePolicy`] for the field.

use super::types::{RangeFlag, TriageError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangePolicy {
    Reject,
    Flag,
}

/// Expected numeric domain for one vital or demographic field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VitalRange {
    pub field: &'static str,
    pub min: f64,
    pub max: f64,
    pub unit: &'static str,
}

impl VitalRange {
    pub const fn new(field: &'static str, min: f64, max: f64, unit: &'static str) -> Self {
        Self {
            field,
            min,
            max,
            unit,
        }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    /// Validate `value` against this range, pushing a flag instead of failing
    /// when the policy allows it.
    pub fn check(
        &self,
        value: f64,
        policy: RangePolicy,
        flags: &mut Vec<RangeFlag>,
    ) -> Result<f64, TriageError> {
        let value = require_finite(self.field, value)?;
        if self.contains(value) {
            return Ok(value);
        }

        match policy {
            RangePolicy::Reject => Err(TriageError::OutOfRange {
                field: self.field.to_string(),
                value,
                min: self.min,
                max: self.max,
            }),
            RangePolicy::Flag => {
                tracing::warn!(
                    field = self.field,
                    value,
                    min = self.min,
                    max = self.max,
                    "Reading outside expected range, classifying anyway"
                );
                flags.push(RangeFlag {
                    field: self.field.to_string(),
                    value,
                    min: self.min,
                    max: self.max,
                    unit: self.unit.to_string(),
                });
                Ok(value)
            }
        }
    }
}

// ── Known ranges ────────────────────────────────────────────

pub const SYSTOLIC: VitalRange = VitalRange::new("systolic_bp", 50.0, 300.0, "mmHg");
pub const DIASTOLIC: VitalRange = VitalRange::new("diastolic_bp", 30.0, 200.0, "mmHg");
pub const TEMPERATURE: VitalRange = VitalRange::new("temperature", 30.0, 45.0, "\u{b0}C");
pub const PREGNANCIES: VitalRange = VitalRange::new("pregnancies", 0.0, 20.0, "count");
pub const GLUCOSE: VitalRange = VitalRange::new("glucose", 0.0, 500.0, "mg/dL");
pub const BLOOD_PRESSURE: VitalRange = VitalRange::new("blood_pressure", 0.0, 300.0, "mmHg");
pub const BMI: VitalRange = VitalRange::new("bmi", 10.0, 80.0, "kg/m\u{b2}");
pub const AGE: VitalRange = VitalRange::new("age", 0.0, 120.0, "years");
pub const RESTING_BP: VitalRange = VitalRange::new("resting_bp", 0.0, 300.0, "mmHg");
pub const CHOLESTEROL: VitalRange = VitalRange::new("cholesterol", 0.0, 600.0, "mg/dL");
pub const MAX_HEART_RATE: VitalRange = VitalRange::new("max_heart_rate", 0.0, 250.0, "bpm");

// ── Helpers ─────────────────────────────────────────────────

/// Reject NaN and infinities.
pub fn require_finite(field: &str, value: f64) -> Result<f64, TriageError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(TriageError::InvalidNumber {
            field: field.to_string(),
            value: value.to_string(),
        })
    }
}

/// Accept only exact 0 or 1 for yes/no coded fields.
pub fn require_flag(field: &str, value: f64) -> Result<bool, TriageError> {
    let value = require_finite(field, value)?;
    if value == 0.0 {
        Ok(false)
    } else if value == 1.0 {
        Ok(true)
    } else {
        Err(TriageError::InvalidCode {
            field: field.to_string(),
            value: value.to_string(),
        })
    }
}
