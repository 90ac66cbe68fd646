use serde::{Deserialize, Serialize};

use super::rules::RuleChain;
use super::types::TriageError;
use super::validation::require_finite;

/// Urgency band for a hemoglobin reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AnemiaUrgency {
    Low,
    Moderate,
    High,
    Critical,
}

impl AnemiaUrgency {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Moderate => "MODERATE",
            Self::High => "HIGH",
            Self::Critical => "CRITICAL",
        }
    }
}

fn urgency_chain() -> RuleChain<f64, AnemiaUrgency> {
    RuleChain::<f64, AnemiaUrgency>::new("anemia_urgency", AnemiaUrgency::Critical)
        .rule("A-1", |hb| *hb >= 11.0, AnemiaUrgency::Low)
        .rule("A-2", |hb| *hb >= 9.0, AnemiaUrgency::Moderate)
        .rule("A-3", |hb| *hb >= 7.0, AnemiaUrgency::High)
}

/// Hemoglobin in g/dL.
pub fn anemia_urgency(hemoglobin: f64) -> Result<AnemiaUrgency, TriageError> {
    let hb = require_finite("hemoglobin", hemoglobin)?;
    Ok(urgency_chain().evaluate(&hb).outcome)
}
