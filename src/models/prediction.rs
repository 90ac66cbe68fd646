use serde::{Deserialize, Serialize};

use super::enums::ReportedSeverity;
use crate::triage::TriageError;

/// Response body returned by an external prediction service.
///
/// `risk_probability` is `null` when the service could not score the input;
/// `severity` is then usually `"Unknown"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MlPrediction {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disease: Option<String>,
    #[serde(default = "unknown_severity")]
    pub severity: String,
    #[serde(default)]
    pub risk_probability: Option<f64>,
    #[serde(default)]
    pub confidence: f64,
}

fn unknown_severity() -> String {
    "Unknown".to_string()
}

impl MlPrediction {
    pub fn from_json(json: &str) -> Result<Self, TriageError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_value(value: serde_json::Value) -> Result<Self, TriageError> {
        Ok(serde_json::from_value(value)?)
    }

    pub fn reported_severity(&self) -> ReportedSeverity {
        ReportedSeverity::parse(&self.severity)
    }

    /// Probability usable in threshold rules. Non-finite values count as absent.
    pub fn risk(&self) -> Option<f64> {
        self.risk_probability.filter(|p| p.is_finite())
    }
}
