use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{FormValues, MlPrediction};

// ---------------------------------------------------------------------------
// TriagePriority
// ---------------------------------------------------------------------------

/// Urgency tier for allocating medical attention.
///
/// Variants are declared least to most severe so the derived `Ord` reads
/// naturally: `Resuscitation > Emergent > Urgent > LessUrgent > NonUrgent`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TriagePriority {
    #[serde(rename = "Non-Urgent")]
    NonUrgent,
    #[serde(rename = "Less Urgent")]
    LessUrgent,
    Urgent,
    Emergent,
    Resuscitation,
}

impl TriagePriority {
    /// Most severe first.
    pub const ALL: [TriagePriority; 5] = [
        TriagePriority::Resuscitation,
        TriagePriority::Emergent,
        TriagePriority::Urgent,
        TriagePriority::LessUrgent,
        TriagePriority::NonUrgent,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Resuscitation => "Resuscitation",
            Self::Emergent => "Emergent",
            Self::Urgent => "Urgent",
            Self::LessUrgent => "Less Urgent",
            Self::NonUrgent => "Non-Urgent",
        }
    }

    /// Exact-label lookup. Labels are case-sensitive, as displayed.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.as_str() == label)
    }

    /// Lookup that never fails: unrecognized keys resolve to `Urgent`.
    pub fn from_label_or_default(label: &str) -> Self {
        match Self::from_label(label) {
            Some(priority) => priority,
            None => {
                tracing::warn!(key = label, "Unrecognized triage priority key, using Urgent");
                Self::default()
            }
        }
    }

    /// ESI-style level: 1 is Resuscitation, 5 is Non-Urgent.
    pub fn level(self) -> u8 {
        match self {
            Self::Resuscitation => 1,
            Self::Emergent => 2,
            Self::Urgent => 3,
            Self::LessUrgent => 4,
            Self::NonUrgent => 5,
        }
    }

    fn style(self) -> PriorityStyle {
        match self {
            Self::Resuscitation => PriorityStyle {
                color: "#ff0000",
                bg_color: "#ffebee",
                icon: "\u{2695}\u{fe0f}",
            },
            Self::Emergent => PriorityStyle {
                color: "#ff5722",
                bg_color: "#fff3e0",
                icon: "\u{1f6a8}",
            },
            Self::Urgent => PriorityStyle {
                color: "#ff9800",
                bg_color: "#fff8e1",
                icon: "\u{26a0}\u{fe0f}",
            },
            Self::LessUrgent => PriorityStyle {
                color: "#2196f3",
                bg_color: "#e3f2fd",
                icon: "\u{1f468}\u{200d}\u{2695}\u{fe0f}",
            },
            Self::NonUrgent => PriorityStyle {
                color: "#4caf50",
                bg_color: "#e8f5e9",
                icon: "\u{2705}",
            },
        }
    }
}

impl Default for TriagePriority {
    fn default() -> Self {
        Self::Urgent
    }
}

impl fmt::Display for TriagePriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Colors shared by every condition family. Border matches the foreground.
struct PriorityStyle {
    color: &'static str,
    bg_color: &'static str,
    icon: &'static str,
}

// ---------------------------------------------------------------------------
// ConditionFamily
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionFamily {
    BloodPressure,
    Diabetes,
    Fever,
    Cardiac,
}

impl ConditionFamily {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::BloodPressure => "blood_pressure",
            Self::Diabetes => "diabetes",
            Self::Fever => "fever",
            Self::Cardiac => "cardiac",
        }
    }
}

// ---------------------------------------------------------------------------
// Static table entries
// ---------------------------------------------------------------------------

/// One row of a family's care pathway table.
#[derive(Debug)]
pub struct PathwayEntry {
    pub actions: &'static [&'static str],
    pub facility: &'static str,
    pub transport: &'static str,
    pub team: &'static str,
    pub tests: &'static [&'static str],
    pub medication: Option<&'static str>,
    pub monitoring: Option<&'static str>,
}

impl PathwayEntry {
    pub fn to_pathway(&self) -> CarePathway {
        CarePathway {
            actions: self.actions.iter().map(|a| a.to_string()).collect(),
            facility: self.facility.to_string(),
            transport: self.transport.to_string(),
            team: self.team.to_string(),
            tests: self.tests.iter().map(|t| t.to_string()).collect(),
            medication: self.medication.map(str::to_string),
            monitoring: self.monitoring.map(str::to_string),
            specific_advice: None,
        }
    }
}

/// One row of a family's display table.
#[derive(Debug)]
pub struct DisplayEntry {
    pub response_time: &'static str,
    pub description: &'static str,
    pub warning: Option<&'static str>,
}

impl DisplayEntry {
    pub fn to_display(&self, priority: TriagePriority) -> TriageDisplay {
        let style = priority.style();
        TriageDisplay {
            color: style.color.to_string(),
            bg_color: style.bg_color.to_string(),
            border_color: style.color.to_string(),
            icon: style.icon.to_string(),
            response_time: self.response_time.to_string(),
            description: self.description.to_string(),
            warning: self.warning.map(str::to_string),
        }
    }
}

/// Look up a row in a table ordered Resuscitation → Non-Urgent.
pub fn table_entry<T>(table: &[T; 5], priority: TriagePriority) -> &T {
    &table[usize::from(priority.level() - 1)]
}

// ---------------------------------------------------------------------------
// Output records
// ---------------------------------------------------------------------------

/// Recommended facility, transport, team and workup for a triage priority.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CarePathway {
    pub actions: Vec<String>,
    pub facility: String,
    pub transport: String,
    pub team: String,
    pub tests: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub medication: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monitoring: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specific_advice: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriageDisplay {
    pub color: String,
    pub bg_color: String,
    pub border_color: String,
    pub icon: String,
    pub response_time: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

/// A reading outside its expected range that was classified anyway.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangeFlag {
    pub field: String,
    pub value: f64,
    pub min: f64,
    pub max: f64,
    pub unit: String,
}

/// Full result of classifying one input for one condition family.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriageAssessment {
    pub family: ConditionFamily,
    pub category: String,
    pub priority: TriagePriority,
    /// Informational only; never feeds the priority.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtype: Option<String>,
    pub pathway: CarePathway,
    pub display: TriageDisplay,
    pub description: String,
    pub recommendations: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub infection_risk: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub flags: Vec<RangeFlag>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prediction: Option<MlPrediction>,
}

// ---------------------------------------------------------------------------
// TriageError
// ---------------------------------------------------------------------------

#[derive(Error, Debug)]
pub enum TriageError {
    #[error("Missing value for {field}")]
    MissingValue { field: String },

    #[error("Invalid numeric value for {field}: {value}")]
    InvalidNumber { field: String, value: String },

    #[error("{field} value {value} is outside the valid range [{min}, {max}]")]
    OutOfRange {
        field: String,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("Invalid code for {field}: {value}")]
    InvalidCode { field: String, value: String },

    #[error("Invalid enum value for {field}: {value}")]
    InvalidEnum { field: String, value: String },

    #[error("Expected a JSON object for {0}")]
    NotAnObject(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

// ---------------------------------------------------------------------------
// ConditionClassifier trait
// ---------------------------------------------------------------------------

/// One condition family: raw form → typed input → assessment.
pub trait ConditionClassifier {
    type Input;

    fn family(&self) -> ConditionFamily;

    /// Read this family's fields from a raw form payload.
    fn parse_form(&self, form: &FormValues) -> Result<Self::Input, TriageError>;

    /// Validate and classify. Never fails for in-domain input.
    fn assess(
        &self,
        input: &Self::Input,
        prediction: Option<&MlPrediction>,
    ) -> Result<TriageAssessment, TriageError>;
}
