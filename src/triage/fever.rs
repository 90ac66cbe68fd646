//! Fever / infection: temperature category, triage priority, infection risk.
//!
//! Temperature has a hard domain of 30–45 °C. Readings outside it are
//! rejected rather than flagged, whatever the engine's range policy.

use serde::{Deserialize, Serialize};

use super::rules::RuleChain;
use super::types::{
    table_entry, CarePathway, ConditionClassifier, ConditionFamily, DisplayEntry, PathwayEntry,
    TriageAssessment, TriageDisplay, TriageError, TriagePriority,
};
use super::validation::{RangePolicy, TEMPERATURE};
use crate::models::{FormValues, MlPrediction};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeverInput {
    /// °C
    pub temperature: f64,
}

impl FeverInput {
    pub fn new(temperature: f64) -> Self {
        Self { temperature }
    }

    pub fn from_form(form: &FormValues) -> Result<Self, TriageError> {
        Ok(Self {
            temperature: form.number(TEMPERATURE.field)?,
        })
    }

    fn validate(&self) -> Result<(), TriageError> {
        TEMPERATURE.check(self.temperature, RangePolicy::Reject, &mut Vec::new())?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Category
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FeverCategory {
    #[serde(rename = "Severe Hypothermia")]
    SevereHypothermia,
    #[serde(rename = "Mild Hypothermia")]
    MildHypothermia,
    Normal,
    #[serde(rename = "Low-Grade Fever")]
    LowGradeFever,
    #[serde(rename = "Mild Fever")]
    MildFever,
    #[serde(rename = "Moderate Fever")]
    ModerateFever,
    #[serde(rename = "High Fever")]
    HighFever,
    #[serde(rename = "Critical Fever")]
    CriticalFever,
    Unknown,
}

impl FeverCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SevereHypothermia => "Severe Hypothermia",
            Self::MildHypothermia => "Mild Hypothermia",
            Self::Normal => "Normal",
            Self::LowGradeFever => "Low-Grade Fever",
            Self::MildFever => "Mild Fever",
            Self::ModerateFever => "Moderate Fever",
            Self::HighFever => "High Fever",
            Self::CriticalFever => "Critical Fever",
            Self::Unknown => "Unknown",
        }
    }

    pub fn infection_risk(self) -> InfectionRisk {
        match self {
            Self::Normal | Self::MildHypothermia => InfectionRisk::Low,
            Self::LowGradeFever => InfectionRisk::LowToModerate,
            Self::MildFever | Self::SevereHypothermia => InfectionRisk::Moderate,
            Self::ModerateFever => InfectionRisk::High,
            Self::HighFever => InfectionRisk::VeryHigh,
            Self::CriticalFever => InfectionRisk::Critical,
            Self::Unknown => InfectionRisk::Unknown,
        }
    }

    pub fn describe(self, temperature: f64) -> String {
        let t = temperature;
        match self {
            Self::Normal => format!("Your temperature of {t}°C is within the normal range."),
            Self::LowGradeFever => format!(
                "Temperature of {t}°C indicates low-grade fever. Monitor for other symptoms."
            ),
            Self::MildFever => format!("{t}°C suggests mild fever. Rest and stay hydrated."),
            Self::ModerateFever => {
                format!("{t}°C indicates moderate fever. Consider medical consultation.")
            }
            Self::HighFever => format!("{t}°C is high fever. Seek medical attention."),
            Self::CriticalFever => format!("{t}°C is critical. Urgent medical care required."),
            Self::MildHypothermia => format!("{t}°C is below normal. Keep warm and monitor."),
            Self::SevereHypothermia => {
                format!("{t}°C indicates severe hypothermia. Emergency care needed.")
            }
            Self::Unknown => {
                "Please consult with a healthcare professional for accurate assessment."
                    .to_string()
            }
        }
    }

    pub fn recommendations(self) -> &'static [&'static str] {
        match self {
            Self::Normal => &[
                "Maintain normal hydration",
                "Continue regular activities",
                "Routine temperature checks",
            ],
            Self::LowGradeFever => &[
                "Increase fluid intake",
                "Rest and monitor symptoms",
                "Check temperature every 4-6 hours",
            ],
            Self::MildFever => &[
                "Rest adequately",
                "Stay hydrated",
                "Consider fever reducers if advised",
                "Monitor closely",
            ],
            Self::ModerateFever => &[
                "Consult healthcare provider",
                "Regular temperature monitoring",
                "Proper hydration",
                "Avoid strenuous activities",
            ],
            Self::HighFever => &[
                "Seek medical attention",
                "Use fever medication as directed",
                "Cool compress application",
                "Emergency contact ready",
            ],
            Self::CriticalFever => &[
                "Call emergency services",
                "Do not delay treatment",
                "Cool environment",
                "Hospital care required",
            ],
            Self::MildHypothermia => &[
                "Warm clothing and blankets",
                "Warm drinks",
                "Avoid alcohol",
                "Monitor temperature",
            ],
            Self::SevereHypothermia => &[
                "Call emergency services immediately",
                "Handle gently",
                "Warm center first",
                "Hospital care required",
            ],
            Self::Unknown => &["Consult healthcare professional"],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InfectionRisk {
    Low,
    #[serde(rename = "Low to Moderate")]
    LowToModerate,
    Moderate,
    High,
    #[serde(rename = "Very High")]
    VeryHigh,
    Critical,
    Unknown,
}

impl InfectionRisk {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::LowToModerate => "Low to Moderate",
            Self::Moderate => "Moderate",
            Self::High => "High",
            Self::VeryHigh => "Very High",
            Self::Critical => "Critical",
            Self::Unknown => "Unknown",
        }
    }
}

fn category_chain() -> RuleChain<f64, FeverCategory> {
    RuleChain::<f64, FeverCategory>::new("fever_category", FeverCategory::Unknown)
        .rule("F-C1", |t| *t < 35.0, FeverCategory::SevereHypothermia)
        .rule("F-C2", |t| *t < 36.0, FeverCategory::MildHypothermia)
        .rule("F-C3", |t| *t < 37.2, FeverCategory::Normal)
        .rule("F-C4", |t| *t < 38.0, FeverCategory::LowGradeFever)
        .rule("F-C5", |t| *t < 38.9, FeverCategory::MildFever)
        .rule("F-C6", |t| *t < 39.4, FeverCategory::ModerateFever)
        .rule("F-C7", |t| *t < 40.0, FeverCategory::HighFever)
        .rule("F-C8", |t| *t >= 40.0, FeverCategory::CriticalFever)
}

pub fn classify(temperature: f64) -> FeverCategory {
    category_chain().evaluate(&temperature).outcome
}

// ---------------------------------------------------------------------------
// Priority
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeverFacts {
    pub temperature: f64,
    pub category: FeverCategory,
}

fn priority_chain() -> RuleChain<FeverFacts, TriagePriority> {
    use FeverCategory as C;

    RuleChain::<FeverFacts, TriagePriority>::new("fever_priority", TriagePriority::Urgent)
        .rule(
            "F-P1",
            |f| f.category == C::CriticalFever || f.temperature >= 40.5,
            TriagePriority::Resuscitation,
        )
        .rule(
            "F-P2",
            |f| f.category == C::HighFever || f.temperature >= 39.5,
            TriagePriority::Emergent,
        )
        .rule(
            "F-P3",
            |f| f.category == C::ModerateFever,
            TriagePriority::Urgent,
        )
        .rule(
            "F-P4",
            |f| matches!(f.category, C::MildFever | C::LowGradeFever),
            TriagePriority::LessUrgent,
        )
        .rule(
            "F-P5",
            |f| f.category == C::SevereHypothermia,
            TriagePriority::Emergent,
        )
        .rule(
            "F-P6",
            |f| f.category == C::MildHypothermia,
            TriagePriority::Urgent,
        )
        .rule("F-P7", |f| f.category == C::Normal, TriagePriority::NonUrgent)
}

pub fn triage_priority(temperature: f64, category: FeverCategory) -> TriagePriority {
    priority_chain()
        .evaluate(&FeverFacts {
            temperature,
            category,
        })
        .outcome
}

// ---------------------------------------------------------------------------
// Tables (ordered Resuscitation → Non-Urgent)
// ---------------------------------------------------------------------------

static PATHWAYS: [PathwayEntry; 5] = [
    PathwayEntry {
        actions: &[
            "Call Emergency Services (911/112)",
            "Prepare for hospital admission",
            "Gather medical history and medications",
            "Monitor vital signs continuously",
        ],
        facility: "Emergency Department - Resuscitation Room",
        transport: "Ambulance with paramedics",
        team: "Emergency Physician + Critical Care Team",
        tests: &[],
        medication: None,
        monitoring: None,
    },
    PathwayEntry {
        actions: &[
            "Go to Emergency Department now",
            "Notify emergency contact",
            "Bring identification and insurance",
            "Take current medications with you",
        ],
        facility: "Emergency Department - Acute Care",
        transport: "Ambulance or private vehicle if stable",
        team: "Emergency Physician + Nursing Staff",
        tests: &[],
        medication: None,
        monitoring: None,
    },
    PathwayEntry {
        actions: &[
            "Visit Urgent Care Center",
            "Schedule same-day appointment if available",
            "Monitor symptoms every 2 hours",
            "Maintain hydration",
        ],
        facility: "Urgent Care or Emergency Department",
        transport: "Private vehicle",
        team: "Urgent Care Physician",
        tests: &[],
        medication: None,
        monitoring: None,
    },
    PathwayEntry {
        actions: &[
            "Schedule doctor appointment within 24 hours",
            "Consider telemedicine consultation",
            "Track symptom progression",
            "Use over-the-counter relief as directed",
        ],
        facility: "Primary Care Clinic",
        transport: "Private vehicle or public transport",
        team: "Primary Care Physician",
        tests: &[],
        medication: None,
        monitoring: None,
    },
    PathwayEntry {
        actions: &[
            "Schedule routine appointment",
            "Home care with monitoring",
            "Follow-up if symptoms worsen",
            "Rest and maintain normal activities",
        ],
        facility: "Primary Care Clinic or Telehealth",
        transport: "Not required immediately",
        team: "Primary Care Physician or Nurse",
        tests: &[],
        medication: None,
        monitoring: None,
    },
];

static DISPLAYS: [DisplayEntry; 5] = [
    DisplayEntry {
        response_time: "IMMEDIATE",
        description: "Life-threatening condition",
        warning: None,
    },
    DisplayEntry {
        response_time: "< 15 minutes",
        description: "Potentially life-threatening",
        warning: None,
    },
    DisplayEntry {
        response_time: "< 60 minutes",
        description: "Serious but not immediately life-threatening",
        warning: None,
    },
    DisplayEntry {
        response_time: "1-2 hours",
        description: "Requires medical evaluation",
        warning: None,
    },
    DisplayEntry {
        response_time: "2-4 hours or primary care",
        description: "Routine care recommended",
        warning: None,
    },
];

pub fn pathway(priority: TriagePriority) -> CarePathway {
    table_entry(&PATHWAYS, priority).to_pathway()
}

pub fn pathway_for_key(key: &str) -> CarePathway {
    pathway(TriagePriority::from_label_or_default(key))
}

pub fn display(priority: TriagePriority) -> TriageDisplay {
    table_entry(&DISPLAYS, priority).to_display(priority)
}

pub fn display_for_key(key: &str) -> TriageDisplay {
    display(TriagePriority::from_label_or_default(key))
}

// ---------------------------------------------------------------------------
// Classifier
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default)]
pub struct FeverClassifier;

impl ConditionClassifier for FeverClassifier {
    type Input = FeverInput;

    fn family(&self) -> ConditionFamily {
        ConditionFamily::Fever
    }

    fn parse_form(&self, form: &FormValues) -> Result<Self::Input, TriageError> {
        FeverInput::from_form(form)
    }

    fn assess(
        &self,
        input: &FeverInput,
        prediction: Option<&MlPrediction>,
    ) -> Result<TriageAssessment, TriageError> {
        input.validate()?;
        let category = classify(input.temperature);
        let priority = triage_priority(input.temperature, category);

        Ok(TriageAssessment {
            family: self.family(),
            category: category.as_str().to_string(),
            priority,
            subtype: None,
            pathway: pathway(priority),
            display: display(priority),
            description: category.describe(input.temperature),
            recommendations: category
                .recommendations()
                .iter()
                .map(|r| r.to_string())
                .collect(),
            infection_risk: Some(category.infection_risk().as_str().to_string()),
            flags: Vec::new(),
            prediction: prediction.cloned(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assess(temperature: f64) -> Result<TriageAssessment, TriageError> {
        FeverClassifier.assess(&FeverInput::new(temperature), None)
    }

    #[test]
    fn category_boundaries() {
        let cases = [
            (30.0, FeverCategory::SevereHypothermia),
            (34.9, FeverCategory::SevereHypothermia),
            (35.0, FeverCategory::MildHypothermia),
            (36.0, FeverCategory::Normal),
            (37.1, FeverCategory::Normal),
            (37.2, FeverCategory::LowGradeFever),
            (38.0, FeverCategory::MildFever),
            (38.9, FeverCategory::ModerateFever),
            (39.4, FeverCategory::HighFever),
            (40.0, FeverCategory::CriticalFever),
            (45.0, FeverCategory::CriticalFever),
        ];
        for (t, expected) in cases {
            assert_eq!(classify(t), expected, "temperature={t}");
        }
    }

    #[test]
    fn normal_temperature_is_non_urgent() {
        let a = assess(37.0).unwrap();
        assert_eq!(a.category, "Normal");
        assert_eq!(a.priority, TriagePriority::NonUrgent);
        assert_eq!(a.infection_risk.as_deref(), Some("Low"));
        assert_eq!(
            a.description,
            "Your temperature of 37°C is within the normal range."
        );
    }

    #[test]
    fn critical_fever_is_resuscitation() {
        let a = assess(40.6).unwrap();
        assert_eq!(a.category, "Critical Fever");
        assert_eq!(a.priority, TriagePriority::Resuscitation);
        assert_eq!(a.infection_risk.as_deref(), Some("Critical"));
        assert_eq!(a.pathway.transport, "Ambulance with paramedics");
    }

    #[test]
    fn priority_per_category() {
        let cases = [
            (34.0, TriagePriority::Emergent),
            (35.5, TriagePriority::Urgent),
            (36.8, TriagePriority::NonUrgent),
            (37.5, TriagePriority::LessUrgent),
            (38.5, TriagePriority::LessUrgent),
            (39.0, TriagePriority::Urgent),
            (39.6, TriagePriority::Emergent),
            (40.2, TriagePriority::Resuscitation),
        ];
        for (t, expected) in cases {
            assert_eq!(triage_priority(t, classify(t)), expected, "temperature={t}");
        }
    }

    #[test]
    fn temperature_threshold_overrides_category() {
        assert_eq!(
            triage_priority(40.5, FeverCategory::MildFever),
            TriagePriority::Resuscitation
        );
        assert_eq!(
            triage_priority(39.5, FeverCategory::Normal),
            TriagePriority::Emergent
        );
    }

    #[test]
    fn unknown_category_falls_back_to_urgent() {
        assert_eq!(
            triage_priority(37.0, FeverCategory::Unknown),
            TriagePriority::Urgent
        );
        assert_eq!(classify(f64::NAN), FeverCategory::Unknown);
    }

    #[test]
    fn infection_risk_table() {
        assert_eq!(
            FeverCategory::LowGradeFever.infection_risk().as_str(),
            "Low to Moderate"
        );
        assert_eq!(
            FeverCategory::SevereHypothermia.infection_risk(),
            InfectionRisk::Moderate
        );
        assert_eq!(FeverCategory::HighFever.infection_risk().as_str(), "Very High");
    }

    #[test]
    fn out_of_domain_temperature_is_rejected() {
        for t in [29.9, 45.1, 98.6] {
            let err = assess(t).unwrap_err();
            assert!(matches!(err, TriageError::OutOfRange { .. }), "temperature={t}");
        }
    }

    #[test]
    fn nan_temperature_is_invalid() {
        let err = assess(f64::NAN).unwrap_err();
        assert!(matches!(err, TriageError::InvalidNumber { .. }));
    }

    #[test]
    fn fever_displays_have_no_warning() {
        for p in TriagePriority::ALL {
            assert!(display(p).warning.is_none());
        }
        assert_eq!(display_for_key("nope").response_time, "< 60 minutes");
    }

    #[test]
    fn recommendations_follow_category() {
        let a = assess(39.8).unwrap();
        assert_eq!(a.category, "High Fever");
        assert_eq!(a.recommendations[0], "Seek medical attention");
        assert_eq!(
            FeverCategory::Unknown.recommendations(),
            &["Consult healthcare professional"]
        );
    }

    #[test]
    fn parses_numeric_string_from_form() {
        let form = FormValues::from_json(r#"{"temperature": "38.2"}"#).unwrap();
        let input = FeverClassifier.parse_form(&form).unwrap();
        assert_eq!(input.temperature, 38.2);
    }
}
