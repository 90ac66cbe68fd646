//! Cardiac: heart disease subtype, triage priority and care pathway.
//!
//! The category reported for this family is the subtype label. Priority uses
//! the chest pain code, exercise angina, resting BP and the external model's
//! severity / risk probability.

use serde::{Deserialize, Serialize};

use super::rules::RuleChain;
use super::types::{
    table_entry, CarePathway, ConditionClassifier, ConditionFamily, DisplayEntry, PathwayEntry,
    RangeFlag, TriageAssessment, TriageDisplay, TriageError, TriagePriority,
};
use super::validation::{
    require_finite, require_flag, RangePolicy, AGE, CHOLESTEROL, MAX_HEART_RATE, RESTING_BP,
};
use crate::models::{FormValues, MlPrediction, ReportedSeverity, Sex};

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// Form coding 0–3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChestPainType {
    TypicalAngina,
    AtypicalAngina,
    NonAnginalPain,
    Asymptomatic,
}

impl ChestPainType {
    pub fn from_code(code: f64) -> Result<Self, TriageError> {
        let code = require_finite("chest_pain", code)?;
        match code {
            c if c == 0.0 => Ok(Self::TypicalAngina),
            c if c == 1.0 => Ok(Self::AtypicalAngina),
            c if c == 2.0 => Ok(Self::NonAnginalPain),
            c if c == 3.0 => Ok(Self::Asymptomatic),
            _ => Err(TriageError::InvalidCode {
                field: "chest_pain".into(),
                value: code.to_string(),
            }),
        }
    }

    pub fn code(self) -> u8 {
        match self {
            Self::TypicalAngina => 0,
            Self::AtypicalAngina => 1,
            Self::NonAnginalPain => 2,
            Self::Asymptomatic => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::TypicalAngina => "Typical Angina",
            Self::AtypicalAngina => "Atypical Angina",
            Self::NonAnginalPain => "Non-Anginal Pain",
            Self::Asymptomatic => "Asymptomatic",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CardiacInput {
    pub age: f64,
    pub sex: Sex,
    pub chest_pain: ChestPainType,
    /// mmHg
    pub resting_bp: f64,
    /// mg/dL
    pub cholesterol: f64,
    pub diabetes: bool,
    /// bpm
    pub max_heart_rate: f64,
    pub exercise_angina: bool,
}

impl CardiacInput {
    pub fn from_form(form: &FormValues) -> Result<Self, TriageError> {
        Ok(Self {
            age: form.number(AGE.field)?,
            sex: Sex::from_code(require_flag("sex", form.number("sex")?)?),
            chest_pain: ChestPainType::from_code(form.number("chest_pain")?)?,
            resting_bp: form.number(RESTING_BP.field)?,
            cholesterol: form.number(CHOLESTEROL.field)?,
            diabetes: require_flag("diabetes", form.number("diabetes")?)?,
            max_heart_rate: form.number(MAX_HEART_RATE.field)?,
            exercise_angina: require_flag("exercise_angina", form.number("exercise_angina")?)?,
        })
    }

    fn validate(&self, policy: RangePolicy) -> Result<Vec<RangeFlag>, TriageError> {
        let mut flags = Vec::new();
        AGE.check(self.age, policy, &mut flags)?;
        RESTING_BP.check(self.resting_bp, policy, &mut flags)?;
        CHOLESTEROL.check(self.cholesterol, policy, &mut flags)?;
        MAX_HEART_RATE.check(self.max_heart_rate, policy, &mut flags)?;
        Ok(flags)
    }
}

// ---------------------------------------------------------------------------
// Subtype
// ---------------------------------------------------------------------------

/// Which chest pain code counts as "no chest pain" for the no-indicators rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnginaCoding {
    /// Code 0, as recorded in the published rule table.
    #[default]
    Recorded,
    /// Code 3, the form option meaning no chest pain.
    Asymptomatic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CardiacSubtype {
    NoIndicators,
    CoronaryArteryDisease,
    IschemicHeartDisease,
    HypertensiveHeartDisease,
    PossibleArrhythmia,
    AgeRelatedRisk,
    GeneralRisk,
}

impl CardiacSubtype {
    pub fn label(self) -> &'static str {
        match self {
            Self::NoIndicators => "No Significant Heart Disease Indicators",
            Self::CoronaryArteryDisease => "Coronary Artery Disease",
            Self::IschemicHeartDisease => "Ischemic Heart Disease",
            Self::HypertensiveHeartDisease => "Hypertensive Heart Disease",
            Self::PossibleArrhythmia => "Possible Arrhythmia",
            Self::AgeRelatedRisk => "Age-Related Cardiac Risk",
            Self::GeneralRisk => "General Cardiac Risk \u{2013} Further Tests Required",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::NoIndicators => {
                "Resting BP below 120 mmHg and cholesterol below 200 mg/dL without chest pain."
            }
            Self::CoronaryArteryDisease => "Cholesterol of 200 mg/dL or more with chest pain.",
            Self::IschemicHeartDisease => {
                "Exercise-induced angina with maximum heart rate below 120 bpm."
            }
            Self::HypertensiveHeartDisease => "Resting BP of 140 mmHg or more.",
            Self::PossibleArrhythmia => "Maximum heart rate above 180 or below 60 bpm.",
            Self::AgeRelatedRisk => "Age 65 or over.",
            Self::GeneralRisk => "No specific pattern matched; further testing required.",
        }
    }

    pub fn specific_advice(self) -> Option<&'static str> {
        match self {
            Self::CoronaryArteryDisease => Some("Coronary angiography may be indicated"),
            Self::PossibleArrhythmia => Some("Consider Holter monitor or event recorder"),
            Self::HypertensiveHeartDisease => {
                Some("Blood pressure control and monitoring essential")
            }
            _ => None,
        }
    }
}

fn subtype_chain(coding: AnginaCoding) -> RuleChain<CardiacInput, CardiacSubtype> {
    let no_indicators: fn(&CardiacInput) -> bool = match coding {
        AnginaCoding::Recorded => |v| {
            v.resting_bp < 120.0
                && v.cholesterol < 200.0
                && v.chest_pain == ChestPainType::TypicalAngina
        },
        AnginaCoding::Asymptomatic => |v| {
            v.resting_bp < 120.0
                && v.cholesterol < 200.0
                && v.chest_pain == ChestPainType::Asymptomatic
        },
    };

    RuleChain::<CardiacInput, CardiacSubtype>::new("cardiac_subtype", CardiacSubtype::GeneralRisk)
        .rule("C-S1", no_indicators, CardiacSubtype::NoIndicators)
        .rule(
            "C-S2",
            |v| v.cholesterol >= 200.0 && v.chest_pain.code() >= 1,
            CardiacSubtype::CoronaryArteryDisease,
        )
        .rule(
            "C-S3",
            |v| v.exercise_angina && v.max_heart_rate < 120.0,
            CardiacSubtype::IschemicHeartDisease,
        )
        .rule(
            "C-S4",
            |v| v.resting_bp >= 140.0,
            CardiacSubtype::HypertensiveHeartDisease,
        )
        .rule(
            "C-S5",
            |v| v.max_heart_rate > 180.0 || v.max_heart_rate < 60.0,
            CardiacSubtype::PossibleArrhythmia,
        )
        .rule("C-S6", |v| v.age >= 65.0, CardiacSubtype::AgeRelatedRisk)
}

pub fn detect_subtype(input: &CardiacInput, coding: AnginaCoding) -> CardiacSubtype {
    subtype_chain(coding).evaluate(input).outcome
}

// ---------------------------------------------------------------------------
// Priority
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CardiacFacts {
    pub chest_pain: ChestPainType,
    pub exercise_angina: bool,
    pub resting_bp: f64,
    pub severity: ReportedSeverity,
    /// Finite model probability, if any.
    pub risk: Option<f64>,
}

impl CardiacFacts {
    pub fn new(input: &CardiacInput, prediction: Option<&MlPrediction>) -> Self {
        Self {
            chest_pain: input.chest_pain,
            exercise_angina: input.exercise_angina,
            resting_bp: input.resting_bp,
            severity: prediction
                .map(MlPrediction::reported_severity)
                .unwrap_or_default(),
            risk: prediction.and_then(MlPrediction::risk),
        }
    }

    fn risk_at_least(&self, threshold: f64) -> bool {
        self.risk.is_some_and(|r| r >= threshold)
    }
}

fn priority_chain() -> RuleChain<CardiacFacts, TriagePriority> {
    RuleChain::<CardiacFacts, TriagePriority>::new("cardiac_priority", TriagePriority::NonUrgent)
        .rule(
            "C-P1",
            |f| f.chest_pain == ChestPainType::TypicalAngina && f.exercise_angina,
            TriagePriority::Resuscitation,
        )
        .rule("C-P2", |f| f.resting_bp >= 180.0, TriagePriority::Resuscitation)
        .rule(
            "C-P3",
            |f| f.severity == ReportedSeverity::Critical || f.risk_at_least(0.8),
            TriagePriority::Emergent,
        )
        .rule(
            "C-P4",
            |f| f.chest_pain == ChestPainType::TypicalAngina && !f.exercise_angina,
            TriagePriority::Emergent,
        )
        .rule(
            "C-P5",
            |f| f.severity == ReportedSeverity::High || f.risk_at_least(0.6),
            TriagePriority::Urgent,
        )
        .rule(
            "C-P6",
            |f| f.resting_bp >= 160.0 || f.resting_bp <= 90.0,
            TriagePriority::Urgent,
        )
        .rule(
            "C-P7",
            |f| f.severity == ReportedSeverity::Moderate || f.risk_at_least(0.4),
            TriagePriority::LessUrgent,
        )
}

pub fn triage_priority(facts: &CardiacFacts) -> TriagePriority {
    priority_chain().evaluate(facts).outcome
}

// ---------------------------------------------------------------------------
// Tables (ordered Resuscitation → Non-Urgent)
// ---------------------------------------------------------------------------

static PATHWAYS: [PathwayEntry; 5] = [
    PathwayEntry {
        actions: &[
            "CALL 911/112 IMMEDIATELY",
            "Give Aspirin 325mg if not allergic",
            "Lie patient flat, keep calm",
            "Notify cardiac emergency team",
        ],
        facility: "Cardiac Catheterization Lab - STEMI Center",
        transport: "Advanced Life Support Ambulance",
        team: "Interventional Cardiologist + Cardiac Team",
        tests: &["ECG", "Troponin", "Cardiac Catheterization"],
        medication: None,
        monitoring: None,
    },
    PathwayEntry {
        actions: &[
            "Go to Emergency Department NOW",
            "Take prescribed cardiac medications",
            "Call emergency contact",
            "Bring all medical records",
        ],
        facility: "Emergency Department - Cardiac Unit",
        transport: "Ambulance recommended",
        team: "Emergency Cardiologist + Nursing",
        tests: &["ECG", "Cardiac Enzymes", "Echocardiogram"],
        medication: None,
        monitoring: None,
    },
    PathwayEntry {
        actions: &[
            "Visit Cardiac Urgent Care",
            "Schedule same-day cardiology consult",
            "Monitor blood pressure hourly",
            "Continue prescribed medications",
        ],
        facility: "Cardiac Urgent Care or Emergency Department",
        transport: "Private vehicle with companion",
        team: "Cardiologist or Cardiac Specialist",
        tests: &["ECG", "Stress Test", "Holter Monitor"],
        medication: None,
        monitoring: None,
    },
    PathwayEntry {
        actions: &[
            "Schedule cardiology appointment within 48 hours",
            "Telehealth consultation available",
            "Document symptom patterns",
            "Review current medications with doctor",
        ],
        facility: "Cardiology Clinic or Hospital OPD",
        transport: "Private vehicle",
        team: "Cardiologist or Primary Care with Cardiac Focus",
        tests: &["ECG", "Blood Tests", "Cholesterol Panel"],
        medication: None,
        monitoring: None,
    },
    PathwayEntry {
        actions: &[
            "Schedule routine cardiology check-up",
            "Continue current care plan",
            "Follow-up if symptoms change",
            "Maintain heart-healthy lifestyle",
        ],
        facility: "Primary Care Clinic",
        transport: "Not urgent - schedule appointment",
        team: "Primary Care Physician",
        tests: &["Annual ECG", "Lipid Profile", "Blood Pressure Monitoring"],
        medication: None,
        monitoring: None,
    },
];

static DISPLAYS: [DisplayEntry; 5] = [
    DisplayEntry {
        response_time: "IMMEDIATE",
        description: "Acute Cardiac Emergency - STEMI/Unstable Angina",
        warning: Some("Cardiac Arrest Risk"),
    },
    DisplayEntry {
        response_time: "< 15 minutes",
        description: "Potential Acute Coronary Syndrome",
        warning: Some("Possible Heart Attack"),
    },
    DisplayEntry {
        response_time: "< 60 minutes",
        description: "Unstable Cardiac Condition",
        warning: Some("Monitor for Chest Pain"),
    },
    DisplayEntry {
        response_time: "1-2 hours",
        description: "Stable Cardiac Symptoms",
        warning: Some("Needs Cardiac Workup"),
    },
    DisplayEntry {
        response_time: "2-4 hours or Primary Care",
        description: "Low-Risk Cardiac Assessment",
        warning: Some("Routine Follow-up"),
    },
];

pub fn pathway(priority: TriagePriority, subtype: CardiacSubtype) -> CarePathway {
    let mut pathway = table_entry(&PATHWAYS, priority).to_pathway();
    pathway.specific_advice = subtype.specific_advice().map(str::to_string);
    pathway
}

pub fn pathway_for_key(key: &str, subtype: CardiacSubtype) -> CarePathway {
    pathway(TriagePriority::from_label_or_default(key), subtype)
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

#[derive(Debug, Clone, Copy)]
pub struct CardiacClassifier {
    pub angina_coding: AnginaCoding,
    pub range_policy: RangePolicy,
}

impl Default for CardiacClassifier {
    fn default() -> Self {
        Self {
            angina_coding: AnginaCoding::default(),
            range_policy: RangePolicy::Flag,
        }
    }
}

impl ConditionClassifier for CardiacClassifier {
    type Input = CardiacInput;

    fn family(&self) -> ConditionFamily {
        ConditionFamily::Cardiac
    }

    fn parse_form(&self, form: &FormValues) -> Result<Self::Input, TriageError> {
        CardiacInput::from_form(form)
    }

    fn assess(
        &self,
        input: &CardiacInput,
        prediction: Option<&MlPrediction>,
    ) -> Result<TriageAssessment, TriageError> {
        let flags = input.validate(self.range_policy)?;
        let subtype = detect_subtype(input, self.angina_coding);
        let priority = triage_priority(&CardiacFacts::new(input, prediction));

        Ok(TriageAssessment {
            family: self.family(),
            category: subtype.label().to_string(),
            priority,
            subtype: Some(subtype.label().to_string()),
            pathway: pathway(priority, subtype),
            display: display(priority),
            description: subtype.description().to_string(),
            recommendations: Vec::new(),
            infection_risk: None,
            flags,
            prediction: prediction.cloned(),
        })
    }
}
