//! Diabetes: glucose status, subtype, triage priority and care pathway.
//!
//! Subtype is informational and never feeds the priority. The priority chain
//! also reads the external model's reported severity ("Critical", "High",
//! "Medium"). Pathway actions for the two most severe tiers switch to the
//! hypoglycemia set below 70 mg/dL.

use serde::{Deserialize, Serialize};

use super::rules::RuleChain;
use super::types::{
    table_entry, CarePathway, ConditionClassifier, ConditionFamily, DisplayEntry, PathwayEntry,
    RangeFlag, TriageAssessment, TriageDisplay, TriageError, TriagePriority,
};
use super::validation::{RangePolicy, AGE, BLOOD_PRESSURE, BMI, GLUCOSE, PREGNANCIES};
use crate::models::{FormValues, MlPrediction, ReportedSeverity};

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DiabetesInput {
    pub pregnancies: f64,
    /// mg/dL
    pub glucose: f64,
    /// mmHg
    pub blood_pressure: f64,
    pub bmi: f64,
    pub age: f64,
}

impl DiabetesInput {
    pub fn from_form(form: &FormValues) -> Result<Self, TriageError> {
        Ok(Self {
            pregnancies: form.number(PREGNANCIES.field)?,
            glucose: form.number(GLUCOSE.field)?,
            blood_pressure: form.number(BLOOD_PRESSURE.field)?,
            bmi: form.number(BMI.field)?,
            age: form.number(AGE.field)?,
        })
    }

    fn validate(&self, policy: RangePolicy) -> Result<Vec<RangeFlag>, TriageError> {
        let mut flags = Vec::new();
        PREGNANCIES.check(self.pregnancies, policy, &mut flags)?;
        GLUCOSE.check(self.glucose, policy, &mut flags)?;
        BLOOD_PRESSURE.check(self.blood_pressure, policy, &mut flags)?;
        BMI.check(self.bmi, policy, &mut flags)?;
        AGE.check(self.age, policy, &mut flags)?;
        Ok(flags)
    }
}

// ---------------------------------------------------------------------------
// Glucose status (severity category)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GlucoseStatus {
    Hypoglycemia,
    Normal,
    #[serde(rename = "Pre-Diabetes")]
    PreDiabetes,
    Diabetes,
    #[serde(rename = "Severe Hyperglycemia")]
    SevereHyperglycemia,
}

impl GlucoseStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Hypoglycemia => "Hypoglycemia",
            Self::Normal => "Normal",
            Self::PreDiabetes => "Pre-Diabetes",
            Self::Diabetes => "Diabetes",
            Self::SevereHyperglycemia => "Severe Hyperglycemia",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::Hypoglycemia => "Blood glucose is below 70 mg/dL.",
            Self::Normal => "Blood glucose is within 70-110 mg/dL.",
            Self::PreDiabetes => "Blood glucose is in the pre-diabetes band (111-125 mg/dL).",
            Self::Diabetes => "Blood glucose is in the diabetic band (126-180 mg/dL).",
            Self::SevereHyperglycemia => "Blood glucose is above 180 mg/dL.",
        }
    }
}

fn status_chain() -> RuleChain<f64, GlucoseStatus> {
    RuleChain::<f64, GlucoseStatus>::new("glucose_status", GlucoseStatus::SevereHyperglycemia)
        .rule("G-1", |g| *g < 70.0, GlucoseStatus::Hypoglycemia)
        .rule("G-2", |g| *g <= 110.0, GlucoseStatus::Normal)
        .rule("G-3", |g| *g <= 125.0, GlucoseStatus::PreDiabetes)
        .rule("G-4", |g| *g <= 180.0, GlucoseStatus::Diabetes)
}

pub fn glucose_status(glucose: f64) -> GlucoseStatus {
    status_chain().evaluate(&glucose).outcome
}

/// Which pathway action set applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GlycemicState {
    /// Below 70 mg/dL.
    Hypoglycemic,
    /// Above 180 mg/dL.
    Hyperglycemic,
    InRange,
}

pub fn glycemic_state(glucose: f64) -> GlycemicState {
    if glucose < 70.0 {
        GlycemicState::Hypoglycemic
    } else if glucose > 180.0 {
        GlycemicState::Hyperglycemic
    } else {
        GlycemicState::InRange
    }
}

// ---------------------------------------------------------------------------
// Subtype
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiabetesSubtype {
    NonDiabetic,
    Gestational,
    Type1,
    Type2,
    ElevatedElderly,
    LikelyDiabetes,
    NeedsReview,
}

impl DiabetesSubtype {
    pub fn label(self) -> &'static str {
        match self {
            Self::NonDiabetic => "Normal Blood Glucose (Non-Diabetic)",
            Self::Gestational => "Gestational Diabetes",
            Self::Type1 => "Type 1 Diabetes",
            Self::Type2 => "Type 2 Diabetes",
            Self::ElevatedElderly => "Elevated Blood Glucose (Elderly \u{2013} Monitor Closely)",
            Self::LikelyDiabetes => {
                "Diabetes Likely (Random \u{2265}200 mg/dL \u{2013} Needs Clinical Confirmation)"
            }
            Self::NeedsReview => {
                "Glucose Outside Standard Ranges \u{2013} Clinical Review Required"
            }
        }
    }

    pub fn specific_advice(self) -> Option<&'static str> {
        match self {
            Self::Type1 => Some("Monitor for ketones, insulin adjustment required"),
            Self::Gestational => Some("Obstetric-endocrinology consultation recommended"),
            Self::Type2 => Some("Lifestyle modification and oral agents first-line"),
            _ => None,
        }
    }
}

fn subtype_chain() -> RuleChain<DiabetesInput, DiabetesSubtype> {
    RuleChain::<DiabetesInput, DiabetesSubtype>::new(
        "diabetes_subtype",
        DiabetesSubtype::NeedsReview,
    )
    .rule(
        "D-S1",
        |v| v.glucose >= 70.0 && v.glucose <= 110.0,
        DiabetesSubtype::NonDiabetic,
    )
    .rule(
        "D-S2",
        |v| {
            v.pregnancies > 0.0
                && v.age >= 18.0
                && v.age <= 45.0
                && v.glucose >= 95.0
                && v.glucose < 140.0
        },
        DiabetesSubtype::Gestational,
    )
    .rule(
        "D-S3",
        |v| v.age <= 30.0 && v.glucose >= 180.0 && v.bmi < 25.0,
        DiabetesSubtype::Type1,
    )
    .rule(
        "D-S4",
        |v| v.age > 30.0 && v.glucose >= 140.0,
        DiabetesSubtype::Type2,
    )
    // Shadowed by D-S4 for every input; kept so the table matches the
    // published rule order.
    .rule(
        "D-S5",
        |v| v.age >= 65.0 && v.glucose >= 180.0 && v.glucose <= 200.0,
        DiabetesSubtype::ElevatedElderly,
    )
    .rule("D-S6", |v| v.glucose >= 200.0, DiabetesSubtype::LikelyDiabetes)
}

pub fn detect_subtype(input: &DiabetesInput) -> DiabetesSubtype {
    subtype_chain().evaluate(input).outcome
}

// ---------------------------------------------------------------------------
// Priority
// ---------------------------------------------------------------------------

/// Everything the priority chain reads.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiabetesFacts {
    pub glucose: f64,
    pub blood_pressure: f64,
    pub age: f64,
    pub severity: ReportedSeverity,
}

impl DiabetesFacts {
    pub fn new(input: &DiabetesInput, prediction: Option<&MlPrediction>) -> Self {
        Self {
            glucose: input.glucose,
            blood_pressure: input.blood_pressure,
            age: input.age,
            severity: prediction
                .map(MlPrediction::reported_severity)
                .unwrap_or_default(),
        }
    }
}

fn priority_chain() -> RuleChain<DiabetesFacts, TriagePriority> {
    RuleChain::<DiabetesFacts, TriagePriority>::new(
        "diabetes_priority",
        TriagePriority::NonUrgent,
    )
    // Hyperosmolar state / severe hypoglycemia / diabetic crisis
    .rule("D-P1", |f| f.glucose >= 400.0, TriagePriority::Resuscitation)
    .rule("D-P2", |f| f.glucose <= 54.0, TriagePriority::Resuscitation)
    .rule(
        "D-P3",
        |f| f.glucose >= 250.0 && f.blood_pressure >= 180.0,
        TriagePriority::Resuscitation,
    )
    .rule("D-P4", |f| f.glucose >= 300.0, TriagePriority::Emergent)
    .rule("D-P5", |f| f.glucose <= 70.0, TriagePriority::Emergent)
    .rule(
        "D-P6",
        |f| f.severity == ReportedSeverity::Critical,
        TriagePriority::Emergent,
    )
    .rule(
        "D-P7",
        |f| f.glucose >= 200.0 || f.glucose <= 80.0,
        TriagePriority::Urgent,
    )
    .rule(
        "D-P8",
        |f| f.severity == ReportedSeverity::High,
        TriagePriority::Urgent,
    )
    .rule("D-P9", |f| f.blood_pressure >= 140.0, TriagePriority::Urgent)
    .rule(
        "D-P10",
        |f| f.glucose >= 140.0 || f.glucose <= 90.0,
        TriagePriority::LessUrgent,
    )
    .rule(
        "D-P11",
        |f| f.severity == ReportedSeverity::Medium,
        TriagePriority::LessUrgent,
    )
    .rule(
        "D-P12",
        |f| f.age >= 65.0 && f.glucose >= 130.0,
        TriagePriority::LessUrgent,
    )
}

pub fn triage_priority(facts: &DiabetesFacts) -> TriagePriority {
    priority_chain().evaluate(facts).outcome
}

// ---------------------------------------------------------------------------
// Pathway & display tables (ordered Resuscitation → Non-Urgent)
// ---------------------------------------------------------------------------

static PATHWAYS: [PathwayEntry; 5] = [
    PathwayEntry {
        actions: &[
            "CALL 911/112 IMMEDIATELY",
            "Drink water if conscious and able",
            "Check ketones if Type 1 diabetes",
            "Prepare for ICU admission",
        ],
        facility: "Emergency Department - Metabolic ICU",
        transport: "Advanced Life Support Ambulance",
        team: "Endocrinologist + Critical Care Team",
        tests: &["Blood Glucose", "Ketones", "Electrolytes", "ABG"],
        medication: Some("IV Insulin + Fluids"),
        monitoring: None,
    },
    PathwayEntry {
        actions: &[
            "Go to Emergency Department NOW",
            "Hydrate with water",
            "Take prescribed insulin if Type 1",
            "Bring glucose logs and medications",
        ],
        facility: "Emergency Department - Medical Unit",
        transport: "Ambulance recommended",
        team: "Emergency Physician + Endocrinology Consult",
        tests: &["Blood Glucose", "HbA1c", "Renal Function", "CBC"],
        medication: Some("IV/SubQ Insulin"),
        monitoring: None,
    },
    PathwayEntry {
        actions: &[
            "Visit Urgent Care or Diabetes Clinic",
            "Schedule same-day endocrinology consult",
            "Monitor glucose every 2-4 hours",
            "Adjust medications per doctor's advice",
        ],
        facility: "Diabetes Clinic or Hospital OPD",
        transport: "Private vehicle with companion",
        team: "Endocrinologist or Diabetes Specialist",
        tests: &[
            "Fasting Glucose",
            "Postprandial Glucose",
            "HbA1c",
            "Lipid Profile",
        ],
        medication: Some("Oral Agents/Insulin Adjustment"),
        monitoring: None,
    },
    PathwayEntry {
        actions: &[
            "Schedule endocrinology appointment within 48 hours",
            "Telehealth diabetes consultation",
            "Start glucose monitoring log",
            "Begin diabetes education and diet planning",
        ],
        facility: "Endocrinology Clinic or Primary Care",
        transport: "Private vehicle",
        team: "Endocrinologist or Certified Diabetes Educator",
        tests: &[
            "HbA1c",
            "Fasting Lipid Panel",
            "Renal Function",
            "Urine Microalbumin",
        ],
        medication: Some("Initiate/Adjust Oral Hypoglycemics"),
        monitoring: None,
    },
    PathwayEntry {
        actions: &[
            "Schedule routine diabetes screening",
            "Continue current management plan",
            "Annual diabetes follow-up",
            "Maintain healthy lifestyle and diet",
        ],
        facility: "Primary Care Clinic",
        transport: "Not urgent - schedule appointment",
        team: "Primary Care Physician",
        tests: &[
            "Annual HbA1c",
            "Annual Foot Exam",
            "Annual Eye Exam",
            "Annual Renal Check",
        ],
        medication: Some("Routine medication management"),
        monitoring: None,
    },
];

/// Hypoglycemia variants of the Resuscitation and Emergent rows.
static HYPO_PATHWAYS: [PathwayEntry; 2] = [
    PathwayEntry {
        actions: &[
            "CALL 911/112 IMMEDIATELY",
            "If conscious, give 15g fast-acting carbs",
            "Do not attempt to walk or stand",
            "Notify emergency diabetes team",
        ],
        facility: "Emergency Department - Metabolic ICU",
        transport: "Advanced Life Support Ambulance",
        team: "Endocrinologist + Critical Care Team",
        tests: &["Blood Glucose", "Ketones", "Electrolytes", "ABG"],
        medication: Some("IV Dextrose/Glucagon"),
        monitoring: None,
    },
    PathwayEntry {
        actions: &[
            "Go to Emergency Department NOW",
            "Consume 15-20g fast-acting carbohydrates",
            "Call diabetes care team",
            "Re-check glucose in 15 minutes",
        ],
        facility: "Emergency Department - Medical Unit",
        transport: "Ambulance recommended",
        team: "Emergency Physician + Endocrinology Consult",
        tests: &["Blood Glucose", "HbA1c", "Renal Function", "CBC"],
        medication: Some("Oral Glucose/IV Dextrose"),
        monitoring: None,
    },
];

static DISPLAYS: [DisplayEntry; 5] = [
    DisplayEntry {
        response_time: "IMMEDIATE",
        description: "Metabolic Emergency - DKA/HHS/Severe Hypoglycemia",
        warning: Some("Life-Threatening Glucose Levels"),
    },
    DisplayEntry {
        response_time: "< 15 minutes",
        description: "Severe Hyperglycemia/Hypoglycemia",
        warning: Some("Risk of Metabolic Decompensation"),
    },
    DisplayEntry {
        response_time: "< 60 minutes",
        description: "Poor Glycemic Control",
        warning: Some("Needs Rapid Glucose Management"),
    },
    DisplayEntry {
        response_time: "24-48 hours",
        description: "Elevated Glucose - Needs Evaluation",
        warning: Some("Schedule Diabetes Consultation"),
    },
    DisplayEntry {
        response_time: "Primary Care Follow-up",
        description: "Stable Glycemic Status",
        warning: Some("Routine Diabetes Screening"),
    },
];

pub fn pathway(priority: TriagePriority, subtype: DiabetesSubtype, glucose: f64) -> CarePathway {
    let entry = match (priority, glycemic_state(glucose)) {
        (TriagePriority::Resuscitation, GlycemicState::Hypoglycemic) => &HYPO_PATHWAYS[0],
        (TriagePriority::Emergent, GlycemicState::Hypoglycemic) => &HYPO_PATHWAYS[1],
        _ => table_entry(&PATHWAYS, priority),
    };

    let mut pathway = entry.to_pathway();
    pathway.specific_advice = subtype.specific_advice().map(str::to_string);
    pathway
}

pub fn pathway_for_key(key: &str, subtype: DiabetesSubtype, glucose: f64) -> CarePathway {
    pathway(TriagePriority::from_label_or_default(key), subtype, glucose)
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
pub struct DiabetesClassifier {
    pub range_policy: RangePolicy,
}

impl Default for DiabetesClassifier {
    fn default() -> Self {
        Self {
            range_policy: RangePolicy::Flag,
        }
    }
}

impl ConditionClassifier for DiabetesClassifier {
    type Input = DiabetesInput;

    fn family(&self) -> ConditionFamily {
        ConditionFamily::Diabetes
    }

    fn parse_form(&self, form: &FormValues) -> Result<Self::Input, TriageError> {
        DiabetesInput::from_form(form)
    }

    fn assess(
        &self,
        input: &DiabetesInput,
        prediction: Option<&MlPrediction>,
    ) -> Result<TriageAssessment, TriageError> {
        let flags = input.validate(self.range_policy)?;
        let status = glucose_status(input.glucose);
        let subtype = detect_subtype(input);
        let priority = triage_priority(&DiabetesFacts::new(input, prediction));

        Ok(TriageAssessment {
            family: self.family(),
            category: status.as_str().to_string(),
            priority,
            subtype: Some(subtype.label().to_string()),
            pathway: pathway(priority, subtype, input.glucose),
            display: display(priority),
            description: status.description().to_string(),
            recommendations: Vec::new(),
            infection_risk: None,
            flags,
            prediction: prediction.cloned(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_input(glucose: f64) -> DiabetesInput {
        DiabetesInput {
            pregnancies: 0.0,
            glucose,
            blood_pressure: 80.0,
            bmi: 24.0,
            age: 40.0,
        }
    }

    fn facts(glucose: f64, blood_pressure: f64, age: f64, severity: &str) -> DiabetesFacts {
        DiabetesFacts {
            glucose,
            blood_pressure,
            age,
            severity: ReportedSeverity::parse(severity),
        }
    }

    fn prediction(severity: &str) -> MlPrediction {
        MlPrediction {
            disease: Some("diabetes".into()),
            severity: severity.into(),
            risk_probability: Some(0.5),
            confidence: 0.0,
        }
    }

    // ── Glucose status ─────────────────────────────────────────

    #[test]
    fn glucose_status_bands() {
        assert_eq!(glucose_status(65.0), GlucoseStatus::Hypoglycemia);
        assert_eq!(glucose_status(70.0), GlucoseStatus::Normal);
        assert_eq!(glucose_status(110.0), GlucoseStatus::Normal);
        assert_eq!(glucose_status(125.0), GlucoseStatus::PreDiabetes);
        assert_eq!(glucose_status(180.0), GlucoseStatus::Diabetes);
        assert_eq!(glucose_status(181.0), GlucoseStatus::SevereHyperglycemia);
    }

    // ── Subtype ────────────────────────────────────────────────

    #[test]
    fn normal_range_is_non_diabetic_regardless_of_demographics() {
        let mut input = make_input(100.0);
        input.pregnancies = 2.0;
        input.age = 28.0;
        assert_eq!(detect_subtype(&input), DiabetesSubtype::NonDiabetic);
    }

    #[test]
    fn pregnant_adult_with_mild_elevation_is_gestational() {
        let input = DiabetesInput {
            pregnancies: 1.0,
            glucose: 130.0,
            blood_pressure: 70.0,
            bmi: 27.0,
            age: 29.0,
        };
        assert_eq!(detect_subtype(&input), DiabetesSubtype::Gestational);
    }

    #[test]
    fn young_lean_high_glucose_is_type_1() {
        let input = DiabetesInput {
            pregnancies: 0.0,
            glucose: 250.0,
            blood_pressure: 70.0,
            bmi: 21.0,
            age: 19.0,
        };
        assert_eq!(detect_subtype(&input), DiabetesSubtype::Type1);
    }

    #[test]
    fn older_high_glucose_is_type_2() {
        let mut input = make_input(160.0);
        input.age = 55.0;
        assert_eq!(detect_subtype(&input), DiabetesSubtype::Type2);
    }

    #[test]
    fn elderly_band_is_shadowed_by_type_2() {
        let mut input = make_input(190.0);
        input.age = 70.0;
        assert_eq!(detect_subtype(&input), DiabetesSubtype::Type2);
    }

    #[test]
    fn young_heavy_very_high_glucose_needs_confirmation() {
        let input = DiabetesInput {
            pregnancies: 0.0,
            glucose: 240.0,
            blood_pressure: 70.0,
            bmi: 31.0,
            age: 25.0,
        };
        assert_eq!(detect_subtype(&input), DiabetesSubtype::LikelyDiabetes);
    }

    #[test]
    fn low_glucose_falls_to_review() {
        assert_eq!(detect_subtype(&make_input(60.0)), DiabetesSubtype::NeedsReview);
        let mut young = make_input(150.0);
        young.age = 25.0;
        assert_eq!(detect_subtype(&young), DiabetesSubtype::NeedsReview);
    }

    // ── Priority ───────────────────────────────────────────────

    #[test]
    fn glucose_450_is_resuscitation_regardless_of_other_fields() {
        for (bp, age, sev) in [(60.0, 20.0, "Low"), (200.0, 90.0, "Critical"), (0.0, 0.0, "")] {
            assert_eq!(
                triage_priority(&facts(450.0, bp, age, sev)),
                TriagePriority::Resuscitation
            );
        }
    }

    #[test]
    fn priority_chain_rules() {
        let cases = [
            (54.0, 80.0, 40.0, "Low", TriagePriority::Resuscitation),
            (260.0, 185.0, 40.0, "Low", TriagePriority::Resuscitation),
            (260.0, 120.0, 40.0, "Low", TriagePriority::Urgent),
            (300.0, 80.0, 40.0, "Low", TriagePriority::Emergent),
            (70.0, 80.0, 40.0, "Low", TriagePriority::Emergent),
            (100.0, 80.0, 40.0, "Critical", TriagePriority::Emergent),
            (80.0, 80.0, 40.0, "Low", TriagePriority::Urgent),
            (100.0, 80.0, 40.0, "High", TriagePriority::Urgent),
            (100.0, 145.0, 40.0, "Low", TriagePriority::Urgent),
            (150.0, 80.0, 40.0, "Low", TriagePriority::LessUrgent),
            (90.0, 80.0, 40.0, "Low", TriagePriority::LessUrgent),
            (100.0, 80.0, 40.0, "Medium", TriagePriority::LessUrgent),
            (130.0, 80.0, 70.0, "Low", TriagePriority::LessUrgent),
            (130.0, 80.0, 40.0, "Low", TriagePriority::NonUrgent),
            (100.0, 80.0, 40.0, "Moderate", TriagePriority::NonUrgent),
        ];
        for (g, bp, age, sev, expected) in cases {
            assert_eq!(
                triage_priority(&facts(g, bp, age, sev)),
                expected,
                "glucose={g} bp={bp} age={age} severity={sev}"
            );
        }
    }

    #[test]
    fn missing_prediction_means_no_severity_rules() {
        let f = DiabetesFacts::new(&make_input(100.0), None);
        assert_eq!(f.severity, ReportedSeverity::Other);
        assert_eq!(triage_priority(&f), TriagePriority::NonUrgent);
    }

    // ── Pathway ────────────────────────────────────────────────

    #[test]
    fn hypoglycemic_resuscitation_uses_carbohydrate_actions() {
        let p = pathway(TriagePriority::Resuscitation, DiabetesSubtype::NeedsReview, 50.0);
        assert!(p.actions.iter().any(|a| a.contains("fast-acting carbs")));
        assert_eq!(p.medication.as_deref(), Some("IV Dextrose/Glucagon"));
    }

    #[test]
    fn hyperglycemic_resuscitation_uses_insulin_and_fluids() {
        let p = pathway(TriagePriority::Resuscitation, DiabetesSubtype::Type2, 450.0);
        assert!(p.actions.iter().any(|a| a.contains("ICU admission")));
        assert_eq!(p.medication.as_deref(), Some("IV Insulin + Fluids"));
    }

    #[test]
    fn emergent_branches_on_hypoglycemia() {
        let hypo = pathway(TriagePriority::Emergent, DiabetesSubtype::NeedsReview, 65.0);
        let hyper = pathway(TriagePriority::Emergent, DiabetesSubtype::Type2, 320.0);
        assert_eq!(hypo.medication.as_deref(), Some("Oral Glucose/IV Dextrose"));
        assert_eq!(hyper.medication.as_deref(), Some("IV/SubQ Insulin"));
        assert_eq!(hypo.facility, hyper.facility);
    }

    #[test]
    fn subtype_advice_appended() {
        let p = pathway(TriagePriority::Urgent, DiabetesSubtype::Type1, 250.0);
        assert_eq!(
            p.specific_advice.as_deref(),
            Some("Monitor for ketones, insulin adjustment required")
        );
        let p = pathway(TriagePriority::Urgent, DiabetesSubtype::Gestational, 130.0);
        assert!(p.specific_advice.unwrap().contains("Obstetric"));
        let p = pathway(TriagePriority::Urgent, DiabetesSubtype::NonDiabetic, 100.0);
        assert!(p.specific_advice.is_none());
    }

    #[test]
    fn garbage_key_gets_urgent_pathway() {
        let p = pathway_for_key("??", DiabetesSubtype::NeedsReview, 100.0);
        assert_eq!(p.facility, "Diabetes Clinic or Hospital OPD");
        assert_eq!(display_for_key("??").response_time, "< 60 minutes");
    }

    // ── Classifier ─────────────────────────────────────────────

    #[test]
    fn assess_uses_reported_severity() {
        let classifier = DiabetesClassifier::default();
        let input = make_input(100.0);
        let a = classifier.assess(&input, Some(&prediction("High"))).unwrap();
        assert_eq!(a.priority, TriagePriority::Urgent);
        assert_eq!(a.category, "Normal");
        assert_eq!(a.subtype.as_deref(), Some("Normal Blood Glucose (Non-Diabetic)"));
        assert!(a.prediction.is_some());
    }

    #[test]
    fn assess_flags_glucose_over_form_limit() {
        let classifier = DiabetesClassifier::default();
        let a = classifier.assess(&make_input(620.0), None).unwrap();
        assert_eq!(a.priority, TriagePriority::Resuscitation);
        assert_eq!(a.flags.len(), 1);
        assert_eq!(a.flags[0].field, "glucose");
    }

    #[test]
    fn assess_rejects_non_finite_fields() {
        let classifier = DiabetesClassifier::default();
        let mut input = make_input(120.0);
        input.bmi = f64::INFINITY;
        let err = classifier.assess(&input, None).unwrap_err();
        assert!(matches!(err, TriageError::InvalidNumber { .. }));
    }
}
