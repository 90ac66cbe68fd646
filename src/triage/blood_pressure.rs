//! Blood pressure: hypertension staging, triage priority and care pathway.
//!
//! Two staging tables exist. [`BpRuleSet::Category`] tests Stage 1 / Stage 2
//! with OR and ends in `Unknown`; [`BpRuleSet::Classification`] tests them
//! with AND and ends in `Hypertensive Crisis`. The triage priority chain is
//! independent of staging and is shared by both.

use serde::{Deserialize, Serialize};

use super::rules::RuleChain;
use super::types::{
    table_entry, CarePathway, ConditionClassifier, ConditionFamily, DisplayEntry, PathwayEntry,
    RangeFlag, TriageAssessment, TriageDisplay, TriageError, TriagePriority,
};
use super::validation::{RangePolicy, DIASTOLIC, SYSTOLIC};
use crate::models::{FormValues, MlPrediction};

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BloodPressureInput {
    /// mmHg
    pub systolic: f64,
    /// mmHg
    pub diastolic: f64,
}

impl BloodPressureInput {
    pub fn new(systolic: f64, diastolic: f64) -> Self {
        Self {
            systolic,
            diastolic,
        }
    }

    pub fn from_form(form: &FormValues) -> Result<Self, TriageError> {
        Ok(Self {
            systolic: form.number(SYSTOLIC.field)?,
            diastolic: form.number(DIASTOLIC.field)?,
        })
    }

    fn validate(&self, policy: RangePolicy) -> Result<Vec<RangeFlag>, TriageError> {
        let mut flags = Vec::new();
        SYSTOLIC.check(self.systolic, policy, &mut flags)?;
        DIASTOLIC.check(self.diastolic, policy, &mut flags)?;
        Ok(flags)
    }
}

// ---------------------------------------------------------------------------
// Category
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BpCategory {
    Normal,
    Elevated,
    #[serde(rename = "Stage 1")]
    Stage1,
    #[serde(rename = "Stage 2")]
    Stage2,
    #[serde(rename = "Hypertensive Crisis")]
    HypertensiveCrisis,
    Unknown,
}

impl BpCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "Normal",
            Self::Elevated => "Elevated",
            Self::Stage1 => "Stage 1",
            Self::Stage2 => "Stage 2",
            Self::HypertensiveCrisis => "Hypertensive Crisis",
            Self::Unknown => "Unknown",
        }
    }

    /// Heading shown above the reading.
    pub fn display_label(self) -> &'static str {
        match self {
            Self::Normal => "Normal Blood Pressure",
            Self::Elevated => "Elevated Blood Pressure",
            Self::Stage1 => "Stage 1 Hypertension",
            Self::Stage2 => "Stage 2 Hypertension",
            Self::HypertensiveCrisis => "Hypertensive Crisis",
            Self::Unknown => "Blood Pressure Assessment",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::Normal => "Healthy blood pressure range. Continue maintaining a healthy lifestyle.",
            Self::Elevated => {
                "Slightly elevated. Consider lifestyle modifications and regular monitoring."
            }
            Self::Stage1 => {
                "Stage 1 hypertension. Medical consultation and lifestyle changes recommended."
            }
            Self::Stage2 => {
                "Stage 2 hypertension. Urgent medical attention and treatment required."
            }
            Self::HypertensiveCrisis => "Medical emergency! Seek immediate medical attention.",
            Self::Unknown => {
                "Please consult with a healthcare professional for accurate assessment."
            }
        }
    }

    pub fn recommendations(self) -> &'static [&'static str] {
        match self {
            Self::Normal => &[
                "Continue regular exercise",
                "Maintain healthy diet",
                "Annual check-ups",
            ],
            Self::Elevated => &[
                "Reduce sodium intake",
                "Increase physical activity",
                "Monitor weekly",
                "Limit alcohol",
            ],
            Self::Stage1 => &[
                "Consult physician",
                "Start medication if prescribed",
                "Daily monitoring",
                "Stress management",
            ],
            Self::Stage2 => &[
                "Immediate medical consultation",
                "Regular medication",
                "Emergency contact ready",
                "Frequent monitoring",
            ],
            Self::HypertensiveCrisis => &[
                "Call emergency services",
                "Do not delay treatment",
                "Rest in sitting position",
                "Seek hospital care",
            ],
            Self::Unknown => &["Consult healthcare professional"],
        }
    }
}

/// Which staging table to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BpRuleSet {
    /// Stage 1 when systolic<140 OR diastolic<90; Stage 2 likewise with 180/120.
    #[default]
    Category,
    /// Stage 1 when systolic<140 AND diastolic<90; Stage 2 likewise with 180/120.
    Classification,
}

fn category_chain(rule_set: BpRuleSet) -> RuleChain<BloodPressureInput, BpCategory> {
    match rule_set {
        BpRuleSet::Category => {
            RuleChain::<BloodPressureInput, BpCategory>::new("bp_category", BpCategory::Unknown)
                .rule(
                    "BP-C1",
                    |v| v.systolic < 120.0 && v.diastolic < 80.0,
                    BpCategory::Normal,
                )
                .rule(
                    "BP-C2",
                    |v| v.systolic < 130.0 && v.diastolic < 80.0,
                    BpCategory::Elevated,
                )
                .rule(
                    "BP-C3",
                    |v| v.systolic < 140.0 || v.diastolic < 90.0,
                    BpCategory::Stage1,
                )
                .rule(
                    "BP-C4",
                    |v| v.systolic < 180.0 || v.diastolic < 120.0,
                    BpCategory::Stage2,
                )
                .rule(
                    "BP-C5",
                    |v| v.systolic >= 180.0 || v.diastolic >= 120.0,
                    BpCategory::HypertensiveCrisis,
                )
        }
        BpRuleSet::Classification => RuleChain::<BloodPressureInput, BpCategory>::new(
            "bp_classification",
            BpCategory::HypertensiveCrisis,
        )
        .rule(
            "BP-K1",
            |v| v.systolic < 120.0 && v.diastolic < 80.0,
            BpCategory::Normal,
        )
        .rule(
            "BP-K2",
            |v| v.systolic < 130.0 && v.diastolic < 80.0,
            BpCategory::Elevated,
        )
        .rule(
            "BP-K3",
            |v| v.systolic < 140.0 && v.diastolic < 90.0,
            BpCategory::Stage1,
        )
        .rule(
            "BP-K4",
            |v| v.systolic < 180.0 && v.diastolic < 120.0,
            BpCategory::Stage2,
        ),
    }
}

pub fn classify(input: &BloodPressureInput, rule_set: BpRuleSet) -> BpCategory {
    category_chain(rule_set).evaluate(input).outcome
}

// ---------------------------------------------------------------------------
// Priority
// ---------------------------------------------------------------------------

fn priority_chain() -> RuleChain<BloodPressureInput, TriagePriority> {
    RuleChain::<BloodPressureInput, TriagePriority>::new("bp_priority", TriagePriority::NonUrgent)
        // Hypertensive emergency
        .rule(
            "BP-P1",
            |v| v.systolic >= 180.0 && v.diastolic >= 120.0,
            TriagePriority::Resuscitation,
        )
        .rule(
            "BP-P2",
            |v| v.systolic >= 220.0 || v.diastolic >= 140.0,
            TriagePriority::Resuscitation,
        )
        // Hypertensive urgency
        .rule(
            "BP-P3",
            |v| v.systolic >= 180.0 || v.diastolic >= 110.0,
            TriagePriority::Emergent,
        )
        .rule(
            "BP-P4",
            |v| v.systolic >= 160.0 && v.diastolic >= 100.0,
            TriagePriority::Emergent,
        )
        .rule(
            "BP-P5",
            |v| v.systolic >= 140.0 || v.diastolic >= 90.0,
            TriagePriority::Urgent,
        )
        .rule(
            "BP-P6",
            |v| v.systolic >= 130.0 || v.diastolic >= 80.0,
            TriagePriority::LessUrgent,
        )
}

pub fn triage_priority(input: &BloodPressureInput) -> TriagePriority {
    priority_chain().evaluate(input).outcome
}

// ---------------------------------------------------------------------------
// Pathway & display tables (ordered Resuscitation → Non-Urgent)
// ---------------------------------------------------------------------------

static PATHWAYS: [PathwayEntry; 5] = [
    PathwayEntry {
        actions: &[
            "CALL 911/112 IMMEDIATELY",
            "Do NOT take extra BP medication",
            "Lie down in quiet environment",
            "Notify emergency cardiac team",
        ],
        facility: "Emergency Department - Cardiac ICU",
        transport: "Advanced Life Support Ambulance",
        team: "Cardiologist + Critical Care Team",
        tests: &["ECG", "Troponin", "Head CT", "Renal Function", "Fundoscopy"],
        medication: Some("IV Antihypertensives (Labetalol, Nitroprusside)"),
        monitoring: Some("Continuous arterial line, Neurological checks"),
    },
    PathwayEntry {
        actions: &[
            "Go to Emergency Department NOW",
            "Take prescribed BP medications",
            "Call cardiology on-call service",
            "Bring all medications and history",
        ],
        facility: "Emergency Department - Observation Unit",
        transport: "Ambulance or private vehicle with companion",
        team: "Emergency Physician + Cardiology Consult",
        tests: &["ECG", "Cardiac Enzymes", "Renal Panel", "Chest X-ray"],
        medication: Some("Oral/IV Antihypertensives"),
        monitoring: Some("Frequent BP checks, Cardiac monitoring"),
    },
    PathwayEntry {
        actions: &[
            "Visit Urgent Care or Cardiology Clinic",
            "Schedule same-day cardiology consult",
            "Check BP every 30 minutes",
            "Review current medication regimen",
        ],
        facility: "Cardiology Clinic or Hospital OPD",
        transport: "Private vehicle",
        team: "Cardiologist or Hypertension Specialist",
        tests: &[
            "24-hour Ambulatory BP",
            "Echocardiogram",
            "Renal Ultrasound",
            "Aldosterone/Renin",
        ],
        medication: Some("Initiate/Adjust Antihypertensive Therapy"),
        monitoring: Some("Home BP monitoring twice daily"),
    },
    PathwayEntry {
        actions: &[
            "Schedule cardiology appointment within 48 hours",
            "Telehealth hypertension consultation",
            "Start BP log (morning/evening readings)",
            "Begin DASH diet and sodium restriction",
        ],
        facility: "Primary Care or Cardiology Clinic",
        transport: "Private vehicle",
        team: "Primary Care Physician or Cardiologist",
        tests: &["Basic Metabolic Panel", "Lipid Profile", "Urinalysis", "ECG"],
        medication: Some("Consider starting first-line therapy"),
        monitoring: Some("Weekly BP monitoring"),
    },
    PathwayEntry {
        actions: &[
            "Schedule routine cardiovascular check-up",
            "Continue healthy lifestyle practices",
            "Annual BP screening",
            "Maintain regular exercise and diet",
        ],
        facility: "Primary Care Clinic",
        transport: "Not urgent - schedule appointment",
        team: "Primary Care Physician",
        tests: &["Annual BP check", "Annual Labs", "BMI assessment"],
        medication: Some("None or current regimen if controlled"),
        monitoring: Some("Annual BP screening"),
    },
];

static DISPLAYS: [DisplayEntry; 5] = [
    DisplayEntry {
        response_time: "IMMEDIATE",
        description: "Hypertensive Emergency - Organ Damage Risk",
        warning: Some("Hypertensive Crisis - Risk of Stroke/Heart Attack"),
    },
    DisplayEntry {
        response_time: "< 15 minutes",
        description: "Severe Hypertension - Requires Rapid Reduction",
        warning: Some("Hypertensive Urgency - Medical Attention Needed"),
    },
    DisplayEntry {
        response_time: "< 60 minutes",
        description: "Stage 2 Hypertension - Needs Treatment",
        warning: Some("Uncontrolled Hypertension - Medical Evaluation"),
    },
    DisplayEntry {
        response_time: "24-48 hours",
        description: "Stage 1 Hypertension - Lifestyle Intervention",
        warning: Some("Needs BP Monitoring & Management Plan"),
    },
    DisplayEntry {
        response_time: "Primary Care Follow-up",
        description: "Normal/Elevated BP - Preventive Care",
        warning: Some("Routine Cardiovascular Screening"),
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

#[derive(Debug, Clone, Copy)]
pub struct BloodPressureClassifier {
    pub rule_set: BpRuleSet,
    pub range_policy: RangePolicy,
}

impl Default for BloodPressureClassifier {
    fn default() -> Self {
        Self {
            rule_set: BpRuleSet::default(),
            range_policy: RangePolicy::Flag,
        }
    }
}

impl ConditionClassifier for BloodPressureClassifier {
    type Input = BloodPressureInput;

    fn family(&self) -> ConditionFamily {
        ConditionFamily::BloodPressure
    }

    fn parse_form(&self, form: &FormValues) -> Result<Self::Input, TriageError> {
        BloodPressureInput::from_form(form)
    }

    fn assess(
        &self,
        input: &BloodPressureInput,
        prediction: Option<&MlPrediction>,
    ) -> Result<TriageAssessment, TriageError> {
        let flags = input.validate(self.range_policy)?;
        let category = classify(input, self.rule_set);
        let priority = triage_priority(input);

        Ok(TriageAssessment {
            family: self.family(),
            category: category.as_str().to_string(),
            priority,
            subtype: None,
            pathway: pathway(priority),
            display: display(priority),
            description: category.description().to_string(),
            recommendations: category
                .recommendations()
                .iter()
                .map(|r| r.to_string())
                .collect(),
            infection_risk: None,
            flags,
            prediction: prediction.cloned(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn bp(systolic: f64, diastolic: f64) -> BloodPressureInput {
        BloodPressureInput::new(systolic, diastolic)
    }

    // ── Category ───────────────────────────────────────────────

    #[test]
    fn category_table_boundaries() {
        let cases = [
            (119.0, 79.0, BpCategory::Normal),
            (120.0, 79.0, BpCategory::Elevated),
            (129.0, 79.0, BpCategory::Elevated),
            (130.0, 79.0, BpCategory::Stage1),
            (135.0, 85.0, BpCategory::Stage1),
            (150.0, 95.0, BpCategory::Stage2),
            (180.0, 120.0, BpCategory::HypertensiveCrisis),
        ];
        for (s, d, expected) in cases {
            assert_eq!(classify(&bp(s, d), BpRuleSet::Category), expected, "{s}/{d}");
        }
    }

    #[test]
    fn category_or_rule_keeps_high_systolic_with_low_diastolic_in_stage_1() {
        // Rule 3 is an OR: diastolic < 90 alone is enough.
        assert_eq!(classify(&bp(200.0, 85.0), BpRuleSet::Category), BpCategory::Stage1);
    }

    #[test]
    fn classification_and_rule_escalates_same_reading() {
        assert_eq!(
            classify(&bp(200.0, 85.0), BpRuleSet::Classification),
            BpCategory::HypertensiveCrisis
        );
        assert_eq!(
            classify(&bp(150.0, 85.0), BpRuleSet::Classification),
            BpCategory::Stage2
        );
        assert_eq!(
            classify(&bp(135.0, 85.0), BpRuleSet::Classification),
            BpCategory::Stage1
        );
    }

    #[test]
    fn category_is_total_over_valid_domain() {
        for s in (50..=300).step_by(5) {
            for d in (30..=200).step_by(5) {
                let c = classify(&bp(s as f64, d as f64), BpRuleSet::Category);
                assert_ne!(c, BpCategory::Unknown, "{s}/{d}");
            }
        }
    }

    #[test]
    fn unknown_only_via_fallback_on_nan() {
        assert_eq!(
            classify(&bp(f64::NAN, f64::NAN), BpRuleSet::Category),
            BpCategory::Unknown
        );
    }

    // ── Priority ───────────────────────────────────────────────

    #[test]
    fn crisis_reading_is_resuscitation() {
        assert_eq!(triage_priority(&bp(185.0, 125.0)), TriagePriority::Resuscitation);
    }

    #[test]
    fn stage_1_reading_is_less_urgent() {
        let input = bp(135.0, 85.0);
        assert_eq!(classify(&input, BpRuleSet::Category), BpCategory::Stage1);
        assert_eq!(triage_priority(&input), TriagePriority::LessUrgent);
    }

    #[test]
    fn priority_rule_order() {
        let cases = [
            (225.0, 70.0, TriagePriority::Resuscitation),
            (150.0, 140.0, TriagePriority::Resuscitation),
            (180.0, 70.0, TriagePriority::Emergent),
            (150.0, 110.0, TriagePriority::Emergent),
            (160.0, 100.0, TriagePriority::Emergent),
            (160.0, 99.0, TriagePriority::Urgent),
            (140.0, 70.0, TriagePriority::Urgent),
            (120.0, 90.0, TriagePriority::Urgent),
            (130.0, 70.0, TriagePriority::LessUrgent),
            (110.0, 80.0, TriagePriority::LessUrgent),
            (129.0, 79.0, TriagePriority::NonUrgent),
        ];
        for (s, d, expected) in cases {
            assert_eq!(triage_priority(&bp(s, d)), expected, "{s}/{d}");
        }
    }

    #[test]
    fn priority_is_monotonic_in_each_reading() {
        for s in (50..300).step_by(2) {
            for d in (30..200).step_by(2) {
                let base = triage_priority(&bp(s as f64, d as f64));
                let higher_s = triage_priority(&bp(s as f64 + 2.0, d as f64));
                let higher_d = triage_priority(&bp(s as f64, d as f64 + 2.0));
                assert!(higher_s >= base, "systolic {s}->{} at {d}", s + 2);
                assert!(higher_d >= base, "diastolic {d}->{} at {s}", d + 2);
            }
        }
        assert!(triage_priority(&bp(190.0, 70.0)) >= triage_priority(&bp(170.0, 70.0)));
    }

    // ── Tables ─────────────────────────────────────────────────

    #[test]
    fn pathway_per_priority() {
        let p = pathway(TriagePriority::Resuscitation);
        assert_eq!(p.facility, "Emergency Department - Cardiac ICU");
        assert!(p.tests.contains(&"Head CT".to_string()));
        assert!(p.medication.is_some());

        let p = pathway(TriagePriority::NonUrgent);
        assert_eq!(p.team, "Primary Care Physician");
    }

    #[test]
    fn garbage_key_gets_urgent_pathway() {
        assert_eq!(pathway_for_key("STAT!!"), pathway(TriagePriority::Urgent));
        assert_eq!(display_for_key("nope"), display(TriagePriority::Urgent));
    }

    #[test]
    fn display_has_warning_for_every_priority() {
        for p in TriagePriority::ALL {
            assert!(display(p).warning.is_some());
        }
        assert_eq!(display(TriagePriority::Emergent).response_time, "< 15 minutes");
    }

    #[test]
    fn unknown_category_has_fallback_recommendation() {
        assert_eq!(
            BpCategory::Unknown.recommendations(),
            &["Consult healthcare professional"]
        );
        assert_eq!(BpCategory::Unknown.display_label(), "Blood Pressure Assessment");
    }

    // ── Classifier ─────────────────────────────────────────────

    #[test]
    fn assess_builds_full_result() {
        let classifier = BloodPressureClassifier::default();
        let a = classifier.assess(&bp(135.0, 85.0), None).unwrap();
        assert_eq!(a.family, ConditionFamily::BloodPressure);
        assert_eq!(a.category, "Stage 1");
        assert_eq!(a.priority, TriagePriority::LessUrgent);
        assert_eq!(a.display.response_time, "24-48 hours");
        assert!(a.flags.is_empty());
    }

    #[test]
    fn assess_is_idempotent() {
        let classifier = BloodPressureClassifier::default();
        let first = classifier.assess(&bp(172.0, 104.0), None).unwrap();
        let second = classifier.assess(&bp(172.0, 104.0), None).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn out_of_range_is_flagged_not_rejected_by_default() {
        let classifier = BloodPressureClassifier::default();
        let a = classifier.assess(&bp(310.0, 25.0), None).unwrap();
        assert_eq!(a.flags.len(), 2);
        assert_eq!(a.priority, TriagePriority::Resuscitation);
    }

    #[test]
    fn strict_policy_rejects_out_of_range() {
        let classifier = BloodPressureClassifier {
            range_policy: RangePolicy::Reject,
            ..Default::default()
        };
        let err = classifier.assess(&bp(310.0, 90.0), None).unwrap_err();
        assert!(matches!(err, TriageError::OutOfRange { .. }));
    }

    #[test]
    fn nan_reading_is_rejected() {
        let classifier = BloodPressureClassifier::default();
        assert!(classifier.assess(&bp(f64::NAN, 80.0), None).is_err());
    }

    #[test]
    fn form_fields_use_service_names() {
        let form = FormValues::from_value(json!({ "systolic_bp": "142", "diastolic_bp": 91 }))
            .unwrap();
        let input = BloodPressureInput::from_form(&form).unwrap();
        assert_eq!(input, bp(142.0, 91.0));
    }
}
