//! Cross-condition risk score.
//!
//! Adds fixed points for each abnormal reading across all four families and
//! maps the total to a colour-coded level with a department and response time.

use serde::{Deserialize, Serialize};

use super::rules::RuleChain;
use super::types::TriageError;
use super::validation::require_finite;
use crate::models::FormValues;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeneralVitals {
    pub age: f64,
    pub glucose: f64,
    pub systolic_bp: f64,
    pub diastolic_bp: f64,
    pub temperature: f64,
    pub cholesterol: f64,
    pub max_heart_rate: f64,
    /// 0/1 code; truncated before comparison.
    pub diabetes: f64,
    /// 0–3 code; truncated before comparison.
    pub chest_pain: f64,
}

impl GeneralVitals {
    /// Every field is required.
    pub fn from_form(form: &FormValues) -> Result<Self, TriageError> {
        Ok(Self {
            age: form.number("age")?,
            glucose: form.number("glucose")?,
            systolic_bp: form.number("systolic_bp")?,
            diastolic_bp: form.number("diastolic_bp")?,
            temperature: form.number("temperature")?,
            cholesterol: form.number("cholesterol")?,
            max_heart_rate: form.number("max_heart_rate")?,
            diabetes: form.number("diabetes")?,
            chest_pain: form.number("chest_pain")?,
        })
    }

    fn validate(&self) -> Result<(), TriageError> {
        for (field, value) in [
            ("age", self.age),
            ("glucose", self.glucose),
            ("systolic_bp", self.systolic_bp),
            ("diastolic_bp", self.diastolic_bp),
            ("temperature", self.temperature),
            ("cholesterol", self.cholesterol),
            ("max_heart_rate", self.max_heart_rate),
            ("diabetes", self.diabetes),
            ("chest_pain", self.chest_pain),
        ] {
            require_finite(field, value)?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Score factors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreFactor {
    Hyperglycemia,
    Hypertension,
    HighFever,
    HighCholesterol,
    AbnormalHeartRate,
    Diabetic,
    ChestPain,
    Elderly,
}

struct ScoreRule {
    factor: ScoreFactor,
    points: u32,
    when: fn(&GeneralVitals) -> bool,
}

static SCORE_RULES: [ScoreRule; 8] = [
    ScoreRule {
        factor: ScoreFactor::Hyperglycemia,
        points: 2,
        when: |v| v.glucose > 180.0,
    },
    ScoreRule {
        factor: ScoreFactor::Hypertension,
        points: 2,
        when: |v| v.systolic_bp > 160.0 || v.diastolic_bp > 100.0,
    },
    ScoreRule {
        factor: ScoreFactor::HighFever,
        points: 2,
        when: |v| v.temperature > 39.0,
    },
    ScoreRule {
        factor: ScoreFactor::HighCholesterol,
        points: 1,
        when: |v| v.cholesterol > 240.0,
    },
    ScoreRule {
        factor: ScoreFactor::AbnormalHeartRate,
        points: 2,
        when: |v| v.max_heart_rate < 50.0 || v.max_heart_rate > 120.0,
    },
    ScoreRule {
        factor: ScoreFactor::Diabetic,
        points: 1,
        when: |v| v.diabetes.trunc() == 1.0,
    },
    ScoreRule {
        factor: ScoreFactor::ChestPain,
        points: 3,
        when: |v| v.chest_pain.trunc() >= 3.0,
    },
    ScoreRule {
        factor: ScoreFactor::Elderly,
        points: 1,
        when: |v| v.age.trunc() > 60.0,
    },
];

// ---------------------------------------------------------------------------
// Level
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TriageLevel {
    Green,
    Yellow,
    Orange,
    Red,
}

impl TriageLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Red => "RED",
            Self::Orange => "ORANGE",
            Self::Yellow => "YELLOW",
            Self::Green => "GREEN",
        }
    }

    pub fn department(self) -> &'static str {
        match self {
            Self::Red => "Emergency + ICU",
            Self::Orange => "Cardiology + ICU Monitoring",
            Self::Yellow => "General Medicine",
            Self::Green => "Routine Care",
        }
    }

    pub fn time_to_treatment(self) -> &'static str {
        match self {
            Self::Red => "Immediate",
            Self::Orange => "Urgent (< 10 minutes)",
            Self::Yellow => "Monitor closely",
            Self::Green => "No urgency",
        }
    }

    pub fn clinical_message(self) -> &'static str {
        match self {
            Self::Red => "Critical condition detected",
            Self::Orange => "Multiple serious risk factors detected",
            Self::Yellow => "Moderate risk factors present",
            Self::Green => "Vitals within normal range",
        }
    }

    pub fn patient_message(self) -> &'static str {
        match self {
            Self::Red => "Your condition is critical. Immediate medical care is required.",
            Self::Orange => {
                "You need urgent medical attention. Please consult a doctor immediately."
            }
            Self::Yellow => {
                "Some health risks detected. Monitoring and medical advice recommended."
            }
            Self::Green => "Your vitals look normal. Maintain a healthy lifestyle.",
        }
    }

    pub fn confidence(self) -> f64 {
        match self {
            Self::Red => 0.95,
            Self::Orange => 0.88,
            Self::Yellow => 0.75,
            Self::Green => 0.92,
        }
    }
}

fn level_chain() -> RuleChain<u32, TriageLevel> {
    RuleChain::<u32, TriageLevel>::new("general_level", TriageLevel::Green)
        .rule("GL-1", |s| *s >= 8, TriageLevel::Red)
        .rule("GL-2", |s| *s >= 5, TriageLevel::Orange)
        .rule("GL-3", |s| *s >= 3, TriageLevel::Yellow)
}

pub fn level_for_score(score: u32) -> TriageLevel {
    level_chain().evaluate(&score).outcome
}

// ---------------------------------------------------------------------------
// Result
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneralTriage {
    pub level: TriageLevel,
    pub score: u32,
    pub department: String,
    pub time_to_treatment: String,
    pub clinical_message: String,
    pub patient_message: String,
    pub confidence: f64,
    pub factors: Vec<ScoreFactor>,
}

/// Sum the fired factors and resolve the level.
pub fn score(vitals: &GeneralVitals) -> Result<GeneralTriage, TriageError> {
    vitals.validate()?;

    let fired: Vec<&ScoreRule> = SCORE_RULES.iter().filter(|r| (r.when)(vitals)).collect();
    let total: u32 = fired.iter().map(|r| r.points).sum();
    let level = level_for_score(total);

    tracing::info!(
        score = total,
        level = level.as_str(),
        factors = fired.len(),
        "General triage scored"
    );

    Ok(GeneralTriage {
        level,
        score: total,
        department: level.department().to_string(),
        time_to_treatment: level.time_to_treatment().to_string(),
        clinical_message: level.clinical_message().to_string(),
        patient_message: level.patient_message().to_string(),
        confidence: level.confidence(),
        factors: fired.into_iter().map(|r| r.factor).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_vitals() -> GeneralVitals {
        GeneralVitals {
            age: 40.0,
            glucose: 100.0,
            systolic_bp: 120.0,
            diastolic_bp: 80.0,
            temperature: 36.8,
            cholesterol: 180.0,
            max_heart_rate: 90.0,
            diabetes: 0.0,
            chest_pain: 0.0,
        }
    }

    #[test]
    fn normal_vitals_are_green() {
        let result = score(&make_vitals()).unwrap();
        assert_eq!(result.score, 0);
        assert_eq!(result.level, TriageLevel::Green);
        assert_eq!(result.department, "Routine Care");
        assert_eq!(result.confidence, 0.92);
        assert!(result.factors.is_empty());
    }

    #[test]
    fn each_factor_adds_its_points() {
        let base = make_vitals();
        let cases = [
            (GeneralVitals { glucose: 181.0, ..base }, ScoreFactor::Hyperglycemia, 2),
            (GeneralVitals { diastolic_bp: 101.0, ..base }, ScoreFactor::Hypertension, 2),
            (GeneralVitals { temperature: 39.1, ..base }, ScoreFactor::HighFever, 2),
            (GeneralVitals { cholesterol: 241.0, ..base }, ScoreFactor::HighCholesterol, 1),
            (GeneralVitals { max_heart_rate: 45.0, ..base }, ScoreFactor::AbnormalHeartRate, 2),
            (GeneralVitals { diabetes: 1.0, ..base }, ScoreFactor::Diabetic, 1),
            (GeneralVitals { chest_pain: 3.0, ..base }, ScoreFactor::ChestPain, 3),
            (GeneralVitals { age: 61.0, ..base }, ScoreFactor::Elderly, 1),
        ];
        for (vitals, factor, points) in cases {
            let result = score(&vitals).unwrap();
            assert_eq!(result.factors, vec![factor]);
            assert_eq!(result.score, points, "{factor:?}");
        }
    }

    #[test]
    fn thresholds_are_strict() {
        let vitals = GeneralVitals {
            glucose: 180.0,
            systolic_bp: 160.0,
            diastolic_bp: 100.0,
            temperature: 39.0,
            cholesterol: 240.0,
            max_heart_rate: 120.0,
            age: 60.0,
            ..make_vitals()
        };
        assert_eq!(score(&vitals).unwrap().score, 0);
    }

    #[test]
    fn coded_fields_are_truncated() {
        let vitals = GeneralVitals {
            age: 60.9,
            diabetes: 1.7,
            chest_pain: 2.9,
            ..make_vitals()
        };
        let result = score(&vitals).unwrap();
        assert_eq!(result.factors, vec![ScoreFactor::Diabetic]);
    }

    #[test]
    fn level_boundaries() {
        assert_eq!(level_for_score(2), TriageLevel::Green);
        assert_eq!(level_for_score(3), TriageLevel::Yellow);
        assert_eq!(level_for_score(5), TriageLevel::Orange);
        assert_eq!(level_for_score(8), TriageLevel::Red);
        assert_eq!(level_for_score(14), TriageLevel::Red);
    }

    #[test]
    fn critical_presentation_is_red() {
        let vitals = GeneralVitals {
            age: 72.0,
            glucose: 320.0,
            systolic_bp: 190.0,
            chest_pain: 3.0,
            ..make_vitals()
        };
        let result = score(&vitals).unwrap();
        assert_eq!(result.score, 8);
        assert_eq!(result.level, TriageLevel::Red);
        assert_eq!(result.time_to_treatment, "Immediate");
        assert_eq!(
            result.patient_message,
            "Your condition is critical. Immediate medical care is required."
        );
    }

    #[test]
    fn non_finite_reading_is_rejected() {
        let vitals = GeneralVitals {
            temperature: f64::NAN,
            ..make_vitals()
        };
        assert!(matches!(
            score(&vitals).unwrap_err(),
            TriageError::InvalidNumber { .. }
        ));
    }

    #[test]
    fn missing_form_field_is_rejected() {
        let form = FormValues::from_json(
            r#"{"age": "40", "glucose": "100", "systolic_bp": "120", "diastolic_bp": "80",
                "temperature": "", "cholesterol": "180", "max_heart_rate": "90",
                "diabetes": "0", "chest_pain": "0"}"#,
        )
        .unwrap();
        let err = GeneralVitals::from_form(&form).unwrap_err();
        assert!(matches!(err, TriageError::MissingValue { ref field } if field == "temperature"));
    }

    #[test]
    fn level_serializes_uppercase() {
        let json = serde_json::to_string(&TriageLevel::Orange).unwrap();
        assert_eq!(json, "\"ORANGE\"");
    }
}
