use serde::{Deserialize, Serialize};

use super::anemia::{anemia_urgency, AnemiaUrgency};
use super::blood_pressure::{BloodPressureClassifier, BloodPressureInput};
use super::cardiac::{CardiacClassifier, CardiacInput};
use super::diabetes::{DiabetesClassifier, DiabetesInput};
use super::fever::{FeverClassifier, FeverInput};
use super::general::{self, GeneralTriage, GeneralVitals};
use super::types::{ConditionClassifier, ConditionFamily, TriageAssessment, TriageError};
use super::validation::RangePolicy;
use crate::config::EngineConfig;
use crate::models::{FormValues, MlPrediction};

/// Typed input for any condition family.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "family", content = "input", rename_all = "snake_case")]
pub enum ConditionInput {
    BloodPressure(BloodPressureInput),
    Diabetes(DiabetesInput),
    Fever(FeverInput),
    Cardiac(CardiacInput),
}

impl ConditionInput {
    pub fn family(&self) -> ConditionFamily {
        match self {
            Self::BloodPressure(_) => ConditionFamily::BloodPressure,
            Self::Diabetes(_) => ConditionFamily::Diabetes,
            Self::Fever(_) => ConditionFamily::Fever,
            Self::Cardiac(_) => ConditionFamily::Cardiac,
        }
    }
}

/// Stateless facade over every classifier, configured once.
#[derive(Debug, Clone, Copy, Default)]
pub struct TriageEngine {
    blood_pressure: BloodPressureClassifier,
    diabetes: DiabetesClassifier,
    fever: FeverClassifier,
    cardiac: CardiacClassifier,
}

impl TriageEngine {
    pub fn new(config: &EngineConfig) -> Self {
        let range_policy = if config.strict_ranges {
            RangePolicy::Reject
        } else {
            RangePolicy::Flag
        };

        Self {
            blood_pressure: BloodPressureClassifier {
                rule_set: config.bp_rule_set,
                range_policy,
            },
            diabetes: DiabetesClassifier { range_policy },
            fever: FeverClassifier,
            cardiac: CardiacClassifier {
                angina_coding: config.angina_coding,
                range_policy,
            },
        }
    }

    pub fn assess(
        &self,
        input: &ConditionInput,
        prediction: Option<&MlPrediction>,
    ) -> Result<TriageAssessment, TriageError> {
        match input {
            ConditionInput::BloodPressure(i) => run(&self.blood_pressure, i, prediction),
            ConditionInput::Diabetes(i) => run(&self.diabetes, i, prediction),
            ConditionInput::Fever(i) => run(&self.fever, i, prediction),
            ConditionInput::Cardiac(i) => run(&self.cardiac, i, prediction),
        }
    }

    /// Parse and classify a raw form payload for `family`.
    pub fn assess_form(
        &self,
        family: ConditionFamily,
        form: &FormValues,
        prediction: Option<&MlPrediction>,
    ) -> Result<TriageAssessment, TriageError> {
        match family {
            ConditionFamily::BloodPressure => run_form(&self.blood_pressure, form, prediction),
            ConditionFamily::Diabetes => run_form(&self.diabetes, form, prediction),
            ConditionFamily::Fever => run_form(&self.fever, form, prediction),
            ConditionFamily::Cardiac => run_form(&self.cardiac, form, prediction),
        }
    }

    /// Same as [`assess_form`](Self::assess_form), taking JSON text for the form
    /// and the optional prediction service response.
    pub fn assess_json(
        &self,
        family: ConditionFamily,
        form_json: &str,
        prediction_json: Option<&str>,
    ) -> Result<TriageAssessment, TriageError> {
        let form = FormValues::from_json(form_json)?;
        let prediction = prediction_json.map(MlPrediction::from_json).transpose()?;
        self.assess_form(family, &form, prediction.as_ref())
    }

    pub fn general(&self, vitals: &GeneralVitals) -> Result<GeneralTriage, TriageError> {
        general::score(vitals)
    }

    pub fn general_form(&self, form: &FormValues) -> Result<GeneralTriage, TriageError> {
        general::score(&GeneralVitals::from_form(form)?)
    }

    pub fn anemia(&self, hemoglobin: f64) -> Result<AnemiaUrgency, TriageError> {
        anemia_urgency(hemoglobin)
    }
}

fn run_form<C: ConditionClassifier>(
    classifier: &C,
    form: &FormValues,
    prediction: Option<&MlPrediction>,
) -> Result<TriageAssessment, TriageError> {
    let input = classifier.parse_form(form).inspect_err(|e| {
        tracing::warn!(
            family = classifier.family().as_str(),
            error = %e,
            "Form rejected"
        );
    })?;
    run(classifier, &input, prediction)
}

fn run<C: ConditionClassifier>(
    classifier: &C,
    input: &C::Input,
    prediction: Option<&MlPrediction>,
) -> Result<TriageAssessment, TriageError> {
    match classifier.assess(input, prediction) {
        Ok(assessment) => {
            tracing::info!(
                family = assessment.family.as_str(),
                category = %assessment.category,
                priority = assessment.priority.as_str(),
                flags = assessment.flags.len(),
                "Assessment complete"
            );
            Ok(assessment)
        }
        Err(e) => {
            tracing::warn!(
                family = classifier.family().as_str(),
                error = %e,
                "Input rejected"
            );
            Err(e)
        }
    }
}
