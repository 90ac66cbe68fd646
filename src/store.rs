use std::sync::RwLock;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::models::{Disease, MlPrediction};

/// One prediction service result, as kept for a patient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionRecord {
    pub id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patient_id: Option<String>,
    pub disease: Disease,
    pub probability: Option<f64>,
    pub severity: String,
    pub confidence: f64,
    pub raw_result: serde_json::Value,
    pub created_at: NaiveDateTime,
}

impl PredictionRecord {
    pub fn new(
        patient_id: Option<&str>,
        disease: Disease,
        prediction: &MlPrediction,
    ) -> Result<Self, StoreError> {
        Ok(Self {
            id: Uuid::new_v4(),
            patient_id: patient_id.map(str::to_string),
            disease,
            probability: prediction.risk(),
            severity: prediction.severity.clone(),
            confidence: prediction.confidence,
            raw_result: serde_json::to_value(prediction)?,
            created_at: chrono::Local::now().naive_local(),
        })
    }
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Internal lock failed")]
    LockFailed,

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

pub trait PredictionStore: Send + Sync {
    fn save(&self, record: PredictionRecord) -> Result<(), StoreError>;

    /// All records for a patient, oldest first.
    fn for_patient(&self, patient_id: &str) -> Result<Vec<PredictionRecord>, StoreError>;

    /// Most recently saved record for a patient and disease.
    fn latest(
        &self,
        patient_id: &str,
        disease: Disease,
    ) -> Result<Option<PredictionRecord>, StoreError>;
}

/// Process-local store backed by RwLock.
#[derive(Debug, Default)]
pub struct InMemoryPredictionStore {
    records: RwLock<Vec<PredictionRecord>>,
}

impl InMemoryPredictionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> Result<usize, StoreError> {
        let records = self.records.read().map_err(|_| StoreError::LockFailed)?;
        Ok(records.len())
    }

    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len()? == 0)
    }
}

impl PredictionStore for InMemoryPredictionStore {
    fn save(&self, record: PredictionRecord) -> Result<(), StoreError> {
        let mut records = self.records.write().map_err(|_| StoreError::LockFailed)?;
        tracing::debug!(
            id = %record.id,
            disease = record.disease.as_str(),
            severity = %record.severity,
            "Prediction stored"
        );
        records.push(record);
        Ok(())
    }

    fn for_patient(&self, patient_id: &str) -> Result<Vec<PredictionRecord>, StoreError> {
        let records = self.records.read().map_err(|_| StoreError::LockFailed)?;
        Ok(records
            .iter()
            .filter(|r| r.patient_id.as_deref() == Some(patient_id))
            .cloned()
            .collect())
    }

    fn latest(
        &self,
        patient_id: &str,
        disease: Disease,
    ) -> Result<Option<PredictionRecord>, StoreError> {
        let records = self.records.read().map_err(|_| StoreError::LockFailed)?;
        Ok(records
            .iter()
            .rev()
            .find(|r| r.disease == disease && r.patient_id.as_deref() == Some(patient_id))
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use super::*;

    fn make_prediction(severity: &str, risk: Option<f64>) -> MlPrediction {
        MlPrediction {
            disease: None,
            severity: severity.into(),
            risk_probability: risk,
            confidence: 0.6,
        }
    }

    fn make_record(patient: &str, disease: Disease, severity: &str) -> PredictionRecord {
        PredictionRecord::new(Some(patient), disease, &make_prediction(severity, Some(0.5)))
            .unwrap()
    }

    #[test]
    fn record_copies_prediction_fields() {
        let prediction = make_prediction("High", Some(0.734));
        let record = PredictionRecord::new(Some("p-1"), Disease::HeartDisease, &prediction).unwrap();
        assert_eq!(record.probability, Some(0.734));
        assert_eq!(record.severity, "High");
        assert_eq!(record.raw_result["severity"], "High");
        assert_eq!(record.patient_id.as_deref(), Some("p-1"));
    }

    #[test]
    fn non_finite_probability_is_not_stored() {
        let record =
            PredictionRecord::new(None, Disease::Hypertension, &make_prediction("Unknown", Some(f64::NAN)))
                .unwrap();
        assert_eq!(record.probability, None);
    }

    #[test]
    fn for_patient_filters_by_patient() {
        let store = InMemoryPredictionStore::new();
        store.save(make_record("a", Disease::Diabetes, "Low")).unwrap();
        store.save(make_record("b", Disease::Diabetes, "High")).unwrap();
        store.save(make_record("a", Disease::Hypertension, "Stage 1")).unwrap();

        let records = store.for_patient("a").unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].disease, Disease::Diabetes);
        assert_eq!(records[1].disease, Disease::Hypertension);
        assert!(store.for_patient("c").unwrap().is_empty());
    }

    #[test]
    fn latest_returns_most_recent_for_disease() {
        let store = InMemoryPredictionStore::new();
        store.save(make_record("a", Disease::Diabetes, "Low")).unwrap();
        store.save(make_record("a", Disease::HeartDisease, "Critical")).unwrap();
        store.save(make_record("a", Disease::Diabetes, "High")).unwrap();

        let latest = store.latest("a", Disease::Diabetes).unwrap().unwrap();
        assert_eq!(latest.severity, "High");
        assert!(store.latest("a", Disease::Infection).unwrap().is_none());
    }

    #[test]
    fn anonymous_records_are_not_returned_for_patients() {
        let store = InMemoryPredictionStore::new();
        let record =
            PredictionRecord::new(None, Disease::Diabetes, &make_prediction("Low", None)).unwrap();
        store.save(record).unwrap();
        assert_eq!(store.len().unwrap(), 1);
        assert!(store.for_patient("").unwrap().is_empty());
    }

    #[test]
    fn concurrent_saves_are_all_kept() {
        let store = Arc::new(InMemoryPredictionStore::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    store
                        .save(make_record(&format!("p-{i}"), Disease::Diabetes, "Low"))
                        .unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(store.len().unwrap(), 8);
    }

    #[test]
    fn record_serializes_camel_case() {
        let json = serde_json::to_value(make_record("a", Disease::HeartDisease, "Low")).unwrap();
        assert_eq!(json["disease"], "heart_disease");
        assert!(json.get("rawResult").is_some());
        assert!(json.get("createdAt").is_some());
    }
}
