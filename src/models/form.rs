//! Raw form payloads.
//!
//! Browsers and upstream services send vitals as JSON objects whose values
//! may be numbers or numeric strings (`"120"`, `" 98.6 "`). `FormValues`
//! turns those into finite `f64`s or a typed error naming the field.

use serde_json::{Map, Value};

use crate::triage::TriageError;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormValues {
    values: Map<String, Value>,
}

impl FormValues {
    pub fn new(values: Map<String, Value>) -> Self {
        Self { values }
    }

    pub fn from_value(value: Value) -> Result<Self, TriageError> {
        match value {
            Value::Object(values) => Ok(Self { values }),
            _ => Err(TriageError::NotAnObject("form".into())),
        }
    }

    pub fn from_json(json: &str) -> Result<Self, TriageError> {
        Self::from_value(serde_json::from_str(json)?)
    }

    /// Required numeric field. Missing, null and blank strings are `MissingValue`.
    pub fn number(&self, field: &str) -> Result<f64, TriageError> {
        self.optional_number(field)?
            .ok_or_else(|| TriageError::MissingValue {
                field: field.to_string(),
            })
    }

    pub fn optional_number(&self, field: &str) -> Result<Option<f64>, TriageError> {
        let invalid = |raw: String| TriageError::InvalidNumber {
            field: field.to_string(),
            value: raw,
        };

        let parsed = match self.values.get(field) {
            None | Some(Value::Null) => return Ok(None),
            Some(Value::Number(n)) => n.as_f64().ok_or_else(|| invalid(n.to_string()))?,
            Some(Value::String(s)) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    return Ok(None);
                }
                trimmed.parse::<f64>().map_err(|_| invalid(s.clone()))?
            }
            Some(other) => return Err(invalid(other.to_string())),
        };

        if parsed.is_finite() {
            Ok(Some(parsed))
        } else {
            Err(invalid(parsed.to_string()))
        }
    }

    pub fn contains(&self, field: &str) -> bool {
        self.values.contains_key(field)
    }
}
