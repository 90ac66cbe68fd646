pub mod anemia;
pub mod blood_pressure;
pub mod cardiac;
pub mod diabetes;
pub mod engine;
pub mod fever;
pub mod general;
pub mod rules;
pub mod types;
pub mod validation;

pub use engine::{ConditionInput, TriageEngine};
pub use types::*;
