pub mod enums;
pub mod form;
pub mod prediction;

pub use enums::*;
pub use form::FormValues;
pub use prediction::MlPrediction;
