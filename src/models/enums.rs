use crate::triage::TriageError;
use serde::{Deserialize, Serialize};

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $s)] $variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = TriageError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(TriageError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }
    };
}

str_enum!(Disease {
    Diabetes => "diabetes",
    HeartDisease => "heart_disease",
    Hypertension => "hypertension",
    Infection => "infection",
});

str_enum!(Sex {
    Female => "female",
    Male => "male",
});

impl Sex {
    /// Form coding: 0 female, 1 male.
    pub fn from_code(code: bool) -> Self {
        if code {
            Sex::Male
        } else {
            Sex::Female
        }
    }
}

/// Severity label reported by an external prediction service.
///
/// Services report free-form strings; only these exact labels take part in
/// priority rules. Anything else (stage names, "Unknown", typos) is `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ReportedSeverity {
    Low,
    Medium,
    Moderate,
    High,
    Critical,
    #[default]
    Other,
}

impl ReportedSeverity {
    pub fn parse(label: &str) -> Self {
        match label {
            "Low" => Self::Low,
            "Medium" => Self::Medium,
            "Moderate" => Self::Moderate,
            "High" => Self::High,
            "Critical" => Self::Critical,
            _ => Self::Other,
        }
    }
}
