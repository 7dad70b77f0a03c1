use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Length unit the model's coordinates are expressed in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnitSystem {
    #[default]
    Meter,
    Centimeter,
    Millimeter,
    Inch,
    Foot,
}

impl UnitSystem {
    pub const ALL: [UnitSystem; 5] = [
        UnitSystem::Meter,
        UnitSystem::Centimeter,
        UnitSystem::Millimeter,
        UnitSystem::Inch,
        UnitSystem::Foot,
    ];

    /// TitleCase token used in persisted documents.
    pub fn token(&self) -> &'static str {
        match self {
            UnitSystem::Meter => "Meter",
            UnitSystem::Centimeter => "Centimeter",
            UnitSystem::Millimeter => "Millimeter",
            UnitSystem::Inch => "Inch",
            UnitSystem::Foot => "Foot",
        }
    }

    pub fn meters_per_unit(&self) -> f64 {
        match self {
            UnitSystem::Meter => 1.0,
            UnitSystem::Centimeter => 0.01,
            UnitSystem::Millimeter => 0.001,
            UnitSystem::Inch => 0.0254,
            UnitSystem::Foot => 0.3048,
        }
    }
}

impl fmt::Display for UnitSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown unit system {0:?}")]
pub struct UnknownUnit(pub String);

impl FromStr for UnitSystem {
    type Err = UnknownUnit;

    /// Case-insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        UnitSystem::ALL
            .into_iter()
            .find(|unit| unit.token().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownUnit(s.to_string()))
    }
}
