//! Unit conversion for profile measurements
//!
//! Profiles arrive in whatever units the user picked during onboarding.
//! Formulas only ever see metric values, so every conversion happens here.
//!
//! # Conventions
//!
//! 1. **Feet are total inches**: the onboarding wizard stores a `ft` height
//!    as the total number of inches, so `Ft` and `In` convert identically
//! 2. **Pounds use 2.205**: the dashboard divides by 2.205, and metrics must
//!    match what users already saw there

use crate::errors::UnitParseError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Pounds per kilogram
pub const LBS_PER_KG: f64 = 2.205;

/// Meters per inch
pub const METERS_PER_INCH: f64 = 0.0254;

// ============================================================================
// Weight Units
// ============================================================================

/// Weight unit tag accompanying a raw weight value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum WeightUnit {
    #[default]
    Kg,
    Lbs,
}

impl WeightUnit {
    /// Convert from this unit to kilograms
    pub fn to_kg(&self, value: f64) -> f64 {
        match self {
            WeightUnit::Kg => value,
            WeightUnit::Lbs => value / LBS_PER_KG,
        }
    }

    /// Convert from kilograms to this unit
    pub fn from_kg(&self, kg: f64) -> f64 {
        match self {
            WeightUnit::Kg => kg,
            WeightUnit::Lbs => kg * LBS_PER_KG,
        }
    }

    /// Get the unit abbreviation
    pub fn abbreviation(&self) -> &'static str {
        match self {
            WeightUnit::Kg => "kg",
            WeightUnit::Lbs => "lbs",
        }
    }
}

impl fmt::Display for WeightUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.abbreviation())
    }
}

impl std::str::FromStr for WeightUnit {
    type Err = UnitParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "kg" | "kgs" | "kilogram" | "kilograms" => Ok(WeightUnit::Kg),
            "lbs" | "lb" | "pound" | "pounds" => Ok(WeightUnit::Lbs),
            _ => Err(UnitParseError::Weight(s.to_string())),
        }
    }
}

// ============================================================================
// Height Units
// ============================================================================

/// Height unit tag accompanying a raw height value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum HeightUnit {
    #[default]
    Cm,
    In,
    /// Feet and inches, stored as total inches
    Ft,
}

impl HeightUnit {
    /// Convert from this unit to meters
    pub fn to_meters(&self, value: f64) -> f64 {
        match self {
            HeightUnit::Cm => value / 100.0,
            HeightUnit::In | HeightUnit::Ft => value * METERS_PER_INCH,
        }
    }

    /// Convert from this unit to centimeters
    pub fn to_cm(&self, value: f64) -> f64 {
        match self {
            HeightUnit::Cm => value,
            HeightUnit::In | HeightUnit::Ft => value * METERS_PER_INCH * 100.0,
        }
    }

    /// Convert from centimeters to this unit
    pub fn from_cm(&self, cm: f64) -> f64 {
        match self {
            HeightUnit::Cm => cm,
            HeightUnit::In | HeightUnit::Ft => cm / 100.0 / METERS_PER_INCH,
        }
    }

    /// Get the unit abbreviation
    pub fn abbreviation(&self) -> &'static str {
        match self {
            HeightUnit::Cm => "cm",
            HeightUnit::In => "in",
            HeightUnit::Ft => "ft",
        }
    }
}

impl fmt::Display for HeightUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.abbreviation())
    }
}

impl std::str::FromStr for HeightUnit {
    type Err = UnitParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cm" | "centimeter" | "centimeters" => Ok(HeightUnit::Cm),
            "in" | "inch" | "inches" => Ok(HeightUnit::In),
            "ft" | "feet" | "ft/in" | "feet/inches" => Ok(HeightUnit::Ft),
            _ => Err(UnitParseError::Height(s.to_string())),
        }
    }
}

// ============================================================================
// Height Display Helper
// ============================================================================

/// Height split into feet and inches, as entered in the onboarding form
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeetInchesHeight {
    pub feet: i32,
    pub inches: f64,
}

impl FeetInchesHeight {
    /// Create from total inches
    pub fn from_total_inches(total_inches: f64) -> Self {
        let feet = (total_inches / 12.0).floor() as i32;
        let inches = total_inches - feet as f64 * 12.0;
        Self { feet, inches }
    }

    /// Convert to total inches, the value stored for a `ft` height
    pub fn to_total_inches(&self) -> f64 {
        (self.feet as f64 * 12.0) + self.inches
    }

    /// Create from centimeters, rounding to the nearest whole inch
    pub fn from_cm(cm: f64) -> Self {
        Self::from_total_inches(HeightUnit::In.from_cm(cm).round())
    }

    /// Convert to centimeters
    pub fn to_cm(&self) -> f64 {
        HeightUnit::Ft.to_cm(self.to_total_inches())
    }
}

impl fmt::Display for FeetInchesHeight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}'{:.0}\"", self.feet, self.inches)
    }
}

/// Height in the unit the user picked, e.g. `5'10"` or `178 cm`
pub fn format_height(height_cm: f64, unit: HeightUnit) -> String {
    match unit {
        HeightUnit::Cm => format!("{:.0} cm", height_cm),
        HeightUnit::In => format!("{:.0} in", HeightUnit::In.from_cm(height_cm)),
        HeightUnit::Ft => FeetInchesHeight::from_cm(height_cm).to_string(),
    }
}

/// Weight in the unit the user picked, to one decimal
pub fn format_weight(weight_kg: f64, unit: WeightUnit) -> String {
    format!("{:.1} {}", unit.from_kg(weight_kg), unit)
}
