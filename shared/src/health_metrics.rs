//! Health metrics calculations module
//!
//! Provides BMI, BMR, TDEE, calorie target and macro split calculations
//! from a user profile.
//!
//! # Design Principles
//!
//! 1. **Pure Functions**: All calculations are pure, no side effects
//! 2. **Tolerant**: Missing or non-positive inputs produce `0.0` sentinels
//!    (or `None` for a whole result), never a panic or NaN
//! 3. **Versioned Tables**: Every lookup constant lives in [`MetricsTables`],
//!    which is handed to a [`MetricsEngine`] rather than inlined in formulas
//! 4. **Type Safety**: Unit tags travel with raw values until conversion

use crate::errors::UnitParseError;
use crate::units::{HeightUnit, WeightUnit};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

// ============================================================================
// Profile Types
// ============================================================================

/// Biological sex for physiological calculations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BiologicalSex {
    Male,
    Female,
}

impl std::str::FromStr for BiologicalSex {
    type Err = UnitParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "male" | "m" => Ok(BiologicalSex::Male),
            "female" | "f" => Ok(BiologicalSex::Female),
            _ => Err(UnitParseError::BiologicalSex(s.to_string())),
        }
    }
}

/// Activity level for TDEE calculation, as offered by the onboarding wizard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    /// Little to no exercise
    #[default]
    Sedentary,
    /// Light exercise 1-3 days/week
    LightlyActive,
    /// Moderate exercise 3-5 days/week
    ModeratelyActive,
    /// Intense exercise 6-7 days/week
    Active,
    /// Highly strenuous exercise and physical job
    VeryActive,
}

impl ActivityLevel {
    pub const ALL: [ActivityLevel; 5] = [
        ActivityLevel::Sedentary,
        ActivityLevel::LightlyActive,
        ActivityLevel::ModeratelyActive,
        ActivityLevel::Active,
        ActivityLevel::VeryActive,
    ];

    /// Stable identifier used by the onboarding record
    pub fn id(&self) -> &'static str {
        match self {
            ActivityLevel::Sedentary => "sedentary",
            ActivityLevel::LightlyActive => "lightly_active",
            ActivityLevel::ModeratelyActive => "moderately_active",
            ActivityLevel::Active => "active",
            ActivityLevel::VeryActive => "very_active",
        }
    }
}

impl fmt::Display for ActivityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl std::str::FromStr for ActivityLevel {
    type Err = UnitParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = normalize_tag(s);
        ActivityLevel::ALL
            .into_iter()
            .find(|level| level.id() == normalized)
            .ok_or_else(|| UnitParseError::ActivityLevel(s.to_string()))
    }
}

/// Primary fitness goal chosen during onboarding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PrimaryGoal {
    LoseWeight,
    GainMuscle,
    ImproveEndurance,
    #[default]
    MaintainWeight,
    GeneralWellness,
}

impl PrimaryGoal {
    pub const ALL: [PrimaryGoal; 5] = [
        PrimaryGoal::LoseWeight,
        PrimaryGoal::GainMuscle,
        PrimaryGoal::ImproveEndurance,
        PrimaryGoal::MaintainWeight,
        PrimaryGoal::GeneralWellness,
    ];

    /// Stable identifier used by the onboarding record
    pub fn id(&self) -> &'static str {
        match self {
            PrimaryGoal::LoseWeight => "lose_weight",
            PrimaryGoal::GainMuscle => "gain_muscle",
            PrimaryGoal::ImproveEndurance => "improve_endurance",
            PrimaryGoal::MaintainWeight => "maintain_weight",
            PrimaryGoal::GeneralWellness => "general_wellness",
        }
    }

    /// Fitness goal phrase expected by the workout plan generator
    pub fn workout_focus(&self) -> &'static str {
        match self {
            PrimaryGoal::LoseWeight => "Fat loss and improved conditioning",
            PrimaryGoal::GainMuscle => "Increase strength and improve muscle definition",
            PrimaryGoal::ImproveEndurance => "Improve overall fitness and endurance",
            PrimaryGoal::MaintainWeight => "General fitness and maintenance",
            PrimaryGoal::GeneralWellness => "General fitness",
        }
    }
}

impl fmt::Display for PrimaryGoal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl std::str::FromStr for PrimaryGoal {
    type Err = UnitParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = normalize_tag(s);
        PrimaryGoal::ALL
            .into_iter()
            .find(|goal| goal.id() == normalized)
            .ok_or_else(|| UnitParseError::PrimaryGoal(s.to_string()))
    }
}

/// Map a free-form goal label to the workout generator's goal phrase
///
/// Accepts both the wizard's display labels ("lose weight", "fat loss",
/// "build muscle", ...) and onboarding goal ids.
pub fn map_fitness_goal(goal: &str) -> &'static str {
    match goal.trim().to_lowercase().as_str() {
        "lose weight" | "fat loss" => "Fat loss and improved conditioning",
        "build muscle" => "Increase strength and improve muscle definition",
        "improve fitness" => "Improve overall fitness and endurance",
        "maintain weight" | "maintain" => "General fitness and maintenance",
        other => other
            .parse::<PrimaryGoal>()
            .map(|g| g.workout_focus())
            .unwrap_or("General fitness"),
    }
}

fn normalize_tag(s: &str) -> String {
    s.trim().to_lowercase().replace([' ', '-'], "_")
}

/// User profile data needed for health calculations
///
/// Raw values keep their unit tags; conversion happens inside the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub height_value: f64,
    #[serde(default)]
    pub height_unit: HeightUnit,
    #[serde(default)]
    pub weight_value: f64,
    #[serde(default)]
    pub weight_unit: WeightUnit,
    #[serde(default)]
    pub date_of_birth: Option<NaiveDate>,
    /// Anything other than `Male` uses the female formula constant
    #[serde(default)]
    pub biological_sex: Option<BiologicalSex>,
    #[serde(default)]
    pub activity_level: ActivityLevel,
    #[serde(default)]
    pub primary_goal: PrimaryGoal,
}

// ============================================================================
// Lookup Tables
// ============================================================================

/// Activity multipliers for TDEE
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ActivityMultipliers {
    pub sedentary: f64,
    pub lightly_active: f64,
    pub moderately_active: f64,
    pub active: f64,
    pub very_active: f64,
}

impl ActivityMultipliers {
    pub fn get(&self, level: ActivityLevel) -> f64 {
        match level {
            ActivityLevel::Sedentary => self.sedentary,
            ActivityLevel::LightlyActive => self.lightly_active,
            ActivityLevel::ModeratelyActive => self.moderately_active,
            ActivityLevel::Active => self.active,
            ActivityLevel::VeryActive => self.very_active,
        }
    }
}

/// One value per primary goal
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GoalTable<T> {
    pub lose_weight: T,
    pub gain_muscle: T,
    pub improve_endurance: T,
    pub maintain_weight: T,
    pub general_wellness: T,
}

impl<T> GoalTable<T> {
    pub fn get(&self, goal: PrimaryGoal) -> &T {
        match goal {
            PrimaryGoal::LoseWeight => &self.lose_weight,
            PrimaryGoal::GainMuscle => &self.gain_muscle,
            PrimaryGoal::ImproveEndurance => &self.improve_endurance,
            PrimaryGoal::MaintainWeight => &self.maintain_weight,
            PrimaryGoal::GeneralWellness => &self.general_wellness,
        }
    }
}

/// Calorie adjustment applied to TDEE for a goal
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CalorieRule {
    /// Added to TDEE (negative for a deficit)
    pub offset_kcal: f64,
    /// Floor for the adjusted target, if any; a floor above TDEE stops at TDEE
    pub minimum_kcal: Option<f64>,
}

/// Share of calories per macronutrient, in whole percent (sums to 100)
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MacroSplit {
    pub protein_percent: f64,
    pub carbs_percent: f64,
    pub fat_percent: f64,
}

/// Energy density per gram of each macronutrient
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EnergyDensity {
    pub protein_kcal_per_g: f64,
    pub carbs_kcal_per_g: f64,
    pub fat_kcal_per_g: f64,
}

/// Immutable, versioned lookup tables used by [`MetricsEngine`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MetricsTables {
    pub version: &'static str,
    pub activity_multipliers: ActivityMultipliers,
    pub calorie_rules: GoalTable<CalorieRule>,
    pub macro_splits: GoalTable<MacroSplit>,
    pub energy_density: EnergyDensity,
}

const MAINTENANCE: CalorieRule = CalorieRule {
    offset_kcal: 0.0,
    minimum_kcal: None,
};

impl MetricsTables {
    pub const V1: MetricsTables = MetricsTables {
        version: "v1",
        activity_multipliers: ActivityMultipliers {
            sedentary: 1.2,
            lightly_active: 1.375,
            moderately_active: 1.55,
            active: 1.725,
            very_active: 1.9,
        },
        calorie_rules: GoalTable {
            lose_weight: CalorieRule {
                offset_kcal: -500.0,
                minimum_kcal: Some(1200.0),
            },
            gain_muscle: CalorieRule {
                offset_kcal: 300.0,
                minimum_kcal: None,
            },
            improve_endurance: MAINTENANCE,
            maintain_weight: MAINTENANCE,
            general_wellness: MAINTENANCE,
        },
        macro_splits: GoalTable {
            lose_weight: MacroSplit {
                protein_percent: 35.0,
                carbs_percent: 35.0,
                fat_percent: 30.0,
            },
            gain_muscle: MacroSplit {
                protein_percent: 40.0,
                carbs_percent: 40.0,
                fat_percent: 20.0,
            },
            improve_endurance: MacroSplit {
                protein_percent: 25.0,
                carbs_percent: 55.0,
                fat_percent: 20.0,
            },
            maintain_weight: MacroSplit {
                protein_percent: 30.0,
                carbs_percent: 40.0,
                fat_percent: 30.0,
            },
            general_wellness: MacroSplit {
                protein_percent: 30.0,
                carbs_percent: 40.0,
                fat_percent: 30.0,
            },
        },
        energy_density: EnergyDensity {
            protein_kcal_per_g: 4.0,
            carbs_kcal_per_g: 4.0,
            fat_kcal_per_g: 9.0,
        },
    };
}

impl Default for MetricsTables {
    fn default() -> Self {
        Self::V1
    }
}

// ============================================================================
// BMI Calculations
// ============================================================================

/// BMI category classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BmiCategory {
    Underweight,
    Healthy,
    Overweight,
    Obese,
}

impl BmiCategory {
    /// Display color hint for dashboards
    pub fn color(&self) -> &'static str {
        match self {
            BmiCategory::Underweight => "#3B82F6",
            BmiCategory::Healthy => "#10B981",
            BmiCategory::Overweight => "#F59E0B",
            BmiCategory::Obese => "#EF4444",
        }
    }
}

/// BMI category with its presentation color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BmiClassification {
    pub category: BmiCategory,
    pub color: &'static str,
}

/// Convert tagged height/weight to meters and kilograms
///
/// Returns `None` unless both convert to positive, finite values.
pub fn to_metric(
    height: f64,
    weight: f64,
    height_unit: HeightUnit,
    weight_unit: WeightUnit,
) -> Option<(f64, f64)> {
    let height_m = height_unit.to_meters(height);
    let weight_kg = weight_unit.to_kg(weight);
    let valid = |v: f64| v.is_finite() && v > 0.0;
    (valid(height_m) && valid(weight_kg)).then_some((height_m, weight_kg))
}

/// Calculate BMI from tagged height and weight
///
/// Formula: BMI = weight(kg) / height(m)². Returns `0.0` when height or
/// weight is not positive.
pub fn calculate_bmi(
    height: f64,
    weight: f64,
    height_unit: HeightUnit,
    weight_unit: WeightUnit,
) -> f64 {
    match to_metric(height, weight, height_unit, weight_unit) {
        Some((height_m, weight_kg)) => weight_kg / (height_m * height_m),
        None => 0.0,
    }
}

/// Classify BMI into category
pub fn classify_bmi(bmi: f64) -> BmiCategory {
    if bmi < 18.5 {
        BmiCategory::Underweight
    } else if bmi < 25.0 {
        BmiCategory::Healthy
    } else if bmi < 30.0 {
        BmiCategory::Overweight
    } else {
        BmiCategory::Obese
    }
}

/// Classify BMI and attach the category color
pub fn get_bmi_category(bmi: f64) -> BmiClassification {
    let category = classify_bmi(bmi);
    BmiClassification {
        category,
        color: category.color(),
    }
}

// ============================================================================
// BMR and TDEE Calculations
// ============================================================================

/// Whole years between a date of birth and `today`
///
/// `None` for a date of birth in the future.
pub fn age_in_years(date_of_birth: NaiveDate, today: NaiveDate) -> Option<i32> {
    today
        .years_since(date_of_birth)
        .and_then(|years| i32::try_from(years).ok())
}

/// Calculate Basal Metabolic Rate using Mifflin-St Jeor equation
///
/// Men: BMR = 10 × weight(kg) + 6.25 × height(cm) - 5 × age(y) + 5
/// Women: BMR = 10 × weight(kg) + 6.25 × height(cm) - 5 × age(y) - 161
pub fn calculate_bmr_mifflin(weight_kg: f64, height_cm: f64, age_years: i32, sex: BiologicalSex) -> f64 {
    let base = 10.0 * weight_kg + 6.25 * height_cm - 5.0 * age_years as f64;
    match sex {
        BiologicalSex::Male => base + 5.0,
        BiologicalSex::Female => base - 161.0,
    }
}

/// Calculate BMR from tagged inputs, with age measured up to today
///
/// Returns `0.0` for invalid height/weight or a missing date of birth.
pub fn calculate_bmr(
    height: f64,
    weight: f64,
    sex: BiologicalSex,
    date_of_birth: Option<NaiveDate>,
    height_unit: HeightUnit,
    weight_unit: WeightUnit,
) -> f64 {
    calculate_bmr_on(
        height,
        weight,
        sex,
        date_of_birth,
        height_unit,
        weight_unit,
        Utc::now().date_naive(),
    )
}

/// [`calculate_bmr`] with an explicit reference date
pub fn calculate_bmr_on(
    height: f64,
    weight: f64,
    sex: BiologicalSex,
    date_of_birth: Option<NaiveDate>,
    height_unit: HeightUnit,
    weight_unit: WeightUnit,
    today: NaiveDate,
) -> f64 {
    let Some((_, weight_kg)) = to_metric(height, weight, height_unit, weight_unit) else {
        return 0.0;
    };
    let Some(age) = date_of_birth.and_then(|dob| age_in_years(dob, today)) else {
        debug!("Missing or future date of birth, BMR unavailable");
        return 0.0;
    };
    calculate_bmr_mifflin(weight_kg, height_unit.to_cm(height), age, sex).max(0.0)
}

/// Calculate Total Daily Energy Expenditure with the V1 tables
///
/// TDEE = BMR × Activity Multiplier
pub fn calculate_tdee(bmr: f64, activity_level: ActivityLevel) -> f64 {
    MetricsEngine::default().tdee(bmr, activity_level)
}

/// Calculate the daily calorie target for a goal with the V1 tables
pub fn calculate_calorie_target(tdee: f64, primary_goal: PrimaryGoal) -> f64 {
    MetricsEngine::default().calorie_target(tdee, primary_goal)
}

/// Split a calorie target into macronutrient grams with the V1 tables
pub fn calculate_macros(calorie_target: f64, primary_goal: PrimaryGoal) -> Macros {
    MetricsEngine::default().macros(calorie_target, primary_goal)
}

/// Compute every dashboard metric for a profile with the V1 tables
pub fn compute_metrics(profile: &Profile) -> Option<MetricsResult> {
    MetricsEngine::default().compute(profile)
}

// ============================================================================
// Results
// ============================================================================

/// Recommended daily macronutrients in grams
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Macros {
    pub protein_grams: u32,
    pub carb_grams: u32,
    pub fat_grams: u32,
}

impl Macros {
    /// Energy of these macros under the given densities
    pub fn kcal(&self, density: &EnergyDensity) -> f64 {
        self.protein_grams as f64 * density.protein_kcal_per_g
            + self.carb_grams as f64 * density.carbs_kcal_per_g
            + self.fat_grams as f64 * density.fat_kcal_per_g
    }
}

/// Display-ready health metrics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsResult {
    pub bmi: f64,
    pub bmi_category: BmiCategory,
    pub bmi_color: String,
    /// kcal/day
    pub bmr: f64,
    /// kcal/day
    pub tdee: f64,
    /// kcal/day
    pub calorie_target: f64,
    pub macros: Macros,
    pub weight_unit: WeightUnit,
    pub tables_version: String,
}

// ============================================================================
// Engine
// ============================================================================

/// Metrics calculator bound to one set of lookup tables
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricsEngine {
    tables: MetricsTables,
}

impl Default for MetricsEngine {
    fn default() -> Self {
        Self::new(MetricsTables::V1)
    }
}

impl MetricsEngine {
    pub fn new(tables: MetricsTables) -> Self {
        Self { tables }
    }

    pub fn tables(&self) -> &MetricsTables {
        &self.tables
    }

    /// TDEE = BMR × activity multiplier; `0.0` for a non-positive BMR
    pub fn tdee(&self, bmr: f64, activity_level: ActivityLevel) -> f64 {
        if !(bmr.is_finite() && bmr > 0.0) {
            return 0.0;
        }
        bmr * self.tables.activity_multipliers.get(activity_level)
    }

    /// TDEE adjusted by the goal's calorie rule, rounded to whole kcal
    pub fn calorie_target(&self, tdee: f64, primary_goal: PrimaryGoal) -> f64 {
        if !(tdee.is_finite() && tdee > 0.0) {
            return 0.0;
        }
        let rule = self.tables.calorie_rules.get(primary_goal);
        let adjusted = tdee + rule.offset_kcal;
        let floored = match rule.minimum_kcal {
            Some(min) => adjusted.max(min.min(tdee)),
            None => adjusted,
        };
        floored.round()
    }

    /// Split calories by the goal's percentages, each component rounded independently
    pub fn macros(&self, calorie_target: f64, primary_goal: PrimaryGoal) -> Macros {
        if !(calorie_target.is_finite() && calorie_target > 0.0) {
            return Macros::default();
        }
        let split = self.tables.macro_splits.get(primary_goal);
        let density = &self.tables.energy_density;
        let grams = |percent: f64, kcal_per_g: f64| {
            (calorie_target * percent / 100.0 / kcal_per_g).round().max(0.0) as u32
        };
        Macros {
            protein_grams: grams(split.protein_percent, density.protein_kcal_per_g),
            carb_grams: grams(split.carbs_percent, density.carbs_kcal_per_g),
            fat_grams: grams(split.fat_percent, density.fat_kcal_per_g),
        }
    }

    /// Compute every metric, measuring age up to today
    pub fn compute(&self, profile: &Profile) -> Option<MetricsResult> {
        self.compute_on(profile, Utc::now().date_naive())
    }

    /// Compute every metric with an explicit reference date
    ///
    /// `None` when height or weight do not convert to positive metric
    /// values; callers must treat the metrics as absent.
    pub fn compute_on(&self, profile: &Profile, today: NaiveDate) -> Option<MetricsResult> {
        if to_metric(
            profile.height_value,
            profile.weight_value,
            profile.height_unit,
            profile.weight_unit,
        )
        .is_none()
        {
            debug!(
                height = profile.height_value,
                weight = profile.weight_value,
                "Missing height or weight, metrics unavailable"
            );
            return None;
        }

        let bmi = calculate_bmi(
            profile.height_value,
            profile.weight_value,
            profile.height_unit,
            profile.weight_unit,
        );
        let classification = get_bmi_category(bmi);
        let bmr = calculate_bmr_on(
            profile.height_value,
            profile.weight_value,
            profile.biological_sex.unwrap_or(BiologicalSex::Female),
            profile.date_of_birth,
            profile.height_unit,
            profile.weight_unit,
            today,
        );
        let tdee = self.tdee(bmr, profile.activity_level);
        let calorie_target = self.calorie_target(tdee, profile.primary_goal);
        let macros = self.macros(calorie_target, profile.primary_goal);

        Some(MetricsResult {
            bmi,
            bmi_category: classification.category,
            bmi_color: classification.color.to_string(),
            bmr,
            tdee,
            calorie_target,
            macros,
            weight_unit: profile.weight_unit,
            tables_version: self.tables.version.to_string(),
        })
    }
}
