//! ProjHealth WASM Module
//!
//! Exposes the metrics engine and the plan normalizer to the dashboard so
//! both render the same numbers as the backend without a round trip.

use projhealth_shared::{
    compare_to_targets, ActivityLevel, BiologicalSex, FeetInchesHeight, HeightUnit, MetricsEngine,
    OnboardingRecord, PlanNormalizer, Profile, WeightUnit,
};
use serde::Serialize;
use wasm_bindgen::prelude::*;

/// Calculate BMI from a tagged height and weight
///
/// Unknown unit tags fall back to cm and kg. Returns `0.0` when height or
/// weight is not positive.
#[wasm_bindgen]
pub fn calculate_bmi(height: f64, weight: f64, height_unit: &str, weight_unit: &str) -> f64 {
    projhealth_shared::calculate_bmi(
        height,
        weight,
        height_unit.parse().unwrap_or(HeightUnit::Cm),
        weight_unit.parse().unwrap_or(WeightUnit::Kg),
    )
}

/// Calculate TDEE (Total Daily Energy Expenditure) from a BMR
///
/// Unknown activity levels use the sedentary multiplier.
#[wasm_bindgen]
pub fn calculate_tdee(bmr: f64, activity_level: &str) -> f64 {
    let level = activity_level.parse().unwrap_or(ActivityLevel::Sedentary);
    projhealth_shared::calculate_tdee(bmr, level)
}

/// Mifflin-St Jeor BMR from metric inputs
#[wasm_bindgen]
pub fn calculate_bmr(weight_kg: f64, height_cm: f64, age_years: i32, is_male: bool) -> f64 {
    let sex = if is_male {
        BiologicalSex::Male
    } else {
        BiologicalSex::Female
    };
    projhealth_shared::calculate_bmr_mifflin(weight_kg, height_cm, age_years, sex).max(0.0)
}

/// Workout generator goal phrase for an onboarding goal id or label
#[wasm_bindgen]
pub fn map_fitness_goal(goal: &str) -> String {
    projhealth_shared::map_fitness_goal(goal).to_string()
}

/// Total inches for a feet + inches entry, the value stored for a `ft` height
#[wasm_bindgen]
pub fn feet_inches_to_total_inches(feet: i32, inches: f64) -> f64 {
    FeetInchesHeight { feet, inches }.to_total_inches()
}

/// Centimeters for a feet + inches entry
#[wasm_bindgen]
pub fn feet_inches_to_cm(feet: i32, inches: f64) -> f64 {
    FeetInchesHeight { feet, inches }.to_cm()
}

/// Display string for a height in cm, in the given unit (cm when unknown)
#[wasm_bindgen]
pub fn format_height(height_cm: f64, unit: &str) -> String {
    projhealth_shared::format_height(height_cm, unit.parse().unwrap_or(HeightUnit::Cm))
}

/// Display string for a weight in kg, in the given unit (kg when unknown)
#[wasm_bindgen]
pub fn format_weight(weight_kg: f64, unit: &str) -> String {
    projhealth_shared::format_weight(weight_kg, unit.parse().unwrap_or(WeightUnit::Kg))
}

/// Dashboard metrics for a profile JSON, `"null"` when they cannot be computed
#[wasm_bindgen]
pub fn compute_metrics_json(profile_json: &str) -> Result<String, JsError> {
    compute_metrics(profile_json).map_err(|e| JsError::new(&e))
}

/// Dashboard metrics for an onboarding record JSON
#[wasm_bindgen]
pub fn compute_onboarding_metrics_json(record_json: &str) -> Result<String, JsError> {
    compute_onboarding_metrics(record_json).map_err(|e| JsError::new(&e))
}

/// Canonical day map for a raw diet plan JSON
#[wasm_bindgen]
pub fn normalize_plan_json(plan_json: &str) -> Result<String, JsError> {
    normalize_plan(plan_json).map_err(|e| JsError::new(&e))
}

/// Per-day comparison of a raw plan against a profile's targets
#[wasm_bindgen]
pub fn compare_plan_json(profile_json: &str, plan_json: &str) -> Result<String, JsError> {
    compare_plan(profile_json, plan_json).map_err(|e| JsError::new(&e))
}

fn compute_metrics(profile_json: &str) -> Result<String, String> {
    let profile: Profile = parse(profile_json)?;
    to_json(&MetricsEngine::default().compute(&profile))
}

fn compute_onboarding_metrics(record_json: &str) -> Result<String, String> {
    let record: OnboardingRecord = parse(record_json)?;
    to_json(&MetricsEngine::default().compute(&record.to_profile()))
}

fn normalize_plan(plan_json: &str) -> Result<String, String> {
    let raw: serde_json::Value = parse(plan_json)?;
    let plan = PlanNormalizer::default()
        .normalize(&raw)
        .map_err(|e| e.to_string())?;
    to_json(&plan)
}

fn compare_plan(profile_json: &str, plan_json: &str) -> Result<String, String> {
    let profile: Profile = parse(profile_json)?;
    let raw: serde_json::Value = parse(plan_json)?;
    let plan = PlanNormalizer::default()
        .normalize(&raw)
        .map_err(|e| e.to_string())?;
    let report = match MetricsEngine::default().compute(&profile) {
        Some(metrics) => compare_to_targets(&plan, &metrics),
        None => Vec::new(),
    };
    to_json(&report)
}

fn parse<T: serde::de::DeserializeOwned>(json: &str) -> Result<T, String> {
    serde_json::from_str(json).map_err(|e| format!("Invalid JSON input: {}", e))
}

fn to_json<T: Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string(value).map_err(|e| e.to_string())
}
