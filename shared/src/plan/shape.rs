//! Plan payload shape dispatch
//!
//! The plan generator has returned three different top-level layouts over
//! time. All of them are resolved here, in one ordered rule list, so the
//! rest of the normalizer only ever sees a slice of day objects.

use crate::errors::PlanError;
use serde_json::Value;

/// Recognized payload layouts, each borrowing the payload's day array
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlanShape<'a> {
    /// `{ "meal_plan": { "days": [...] } }`
    MealPlanDays(&'a [Value]),
    /// `{ "meal_plan": [...] }`
    MealPlanArray(&'a [Value]),
    /// `{ "formatted_plan": { "days": [...] } }`
    FormattedPlanDays(&'a [Value]),
}

impl<'a> PlanShape<'a> {
    /// The day objects carried by this payload
    pub fn days(&self) -> &'a [Value] {
        match self {
            PlanShape::MealPlanDays(days)
            | PlanShape::MealPlanArray(days)
            | PlanShape::FormattedPlanDays(days) => days,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            PlanShape::MealPlanDays(_) => "meal_plan.days",
            PlanShape::MealPlanArray(_) => "meal_plan[]",
            PlanShape::FormattedPlanDays(_) => "formatted_plan.days",
        }
    }
}

type ShapeRule = for<'a> fn(&'a Value) -> Option<PlanShape<'a>>;

/// Dispatch rules, first match wins
const SHAPE_RULES: [ShapeRule; 3] = [meal_plan_days, meal_plan_array, formatted_plan_days];

fn meal_plan_days(payload: &Value) -> Option<PlanShape<'_>> {
    payload
        .get("meal_plan")
        .and_then(Value::as_object)
        .and_then(|plan| plan.get("days"))
        .and_then(Value::as_array)
        .map(|days| PlanShape::MealPlanDays(days.as_slice()))
}

fn meal_plan_array(payload: &Value) -> Option<PlanShape<'_>> {
    payload
        .get("meal_plan")
        .and_then(Value::as_array)
        .map(|days| PlanShape::MealPlanArray(days.as_slice()))
}

fn formatted_plan_days(payload: &Value) -> Option<PlanShape<'_>> {
    payload
        .get("formatted_plan")
        .and_then(|plan| plan.get("days"))
        .and_then(Value::as_array)
        .map(|days| PlanShape::FormattedPlanDays(days.as_slice()))
}

/// Classify a raw payload into one of the known shapes
pub fn classify(payload: &Value) -> Result<PlanShape<'_>, PlanError> {
    SHAPE_RULES
        .iter()
        .find_map(|rule| rule(payload))
        .ok_or(PlanError::UnrecognizedPlanShape)
}
