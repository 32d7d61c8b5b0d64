//! Error types for the metrics and plan pipeline

use thiserror::Error;

/// Plan normalization errors
///
/// Only structural failures surface here. Value-level gaps inside a
/// recognized plan are absorbed into defaults by the normalizer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlanError {
    #[error("No recognizable plan: expected meal_plan.days, meal_plan[] or formatted_plan.days")]
    UnrecognizedPlanShape,
}

/// Errors from parsing unit, activity and goal tags
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UnitParseError {
    #[error("Unknown weight unit: {0}")]
    Weight(String),

    #[error("Unknown height unit: {0}")]
    Height(String),

    #[error("Unknown activity level: {0}")]
    ActivityLevel(String),

    #[error("Unknown primary goal: {0}")]
    PrimaryGoal(String),

    #[error("Unknown biological sex: {0}")]
    BiologicalSex(String),
}
