//! ProjHealth Shared Library
//!
//! Health metrics and diet plan normalization shared by the backend API
//! and the WASM module the dashboard loads.

pub mod errors;
pub mod health_metrics;
pub mod plan;
pub mod types;
pub mod units;

// Re-export commonly used items
pub use errors::*;
pub use health_metrics::*;
pub use types::*;
pub use units::*;

pub use plan::{
    compare_to_targets, normalize_plan, CanonicalDay, CanonicalMeal, CanonicalPlan, DailyTotals,
    DayTargetComparison, MealTypeDefaults, NutrientExtractor, PlanNormalizer, PlanShape,
};
