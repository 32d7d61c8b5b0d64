//! Plan vs. metrics comparison
//!
//! Lines each day's totals up against the calorie target and macro grams
//! computed from the user's profile.

use super::json::to_count;
use super::CanonicalPlan;
use crate::health_metrics::MetricsResult;
use serde::{Deserialize, Serialize};

/// Relative calorie deviation still counted as on target
pub const CALORIE_TOLERANCE: f64 = 0.10;

/// Planned amount next to its target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetDelta {
    pub planned: u32,
    pub target: u32,
    /// `planned - target`
    pub delta: i64,
}

impl TargetDelta {
    pub fn new(planned: u32, target: u32) -> Self {
        Self {
            planned,
            target,
            delta: i64::from(planned) - i64::from(target),
        }
    }

    /// Whether `planned` is within `tolerance` of a positive target
    pub fn within(&self, tolerance: f64) -> bool {
        self.target > 0 && (self.delta.unsigned_abs() as f64) <= self.target as f64 * tolerance
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayTargetComparison {
    pub day: String,
    pub calories: TargetDelta,
    pub protein: TargetDelta,
    pub carbs: TargetDelta,
    pub fats: TargetDelta,
    pub calories_on_target: bool,
}

/// Compare every day of a plan against the metrics targets, in plan order
pub fn compare_to_targets(plan: &CanonicalPlan, metrics: &MetricsResult) -> Vec<DayTargetComparison> {
    let calorie_target = to_count(metrics.calorie_target);
    plan.iter()
        .map(|(key, day)| {
            let totals = &day.daily_totals;
            let calories = TargetDelta::new(totals.calories, calorie_target);
            DayTargetComparison {
                day: key.to_string(),
                calories,
                protein: TargetDelta::new(totals.protein, metrics.macros.protein_grams),
                carbs: TargetDelta::new(totals.carbs, metrics.macros.carb_grams),
                fats: TargetDelta::new(totals.fats, metrics.macros.fat_grams),
                calories_on_target: calories.within(CALORIE_TOLERANCE),
            }
        })
        .collect()
}
