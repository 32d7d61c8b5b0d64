//! API request and response types

use crate::health_metrics::{
    ActivityLevel, BiologicalSex, MetricsResult, MetricsTables, PrimaryGoal, Profile,
};
use crate::plan::{CanonicalPlan, DayTargetComparison, MealTypeDefaults};
use crate::units::{HeightUnit, WeightUnit};
use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::debug;

// ============================================================================
// Onboarding
// ============================================================================

/// Onboarding document as stored by the sign-up wizard
///
/// Height and weight are already converted to metric by the wizard.
/// Every field tolerates being empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OnboardingRecord {
    /// `YYYY-MM-DD`, or an RFC 3339 timestamp
    pub dob: String,
    pub gender: String,
    pub height_in_cm: f64,
    pub weight_in_kg: f64,
    pub primary_fitness_goal: String,
    pub target_weight: f64,
    pub daily_activity_level: String,
    pub exercise_availability: String,
    pub health_conditions: Vec<String>,
    pub other_medical_conditions: String,
    pub first_name: String,
    pub last_name: String,
}

impl OnboardingRecord {
    pub fn date_of_birth(&self) -> Option<NaiveDate> {
        let dob = self.dob.trim();
        if dob.is_empty() {
            return None;
        }
        NaiveDate::parse_from_str(dob, "%Y-%m-%d")
            .ok()
            .or_else(|| DateTime::parse_from_rfc3339(dob).ok().map(|dt| dt.date_naive()))
    }

    /// Anything other than `male` uses the female formula
    pub fn biological_sex(&self) -> BiologicalSex {
        match self.gender.parse::<BiologicalSex>() {
            Ok(BiologicalSex::Male) => BiologicalSex::Male,
            _ => BiologicalSex::Female,
        }
    }

    /// Unknown levels fall back to sedentary
    pub fn activity_level(&self) -> ActivityLevel {
        self.daily_activity_level.parse().unwrap_or_else(|_| {
            debug!(level = %self.daily_activity_level, "Unknown activity level, using sedentary");
            ActivityLevel::default()
        })
    }

    /// Unknown goals fall back to maintain_weight
    pub fn primary_goal(&self) -> PrimaryGoal {
        self.primary_fitness_goal.parse().unwrap_or_else(|_| {
            debug!(goal = %self.primary_fitness_goal, "Unknown fitness goal, using maintain_weight");
            PrimaryGoal::default()
        })
    }

    pub fn to_profile(&self) -> Profile {
        Profile {
            height_value: self.height_in_cm,
            height_unit: HeightUnit::Cm,
            weight_value: self.weight_in_kg,
            weight_unit: WeightUnit::Kg,
            date_of_birth: self.date_of_birth(),
            biological_sex: Some(self.biological_sex()),
            activity_level: self.activity_level(),
            primary_goal: self.primary_goal(),
        }
    }
}

impl From<&OnboardingRecord> for Profile {
    fn from(record: &OnboardingRecord) -> Self {
        record.to_profile()
    }
}

// ============================================================================
// Metrics
// ============================================================================

/// Metrics for a profile; `null` when height or weight are missing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsResponse {
    pub metrics: Option<MetricsResult>,
}

/// Workout generator phrase for a goal label
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalFocusResponse {
    pub goal: String,
    pub workout_focus: String,
}

/// Lookup tables currently in use
#[derive(Debug, Clone, Serialize)]
pub struct TablesResponse {
    pub metrics: MetricsTables,
    pub meal_defaults: MealTypeDefaults,
}

// ============================================================================
// Dashboard
// ============================================================================

/// Profile plus the user's latest generated plan, if any
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardRequest {
    pub profile: Profile,
    #[serde(default)]
    pub plan: Option<serde_json::Value>,
}

/// Whether the dashboard could show a diet plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanStatus {
    Available,
    /// No plan was sent
    Missing,
    /// A plan was sent but its layout was not recognized
    Unavailable,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardResponse {
    pub metrics: Option<MetricsResult>,
    pub plan: Option<CanonicalPlan>,
    pub plan_status: PlanStatus,
    /// Per-day comparison; empty unless both metrics and plan are present
    pub targets: Vec<DayTargetComparison>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_onboarding_record_to_profile() {
        let record: OnboardingRecord = serde_json::from_value(json!({
            "dob": "1990-05-15",
            "gender": "male",
            "height_in_cm": 175,
            "weight_in_kg": 70,
            "primary_fitness_goal": "lose_weight",
            "target_weight": 65,
            "daily_activity_level": "moderately_active",
            "health_conditions": ["asthma"]
        }))
        .unwrap();

        let profile = Profile::from(&record);
        assert_eq!(profile.height_value, 175.0);
        assert_eq!(profile.height_unit, HeightUnit::Cm);
        assert_eq!(profile.weight_unit, WeightUnit::Kg);
        assert_eq!(profile.date_of_birth, NaiveDate::from_ymd_opt(1990, 5, 15));
        assert_eq!(profile.biological_sex, Some(BiologicalSex::Male));
        assert_eq!(profile.activity_level, ActivityLevel::ModeratelyActive);
        assert_eq!(profile.primary_goal, PrimaryGoal::LoseWeight);
    }

    #[test]
    fn test_onboarding_fallbacks() {
        let record = OnboardingRecord {
            gender: "prefer not to say".to_string(),
            daily_activity_level: "couch".to_string(),
            primary_fitness_goal: "get swole".to_string(),
            ..Default::default()
        };
        let profile = record.to_profile();
        assert_eq!(profile.biological_sex, Some(BiologicalSex::Female));
        assert_eq!(profile.activity_level, ActivityLevel::Sedentary);
        assert_eq!(profile.primary_goal, PrimaryGoal::MaintainWeight);
        assert_eq!(profile.date_of_birth, None);
    }

    #[test]
    fn test_onboarding_accepts_timestamps_and_empty_documents() {
        let record = OnboardingRecord {
            dob: "1985-12-01T00:00:00Z".to_string(),
            ..Default::default()
        };
        assert_eq!(record.date_of_birth(), NaiveDate::from_ymd_opt(1985, 12, 1));

        let empty: OnboardingRecord = serde_json::from_value(json!({})).unwrap();
        assert_eq!(empty, OnboardingRecord::default());
        assert!(crate::health_metrics::compute_metrics(&empty.to_profile()).is_none());
    }

    #[test]
    fn test_plan_status_tags() {
        assert_eq!(serde_json::to_value(PlanStatus::Available).unwrap(), json!("available"));
        assert_eq!(serde_json::to_value(PlanStatus::Unavailable).unwrap(), json!("unavailable"));
    }

    #[test]
    fn test_dashboard_request_plan_is_optional() {
        let request: DashboardRequest = serde_json::from_value(json!({
            "profile": {"height_value": 180, "weight_value": 80}
        }))
        .unwrap();
        assert!(request.plan.is_none());
        assert_eq!(request.profile.height_value, 180.0);
    }
}
