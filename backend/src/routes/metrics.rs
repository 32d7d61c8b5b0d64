//! Health metrics API routes

use crate::error::ApiResult;
use crate::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    routing::{get, post},
    Json, Router,
};
use projhealth_shared::types::{GoalFocusResponse, MetricsResponse, OnboardingRecord, TablesResponse};
use projhealth_shared::{map_fitness_goal, Profile};
use tracing::debug;

/// Create metrics routes
pub fn metrics_routes() -> Router<AppState> {
    Router::new()
        .route("/metrics", post(compute_metrics))
        .route("/metrics/onboarding", post(compute_from_onboarding))
        .route("/metrics/tables", get(get_tables))
        .route("/metrics/goals/:goal", get(get_goal_focus))
}

/// POST /api/v1/metrics - BMI, BMR, TDEE, calorie target and macros for a profile
///
/// `metrics` is `null` when height or weight are missing or not positive.
async fn compute_metrics(
    State(state): State<AppState>,
    payload: Result<Json<Profile>, JsonRejection>,
) -> ApiResult<Json<MetricsResponse>> {
    let Json(profile) = payload?;
    let metrics = state.metrics().compute(&profile);
    debug!(available = metrics.is_some(), "Computed profile metrics");
    Ok(Json(MetricsResponse { metrics }))
}

/// POST /api/v1/metrics/onboarding - Metrics straight from a stored onboarding document
async fn compute_from_onboarding(
    State(state): State<AppState>,
    payload: Result<Json<OnboardingRecord>, JsonRejection>,
) -> ApiResult<Json<MetricsResponse>> {
    let Json(record) = payload?;
    let metrics = state.metrics().compute(&record.to_profile());
    debug!(available = metrics.is_some(), "Computed onboarding metrics");
    Ok(Json(MetricsResponse { metrics }))
}

/// GET /api/v1/metrics/tables - Lookup tables in use
async fn get_tables(State(state): State<AppState>) -> Json<TablesResponse> {
    Json(TablesResponse {
        metrics: *state.metrics().tables(),
        meal_defaults: *state.plans().defaults(),
    })
}

/// GET /api/v1/metrics/goals/:goal - Workout generator phrase for a goal id or label
async fn get_goal_focus(Path(goal): Path<String>) -> Json<GoalFocusResponse> {
    let workout_focus = map_fitness_goal(&goal).to_string();
    Json(GoalFocusResponse { goal, workout_focus })
}
