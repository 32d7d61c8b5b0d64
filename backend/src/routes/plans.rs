//! Diet plan API routes

use crate::error::ApiResult;
use crate::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};
use projhealth_shared::CanonicalPlan;
use serde_json::Value;
use tracing::info;

/// Create plan routes
pub fn plan_routes() -> Router<AppState> {
    Router::new().route("/plans/normalize", post(normalize_plan))
}

/// POST /api/v1/plans/normalize - Canonical form of a generated diet plan
///
/// Accepts `{meal_plan: {days}}`, `{meal_plan: [...]}` or
/// `{formatted_plan: {days}}`; anything else is a 422.
async fn normalize_plan(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<CanonicalPlan>> {
    let Json(raw) = payload?;
    let plan = state.plans().normalize(&raw)?;
    info!(days = plan.len(), "Normalized meal plan");
    Ok(Json(plan))
}
