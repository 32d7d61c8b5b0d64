//! Dashboard API route
//!
//! One call gives the dashboard everything it renders: the profile's
//! metrics, the canonical plan and how each plan day compares to the
//! targets. A bad plan never hides the metrics.

use crate::error::ApiResult;
use crate::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};
use projhealth_shared::types::{DashboardRequest, DashboardResponse, PlanStatus};
use projhealth_shared::{compare_to_targets, CanonicalPlan};
use serde_json::Value;
use tracing::{debug, warn};

/// Create dashboard routes
pub fn dashboard_routes() -> Router<AppState> {
    Router::new().route("/dashboard", post(get_dashboard))
}

/// POST /api/v1/dashboard
async fn get_dashboard(
    State(state): State<AppState>,
    payload: Result<Json<DashboardRequest>, JsonRejection>,
) -> ApiResult<Json<DashboardResponse>> {
    let Json(request) = payload?;

    let metrics = state.metrics().compute(&request.profile);
    let (plan, plan_status) = resolve_plan(&state, request.plan.as_ref());

    let targets = match (&metrics, &plan) {
        (Some(metrics), Some(plan)) => compare_to_targets(plan, metrics),
        _ => Vec::new(),
    };

    debug!(
        metrics = metrics.is_some(),
        plan_status = ?plan_status,
        days = targets.len(),
        "Built dashboard"
    );

    Ok(Json(DashboardResponse {
        metrics,
        plan,
        plan_status,
        targets,
    }))
}

fn resolve_plan(state: &AppState, raw: Option<&Value>) -> (Option<CanonicalPlan>, PlanStatus) {
    match raw {
        None | Some(Value::Null) => (None, PlanStatus::Missing),
        Some(raw) => match state.plans().normalize(raw) {
            Ok(plan) => (Some(plan), PlanStatus::Available),
            Err(err) => {
                warn!(error = %err, "Dashboard plan could not be normalized");
                (None, PlanStatus::Unavailable)
            }
        },
    }
}
