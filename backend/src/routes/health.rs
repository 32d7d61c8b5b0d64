//! Health check endpoints
//!
//! Provides Kubernetes-compatible health check endpoints:
//! - /health - Basic health check
//! - /health/ready - Readiness check (checks the calculation tables and text patterns)
//! - /health/live - Liveness check (always returns OK if server is running)

use crate::state::AppState;
use axum::{extract::State, http::StatusCode, Json};
use projhealth_shared::NutrientExtractor;
use serde::Serialize;

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checks: Option<HealthChecks>,
}

/// Individual health checks
#[derive(Serialize)]
pub struct HealthChecks {
    pub metrics_tables: CheckStatus,
    pub nutrient_patterns: CheckStatus,
}

/// Status of an individual check
#[derive(Serialize)]
pub struct CheckStatus {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl CheckStatus {
    fn healthy(message: Option<String>) -> Self {
        Self {
            status: "healthy".to_string(),
            message,
        }
    }

    fn unhealthy(message: &str) -> Self {
        Self {
            status: "unhealthy".to_string(),
            message: Some(message.to_string()),
        }
    }

    fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}

/// Basic health check endpoint
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        checks: None,
    })
}

/// Readiness check - checks if the service is ready to accept traffic
/// Returns 503 if any check fails
pub async fn readiness_check(
    State(state): State<AppState>,
) -> Result<Json<HealthResponse>, (StatusCode, Json<HealthResponse>)> {
    let tables = state.metrics().tables();
    let metrics_tables = if tables.version.is_empty() {
        CheckStatus::unhealthy("metrics tables carry no version")
    } else {
        CheckStatus::healthy(Some(format!(
            "metrics {}, meal defaults {}",
            tables.version,
            state.plans().defaults().version
        )))
    };

    // Patterns compile lazily; a failed compile extracts nothing
    let sample = NutrientExtractor::from_text("1 cal, 2g protein, 3g carbs, 4g fat");
    let nutrient_patterns = if sample.calories == 1.0 && sample.fat == 4.0 {
        CheckStatus::healthy(None)
    } else {
        CheckStatus::unhealthy("nutrient text patterns unavailable")
    };

    let is_healthy = metrics_tables.is_healthy() && nutrient_patterns.is_healthy();

    let response = HealthResponse {
        status: if is_healthy { "ready" } else { "not_ready" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        checks: Some(HealthChecks {
            metrics_tables,
            nutrient_patterns,
        }),
    };

    if is_healthy {
        Ok(Json(response))
    } else {
        Err((StatusCode::SERVICE_UNAVAILABLE, Json(response)))
    }
}

/// Liveness check - checks if the service is alive
/// Always returns OK if the server is running
pub async fn liveness_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "alive".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        checks: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    #[tokio::test]
    async fn test_health_check_returns_healthy() {
        let response = health_check().await;
        assert_eq!(response.status, "healthy");
        assert!(!response.version.is_empty());
    }

    #[tokio::test]
    async fn test_liveness_check_returns_alive() {
        let response = liveness_check().await;
        assert_eq!(response.status, "alive");
    }

    #[tokio::test]
    async fn test_readiness_check_reports_tables() {
        let state = AppState::new(AppConfig::default());
        let Ok(Json(response)) = readiness_check(State(state)).await else {
            panic!("readiness check failed");
        };
        assert_eq!(response.status, "ready");
        let checks = response.checks.unwrap();
        assert_eq!(
            checks.metrics_tables.message.as_deref(),
            Some("metrics v1, meal defaults v1")
        );
        assert!(checks.nutrient_patterns.is_healthy());
    }
}
