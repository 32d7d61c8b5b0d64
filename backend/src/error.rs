//! Application error handling
//!
//! This module provides unified error handling for the API,
//! converting internal errors to appropriate HTTP responses.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use projhealth_shared::PlanError;
use serde::Serialize;
use thiserror::Error;
use tracing::warn;

/// API error type that can be converted to HTTP responses
#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Plan(#[from] PlanError),

    #[error("Invalid request body: {0}")]
    InvalidBody(#[from] JsonRejection),
}

/// Error response body
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

/// Error detail
#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            ApiError::Plan(err @ PlanError::UnrecognizedPlanShape) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "UNRECOGNIZED_PLAN_SHAPE",
                err.to_string(),
            ),
            ApiError::InvalidBody(rejection) => {
                warn!(status = %rejection.status(), "Rejected request body: {}", rejection.body_text());
                (rejection.status(), "INVALID_BODY", rejection.body_text())
            }
        };

        let body = Json(ErrorResponse {
            error: ErrorDetail {
                code: code.to_string(),
                message,
            },
        });

        (status, body).into_response()
    }
}

/// Result type alias for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unrecognized_plan_status() {
        let error = ApiError::from(PlanError::UnrecognizedPlanShape);
        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_unrecognized_plan_body() {
        let response = ApiError::Plan(PlanError::UnrecognizedPlanShape).into_response();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value["error"]["code"], "UNRECOGNIZED_PLAN_SHAPE");
        assert!(value["error"]["message"].as_str().unwrap().contains("meal_plan.days"));
    }
}
