//! Application state management
//!
//! This module provides the shared application state that is passed
//! to all request handlers via Axum's state extraction.
//!
//! # Design Principles
//!
//! 1. **Tables are chosen once**: the metrics tables and meal-type defaults
//!    are fixed at startup and never change while serving
//! 2. **Cheap cloning**: All fields use Arc or are Copy
//! 3. **Immutable after creation**: State is read-only during request handling

use crate::config::AppConfig;
use projhealth_shared::{MealTypeDefaults, MetricsEngine, MetricsTables, PlanNormalizer};
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Metrics calculator bound to the current tables
    pub metrics: MetricsEngine,
    /// Plan normalizer bound to the current meal-type defaults
    pub plans: Arc<PlanNormalizer>,
}

impl AppState {
    /// Create state with the current (V1) tables
    pub fn new(config: AppConfig) -> Self {
        Self::with_tables(config, MetricsTables::V1, MealTypeDefaults::V1)
    }

    pub fn with_tables(config: AppConfig, tables: MetricsTables, defaults: MealTypeDefaults) -> Self {
        Self {
            config: Arc::new(config),
            metrics: MetricsEngine::new(tables),
            plans: Arc::new(PlanNormalizer::new(defaults)),
        }
    }

    /// Get a reference to the configuration
    #[inline]
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    #[inline]
    pub fn metrics(&self) -> &MetricsEngine {
        &self.metrics
    }

    #[inline]
    pub fn plans(&self) -> &PlanNormalizer {
        &self.plans
    }
}
