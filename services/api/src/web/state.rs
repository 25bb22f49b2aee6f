//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::config::Config;
use chrono::{NaiveDate, Utc};
use exam_tracker_core::ports::{ExamDataService, RecommendationService};
use exam_tracker_core::MetricsConfig;
use std::sync::Arc;

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<dyn ExamDataService>,
    /// `None` when no model key is configured; recommendation routes answer 503.
    pub recommender: Option<Arc<dyn RecommendationService>>,
    pub config: Arc<Config>,
    pub metrics: Arc<MetricsConfig>,
    /// The calendar day used for countdowns, streaks and "today" totals.
    pub today: fn() -> NaiveDate,
}

impl AppState {
    pub fn new(
        db: Arc<dyn ExamDataService>,
        recommender: Option<Arc<dyn RecommendationService>>,
        config: Arc<Config>,
        metrics: Arc<MetricsConfig>,
    ) -> Self {
        Self {
            db,
            recommender,
            config,
            metrics,
            today: utc_today,
        }
    }

    pub fn today(&self) -> NaiveDate {
        (self.today)()
    }
}

pub fn utc_today() -> NaiveDate {
    Utc::now().date_naive()
}
