pub mod middleware;
pub mod rest;
pub mod state;

pub use middleware::require_user_id;
pub use state::AppState;

use axum::{
    middleware as axum_middleware,
    routing::{get, post, put},
    Router,
};
use rest::*;
use std::sync::Arc;

/// Builds the API router. Every route sits behind `require_user_id`.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/dashboard", get(get_dashboard_handler))
        .route("/statistics", get(get_statistics_handler))
        .route("/net-tracker", get(get_net_tracker_handler))
        .route("/exam-analysis", get(get_exam_analysis_handler))
        .route("/goals", get(get_goals_handler).put(update_goals_handler))
        .route("/subjects", get(list_subjects_handler).post(create_subject_handler))
        .route("/exams", post(create_exam_handler))
        .route("/study-sessions", post(create_study_session_handler))
        .route(
            "/study-sessions/{id}",
            put(update_study_session_handler).delete(delete_study_session_handler),
        )
        .route("/study-plan/generate", post(generate_schedule_handler))
        .route("/study-plan/tasks/{id}/complete", post(complete_task_handler))
        .route("/study-plan/{day}", get(get_day_plan_handler))
        .route("/recommendations/{kind}", post(recommendation_handler))
        .layer(axum_middleware::from_fn(require_user_id))
        .with_state(state)
}
