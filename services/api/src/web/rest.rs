//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the REST API endpoints and the master
//! definition for the OpenAPI specification.
//!
//! Every handler loads one `UserSnapshot` through the data port, runs the core
//! calculators over it and serializes the resulting view.

use crate::web::state::AppState;
use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use chrono::{DateTime, NaiveDate, Utc, Weekday};
use exam_tracker_core::aggregate::CategoryAggregate;
use exam_tracker_core::dashboard::{
    build_dashboard, build_day_plan, build_exam_analysis, build_goals, build_net_tracker,
    build_statistics, tasks_for_day,
};
use exam_tracker_core::domain::{
    CompletedTask, NewExamSubject, NewStudySession, NewSubject, ScheduleTask, StudySession,
    StudySessionUpdate, TargetConfig, TaskStatus, UserSnapshot,
};
use exam_tracker_core::ports::{PortError, RecommendationKind};
use exam_tracker_core::schedule::{
    generate_schedule, parse_subject_list, session_from_completed_task, SchedulePreferences,
};
use exam_tracker_core::scoring::prepare_new_exam;
use exam_tracker_core::summary::build_summary;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use tracing::{error, info, warn};
use utoipa::{OpenApi, ToSchema};
use uuid::Uuid;

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        get_dashboard_handler,
        get_statistics_handler,
        get_net_tracker_handler,
        get_exam_analysis_handler,
        get_goals_handler,
        update_goals_handler,
        list_subjects_handler,
        create_subject_handler,
        create_exam_handler,
        create_study_session_handler,
        update_study_session_handler,
        delete_study_session_handler,
        get_day_plan_handler,
        generate_schedule_handler,
        complete_task_handler,
        recommendation_handler,
    ),
    components(
        schemas(
            UpdateGoalsRequest,
            CreateSubjectRequest,
            CreateExamRequest,
            ExamSubjectInput,
            CreateStudySessionRequest,
            UpdateStudySessionRequest,
            GenerateScheduleRequest,
            RecommendationResponse,
        )
    ),
    tags(
        (name = "Exam Tracker API", description = "Exam results, study time and goal metrics for exam preparation.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// API Response and Payload Structs
//=========================================================================================

/// Goal settings. Subject keys are canonicalized before they are stored.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateGoalsRequest {
    pub target_exam_date: Option<NaiveDate>,
    pub target_score: Option<f64>,
    pub university: Option<String>,
    pub department: Option<String>,
    #[serde(default)]
    pub subject_target_nets: BTreeMap<String, f64>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateSubjectRequest {
    pub name: String,
    pub color: Option<String>,
    pub question_count: Option<u32>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ExamSubjectInput {
    pub subject_id: Uuid,
    pub correct: u32,
    pub incorrect: u32,
    #[serde(default)]
    pub empty: u32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateExamRequest {
    pub name: String,
    pub date: NaiveDate,
    pub subjects: Vec<ExamSubjectInput>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateStudySessionRequest {
    pub subject_id: Uuid,
    pub date: DateTime<Utc>,
    pub duration_minutes: u32,
    pub notes: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateStudySessionRequest {
    pub subject_id: Option<Uuid>,
    pub duration_minutes: Option<u32>,
    pub notes: Option<String>,
}

/// `subjects` is a comma separated list, e.g. `"Matematik, Fizik"`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct GenerateScheduleRequest {
    pub hours_per_day: u32,
    #[schema(value_type = Vec<String>, example = json!(["Mon", "Wed"]))]
    pub preferred_days: Vec<Weekday>,
    pub subjects: String,
    pub start_hour: u32,
    pub end_hour: u32,
    #[serde(default)]
    pub break_minutes: u32,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RecommendationResponse {
    #[schema(value_type = String)]
    pub kind: RecommendationKind,
    pub recommendation: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DayPlanResponse {
    pub day: Weekday,
    pub tasks: Vec<ScheduleTask>,
    pub categories: Vec<CategoryAggregate>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CompleteTaskResponse {
    pub task: ScheduleTask,
    /// The session logged for the task. `None` when the task was already completed,
    /// its subject is unknown or its slot has no duration.
    pub session: Option<StudySession>,
}

//=========================================================================================
// Error Mapping
//=========================================================================================

type HandlerError = (StatusCode, String);

fn port_error(context: &str, e: PortError) -> HandlerError {
    let status = match &e {
        PortError::NotFound(_) => StatusCode::NOT_FOUND,
        PortError::Conflict(_) => StatusCode::CONFLICT,
        PortError::Unauthorized => StatusCode::UNAUTHORIZED,
        PortError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
        PortError::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    error!("{}: {:?}", context, e);
    (status, format!("{}: {}", context, e))
}

fn bad_request(message: impl Into<String>) -> HandlerError {
    (StatusCode::BAD_REQUEST, message.into())
}

async fn load_snapshot(state: &AppState, user_id: Uuid) -> Result<UserSnapshot, HandlerError> {
    state
        .db
        .fetch_snapshot(user_id)
        .await
        .map_err(|e| port_error("Failed to load user data", e))
}

/// Counts and minutes are stored in `INTEGER` columns.
fn ensure_storable(field: &str, value: u32) -> Result<(), HandlerError> {
    if value > i32::MAX as u32 {
        return Err(bad_request(format!("{} must not exceed {}", field, i32::MAX)));
    }
    Ok(())
}

fn ensure_known_subject(snapshot: &UserSnapshot, subject_id: Uuid) -> Result<(), HandlerError> {
    match snapshot.subject(subject_id) {
        Some(_) => Ok(()),
        None => Err(bad_request(format!("Unknown subject {}", subject_id))),
    }
}

//=========================================================================================
// Read Views
//=========================================================================================

/// The dashboard: countdown, streak, daily goal, latest exam and subject performance.
#[utoipa::path(
    get,
    path = "/dashboard",
    responses(
        (status = 200, description = "Dashboard view"),
        (status = 401, description = "Missing x-user-id header"),
        (status = 500, description = "Internal server error")
    ),
    params(("x-user-id" = Uuid, Header, description = "The unique ID of the user."))
)]
pub async fn get_dashboard_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
) -> Result<impl IntoResponse, HandlerError> {
    let snapshot = load_snapshot(&state, user_id).await?;
    Ok(Json(build_dashboard(&snapshot, &state.metrics, state.today())))
}

#[utoipa::path(
    get,
    path = "/statistics",
    responses(
        (status = 200, description = "Subject aggregates and exam statistics"),
        (status = 500, description = "Internal server error")
    ),
    params(("x-user-id" = Uuid, Header, description = "The unique ID of the user."))
)]
pub async fn get_statistics_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
) -> Result<impl IntoResponse, HandlerError> {
    let snapshot = load_snapshot(&state, user_id).await?;
    Ok(Json(build_statistics(&snapshot, &state.metrics)))
}

#[utoipa::path(
    get,
    path = "/net-tracker",
    responses(
        (status = 200, description = "Per-exam net history with average, highest and trend"),
        (status = 500, description = "Internal server error")
    ),
    params(("x-user-id" = Uuid, Header, description = "The unique ID of the user."))
)]
pub async fn get_net_tracker_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
) -> Result<impl IntoResponse, HandlerError> {
    let snapshot = load_snapshot(&state, user_id).await?;
    Ok(Json(build_net_tracker(&snapshot)))
}

#[utoipa::path(
    get,
    path = "/exam-analysis",
    responses(
        (status = 200, description = "Score trend and per-subject net change"),
        (status = 500, description = "Internal server error")
    ),
    params(("x-user-id" = Uuid, Header, description = "The unique ID of the user."))
)]
pub async fn get_exam_analysis_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
) -> Result<impl IntoResponse, HandlerError> {
    let snapshot = load_snapshot(&state, user_id).await?;
    Ok(Json(build_exam_analysis(&snapshot)))
}

#[utoipa::path(
    get,
    path = "/goals",
    responses(
        (status = 200, description = "Composite and per-subject goal progress"),
        (status = 500, description = "Internal server error")
    ),
    params(("x-user-id" = Uuid, Header, description = "The unique ID of the user."))
)]
pub async fn get_goals_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
) -> Result<impl IntoResponse, HandlerError> {
    let snapshot = load_snapshot(&state, user_id).await?;
    Ok(Json(build_goals(&snapshot, &state.metrics, state.today())))
}

//=========================================================================================
// Goals
//=========================================================================================

/// Replace the goal settings and return the recomputed goals view.
#[utoipa::path(
    put,
    path = "/goals",
    request_body = UpdateGoalsRequest,
    responses(
        (status = 200, description = "Goals saved"),
        (status = 400, description = "A target is not a finite number"),
        (status = 500, description = "Internal server error")
    ),
    params(("x-user-id" = Uuid, Header, description = "The unique ID of the user."))
)]
pub async fn update_goals_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Json(payload): Json<UpdateGoalsRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    if payload.target_score.is_some_and(|s| !s.is_finite()) {
        return Err(bad_request("target_score must be a finite number"));
    }

    let mut subject_target_nets = BTreeMap::new();
    for (subject, target) in payload.subject_target_nets {
        if !target.is_finite() {
            return Err(bad_request(format!("Target net for '{}' must be a finite number", subject)));
        }
        let key = state.metrics.canonical(&subject);
        if key.is_empty() {
            return Err(bad_request("Subject names in targets must not be blank"));
        }
        subject_target_nets.insert(key, target);
    }

    let targets = TargetConfig {
        target_exam_date: payload.target_exam_date,
        subject_target_nets,
        target_score: payload.target_score,
        university: payload.university,
        department: payload.department,
    };

    state
        .db
        .save_targets(user_id, targets)
        .await
        .map_err(|e| port_error("Failed to save goals", e))?;
    info!(%user_id, "Goals updated");

    let snapshot = load_snapshot(&state, user_id).await?;
    Ok(Json(build_goals(&snapshot, &state.metrics, state.today())))
}

//=========================================================================================
// Subjects
//=========================================================================================

#[utoipa::path(
    get,
    path = "/subjects",
    responses(
        (status = 200, description = "The user's subjects"),
        (status = 500, description = "Internal server error")
    ),
    params(("x-user-id" = Uuid, Header, description = "The unique ID of the user."))
)]
pub async fn list_subjects_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
) -> Result<impl IntoResponse, HandlerError> {
    let snapshot = load_snapshot(&state, user_id).await?;
    Ok(Json(snapshot.subjects))
}

#[utoipa::path(
    post,
    path = "/subjects",
    request_body = CreateSubjectRequest,
    responses(
        (status = 201, description = "Subject created"),
        (status = 400, description = "Blank subject name"),
        (status = 409, description = "A subject with this name already exists"),
        (status = 500, description = "Internal server error")
    ),
    params(("x-user-id" = Uuid, Header, description = "The unique ID of the user."))
)]
pub async fn create_subject_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Json(payload): Json<CreateSubjectRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    let name = payload.name.trim();
    if name.is_empty() {
        return Err(bad_request("Subject name must not be blank"));
    }

    let subject = NewSubject {
        name: name.to_string(),
        color: payload.color.unwrap_or_else(|| "#3B82F6".to_string()),
        question_count: payload.question_count.unwrap_or(0),
    };
    ensure_storable("question_count", subject.question_count)?;

    let created = state
        .db
        .create_subject(user_id, subject)
        .await
        .map_err(|e| port_error("Failed to create subject", e))?;
    Ok((StatusCode::CREATED, Json(created)))
}

//=========================================================================================
// Exams
//=========================================================================================

/// Record an exam. Nets, score and max score are computed from the raw counts.
#[utoipa::path(
    post,
    path = "/exams",
    request_body = CreateExamRequest,
    responses(
        (status = 201, description = "Exam created"),
        (status = 400, description = "Blank name, no subjects, duplicate or unknown subject, oversized counts"),
        (status = 500, description = "Internal server error")
    ),
    params(("x-user-id" = Uuid, Header, description = "The unique ID of the user."))
)]
pub async fn create_exam_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Json(payload): Json<CreateExamRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    if payload.name.trim().is_empty() {
        return Err(bad_request("Exam name must not be blank"));
    }
    if payload.subjects.is_empty() {
        return Err(bad_request("An exam needs at least one subject result"));
    }

    let snapshot = load_snapshot(&state, user_id).await?;
    let mut seen = HashSet::new();
    for input in &payload.subjects {
        if !seen.insert(input.subject_id) {
            return Err(bad_request(format!("Subject {} appears twice", input.subject_id)));
        }
        ensure_known_subject(&snapshot, input.subject_id)?;
    }

    let counts: Vec<NewExamSubject> = payload
        .subjects
        .iter()
        .map(|s| NewExamSubject {
            subject_id: s.subject_id,
            correct: s.correct,
            incorrect: s.incorrect,
            empty: s.empty,
        })
        .collect();

    // The question total bounds every single count.
    let new_exam = prepare_new_exam(&payload.name, payload.date, &counts);
    ensure_storable("Total question count", new_exam.max_score)?;

    let exam = state
        .db
        .create_exam(user_id, new_exam)
        .await
        .map_err(|e| port_error("Failed to create exam", e))?;
    Ok((StatusCode::CREATED, Json(exam)))
}

//=========================================================================================
// Study Sessions
//=========================================================================================

#[utoipa::path(
    post,
    path = "/study-sessions",
    request_body = CreateStudySessionRequest,
    responses(
        (status = 201, description = "Study session logged"),
        (status = 400, description = "Unknown subject, zero or oversized duration"),
        (status = 500, description = "Internal server error")
    ),
    params(("x-user-id" = Uuid, Header, description = "The unique ID of the user."))
)]
pub async fn create_study_session_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Json(payload): Json<CreateStudySessionRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    if payload.duration_minutes == 0 {
        return Err(bad_request("duration_minutes must be positive"));
    }
    ensure_storable("duration_minutes", payload.duration_minutes)?;
    let snapshot = load_snapshot(&state, user_id).await?;
    ensure_known_subject(&snapshot, payload.subject_id)?;

    let session = state
        .db
        .create_study_session(
            user_id,
            NewStudySession {
                date: payload.date,
                subject_id: payload.subject_id,
                duration_minutes: payload.duration_minutes,
                notes: payload.notes,
            },
        )
        .await
        .map_err(|e| port_error("Failed to log study session", e))?;
    Ok((StatusCode::CREATED, Json(session)))
}

#[utoipa::path(
    put,
    path = "/study-sessions/{id}",
    request_body = UpdateStudySessionRequest,
    responses(
        (status = 200, description = "Study session updated"),
        (status = 400, description = "Unknown subject, zero or oversized duration"),
        (status = 404, description = "No such session"),
        (status = 500, description = "Internal server error")
    ),
    params(
        ("id" = Uuid, Path, description = "The study session to edit."),
        ("x-user-id" = Uuid, Header, description = "The unique ID of the user.")
    )
)]
pub async fn update_study_session_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Path(session_id): Path<Uuid>,
    Json(payload): Json<UpdateStudySessionRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    if payload.duration_minutes == Some(0) {
        return Err(bad_request("duration_minutes must be positive"));
    }
    if let Some(duration) = payload.duration_minutes {
        ensure_storable("duration_minutes", duration)?;
    }
    if let Some(subject_id) = payload.subject_id {
        let snapshot = load_snapshot(&state, user_id).await?;
        ensure_known_subject(&snapshot, subject_id)?;
    }

    let update = StudySessionUpdate {
        subject_id: payload.subject_id,
        duration_minutes: payload.duration_minutes,
        notes: payload.notes,
    };
    let session = state
        .db
        .update_study_session(user_id, session_id, update)
        .await
        .map_err(|e| port_error("Failed to update study session", e))?;
    Ok(Json(session))
}

#[utoipa::path(
    delete,
    path = "/study-sessions/{id}",
    responses(
        (status = 204, description = "Study session deleted"),
        (status = 404, description = "No such session"),
        (status = 500, description = "Internal server error")
    ),
    params(
        ("id" = Uuid, Path, description = "The study session to delete."),
        ("x-user-id" = Uuid, Header, description = "The unique ID of the user.")
    )
)]
pub async fn delete_study_session_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Path(session_id): Path<Uuid>,
) -> Result<impl IntoResponse, HandlerError> {
    state
        .db
        .delete_study_session(user_id, session_id)
        .await
        .map_err(|e| port_error("Failed to delete study session", e))?;
    Ok(StatusCode::NO_CONTENT)
}

//=========================================================================================
// Study Plan
//=========================================================================================

/// The tasks of one weekday and their category breakdown.
#[utoipa::path(
    get,
    path = "/study-plan/{day}",
    responses(
        (status = 200, description = "Tasks and category aggregates for the day"),
        (status = 400, description = "Not a weekday name"),
        (status = 500, description = "Internal server error")
    ),
    params(
        ("day" = String, Path, description = "Weekday name, e.g. `Mon` or `monday`."),
        ("x-user-id" = Uuid, Header, description = "The unique ID of the user.")
    )
)]
pub async fn get_day_plan_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Path(day): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let day = day
        .parse::<Weekday>()
        .map_err(|_| bad_request(format!("'{}' is not a weekday", day)))?;

    let snapshot = load_snapshot(&state, user_id).await?;
    Ok(Json(DayPlanResponse {
        day,
        tasks: tasks_for_day(&snapshot.schedule, day),
        categories: build_day_plan(&snapshot, &state.metrics, day),
    }))
}

/// Generate a weekly plan from preferences. Replaces the existing plan.
#[utoipa::path(
    post,
    path = "/study-plan/generate",
    request_body = GenerateScheduleRequest,
    responses(
        (status = 201, description = "Plan generated and saved"),
        (status = 400, description = "Missing preferences or no slot fits the hours"),
        (status = 500, description = "Internal server error")
    ),
    params(("x-user-id" = Uuid, Header, description = "The unique ID of the user."))
)]
pub async fn generate_schedule_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Json(payload): Json<GenerateScheduleRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    let prefs = SchedulePreferences {
        hours_per_day: payload.hours_per_day,
        preferred_days: payload.preferred_days,
        subjects: parse_subject_list(&payload.subjects),
        start_hour: payload.start_hour,
        end_hour: payload.end_hour,
        break_minutes: payload.break_minutes,
    };

    let planned = generate_schedule(&prefs).map_err(|e| {
        warn!(%user_id, "Schedule generation rejected: {}", e);
        bad_request(e.to_string())
    })?;

    let saved = state
        .db
        .save_schedule(user_id, planned)
        .await
        .map_err(|e| port_error("Failed to save study plan", e))?;
    info!(%user_id, tasks = saved.len(), "Study plan generated");
    Ok((StatusCode::CREATED, Json(saved)))
}

/// Mark a plan task completed and log the matching study session.
#[utoipa::path(
    post,
    path = "/study-plan/tasks/{id}/complete",
    responses(
        (status = 200, description = "Task completed, with the logged session if any"),
        (status = 404, description = "No such task"),
        (status = 500, description = "Internal server error")
    ),
    params(
        ("id" = Uuid, Path, description = "The plan task to complete."),
        ("x-user-id" = Uuid, Header, description = "The unique ID of the user.")
    )
)]
pub async fn complete_task_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Path(task_id): Path<Uuid>,
) -> Result<impl IntoResponse, HandlerError> {
    let snapshot = load_snapshot(&state, user_id).await?;
    let existing = snapshot
        .schedule
        .iter()
        .find(|t| t.id == task_id)
        .ok_or_else(|| (StatusCode::NOT_FOUND, format!("Schedule task {} not found", task_id)))?;

    if existing.status == TaskStatus::Completed {
        return Ok(Json(CompleteTaskResponse {
            task: existing.clone(),
            session: None,
        }));
    }

    let candidate = session_from_completed_task(existing, &snapshot.subjects, &state.metrics, state.today());
    if candidate.is_none() {
        info!(%task_id, subject = %existing.subject, "Completed task has no matching subject or duration");
    }

    // The status change and the session insert commit together; a concurrent
    // completion that lost the race comes back without a session.
    let completed = state
        .db
        .complete_schedule_task(user_id, task_id, candidate)
        .await
        .map_err(|e| port_error("Failed to complete task", e))?;
    if !completed.newly_completed {
        info!(%user_id, %task_id, "Task was already completed by another request");
    }

    let CompletedTask { task, session, .. } = completed;
    Ok(Json(CompleteTaskResponse { task, session }))
}

//=========================================================================================
// Recommendations
//=========================================================================================

/// Ask the study coach for advice of one kind.
#[utoipa::path(
    post,
    path = "/recommendations/{kind}",
    responses(
        (status = 200, description = "Recommendation text", body = RecommendationResponse),
        (status = 404, description = "Unknown recommendation kind"),
        (status = 422, description = "Not enough exams or subjects for this kind"),
        (status = 503, description = "No recommendation model is configured"),
        (status = 504, description = "The model did not answer in time"),
        (status = 500, description = "Internal server error")
    ),
    params(
        ("kind" = String, Path, description = "study_plan, exam_strategy or error_analysis"),
        ("x-user-id" = Uuid, Header, description = "The unique ID of the user.")
    )
)]
pub async fn recommendation_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Path(kind): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let kind = kind
        .parse::<RecommendationKind>()
        .map_err(|e| port_error("Unknown recommendation", e))?;

    let recommender = state.recommender.clone().ok_or_else(|| {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            "No recommendation model is configured".to_string(),
        )
    })?;

    let snapshot = load_snapshot(&state, user_id).await?;
    let summary = build_summary(kind, &snapshot, &state.metrics)
        .map_err(|e| (StatusCode::UNPROCESSABLE_ENTITY, e.to_string()))?;

    let timeout = state.config.recommendation_timeout;
    let recommendation = tokio::time::timeout(timeout, recommender.recommend(kind, &summary))
        .await
        .map_err(|_| PortError::Timeout(timeout.as_secs()))
        .and_then(|result| result)
        .map_err(|e| port_error("Recommendation failed", e))?;

    Ok(Json(RecommendationResponse {
        kind,
        recommendation,
    }))
}
