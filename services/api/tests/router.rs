//! Exercises the HTTP surface end to end against in-memory port fakes.

use api_lib::config::Config;
use api_lib::web::{router, AppState};
use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use chrono::{NaiveDate, Utc};
use exam_tracker_core::domain::{
    CompletedTask, Exam, NewExam, NewStudySession, NewSubject, PlannedTask, ScheduleTask, StudySession,
    StudySessionUpdate, Subject, TargetConfig, TaskStatus, UserSnapshot,
};
use exam_tracker_core::ports::{
    ExamDataService, PortError, PortResult, RecommendationKind, RecommendationService,
};
use exam_tracker_core::MetricsConfig;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tower::ServiceExt;
use uuid::Uuid;

//=========================================================================================
// Fakes
//=========================================================================================

#[derive(Default)]
struct InMemoryData {
    users: Mutex<HashMap<Uuid, UserSnapshot>>,
    /// Makes every session insert fail, as a dropped connection would.
    fail_session_logging: AtomicBool,
}

impl InMemoryData {
    fn with_user<T>(&self, user_id: Uuid, f: impl FnOnce(&mut UserSnapshot) -> T) -> T {
        let mut users = self.users.lock().unwrap();
        let snapshot = users
            .entry(user_id)
            .or_insert_with(|| UserSnapshot::empty(user_id));
        f(snapshot)
    }

    fn snapshot(&self, user_id: Uuid) -> UserSnapshot {
        self.with_user(user_id, |s| s.clone())
    }

    fn insert_session(&self, s: &mut UserSnapshot, session: NewStudySession) -> PortResult<StudySession> {
        if self.fail_session_logging.load(Ordering::SeqCst) {
            return Err(PortError::Unexpected("connection reset".to_string()));
        }
        let created = StudySession {
            id: Uuid::new_v4(),
            date: session.date,
            subject_id: session.subject_id,
            duration_minutes: session.duration_minutes,
            notes: session.notes,
        };
        s.sessions.push(created.clone());
        Ok(created)
    }
}

#[async_trait]
impl ExamDataService for InMemoryData {
    async fn fetch_snapshot(&self, user_id: Uuid) -> PortResult<UserSnapshot> {
        Ok(self.snapshot(user_id))
    }

    async fn create_subject(&self, user_id: Uuid, subject: NewSubject) -> PortResult<Subject> {
        self.with_user(user_id, |s| {
            if s.subjects.iter().any(|existing| existing.name == subject.name) {
                return Err(PortError::Conflict(format!("Subject '{}'", subject.name)));
            }
            let created = Subject {
                id: Uuid::new_v4(),
                name: subject.name,
                color: subject.color,
                question_count: subject.question_count,
            };
            s.subjects.push(created.clone());
            Ok(created)
        })
    }

    async fn create_exam(&self, user_id: Uuid, exam: NewExam) -> PortResult<Exam> {
        self.with_user(user_id, |s| {
            let created = Exam {
                id: Uuid::new_v4(),
                name: exam.name,
                date: exam.date,
                created_at: Some(Utc::now()),
                score: exam.score,
                max_score: exam.max_score,
                subjects: exam.subjects,
            };
            s.exams.push(created.clone());
            Ok(created)
        })
    }

    async fn create_study_session(
        &self,
        user_id: Uuid,
        session: NewStudySession,
    ) -> PortResult<StudySession> {
        self.with_user(user_id, |s| self.insert_session(s, session))
    }

    async fn update_study_session(
        &self,
        user_id: Uuid,
        session_id: Uuid,
        update: StudySessionUpdate,
    ) -> PortResult<StudySession> {
        self.with_user(user_id, |s| {
            let session = s
                .sessions
                .iter_mut()
                .find(|x| x.id == session_id)
                .ok_or_else(|| PortError::NotFound(format!("Study session {}", session_id)))?;
            if let Some(subject_id) = update.subject_id {
                session.subject_id = subject_id;
            }
            if let Some(duration) = update.duration_minutes {
                session.duration_minutes = duration;
            }
            if update.notes.is_some() {
                session.notes = update.notes;
            }
            Ok(session.clone())
        })
    }

    async fn delete_study_session(&self, user_id: Uuid, session_id: Uuid) -> PortResult<()> {
        self.with_user(user_id, |s| {
            let before = s.sessions.len();
            s.sessions.retain(|x| x.id != session_id);
            if s.sessions.len() == before {
                return Err(PortError::NotFound(format!("Study session {}", session_id)));
            }
            Ok(())
        })
    }

    async fn save_schedule(
        &self,
        user_id: Uuid,
        tasks: Vec<PlannedTask>,
    ) -> PortResult<Vec<ScheduleTask>> {
        self.with_user(user_id, |s| {
            s.schedule = tasks
                .into_iter()
                .map(|t| ScheduleTask {
                    id: Uuid::new_v4(),
                    day: t.day,
                    subject: t.subject,
                    time_slot: t.time_slot,
                    status: TaskStatus::Pending,
                    topic_details: None,
                })
                .collect();
            Ok(s.schedule.clone())
        })
    }

    async fn complete_schedule_task(
        &self,
        user_id: Uuid,
        task_id: Uuid,
        session: Option<NewStudySession>,
    ) -> PortResult<CompletedTask> {
        self.with_user(user_id, |s| {
            let index = s
                .schedule
                .iter()
                .position(|t| t.id == task_id)
                .ok_or_else(|| PortError::NotFound(format!("Schedule task {}", task_id)))?;
            if s.schedule[index].status == TaskStatus::Completed {
                return Ok(CompletedTask {
                    task: s.schedule[index].clone(),
                    session: None,
                    newly_completed: false,
                });
            }

            // Log first so a failed insert leaves the task pending.
            let session = match session {
                Some(new_session) => Some(self.insert_session(s, new_session)?),
                None => None,
            };
            s.schedule[index].status = TaskStatus::Completed;
            Ok(CompletedTask {
                task: s.schedule[index].clone(),
                session,
                newly_completed: true,
            })
        })
    }

    async fn save_targets(&self, user_id: Uuid, targets: TargetConfig) -> PortResult<()> {
        self.with_user(user_id, |s| s.targets = targets);
        Ok(())
    }
}

struct EchoRecommender;

#[async_trait]
impl RecommendationService for EchoRecommender {
    async fn recommend(&self, kind: RecommendationKind, summary: &str) -> PortResult<String> {
        Ok(format!("{kind} <- {summary}"))
    }
}

struct SlowRecommender;

#[async_trait]
impl RecommendationService for SlowRecommender {
    async fn recommend(&self, _kind: RecommendationKind, _summary: &str) -> PortResult<String> {
        tokio::time::sleep(Duration::from_secs(5)).await;
        Ok("too late".to_string())
    }
}

//=========================================================================================
// Harness
//=========================================================================================

fn fixed_today() -> NaiveDate {
    // A Wednesday.
    NaiveDate::from_ymd_opt(2024, 6, 5).unwrap()
}

fn test_config(timeout: Duration) -> Config {
    Config {
        bind_address: "127.0.0.1:0".parse().unwrap(),
        database_url: "postgres://unused".to_string(),
        log_level: tracing::Level::INFO,
        metrics_config_path: None,
        openai_api_key: None,
        gemini_api_key: None,
        recommendation_model: "test-model".to_string(),
        recommendation_base_url: None,
        recommendation_timeout: timeout,
        cors_origin: "http://localhost:3000".to_string(),
    }
}

fn app_with(
    data: Arc<InMemoryData>,
    recommender: Option<Arc<dyn RecommendationService>>,
    timeout: Duration,
) -> Router {
    let mut state = AppState::new(
        data,
        recommender,
        Arc::new(test_config(timeout)),
        Arc::new(MetricsConfig::default()),
    );
    state.today = fixed_today;
    router(Arc::new(state))
}

fn app(data: Arc<InMemoryData>) -> Router {
    app_with(data, None, Duration::from_secs(30))
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    user: Option<Uuid>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(user_id) = user {
        builder = builder.header("x-user-id", user_id.to_string());
    }
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
    (status, value)
}

async fn create_subject(app: &Router, user: Uuid, name: &str) -> Uuid {
    let (status, body) = send(
        app,
        Method::POST,
        "/subjects",
        Some(user),
        Some(json!({ "name": name, "question_count": 40 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_str().unwrap().parse().unwrap()
}

async fn create_exam(app: &Router, user: Uuid, date: &str, subject_id: Uuid, correct: u32) -> Value {
    let (status, body) = send(
        app,
        Method::POST,
        "/exams",
        Some(user),
        Some(json!({
            "name": format!("Deneme {date}"),
            "date": date,
            "subjects": [{ "subject_id": subject_id, "correct": correct, "incorrect": 8, "empty": 2 }]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body
}

//=========================================================================================
// Tests
//=========================================================================================

#[tokio::test]
async fn missing_or_malformed_user_header_is_rejected() {
    let app = app(Arc::new(InMemoryData::default()));

    let (status, _) = send(&app, Method::GET, "/dashboard", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let request = Request::builder()
        .uri("/dashboard")
        .header("x-user-id", "not-a-uuid")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn empty_user_gets_a_zeroed_dashboard() {
    let app = app(Arc::new(InMemoryData::default()));
    let (status, body) = send(&app, Method::GET, "/dashboard", Some(Uuid::new_v4()), None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["streak"], json!(0));
    assert_eq!(body["today_minutes"], json!(0));
    assert_eq!(body["latest_exam"], Value::Null);
    assert_eq!(body["weak_subjects"], json!([]));
}

#[tokio::test]
async fn exams_feed_the_analysis_views() {
    let data = Arc::new(InMemoryData::default());
    let app = app(data.clone());
    let user = Uuid::new_v4();
    let math = create_subject(&app, user, "Matematik").await;

    let first = create_exam(&app, user, "2024-05-01", math, 30).await;
    assert_eq!(first["subjects"][0]["net"], json!(28.0));
    assert_eq!(first["max_score"], json!(40));
    create_exam(&app, user, "2024-05-15", math, 36).await;

    let (status, analysis) = send(&app, Method::GET, "/exam-analysis", Some(user), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        analysis["trend"],
        json!({ "direction": "up", "magnitude_percent": 21 })
    );
    assert_eq!(analysis["subject_changes"][0]["current_net"], json!(34.0));
    assert_eq!(analysis["subject_changes"][0]["change"], json!(6.0));

    let (status, tracker) = send(&app, Method::GET, "/net-tracker", Some(user), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(tracker["history"].as_array().unwrap().len(), 2);
    assert_eq!(tracker["stats"]["average_total_net"], json!(31.0));
}

#[tokio::test]
async fn exam_with_foreign_or_duplicate_subject_is_rejected() {
    let data = Arc::new(InMemoryData::default());
    let app = app(data.clone());
    let user = Uuid::new_v4();
    let math = create_subject(&app, user, "Matematik").await;

    let (status, _) = send(
        &app,
        Method::POST,
        "/exams",
        Some(user),
        Some(json!({
            "name": "Deneme",
            "date": "2024-05-01",
            "subjects": [{ "subject_id": Uuid::new_v4(), "correct": 10, "incorrect": 0 }]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        Method::POST,
        "/exams",
        Some(user),
        Some(json!({
            "name": "Deneme",
            "date": "2024-05-01",
            "subjects": [
                { "subject_id": math, "correct": 10, "incorrect": 0 },
                { "subject_id": math, "correct": 12, "incorrect": 1 }
            ]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(data.snapshot(user).exams.is_empty());
}

#[tokio::test]
async fn duplicate_subject_is_a_conflict() {
    let app = app(Arc::new(InMemoryData::default()));
    let user = Uuid::new_v4();
    create_subject(&app, user, "Fizik").await;

    let (status, _) = send(
        &app,
        Method::POST,
        "/subjects",
        Some(user),
        Some(json!({ "name": "  Fizik " })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn study_sessions_can_be_edited_and_deleted() {
    let data = Arc::new(InMemoryData::default());
    let app = app(data.clone());
    let user = Uuid::new_v4();
    let math = create_subject(&app, user, "Matematik").await;

    let (status, created) = send(
        &app,
        Method::POST,
        "/study-sessions",
        Some(user),
        Some(json!({ "subject_id": math, "date": "2024-06-05T09:00:00Z", "duration_minutes": 45 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["id"].as_str().unwrap().to_string();

    let (status, dashboard) = send(&app, Method::GET, "/dashboard", Some(user), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(dashboard["today_minutes"], json!(45));
    assert_eq!(dashboard["streak"], json!(1));

    let (status, updated) = send(
        &app,
        Method::PUT,
        &format!("/study-sessions/{id}"),
        Some(user),
        Some(json!({ "duration_minutes": 90 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["duration_minutes"], json!(90));

    let (status, _) = send(&app, Method::DELETE, &format!("/study-sessions/{id}"), Some(user), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, Method::DELETE, &format!("/study-sessions/{id}"), Some(user), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn zero_minute_session_is_rejected() {
    let app = app(Arc::new(InMemoryData::default()));
    let user = Uuid::new_v4();
    let math = create_subject(&app, user, "Matematik").await;

    let (status, _) = send(
        &app,
        Method::POST,
        "/study-sessions",
        Some(user),
        Some(json!({ "subject_id": math, "date": "2024-06-05T09:00:00Z", "duration_minutes": 0 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn counts_and_durations_beyond_the_column_range_are_rejected() {
    let data = Arc::new(InMemoryData::default());
    let app = app(data.clone());
    let user = Uuid::new_v4();
    let math = create_subject(&app, user, "Matematik").await;

    let (status, _) = send(
        &app,
        Method::POST,
        "/exams",
        Some(user),
        Some(json!({
            "name": "Deneme",
            "date": "2024-06-01",
            "subjects": [{ "subject_id": math, "correct": 2147483648u32, "incorrect": 0 }]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Each count fits on its own but the total does not.
    let (status, _) = send(
        &app,
        Method::POST,
        "/exams",
        Some(user),
        Some(json!({
            "name": "Deneme",
            "date": "2024-06-01",
            "subjects": [{ "subject_id": math, "correct": 2147483647u32, "incorrect": 1 }]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        Method::POST,
        "/study-sessions",
        Some(user),
        Some(json!({ "subject_id": math, "date": "2024-06-05T09:00:00Z", "duration_minutes": 4294967295u32 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, session) = send(
        &app,
        Method::POST,
        "/study-sessions",
        Some(user),
        Some(json!({ "subject_id": math, "date": "2024-06-05T09:00:00Z", "duration_minutes": 45 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let uri = format!("/study-sessions/{}", session["id"].as_str().unwrap());
    let (status, _) = send(
        &app,
        Method::PUT,
        &uri,
        Some(user),
        Some(json!({ "duration_minutes": 2147483648u32 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let snapshot = data.snapshot(user);
    assert!(snapshot.exams.is_empty());
    assert_eq!(snapshot.sessions.len(), 1);
    assert_eq!(snapshot.sessions[0].duration_minutes, 45);
}

async fn generate_monday_plan(app: &Router, user: Uuid) -> Vec<Value> {
    let (status, tasks) = send(
        app,
        Method::POST,
        "/study-plan/generate",
        Some(user),
        Some(json!({
            "hours_per_day": 1,
            "preferred_days": ["Mon"],
            "subjects": "Matematik",
            "start_hour": 9,
            "end_hour": 12
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    tasks.as_array().unwrap().clone()
}

#[tokio::test]
async fn failed_session_logging_leaves_the_task_pending() {
    let data = Arc::new(InMemoryData::default());
    let app = app(data.clone());
    let user = Uuid::new_v4();
    create_subject(&app, user, "Matematik").await;
    let tasks = generate_monday_plan(&app, user).await;
    let uri = format!("/study-plan/tasks/{}/complete", tasks[0]["id"].as_str().unwrap());

    data.fail_session_logging.store(true, Ordering::SeqCst);
    let (status, _) = send(&app, Method::POST, &uri, Some(user), None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let snapshot = data.snapshot(user);
    assert_eq!(snapshot.schedule[0].status, TaskStatus::Pending);
    assert!(snapshot.sessions.is_empty());

    // A retry after the outage logs the session exactly once.
    data.fail_session_logging.store(false, Ordering::SeqCst);
    let (status, completed) = send(&app, Method::POST, &uri, Some(user), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(completed["task"]["status"], json!("completed"));
    assert_eq!(completed["session"]["duration_minutes"], json!(60));
    assert_eq!(data.snapshot(user).sessions.len(), 1);
}

#[tokio::test]
async fn concurrent_completions_log_a_single_session() {
    let data = Arc::new(InMemoryData::default());
    let app = app(data.clone());
    let user = Uuid::new_v4();
    create_subject(&app, user, "Matematik").await;
    let tasks = generate_monday_plan(&app, user).await;
    let uri = format!("/study-plan/tasks/{}/complete", tasks[0]["id"].as_str().unwrap());

    let (first, second) = tokio::join!(
        send(&app, Method::POST, &uri, Some(user), None),
        send(&app, Method::POST, &uri, Some(user), None),
    );
    assert_eq!(first.0, StatusCode::OK);
    assert_eq!(second.0, StatusCode::OK);

    let logged = [&first.1, &second.1]
        .iter()
        .filter(|body| !body["session"].is_null())
        .count();
    assert_eq!(logged, 1);
    assert_eq!(data.snapshot(user).sessions.len(), 1);
}

#[tokio::test]
async fn completing_a_generated_task_logs_one_session() {
    let data = Arc::new(InMemoryData::default());
    let app = app(data.clone());
    let user = Uuid::new_v4();
    let math = create_subject(&app, user, "Matematik").await;

    let (status, tasks) = send(
        &app,
        Method::POST,
        "/study-plan/generate",
        Some(user),
        Some(json!({
            "hours_per_day": 2,
            "preferred_days": ["Mon"],
            "subjects": "matematik, Fizik",
            "start_hour": 9,
            "end_hour": 12
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let tasks = tasks.as_array().unwrap().clone();
    assert_eq!(tasks.len(), 2);
    assert_eq!(tasks[0]["time_slot"], json!("09:00 - 10:00"));
    assert_eq!(tasks[1]["subject"], json!("Fizik"));

    let task_id = tasks[0]["id"].as_str().unwrap().to_string();
    let uri = format!("/study-plan/tasks/{task_id}/complete");

    let (status, completed) = send(&app, Method::POST, &uri, Some(user), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(completed["task"]["status"], json!("completed"));
    assert_eq!(completed["session"]["subject_id"], json!(math));
    assert_eq!(completed["session"]["duration_minutes"], json!(60));
    assert_eq!(completed["session"]["date"], json!("2024-06-03T00:00:00Z"));

    let (status, again) = send(&app, Method::POST, &uri, Some(user), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(again["session"], Value::Null);
    assert_eq!(data.snapshot(user).sessions.len(), 1);

    let (status, day) = send(&app, Method::GET, "/study-plan/monday", Some(user), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(day["tasks"].as_array().unwrap().len(), 2);
    assert_eq!(day["categories"][0]["category"], json!("FEN BİLİMLERİ"));
    assert_eq!(day["categories"][1]["category"], json!("MATEMATİK"));
}

#[tokio::test]
async fn schedule_without_subjects_is_rejected() {
    let app = app(Arc::new(InMemoryData::default()));
    let (status, _) = send(
        &app,
        Method::POST,
        "/study-plan/generate",
        Some(Uuid::new_v4()),
        Some(json!({
            "hours_per_day": 2,
            "preferred_days": ["Mon"],
            "subjects": " , ",
            "start_hour": 9,
            "end_hour": 12
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_weekday_and_task_are_reported() {
    let app = app(Arc::new(InMemoryData::default()));
    let user = Uuid::new_v4();

    let (status, _) = send(&app, Method::GET, "/study-plan/someday", Some(user), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let uri = format!("/study-plan/tasks/{}/complete", Uuid::new_v4());
    let (status, _) = send(&app, Method::POST, &uri, Some(user), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn goal_targets_are_stored_under_canonical_names() {
    let data = Arc::new(InMemoryData::default());
    let app = app(data.clone());
    let user = Uuid::new_v4();
    let math = create_subject(&app, user, "Matematik").await;
    create_exam(&app, user, "2024-05-01", math, 30).await;

    let (status, goals) = send(
        &app,
        Method::PUT,
        "/goals",
        Some(user),
        Some(json!({
            "target_exam_date": "2024-06-15",
            "target_score": 400.0,
            "subject_target_nets": { " matematik ": 35.0 }
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let stored = data.snapshot(user).targets;
    assert_eq!(
        stored.subject_target_nets.keys().cloned().collect::<Vec<_>>(),
        vec!["MATEMATİK".to_string()]
    );
    assert_eq!(goals["days_left"], json!(10));
    assert_eq!(goals["subject_goals"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn recommendations_need_a_model_and_enough_exams() {
    let data = Arc::new(InMemoryData::default());
    let user = Uuid::new_v4();

    let without_model = app(data.clone());
    let (status, _) = send(&without_model, Method::POST, "/recommendations/study_plan", Some(user), None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

    let with_model = app_with(data.clone(), Some(Arc::new(EchoRecommender)), Duration::from_secs(30));
    let (status, _) = send(&with_model, Method::POST, "/recommendations/horoscope", Some(user), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let math = create_subject(&with_model, user, "Matematik").await;
    let (status, _) = send(&with_model, Method::POST, "/recommendations/study_plan", Some(user), None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    create_exam(&with_model, user, "2024-05-01", math, 30).await;
    let (status, body) = send(&with_model, Method::POST, "/recommendations/study_plan", Some(user), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["kind"], json!("study_plan"));
    assert_eq!(body["recommendation"], json!("study_plan <- Matematik: 30/40 doğru"));

    let (status, _) = send(&with_model, Method::POST, "/recommendations/exam_strategy", Some(user), None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn slow_model_times_out() {
    let data = Arc::new(InMemoryData::default());
    let user = Uuid::new_v4();
    let app = app_with(data, Some(Arc::new(SlowRecommender)), Duration::from_millis(50));

    let math = create_subject(&app, user, "Matematik").await;
    create_exam(&app, user, "2024-05-01", math, 30).await;

    let (status, _) = send(&app, Method::POST, "/recommendations/error_analysis", Some(user), None).await;
    assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
}
