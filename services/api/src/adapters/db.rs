//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the `ExamDataService` port from the `core` crate. It handles all interactions
//! with the PostgreSQL database using `sqlx`.
//!
//! Rows are read into nullable record structs and handed to the core's ingestion
//! boundary, so missing counts and nets are coalesced in exactly one place.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc, Weekday};
use exam_tracker_core::domain::{
    CompletedTask, Exam, NewExam, NewStudySession, NewSubject, PlannedTask, ScheduleTask,
    StudySession, StudySessionUpdate, Subject, TargetConfig, TaskStatus, UserSnapshot,
};
use exam_tracker_core::ingest::{
    coalesce_count, normalize_exam, normalize_session, IngestError, RawExam, RawExamSubjectResult,
    RawStudySession,
};
use exam_tracker_core::ports::{ExamDataService, PortError, PortResult};
use sqlx::{FromRow, PgConnection, PgPool, Postgres, Transaction};
use std::collections::HashMap;
use tracing::{error, info};
use uuid::Uuid;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `ExamDataService` port.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }

    async fn ensure_profile(&self, user_id: Uuid) -> PortResult<()> {
        sqlx::query("INSERT INTO profiles (user_id) VALUES ($1) ON CONFLICT (user_id) DO NOTHING")
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }

    async fn begin(&self) -> PortResult<Transaction<'static, Postgres>> {
        self.pool.begin().await.map_err(unexpected)
    }
}

fn unexpected(e: sqlx::Error) -> PortError {
    PortError::Unexpected(e.to_string())
}

fn malformed(e: IngestError) -> PortError {
    error!("Stored record failed ingestion: {}", e);
    PortError::Unexpected(e.to_string())
}

//=========================================================================================
// Column Conversions
//=========================================================================================

/// Days are stored as 0 = Sunday ... 6 = Saturday.
pub fn weekday_to_db(day: Weekday) -> i16 {
    day.num_days_from_sunday() as i16
}

pub fn weekday_from_db(value: i16) -> Option<Weekday> {
    match value {
        0 => Some(Weekday::Sun),
        1 => Some(Weekday::Mon),
        2 => Some(Weekday::Tue),
        3 => Some(Weekday::Wed),
        4 => Some(Weekday::Thu),
        5 => Some(Weekday::Fri),
        6 => Some(Weekday::Sat),
        _ => None,
    }
}

pub fn status_to_db(status: TaskStatus) -> &'static str {
    match status {
        TaskStatus::Pending => "pending",
        TaskStatus::Completed => "completed",
    }
}

pub fn status_from_db(value: &str) -> Option<TaskStatus> {
    match value {
        "pending" => Some(TaskStatus::Pending),
        "completed" => Some(TaskStatus::Completed),
        _ => None,
    }
}

fn count_to_db(field: &'static str, value: u32) -> PortResult<i32> {
    i32::try_from(value)
        .map_err(|_| PortError::Unexpected(format!("{field} {value} does not fit the column")))
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct SubjectRecord {
    id: Uuid,
    name: String,
    color: String,
    question_count: Option<i32>,
}
impl SubjectRecord {
    fn to_domain(self) -> Result<Subject, IngestError> {
        Ok(Subject {
            id: self.id,
            name: self.name,
            color: self.color,
            question_count: coalesce_count("question_count", self.question_count.map(i64::from))?,
        })
    }
}

#[derive(FromRow)]
struct ExamRecord {
    id: Uuid,
    name: String,
    date: NaiveDate,
    created_at: Option<DateTime<Utc>>,
    score: Option<f64>,
    max_score: Option<i32>,
}
impl ExamRecord {
    fn to_raw(self, subjects: Vec<RawExamSubjectResult>) -> RawExam {
        RawExam {
            id: self.id,
            name: self.name,
            date: self.date,
            created_at: self.created_at,
            score: self.score,
            max_score: self.max_score.map(i64::from),
            subjects,
        }
    }
}

#[derive(FromRow)]
struct ExamSubjectRecord {
    exam_id: Uuid,
    subject_id: Uuid,
    correct: Option<i32>,
    incorrect: Option<i32>,
    empty: Option<i32>,
    net: Option<f64>,
}
impl ExamSubjectRecord {
    fn to_raw(&self) -> RawExamSubjectResult {
        RawExamSubjectResult {
            subject_id: self.subject_id,
            correct: self.correct.map(i64::from),
            incorrect: self.incorrect.map(i64::from),
            empty: self.empty.map(i64::from),
            net: self.net,
        }
    }
}

#[derive(FromRow)]
struct StudySessionRecord {
    id: Uuid,
    date: DateTime<Utc>,
    subject_id: Uuid,
    duration: Option<i32>,
    notes: Option<String>,
}
impl StudySessionRecord {
    fn to_domain(self) -> Result<StudySession, IngestError> {
        normalize_session(&RawStudySession {
            id: self.id,
            date: self.date,
            subject_id: self.subject_id,
            duration: self.duration.map(i64::from),
            notes: self.notes,
        })
    }
}

#[derive(FromRow)]
struct ScheduleItemRecord {
    id: Uuid,
    day: i16,
    subject: String,
    time_slot: String,
    status: String,
    topic_details: Option<String>,
}
impl ScheduleItemRecord {
    fn to_domain(self) -> PortResult<ScheduleTask> {
        let day = weekday_from_db(self.day)
            .ok_or_else(|| PortError::Unexpected(format!("Invalid stored day {}", self.day)))?;
        let status = status_from_db(&self.status).ok_or_else(|| {
            PortError::Unexpected(format!("Invalid stored task status '{}'", self.status))
        })?;

        Ok(ScheduleTask {
            id: self.id,
            day,
            subject: self.subject,
            time_slot: self.time_slot,
            status,
            topic_details: self.topic_details,
        })
    }
}

#[derive(FromRow)]
struct GoalRecord {
    target_exam_date: Option<NaiveDate>,
    target_score: Option<f64>,
    university: Option<String>,
    department: Option<String>,
}

#[derive(FromRow)]
struct NetTargetRecord {
    subject: String,
    target_net: f64,
}

/// Shared by plain session logging and task completion, which runs it inside
/// its own transaction.
async fn insert_session(
    conn: &mut PgConnection,
    user_id: Uuid,
    session: &NewStudySession,
) -> PortResult<StudySessionRecord> {
    sqlx::query_as::<_, StudySessionRecord>(&format!(
        "INSERT INTO study_sessions (id, user_id, subject_id, date, duration, notes) \
         VALUES ($1, $2, $3, $4, $5, $6) RETURNING {SESSION_COLUMNS}"
    ))
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(session.subject_id)
    .bind(session.date)
    .bind(count_to_db("duration", session.duration_minutes)?)
    .bind(&session.notes)
    .fetch_one(conn)
    .await
    .map_err(unexpected)
}

const SESSION_COLUMNS: &str = "id, date, subject_id, duration, notes";
const SCHEDULE_COLUMNS: &str = "id, day, subject, time_slot, status, topic_details";

//=========================================================================================
// `ExamDataService` Trait Implementation
//=========================================================================================

#[async_trait]
impl ExamDataService for DbAdapter {
    async fn fetch_snapshot(&self, user_id: Uuid) -> PortResult<UserSnapshot> {
        // --- Subjects ---
        let subjects = sqlx::query_as::<_, SubjectRecord>(
            "SELECT id, name, color, question_count FROM subjects WHERE user_id = $1 ORDER BY name",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?
        .into_iter()
        .map(SubjectRecord::to_domain)
        .collect::<Result<Vec<_>, _>>()
        .map_err(malformed)?;

        // --- Exams and their subject results ---
        let exam_records = sqlx::query_as::<_, ExamRecord>(
            "SELECT id, name, date, created_at, score, max_score FROM exams WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;

        let result_records = sqlx::query_as::<_, ExamSubjectRecord>(
            "SELECT es.exam_id, es.subject_id, es.correct, es.incorrect, es.empty, es.net \
             FROM exam_subjects es JOIN exams e ON e.id = es.exam_id WHERE e.user_id = $1",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;

        let mut results_by_exam: HashMap<Uuid, Vec<RawExamSubjectResult>> = HashMap::new();
        for record in &result_records {
            results_by_exam
                .entry(record.exam_id)
                .or_default()
                .push(record.to_raw());
        }

        let exams = exam_records
            .into_iter()
            .map(|record| {
                let results = results_by_exam.remove(&record.id).unwrap_or_default();
                normalize_exam(&record.to_raw(results))
            })
            .collect::<Result<Vec<_>, _>>()
            .map_err(malformed)?;

        // --- Study sessions ---
        let sessions = sqlx::query_as::<_, StudySessionRecord>(&format!(
            "SELECT {SESSION_COLUMNS} FROM study_sessions WHERE user_id = $1 ORDER BY date DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?
        .into_iter()
        .map(StudySessionRecord::to_domain)
        .collect::<Result<Vec<_>, _>>()
        .map_err(malformed)?;

        // --- Study plan ---
        let schedule = sqlx::query_as::<_, ScheduleItemRecord>(&format!(
            "SELECT {SCHEDULE_COLUMNS} FROM study_schedule_items WHERE user_id = $1 ORDER BY day, time_slot"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?
        .into_iter()
        .map(ScheduleItemRecord::to_domain)
        .collect::<PortResult<Vec<_>>>()?;

        // --- Targets ---
        let goal = sqlx::query_as::<_, GoalRecord>(
            "SELECT target_exam_date, target_score, university, department FROM goals WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;

        let net_targets = sqlx::query_as::<_, NetTargetRecord>(
            "SELECT subject, target_net FROM goal_net_targets WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;

        let mut targets = goal
            .map(|g| TargetConfig {
                target_exam_date: g.target_exam_date,
                target_score: g.target_score,
                university: g.university,
                department: g.department,
                ..TargetConfig::default()
            })
            .unwrap_or_default();
        targets.subject_target_nets = net_targets
            .into_iter()
            .map(|t| (t.subject, t.target_net))
            .collect();

        Ok(UserSnapshot {
            user_id,
            subjects,
            exams,
            sessions,
            schedule,
            targets,
        })
    }

    async fn create_subject(&self, user_id: Uuid, subject: NewSubject) -> PortResult<Subject> {
        self.ensure_profile(user_id).await?;

        let record = sqlx::query_as::<_, SubjectRecord>(
            "INSERT INTO subjects (id, user_id, name, color, question_count) VALUES ($1, $2, $3, $4, $5) \
             RETURNING id, name, color, question_count",
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(&subject.name)
        .bind(&subject.color)
        .bind(count_to_db("question_count", subject.question_count)?)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e.as_database_error() {
            Some(db) if db.is_unique_violation() => {
                PortError::Conflict(format!("Subject '{}'", subject.name))
            }
            _ => unexpected(e),
        })?;

        record.to_domain().map_err(malformed)
    }

    async fn create_exam(&self, user_id: Uuid, exam: NewExam) -> PortResult<Exam> {
        self.ensure_profile(user_id).await?;
        let exam_id = Uuid::new_v4();
        let mut tx = self.begin().await?;

        let created_at: Option<DateTime<Utc>> = sqlx::query_scalar(
            "INSERT INTO exams (id, user_id, name, date, score, max_score) VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING created_at",
        )
        .bind(exam_id)
        .bind(user_id)
        .bind(&exam.name)
        .bind(exam.date)
        .bind(exam.score)
        .bind(count_to_db("max_score", exam.max_score)?)
        .fetch_one(&mut *tx)
        .await
        .map_err(unexpected)?;

        for result in &exam.subjects {
            sqlx::query(
                "INSERT INTO exam_subjects (exam_id, subject_id, correct, incorrect, empty, net) \
                 VALUES ($1, $2, $3, $4, $5, $6)",
            )
            .bind(exam_id)
            .bind(result.subject_id)
            .bind(count_to_db("correct", result.correct)?)
            .bind(count_to_db("incorrect", result.incorrect)?)
            .bind(count_to_db("empty", result.empty)?)
            .bind(result.net)
            .execute(&mut *tx)
            .await
            .map_err(unexpected)?;
        }

        tx.commit().await.map_err(unexpected)?;
        info!(%user_id, %exam_id, subjects = exam.subjects.len(), "Exam created");

        Ok(Exam {
            id: exam_id,
            name: exam.name,
            date: exam.date,
            created_at,
            score: exam.score,
            max_score: exam.max_score,
            subjects: exam.subjects,
        })
    }

    async fn create_study_session(
        &self,
        user_id: Uuid,
        session: NewStudySession,
    ) -> PortResult<StudySession> {
        self.ensure_profile(user_id).await?;
        let mut conn = self.pool.acquire().await.map_err(unexpected)?;

        insert_session(&mut conn, user_id, &session)
            .await?
            .to_domain()
            .map_err(malformed)
    }

    async fn update_study_session(
        &self,
        user_id: Uuid,
        session_id: Uuid,
        update: StudySessionUpdate,
    ) -> PortResult<StudySession> {
        let duration = update
            .duration_minutes
            .map(|d| count_to_db("duration", d))
            .transpose()?;

        let record = sqlx::query_as::<_, StudySessionRecord>(&format!(
            "UPDATE study_sessions SET \
                 subject_id = COALESCE($3, subject_id), \
                 duration = COALESCE($4, duration), \
                 notes = COALESCE($5, notes) \
             WHERE id = $1 AND user_id = $2 RETURNING {SESSION_COLUMNS}"
        ))
        .bind(session_id)
        .bind(user_id)
        .bind(update.subject_id)
        .bind(duration)
        .bind(update.notes)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?
        .ok_or_else(|| PortError::NotFound(format!("Study session {} not found", session_id)))?;

        record.to_domain().map_err(malformed)
    }

    async fn delete_study_session(&self, user_id: Uuid, session_id: Uuid) -> PortResult<()> {
        let result = sqlx::query("DELETE FROM study_sessions WHERE id = $1 AND user_id = $2")
            .bind(session_id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;

        if result.rows_affected() == 0 {
            return Err(PortError::NotFound(format!(
                "Study session {} not found",
                session_id
            )));
        }
        Ok(())
    }

    async fn save_schedule(
        &self,
        user_id: Uuid,
        tasks: Vec<PlannedTask>,
    ) -> PortResult<Vec<ScheduleTask>> {
        self.ensure_profile(user_id).await?;
        let mut tx = self.begin().await?;

        sqlx::query("DELETE FROM study_schedule_items WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await
            .map_err(unexpected)?;

        let mut saved = Vec::with_capacity(tasks.len());
        for task in tasks {
            let record = sqlx::query_as::<_, ScheduleItemRecord>(&format!(
                "INSERT INTO study_schedule_items (id, user_id, day, subject, time_slot, status) \
                 VALUES ($1, $2, $3, $4, $5, $6) RETURNING {SCHEDULE_COLUMNS}"
            ))
            .bind(Uuid::new_v4())
            .bind(user_id)
            .bind(weekday_to_db(task.day))
            .bind(&task.subject)
            .bind(&task.time_slot)
            .bind(status_to_db(TaskStatus::Pending))
            .fetch_one(&mut *tx)
            .await
            .map_err(unexpected)?;
            saved.push(record.to_domain()?);
        }

        tx.commit().await.map_err(unexpected)?;
        info!(%user_id, tasks = saved.len(), "Study schedule replaced");
        Ok(saved)
    }

    async fn complete_schedule_task(
        &self,
        user_id: Uuid,
        task_id: Uuid,
        session: Option<NewStudySession>,
    ) -> PortResult<CompletedTask> {
        let mut tx = self.begin().await?;

        // The status guard makes concurrent completions race on the row lock:
        // only the first one sees a pending row.
        let updated = sqlx::query_as::<_, ScheduleItemRecord>(&format!(
            "UPDATE study_schedule_items SET status = $3 \
             WHERE id = $1 AND user_id = $2 AND status = $4 \
             RETURNING {SCHEDULE_COLUMNS}"
        ))
        .bind(task_id)
        .bind(user_id)
        .bind(status_to_db(TaskStatus::Completed))
        .bind(status_to_db(TaskStatus::Pending))
        .fetch_optional(&mut *tx)
        .await
        .map_err(unexpected)?;

        let Some(record) = updated else {
            let existing = sqlx::query_as::<_, ScheduleItemRecord>(&format!(
                "SELECT {SCHEDULE_COLUMNS} FROM study_schedule_items WHERE id = $1 AND user_id = $2"
            ))
            .bind(task_id)
            .bind(user_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(unexpected)?
            .ok_or_else(|| PortError::NotFound(format!("Schedule task {} not found", task_id)))?;

            return Ok(CompletedTask {
                task: existing.to_domain()?,
                session: None,
                newly_completed: false,
            });
        };

        let task = record.to_domain()?;
        let session = match session {
            Some(new_session) => Some(
                insert_session(&mut tx, user_id, &new_session)
                    .await?
                    .to_domain()
                    .map_err(malformed)?,
            ),
            None => None,
        };

        tx.commit().await.map_err(unexpected)?;
        info!(%user_id, %task_id, logged_session = session.is_some(), "Schedule task completed");

        Ok(CompletedTask {
            task,
            session,
            newly_completed: true,
        })
    }

    async fn save_targets(&self, user_id: Uuid, targets: TargetConfig) -> PortResult<()> {
        self.ensure_profile(user_id).await?;
        let mut tx = self.begin().await?;

        sqlx::query(
            "INSERT INTO goals (user_id, target_exam_date, target_score, university, department, updated_at) \
             VALUES ($1, $2, $3, $4, $5, NOW()) \
             ON CONFLICT (user_id) DO UPDATE SET \
                 target_exam_date = EXCLUDED.target_exam_date, \
                 target_score = EXCLUDED.target_score, \
                 university = EXCLUDED.university, \
                 department = EXCLUDED.department, \
                 updated_at = NOW()",
        )
        .bind(user_id)
        .bind(targets.target_exam_date)
        .bind(targets.target_score)
        .bind(&targets.university)
        .bind(&targets.department)
        .execute(&mut *tx)
        .await
        .map_err(unexpected)?;

        sqlx::query("DELETE FROM goal_net_targets WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await
            .map_err(unexpected)?;

        for (subject, target_net) in &targets.subject_target_nets {
            sqlx::query(
                "INSERT INTO goal_net_targets (user_id, subject, target_net) VALUES ($1, $2, $3)",
            )
            .bind(user_id)
            .bind(subject)
            .bind(target_net)
            .execute(&mut *tx)
            .await
            .map_err(unexpected)?;
        }

        tx.commit().await.map_err(unexpected)?;
        Ok(())
    }
}
