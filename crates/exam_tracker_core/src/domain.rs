//! crates/exam_tracker_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! Records arrive here already normalized by the `ingest` module, so every
//! numeric field is populated and calculators never coalesce on their own.

use chrono::{DateTime, NaiveDate, Utc, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// A named study category owned by one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subject {
    pub id: Uuid,
    pub name: String,
    pub color: String,
    /// Size of the question pool for this subject.
    pub question_count: u32,
}

/// One subject's outcome within one exam.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExamSubjectResult {
    pub subject_id: Uuid,
    pub correct: u32,
    pub incorrect: u32,
    pub empty: u32,
    /// Full-precision net. Recomputed at ingestion when the source omitted it.
    pub net: f64,
}

impl ExamSubjectResult {
    /// Questions answered, missed and skipped for this subject.
    pub fn total_questions(&self) -> u32 {
        self.correct
            .saturating_add(self.incorrect)
            .saturating_add(self.empty)
    }
}

/// One completed test instance with its per-subject results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exam {
    pub id: Uuid,
    pub name: String,
    /// Calendar date the exam was sat.
    pub date: NaiveDate,
    /// When the exam was entered. Breaks ties between exams sat on the same day.
    pub created_at: Option<DateTime<Utc>>,
    pub score: f64,
    pub max_score: u32,
    pub subjects: Vec<ExamSubjectResult>,
}

impl Exam {
    pub fn result_for(&self, subject_id: Uuid) -> Option<&ExamSubjectResult> {
        self.subjects.iter().find(|r| r.subject_id == subject_id)
    }
}

/// One logged study interval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudySession {
    pub id: Uuid,
    pub date: DateTime<Utc>,
    pub subject_id: Uuid,
    pub duration_minutes: u32,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    Completed,
}

/// A single item of the weekly study plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleTask {
    pub id: Uuid,
    pub day: Weekday,
    /// Subject name as the user typed it when building the plan.
    pub subject: String,
    /// "HH:MM - HH:MM"
    pub time_slot: String,
    pub status: TaskStatus,
    pub topic_details: Option<String>,
}

/// The user's goal settings: exam date, university threshold and per-subject nets.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TargetConfig {
    pub target_exam_date: Option<NaiveDate>,
    /// Keyed by canonical subject name.
    #[serde(default)]
    pub subject_target_nets: BTreeMap<String, f64>,
    pub target_score: Option<f64>,
    pub university: Option<String>,
    pub department: Option<String>,
}

/// Everything the core needs about one user, fetched in one go by the data layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSnapshot {
    pub user_id: Uuid,
    pub subjects: Vec<Subject>,
    pub exams: Vec<Exam>,
    pub sessions: Vec<StudySession>,
    pub schedule: Vec<ScheduleTask>,
    pub targets: TargetConfig,
}

impl UserSnapshot {
    pub fn empty(user_id: Uuid) -> Self {
        Self {
            user_id,
            subjects: Vec::new(),
            exams: Vec::new(),
            sessions: Vec::new(),
            schedule: Vec::new(),
            targets: TargetConfig::default(),
        }
    }

    pub fn subject(&self, subject_id: Uuid) -> Option<&Subject> {
        self.subjects.iter().find(|s| s.id == subject_id)
    }
}

//=========================================================================================
// Write Models
//=========================================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewSubject {
    pub name: String,
    pub color: String,
    pub question_count: u32,
}

/// Raw counts for one subject of an exam being created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewExamSubject {
    pub subject_id: Uuid,
    pub correct: u32,
    pub incorrect: u32,
    pub empty: u32,
}

/// An exam ready to be persisted. Score, max score and nets are computed by the core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewExam {
    pub name: String,
    pub date: NaiveDate,
    pub score: f64,
    pub max_score: u32,
    pub subjects: Vec<ExamSubjectResult>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewStudySession {
    pub date: DateTime<Utc>,
    pub subject_id: Uuid,
    pub duration_minutes: u32,
    pub notes: Option<String>,
}

/// Partial edit of a study session. `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StudySessionUpdate {
    pub subject_id: Option<Uuid>,
    pub duration_minutes: Option<u32>,
    pub notes: Option<String>,
}

/// Result of completing a plan task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletedTask {
    pub task: ScheduleTask,
    /// The session logged together with the status change. Always `None` when the
    /// task had already been completed.
    pub session: Option<StudySession>,
    /// `false` when the task was completed before this call.
    pub newly_completed: bool,
}

/// A schedule slot produced by the generator, not yet persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedTask {
    pub day: Weekday,
    pub subject: String,
    pub time_slot: String,
}
