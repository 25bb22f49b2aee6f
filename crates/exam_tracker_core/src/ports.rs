//! crates/exam_tracker_core/src/ports.rs
//!
//! Defines the service contracts (traits) the core depends on.
//! These traits form the boundary of the hexagonal architecture: storage and the
//! recommendation model live behind them, and the metric calculators never see
//! either one directly.

use crate::domain::{
    CompletedTask, Exam, NewExam, NewStudySession, NewSubject, PlannedTask, ScheduleTask,
    StudySession, StudySessionUpdate, Subject, TargetConfig, UserSnapshot,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database, network).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
    #[error("Already exists: {0}")]
    Conflict(String),
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Timed out after {0} seconds")]
    Timeout(u64),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// Every method is scoped to one user; implementations must never return or
/// touch another user's rows.
#[async_trait]
pub trait ExamDataService: Send + Sync {
    // --- Reads ---
    /// Subjects, exams, sessions, schedule and targets, already normalized.
    async fn fetch_snapshot(&self, user_id: Uuid) -> PortResult<UserSnapshot>;

    // --- Subjects ---
    /// Subject names are unique per user.
    async fn create_subject(&self, user_id: Uuid, subject: NewSubject) -> PortResult<Subject>;

    // --- Exams ---
    async fn create_exam(&self, user_id: Uuid, exam: NewExam) -> PortResult<Exam>;

    // --- Study Sessions ---
    async fn create_study_session(
        &self,
        user_id: Uuid,
        session: NewStudySession,
    ) -> PortResult<StudySession>;

    async fn update_study_session(
        &self,
        user_id: Uuid,
        session_id: Uuid,
        update: StudySessionUpdate,
    ) -> PortResult<StudySession>;

    async fn delete_study_session(&self, user_id: Uuid, session_id: Uuid) -> PortResult<()>;

    // --- Study Plan ---
    /// Replaces the user's whole schedule with freshly planned, pending tasks.
    async fn save_schedule(
        &self,
        user_id: Uuid,
        tasks: Vec<PlannedTask>,
    ) -> PortResult<Vec<ScheduleTask>>;

    /// Marks a pending task completed and logs `session` in the same unit of work.
    ///
    /// Only one caller can move a task out of pending: every other caller gets the
    /// task back with `newly_completed == false` and nothing is logged. If logging
    /// the session fails the task stays pending.
    async fn complete_schedule_task(
        &self,
        user_id: Uuid,
        task_id: Uuid,
        session: Option<NewStudySession>,
    ) -> PortResult<CompletedTask>;

    // --- Goals ---
    async fn save_targets(&self, user_id: Uuid, targets: TargetConfig) -> PortResult<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationKind {
    StudyPlan,
    ExamStrategy,
    ErrorAnalysis,
}

impl RecommendationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecommendationKind::StudyPlan => "study_plan",
            RecommendationKind::ExamStrategy => "exam_strategy",
            RecommendationKind::ErrorAnalysis => "error_analysis",
        }
    }
}

impl fmt::Display for RecommendationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecommendationKind {
    type Err = PortError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "study_plan" => Ok(RecommendationKind::StudyPlan),
            "exam_strategy" => Ok(RecommendationKind::ExamStrategy),
            "error_analysis" => Ok(RecommendationKind::ErrorAnalysis),
            other => Err(PortError::NotFound(format!("Recommendation kind '{other}'"))),
        }
    }
}

#[async_trait]
pub trait RecommendationService: Send + Sync {
    /// Turns a numeric summary into free-form advice. Text in, text out.
    async fn recommend(&self, kind: RecommendationKind, summary: &str) -> PortResult<String>;
}
