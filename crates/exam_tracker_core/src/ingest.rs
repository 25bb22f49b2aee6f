//! crates/exam_tracker_core/src/ingest.rs
//!
//! The data-ingestion boundary. Raw records from storage may carry nullable
//! numeric columns; this module coalesces them once so that every calculator
//! downstream can assume fully populated values.

use crate::domain::{Exam, ExamSubjectResult, StudySession};
use crate::scoring::{compute_exam_score_and_max, compute_net};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

/// Raw input that cannot be turned into a domain record.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum IngestError {
    #[error("Negative value {value} for field '{field}'")]
    NegativeCount { field: &'static str, value: i64 },
    #[error("Value {value} for field '{field}' is out of range")]
    OutOfRange { field: &'static str, value: i64 },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawExamSubjectResult {
    pub subject_id: Uuid,
    pub correct: Option<i64>,
    pub incorrect: Option<i64>,
    pub empty: Option<i64>,
    pub net: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawExam {
    pub id: Uuid,
    pub name: String,
    pub date: NaiveDate,
    pub created_at: Option<DateTime<Utc>>,
    pub score: Option<f64>,
    pub max_score: Option<i64>,
    pub subjects: Vec<RawExamSubjectResult>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawStudySession {
    pub id: Uuid,
    pub date: DateTime<Utc>,
    pub subject_id: Uuid,
    pub duration: Option<i64>,
    pub notes: Option<String>,
}

/// Missing counts become zero. Negative counts are structurally invalid.
pub fn coalesce_count(field: &'static str, value: Option<i64>) -> Result<u32, IngestError> {
    match value {
        None => Ok(0),
        Some(v) if v < 0 => Err(IngestError::NegativeCount { field, value: v }),
        Some(v) => u32::try_from(v).map_err(|_| IngestError::OutOfRange { field, value: v }),
    }
}

pub fn normalize_subject_result(
    raw: &RawExamSubjectResult,
) -> Result<ExamSubjectResult, IngestError> {
    let correct = coalesce_count("correct", raw.correct)?;
    let incorrect = coalesce_count("incorrect", raw.incorrect)?;
    let empty = coalesce_count("empty", raw.empty)?;

    let net = match raw.net {
        Some(net) if net.is_finite() => net,
        _ => {
            debug!(subject_id = %raw.subject_id, "Recomputing missing net");
            compute_net(correct, incorrect)
        }
    };

    Ok(ExamSubjectResult {
        subject_id: raw.subject_id,
        correct,
        incorrect,
        empty,
        net,
    })
}

/// Normalizes an exam and its nested results. Score and max score fall back to
/// the totals of the normalized results when storage left them empty.
pub fn normalize_exam(raw: &RawExam) -> Result<Exam, IngestError> {
    let subjects = raw
        .subjects
        .iter()
        .map(normalize_subject_result)
        .collect::<Result<Vec<_>, _>>()?;

    let totals = compute_exam_score_and_max(&subjects);
    let score = raw.score.filter(|s| s.is_finite()).unwrap_or(totals.score);
    let max_score = match raw.max_score {
        Some(_) => coalesce_count("max_score", raw.max_score)?,
        None => totals.max_questions,
    };

    Ok(Exam {
        id: raw.id,
        name: raw.name.clone(),
        date: raw.date,
        created_at: raw.created_at,
        score,
        max_score,
        subjects,
    })
}

pub fn normalize_session(raw: &RawStudySession) -> Result<StudySession, IngestError> {
    Ok(StudySession {
        id: raw.id,
        date: raw.date,
        subject_id: raw.subject_id,
        duration_minutes: coalesce_count("duration", raw.duration)?,
        notes: raw.notes.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn raw_result(correct: Option<i64>, incorrect: Option<i64>, net: Option<f64>) -> RawExamSubjectResult {
        RawExamSubjectResult {
            subject_id: Uuid::nil(),
            correct,
            incorrect,
            empty: None,
            net,
        }
    }

    #[test]
    fn missing_counts_are_zero() {
        assert_eq!(coalesce_count("correct", None), Ok(0));
        assert_eq!(coalesce_count("correct", Some(12)), Ok(12));
    }

    #[test]
    fn negative_count_is_rejected() {
        assert_eq!(
            coalesce_count("incorrect", Some(-1)),
            Err(IngestError::NegativeCount {
                field: "incorrect",
                value: -1
            })
        );
    }

    #[test]
    fn missing_net_is_recomputed() {
        let result = normalize_subject_result(&raw_result(Some(30), Some(8), None)).unwrap();
        assert_eq!(result.net, 28.0);
        assert_eq!(result.empty, 0);
    }

    #[test]
    fn stored_net_is_kept() {
        let result = normalize_subject_result(&raw_result(Some(30), Some(8), Some(27.5))).unwrap();
        assert_eq!(result.net, 27.5);
    }

    #[test]
    fn all_fields_missing_gives_zero_net() {
        let result = normalize_subject_result(&raw_result(None, None, None)).unwrap();
        assert_eq!(result.net, 0.0);
        assert_eq!(result.total_questions(), 0);
    }

    #[test]
    fn exam_totals_fill_missing_score() {
        let raw = RawExam {
            id: Uuid::nil(),
            name: "Deneme 1".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            created_at: None,
            score: None,
            max_score: None,
            subjects: vec![RawExamSubjectResult {
                empty: Some(2),
                ..raw_result(Some(30), Some(8), None)
            }],
        };

        let exam = normalize_exam(&raw).unwrap();
        assert_eq!(exam.score, 28.0);
        assert_eq!(exam.max_score, 40);
    }

    #[test]
    fn normalization_is_idempotent() {
        let raw = raw_result(Some(12), Some(3), None);
        assert_eq!(
            normalize_subject_result(&raw).unwrap(),
            normalize_subject_result(&raw).unwrap()
        );
    }
}
