//! crates/exam_tracker_core/src/summary.rs
//!
//! Numeric summaries handed to the recommendation service as prompt input.

use crate::aggregate::aggregate_by_subject;
use crate::config::MetricsConfig;
use crate::domain::{Exam, UserSnapshot};
use crate::history::latest_exam;
use crate::performance::subject_net_performance;
use crate::ports::RecommendationKind;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SummaryError {
    #[error("At least one subject is required")]
    NoSubjects,
    #[error("{kind} needs at least {required} exam(s), found {found}")]
    NotEnoughExams {
        kind: RecommendationKind,
        required: usize,
        found: usize,
    },
}

impl RecommendationKind {
    /// Exams required before a summary of this kind carries any signal.
    pub fn required_exams(&self) -> usize {
        match self {
            RecommendationKind::StudyPlan | RecommendationKind::ErrorAnalysis => 1,
            RecommendationKind::ExamStrategy => 2,
        }
    }
}

/// Builds the summary for `kind` from one user's snapshot.
pub fn build_summary(
    kind: RecommendationKind,
    snapshot: &UserSnapshot,
    config: &MetricsConfig,
) -> Result<String, SummaryError> {
    let found = snapshot.exams.len();
    if found < kind.required_exams() {
        return Err(SummaryError::NotEnoughExams {
            kind,
            required: kind.required_exams(),
            found,
        });
    }

    match kind {
        RecommendationKind::StudyPlan => {
            if snapshot.subjects.is_empty() {
                return Err(SummaryError::NoSubjects);
            }
            Ok(accuracy_summary(snapshot))
        }
        RecommendationKind::ExamStrategy => {
            if snapshot.subjects.is_empty() {
                return Err(SummaryError::NoSubjects);
            }
            Ok(net_trend_summary(snapshot, config))
        }
        RecommendationKind::ErrorAnalysis => match latest_exam(&snapshot.exams) {
            Some(exam) => Ok(error_summary(snapshot, exam)),
            None => Err(SummaryError::NotEnoughExams {
                kind,
                required: 1,
                found: 0,
            }),
        },
    }
}

/// `"Matematik: 65/80 doğru, Fizik: 12/20 doğru"`
pub fn accuracy_summary(snapshot: &UserSnapshot) -> String {
    let aggregates = aggregate_by_subject(&snapshot.exams);
    snapshot
        .subjects
        .iter()
        .map(|subject| {
            let (correct, total) = aggregates
                .get(&subject.id)
                .map(|a| (a.correct_sum, a.total_sum))
                .unwrap_or((0, 0));
            format!("{}: {}/{} doğru", subject.name, correct, total)
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// One line per subject: `"Matematik: Son Net: 34.00, Trend: up"`.
pub fn net_trend_summary(snapshot: &UserSnapshot, config: &MetricsConfig) -> String {
    snapshot
        .subjects
        .iter()
        .map(|subject| {
            let perf = subject_net_performance(&snapshot.exams, subject.id, config);
            format!(
                "{}: Son Net: {:.2}, Trend: {}",
                subject.name,
                perf.net,
                perf.trend.direction.as_str()
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// The exam name, then one line per subject result:
/// `"Matematik: 35D, 4Y, 1B, Net: 34.00"`. Unknown subjects fall back to
/// their id.
pub fn error_summary(snapshot: &UserSnapshot, exam: &Exam) -> String {
    let mut lines = vec![format!("Sınav: {}", exam.name)];
    lines.extend(exam.subjects.iter().map(|result| {
        let name = snapshot
            .subject(result.subject_id)
            .map(|s| s.name.clone())
            .unwrap_or_else(|| result.subject_id.to_string());
        format!(
            "{}: {}D, {}Y, {}B, Net: {:.2}",
            name, result.correct, result.incorrect, result.empty, result.net
        )
    }));
    lines.join("\n")
}
