//! crates/exam_tracker_core/src/history.rs
//!
//! Exam-level views over time: ordering, per-exam net rows, score statistics
//! and overall trends.

use crate::domain::{Exam, Subject};
use crate::scoring::exam_percentage;
use crate::trend::{classify_strict_trend, classify_trend, Trend, TrendDirection};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use uuid::Uuid;

/// Newest first: later sitting date wins, then later entry time. Exams with an
/// entry time sort before those without one on the same date.
pub fn newest_first(exams: &[Exam]) -> Vec<&Exam> {
    let mut ordered: Vec<&Exam> = exams.iter().collect();
    ordered.sort_by(|a, b| compare_newest_first(a, b));
    ordered
}

fn compare_newest_first(a: &Exam, b: &Exam) -> Ordering {
    b.date.cmp(&a.date).then_with(|| match (a.created_at, b.created_at) {
        (Some(a_at), Some(b_at)) => b_at.cmp(&a_at),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    })
}

pub fn latest_exam(exams: &[Exam]) -> Option<&Exam> {
    exams.iter().min_by(|a, b| compare_newest_first(a, b))
}

//=========================================================================================
// Net Tracker
//=========================================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubjectNet {
    pub subject_id: Uuid,
    pub name: String,
    pub net: f64,
}

/// One exam as a row of subject nets. Subjects missing from the exam show 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExamNetRow {
    pub exam_id: Uuid,
    pub name: String,
    pub date: NaiveDate,
    pub nets: Vec<SubjectNet>,
    pub total_net: f64,
}

pub fn exam_net_history(exams: &[Exam], subjects: &[Subject]) -> Vec<ExamNetRow> {
    newest_first(exams)
        .into_iter()
        .map(|exam| {
            let nets: Vec<SubjectNet> = subjects
                .iter()
                .map(|subject| SubjectNet {
                    subject_id: subject.id,
                    name: subject.name.clone(),
                    net: exam.result_for(subject.id).map(|r| r.net).unwrap_or(0.0),
                })
                .collect();
            let total_net = nets.iter().map(|n| n.net).sum();

            ExamNetRow {
                exam_id: exam.id,
                name: exam.name.clone(),
                date: exam.date,
                nets,
                total_net,
            }
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetTrackerStats {
    pub average_total_net: f64,
    pub highest: Option<ExamNetRow>,
    /// Strict three-point rule over total nets.
    pub trend: TrendDirection,
}

pub fn net_tracker_stats(history: &[ExamNetRow]) -> NetTrackerStats {
    if history.is_empty() {
        return NetTrackerStats {
            average_total_net: 0.0,
            highest: None,
            trend: TrendDirection::Stable,
        };
    }

    let totals: Vec<f64> = history.iter().map(|row| row.total_net).collect();
    let average_total_net = totals.iter().sum::<f64>() / totals.len() as f64;
    let highest = history
        .iter()
        .fold(None::<&ExamNetRow>, |best, row| match best {
            Some(b) if b.total_net >= row.total_net => Some(b),
            _ => Some(row),
        })
        .cloned();

    NetTrackerStats {
        average_total_net,
        highest,
        trend: classify_strict_trend(&totals),
    }
}

//=========================================================================================
// Exam Statistics
//=========================================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExamActivity {
    pub exam_id: Uuid,
    pub name: String,
    pub date: NaiveDate,
    pub score: f64,
    pub max_score: u32,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExamStatistics {
    pub total_exams: usize,
    pub average_percentage: f64,
    pub best: Option<ExamActivity>,
    /// Oldest first, for charting.
    pub activity: Vec<ExamActivity>,
}

pub fn exam_statistics(exams: &[Exam]) -> ExamStatistics {
    let mut activity: Vec<ExamActivity> = newest_first(exams)
        .into_iter()
        .map(|exam| ExamActivity {
            exam_id: exam.id,
            name: exam.name.clone(),
            date: exam.date,
            score: exam.score,
            max_score: exam.max_score,
            percentage: exam_percentage(exam.score, exam.max_score),
        })
        .collect();
    activity.reverse();

    let average_percentage = if activity.is_empty() {
        0.0
    } else {
        activity.iter().map(|a| a.percentage).sum::<f64>() / activity.len() as f64
    };

    let best = activity
        .iter()
        .filter(|a| a.percentage > 0.0)
        .fold(None::<&ExamActivity>, |best, a| match best {
            Some(b) if b.percentage >= a.percentage => Some(b),
            _ => Some(a),
        })
        .cloned();

    ExamStatistics {
        total_exams: activity.len(),
        average_percentage,
        best,
        activity,
    }
}

/// Two-point trend over exam scores, newest against the one before.
pub fn score_trend(exams: &[Exam]) -> Trend {
    let scores: Vec<f64> = newest_first(exams).iter().map(|e| e.score).collect();
    classify_trend(&scores)
}
