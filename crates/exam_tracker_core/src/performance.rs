//! crates/exam_tracker_core/src/performance.rs
//!
//! Subject-level performance: the latest net with its trend, the subjects that
//! need attention, and how each subject moved between the two latest exams.

use crate::config::MetricsConfig;
use crate::domain::{Exam, Subject};
use crate::history::newest_first;
use crate::trend::{classify_trend, Trend};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NetPerformance {
    pub subject_id: Uuid,
    /// Net in the most recent exam containing the subject.
    pub net: f64,
    pub trend: Trend,
    /// `net / max_net × 100`, clamped to 0..=100.
    pub percentage: f64,
    pub max_net: f64,
    pub exams_counted: u32,
}

impl NetPerformance {
    fn without_data(subject_id: Uuid) -> Self {
        Self {
            subject_id,
            net: 0.0,
            trend: Trend::STABLE,
            percentage: 0.0,
            max_net: 0.0,
            exams_counted: 0,
        }
    }

    pub fn has_data(&self) -> bool {
        self.exams_counted > 0
    }
}

/// Subject nets across the exams that contain the subject, newest first.
pub fn subject_net_series(exams: &[Exam], subject_id: Uuid) -> Vec<f64> {
    newest_first(exams)
        .into_iter()
        .filter_map(|exam| exam.result_for(subject_id).map(|r| r.net))
        .collect()
}

pub fn subject_net_performance(
    exams: &[Exam],
    subject_id: Uuid,
    config: &MetricsConfig,
) -> NetPerformance {
    let series = subject_net_series(exams, subject_id);
    let Some(&net) = series.first() else {
        return NetPerformance::without_data(subject_id);
    };

    let max_net = config.max_net_per_subject;
    let percentage = if max_net > 0.0 {
        (net / max_net * 100.0).clamp(0.0, 100.0)
    } else {
        0.0
    };

    NetPerformance {
        subject_id,
        net,
        trend: classify_trend(&series),
        percentage,
        max_net,
        exams_counted: series.len() as u32,
    }
}

/// Subjects with exam data whose percentage falls below the configured
/// threshold, weakest first, at most `weak_subject_limit` of them.
pub fn weak_subjects(
    subjects: &[Subject],
    exams: &[Exam],
    config: &MetricsConfig,
) -> Vec<NetPerformance> {
    let mut weak: Vec<NetPerformance> = subjects
        .iter()
        .map(|subject| subject_net_performance(exams, subject.id, config))
        .filter(|perf| perf.has_data() && perf.percentage < config.weak_subject_threshold)
        .collect();

    weak.sort_by(|a, b| a.percentage.total_cmp(&b.percentage));
    weak.truncate(config.weak_subject_limit);
    weak
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubjectNetChange {
    pub subject_id: Uuid,
    pub name: String,
    pub current_net: f64,
    pub change: f64,
}

/// Per-subject net difference between the latest exam and the one before it.
/// A subject absent from either exam counts as 0 net there. Empty with fewer
/// than two exams.
pub fn subject_net_changes(exams: &[Exam], subjects: &[Subject]) -> Vec<SubjectNetChange> {
    let ordered = newest_first(exams);
    let [latest, previous, ..] = ordered[..] else {
        return Vec::new();
    };

    subjects
        .iter()
        .map(|subject| {
            let net_in = |exam: &Exam| exam.result_for(subject.id).map(|r| r.net).unwrap_or(0.0);
            let current_net = net_in(latest);
            SubjectNetChange {
                subject_id: subject.id,
                name: subject.name.clone(),
                current_net,
                change: current_net - net_in(previous),
            }
        })
        .collect()
}
