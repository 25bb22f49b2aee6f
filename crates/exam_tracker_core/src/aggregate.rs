//! crates/exam_tracker_core/src/aggregate.rs
//!
//! Grouping of exam results, study sessions and plan tasks by subject, category
//! and day. Outputs use ordered maps or explicitly sorted vectors so that results
//! are deterministic.

use crate::config::MetricsConfig;
use crate::domain::{Exam, ScheduleTask, StudySession, TaskStatus};
use crate::timeslot::parse_duration;
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

//=========================================================================================
// Exam Results by Subject
//=========================================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubjectAggregate {
    pub subject_id: Uuid,
    pub correct_sum: u32,
    pub total_sum: u32,
    /// Mean net over the exams that contain this subject.
    pub average_net: f64,
    pub exams_counted: u32,
}

impl SubjectAggregate {
    /// Share of questions answered correctly, rounded. Zero when nothing was asked.
    pub fn accuracy_percent(&self) -> u32 {
        if self.total_sum == 0 {
            0
        } else {
            (f64::from(self.correct_sum) / f64::from(self.total_sum) * 100.0).round() as u32
        }
    }
}

/// Sums results per subject across all exams.
///
/// An exam without a given subject does not count toward that subject's average.
pub fn aggregate_by_subject(exams: &[Exam]) -> BTreeMap<Uuid, SubjectAggregate> {
    let mut sums: BTreeMap<Uuid, (u32, u32, f64, u32)> = BTreeMap::new();

    for result in exams.iter().flat_map(|e| e.subjects.iter()) {
        let entry = sums.entry(result.subject_id).or_default();
        entry.0 = entry.0.saturating_add(result.correct);
        entry.1 = entry.1.saturating_add(result.total_questions());
        entry.2 += result.net;
        entry.3 = entry.3.saturating_add(1);
    }

    sums.into_iter()
        .map(|(subject_id, (correct_sum, total_sum, net_sum, count))| {
            let aggregate = SubjectAggregate {
                subject_id,
                correct_sum,
                total_sum,
                average_net: net_sum / f64::from(count),
                exams_counted: count,
            };
            (subject_id, aggregate)
        })
        .collect()
}

//=========================================================================================
// Study Plan by Category
//=========================================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryAggregate {
    pub category: String,
    pub total_duration_minutes: u32,
    /// Member tasks ordered by time slot.
    pub tasks: Vec<ScheduleTask>,
}

/// Groups plan tasks under their umbrella category.
///
/// Categories come out in alphabetical order and tasks within a category in
/// ascending time-slot order. Unparsable slots contribute zero minutes.
pub fn aggregate_by_category(
    tasks: &[ScheduleTask],
    config: &MetricsConfig,
) -> Vec<CategoryAggregate> {
    let mut groups: BTreeMap<String, CategoryAggregate> = BTreeMap::new();

    for task in tasks {
        let category = config.category_of(&task.subject);
        let group = groups
            .entry(category.clone())
            .or_insert_with(|| CategoryAggregate {
                category,
                total_duration_minutes: 0,
                tasks: Vec::new(),
            });
        group.total_duration_minutes = group
            .total_duration_minutes
            .saturating_add(parse_duration(&task.time_slot));
        group.tasks.push(task.clone());
    }

    groups
        .into_values()
        .map(|mut group| {
            group.tasks.sort_by(|a, b| a.time_slot.cmp(&b.time_slot));
            group
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskCompletion {
    pub category: String,
    pub completed: u32,
    pub total: u32,
}

/// Completed versus total plan tasks per category, alphabetically.
pub fn task_completion_by_category(
    tasks: &[ScheduleTask],
    config: &MetricsConfig,
) -> Vec<TaskCompletion> {
    let mut counts: BTreeMap<String, (u32, u32)> = BTreeMap::new();

    for task in tasks {
        let entry = counts.entry(config.category_of(&task.subject)).or_default();
        entry.1 += 1;
        if task.status == TaskStatus::Completed {
            entry.0 += 1;
        }
    }

    counts
        .into_iter()
        .map(|(category, (completed, total))| TaskCompletion {
            category,
            completed,
            total,
        })
        .collect()
}

//=========================================================================================
// Study Time
//=========================================================================================

/// Minute and count totals clamp at `u32::MAX` instead of overflowing.
pub fn saturating_sum(values: impl IntoIterator<Item = u32>) -> u32 {
    values.into_iter().fold(0, u32::saturating_add)
}

pub fn study_time_by_subject(sessions: &[StudySession]) -> BTreeMap<Uuid, u32> {
    let mut totals = BTreeMap::new();
    for session in sessions {
        let total = totals.entry(session.subject_id).or_insert(0u32);
        *total = total.saturating_add(session.duration_minutes);
    }
    totals
}

pub fn study_time_by_day(sessions: &[StudySession]) -> BTreeMap<NaiveDate, u32> {
    let mut totals = BTreeMap::new();
    for session in sessions {
        let total = totals.entry(session.date.date_naive()).or_insert(0u32);
        *total = total.saturating_add(session.duration_minutes);
    }
    totals
}

/// Rounded share of total study minutes per subject.
pub fn study_share_by_subject(sessions: &[StudySession]) -> BTreeMap<Uuid, u32> {
    let by_subject = study_time_by_subject(sessions);
    let total = saturating_sum(by_subject.values().copied());

    by_subject
        .into_iter()
        .map(|(subject_id, minutes)| {
            let share = if total == 0 {
                0
            } else {
                (f64::from(minutes) / f64::from(total) * 100.0).round() as u32
            };
            (subject_id, share)
        })
        .collect()
}

/// Minutes studied on one calendar day.
pub fn study_time_on(sessions: &[StudySession], day: NaiveDate) -> u32 {
    sessions
        .iter()
        .filter(|s| s.date.date_naive() == day)
        .map(|s| s.duration_minutes)
        .fold(0, u32::saturating_add)
}

/// Minutes studied for one subject within the last `window_days` days, today included.
pub fn recent_study_time(
    sessions: &[StudySession],
    subject_id: Uuid,
    today: NaiveDate,
    window_days: u32,
) -> u32 {
    let earliest = today - Duration::days(i64::from(window_days.saturating_sub(1)));

    sessions
        .iter()
        .filter(|s| s.subject_id == subject_id)
        .filter(|s| {
            let day = s.date.date_naive();
            day >= earliest && day <= today
        })
        .map(|s| s.duration_minutes)
        .fold(0, u32::saturating_add)
}

/// Rounded mean session length per subject.
pub fn average_session_minutes(sessions: &[StudySession]) -> BTreeMap<Uuid, u32> {
    let mut sums: BTreeMap<Uuid, (u32, u32)> = BTreeMap::new();
    for session in sessions {
        let entry = sums.entry(session.subject_id).or_default();
        entry.0 = entry.0.saturating_add(session.duration_minutes);
        entry.1 = entry.1.saturating_add(1);
    }

    sums.into_iter()
        .map(|(subject_id, (minutes, count))| {
            (
                subject_id,
                (f64::from(minutes) / f64::from(count)).round() as u32,
            )
        })
        .collect()
}
