//! crates/exam_tracker_core/src/dashboard.rs
//!
//! Read views composed from one `UserSnapshot`. Each view runs the calculators
//! in pipeline order and returns plain data ready to be serialized.

use crate::aggregate::{
    aggregate_by_category, aggregate_by_subject, average_session_minutes, recent_study_time,
    saturating_sum, study_share_by_subject, study_time_by_subject, study_time_on,
    task_completion_by_category, CategoryAggregate, TaskCompletion,
};
use crate::config::MetricsConfig;
use crate::domain::{ScheduleTask, UserSnapshot};
use crate::goal::{
    compute_goal_progress, compute_progress, compute_subject_goal_progress, days_until,
    GoalProgress, SubjectGoalProgress,
};
use crate::history::{
    exam_net_history, exam_statistics, latest_exam, net_tracker_stats, score_trend, ExamActivity,
    ExamNetRow, ExamStatistics, NetTrackerStats,
};
use crate::performance::{
    subject_net_changes, subject_net_performance, weak_subjects, NetPerformance, SubjectNetChange,
};
use crate::scoring::{compute_goal_total_score, exam_percentage};
use crate::trend::{compute_study_streak, session_days, Trend};
use chrono::{NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

//=========================================================================================
// Dashboard
//=========================================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpcomingExam {
    pub exam_id: Uuid,
    pub name: String,
    pub date: NaiveDate,
    pub days_left: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklySubjectStudy {
    pub subject_id: Uuid,
    pub name: String,
    pub minutes: u32,
    pub goal_minutes: u32,
    pub percentage: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dashboard {
    /// `None` when no target exam date is configured.
    pub days_left: Option<u32>,
    pub streak: u32,
    pub today_minutes: u32,
    pub daily_goal_minutes: u32,
    pub daily_progress: u8,
    pub latest_exam: Option<ExamActivity>,
    pub upcoming_exams: Vec<UpcomingExam>,
    pub subject_performance: Vec<NetPerformance>,
    pub weak_subjects: Vec<NetPerformance>,
    pub weekly_study: Vec<WeeklySubjectStudy>,
}

pub fn build_dashboard(snapshot: &UserSnapshot, config: &MetricsConfig, today: NaiveDate) -> Dashboard {
    let today_minutes = study_time_on(&snapshot.sessions, today);

    let latest_exam = latest_exam(&snapshot.exams).map(|exam| ExamActivity {
        exam_id: exam.id,
        name: exam.name.clone(),
        date: exam.date,
        score: exam.score,
        max_score: exam.max_score,
        percentage: exam_percentage(exam.score, exam.max_score),
    });

    let weekly_study = snapshot
        .subjects
        .iter()
        .map(|subject| {
            let minutes = recent_study_time(
                &snapshot.sessions,
                subject.id,
                today,
                config.weekly_window_days,
            );
            WeeklySubjectStudy {
                subject_id: subject.id,
                name: subject.name.clone(),
                minutes,
                goal_minutes: config.weekly_goal_minutes,
                percentage: compute_progress(
                    f64::from(minutes),
                    f64::from(config.weekly_goal_minutes),
                ),
            }
        })
        .collect();

    Dashboard {
        days_left: snapshot
            .targets
            .target_exam_date
            .map(|date| days_until(date, today)),
        streak: compute_study_streak(session_days(&snapshot.sessions), today),
        today_minutes,
        daily_goal_minutes: config.daily_goal_minutes,
        daily_progress: compute_progress(
            f64::from(today_minutes),
            f64::from(config.daily_goal_minutes),
        ),
        latest_exam,
        upcoming_exams: upcoming_exams(snapshot, config, today),
        subject_performance: snapshot
            .subjects
            .iter()
            .map(|subject| subject_net_performance(&snapshot.exams, subject.id, config))
            .collect(),
        weak_subjects: weak_subjects(&snapshot.subjects, &snapshot.exams, config),
        weekly_study,
    }
}

/// Exams dated after today and within the configured window, soonest first.
pub fn upcoming_exams(
    snapshot: &UserSnapshot,
    config: &MetricsConfig,
    today: NaiveDate,
) -> Vec<UpcomingExam> {
    let mut upcoming: Vec<UpcomingExam> = snapshot
        .exams
        .iter()
        .filter_map(|exam| {
            let days_left = (exam.date - today).num_days();
            (days_left > 0 && days_left <= i64::from(config.upcoming_exam_window_days)).then(|| {
                UpcomingExam {
                    exam_id: exam.id,
                    name: exam.name.clone(),
                    date: exam.date,
                    days_left: days_left as u32,
                }
            })
        })
        .collect();

    upcoming.sort_by_key(|u| u.date);
    upcoming.truncate(config.upcoming_exam_limit);
    upcoming
}

//=========================================================================================
// Statistics
//=========================================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubjectStatistics {
    pub subject_id: Uuid,
    pub name: String,
    pub color: String,
    pub correct_sum: u32,
    pub total_sum: u32,
    pub accuracy_percent: u32,
    pub average_net: f64,
    pub exams_counted: u32,
    pub study_minutes: u32,
    pub study_share_percent: u32,
    pub average_session_minutes: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatisticsView {
    pub subjects: Vec<SubjectStatistics>,
    pub exams: ExamStatistics,
    pub total_study_minutes: u32,
    pub task_completion: Vec<TaskCompletion>,
}

pub fn build_statistics(snapshot: &UserSnapshot, config: &MetricsConfig) -> StatisticsView {
    let aggregates = aggregate_by_subject(&snapshot.exams);
    let minutes = study_time_by_subject(&snapshot.sessions);
    let shares = study_share_by_subject(&snapshot.sessions);
    let averages = average_session_minutes(&snapshot.sessions);

    let subjects = snapshot
        .subjects
        .iter()
        .map(|subject| {
            let aggregate = aggregates.get(&subject.id);
            SubjectStatistics {
                subject_id: subject.id,
                name: subject.name.clone(),
                color: subject.color.clone(),
                correct_sum: aggregate.map(|a| a.correct_sum).unwrap_or(0),
                total_sum: aggregate.map(|a| a.total_sum).unwrap_or(0),
                accuracy_percent: aggregate.map(|a| a.accuracy_percent()).unwrap_or(0),
                average_net: aggregate.map(|a| a.average_net).unwrap_or(0.0),
                exams_counted: aggregate.map(|a| a.exams_counted).unwrap_or(0),
                study_minutes: minutes.get(&subject.id).copied().unwrap_or(0),
                study_share_percent: shares.get(&subject.id).copied().unwrap_or(0),
                average_session_minutes: averages.get(&subject.id).copied().unwrap_or(0),
            }
        })
        .collect();

    StatisticsView {
        subjects,
        exams: exam_statistics(&snapshot.exams),
        total_study_minutes: saturating_sum(minutes.values().copied()),
        task_completion: task_completion_by_category(&snapshot.schedule, config),
    }
}

//=========================================================================================
// Net Tracker & Exam Analysis
//=========================================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetTrackerView {
    pub history: Vec<ExamNetRow>,
    pub stats: NetTrackerStats,
}

pub fn build_net_tracker(snapshot: &UserSnapshot) -> NetTrackerView {
    let history = exam_net_history(&snapshot.exams, &snapshot.subjects);
    let stats = net_tracker_stats(&history);
    NetTrackerView { history, stats }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExamAnalysisView {
    pub trend: Trend,
    pub subject_changes: Vec<SubjectNetChange>,
}

pub fn build_exam_analysis(snapshot: &UserSnapshot) -> ExamAnalysisView {
    ExamAnalysisView {
        trend: score_trend(&snapshot.exams),
        subject_changes: subject_net_changes(&snapshot.exams, &snapshot.subjects),
    }
}

//=========================================================================================
// Goals
//=========================================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalsView {
    pub current_score: f64,
    /// `None` until a university base score is configured.
    pub score_goal: Option<GoalProgress>,
    pub subject_goals: Vec<SubjectGoalProgress>,
    pub days_left: Option<u32>,
    pub university: Option<String>,
    pub department: Option<String>,
}

/// Nets of the latest exam keyed by canonical subject name.
pub fn latest_nets_by_name(snapshot: &UserSnapshot, config: &MetricsConfig) -> BTreeMap<String, f64> {
    let Some(exam) = latest_exam(&snapshot.exams) else {
        return BTreeMap::new();
    };

    exam.subjects
        .iter()
        .filter_map(|result| {
            snapshot
                .subject(result.subject_id)
                .map(|subject| (config.canonical(&subject.name), result.net))
        })
        .collect()
}

pub fn build_goals(snapshot: &UserSnapshot, config: &MetricsConfig, today: NaiveDate) -> GoalsView {
    let nets = latest_nets_by_name(snapshot, config);
    let current_score = compute_goal_total_score(&nets, &config.composite, config.locale);
    let targets = &snapshot.targets;

    let subject_goals = targets
        .subject_target_nets
        .iter()
        .map(|(subject, target)| {
            let actual = nets.get(&config.canonical(subject)).copied();
            compute_subject_goal_progress(subject, actual, *target)
        })
        .collect();

    GoalsView {
        current_score,
        score_goal: targets
            .target_score
            .map(|target| compute_goal_progress(current_score, target)),
        subject_goals,
        days_left: targets.target_exam_date.map(|date| days_until(date, today)),
        university: targets.university.clone(),
        department: targets.department.clone(),
    }
}

//=========================================================================================
// Study Plan
//=========================================================================================

pub fn tasks_for_day(schedule: &[ScheduleTask], day: Weekday) -> Vec<ScheduleTask> {
    schedule.iter().filter(|t| t.day == day).cloned().collect()
}

/// Category breakdown of one weekday of the plan.
pub fn build_day_plan(snapshot: &UserSnapshot, config: &MetricsConfig, day: Weekday) -> Vec<CategoryAggregate> {
    aggregate_by_category(&tasks_for_day(&snapshot.schedule, day), config)
}
