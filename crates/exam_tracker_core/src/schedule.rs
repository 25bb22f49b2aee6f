//! crates/exam_tracker_core/src/schedule.rs
//!
//! Weekly study-plan generation and the study sessions synthesized when a plan
//! task is marked as completed.

use crate::config::MetricsConfig;
use crate::domain::{NewStudySession, PlannedTask, ScheduleTask, Subject};
use crate::timeslot::{format_slot, parse_duration};
use chrono::{DateTime, Datelike, Days, NaiveDate, NaiveTime, Utc, Weekday};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ScheduleError {
    #[error("Study hours per day, preferred days and subjects are all required")]
    MissingPreferences,
    #[error("Hour {0} is not a valid hour of the day")]
    InvalidHour(u32),
    #[error("No slot fits between {start_hour}:00 and {end_hour}:00")]
    NothingScheduled { start_hour: u32, end_hour: u32 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchedulePreferences {
    pub hours_per_day: u32,
    pub preferred_days: Vec<Weekday>,
    pub subjects: Vec<String>,
    pub start_hour: u32,
    pub end_hour: u32,
    #[serde(default)]
    pub break_minutes: u32,
}

/// Splits a comma separated subject list, dropping blanks.
pub fn parse_subject_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Fills each preferred day with one-hour slots from `start_hour`, cycling
/// through the subjects. The subject rotation carries over from one day to
/// the next. After a break the next slot starts on the following full hour.
pub fn generate_schedule(prefs: &SchedulePreferences) -> Result<Vec<PlannedTask>, ScheduleError> {
    let subjects: Vec<&str> = prefs
        .subjects
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect();

    if prefs.hours_per_day == 0 || prefs.preferred_days.is_empty() || subjects.is_empty() {
        return Err(ScheduleError::MissingPreferences);
    }
    for hour in [prefs.start_hour, prefs.end_hour] {
        if hour > 24 {
            return Err(ScheduleError::InvalidHour(hour));
        }
    }

    let break_hours = prefs.break_minutes.div_ceil(60);
    let mut rotation = subjects.iter().cycle();
    let mut planned = Vec::new();

    for &day in &prefs.preferred_days {
        let mut hour = prefs.start_hour;
        let mut scheduled = 0;

        while scheduled < prefs.hours_per_day && hour < prefs.end_hour {
            let end = (hour + 1).min(prefs.end_hour);
            let Some(subject) = rotation.next() else {
                break;
            };

            planned.push(PlannedTask {
                day,
                subject: (*subject).to_string(),
                time_slot: format_slot(hour * 60, end * 60),
            });
            scheduled += 1;
            hour = end + break_hours;
        }
    }

    if planned.is_empty() {
        return Err(ScheduleError::NothingScheduled {
            start_hour: prefs.start_hour,
            end_hour: prefs.end_hour,
        });
    }
    Ok(planned)
}

/// The date of `day` within the Sunday-start week that contains `today`.
pub fn date_in_current_week(day: Weekday, today: NaiveDate) -> NaiveDate {
    let offset = i64::from(day.num_days_from_sunday()) - i64::from(today.weekday().num_days_from_sunday());
    if offset >= 0 {
        today + Days::new(offset as u64)
    } else {
        today - Days::new(offset.unsigned_abs())
    }
}

/// The study session logged for a completed plan task, if any.
///
/// The task's subject must match a known subject by canonical name and its
/// slot must have a positive duration. The session is dated at
/// midnight UTC of the task's weekday in the current week.
pub fn session_from_completed_task(
    task: &ScheduleTask,
    subjects: &[Subject],
    config: &MetricsConfig,
    today: NaiveDate,
) -> Option<NewStudySession> {
    let duration_minutes = parse_duration(&task.time_slot);
    if duration_minutes == 0 {
        return None;
    }

    let wanted = config.canonical(&task.subject);
    let subject = subjects
        .iter()
        .find(|s| config.canonical(&s.name) == wanted)?;

    let date = date_in_current_week(task.day, today).and_time(NaiveTime::MIN);
    Some(NewStudySession {
        date: DateTime::<Utc>::from_naive_utc_and_offset(date, Utc),
        subject_id: subject.id,
        duration_minutes,
        notes: Some(format!("Otomatik plan: {} tamamlandı.", task.subject.trim())),
    })
}
