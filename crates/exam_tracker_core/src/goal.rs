//! crates/exam_tracker_core/src/goal.rs
//!
//! Progress toward configured targets: the composite university score, per
//! subject target nets, and the exam-date countdown.
//!
//! Percentages are clamped for progress bars. The remaining delta is always the
//! raw `target − current`, so an exceeded goal shows up as a negative delta.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// `round(current / target × 100)` clamped to 0..=100. A non-positive target
/// means the goal is not configured and yields 0.
pub fn compute_progress(current: f64, target: f64) -> u8 {
    if target <= 0.0 || !current.is_finite() || !target.is_finite() {
        return 0;
    }
    (current / target * 100.0).round().clamp(0.0, 100.0) as u8
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GoalProgress {
    pub current_score: f64,
    pub target_score: f64,
    pub percentage: u8,
    pub remaining_delta: f64,
}

pub fn compute_goal_progress(current_score: f64, target_score: f64) -> GoalProgress {
    GoalProgress {
        current_score,
        target_score,
        percentage: compute_progress(current_score, target_score),
        remaining_delta: target_score - current_score,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubjectGoalProgress {
    pub subject: String,
    pub target_net: f64,
    /// `None` until the subject appears in an exam.
    pub actual_net: Option<f64>,
    pub percentage: f64,
    pub remaining_delta: Option<f64>,
}

impl SubjectGoalProgress {
    pub fn is_achieved(&self) -> bool {
        matches!(self.remaining_delta, Some(delta) if delta <= 0.0)
    }
}

/// Per-subject progress toward a target net.
///
/// Without exam data, or without a positive target, the percentage is 0. The
/// percentage is capped at 100; the delta is not.
pub fn compute_subject_goal_progress(
    subject: &str,
    actual_net: Option<f64>,
    target_net: f64,
) -> SubjectGoalProgress {
    let percentage = match actual_net {
        Some(actual) if target_net > 0.0 => (actual / target_net * 100.0).clamp(0.0, 100.0),
        _ => 0.0,
    };

    SubjectGoalProgress {
        subject: subject.to_string(),
        target_net,
        actual_net,
        percentage,
        remaining_delta: actual_net.map(|actual| target_net - actual),
    }
}

/// Whole days from `today` until `target`, or 0 once the date has passed.
pub fn days_until(target: NaiveDate, today: NaiveDate) -> u32 {
    u32::try_from((target - today).num_days()).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn progress_rounds_and_clamps() {
        assert_eq!(compute_progress(265.0, 530.12), 50);
        assert_eq!(compute_progress(600.0, 530.0), 100);
        assert_eq!(compute_progress(-20.0, 530.0), 0);
    }

    #[test]
    fn unconfigured_target_is_zero_progress() {
        assert_eq!(compute_progress(120.0, 0.0), 0);
        assert_eq!(compute_progress(120.0, -5.0), 0);
    }

    #[test]
    fn goal_progress_keeps_raw_delta() {
        let progress = compute_goal_progress(540.0, 530.0);
        assert_eq!(progress.percentage, 100);
        assert_eq!(progress.remaining_delta, -10.0);
    }

    #[test]
    fn exceeded_subject_goal_caps_percentage_not_delta() {
        let progress = compute_subject_goal_progress("MATEMATİK", Some(45.0), 40.0);
        assert_eq!(progress.percentage, 100.0);
        assert_eq!(progress.remaining_delta, Some(-5.0));
        assert!(progress.is_achieved());
    }

    #[test]
    fn subject_goal_without_data_is_zero() {
        let progress = compute_subject_goal_progress("FEN BİLİMLERİ", None, 18.0);
        assert_eq!(progress.percentage, 0.0);
        assert_eq!(progress.remaining_delta, None);
        assert!(!progress.is_achieved());
    }

    #[test]
    fn subject_goal_with_non_positive_target_is_zero() {
        let progress = compute_subject_goal_progress("TÜRKÇE", Some(12.0), 0.0);
        assert_eq!(progress.percentage, 0.0);
        assert_eq!(progress.remaining_delta, Some(-12.0));
    }

    #[test]
    fn partial_subject_goal_is_unrounded() {
        let progress = compute_subject_goal_progress("TÜRKÇE", Some(10.0), 30.0);
        assert!((progress.percentage - 33.333_333).abs() < 1e-4);
        assert_eq!(progress.remaining_delta, Some(20.0));
    }

    #[test]
    fn negative_net_clamps_to_zero_percent() {
        let progress = compute_subject_goal_progress("TÜRKÇE", Some(-2.0), 30.0);
        assert_eq!(progress.percentage, 0.0);
        assert_eq!(progress.remaining_delta, Some(32.0));
    }

    #[test]
    fn countdown_never_negative() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        assert_eq!(days_until(NaiveDate::from_ymd_opt(2024, 6, 15).unwrap(), today), 14);
        assert_eq!(days_until(today, today), 0);
        assert_eq!(days_until(NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(), today), 0);
    }
}
