//! crates/exam_tracker_core/src/trend.rs
//!
//! Direction-of-travel classification for time-ordered series, and the
//! consecutive-day study streak.
//!
//! Two trend rules coexist on purpose. `classify_trend` compares the two most
//! recent points and reports a percentage change; `classify_strict_trend` only
//! reports a direction when the three most recent points move monotonically.

use crate::domain::StudySession;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Up,
    Down,
    Stable,
}

impl TrendDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrendDirection::Up => "up",
            TrendDirection::Down => "down",
            TrendDirection::Stable => "stable",
        }
    }
}

/// Direction plus the size of the change, in whole percent of the previous value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trend {
    pub direction: TrendDirection,
    pub magnitude_percent: u32,
}

impl Trend {
    pub const STABLE: Trend = Trend {
        direction: TrendDirection::Stable,
        magnitude_percent: 0,
    };
}

/// Compares the newest value (index 0) against the one before it.
///
/// A zero baseline cannot be divided by, so any positive value after it counts
/// as a 100% rise and anything else is stable.
pub fn classify_trend(newest_first: &[f64]) -> Trend {
    let (current, previous) = match newest_first {
        [current, previous, ..] => (*current, *previous),
        _ => return Trend::STABLE,
    };

    if previous == 0.0 {
        return if current > 0.0 {
            Trend {
                direction: TrendDirection::Up,
                magnitude_percent: 100,
            }
        } else {
            Trend::STABLE
        };
    }

    let change = ((current - previous) / previous * 100.0).round().abs();
    let direction = if current > previous {
        TrendDirection::Up
    } else if current < previous {
        TrendDirection::Down
    } else {
        TrendDirection::Stable
    };

    Trend {
        direction,
        magnitude_percent: if direction == TrendDirection::Stable {
            0
        } else {
            change as u32
        },
    }
}

/// Up only if the last three points rise strictly toward the newest, down only
/// if they fall strictly. Fewer than three points is stable.
pub fn classify_strict_trend(newest_first: &[f64]) -> TrendDirection {
    match newest_first {
        [a, b, c, ..] if a > b && b > c => TrendDirection::Up,
        [a, b, c, ..] if a < b && b < c => TrendDirection::Down,
        _ => TrendDirection::Stable,
    }
}

/// Calendar day (UTC) of every session, in input order.
pub fn session_days(sessions: &[StudySession]) -> Vec<NaiveDate> {
    sessions.iter().map(|s| s.date.date_naive()).collect()
}

/// Consecutive study days in the run that ends today or yesterday.
///
/// A run that stopped two or more days ago is broken and counts as zero; older
/// runs buried in the history are never counted.
pub fn compute_study_streak<I>(dates: I, today: NaiveDate) -> u32
where
    I: IntoIterator<Item = NaiveDate>,
{
    let distinct: BTreeSet<NaiveDate> = dates.into_iter().collect();
    let mut newest_first = distinct.into_iter().rev();

    let Some(most_recent) = newest_first.next() else {
        return 0;
    };

    if (today - most_recent).num_days() > 1 {
        return 0;
    }

    let mut streak = 1;
    let mut current = most_recent;
    for day in newest_first {
        if (current - day).num_days() != 1 {
            break;
        }
        streak += 1;
        current = day;
    }

    streak
}
