//! crates/exam_tracker_core/src/timeslot.rs
//!
//! Parsing of study-plan time slots ("HH:MM - HH:MM").
//!
//! Slot durations feed category totals that are purely presentational, so a
//! malformed slot degrades to zero minutes instead of failing the whole view.

use serde::{Deserialize, Serialize};
use tracing::debug;

const MINUTES_PER_DAY: u32 = 24 * 60;

/// A parsed slot as minutes after midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
    pub start: u32,
    pub end: u32,
}

impl TimeSlot {
    pub fn parse(slot: &str) -> Option<Self> {
        let (start, end) = slot.split_once(" - ")?;
        Some(Self {
            start: parse_clock(start)?,
            end: parse_clock(end)?,
        })
    }

    /// Length in minutes. A slot whose end precedes its start wraps past midnight.
    pub fn duration(&self) -> u32 {
        if self.end >= self.start {
            self.end - self.start
        } else {
            self.end + MINUTES_PER_DAY - self.start
        }
    }
}

fn parse_clock(text: &str) -> Option<u32> {
    let (hours, minutes) = text.trim().split_once(':')?;
    let hours: u32 = hours.trim().parse().ok()?;
    let minutes: u32 = minutes.trim().parse().ok()?;
    (hours < 24 && minutes < 60).then_some(hours * 60 + minutes)
}

/// Duration of a slot in minutes, or 0 when the slot cannot be parsed.
pub fn parse_duration(slot: &str) -> u32 {
    match TimeSlot::parse(slot) {
        Some(parsed) => parsed.duration(),
        None => {
            debug!(slot, "Unparsable time slot, counting it as zero minutes");
            0
        }
    }
}

/// Renders two minute-of-day values as a slot string.
pub fn format_slot(start: u32, end: u32) -> String {
    format!(
        "{:02}:{:02} - {:02}:{:02}",
        (start / 60) % 24,
        start % 60,
        (end / 60) % 24,
        end % 60
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HoursMinutes {
    pub hours: u32,
    pub minutes: u32,
}

impl HoursMinutes {
    pub fn from_minutes(total: u32) -> Self {
        Self {
            hours: total / 60,
            minutes: total % 60,
        }
    }
}
