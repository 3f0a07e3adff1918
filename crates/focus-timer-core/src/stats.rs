//! Daily statistics.
//!
//! Counters are keyed by calendar day and never carry across days: any
//! access through [`DailyStats::roll_over`] on a stale day zeroes them first.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyStats {
    pub date: NaiveDate,
    /// Accumulated focus time in seconds.
    #[serde(default)]
    pub focus_time: u64,
    #[serde(default)]
    pub tasks_completed: u32,
    #[serde(default)]
    pub pomodoros: u32,
    #[serde(default)]
    pub sessions: u32,
}

impl DailyStats {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            focus_time: 0,
            tasks_completed: 0,
            pomodoros: 0,
            sessions: 0,
        }
    }

    /// Zero the counters if `today` is a different day. Returns true when a
    /// reset happened.
    pub fn roll_over(&mut self, today: NaiveDate) -> bool {
        if self.date == today {
            return false;
        }
        *self = Self::new(today);
        true
    }

    /// Clear all counters, keeping the day key.
    pub fn reset(&mut self) {
        *self = Self::new(self.date);
    }

    pub fn is_zero(&self) -> bool {
        self.focus_time == 0 && self.tasks_completed == 0 && self.pomodoros == 0 && self.sessions == 0
    }
}
