use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::breathing::{BreathPhase, BreathingPattern};
use crate::settings::SettingKey;
use crate::timer::{Mode, SessionType};

/// Every state change in the system produces an Event.
/// Listeners receive them in batches together with a fresh snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    TimerStarted {
        mode: Mode,
        session_type: SessionType,
        remaining_secs: u32,
        at: DateTime<Utc>,
    },
    TimerPaused {
        remaining_secs: u32,
        at: DateTime<Utc>,
    },
    TimerReset {
        mode: Mode,
        at: DateTime<Utc>,
    },
    TimerSkipped {
        mode: Mode,
        at: DateTime<Utc>,
    },
    /// A pomodoro interval or countdown ran out (or was skipped).
    SessionCompleted {
        mode: Mode,
        session_type: SessionType,
        next: SessionType,
        completed_cycles: u32,
        at: DateTime<Utc>,
    },
    BreakStarted {
        session_type: SessionType,
        at: DateTime<Utc>,
    },
    ModeChanged {
        from: Mode,
        to: Mode,
        at: DateTime<Utc>,
    },
    TaskAdded {
        id: String,
        name: String,
        at: DateTime<Utc>,
    },
    TaskDeleted {
        id: String,
        at: DateTime<Utc>,
    },
    TaskActivated {
        id: String,
        index: usize,
        at: DateTime<Utc>,
    },
    TaskCompleted {
        id: String,
        at: DateTime<Utc>,
    },
    /// Countdown mode ran out of incomplete tasks.
    TaskQueueExhausted {
        at: DateTime<Utc>,
    },
    TaskMoved {
        from: usize,
        to: usize,
        at: DateTime<Utc>,
    },
    CompletedCleared {
        removed: usize,
        at: DateTime<Utc>,
    },
    SettingChanged {
        key: SettingKey,
        value: String,
        at: DateTime<Utc>,
    },
    StatsReset {
        at: DateTime<Utc>,
    },
    BreathingStarted {
        pattern: BreathingPattern,
        cycle: u32,
        at: DateTime<Utc>,
    },
    BreathingStopped {
        at: DateTime<Utc>,
    },
    BreathingReset {
        pattern: BreathingPattern,
        at: DateTime<Utc>,
    },
    BreathPhaseChanged {
        phase: BreathPhase,
        cycle: u32,
        secs: u32,
        at: DateTime<Utc>,
    },
    BreathingCompleted {
        cycles: u32,
        at: DateTime<Utc>,
    },
    BreathingPatternChanged {
        pattern: BreathingPattern,
        at: DateTime<Utc>,
    },
    /// Request to play the notification sound.
    Chime {
        at: DateTime<Utc>,
    },
    SessionResumed {
        at: DateTime<Utc>,
    },
    SessionDiscarded {
        at: DateTime<Utc>,
    },
}
