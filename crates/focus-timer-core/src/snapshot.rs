//! Read-only view of the whole widget for renderers.
//!
//! A [`Snapshot`] is rebuilt after every command and tick. It carries the raw
//! state plus the derived text a display needs (clock, label, breathing
//! instruction), so renderers never reach into the engines.

use serde::Serialize;

use crate::breathing::{BreathPhase, BreathingEngine, BreathingPattern};
use crate::context::Context;
use crate::settings::Settings;
use crate::stats::DailyStats;
use crate::task::Task;
use crate::timer::{Mode, SessionType, TimerEngine, TimerStatus};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub status: TimerStatus,
    pub mode: Mode,
    pub session_type: SessionType,
    pub label: String,
    pub clock: String,
    pub current_time: u32,
    pub total_time: u32,
    /// Fraction of the interval still remaining; absent without a target.
    pub remaining_fraction: Option<f64>,
    pub completed_cycles: u32,
    pub auto_start_pending: bool,
    pub active_task_index: Option<usize>,
    pub active_task: Option<Task>,
    pub task_remaining_secs: Option<u32>,
    pub tasks: Vec<Task>,
    pub settings: Settings,
    pub stats: DailyStats,
    pub breathing: BreathingSnapshot,
    pub resume_pending: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BreathingSnapshot {
    pub pattern: BreathingPattern,
    pub phase: BreathPhase,
    pub instruction: String,
    pub phase_time: u32,
    pub current_cycle: u32,
    pub total_cycles: u32,
    pub running: bool,
    pub complete: bool,
}

impl Snapshot {
    pub fn capture(
        timer: &TimerEngine,
        breathing: &BreathingEngine,
        ctx: &Context,
        resume_pending: bool,
    ) -> Self {
        let breathing = BreathingSnapshot::capture(breathing);
        let label = if timer.mode() == Mode::Breathe {
            if breathing.instruction.is_empty() {
                "Breathe".to_string()
            } else {
                breathing.instruction.clone()
            }
        } else {
            session_label(timer.mode(), timer.session_type()).to_string()
        };
        let clock = if timer.mode() == Mode::Breathe {
            format_clock(breathing.phase_time)
        } else {
            format_clock(timer.current_time())
        };
        Self {
            status: timer.status(),
            mode: timer.mode(),
            session_type: timer.session_type(),
            label,
            clock,
            current_time: timer.current_time(),
            total_time: timer.total_time(),
            remaining_fraction: timer.remaining_fraction(),
            completed_cycles: timer.completed_cycles(),
            auto_start_pending: timer.auto_start_pending(),
            active_task_index: ctx.tasks.active_index(),
            active_task: ctx.tasks.active().cloned(),
            task_remaining_secs: task_remaining_secs(timer, ctx),
            tasks: ctx.tasks.tasks().to_vec(),
            settings: ctx.settings,
            stats: ctx.stats.clone(),
            breathing,
            resume_pending,
        }
    }
}

impl BreathingSnapshot {
    pub fn capture(engine: &BreathingEngine) -> Self {
        let complete = engine.showing_complete();
        let instruction = if complete {
            "Complete".to_string()
        } else {
            engine.phase().instruction().to_string()
        };
        Self {
            pattern: engine.pattern(),
            phase: engine.phase(),
            instruction,
            phase_time: engine.phase_time(),
            current_cycle: engine.current_cycle(),
            total_cycles: engine.total_cycles(),
            running: engine.is_running(),
            complete,
        }
    }
}

/// Heading for the timer display.
pub fn session_label(mode: Mode, session_type: SessionType) -> &'static str {
    match (session_type, mode) {
        (SessionType::ShortBreak, _) => "Short Break",
        (SessionType::LongBreak, _) => "Long Break",
        (_, Mode::Stopwatch) => "Elapsed Time",
        (_, Mode::Countdown) => "Countdown",
        _ => "Focus Time",
    }
}

/// Seconds left on the active task's budget. Hidden once it reaches zero.
pub fn task_remaining_secs(timer: &TimerEngine, ctx: &Context) -> Option<u32> {
    let task = ctx.tasks.active()?;
    let budget = task.duration_secs()?;
    let remaining = match (timer.mode(), timer.session_type()) {
        (Mode::Countdown, _) => timer.current_time(),
        (Mode::Pomodoro, SessionType::Focus) => {
            let elapsed_this_session = ctx.settings.focus_secs().saturating_sub(timer.current_time());
            budget
                .saturating_sub(task.time_spent.saturating_mul(60))
                .saturating_sub(elapsed_this_session)
        }
        _ => return None,
    };
    (remaining > 0).then_some(remaining)
}

/// `MM:SS`, or `H:MM:SS` from one hour up.
pub fn format_clock(secs: u32) -> String {
    let (h, m, s) = (secs / 3600, (secs % 3600) / 60, secs % 60);
    if h > 0 {
        format!("{h}:{m:02}:{s:02}")
    } else {
        format!("{m:02}:{s:02}")
    }
}

/// `Xh Ym`, or `Ym` under an hour.
pub fn format_minutes(mins: u32) -> String {
    let h = mins / 60;
    if h > 0 {
        format!("{h}h {}m", mins % 60)
    } else {
        format!("{mins}m")
    }
}

/// Statistic durations always show hours and minutes.
pub fn format_stat_time(secs: u64) -> String {
    format!("{}h {}m", secs / 3600, (secs % 3600) / 60)
}
