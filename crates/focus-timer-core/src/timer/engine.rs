//! Timer engine implementation.
//!
//! The engine is a tick-driven state machine. It owns its [`Ticker`] handle
//! but never awaits it; the controller waits on the handle and calls
//! `tick()` once per fire. Tests call `tick()` directly.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Running -> Paused -> Running -> ... -> (completion) -> Idle
//! ```
//!
//! On completion in pomodoro mode the session type advances
//! focus -> short/long break -> focus, and an auto-start may be armed.
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = TimerEngine::new(&ctx.settings);
//! engine.start(&mut ctx);
//! // Once per second while running:
//! let events = engine.tick(&mut ctx);
//! ```

use chrono::Utc;
use std::time::Duration;
use tracing::debug;

use super::scheduler::{Ticker, Timeout};
use super::session::{Mode, SessionType, TimerStatus};
use crate::context::Context;
use crate::events::Event;
use crate::settings::Settings;

/// Countdown length when the active task has no budget.
pub const DEFAULT_COUNTDOWN_SECS: u32 = 25 * 60;
/// Pause between a completion and an automatic start of the next interval.
pub const AUTO_START_DELAY: Duration = Duration::from_millis(500);
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Core timer engine.
#[derive(Debug, Clone)]
pub struct TimerEngine {
    mode: Mode,
    session_type: SessionType,
    /// Seconds remaining, or seconds elapsed in stopwatch mode.
    current_time: u32,
    /// Seconds in the current interval. Zero in stopwatch mode.
    total_time: u32,
    running: bool,
    paused: bool,
    /// Focus sessions completed since the last long break.
    completed_cycles: u32,
    ticker: Ticker,
    auto_start: Timeout,
}

impl TimerEngine {
    /// Create an idle pomodoro engine loaded with a focus interval.
    pub fn new(settings: &Settings) -> Self {
        Self {
            mode: Mode::Pomodoro,
            session_type: SessionType::Focus,
            current_time: settings.focus_secs(),
            total_time: settings.focus_secs(),
            running: false,
            paused: false,
            completed_cycles: 0,
            ticker: Ticker::every(TICK_PERIOD),
            auto_start: Timeout::default(),
        }
    }

    /// Rebuild an idle engine from persisted fields.
    pub fn restore(
        mode: Mode,
        session_type: SessionType,
        current_time: u32,
        total_time: u32,
        completed_cycles: u32,
        settings: &Settings,
    ) -> Self {
        let mut engine = Self::new(settings);
        engine.mode = mode;
        engine.session_type = session_type;
        engine.current_time = current_time;
        engine.total_time = if mode == Mode::Stopwatch { 0 } else { total_time };
        engine.completed_cycles =
            completed_cycles.min(settings.cycles_before_long_break.saturating_sub(1));
        engine
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn session_type(&self) -> SessionType {
        self.session_type
    }

    pub fn current_time(&self) -> u32 {
        self.current_time
    }

    pub fn total_time(&self) -> u32 {
        self.total_time
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn status(&self) -> TimerStatus {
        if self.running {
            TimerStatus::Running
        } else if self.paused {
            TimerStatus::Paused
        } else {
            TimerStatus::Idle
        }
    }

    pub fn completed_cycles(&self) -> u32 {
        self.completed_cycles
    }

    pub fn auto_start_pending(&self) -> bool {
        self.auto_start.is_armed()
    }

    /// 0.0 .. 1.0 fraction remaining. `None` when there is no target.
    pub fn remaining_fraction(&self) -> Option<f64> {
        if self.mode == Mode::Stopwatch || self.total_time == 0 {
            return None;
        }
        Some(self.current_time as f64 / self.total_time as f64)
    }

    /// Tick and auto-start handles, for the controller to await.
    pub(crate) fn handles_mut(&mut self) -> (&mut Ticker, &mut Timeout) {
        (&mut self.ticker, &mut self.auto_start)
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Begin ticking. No-op while a tick handle exists or in breathe mode.
    pub fn start(&mut self, ctx: &mut Context) -> Option<Event> {
        if self.mode == Mode::Breathe || !self.ticker.start() {
            return None;
        }
        self.auto_start.cancel();
        self.running = true;
        self.paused = false;
        if self.session_type == SessionType::Focus && ctx.stats.sessions == 0 {
            ctx.stats.sessions = 1;
        }
        debug!(mode = %self.mode, session = %self.session_type, remaining = self.current_time, "timer started");
        Some(Event::TimerStarted {
            mode: self.mode,
            session_type: self.session_type,
            remaining_secs: self.current_time,
            at: Utc::now(),
        })
    }

    /// Stop ticking and mark paused. Safe to call repeatedly; only a
    /// running timer reports an event.
    pub fn pause(&mut self) -> Option<Event> {
        let was_running = self.running;
        self.halt();
        self.paused = true;
        self.auto_start.cancel();
        was_running.then(|| Event::TimerPaused {
            remaining_secs: self.current_time,
            at: Utc::now(),
        })
    }

    /// Stop and reload the interval for the current mode.
    pub fn reset(&mut self, ctx: &Context) -> Event {
        self.halt();
        self.auto_start.cancel();
        if self.mode == Mode::Pomodoro {
            self.session_type = SessionType::Focus;
        }
        self.load_mode_defaults(ctx);
        Event::TimerReset {
            mode: self.mode,
            at: Utc::now(),
        }
    }

    /// Call once per tick-handle fire.
    pub fn tick(&mut self, ctx: &mut Context) -> Vec<Event> {
        if !self.running {
            return Vec::new();
        }
        let focusing = self.session_type == SessionType::Focus;
        if self.mode == Mode::Stopwatch {
            self.current_time = self.current_time.saturating_add(1);
            if focusing {
                ctx.stats.focus_time += 1;
            }
            return Vec::new();
        }
        self.current_time = self.current_time.saturating_sub(1);
        if focusing {
            ctx.stats.focus_time += 1;
        }
        if self.current_time == 0 {
            return self.complete(ctx);
        }
        Vec::new()
    }

    /// Force completion (pomodoro) or finish the active task (countdown).
    /// Stopwatch and breathe modes ignore skips.
    pub fn skip(&mut self, ctx: &mut Context) -> Vec<Event> {
        let skipped = Event::TimerSkipped {
            mode: self.mode,
            at: Utc::now(),
        };
        match self.mode {
            Mode::Pomodoro => {
                let mut events = vec![skipped];
                events.extend(self.complete(ctx));
                events
            }
            Mode::Countdown => {
                let mut events = vec![skipped];
                self.finish_task_and_advance(ctx, &mut events);
                events
            }
            Mode::Stopwatch | Mode::Breathe => Vec::new(),
        }
    }

    /// Jump straight into a break and start it.
    pub fn start_break(&mut self, kind: SessionType, ctx: &mut Context) -> Vec<Event> {
        if self.mode == Mode::Breathe || !kind.is_break() {
            return Vec::new();
        }
        self.pause();
        self.session_type = kind;
        self.current_time = match kind {
            SessionType::LongBreak => ctx.settings.long_break_secs(),
            _ => ctx.settings.short_break_secs(),
        };
        self.total_time = self.current_time;
        let mut events = vec![Event::BreakStarted {
            session_type: kind,
            at: Utc::now(),
        }];
        events.extend(self.start(ctx));
        events
    }

    /// Stop, switch mode, and load the new mode's interval.
    pub fn switch_mode(&mut self, mode: Mode, ctx: &Context) -> Event {
        let from = self.mode;
        self.halt();
        self.auto_start.cancel();
        self.mode = mode;
        self.session_type = SessionType::Focus;
        match mode {
            // The timer is hidden while breathing; its clock is left as is.
            Mode::Breathe => {}
            Mode::Pomodoro => {
                self.completed_cycles = 0;
                self.load_mode_defaults(ctx);
            }
            Mode::Countdown | Mode::Stopwatch => self.load_mode_defaults(ctx),
        }
        debug!(%from, to = %mode, "mode switched");
        Event::ModeChanged {
            from,
            to: mode,
            at: Utc::now(),
        }
    }

    /// Pick up a newly active task's budget when idle in countdown mode.
    pub fn sync_to_active_task(&mut self, ctx: &Context) {
        if self.mode != Mode::Countdown || self.running {
            return;
        }
        if let Some(secs) = ctx.tasks.active().and_then(|t| t.duration_secs()) {
            self.current_time = secs;
            self.total_time = secs;
        }
    }

    /// Pick up a changed focus duration when idle in a pomodoro focus interval.
    pub fn sync_to_settings(&mut self, settings: &Settings) {
        if !self.running && self.mode == Mode::Pomodoro && self.session_type == SessionType::Focus {
            self.current_time = settings.focus_secs();
            self.total_time = self.current_time;
        }
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn halt(&mut self) {
        self.running = false;
        self.paused = false;
        self.ticker.stop();
    }

    fn load_mode_defaults(&mut self, ctx: &Context) {
        let secs = match self.mode {
            Mode::Pomodoro => ctx.settings.focus_secs(),
            Mode::Countdown => ctx
                .tasks
                .active()
                .and_then(|t| t.duration_secs())
                .unwrap_or(DEFAULT_COUNTDOWN_SECS),
            Mode::Stopwatch | Mode::Breathe => 0,
        };
        self.current_time = secs;
        self.total_time = secs;
    }

    fn complete(&mut self, ctx: &mut Context) -> Vec<Event> {
        self.halt();
        self.auto_start.cancel();
        let mut events = Vec::new();
        if ctx.settings.sound_enabled {
            events.push(Event::Chime { at: Utc::now() });
        }
        match self.mode {
            Mode::Pomodoro => self.complete_pomodoro(ctx, &mut events),
            Mode::Countdown => {
                events.push(Event::SessionCompleted {
                    mode: Mode::Countdown,
                    session_type: self.session_type,
                    next: self.session_type,
                    completed_cycles: self.completed_cycles,
                    at: Utc::now(),
                });
                self.finish_task_and_advance(ctx, &mut events);
            }
            Mode::Stopwatch | Mode::Breathe => {}
        }
        events
    }

    fn complete_pomodoro(&mut self, ctx: &mut Context, events: &mut Vec<Event>) {
        let finished = self.session_type;
        let auto_start;
        if finished == SessionType::Focus {
            ctx.stats.pomodoros += 1;
            self.completed_cycles += 1;
            self.credit_active_task(ctx, events);
            if self.completed_cycles >= ctx.settings.cycles_before_long_break {
                self.session_type = SessionType::LongBreak;
                self.current_time = ctx.settings.long_break_secs();
                self.completed_cycles = 0;
            } else {
                self.session_type = SessionType::ShortBreak;
                self.current_time = ctx.settings.short_break_secs();
            }
            auto_start = ctx.settings.auto_start_breaks;
        } else {
            self.session_type = SessionType::Focus;
            self.current_time = ctx.settings.focus_secs();
            // Counted on every break -> focus transition, in addition to the
            // first start of the day.
            ctx.stats.sessions += 1;
            auto_start = ctx.settings.auto_start_focus;
        }
        self.total_time = self.current_time;
        if auto_start {
            self.auto_start.arm(AUTO_START_DELAY);
        }
        debug!(%finished, next = %self.session_type, cycles = self.completed_cycles, "pomodoro interval completed");
        events.push(Event::SessionCompleted {
            mode: Mode::Pomodoro,
            session_type: finished,
            next: self.session_type,
            completed_cycles: self.completed_cycles,
            at: Utc::now(),
        });
    }

    /// Credit the active task with one focus interval, completing it once
    /// its budget is met.
    fn credit_active_task(&mut self, ctx: &mut Context, events: &mut Vec<Event>) {
        let focus_minutes = ctx.settings.focus_duration;
        let Some(task) = ctx.tasks.active_mut() else {
            return;
        };
        if task.completed {
            return;
        }
        task.time_spent = task.time_spent.saturating_add(focus_minutes);
        if task.budget_met() {
            if let Some(id) = ctx.tasks.complete_active() {
                ctx.stats.tasks_completed += 1;
                events.push(Event::TaskCompleted { id, at: Utc::now() });
            }
        }
    }

    fn finish_task_and_advance(&mut self, ctx: &mut Context, events: &mut Vec<Event>) {
        if let Some(id) = ctx.tasks.complete_active() {
            ctx.stats.tasks_completed += 1;
            events.push(Event::TaskCompleted { id, at: Utc::now() });
        }
        let next_id = ctx.tasks.advance().map(|t| t.id.clone());
        match next_id.zip(ctx.tasks.active_index()) {
            Some((id, index)) => events.push(Event::TaskActivated {
                id,
                index,
                at: Utc::now(),
            }),
            None => events.push(Event::TaskQueueExhausted { at: Utc::now() }),
        }
        if self.mode == Mode::Countdown {
            self.load_mode_defaults(ctx);
        }
    }
}
