//! Application controller.
//!
//! [`App`] owns the shared [`Context`], both engines and the store. Every
//! public command mutates state through an engine, persists the session
//! record, and notifies subscribers exactly once with the resulting events
//! and a fresh [`Snapshot`].
//!
//! Time is driven from outside: a caller loops on [`App::next_wakeup`] and
//! feeds the result back through [`App::handle`].
//!
//! ```ignore
//! let mut app = App::open(Database::open()?, config.resume_window());
//! app.subscribe(|events, snapshot| render(events, snapshot));
//! loop {
//!     let wakeup = app.next_wakeup().await;
//!     app.handle(wakeup);
//! }
//! ```

use chrono::{DateTime, Local, NaiveDate, Utc};
use tracing::{debug, info, warn};

use crate::breathing::{BreathingEngine, BreathingPattern};
use crate::context::Context;
use crate::events::Event;
use crate::settings::{SettingKey, Settings};
use crate::snapshot::Snapshot;
use crate::storage::records::{self, Restore, SavedSession};
use crate::storage::KvStore;
use crate::task::TaskList;
use crate::timer::{Mode, SessionType, TimerEngine};

/// Which scheduled handle fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wakeup {
    TimerTick,
    AutoStart,
    BreathTick,
    BreathDisplayElapsed,
}

/// Answer to the resume prompt raised by a recently running session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResumeChoice {
    /// Keep the restored state, stopped.
    Resume,
    /// Forget the saved record and reset the timer.
    Discard,
}

type Listener = Box<dyn FnMut(&[Event], &Snapshot)>;

pub struct App<S: KvStore> {
    ctx: Context,
    timer: TimerEngine,
    breathing: BreathingEngine,
    store: S,
    listeners: Vec<Listener>,
    resume_pending: bool,
}

impl<S: KvStore> App<S> {
    /// Load today's statistics and any saved session from `store`.
    pub fn open(store: S, resume_window: chrono::Duration) -> Self {
        Self::open_at(store, Utc::now(), today(), resume_window)
    }

    /// [`App::open`] with an explicit clock.
    pub fn open_at(
        store: S,
        now: DateTime<Utc>,
        today: NaiveDate,
        resume_window: chrono::Duration,
    ) -> Self {
        let mut ctx = Context::new(today);
        ctx.stats = records::load_stats(&store, today);

        let saved = records::load_session(&store);
        let mut resume_pending = false;
        let timer = match Restore::classify(saved, now, resume_window) {
            Restore::Fresh => TimerEngine::new(&ctx.settings),
            Restore::Silent(saved) => {
                debug!("restoring tasks and settings");
                ctx.settings = saved.settings.validated();
                ctx.tasks = TaskList::restore(saved.tasks, saved.active_task_index);
                TimerEngine::new(&ctx.settings)
            }
            Restore::Prompt(saved) => {
                info!(saved_at = %saved.saved_at, "recently running session found");
                resume_pending = true;
                ctx.settings = saved.settings.validated();
                ctx.tasks = TaskList::restore(saved.tasks, saved.active_task_index);
                TimerEngine::restore(
                    saved.mode,
                    saved.session_type,
                    saved.current_time,
                    saved.total_time,
                    saved.completed_cycles,
                    &ctx.settings,
                )
            }
        };

        Self {
            ctx,
            timer,
            breathing: BreathingEngine::default(),
            store,
            listeners: Vec::new(),
            resume_pending,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn snapshot(&self) -> Snapshot {
        Snapshot::capture(&self.timer, &self.breathing, &self.ctx, self.resume_pending)
    }

    pub fn context(&self) -> &Context {
        &self.ctx
    }

    pub fn timer(&self) -> &TimerEngine {
        &self.timer
    }

    pub fn breathing(&self) -> &BreathingEngine {
        &self.breathing
    }

    pub fn resume_pending(&self) -> bool {
        self.resume_pending
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Register a render callback. Called once per command or wakeup.
    pub fn subscribe<F>(&mut self, listener: F)
    where
        F: FnMut(&[Event], &Snapshot) + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    // ── Scheduling ───────────────────────────────────────────────────

    /// Wait for whichever handle fires first. Pending forever while
    /// nothing is scheduled.
    pub async fn next_wakeup(&mut self) -> Wakeup {
        let Self { timer, breathing, .. } = self;
        let (timer_tick, auto_start) = timer.handles_mut();
        let (breath_tick, breath_display) = breathing.handles_mut();
        tokio::select! {
            _ = timer_tick.tick() => Wakeup::TimerTick,
            _ = auto_start.fired() => Wakeup::AutoStart,
            _ = breath_tick.tick() => Wakeup::BreathTick,
            _ = breath_display.fired() => Wakeup::BreathDisplayElapsed,
        }
    }

    pub fn handle(&mut self, wakeup: Wakeup) {
        match wakeup {
            Wakeup::TimerTick => self.tick_timer(),
            Wakeup::AutoStart => self.start(),
            Wakeup::BreathTick => self.tick_breathing(),
            Wakeup::BreathDisplayElapsed => {
                self.breathing.clear_complete_display();
                self.notify(&[]);
            }
        }
    }

    /// One timer tick. Persists the session every tick and statistics on
    /// minute boundaries or when the tick completed an interval.
    pub fn tick_timer(&mut self) {
        self.roll_over_day();
        let events = self.timer.tick(&mut self.ctx);
        if self.timer.current_time() % 60 == 0 || !events.is_empty() {
            self.save_stats();
        }
        self.save_session();
        self.notify(&events);
    }

    pub fn tick_breathing(&mut self) {
        let events = self.breathing.tick(self.ctx.settings.sound_enabled);
        self.notify(&events);
    }

    // ── Timer commands ───────────────────────────────────────────────

    pub fn start(&mut self) {
        self.roll_over_day();
        let before = self.ctx.stats.clone();
        let events: Vec<Event> = self.timer.start(&mut self.ctx).into_iter().collect();
        self.finish_command(&before, events);
    }

    pub fn pause(&mut self) {
        let before = self.ctx.stats.clone();
        let events: Vec<Event> = self.timer.pause().into_iter().collect();
        self.finish_command(&before, events);
    }

    /// Start/pause shortcut. Drives the breathing exercise in breathe mode.
    pub fn toggle(&mut self) {
        match (self.timer.mode(), self.breathing.is_running(), self.timer.is_running()) {
            (Mode::Breathe, true, _) => self.stop_breathing(),
            (Mode::Breathe, false, _) => self.start_breathing(),
            (_, _, true) => self.pause(),
            (_, _, false) => self.start(),
        }
    }

    /// Reset the timer, or the breathing exercise in breathe mode.
    pub fn reset(&mut self) {
        if self.timer.mode() == Mode::Breathe {
            return self.reset_breathing();
        }
        let before = self.ctx.stats.clone();
        let events = vec![self.timer.reset(&self.ctx)];
        self.finish_command(&before, events);
    }

    pub fn skip(&mut self) {
        let before = self.ctx.stats.clone();
        let events = self.timer.skip(&mut self.ctx);
        self.finish_command(&before, events);
    }

    pub fn start_break(&mut self, kind: SessionType) {
        self.roll_over_day();
        let before = self.ctx.stats.clone();
        let events = self.timer.start_break(kind, &mut self.ctx);
        self.finish_command(&before, events);
    }

    /// Switch mode. Both engines stop; entering breathe mode resets the
    /// exercise.
    pub fn switch_mode(&mut self, mode: Mode) {
        let before = self.ctx.stats.clone();
        let mut events: Vec<Event> = self.breathing.stop().into_iter().collect();
        events.push(self.timer.switch_mode(mode, &self.ctx));
        if mode == Mode::Breathe {
            events.push(self.breathing.reset());
        }
        self.finish_command(&before, events);
    }

    // ── Task commands ────────────────────────────────────────────────

    pub fn add_task(&mut self, name: &str, duration: Option<u32>) {
        let before = self.ctx.stats.clone();
        let mut events = Vec::new();
        let had_active = self.ctx.tasks.active_index().is_some();
        if let Some(task) = self.ctx.tasks.add(name, duration) {
            events.push(Event::TaskAdded {
                id: task.id.clone(),
                name: task.name.clone(),
                at: Utc::now(),
            });
        }
        if !had_active {
            self.timer.sync_to_active_task(&self.ctx);
        }
        self.finish_command(&before, events);
    }

    pub fn delete_task(&mut self, id: &str) {
        let before = self.ctx.stats.clone();
        let events: Vec<Event> = self
            .ctx
            .tasks
            .delete(id)
            .map(|task| Event::TaskDeleted {
                id: task.id,
                at: Utc::now(),
            })
            .into_iter()
            .collect();
        self.finish_command(&before, events);
    }

    pub fn set_active_task(&mut self, id: &str) {
        let before = self.ctx.stats.clone();
        let mut events = Vec::new();
        if let Some(index) = self.ctx.tasks.set_active(id) {
            events.push(Event::TaskActivated {
                id: id.to_string(),
                index,
                at: Utc::now(),
            });
            self.timer.sync_to_active_task(&self.ctx);
        }
        self.finish_command(&before, events);
    }

    pub fn reorder_task(&mut self, from: usize, to: usize) {
        let before = self.ctx.stats.clone();
        let mut events = Vec::new();
        if self.ctx.tasks.reorder(from, to) {
            events.push(Event::TaskMoved {
                from,
                to,
                at: Utc::now(),
            });
        }
        self.finish_command(&before, events);
    }

    pub fn clear_completed(&mut self) {
        let before = self.ctx.stats.clone();
        let removed = self.ctx.tasks.clear_completed();
        let events = if removed > 0 {
            vec![Event::CompletedCleared {
                removed,
                at: Utc::now(),
            }]
        } else {
            Vec::new()
        };
        self.finish_command(&before, events);
    }

    // ── Settings and statistics ──────────────────────────────────────

    /// Update one setting from user input. Unparsable input stores the
    /// field default.
    pub fn change_setting(&mut self, key: SettingKey, value: &str) {
        let before = self.ctx.stats.clone();
        self.ctx.settings.apply(key, value);
        self.timer.sync_to_settings(&self.ctx.settings);
        let events = vec![Event::SettingChanged {
            key,
            value: self.ctx.settings.get(key),
            at: Utc::now(),
        }];
        self.finish_command(&before, events);
    }

    /// Restore every setting to its default.
    pub fn reset_settings(&mut self) {
        let before = self.ctx.stats.clone();
        let old = self.ctx.settings;
        self.ctx.settings = Settings::default();
        self.timer.sync_to_settings(&self.ctx.settings);
        let events = SettingKey::ALL
            .into_iter()
            .filter(|key| old.get(*key) != self.ctx.settings.get(*key))
            .map(|key| Event::SettingChanged {
                key,
                value: self.ctx.settings.get(key),
                at: Utc::now(),
            })
            .collect();
        self.finish_command(&before, events);
    }

    pub fn reset_statistics(&mut self) {
        self.ctx.stats.reset();
        self.save_stats();
        self.save_session();
        self.notify(&[Event::StatsReset { at: Utc::now() }]);
    }

    // ── Breathing commands ───────────────────────────────────────────

    /// Start the exercise. Ignored outside breathe mode, so the breathing
    /// machine and the timer never tick together.
    pub fn start_breathing(&mut self) {
        if self.timer.mode() != Mode::Breathe {
            self.notify(&[]);
            return;
        }
        let events = self.breathing.start(self.ctx.settings.sound_enabled);
        self.notify(&events);
    }

    pub fn stop_breathing(&mut self) {
        let events: Vec<Event> = self.breathing.stop().into_iter().collect();
        self.notify(&events);
    }

    pub fn reset_breathing(&mut self) {
        let event = self.breathing.reset();
        self.notify(&[event]);
    }

    pub fn set_breathing_pattern(&mut self, pattern: BreathingPattern) {
        let events = self.breathing.set_pattern(pattern);
        self.notify(&events);
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Answer a pending resume prompt. Ignored when none is pending.
    pub fn resolve_resume(&mut self, choice: ResumeChoice) {
        if !self.resume_pending {
            return self.notify(&[]);
        }
        self.resume_pending = false;
        let before = self.ctx.stats.clone();
        let events = match choice {
            ResumeChoice::Resume => vec![Event::SessionResumed { at: Utc::now() }],
            ResumeChoice::Discard => {
                if let Err(e) = records::clear_session(&self.store) {
                    warn!(error = %e, "failed to clear saved session");
                }
                vec![
                    Event::SessionDiscarded { at: Utc::now() },
                    self.timer.reset(&self.ctx),
                ]
            }
        };
        self.finish_command(&before, events);
    }

    /// Flush both records.
    pub fn shutdown(&mut self) {
        self.save_session();
        self.save_stats();
        debug!("state flushed");
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn finish_command(&mut self, stats_before: &crate::stats::DailyStats, events: Vec<Event>) {
        if &self.ctx.stats != stats_before {
            self.save_stats();
        }
        self.save_session();
        self.notify(&events);
    }

    fn notify(&mut self, events: &[Event]) {
        if self.listeners.is_empty() {
            return;
        }
        let snapshot = self.snapshot();
        for listener in &mut self.listeners {
            listener(events, &snapshot);
        }
    }

    fn roll_over_day(&mut self) {
        if self.ctx.stats.roll_over(today()) {
            info!(date = %self.ctx.stats.date, "new day, statistics cleared");
            self.save_stats();
        }
    }

    fn saved_session(&self) -> SavedSession {
        SavedSession {
            mode: self.timer.mode(),
            current_time: self.timer.current_time(),
            total_time: self.timer.total_time(),
            session_type: self.timer.session_type(),
            completed_cycles: self.timer.completed_cycles(),
            tasks: self.ctx.tasks.tasks().to_vec(),
            active_task_index: self.ctx.tasks.active_index(),
            settings: self.ctx.settings,
            is_running: self.timer.is_running(),
            saved_at: Utc::now(),
        }
    }

    fn save_session(&self) {
        if let Err(e) = records::save_session(&self.store, &self.saved_session()) {
            warn!(error = %e, "failed to save session");
        }
    }

    fn save_stats(&self) {
        if let Err(e) = records::save_stats(&self.store, &self.ctx.stats) {
            warn!(error = %e, "failed to save statistics");
        }
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}
