//! Guided breathing exercise.
//!
//! A phase-cycling counterpart to the timer engine:
//! inhale -> hold-in -> exhale -> hold-out, repeated for the pattern's cycle
//! count. Phases with a zero duration are skipped. Like the timer, the engine
//! owns its tick handle and is advanced by `tick()`.

mod pattern;

pub use pattern::{BreathPhase, BreathingPattern, PatternSpec};

use chrono::Utc;
use std::time::Duration;
use tracing::debug;

use crate::events::Event;
use crate::timer::{Ticker, Timeout, TICK_PERIOD};

/// How long the "complete" message stays up before the display resets.
pub const COMPLETE_DISPLAY: Duration = Duration::from_secs(3);

#[derive(Debug, Clone)]
pub struct BreathingEngine {
    pattern: BreathingPattern,
    phase: BreathPhase,
    /// Seconds left in the current phase.
    phase_time: u32,
    current_cycle: u32,
    total_cycles: u32,
    running: bool,
    ticker: Ticker,
    complete_display: Timeout,
}

impl Default for BreathingEngine {
    fn default() -> Self {
        Self::new(BreathingPattern::default())
    }
}

impl BreathingEngine {
    pub fn new(pattern: BreathingPattern) -> Self {
        let spec = pattern.spec();
        Self {
            pattern,
            phase: BreathPhase::Idle,
            phase_time: spec.inhale,
            current_cycle: 0,
            total_cycles: spec.cycles,
            running: false,
            ticker: Ticker::every(TICK_PERIOD),
            complete_display: Timeout::default(),
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn pattern(&self) -> BreathingPattern {
        self.pattern
    }

    pub fn phase(&self) -> BreathPhase {
        self.phase
    }

    pub fn phase_time(&self) -> u32 {
        self.phase_time
    }

    pub fn current_cycle(&self) -> u32 {
        self.current_cycle
    }

    pub fn total_cycles(&self) -> u32 {
        self.total_cycles
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// True while the post-exercise "complete" message is showing.
    pub fn showing_complete(&self) -> bool {
        self.complete_display.is_armed()
    }

    pub(crate) fn handles_mut(&mut self) -> (&mut Ticker, &mut Timeout) {
        (&mut self.ticker, &mut self.complete_display)
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Begin at cycle 1 when idle, otherwise resume the current phase.
    pub fn start(&mut self, sound_enabled: bool) -> Vec<Event> {
        if !self.ticker.start() {
            return Vec::new();
        }
        self.running = true;
        self.complete_display.cancel();
        let mut events = Vec::new();
        if self.phase == BreathPhase::Idle {
            self.current_cycle = 1;
            events.push(self.started_event());
            self.begin_phase(BreathPhase::Inhale, sound_enabled, &mut events);
        } else {
            events.push(self.started_event());
        }
        debug!(pattern = %self.pattern, cycle = self.current_cycle, "breathing started");
        events
    }

    /// Halt ticking, keeping the phase and cycle position.
    pub fn stop(&mut self) -> Option<Event> {
        let was_running = self.running;
        self.running = false;
        self.ticker.stop();
        was_running.then(|| Event::BreathingStopped { at: Utc::now() })
    }

    pub fn reset(&mut self) -> Event {
        self.stop();
        self.complete_display.cancel();
        let spec = self.pattern.spec();
        self.phase = BreathPhase::Idle;
        self.phase_time = spec.inhale;
        self.current_cycle = 0;
        self.total_cycles = spec.cycles;
        Event::BreathingReset {
            pattern: self.pattern,
            at: Utc::now(),
        }
    }

    pub fn set_pattern(&mut self, pattern: BreathingPattern) -> Vec<Event> {
        let mut events: Vec<Event> = self.stop().into_iter().collect();
        self.pattern = pattern;
        events.push(Event::BreathingPatternChanged {
            pattern,
            at: Utc::now(),
        });
        events.push(self.reset());
        events
    }

    /// Call once per tick-handle fire.
    pub fn tick(&mut self, sound_enabled: bool) -> Vec<Event> {
        if !self.running {
            return Vec::new();
        }
        let mut events = Vec::new();
        self.phase_time = self.phase_time.saturating_sub(1);
        if self.phase_time == 0 {
            self.next_phase(sound_enabled, &mut events);
        }
        events
    }

    /// Clear the "complete" display back to a restart-ready idle state.
    pub fn clear_complete_display(&mut self) {
        self.complete_display.cancel();
        if self.phase == BreathPhase::Idle && !self.running {
            self.current_cycle = 0;
            self.phase_time = self.pattern.spec().inhale;
        }
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn started_event(&self) -> Event {
        Event::BreathingStarted {
            pattern: self.pattern,
            cycle: self.current_cycle,
            at: Utc::now(),
        }
    }

    fn begin_phase(&mut self, phase: BreathPhase, sound_enabled: bool, events: &mut Vec<Event>) {
        self.phase = phase;
        let secs = self.pattern.spec().duration(phase);
        if secs == 0 {
            self.next_phase(sound_enabled, events);
            return;
        }
        self.phase_time = secs;
        events.push(Event::BreathPhaseChanged {
            phase,
            cycle: self.current_cycle,
            secs,
            at: Utc::now(),
        });
    }

    fn next_phase(&mut self, sound_enabled: bool, events: &mut Vec<Event>) {
        match self.phase {
            BreathPhase::Inhale => self.begin_phase(BreathPhase::HoldIn, sound_enabled, events),
            BreathPhase::HoldIn => self.begin_phase(BreathPhase::Exhale, sound_enabled, events),
            BreathPhase::Exhale => self.begin_phase(BreathPhase::HoldOut, sound_enabled, events),
            BreathPhase::HoldOut => self.complete_cycle(sound_enabled, events),
            BreathPhase::Idle => {}
        }
    }

    fn complete_cycle(&mut self, sound_enabled: bool, events: &mut Vec<Event>) {
        if self.current_cycle >= self.total_cycles {
            self.finish(sound_enabled, events);
        } else {
            self.current_cycle += 1;
            self.begin_phase(BreathPhase::Inhale, sound_enabled, events);
        }
    }

    fn finish(&mut self, sound_enabled: bool, events: &mut Vec<Event>) {
        self.running = false;
        self.ticker.stop();
        self.phase = BreathPhase::Idle;
        self.phase_time = 0;
        self.complete_display.arm(COMPLETE_DISPLAY);
        debug!(pattern = %self.pattern, cycles = self.total_cycles, "breathing exercise complete");
        events.push(Event::BreathingCompleted {
            cycles: self.total_cycles,
            at: Utc::now(),
        });
        if sound_enabled {
            events.push(Event::Chime { at: Utc::now() });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ticks(engine: &mut BreathingEngine, n: u32) -> Vec<Event> {
        let mut events = Vec::new();
        for _ in 0..n {
            events.extend(engine.tick(false));
        }
        events
    }

    #[test]
    fn fresh_engine_is_idle() {
        let engine = BreathingEngine::default();
        assert_eq!(engine.pattern(), BreathingPattern::Relaxing);
        assert_eq!(engine.phase(), BreathPhase::Idle);
        assert_eq!(engine.current_cycle(), 0);
        assert_eq!(engine.total_cycles(), 4);
        assert_eq!(engine.phase_time(), 4);
    }

    #[test]
    fn start_begins_cycle_one_inhale() {
        let mut engine = BreathingEngine::new(BreathingPattern::Box);
        engine.start(false);
        assert!(engine.is_running());
        assert_eq!(engine.current_cycle(), 1);
        assert_eq!(engine.phase(), BreathPhase::Inhale);
        assert_eq!(engine.phase_time(), 4);
        assert!(engine.start(false).is_empty());
    }

    #[test]
    fn box_cycle_takes_sixteen_ticks() {
        let mut engine = BreathingEngine::new(BreathingPattern::Box);
        engine.start(false);
        ticks(&mut engine, 4);
        assert_eq!(engine.phase(), BreathPhase::HoldIn);
        ticks(&mut engine, 8);
        assert_eq!(engine.phase(), BreathPhase::HoldOut);
        ticks(&mut engine, 4);
        assert_eq!(engine.current_cycle(), 2);
        assert_eq!(engine.phase(), BreathPhase::Inhale);
        assert_eq!(engine.phase_time(), 4);
    }

    #[test]
    fn relaxing_skips_hold_out() {
        let mut engine = BreathingEngine::new(BreathingPattern::Relaxing);
        engine.start(false);
        let events = ticks(&mut engine, 4 + 7 + 8);
        assert_eq!(engine.current_cycle(), 2);
        assert_eq!(engine.phase(), BreathPhase::Inhale);
        assert!(!events
            .iter()
            .any(|e| matches!(e, Event::BreathPhaseChanged { phase: BreathPhase::HoldOut, .. })));
    }

    #[test]
    fn energizing_skips_both_holds() {
        let mut engine = BreathingEngine::new(BreathingPattern::Energizing);
        engine.start(false);
        ticks(&mut engine, 4);
        assert_eq!(engine.phase(), BreathPhase::Exhale);
        ticks(&mut engine, 4);
        assert_eq!(engine.current_cycle(), 2);
    }

    #[test]
    fn exercise_completes_after_last_cycle() {
        let mut engine = BreathingEngine::new(BreathingPattern::Energizing);
        engine.start(false);
        ticks(&mut engine, 8 * 5);
        assert_eq!(engine.current_cycle(), 6);
        let events = engine.tick(true);
        assert!(events.is_empty());
        let events = ticks(&mut engine, 7);
        assert!(events.iter().any(|e| matches!(e, Event::BreathingCompleted { cycles: 6, .. })));
        assert!(!engine.is_running());
        assert_eq!(engine.phase(), BreathPhase::Idle);
        assert_eq!(engine.current_cycle(), 6);
        assert!(engine.showing_complete());

        engine.clear_complete_display();
        assert_eq!(engine.current_cycle(), 0);
        assert!(!engine.showing_complete());
    }

    #[test]
    fn completion_chimes_when_enabled() {
        let mut engine = BreathingEngine::new(BreathingPattern::Energizing);
        engine.start(true);
        let mut events = Vec::new();
        while engine.is_running() {
            events.extend(engine.tick(true));
        }
        assert!(matches!(events.last(), Some(Event::Chime { .. })));
    }

    #[test]
    fn stop_preserves_position_and_start_resumes() {
        let mut engine = BreathingEngine::new(BreathingPattern::Box);
        engine.start(false);
        ticks(&mut engine, 6);
        assert!(engine.stop().is_some());
        assert!(engine.stop().is_none());
        assert_eq!(engine.phase(), BreathPhase::HoldIn);
        assert_eq!(engine.phase_time(), 2);
        ticks(&mut engine, 3);
        assert_eq!(engine.phase_time(), 2);
        engine.start(false);
        assert_eq!(engine.phase(), BreathPhase::HoldIn);
        assert_eq!(engine.current_cycle(), 1);
    }

    #[test]
    fn reset_returns_to_idle() {
        let mut engine = BreathingEngine::new(BreathingPattern::Box);
        engine.start(false);
        ticks(&mut engine, 20);
        engine.reset();
        assert!(!engine.is_running());
        assert_eq!(engine.phase(), BreathPhase::Idle);
        assert_eq!(engine.current_cycle(), 0);
        assert_eq!(engine.phase_time(), 4);
    }

    #[test]
    fn pattern_change_stops_and_resets() {
        let mut engine = BreathingEngine::new(BreathingPattern::Box);
        engine.start(false);
        ticks(&mut engine, 3);
        let events = engine.set_pattern(BreathingPattern::Energizing);
        assert!(!engine.is_running());
        assert_eq!(engine.pattern(), BreathingPattern::Energizing);
        assert_eq!(engine.total_cycles(), 6);
        assert_eq!(engine.current_cycle(), 0);
        assert_eq!(events.len(), 3);
    }
}
