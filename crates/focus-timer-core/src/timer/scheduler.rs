//! Cancellable tick handles.
//!
//! A [`Ticker`] is the only scheduling primitive the engines use: one handle
//! per engine, started at most once, cleared on stop. Handles hold deadlines
//! rather than live timers, so creating and stopping them needs no runtime;
//! only awaiting them does. A stopped handle's future never resolves, which
//! lets the controller `select!` over every handle unconditionally.

use std::future;
use std::time::Duration;
use tokio::time::{sleep_until, Instant};

/// Repeating handle.
#[derive(Debug, Clone)]
pub struct Ticker {
    period: Duration,
    next: Option<Instant>,
}

impl Ticker {
    pub fn every(period: Duration) -> Self {
        Self { period, next: None }
    }

    pub fn is_active(&self) -> bool {
        self.next.is_some()
    }

    /// Begin ticking. Returns false if a handle already exists.
    pub fn start(&mut self) -> bool {
        if self.next.is_some() {
            return false;
        }
        self.next = Some(Instant::now() + self.period);
        true
    }

    pub fn stop(&mut self) {
        self.next = None;
    }

    /// Wait for the next tick. Pending forever while stopped.
    pub async fn tick(&mut self) {
        match self.next {
            Some(at) => {
                sleep_until(at).await;
                self.next = Some(at + self.period);
            }
            None => future::pending().await,
        }
    }
}

/// One-shot handle.
#[derive(Debug, Clone, Default)]
pub struct Timeout {
    deadline: Option<Instant>,
}

impl Timeout {
    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    /// Arm (or re-arm) to fire once after `delay`.
    pub fn arm(&mut self, delay: Duration) {
        self.deadline = Some(Instant::now() + delay);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    /// Wait for the deadline, disarming on fire. Pending forever while unarmed.
    pub async fn fired(&mut self) {
        match self.deadline {
            Some(at) => {
                sleep_until(at).await;
                self.deadline = None;
            }
            None => future::pending().await,
        }
    }
}
