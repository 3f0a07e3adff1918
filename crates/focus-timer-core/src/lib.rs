//! # Focus Timer Core Library
//!
//! Core logic for a single-user focus widget: a pomodoro/countdown/stopwatch
//! timer, a guided breathing exercise, a task list with time budgets, and
//! daily statistics. Presentation layers (the `focus-timer` CLI) drive an
//! [`App`] and render its [`Snapshot`].
//!
//! ## Architecture
//!
//! - **Timer Engine**: tick-driven state machine for the three timing modes,
//!   with pomodoro focus/break cycling and task time crediting
//! - **Breathing Engine**: independent phase-cycling machine for breathe mode
//! - **Scheduler**: cancellable tokio-backed tick and timeout handles, one set
//!   per engine
//! - **Storage**: string key-value store (SQLite or in-memory) holding the
//!   session and statistics records, plus TOML configuration
//!
//! ## Key Components
//!
//! - [`App`]: Command surface, persistence and subscriber notification
//! - [`TimerEngine`]: Core timer state machine
//! - [`BreathingEngine`]: Breathing exercise state machine
//! - [`TaskList`]: Ordered tasks with an active selection
//! - [`Database`]: Persistent key-value store
//! - [`Config`]: Application configuration management

pub mod app;
pub mod breathing;
pub mod context;
pub mod error;
pub mod events;
pub mod settings;
pub mod snapshot;
pub mod stats;
pub mod storage;
pub mod task;
pub mod timer;

pub use app::{App, ResumeChoice, Wakeup};
pub use breathing::{BreathPhase, BreathingEngine, BreathingPattern};
pub use context::Context;
pub use error::{ConfigError, CoreError, StorageError, ValidationError};
pub use events::Event;
pub use settings::{SettingKey, Settings};
pub use snapshot::{format_clock, format_minutes, format_stat_time, BreathingSnapshot, Snapshot};
pub use stats::DailyStats;
pub use storage::{Config, Database, KvStore, MemoryStore};
pub use task::{Task, TaskList};
pub use timer::{Mode, SessionType, TimerEngine, TimerStatus};
