//! Persisted session and statistics records.
//!
//! Both records are JSON strings under fixed keys. Reads never fail: a
//! missing, unreadable or unparsable record is treated as absent, and a
//! statistics record from another day reads as zeroed counters.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::KvStore;
use crate::error::StorageError;
use crate::settings::Settings;
use crate::stats::DailyStats;
use crate::task::Task;
use crate::timer::{Mode, SessionType};

pub const SESSION_KEY: &str = "focus_timer.session";
pub const STATS_KEY: &str = "focus_timer.stats";
/// How recent a running session must be to offer a resume.
pub const DEFAULT_RESUME_WINDOW_MINS: i64 = 60;

/// Everything needed to rebuild the timer and task list after a restart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedSession {
    #[serde(default)]
    pub mode: Mode,
    #[serde(default)]
    pub current_time: u32,
    #[serde(default)]
    pub total_time: u32,
    #[serde(default)]
    pub session_type: SessionType,
    #[serde(default)]
    pub completed_cycles: u32,
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub active_task_index: Option<usize>,
    #[serde(default)]
    pub settings: Settings,
    #[serde(default)]
    pub is_running: bool,
    /// Missing timestamps read as the epoch, i.e. never recent.
    #[serde(default)]
    pub saved_at: DateTime<Utc>,
}

/// How a saved session should be brought back.
#[derive(Debug, Clone, PartialEq)]
pub enum Restore {
    /// Nothing saved.
    Fresh,
    /// Restore tasks and settings only, without asking.
    Silent(SavedSession),
    /// The session was running recently: restore it fully and ask the user
    /// whether to keep or discard it.
    Prompt(SavedSession),
}

impl Restore {
    pub fn classify(saved: Option<SavedSession>, now: DateTime<Utc>, window: Duration) -> Self {
        match saved {
            None => Restore::Fresh,
            Some(s) if s.is_running && now.signed_duration_since(s.saved_at) < window => {
                Restore::Prompt(s)
            }
            Some(s) => Restore::Silent(s),
        }
    }
}

pub fn load_session<S: KvStore + ?Sized>(store: &S) -> Option<SavedSession> {
    let raw = match store.get(SESSION_KEY) {
        Ok(raw) => raw?,
        Err(e) => {
            warn!(error = %e, "failed to read saved session");
            return None;
        }
    };
    match serde_json::from_str(&raw) {
        Ok(saved) => Some(saved),
        Err(e) => {
            warn!(error = %e, "discarding unreadable saved session");
            None
        }
    }
}

pub fn save_session<S: KvStore + ?Sized>(store: &S, saved: &SavedSession) -> Result<(), StorageError> {
    let json = serde_json::to_string(saved).map_err(|source| StorageError::Encode {
        key: SESSION_KEY.to_string(),
        source,
    })?;
    store.set(SESSION_KEY, &json)
}

pub fn clear_session<S: KvStore + ?Sized>(store: &S) -> Result<(), StorageError> {
    store.delete(SESSION_KEY)
}

/// Today's statistics, or zeroed counters if the stored record is missing,
/// unreadable or from another day.
pub fn load_stats<S: KvStore + ?Sized>(store: &S, today: NaiveDate) -> DailyStats {
    let stored = match store.get(STATS_KEY) {
        Ok(raw) => raw.and_then(|raw| match serde_json::from_str::<DailyStats>(&raw) {
            Ok(stats) => Some(stats),
            Err(e) => {
                warn!(error = %e, "discarding unreadable statistics");
                None
            }
        }),
        Err(e) => {
            warn!(error = %e, "failed to read statistics");
            None
        }
    };
    stored
        .filter(|s| s.date == today)
        .unwrap_or_else(|| DailyStats::new(today))
}

pub fn save_stats<S: KvStore + ?Sized>(store: &S, stats: &DailyStats) -> Result<(), StorageError> {
    let json = serde_json::to_string(stats).map_err(|source| StorageError::Encode {
        key: STATS_KEY.to_string(),
        source,
    })?;
    store.set(STATS_KEY, &json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn saved(is_running: bool, saved_at: DateTime<Utc>) -> SavedSession {
        SavedSession {
            mode: Mode::Pomodoro,
            current_time: 600,
            total_time: 1500,
            session_type: SessionType::Focus,
            completed_cycles: 2,
            tasks: Vec::new(),
            active_task_index: None,
            settings: Settings::default(),
            is_running,
            saved_at,
        }
    }

    fn window() -> Duration {
        Duration::minutes(DEFAULT_RESUME_WINDOW_MINS)
    }

    #[test]
    fn recent_running_session_prompts() {
        let now = Utc::now();
        let restore = Restore::classify(Some(saved(true, now - Duration::minutes(30))), now, window());
        assert!(matches!(restore, Restore::Prompt(_)));
    }

    #[test]
    fn stale_running_session_restores_silently() {
        let now = Utc::now();
        let restore = Restore::classify(Some(saved(true, now - Duration::hours(2))), now, window());
        assert!(matches!(restore, Restore::Silent(_)));
    }

    #[test]
    fn idle_session_restores_silently() {
        let now = Utc::now();
        let restore = Restore::classify(Some(saved(false, now)), now, window());
        assert!(matches!(restore, Restore::Silent(_)));
        assert_eq!(Restore::classify(None, now, window()), Restore::Fresh);
    }

    #[test]
    fn session_round_trips_through_store() {
        let store = MemoryStore::new();
        let record = saved(true, Utc::now());
        save_session(&store, &record).unwrap();
        assert_eq!(load_session(&store), Some(record));
        clear_session(&store).unwrap();
        assert_eq!(load_session(&store), None);
    }

    #[test]
    fn corrupt_session_reads_as_absent() {
        let store = MemoryStore::new();
        store.set(SESSION_KEY, "{not json").unwrap();
        assert_eq!(load_session(&store), None);
    }

    #[test]
    fn sparse_session_fills_defaults() {
        let store = MemoryStore::new();
        store
            .set(SESSION_KEY, r#"{"mode":"stopwatch","tasks":[]}"#)
            .unwrap();
        let record = load_session(&store).unwrap();
        assert_eq!(record.mode, Mode::Stopwatch);
        assert_eq!(record.settings, Settings::default());
        assert!(!record.is_running);
    }

    #[test]
    fn yesterdays_stats_read_as_zero() {
        let store = MemoryStore::new();
        let today = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        let mut stats = DailyStats::new(today.pred_opt().unwrap());
        stats.pomodoros = 8;
        stats.focus_time = 12_000;
        save_stats(&store, &stats).unwrap();
        let loaded = load_stats(&store, today);
        assert!(loaded.is_zero());
        assert_eq!(loaded.date, today);
    }

    #[test]
    fn todays_stats_are_kept() {
        let store = MemoryStore::new();
        let today = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        let mut stats = DailyStats::new(today);
        stats.sessions = 3;
        save_stats(&store, &stats).unwrap();
        assert_eq!(load_stats(&store, today).sessions, 3);
    }

    #[test]
    fn corrupt_stats_read_as_zero() {
        let store = MemoryStore::new();
        store.set(STATS_KEY, "[]").unwrap();
        let today = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        assert!(load_stats(&store, today).is_zero());
    }
}
