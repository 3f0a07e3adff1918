//! Integration tests for restoring saved sessions on startup.

use chrono::{Duration, Local, NaiveDate, Utc};
use focus_timer_core::storage::records::{self, SavedSession, SESSION_KEY, STATS_KEY};
use focus_timer_core::storage::KvStore;
use focus_timer_core::{
    App, Database, MemoryStore, Mode, ResumeChoice, SessionType, Settings, TaskList, TimerStatus,
};

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn window() -> Duration {
    Duration::minutes(60)
}

fn saved_countdown(is_running: bool, age: Duration) -> SavedSession {
    let mut tasks = TaskList::new();
    tasks.add("Reading", Some(40));
    tasks.add("Notes", None);
    SavedSession {
        mode: Mode::Countdown,
        current_time: 1_000,
        total_time: 2_400,
        session_type: SessionType::Focus,
        completed_cycles: 0,
        tasks: tasks.tasks().to_vec(),
        active_task_index: Some(1),
        settings: Settings {
            focus_duration: 30,
            ..Settings::default()
        },
        is_running,
        saved_at: Utc::now() - age,
    }
}

fn store_with(saved: &SavedSession) -> MemoryStore {
    let store = MemoryStore::new();
    records::save_session(&store, saved).unwrap();
    store
}

#[test]
fn test_recent_running_session_prompts_with_full_state() {
    let store = store_with(&saved_countdown(true, Duration::minutes(20)));
    let app = App::open_at(store, Utc::now(), today(), window());

    let snap = app.snapshot();
    assert!(snap.resume_pending);
    assert_eq!(snap.mode, Mode::Countdown);
    assert_eq!(snap.current_time, 1_000);
    assert_eq!(snap.total_time, 2_400);
    assert_eq!(snap.active_task_index, Some(1));
    assert_eq!(snap.settings.focus_duration, 30);
    // Restored sessions come back stopped.
    assert_eq!(snap.status, TimerStatus::Idle);
}

#[test]
fn test_resume_keeps_restored_state() {
    let store = store_with(&saved_countdown(true, Duration::minutes(5)));
    let mut app = App::open_at(store, Utc::now(), today(), window());
    app.resolve_resume(ResumeChoice::Resume);
    assert!(!app.resume_pending());
    assert_eq!(app.timer().current_time(), 1_000);
    assert_eq!(app.timer().mode(), Mode::Countdown);
}

#[test]
fn test_discard_resets_timer_and_rewrites_record() {
    let store = store_with(&saved_countdown(true, Duration::minutes(5)));
    let mut app = App::open_at(store, Utc::now(), today(), window());
    app.resolve_resume(ResumeChoice::Discard);
    assert!(!app.resume_pending());
    // Countdown reset loads the active task's budget, or the 25 minute default.
    assert_eq!(app.timer().current_time(), 25 * 60);
    let record = records::load_session(app.store()).unwrap();
    assert!(!record.is_running);
    assert_eq!(record.current_time, 25 * 60);
}

#[test]
fn test_stale_session_restores_tasks_and_settings_only() {
    let store = store_with(&saved_countdown(true, Duration::hours(3)));
    let app = App::open_at(store, Utc::now(), today(), window());

    let snap = app.snapshot();
    assert!(!snap.resume_pending);
    assert_eq!(snap.mode, Mode::Pomodoro);
    assert_eq!(snap.tasks.len(), 2);
    assert_eq!(snap.active_task_index, Some(1));
    // Timer initialised from the restored focus duration.
    assert_eq!(snap.current_time, 30 * 60);
}

#[test]
fn test_idle_session_never_prompts() {
    let store = store_with(&saved_countdown(false, Duration::minutes(1)));
    let app = App::open_at(store, Utc::now(), today(), window());
    assert!(!app.resume_pending());
}

#[test]
fn test_resolve_without_prompt_is_ignored() {
    let mut app = App::open_at(MemoryStore::new(), Utc::now(), today(), window());
    app.start();
    app.resolve_resume(ResumeChoice::Discard);
    assert!(app.timer().is_running());
}

#[test]
fn test_out_of_range_active_index_is_dropped() {
    let mut saved = saved_countdown(false, Duration::minutes(1));
    saved.active_task_index = Some(9);
    let app = App::open_at(store_with(&saved), Utc::now(), today(), window());
    assert_eq!(app.context().tasks.active_index(), None);
}

#[test]
fn test_invalid_settings_fall_back_to_defaults() {
    let store = MemoryStore::new();
    store
        .set(
            SESSION_KEY,
            r#"{"settings":{"focus_duration":0,"cycles_before_long_break":0,"sound_enabled":true}}"#,
        )
        .unwrap();
    let app = App::open_at(store, Utc::now(), today(), window());
    let settings = app.context().settings;
    assert_eq!(settings.focus_duration, 25);
    assert_eq!(settings.cycles_before_long_break, 4);
    assert!(settings.sound_enabled);
}

#[test]
fn test_corrupt_records_start_fresh() {
    let store = MemoryStore::new();
    store.set(SESSION_KEY, "not json").unwrap();
    store.set(STATS_KEY, "{").unwrap();
    let app = App::open_at(store, Utc::now(), today(), window());
    assert!(app.context().tasks.is_empty());
    assert!(app.context().stats.is_zero());
}

#[test]
fn test_state_survives_restart_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("focus-timer.db");
    {
        let mut app = App::open_at(Database::open_at(&path).unwrap(), Utc::now(), today(), window());
        app.add_task("Persisted", Some(25));
        app.skip();
        app.shutdown();
    }
    let app = App::open_at(Database::open_at(&path).unwrap(), Utc::now(), today(), window());
    assert_eq!(app.context().tasks.len(), 1);
    assert_eq!(app.context().tasks.active().unwrap().time_spent, 25);
    assert_eq!(app.context().stats.pomodoros, 1);
}
