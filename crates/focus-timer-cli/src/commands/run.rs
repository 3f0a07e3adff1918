//! Interactive timer loop.
//!
//! Waits on the app's scheduled handles, on stdin and on Ctrl-C at the same
//! time. Each stdin line is parsed as a [`ReplCommand`]; every state change
//! redraws a single status line.

use std::future::Future;
use std::io::Write;

use clap::{Parser, Subcommand};
use focus_timer_core::snapshot::session_label;
use focus_timer_core::storage::KvStore;
use focus_timer_core::{
    App, BreathingPattern, Config, Event, Mode, ResumeChoice, SessionType, SettingKey, Snapshot,
    TimerStatus,
};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines};
use tracing::{debug, info};

use super::task::describe;
use super::{find_task, open_app, CliResult};

#[derive(Parser)]
#[command(name = "focus-timer", no_binary_name = true, disable_version_flag = true)]
struct ReplLine {
    #[command(subcommand)]
    command: ReplCommand,
}

#[derive(Subcommand, Debug, PartialEq)]
enum ReplCommand {
    /// Start the timer
    Start,
    /// Pause the timer
    Pause,
    /// Start or pause; drives the breathing exercise in breathe mode
    #[command(alias = "t")]
    Toggle,
    /// Reset the timer (or the breathing exercise in breathe mode)
    Reset,
    /// Skip the current interval or task
    Skip,
    /// Switch mode: pomodoro, countdown, stopwatch or breathe
    Mode { mode: Mode },
    /// Start a short or long break now
    Break { kind: SessionType },
    /// Add a task
    Add {
        #[arg(required = true, num_args = 1..)]
        name: Vec<String>,
        /// Time budget in minutes
        #[arg(long, short)]
        minutes: Option<u32>,
    },
    /// Delete a task by position or id
    Delete { task: String },
    /// Make a task active
    Activate { task: String },
    /// Move a task (1-based positions)
    Move { from: usize, to: usize },
    /// Remove completed tasks
    Clear,
    /// List tasks
    Tasks,
    /// Change a setting
    Set { key: SettingKey, value: String },
    /// Breathing exercise controls
    Breathe {
        #[command(subcommand)]
        action: BreatheAction,
    },
    /// Keep the restored session
    Resume,
    /// Discard the restored session
    Discard,
    /// Show today's statistics
    Stats,
    /// Leave the loop
    #[command(visible_aliases = ["quit", "q"])]
    Exit,
}

#[derive(Subcommand, Debug, PartialEq)]
enum BreatheAction {
    Start,
    Stop,
    Reset,
    /// relaxing, box or energizing
    Pattern { pattern: BreathingPattern },
}

enum Flow {
    Continue,
    Exit,
}

pub fn run(config: &Config) -> CliResult {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(run_loop(config))
}

async fn run_loop(config: &Config) -> CliResult {
    let mut app = open_app(config)?;
    let bell = config.terminal_bell;
    app.subscribe(move |events, snapshot| render(events, snapshot, bell));

    println!("Type 'help' for commands.");
    if app.resume_pending() {
        println!("A session was running recently. Type 'resume' or 'discard'.");
    }
    render(&[], &app.snapshot(), false);

    let lines = BufReader::new(tokio::io::stdin()).lines();
    drive(&mut app, lines, shutdown_signal()).await?;
    println!();
    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("interrupted");
}

/// Run commands until input ends, `exit` is typed or `shutdown` resolves,
/// then flush the app's state.
async fn drive<S, R>(
    app: &mut App<S>,
    mut lines: Lines<R>,
    shutdown: impl Future<Output = ()>,
) -> CliResult
where
    S: KvStore,
    R: AsyncBufRead + Unpin,
{
    tokio::pin!(shutdown);
    let result: CliResult = loop {
        tokio::select! {
            wakeup = app.next_wakeup() => app.handle(wakeup),
            line = lines.next_line() => {
                let line = match line {
                    Ok(Some(line)) => line,
                    Ok(None) => break Ok(()),
                    Err(e) => break Err(e.into()),
                };
                if let Flow::Exit = dispatch(app, &line) {
                    break Ok(());
                }
            }
            () = &mut shutdown => break Ok(()),
        }
    };

    app.shutdown();
    debug!("interactive loop finished");
    result
}

fn dispatch<S: KvStore>(app: &mut App<S>, line: &str) -> Flow {
    if line.trim().is_empty() {
        return Flow::Continue;
    }
    let command = match ReplLine::try_parse_from(line.split_whitespace()) {
        Ok(parsed) => parsed.command,
        Err(e) => {
            println!();
            let _ = e.print();
            return Flow::Continue;
        }
    };

    match command {
        ReplCommand::Start => app.start(),
        ReplCommand::Pause => app.pause(),
        ReplCommand::Toggle => app.toggle(),
        ReplCommand::Reset => app.reset(),
        ReplCommand::Skip => app.skip(),
        ReplCommand::Mode { mode } => app.switch_mode(mode),
        ReplCommand::Break { kind } => app.start_break(kind),
        ReplCommand::Add { name, minutes } => app.add_task(&name.join(" "), minutes),
        ReplCommand::Delete { task } => {
            if let Some(id) = lookup(app, &task) {
                app.delete_task(&id);
            }
        }
        ReplCommand::Activate { task } => {
            if let Some(id) = lookup(app, &task) {
                app.set_active_task(&id);
            }
        }
        ReplCommand::Move { from, to } => {
            app.reorder_task(from.saturating_sub(1), to.saturating_sub(1))
        }
        ReplCommand::Clear => app.clear_completed(),
        ReplCommand::Tasks => {
            println!();
            let snapshot = app.snapshot();
            for (i, task) in snapshot.tasks.iter().enumerate() {
                let marker = if snapshot.active_task_index == Some(i) { ">" } else { " " };
                println!("{marker} {}. {}", i + 1, describe(task));
            }
        }
        ReplCommand::Set { key, value } => app.change_setting(key, &value),
        ReplCommand::Breathe { action } => match action {
            BreatheAction::Start => app.start_breathing(),
            BreatheAction::Stop => app.stop_breathing(),
            BreatheAction::Reset => app.reset_breathing(),
            BreatheAction::Pattern { pattern } => app.set_breathing_pattern(pattern),
        },
        ReplCommand::Resume => app.resolve_resume(ResumeChoice::Resume),
        ReplCommand::Discard => app.resolve_resume(ResumeChoice::Discard),
        ReplCommand::Stats => {
            let stats = &app.context().stats;
            println!(
                "\nfocus {}  pomodoros {}  tasks {}  sessions {}",
                focus_timer_core::format_stat_time(stats.focus_time),
                stats.pomodoros,
                stats.tasks_completed,
                stats.sessions
            );
        }
        ReplCommand::Exit => return Flow::Exit,
    }
    Flow::Continue
}

fn lookup<S: KvStore>(app: &App<S>, selector: &str) -> Option<String> {
    let found = find_task(app.context().tasks.tasks(), selector).map(|t| t.id.clone());
    if found.is_none() {
        println!("\nno task matches '{selector}'");
    }
    found
}

fn render(events: &[Event], snapshot: &Snapshot, bell: bool) {
    let mut out = std::io::stdout().lock();
    for event in events {
        if bell && matches!(event, Event::Chime { .. }) {
            let _ = write!(out, "\x07");
        }
        if let Some(message) = announce(event) {
            let _ = writeln!(out, "\r\x1b[2K{message}");
        }
    }
    let _ = write!(out, "\r\x1b[2K{}", status_line(snapshot));
    let _ = out.flush();
}

/// One-line message for events worth keeping in the scrollback.
fn announce(event: &Event) -> Option<String> {
    match event {
        Event::SessionCompleted {
            mode: Mode::Pomodoro,
            session_type,
            next,
            ..
        } => Some(format!(
            "{} finished, next up: {}",
            session_label(Mode::Pomodoro, *session_type),
            session_label(Mode::Pomodoro, *next)
        )),
        Event::SessionCompleted { .. } => Some("Countdown finished".into()),
        Event::TaskCompleted { .. } => Some("Task completed".into()),
        Event::TaskQueueExhausted { .. } => Some("No tasks left".into()),
        Event::BreathingCompleted { cycles, .. } => {
            Some(format!("Breathing exercise complete ({cycles} cycles)"))
        }
        Event::ModeChanged { to, .. } => Some(format!("Mode: {to}")),
        Event::SessionResumed { .. } => Some("Session restored".into()),
        Event::SessionDiscarded { .. } => Some("Saved session discarded".into()),
        Event::StatsReset { .. } => Some("Statistics reset".into()),
        _ => None,
    }
}

fn status_line(snapshot: &Snapshot) -> String {
    if snapshot.mode == Mode::Breathe {
        let b = &snapshot.breathing;
        let state = if b.running { "running" } else { "stopped" };
        return format!(
            "{} {}  cycle {}/{}  [{}] {}",
            snapshot.label, snapshot.clock, b.current_cycle, b.total_cycles, b.pattern, state
        );
    }
    let status = match snapshot.status {
        TimerStatus::Running => "running",
        TimerStatus::Paused => "paused",
        TimerStatus::Idle => "idle",
    };
    let mut line = format!("{} {}  ({status})", snapshot.label, snapshot.clock);
    if snapshot.mode == Mode::Pomodoro {
        line.push_str(&format!(
            "  cycle {}/{}",
            snapshot.completed_cycles, snapshot.settings.cycles_before_long_break
        ));
    }
    if let Some(task) = &snapshot.active_task {
        line.push_str(&format!("  > {}", task.name));
        if let Some(secs) = snapshot.task_remaining_secs {
            line.push_str(&format!(" ({} left)", focus_timer_core::format_clock(secs)));
        }
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Local, Utc};
    use focus_timer_core::storage::records;
    use focus_timer_core::MemoryStore;
    use std::time::Duration;

    fn parse(line: &str) -> ReplCommand {
        ReplLine::try_parse_from(line.split_whitespace())
            .unwrap()
            .command
    }

    fn app() -> App<MemoryStore> {
        App::open_at(
            MemoryStore::new(),
            Utc::now(),
            Local::now().date_naive(),
            chrono::Duration::minutes(60),
        )
    }

    #[test]
    fn parses_multi_word_task_with_budget() {
        assert_eq!(
            parse("add Write the report -m 30"),
            ReplCommand::Add {
                name: vec!["Write".into(), "the".into(), "report".into()],
                minutes: Some(30),
            }
        );
    }

    #[test]
    fn parses_typed_arguments() {
        assert_eq!(parse("mode breathe"), ReplCommand::Mode { mode: Mode::Breathe });
        assert_eq!(
            parse("break long"),
            ReplCommand::Break {
                kind: SessionType::LongBreak
            }
        );
        assert_eq!(
            parse("set focusDuration 50"),
            ReplCommand::Set {
                key: SettingKey::FocusDuration,
                value: "50".into()
            }
        );
        assert_eq!(
            parse("breathe pattern box"),
            ReplCommand::Breathe {
                action: BreatheAction::Pattern {
                    pattern: BreathingPattern::Box
                }
            }
        );
        assert_eq!(parse("q"), ReplCommand::Exit);
    }

    #[test]
    fn rejects_unknown_mode() {
        assert!(ReplLine::try_parse_from(["mode", "marathon"]).is_err());
    }

    #[test]
    fn dispatch_drives_app() {
        let mut app = app();
        assert!(matches!(dispatch(&mut app, "add Inbox zero"), Flow::Continue));
        assert!(matches!(dispatch(&mut app, "add Review -m 15"), Flow::Continue));
        dispatch(&mut app, "activate 2");
        assert_eq!(app.context().tasks.active_index(), Some(1));
        dispatch(&mut app, "move 2 1");
        assert_eq!(app.context().tasks.active_index(), Some(0));
        dispatch(&mut app, "start");
        assert!(app.timer().is_running());
        dispatch(&mut app, "not-a-command");
        assert!(app.timer().is_running());
        assert!(matches!(dispatch(&mut app, "exit"), Flow::Exit));
    }

    #[tokio::test(start_paused = true)]
    async fn interrupt_flushes_running_session() {
        let mut app = app();
        app.start();
        // Keep the writer alive so input never reaches end of file.
        let (reader, _writer) = tokio::io::duplex(64);
        let lines = BufReader::new(reader).lines();

        drive(&mut app, lines, tokio::time::sleep(Duration::from_millis(30_500)))
            .await
            .unwrap();

        let today = Local::now().date_naive();
        assert_eq!(records::load_stats(app.store(), today).focus_time, 30);
        let saved = records::load_session(app.store()).unwrap();
        assert_eq!(saved.current_time, 25 * 60 - 30);
    }

    #[tokio::test]
    async fn drive_stops_at_end_of_input() {
        let mut app = app();
        let lines = BufReader::new(&b"add Inbox zero\nstart\n"[..]).lines();
        drive(&mut app, lines, std::future::pending()).await.unwrap();
        assert_eq!(app.context().tasks.len(), 1);
        assert!(records::load_session(app.store()).unwrap().is_running);
    }

    #[test]
    fn status_line_shows_task_budget() {
        let mut app = app();
        app.add_task("Review", Some(30));
        let line = status_line(&app.snapshot());
        assert!(line.starts_with("Focus Time 25:00  (idle)"));
        assert!(line.contains("> Review (30:00 left)"));
    }
}
