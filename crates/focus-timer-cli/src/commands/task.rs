use clap::Subcommand;
use focus_timer_core::{format_minutes, Config, Task};

use super::{find_task, open_app, CliResult};

#[derive(Subcommand)]
pub enum TaskAction {
    /// Add a task
    Add {
        /// Task name
        name: String,
        /// Time budget in minutes
        #[arg(long, short)]
        minutes: Option<u32>,
    },
    /// List tasks
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete a task by position or id
    Delete { task: String },
    /// Make a task active
    Activate { task: String },
    /// Move a task to another position (1-based)
    Move { from: usize, to: usize },
    /// Remove all completed tasks
    ClearCompleted,
}

pub fn run(action: TaskAction, config: &Config) -> CliResult {
    let mut app = open_app(config)?;

    match action {
        TaskAction::Add { name, minutes } => {
            let before = app.context().tasks.len();
            app.add_task(&name, minutes);
            match app.context().tasks.tasks().get(before) {
                Some(task) => println!("Task added: {}", task.id),
                None => return Err("task name cannot be blank".into()),
            }
        }
        TaskAction::List { json } => {
            let snapshot = app.snapshot();
            if json {
                println!("{}", serde_json::to_string_pretty(&snapshot.tasks)?);
            } else if snapshot.tasks.is_empty() {
                println!("No tasks");
            } else {
                for (i, task) in snapshot.tasks.iter().enumerate() {
                    let marker = if snapshot.active_task_index == Some(i) { ">" } else { " " };
                    println!("{marker} {}. {}", i + 1, describe(task));
                }
            }
        }
        TaskAction::Delete { task } => {
            let id = resolve(app.context().tasks.tasks(), &task)?;
            app.delete_task(&id);
            println!("Task deleted: {id}");
        }
        TaskAction::Activate { task } => {
            let id = resolve(app.context().tasks.tasks(), &task)?;
            app.set_active_task(&id);
            println!("Active task: {id}");
        }
        TaskAction::Move { from, to } => {
            let len = app.context().tasks.len();
            if from == 0 || to == 0 || from > len || to > len {
                return Err(format!("positions must be between 1 and {len}").into());
            }
            app.reorder_task(from - 1, to - 1);
            println!("ok");
        }
        TaskAction::ClearCompleted => {
            let before = app.context().tasks.len();
            app.clear_completed();
            println!("Removed {} completed task(s)", before - app.context().tasks.len());
        }
    }
    Ok(())
}

fn resolve(tasks: &[Task], selector: &str) -> Result<String, Box<dyn std::error::Error>> {
    find_task(tasks, selector)
        .map(|t| t.id.clone())
        .ok_or_else(|| format!("no task matches '{selector}'").into())
}

pub fn describe(task: &Task) -> String {
    let check = if task.completed { "[x]" } else { "[ ]" };
    match task.duration {
        Some(d) => format!(
            "{check} {} ({} / {})",
            task.name,
            format_minutes(task.time_spent),
            format_minutes(d)
        ),
        None => format!("{check} {} ({})", task.name, format_minutes(task.time_spent)),
    }
}
