pub mod config;
pub mod run;
pub mod settings;
pub mod stats;
pub mod status;
pub mod task;

use focus_timer_core::{App, Config, Database, Task};

pub type CliResult = Result<(), Box<dyn std::error::Error>>;

/// Open the store named by `config` and restore the saved session.
pub fn open_app(config: &Config) -> Result<App<Database>, Box<dyn std::error::Error>> {
    let db = Database::open_at(&config.database_path()?)?;
    Ok(App::open(db, config.resume_window()))
}

/// Resolve a task selector: a 1-based position as shown by `task list`, or
/// a task id.
pub fn find_task<'a>(tasks: &'a [Task], selector: &str) -> Option<&'a Task> {
    match selector.parse::<usize>() {
        Ok(n) => n.checked_sub(1).and_then(|i| tasks.get(i)),
        Err(_) => tasks.iter().find(|t| t.id == selector),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use focus_timer_core::TaskList;

    #[test]
    fn find_task_by_position_or_id() {
        let mut list = TaskList::new();
        list.add("first", None);
        list.add("second", Some(10));
        let tasks = list.tasks();
        assert_eq!(find_task(tasks, "2").map(|t| t.name.as_str()), Some("second"));
        assert!(find_task(tasks, "0").is_none());
        assert!(find_task(tasks, "3").is_none());
        let id = tasks[0].id.clone();
        assert_eq!(find_task(tasks, &id).map(|t| t.name.as_str()), Some("first"));
        assert!(find_task(tasks, "nope").is_none());
    }
}
