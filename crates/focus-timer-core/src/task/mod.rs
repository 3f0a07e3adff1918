//! Ordered task list with a single active task.
//!
//! The active task is tracked by index. Every operation that removes or moves
//! tasks re-validates that index so it is always `None` or in bounds.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A unit of work with an optional time budget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub name: String,
    /// Time budget in minutes.
    #[serde(default)]
    pub duration: Option<u32>,
    /// Minutes credited from completed focus sessions.
    #[serde(default)]
    pub time_spent: u32,
    #[serde(default)]
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

impl Task {
    fn new(name: &str, duration: Option<u32>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            duration: duration.filter(|d| *d > 0),
            time_spent: 0,
            completed: false,
            created_at: Utc::now(),
        }
    }

    /// Budget in seconds, if the task has one.
    pub fn duration_secs(&self) -> Option<u32> {
        self.duration.map(|d| d.saturating_mul(60))
    }

    /// True once the credited time covers the budget.
    pub fn budget_met(&self) -> bool {
        self.duration.is_some_and(|d| self.time_spent >= d)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskList {
    tasks: Vec<Task>,
    active: Option<usize>,
}

impl TaskList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from persisted parts, dropping an active index that does not
    /// point into `tasks`.
    pub fn restore(tasks: Vec<Task>, active: Option<usize>) -> Self {
        let active = active.filter(|i| *i < tasks.len());
        Self { tasks, active }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn active_index(&self) -> Option<usize> {
        self.active
    }

    pub fn active(&self) -> Option<&Task> {
        self.active.and_then(|i| self.tasks.get(i))
    }

    pub fn active_mut(&mut self) -> Option<&mut Task> {
        self.active.and_then(|i| self.tasks.get_mut(i))
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.tasks.iter().position(|t| t.id == id)
    }

    pub fn get(&self, index: usize) -> Option<&Task> {
        self.tasks.get(index)
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Append a task. Blank names are ignored. The first task added while
    /// nothing is active becomes active.
    pub fn add(&mut self, name: &str, duration: Option<u32>) -> Option<&Task> {
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        self.tasks.push(Task::new(name, duration));
        if self.active.is_none() {
            self.active = Some(0);
        }
        self.tasks.last()
    }

    /// Remove a task by id. Returns the removed task.
    pub fn delete(&mut self, id: &str) -> Option<Task> {
        let index = self.position(id)?;
        let removed = self.tasks.remove(index);
        if self.tasks.is_empty() {
            self.active = None;
        } else if let Some(active) = self.active {
            if index <= active {
                self.active = Some(active.saturating_sub(1));
            }
        }
        Some(removed)
    }

    /// Make the task with `id` active. Returns its index.
    pub fn set_active(&mut self, id: &str) -> Option<usize> {
        let index = self.position(id)?;
        self.active = Some(index);
        Some(index)
    }

    /// Move the task at `from` to position `to`, keeping the active index on
    /// the same task.
    pub fn reorder(&mut self, from: usize, to: usize) -> bool {
        if from >= self.tasks.len() || to >= self.tasks.len() || from == to {
            return false;
        }
        let task = self.tasks.remove(from);
        self.tasks.insert(to, task);
        if let Some(active) = self.active {
            self.active = Some(if active == from {
                to
            } else if from < active && to >= active {
                active - 1
            } else if from > active && to <= active {
                active + 1
            } else {
                active
            });
        }
        true
    }

    /// Drop every completed task. The active task keeps its selection if it
    /// survives; otherwise the first remaining task becomes active, including
    /// when nothing was selected before.
    pub fn clear_completed(&mut self) -> usize {
        let active_id = self.active().map(|t| t.id.clone());
        let before = self.tasks.len();
        self.tasks.retain(|t| !t.completed);
        self.active = if self.tasks.is_empty() {
            None
        } else {
            active_id
                .and_then(|id| self.position(&id))
                .or(Some(0))
        };
        before - self.tasks.len()
    }

    /// Mark the active task complete. Returns its id when it was not already
    /// complete.
    pub fn complete_active(&mut self) -> Option<String> {
        let task = self.active_mut()?;
        if task.completed {
            return None;
        }
        task.completed = true;
        Some(task.id.clone())
    }

    /// Make the next incomplete task after the active one active, without
    /// wrapping. Clears the selection when none remain.
    pub fn advance(&mut self) -> Option<&Task> {
        let start = self.active.map(|i| i + 1).unwrap_or(0);
        self.active = self
            .tasks
            .iter()
            .enumerate()
            .skip(start)
            .find(|(_, t)| !t.completed)
            .map(|(i, _)| i);
        self.active()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list_of(names: &[&str]) -> TaskList {
        let mut list = TaskList::new();
        for name in names {
            list.add(name, None);
        }
        list
    }

    fn id_at(list: &TaskList, i: usize) -> String {
        list.get(i).unwrap().id.clone()
    }

    #[test]
    fn add_trims_and_rejects_blank() {
        let mut list = TaskList::new();
        assert!(list.add("   ", Some(10)).is_none());
        let task = list.add("  Draft outline ", Some(30)).unwrap();
        assert_eq!(task.name, "Draft outline");
        assert_eq!(task.duration, Some(30));
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn first_task_becomes_active() {
        let mut list = TaskList::new();
        assert_eq!(list.active_index(), None);
        list.add("a", None);
        list.add("b", None);
        assert_eq!(list.active_index(), Some(0));
    }

    #[test]
    fn zero_duration_means_no_budget() {
        let mut list = TaskList::new();
        let task = list.add("a", Some(0)).unwrap();
        assert_eq!(task.duration, None);
    }

    #[test]
    fn deleting_only_active_task_clears_selection() {
        let mut list = list_of(&["only"]);
        let id = id_at(&list, 0);
        assert!(list.delete(&id).is_some());
        assert_eq!(list.active_index(), None);
    }

    #[test]
    fn deleting_earlier_task_shifts_active_down() {
        let mut list = list_of(&["a", "b", "c"]);
        let c = id_at(&list, 2);
        list.set_active(&c);
        let a = id_at(&list, 0);
        list.delete(&a);
        assert_eq!(list.active_index(), Some(1));
        assert_eq!(list.active().unwrap().id, c);
    }

    #[test]
    fn deleting_later_task_keeps_active() {
        let mut list = list_of(&["a", "b", "c"]);
        let c = id_at(&list, 2);
        list.delete(&c);
        assert_eq!(list.active_index(), Some(0));
    }

    #[test]
    fn delete_unknown_id_is_noop() {
        let mut list = list_of(&["a"]);
        assert!(list.delete("missing").is_none());
        assert!(list.set_active("missing").is_none());
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn reorder_moves_active_with_task() {
        let mut list = list_of(&["a", "b", "c"]);
        let c = id_at(&list, 2);
        list.set_active(&c);
        assert!(list.reorder(2, 0));
        assert_eq!(list.active_index(), Some(0));
        assert_eq!(list.active().unwrap().id, c);
    }

    #[test]
    fn reorder_across_active_remaps_index() {
        let mut list = list_of(&["a", "b", "c", "d"]);
        let b = id_at(&list, 1);
        list.set_active(&b);
        list.reorder(0, 3);
        assert_eq!(list.active().unwrap().id, b);
        list.reorder(3, 0);
        assert_eq!(list.active().unwrap().id, b);
    }

    #[test]
    fn reorder_out_of_bounds_is_rejected() {
        let mut list = list_of(&["a", "b"]);
        assert!(!list.reorder(0, 2));
        assert!(!list.reorder(5, 0));
    }

    #[test]
    fn clear_completed_keeps_surviving_active_task() {
        let mut list = list_of(&["a", "b", "c"]);
        list.complete_active();
        let c = id_at(&list, 2);
        list.set_active(&c);
        assert_eq!(list.clear_completed(), 1);
        assert_eq!(list.active().unwrap().id, c);
    }

    #[test]
    fn clear_completed_falls_back_to_first_task() {
        let mut list = list_of(&["a", "b"]);
        list.complete_active();
        list.clear_completed();
        assert_eq!(list.active_index(), Some(0));
        assert_eq!(list.active().unwrap().name, "b");
    }

    #[test]
    fn clear_completed_selects_first_task_when_none_was_active() {
        let mut list = list_of(&["a", "b", "c"]);
        list.complete_active();
        list.advance();
        list.complete_active();
        list.advance();
        assert!(list.advance().is_none());
        assert_eq!(list.active_index(), None);

        assert_eq!(list.clear_completed(), 2);
        assert_eq!(list.active_index(), Some(0));
        assert_eq!(list.active().unwrap().name, "c");
    }

    #[test]
    fn clear_completed_emptying_list_clears_selection() {
        let mut list = list_of(&["a"]);
        list.complete_active();
        list.clear_completed();
        assert!(list.is_empty());
        assert_eq!(list.active_index(), None);
    }

    #[test]
    fn complete_active_only_reports_once() {
        let mut list = list_of(&["a"]);
        assert!(list.complete_active().is_some());
        assert!(list.complete_active().is_none());
    }

    #[test]
    fn advance_skips_completed_and_does_not_wrap() {
        let mut list = list_of(&["a", "b", "c"]);
        let b = id_at(&list, 1);
        list.set_active(&b);
        list.complete_active();
        list.set_active(&id_at(&list, 0));
        list.complete_active();
        assert_eq!(list.advance().unwrap().name, "c");
        list.complete_active();
        assert!(list.advance().is_none());
        assert_eq!(list.active_index(), None);
    }

    #[test]
    fn restore_drops_out_of_range_index() {
        let list = list_of(&["a"]);
        let restored = TaskList::restore(list.tasks().to_vec(), Some(4));
        assert_eq!(restored.active_index(), None);
    }

    #[test]
    fn budget_met_compares_minutes() {
        let mut list = TaskList::new();
        list.add("a", Some(50));
        let task = list.active_mut().unwrap();
        task.time_spent = 25;
        assert!(!task.budget_met());
        task.time_spent = 50;
        assert!(task.budget_met());
    }
}
