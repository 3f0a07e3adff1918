use chrono::NaiveDate;

use crate::settings::Settings;
use crate::stats::DailyStats;
use crate::task::TaskList;

/// State shared by both engines: the settings they read, the task list the
/// timer credits, and today's counters.
///
/// Owned by the controller and lent to each engine operation.
#[derive(Debug, Clone, PartialEq)]
pub struct Context {
    pub settings: Settings,
    pub tasks: TaskList,
    pub stats: DailyStats,
}

impl Context {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            settings: Settings::default(),
            tasks: TaskList::new(),
            stats: DailyStats::new(today),
        }
    }
}
