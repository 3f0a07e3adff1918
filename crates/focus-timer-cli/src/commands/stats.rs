use clap::Subcommand;
use focus_timer_core::{format_stat_time, Config};

use super::{open_app, CliResult};

#[derive(Subcommand)]
pub enum StatsAction {
    /// Today's stats
    Today {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Zero today's counters
    Reset,
}

pub fn run(action: StatsAction, config: &Config) -> CliResult {
    let mut app = open_app(config)?;

    match action {
        StatsAction::Today { json } => {
            let stats = &app.context().stats;
            if json {
                println!("{}", serde_json::to_string_pretty(stats)?);
            } else {
                println!("Date:            {}", stats.date);
                println!("Focus time:      {}", format_stat_time(stats.focus_time));
                println!("Pomodoros:       {}", stats.pomodoros);
                println!("Tasks completed: {}", stats.tasks_completed);
                println!("Sessions:        {}", stats.sessions);
            }
        }
        StatsAction::Reset => {
            app.reset_statistics();
            println!("statistics reset");
        }
    }
    Ok(())
}
