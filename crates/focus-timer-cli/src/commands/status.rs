use focus_timer_core::Config;

use super::{open_app, CliResult};

pub fn run(config: &Config) -> CliResult {
    let app = open_app(config)?;
    println!("{}", serde_json::to_string_pretty(&app.snapshot())?);
    Ok(())
}
