use clap::Subcommand;
use focus_timer_core::{Config, SettingKey};

use super::{open_app, CliResult};

#[derive(Subcommand)]
pub enum SettingsAction {
    /// Get a setting (e.g. "focus_duration", "auto_start_breaks")
    Get { key: SettingKey },
    /// Set a setting. Invalid values store the default.
    Set { key: SettingKey, value: String },
    /// List all settings
    List,
    /// Restore default settings
    Reset,
}

pub fn run(action: SettingsAction, config: &Config) -> CliResult {
    let mut app = open_app(config)?;

    match action {
        SettingsAction::Get { key } => {
            println!("{}", app.context().settings.get(key));
        }
        SettingsAction::Set { key, value } => {
            app.change_setting(key, &value);
            println!("{} = {}", key.as_str(), app.context().settings.get(key));
        }
        SettingsAction::List => {
            let settings = app.context().settings;
            for key in SettingKey::ALL {
                println!("{} = {}", key.as_str(), settings.get(key));
            }
        }
        SettingsAction::Reset => {
            app.reset_settings();
            println!("settings reset to defaults");
        }
    }
    Ok(())
}
