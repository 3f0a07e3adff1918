//! User-tunable timer settings.
//!
//! Settings travel inside the persisted session record. Every field has a
//! serde default so older or partial records still load, and `validated`
//! replaces any non-positive duration with the field default.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Focus session length in minutes.
    #[serde(default = "default_focus_duration")]
    pub focus_duration: u32,
    #[serde(default = "default_short_break")]
    pub short_break_duration: u32,
    #[serde(default = "default_long_break")]
    pub long_break_duration: u32,
    #[serde(default = "default_cycles_before_long_break")]
    pub cycles_before_long_break: u32,
    #[serde(default)]
    pub sound_enabled: bool,
    #[serde(default = "default_true")]
    pub auto_start_breaks: bool,
    #[serde(default = "default_true")]
    pub auto_start_focus: bool,
}

fn default_focus_duration() -> u32 {
    25
}
fn default_short_break() -> u32 {
    5
}
fn default_long_break() -> u32 {
    15
}
fn default_cycles_before_long_break() -> u32 {
    4
}
fn default_true() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            focus_duration: default_focus_duration(),
            short_break_duration: default_short_break(),
            long_break_duration: default_long_break(),
            cycles_before_long_break: default_cycles_before_long_break(),
            sound_enabled: false,
            auto_start_breaks: true,
            auto_start_focus: true,
        }
    }
}

/// A settings field addressable by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettingKey {
    FocusDuration,
    ShortBreakDuration,
    LongBreakDuration,
    CyclesBeforeLongBreak,
    SoundEnabled,
    AutoStartBreaks,
    AutoStartFocus,
}

impl SettingKey {
    pub const ALL: [SettingKey; 7] = [
        SettingKey::FocusDuration,
        SettingKey::ShortBreakDuration,
        SettingKey::LongBreakDuration,
        SettingKey::CyclesBeforeLongBreak,
        SettingKey::SoundEnabled,
        SettingKey::AutoStartBreaks,
        SettingKey::AutoStartFocus,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SettingKey::FocusDuration => "focus_duration",
            SettingKey::ShortBreakDuration => "short_break_duration",
            SettingKey::LongBreakDuration => "long_break_duration",
            SettingKey::CyclesBeforeLongBreak => "cycles_before_long_break",
            SettingKey::SoundEnabled => "sound_enabled",
            SettingKey::AutoStartBreaks => "auto_start_breaks",
            SettingKey::AutoStartFocus => "auto_start_focus",
        }
    }
}

impl FromStr for SettingKey {
    type Err = ValidationError;

    /// Accepts both `snake_case` and the `camelCase` spelling used by the
    /// widget's form fields.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "focus_duration" | "focusDuration" => Ok(SettingKey::FocusDuration),
            "short_break_duration" | "shortBreakDuration" => Ok(SettingKey::ShortBreakDuration),
            "long_break_duration" | "longBreakDuration" => Ok(SettingKey::LongBreakDuration),
            "cycles_before_long_break" | "cyclesBeforeLongBreak" => {
                Ok(SettingKey::CyclesBeforeLongBreak)
            }
            "sound_enabled" | "soundEnabled" => Ok(SettingKey::SoundEnabled),
            "auto_start_breaks" | "autoStartBreaks" => Ok(SettingKey::AutoStartBreaks),
            "auto_start_focus" | "autoStartFocus" => Ok(SettingKey::AutoStartFocus),
            other => Err(ValidationError::UnknownSetting(other.to_string())),
        }
    }
}

impl Settings {
    /// Replace any non-positive count with its default.
    pub fn validated(mut self) -> Self {
        let defaults = Settings::default();
        if self.focus_duration == 0 {
            self.focus_duration = defaults.focus_duration;
        }
        if self.short_break_duration == 0 {
            self.short_break_duration = defaults.short_break_duration;
        }
        if self.long_break_duration == 0 {
            self.long_break_duration = defaults.long_break_duration;
        }
        if self.cycles_before_long_break == 0 {
            self.cycles_before_long_break = defaults.cycles_before_long_break;
        }
        self
    }

    /// Apply user input to one field. Input that does not parse as a
    /// positive integer (or a boolean, for flags) stores the field default.
    pub fn apply(&mut self, key: SettingKey, value: &str) {
        let defaults = Settings::default();
        match key {
            SettingKey::FocusDuration => {
                self.focus_duration = parse_positive(value).unwrap_or(defaults.focus_duration)
            }
            SettingKey::ShortBreakDuration => {
                self.short_break_duration =
                    parse_positive(value).unwrap_or(defaults.short_break_duration)
            }
            SettingKey::LongBreakDuration => {
                self.long_break_duration =
                    parse_positive(value).unwrap_or(defaults.long_break_duration)
            }
            SettingKey::CyclesBeforeLongBreak => {
                self.cycles_before_long_break =
                    parse_positive(value).unwrap_or(defaults.cycles_before_long_break)
            }
            SettingKey::SoundEnabled => {
                self.sound_enabled = parse_flag(value).unwrap_or(defaults.sound_enabled)
            }
            SettingKey::AutoStartBreaks => {
                self.auto_start_breaks = parse_flag(value).unwrap_or(defaults.auto_start_breaks)
            }
            SettingKey::AutoStartFocus => {
                self.auto_start_focus = parse_flag(value).unwrap_or(defaults.auto_start_focus)
            }
        }
    }

    /// Current value of one field, rendered as text.
    pub fn get(&self, key: SettingKey) -> String {
        match key {
            SettingKey::FocusDuration => self.focus_duration.to_string(),
            SettingKey::ShortBreakDuration => self.short_break_duration.to_string(),
            SettingKey::LongBreakDuration => self.long_break_duration.to_string(),
            SettingKey::CyclesBeforeLongBreak => self.cycles_before_long_break.to_string(),
            SettingKey::SoundEnabled => self.sound_enabled.to_string(),
            SettingKey::AutoStartBreaks => self.auto_start_breaks.to_string(),
            SettingKey::AutoStartFocus => self.auto_start_focus.to_string(),
        }
    }

    pub fn focus_secs(&self) -> u32 {
        self.focus_duration.saturating_mul(60)
    }

    pub fn short_break_secs(&self) -> u32 {
        self.short_break_duration.saturating_mul(60)
    }

    pub fn long_break_secs(&self) -> u32 {
        self.long_break_duration.saturating_mul(60)
    }
}

fn parse_positive(value: &str) -> Option<u32> {
    value.trim().parse::<u32>().ok().filter(|v| *v > 0)
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "on" | "yes" | "1" => Some(true),
        "false" | "off" | "no" | "0" => Some(false),
        _ => None,
    }
}
