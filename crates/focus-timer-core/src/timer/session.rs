use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

/// Top-level widget mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Pomodoro,
    Countdown,
    Stopwatch,
    Breathe,
}

/// Kind of interval within pomodoro mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionType {
    #[default]
    Focus,
    ShortBreak,
    LongBreak,
}

/// Observable run state derived from the running/paused flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerStatus {
    Idle,
    Running,
    Paused,
}

impl SessionType {
    pub fn is_break(self) -> bool {
        !matches!(self, SessionType::Focus)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Mode::Pomodoro => "pomodoro",
            Mode::Countdown => "countdown",
            Mode::Stopwatch => "stopwatch",
            Mode::Breathe => "breathe",
        };
        f.write_str(s)
    }
}

impl FromStr for Mode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pomodoro" => Ok(Mode::Pomodoro),
            "countdown" => Ok(Mode::Countdown),
            "stopwatch" => Ok(Mode::Stopwatch),
            "breathe" | "breathing" => Ok(Mode::Breathe),
            _ => Err(ValidationError::UnknownMode(s.to_string())),
        }
    }
}

impl fmt::Display for SessionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SessionType::Focus => "focus",
            SessionType::ShortBreak => "short_break",
            SessionType::LongBreak => "long_break",
        };
        f.write_str(s)
    }
}

impl FromStr for SessionType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "focus" => Ok(SessionType::Focus),
            "short" | "short_break" | "shortbreak" => Ok(SessionType::ShortBreak),
            "long" | "long_break" | "longbreak" => Ok(SessionType::LongBreak),
            _ => Err(ValidationError::UnknownSessionType(s.to_string())),
        }
    }
}
