use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

/// Built-in guided breathing patterns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BreathingPattern {
    /// 4-7-8 breathing.
    #[default]
    Relaxing,
    Box,
    Energizing,
}

/// Per-phase durations in seconds plus the target cycle count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PatternSpec {
    pub inhale: u32,
    pub hold_in: u32,
    pub exhale: u32,
    pub hold_out: u32,
    pub cycles: u32,
}

/// One segment of a breathing cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BreathPhase {
    #[default]
    Idle,
    Inhale,
    HoldIn,
    Exhale,
    HoldOut,
}

impl BreathingPattern {
    pub const ALL: [BreathingPattern; 3] = [
        BreathingPattern::Relaxing,
        BreathingPattern::Box,
        BreathingPattern::Energizing,
    ];

    pub fn spec(self) -> PatternSpec {
        match self {
            BreathingPattern::Relaxing => PatternSpec {
                inhale: 4,
                hold_in: 7,
                exhale: 8,
                hold_out: 0,
                cycles: 4,
            },
            BreathingPattern::Box => PatternSpec {
                inhale: 4,
                hold_in: 4,
                exhale: 4,
                hold_out: 4,
                cycles: 4,
            },
            BreathingPattern::Energizing => PatternSpec {
                inhale: 4,
                hold_in: 0,
                exhale: 4,
                hold_out: 0,
                cycles: 6,
            },
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            BreathingPattern::Relaxing => "relaxing",
            BreathingPattern::Box => "box",
            BreathingPattern::Energizing => "energizing",
        }
    }
}

impl PatternSpec {
    /// Seconds allotted to `phase`; zero means the phase is skipped.
    pub fn duration(&self, phase: BreathPhase) -> u32 {
        match phase {
            BreathPhase::Idle => 0,
            BreathPhase::Inhale => self.inhale,
            BreathPhase::HoldIn => self.hold_in,
            BreathPhase::Exhale => self.exhale,
            BreathPhase::HoldOut => self.hold_out,
        }
    }
}

impl BreathPhase {
    /// Prompt shown to the user during this phase.
    pub fn instruction(self) -> &'static str {
        match self {
            BreathPhase::Idle => "",
            BreathPhase::Inhale => "Breathe in",
            BreathPhase::HoldIn | BreathPhase::HoldOut => "Hold",
            BreathPhase::Exhale => "Breathe out",
        }
    }
}

impl fmt::Display for BreathingPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BreathingPattern {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "relaxing" | "478" | "4-7-8" => Ok(BreathingPattern::Relaxing),
            "box" => Ok(BreathingPattern::Box),
            "energizing" => Ok(BreathingPattern::Energizing),
            _ => Err(ValidationError::UnknownPattern(s.to_string())),
        }
    }
}
