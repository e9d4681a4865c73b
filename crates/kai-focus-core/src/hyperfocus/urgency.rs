//! Urgency tiers for break suggestions.
//!
//! ## Escalation Levels
//!
//! - **None**: under 25 minutes, nothing shown
//! - **Gentle**: 25+ minutes, light reminder
//! - **Strong**: 45+ minutes, framed as advice
//! - **Urgent**: 90+ minutes, break directive
//! - **Emergency**: 120+ minutes, mandatory rest

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UrgencyLevel {
    #[default]
    None,
    Gentle,
    Strong,
    Urgent,
    Emergency,
}

impl UrgencyLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            UrgencyLevel::None => "none",
            UrgencyLevel::Gentle => "gentle",
            UrgencyLevel::Strong => "strong",
            UrgencyLevel::Urgent => "urgent",
            UrgencyLevel::Emergency => "emergency",
        }
    }

    /// Suggestion text for this tier, or `None` when nothing is shown.
    pub fn message(self, elapsed_minutes: u32) -> Option<String> {
        let text = match self {
            UrgencyLevel::None => return None,
            UrgencyLevel::Gentle => format!(
                "You've been focused for {elapsed_minutes} minutes. A quick stretch might feel nice."
            ),
            UrgencyLevel::Strong => format!(
                "{elapsed_minutes} minutes of deep focus. A short break now will help you keep going strong."
            ),
            UrgencyLevel::Urgent => format!(
                "You've been hyperfocused for {elapsed_minutes} minutes. Time to step away and take a real break."
            ),
            UrgencyLevel::Emergency => format!(
                "{elapsed_minutes} minutes without rest. Stop now: drink water, eat something and rest before you continue."
            ),
        };
        Some(text)
    }
}

impl fmt::Display for UrgencyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inclusive lower bounds, in minutes, for each tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrgencyThresholds {
    pub gentle_min: u32,
    pub strong_min: u32,
    pub urgent_min: u32,
    pub emergency_min: u32,
}

impl Default for UrgencyThresholds {
    fn default() -> Self {
        Self {
            gentle_min: 25,
            strong_min: 45,
            urgent_min: 90,
            emergency_min: 120,
        }
    }
}

impl UrgencyThresholds {
    /// Highest tier whose threshold is at or below `elapsed_minutes`.
    pub fn level_for(&self, elapsed_minutes: u32) -> UrgencyLevel {
        if elapsed_minutes >= self.emergency_min {
            UrgencyLevel::Emergency
        } else if elapsed_minutes >= self.urgent_min {
            UrgencyLevel::Urgent
        } else if elapsed_minutes >= self.strong_min {
            UrgencyLevel::Strong
        } else if elapsed_minutes >= self.gentle_min {
            UrgencyLevel::Gentle
        } else {
            UrgencyLevel::None
        }
    }
}
