//! Energy levels, time-of-day buckets and the per-bucket profile.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Outcomes kept per bucket.
pub const PROFILE_HISTORY_CAP: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnergyLevel {
    Low,
    Medium,
    High,
}

impl EnergyLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            EnergyLevel::Low => "low",
            EnergyLevel::Medium => "medium",
            EnergyLevel::High => "high",
        }
    }

    /// Level implied by a recent completion rate.
    pub fn from_completion_rate(rate: f64) -> Self {
        if rate > 0.7 {
            EnergyLevel::High
        } else if rate > 0.4 {
            EnergyLevel::Medium
        } else {
            EnergyLevel::Low
        }
    }
}

impl fmt::Display for EnergyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EnergyLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "low" => Ok(EnergyLevel::Low),
            "medium" | "med" => Ok(EnergyLevel::Medium),
            "high" => Ok(EnergyLevel::High),
            other => Err(format!("unknown energy level '{other}' (expected low, medium or high)")),
        }
    }
}

/// Time-of-day bucket.
///
/// There is no night bucket: hours 0-5 count as evening, which also gives
/// late-night sessions the shortened evening recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeBucket {
    Morning,
    Afternoon,
    Evening,
}

impl TimeBucket {
    pub const ALL: [TimeBucket; 3] = [TimeBucket::Morning, TimeBucket::Afternoon, TimeBucket::Evening];

    pub fn from_hour(hour: u32) -> Self {
        match hour {
            6..=11 => TimeBucket::Morning,
            12..=17 => TimeBucket::Afternoon,
            _ => TimeBucket::Evening,
        }
    }

    /// Energy assumed before any history exists: peak focus after waking,
    /// a post-lunch dip, evening fatigue.
    pub fn default_level(self) -> EnergyLevel {
        match self {
            TimeBucket::Morning => EnergyLevel::High,
            TimeBucket::Afternoon => EnergyLevel::Medium,
            TimeBucket::Evening => EnergyLevel::Low,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TimeBucket::Morning => "morning",
            TimeBucket::Afternoon => "afternoon",
            TimeBucket::Evening => "evening",
        }
    }
}

impl fmt::Display for TimeBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeBucket {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "morning" => Ok(TimeBucket::Morning),
            "afternoon" => Ok(TimeBucket::Afternoon),
            "evening" => Ok(TimeBucket::Evening),
            other => Err(format!("unknown time bucket '{other}'")),
        }
    }
}

/// One finished focus session as seen by the advisor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionOutcome {
    pub duration_minutes: u32,
    pub completed: bool,
    pub timestamp: DateTime<Utc>,
    pub energy_at_start: EnergyLevel,
}

/// Learned state for one bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnergyProfile {
    pub level: EnergyLevel,
    #[serde(default)]
    pub history: Vec<SessionOutcome>,
}

impl EnergyProfile {
    pub fn new(level: EnergyLevel) -> Self {
        Self {
            level,
            history: Vec::new(),
        }
    }

    /// Completion rate over the last `window` outcomes, or `None` when fewer
    /// than `min_samples` exist. The denominator is always `window`.
    pub fn recent_completion_rate(&self, window: usize, min_samples: usize) -> Option<f64> {
        let recent: Vec<_> = self.history.iter().rev().take(window).collect();
        if recent.len() < min_samples {
            return None;
        }
        let completed = recent.iter().filter(|o| o.completed).count();
        Some(completed as f64 / window as f64)
    }
}

/// Manual energy override for one calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnergyPreference {
    pub level: EnergyLevel,
    pub bucket: TimeBucket,
    pub set_at: DateTime<Utc>,
}
