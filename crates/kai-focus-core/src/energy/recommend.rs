//! Session-length recommendation and encouragement text.

use serde::{Deserialize, Serialize};

use super::level::{EnergyLevel, TimeBucket};

const HIGH_MORNING: &str =
    "Your energy is high this morning, prime time for deep work. Try a longer 45-minute session.";
const HIGH_OTHER: &str = "Your energy is high right now. A solid 30-minute session should feel good.";
const MEDIUM: &str = "Moderate energy suits a classic 25-minute focus session.";
const LOW: &str = "Energy is low, so start small. A 15-minute session still counts as a win.";
const EVENING: &str =
    "It's evening, so keep it short and gentle. A brief session leaves room to wind down.";

/// Suggested focus-session length.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub duration_minutes: u32,
    pub reasoning: String,
    /// Fixed per rule, not a computed statistic.
    pub confidence: f64,
}

/// Recommend a session length for an energy level and bucket.
pub fn recommend(level: EnergyLevel, bucket: TimeBucket) -> Recommendation {
    let (mut duration, mut confidence, mut reasoning) = match (level, bucket) {
        (EnergyLevel::High, TimeBucket::Morning) => (45, 0.9, HIGH_MORNING),
        (EnergyLevel::High, _) => (30, 0.8, HIGH_OTHER),
        (EnergyLevel::Medium, _) => (25, 0.7, MEDIUM),
        (EnergyLevel::Low, _) => (15, 0.8, LOW),
    };

    // Evenings cap long sessions; low evening energy gets the same message.
    if bucket == TimeBucket::Evening && (duration > 25 || level == EnergyLevel::Low) {
        duration = duration.min(20);
        confidence = 0.9;
        reasoning = EVENING;
    }

    Recommendation {
        duration_minutes: duration,
        reasoning: reasoning.to_string(),
        confidence,
    }
}

/// Canned encouragement lines for a level.
pub fn encouragements(level: EnergyLevel) -> &'static [&'static str; 3] {
    match level {
        EnergyLevel::High => &[
            "You're firing on all cylinders. Let's tackle something meaningful!",
            "Great energy today. Pick the task you've been putting off.",
            "Your focus is sharp right now. Ride the wave!",
        ],
        EnergyLevel::Medium => &[
            "Steady and capable. One task at a time.",
            "Good enough energy is good enough. Let's start small and build momentum.",
            "You've got this. A focused session is just a few minutes away.",
        ],
        EnergyLevel::Low => &[
            "Low energy days are valid. Even five minutes of progress counts.",
            "Be gentle with yourself. Choose something easy to get started.",
            "Rest is productive too. A tiny step forward is still a step.",
        ],
    }
}
