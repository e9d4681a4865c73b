//! Break activity and encouragement suggestions.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakActivity {
    pub id: String,
    pub label: String,
    pub duration_minutes: u32,
    pub icon: String,
}

fn activity(id: &str, label: &str, duration_minutes: u32, icon: &str) -> BreakActivity {
    BreakActivity {
        id: id.to_string(),
        label: label.to_string(),
        duration_minutes,
        icon: icon.to_string(),
    }
}

/// Activities sized to how long the user has been focused.
pub fn break_activities(elapsed_minutes: u32) -> Vec<BreakActivity> {
    if elapsed_minutes < 30 {
        vec![
            activity("water", "Drink a glass of water", 2, "💧"),
            activity("stretch", "Stand up and stretch", 3, "🙆"),
            activity("breathe", "Take five slow breaths", 5, "🌬️"),
        ]
    } else if elapsed_minutes < 60 {
        vec![
            activity("walk", "Take a short walk", 10, "🚶"),
            activity("snack", "Grab a healthy snack", 5, "🍎"),
            activity("nature", "Look outside or step into nature", 7, "🌿"),
        ]
    } else {
        vec![
            activity("meal", "Eat a proper meal", 20, "🍽️"),
            activity("nap", "Take a power nap", 20, "😴"),
            activity("outside", "Go outside for fresh air", 15, "☀️"),
        ]
    }
}

const AFFIRMING: &str = "You're doing great at honoring your breaks. Your future self thanks you!";
const NEUTRAL: &str = "Breaks help you stay focused longer. Try taking the next one.";
const CONCERNED: &str =
    "Your brain needs rest to do its best work. Please consider accepting more breaks.";

/// Accepted over suggested breaks, 1.0 when nothing was suggested yet.
pub fn acceptance_rate(breaks_suggested: u32, breaks_accepted: u32) -> f64 {
    if breaks_suggested == 0 {
        1.0
    } else {
        breaks_accepted as f64 / breaks_suggested as f64
    }
}

pub fn encouragement_message(breaks_suggested: u32, breaks_accepted: u32) -> &'static str {
    let rate = acceptance_rate(breaks_suggested, breaks_accepted);
    if rate > 0.7 {
        AFFIRMING
    } else if rate > 0.4 {
        NEUTRAL
    } else {
        CONCERNED
    }
}
