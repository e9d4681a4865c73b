use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::energy::{EnergyLevel, TimeBucket};
use crate::hyperfocus::{SessionRecord, UrgencyLevel};

/// How an energy level was arrived at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnergySource {
    /// Inferred from recent session outcomes.
    Learned,
    /// Set explicitly by the user.
    Manual,
}

/// Every state change in the core produces an Event.
/// The caller renders them; they are also traced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    EnergyLevelChanged {
        bucket: TimeBucket,
        from: EnergyLevel,
        to: EnergyLevel,
        source: EnergySource,
        at: DateTime<Utc>,
    },
    SessionStarted {
        session_id: Uuid,
        at: DateTime<Utc>,
    },
    BreakSuggested {
        session_id: Uuid,
        urgency: UrgencyLevel,
        elapsed_minutes: u32,
        message: String,
        at: DateTime<Utc>,
    },
    BreakAccepted {
        session_id: Uuid,
        urgency: UrgencyLevel,
        elapsed_minutes: u32,
        break_minutes: u32,
        at: DateTime<Utc>,
    },
    SuggestionDismissed {
        session_id: Uuid,
        urgency: UrgencyLevel,
        elapsed_minutes: u32,
        at: DateTime<Utc>,
    },
    SessionEnded {
        record: SessionRecord,
    },
}

impl Event {
    /// Stable name of the variant, for logs and CLI output.
    pub fn kind(&self) -> &'static str {
        match self {
            Event::EnergyLevelChanged { .. } => "energy_level_changed",
            Event::SessionStarted { .. } => "session_started",
            Event::BreakSuggested { .. } => "break_suggested",
            Event::BreakAccepted { .. } => "break_accepted",
            Event::SuggestionDismissed { .. } => "suggestion_dismissed",
            Event::SessionEnded { .. } => "session_ended",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_serialize_with_type_tag() {
        let event = Event::SessionStarted {
            session_id: Uuid::nil(),
            at: DateTime::<Utc>::UNIX_EPOCH,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "SessionStarted");
        assert_eq!(event.kind(), "session_started");
    }
}
