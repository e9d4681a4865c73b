mod activities;
mod guard;
mod records;
mod urgency;

pub use activities::{acceptance_rate, break_activities, encouragement_message, BreakActivity};
pub use guard::{BreakSuggestion, FocusSession, GuardView, HyperfocusGuard};
pub use records::{
    BreakEvent, BreakStats, DismissalEvent, SessionRecord, BREAK_HISTORY_CAP,
    DISMISSAL_HISTORY_CAP, SESSION_HISTORY_CAP,
};
pub use urgency::{UrgencyLevel, UrgencyThresholds};
