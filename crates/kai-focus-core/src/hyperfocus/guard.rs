//! Hyperfocus guard implementation.
//!
//! The guard is a wall-clock-based state machine over [`UrgencyLevel`]. It
//! does not use internal threads: the caller invokes `tick()` at least once
//! per minute while a session is active (see [`crate::ticker`]).
//!
//! ## State Transitions
//!
//! ```text
//! Inactive -> start -> None -> Gentle -> Strong -> Urgent -> Emergency
//!                       ^                                        |
//!                       +---------- accept_break ----------------+
//! ```
//!
//! Accepting a break only resets the urgency. The session clock keeps running,
//! so the next tick re-escalates to the tier the elapsed time implies.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::activities::{break_activities, encouragement_message, BreakActivity};
use super::records::{
    BreakEvent, BreakStats, DismissalEvent, SessionRecord, BREAK_HISTORY_CAP,
    DISMISSAL_HISTORY_CAP, SESSION_HISTORY_CAP,
};
use super::urgency::{UrgencyLevel, UrgencyThresholds};
use crate::clock::Clock;
use crate::events::Event;
use crate::storage::{
    keys, load_json, push_capped, trim_front, update_json, HyperfocusConfig, PatternStore,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakSuggestion {
    pub urgency: UrgencyLevel,
    pub message: String,
}

/// The single active focus session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FocusSession {
    pub id: Uuid,
    pub start_time: DateTime<Utc>,
    pub elapsed_minutes: u32,
    pub breaks_suggested: u32,
    pub breaks_accepted: u32,
    pub urgency_level: UrgencyLevel,
    #[serde(default)]
    pub last_break_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub current_suggestion: Option<BreakSuggestion>,
}

impl FocusSession {
    fn new(start_time: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            start_time,
            elapsed_minutes: 0,
            breaks_suggested: 0,
            breaks_accepted: 0,
            urgency_level: UrgencyLevel::None,
            last_break_time: None,
            current_suggestion: None,
        }
    }
}

/// What the caller displays for the guard side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuardView {
    pub session_active: bool,
    pub elapsed_minutes: u32,
    pub urgency_level: UrgencyLevel,
    pub current_suggestion: Option<BreakSuggestion>,
    pub break_activities: Vec<BreakActivity>,
    pub encouragement_message: String,
}

pub struct HyperfocusGuard<S, C> {
    store: S,
    clock: C,
    thresholds: UrgencyThresholds,
    default_break_min: u32,
    session: Option<FocusSession>,
    breaks: Vec<BreakEvent>,
    dismissals: Vec<DismissalEvent>,
    sessions: Vec<SessionRecord>,
}

impl<S: PatternStore, C: Clock> HyperfocusGuard<S, C> {
    pub fn new(store: S, clock: C) -> Self {
        Self::with_config(store, clock, &HyperfocusConfig::default())
    }

    /// Load logs and any active session from the store.
    ///
    /// Corrupt or missing data is treated as empty.
    pub fn with_config(store: S, clock: C, config: &HyperfocusConfig) -> Self {
        let mut breaks: Vec<BreakEvent> = load_json(&store, keys::BREAK_HISTORY);
        let mut dismissals: Vec<DismissalEvent> = load_json(&store, keys::DISMISSAL_HISTORY);
        let mut sessions: Vec<SessionRecord> = load_json(&store, keys::SESSION_HISTORY);
        trim_front(&mut breaks, BREAK_HISTORY_CAP);
        trim_front(&mut dismissals, DISMISSAL_HISTORY_CAP);
        trim_front(&mut sessions, SESSION_HISTORY_CAP);
        let session: Option<FocusSession> = load_json(&store, keys::ACTIVE_SESSION);
        if let Some(ref s) = session {
            tracing::debug!(session_id = %s.id, "restored active focus session");
        }

        Self {
            store,
            clock,
            thresholds: config.thresholds(),
            default_break_min: config.default_break_min,
            session,
            breaks,
            dismissals,
            sessions,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    pub fn session(&self) -> Option<&FocusSession> {
        self.session.as_ref()
    }

    pub fn urgency_level(&self) -> UrgencyLevel {
        self.session
            .as_ref()
            .map(|s| s.urgency_level)
            .unwrap_or_default()
    }

    pub fn current_suggestion(&self) -> Option<&BreakSuggestion> {
        self.session.as_ref()?.current_suggestion.as_ref()
    }

    pub fn thresholds(&self) -> &UrgencyThresholds {
        &self.thresholds
    }

    pub fn break_history(&self) -> &[BreakEvent] {
        &self.breaks
    }

    pub fn dismissal_history(&self) -> &[DismissalEvent] {
        &self.dismissals
    }

    pub fn session_history(&self) -> &[SessionRecord] {
        &self.sessions
    }

    pub fn break_activity_suggestions(&self) -> Vec<BreakActivity> {
        break_activities(self.elapsed_minutes())
    }

    pub fn encouragement_message(&self) -> &'static str {
        let (suggested, accepted) = self
            .session
            .as_ref()
            .map(|s| (s.breaks_suggested, s.breaks_accepted))
            .unwrap_or((0, 0));
        encouragement_message(suggested, accepted)
    }

    pub fn view(&self) -> GuardView {
        GuardView {
            session_active: self.is_active(),
            elapsed_minutes: self.elapsed_minutes(),
            urgency_level: self.urgency_level(),
            current_suggestion: self.current_suggestion().cloned(),
            break_activities: self.break_activity_suggestions(),
            encouragement_message: self.encouragement_message().to_string(),
        }
    }

    pub fn stats(&self) -> BreakStats {
        BreakStats::from_logs(&self.sessions, &self.breaks, &self.dismissals)
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Begin a new session, replacing any active one.
    pub fn start_session(&mut self) -> Event {
        let session = FocusSession::new(self.clock.now_utc());
        let event = Event::SessionStarted {
            session_id: session.id,
            at: session.start_time,
        };
        tracing::info!(session_id = %session.id, "focus session started");
        self.transact_session(|active| {
            if let Some(old) = active.as_ref() {
                tracing::debug!(session_id = %old.id, "replacing active focus session");
            }
            *active = Some(session);
        });
        event
    }

    /// Recompute elapsed time and urgency.
    ///
    /// Every tick at a non-`None` tier counts as a suggestion, including
    /// repeats of the same tier. Only the periodic driver should call this;
    /// use [`refresh`](Self::refresh) to bring the state up to date without
    /// counting.
    pub fn tick(&mut self) -> Option<Event> {
        let now = self.clock.now_utc();
        let thresholds = self.thresholds;
        self.transact_session(|active| {
            let session = active.as_mut()?;
            let level = advance(session, &thresholds, now);

            match level.message(session.elapsed_minutes) {
                Some(message) => {
                    session.breaks_suggested += 1;
                    session.current_suggestion = Some(BreakSuggestion {
                        urgency: level,
                        message: message.clone(),
                    });
                    Some(Event::BreakSuggested {
                        session_id: session.id,
                        urgency: level,
                        elapsed_minutes: session.elapsed_minutes,
                        message,
                        at: now,
                    })
                }
                None => {
                    session.current_suggestion = None;
                    None
                }
            }
        })
    }

    /// Update elapsed time and urgency without producing a suggestion.
    ///
    /// The displayed suggestion is kept from the last tick, and
    /// `breaks_suggested` is unchanged.
    pub fn refresh(&mut self) {
        let now = self.clock.now_utc();
        let thresholds = self.thresholds;
        self.transact_session(|active| {
            if let Some(session) = active.as_mut() {
                if advance(session, &thresholds, now) == UrgencyLevel::None {
                    session.current_suggestion = None;
                }
            }
        });
    }

    /// Accept a break of the configured default length.
    pub fn accept_default_break(&mut self) -> Option<Event> {
        self.accept_break(self.default_break_min)
    }

    /// Log a break and reset the urgency. The session clock is untouched.
    ///
    /// No-op without an active session.
    pub fn accept_break(&mut self, break_minutes: u32) -> Option<Event> {
        let now = self.clock.now_utc();
        let accepted = self.transact_session(|active| {
            let session = active.as_mut()?;
            let urgency = session.urgency_level;
            session.breaks_accepted += 1;
            session.current_suggestion = None;
            session.urgency_level = UrgencyLevel::None;
            session.last_break_time = Some(now);
            Some((session.id, urgency, session.elapsed_minutes))
        });
        let Some((session_id, urgency, elapsed)) = accepted else {
            tracing::debug!("accept_break ignored: no active session");
            return None;
        };

        let event = BreakEvent {
            timestamp: now,
            focus_time_before_break: elapsed,
            break_duration: break_minutes,
            urgency_level: urgency,
        };
        append_log(&self.store, keys::BREAK_HISTORY, &mut self.breaks, event, BREAK_HISTORY_CAP);

        tracing::info!(%session_id, %urgency, elapsed, break_minutes, "break accepted");
        Some(Event::BreakAccepted {
            session_id,
            urgency,
            elapsed_minutes: elapsed,
            break_minutes,
            at: now,
        })
    }

    /// Hide the current suggestion. The urgency stays, so the next tick
    /// suggests again.
    ///
    /// No-op without an active session.
    pub fn dismiss_suggestion(&mut self) -> Option<Event> {
        let now = self.clock.now_utc();
        let dismissed = self.transact_session(|active| {
            let session = active.as_mut()?;
            session.current_suggestion = None;
            Some((session.id, session.urgency_level, session.elapsed_minutes))
        });
        let Some((session_id, urgency, elapsed)) = dismissed else {
            tracing::debug!("dismiss_suggestion ignored: no active session");
            return None;
        };

        let event = DismissalEvent {
            timestamp: now,
            focus_time: elapsed,
            urgency_level: urgency,
        };
        append_log(
            &self.store,
            keys::DISMISSAL_HISTORY,
            &mut self.dismissals,
            event,
            DISMISSAL_HISTORY_CAP,
        );

        tracing::debug!(%session_id, %urgency, elapsed, "suggestion dismissed");
        Some(Event::SuggestionDismissed {
            session_id,
            urgency,
            elapsed_minutes: elapsed,
            at: now,
        })
    }

    /// Close the session, log its record and return to the inactive state.
    pub fn end_session(&mut self) -> Option<Event> {
        let now = self.clock.now_utc();
        let Some(session) = self.transact_session(Option::take) else {
            tracing::debug!("end_session ignored: no active session");
            return None;
        };

        let record = SessionRecord {
            session_id: session.id,
            started_at: session.start_time,
            ended_at: now,
            duration: session
                .elapsed_minutes
                .max(elapsed_minutes(session.start_time, now)),
            breaks_suggested: session.breaks_suggested,
            breaks_accepted: session.breaks_accepted,
            final_urgency_level: session.urgency_level,
        };
        append_log(
            &self.store,
            keys::SESSION_HISTORY,
            &mut self.sessions,
            record.clone(),
            SESSION_HISTORY_CAP,
        );

        tracing::info!(
            session_id = %record.session_id,
            duration = record.duration,
            suggested = record.breaks_suggested,
            accepted = record.breaks_accepted,
            "focus session ended"
        );
        Some(Event::SessionEnded { record })
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn elapsed_minutes(&self) -> u32 {
        self.session.as_ref().map(|s| s.elapsed_minutes).unwrap_or(0)
    }

    /// Run `op` on the stored active session and write the result back in
    /// one store update. The in-memory copy is replaced by the stored one
    /// first, so a session ended or replaced by another handle stays that way.
    ///
    /// When the store cannot be read, `op` runs on the in-memory copy.
    fn transact_session<R: Default>(&mut self, op: impl FnOnce(&mut Option<FocusSession>) -> R) -> R {
        let mut op = Some(op);
        let mut result = None;
        let session = &mut self.session;
        let synced = update_json(&self.store, keys::ACTIVE_SESSION, |stored: &mut Option<FocusSession>| {
            *session = stored.take();
            if let Some(op) = op.take() {
                result = Some(op(session));
            }
            stored.clone_from(session);
        });
        if let Err(e) = synced {
            tracing::warn!(error = %e, "failed to persist active session");
        }
        match op {
            Some(op) => op(&mut self.session),
            None => result.unwrap_or_default(),
        }
    }
}

/// Append `item` to a capped log, merging with whatever another handle
/// wrote to the same key since this guard loaded it.
fn append_log<T, S>(store: &S, key: &str, list: &mut Vec<T>, item: T, cap: usize)
where
    T: Serialize + DeserializeOwned + Clone,
    S: PatternStore,
{
    let mut pending = Some(item);
    let synced = update_json(store, key, |stored: &mut Vec<T>| {
        if let Some(item) = pending.take() {
            push_capped(stored, item, cap);
        }
        list.clone_from(stored);
    });
    if let Err(e) = synced {
        tracing::warn!(key, error = %e, "failed to persist guard log");
    }
    if let Some(item) = pending {
        push_capped(list, item, cap);
    }
}

/// Move elapsed time forward and set the matching tier. Returns the tier.
fn advance(session: &mut FocusSession, thresholds: &UrgencyThresholds, now: DateTime<Utc>) -> UrgencyLevel {
    session.elapsed_minutes = session
        .elapsed_minutes
        .max(elapsed_minutes(session.start_time, now));
    let level = thresholds.level_for(session.elapsed_minutes);
    if level != session.urgency_level {
        tracing::debug!(
            session_id = %session.id,
            from = %session.urgency_level,
            to = %level,
            elapsed = session.elapsed_minutes,
            "urgency changed"
        );
    }
    session.urgency_level = level;
    level
}

/// Whole minutes between `start` and `now`, never negative.
fn elapsed_minutes(start: DateTime<Utc>, now: DateTime<Utc>) -> u32 {
    u32::try_from((now - start).num_minutes().max(0)).unwrap_or(u32::MAX)
}
