//! Append-only break, dismissal and session logs, and their summary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::activities::acceptance_rate;
use super::urgency::UrgencyLevel;

pub const BREAK_HISTORY_CAP: usize = 50;
pub const DISMISSAL_HISTORY_CAP: usize = 50;
pub const SESSION_HISTORY_CAP: usize = 100;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakEvent {
    pub timestamp: DateTime<Utc>,
    pub focus_time_before_break: u32,
    pub break_duration: u32,
    pub urgency_level: UrgencyLevel,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DismissalEvent {
    pub timestamp: DateTime<Utc>,
    pub focus_time: u32,
    pub urgency_level: UrgencyLevel,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub session_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    /// Minutes.
    pub duration: u32,
    pub breaks_suggested: u32,
    pub breaks_accepted: u32,
    pub final_urgency_level: UrgencyLevel,
}

/// Descriptive analytics over the logs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakStats {
    pub sessions: usize,
    pub total_suggested: u32,
    pub total_accepted: u32,
    pub acceptance_rate: f64,
    pub dismissals: usize,
    pub avg_focus_before_break: Option<f64>,
    pub longest_session_minutes: u32,
}

impl BreakStats {
    pub fn from_logs(
        sessions: &[SessionRecord],
        breaks: &[BreakEvent],
        dismissals: &[DismissalEvent],
    ) -> Self {
        let total_suggested: u32 = sessions.iter().map(|s| s.breaks_suggested).sum();
        let total_accepted: u32 = sessions.iter().map(|s| s.breaks_accepted).sum();
        let avg_focus_before_break = (!breaks.is_empty()).then(|| {
            breaks.iter().map(|b| b.focus_time_before_break as f64).sum::<f64>() / breaks.len() as f64
        });

        Self {
            sessions: sessions.len(),
            total_suggested,
            total_accepted,
            acceptance_rate: acceptance_rate(total_suggested, total_accepted),
            dismissals: dismissals.len(),
            avg_focus_before_break,
            longest_session_minutes: sessions.iter().map(|s| s.duration).max().unwrap_or(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(duration: u32, suggested: u32, accepted: u32) -> SessionRecord {
        SessionRecord {
            session_id: Uuid::nil(),
            started_at: DateTime::<Utc>::UNIX_EPOCH,
            ended_at: DateTime::<Utc>::UNIX_EPOCH,
            duration,
            breaks_suggested: suggested,
            breaks_accepted: accepted,
            final_urgency_level: UrgencyLevel::None,
        }
    }

    fn break_after(minutes: u32) -> BreakEvent {
        BreakEvent {
            timestamp: DateTime::<Utc>::UNIX_EPOCH,
            focus_time_before_break: minutes,
            break_duration: 10,
            urgency_level: UrgencyLevel::Gentle,
        }
    }

    #[test]
    fn empty_logs_give_neutral_stats() {
        let stats = BreakStats::from_logs(&[], &[], &[]);
        assert_eq!(stats.sessions, 0);
        assert_eq!(stats.acceptance_rate, 1.0);
        assert_eq!(stats.avg_focus_before_break, None);
    }

    #[test]
    fn stats_aggregate_sessions_and_breaks() {
        let sessions = [record(50, 6, 2), record(130, 4, 0)];
        let breaks = [break_after(30), break_after(50)];
        let stats = BreakStats::from_logs(&sessions, &breaks, &[]);
        assert_eq!(stats.sessions, 2);
        assert_eq!(stats.total_suggested, 10);
        assert_eq!(stats.total_accepted, 2);
        assert!((stats.acceptance_rate - 0.2).abs() < 1e-9);
        assert_eq!(stats.avg_focus_before_break, Some(40.0));
        assert_eq!(stats.longest_session_minutes, 130);
    }
}
