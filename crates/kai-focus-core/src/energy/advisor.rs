//! Energy-aware session advisor.
//!
//! The advisor infers the user's energy for the current time-of-day bucket
//! and recommends a session length. Inference starts from a fixed prior per
//! bucket and is overwritten by the completion rate of recent sessions, so
//! recent behavior dominates long-term assumptions.
//!
//! ## Usage
//!
//! ```ignore
//! let mut advisor = EnergyAdvisor::new(store, SystemClock);
//! let advice = advisor.advice();
//! // ... session runs ...
//! advisor.record_successful_session(25, true);
//! ```

use std::collections::BTreeMap;

use chrono::{NaiveDate, Timelike};
use rand::Rng;
use rand::SeedableRng;
use rand_pcg::Mcg128Xsl64;
use serde::{Deserialize, Serialize};

use super::level::{
    EnergyLevel, EnergyPreference, EnergyProfile, SessionOutcome, TimeBucket, PROFILE_HISTORY_CAP,
};
use super::recommend::{encouragements, recommend, Recommendation};
use crate::clock::Clock;
use crate::events::{EnergySource, Event};
use crate::storage::{keys, load_json, push_capped, save_json, EnergyConfig, PatternStore};

/// Days of manual overrides retained.
const PREFERENCE_DAYS_KEPT: usize = 30;

/// What the caller displays for the energy side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnergyAdvice {
    pub bucket: TimeBucket,
    pub level: EnergyLevel,
    pub recommendation: Recommendation,
    pub encouragement: String,
}

/// Descriptive summary of one bucket's history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BucketInsight {
    pub bucket: TimeBucket,
    pub level: EnergyLevel,
    pub sessions: usize,
    pub completion_rate: Option<f64>,
    pub avg_completed_minutes: Option<f64>,
}

pub struct EnergyAdvisor<S, C> {
    store: S,
    clock: C,
    config: EnergyConfig,
    rng: Mcg128Xsl64,
    patterns: BTreeMap<TimeBucket, EnergyProfile>,
    /// Keyed by `YYYY-MM-DD`.
    preferences: BTreeMap<String, EnergyPreference>,
    bucket: TimeBucket,
    level: EnergyLevel,
}

impl<S: PatternStore, C: Clock> EnergyAdvisor<S, C> {
    pub fn new(store: S, clock: C) -> Self {
        Self::with_config(store, clock, EnergyConfig::default())
    }

    /// Load patterns and preferences from the store.
    ///
    /// Corrupt or missing data is treated as empty.
    pub fn with_config(store: S, clock: C, config: EnergyConfig) -> Self {
        let patterns = load_json(&store, keys::ENERGY_PATTERNS);
        let preferences = load_json(&store, keys::ENERGY_PREFERENCES);
        let seed = config
            .encouragement_seed
            .unwrap_or_else(|| rand::thread_rng().gen());

        let mut advisor = Self {
            store,
            clock,
            config,
            rng: Mcg128Xsl64::seed_from_u64(seed),
            patterns,
            preferences,
            bucket: TimeBucket::Morning,
            level: TimeBucket::Morning.default_level(),
        };
        advisor.bucket = advisor.current_bucket();
        advisor.level = advisor.resolve_level(advisor.bucket);
        advisor
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn time_bucket(&self) -> TimeBucket {
        self.bucket
    }

    pub fn energy_level(&self) -> EnergyLevel {
        self.level
    }

    pub fn recommendation(&self) -> Recommendation {
        recommend(self.level, self.bucket)
    }

    /// Random encouragement line for the current level.
    pub fn encouragement(&mut self) -> &'static str {
        let options = encouragements(self.level);
        options[self.rng.gen_range(0..options.len())]
    }

    /// Refresh the bucket, then build the full display payload.
    pub fn advice(&mut self) -> EnergyAdvice {
        self.refresh();
        EnergyAdvice {
            bucket: self.bucket,
            level: self.level,
            recommendation: self.recommendation(),
            encouragement: self.encouragement().to_string(),
        }
    }

    /// Profile for a bucket. A bucket with no recorded sessions reads as
    /// its prior level with an empty history.
    pub fn profile(&self, bucket: TimeBucket) -> EnergyProfile {
        self.patterns
            .get(&bucket)
            .cloned()
            .unwrap_or_else(|| EnergyProfile::new(bucket.default_level()))
    }

    /// Learned level for a bucket, or its prior.
    pub fn level_for(&self, bucket: TimeBucket) -> EnergyLevel {
        self.patterns
            .get(&bucket)
            .map(|p| p.level)
            .unwrap_or_else(|| bucket.default_level())
    }

    pub fn preference_for(&self, date: NaiveDate) -> Option<&EnergyPreference> {
        self.preferences.get(&date_key(date))
    }

    pub fn insights(&self) -> Vec<BucketInsight> {
        TimeBucket::ALL
            .iter()
            .map(|&bucket| {
                let history = self
                    .patterns
                    .get(&bucket)
                    .map(|p| p.history.as_slice())
                    .unwrap_or(&[]);
                let completed: Vec<_> = history.iter().filter(|o| o.completed).collect();
                let completion_rate = (!history.is_empty())
                    .then(|| completed.len() as f64 / history.len() as f64);
                let avg_completed_minutes = (!completed.is_empty()).then(|| {
                    completed.iter().map(|o| o.duration_minutes as f64).sum::<f64>()
                        / completed.len() as f64
                });
                BucketInsight {
                    bucket,
                    level: self.level_for(bucket),
                    sessions: history.len(),
                    completion_rate,
                    avg_completed_minutes,
                }
            })
            .collect()
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Re-evaluate the time bucket. Returns `true` when it changed.
    ///
    /// Callers poll this at least hourly.
    pub fn refresh(&mut self) -> bool {
        let bucket = self.current_bucket();
        if bucket == self.bucket {
            return false;
        }
        tracing::debug!(from = %self.bucket, to = %bucket, "time bucket changed");
        self.bucket = bucket;
        self.level = self.resolve_level(bucket);
        true
    }

    /// Record a finished session and re-infer the bucket's energy.
    ///
    /// Returns `EnergyLevelChanged` when the inferred level differs from the
    /// current one.
    pub fn record_successful_session(
        &mut self,
        duration_minutes: u32,
        completed: bool,
    ) -> Option<Event> {
        self.refresh();
        let bucket = self.bucket;
        let energy_at_start = self.level;
        let outcome = SessionOutcome {
            duration_minutes,
            completed,
            timestamp: self.clock.now_utc(),
            energy_at_start,
        };

        let window = self.config.recent_window;
        let min_samples = self.config.min_recent_sessions;
        let profile = self
            .patterns
            .entry(bucket)
            .or_insert_with(|| EnergyProfile::new(bucket.default_level()));
        push_capped(&mut profile.history, outcome, PROFILE_HISTORY_CAP);

        let learned = profile
            .recent_completion_rate(window, min_samples)
            .map(EnergyLevel::from_completion_rate);
        if let Some(level) = learned {
            profile.level = level;
        }
        self.persist_patterns();
        if learned.is_some() {
            self.drop_preference(bucket);
        }

        let to = learned?;
        self.level = to;
        if to == energy_at_start {
            return None;
        }
        tracing::info!(%bucket, from = %energy_at_start, %to, "energy level learned");
        Some(Event::EnergyLevelChanged {
            bucket,
            from: energy_at_start,
            to,
            source: EnergySource::Learned,
            at: self.clock.now_utc(),
        })
    }

    /// Override the current energy and remember it for today.
    pub fn set_energy_level(&mut self, level: EnergyLevel) -> Event {
        self.refresh();
        let from = self.level;
        let now = self.clock.now();
        self.level = level;
        self.preferences.insert(
            date_key(now.date_naive()),
            EnergyPreference {
                level,
                bucket: self.bucket,
                set_at: self.clock.now_utc(),
            },
        );
        while self.preferences.len() > PREFERENCE_DAYS_KEPT {
            self.preferences.pop_first();
        }
        self.persist_preferences();

        tracing::info!(bucket = %self.bucket, %from, to = %level, "energy level set manually");
        Event::EnergyLevelChanged {
            bucket: self.bucket,
            from,
            to: level,
            source: EnergySource::Manual,
            at: self.clock.now_utc(),
        }
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn current_bucket(&self) -> TimeBucket {
        TimeBucket::from_hour(self.clock.now().hour())
    }

    /// Today's manual override for this bucket wins over the learned level.
    fn resolve_level(&self, bucket: TimeBucket) -> EnergyLevel {
        let today = date_key(self.clock.now().date_naive());
        match self.preferences.get(&today) {
            Some(pref) if pref.bucket == bucket => pref.level,
            _ => self.level_for(bucket),
        }
    }

    /// A learned level supersedes today's manual override for the same bucket.
    fn drop_preference(&mut self, bucket: TimeBucket) {
        let today = date_key(self.clock.now().date_naive());
        if self.preferences.get(&today).is_some_and(|p| p.bucket == bucket) {
            tracing::debug!(%bucket, "manual energy override superseded by learned level");
            self.preferences.remove(&today);
            self.persist_preferences();
        }
    }

    fn persist_preferences(&self) {
        if let Err(e) = save_json(&self.store, keys::ENERGY_PREFERENCES, &self.preferences) {
            tracing::warn!(error = %e, "failed to persist energy preference");
        }
    }

    fn persist_patterns(&self) {
        if let Err(e) = save_json(&self.store, keys::ENERGY_PATTERNS, &self.patterns) {
            tracing::warn!(error = %e, "failed to persist energy patterns");
        }
    }
}

fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::storage::MemoryStore;
    use chrono::{DateTime, FixedOffset, TimeZone};

    fn at(hour: u32) -> DateTime<FixedOffset> {
        FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(2026, 3, 2, hour, 0, 0)
            .unwrap()
    }

    fn seeded() -> EnergyConfig {
        EnergyConfig {
            encouragement_seed: Some(7),
            ..EnergyConfig::default()
        }
    }

    #[test]
    fn fresh_morning_recommends_long_session() {
        let store = MemoryStore::new();
        let advisor = EnergyAdvisor::new(&store, ManualClock::at(at(9)));
        assert_eq!(advisor.time_bucket(), TimeBucket::Morning);
        assert_eq!(advisor.energy_level(), EnergyLevel::High);
        let rec = advisor.recommendation();
        assert_eq!(rec.duration_minutes, 45);
        assert_eq!(rec.confidence, 0.9);
        assert!(rec.reasoning.contains("morning"));
    }

    #[test]
    fn early_hours_count_as_evening() {
        let store = MemoryStore::new();
        let advisor = EnergyAdvisor::new(&store, ManualClock::at(at(3)));
        assert_eq!(advisor.time_bucket(), TimeBucket::Evening);
        assert_eq!(advisor.energy_level(), EnergyLevel::Low);
    }

    #[test]
    fn two_sessions_do_not_change_level() {
        let store = MemoryStore::new();
        let mut advisor = EnergyAdvisor::new(&store, ManualClock::at(at(14)));
        assert!(advisor.record_successful_session(25, false).is_none());
        assert!(advisor.record_successful_session(25, false).is_none());
        assert_eq!(advisor.energy_level(), EnergyLevel::Medium);
        assert_eq!(advisor.profile(TimeBucket::Afternoon).history.len(), 2);
    }

    #[test]
    fn four_completed_of_five_sets_high() {
        let store = MemoryStore::new();
        let mut advisor = EnergyAdvisor::new(&store, ManualClock::at(at(14)));
        advisor.record_successful_session(25, false);
        for _ in 0..3 {
            advisor.record_successful_session(25, true);
        }
        // 3/5 so far: still medium.
        assert_eq!(advisor.energy_level(), EnergyLevel::Medium);
        let event = advisor.record_successful_session(25, true);
        assert_eq!(advisor.energy_level(), EnergyLevel::High);
        match event {
            Some(Event::EnergyLevelChanged { from, to, source, .. }) => {
                assert_eq!(from, EnergyLevel::Medium);
                assert_eq!(to, EnergyLevel::High);
                assert_eq!(source, EnergySource::Learned);
            }
            other => panic!("expected EnergyLevelChanged, got {other:?}"),
        }
    }

    #[test]
    fn three_failures_set_low() {
        let store = MemoryStore::new();
        let mut advisor = EnergyAdvisor::new(&store, ManualClock::at(at(9)));
        for _ in 0..3 {
            advisor.record_successful_session(45, false);
        }
        assert_eq!(advisor.energy_level(), EnergyLevel::Low);
        assert_eq!(advisor.level_for(TimeBucket::Morning), EnergyLevel::Low);
        assert_eq!(advisor.recommendation().duration_minutes, 15);
    }

    #[test]
    fn history_is_capped_at_twenty() {
        let store = MemoryStore::new();
        let clock = ManualClock::at(at(9));
        let mut advisor = EnergyAdvisor::new(&store, clock.clone());
        for i in 0..25 {
            clock.advance_minutes(1);
            advisor.record_successful_session(i, true);
        }
        let history = advisor.profile(TimeBucket::Morning).history;
        assert_eq!(history.len(), PROFILE_HISTORY_CAP);
        assert_eq!(history[0].duration_minutes, 5);
        assert_eq!(history[19].duration_minutes, 24);
    }

    #[test]
    fn history_persists_across_instances() {
        let store = MemoryStore::new();
        let clock = ManualClock::at(at(14));
        let mut advisor = EnergyAdvisor::new(&store, clock.clone());
        for completed in [true, false, true, true] {
            advisor.record_successful_session(25, completed);
        }
        let before = advisor.profile(TimeBucket::Afternoon);
        assert_eq!(before.history.len(), 4);

        let reloaded = EnergyAdvisor::new(&store, clock);
        assert_eq!(reloaded.profile(TimeBucket::Afternoon), before);
        assert_eq!(reloaded.energy_level(), before.level);
    }

    #[test]
    fn manual_override_persists_for_the_day() {
        let store = MemoryStore::new();
        let clock = ManualClock::at(at(9));
        let mut advisor = EnergyAdvisor::new(&store, clock.clone());
        advisor.set_energy_level(EnergyLevel::Medium);
        let event = advisor.set_energy_level(EnergyLevel::Low);
        assert!(matches!(
            event,
            Event::EnergyLevelChanged { from: EnergyLevel::Medium, to: EnergyLevel::Low, source: EnergySource::Manual, .. }
        ));

        let reloaded = EnergyAdvisor::new(&store, clock.clone());
        assert_eq!(reloaded.energy_level(), EnergyLevel::Low);
        let pref = reloaded.preference_for(clock.now().date_naive()).unwrap();
        assert_eq!(pref.level, EnergyLevel::Low);

        // Next day the prior applies again.
        clock.advance_minutes(24 * 60);
        let next_day = EnergyAdvisor::new(&store, clock);
        assert_eq!(next_day.energy_level(), EnergyLevel::High);
    }

    #[test]
    fn learned_level_supersedes_todays_override() {
        let store = MemoryStore::new();
        let clock = ManualClock::at(at(14));
        let mut advisor = EnergyAdvisor::new(&store, clock.clone());
        advisor.set_energy_level(EnergyLevel::High);
        for _ in 0..5 {
            advisor.record_successful_session(25, false);
        }
        assert_eq!(advisor.energy_level(), EnergyLevel::Low);
        assert!(advisor.preference_for(clock.now().date_naive()).is_none());

        let reloaded = EnergyAdvisor::new(&store, clock);
        assert_eq!(reloaded.energy_level(), EnergyLevel::Low);
    }

    #[test]
    fn override_for_another_bucket_survives_learning() {
        let store = MemoryStore::new();
        let clock = ManualClock::at(at(9));
        let mut advisor = EnergyAdvisor::new(&store, clock.clone());
        advisor.set_energy_level(EnergyLevel::Low);

        clock.set(at(14));
        for _ in 0..3 {
            advisor.record_successful_session(25, true);
        }
        let pref = advisor.preference_for(clock.now().date_naive()).unwrap();
        assert_eq!(pref.bucket, TimeBucket::Morning);
        assert_eq!(pref.level, EnergyLevel::Low);
    }

    #[test]
    fn override_after_learning_wins_again() {
        let store = MemoryStore::new();
        let clock = ManualClock::at(at(14));
        let mut advisor = EnergyAdvisor::new(&store, clock.clone());
        for _ in 0..5 {
            advisor.record_successful_session(25, false);
        }
        advisor.set_energy_level(EnergyLevel::High);
        let reloaded = EnergyAdvisor::new(&store, clock);
        assert_eq!(reloaded.energy_level(), EnergyLevel::High);
    }

    #[test]
    fn refresh_switches_bucket_and_level() {
        let store = MemoryStore::new();
        let clock = ManualClock::at(at(11));
        let mut advisor = EnergyAdvisor::new(&store, clock.clone());
        assert!(!advisor.refresh());
        clock.advance_minutes(60);
        assert!(advisor.refresh());
        assert_eq!(advisor.time_bucket(), TimeBucket::Afternoon);
        assert_eq!(advisor.energy_level(), EnergyLevel::Medium);
    }

    #[test]
    fn corrupt_patterns_fall_back_to_priors() {
        let store = MemoryStore::new();
        store.set(keys::ENERGY_PATTERNS, "][").unwrap();
        store.set(keys::ENERGY_PREFERENCES, "42").unwrap();
        let advisor = EnergyAdvisor::new(&store, ManualClock::at(at(20)));
        assert_eq!(advisor.energy_level(), EnergyLevel::Low);
        let evening = advisor.profile(TimeBucket::Evening);
        assert!(evening.history.is_empty());
        assert_eq!(evening.level, EnergyLevel::Low);
    }

    #[test]
    fn seeded_encouragement_is_reproducible() {
        let store = MemoryStore::new();
        let clock = ManualClock::at(at(9));
        let mut a = EnergyAdvisor::with_config(&store, clock.clone(), seeded());
        let mut b = EnergyAdvisor::with_config(&store, clock, seeded());
        for _ in 0..5 {
            let line = a.encouragement();
            assert!(!line.is_empty());
            assert_eq!(line, b.encouragement());
        }
    }

    #[test]
    fn advice_merges_recommendation_and_encouragement() {
        let store = MemoryStore::new();
        let mut advisor = EnergyAdvisor::with_config(&store, ManualClock::at(at(19)), seeded());
        let advice = advisor.advice();
        assert_eq!(advice.bucket, TimeBucket::Evening);
        assert_eq!(advice.recommendation.confidence, 0.9);
        assert!(encouragements(EnergyLevel::Low).contains(&advice.encouragement.as_str()));
    }

    #[test]
    fn insights_summarize_each_bucket() {
        let store = MemoryStore::new();
        let mut advisor = EnergyAdvisor::new(&store, ManualClock::at(at(9)));
        advisor.record_successful_session(40, true);
        advisor.record_successful_session(20, false);
        let insights = advisor.insights();
        assert_eq!(insights.len(), 3);
        let morning = &insights[0];
        assert_eq!(morning.sessions, 2);
        assert_eq!(morning.completion_rate, Some(0.5));
        assert_eq!(morning.avg_completed_minutes, Some(40.0));
        assert_eq!(insights[1].completion_rate, None);
    }
}
