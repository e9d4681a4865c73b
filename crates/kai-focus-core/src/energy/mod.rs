//! Energy-aware session recommendation.
//!
//! This module infers the user's energy for the current time of day and
//! turns it into a suggested focus-session length.

mod advisor;
mod level;
mod recommend;

pub use advisor::{BucketInsight, EnergyAdvice, EnergyAdvisor};
pub use level::{
    EnergyLevel, EnergyPreference, EnergyProfile, SessionOutcome, TimeBucket, PROFILE_HISTORY_CAP,
};
pub use recommend::{encouragements, recommend, Recommendation};
