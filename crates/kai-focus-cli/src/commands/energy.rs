//! Energy commands: current advice, outcome recording, manual override.

use std::collections::BTreeMap;

use clap::Subcommand;

use kai_focus_core::energy::{EnergyLevel, EnergyProfile, TimeBucket};
use kai_focus_core::{Config, Database, EnergyAdvisor, SystemClock};

use super::{print_json, CmdResult};

#[derive(Subcommand)]
pub enum EnergyAction {
    /// Show the current bucket, energy level and recommendation
    Status {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Record a finished focus session
    Record {
        /// Session length in minutes
        #[arg(long)]
        minutes: u32,
        /// The session was abandoned before its planned end
        #[arg(long)]
        incomplete: bool,
    },
    /// Override today's energy level (low, medium, high)
    Set {
        level: EnergyLevel,
    },
    /// Print per-bucket profiles as JSON
    History {
        /// Only this bucket (morning, afternoon, evening)
        #[arg(long)]
        bucket: Option<TimeBucket>,
    },
    /// Summarize completion per time of day
    Insights,
}

pub fn run(action: EnergyAction) -> CmdResult {
    let config = Config::load_or_default();
    let db = Database::open()?;
    let mut advisor = EnergyAdvisor::with_config(&db, SystemClock, config.energy);

    match action {
        EnergyAction::Status { json } => {
            let advice = advisor.advice();
            if json {
                print_json(&advice)?;
            } else {
                let rec = &advice.recommendation;
                println!("Time of day: {}", advice.bucket);
                println!("Energy:      {}", advice.level);
                println!(
                    "Suggested:   {} min (confidence {:.0}%)",
                    rec.duration_minutes,
                    rec.confidence * 100.0
                );
                println!("             {}", rec.reasoning);
                println!();
                println!("{}", advice.encouragement);
            }
        }
        EnergyAction::Record { minutes, incomplete } => {
            match advisor.record_successful_session(minutes, !incomplete) {
                Some(event) => print_json(&event)?,
                None => println!(
                    "Recorded {minutes} min ({}). Energy stays {}.",
                    if incomplete { "incomplete" } else { "completed" },
                    advisor.energy_level()
                ),
            }
        }
        EnergyAction::Set { level } => {
            let event = advisor.set_energy_level(level);
            print_json(&event)?;
        }
        EnergyAction::History { bucket } => match bucket {
            Some(bucket) => print_json(&advisor.profile(bucket))?,
            None => {
                let profiles: BTreeMap<&str, EnergyProfile> = TimeBucket::ALL
                    .iter()
                    .map(|&b| (b.as_str(), advisor.profile(b)))
                    .collect();
                print_json(&profiles)?;
            }
        },
        EnergyAction::Insights => {
            for insight in advisor.insights() {
                let rate = insight
                    .completion_rate
                    .map(|r| format!("{:.0}%", r * 100.0))
                    .unwrap_or_else(|| "-".to_string());
                let avg = insight
                    .avg_completed_minutes
                    .map(|m| format!("{m:.0} min"))
                    .unwrap_or_else(|| "-".to_string());
                println!(
                    "{:<10} {:<7} sessions: {:>3}  completed: {:>4}  avg: {}",
                    insight.bucket.as_str(),
                    insight.level.as_str(),
                    insight.sessions,
                    rate,
                    avg
                );
            }
        }
    }
    Ok(())
}
