//! # Kai Focus Core Library
//!
//! This library provides the focus-protection logic behind the Kai ADHD
//! assistant. The CLI and any GUI are thin layers over the same core.
//!
//! ## Architecture
//!
//! - **Energy Advisor**: infers energy per time-of-day bucket from recent
//!   session outcomes and recommends a session length
//! - **Hyperfocus Guard**: a wall-clock-based state machine that escalates
//!   break suggestions; the caller invokes `tick()` periodically
//! - **Storage**: a key-value persistence port with SQLite and in-memory
//!   implementations, plus TOML configuration
//! - **Ticker**: scoped periodic timer for driving the guard
//!
//! ## Key Components
//!
//! - [`EnergyAdvisor`]: session-length recommendation
//! - [`HyperfocusGuard`]: break escalation state machine
//! - [`PatternStore`]: persistence port
//! - [`Clock`]: mockable time source

pub mod clock;
pub mod energy;
pub mod error;
pub mod events;
pub mod hyperfocus;
pub mod storage;
pub mod ticker;

pub use clock::{Clock, ManualClock, SystemClock};
pub use energy::{EnergyAdvice, EnergyAdvisor, EnergyLevel, Recommendation, TimeBucket};
pub use error::{ConfigError, CoreError, StoreError};
pub use events::{EnergySource, Event};
pub use hyperfocus::{
    BreakActivity, BreakStats, FocusSession, GuardView, HyperfocusGuard, UrgencyLevel,
};
pub use storage::{Config, Database, MemoryStore, PatternStore};
pub use ticker::TickHandle;
