mod config;
pub mod database;
mod store;

pub use config::{Config, EnergyConfig, HyperfocusConfig};
pub use database::Database;
pub use store::{load_json, push_capped, save_json, update_json, MemoryStore, PatternStore, UpdateFn};
pub(crate) use store::trim_front;

use std::path::PathBuf;

/// Store keys shared by the advisor and the guard.
pub mod keys {
    pub const ENERGY_PATTERNS: &str = "user-energy-patterns";
    pub const ENERGY_PREFERENCES: &str = "energy-preferences";
    pub const BREAK_HISTORY: &str = "break-history";
    pub const DISMISSAL_HISTORY: &str = "dismissal-history";
    pub const SESSION_HISTORY: &str = "session-history";
    pub const ACTIVE_SESSION: &str = "active-session";
}

/// Returns the data directory, creating it if needed.
///
/// `KAI_FOCUS_DATA_DIR` overrides the location entirely. Otherwise this is
/// `~/.config/kai-focus[-dev]/`, with the `-dev` suffix when KAI_FOCUS_ENV=dev.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> crate::error::Result<PathBuf> {
    let dir = match std::env::var_os("KAI_FOCUS_DATA_DIR") {
        Some(custom) => PathBuf::from(custom),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("KAI_FOCUS_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("kai-focus-dev")
            } else {
                base_dir.join("kai-focus")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
